// Accuracy ratio - positional deviation from the reference trace
//
// 0 while the live sample stays within `max_deviation_radius` of some
// reference sample, then a linear ramp that saturates at four times the
// radius. The search region is widened to cover the whole ramp, so a sample
// with no reference sample inside it is past saturation and reports the
// saturated ratio.

use super::threshold::{generate, RatioResult, ThresholdBand};
use super::FeedbackKind;
use crate::config::ThresholdConfig;
use crate::error::FeedbackError;
use crate::trace::{Sample, TraceIndex};

/// Multiple of the deviation radius at which the ratio saturates
pub const ACCURACY_SATURATION_FACTOR: f64 = 4.0;

/// Compute the accuracy ratio of a live sample against the reference
///
/// # Returns
/// * `Ok(RatioResult)` - ratio in [0, 1]
/// * `Err(FeedbackError::ConfigurationMissing)` - no accuracy thresholds
pub fn accuracy_ratio(
    reference: &TraceIndex,
    sample: &Sample,
    thresholds: &ThresholdConfig,
) -> Result<RatioResult, FeedbackError> {
    let config = thresholds
        .accuracy
        .as_ref()
        .ok_or(FeedbackError::ConfigurationMissing {
            kind: FeedbackKind::Accuracy,
        })?;
    let radius = config.max_deviation_radius;
    let scan_diameter = accuracy_scan_diameter(thresholds);

    let result = match reference.closest_sample(sample.position, scan_diameter) {
        Some(closest) => accuracy_from_distance(closest.distance, radius),
        None => {
            // Everything in range was farther than the scan radius
            let lower_bound = accuracy_from_distance(scan_diameter / 2.0, radius);
            RatioResult {
                ratio: 1.0,
                raw: lower_bound.raw.max(1.0),
            }
        }
    };

    Ok(result)
}

/// Search diameter for accuracy queries
///
/// At least the configured scan diameter, and never narrower than the
/// saturation distance on each side of the query point.
pub fn accuracy_scan_diameter(thresholds: &ThresholdConfig) -> f64 {
    let scan_diameter = thresholds.closest_point_scan_diameter;
    match &thresholds.accuracy {
        Some(config) => {
            scan_diameter.max(2.0 * ACCURACY_SATURATION_FACTOR * config.max_deviation_radius)
        }
        None => scan_diameter,
    }
}

/// Accuracy ratio for a known distance to the closest reference sample
pub fn accuracy_from_distance(distance: f64, max_deviation_radius: f64) -> RatioResult {
    let band = ThresholdBand::high_only(
        max_deviation_radius,
        max_deviation_radius * ACCURACY_SATURATION_FACTOR,
    );
    generate(distance, &band)
}
