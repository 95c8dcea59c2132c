// Tilt ratio - absolute pen-angle difference from the reference
//
// Tilt deviation is symmetric, so only the magnitude of the difference is
// scored and the ratio lives in [0, 1]. Samples or reference points without
// tilt data are neutral.

use super::threshold::{generate, RatioResult, ThresholdBand};
use super::FeedbackKind;
use crate::config::{ThresholdConfig, TiltThresholds};
use crate::error::FeedbackError;
use crate::trace::{Sample, TraceIndex};

/// Multiple of `angle_deviation` at which the ratio saturates
pub const TILT_SATURATION_FACTOR: f64 = 2.0;

pub fn tilt_band(config: &TiltThresholds) -> ThresholdBand {
    ThresholdBand::high_only(
        config.angle_deviation,
        config.angle_deviation * TILT_SATURATION_FACTOR,
    )
}

/// Compute the tilt ratio of a live sample against the reference
///
/// # Returns
/// * `Ok(RatioResult)` - ratio in [0, 1]
/// * `Err(FeedbackError::ConfigurationMissing)` - no tilt thresholds
pub fn tilt_ratio(
    reference: &TraceIndex,
    sample: &Sample,
    thresholds: &ThresholdConfig,
) -> Result<RatioResult, FeedbackError> {
    let config = thresholds
        .tilt
        .as_ref()
        .ok_or(FeedbackError::ConfigurationMissing {
            kind: FeedbackKind::Tilt,
        })?;

    let Some(live_tilt) = sample.tilt else {
        return Ok(RatioResult::NEUTRAL);
    };

    let result = reference
        .closest_sample(sample.position, thresholds.closest_point_scan_diameter)
        .and_then(|closest| closest.sample.tilt)
        .map(|reference_tilt| generate((live_tilt - reference_tilt).abs(), &tilt_band(config)))
        .unwrap_or(RatioResult::NEUTRAL);

    Ok(result)
}
