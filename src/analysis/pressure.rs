// Pressure ratio - pen pressure against the reference at the closest sample
//
// Positive ratios mean pressing too hard, negative ratios too light. Without
// a reference sample in range there is nothing to compare against, so the
// ratio is neutral; positional feedback covers that case.

use super::threshold::{generate, RatioResult, ThresholdBand};
use super::FeedbackKind;
use crate::config::{PressureThresholds, ThresholdConfig};
use crate::error::FeedbackError;
use crate::trace::{Sample, TraceIndex};

/// Threshold band on the pressure difference (live minus reference)
pub fn pressure_band(config: &PressureThresholds) -> ThresholdBand {
    ThresholdBand::two_sided(
        config.low_pressure_start,
        config.low_pressure_cutoff,
        config.high_pressure_start,
        config.high_pressure_cutoff,
    )
}

/// Compute the pressure ratio of a live sample against the reference
///
/// # Returns
/// * `Ok(RatioResult)` - ratio in [-1, 1]
/// * `Err(FeedbackError::ConfigurationMissing)` - no pressure thresholds
pub fn pressure_ratio(
    reference: &TraceIndex,
    sample: &Sample,
    thresholds: &ThresholdConfig,
) -> Result<RatioResult, FeedbackError> {
    let config = thresholds
        .pressure
        .as_ref()
        .ok_or(FeedbackError::ConfigurationMissing {
            kind: FeedbackKind::Pressure,
        })?;

    let result = reference
        .closest_sample(sample.position, thresholds.closest_point_scan_diameter)
        .map(|closest| {
            generate(
                sample.pressure - closest.sample.pressure,
                &pressure_band(config),
            )
        })
        .unwrap_or(RatioResult::NEUTRAL);

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{Stroke, Trace, TraceRole};

    fn reference(pressure: f64) -> TraceIndex {
        let samples = (0..5)
            .map(|i| Sample::new(i as f64, 0.0, pressure, i as f64))
            .collect::<Vec<_>>();
        TraceIndex::build(&Trace::with_strokes(
            TraceRole::Expert,
            vec![Stroke::try_from(samples).unwrap()],
        ))
    }

    fn thresholds() -> ThresholdConfig {
        ThresholdConfig {
            pressure: Some(PressureThresholds::default()),
            ..ThresholdConfig::default()
        }
    }

    #[test]
    fn test_matching_pressure_is_neutral() {
        let result =
            pressure_ratio(&reference(0.5), &Sample::new(2.0, 0.0, 0.55, 0.0), &thresholds())
                .unwrap();
        assert!(result.is_neutral());
    }

    #[test]
    fn test_too_hard_is_positive() {
        let result =
            pressure_ratio(&reference(0.5), &Sample::new(2.0, 0.0, 0.65, 0.0), &thresholds())
                .unwrap();
        assert!((result.ratio - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_too_light_is_negative_and_clamped() {
        let result =
            pressure_ratio(&reference(0.9), &Sample::new(2.0, 0.0, 0.0, 0.0), &thresholds())
                .unwrap();
        assert_eq!(result.ratio, -1.0);
        assert!(result.raw < -1.0);
    }

    #[test]
    fn test_no_reference_in_range_is_neutral() {
        let result = pressure_ratio(
            &reference(0.1),
            &Sample::new(1000.0, 1000.0, 1.0, 0.0),
            &thresholds(),
        )
        .unwrap();
        assert!(result.is_neutral());
    }

    #[test]
    fn test_missing_configuration() {
        let config = ThresholdConfig {
            pressure: None,
            ..ThresholdConfig::default()
        };
        assert!(matches!(
            pressure_ratio(&reference(0.5), &Sample::new(0.0, 0.0, 0.5, 0.0), &config),
            Err(FeedbackError::ConfigurationMissing {
                kind: FeedbackKind::Pressure
            })
        ));
    }
}
