// Speed ratio - one-sided "too fast" feedback
//
// Only writing faster than the reference triggers feedback. Slow writing is
// never penalized, which keeps the learner from being flooded with signals
// while concentrating on shape.

use super::threshold::{generate, RatioResult, ThresholdBand};
use super::FeedbackKind;
use crate::config::{SpeedThresholds, ThresholdConfig};
use crate::error::FeedbackError;
use crate::trace::index::live_speed;
use crate::trace::{Sample, TraceIndex};

pub fn speed_band(config: &SpeedThresholds) -> ThresholdBand {
    ThresholdBand::high_only(config.high_speed_start, config.high_speed_cutoff)
}

/// Compute the speed ratio of a live sample against the reference
///
/// `previous` is the preceding sample of the same stroke; the first sample
/// of a stroke has no speed yet and is neutral.
///
/// # Returns
/// * `Ok(RatioResult)` - ratio in [0, 1]
/// * `Err(FeedbackError::ConfigurationMissing)` - no speed thresholds
pub fn speed_ratio(
    reference: &TraceIndex,
    sample: &Sample,
    previous: Option<&Sample>,
    thresholds: &ThresholdConfig,
) -> Result<RatioResult, FeedbackError> {
    let config = thresholds
        .speed
        .as_ref()
        .ok_or(FeedbackError::ConfigurationMissing {
            kind: FeedbackKind::Speed,
        })?;

    let Some(speed) = previous.and_then(|prev| live_speed(prev, sample)) else {
        return Ok(RatioResult::NEUTRAL);
    };

    let result = reference
        .closest_sample(sample.position, thresholds.closest_point_scan_diameter)
        .and_then(|closest| reference.speed_at(closest.index))
        .map(|reference_speed| generate(speed - reference_speed, &speed_band(config)))
        .unwrap_or(RatioResult::NEUTRAL);

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{Stroke, Trace, TraceRole};

    /// Reference moving 1 unit per 10 ms = 100 units/s
    fn reference() -> TraceIndex {
        let samples = (0..20)
            .map(|i| Sample::new(i as f64, 0.0, 0.5, i as f64 * 10.0))
            .collect::<Vec<_>>();
        TraceIndex::build(&Trace::with_strokes(
            TraceRole::Expert,
            vec![Stroke::try_from(samples).unwrap()],
        ))
    }

    fn thresholds() -> ThresholdConfig {
        ThresholdConfig {
            speed: Some(SpeedThresholds {
                high_speed_start: 100.0,
                high_speed_cutoff: 300.0,
            }),
            ..ThresholdConfig::default()
        }
    }

    #[test]
    fn test_too_fast_is_positive() {
        // 4 units in 10 ms = 400 units/s, 300 over the reference
        let previous = Sample::new(5.0, 0.0, 0.5, 100.0);
        let current = Sample::new(9.0, 0.0, 0.5, 110.0);
        let result = speed_ratio(&reference(), &current, Some(&previous), &thresholds()).unwrap();
        assert!((result.ratio - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_slow_is_never_penalized() {
        let previous = Sample::new(5.0, 0.0, 0.5, 100.0);
        let current = Sample::new(5.01, 0.0, 0.5, 1100.0);
        let result = speed_ratio(&reference(), &current, Some(&previous), &thresholds()).unwrap();
        assert!(result.is_neutral());
    }

    #[test]
    fn test_first_sample_and_zero_dt_are_neutral() {
        let current = Sample::new(9.0, 0.0, 0.5, 110.0);
        assert!(speed_ratio(&reference(), &current, None, &thresholds())
            .unwrap()
            .is_neutral());

        let same_time = Sample::new(3.0, 0.0, 0.5, 110.0);
        assert!(speed_ratio(&reference(), &current, Some(&same_time), &thresholds())
            .unwrap()
            .is_neutral());
    }

    #[test]
    fn test_missing_configuration() {
        let config = ThresholdConfig {
            speed: None,
            ..ThresholdConfig::default()
        };
        let current = Sample::new(9.0, 0.0, 0.5, 110.0);
        assert!(speed_ratio(&reference(), &current, None, &config).is_err());
    }
}
