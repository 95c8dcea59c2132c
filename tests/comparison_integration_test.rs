//! Integration tests for batched comparison
//!
//! These tests drive BatchedComparator end to end on synthetic traces:
//! - Identical traces never produce error zones
//! - Crossing pressure profiles produce the two expected zones
//! - Missing tilt data is reported as unavailable, not as zeros

use trace_trainer::comparison::{BatchedComparator, ComparisonMetric};
use trace_trainer::config::{
    ComparisonConfig, PressureThresholds, SpeedThresholds, ThresholdConfig, TiltThresholds,
};
use trace_trainer::error::ComparisonError;
use trace_trainer::{Sample, Stroke, Trace, TraceRole};

fn single_stroke(role: TraceRole, samples: Vec<Sample>) -> Trace {
    Trace::with_strokes(role, vec![Stroke::try_from(samples).unwrap()])
}

fn crossing_thresholds() -> ThresholdConfig {
    ThresholdConfig {
        closest_point_scan_diameter: 50.0,
        pressure: Some(PressureThresholds {
            high_pressure_start: 0.1,
            high_pressure_cutoff: 0.2,
            low_pressure_start: 0.1,
            low_pressure_cutoff: 0.2,
        }),
        ..ThresholdConfig::default()
    }
}

/// A 21-point curve with pressure, tilt and varying speed
fn curve(role: TraceRole) -> Trace {
    let samples = (0..21)
        .map(|i| {
            let t = i as f64;
            Sample::new(t * 8.0, (t / 3.0).sin() * 20.0, 0.3 + 0.02 * t, t * t * 2.0)
                .with_tilt(35.0 + t)
        })
        .collect();
    single_stroke(role, samples)
}

#[test]
fn test_identical_traces_have_no_error_zones() {
    let expert = curve(TraceRole::Expert);
    let student = curve(TraceRole::Student);
    let thresholds = ThresholdConfig {
        tilt: Some(TiltThresholds {
            angle_deviation: 5.0,
        }),
        speed: Some(SpeedThresholds {
            high_speed_start: 50.0,
            high_speed_cutoff: 100.0,
        }),
        ..ThresholdConfig::default()
    };
    let comparator = BatchedComparator::new(thresholds, ComparisonConfig::default());

    for metric in ComparisonMetric::ALL {
        let result = comparator
            .compare_traces(&expert, &student, metric)
            .unwrap_or_else(|err| panic!("{:?} failed: {}", metric, err));

        assert!(
            result.error_zones.is_empty(),
            "{:?} produced zones {:?}",
            metric,
            result.error_zones
        );
        assert_eq!(result.student.len(), 21);
        assert_eq!(result.expert.len(), 21);
        assert!((result.student.last().unwrap().x - 100.0).abs() < 1e-9);
    }
}

/// Expert pressure rises 0 to 1 over 21 samples while the student's falls
/// 1 to 0 over half the distance; the profiles cross near the midpoint of
/// the student's stroke.
#[test]
fn test_crossing_pressure_profiles_give_two_zones() {
    let expert = single_stroke(
        TraceRole::Expert,
        (0..21)
            .map(|j| Sample::new(j as f64 * 10.0, 0.0, j as f64 / 20.0, j as f64 * 10.0))
            .collect(),
    );
    let student = single_stroke(
        TraceRole::Student,
        (0..21)
            .map(|i| Sample::new(i as f64 * 5.0, 0.0, 1.0 - i as f64 / 20.0, i as f64 * 10.0))
            .collect(),
    );
    let comparator = BatchedComparator::new(
        crossing_thresholds(),
        ComparisonConfig {
            min_error_highlighting_fraction: 0.01,
            data_points_averaging_neighbors: 0,
        },
    );

    let result = comparator
        .compare_traces(&expert, &student, ComparisonMetric::Pressure)
        .unwrap();
    let zones = result.zones();

    assert_eq!(zones.len(), 2, "zones: {:?}", result.error_zones);
    assert_eq!(zones[0].start, 0.0);
    assert!((30.0..=32.5).contains(&zones[0].end), "{:?}", zones[0]);
    assert!((37.5..=40.0).contains(&zones[1].start), "{:?}", zones[1]);
    assert_eq!(zones[1].end, 50.0);

    // Unsmoothed series plot the raw pressures
    assert_eq!(result.student[0].y, 1.0);
    assert_eq!(result.expert[20].y, 1.0);
    assert_eq!(result.y_label, "Pressure");
}

#[test]
fn test_short_zones_are_suppressed() {
    let expert = single_stroke(
        TraceRole::Expert,
        (0..21)
            .map(|j| Sample::new(j as f64 * 10.0, 0.0, j as f64 / 20.0, j as f64 * 10.0))
            .collect(),
    );
    let student = single_stroke(
        TraceRole::Student,
        (0..21)
            .map(|i| Sample::new(i as f64 * 5.0, 0.0, 1.0 - i as f64 / 20.0, i as f64 * 10.0))
            .collect(),
    );
    // Both zones span at least 10 percent; a 20 percent floor drops the second
    let comparator = BatchedComparator::new(
        crossing_thresholds(),
        ComparisonConfig {
            min_error_highlighting_fraction: 0.2,
            data_points_averaging_neighbors: 0,
        },
    );

    let result = comparator
        .compare_traces(&expert, &student, ComparisonMetric::Pressure)
        .unwrap();
    assert_eq!(result.zones().len(), 1);
    assert_eq!(result.error_zones[0], 0.0);
}

#[test]
fn test_tilt_without_data_is_unavailable() {
    let expert = curve(TraceRole::Expert);
    let student = single_stroke(
        TraceRole::Student,
        (0..21)
            .map(|i| Sample::new(i as f64 * 8.0, 0.0, 0.5, i as f64 * 10.0))
            .collect(),
    );

    assert!(student.tilt_range().is_none());
    assert!(expert.tilt_range().is_some());

    let comparator = BatchedComparator::new(ThresholdConfig::default(), ComparisonConfig::default());
    let result = comparator.compare_traces(&expert, &student, ComparisonMetric::Tilt);
    assert_eq!(
        result,
        Err(ComparisonError::DataUnavailable {
            metric: ComparisonMetric::Tilt
        })
    );
}

#[test]
fn test_empty_trace_is_reported_by_role() {
    let expert = curve(TraceRole::Expert);
    let student = Trace::new(TraceRole::Student);
    let comparator = BatchedComparator::new(ThresholdConfig::default(), ComparisonConfig::default());

    assert_eq!(
        comparator.compare_traces(&expert, &student, ComparisonMetric::Accuracy),
        Err(ComparisonError::EmptyTrace {
            role: TraceRole::Student
        })
    );
}

#[test]
fn test_comparison_serializes_for_graphing() {
    let comparator = BatchedComparator::new(ThresholdConfig::default(), ComparisonConfig::default());
    let result = comparator
        .compare_traces(
            &curve(TraceRole::Expert),
            &curve(TraceRole::Student),
            ComparisonMetric::Speed,
        )
        .unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["metric"], "speed");
    assert_eq!(json["student"].as_array().unwrap().len(), 21);
    assert!(json["error_zones"].as_array().unwrap().is_empty());
}
