// Comparison module - batched expert/student comparison on a shared progress axis
//
// Both traces are placed on one x-axis: the cumulative arc length of each
// sample divided by the longer trace's total length, times 100. Every
// student sample is then re-classified with the live ratio engine against
// the expert index; contiguous deviating runs become error zones.
//
// Architecture:
// - zones: run detection and boundary flattening
// - smoothing: centered moving average over the plotted y values
// - BatchedComparator: builds both series plus zones for one metric

use serde::{Deserialize, Serialize};

use crate::analysis::accuracy::accuracy_scan_diameter;
use crate::analysis::{FeedbackKind, RatioInput};
use crate::config::{ComparisonConfig, ThresholdConfig};
use crate::error::{log_comparison_error, ComparisonError};
use crate::trace::{Trace, TraceIndex, ValueRange};

pub mod smoothing;
pub mod zones;

pub use smoothing::smooth;
pub use zones::{detect_error_zones, zone_boundaries, ErrorZone};

/// Quantity plotted in a batched comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMetric {
    Accuracy,
    Pressure,
    Tilt,
    Speed,
}

impl ComparisonMetric {
    pub const ALL: [ComparisonMetric; 4] = [
        ComparisonMetric::Accuracy,
        ComparisonMetric::Pressure,
        ComparisonMetric::Tilt,
        ComparisonMetric::Speed,
    ];

    pub fn label(&self) -> &'static str {
        self.feedback_kind().label()
    }

    /// Ratio kind used to classify samples as deviating
    pub fn feedback_kind(&self) -> FeedbackKind {
        match self {
            ComparisonMetric::Accuracy => FeedbackKind::Accuracy,
            ComparisonMetric::Pressure => FeedbackKind::Pressure,
            ComparisonMetric::Tilt => FeedbackKind::Tilt,
            ComparisonMetric::Speed => FeedbackKind::Speed,
        }
    }

    fn y_label(&self) -> &'static str {
        match self {
            ComparisonMetric::Accuracy => "Distance from expert",
            ComparisonMetric::Pressure => "Pressure",
            ComparisonMetric::Tilt => "Tilt (deg)",
            ComparisonMetric::Speed => "Speed (units/s)",
        }
    }
}

/// One plotted point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotPoint {
    pub x: f64,
    pub y: f64,
}

/// Plot-ready comparison of two traces for one metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchedComparison {
    pub metric: ComparisonMetric,
    pub student: Vec<PlotPoint>,
    pub expert: Vec<PlotPoint>,
    /// Zone boundaries: even index = start, odd index = end
    pub error_zones: Vec<f64>,
    pub x_label: String,
    pub y_label: String,
    /// Extent of both series' y values; None when neither has points
    pub y_range: Option<ValueRange>,
}

impl BatchedComparison {
    /// Boundaries regrouped into zones
    pub fn zones(&self) -> Vec<ErrorZone> {
        self.error_zones
            .chunks_exact(2)
            .map(|pair| ErrorZone {
                start: pair[0],
                end: pair[1],
            })
            .collect()
    }
}

/// Offline comparator over two complete traces
#[derive(Debug, Clone)]
pub struct BatchedComparator {
    thresholds: ThresholdConfig,
    config: ComparisonConfig,
}

impl BatchedComparator {
    pub fn new(thresholds: ThresholdConfig, config: ComparisonConfig) -> Self {
        Self { thresholds, config }
    }

    /// Compare two traces, building both indexes
    pub fn compare_traces(
        &self,
        expert: &Trace,
        student: &Trace,
        metric: ComparisonMetric,
    ) -> Result<BatchedComparison, ComparisonError> {
        self.compare(&TraceIndex::build(expert), &TraceIndex::build(student), metric)
    }

    /// Compare two indexed traces
    ///
    /// # Errors
    /// - EmptyTrace if either trace has no samples
    /// - DataUnavailable for tilt when either trace carries no tilt data
    /// - Feedback if the metric's thresholds are not configured
    pub fn compare(
        &self,
        expert: &TraceIndex,
        student: &TraceIndex,
        metric: ComparisonMetric,
    ) -> Result<BatchedComparison, ComparisonError> {
        self.validate(expert, student, metric)
            .inspect_err(|err| log_comparison_error(err, "compare"))?;

        let longest = expert.total_length().max(student.total_length());
        let student_progress = progress_axis(student.lengths(), longest);
        let expert_progress = progress_axis(expert.lengths(), longest);

        let deviating = self
            .classify(expert, student, metric)
            .inspect_err(|err| log_comparison_error(err, "compare"))?;
        let min_span = self.config.min_error_highlighting_fraction * 100.0;
        let zones = detect_error_zones(&student_progress, &deviating, min_span);

        let student_points = self.series(
            &student_progress,
            self.y_values(metric, student, Some(expert)),
        );
        let expert_points = self.series(&expert_progress, self.y_values(metric, expert, None));

        let y_range = match (
            ValueRange::from_values(student_points.iter().map(|p| p.y)),
            ValueRange::from_values(expert_points.iter().map(|p| p.y)),
        ) {
            (Some(a), Some(b)) => Some(a.union(&b)),
            (a, b) => a.or(b),
        };

        log::debug!(
            "Compared {} student and {} expert samples on {}: {} error zones",
            student.len(),
            expert.len(),
            metric.label(),
            zones.len()
        );

        Ok(BatchedComparison {
            metric,
            student: student_points,
            expert: expert_points,
            error_zones: zone_boundaries(&zones),
            x_label: "Progress (%)".to_string(),
            y_label: metric.y_label().to_string(),
            y_range,
        })
    }

    fn validate(
        &self,
        expert: &TraceIndex,
        student: &TraceIndex,
        metric: ComparisonMetric,
    ) -> Result<(), ComparisonError> {
        for index in [expert, student] {
            if index.is_empty() {
                return Err(ComparisonError::EmptyTrace { role: index.role() });
            }
        }

        if metric == ComparisonMetric::Tilt {
            let has_tilt = |index: &TraceIndex| index.samples().iter().any(|s| s.tilt.is_some());
            if !has_tilt(expert) || !has_tilt(student) {
                return Err(ComparisonError::DataUnavailable { metric });
            }
        }

        Ok(())
    }

    /// Per-student-sample deviation flags in trace order
    fn classify(
        &self,
        expert: &TraceIndex,
        student: &TraceIndex,
        metric: ComparisonMetric,
    ) -> Result<Vec<bool>, ComparisonError> {
        let kind = metric.feedback_kind();
        student
            .samples()
            .iter()
            .enumerate()
            .map(|(i, sample)| {
                let input = RatioInput::new(sample, student.previous_in_stroke(i));
                kind.compute(expert, input, &self.thresholds)
                    .map(|result| !result.is_neutral())
                    .map_err(ComparisonError::from)
            })
            .collect()
    }

    /// Raw y value per sample; None drops the sample from the series
    ///
    /// `reference` is set for the student series only, where accuracy is
    /// the distance to the closest expert sample.
    fn y_values(
        &self,
        metric: ComparisonMetric,
        index: &TraceIndex,
        reference: Option<&TraceIndex>,
    ) -> Vec<Option<f64>> {
        let scan_diameter = accuracy_scan_diameter(&self.thresholds);
        index
            .samples()
            .iter()
            .enumerate()
            .map(|(i, sample)| match metric {
                ComparisonMetric::Accuracy => Some(match reference {
                    Some(expert) => expert
                        .closest_sample(sample.position, scan_diameter)
                        .map(|closest| closest.distance)
                        .unwrap_or(scan_diameter / 2.0),
                    None => 0.0,
                }),
                ComparisonMetric::Pressure => Some(sample.pressure),
                ComparisonMetric::Tilt => sample.tilt,
                ComparisonMetric::Speed => index.speed_at(i),
            })
            .collect()
    }

    fn series(&self, progress: &[f64], values: Vec<Option<f64>>) -> Vec<PlotPoint> {
        let (xs, ys): (Vec<f64>, Vec<f64>) = progress
            .iter()
            .zip(values)
            .filter_map(|(x, y)| y.map(|y| (*x, y)))
            .unzip();
        let ys = smooth(&ys, self.config.data_points_averaging_neighbors);

        xs.into_iter()
            .zip(ys)
            .map(|(x, y)| PlotPoint { x, y })
            .collect()
    }
}

/// Cumulative lengths as percent of `longest`; all zero when `longest` is 0
fn progress_axis(lengths: &[f64], longest: f64) -> Vec<f64> {
    if longest > 0.0 {
        lengths.iter().map(|l| l * 100.0 / longest).collect()
    } else {
        vec![0.0; lengths.len()]
    }
}
