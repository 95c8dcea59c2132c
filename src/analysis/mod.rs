// Analysis module - real-time deviation ratios against the reference trace
//
// Every ratio function is pure and stateless: it takes the reference
// TraceIndex, a live sample (plus the previous sample of the stroke where
// speed is involved) and the threshold configuration, and returns a
// RatioResult. The severity math for all kinds lives in `threshold::generate`.
//
// Architecture:
// - Accuracy: distance to the closest reference sample
// - Pressure: signed pressure difference at the closest reference sample
// - Tilt: absolute angle difference at the closest reference sample
// - Speed: one-sided speed excess over the reference speed

use serde::{Deserialize, Serialize};

use crate::config::ThresholdConfig;
use crate::error::FeedbackError;
use crate::trace::{Sample, TraceIndex};

pub mod accuracy;
pub mod pressure;
pub mod speed;
pub mod threshold;
pub mod tilt;

pub use accuracy::accuracy_ratio;
pub use pressure::pressure_ratio;
pub use speed::speed_ratio;
pub use threshold::{generate, RatioResult, ThresholdBand};
pub use tilt::tilt_ratio;

/// The closed set of feedback kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Accuracy,
    Pressure,
    Tilt,
    Speed,
}

impl FeedbackKind {
    pub const ALL: [FeedbackKind; 4] = [
        FeedbackKind::Accuracy,
        FeedbackKind::Pressure,
        FeedbackKind::Tilt,
        FeedbackKind::Speed,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FeedbackKind::Accuracy => "accuracy",
            FeedbackKind::Pressure => "pressure",
            FeedbackKind::Tilt => "tilt",
            FeedbackKind::Speed => "speed",
        }
    }

    /// Compute this kind's ratio for one live sample
    pub fn compute(
        &self,
        reference: &TraceIndex,
        input: RatioInput<'_>,
        thresholds: &ThresholdConfig,
    ) -> Result<RatioResult, FeedbackError> {
        match self {
            FeedbackKind::Accuracy => accuracy_ratio(reference, input.sample, thresholds),
            FeedbackKind::Pressure => pressure_ratio(reference, input.sample, thresholds),
            FeedbackKind::Tilt => tilt_ratio(reference, input.sample, thresholds),
            FeedbackKind::Speed => {
                speed_ratio(reference, input.sample, input.previous, thresholds)
            }
        }
    }
}

/// A live sample with the stroke context some ratios need
#[derive(Debug, Clone, Copy)]
pub struct RatioInput<'a> {
    pub sample: &'a Sample,
    /// Preceding sample of the same stroke, if any
    pub previous: Option<&'a Sample>,
}

impl<'a> RatioInput<'a> {
    pub fn new(sample: &'a Sample, previous: Option<&'a Sample>) -> Self {
        Self { sample, previous }
    }
}
