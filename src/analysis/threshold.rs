//! Generic threshold-and-cutoff ratio
//!
//! Every feedback kind maps its deviation value through the same piecewise
//! linear shape:
//!
//! ```text
//!  ratio
//!   1 |                         ________
//!     |                        /
//!   0 |_____ ______________ __/
//!     |      \
//!  -1 |___    \
//!     lowCutoff lowStart [neutral] highStart highCutoff   value
//! ```
//!
//! Values inside the neutral band give exactly 0. Past the band the ratio
//! ramps linearly from the side's `start` to its `cutoff` and is clamped to
//! ±1 beyond it. The unclamped ramp value is kept alongside for severity
//! color mixing.

use serde::{Deserialize, Serialize};

/// Slack applied to the neutral band edges so floating-point noise in a
/// value that sits on the edge does not trigger feedback
pub const NEUTRAL_EPSILON: f64 = 1e-9;

/// Normalized deviation score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioResult {
    /// Signed ratio clamped to [-1, 1]; 0 means no feedback
    pub ratio: f64,
    /// Unclamped ramp value, |raw| > 1 past the cutoff
    pub raw: f64,
}

impl RatioResult {
    pub const NEUTRAL: RatioResult = RatioResult {
        ratio: 0.0,
        raw: 0.0,
    };

    pub fn is_neutral(&self) -> bool {
        self.ratio == 0.0
    }
}

/// Thresholds for one feedback kind, expressed on the signed value axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdBand {
    pub neutral_low: f64,
    pub neutral_high: f64,
    pub low_start: f64,
    pub low_cutoff: f64,
    pub high_start: f64,
    pub high_cutoff: f64,
}

impl ThresholdBand {
    pub fn new(
        neutral_low: f64,
        neutral_high: f64,
        low_start: f64,
        low_cutoff: f64,
        high_start: f64,
        high_cutoff: f64,
    ) -> Self {
        Self {
            neutral_low,
            neutral_high,
            low_start,
            low_cutoff,
            high_start,
            high_cutoff,
        }
    }

    /// Band whose neutral zone ends where each ramp begins
    ///
    /// All four thresholds are magnitudes; the low side mirrors them below 0.
    pub fn two_sided(low_start: f64, low_cutoff: f64, high_start: f64, high_cutoff: f64) -> Self {
        Self::new(
            -low_start,
            high_start,
            -low_start,
            -low_cutoff,
            high_start,
            high_cutoff,
        )
    }

    /// Band that never reports the low side
    pub fn high_only(start: f64, cutoff: f64) -> Self {
        Self::new(
            f64::NEG_INFINITY,
            start,
            f64::NEG_INFINITY,
            f64::NEG_INFINITY,
            start,
            cutoff,
        )
    }
}

/// Map a deviation value through a threshold band
///
/// Never panics: NaN values are neutral, infinite values saturate, and
/// a cutoff at or before its start turns that side into a step.
pub fn generate(value: f64, band: &ThresholdBand) -> RatioResult {
    if value.is_nan() {
        return RatioResult::NEUTRAL;
    }

    if value > band.neutral_high + NEUTRAL_EPSILON {
        let raw = ramp(value - band.high_start, band.high_cutoff - band.high_start);
        if raw > 0.0 {
            return RatioResult {
                ratio: raw.min(1.0),
                raw,
            };
        }
    } else if value < band.neutral_low - NEUTRAL_EPSILON {
        let raw = -ramp(band.low_start - value, band.low_start - band.low_cutoff);
        if raw < 0.0 {
            return RatioResult {
                ratio: raw.max(-1.0),
                raw,
            };
        }
    }

    RatioResult::NEUTRAL
}

/// Position of `excess` along a ramp of width `span`
fn ramp(excess: f64, span: f64) -> f64 {
    if excess.is_nan() || excess <= 0.0 {
        0.0
    } else if span > 0.0 {
        excess / span
    } else {
        1.0
    }
}
