//! Feedback mapping - ratios to pen color and tone
//!
//! The visual channel tints the ink: a neutral ratio keeps the base color,
//! positive ratios mix towards the high color and negative ones towards the
//! low color. Once the unclamped ratio passes its cutoff the ink keeps
//! darkening towards the severe color. The audio channel bends the pitch of
//! a continuous tone by up to `octave_span` octaves at ratio ±1.

use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

use crate::analysis::{FeedbackKind, RatioInput, RatioResult};
use crate::config::{AudioStyle, FeedbackConfig, Rgba, ThresholdConfig, VisualStyle};
use crate::error::{log_feedback_error, FeedbackError};
use crate::trace::{Sample, TraceIndex};

/// Committed brush state for one sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PenState {
    pub color: Rgba,
    pub width: f64,
}

/// Tone parameters for one sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioCue {
    pub frequency_hz: f64,
    pub portamento_ms: f64,
}

/// Outcome of one feedback channel for one sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelReading {
    pub kind: FeedbackKind,
    pub ratio: Option<RatioResult>,
    pub error: Option<FeedbackError>,
}

impl ChannelReading {
    fn from_outcome(kind: FeedbackKind, outcome: Result<RatioResult, FeedbackError>) -> Self {
        match outcome {
            Ok(ratio) => Self {
                kind,
                ratio: Some(ratio),
                error: None,
            },
            Err(err) => Self {
                kind,
                ratio: None,
                error: Some(err),
            },
        }
    }

    /// The ratio, or neutral when this channel failed
    pub fn ratio_or_neutral(&self) -> RatioResult {
        self.ratio.unwrap_or(RatioResult::NEUTRAL)
    }
}

/// Everything the live path decided for one sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveFeedback {
    pub stroke_id: u64,
    pub sample: Sample,
    pub visual: Option<ChannelReading>,
    pub audio: Option<ChannelReading>,
    pub pen: PenState,
    pub audio_cue: Option<AudioCue>,
}

/// Output channel a reading drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    Visual,
    Audio,
}

impl Channel {
    fn label(self) -> &'static str {
        match self {
            Channel::Visual => "visual_feedback",
            Channel::Audio => "audio_feedback",
        }
    }

    /// Bit in the reported-failures mask for this channel and kind
    fn report_bit(self, kind: FeedbackKind) -> u8 {
        let offset = match self {
            Channel::Visual => 0,
            Channel::Audio => 4,
        };
        1 << (offset + kind as u8)
    }
}

/// Evaluator applying the configured channels to a sample
///
/// Ratios are computed without state; the only thing remembered is which
/// channel failures have already been reported, so a misconfigured kind is
/// logged once per engine instead of once per sample.
#[derive(Debug)]
pub struct FeedbackEngine {
    thresholds: ThresholdConfig,
    feedback: FeedbackConfig,
    reported: AtomicU8,
}

impl FeedbackEngine {
    pub fn new(thresholds: ThresholdConfig, feedback: FeedbackConfig) -> Self {
        Self {
            thresholds,
            feedback,
            reported: AtomicU8::new(0),
        }
    }

    /// Evaluate both channels for a live sample
    ///
    /// A channel whose kind is not configured is logged and rendered as
    /// neutral; the other channel and the sample itself are unaffected.
    pub fn evaluate(
        &self,
        stroke_id: u64,
        reference: &TraceIndex,
        sample: &Sample,
        previous: Option<&Sample>,
    ) -> LiveFeedback {
        let input = RatioInput::new(sample, previous);

        let visual = self
            .feedback
            .visual
            .map(|kind| self.read_channel(Channel::Visual, kind, reference, input));
        let audio = self
            .feedback
            .audio
            .map(|kind| self.read_channel(Channel::Audio, kind, reference, input));

        let pen = match &visual {
            Some(reading) => pen_state(&self.feedback.visual_style, reading.ratio_or_neutral()),
            None => pen_state(&self.feedback.visual_style, RatioResult::NEUTRAL),
        };
        let audio_cue = audio
            .as_ref()
            .map(|reading| audio_cue(&self.feedback.audio_style, reading.ratio_or_neutral()));

        LiveFeedback {
            stroke_id,
            sample: *sample,
            visual,
            audio,
            pen,
            audio_cue,
        }
    }

    fn read_channel(
        &self,
        channel: Channel,
        kind: FeedbackKind,
        reference: &TraceIndex,
        input: RatioInput<'_>,
    ) -> ChannelReading {
        let outcome = kind.compute(reference, input, &self.thresholds);
        if let Err(err) = &outcome {
            self.report_failure(channel, kind, err);
        }
        ChannelReading::from_outcome(kind, outcome)
    }

    /// Log and publish a channel failure the first time it happens
    ///
    /// Returns true when this call did the reporting.
    fn report_failure(&self, channel: Channel, kind: FeedbackKind, err: &FeedbackError) -> bool {
        let bit = channel.report_bit(kind);
        if self.reported.fetch_or(bit, Ordering::Relaxed) & bit != 0 {
            return false;
        }

        log_feedback_error(err, channel.label());
        crate::telemetry::hub().record_error(
            crate::telemetry::DiagnosticError::ConfigurationMissing,
            format!("{}: {}", channel.label(), kind.label()),
        );
        true
    }
}

/// Pen state for a ratio under a visual style
pub fn pen_state(style: &VisualStyle, result: RatioResult) -> PenState {
    let color = if result.is_neutral() {
        style.base_color
    } else {
        let target = if result.ratio > 0.0 {
            style.high_color
        } else {
            style.low_color
        };
        let magnitude = result.raw.abs();
        if magnitude > 1.0 {
            let severity = (magnitude - 1.0).min(1.0);
            mix(target, style.severe_color, severity)
        } else {
            mix(style.base_color, target, result.ratio.abs())
        }
    };

    PenState {
        color,
        width: style.pen_width,
    }
}

/// Tone for a ratio under an audio style
pub fn audio_cue(style: &AudioStyle, result: RatioResult) -> AudioCue {
    AudioCue {
        frequency_hz: style.base_frequency_hz * (result.ratio * style.octave_span).exp2(),
        portamento_ms: style.portamento_ms,
    }
}

/// Linear interpolation between two colors, `amount` in [0, 1]
fn mix(from: Rgba, to: Rgba, amount: f64) -> Rgba {
    let t = if amount.is_nan() {
        0.0
    } else {
        amount.clamp(0.0, 1.0)
    };
    let channel = |a: u8, b: u8| -> u8 {
        (a as f64 + (b as f64 - a as f64) * t)
            .round()
            .clamp(0.0, 255.0) as u8
    };

    Rgba {
        r: channel(from.r, to.r),
        g: channel(from.g, to.g),
        b: channel(from.b, to.b),
        a: channel(from.a, to.a),
    }
}
