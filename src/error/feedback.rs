// Feedback error types and constants

use crate::analysis::FeedbackKind;
use crate::error::ErrorCode;
use log::error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Feedback error code constants
///
/// Single source of truth for the numeric codes reported by ratio functions.
///
/// Error code range: 3001
pub struct FeedbackErrorCodes {}

impl FeedbackErrorCodes {
    /// A ratio function was invoked without its threshold section
    pub const CONFIGURATION_MISSING: i32 = 3001;
}

/// Log a feedback error with structured context
///
/// The logging is non-blocking and will not panic on failure.
pub fn log_feedback_error(err: &FeedbackError, context: &str) {
    error!(
        "Feedback error in {}: code={}, component=RatioEngine, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Ratio-engine errors
///
/// A feedback kind must never run partially configured, so a missing
/// threshold section is reported instead of being defaulted. Out-of-order
/// or extreme threshold values are not errors; ratios clamp instead.
///
/// Error code range: 3001
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeedbackError {
    /// Threshold section for this kind is absent
    ConfigurationMissing { kind: FeedbackKind },
}

impl ErrorCode for FeedbackError {
    fn code(&self) -> i32 {
        match self {
            FeedbackError::ConfigurationMissing { .. } => FeedbackErrorCodes::CONFIGURATION_MISSING,
        }
    }

    fn message(&self) -> String {
        match self {
            FeedbackError::ConfigurationMissing { kind } => {
                format!("No threshold configuration for {} feedback", kind.label())
            }
        }
    }
}

impl fmt::Display for FeedbackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FeedbackError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for FeedbackError {}
