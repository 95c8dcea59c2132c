// Batched comparison error types and constants

use crate::comparison::ComparisonMetric;
use crate::error::{ErrorCode, FeedbackError, SessionError};
use crate::trace::TraceRole;
use log::error;
use std::fmt;

/// Comparison error code constants
///
/// Error code range: 5001-5004
pub struct ComparisonErrorCodes {}

impl ComparisonErrorCodes {
    /// One of the traces has no samples
    pub const EMPTY_TRACE: i32 = 5001;

    /// The requested metric has no data in one of the traces
    pub const DATA_UNAVAILABLE: i32 = 5002;

    /// Deviation classification failed in the ratio engine
    pub const FEEDBACK: i32 = 5003;

    /// Session state could not be read for comparison
    pub const SESSION: i32 = 5004;
}

/// Log a comparison error with structured context
pub fn log_comparison_error(err: &ComparisonError, context: &str) {
    error!(
        "Comparison error in {}: code={}, component=BatchedComparator, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Batched comparison errors
///
/// Error code range: 5001-5004
#[derive(Debug, Clone, PartialEq)]
pub enum ComparisonError {
    /// Trace for this role has no samples
    EmptyTrace { role: TraceRole },

    /// Metric cannot be plotted for these traces (e.g. no tilt data)
    DataUnavailable { metric: ComparisonMetric },

    /// Ratio engine rejected the configuration
    Feedback(FeedbackError),

    /// Session state was unavailable (poisoned lock)
    Session(SessionError),
}

impl From<FeedbackError> for ComparisonError {
    fn from(err: FeedbackError) -> Self {
        ComparisonError::Feedback(err)
    }
}

impl From<SessionError> for ComparisonError {
    fn from(err: SessionError) -> Self {
        ComparisonError::Session(err)
    }
}

impl ErrorCode for ComparisonError {
    fn code(&self) -> i32 {
        match self {
            ComparisonError::EmptyTrace { .. } => ComparisonErrorCodes::EMPTY_TRACE,
            ComparisonError::DataUnavailable { .. } => ComparisonErrorCodes::DATA_UNAVAILABLE,
            ComparisonError::Feedback(_) => ComparisonErrorCodes::FEEDBACK,
            ComparisonError::Session(_) => ComparisonErrorCodes::SESSION,
        }
    }

    fn message(&self) -> String {
        match self {
            ComparisonError::EmptyTrace { role } => {
                format!("The {} trace has no samples", role.label())
            }
            ComparisonError::DataUnavailable { metric } => {
                format!("No {} data available for comparison", metric.label())
            }
            ComparisonError::Feedback(err) => err.message(),
            ComparisonError::Session(err) => err.message(),
        }
    }
}

impl fmt::Display for ComparisonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ComparisonError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for ComparisonError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ComparisonError::Feedback(err) => Some(err),
            ComparisonError::Session(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::FeedbackKind;

    #[test]
    fn test_comparison_error_codes() {
        assert_eq!(
            ComparisonError::EmptyTrace {
                role: TraceRole::Student
            }
            .code(),
            5001
        );
        assert_eq!(
            ComparisonError::DataUnavailable {
                metric: ComparisonMetric::Tilt
            }
            .code(),
            5002
        );
        assert_eq!(
            ComparisonError::Feedback(FeedbackError::ConfigurationMissing {
                kind: FeedbackKind::Pressure
            })
            .code(),
            5003
        );
        assert_eq!(
            ComparisonError::Session(SessionError::LockPoisoned {
                component: "student_trace".to_string()
            })
            .code(),
            5004
        );
    }

    #[test]
    fn test_feedback_error_conversion() {
        fn may_fail() -> Result<(), FeedbackError> {
            Err(FeedbackError::ConfigurationMissing {
                kind: FeedbackKind::Tilt,
            })
        }

        fn caller() -> Result<(), ComparisonError> {
            may_fail()?;
            Ok(())
        }

        match caller() {
            Err(ComparisonError::Feedback(FeedbackError::ConfigurationMissing { kind })) => {
                assert_eq!(kind, FeedbackKind::Tilt);
            }
            other => panic!("Expected Feedback error, got {:?}", other),
        }
    }

    #[test]
    fn test_data_unavailable_message() {
        let err = ComparisonError::DataUnavailable {
            metric: ComparisonMetric::Tilt,
        };
        assert!(err.message().contains("tilt"));
    }
}
