// Error types for the trace trainer
//
// This module defines custom error types for ratio computation, live stroke
// sessions and batched comparison, each carrying a stable numeric code.

mod comparison;
mod feedback;
mod session;

pub use comparison::{log_comparison_error, ComparisonError, ComparisonErrorCodes};
pub use feedback::{log_feedback_error, FeedbackError, FeedbackErrorCodes};
pub use session::{log_session_error, SessionError, SessionErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// the CLI and any embedding host.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::FeedbackKind;

    #[test]
    fn test_error_code_trait() {
        let feedback_err: &dyn ErrorCode = &FeedbackError::ConfigurationMissing {
            kind: FeedbackKind::Accuracy,
        };
        assert_eq!(feedback_err.code(), 3001);

        let session_err: &dyn ErrorCode = &SessionError::StrokeNotOpen;
        assert_eq!(session_err.code(), 4002);
    }
}
