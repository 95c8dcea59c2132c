// Session error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Session error code constants
///
/// Error code range: 4001-4003
pub struct SessionErrorCodes {}

impl SessionErrorCodes {
    /// Mutex/RwLock was poisoned
    pub const LOCK_POISONED: i32 = 4001;

    /// A sample or finish arrived while no stroke is open
    pub const STROKE_NOT_OPEN: i32 = 4002;

    /// begin_stroke was called while a stroke is still open
    pub const STROKE_ALREADY_OPEN: i32 = 4003;
}

/// Log a session error with structured context
///
/// The logging is non-blocking and will not panic on failure.
pub fn log_session_error(err: &SessionError, context: &str) {
    error!(
        "Session error in {}: code={}, component=TracingSession, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Live-session errors
///
/// These cover stroke lifecycle misuse and shared-state lock failures.
///
/// Error code range: 4001-4003
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// Mutex/RwLock was poisoned
    LockPoisoned { component: String },

    /// No stroke is currently open
    StrokeNotOpen,

    /// A stroke is already open
    StrokeAlreadyOpen { stroke_id: u64 },
}

impl ErrorCode for SessionError {
    fn code(&self) -> i32 {
        match self {
            SessionError::LockPoisoned { .. } => SessionErrorCodes::LOCK_POISONED,
            SessionError::StrokeNotOpen => SessionErrorCodes::STROKE_NOT_OPEN,
            SessionError::StrokeAlreadyOpen { .. } => SessionErrorCodes::STROKE_ALREADY_OPEN,
        }
    }

    fn message(&self) -> String {
        match self {
            SessionError::LockPoisoned { component } => {
                format!("Lock poisoned for component: {}", component)
            }
            SessionError::StrokeNotOpen => {
                "No stroke open. Call begin_stroke() first.".to_string()
            }
            SessionError::StrokeAlreadyOpen { stroke_id } => {
                format!(
                    "Stroke {} already open. Call finish_stroke() first.",
                    stroke_id
                )
            }
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SessionError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for SessionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_error_codes() {
        assert_eq!(
            SessionError::LockPoisoned {
                component: "render_buffer".to_string()
            }
            .code(),
            4001
        );
        assert_eq!(SessionError::StrokeNotOpen.code(), 4002);
        assert_eq!(SessionError::StrokeAlreadyOpen { stroke_id: 3 }.code(), 4003);
    }

    #[test]
    fn test_session_error_messages() {
        let err = SessionError::LockPoisoned {
            component: "raw_buffer".to_string(),
        };
        assert!(err.message().contains("raw_buffer"));

        let err = SessionError::StrokeAlreadyOpen { stroke_id: 7 };
        assert!(err.message().contains("Stroke 7"));

        let err = SessionError::StrokeNotOpen;
        assert!(err.message().contains("begin_stroke"));
    }
}
