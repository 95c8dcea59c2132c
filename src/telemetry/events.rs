//! Core telemetry event types describing diagnostics data exposed to
//! the CLI and any embedding host.

use serde::{Deserialize, Serialize};

/// Diagnostic error codes surfaced via telemetry metrics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticError {
    ConfigurationMissing,
    CardinalityMismatch,
    LockPoisoned,
}

/// Rich metric events covering per-sample latency, buffer fill and stroke
/// finalization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum MetricEvent {
    /// Rolling per-sample evaluation time
    Latency {
        avg_ms: f32,
        max_ms: f32,
        sample_count: usize,
    },
    BufferOccupancy {
        channel: String,
        len: usize,
    },
    StrokeFinalized {
        stroke_id: u64,
        samples: usize,
        discarded_segments: usize,
    },
    Error {
        code: DiagnosticError,
        context: String,
    },
}
