// Trace Trainer Core - real-time handwriting feedback engine
// Deviation ratios against an expert trace, stroke handoff and batched comparison

// Module declarations
pub mod analysis;
pub mod comparison;
pub mod config;
pub mod error;
pub mod feedback;
pub mod managers;
pub mod session;
pub mod stroke;
pub mod telemetry;
pub mod trace;

// Re-exports for convenience
pub use analysis::{FeedbackKind, RatioResult};
pub use comparison::{BatchedComparator, BatchedComparison, ComparisonMetric};
pub use config::AppConfig;
pub use feedback::{LiveFeedback, PenState};
pub use session::TracingSession;
pub use stroke::FinalizedStroke;
pub use trace::{Sample, Stroke, Trace, TraceIndex, TraceRole};

/// Install the fmt subscriber on stderr
///
/// Safe to call more than once; later calls leave the first subscriber in
/// place. `log` records from the library are forwarded to the subscriber.
pub fn init_logging() {
    let installed = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok();

    if installed {
        log::debug!("Logging initialized");
    }
}
