// TracingSession: explicit state container for one exercise attempt
// Replaces process-wide buffers with state owned here and shared by reference
//
// The live-input thread calls on_sample() for every stylus event between
// begin_stroke() and finish_stroke(); finish_stroke() may run on another
// thread. The expert index is swapped whole on replace_expert(), so a sample
// in flight keeps evaluating against the index it started with.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;
use tokio::sync::broadcast;

use crate::analysis::RatioResult;
use crate::comparison::{BatchedComparator, BatchedComparison, ComparisonMetric};
use crate::config::AppConfig;
use crate::error::{log_session_error, ComparisonError, SessionError};
use crate::feedback::{pen_state, FeedbackEngine, LiveFeedback};
use crate::managers::{BroadcastChannelManager, StrokeManager};
use crate::stroke::FinalizedStroke;
use crate::telemetry::{self, DiagnosticError};
use crate::trace::{Sample, Trace, TraceIndex, TraceRole};

/// Live tracing session against one expert trace
///
/// Send + Sync: share it behind an `Arc` between the input thread and the
/// finalizing thread.
///
/// # Example
/// ```ignore
/// let session = TracingSession::new(AppConfig::default(), expert);
/// session.begin_stroke()?;
/// for sample in stylus_events {
///     let feedback = session.on_sample(sample)?;
///     paint(feedback.pen);
/// }
/// if let Some(stroke) = session.finish_stroke()? {
///     for (sample, pen) in stroke.replay() { dry_ink(sample, pen); }
/// }
/// ```
pub struct TracingSession {
    config: AppConfig,
    expert: RwLock<Arc<TraceIndex>>,
    engine: FeedbackEngine,
    strokes: StrokeManager,
    student: RwLock<Trace>,
    channels: BroadcastChannelManager,
    feedback_tx: broadcast::Sender<LiveFeedback>,
    stroke_tx: broadcast::Sender<FinalizedStroke>,
}

impl TracingSession {
    /// Create a session for an expert trace
    ///
    /// Builds the expert index and opens both broadcast channels.
    pub fn new(config: AppConfig, expert: Trace) -> Self {
        let engine = FeedbackEngine::new(config.thresholds.clone(), config.feedback.clone());
        let channels = BroadcastChannelManager::new();
        let feedback_tx = channels.init_feedback();
        let stroke_tx = channels.init_strokes();
        let index = TraceIndex::build(&expert);

        log::info!(
            "Tracing session created: expert has {} samples, {:.1} units long",
            index.len(),
            index.total_length()
        );

        Self {
            config,
            expert: RwLock::new(Arc::new(index)),
            engine,
            strokes: StrokeManager::new(),
            student: RwLock::new(Trace::new(TraceRole::Student)),
            channels,
            feedback_tx,
            stroke_tx,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Swap in a new expert trace, rebuilding its index
    pub fn replace_expert(&self, expert: Trace) -> Result<(), SessionError> {
        let index = Arc::new(TraceIndex::build(&expert));
        let mut slot = self.write_expert().inspect_err(|err| {
            log_session_error(err, "replace_expert");
        })?;
        *slot = index;
        log::info!("Expert trace replaced ({} samples)", slot.len());
        Ok(())
    }

    /// Current expert index
    pub fn expert_index(&self) -> Result<Arc<TraceIndex>, SessionError> {
        Ok(Arc::clone(&*self.read_expert()?))
    }

    /// Open a stroke; returns its id
    pub fn begin_stroke(&self) -> Result<u64, SessionError> {
        self.strokes.begin_stroke()
    }

    /// Evaluate and record one live sample
    ///
    /// Feedback is computed for both configured channels, the sample and its
    /// pen state are appended to the open stroke, and the result is
    /// published to feedback subscribers. A channel whose thresholds are
    /// missing reports the error in its reading; the sample is still
    /// recorded.
    ///
    /// # Errors
    /// - StrokeNotOpen outside begin_stroke()/finish_stroke()
    /// - LockPoisoned on session state
    pub fn on_sample(&self, sample: Sample) -> Result<LiveFeedback, SessionError> {
        let started = Instant::now();
        let reference = self.expert_index().inspect_err(|err| {
            log_session_error(err, "on_sample");
            telemetry::hub().record_error(DiagnosticError::LockPoisoned, "expert_index");
        })?;

        let feedback = self.strokes.record_sample(sample, |stroke_id, previous| {
            let feedback = self
                .engine
                .evaluate(stroke_id, &reference, &sample, previous);
            let pen = feedback.pen;
            (feedback, pen)
        })?;

        // No subscribers is not an error
        let _ = self.feedback_tx.send(feedback.clone());

        let elapsed_ms = started.elapsed().as_secs_f32() * 1000.0;
        telemetry::hub().record_evaluation_latency(elapsed_ms);
        tracing::trace!(
            stroke_id = feedback.stroke_id,
            elapsed_ms,
            "sample evaluated"
        );

        Ok(feedback)
    }

    /// Close the open stroke and dry its ink
    ///
    /// Returns None when the stroke received no samples. The stroke is
    /// appended to the student trace and published to stroke subscribers.
    pub fn finish_stroke(&self) -> Result<Option<FinalizedStroke>, SessionError> {
        let fallback = pen_state(&self.config.feedback.visual_style, RatioResult::NEUTRAL);
        let Some(finalized) = self.strokes.finish_stroke(fallback)? else {
            return Ok(None);
        };

        self.write_student()
            .inspect_err(|err| {
                log_session_error(err, "finish_stroke");
                telemetry::hub().record_error(DiagnosticError::LockPoisoned, "student_trace");
            })?
            .push_stroke(finalized.stroke.clone());

        let _ = self.stroke_tx.send(finalized.clone());
        Ok(Some(finalized))
    }

    /// Id of the open stroke, if any
    pub fn open_stroke_id(&self) -> Result<Option<u64>, SessionError> {
        self.strokes.open_stroke_id()
    }

    /// Copy of everything the student has drawn so far
    pub fn student_trace(&self) -> Result<Trace, SessionError> {
        Ok(self.read_student()?.clone())
    }

    /// Forget the student's strokes, e.g. to retry the exercise
    pub fn clear_student(&self) -> Result<(), SessionError> {
        *self.write_student()? = Trace::new(TraceRole::Student);
        log::info!("Student trace cleared");
        Ok(())
    }

    /// Batched comparison of the student trace so far against the expert
    pub fn compare(&self, metric: ComparisonMetric) -> Result<BatchedComparison, ComparisonError> {
        let expert = self.expert_index()?;
        let student = TraceIndex::build(&*self.read_student()?);
        let comparator = BatchedComparator::new(
            self.config.thresholds.clone(),
            self.config.comparison.clone(),
        );
        comparator.compare(&expert, &student, metric)
    }

    /// Subscribe to per-sample feedback
    pub fn subscribe_feedback(&self) -> Option<broadcast::Receiver<LiveFeedback>> {
        self.channels.subscribe_feedback()
    }

    /// Subscribe to finalized strokes
    pub fn subscribe_strokes(&self) -> Option<broadcast::Receiver<FinalizedStroke>> {
        self.channels.subscribe_strokes()
    }

    // ========================================================================
    // LOCK HELPER METHODS
    // ========================================================================

    fn read_expert(&self) -> Result<RwLockReadGuard<'_, Arc<TraceIndex>>, SessionError> {
        self.expert.read().map_err(|_| SessionError::LockPoisoned {
            component: "expert_index".to_string(),
        })
    }

    fn write_expert(&self) -> Result<RwLockWriteGuard<'_, Arc<TraceIndex>>, SessionError> {
        self.expert.write().map_err(|_| SessionError::LockPoisoned {
            component: "expert_index".to_string(),
        })
    }

    fn read_student(&self) -> Result<RwLockReadGuard<'_, Trace>, SessionError> {
        self.student.read().map_err(|_| SessionError::LockPoisoned {
            component: "student_trace".to_string(),
        })
    }

    fn write_student(&self) -> Result<RwLockWriteGuard<'_, Trace>, SessionError> {
        self.student.write().map_err(|_| SessionError::LockPoisoned {
            component: "student_trace".to_string(),
        })
    }
}
