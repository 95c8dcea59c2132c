// StrokeManager: Focused manager for the live stroke handoff
//
// Single Responsibility: Stroke lifecycle and the raw/render sample buffers
// Owns the two SampleBuffer instances that used to be process-wide state

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{log_session_error, SessionError};
use crate::feedback::PenState;
use crate::stroke::{
    FinalizedStroke, RenderSegment, SampleBuffer, TimedSample, DEFAULT_STROKE_CAPACITY,
};
use crate::telemetry;
use crate::trace::{Sample, Stroke};

const RAW_CHANNEL: &str = "raw";
const RENDER_CHANNEL: &str = "render";

/// Bookkeeping for the stroke currently open
#[derive(Debug)]
struct OpenStroke {
    stroke_id: u64,
    /// Timestamp of the first accepted sample
    origin_ms: OnceLock<f64>,
}

/// Manages the open stroke and its buffers
///
/// Single Responsibility: Stroke lifecycle and sample handoff
///
/// This manager handles:
/// - Assigning stroke ids on begin
/// - Appending raw samples and render segments from the live path
/// - Draining both buffers on finish and assembling the FinalizedStroke
///
/// The live path holds a shared guard on the stroke state while it evaluates
/// and appends; finish takes the exclusive guard, so every sample accepted
/// for a stroke is in the buffers before that stroke drains.
///
/// # Example
/// ```ignore
/// let manager = StrokeManager::new();
/// let id = manager.begin_stroke()?;
/// manager.record_sample(sample, |_, _| ((), pen))?;
/// let finalized = manager.finish_stroke(pen)?;
/// ```
pub struct StrokeManager {
    raw: SampleBuffer<TimedSample>,
    render: SampleBuffer<RenderSegment>,
    open: RwLock<Option<OpenStroke>>,
    next_stroke_id: AtomicU64,
}

impl StrokeManager {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_STROKE_CAPACITY)
    }

    /// Create a manager whose buffers start each stroke with `capacity_hint`
    pub fn with_capacity(capacity_hint: usize) -> Self {
        Self {
            raw: SampleBuffer::new(RAW_CHANNEL, capacity_hint),
            render: SampleBuffer::new(RENDER_CHANNEL, capacity_hint),
            open: RwLock::new(None),
            next_stroke_id: AtomicU64::new(1),
        }
    }

    /// Open a new stroke
    ///
    /// # Errors
    /// - StrokeAlreadyOpen if the previous stroke was never finished
    /// - LockPoisoned on the stroke state
    pub fn begin_stroke(&self) -> Result<u64, SessionError> {
        let mut open = self.write_open()?;

        if let Some(current) = open.as_ref() {
            let err = SessionError::StrokeAlreadyOpen {
                stroke_id: current.stroke_id,
            };
            log_session_error(&err, "begin_stroke");
            return Err(err);
        }

        let stroke_id = self.next_stroke_id.fetch_add(1, Ordering::Relaxed);
        *open = Some(OpenStroke {
            stroke_id,
            origin_ms: OnceLock::new(),
        });
        log::debug!("Stroke {} opened", stroke_id);
        Ok(stroke_id)
    }

    /// Accept one live sample into the open stroke
    ///
    /// `evaluate` receives the stroke id and the previous sample of this
    /// stroke and returns its own output plus the pen committed for the
    /// sample. The raw sample is appended before its render segment.
    ///
    /// # Errors
    /// - StrokeNotOpen if no stroke is open
    /// - LockPoisoned on the stroke state or either buffer
    pub fn record_sample<R, F>(&self, sample: Sample, evaluate: F) -> Result<R, SessionError>
    where
        F: FnOnce(u64, Option<&Sample>) -> (R, PenState),
    {
        let open = self.read_open()?;
        let Some(current) = open.as_ref() else {
            let err = SessionError::StrokeNotOpen;
            log_session_error(&err, "on_sample");
            return Err(err);
        };

        let previous = self.raw.last()?.map(|timed| timed.sample);
        let (output, pen) = evaluate(current.stroke_id, previous.as_ref());

        let origin = *current.origin_ms.get_or_init(|| sample.timestamp_ms);
        let raw_len = self.raw.append(TimedSample {
            sample,
            stroke_offset_ms: sample.timestamp_ms - origin,
        })?;
        let render_len = self.render.append(RenderSegment { sample, pen })?;

        let hub = telemetry::hub();
        hub.record_buffer_occupancy(self.raw.name(), raw_len);
        hub.record_buffer_occupancy(self.render.name(), render_len);

        Ok(output)
    }

    /// Close the open stroke and take its samples
    ///
    /// Drains the render buffer, then the raw buffer, each in its own
    /// snapshot-and-clear. Returns None when the stroke received no samples.
    ///
    /// # Errors
    /// - StrokeNotOpen if no stroke is open
    /// - LockPoisoned on the stroke state or either buffer
    pub fn finish_stroke(
        &self,
        fallback_pen: PenState,
    ) -> Result<Option<FinalizedStroke>, SessionError> {
        let mut open = self.write_open()?;
        let Some(current) = open.take() else {
            let err = SessionError::StrokeNotOpen;
            log_session_error(&err, "finish_stroke");
            return Err(err);
        };

        let segments = self.render.drain().inspect_err(|err| {
            log_session_error(err, "finish_stroke");
        })?;
        let raw = self.raw.drain().inspect_err(|err| {
            log_session_error(err, "finish_stroke");
        })?;
        drop(open);

        let hub = telemetry::hub();
        hub.record_buffer_occupancy(self.raw.name(), 0);
        hub.record_buffer_occupancy(self.render.name(), 0);

        let samples: Vec<Sample> = raw.into_iter().map(|timed| timed.sample).collect();
        let Ok(stroke) = Stroke::try_from(samples) else {
            log::debug!("Stroke {} closed without samples", current.stroke_id);
            return Ok(None);
        };

        let finalized = FinalizedStroke::assemble(current.stroke_id, stroke, segments, fallback_pen);
        hub.record_stroke_finalized(
            finalized.stroke_id,
            finalized.len(),
            finalized.discarded_segments,
        );
        log::info!(
            "Stroke {} finalized with {} samples",
            finalized.stroke_id,
            finalized.len()
        );
        Ok(Some(finalized))
    }

    /// Id of the open stroke, if any
    pub fn open_stroke_id(&self) -> Result<Option<u64>, SessionError> {
        Ok(self.read_open()?.as_ref().map(|current| current.stroke_id))
    }

    /// Samples buffered for the open stroke
    pub fn buffered_len(&self) -> usize {
        self.raw.len()
    }

    // ========================================================================
    // HELPER METHODS - Lock management
    // ========================================================================

    fn read_open(&self) -> Result<RwLockReadGuard<'_, Option<OpenStroke>>, SessionError> {
        self.open.read().map_err(|_| SessionError::LockPoisoned {
            component: "stroke_state".to_string(),
        })
    }

    fn write_open(&self) -> Result<RwLockWriteGuard<'_, Option<OpenStroke>>, SessionError> {
        self.open.write().map_err(|_| SessionError::LockPoisoned {
            component: "stroke_state".to_string(),
        })
    }
}

impl Default for StrokeManager {
    fn default() -> Self {
        Self::new()
    }
}
