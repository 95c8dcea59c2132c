// BroadcastChannelManager: Centralized tokio broadcast channel management
// Single Responsibility: Broadcast channel lifecycle and subscription

use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast;

use crate::feedback::LiveFeedback;
use crate::stroke::FinalizedStroke;

/// Buffer for per-sample feedback (about two seconds of 240 Hz stylus input)
pub const FEEDBACK_CHANNEL_CAPACITY: usize = 512;

/// Buffer for finalized strokes
pub const STROKE_CHANNEL_CAPACITY: usize = 32;

/// Manages the session's tokio broadcast channels
///
/// Single Responsibility: Broadcast channel lifecycle and subscription
///
/// # Channel Types
/// - Feedback: one LiveFeedback per accepted sample, for wet-ink rendering and audio
/// - Strokes: one FinalizedStroke per closed stroke, for dry-ink replay
///
/// Lagging subscribers lose the oldest messages; the producer never blocks.
pub struct BroadcastChannelManager {
    feedback: Arc<Mutex<Option<broadcast::Sender<LiveFeedback>>>>,
    strokes: Arc<Mutex<Option<broadcast::Sender<FinalizedStroke>>>>,
}

impl BroadcastChannelManager {
    /// Create a new BroadcastChannelManager with all channels uninitialized
    ///
    /// Channels must be explicitly initialized via init_* methods before use.
    pub fn new() -> Self {
        Self {
            feedback: Arc::new(Mutex::new(None)),
            strokes: Arc::new(Mutex::new(None)),
        }
    }

    // ========================================================================
    // LIVE FEEDBACK CHANNEL
    // ========================================================================

    /// Initialize the live feedback channel
    ///
    /// Returns the sender the live path publishes on. Re-initializing
    /// replaces the sender; existing subscribers see the channel close.
    pub fn init_feedback(&self) -> broadcast::Sender<LiveFeedback> {
        let (tx, _) = broadcast::channel(FEEDBACK_CHANNEL_CAPACITY);
        *self
            .feedback
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(tx.clone());
        tx
    }

    /// Subscribe to live feedback
    ///
    /// Returns None if init_feedback() has not been called yet.
    pub fn subscribe_feedback(&self) -> Option<broadcast::Receiver<LiveFeedback>> {
        self.feedback
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|tx| tx.subscribe())
    }

    // ========================================================================
    // FINALIZED STROKE CHANNEL
    // ========================================================================

    /// Initialize the finalized stroke channel
    pub fn init_strokes(&self) -> broadcast::Sender<FinalizedStroke> {
        let (tx, _) = broadcast::channel(STROKE_CHANNEL_CAPACITY);
        *self
            .strokes
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(tx.clone());
        tx
    }

    /// Subscribe to finalized strokes
    ///
    /// Returns None if init_strokes() has not been called yet.
    pub fn subscribe_strokes(&self) -> Option<broadcast::Receiver<FinalizedStroke>> {
        self.strokes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|tx| tx.subscribe())
    }
}

impl Default for BroadcastChannelManager {
    fn default() -> Self {
        Self::new()
    }
}
