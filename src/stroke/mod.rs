//! Stroke handoff types
//!
//! The live path produces two entries per sample: a [`TimedSample`] for the
//! raw buffer and a [`RenderSegment`] for the render buffer. Finalization
//! drains both and assembles a [`FinalizedStroke`] whose segments line up
//! one-to-one with the persisted samples.

use serde::{Deserialize, Serialize};

use crate::feedback::PenState;
use crate::telemetry::{self, DiagnosticError};
use crate::trace::{Sample, Stroke};

pub mod buffer;

pub use buffer::{SampleBuffer, DEFAULT_STROKE_CAPACITY};

/// Raw sample tagged with its offset from the first sample of its stroke
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedSample {
    pub sample: Sample,
    pub stroke_offset_ms: f64,
}

/// The committed visual decision for one sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderSegment {
    pub sample: Sample,
    pub pen: PenState,
}

/// Trim a render snapshot down to `expected` entries
///
/// Excess entries are removed from the front so the most recent samples keep
/// their rendered state. Returns the trimmed snapshot and the number of
/// discarded entries. A snapshot that is already short is returned as is.
pub fn reconcile_cardinality<T>(mut segments: Vec<T>, expected: usize) -> (Vec<T>, usize) {
    let excess = segments.len().saturating_sub(expected);
    if excess > 0 {
        segments.drain(..excess);
    }
    (segments, excess)
}

/// A closed stroke with its private render snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizedStroke {
    pub stroke_id: u64,
    pub stroke: Stroke,
    segments: Vec<RenderSegment>,
    pub discarded_segments: usize,
}

impl FinalizedStroke {
    /// Pair a drained render snapshot with the persisted stroke
    ///
    /// Long snapshots lose their leading excess. Short snapshots are padded
    /// at the tail with the last known pen, or `fallback_pen` when the
    /// snapshot is empty. Either way the result has one segment per sample.
    pub fn assemble(
        stroke_id: u64,
        stroke: Stroke,
        snapshot: Vec<RenderSegment>,
        fallback_pen: PenState,
    ) -> Self {
        let expected = stroke.len();
        let (mut segments, discarded_segments) = reconcile_cardinality(snapshot, expected);

        if discarded_segments > 0 {
            log::debug!(
                "Stroke {}: discarded {} leading render segments",
                stroke_id,
                discarded_segments
            );
            telemetry::hub().record_error(
                DiagnosticError::CardinalityMismatch,
                format!("stroke {}: {} excess segments", stroke_id, discarded_segments),
            );
        }

        if segments.len() < expected {
            log::warn!(
                "Stroke {}: render snapshot has {} segments for {} samples, padding tail",
                stroke_id,
                segments.len(),
                expected
            );
            telemetry::hub().record_error(
                DiagnosticError::CardinalityMismatch,
                format!(
                    "stroke {}: {} segments for {} samples",
                    stroke_id,
                    segments.len(),
                    expected
                ),
            );
            let pen = segments.last().map(|s| s.pen).unwrap_or(fallback_pen);
            for sample in &stroke.samples()[segments.len()..] {
                segments.push(RenderSegment {
                    sample: *sample,
                    pen,
                });
            }
        }

        Self {
            stroke_id,
            stroke,
            segments,
            discarded_segments,
        }
    }

    pub fn segments(&self) -> &[RenderSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.stroke.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stroke.is_empty()
    }

    /// Replay `(sample, pen)` pairs in append order
    pub fn replay(&self) -> impl Iterator<Item = (Sample, PenState)> + '_ {
        self.stroke
            .samples()
            .iter()
            .zip(self.segments.iter())
            .map(|(sample, segment)| (*sample, segment.pen))
    }
}
