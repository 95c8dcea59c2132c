//! TraceIndex - arc-length index and closest-sample search over a trace
//!
//! The index flattens a trace into trace order and precomputes, for every
//! sample, the cumulative Euclidean arc length from the start of the trace
//! and the pen speed at that sample. Pen-up travel between strokes does not
//! count towards arc length.
//!
//! Closest-sample queries run once per live input sample, so the search is
//! bounded by a square window around the query point before any distance is
//! computed. A linear scan behind that window is fast enough for traces of a
//! few thousand samples; the query contract does not depend on the scan
//! strategy.

use super::{Point, Sample, Trace, TraceRole};

/// Result of a closest-sample query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestSample {
    /// Position of the sample in trace order
    pub index: usize,
    pub sample: Sample,
    pub distance: f64,
}

/// Read-only derived view over a trace
///
/// Rebuilt whenever the underlying trace is replaced; never mutated.
#[derive(Debug, Clone)]
pub struct TraceIndex {
    role: TraceRole,
    samples: Vec<Sample>,
    stroke_starts: Vec<bool>,
    lengths: Vec<f64>,
    speeds: Vec<f64>,
}

impl TraceIndex {
    /// Build the index for a trace
    ///
    /// # Performance
    /// - Time complexity: O(n) in the number of samples
    pub fn build(trace: &Trace) -> Self {
        let capacity = trace.sample_count();
        let mut samples = Vec::with_capacity(capacity);
        let mut stroke_starts = Vec::with_capacity(capacity);
        let mut lengths = Vec::with_capacity(capacity);
        let mut speeds = Vec::with_capacity(capacity);

        let mut total = 0.0;
        for stroke in &trace.strokes {
            let first_speed_slot = speeds.len();
            let mut previous: Option<&Sample> = None;

            for sample in stroke.samples() {
                let speed = match previous {
                    Some(prev) => {
                        let step = prev.position.distance_to(&sample.position);
                        total += step;
                        segment_speed(prev, sample)
                            .unwrap_or_else(|| speeds.last().copied().unwrap_or(0.0))
                    }
                    None => 0.0,
                };

                samples.push(*sample);
                stroke_starts.push(previous.is_none());
                lengths.push(total);
                speeds.push(speed);
                previous = Some(sample);
            }

            // A stroke's first sample takes the speed of its first segment
            if speeds.len() > first_speed_slot + 1 {
                speeds[first_speed_slot] = speeds[first_speed_slot + 1];
            }
        }

        Self {
            role: trace.role,
            samples,
            stroke_starts,
            lengths,
            speeds,
        }
    }

    pub fn role(&self) -> TraceRole {
        self.role
    }

    /// Samples in trace order
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Cumulative arc length per sample (same cardinality as `samples`)
    pub fn lengths(&self) -> &[f64] {
        &self.lengths
    }

    /// Pen speed per sample in units per second
    pub fn speeds(&self) -> &[f64] {
        &self.speeds
    }

    pub fn total_length(&self) -> f64 {
        self.lengths.last().copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn speed_at(&self, index: usize) -> Option<f64> {
        self.speeds.get(index).copied()
    }

    /// The sample before `index` within the same stroke
    pub fn previous_in_stroke(&self, index: usize) -> Option<&Sample> {
        if index == 0 || index >= self.samples.len() || self.stroke_starts[index] {
            None
        } else {
            self.samples.get(index - 1)
        }
    }

    /// Find the sample nearest to `point` within a circle of diameter
    /// `search_diameter` centered on it
    ///
    /// Returns `None` when nothing lies in range; callers treat that as
    /// maximum deviation rather than an error. On equal distance the sample
    /// met first in trace order wins.
    ///
    /// # Performance
    /// - Samples outside the bounding square are rejected with two
    ///   comparisons each, before any distance is computed
    pub fn closest_sample(&self, point: Point, search_diameter: f64) -> Option<ClosestSample> {
        let radius = search_diameter / 2.0;
        if !(radius >= 0.0) || !point.x.is_finite() || !point.y.is_finite() {
            return None;
        }

        let mut best: Option<ClosestSample> = None;
        for (index, sample) in self.samples.iter().enumerate() {
            let dx = (sample.position.x - point.x).abs();
            let dy = (sample.position.y - point.y).abs();
            if dx > radius || dy > radius {
                continue;
            }

            let distance = dx.hypot(dy);
            if distance > radius {
                continue;
            }

            let closer = best.map_or(true, |b| distance < b.distance);
            if closer {
                best = Some(ClosestSample {
                    index,
                    sample: *sample,
                    distance,
                });
            }
        }

        best
    }
}

/// Speed between two consecutive samples, None when no time elapsed
fn segment_speed(from: &Sample, to: &Sample) -> Option<f64> {
    let dt_ms = to.timestamp_ms - from.timestamp_ms;
    if dt_ms > 0.0 {
        Some(from.position.distance_to(&to.position) / (dt_ms / 1000.0))
    } else {
        None
    }
}

/// Live pen speed from the previous sample of the same stroke
pub fn live_speed(previous: &Sample, current: &Sample) -> Option<f64> {
    segment_speed(previous, current)
}
