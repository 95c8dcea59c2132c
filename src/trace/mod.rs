//! Pen trace data model
//!
//! A `Trace` is the full recording of one role (expert or student) for an
//! exercise attempt: an ordered list of strokes, each an ordered, non-empty
//! list of pen samples. Samples are immutable once created.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod index;

pub use index::{ClosestSample, TraceIndex};

/// Position on the drawing surface
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    #[inline]
    pub fn distance_to(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// One input-device reading
///
/// `timestamp_ms` is a monotonic reading relative to the session epoch,
/// never wall-clock time. Tilt is absent on devices without tilt sensing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub position: Point,
    /// Normalized pen pressure in [0, 1]
    pub pressure: f64,
    /// Pen tilt angle in degrees
    #[serde(default)]
    pub tilt: Option<f64>,
    pub timestamp_ms: f64,
}

impl Sample {
    pub fn new(x: f64, y: f64, pressure: f64, timestamp_ms: f64) -> Self {
        Self {
            position: Point::new(x, y),
            pressure,
            tilt: None,
            timestamp_ms,
        }
    }

    pub fn with_tilt(mut self, tilt: f64) -> Self {
        self.tilt = Some(tilt);
        self
    }
}

/// Which side of the exercise a trace belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceRole {
    /// The reference trace being imitated
    Expert,
    /// The trace produced live and evaluated
    Student,
}

impl TraceRole {
    pub fn label(&self) -> &'static str {
        match self {
            TraceRole::Expert => "expert",
            TraceRole::Student => "student",
        }
    }
}

/// Returned when building a stroke from an empty sample list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyStroke;

impl fmt::Display for EmptyStroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a stroke must contain at least one sample")
    }
}

impl std::error::Error for EmptyStroke {}

/// One continuous pen-down-to-pen-up sample sequence (never empty)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Sample>", into = "Vec<Sample>")]
pub struct Stroke {
    samples: Vec<Sample>,
}

impl Stroke {
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> &Sample {
        &self.samples[0]
    }
}

impl TryFrom<Vec<Sample>> for Stroke {
    type Error = EmptyStroke;

    fn try_from(samples: Vec<Sample>) -> Result<Self, Self::Error> {
        if samples.is_empty() {
            Err(EmptyStroke)
        } else {
            Ok(Self { samples })
        }
    }
}

impl From<Stroke> for Vec<Sample> {
    fn from(stroke: Stroke) -> Self {
        stroke.samples
    }
}

/// Closed numeric range of a per-sample quantity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    /// Range over the finite values of an iterator; None when there are none
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some(ValueRange { min: v, max: v }),
                Some(r) => Some(ValueRange {
                    min: r.min.min(v),
                    max: r.max.max(v),
                }),
            })
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Smallest range covering both
    pub fn union(&self, other: &ValueRange) -> ValueRange {
        ValueRange {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

/// Full recording for one role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub role: TraceRole,
    #[serde(default)]
    pub strokes: Vec<Stroke>,
}

impl Trace {
    pub fn new(role: TraceRole) -> Self {
        Self {
            role,
            strokes: Vec::new(),
        }
    }

    pub fn with_strokes(role: TraceRole, strokes: Vec<Stroke>) -> Self {
        Self { role, strokes }
    }

    pub fn push_stroke(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
    }

    /// All samples in trace order, across stroke boundaries
    pub fn samples(&self) -> impl Iterator<Item = &Sample> {
        self.strokes.iter().flat_map(|stroke| stroke.samples().iter())
    }

    pub fn sample_count(&self) -> usize {
        self.strokes.iter().map(Stroke::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    /// Pressure extent; None for a trace without samples
    pub fn pressure_range(&self) -> Option<ValueRange> {
        ValueRange::from_values(self.samples().map(|s| s.pressure))
    }

    /// Tilt extent; None when no sample carries tilt data
    pub fn tilt_range(&self) -> Option<ValueRange> {
        ValueRange::from_values(self.samples().filter_map(|s| s.tilt))
    }
}
