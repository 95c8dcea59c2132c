// Error zones - contiguous deviating runs on the progress axis

use serde::{Deserialize, Serialize};

/// Half-open interval `[start, end)` of progress where the student deviated
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErrorZone {
    pub start: f64,
    pub end: f64,
}

impl ErrorZone {
    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    /// Whether `progress` lies inside the zone
    pub fn contains(&self, progress: f64) -> bool {
        progress >= self.start && progress < self.end
    }
}

/// Group deviating samples into zones
///
/// A zone opens at the progress of the first deviating sample of a run and
/// closes at the progress of the first neutral sample after it. A run still
/// open at the last sample closes at the last progress value. Zones whose
/// span is below `min_span` are dropped.
///
/// `progress` and `deviating` are parallel, in trace order; extra entries in
/// the longer slice are ignored.
pub fn detect_error_zones(progress: &[f64], deviating: &[bool], min_span: f64) -> Vec<ErrorZone> {
    let count = progress.len().min(deviating.len());
    let mut zones = Vec::new();
    let mut open: Option<f64> = None;

    for i in 0..count {
        match (open, deviating[i]) {
            (None, true) => open = Some(progress[i]),
            (Some(start), false) => {
                zones.push(ErrorZone {
                    start,
                    end: progress[i],
                });
                open = None;
            }
            _ => {}
        }
    }

    if let (Some(start), Some(&last)) = (open, progress[..count].last()) {
        zones.push(ErrorZone { start, end: last });
    }

    zones.retain(|zone| zone.span() >= min_span);
    zones
}

/// Flatten zones into the boundary list graphing collaborators consume
///
/// Even indices are starts, odd indices are ends.
pub fn zone_boundaries(zones: &[ErrorZone]) -> Vec<f64> {
    zones.iter().flat_map(|zone| [zone.start, zone.end]).collect()
}
