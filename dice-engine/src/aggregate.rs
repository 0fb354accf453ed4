//! Roll-level statistics, recomputed only for rolls the pipeline changed.
use crate::numbers::mean;
use crate::outcome::RollOutcome;
use crate::pipeline::RollTrace;

/// Statistics over the faces of one roll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollStats {
    pub sum: i64,
    pub average: f64,
    pub median: f64,
    pub spread: i32,
}

impl RollStats {
    /// Statistics for `faces`; every field is zero for an empty slice.
    #[must_use]
    pub fn from_faces(faces: &[i32]) -> Self {
        let sum: i64 = faces.iter().copied().map(i64::from).sum();
        let mut sorted = faces.to_vec();
        sorted.sort_unstable();
        let median = match sorted.len() {
            0 => 0.0,
            len if len % 2 == 1 => f64::from(sorted[len / 2]),
            len => (f64::from(sorted[len / 2 - 1]) + f64::from(sorted[len / 2])) / 2.0,
        };
        let spread = match (sorted.first(), sorted.last()) {
            (Some(lo), Some(hi)) => hi.saturating_sub(*lo),
            _ => 0,
        };
        Self {
            sum,
            average: mean(sum, faces.len()),
            median,
            spread,
        }
    }
}

/// Recompute `sum`, `used`, `average`, `median` and `spread` from the final
/// die values when `changed`; otherwise leave the service's values alone.
///
/// Returns whether the roll was recomputed.
pub fn aggregate(roll: &mut RollOutcome, changed: bool) -> bool {
    if !changed {
        return false;
    }
    roll.used = roll.finals();
    let stats = RollStats::from_faces(&roll.used);
    roll.sum = stats.sum;
    roll.average = stats.average;
    roll.median = Some(stats.median);
    roll.spread = Some(stats.spread);
    true
}

/// Apply [`aggregate`] to every roll using the pipeline's change flags.
///
/// Rolls without a matching trace are treated as unchanged.
pub fn aggregate_all(rolls: &mut [RollOutcome], traces: &[RollTrace]) -> usize {
    let mut recomputed = 0;
    for (idx, roll) in rolls.iter_mut().enumerate() {
        let changed = traces.get(idx).is_some_and(|trace| trace.changed);
        if aggregate(roll, changed) {
            recomputed += 1;
        }
    }
    recomputed
}
