//! The log of tentative moves made during a pass and the choice of which of them to keep.

use crate::defs::Weight;

/// One selection step of a pass. Steps whose move would have broken the balance are still logged
/// (with `feasible == false`) so that the log has exactly one entry per cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRecord {
    pub cell: usize,
    pub from: usize,
    pub to: usize,
    /// gain of the move at the moment it was selected
    pub gain: Weight,
    pub feasible: bool,
}

impl MoveRecord {
    /// what the step changed the cut size by; skipped steps change nothing
    pub fn realized_gain(&self) -> Weight {
        if self.feasible {
            self.gain
        } else {
            0
        }
    }
}

/// The prefix of a pass worth committing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveSet {
    /// number of leading log entries to keep
    pub len: usize,
    /// total gain of those entries
    pub gain_sum: Weight,
}

/// Finds the shortest prefix of `gains` with the largest running sum. The empty prefix counts,
/// so the result is never negative.
pub fn best_prefix(gains: impl IntoIterator<Item = Weight>) -> MoveSet {
    let mut best = MoveSet {
        len: 0,
        gain_sum: 0,
    };
    let mut sum = 0;
    for (i, g) in gains.into_iter().enumerate() {
        sum += g;
        if sum > best.gain_sum {
            best = MoveSet {
                len: i + 1,
                gain_sum: sum,
            };
        }
    }
    best
}

pub fn find_move_set(mcells: &[MoveRecord]) -> MoveSet {
    best_prefix(mcells.iter().map(MoveRecord::realized_gain))
}
