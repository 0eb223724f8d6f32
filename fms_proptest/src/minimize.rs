use std::time::{Duration, Instant};

use fastrand::Rng;

use crate::case::Case;
use crate::strategy::Strategy;

pub struct MinimizationSet {
    strats: Vec<Box<dyn Strategy>>,
    rng: Rng,
}

impl MinimizationSet {
    pub fn new(rng: Rng) -> Self {
        Self {
            strats: Vec::new(),
            rng,
        }
    }

    pub fn push(&mut self, strat: impl Strategy + 'static) {
        self.strats.push(Box::new(strat));
    }

    /// Greedily shrinks a failing case. A candidate replaces the current best when it still fails
    /// and is cheaper. Stops once `budget` is spent or a full round over every strategy found
    /// nothing `patience` times in a row.
    pub fn minimize(&mut self, case: Case, budget: Duration, patience: usize) -> Case {
        debug_assert!(case.run().is_fail());
        let start = Instant::now();
        let mut best = case;
        let mut stale = 0;
        while stale < patience && start.elapsed() < budget {
            let mut improved = false;
            for s in &self.strats {
                if !s.is_valid(&best) {
                    continue;
                }
                let Some(cand) = s.apply(&best, &mut self.rng) else {
                    continue;
                };
                if cand.cost() < best.cost() && cand.run().is_fail() {
                    clilog::info!(
                        "{}: {} cells, {} nets, {} pins, k = {}",
                        s.name(),
                        cand.graph.nocells(),
                        cand.graph.nonets(),
                        cand.graph.nopins(),
                        cand.options.nparts
                    );
                    best = cand;
                    improved = true;
                }
            }
            if improved {
                stale = 0;
            } else {
                stale += 1;
            }
        }
        best
    }
}
