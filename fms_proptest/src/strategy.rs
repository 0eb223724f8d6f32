use fastrand::Rng;

use crate::case::Case;
use crate::utils::{RetainIndexed, deletion_mapping};

pub trait Strategy {
    fn name(&self) -> &'static str;

    fn is_valid(&self, case: &Case) -> bool {
        let _ = case;
        true
    }

    /// one random application of the strategy, or `None` if it has nothing left to do
    fn apply(&self, case: &Case, rng: &mut Rng) -> Option<Case>;
}

pub mod strategies {
    use super::*;

    pub struct DeleteCells {
        /// inverse probability a cell will be deleted (i.e. `prob = 3` implies about a third of
        /// cells will be deleted)
        pub prob: usize,
    }

    impl Strategy for DeleteCells {
        fn name(&self) -> &'static str {
            "delete cells"
        }

        fn is_valid(&self, case: &Case) -> bool {
            self.prob >= 1 && case.graph.nocells() > 1
        }

        fn apply(&self, case: &Case, rng: &mut Rng) -> Option<Case> {
            let nocells = case.graph.nocells();
            let amount = nocells.div_ceil(self.prob).min(nocells - 1);
            let mut to_delete = rng.choose_multiple(0..nocells, amount);
            if to_delete.is_empty() {
                return None;
            }
            to_delete.sort_unstable();

            let m = deletion_mapping(nocells, &to_delete);
            let mut case = case.clone();
            let g = &mut case.graph;
            g.cwgt.retain_indexed(|c, _| m[c] != usize::MAX);
            for net in &mut g.netlist {
                net.retain(|&c| m[c] != usize::MAX);
                for c in net.iter_mut() {
                    *c = m[*c];
                }
            }
            let netlist = &g.netlist;
            g.nwgt.retain_indexed(|n, _| !netlist[n].is_empty());
            g.netlist.retain(|net| !net.is_empty());
            Some(case)
        }
    }

    pub struct DeleteNets {
        pub prob: usize,
    }

    impl Strategy for DeleteNets {
        fn name(&self) -> &'static str {
            "delete nets"
        }

        fn is_valid(&self, case: &Case) -> bool {
            self.prob >= 1 && case.graph.nonets() > 0
        }

        fn apply(&self, case: &Case, rng: &mut Rng) -> Option<Case> {
            let nonets = case.graph.nonets();
            let drop = rng.choose_multiple(0..nonets, nonets.div_ceil(self.prob));
            let mut keep = vec![true; nonets];
            for n in drop {
                keep[n] = false;
            }
            let mut case = case.clone();
            case.graph.nwgt.retain_indexed(|n, _| keep[n]);
            case.graph.netlist.retain_indexed(|n, _| keep[n]);
            Some(case)
        }
    }

    /// drop a single pin from a random net with more than one
    pub struct DeletePin;

    impl Strategy for DeletePin {
        fn name(&self) -> &'static str {
            "delete pin"
        }

        fn apply(&self, case: &Case, rng: &mut Rng) -> Option<Case> {
            let candidates: Vec<usize> = (0..case.graph.nonets())
                .filter(|&n| case.graph.netlist[n].len() > 1)
                .collect();
            let n = *candidates.get(rng.usize(..candidates.len().max(1)))?;
            let mut case = case.clone();
            let net = &mut case.graph.netlist[n];
            net.remove(rng.usize(..net.len()));
            Some(case)
        }
    }

    pub struct ReduceWeights {
        pub amt_percent: u32,
    }

    impl Strategy for ReduceWeights {
        fn name(&self) -> &'static str {
            "reduce weights"
        }

        fn is_valid(&self, case: &Case) -> bool {
            let g = &case.graph;
            g.cwgt.iter().chain(&g.nwgt).any(|&w| w > 1)
        }

        fn apply(&self, case: &Case, _rng: &mut Rng) -> Option<Case> {
            let mut case = case.clone();
            let g = &mut case.graph;
            for w in g.cwgt.iter_mut().chain(g.nwgt.iter_mut()) {
                *w = (*w * self.amt_percent as i64 / 100).max(1);
            }
            Some(case)
        }
    }

    pub struct ShrinkNparts;

    impl Strategy for ShrinkNparts {
        fn name(&self) -> &'static str {
            "shrink nparts"
        }

        fn is_valid(&self, case: &Case) -> bool {
            case.options.nparts > 2
        }

        fn apply(&self, case: &Case, _rng: &mut Rng) -> Option<Case> {
            let mut case = case.clone();
            case.options.nparts -= 1;
            Some(case)
        }
    }

    pub struct ShrinkNiter;

    impl Strategy for ShrinkNiter {
        fn name(&self) -> &'static str {
            "shrink niter"
        }

        fn is_valid(&self, case: &Case) -> bool {
            case.options.niter > 1
        }

        fn apply(&self, case: &Case, _rng: &mut Rng) -> Option<Case> {
            let mut case = case.clone();
            case.options.niter -= 1;
            Some(case)
        }
    }
}

#[cfg(test)]
mod tests {
    use fms::Options;

    use super::strategies::*;
    use super::*;
    use crate::case::RawGraph;

    fn case() -> Case {
        Case {
            graph: RawGraph {
                cwgt: vec![1, 2, 3, 4],
                nwgt: vec![5, 6],
                netlist: vec![vec![0, 1], vec![1, 2, 3]],
            },
            options: Options::new(3).with_seed(1),
        }
    }

    #[test]
    fn delete_cells_renumbers() {
        let mut rng = Rng::with_seed(0);
        for _ in 0..20 {
            let c = DeleteCells { prob: 2 }.apply(&case(), &mut rng).unwrap();
            let g = &c.graph;
            assert_eq!(g.nocells(), 2);
            assert_eq!(g.nwgt.len(), g.netlist.len());
            assert!(g.netlist.iter().flatten().all(|&p| p < 2));
            assert!(g.netlist.iter().all(|n| !n.is_empty()));
            assert!(g.build().is_ok());
        }
    }

    #[test]
    fn delete_nets_keeps_weights_aligned() {
        let mut rng = Rng::with_seed(0);
        let c = DeleteNets { prob: 2 }.apply(&case(), &mut rng).unwrap();
        assert_eq!(c.graph.nonets(), 1);
        let kept = if c.graph.netlist[0].len() == 2 { 5 } else { 6 };
        assert_eq!(c.graph.nwgt, [kept]);
    }

    #[test]
    fn small_steps() {
        let mut rng = Rng::with_seed(0);
        let c = ReduceWeights { amt_percent: 50 }.apply(&case(), &mut rng).unwrap();
        assert_eq!(c.graph.cwgt, [1, 1, 1, 2]);
        assert_eq!(c.graph.nwgt, [2, 3]);

        let c = ShrinkNparts.apply(&case(), &mut rng).unwrap();
        assert_eq!(c.options.nparts, 2);
        assert!(!ShrinkNparts.is_valid(&c));

        let c = DeletePin.apply(&case(), &mut rng).unwrap();
        assert_eq!(c.graph.nopins(), 4);
    }
}
