//! Direct k-way partitioning by Fiduccia-Mattheyses passes with cell locking (Sanchis).
//!
//! A pass tentatively moves every cell exactly once, always taking the highest-gain move the
//! balance bounds allow, then keeps only the prefix of those moves with the best total gain.
//! Moves with negative gain are taken too; they are what lets a pass climb out of a local
//! minimum. Tentative moves only touch a pass-local copy of the partition, the caller's
//! [`Partition`] changes only when a prefix is committed.

use fastrand::Rng;

use crate::buckets::Buckets;
use crate::defs::Weight;
use crate::error::{Error, Result};
use crate::gains::GainTable;
use crate::graph::Hypergraph;
use crate::moves::{find_move_set, MoveRecord, MoveSet};
use crate::options::Options;
use crate::partition::Partition;
use crate::util::randomize;

/// The move chosen by one selection step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectedCell {
    pub cell: usize,
    pub from: usize,
    pub to: usize,
    pub gain: Weight,
    /// false if no move respected the balance bounds and this one was picked regardless; such a
    /// cell is locked but stays where it is
    pub feasible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassStats {
    /// 1-based pass number
    pub pass: usize,
    pub gain_sum: Weight,
    /// number of log entries in the committed prefix
    pub prefix_len: usize,
    /// selection steps taken, one per cell
    pub steps: usize,
    /// moves actually applied
    pub committed: usize,
    /// steps where no balanced move existed
    pub skipped: usize,
    /// cut size after the pass
    pub cutsize: Weight,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub initial_cut: Weight,
    pub final_cut: Weight,
    pub passes: Vec<PassStats>,
}

/// Pass-local copy of the partition
struct Scratch {
    chrom: Vec<usize>,
    sizes: Vec<Weight>,
    pmin: Vec<Weight>,
    pmax: Vec<Weight>,
    locked: Vec<bool>,
}

impl Scratch {
    #[inline]
    fn is_feasible(&self, weight: Weight, from: usize, to: usize) -> bool {
        self.sizes[to] + weight <= self.pmax[to] && self.sizes[from] - weight >= self.pmin[from]
    }
}

/// Owns every pass-scoped structure. They are sized once here and rebuilt in place by each
/// pass.
pub struct Refiner<'g> {
    graph: &'g Hypergraph,
    noparts: usize,
    gains: GainTable,
    buckets: Buckets,
    scratch: Scratch,
    /// moves of the current (or last) pass, one per cell
    mcells: Vec<MoveRecord>,
    npasses: usize,
}

impl<'g> Refiner<'g> {
    pub fn new(graph: &'g Hypergraph, noparts: usize) -> Result<Self> {
        if noparts < 2 {
            return Err(Error::InvalidPartCount(noparts));
        }
        let nocells = graph.nocells();
        Ok(Self {
            graph,
            noparts,
            gains: GainTable::new(graph, noparts),
            buckets: Buckets::init_buckets(nocells, noparts, graph.max_gain()),
            scratch: Scratch {
                chrom: vec![0; nocells],
                sizes: vec![0; noparts],
                pmin: vec![0; noparts],
                pmax: vec![0; noparts],
                locked: vec![false; nocells],
            },
            mcells: Vec::with_capacity(nocells),
            npasses: 0,
        })
    }

    /// the move log of the last pass
    pub fn move_log(&self) -> &[MoveRecord] {
        &self.mcells
    }

    pub fn passes(&self) -> usize {
        self.npasses
    }

    fn copy_partition(&mut self, partition: &Partition) {
        let s = &mut self.scratch;
        s.chrom.copy_from_slice(partition.assignment());
        for (i, info) in partition.parts().iter().enumerate() {
            s.sizes[i] = info.pcurr_size;
            s.pmin[i] = info.pmin_size;
            s.pmax[i] = info.pmax_size;
        }
        s.locked.fill(false);
    }

    /// Picks the best move that keeps both partitions within bounds, or failing that the best
    /// move outright. `None` only once every cell is locked.
    fn select_cell(&self) -> Option<SelectedCell> {
        let s = &self.scratch;
        let graph = self.graph;
        let min_cweight = graph.stats().min_cweight;

        let balanced = self.buckets.select_max(
            |from, to| s.is_feasible(min_cweight, from, to),
            |cell, from, to| s.is_feasible(graph.cell_weight(cell), from, to),
        );
        if let Some(c) = balanced {
            return Some(SelectedCell {
                cell: c.cell,
                from: c.from,
                to: c.to,
                gain: c.gain,
                feasible: true,
            });
        }

        self.buckets
            .select_max(|_, _| true, |_, _, _| true)
            .map(|c| SelectedCell {
                cell: c.cell,
                from: c.from,
                to: c.to,
                gain: c.gain,
                feasible: false,
            })
    }

    /// Applies a move to the scratch partition and propagates the gain changes.
    fn move_cell(&mut self, sel: &SelectedCell) {
        let w = self.graph.cell_weight(sel.cell);
        let s = &mut self.scratch;
        s.chrom[sel.cell] = sel.to;
        s.sizes[sel.from] -= w;
        s.sizes[sel.to] += w;

        self.gains.update_gains(
            self.graph,
            &self.scratch.chrom,
            &self.scratch.locked,
            sel.cell,
            sel.from,
            sel.to,
        );
        for &d in self.gains.touched() {
            self.buckets
                .reposition(d, self.scratch.chrom[d], &self.gains);
        }
    }

    /// Runs one pass and commits its best prefix to `partition` if that prefix improves the cut.
    /// `cutsize` must be the current cut size of `partition`; it is lowered by whatever the pass
    /// gains.
    pub fn pass(&mut self, partition: &mut Partition, cutsize: &mut Weight) -> PassStats {
        assert_eq!(partition.noparts(), self.noparts);
        let graph = self.graph;
        let nocells = graph.nocells();
        self.npasses += 1;

        self.copy_partition(partition);
        self.gains.compute_gains(graph, &self.scratch.chrom);
        self.buckets.create_buckets(&self.scratch.chrom, &self.gains);
        self.mcells.clear();
        debug_assert!(crate::debug::check_buckets(
            &self.buckets,
            &self.scratch.chrom,
            &self.scratch.locked,
            &self.gains
        ));

        let mut skipped = 0;
        for _ in 0..nocells {
            let Some(sel) = self.select_cell() else {
                break;
            };

            self.buckets.delete_partb_nodes_of_cell(sel.cell, sel.from);
            self.scratch.locked[sel.cell] = true;
            if sel.feasible {
                self.move_cell(&sel);
            } else {
                skipped += 1;
            }

            clilog::trace!(
                "{} cell {} {} -> {} gain {}",
                if sel.feasible { "moved" } else { "locked" },
                sel.cell,
                sel.from,
                sel.to,
                sel.gain
            );
            self.mcells.push(MoveRecord {
                cell: sel.cell,
                from: sel.from,
                to: sel.to,
                gain: sel.gain,
                feasible: sel.feasible,
            });
        }
        debug_assert_eq!(self.mcells.len(), nocells);
        debug_assert!(self.scratch.locked.iter().all(|&l| l));

        let MoveSet { len, gain_sum } = find_move_set(&self.mcells);
        let mut committed = 0;
        if gain_sum > 0 {
            let prefix = &self.mcells[..len];
            *cutsize -= move_cells(graph, partition, prefix);
            committed = prefix.iter().filter(|m| m.feasible).count();
        }
        debug_assert!(partition.is_balanced());
        debug_assert_eq!(*cutsize, partition.cut_size(graph));

        let stats = PassStats {
            pass: self.npasses,
            gain_sum,
            prefix_len: len,
            steps: self.mcells.len(),
            committed,
            skipped,
            cutsize: *cutsize,
        };
        clilog::debug!(
            "pass {}: gain_sum = {}, kept {} of {} steps ({} moves), {} skipped, cutsize = {}",
            stats.pass,
            gain_sum,
            len,
            stats.steps,
            committed,
            skipped,
            stats.cutsize
        );
        stats
    }

    /// Repeats passes while they improve the cut, the cut is not zero yet, and fewer than
    /// `niter` passes have run.
    pub fn run(&mut self, partition: &mut Partition, niter: usize) -> RunStats {
        let initial_cut = partition.cut_size(self.graph);
        let mut cutsize = initial_cut;
        let mut passes = Vec::new();

        let timer = clilog::stimer!("fm passes");
        while passes.len() < niter {
            let stats = self.pass(partition, &mut cutsize);
            passes.push(stats);
            if stats.gain_sum <= 0 || cutsize <= 0 {
                break;
            }
        }
        clilog::finish!(timer);

        RunStats {
            initial_cut,
            final_cut: cutsize,
            passes,
        }
    }
}

/// Applies the feasible moves of `moves` to `partition`, in order, and returns the cut size they
/// remove.
pub fn move_cells(graph: &Hypergraph, partition: &mut Partition, moves: &[MoveRecord]) -> Weight {
    let mut cut_gain = 0;
    for m in moves.iter().filter(|m| m.feasible) {
        debug_assert_eq!(partition.part_of(m.cell), m.from);
        partition.move_cell(m.cell, m.to, graph.cell_weight(m.cell));
        cut_gain += m.gain;
    }
    cut_gain
}

/// Result of [`partition`]
#[derive(Debug, Clone)]
pub struct Outcome {
    pub seed: u64,
    pub partition: Partition,
    pub stats: RunStats,
}

/// Partitions `graph` from a random balanced start.
pub fn partition(graph: &Hypergraph, options: &Options) -> Result<Outcome> {
    let seed = randomize(options.seed);
    let mut rng = Rng::with_seed(seed);
    let mut partition =
        Partition::create_partition(graph, options.nparts, options.ufactor, &mut rng)?;
    clilog::debug!(
        "initial partition: {:?}",
        partition
            .parts()
            .iter()
            .map(|p| p.pcurr_size)
            .collect::<Vec<_>>()
    );

    let mut refiner = Refiner::new(graph, options.nparts)?;
    let stats = refiner.run(&mut partition, options.niter);
    Ok(Outcome {
        seed,
        partition,
        stats,
    })
}
