//! Per-cell gain vectors for k-way moves
//!
//! `gain[c][q]` is the decrease of the cut size if `c` moved from its partition to `q`. Alongside
//! the gains we keep, for every net, how many of its pins sit in each partition. That
//! distribution is all that is needed to evaluate a net's contribution, so after a move only the
//! nets of the moved cell have to be looked at.

use crate::defs::Weight;
use crate::graph::Hypergraph;

/// Contribution of one net of weight `w` with `size` pins to the gain of moving one of its pins
/// out of a partition holding `from_cnt` of them into one holding `to_cnt`.
#[inline]
pub fn net_gain(size: u32, from_cnt: u32, to_cnt: u32, w: Weight) -> Weight {
    if size > 1 && from_cnt == 1 && to_cnt + 1 == size {
        // last pin outside `to` leaves
        w
    } else if from_cnt == size && size > 1 {
        // net was entirely inside `from`
        -w
    } else {
        0
    }
}

pub struct GainTable {
    noparts: usize,
    /// `nocells * noparts`, the entry of a cell's own partition stays 0
    mgain: Vec<Weight>,
    /// `nonets * noparts` pin counts
    dist: Vec<u32>,
    /// copy of one `dist` row from before the current move
    row: Vec<u32>,
    /// cells whose gains changed during the last [`GainTable::update_gains`], in first-touch order
    touched: Vec<usize>,
    is_touched: Vec<bool>,
}

impl GainTable {
    pub fn new(graph: &Hypergraph, noparts: usize) -> Self {
        Self {
            noparts,
            mgain: vec![0; graph.nocells() * noparts],
            dist: vec![0; graph.nonets() * noparts],
            row: vec![0; noparts],
            touched: Vec::new(),
            is_touched: vec![false; graph.nocells()],
        }
    }

    pub fn noparts(&self) -> usize {
        self.noparts
    }

    pub fn gain(&self, cell: usize, to: usize) -> Weight {
        self.mgain[cell * self.noparts + to]
    }

    /// number of pins of `net` currently in `part`
    pub fn pins_in(&self, net: usize, part: usize) -> u32 {
        self.dist[net * self.noparts + part]
    }

    pub fn touched(&self) -> &[usize] {
        &self.touched
    }

    /// Computes the pin distribution of every net and every gain from scratch.
    pub fn compute_gains(&mut self, graph: &Hypergraph, chrom: &[usize]) {
        let k = self.noparts;
        self.dist.fill(0);
        for (n, pins) in graph.netlist().enumerate() {
            for &c in pins {
                self.dist[n * k + chrom[c]] += 1;
            }
        }

        self.mgain.fill(0);
        for c in 0..graph.nocells() {
            let from = chrom[c];
            for &n in graph.nets_of(c) {
                let size = graph.pins(n).len() as u32;
                let w = graph.net_weight(n);
                let drow = &self.dist[n * k..(n + 1) * k];
                let from_cnt = drow[from];
                for to in (0..k).filter(|&to| to != from) {
                    self.mgain[c * k + to] += net_gain(size, from_cnt, drow[to], w);
                }
            }
        }
    }

    /// Records that `cell` moved from `from` to `to` (already reflected in `chrom`) and adjusts
    /// the gains of the unlocked cells sharing a net with it. Only the difference each affected
    /// net makes is applied; nothing is recomputed from scratch.
    ///
    /// The cells whose gains changed are available from [`GainTable::touched`] afterwards.
    pub fn update_gains(
        &mut self,
        graph: &Hypergraph,
        chrom: &[usize],
        locked: &[bool],
        cell: usize,
        from: usize,
        to: usize,
    ) {
        let k = self.noparts;
        for &c in &self.touched {
            self.is_touched[c] = false;
        }
        self.touched.clear();

        for &n in graph.nets_of(cell) {
            let pins = graph.pins(n);
            let size = pins.len() as u32;
            let w = graph.net_weight(n);

            self.row.copy_from_slice(&self.dist[n * k..(n + 1) * k]);
            self.dist[n * k + from] -= 1;
            self.dist[n * k + to] += 1;
            if size == 1 {
                continue;
            }

            let new = &self.dist[n * k..(n + 1) * k];
            for &d in pins {
                if d == cell || locked[d] {
                    continue;
                }
                let pd = chrom[d];
                let mut changed = false;
                for r in (0..k).filter(|&r| r != pd) {
                    let before = net_gain(size, self.row[pd], self.row[r], w);
                    let after = net_gain(size, new[pd], new[r], w);
                    if before != after {
                        self.mgain[d * k + r] += after - before;
                        changed = true;
                    }
                }
                if changed && !self.is_touched[d] {
                    self.is_touched[d] = true;
                    self.touched.push(d);
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use fastrand::Rng;

    use super::*;
    use crate::debug::{brute_force_gain, check_gains};

    fn random_graph(rng: &mut Rng, nocells: usize, nonets: usize) -> Hypergraph {
        let cwgt = (0..nocells).map(|_| rng.i64(1..4)).collect();
        let nwgt = (0..nonets).map(|_| rng.i64(1..5)).collect();
        let netlist = (0..nonets)
            .map(|_| {
                let size = rng.usize(1..6.min(nocells + 1));
                rng.choose_multiple(0..nocells, size)
            })
            .collect();
        Hypergraph::new(cwgt, nwgt, netlist).unwrap()
    }

    #[test]
    fn net_gain_cases() {
        // 2-pin net split 1/1: moving either pin uncuts it
        assert_eq!(net_gain(2, 1, 1, 3), 3);
        // 3-pin net entirely in `from`
        assert_eq!(net_gain(3, 3, 0, 2), -2);
        // 3-pin net split 2/1: moving one of the two doesn't change anything
        assert_eq!(net_gain(3, 2, 1, 2), 0);
        // 3-pin net over three partitions: stays cut
        assert_eq!(net_gain(3, 1, 1, 2), 0);
        // single pin nets never count
        assert_eq!(net_gain(1, 1, 0, 5), 0);
    }

    #[test]
    fn example_gains() {
        let g = Hypergraph::new(vec![1; 4], vec![1, 2], vec![vec![0, 1], vec![1, 2, 3]]).unwrap();
        let chrom = [0, 0, 1, 1];
        let mut gt = GainTable::new(&g, 2);
        gt.compute_gains(&g, &chrom);
        assert_eq!(gt.gain(0, 1), -1);
        assert_eq!(gt.gain(1, 1), 1);
        assert_eq!(gt.gain(2, 0), 0);
        assert_eq!(gt.gain(3, 0), 0);
        assert_eq!(gt.pins_in(1, 0), 1);
        assert_eq!(gt.pins_in(1, 1), 2);
    }

    #[test]
    fn single_pin_net_never_counts() {
        let g = Hypergraph::new(
            vec![1; 4],
            vec![1, 2, 5],
            vec![vec![0, 1], vec![1, 2, 3], vec![0]],
        )
        .unwrap();
        let chrom = [0, 1, 1, 1];
        let mut gt = GainTable::new(&g, 2);
        gt.compute_gains(&g, &chrom);
        assert_eq!(gt.gain(0, 1), 1);
        assert_eq!(gt.gain(0, 1), brute_force_gain(&g, &chrom, 0, 1));
        assert!(check_gains(&g, &chrom, &[false; 4], &gt));
    }

    #[test]
    fn computed_gains_match_brute_force() {
        let mut rng = Rng::with_seed(11);
        for _ in 0..20 {
            let noparts = rng.usize(2..5);
            let g = random_graph(&mut rng, 12, 15);
            let chrom: Vec<usize> = (0..12).map(|_| rng.usize(..noparts)).collect();
            let mut gt = GainTable::new(&g, noparts);
            gt.compute_gains(&g, &chrom);
            for c in 0..g.nocells() {
                for q in (0..noparts).filter(|&q| q != chrom[c]) {
                    assert_eq!(gt.gain(c, q), brute_force_gain(&g, &chrom, c, q));
                }
            }
        }
    }

    #[test]
    fn incremental_matches_recompute() {
        let mut rng = Rng::with_seed(5);
        for _ in 0..20 {
            let noparts = rng.usize(2..5);
            let g = random_graph(&mut rng, 15, 20);
            let mut chrom: Vec<usize> = (0..15).map(|_| rng.usize(..noparts)).collect();
            let mut locked = vec![false; 15];
            let mut gt = GainTable::new(&g, noparts);
            gt.compute_gains(&g, &chrom);

            let mut order: Vec<usize> = (0..15).collect();
            rng.shuffle(&mut order);
            for cell in order {
                let from = chrom[cell];
                let to = (from + rng.usize(1..noparts)) % noparts;
                locked[cell] = true;
                chrom[cell] = to;
                gt.update_gains(&g, &chrom, &locked, cell, from, to);

                assert!(check_gains(&g, &chrom, &locked, &gt));
                for &d in gt.touched() {
                    assert!(!locked[d]);
                    assert!(g.nets_of(d).iter().any(|n| g.pins(*n).contains(&cell)));
                }
            }
        }
    }
}
