//! The authoritative assignment of cells to partitions and the size bounds every committed move
//! must respect.

use fastrand::Rng;

use crate::debug::compute_cut;
use crate::defs::Weight;
use crate::error::{Error, Result};
use crate::graph::{GraphStats, Hypergraph};

/// Size bookkeeping of one partition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartInfo {
    pub pmin_size: Weight,
    pub pcurr_size: Weight,
    pub pmax_size: Weight,
}

impl PartInfo {
    pub fn is_balanced(&self) -> bool {
        self.pmin_size <= self.pcurr_size && self.pcurr_size <= self.pmax_size
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// partition of each cell
    chrom: Vec<usize>,
    parts: Vec<PartInfo>,
}

/// Computes `(pmin_size, pmax_size)`, shared by all partitions.
///
/// The allowed deviation from the average is `ufactor` thousandths of the average, but never less
/// than the heaviest cell; otherwise discrete cell weights could make every assignment
/// infeasible.
pub fn size_bounds(stats: &GraphStats, noparts: usize, ufactor: u32) -> (Weight, Weight) {
    let tot = stats.totcellsize;
    let k = noparts as Weight;
    let avg_floor = tot / k;
    let avg_ceil = (tot + k - 1) / k;
    let tol = ((tot as f64 / k as f64) * ufactor as f64 / 1000.0).ceil() as Weight;
    let slack = tol.max(stats.max_cweight);
    ((avg_floor - slack).max(0), avg_ceil + slack)
}

fn check_noparts(noparts: usize) -> Result<()> {
    if noparts < 2 {
        return Err(Error::InvalidPartCount(noparts));
    }
    Ok(())
}

impl Partition {
    fn empty(graph: &Hypergraph, noparts: usize, ufactor: u32) -> Self {
        let (pmin_size, pmax_size) = size_bounds(graph.stats(), noparts, ufactor);
        Self {
            chrom: vec![0; graph.nocells()],
            parts: vec![
                PartInfo {
                    pmin_size,
                    pcurr_size: 0,
                    pmax_size,
                };
                noparts
            ],
        }
    }

    /// Random initial partition. Cells are visited in a random order and each goes to the
    /// currently lightest partition, so sizes never differ by more than the heaviest cell and the
    /// result always lies within [`size_bounds`].
    pub fn create_partition(
        graph: &Hypergraph,
        noparts: usize,
        ufactor: u32,
        rng: &mut Rng,
    ) -> Result<Self> {
        check_noparts(noparts)?;
        let mut p = Self::empty(graph, noparts, ufactor);

        let mut order: Vec<usize> = (0..graph.nocells()).collect();
        rng.shuffle(&mut order);
        for c in order {
            let mut lightest = 0;
            for i in 1..noparts {
                if p.parts[i].pcurr_size < p.parts[lightest].pcurr_size {
                    lightest = i;
                }
            }
            p.chrom[c] = lightest;
            p.parts[lightest].pcurr_size += graph.cell_weight(c);
        }

        debug_assert!(p.is_balanced());
        Ok(p)
    }

    /// Takes a caller-supplied assignment. It must cover every cell and respect the size bounds.
    pub fn from_assignment(
        graph: &Hypergraph,
        noparts: usize,
        ufactor: u32,
        chrom: Vec<usize>,
    ) -> Result<Self> {
        check_noparts(noparts)?;
        if chrom.len() != graph.nocells() {
            return Err(Error::InvalidAssignment(format!(
                "{} entries for {} cells",
                chrom.len(),
                graph.nocells()
            )));
        }
        let mut p = Self::empty(graph, noparts, ufactor);
        for (c, &part) in chrom.iter().enumerate() {
            if part >= noparts {
                return Err(Error::InvalidAssignment(format!(
                    "cell {c} assigned to partition {part}, but there are only {noparts}"
                )));
            }
            p.parts[part].pcurr_size += graph.cell_weight(c);
        }
        p.chrom = chrom;
        if let Some((i, info)) = p.parts.iter().enumerate().find(|(_, info)| !info.is_balanced()) {
            return Err(Error::InvalidAssignment(format!(
                "partition {i} has size {} outside [{}, {}]",
                info.pcurr_size, info.pmin_size, info.pmax_size
            )));
        }
        Ok(p)
    }

    pub fn noparts(&self) -> usize {
        self.parts.len()
    }

    pub fn part_of(&self, cell: usize) -> usize {
        self.chrom[cell]
    }

    /// partition of every cell, indexed by cell id
    pub fn assignment(&self) -> &[usize] {
        &self.chrom
    }

    pub fn parts(&self) -> &[PartInfo] {
        &self.parts
    }

    pub fn is_balanced(&self) -> bool {
        self.parts.iter().all(PartInfo::is_balanced)
    }

    /// Total weight of the nets spanning more than one partition.
    pub fn cut_size(&self, graph: &Hypergraph) -> Weight {
        compute_cut(graph, &self.chrom)
    }

    pub(crate) fn move_cell(&mut self, cell: usize, to: usize, weight: Weight) {
        let from = self.chrom[cell];
        self.parts[from].pcurr_size -= weight;
        self.parts[to].pcurr_size += weight;
        self.chrom[cell] = to;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bounds_never_tighter_than_a_cell() {
        let g = Hypergraph::unweighted(4, vec![]).unwrap();
        assert_eq!(size_bounds(g.stats(), 2, 30), (1, 3));
        assert_eq!(size_bounds(g.stats(), 2, 0), (1, 3));

        let g = Hypergraph::new(vec![1; 1000], vec![], vec![]).unwrap();
        // 500 * 0.1 = 50
        assert_eq!(size_bounds(g.stats(), 2, 100), (450, 550));
        // 1000 / 3 = 333.33.., tolerance rounds up to 34
        assert_eq!(size_bounds(g.stats(), 3, 100), (299, 368));

        let g = Hypergraph::new(vec![5, 1, 1], vec![], vec![]).unwrap();
        assert_eq!(size_bounds(g.stats(), 3, 30), (0, 8));
    }

    #[test]
    fn random_partition_is_balanced() {
        let mut rng = Rng::with_seed(7);
        for noparts in 2..6 {
            let cwgt: Vec<Weight> = (0..57).map(|_| rng.i64(1..6)).collect();
            let g = Hypergraph::new(cwgt, vec![], vec![]).unwrap();
            let p = Partition::create_partition(&g, noparts, 30, &mut rng).unwrap();
            assert!(p.is_balanced(), "{:?}", p.parts());
            let total: Weight = p.parts().iter().map(|i| i.pcurr_size).sum();
            assert_eq!(total, g.stats().totcellsize);
            assert!(p.assignment().iter().all(|&x| x < noparts));
        }
    }

    #[test]
    fn same_seed_same_partition() {
        let g = Hypergraph::unweighted(40, vec![]).unwrap();
        let a = Partition::create_partition(&g, 3, 30, &mut Rng::with_seed(3)).unwrap();
        let b = Partition::create_partition(&g, 3, 30, &mut Rng::with_seed(3)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn supplied_assignment() {
        let g = Hypergraph::new(vec![1; 4], vec![1, 2], vec![vec![0, 1], vec![1, 2, 3]]).unwrap();
        let p = Partition::from_assignment(&g, 2, 30, vec![0, 0, 1, 1]).unwrap();
        assert_eq!(p.cut_size(&g), 2);
        assert_eq!(p.parts()[0].pcurr_size, 2);

        assert!(matches!(
            Partition::from_assignment(&g, 2, 30, vec![0, 0, 0, 0]),
            Err(Error::InvalidAssignment(_))
        ));
        assert!(matches!(
            Partition::from_assignment(&g, 2, 30, vec![0, 2, 1, 1]),
            Err(Error::InvalidAssignment(_))
        ));
        assert!(matches!(
            Partition::from_assignment(&g, 2, 30, vec![0, 1]),
            Err(Error::InvalidAssignment(_))
        ));
        assert!(matches!(
            Partition::from_assignment(&g, 1, 30, vec![0; 4]),
            Err(Error::InvalidPartCount(1))
        ));
    }

    #[test]
    fn move_keeps_sizes() {
        let g = Hypergraph::new(vec![2, 1, 1, 2], vec![], vec![]).unwrap();
        let mut p = Partition::from_assignment(&g, 2, 30, vec![0, 0, 1, 1]).unwrap();
        p.move_cell(1, 1, 1);
        assert_eq!(p.part_of(1), 1);
        assert_eq!(p.parts()[0].pcurr_size, 2);
        assert_eq!(p.parts()[1].pcurr_size, 4);
    }
}
