//! The hypergraph being partitioned. Built once, never mutated afterwards.

use crate::defs::Weight;
use crate::error::{Error, Result};
use crate::util::make_csr;

/// Summary numbers of a hypergraph. These size the gain buckets and the partition bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GraphStats {
    pub nocells: usize,
    pub nonets: usize,
    pub nopins: usize,
    /// sum of all net weights
    pub totsize: Weight,
    /// sum of all cell weights
    pub totcellsize: Weight,
    /// largest number of nets on a single cell
    pub max_density: usize,
    pub max_cweight: Weight,
    pub min_cweight: Weight,
    pub max_nweight: Weight,
}

/// Cells and weighted nets, stored as CSR in both directions: `xpins`/`pins` lists the cells of
/// each net, `xnets`/`nets` lists the nets of each cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hypergraph {
    cwgt: Vec<Weight>,
    nwgt: Vec<Weight>,
    xpins: Vec<usize>,
    pins: Vec<usize>,
    xnets: Vec<usize>,
    nets: Vec<usize>,
    stats: GraphStats,
}

impl Hypergraph {
    /// Builds a hypergraph from cell weights, net weights and the pin list of every net.
    ///
    /// Pins repeated inside one net are collapsed, keeping the first occurrence.
    pub fn new(cwgt: Vec<Weight>, nwgt: Vec<Weight>, netlist: Vec<Vec<usize>>) -> Result<Self> {
        let nocells = cwgt.len();
        let nonets = nwgt.len();

        if nocells == 0 {
            return Err(Error::InvalidGraph("no cells".into()));
        }
        if netlist.len() != nonets {
            return Err(Error::InvalidGraph(format!(
                "{} net weights for {} nets",
                nonets,
                netlist.len()
            )));
        }
        if let Some(c) = cwgt.iter().position(|&w| w <= 0) {
            return Err(Error::InvalidGraph(format!(
                "cell {c} has non-positive weight {}",
                cwgt[c]
            )));
        }
        if let Some(n) = nwgt.iter().position(|&w| w <= 0) {
            return Err(Error::InvalidGraph(format!(
                "net {n} has non-positive weight {}",
                nwgt[n]
            )));
        }

        let mut xpins = Vec::with_capacity(nonets + 1);
        let mut pins = Vec::with_capacity(netlist.iter().map(Vec::len).sum());
        let mut seen = vec![usize::MAX; nocells];
        xpins.push(0);
        for (n, net) in netlist.into_iter().enumerate() {
            if net.is_empty() {
                return Err(Error::InvalidGraph(format!("net {n} has no pins")));
            }
            for c in net {
                if c >= nocells {
                    return Err(Error::InvalidGraph(format!(
                        "net {n} references cell {c}, but there are only {nocells} cells"
                    )));
                }
                if seen[c] == n {
                    clilog::warn!("net {} lists cell {} more than once", n, c);
                    continue;
                }
                seen[c] = n;
                pins.push(c);
            }
            xpins.push(pins.len());
        }

        // invert into cell -> nets
        let mut xnets = vec![0; nocells + 1];
        for &c in &pins {
            xnets[c] += 1;
        }
        let max_density = xnets.iter().copied().max().unwrap_or(0);
        make_csr(&mut xnets);
        let mut fill = xnets.clone();
        let mut nets = vec![0; pins.len()];
        for n in 0..nonets {
            for &c in &pins[xpins[n]..xpins[n + 1]] {
                nets[fill[c]] = n;
                fill[c] += 1;
            }
        }

        let stats = GraphStats {
            nocells,
            nonets,
            nopins: pins.len(),
            totsize: nwgt.iter().sum(),
            totcellsize: cwgt.iter().sum(),
            max_density,
            max_cweight: cwgt.iter().copied().max().unwrap_or(0),
            min_cweight: cwgt.iter().copied().min().unwrap_or(0),
            max_nweight: nwgt.iter().copied().max().unwrap_or(0),
        };

        Ok(Self {
            cwgt,
            nwgt,
            xpins,
            pins,
            xnets,
            nets,
            stats,
        })
    }

    /// Unit cell and net weights.
    pub fn unweighted(nocells: usize, netlist: Vec<Vec<usize>>) -> Result<Self> {
        let nonets = netlist.len();
        Self::new(vec![1; nocells], vec![1; nonets], netlist)
    }

    pub fn nocells(&self) -> usize {
        self.stats.nocells
    }

    pub fn nonets(&self) -> usize {
        self.stats.nonets
    }

    pub fn nopins(&self) -> usize {
        self.stats.nopins
    }

    pub fn stats(&self) -> &GraphStats {
        &self.stats
    }

    pub fn cell_weight(&self, cell: usize) -> Weight {
        self.cwgt[cell]
    }

    pub fn cell_weights(&self) -> &[Weight] {
        &self.cwgt
    }

    pub fn net_weight(&self, net: usize) -> Weight {
        self.nwgt[net]
    }

    pub fn net_weights(&self) -> &[Weight] {
        &self.nwgt
    }

    /// cells on `net`
    pub fn pins(&self, net: usize) -> &[usize] {
        &self.pins[self.xpins[net]..self.xpins[net + 1]]
    }

    /// nets touching `cell`
    pub fn nets_of(&self, cell: usize) -> &[usize] {
        &self.nets[self.xnets[cell]..self.xnets[cell + 1]]
    }

    pub fn netlist(&self) -> impl Iterator<Item = &[usize]> + '_ {
        self.xpins.windows(2).map(|w| &self.pins[w[0]..w[1]])
    }

    /// Bound on the absolute value of any gain: a cell can at most uncut (or cut) every net it
    /// touches.
    pub fn max_gain(&self) -> Weight {
        self.stats.max_density as Weight * self.stats.max_nweight
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn small() -> Hypergraph {
        Hypergraph::new(
            vec![1, 2, 3, 1],
            vec![1, 2],
            vec![vec![0, 1], vec![1, 2, 3]],
        )
        .unwrap()
    }

    #[test]
    fn both_directions() {
        let g = small();
        assert_eq!(g.pins(0), &[0, 1]);
        assert_eq!(g.pins(1), &[1, 2, 3]);
        assert_eq!(g.nets_of(0), &[0]);
        assert_eq!(g.nets_of(1), &[0, 1]);
        assert_eq!(g.nets_of(3), &[1]);
        assert_eq!(g.netlist().count(), 2);
    }

    #[test]
    fn stats() {
        let g = small();
        let s = g.stats();
        assert_eq!(s.nocells, 4);
        assert_eq!(s.nonets, 2);
        assert_eq!(s.nopins, 5);
        assert_eq!(s.totsize, 3);
        assert_eq!(s.totcellsize, 7);
        assert_eq!(s.max_density, 2);
        assert_eq!(s.max_cweight, 3);
        assert_eq!(s.min_cweight, 1);
        assert_eq!(s.max_nweight, 2);
        assert_eq!(g.max_gain(), 4);
    }

    #[test]
    fn duplicate_pins_collapse() {
        let g = Hypergraph::unweighted(3, vec![vec![0, 2, 0, 2, 1]]).unwrap();
        assert_eq!(g.pins(0), &[0, 2, 1]);
        assert_eq!(g.nopins(), 3);
        assert_eq!(g.stats().max_density, 1);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            Hypergraph::unweighted(0, vec![]),
            Err(Error::InvalidGraph(_))
        ));
        assert!(matches!(
            Hypergraph::unweighted(2, vec![vec![0, 2]]),
            Err(Error::InvalidGraph(_))
        ));
        assert!(matches!(
            Hypergraph::unweighted(2, vec![vec![]]),
            Err(Error::InvalidGraph(_))
        ));
        assert!(matches!(
            Hypergraph::new(vec![1, 0], vec![1], vec![vec![0, 1]]),
            Err(Error::InvalidGraph(_))
        ));
        assert!(matches!(
            Hypergraph::new(vec![1, 1], vec![1], vec![]),
            Err(Error::InvalidGraph(_))
        ));
    }

    #[test]
    fn no_nets() {
        let g = Hypergraph::unweighted(3, vec![]).unwrap();
        assert_eq!(g.max_gain(), 0);
        assert!(g.nets_of(1).is_empty());
    }
}
