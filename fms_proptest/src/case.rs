use std::panic::{self, AssertUnwindSafe};

use fastrand::Rng;
use fms::{Hypergraph, Options, Partition, Refiner, Weight};

/// Hypergraph in the plain form the strategies edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawGraph {
    pub cwgt: Vec<Weight>,
    pub nwgt: Vec<Weight>,
    pub netlist: Vec<Vec<usize>>,
}

impl RawGraph {
    pub fn random(rng: &mut Rng, nocells: usize, nonets: usize, max_net: usize, weighted: bool) -> Self {
        let cwgt = (0..nocells)
            .map(|_| if weighted { rng.i64(1..6) } else { 1 })
            .collect();
        let nwgt = (0..nonets)
            .map(|_| if weighted { rng.i64(1..6) } else { 1 })
            .collect();
        let netlist = (0..nonets)
            .map(|_| {
                let size = rng.usize(1..=max_net.clamp(1, nocells));
                rng.choose_multiple(0..nocells, size)
            })
            .collect();
        Self { cwgt, nwgt, netlist }
    }

    pub fn from_hypergraph(g: &Hypergraph) -> Self {
        Self {
            cwgt: g.cell_weights().to_vec(),
            nwgt: g.net_weights().to_vec(),
            netlist: g.netlist().map(<[usize]>::to_vec).collect(),
        }
    }

    pub fn build(&self) -> fms::Result<Hypergraph> {
        Hypergraph::new(self.cwgt.clone(), self.nwgt.clone(), self.netlist.clone())
    }

    pub fn nocells(&self) -> usize {
        self.cwgt.len()
    }

    pub fn nonets(&self) -> usize {
        self.nwgt.len()
    }

    pub fn nopins(&self) -> usize {
        self.netlist.iter().map(Vec::len).sum()
    }
}

/// the test case we're trying to break, and later to reduce
#[derive(Debug, Clone)]
pub struct Case {
    pub graph: RawGraph,
    pub options: Options,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    /// the case itself was rejected, e.g. a strategy left a cell-less graph
    Invalid(String),
    Fail(String),
}

impl Verdict {
    #[must_use]
    pub fn is_fail(&self) -> bool {
        matches!(self, Self::Fail(_))
    }
}

macro_rules! ensure {
    ($cond:expr, $($fmt:tt)+) => {
        if !$cond {
            return Err(format!($($fmt)+));
        }
    };
}

impl Case {
    /// rough size used to decide whether a reduced case is an improvement
    pub fn cost(&self) -> usize {
        let g = &self.graph;
        let weights: Weight = g.cwgt.iter().chain(&g.nwgt).sum();
        g.nocells() * 4 + g.nopins() * 2 + g.nonets() + weights as usize + self.options.nparts + self.options.niter
    }

    pub fn run(&self) -> Verdict {
        let graph = match self.graph.build() {
            Ok(g) => g,
            Err(e) => return Verdict::Invalid(e.to_string()),
        };
        match panic::catch_unwind(AssertUnwindSafe(|| check(&graph, &self.options))) {
            Ok(Ok(())) => Verdict::Pass,
            Ok(Err(msg)) => Verdict::Fail(msg),
            Err(payload) => {
                let msg = payload
                    .downcast_ref::<String>()
                    .map(String::as_str)
                    .or_else(|| payload.downcast_ref::<&str>().copied())
                    .unwrap_or("<non-string panic>");
                Verdict::Fail(format!("panicked: {msg}"))
            }
        }
    }
}

/// Every property a run must have, checked against recomputation from scratch.
fn check(graph: &Hypergraph, options: &Options) -> Result<(), String> {
    let out = fms::partition(graph, options).map_err(|e| format!("partition failed: {e}"))?;
    let p = &out.partition;
    let stats = &out.stats;

    ensure!(p.assignment().len() == graph.nocells(), "assignment has {} entries", p.assignment().len());
    ensure!(p.assignment().iter().all(|&x| x < options.nparts), "partition id out of range");
    ensure!(p.is_balanced(), "unbalanced result {:?}", p.parts());
    let sizes_total: Weight = p.parts().iter().map(|i| i.pcurr_size).sum();
    ensure!(sizes_total == graph.stats().totcellsize, "sizes sum to {sizes_total}");

    let cut = p.cut_size(graph);
    ensure!(cut == stats.final_cut, "reported cut {} but actual {cut}", stats.final_cut);
    ensure!(stats.final_cut <= stats.initial_cut, "cut grew from {} to {}", stats.initial_cut, stats.final_cut);
    ensure!(!stats.passes.is_empty() || options.niter == 0, "no pass ran");
    ensure!(stats.passes.len() <= options.niter, "{} passes for niter {}", stats.passes.len(), options.niter);

    let mut prev = stats.initial_cut;
    for pass in &stats.passes {
        ensure!(pass.gain_sum >= 0, "pass {} has negative gain {}", pass.pass, pass.gain_sum);
        ensure!(pass.cutsize == prev - pass.gain_sum, "pass {} cut bookkeeping off", pass.pass);
        prev = pass.cutsize;
    }

    let again = fms::partition(graph, options).map_err(|e| e.to_string())?;
    ensure!(again.partition == out.partition, "same seed gave a different partition");

    // a converged partition stays put
    if stats.passes.last().is_some_and(|l| l.gain_sum == 0) {
        let mut q: Partition = out.partition.clone();
        let mut cut = stats.final_cut;
        let mut r = Refiner::new(graph, options.nparts).map_err(|e| e.to_string())?;
        r.pass(&mut q, &mut cut);
        ensure!(q == out.partition, "extra pass changed a converged partition");
        ensure!(r.move_log().len() == graph.nocells(), "move log has {} entries", r.move_log().len());
    }
    Ok(())
}
