//! property testing the fms partitioner -- random hypergraphs are partitioned and every result is
//! checked against recomputation; a failing case is reduced and written out as a `.hgr` file

use std::{path::PathBuf, process::ExitCode, time::Duration};

use anyhow::Context;
use clap::Parser;
use fastrand::Rng;
use fms::{Options, graphio};

use case::{Case, RawGraph, Verdict};
use minimize::MinimizationSet;

mod case;
mod minimize;
mod strategy;
mod utils;

#[derive(Parser)]
struct Cli {
    /// check this graph (with several seeds) instead of generating random ones
    graph_file: Option<PathBuf>,

    /// number of cases to run
    #[arg(short, long, default_value = "500")]
    cases: usize,

    /// seed of the case generator
    #[arg(short, long)]
    seed: Option<u64>,

    /// number of partitions; random in 2..=max-nparts if absent
    #[arg(short = 'k', long)]
    nparts: Option<usize>,

    #[arg(long, default_value = "6")]
    max_nparts: usize,

    #[arg(long, default_value = "80")]
    max_cells: usize,

    #[arg(short, long, default_value = "30")]
    ufactor: u32,

    #[arg(short = 'r', long, default_value = "10")]
    niter: usize,

    /// where to write the reduced failing graph
    #[arg(short, long, default_value = "failing.hgr")]
    out: PathBuf,

    /// seconds spent reducing a failing case
    #[arg(long, default_value = "30")]
    minimize_secs: u64,
}

fn build_strats(m: &mut MinimizationSet) {
    use strategy::strategies as s;

    m.push(s::DeleteCells { prob: 2 });
    m.push(s::DeleteCells { prob: 8 });
    m.push(s::DeleteNets { prob: 2 });
    m.push(s::DeleteNets { prob: 8 });
    m.push(s::DeletePin);
    m.push(s::ReduceWeights { amt_percent: 50 });
    m.push(s::ShrinkNparts);
    m.push(s::ShrinkNiter);
}

fn make_case(cli: &Cli, base: Option<&RawGraph>, rng: &mut Rng) -> Case {
    let graph = match base {
        Some(g) => g.clone(),
        None => {
            let nocells = rng.usize(1..=cli.max_cells.max(1));
            let nonets = rng.usize(0..=nocells * 2);
            let max_net = rng.usize(2..8);
            let weighted = rng.bool();
            RawGraph::random(rng, nocells, nonets, max_net, weighted)
        }
    };
    let nparts = cli.nparts.unwrap_or_else(|| rng.usize(2..=cli.max_nparts.max(2)));
    Case {
        graph,
        options: Options {
            nparts,
            ufactor: cli.ufactor,
            niter: cli.niter,
            seed: Some(rng.u64(..)),
        },
    }
}

fn run(cli: &Cli) -> anyhow::Result<bool> {
    let seed = cli.seed.unwrap_or_else(|| fastrand::u64(..));
    clilog::info!("generator seed {seed}");
    let mut rng = Rng::with_seed(seed);

    let base = match &cli.graph_file {
        Some(path) => {
            let g = graphio::read_graph(path).with_context(|| format!("reading {}", path.display()))?;
            Some(RawGraph::from_hypergraph(&g))
        }
        None => None,
    };

    // panics are reported through the verdict
    std::panic::set_hook(Box::new(|_| {}));

    for i in 0..cli.cases {
        let case = make_case(cli, base.as_ref(), &mut rng);
        match case.run() {
            Verdict::Pass => continue,
            Verdict::Invalid(msg) => {
                clilog::debug!("case {i} rejected: {msg}");
                continue;
            }
            Verdict::Fail(msg) => {
                clilog::error!("case {i} failed: {msg}");
                let mut strats = MinimizationSet::new(rng.fork());
                build_strats(&mut strats);
                let small = strats.minimize(case, Duration::from_secs(cli.minimize_secs), 5);

                let graph = small.graph.build()?;
                graphio::write_to_path(&graph, &cli.out)
                    .with_context(|| format!("writing {}", cli.out.display()))?;
                clilog::error!("reduced case written to {}: {:?}", cli.out.display(), small.options);
                if let Verdict::Fail(msg) = small.run() {
                    clilog::error!("reduced case fails with: {msg}");
                }
                return Ok(false);
            }
        }
    }
    clilog::info!("{} cases passed", cli.cases);
    Ok(true)
}

fn main() -> ExitCode {
    clilog::init_stderr_color_debug();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            clilog::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
