mod params;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::Context;
use fms::util::randomize;
use fms::{graphio, report, Options};

use crate::params::Params;

fn run(params: &Params) -> anyhow::Result<()> {
    let timer = clilog::stimer!("read graph");
    let graph = graphio::read_graph(&params.filename)
        .with_context(|| format!("reading {}", params.filename.display()))?;
    clilog::finish!(timer);
    clilog::info!(
        "{}: {} cells, {} nets, {} pins",
        params.filename.display(),
        graph.nocells(),
        graph.nonets(),
        graph.nopins()
    );

    let seed = randomize(params.options.seed);
    println!("SEED = {} fname = {}", seed, params.filename.display());
    let options = Options {
        seed: Some(seed),
        ..params.options.clone()
    };

    let out = fms::partition(&graph, &options)?;
    println!(
        "pass_no = {} Final cutsize = {} Check cutsize = {}",
        out.stats.passes.len(),
        out.stats.final_cut,
        out.partition.cut_size(&graph)
    );

    if params.verbose {
        let mut lock = io::stdout().lock();
        report::print_graph(&graph, options.nparts, &mut lock)?;
        report::print_parts_info(&out.partition, &mut lock)?;
    }

    if let Some(path) = params.outfile.as_deref() {
        let f = File::create(path)
            .with_context(|| format!("could not open {} for writing partition", path.display()))?;
        let mut w = BufWriter::new(f);
        report::print_vertex_partition(&out.partition, &mut w)?;
        w.flush()?;
    }
    Ok(())
}

fn main() -> ExitCode {
    clilog::init_stderr_color_debug();

    let params = match params::parse_standard() {
        Ok(p) => p,
        Err(code) => return code,
    };
    clilog::debug!("{params:#?}");

    match run(&params) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            clilog::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
