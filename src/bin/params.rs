use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use fms::{Options, DEFAULT_NITER, DEFAULT_UFACTOR};

/// Partition a hypergraph into k parts with Fiduccia-Mattheyses refinement
#[derive(Parser, Debug)]
#[command(name = "fmspart", version)]
pub struct Cli {
    /// hypergraph in hMETIS format
    graph_file: PathBuf,

    /// number of partitions
    #[arg(value_parser = clap::value_parser!(u32).range(2..))]
    noparts: u32,

    /// seed of the initial partition; a random one is drawn (and printed) if absent
    seed: Option<u64>,

    /// print the graph and the final partition sizes
    #[arg(short, long)]
    verbose: bool,

    /// write the final assignment to this file
    #[arg(short, long)]
    outfile: Option<PathBuf>,

    /// allowed imbalance, in thousandths of the average partition size
    #[arg(short, long, default_value_t = DEFAULT_UFACTOR)]
    ufactor: u32,

    /// maximum number of passes
    #[arg(short = 'i', long, default_value_t = DEFAULT_NITER)]
    niter: usize,
}

#[derive(Debug)]
pub struct Params {
    pub filename: PathBuf,
    pub options: Options,
    pub verbose: bool,
    pub outfile: Option<PathBuf>,
}

impl From<Cli> for Params {
    fn from(cli: Cli) -> Self {
        let Cli {
            graph_file,
            noparts,
            seed,
            verbose,
            outfile,
            ufactor,
            niter,
        } = cli;
        Params {
            filename: graph_file,
            options: Options {
                nparts: noparts as usize,
                ufactor,
                niter,
                seed,
            },
            verbose,
            outfile,
        }
    }
}

/// Parses the command line. Help and version requests, as well as usage errors, are printed here
/// and come back as the exit code to use.
pub fn parse_standard() -> Result<Params, ExitCode> {
    match Cli::try_parse() {
        Ok(cli) => Ok(cli.into()),
        Err(e) => {
            let _ = e.print();
            if e.use_stderr() {
                Err(ExitCode::FAILURE)
            } else {
                Err(ExitCode::SUCCESS)
            }
        }
    }
}
