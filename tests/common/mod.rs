use std::fmt::Debug;
use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::atomic::{AtomicUsize, Ordering};

const PRINT_CMDS: bool = true;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TestGraph {
    Example,
    TwoClusters,
    Weighted,
}

impl TestGraph {
    #![allow(dead_code)]

    pub const fn file(self) -> &'static str {
        match self {
            TestGraph::Example => "graphs/example.hgr",
            TestGraph::TwoClusters => "graphs/two_clusters.hgr",
            TestGraph::Weighted => "graphs/weighted.hgr",
        }
    }

    pub const fn nocells(self) -> usize {
        match self {
            TestGraph::Example => 4,
            TestGraph::TwoClusters => 16,
            TestGraph::Weighted => 6,
        }
    }

    pub fn test_suite() -> impl Iterator<Item = Self> {
        [TestGraph::Example, TestGraph::TwoClusters, TestGraph::Weighted].into_iter()
    }
}

impl From<TestGraph> for PathBuf {
    fn from(value: TestGraph) -> Self {
        value.file().into()
    }
}

/// One invocation of `fmspart`
#[derive(Debug, Clone)]
pub struct Params {
    pub filename: PathBuf,
    pub noparts: usize,
    pub seed: Option<u64>,
    pub ufactor: Option<u32>,
    pub niter: Option<usize>,
    pub verbose: bool,
    /// write the partition to a temporary file and read it back
    pub outfile: bool,
}

/// Parsed result of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    pub stdout: String,
    pub seed: u64,
    pub passes: usize,
    pub final_cut: i64,
    pub check_cut: i64,
    pub part: Option<Vec<usize>>,
}

fn temp_outfile() -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("fmspart-test-{}-{n}.part", std::process::id()))
}

/// Value of the `key = value` pair in `line`
fn value_after<T: std::str::FromStr>(line: &str, key: &str) -> T
where
    T::Err: Debug,
{
    let rest = line
        .split(key)
        .nth(1)
        .unwrap_or_else(|| panic!("no {key:?} in {line:?}"));
    let rest = rest.trim_start().strip_prefix('=').unwrap().trim_start();
    rest.split_whitespace().next().unwrap().parse().unwrap()
}

/// Parses the `[ a, b, c ]` line written by `--outfile`.
pub fn parse_partition(text: &str) -> Vec<usize> {
    let inner = text
        .trim()
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or_else(|| panic!("malformed partition line {text:?}"));
    inner
        .split(',')
        .map(|s| s.trim().parse().unwrap())
        .collect()
}

impl Params {
    pub fn new(file: impl Into<PathBuf>, noparts: usize) -> Self {
        Self {
            filename: file.into(),
            noparts,
            seed: None,
            ufactor: None,
            niter: None,
            verbose: false,
            outfile: true,
        }
    }

    pub fn command(&self) -> (Command, Option<PathBuf>) {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_fmspart"));
        if self.verbose {
            cmd.arg("-v");
        }
        if let Some(u) = self.ufactor {
            cmd.arg(format!("--ufactor={u}"));
        }
        if let Some(n) = self.niter {
            cmd.arg(format!("--niter={n}"));
        }
        let outfile = self.outfile.then(temp_outfile);
        if let Some(o) = &outfile {
            cmd.arg("-o").arg(o);
        }
        cmd.arg(&self.filename);
        cmd.arg(format!("{}", self.noparts));
        if let Some(s) = self.seed {
            cmd.arg(format!("{s}"));
        }
        if PRINT_CMDS {
            println!("{cmd:?}");
        }
        (cmd, outfile)
    }

    pub fn call_no_success(&self) -> Output {
        let (mut cmd, outfile) = self.command();
        let output = cmd.output().unwrap();
        if let Some(o) = outfile {
            let _ = std::fs::remove_file(o);
        }
        output
    }

    pub fn call(&self) -> RunOutput {
        let (mut cmd, outfile) = self.command();
        let output = cmd.output().unwrap();
        let stdout = String::from_utf8(output.stdout).unwrap();
        let stderr = String::from_utf8(output.stderr).unwrap();
        if !output.status.success() {
            println!("\n====== stdout =======\n");
            print!("{stdout}");
            println!("\n====== stderr =======\n");
            print!("{stderr}");
            panic!("{}", output.status);
        }

        let part = outfile.map(|o| {
            let text = std::fs::read_to_string(&o).unwrap();
            std::fs::remove_file(&o).unwrap();
            parse_partition(&text)
        });

        let mut lines = stdout.lines();
        let seed_line = lines.next().unwrap();
        assert!(seed_line.starts_with("SEED = "), "{seed_line:?}");
        let result_line = lines.next().unwrap();
        RunOutput {
            seed: value_after(seed_line, "SEED"),
            passes: value_after(result_line, "pass_no"),
            final_cut: value_after(result_line, "Final cutsize"),
            check_cut: value_after(result_line, "Check cutsize"),
            stdout,
            part,
        }
    }
}
