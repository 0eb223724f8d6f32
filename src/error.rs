use std::io;

use thiserror::Error;

/// Everything that can go wrong before the move engine starts. Nothing inside a pass fails: an
/// infeasible move is just recorded as skipped.
#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: {msg}")]
    Parse { line: usize, msg: String },

    #[error("invalid hypergraph: {0}")]
    InvalidGraph(String),

    #[error("number of partitions must be at least 2 (got {0})")]
    InvalidPartCount(usize),

    #[error("invalid assignment: {0}")]
    InvalidAssignment(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub(crate) fn parse(line: usize, msg: impl Into<String>) -> Self {
        Error::Parse {
            line,
            msg: msg.into(),
        }
    }
}
