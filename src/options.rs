use crate::defs::{DEFAULT_NITER, DEFAULT_UFACTOR};

/// Everything that controls a partitioning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// number of partitions, at least 2
    pub nparts: usize,
    /// allowed imbalance in thousandths of the average partition size, see
    /// [`size_bounds`](crate::partition::size_bounds)
    pub ufactor: u32,
    /// maximum number of passes
    pub niter: usize,
    /// seed of the initial partition, drawn at random if absent
    pub seed: Option<u64>,
}

impl Options {
    pub fn new(nparts: usize) -> Self {
        Self {
            nparts,
            ufactor: DEFAULT_UFACTOR,
            niter: DEFAULT_NITER,
            seed: None,
        }
    }

    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..self
        }
    }
}
