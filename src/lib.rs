#![allow(clippy::needless_range_loop, clippy::too_many_arguments)]

//! k-way hypergraph partitioning with Fiduccia-Mattheyses passes.
//!
//! The usual entry point is [`partition`], which takes a [`Hypergraph`] (typically read with
//! [`graphio::read_graph`]) and [`Options`], and returns the refined [`Partition`] together with
//! per-pass statistics. [`Refiner`] exposes the passes themselves for callers that bring their
//! own starting partition.

pub mod buckets;
pub mod debug;
pub mod defs;
pub mod error;
pub mod fms;
pub mod gains;
pub mod graph;
pub mod graphio;
pub mod moves;
pub mod options;
pub mod partition;
pub mod report;
pub mod util;

pub use defs::{Weight, DEFAULT_NITER, DEFAULT_UFACTOR};
pub use error::{Error, Result};
pub use fms::{partition, Outcome, PassStats, Refiner, RunStats};
pub use graph::{GraphStats, Hypergraph};
pub use options::Options;
pub use partition::{PartInfo, Partition};
