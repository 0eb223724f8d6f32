//! Constants and scalar types shared by the partitioner and its front ends

/// Cell and net weights, gains and cut sizes.
pub type Weight = i64;

/// Default allowed imbalance, in thousandths of the average partition size. Same meaning as the
/// `-ufactor` of a k-way `gpmetis` run.
pub const DEFAULT_UFACTOR: u32 = 30;

/// Default upper bound on the number of FM passes.
pub const DEFAULT_NITER: usize = 10;

/// Absent link in the bucket arena
pub(crate) const NIL: usize = usize::MAX;
