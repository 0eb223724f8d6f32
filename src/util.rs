//! Small helpers that don't belong anywhere else

/// Turns the counts in `degs[..(degs.len()-1)]` into CSR offsets in place. The last entry is
/// overwritten with the total.
///
/// ```
/// # use fms::util::make_csr;
/// let mut xadj = [2, 3, 1, 4, 0];
/// make_csr(&mut xadj);
/// assert_eq!(xadj, [0, 2, 5, 6, 10]);
/// ```
pub fn make_csr(degs: &mut [usize]) {
    let mut i = 0;
    for d in degs {
        let inc = *d;
        *d = i;
        i += inc;
    }
}

/// Returns `seed` if given, otherwise draws a fresh one so the run can still be reproduced from
/// the printed value.
pub fn randomize(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| fastrand::u64(..))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn csr_from_counts() {
        let mut xadj = [0, 0, 3, 0, 1, 0];
        make_csr(&mut xadj);
        assert_eq!(xadj, [0, 0, 0, 3, 3, 4]);
    }

    #[test]
    fn explicit_seed_kept() {
        assert_eq!(randomize(Some(17)), 17);
    }
}
