//! Slow, obviously-correct recomputations used to check the incremental structures. These back
//! the `debug_assert!`s of the move engine and the tests.

use crate::buckets::Buckets;
use crate::defs::Weight;
use crate::gains::GainTable;
use crate::graph::Hypergraph;

/// Cut size of an arbitrary assignment
pub fn compute_cut(graph: &Hypergraph, chrom: &[usize]) -> Weight {
    graph
        .netlist()
        .enumerate()
        .filter(|(_, pins)| pins.iter().any(|&c| chrom[c] != chrom[pins[0]]))
        .map(|(n, _)| graph.net_weight(n))
        .sum()
}

/// Gain of moving `cell` to `to`, measured by recomputing the cut size before and after.
pub fn brute_force_gain(graph: &Hypergraph, chrom: &[usize], cell: usize, to: usize) -> Weight {
    let before = compute_cut(graph, chrom);
    let mut moved = chrom.to_vec();
    moved[cell] = to;
    before - compute_cut(graph, &moved)
}

/// Checks the pin distribution of every net, then the gain of every unlocked cell against
/// [`brute_force_gain`].
pub fn check_gains(graph: &Hypergraph, chrom: &[usize], locked: &[bool], gains: &GainTable) -> bool {
    for (n, pins) in graph.netlist().enumerate() {
        for q in 0..gains.noparts() {
            let expected = pins.iter().filter(|&&c| chrom[c] == q).count() as u32;
            assert_eq!(gains.pins_in(n, q), expected, "net {n} has a stale count in {q}");
        }
    }
    for c in (0..graph.nocells()).filter(|&c| !locked[c]) {
        for q in (0..gains.noparts()).filter(|&q| q != chrom[c]) {
            let expected = brute_force_gain(graph, chrom, c, q);
            assert_eq!(
                gains.gain(c, q),
                expected,
                "gain of cell {c} towards {q} is stale"
            );
        }
    }
    true
}

/// Checks that every unlocked cell is linked once per destination at the index of its current
/// gain, and that locked cells are not linked at all.
pub fn check_buckets(
    buckets: &Buckets,
    chrom: &[usize],
    locked: &[bool],
    gains: &GainTable,
) -> bool {
    assert!(buckets.check());
    for c in 0..chrom.len() {
        for q in (0..buckets.noparts()).filter(|&q| q != chrom[c]) {
            let linked = buckets.gain_of(c, chrom[c], q);
            if locked[c] {
                assert_eq!(linked, None, "locked cell {c} still in bucket towards {q}");
            } else {
                assert_eq!(
                    linked,
                    Some(gains.gain(c, q)),
                    "cell {c} sits at the wrong gain towards {q}"
                );
            }
        }
    }
    true
}
