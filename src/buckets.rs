//! Gain buckets for k-way FM
//!
//! There is one bucket array per (source partition, destination) pair. Each array holds
//! `2 * max_gain + 1` doubly-linked lists, one per gain value, with gain `g` at index
//! `g + max_gain`. List nodes live in a single arena: the node of cell `c` for destination slot
//! `s` is always `c * (noparts - 1) + s`, so a cell can be unlinked in O(1) without searching.
//!
//! A destination slot numbers the `noparts - 1` partitions other than the source, skipping the
//! source itself.

use crate::defs::{Weight, NIL};
use crate::gains::GainTable;

#[derive(Debug, Clone, Copy)]
struct Node {
    prev: usize,
    next: usize,
    /// index of the list holding the node, NIL if unlinked
    gain_inx: usize,
}

impl Node {
    const UNLINKED: Node = Node {
        prev: NIL,
        next: NIL,
        gain_inx: NIL,
    };
}

/// Best move found by [`Buckets::select_max`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub cell: usize,
    pub from: usize,
    pub to: usize,
    pub gain: Weight,
}

pub struct Buckets {
    noparts: usize,
    max_gain: Weight,
    bucketsize: usize,
    head: Box<[usize]>,
    tail: Box<[usize]>,
    /// highest non-empty list of each array, NIL when the array is empty
    max_inx: Box<[usize]>,
    nodes: Box<[Node]>,
}

impl Buckets {
    /// Allocates every list for every (source, destination) pair. Nothing is linked yet.
    pub fn init_buckets(nocells: usize, noparts: usize, max_gain: Weight) -> Self {
        assert!(noparts >= 2);
        assert!(max_gain >= 0);
        let bucketsize = 2 * max_gain as usize + 1;
        let narrays = noparts * (noparts - 1);
        Self {
            noparts,
            max_gain,
            bucketsize,
            head: vec![NIL; narrays * bucketsize].into_boxed_slice(),
            tail: vec![NIL; narrays * bucketsize].into_boxed_slice(),
            max_inx: vec![NIL; narrays].into_boxed_slice(),
            nodes: vec![Node::UNLINKED; nocells * (noparts - 1)].into_boxed_slice(),
        }
    }

    pub fn noparts(&self) -> usize {
        self.noparts
    }

    #[inline]
    fn slot(from: usize, to: usize) -> usize {
        debug_assert_ne!(from, to);
        if to < from {
            to
        } else {
            to - 1
        }
    }

    #[inline]
    fn array(&self, from: usize, to: usize) -> usize {
        from * (self.noparts - 1) + Self::slot(from, to)
    }

    #[inline]
    fn node_id(&self, cell: usize, from: usize, to: usize) -> usize {
        cell * (self.noparts - 1) + Self::slot(from, to)
    }

    #[inline]
    fn cell_of(&self, id: usize) -> usize {
        id / (self.noparts - 1)
    }

    #[inline]
    fn gain_inx(&self, gain: Weight) -> usize {
        debug_assert!(
            gain.abs() <= self.max_gain,
            "gain {gain} outside +-{}",
            self.max_gain
        );
        (gain + self.max_gain) as usize
    }

    /// Unlinks everything, keeping the storage.
    pub fn clear(&mut self) {
        self.head.fill(NIL);
        self.tail.fill(NIL);
        self.max_inx.fill(NIL);
        self.nodes.fill(Node::UNLINKED);
    }

    /// Fills the buckets from freshly computed gains: every cell, in increasing id, once per
    /// destination.
    pub fn create_buckets(&mut self, chrom: &[usize], gains: &GainTable) {
        self.clear();
        for (c, &from) in chrom.iter().enumerate() {
            for to in (0..self.noparts).filter(|&to| to != from) {
                self.insert(c, from, to, gains.gain(c, to));
            }
        }
        debug_assert!(self.check());
    }

    /// Appends `cell` to the list of `gain` in the `from -> to` array.
    pub fn insert(&mut self, cell: usize, from: usize, to: usize, gain: Weight) {
        let id = self.node_id(cell, from, to);
        debug_assert_eq!(self.nodes[id].gain_inx, NIL, "cell {cell} linked twice");

        let inx = self.gain_inx(gain);
        let a = self.array(from, to);
        let l = a * self.bucketsize + inx;

        let last = self.tail[l];
        self.nodes[id] = Node {
            prev: last,
            next: NIL,
            gain_inx: inx,
        };
        if last != NIL {
            self.nodes[last].next = id;
        } else {
            self.head[l] = id;
        }
        self.tail[l] = id;

        if self.max_inx[a] == NIL || inx > self.max_inx[a] {
            self.max_inx[a] = inx;
        }
    }

    /// Unlinks `cell` from the `from -> to` array.
    pub fn remove(&mut self, cell: usize, from: usize, to: usize) {
        let id = self.node_id(cell, from, to);
        let Node {
            prev,
            next,
            gain_inx: inx,
        } = self.nodes[id];
        debug_assert_ne!(inx, NIL, "cell {cell} not linked towards {to}");

        let a = self.array(from, to);
        let l = a * self.bucketsize + inx;
        if prev != NIL {
            self.nodes[prev].next = next;
        } else {
            self.head[l] = next;
        }
        if next != NIL {
            self.nodes[next].prev = prev;
        } else {
            self.tail[l] = prev;
        }
        self.nodes[id] = Node::UNLINKED;

        if self.head[l] == NIL && self.max_inx[a] == inx {
            let base = a * self.bucketsize;
            self.max_inx[a] = (0..inx)
                .rev()
                .find(|&i| self.head[base + i] != NIL)
                .unwrap_or(NIL);
        }
    }

    /// gain at which `cell` is linked towards `to`, if it is linked
    pub fn gain_of(&self, cell: usize, from: usize, to: usize) -> Option<Weight> {
        let inx = self.nodes[self.node_id(cell, from, to)].gain_inx;
        (inx != NIL).then(|| inx as Weight - self.max_gain)
    }

    /// Unlinks `cell` from every array of its source partition.
    pub fn delete_partb_nodes_of_cell(&mut self, cell: usize, from: usize) {
        for to in (0..self.noparts).filter(|&to| to != from) {
            if self.nodes[self.node_id(cell, from, to)].gain_inx != NIL {
                self.remove(cell, from, to);
            }
        }
    }

    /// Moves `cell` to the lists matching its current gains. Lists whose gain did not change are
    /// left alone, so the cell keeps its place in them.
    pub fn reposition(&mut self, cell: usize, from: usize, gains: &GainTable) {
        for to in (0..self.noparts).filter(|&to| to != from) {
            let inx = self.nodes[self.node_id(cell, from, to)].gain_inx;
            if inx == NIL {
                continue;
            }
            let gain = gains.gain(cell, to);
            if self.gain_inx(gain) != inx {
                self.remove(cell, from, to);
                self.insert(cell, from, to, gain);
            }
        }
    }

    /// Finds the linked cell with the highest gain among those accepted by `cell_ok`.
    ///
    /// Ties go to the lower destination, then the lower source, then whichever cell was linked
    /// first. `array_ok(from, to)` lets the caller skip whole arrays that cannot yield a move.
    pub fn select_max(
        &self,
        mut array_ok: impl FnMut(usize, usize) -> bool,
        mut cell_ok: impl FnMut(usize, usize, usize) -> bool,
    ) -> Option<Candidate> {
        let k = self.noparts;
        // (list index, node, from, to)
        let mut best: Option<(usize, usize, usize, usize)> = None;

        for to in 0..k {
            for from in (0..k).filter(|&from| from != to) {
                let a = self.array(from, to);
                let top = self.max_inx[a];
                if top == NIL {
                    continue;
                }
                let floor = match best {
                    Some((bi, ..)) if top <= bi => continue,
                    Some((bi, ..)) => bi + 1,
                    None => 0,
                };
                if !array_ok(from, to) {
                    continue;
                }

                'scan: for inx in (floor..=top).rev() {
                    let mut id = self.head[a * self.bucketsize + inx];
                    while id != NIL {
                        if cell_ok(self.cell_of(id), from, to) {
                            best = Some((inx, id, from, to));
                            break 'scan;
                        }
                        id = self.nodes[id].next;
                    }
                }
            }
        }

        best.map(|(inx, id, from, to)| Candidate {
            cell: self.cell_of(id),
            from,
            to,
            gain: inx as Weight - self.max_gain,
        })
    }

    /// Checks list links, node bookkeeping and the max pointers.
    pub fn check(&self) -> bool {
        let k = self.noparts;
        let bs = self.bucketsize;
        let mut nlinked = 0;
        for a in 0..k * (k - 1) {
            let mut top = NIL;
            for inx in 0..bs {
                let l = a * bs + inx;
                let mut prev = NIL;
                let mut id = self.head[l];
                while id != NIL {
                    let node = self.nodes[id];
                    assert_eq!(node.prev, prev);
                    assert_eq!(node.gain_inx, inx);
                    assert_eq!(id % (k - 1), a % (k - 1), "node in the wrong array");
                    nlinked += 1;
                    prev = id;
                    id = node.next;
                }
                assert_eq!(self.tail[l], prev);
                if prev != NIL {
                    top = inx;
                }
            }
            assert_eq!(self.max_inx[a], top, "stale max pointer in array {a}");
        }
        assert_eq!(
            nlinked,
            self.nodes.iter().filter(|n| n.gain_inx != NIL).count()
        );
        true
    }
}
