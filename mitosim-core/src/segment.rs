//! A linear run of edges with up to two neighbours per end.

use crate::edge::Edge;
use crate::error::contract_violation;

/// One of the two ends of a [`Segment`]. End one is the low-index side of
/// the edge sequence; end two is the high-index side.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum End {
    /// The low-index side of the edge sequence.
    One,
    /// The high-index side of the edge sequence.
    Two,
}

impl End {
    /// The other end.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }

    /// `0` for [`End::One`], `1` for [`End::Two`] — indexes the
    /// per-end array pair stored on [`Segment`] and the `fin` pair on
    /// [`Edge`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }

    /// The wire-format numeral for this end (`1` or `2`).
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }

    pub(crate) const fn from_index(index: usize) -> Self {
        if index == 0 { Self::One } else { Self::Two }
    }
}

/// A maximal linear run of edges with no interior branching.
#[derive(Clone, Debug, Default)]
pub struct Segment {
    g: Vec<Edge>,
    cl: usize,
    /// Neighbour pairs `(segment index, connecting end)` at each end, in
    /// arbitrary but stable order. `neig[e].len()` is the node degree
    /// contributed by this segment's end `e`: `0`, `1`, or `2`.
    neig: [Vec<(usize, End)>; 2],
}

impl Segment {
    /// Builds a segment from an edge run and cluster index, with no
    /// neighbours at either end.
    #[must_use]
    pub fn new(g: Vec<Edge>, cl: usize) -> Self {
        Self {
            g,
            cl,
            neig: [Vec::new(), Vec::new()],
        }
    }

    /// The edge count.
    #[must_use]
    pub fn length(&self) -> usize {
        self.g.len()
    }

    /// The edges, in end-1-to-end-2 order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.g
    }

    /// Mutable access to the edges, for callers that need to rewrite `cl`
    /// or `fin` fields directly (the rewrite primitives).
    pub(crate) fn edges_mut(&mut self) -> &mut Vec<Edge> {
        &mut self.g
    }

    /// The cluster this segment belongs to.
    #[must_use]
    pub const fn cl(&self) -> usize {
        self.cl
    }

    pub(crate) const fn set_cl_only(&mut self, cl: usize) {
        self.cl = cl;
    }

    /// The node degree contributed by end `e`: `0`, `1`, or `2`.
    #[must_use]
    pub fn nn(&self, e: End) -> u8 {
        self.neig[e.index()].len() as u8
    }

    /// The neighbour pairs at end `e`.
    #[must_use]
    pub fn neighbours(&self, e: End) -> &[(usize, End)] {
        &self.neig[e.index()]
    }

    pub(crate) fn neighbours_mut(&mut self, e: End) -> &mut Vec<(usize, End)> {
        &mut self.neig[e.index()]
    }

    /// The position index of the boundary edge at end `e`: `0` for
    /// [`End::One`], `length - 1` for [`End::Two`].
    #[must_use]
    pub fn end2a(&self, e: End) -> usize {
        match e {
            End::One => 0,
            End::Two => self.length().saturating_sub(1),
        }
    }

    /// Returns the free end when exactly one end is free, else `None`.
    #[must_use]
    pub fn has_one_free_end(&self) -> Option<End> {
        match (self.nn(End::One), self.nn(End::Two)) {
            (0, n) if n > 0 => Some(End::One),
            (n, 0) if n > 0 => Some(End::Two),
            _ => None,
        }
    }

    /// The single neighbour at end `e`.
    ///
    /// # Panics
    /// Panics (as a contract violation) if `nn(e) != 1`.
    #[must_use]
    pub fn single_neighbour(&self, e: End) -> (usize, End) {
        let slots = &self.neig[e.index()];
        if slots.len() != 1 {
            contract_violation(format!(
                "single_neighbour called with nn(e) == {} (expected 1)",
                slots.len()
            ));
        }
        slots[0]
    }

    /// The two neighbours at end `e`.
    ///
    /// # Panics
    /// Panics (as a contract violation) if `nn(e) != 2`.
    #[must_use]
    pub fn double_neighbours(&self, e: End) -> [(usize, End); 2] {
        let slots = &self.neig[e.index()];
        if slots.len() != 2 {
            contract_violation(format!(
                "double_neighbours called with nn(e) == {} (expected 2)",
                slots.len()
            ));
        }
        [slots[0], slots[1]]
    }

    /// True iff this segment is the entire cluster closed onto itself: both
    /// ends carry exactly one neighbour, and that neighbour is the same
    /// segment at both ends.
    #[must_use]
    pub fn is_cycle(&self) -> bool {
        self.nn(End::One) == 1
            && self.nn(End::Two) == 1
            && self.single_neighbour(End::One).0 == self.single_neighbour(End::Two).0
    }

    /// Number-of-nodes contribution this segment makes to the global count
    /// of degree-`deg` nodes.
    ///
    /// # Panics
    /// Panics if `deg` is not `1`, `2`, or `3`.
    #[must_use]
    pub fn num_nodes(&self, deg: u8) -> usize {
        let (n1, n2) = (self.nn(End::One), self.nn(End::Two));
        match deg {
            1 => {
                if n1 > 0 && n2 > 0 {
                    0
                } else if n1 == 0 && n2 == 0 {
                    2
                } else {
                    1
                }
            }
            2 => {
                if n1 > 0 && n2 > 0 && self.is_cycle() {
                    self.length()
                } else {
                    self.length().saturating_sub(1)
                }
            }
            3 => match (n1 == 2, n2 == 2) {
                (true, true) => 2,
                (true, false) | (false, true) => 1,
                (false, false) => 0,
            },
            other => contract_violation(format!("num_nodes: unsupported deg {other}")),
        }
    }

    /// Renumbers every edge's `cl` and `indcl` so the segment's edges
    /// occupy `[base, base + length)` within `newcl`. Returns
    /// `base + length`.
    pub fn set_g_cl(&mut self, newcl: usize, base: usize) -> usize {
        for (i, edge) in self.g.iter_mut().enumerate() {
            edge.set_cl(newcl, base + i);
        }
        base + self.g.len()
    }

    /// [`Self::set_g_cl`] plus updating the segment's own `cl`.
    pub fn set_cl(&mut self, newcl: usize, base: usize) -> usize {
        self.cl = newcl;
        self.set_g_cl(newcl, base)
    }

    /// Sets the end-`e` fission weight to `1` iff that end is bound, `0`
    /// otherwise. Returns the new value.
    pub fn set_end_fin(&mut self, e: End) -> u64 {
        let bound = u64::from(self.nn(e) > 0);
        let pos = self.end2a(e);
        self.g[pos].set_fin(e.index(), bound);
        bound
    }

    /// Sets both sides of the inter-edge boundary between `g[a]` and
    /// `g[a + 1]` to `1`. Returns the value written.
    ///
    /// # Panics
    /// Panics if `a + 1` is out of range.
    pub fn set_bulk_fin(&mut self, a: usize) -> u64 {
        assert!(a + 1 < self.g.len(), "set_bulk_fin: a+1 out of range");
        self.g[a].set_fin(End::Two.index(), 1);
        self.g[a + 1].set_fin(End::One.index(), 1);
        1
    }

    /// Reverses the edge sequence and reflects every edge, leaving the
    /// neighbour arrays untouched. This is the low-level primitive used by
    /// `fuse_antiparallel`, which relocates neighbour records itself
    /// before calling this.
    pub fn reflect_g(&mut self) {
        self.g.reverse();
        for edge in &mut self.g {
            edge.reflect();
        }
    }

    /// The full, self-contained reflection: [`Self::reflect_g`] plus
    /// swapping the end-1/end-2 neighbour arrays. Applying this twice is
    /// the identity on both `g` order and the neighbour lists.
    pub fn reflect(&mut self) {
        self.reflect_g();
        self.neig.swap(0, 1);
    }

    /// Serialises the segment snapshot: `length`, `cl`, then for each end
    /// `nn[e]` followed by `nn[e]` `(neig, neen)` pairs, then the edges,
    /// all as little-endian `u64`s.
    pub fn write(&self, sink: &mut impl std::io::Write) -> std::io::Result<()> {
        for value in [self.length() as u64, self.cl as u64] {
            sink.write_all(&value.to_le_bytes())?;
        }
        for end in [End::One, End::Two] {
            let neighbours = self.neighbours(end);
            sink.write_all(&(neighbours.len() as u64).to_le_bytes())?;
            for &(seg, connecting_end) in neighbours {
                sink.write_all(&(seg as u64).to_le_bytes())?;
                sink.write_all(&connecting_end.as_u64().to_le_bytes())?;
            }
        }
        for edge in &self.g {
            edge.write(sink)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear(len: usize, cl: usize) -> Segment {
        let g = (0..len).map(|i| Edge::new(i, i, cl)).collect();
        Segment::new(g, cl)
    }

    #[test]
    fn end2a_picks_boundary_positions() {
        let s = linear(4, 0);
        assert_eq!(s.end2a(End::One), 0);
        assert_eq!(s.end2a(End::Two), 3);
    }

    #[test]
    fn has_one_free_end_reports_the_free_side() {
        let mut s = linear(3, 0);
        assert_eq!(s.has_one_free_end(), None);
        s.neighbours_mut(End::Two).push((4, End::One));
        assert_eq!(s.has_one_free_end(), Some(End::One));
    }

    #[test]
    fn num_nodes_matches_each_degree_rule() {
        let tip = linear(5, 0);
        assert_eq!(tip.num_nodes(1), 2);
        assert_eq!(tip.num_nodes(2), 4);
        assert_eq!(tip.num_nodes(3), 0);

        let mut bound_once = linear(5, 0);
        bound_once.neighbours_mut(End::One).push((9, End::Two));
        assert_eq!(bound_once.num_nodes(1), 1);

        let mut bound_both = linear(5, 0);
        bound_both.neighbours_mut(End::One).push((9, End::Two));
        bound_both.neighbours_mut(End::Two).push((9, End::One));
        assert_eq!(bound_both.num_nodes(1), 0);
    }

    #[test]
    fn is_cycle_requires_same_neighbour_at_both_ends() {
        let mut s = linear(6, 0);
        s.neighbours_mut(End::One).push((0, End::Two));
        s.neighbours_mut(End::Two).push((0, End::One));
        assert!(s.is_cycle());
    }

    #[test]
    fn set_g_cl_renumbers_indcl_contiguously() {
        let mut s = linear(3, 0);
        let next = s.set_g_cl(7, 10);
        assert_eq!(next, 13);
        for (i, e) in s.edges().iter().enumerate() {
            assert_eq!(e.cl(), 7);
            assert_eq!(e.indcl(), 10 + i);
        }
    }

    #[test]
    fn reflect_is_its_own_inverse() {
        let mut s = linear(4, 0);
        s.neighbours_mut(End::One).push((5, End::Two));
        let before_g: Vec<_> = s.edges().iter().map(|e| e.ind()).collect();
        let before_neig_one = s.neighbours(End::One).to_vec();
        s.reflect();
        s.reflect();
        let after_g: Vec<_> = s.edges().iter().map(|e| e.ind()).collect();
        assert_eq!(before_g, after_g);
        assert_eq!(before_neig_one, s.neighbours(End::One));
    }

    #[test]
    fn set_bulk_fin_sets_both_sides_of_a_boundary() {
        let mut s = linear(4, 0);
        s.set_bulk_fin(1);
        assert_eq!(s.edges()[1].fin(End::Two.index()), 1);
        assert_eq!(s.edges()[2].fin(End::One.index()), 1);
    }

    #[test]
    #[should_panic(expected = "contract violation")]
    fn double_neighbours_panics_on_wrong_degree() {
        let s = linear(3, 0);
        let _ = s.double_neighbours(End::One);
    }
}
