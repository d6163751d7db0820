//! The segment arena, cluster partition, and endpoint classification.

use crate::edge::Edge;
use crate::error::contract_violation;
use crate::segment::{End, Segment};

/// The segment arena and the derived index tables that describe the
/// current cluster partition and endpoint classification.
///
/// Structure exclusively owns every segment and, transitively, every edge.
/// All mutation funnels through the rewrite primitives in
/// [`crate::core_transformer`], [`crate::fission`], and [`crate::fusion`],
/// which are implemented as methods on `Structure` in their own modules.
#[derive(Debug, Default)]
pub struct Structure {
    mt: Vec<Segment>,
    /// `glm[ind]`: segment index containing edge `ind`.
    glm: Vec<usize>,
    /// `gla[ind]`: position of edge `ind` within its segment.
    gla: Vec<usize>,
    /// `clmt[c]`: segment indices in cluster `c`.
    clmt: Vec<Vec<usize>>,
    /// `cls[c]`: edge count of cluster `c`.
    cls: Vec<usize>,
    /// Segments with both ends free.
    mt11: Vec<usize>,
    /// Segments that are separate cycles.
    mt22: Vec<usize>,
    /// Segments with both ends at degree 2.
    mt33: Vec<usize>,
    /// Segments with one free end, recorded as `(segment, free_end)`.
    mt13: Vec<(usize, End)>,
    mtc11: Vec<Vec<usize>>,
    mtc22: Vec<Vec<usize>>,
    mtc33: Vec<Vec<(usize, End)>>,
    mtc13: Vec<Vec<(usize, End)>>,
    /// Global counts of nodes of degree 1, 2, and 3.
    nn: [usize; 3],
    edge_mass: usize,
}

impl Structure {
    /// Builds the initial state: `mtmassini / segmassini` separate linear
    /// segments, each its own cluster, each free at both ends. Matches the
    /// original's `generate_mitos`.
    ///
    /// # Panics
    /// Panics if fewer than one segment results (`mtmassini < segmassini`).
    #[must_use]
    pub fn seed_linear(mtmassini: usize, segmassini: usize) -> Self {
        let mtnum = mtmassini / segmassini;
        if mtnum < 1 {
            contract_violation("the system should have at least one segment initially");
        }

        let mut mt = Vec::with_capacity(mtnum);
        let mut ind = 0usize;
        for cl in 0..mtnum {
            let g: Vec<Edge> = (0..segmassini)
                .map(|indcl| {
                    let edge = Edge::new(ind, indcl, cl);
                    ind += 1;
                    edge
                })
                .collect();
            mt.push(Segment::new(g, cl));
        }

        let mut structure = Self {
            mt,
            edge_mass: mtnum * segmassini,
            ..Self::default()
        };
        structure.basic_update();
        structure
    }

    /// The number of live segments.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.mt.len()
    }

    /// The number of distinct clusters in use.
    #[must_use]
    pub fn cluster_count(&self) -> usize {
        self.cls.len()
    }

    /// Total edge count across every cluster (`mtmass`), fixed for the
    /// lifetime of a run: neither fission nor fusion creates or destroys
    /// edges, only regroups them among segments.
    #[must_use]
    pub const fn edge_mass(&self) -> usize {
        self.edge_mass
    }

    /// Read-only access to the segment arena.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.mt
    }

    pub(crate) fn segments_mut(&mut self) -> &mut Vec<Segment> {
        &mut self.mt
    }

    pub(crate) fn segment(&self, w: usize) -> &Segment {
        &self.mt[w]
    }

    pub(crate) fn segment_mut(&mut self, w: usize) -> &mut Segment {
        &mut self.mt[w]
    }

    /// Edge count of cluster `c`.
    #[must_use]
    pub fn cluster_size(&self, c: usize) -> usize {
        self.cls[c]
    }

    /// Segment indices belonging to cluster `c`.
    #[must_use]
    pub fn cluster_segments(&self, c: usize) -> &[usize] {
        &self.clmt[c]
    }

    /// Segments with both ends free.
    #[must_use]
    pub fn bucket_11(&self) -> &[usize] {
        &self.mt11
    }

    /// Segments that are separate cycles.
    #[must_use]
    pub fn bucket_22(&self) -> &[usize] {
        &self.mt22
    }

    /// Segments with both ends at degree 2.
    #[must_use]
    pub fn bucket_33(&self) -> &[usize] {
        &self.mt33
    }

    /// Segments with one free end, as `(segment, free_end)`.
    #[must_use]
    pub fn bucket_13(&self) -> &[(usize, End)] {
        &self.mt13
    }

    /// Per-cluster mirror of [`Self::bucket_11`].
    #[must_use]
    pub fn cluster_bucket_11(&self, c: usize) -> &[usize] {
        &self.mtc11[c]
    }

    /// Per-cluster mirror of [`Self::bucket_22`].
    #[must_use]
    pub fn cluster_bucket_22(&self, c: usize) -> &[usize] {
        &self.mtc22[c]
    }

    /// Per-cluster mirror of [`Self::bucket_33`].
    #[must_use]
    pub fn cluster_bucket_33(&self, c: usize) -> &[(usize, End)] {
        &self.mtc33[c]
    }

    /// Per-cluster mirror of [`Self::bucket_13`].
    #[must_use]
    pub fn cluster_bucket_13(&self, c: usize) -> &[(usize, End)] {
        &self.mtc13[c]
    }

    /// Global counts of nodes of degree 1, 2, and 3.
    #[must_use]
    pub const fn node_counts(&self) -> [usize; 3] {
        self.nn
    }

    pub(crate) fn glm(&self, ind: usize) -> usize {
        self.glm[ind]
    }

    pub(crate) fn gla(&self, ind: usize) -> usize {
        self.gla[ind]
    }

    /// The number of cluster-id slots currently allocated (some may be
    /// empty after a merge — see the module note on sparse cluster ids).
    pub(crate) fn cluster_slots(&self) -> usize {
        self.cls.len()
    }

    /// Appends one fresh, empty cluster slot and returns nothing; the new
    /// id is `cluster_slots() - 1` after the call.
    pub(crate) fn push_empty_cluster_slot(&mut self) {
        self.clmt.push(Vec::new());
        self.cls.push(0);
    }

    /// Rebuilds `glm`, `gla`, `cls`, the classification buckets, and node
    /// counts from scratch. Called after every rewrite so the Classifier
    /// always observes a consistent view.
    ///
    /// # Panics
    /// Panics (as a contract violation) if a segment does not match one of
    /// the four recognised endpoint patterns — see
    /// [`Self::populate_cluster_vectors`].
    pub fn basic_update(&mut self) {
        self.rebuild_index_maps();
        self.rebuild_cluster_tables();
        self.populate_cluster_vectors();
        self.update_node_numbers();
    }

    fn rebuild_index_maps(&mut self) {
        self.glm = vec![0; self.edge_mass.max(self.glm.len())];
        self.gla = vec![0; self.edge_mass.max(self.gla.len())];
        for (w, seg) in self.mt.iter().enumerate() {
            for (pos, edge) in seg.edges().iter().enumerate() {
                self.glm[edge.ind()] = w;
                self.gla[edge.ind()] = pos;
            }
        }
    }

    /// Groups segments by cluster and, per cluster, renumbers every edge's
    /// `indcl` to a dense `[0, size)` run — the analogue of the original's
    /// `update_gIndcl`, folded into the from-scratch rebuild rather than
    /// invoked incrementally after every cluster merge.
    fn rebuild_cluster_tables(&mut self) {
        let clnum = self.mt.iter().map(|s| s.cl()).max().map_or(0, |m| m + 1);
        self.clmt = vec![Vec::new(); clnum];
        self.cls = vec![0; clnum];
        for (w, seg) in self.mt.iter().enumerate() {
            self.clmt[seg.cl()].push(w);
        }
        for (cl, members) in self.clmt.iter().enumerate() {
            let mut base = 0;
            for &w in members {
                base = self.mt[w].set_g_cl(cl, base);
            }
            self.cls[cl] = base;
        }
    }

    /// Classifies every segment into the four reaction-relevant endpoint
    /// buckets, maintaining the per-cluster mirrors in lock-step.
    ///
    /// A one-free-end segment only joins `mt13` when its other end is
    /// itself a branch node (`nn == 2`); one free end opposite a plain
    /// `nn == 1` continuation is a passthrough and joins no bucket. Any
    /// other bound/bound shape that is neither a cycle nor a `nn == 2`/
    /// `nn == 2` pair is a corrupted graph.
    ///
    /// # Panics
    /// Panics (as a contract violation) if a segment's endpoint pattern
    /// matches none of `mt11`/`mt22`/`mt33`/`mt13`/passthrough.
    fn populate_cluster_vectors(&mut self) {
        self.mt11.clear();
        self.mt22.clear();
        self.mt33.clear();
        self.mt13.clear();
        let clnum = self.cls.len();
        self.mtc11 = vec![Vec::new(); clnum];
        self.mtc22 = vec![Vec::new(); clnum];
        self.mtc33 = vec![Vec::new(); clnum];
        self.mtc13 = vec![Vec::new(); clnum];

        for (w, seg) in self.mt.iter().enumerate() {
            let (n1, n2) = (seg.nn(End::One), seg.nn(End::Two));
            let cl = seg.cl();
            match seg.has_one_free_end() {
                Some(free_end) => {
                    let other_nn = match free_end {
                        End::One => n2,
                        End::Two => n1,
                    };
                    if other_nn == 2 {
                        self.mt13.push((w, free_end));
                        self.mtc13[cl].push((w, free_end));
                    }
                    // other_nn == 1: a free end opposite a plain
                    // continuation node — passthrough, no bucket.
                }
                None if n1 == 0 && n2 == 0 => {
                    self.mt11.push(w);
                    self.mtc11[cl].push(w);
                }
                None if seg.is_cycle() => {
                    self.mt22.push(w);
                    self.mtc22[cl].push(w);
                }
                None if n1 == 2 && n2 == 2 => {
                    self.mtc33[cl].push((w, End::One));
                }
                None => contract_violation(format!(
                    "populate_cluster_vectors: segment {w} failed classification (nn1={n1}, nn2={n2})"
                )),
            }
        }
        self.mt33 = self
            .mtc33
            .iter()
            .flatten()
            .map(|&(w, _)| w)
            .collect::<Vec<_>>();
    }

    /// Refreshes `nn[0..2]` by summing [`Segment::num_nodes`] over every
    /// segment and dividing the degree-3 total by three.
    fn update_node_numbers(&mut self) {
        let mut totals = [0usize; 3];
        for seg in &self.mt {
            totals[0] += seg.num_nodes(1);
            totals[1] += seg.num_nodes(2);
            totals[2] += seg.num_nodes(3);
        }
        totals[2] /= 3;
        self.nn = totals;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_linear_builds_one_cluster_per_segment() {
        let s = Structure::seed_linear(8, 4);
        assert_eq!(s.segment_count(), 2);
        assert_eq!(s.cluster_count(), 2);
        assert_eq!(s.edge_mass(), 8);
        assert_eq!(s.bucket_11().len(), 2);
        assert!(s.bucket_22().is_empty());
    }

    #[test]
    fn seed_linear_assigns_dense_global_edge_indices() {
        let s = Structure::seed_linear(8, 4);
        let mut inds: Vec<_> = s.segments().iter().flat_map(Segment::edges).map(Edge::ind).collect();
        inds.sort_unstable();
        assert_eq!(inds, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn node_counts_match_all_free_tips() {
        let s = Structure::seed_linear(8, 4);
        // two segments, each contributing 2 degree-1 nodes, 3 degree-2 nodes, 0 degree-3
        assert_eq!(s.node_counts(), [4, 6, 0]);
    }

    #[test]
    #[should_panic(expected = "at least one segment")]
    fn seed_linear_rejects_zero_segments() {
        let _ = Structure::seed_linear(2, 4);
    }
}
