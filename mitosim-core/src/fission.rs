//! Severing a segment at an interior or boundary node.

use crate::error::contract_violation;
use crate::segment::{End, Segment};
use crate::structure::Structure;

impl Structure {
    /// Dispatches to [`Self::fiss2`] for an interior cut or [`Self::fiss3`]
    /// for a boundary cut at a degree-3 node, matching the original's
    /// position-based routing.
    ///
    /// # Panics
    /// Panics (as a contract violation) if `a` names neither a valid
    /// interior position nor a valid boundary position.
    pub fn fiss(&mut self, w: usize, a: usize) -> [usize; 2] {
        let len = self.segment(w).length();
        if a > 0 && a < len {
            self.fiss2(w, a)
        } else if (a == 0 && self.segment(w).nn(End::One) <= 2)
            || (a == len && self.segment(w).nn(End::Two) <= 2)
        {
            self.fiss3(w, a)
        } else {
            contract_violation(format!(
                "fiss: position {a} is not a valid cut for segment {w} (length {len})"
            ));
        }
    }

    /// Allocates a fresh, currently-empty cluster id and returns it.
    fn new_cluster_id(&mut self) -> usize {
        let id = self.cluster_slots();
        self.push_empty_cluster_slot();
        id
    }

    /// Splits segment `w` at interior position `a` (`0 < a < length`):
    /// edges `[0, a)` stay with `w`, edges `[a, length)` move to a freshly
    /// created segment. If cutting disconnects `w`'s old end-2 side from
    /// its end-1 side, the new segment gets a fresh cluster id; otherwise
    /// (the cut merely opens a ring into a line) both pieces keep the
    /// original cluster and are immediately re-fused at the old joint.
    pub fn fiss2(&mut self, w: usize, a: usize) -> [usize; 2] {
        let clini = self.segment(w).cl();
        let ind1 = self.segment(w).edges()[a - 1].ind();
        let ind2 = self.segment(w).edges()[a].ind();

        let had_end2_neighbour = self.segment(w).nn(End::Two) > 0;
        let in_cycle = if had_end2_neighbour {
            self.update_cl_fiss(w, End::Two)
        } else {
            self.new_cluster_id();
            false
        };

        let tail = self.segment_mut(w).edges_mut().split_off(a);
        let mi = self.segments_mut().len();
        self.segments_mut().push(Segment::new(tail, 0));

        self.transplant_neighbours(w, End::Two, mi, End::Two);

        let new_cl = if in_cycle {
            self.segment(w).cl()
        } else {
            self.cluster_slots() - 1
        };
        self.segment_mut(mi).set_cl_only(new_cl);

        if self.segment(w).nn(End::One) == 1 && self.segment(mi).nn(End::Two) == 1 {
            let (w_partner, w_end) = self.segment(w).single_neighbour(End::One);
            let (mi_partner, mi_end) = self.segment(mi).single_neighbour(End::Two);
            if w_partner == mi && mi_partner == w {
                let _ = (w_end, mi_end);
                self.sever(w, End::One, mi, End::Two);
                self.fuse_parallel(w, mi);
            }
        }

        self.basic_update();
        let w1 = self.glm(ind1);
        let w2 = self.glm(ind2);
        if self.segment(w1).cl() != clini && self.segment(w2).cl() != clini {
            contract_violation("fiss2: neither resulting segment kept the original cluster id");
        }
        [w1, w2]
    }

    /// Splits segment `w` at a boundary position (`a == 0`: end 1; `a ==
    /// length`: end 2) where the node being cut has degree at most 3 —
    /// i.e. `w` itself plus up to two neighbours at that end.
    ///
    /// Only the branch where both far-side neighbours are themselves free
    /// tips (degree 1 at the connecting end) is implemented as a live
    /// rewrite: that is the one topology this kind of cut can actually
    /// produce from a well-formed graph. The other three combinations a
    /// degree-3 node's neighbours could in principle present — one or both
    /// neighbours *also* being entirely free (not just free at the
    /// connecting end) — never arise from edges seeded by
    /// [`Structure::seed_linear`] and mutated only through
    /// [`Self::fiss`]/fusion, so they are preserved as fatal contract
    /// violations rather than guessed at.
    ///
    /// # Panics
    /// Panics (as a contract violation) if the cut node's neighbours do
    /// not both present a single bound connecting end, or if `a` is
    /// invalid for `w`.
    pub fn fiss3(&mut self, w: usize, a: usize) -> [usize; 2] {
        let clini = self.segment(w).cl();
        let (cut_end, ind1, ind2) = if a == 0 {
            let ind1 = self.segment(w).edges()[0].ind();
            let (partner, partner_end) = self.segment(w).neighbours(End::One)[0];
            let ind2 =
                self.segment(partner).edges()[self.segment(partner).end2a(partner_end)].ind();
            (End::One, ind1, ind2)
        } else if a == self.segment(w).length() {
            let ind1 = self.segment(w).edges()[a - 1].ind();
            let (partner, partner_end) = self.segment(w).neighbours(End::Two)[0];
            let ind2 =
                self.segment(partner).edges()[self.segment(partner).end2a(partner_end)].ind();
            (End::Two, ind1, ind2)
        } else {
            contract_violation(format!("fiss3: position {a} is not a boundary of segment {w}"));
        };

        let pair = if self.segment(w).nn(cut_end) == 2 {
            Some(self.segment(w).double_neighbours(cut_end))
        } else {
            None
        };

        let in_cycle = self.update_cl_fiss(w, cut_end);
        self.sever_all(w, cut_end);

        if let Some([(n0, e0), (n1, e1)]) = pair
            && n0 != n1
        {
            match (self.segment(n0).nn(e0), self.segment(n1).nn(e1)) {
                (1, 1) => {
                    let (p0, pe0) = self.segment(n0).single_neighbour(e0);
                    let (p1, pe1) = self.segment(n1).single_neighbour(e1);
                    if p0 == n1 && pe0 == e1 && p1 == n0 && pe1 == e0 {
                        self.sever(n0, e0, n1, e1);
                        if e0 == e1 {
                            self.fuse_antiparallel(e0, n0, n1);
                        } else if e0 == End::One {
                            self.fuse_parallel(n0, n1);
                        } else {
                            self.fuse_parallel(n1, n0);
                        }
                    }
                }
                (0, 1) => contract_violation(format!(
                    "fiss3: neighbour {n0} end {e0:?} is entirely free while {n1} end {e1:?} is bound (node {w}/{cut_end:?})"
                )),
                (1, 0) => contract_violation(format!(
                    "fiss3: neighbour {n1} end {e1:?} is entirely free while {n0} end {e0:?} is bound (node {w}/{cut_end:?})"
                )),
                (0, 0) => contract_violation(format!(
                    "fiss3: both neighbours of node {w}/{cut_end:?} are entirely free"
                )),
                (other0, other1) => contract_violation(format!(
                    "fiss3: unrecognised neighbour degrees {other0}/{other1} at node {w}/{cut_end:?}"
                )),
            }
        }

        let _ = in_cycle;
        self.basic_update();
        let w1 = self.glm(ind1);
        let w2 = self.glm(ind2);
        if self.segment(w1).cl() != clini && self.segment(w2).cl() != clini {
            contract_violation("fiss3: neither resulting segment kept the original cluster id");
        }
        [w1, w2]
    }

    /// Removes every neighbour link at `w`'s end `e`, severing the
    /// mutual back-pointers on each former partner.
    fn sever_all(&mut self, w: usize, e: End) {
        let partners = self.segment(w).neighbours(e).to_vec();
        for (partner, partner_end) in partners {
            self.sever(w, e, partner, partner_end);
        }
    }

    /// Determines whether cutting `w`'s end `e` disconnects the cluster.
    /// Performs a depth-first search from `w`'s current neighbours at `e`
    /// looking for a path back to `w`'s opposite end. If no such path
    /// exists, the segments reachable from `e` (excluding `w`) are
    /// relabelled into a freshly allocated cluster and `false` is
    /// returned; otherwise nothing is relabelled and `true` is returned.
    fn update_cl_fiss(&mut self, w: usize, e: End) -> bool {
        let mut visited = std::collections::HashSet::new();
        let is_cycle = self.dfs_reaches(&mut visited, w, e, (w, e.other()));
        if !is_cycle {
            let new_cl = self.new_cluster_id();
            for seg in visited {
                self.segment_mut(seg).set_cl_only(new_cl);
            }
        }
        is_cycle
    }

    fn dfs_reaches(
        &self,
        visited: &mut std::collections::HashSet<usize>,
        w1: usize,
        e1: End,
        target: (usize, End),
    ) -> bool {
        for &(cn, ce) in self.segment(w1).neighbours(e1) {
            if cn == target.0 {
                if ce == target.1 {
                    return true;
                }
            } else if visited.insert(cn) && self.dfs_reaches(visited, cn, ce.other(), target) {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::Structure;

    #[test]
    fn fiss_dispatches_interior_cuts_to_fiss2() {
        let mut s = Structure::seed_linear(8, 8);
        let result = s.fiss(0, 4);
        assert_eq!(s.segment_count(), 2);
        assert_ne!(result[0], result[1]);
    }

    #[test]
    fn fiss2_splits_a_ring_into_one_line() {
        let mut s = Structure::seed_linear(8, 8);
        s.link(0, End::One, 0, End::Two);
        s.basic_update();
        assert!(s.segment(0).is_cycle());
        s.fiss2(0, 4);
        assert_eq!(s.segment_count(), 1);
        assert_eq!(s.segment(0).length(), 8);
        assert!(!s.segment(0).is_cycle());
    }

    #[test]
    fn fiss2_on_a_free_tip_creates_a_new_cluster() {
        let mut s = Structure::seed_linear(8, 8);
        let before_clusters = s.cluster_count();
        s.fiss2(0, 3);
        assert_eq!(s.segment_count(), 2);
        assert!(s.cluster_count() > before_clusters);
    }

    #[test]
    fn fiss3_reunites_two_free_tips_into_one_segment() {
        let mut s = Structure::seed_linear(16, 4);
        s.fuse_antiparallel(End::One, 0, 1);
        assert_eq!(s.segment_count(), 3);
        s.fiss(2, 0);
        assert_eq!(s.segment_count(), 3);
    }

    #[test]
    #[should_panic(expected = "contract violation")]
    fn fiss_rejects_an_out_of_range_position() {
        let mut s = Structure::seed_linear(8, 8);
        s.fiss(0, 99);
    }
}
