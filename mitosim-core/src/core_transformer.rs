//! Low-level rewrite primitives shared by fission and fusion: segment
//! removal with back-pointer repair, neighbour transplantation, and cluster
//! merging.
//!
//! Cluster ids are allowed to go sparse after a merge (the vacated id is
//! simply left with no members) rather than being compacted back into a
//! dense run the way the original keeps `clnum` tight. [`Structure::basic_update`]
//! already walks every segment's `cl` field from scratch each time it is
//! called, so a handful of empty clusters cost an empty vector each — not
//! worth the index-swapping the original performs to keep `clnum` minimal.

use crate::segment::End;
use crate::structure::Structure;

impl Structure {
    /// Removes segment `w`, fixing up the back-pointers of whatever segment
    /// used to live at the last index. Equivalent to `Vec::swap_remove`
    /// plus repairing every neighbour that pointed at the old last index.
    pub(crate) fn remove_segment(&mut self, w: usize) {
        let last = self.segments().len() - 1;
        if w != last {
            for end in [End::One, End::Two] {
                let neighbours = self.segment(last).neighbours(end).to_vec();
                for (cn, ce) in neighbours {
                    self.retarget_backpointer(cn, ce, last, end, w, end);
                }
            }
        }
        self.segments_mut().swap_remove(w);
    }

    /// In segment `cn`'s neighbour list at end `ce`, replaces the entry
    /// `(old_seg, old_end)` with `(new_seg, new_end)`.
    fn retarget_backpointer(
        &mut self,
        cn: usize,
        ce: End,
        old_seg: usize,
        old_end: End,
        new_seg: usize,
        new_end: End,
    ) {
        for slot in self.segment_mut(cn).neighbours_mut(ce) {
            if *slot == (old_seg, old_end) {
                *slot = (new_seg, new_end);
            }
        }
    }

    /// Moves segment `f`'s neighbour list at end `ef` onto segment `t`'s end
    /// `et`, and repairs every neighbour's back-pointer to follow. Matches
    /// `copy_neigs` followed by `update_neigs(..., removefromneigs=false)`.
    pub(crate) fn transplant_neighbours(&mut self, f: usize, ef: End, t: usize, et: End) {
        let moved = std::mem::take(self.segment_mut(f).neighbours_mut(ef));
        for &(cn, ce) in &moved {
            self.retarget_backpointer(cn, ce, f, ef, t, et);
        }
        *self.segment_mut(t).neighbours_mut(et) = moved;
    }

    /// Severs the mutual link between `(w1, e1)` and `(w2, e2)`, removing
    /// each from the other's neighbour list. Used by fission to detach a
    /// segment from its former partner.
    pub(crate) fn sever(&mut self, w1: usize, e1: End, w2: usize, e2: End) {
        self.segment_mut(w1)
            .neighbours_mut(e1)
            .retain(|&slot| slot != (w2, e2));
        self.segment_mut(w2)
            .neighbours_mut(e2)
            .retain(|&slot| slot != (w1, e1));
    }

    /// Links `(w1, e1)` and `(w2, e2)` as mutual neighbours.
    pub(crate) fn link(&mut self, w1: usize, e1: End, w2: usize, e2: End) {
        self.segment_mut(w1).neighbours_mut(e1).push((w2, e2));
        self.segment_mut(w2).neighbours_mut(e2).push((w1, e1));
    }

    /// Relabels every segment in cluster `from` to cluster `to`. Matches
    /// `update_mtcl_fuse`/`update_cl` minus the density-preserving swap.
    pub(crate) fn merge_clusters(&mut self, from: usize, to: usize) {
        if from == to {
            return;
        }
        for seg in self.segments_mut() {
            if seg.cl() == from {
                seg.set_cl_only(to);
            }
        }
    }

    /// Fuses free end `end` of `w1` with the same-numbered free end of
    /// `w2` — an antiparallel join, since the two segments run the same
    /// direction relative to the joined end. `w1 != w2`.
    ///
    /// # Panics
    /// Panics (as a contract violation) if `w1 == w2`, or if either `end`
    /// is not free.
    pub(crate) fn fuse_antiparallel(&mut self, end: End, w1: usize, w2: usize) {
        if w1 == w2 {
            crate::error::contract_violation(
                "fuse_antiparallel: w1 == w2, use fuse_to_loop instead",
            );
        }
        if self.segment(w1).nn(end) != 0 || self.segment(w2).nn(end) != 0 {
            crate::error::contract_violation("fuse_antiparallel: joined end is not free");
        }
        let cl1 = self.segment(w1).cl();
        let cl2 = self.segment(w2).cl();
        let opend = end.other();

        if end == End::One {
            self.transplant_neighbours(w1, End::Two, w1, End::One);
        }
        self.transplant_neighbours(w2, opend, w1, End::Two);

        if cl1 != cl2 {
            self.merge_clusters(cl2, cl1);
        }

        if end == End::One {
            self.segment_mut(w1).reflect_g();
        } else {
            self.segment_mut(w2).reflect_g();
        }

        let tail = std::mem::take(self.segment_mut(w2).edges_mut());
        self.segment_mut(w1).edges_mut().extend(tail);

        self.remove_segment(w2);
    }

    /// Fuses the free end-2 of `w2` to the free end-1 of `w1` — a parallel
    /// join, the two segments already running the same direction. The
    /// combined segment survives under `w1`'s index, with `w2`'s edges
    /// first; `w1`'s own former end-1 neighbour (the new outer end of the
    /// combined whole) is preserved via transplant from `w2`'s end 1.
    /// `w1 != w2`.
    ///
    /// # Panics
    /// Panics (as a contract violation) if `w1 == w2`, or if the relevant
    /// ends are not free.
    pub(crate) fn fuse_parallel(&mut self, w1: usize, w2: usize) {
        if w1 == w2 {
            crate::error::contract_violation("fuse_parallel: w1 == w2, use fuse_to_loop instead");
        }
        if self.segment(w1).nn(End::One) != 0 || self.segment(w2).nn(End::Two) != 0 {
            crate::error::contract_violation("fuse_parallel: joined end is not free");
        }
        let cl1 = self.segment(w1).cl();
        let cl2 = self.segment(w2).cl();

        self.transplant_neighbours(w2, End::One, w1, End::One);
        if cl1 != cl2 {
            self.merge_clusters(cl2, cl1);
        }

        let tail = std::mem::take(self.segment_mut(w1).edges_mut());
        self.segment_mut(w2).edges_mut().extend(tail);
        *self.segment_mut(w1).edges_mut() = std::mem::take(self.segment_mut(w2).edges_mut());

        self.remove_segment(w2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::Structure;

    fn two_tips() -> Structure {
        Structure::seed_linear(8, 4)
    }

    #[test]
    fn fuse_antiparallel_joins_two_free_tips_into_one_segment() {
        let mut s = two_tips();
        s.fuse_antiparallel(End::One, 0, 1);
        assert_eq!(s.segment_count(), 1);
        assert_eq!(s.segment(0).length(), 8);
    }

    #[test]
    fn fuse_parallel_joins_end2_of_w1_to_end1_of_w2() {
        let mut s = two_tips();
        s.fuse_parallel(0, 1);
        assert_eq!(s.segment_count(), 1);
        assert_eq!(s.segment(0).length(), 8);
    }

    #[test]
    #[should_panic(expected = "contract violation")]
    fn fuse_antiparallel_rejects_self_fusion() {
        let mut s = two_tips();
        s.fuse_antiparallel(End::One, 0, 0);
    }

    #[test]
    fn remove_segment_repairs_backpointers_to_the_moved_segment() {
        let mut s = Structure::seed_linear(12, 4);
        // segment 2 (the last index) is linked to segment 0; removing
        // segment 1 moves segment 2 into slot 1, so segment 0's
        // back-pointer must follow it from (2, One) to (1, One).
        s.link(2, End::One, 0, End::One);
        s.remove_segment(1);
        assert_eq!(s.segment_count(), 2);
        assert_eq!(s.segment(0).neighbours(End::One), &[(1, End::One)]);
    }
}
