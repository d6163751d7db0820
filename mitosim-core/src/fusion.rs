//! Joining two free ends, or one free end to an interior or separate-cycle
//! node, into a single continuous node.

use crate::segment::End;
use crate::structure::Structure;

impl Structure {
    /// Fuses free end `e1` of `w1` with free end `e2` of `w2`, both
    /// currently degree-1 nodes. Dispatches on whether the two partners
    /// are the same segment (self-fusion into a loop) and, if not, on
    /// whether the joined ends are the same numbered end (antiparallel)
    /// or different (parallel).
    pub fn fuse11(&mut self, w1: usize, e1: End, w2: usize, e2: End) -> [usize; 2] {
        if w1 == w2 {
            return self.fuse_to_loop(w1);
        }
        let cl1 = self.segment(w1).cl();
        let cl2 = self.segment(w2).cl();
        if e1 == e2 {
            self.fuse_antiparallel(e1, w1, w2);
        } else if e1 == End::One {
            self.fuse_parallel(w1, w2);
        } else {
            self.fuse_parallel(w2, w1);
        }
        [cl1, cl2]
    }

    /// Joins the free end `e1` of `w1` to a disconnected cycle `w2`,
    /// splitting `w2`'s single ring node into two degree-3 nodes bound to
    /// `w1`. `w2` must be a separate cycle (see [`crate::segment::Segment::is_cycle`]).
    pub fn fuse1_l(&mut self, w1: usize, e1: End, w2: usize) -> [usize; 2] {
        let cl1 = self.segment(w1).cl();
        let cl2 = self.segment(w2).cl();

        self.link(w1, e1, w2, End::One);
        self.link(w1, e1, w2, End::Two);
        self.link(w2, End::One, w2, End::Two);

        if cl1 != cl2 {
            self.merge_clusters(cl2, cl1);
        }
        self.basic_update();
        [cl1, cl2]
    }

    /// Joins the free end `end` of `w1` to the interior node at position
    /// `a2` of `w2` — cutting `w2` there first (or, if `w1 == w2`, wiring
    /// the resulting pieces directly since the usual after-cut bookkeeping
    /// doesn't apply to a segment fusing to itself).
    pub fn fuse12(&mut self, w1: usize, end: End, w2: usize, a2: usize) -> [usize; 2] {
        let cl1 = self.segment(w1).cl();
        let cl2 = self.segment(w2).cl();
        let was_cycle = self.segment(w2).is_cycle();
        let mi = if was_cycle {
            w2
        } else {
            self.segments_mut().len()
        };

        self.fiss2(w2, a2);

        if w1 == w2 {
            if end == End::One {
                self.link(w1, End::One, w1, End::Two);
                self.link(w1, End::One, mi, End::One);
                self.link(w1, End::Two, mi, End::One);
            } else {
                self.link(w1, End::Two, mi, End::One);
                self.link(w1, End::Two, mi, End::Two);
                self.link(mi, End::One, mi, End::Two);
            }
        } else {
            self.link(w1, end, w2, End::Two);
            self.link(w1, end, mi, End::One);
            self.link(w2, End::Two, mi, End::One);
        }

        let cl_w2 = self.segment(w2).cl();
        let cl_mi = self.segment(mi).cl();
        if cl_w2 != cl_mi {
            self.merge_clusters(cl_mi, cl_w2);
        }
        let cl_w1 = self.segment(w1).cl();
        if cl_w2 != cl_w1 {
            self.merge_clusters(cl_w2, cl_w1);
        }

        self.basic_update();
        [cl1, cl2]
    }

    /// Joins a disconnected segment's two free ends to itself, forming a
    /// separate cycle.
    ///
    /// # Panics
    /// Panics (as a contract violation) if `w` is already a cycle, or if
    /// either end is already bound.
    pub fn fuse_to_loop(&mut self, w: usize) -> [usize; 2] {
        if self.segment(w).is_cycle() {
            crate::error::contract_violation("fuse_to_loop: segment is already a separate cycle");
        }
        if self.segment(w).nn(End::One) != 0 || self.segment(w).nn(End::Two) != 0 {
            crate::error::contract_violation("fuse_to_loop: segment is not free at both ends");
        }
        self.link(w, End::One, w, End::Two);
        let cl = self.segment(w).cl();
        [cl, cl]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::Structure;

    #[test]
    fn fuse11_self_fusion_makes_a_loop() {
        let mut s = Structure::seed_linear(8, 8);
        s.fuse11(0, End::One, 0, End::Two);
        s.basic_update();
        assert!(s.segment(0).is_cycle());
    }

    #[test]
    fn fuse11_antiparallel_joins_matching_ends() {
        let mut s = Structure::seed_linear(8, 4);
        s.fuse11(0, End::One, 1, End::One);
        assert_eq!(s.segment_count(), 1);
    }

    #[test]
    fn fuse11_parallel_joins_opposite_ends() {
        let mut s = Structure::seed_linear(8, 4);
        s.fuse11(0, End::Two, 1, End::One);
        assert_eq!(s.segment_count(), 1);
    }

    #[test]
    fn fuse_to_loop_self_joins_both_free_ends() {
        let mut s = Structure::seed_linear(8, 8);
        s.fuse_to_loop(0);
        s.basic_update();
        assert!(s.segment(0).is_cycle());
    }

    #[test]
    #[should_panic(expected = "contract violation")]
    fn fuse_to_loop_rejects_an_already_bound_end() {
        let mut s = Structure::seed_linear(16, 4);
        s.fuse_antiparallel(End::One, 0, 1);
        s.fuse_to_loop(0);
    }

    #[test]
    fn fuse12_joins_a_free_tip_to_an_interior_node() {
        let mut s = Structure::seed_linear(16, 8);
        s.fuse12(0, End::Two, 1, 4);
        assert_eq!(s.segment_count(), 3);
        assert_eq!(s.node_counts()[2], 1);
    }

    #[test]
    fn fuse1_l_joins_a_free_tip_to_a_separate_cycle() {
        let mut s = Structure::seed_linear(16, 8);
        s.fuse_to_loop(1);
        s.basic_update();
        s.fuse1_l(0, End::Two, 1);
        assert_eq!(s.node_counts()[2], 2);
    }
}
