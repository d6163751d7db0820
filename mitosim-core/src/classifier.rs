//! Candidate enumeration for the four rewrite rules: the tip-position
//! weights fission samples from, and the tip/interior pairs each fusion
//! flavour can fire on.
//!
//! Each enumerator owns a flat candidate list that [`Self::populate`]
//! clears and rebuilds from the current [`Structure`] state; a rule's
//! propensity is simply the resulting list length (or, for fission, the
//! summed site weight). Firing draws a uniform index (or weight) and
//! looks the candidate up — the enumerators never execute a rewrite
//! themselves.

use crate::segment::End;
use crate::structure::Structure;

/// Minimum edge count a segment must retain on each side of a self-fusion
/// so the resulting loop has more than one edge.
const MIN_LOOP_LENGTH: usize = 2;

/// One weighted site fission can cut: `segment` at in-segment position
/// `position` (`0` and `length` are boundary cuts, anything in between is
/// an interior cut).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FissionSite {
    pub segment: usize,
    pub position: usize,
}

/// Per-site fission weights: a bound boundary contributes `1`, an
/// interior edge-to-edge junction contributes `2` (either neighbouring
/// edge may be the one "elected"), a free boundary contributes nothing
/// and is not recorded.
#[derive(Debug, Default)]
pub struct FissionCandidates {
    sites: Vec<FissionSite>,
    weights: Vec<u64>,
    total: u64,
}

impl FissionCandidates {
    /// Rebuilds the site list and returns the summed weight (this rule's
    /// propensity). Also writes the per-edge fission markers
    /// ([`crate::segment::Segment::set_end_fin`]/[`crate::segment::Segment::set_bulk_fin`])
    /// that record, on the edges themselves, which boundaries are live
    /// cut candidates.
    pub fn populate(&mut self, structure: &mut Structure) -> u64 {
        self.sites.clear();
        self.weights.clear();
        self.total = 0;

        for w in 0..structure.segment_count() {
            let length = structure.segment(w).length();

            let end1 = structure.segment_mut(w).set_end_fin(End::One);
            self.push(w, 0, end1);

            for a in 0..length.saturating_sub(1) {
                let bulk = structure.segment_mut(w).set_bulk_fin(a);
                self.push(w, a + 1, 2 * bulk);
            }

            let end2 = structure.segment_mut(w).set_end_fin(End::Two);
            self.push(w, length, end2);
        }

        self.total
    }

    fn push(&mut self, segment: usize, position: usize, weight: u64) {
        if weight == 0 {
            return;
        }
        self.total += weight;
        self.sites.push(FissionSite { segment, position });
        self.weights.push(weight);
    }

    /// Total site weight — this rule's propensity.
    #[must_use]
    pub const fn total_weight(&self) -> u64 {
        self.total
    }

    /// Picks the site whose cumulative weight first exceeds `draw`
    /// (`draw` must be in `[0, total_weight())`).
    ///
    /// # Panics
    /// Panics if the candidate list is empty.
    #[must_use]
    pub fn pick(&self, draw: u64) -> FissionSite {
        let mut acc = 0u64;
        for (site, &weight) in self.sites.iter().zip(&self.weights) {
            acc += weight;
            if draw < acc {
                return *site;
            }
        }
        *self.sites.last().expect("fission candidates: empty site list")
    }
}

/// Candidate tip pairs for degree-1-to-degree-1 fusion: self-pairs (a
/// segment's own two ends, closing a loop), 11-to-11 cross pairs, and
/// 13-tip pairs, each unordered pair recorded exactly once.
#[derive(Debug, Default)]
pub struct Fusion11Candidates {
    pairs: Vec<(usize, End, usize, End)>,
}

impl Fusion11Candidates {
    pub fn populate(&mut self, structure: &Structure) {
        self.pairs.clear();
        let mt11 = structure.bucket_11();
        let mt13 = structure.bucket_13();

        for (i1, &w1) in mt11.iter().enumerate() {
            if structure.segment(w1).length() >= MIN_LOOP_LENGTH {
                self.pairs.push((w1, End::One, w1, End::Two));
            }

            for e1 in [End::One, End::Two] {
                for &w2 in &mt11[i1 + 1..] {
                    for e2 in [End::One, End::Two] {
                        self.pairs.push((w1, e1, w2, e2));
                    }
                }
                for &(w2, e2) in mt13 {
                    self.pairs.push((w1, e1, w2, e2));
                }
            }
        }

        for i1 in 0..mt13.len() {
            let (w1, e1) = mt13[i1];
            for &(w2, e2) in &mt13[i1 + 1..] {
                self.pairs.push((w1, e1, w2, e2));
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    #[must_use]
    pub fn pick(&self, index: usize) -> (usize, End, usize, End) {
        self.pairs[index]
    }
}

/// Candidate (tip, interior position) pairs for degree-1-to-degree-2
/// fusion. A tip may be the free end of an 11- or 13-segment; the
/// interior side may be any position `1..length` of an 11/13/33/22
/// segment. A tip fusing to an interior position of its own segment is
/// excluded when the resulting sub-loop would be shorter than
/// [`MIN_LOOP_LENGTH`].
#[derive(Debug, Default)]
pub struct Fusion12Candidates {
    pairs: Vec<(usize, End, usize, usize)>,
}

impl Fusion12Candidates {
    pub fn populate(&mut self, structure: &Structure) {
        self.pairs.clear();

        let mt11 = structure.bucket_11();
        let mt13 = structure.bucket_13();
        let mt22 = structure.bucket_22();
        let mt33 = structure.bucket_33();

        let tips: Vec<(usize, End)> = mt11
            .iter()
            .flat_map(|&w| [(w, End::One), (w, End::Two)])
            .chain(mt13.iter().copied())
            .collect();

        for &(w1, e1) in &tips {
            for &w2 in mt11 {
                let length = structure.segment(w2).length();
                for i in 1..length {
                    if w1 == w2 && Self::too_short(e1, i, length) {
                        continue;
                    }
                    self.pairs.push((w1, e1, w2, i));
                }
            }

            for &(w2, _) in mt13 {
                let length = structure.segment(w2).length();
                for i in 1..length {
                    if w1 == w2 && Self::too_short(e1, i, length) {
                        continue;
                    }
                    self.pairs.push((w1, e1, w2, i));
                }
            }

            for &w2 in mt33 {
                let length = structure.segment(w2).length();
                for i in 1..length {
                    self.pairs.push((w1, e1, w2, i));
                }
            }

            for &w2 in mt22 {
                let length = structure.segment(w2).length();
                for i in 1..length {
                    self.pairs.push((w1, e1, w2, i));
                }
            }
        }
    }

    /// Whether cutting `w2` at `i` and fusing `e1` there would leave a
    /// sub-loop shorter than [`MIN_LOOP_LENGTH`] when `w1 == w2`.
    fn too_short(e1: End, i: usize, length: usize) -> bool {
        match e1 {
            End::One => i < MIN_LOOP_LENGTH,
            End::Two => length - i < MIN_LOOP_LENGTH,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    #[must_use]
    pub fn pick(&self, index: usize) -> (usize, End, usize, usize) {
        self.pairs[index]
    }
}

/// Candidate (tip, separate cycle) pairs for tip-to-loop fusion: every
/// 11- or 13-tip against every segment that is itself a free-standing
/// cycle.
#[derive(Debug, Default)]
pub struct Fusion1LCandidates {
    pairs: Vec<(usize, End, usize)>,
}

impl Fusion1LCandidates {
    pub fn populate(&mut self, structure: &Structure) {
        self.pairs.clear();
        let mt11 = structure.bucket_11();
        let mt13 = structure.bucket_13();

        for &w2 in structure.bucket_22() {
            for &w1 in mt11 {
                for e1 in [End::One, End::Two] {
                    self.pairs.push((w1, e1, w2));
                }
            }
            for &(w1, e1) in mt13 {
                self.pairs.push((w1, e1, w2));
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    #[must_use]
    pub fn pick(&self, index: usize) -> (usize, End, usize) {
        self.pairs[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::Structure;

    #[test]
    fn fission_weights_interior_sites_twice_a_bound_end() {
        let mut s = Structure::seed_linear(8, 8);
        let mut cnd = FissionCandidates::default();
        let total = cnd.populate(&mut s);
        // one segment of length 8, both ends free: weight = 0 + 2*7 + 0 = 14
        assert_eq!(total, 14);
        assert_eq!(cnd.total_weight(), 14);
    }

    #[test]
    fn fusion11_counts_match_the_four_segment_scenario() {
        // four free-standing 11-segments of length 4; fusing one tip into
        // an interior position of another leaves 2 remaining 11-segments
        // and 3 13-segments, i.e. 7 free tips and C(7,2) = 21 pairs.
        let mut s = Structure::seed_linear(16, 4);
        s.fuse12(1, End::One, 2, 2);
        let mut cnd = Fusion11Candidates::default();
        cnd.populate(&s);
        assert_eq!(cnd.len(), 21);
    }

    #[test]
    fn fusion12_counts_match_the_two_segment_scenario() {
        // one segment of length 7, split at position 4 into two
        // free-standing 11-segments of lengths 4 and 3.
        let mut s = Structure::seed_linear(7, 7);
        s.fiss2(0, 4);
        s.basic_update();
        let mut cnd = Fusion12Candidates::default();
        cnd.populate(&s);
        assert_eq!(cnd.len(), 16);
    }

    #[test]
    fn fusion1l_counts_match_the_looped_scenario() {
        let mut s = Structure::seed_linear(20, 5);
        s.fuse_to_loop(0);
        s.fuse_to_loop(1);
        s.basic_update();
        let mut cnd = Fusion1LCandidates::default();
        cnd.populate(&s);
        assert_eq!(cnd.len(), 8);
    }
}
