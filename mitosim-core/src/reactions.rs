//! The four rewrite rules wrapped as uniform, independently-scored
//! reaction slots for the Gillespie selector.
//!
//! Every rule's propensity depends on the full post-rewrite graph shape —
//! a fusion can create or destroy fission sites anywhere in the touched
//! clusters, and a fission can create new fusion tips anywhere too — so
//! the dependency graph the original threads through `update_prop(c1,
//! c2)` call sites collapses, for these four rules, to "everyone depends
//! on everyone": after any rule fires, every rule's propensity is
//! recomputed from scratch.

use crate::classifier::{
    FissionCandidates, Fusion1LCandidates, Fusion11Candidates, Fusion12Candidates,
};
use crate::rng::RandomSource;
use crate::structure::Structure;

/// A single rewrite rule as seen by the Gillespie selector: propensity,
/// rate-scaled score, and the ability to fire a randomly chosen candidate.
pub trait Reaction {
    /// Rebuilds the candidate list against the current graph and returns
    /// the new propensity (candidate count, or summed site weight for
    /// fission).
    fn set_prop(&mut self, structure: &mut Structure) -> f64;

    /// Sets `score = rate * propensity` from the last [`Self::set_prop`].
    fn set_score(&mut self);

    /// The current score.
    fn score(&self) -> f64;

    /// Fires a uniformly chosen candidate, returning the one or two
    /// cluster ids the rewrite touched.
    ///
    /// # Panics
    /// Panics if the candidate list is currently empty.
    fn fire(&mut self, structure: &mut Structure, rng: &mut dyn RandomSource) -> [usize; 2];

    /// Number of times [`Self::fire`] has been called.
    fn event_count(&self) -> u64;
}

/// Fission: cuts a node into lower-degree pieces.
#[derive(Debug, Default)]
pub struct FissionReaction {
    rate: f64,
    candidates: FissionCandidates,
    propensity: f64,
    score: f64,
    events: u64,
}

impl FissionReaction {
    #[must_use]
    pub fn new(rate: f64) -> Self {
        Self { rate, ..Self::default() }
    }
}

impl Reaction for FissionReaction {
    fn set_prop(&mut self, structure: &mut Structure) -> f64 {
        #[expect(
            clippy::cast_precision_loss,
            reason = "site weights are small enough in practice for the loss to be immaterial"
        )]
        let weight = self.candidates.populate(structure) as f64;
        self.propensity = weight;
        self.propensity
    }

    fn set_score(&mut self) {
        self.score = self.rate * self.propensity;
    }

    fn score(&self) -> f64 {
        self.score
    }

    fn fire(&mut self, structure: &mut Structure, rng: &mut dyn RandomSource) -> [usize; 2] {
        let total = self.candidates.total_weight();
        assert!(total > 0, "fission fire: no candidate sites");
        #[expect(
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "candidate weights are small enough in practice for the loss to be immaterial"
        )]
        let draw = ((rng.next_unit() * total as f64) as u64).min(total - 1);
        let site = self.candidates.pick(draw);
        self.events += 1;
        structure.fiss(site.segment, site.position)
    }

    fn event_count(&self) -> u64 {
        self.events
    }
}

/// Degree-1-to-degree-1 fusion: tip-to-tip, parallel or antiparallel, or
/// self-fusion into a separate cycle.
#[derive(Debug, Default)]
pub struct Fusion11Reaction {
    rate: f64,
    candidates: Fusion11Candidates,
    propensity: f64,
    score: f64,
    events: u64,
}

impl Fusion11Reaction {
    #[must_use]
    pub fn new(rate: f64) -> Self {
        Self { rate, ..Self::default() }
    }
}

impl Reaction for Fusion11Reaction {
    fn set_prop(&mut self, structure: &mut Structure) -> f64 {
        self.candidates.populate(structure);
        self.propensity = self.candidates.len() as f64;
        self.propensity
    }

    fn set_score(&mut self) {
        self.score = self.rate * self.propensity;
    }

    fn score(&self) -> f64 {
        self.score
    }

    fn fire(&mut self, structure: &mut Structure, rng: &mut dyn RandomSource) -> [usize; 2] {
        assert!(!self.candidates.is_empty(), "fusion11 fire: no candidates");
        let index = rng.next_index(self.candidates.len());
        let (w1, e1, w2, e2) = self.candidates.pick(index);
        self.events += 1;
        structure.fuse11(w1, e1, w2, e2)
    }

    fn event_count(&self) -> u64 {
        self.events
    }
}

/// Degree-1-to-degree-2 fusion: a free tip joining an interior node.
#[derive(Debug, Default)]
pub struct Fusion12Reaction {
    rate: f64,
    candidates: Fusion12Candidates,
    propensity: f64,
    score: f64,
    events: u64,
}

impl Fusion12Reaction {
    #[must_use]
    pub fn new(rate: f64) -> Self {
        Self { rate, ..Self::default() }
    }
}

impl Reaction for Fusion12Reaction {
    fn set_prop(&mut self, structure: &mut Structure) -> f64 {
        self.candidates.populate(structure);
        self.propensity = self.candidates.len() as f64;
        self.propensity
    }

    fn set_score(&mut self) {
        self.score = self.rate * self.propensity;
    }

    fn score(&self) -> f64 {
        self.score
    }

    fn fire(&mut self, structure: &mut Structure, rng: &mut dyn RandomSource) -> [usize; 2] {
        assert!(!self.candidates.is_empty(), "fusion12 fire: no candidates");
        let index = rng.next_index(self.candidates.len());
        let (w1, end, w2, a2) = self.candidates.pick(index);
        self.events += 1;
        structure.fuse12(w1, end, w2, a2)
    }

    fn event_count(&self) -> u64 {
        self.events
    }
}

/// Tip-to-loop fusion: a free tip joining a free-standing cycle.
#[derive(Debug, Default)]
pub struct Fusion1LReaction {
    rate: f64,
    candidates: Fusion1LCandidates,
    propensity: f64,
    score: f64,
    events: u64,
}

impl Fusion1LReaction {
    #[must_use]
    pub fn new(rate: f64) -> Self {
        Self { rate, ..Self::default() }
    }
}

impl Reaction for Fusion1LReaction {
    fn set_prop(&mut self, structure: &mut Structure) -> f64 {
        self.candidates.populate(structure);
        self.propensity = self.candidates.len() as f64;
        self.propensity
    }

    fn set_score(&mut self) {
        self.score = self.rate * self.propensity;
    }

    fn score(&self) -> f64 {
        self.score
    }

    fn fire(&mut self, structure: &mut Structure, rng: &mut dyn RandomSource) -> [usize; 2] {
        assert!(!self.candidates.is_empty(), "fusion1l fire: no candidates");
        let index = rng.next_index(self.candidates.len());
        let (w1, e1, w2) = self.candidates.pick(index);
        self.events += 1;
        structure.fuse1_l(w1, e1, w2)
    }

    fn event_count(&self) -> u64 {
        self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::Structure;

    struct Fixed(f64);
    impl RandomSource for Fixed {
        fn next_unit(&mut self) -> f64 {
            self.0
        }
    }

    #[test]
    fn fission_reaction_reports_rate_scaled_score() {
        let mut s = Structure::seed_linear(8, 8);
        let mut r = FissionReaction::new(2.0);
        r.set_prop(&mut s);
        r.set_score();
        assert_eq!(r.score(), 2.0 * 14.0);
    }

    #[test]
    fn fusion11_reaction_fires_and_counts_events() {
        let mut s = Structure::seed_linear(8, 4);
        let mut r = Fusion11Reaction::new(1.0);
        r.set_prop(&mut s);
        let mut rng = Fixed(0.0);
        r.fire(&mut s, &mut rng);
        assert_eq!(r.event_count(), 1);
        assert_eq!(s.segment_count(), 1);
    }
}
