//! The Gillespie-direct reaction selector: picks which rule fires and
//! when, from the current score vector.

use crate::reactions::Reaction;
use crate::rng::RandomSource;
use crate::structure::Structure;

/// Outcome of one [`Selector::step`] call.
#[derive(Debug)]
pub enum StepOutcome {
    /// Reaction `index` fired after an elapsed simulated time `dt`.
    Fired { index: usize, dt: f64, touched: [usize; 2] },
    /// Every reaction's score is zero; nothing can fire.
    Exhausted,
}

/// Drives a fixed set of [`Reaction`] trait objects through the
/// Gillespie-direct algorithm: total score `A`, a uniform pick of which
/// reaction fires weighted by its score, and an exponential firing time
/// `-ln(u)/A`.
#[derive(Default)]
pub struct Selector {
    reactions: Vec<Box<dyn Reaction>>,
}

impl Selector {
    /// Builds a selector over the given reactions, in the order their
    /// scores are reported and summed.
    #[must_use]
    pub fn new(reactions: Vec<Box<dyn Reaction>>) -> Self {
        Self { reactions }
    }

    /// Read-only access to the wired reactions, in selector order.
    #[must_use]
    pub fn reactions(&self) -> &[Box<dyn Reaction>] {
        &self.reactions
    }

    /// Recomputes every reaction's propensity and score against the
    /// current graph. Every rule in this system depends on the outcome
    /// of every other, so a full refresh (rather than touching only the
    /// rules a dependency graph would name) is always correct here — see
    /// the module note in [`crate::reactions`].
    pub fn refresh_all(&mut self, structure: &mut Structure) {
        for reaction in &mut self.reactions {
            reaction.set_prop(structure);
            reaction.set_score();
        }
    }

    /// Total score across every reaction.
    #[must_use]
    pub fn total_score(&self) -> f64 {
        self.reactions.iter().map(|r| r.score()).sum()
    }

    /// Samples a reaction index and a firing time, fires it, and
    /// refreshes every reaction's propensity/score for the next step.
    /// Returns [`StepOutcome::Exhausted`] without mutating `structure` if
    /// the total score is zero.
    pub fn step(&mut self, structure: &mut Structure, rng: &mut dyn RandomSource) -> StepOutcome {
        let total = self.total_score();
        if total <= 0.0 {
            return StepOutcome::Exhausted;
        }

        let index = self.pick_reaction(total, rng);
        let u2 = rng.next_unit_open();
        let dt = -u2.ln() / total;

        let touched = self.reactions[index].fire(structure, rng);
        self.refresh_all(structure);

        StepOutcome::Fired { index, dt, touched }
    }

    /// Picks the smallest index `i` whose cumulative score fraction
    /// exceeds the drawn uniform `u1`, resampling if rounding pushes `u1`
    /// past the last cumulative value.
    fn pick_reaction(&self, total: f64, rng: &mut dyn RandomSource) -> usize {
        loop {
            let u1 = rng.next_unit_open();
            let mut cumulative = 0.0;
            for (i, reaction) in self.reactions.iter().enumerate() {
                cumulative += reaction.score() / total;
                if u1 < cumulative {
                    return i;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactions::{Fusion11Reaction, Reaction};
    use crate::structure::Structure;

    struct Sequence(Vec<f64>);
    impl RandomSource for Sequence {
        fn next_unit(&mut self) -> f64 {
            self.0.remove(0)
        }
    }

    #[test]
    fn step_reports_exhaustion_when_every_score_is_zero() {
        let mut s = Structure::seed_linear(8, 8);
        let mut sel = Selector::new(vec![Box::new(Fusion11Reaction::new(0.0))]);
        sel.refresh_all(&mut s);
        let mut rng = Sequence(vec![0.5, 0.5]);
        assert!(matches!(sel.step(&mut s, &mut rng), StepOutcome::Exhausted));
    }

    #[test]
    fn step_fires_the_only_positive_scoring_reaction() {
        let mut s = Structure::seed_linear(8, 4);
        let reaction: Box<dyn Reaction> = Box::new(Fusion11Reaction::new(1.0));
        let mut sel = Selector::new(vec![reaction]);
        sel.refresh_all(&mut s);
        let mut rng = Sequence(vec![0.1, 0.3]);
        match sel.step(&mut s, &mut rng) {
            StepOutcome::Fired { index, dt, .. } => {
                assert_eq!(index, 0);
                assert!(dt > 0.0);
            }
            StepOutcome::Exhausted => panic!("expected a firing"),
        }
        assert_eq!(s.segment_count(), 1);
    }
}
