//! The uniform-float capability consumed by the selector and classifier.
//!
//! The original mutates a single RNG object through shared references
//! across many call sites; here it is a capability passed explicitly to
//! whatever needs it, rather than global state.

/// Source of uniform floats in `[0, 1)`.
///
/// Implementors need not guarantee cryptographic quality; the simulator
/// only requires a well-distributed stream reproducible from a seed.
pub trait RandomSource {
    /// Draws a uniform value in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Draws a uniform value strictly inside `(0, 1)`, resampling the
    /// boundary cases.
    fn next_unit_open(&mut self) -> f64 {
        loop {
            let v = self.next_unit();
            if v > 0.0 && v < 1.0 {
                return v;
            }
        }
    }

    /// Draws a uniform index in `[0, n)`. `n` must be positive.
    ///
    /// # Panics
    /// Panics if `n` is zero.
    fn next_index(&mut self, n: usize) -> usize {
        assert!(n > 0, "next_index requires a positive bound");
        #[expect(
            clippy::cast_precision_loss,
            reason = "candidate counts are small enough in practice that the loss is immaterial"
        )]
        let scaled = self.next_unit() * n as f64;
        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "scaled is in [0, n) by construction"
        )]
        let idx = scaled as usize;
        idx.min(n - 1)
    }
}

/// [`RandomSource`] backed by `rand`'s small, fast, non-cryptographic RNG.
#[cfg(feature = "cpu")]
#[derive(Debug)]
pub struct SmallRngSource(rand::rngs::SmallRng);

#[cfg(feature = "cpu")]
impl SmallRngSource {
    /// Builds a source seeded from a 32-bit seed-table entry.
    #[must_use]
    pub fn from_seed_u32(seed: u32) -> Self {
        use rand::SeedableRng;
        Self(rand::rngs::SmallRng::seed_from_u64(u64::from(seed)))
    }
}

#[cfg(feature = "cpu")]
impl RandomSource for SmallRngSource {
    fn next_unit(&mut self) -> f64 {
        use rand::Rng;
        self.0.gen_range(0.0..1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(f64);
    impl RandomSource for Fixed {
        fn next_unit(&mut self) -> f64 {
            self.0
        }
    }

    struct Sequence(Vec<f64>);
    impl RandomSource for Sequence {
        fn next_unit(&mut self) -> f64 {
            self.0.remove(0)
        }
    }

    #[test]
    fn next_unit_open_resamples_boundaries() {
        let mut rng = Sequence(vec![0.0, 1.0, 0.5]);
        assert_eq!(rng.next_unit_open(), 0.5);
    }

    #[test]
    fn next_index_clamps_to_last_slot() {
        let mut rng = Fixed(0.9999);
        assert_eq!(rng.next_index(3), 2);
    }

    #[test]
    fn next_index_zero_point_zero_picks_first_slot() {
        let mut rng = Fixed(0.0);
        assert_eq!(rng.next_index(5), 0);
    }

    #[cfg(feature = "cpu")]
    #[test]
    fn small_rng_source_produces_unit_interval_values() {
        let mut rng = SmallRngSource::from_seed_u32(7);
        for _ in 0..100 {
            let v = rng.next_unit();
            assert!((0.0..1.0).contains(&v));
        }
    }
}
