use rand::rngs::ThreadRng;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

const DEFAULT_SEED: u64 = 3819201;

/// Source of randomness for rollouts, move sampling and exploration noise.
///
/// Implementors expose an underlying [`RngCore`] so that distributions from `rand_distr`
/// can draw from the same stream as the search itself.
pub trait RandomGenerator: Default {
    type Source: RngCore;

    fn source(&mut self) -> &mut Self::Source;

    /// A uniform score in `[0, 1)`.
    fn next_score(&mut self) -> f64 {
        self.source().random::<f64>()
    }

    /// A uniform index in `[from, to)`. `to` must be greater than `from`.
    fn next_range(&mut self, from: usize, to: usize) -> usize {
        self.source().random_range(from..to)
    }
}

/// Thread-local generator, seeded from the OS.
pub struct StandardRandomGenerator {
    rng: ThreadRng,
}

impl Default for StandardRandomGenerator {
    fn default() -> Self {
        Self { rng: rand::rng() }
    }
}

impl RandomGenerator for StandardRandomGenerator {
    type Source = ThreadRng;

    fn source(&mut self) -> &mut ThreadRng {
        &mut self.rng
    }
}

/// Deterministic generator: the same seed always yields the same search.
#[derive(Debug, Clone)]
pub struct SeededRandomGenerator {
    rng: ChaCha20Rng,
}

impl Default for SeededRandomGenerator {
    fn default() -> Self {
        SeededRandomGenerator::new(DEFAULT_SEED)
    }
}

impl RandomGenerator for SeededRandomGenerator {
    type Source = ChaCha20Rng;

    fn source(&mut self) -> &mut ChaCha20Rng {
        &mut self.rng
    }
}

impl SeededRandomGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}
