//! Random-number facade used throughout the engine.
//!
//! Every stochastic operation (covering, mutation, crossover, tournament
//! selection, deletion roulette) goes through the [`RandomGenerator`] trait
//! rather than touching `rand` directly, so that a deterministic seed
//! reproduces an entire run and so that tests can swap in a generator that
//! panics on unexpected use.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};

/// Capability contract for sources of randomness inside the engine.
///
/// Implementors only need to supply [`RandomGenerator::rng`]; every other
/// method has a default implementation built on top of it.
pub trait RandomGenerator {
    type R: RngCore;

    fn rng(&mut self) -> &mut Self::R;

    /// Uniform integer in `[low, high)`.
    fn gen_range_usize(&mut self, low: usize, high: usize) -> usize {
        self.rng().random_range(low..high)
    }

    /// Uniform float in `[low, high)`.
    fn gen_range_f64(&mut self, low: f64, high: f64) -> f64 {
        self.rng().random_range(low..high)
    }

    /// Bernoulli trial with success probability `p`.
    fn gen_bool(&mut self, p: f64) -> bool {
        self.rng().random_bool(p.clamp(0.0, 1.0))
    }

    /// Uniform probability in `[0, 1)`, used for rate-gated operators
    /// (crossover rate, mutation rate).
    fn gen_probability(&mut self) -> f64 {
        self.rng().random::<f64>()
    }

    /// In-place Fisher-Yates shuffle.
    fn shuffle_vec<T>(&mut self, v: &mut [T]) {
        v.shuffle(self.rng());
    }

    /// Uniform index into `[0, len)`. Panics if `len == 0`.
    fn choose_usize(&mut self, len: usize) -> usize {
        assert!(len > 0, "choose_usize called with an empty range");
        self.gen_range_usize(0, len)
    }

    /// Sample a standard-normal-scaled value, `mean + sigma * N(0, 1)`.
    fn gen_gaussian(&mut self, mean: f64, sigma: f64) -> f64 {
        use rand_distr::{Distribution, Normal};
        let dist = Normal::new(mean, sigma.max(1e-12)).expect("invalid gaussian parameters");
        dist.sample(self.rng())
    }
}

/// Production random generator, backed by `rand::rngs::StdRng`.
pub struct XcsfRng {
    rng: StdRng,
}

impl XcsfRng {
    pub fn new_from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn new_from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Type-erased view of the inner RNG, for call sites (condition/action/
    /// prediction mutation, EA selection) that take `&mut dyn RngCore`
    /// rather than the full [`RandomGenerator`] facade.
    pub fn rng_as_core(&mut self) -> &mut dyn RngCore {
        &mut self.rng
    }
}

impl RandomGenerator for XcsfRng {
    type R = StdRng;

    fn rng(&mut self) -> &mut Self::R {
        &mut self.rng
    }
}

/// A generator that panics on any use. Useful in tests that assert a code
/// path never consumes randomness (e.g. a fully-covered match set should
/// never trigger `cover`).
pub struct NoopRandomGenerator;

impl RandomGenerator for NoopRandomGenerator {
    type R = TestDummyRng;

    fn rng(&mut self) -> &mut Self::R {
        panic!("NoopRandomGenerator: no randomness should have been requested here")
    }
}

/// RNG stub that panics if ever actually pulled from. Exists purely to
/// satisfy the `RngCore` bound on [`NoopRandomGenerator::R`].
pub struct TestDummyRng;

impl RngCore for TestDummyRng {
    fn next_u32(&mut self) -> u32 {
        unimplemented!("TestDummyRng should never be called")
    }
    fn next_u64(&mut self) -> u64 {
        unimplemented!("TestDummyRng should never be called")
    }
    fn fill_bytes(&mut self, _dst: &mut [u8]) {
        unimplemented!("TestDummyRng should never be called")
    }
}
