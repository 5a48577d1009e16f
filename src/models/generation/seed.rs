//! Per-call randomness.
//!
//! Every generation call owns exactly one [`ScopedRng`]. It is created from
//! the call's effective seed, moved into the sampling loop and dropped when
//! the call returns, whichever way it returns. No random state is shared
//! between calls, so a call without a seed never observes what an earlier
//! call drew.

use std::hash::Hasher;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHasher;

/// Resolves optional seeds into owned random sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeedController;

impl SeedController {
    /// Returns the effective seed and a random source seeded with it.
    ///
    /// A missing seed is drawn from process entropy and returned so the
    /// call can be replayed later.
    pub fn resolve(seed: Option<u64>) -> (u64, ScopedRng) {
        let effective = Self::effective_seed(seed);
        (effective, ScopedRng::new(effective))
    }

    /// The seed a call will run under, without building a random source.
    pub fn effective_seed(seed: Option<u64>) -> u64 {
        seed.unwrap_or_else(rand::random::<u64>)
    }
}

/// Random source visible only to the call that acquired it.
///
/// Neither `Clone` nor shareable by reference outside the call: the sampler
/// takes it by `&mut`, and the generator owns it by value.
#[derive(Debug)]
pub struct ScopedRng {
    seed: u64,
    draws: u64,
    rng: StdRng,
}

impl ScopedRng {
    fn new(seed: u64) -> Self {
        Self {
            seed,
            draws: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform draw in `[0, 1)`.
    pub fn next_unit(&mut self) -> f64 {
        self.draws += 1;
        self.rng.random::<f64>()
    }
}

impl Drop for ScopedRng {
    fn drop(&mut self) {
        tracing::trace!(seed = self.seed, draws = self.draws, "released scoped rng");
    }
}

/// Deterministic sub-seed for position `index` under `seed`.
///
/// Pure function of its inputs; distinct indices give distinct seeds for
/// the same parent.
pub fn derive_seed(seed: u64, index: u64) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write_u64(seed);
    hasher.write_u64(index);
    hasher.finish()
}
