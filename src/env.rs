//! Environment abstraction: decouples the dispatcher from the real wall
//! clock and the real pseudorandom source, so the core can be driven
//! deterministically in tests (spec.md §1: "The core consumes only ...
//! a monotonic wall-clock source, and a pseudorandom byte source").

use crate::rng::{Lcg, RandomSource, REFERENCE_SEED};

/// Everything the dispatcher needs from the outside world besides the
/// socket itself.
pub trait Environment {
    /// Current time as Unix seconds. Must never go backwards within a
    /// single process run.
    fn now(&self) -> u64;

    /// The pseudorandom byte source backing cookie generation.
    fn rng(&mut self) -> &mut dyn RandomSource;
}

/// Production environment: real wall clock, LCG seeded with the reference
/// constant so cookie generation is reproducible across restarts given the
/// same request sequence (spec.md §4.6).
pub struct SystemEnv {
    rng: Lcg,
}

impl SystemEnv {
    /// Build a system environment seeded with [`REFERENCE_SEED`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rng: Lcg::new(REFERENCE_SEED),
        }
    }
}

impl Default for SystemEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for SystemEnv {
    #[allow(clippy::disallowed_methods)]
    fn now(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system clock is after the Unix epoch")
            .as_secs()
    }

    fn rng(&mut self) -> &mut dyn RandomSource {
        &mut self.rng
    }
}

/// A deterministic environment for tests: a fixed, externally advanced
/// clock plus a seeded LCG.
#[cfg(any(test, feature = "test-util"))]
pub struct FixedEnv {
    now: u64,
    rng: Lcg,
}

#[cfg(any(test, feature = "test-util"))]
impl FixedEnv {
    /// Build a fixed environment starting at `now` with the given RNG seed.
    #[must_use]
    pub const fn new(now: u64, seed: u64) -> Self {
        Self {
            now,
            rng: Lcg::new(seed),
        }
    }

    /// Advance the simulated clock to `now`.
    pub fn set_now(&mut self, now: u64) {
        self.now = now;
    }
}

#[cfg(any(test, feature = "test-util"))]
impl Environment for FixedEnv {
    fn now(&self) -> u64 {
        self.now
    }

    fn rng(&mut self) -> &mut dyn RandomSource {
        &mut self.rng
    }
}
