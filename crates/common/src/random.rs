//! Injectable pseudo-random sources
//!
//! Backoff jitter and percentage rollouts draw from a [`RandomGenerator`]
//! handle instead of a global generator so tests can pin the sequence.
//!
//! # Examples
//!
//! ```
//! use retrygate_common::random::{RandomGenerator, SeededRandom};
//!
//! let a = SeededRandom::new(7);
//! let b = SeededRandom::new(7);
//! assert_eq!(a.random(), b.random());
//! ```

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniformly distributed 64-bit values
///
/// Not suitable for anything security sensitive.
pub trait RandomGenerator: Send + Sync {
    fn random(&self) -> u64;
}

/// Thread-local generator seeded from the OS
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomGenerator for ThreadRandom {
    fn random(&self) -> u64 {
        rand::thread_rng().gen()
    }
}

/// Deterministic generator for reproducible sequences
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    /// Deterministic source seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self { rng: Mutex::new(StdRng::seed_from_u64(seed)) }
    }
}

impl RandomGenerator for SeededRandom {
    fn random(&self) -> u64 {
        self.rng.lock().gen()
    }
}
