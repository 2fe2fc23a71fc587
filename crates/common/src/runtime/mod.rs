//! Live runtime overrides
//!
//! Integer values keyed by dotted names (`upstream.use_retry`, ...) that
//! operators can change without a restart. Readers hold a snapshot handle and
//! look keys up on every decision, so changes take effect on the next request.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::random::{RandomGenerator, ThreadRandom};

/// Read access to runtime values
pub trait RuntimeSnapshot: Send + Sync {
    /// Integer value for `key`, or `default` when unset.
    fn get_integer(&self, key: &str, default: u64) -> u64;

    /// Percentage rollout check.
    ///
    /// The percentage is read from `key` (falling back to `default_percent`).
    /// Values of 100 or more always pass, zero never does, anything in
    /// between passes for that share of calls.
    fn feature_enabled(&self, key: &str, default_percent: u64) -> bool;
}

/// In-memory runtime store with operator overrides
///
/// # Examples
///
/// ```
/// use retrygate_common::runtime::{RuntimeLoader, RuntimeSnapshot};
///
/// let runtime = RuntimeLoader::new();
/// assert_eq!(runtime.get_integer("upstream.base_retry_backoff_ms", 25), 25);
///
/// runtime.set_integer("upstream.base_retry_backoff_ms", 100);
/// assert_eq!(runtime.get_integer("upstream.base_retry_backoff_ms", 25), 100);
/// ```
pub struct RuntimeLoader {
    values: RwLock<HashMap<String, u64>>,
    random: Arc<dyn RandomGenerator>,
}

impl Default for RuntimeLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RuntimeLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeLoader").field("values", &*self.values.read()).finish()
    }
}

impl RuntimeLoader {
    /// Empty loader backed by the thread-local random source.
    pub fn new() -> Self {
        Self::with_random(Arc::new(ThreadRandom))
    }

    /// Create a loader whose rollout checks draw from `random`.
    pub fn with_random(random: Arc<dyn RandomGenerator>) -> Self {
        Self { values: RwLock::new(HashMap::new()), random }
    }

    /// Seed the loader with initial overrides.
    pub fn with_overrides<I, K>(self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, u64)>,
        K: Into<String>,
    {
        {
            let mut values = self.values.write();
            values.extend(overrides.into_iter().map(|(k, v)| (k.into(), v)));
        }
        self
    }

    /// Set or replace an integer override. Takes effect on the next read.
    pub fn set_integer(&self, key: impl Into<String>, value: u64) {
        let key = key.into();
        debug!(key = %key, value, "runtime override set");
        self.values.write().insert(key, value);
    }

    /// Drop an override so reads fall back to their defaults.
    pub fn remove(&self, key: &str) -> Option<u64> {
        let removed = self.values.write().remove(key);
        if removed.is_some() {
            debug!(key, "runtime override removed");
        }
        removed
    }
}

impl RuntimeSnapshot for RuntimeLoader {
    fn get_integer(&self, key: &str, default: u64) -> u64 {
        self.values.read().get(key).copied().unwrap_or(default)
    }

    fn feature_enabled(&self, key: &str, default_percent: u64) -> bool {
        let percent = self.get_integer(key, default_percent);
        if percent >= 100 {
            return true;
        }
        if percent == 0 {
            return false;
        }
        self.random.random() % 100 < percent
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for runtime.
    use super::*;
    use crate::random::SeededRandom;

    struct FixedRandom(u64);

    impl RandomGenerator for FixedRandom {
        fn random(&self) -> u64 {
            self.0
        }
    }

    /// Validates `RuntimeLoader::set_integer` behavior for the override
    /// lifecycle scenario.
    ///
    /// Assertions:
    /// - Confirms unset keys return the default.
    /// - Confirms a set override wins over the default.
    /// - Confirms removing the override restores the default.
    #[test]
    fn test_override_lifecycle() {
        let runtime = RuntimeLoader::new();
        assert_eq!(runtime.get_integer("a.b", 7), 7);

        runtime.set_integer("a.b", 9);
        assert_eq!(runtime.get_integer("a.b", 7), 9);

        assert_eq!(runtime.remove("a.b"), Some(9));
        assert_eq!(runtime.get_integer("a.b", 7), 7);
        assert_eq!(runtime.remove("a.b"), None);
    }

    #[test]
    fn test_with_overrides() {
        let runtime = RuntimeLoader::new().with_overrides([("x", 1), ("y", 2)]);
        assert_eq!(runtime.get_integer("x", 0), 1);
        assert_eq!(runtime.get_integer("y", 0), 2);
    }

    /// Validates `RuntimeLoader::feature_enabled` at the rollout bounds.
    ///
    /// Assertions:
    /// - Ensures 100 percent and above always pass.
    /// - Ensures zero percent never passes.
    #[test]
    fn test_feature_enabled_bounds() {
        let runtime = RuntimeLoader::with_random(Arc::new(FixedRandom(99)));
        assert!(runtime.feature_enabled("f", 100));
        assert!(runtime.feature_enabled("f", 250));
        assert!(!runtime.feature_enabled("f", 0));

        runtime.set_integer("f", 0);
        assert!(!runtime.feature_enabled("f", 100));
    }

    /// Validates `RuntimeLoader::feature_enabled` against the random draw.
    ///
    /// Assertions:
    /// - Confirms a draw below the percentage passes.
    /// - Confirms a draw at the percentage fails.
    #[test]
    fn test_feature_enabled_partial() {
        let low = RuntimeLoader::with_random(Arc::new(FixedRandom(149))); // 49 mod 100
        assert!(low.feature_enabled("f", 50));

        let high = RuntimeLoader::with_random(Arc::new(FixedRandom(50)));
        assert!(!high.feature_enabled("f", 50));
    }

    #[test]
    fn test_feature_enabled_distribution() {
        let runtime = RuntimeLoader::with_random(Arc::new(SeededRandom::new(11)));
        let hits = (0..10_000).filter(|_| runtime.feature_enabled("f", 30)).count();
        assert!((2_500..3_500).contains(&hits), "hits = {hits}");
    }
}
