//! Backoff between retry attempts

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use retrygate_common::random::RandomGenerator;
use retrygate_common::runtime::RuntimeSnapshot;
use retrygate_domain::constants::{
    DEFAULT_BASE_RETRY_BACKOFF_MS, MAX_BACKOFF_MULTIPLIER, RUNTIME_BASE_RETRY_BACKOFF_MS,
};

/// Produces the delay before each successive retry
pub trait BackoffStrategy: Send {
    /// Delay before the next retry. Each call advances the schedule.
    fn next_backoff(&mut self) -> Duration;
}

/// Full-jitter exponential backoff
///
/// Call `n` (starting at zero) draws uniformly from
/// `[0, min(base * 2^n, 10 * base))` milliseconds. The ceiling doubles per
/// call until it reaches the cap and then stays there.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// use retrygate_common::random::SeededRandom;
/// use retrygate_core::retry::{BackoffStrategy, JitteredBackoffStrategy};
///
/// let mut backoff = JitteredBackoffStrategy::new(25, Arc::new(SeededRandom::new(1)));
/// for _ in 0..8 {
///     assert!(backoff.next_backoff() < Duration::from_millis(250));
/// }
/// ```
#[derive(Clone)]
pub struct JitteredBackoffStrategy {
    base_interval_ms: u64,
    max_interval_ms: u64,
    ceiling_ms: u64,
    random: Arc<dyn RandomGenerator>,
}

impl fmt::Debug for JitteredBackoffStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JitteredBackoffStrategy")
            .field("base_interval_ms", &self.base_interval_ms)
            .field("max_interval_ms", &self.max_interval_ms)
            .field("ceiling_ms", &self.ceiling_ms)
            .finish_non_exhaustive()
    }
}

impl JitteredBackoffStrategy {
    /// Start the schedule at `base_interval_ms`, capped at ten times that.
    pub fn new(base_interval_ms: u64, random: Arc<dyn RandomGenerator>) -> Self {
        Self {
            base_interval_ms,
            max_interval_ms: base_interval_ms.saturating_mul(MAX_BACKOFF_MULTIPLIER),
            ceiling_ms: base_interval_ms,
            random,
        }
    }

    /// Read the base interval from `upstream.base_retry_backoff_ms`.
    pub fn from_runtime(runtime: &dyn RuntimeSnapshot, random: Arc<dyn RandomGenerator>) -> Self {
        let base = runtime.get_integer(RUNTIME_BASE_RETRY_BACKOFF_MS, DEFAULT_BASE_RETRY_BACKOFF_MS);
        Self::new(base, random)
    }

    /// Ceiling of the first delay.
    pub fn base_interval(&self) -> Duration {
        Duration::from_millis(self.base_interval_ms)
    }

    /// Largest ceiling the schedule grows to.
    pub fn max_interval(&self) -> Duration {
        Duration::from_millis(self.max_interval_ms)
    }

    /// Exclusive upper bound of the next delay.
    pub fn current_ceiling(&self) -> Duration {
        Duration::from_millis(self.ceiling_ms)
    }
}

impl BackoffStrategy for JitteredBackoffStrategy {
    fn next_backoff(&mut self) -> Duration {
        let ceiling = self.ceiling_ms;
        if ceiling < self.max_interval_ms {
            self.ceiling_ms = ceiling.saturating_mul(2).min(self.max_interval_ms);
        }
        if ceiling == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(self.random.random() % ceiling)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for retry::backoff.
    use retrygate_common::random::SeededRandom;
    use retrygate_common::runtime::RuntimeLoader;
    use retrygate_common::testing::SequenceRandom;

    use super::*;

    /// Validates `JitteredBackoffStrategy::next_backoff` ceiling growth.
    ///
    /// Assertions:
    /// - Confirms the ceiling doubles from the base and then holds at 10x.
    #[test]
    fn test_ceiling_doubles_then_caps() {
        let mut backoff = JitteredBackoffStrategy::new(25, Arc::new(SequenceRandom::constant(249)));

        let delays: Vec<u64> = (0..7).map(|_| u64::try_from(backoff.next_backoff().as_millis()).unwrap()).collect();

        // 249 mod 25, 50, 100, 200, 250, 250, 250
        assert_eq!(delays, vec![24, 49, 49, 49, 249, 249, 249]);
        assert_eq!(backoff.current_ceiling(), backoff.max_interval());
    }

    /// Validates the delay range over many draws.
    ///
    /// Assertions:
    /// - Ensures every sample lies in `[0, 250ms)`.
    /// - Ensures the cap is reached.
    /// - Ensures late samples use more than the first doubling of range.
    #[test]
    fn test_samples_stay_below_cap() {
        let mut backoff = JitteredBackoffStrategy::new(25, Arc::new(SeededRandom::new(7)));
        let cap = Duration::from_millis(250);

        let samples: Vec<Duration> = (0..10_000).map(|_| backoff.next_backoff()).collect();

        assert!(samples.iter().all(|delay| *delay < cap));
        assert_eq!(backoff.current_ceiling(), cap);
        assert!(samples.iter().any(|delay| *delay >= Duration::from_millis(200)));
    }

    #[test]
    fn test_zero_base_is_always_zero() {
        let mut backoff = JitteredBackoffStrategy::new(0, Arc::new(SequenceRandom::constant(17)));
        for _ in 0..4 {
            assert_eq!(backoff.next_backoff(), Duration::ZERO);
        }
    }

    #[test]
    fn test_huge_base_does_not_overflow() {
        let mut backoff =
            JitteredBackoffStrategy::new(u64::MAX / 2, Arc::new(SequenceRandom::constant(3)));
        for _ in 0..70 {
            assert_eq!(backoff.next_backoff(), Duration::from_millis(3));
        }
        assert_eq!(backoff.max_interval(), Duration::from_millis(u64::MAX));
    }

    #[test]
    fn test_base_from_runtime() {
        let runtime = RuntimeLoader::new();
        let random: Arc<dyn RandomGenerator> = Arc::new(SequenceRandom::constant(0));

        let backoff = JitteredBackoffStrategy::from_runtime(&runtime, Arc::clone(&random));
        assert_eq!(backoff.base_interval(), Duration::from_millis(25));

        runtime.set_integer(RUNTIME_BASE_RETRY_BACKOFF_MS, 40);
        let backoff = JitteredBackoffStrategy::from_runtime(&runtime, random);
        assert_eq!(backoff.base_interval(), Duration::from_millis(40));
        assert_eq!(backoff.max_interval(), Duration::from_millis(400));
    }
}
