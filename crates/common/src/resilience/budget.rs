// Concurrent retry budget shared by every request against one upstream
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::warn;

/// A counted resource with a ceiling
///
/// Admission is a two-step protocol: callers check [`can_create`] and then
/// [`inc`]. The pair is not atomic, so concurrent callers may overshoot the
/// ceiling by a small amount. That matches how upstream circuit breakers
/// behave and keeps the hot path lock-free.
///
/// [`can_create`]: ResourceBudget::can_create
/// [`inc`]: ResourceBudget::inc
pub trait ResourceBudget: Send + Sync {
    /// True if one more unit fits under the ceiling.
    fn can_create(&self) -> bool;

    /// Take one unit.
    fn inc(&self);

    /// Give one unit back.
    fn dec(&self);

    /// Units currently held.
    fn count(&self) -> u64;

    /// The ceiling.
    fn max(&self) -> u64;
}

/// Counter of in-flight retries for one priority class
#[derive(Debug)]
pub struct RetryBudget {
    /// Maximum concurrent retries
    max_retries: u64,
    /// Retries currently scheduled or in flight
    active: AtomicU64,
}

impl RetryBudget {
    /// Create a new retry budget with the given ceiling
    pub fn new(max_retries: u64) -> Self {
        Self { max_retries, active: AtomicU64::new(0) }
    }

    /// Units still available before the ceiling is reached
    pub fn available(&self) -> u64 {
        self.max_retries.saturating_sub(self.count())
    }
}

impl ResourceBudget for RetryBudget {
    fn can_create(&self) -> bool {
        self.active.load(Ordering::Acquire) < self.max_retries
    }

    fn inc(&self) {
        self.active.fetch_add(1, Ordering::AcqRel);
    }

    fn dec(&self) {
        loop {
            let current = self.active.load(Ordering::Acquire);
            if current == 0 {
                warn!(max_retries = self.max_retries, "retry budget released below zero");
                return;
            }
            match self.active.compare_exchange_weak(
                current,
                current - 1,
                Ordering::Release,
                Ordering::Acquire,
            ) {
                Ok(_) => return,
                Err(_) => continue, // Retry on concurrent modification
            }
        }
    }

    fn count(&self) -> u64 {
        self.active.load(Ordering::Acquire)
    }

    fn max(&self) -> u64 {
        self.max_retries
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for resilience::budget.
    use std::sync::Arc;
    use std::thread;

    use super::*;

    /// Validates `RetryBudget::new` behavior for the new retry budget scenario.
    ///
    /// Assertions:
    /// - Ensures `budget.can_create()` evaluates to true.
    /// - Confirms `budget.count()` equals `0`.
    #[test]
    fn test_new_retry_budget() {
        let budget = RetryBudget::new(3);

        assert!(budget.can_create());
        assert_eq!(budget.count(), 0);
        assert_eq!(budget.max(), 3);
        assert_eq!(budget.available(), 3);
    }

    /// Validates `RetryBudget::inc` behavior for the exhaust budget scenario.
    ///
    /// Assertions:
    /// - Ensures `budget.can_create()` evaluates to true until the ceiling.
    /// - Ensures `!budget.can_create()` evaluates to true at the ceiling.
    #[test]
    fn test_exhaust_budget() {
        let budget = RetryBudget::new(2);

        assert!(budget.can_create());
        budget.inc();
        assert!(budget.can_create());
        budget.inc();

        assert!(!budget.can_create());
        assert_eq!(budget.available(), 0);

        budget.dec();
        assert!(budget.can_create());
    }

    /// Validates `RetryBudget::new` behavior for the zero capacity budget
    /// scenario.
    ///
    /// Assertions:
    /// - Ensures `!budget.can_create()` evaluates to true.
    #[test]
    fn test_zero_capacity_budget() {
        let budget = RetryBudget::new(0);
        assert!(!budget.can_create());
    }

    /// Tests that releasing an empty budget saturates at zero.
    ///
    /// Verifies:
    /// - `dec` on an empty budget leaves the count at zero
    /// - A later `inc` is still accounted for exactly
    #[test]
    fn test_dec_saturates_at_zero() {
        let budget = RetryBudget::new(1);

        budget.dec();
        assert_eq!(budget.count(), 0);

        budget.inc();
        assert_eq!(budget.count(), 1);
    }

    /// Tests retry budget is thread-safe under concurrent inc/dec pairs.
    ///
    /// Verifies:
    /// - Balanced increments and decrements across threads net to zero
    /// - No updates are lost under contention
    #[test]
    fn test_concurrent_inc_dec() {
        let budget = Arc::new(RetryBudget::new(1_000));
        let mut handles = vec![];

        for _ in 0..8 {
            let budget_clone = Arc::clone(&budget);
            let handle = thread::spawn(move || {
                for _ in 0..100 {
                    budget_clone.inc();
                    budget_clone.dec();
                }
                budget_clone.inc();
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(budget.count(), 8);
    }
}
