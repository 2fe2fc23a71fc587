//! Route-level retry policy

use std::fmt;
use std::sync::Arc;

use crate::constants::{DEFAULT_HOST_SELECTION_MAX_ATTEMPTS, DEFAULT_NUM_RETRIES};
use crate::types::retry_on::RetryOn;

/// Host-selection predicate consulted when picking a host for a retry
///
/// The retry core only carries predicates; load balancers call them through
/// the retry state.
pub trait RetryHostPredicate: Send + Sync + fmt::Debug {
    /// True when `host` must not be used for the next attempt.
    fn should_select_another_host(&self, host: &str) -> bool;

    /// Record that `host` was used for an attempt.
    fn on_host_attempted(&self, host: &str);
}

/// Strategy adjusting priority-level load across retries
pub trait RetryPriority: Send + Sync + fmt::Debug {
    /// Record that `host` was used for an attempt.
    fn on_host_attempted(&self, host: &str);
}

/// Retry policy attached to a route
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub retry_on: RetryOn,
    pub num_retries: u32,
    /// Extra status codes retried when `RETRIABLE_STATUS_CODES` is set.
    pub retriable_status_codes: Vec<u32>,
    pub host_selection_max_attempts: u32,
    pub retry_host_predicates: Vec<Arc<dyn RetryHostPredicate>>,
    pub retry_priority: Option<Arc<dyn RetryPriority>>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retry_on: RetryOn::NONE,
            num_retries: DEFAULT_NUM_RETRIES,
            retriable_status_codes: Vec::new(),
            host_selection_max_attempts: DEFAULT_HOST_SELECTION_MAX_ATTEMPTS,
            retry_host_predicates: Vec::new(),
            retry_priority: None,
        }
    }
}

impl RetryPolicy {
    /// Policy with the given triggers and retry count, other fields defaulted.
    pub fn new(retry_on: RetryOn, num_retries: u32) -> Self {
        Self { retry_on, num_retries, ..Self::default() }
    }

    /// Append explicit retriable status codes.
    pub fn with_retriable_status_codes(mut self, codes: impl IntoIterator<Item = u32>) -> Self {
        self.retriable_status_codes.extend(codes);
        self
    }

    /// Set how many hosts may be tried per retry.
    pub fn with_host_selection_max_attempts(mut self, attempts: u32) -> Self {
        self.host_selection_max_attempts = attempts;
        self
    }

    /// Add a host predicate consulted on every retry.
    pub fn with_host_predicate(mut self, predicate: Arc<dyn RetryHostPredicate>) -> Self {
        self.retry_host_predicates.push(predicate);
        self
    }

    /// Set the priority selection strategy.
    pub fn with_retry_priority(mut self, priority: Arc<dyn RetryPriority>) -> Self {
        self.retry_priority = Some(priority);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct RejectAll;

    impl RetryHostPredicate for RejectAll {
        fn should_select_another_host(&self, _host: &str) -> bool {
            true
        }

        fn on_host_attempted(&self, _host: &str) {}
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert!(policy.retry_on.is_empty());
        assert_eq!(policy.num_retries, 1);
        assert_eq!(policy.host_selection_max_attempts, 1);
        assert!(policy.retriable_status_codes.is_empty());
        assert!(policy.retry_host_predicates.is_empty());
        assert!(policy.retry_priority.is_none());
    }

    #[test]
    fn test_builder_methods() {
        let policy = RetryPolicy::new(RetryOn::RETRIABLE_STATUS_CODES, 4)
            .with_retriable_status_codes([409, 429])
            .with_host_selection_max_attempts(3)
            .with_host_predicate(Arc::new(RejectAll));

        assert_eq!(policy.num_retries, 4);
        assert_eq!(policy.retriable_status_codes, vec![409, 429]);
        assert_eq!(policy.host_selection_max_attempts, 3);
        assert_eq!(policy.retry_host_predicates.len(), 1);
    }
}
