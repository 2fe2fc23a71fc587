//! Per-request retry admission
//!
//! A [`RetryState`] is created when a request starts and consulted after every
//! failed upstream attempt. Each decision first settles the previous round:
//! if a retry was armed and the attempt it produced needs no further retry,
//! the retry counts as a success. The budget increment taken when arming is
//! held until that next decision, or until the state is dropped.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use retrygate_common::observability::RetryStats;
use retrygate_common::resilience::ResourceBudget;
use retrygate_common::runtime::RuntimeSnapshot;
use retrygate_common::time::{Timer, TimerCallback, TimerService};
use retrygate_domain::constants::{DEFAULT_USE_RETRY_PERCENT, RUNTIME_USE_RETRY};
use retrygate_domain::{ResourcePriority, RetryOn, RetryPolicy, RetryPriority, StreamResetReason};
use tracing::{debug, trace};

use super::backoff::{BackoffStrategy, JitteredBackoffStrategy};
use super::environment::RetryEnvironment;
use super::policy::MergedRetryPolicy;
use super::ports::{RequestHeaders, ResponseHeaders};
use crate::upstream::Cluster;

/// Callback that performs the retry once the backoff elapses
pub type DoRetryCallback = Box<dyn FnOnce() + Send + 'static>;

/// Callback of the current arming, tagged with the generation it belongs to.
///
/// Every arm and every reset moves to a new generation. A timer only takes the
/// callback of the generation it was enabled for, so a late fire from an
/// earlier arming finds nothing to run.
#[derive(Default)]
struct PendingRetry {
    generation: u64,
    callback: Option<DoRetryCallback>,
}

type CallbackSlot = Arc<Mutex<PendingRetry>>;

/// Outcome of a retry decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RetryStatus {
    /// A retry is scheduled; the callback runs after the backoff.
    Yes,
    /// The outcome does not warrant a retry, or retries are disabled.
    No,
    /// The request has used every retry it was allowed.
    NoRetryLimitExceeded,
    /// The cluster's concurrent retry budget is full.
    NoOverflow,
}

/// Retry admission state for one request
pub struct RetryState {
    policy: MergedRetryPolicy,
    cluster_name: String,
    priority: ResourcePriority,
    budget: Arc<dyn ResourceBudget>,
    stats: Arc<dyn RetryStats>,
    runtime: Arc<dyn RuntimeSnapshot>,
    timers: Arc<dyn TimerService>,
    backoff: Box<dyn BackoffStrategy>,
    pending: CallbackSlot,
    timer: Option<Box<dyn Timer>>,
    armed: bool,
}

impl fmt::Debug for RetryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryState")
            .field("cluster", &self.cluster_name)
            .field("priority", &self.priority)
            .field("retry_on", &self.policy.retry_on())
            .field("retries_remaining", &self.policy.retries_remaining())
            .field("armed", &self.armed)
            .finish_non_exhaustive()
    }
}

impl RetryState {
    /// Build the retry state for a request.
    ///
    /// Returns `None` when no retry trigger is configured on the route or
    /// requested by the client. The retry-control headers are stripped from
    /// `request_headers` either way.
    pub fn create<H>(
        route_policy: &RetryPolicy,
        request_headers: &mut H,
        cluster: &Cluster,
        priority: ResourcePriority,
        env: &RetryEnvironment,
    ) -> Option<Self>
    where
        H: RequestHeaders + ?Sized,
    {
        let policy = MergedRetryPolicy::build(route_policy, request_headers)?;
        let backoff =
            JitteredBackoffStrategy::from_runtime(env.runtime.as_ref(), Arc::clone(&env.random));
        let stats: Arc<dyn RetryStats> = cluster.stats().clone();

        Some(Self::with_backoff(
            policy,
            cluster.name(),
            priority,
            Arc::clone(cluster.resource_manager(priority).retries()),
            stats,
            env,
            Box::new(backoff),
        ))
    }

    /// Assemble a state from its parts, with a caller-chosen backoff.
    pub fn with_backoff(
        policy: MergedRetryPolicy,
        cluster_name: impl Into<String>,
        priority: ResourcePriority,
        budget: Arc<dyn ResourceBudget>,
        stats: Arc<dyn RetryStats>,
        env: &RetryEnvironment,
        backoff: Box<dyn BackoffStrategy>,
    ) -> Self {
        Self {
            policy,
            cluster_name: cluster_name.into(),
            priority,
            budget,
            stats,
            runtime: Arc::clone(&env.runtime),
            timers: Arc::clone(&env.timers),
            backoff,
            pending: Arc::new(Mutex::new(PendingRetry::default())),
            timer: None,
            armed: false,
        }
    }

    /// Decide on a retry after an upstream response.
    pub fn should_retry_headers<R>(&mut self, response: &R, callback: DoRetryCallback) -> RetryStatus
    where
        R: ResponseHeaders + ?Sized,
    {
        let would_retry = self.policy.would_retry_from_headers(response);
        self.should_retry(would_retry, callback)
    }

    /// Decide on a retry after the upstream stream was reset.
    pub fn should_retry_reset(
        &mut self,
        reason: StreamResetReason,
        callback: DoRetryCallback,
    ) -> RetryStatus {
        let would_retry = self.policy.would_retry_from_reset(reason);
        self.should_retry(would_retry, callback)
    }

    /// Decide on a retry given a precomputed eligibility.
    ///
    /// One retry is spent on every call that does not return
    /// [`RetryStatus::NoRetryLimitExceeded`], including calls whose outcome
    /// was not retriable.
    pub fn should_retry(&mut self, would_retry: bool, callback: DoRetryCallback) -> RetryStatus {
        if self.armed && !would_retry {
            self.stats.retry_succeeded();
        }

        self.reset_retry();

        let status = self.decide(would_retry, callback);
        debug!(
            cluster = %self.cluster_name,
            priority = %self.priority,
            would_retry,
            retries_remaining = self.policy.retries_remaining(),
            status = ?status,
            "retry decision"
        );
        status
    }

    fn decide(&mut self, would_retry: bool, callback: DoRetryCallback) -> RetryStatus {
        if !self.policy.consume_retry() {
            return RetryStatus::NoRetryLimitExceeded;
        }

        if !would_retry {
            return RetryStatus::No;
        }

        if !self.budget.can_create() {
            self.stats.retry_overflow();
            return RetryStatus::NoOverflow;
        }

        if !self.runtime.feature_enabled(RUNTIME_USE_RETRY, DEFAULT_USE_RETRY_PERCENT) {
            return RetryStatus::No;
        }

        self.arm(callback);
        RetryStatus::Yes
    }

    fn arm(&mut self, callback: DoRetryCallback) {
        debug_assert!(!self.armed, "retry armed twice");

        let generation = {
            let mut pending = self.pending.lock();
            pending.generation = pending.generation.wrapping_add(1);
            pending.callback = Some(callback);
            pending.generation
        };
        self.armed = true;
        self.budget.inc();
        self.stats.retry_attempted();

        let delay = self.backoff.next_backoff();
        trace!(
            cluster = %self.cluster_name,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            generation,
            "retry scheduled"
        );

        let mut timer =
            self.timers.create_timer(fire_pending(Arc::downgrade(&self.pending), generation));
        timer.enable(delay);
        self.timer = Some(timer);
    }

    /// Release an armed retry: give back the budget, drop the callback and
    /// cancel the timer.
    ///
    /// Idempotent. Called by every decision and on drop.
    pub fn reset_retry(&mut self) {
        if self.armed {
            self.budget.dec();
            self.armed = false;
        }

        let stale = {
            let mut pending = self.pending.lock();
            pending.generation = pending.generation.wrapping_add(1);
            pending.callback.take()
        };
        drop(stale);

        if let Some(mut timer) = self.timer.take() {
            timer.disable();
        }
    }

    /// True between arming a retry and the next decision.
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// True while the retry callback is waiting on its backoff.
    pub fn is_retry_pending(&self) -> bool {
        self.pending.lock().callback.is_some()
    }

    /// Retries this request may still spend.
    pub fn retries_remaining(&self) -> u32 {
        self.policy.retries_remaining()
    }

    /// Merged retry triggers.
    pub fn retry_on(&self) -> RetryOn {
        self.policy.retry_on()
    }

    /// The merged policy behind every decision.
    pub fn policy(&self) -> &MergedRetryPolicy {
        &self.policy
    }

    /// Priority class whose budget this request draws on.
    pub fn priority(&self) -> ResourcePriority {
        self.priority
    }

    /// Host selection attempts allowed per retry.
    pub fn host_selection_max_attempts(&self) -> u32 {
        self.policy.host_selection_max_attempts()
    }

    /// Priority selection strategy from the route, if any.
    pub fn retry_priority(&self) -> Option<&Arc<dyn RetryPriority>> {
        self.policy.retry_priority()
    }

    /// True when a host predicate rejects `host`.
    pub fn should_select_another_host(&self, host: &str) -> bool {
        self.policy.should_select_another_host(host)
    }

    /// Report an attempted host to the predicates and priority strategy.
    pub fn on_host_attempted(&self, host: &str) {
        self.policy.on_host_attempted(host);
    }
}

impl Drop for RetryState {
    fn drop(&mut self) {
        self.reset_retry();
    }
}

fn fire_pending(slot: Weak<Mutex<PendingRetry>>, generation: u64) -> TimerCallback {
    Box::new(move || {
        let Some(slot) = slot.upgrade() else {
            return;
        };
        let callback = {
            let mut pending = slot.lock();
            if pending.generation != generation {
                trace!(generation, current = pending.generation, "stale retry timer ignored");
                return;
            }
            pending.callback.take()
        };
        if let Some(callback) = callback {
            callback();
        }
    })
}
