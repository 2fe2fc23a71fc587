//! # RetryGate Core
//!
//! Retry admission control for a gateway data path.
//!
//! This crate contains:
//! - Port interfaces for request and response headers
//! - The merged per-request retry policy
//! - Jittered backoff and the retry decision state machine
//! - Upstream cluster context (budgets and counters per priority)
//!
//! ## Architecture Principles
//! - Depends on `retrygate-common` and `retrygate-domain`
//! - No networking or process wiring
//! - Timers, runtime values and randomness are injected
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//!
//! use http::HeaderMap;
//! use retrygate_common::random::ThreadRandom;
//! use retrygate_common::runtime::RuntimeLoader;
//! use retrygate_common::testing::ManualTimerService;
//! use retrygate_core::{Cluster, RetryEnvironment, RetryState, RetryStatus};
//! use retrygate_domain::{CircuitBreakerConfig, ResourcePriority, RetryOn, RetryPolicy};
//!
//! let cluster = Cluster::new("backend", &CircuitBreakerConfig::default());
//! let env = RetryEnvironment::new(
//!     Arc::new(RuntimeLoader::new()),
//!     Arc::new(ThreadRandom),
//!     Arc::new(ManualTimerService::new()),
//! );
//!
//! let route = RetryPolicy::new(RetryOn::FIVE_XX, 2);
//! let mut request = HeaderMap::new();
//! let mut state =
//!     RetryState::create(&route, &mut request, &cluster, ResourcePriority::Default, &env)
//!         .expect("route enables retries");
//!
//! let upstream = http::Response::builder().status(503).body(()).unwrap();
//! let status = state.should_retry_headers(&upstream, Box::new(|| { /* resend */ }));
//! assert_eq!(status, RetryStatus::Yes);
//! ```

pub mod retry;
pub mod upstream;

// Re-export specific items to avoid ambiguity
pub use retry::{
    BackoffStrategy, DoRetryCallback, JitteredBackoffStrategy, MergedRetryPolicy,
    RequestHeaders, ResponseHeaders, RetryEnvironment, RetryState, RetryStatus,
};
pub use upstream::{Cluster, ResourceManager};
