//! Retry admission for upstream requests
//!
//! - [`ports`]: header access traits and `http` adapters
//! - [`policy`]: route policy merged with client overrides
//! - [`backoff`]: jittered exponential backoff
//! - [`state`]: the per-request decision state machine
//! - [`environment`]: runtime, randomness and timers shared across requests

pub mod backoff;
pub mod environment;
pub mod policy;
pub mod ports;
pub mod state;

pub use backoff::{BackoffStrategy, JitteredBackoffStrategy};
pub use environment::RetryEnvironment;
pub use policy::MergedRetryPolicy;
pub use ports::{RequestHeaders, ResponseHeaders};
pub use state::{DoRetryCallback, RetryState, RetryStatus};
