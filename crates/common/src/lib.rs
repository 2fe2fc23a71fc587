//! Modular common utilities shared across RetryGate crates.
//!
//! # Safety and Quality
//!
//! This crate enforces strict safety and quality standards to ensure
//! reliability across all RetryGate components.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: injectable randomness, timer traits
//! - `observability`: retry counters (pulls in tracing)
//! - `runtime`: tokio timers, retry budgets, live runtime overrides
//! - `test-utils`: hand-driven timers and scripted randomness

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod random;
#[cfg(feature = "foundation")]
pub mod time;

// Observability
// -------------------------------------------------------------------
#[cfg(feature = "observability")]
pub mod observability;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod resilience;
#[cfg(feature = "runtime")]
pub mod runtime;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "test-utils", all(test, feature = "foundation")))]
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "observability")]
pub use observability::{ClusterRetryStats, RetryStats, RetryStatsSnapshot};
#[cfg(feature = "foundation")]
pub use random::{RandomGenerator, SeededRandom, ThreadRandom};
#[cfg(feature = "runtime")]
pub use resilience::{ResourceBudget, RetryBudget};
#[cfg(feature = "runtime")]
pub use runtime::{RuntimeLoader, RuntimeSnapshot};
#[cfg(feature = "foundation")]
pub use time::{Timer, TimerCallback, TimerService};
#[cfg(feature = "runtime")]
pub use time::TokioTimerService;
