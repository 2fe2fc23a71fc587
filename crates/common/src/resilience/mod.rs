//! Resilience primitives for upstream admission control
//!
//! - **Budget**: Concurrent counters with a ceiling, used to cap how many
//!   retries may be outstanding against one upstream at a time

pub mod budget;

pub use budget::{ResourceBudget, RetryBudget};
