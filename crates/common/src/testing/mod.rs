//! Testing utilities and helpers
//!
//! - **[`timer`]**: Timers that fire only when the test asks
//! - **[`random`]**: Scripted random sources
//!
//! ## Usage
//!
//! ```rust
//! # #[cfg(feature = "test-utils")]
//! # {
//! use std::time::Duration;
//!
//! use retrygate_common::random::RandomGenerator;
//! use retrygate_common::testing::{ManualTimerService, SequenceRandom};
//! use retrygate_common::time::TimerService;
//!
//! let rng = SequenceRandom::constant(4);
//! assert_eq!(rng.random() % 25, 4);
//!
//! let timers = ManualTimerService::new();
//! let mut timer = timers.create_timer(Box::new(|| {}));
//! timer.enable(Duration::from_millis(4));
//! assert_eq!(timers.fire_all(), 1);
//! # }
//! ```

pub mod random;
pub mod timer;

// Re-export commonly used items
pub use random::SequenceRandom;
pub use timer::{ManualTimer, ManualTimerService};
