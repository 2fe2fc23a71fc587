//! Time utilities and abstractions
//!
//! - **[`timer`]**: Single-shot, re-armable timers behind a [`TimerService`]
//!
//! ## Usage
//!
//! ```rust
//! # #[cfg(feature = "test-utils")]
//! # {
//! use std::time::Duration;
//!
//! use retrygate_common::testing::ManualTimerService;
//! use retrygate_common::time::TimerService;
//!
//! let timers = ManualTimerService::new();
//! let mut timer = timers.create_timer(Box::new(|| {}));
//! timer.enable(Duration::from_millis(25));
//! assert_eq!(timers.last_enabled(), Some(Duration::from_millis(25)));
//! # }
//! ```

pub mod timer;

// Re-export commonly used items
pub use timer::{Timer, TimerCallback, TimerHandle, TimerService};
#[cfg(feature = "runtime")]
pub use timer::{TokioTimer, TokioTimerService};
