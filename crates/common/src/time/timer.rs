//! Single-shot, re-armable timers
//!
//! [`TimerService`] creates [`Timer`]s bound to a fire callback. A timer is
//! armed with [`Timer::enable`], re-arming replaces the pending deadline, and
//! dropping the timer cancels it. [`TokioTimerService`] is the production
//! implementation; `testing::ManualTimerService` drives timers by hand.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Callback invoked each time a timer fires
pub type TimerCallback = Box<dyn FnMut() + Send + 'static>;

/// A single-shot timer that can be re-armed
pub trait Timer: Send {
    /// Arm the timer to fire once after `delay`, replacing any pending fire.
    fn enable(&mut self, delay: Duration);

    /// Cancel a pending fire. No-op when the timer is idle.
    fn disable(&mut self);

    /// True while a fire is pending.
    fn is_enabled(&self) -> bool;
}

/// Factory for timers bound to an event loop
pub trait TimerService: Send + Sync {
    /// Create an idle timer that runs `on_fire` each time it fires.
    fn create_timer(&self, on_fire: TimerCallback) -> Box<dyn Timer>;
}

/// A handle that can be used to cancel one arming of a timer
#[derive(Debug, Clone, Default)]
pub struct TimerHandle {
    cancelled: Arc<AtomicBool>,
}

impl TimerHandle {
    /// Create a new timer handle
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the timer
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Check if the timer has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(feature = "runtime")]
pub use self::tokio_timer::{TokioTimer, TokioTimerService};

#[cfg(feature = "runtime")]
mod tokio_timer {
    use std::sync::Arc;
    use std::time::Duration;

    use parking_lot::Mutex;
    use tokio::runtime::{Handle, TryCurrentError};
    use tokio::task::JoinHandle;
    use tokio::time::sleep;
    use tracing::trace;

    use super::{Timer, TimerCallback, TimerHandle, TimerService};

    /// Timer service spawning one sleeping task per arming
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::time::Duration;
    ///
    /// use retrygate_common::time::timer::{TimerService, TokioTimerService};
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let timers = TokioTimerService::try_current().unwrap();
    ///     let mut timer = timers.create_timer(Box::new(|| println!("fired")));
    ///     timer.enable(Duration::from_millis(25));
    ///     tokio::time::sleep(Duration::from_millis(30)).await;
    /// }
    /// ```
    #[derive(Debug, Clone)]
    pub struct TokioTimerService {
        handle: Handle,
    }

    impl TokioTimerService {
        /// Spawn timer tasks on `handle`.
        pub fn new(handle: Handle) -> Self {
            Self { handle }
        }

        /// Bind to the runtime the caller is running on.
        ///
        /// # Errors
        ///
        /// Fails when called outside a tokio runtime.
        pub fn try_current() -> Result<Self, TryCurrentError> {
            Handle::try_current().map(Self::new)
        }
    }

    impl TimerService for TokioTimerService {
        fn create_timer(&self, on_fire: TimerCallback) -> Box<dyn Timer> {
            Box::new(TokioTimer {
                runtime: self.handle.clone(),
                on_fire: Arc::new(Mutex::new(on_fire)),
                armed: None,
            })
        }
    }

    /// Timer backed by a spawned `tokio::time::sleep`
    pub struct TokioTimer {
        runtime: Handle,
        on_fire: Arc<Mutex<TimerCallback>>,
        armed: Option<(TimerHandle, JoinHandle<()>)>,
    }

    impl Timer for TokioTimer {
        fn enable(&mut self, delay: Duration) {
            self.disable();

            let handle = TimerHandle::new();
            let fire_handle = handle.clone();
            let on_fire = Arc::clone(&self.on_fire);
            let task = self.runtime.spawn(async move {
                sleep(delay).await;
                let mut on_fire = on_fire.lock();
                if !fire_handle.is_cancelled() {
                    trace!(
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "timer fired"
                    );
                    (*on_fire)();
                }
            });
            self.armed = Some((handle, task));
        }

        fn disable(&mut self) {
            if let Some((handle, task)) = self.armed.take() {
                handle.cancel();
                task.abort();
            }
        }

        fn is_enabled(&self) -> bool {
            self.armed
                .as_ref()
                .is_some_and(|(handle, task)| !handle.is_cancelled() && !task.is_finished())
        }
    }

    impl Drop for TokioTimer {
        fn drop(&mut self) {
            self.disable();
        }
    }
}

#[cfg(all(test, feature = "runtime"))]
mod tests {
    //! Unit tests for time::timer.
    use std::sync::atomic::AtomicU32;

    use super::*;

    fn counting_callback(counter: &Arc<AtomicU32>) -> TimerCallback {
        let counter = Arc::clone(counter);
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    /// Validates `TimerHandle::new` behavior for the timer handle cancel
    /// scenario.
    ///
    /// Assertions:
    /// - Ensures `!handle.is_cancelled()` evaluates to true.
    /// - Ensures `handle.is_cancelled()` evaluates to true.
    #[test]
    fn test_timer_handle_cancel() {
        let handle = TimerHandle::new();
        assert!(!handle.is_cancelled());

        handle.cancel();
        assert!(handle.is_cancelled());
    }

    /// Validates `TokioTimer::enable` fires once after the delay.
    ///
    /// Assertions:
    /// - Confirms the callback has not run before the deadline.
    /// - Confirms the callback ran exactly once after the deadline.
    #[tokio::test(start_paused = true)]
    async fn test_timer_fires_after_delay() {
        let counter = Arc::new(AtomicU32::new(0));
        let timers = TokioTimerService::try_current().unwrap();
        let mut timer = timers.create_timer(counting_callback(&counter));

        timer.enable(Duration::from_millis(100));
        assert!(timer.is_enabled());

        tokio::time::sleep(Duration::from_millis(99)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(!timer.is_enabled());
    }

    /// Re-arming replaces the pending deadline instead of adding a second fire.
    #[tokio::test(start_paused = true)]
    async fn test_reenable_replaces_deadline() {
        let counter = Arc::new(AtomicU32::new(0));
        let timers = TokioTimerService::try_current().unwrap();
        let mut timer = timers.create_timer(counting_callback(&counter));

        timer.enable(Duration::from_millis(10));
        timer.enable(Duration::from_millis(50));

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    /// Validates `Timer::disable` behavior for the cancelled scenario.
    ///
    /// Assertions:
    /// - Confirms `counter.load(Ordering::SeqCst)` equals `0`.
    #[tokio::test(start_paused = true)]
    async fn test_disable_cancels() {
        let counter = Arc::new(AtomicU32::new(0));
        let timers = TokioTimerService::try_current().unwrap();
        let mut timer = timers.create_timer(counting_callback(&counter));

        timer.enable(Duration::from_millis(50));
        timer.disable();
        assert!(!timer.is_enabled());

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let counter = Arc::new(AtomicU32::new(0));
        let timers = TokioTimerService::try_current().unwrap();
        let mut timer = timers.create_timer(counting_callback(&counter));

        timer.enable(Duration::from_millis(50));
        drop(timer);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_try_current_outside_runtime() {
        assert!(TokioTimerService::try_current().is_err());
    }
}
