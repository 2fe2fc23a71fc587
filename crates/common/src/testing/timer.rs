//! Hand-driven timers for deterministic tests
//!
//! [`ManualTimerService`] records every arming and only fires when the test
//! says so, which makes backoff delays observable without a runtime.
//!
//! # Examples
//!
//! ```
//! # #[cfg(feature = "test-utils")]
//! # {
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use retrygate_common::testing::ManualTimerService;
//! use retrygate_common::time::TimerService;
//!
//! let fired = Arc::new(AtomicBool::new(false));
//! let flag = Arc::clone(&fired);
//!
//! let timers = ManualTimerService::new();
//! let mut timer = timers.create_timer(Box::new(move || flag.store(true, Ordering::SeqCst)));
//! timer.enable(Duration::from_millis(10));
//!
//! assert_eq!(timers.fire_all(), 1);
//! assert!(fired.load(Ordering::SeqCst));
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::time::timer::{Timer, TimerCallback, TimerService};

#[derive(Default)]
struct ArmState {
    pending: Option<Duration>,
    dropped: bool,
}

struct ManualTimerShared {
    arm: Mutex<ArmState>,
    on_fire: Mutex<TimerCallback>,
}

/// Timer service whose timers fire only on demand
#[derive(Clone, Default)]
pub struct ManualTimerService {
    timers: Arc<Mutex<Vec<Arc<ManualTimerShared>>>>,
    history: Arc<Mutex<Vec<Duration>>>,
}

impl std::fmt::Debug for ManualTimerService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualTimerService")
            .field("timers_created", &self.timers_created())
            .field("pending", &self.pending())
            .field("history", &*self.history.lock())
            .finish()
    }
}

impl ManualTimerService {
    /// Create a service with no timers
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of timers created so far, including dropped ones
    pub fn timers_created(&self) -> usize {
        self.timers.lock().len()
    }

    /// Number of timers currently armed
    pub fn pending(&self) -> usize {
        self.timers.lock().iter().filter(|t| t.arm.lock().pending.is_some()).count()
    }

    /// Every delay passed to `enable`, oldest first
    pub fn enabled_durations(&self) -> Vec<Duration> {
        self.history.lock().clone()
    }

    /// The delay of the most recent `enable`
    pub fn last_enabled(&self) -> Option<Duration> {
        self.history.lock().last().copied()
    }

    /// Fire every armed timer once. Returns how many fired.
    pub fn fire_all(&self) -> usize {
        let timers: Vec<_> = self.timers.lock().clone();
        timers.iter().filter(|timer| Self::fire_one(timer)).count()
    }

    /// Run the callback of the `index`-th created timer even if it was
    /// disabled or dropped, the way a timer task that already passed its
    /// cancellation check would. Returns false when no such timer exists.
    pub fn force_fire(&self, index: usize) -> bool {
        let Some(timer) = self.timers.lock().get(index).cloned() else {
            return false;
        };
        timer.arm.lock().pending = None;
        (*timer.on_fire.lock())();
        true
    }

    fn fire_one(timer: &ManualTimerShared) -> bool {
        {
            let mut arm = timer.arm.lock();
            if arm.dropped || arm.pending.take().is_none() {
                return false;
            }
        }
        (*timer.on_fire.lock())();
        true
    }
}

impl TimerService for ManualTimerService {
    fn create_timer(&self, on_fire: TimerCallback) -> Box<dyn Timer> {
        let shared = Arc::new(ManualTimerShared {
            arm: Mutex::new(ArmState::default()),
            on_fire: Mutex::new(on_fire),
        });
        self.timers.lock().push(Arc::clone(&shared));
        Box::new(ManualTimer { shared, history: Arc::clone(&self.history) })
    }
}

/// Timer created by [`ManualTimerService`]
pub struct ManualTimer {
    shared: Arc<ManualTimerShared>,
    history: Arc<Mutex<Vec<Duration>>>,
}

impl Timer for ManualTimer {
    fn enable(&mut self, delay: Duration) {
        self.history.lock().push(delay);
        self.shared.arm.lock().pending = Some(delay);
    }

    fn disable(&mut self) {
        self.shared.arm.lock().pending = None;
    }

    fn is_enabled(&self) -> bool {
        self.shared.arm.lock().pending.is_some()
    }
}

impl Drop for ManualTimer {
    fn drop(&mut self) {
        let mut arm = self.shared.arm.lock();
        arm.pending = None;
        arm.dropped = true;
    }
}
