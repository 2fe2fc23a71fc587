//! Process-wide collaborators handed to every retry state

use std::fmt;
use std::sync::Arc;

use retrygate_common::random::{RandomGenerator, ThreadRandom};
use retrygate_common::runtime::{RuntimeLoader, RuntimeSnapshot};
use retrygate_common::time::TimerService;
use retrygate_domain::GatewayConfig;

/// Runtime, randomness and timers shared across requests
#[derive(Clone)]
pub struct RetryEnvironment {
    pub runtime: Arc<dyn RuntimeSnapshot>,
    pub random: Arc<dyn RandomGenerator>,
    pub timers: Arc<dyn TimerService>,
}

impl fmt::Debug for RetryEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryEnvironment").finish_non_exhaustive()
    }
}

impl RetryEnvironment {
    /// Bundle the shared collaborators.
    pub fn new(
        runtime: Arc<dyn RuntimeSnapshot>,
        random: Arc<dyn RandomGenerator>,
        timers: Arc<dyn TimerService>,
    ) -> Self {
        Self { runtime, random, timers }
    }

    /// Build an environment whose runtime starts from the `[runtime]` table of
    /// `config`.
    ///
    /// The returned loader is live: overrides set on it after construction
    /// are seen by the next retry decision.
    pub fn from_config(
        config: &GatewayConfig,
        timers: Arc<dyn TimerService>,
    ) -> (Self, Arc<RuntimeLoader>) {
        let random: Arc<dyn RandomGenerator> = Arc::new(ThreadRandom);
        let loader = Arc::new(
            RuntimeLoader::with_random(Arc::clone(&random))
                .with_overrides(config.runtime.iter().map(|(key, value)| (key.clone(), *value))),
        );
        let runtime: Arc<dyn RuntimeSnapshot> = loader.clone();
        (Self::new(runtime, random, timers), loader)
    }
}
