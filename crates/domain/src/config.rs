//! Gateway configuration structures
//!
//! Route retry policies, per-priority retry budgets and runtime overrides
//! are read from TOML. Route configuration is trusted input and is validated
//! strictly, unlike the client override headers merged at request time.
//!
//! ```toml
//! [retry_policy]
//! retry_on = "5xx,connect-failure"
//! retry_grpc_on = "unavailable"
//! num_retries = 3
//! retriable_status_codes = [409]
//!
//! [circuit_breakers.high]
//! max_retries = 10
//!
//! [runtime]
//! "upstream.base_retry_backoff_ms" = 50
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_HOST_SELECTION_MAX_ATTEMPTS, DEFAULT_MAX_RETRIES_BUDGET, DEFAULT_NUM_RETRIES,
};
use crate::errors::{Result, RetryConfigError};
use crate::types::{ResourcePriority, RetryOn, RetryPolicy};

/// Serialized form of a route retry policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryPolicyConfig {
    pub retry_on: String,
    pub retry_grpc_on: String,
    pub num_retries: u32,
    pub retriable_status_codes: Vec<u32>,
    pub host_selection_retry_max_attempts: u32,
}

impl Default for RetryPolicyConfig {
    fn default() -> Self {
        Self {
            retry_on: String::new(),
            retry_grpc_on: String::new(),
            num_retries: DEFAULT_NUM_RETRIES,
            retriable_status_codes: Vec::new(),
            host_selection_retry_max_attempts: DEFAULT_HOST_SELECTION_MAX_ATTEMPTS,
        }
    }
}

impl RetryPolicyConfig {
    /// Validate and convert into a [`RetryPolicy`].
    ///
    /// # Errors
    ///
    /// Fails on unknown trigger tokens and on status codes outside 100-599.
    pub fn into_policy(self) -> Result<RetryPolicy> {
        let retry_on = RetryOn::try_parse_retry_on(&self.retry_on)?
            | RetryOn::try_parse_retry_grpc_on(&self.retry_grpc_on)?;

        if let Some(code) = self.retriable_status_codes.iter().find(|c| !(100..600).contains(*c)) {
            return Err(RetryConfigError::InvalidStatusCode(*code));
        }

        Ok(RetryPolicy::new(retry_on, self.num_retries)
            .with_retriable_status_codes(self.retriable_status_codes)
            .with_host_selection_max_attempts(self.host_selection_retry_max_attempts))
    }
}

/// Thresholds for one priority class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
    /// Ceiling of concurrent in-flight retries.
    pub max_retries: u64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self { max_retries: DEFAULT_MAX_RETRIES_BUDGET }
    }
}

/// Per-priority resource thresholds for a cluster
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CircuitBreakerConfig {
    pub default: Thresholds,
    pub high: Thresholds,
}

impl CircuitBreakerConfig {
    /// Thresholds for one priority class.
    pub fn thresholds(&self, priority: ResourcePriority) -> Thresholds {
        match priority {
            ResourcePriority::Default => self.default,
            ResourcePriority::High => self.high,
        }
    }
}

/// Top-level gateway configuration document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewayConfig {
    pub retry_policy: RetryPolicyConfig,
    pub circuit_breakers: CircuitBreakerConfig,
    /// Integer overrides keyed by runtime key.
    pub runtime: BTreeMap<String, u64>,
}

impl GatewayConfig {
    /// Parse a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`RetryConfigError::Toml`] when the document is malformed.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        Ok(toml::from_str(input)?)
    }
}
