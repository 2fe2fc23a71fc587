//! Upstream cluster context consumed by retry admission

use std::fmt;
use std::sync::Arc;

use retrygate_common::observability::ClusterRetryStats;
use retrygate_common::resilience::{ResourceBudget, RetryBudget};
use retrygate_domain::{CircuitBreakerConfig, ResourcePriority, Thresholds};

/// Admission guards for one priority class of a cluster
#[derive(Clone)]
pub struct ResourceManager {
    retries: Arc<dyn ResourceBudget>,
}

impl fmt::Debug for ResourceManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceManager")
            .field("retries_active", &self.retries.count())
            .field("retries_max", &self.retries.max())
            .finish()
    }
}

impl ResourceManager {
    /// Resource manager with a fresh retry budget sized by `thresholds`.
    pub fn new(thresholds: Thresholds) -> Self {
        Self::with_retry_budget(Arc::new(RetryBudget::new(thresholds.max_retries)))
    }

    /// Use a caller-provided budget, e.g. one shared with another cluster.
    pub fn with_retry_budget(retries: Arc<dyn ResourceBudget>) -> Self {
        Self { retries }
    }

    /// Budget of concurrent in-flight retries.
    pub fn retries(&self) -> &Arc<dyn ResourceBudget> {
        &self.retries
    }
}

/// A named upstream with per-priority budgets and retry counters
///
/// Shared by every request routed to the upstream; hold it behind an `Arc`.
#[derive(Debug)]
pub struct Cluster {
    name: String,
    default_resources: ResourceManager,
    high_resources: ResourceManager,
    stats: Arc<ClusterRetryStats>,
}

impl Cluster {
    /// Cluster with one retry budget per priority class.
    pub fn new(name: impl Into<String>, circuit_breakers: &CircuitBreakerConfig) -> Self {
        Self::with_resource_managers(
            name,
            ResourceManager::new(circuit_breakers.thresholds(ResourcePriority::Default)),
            ResourceManager::new(circuit_breakers.thresholds(ResourcePriority::High)),
        )
    }

    /// Cluster over caller-supplied resource managers.
    pub fn with_resource_managers(
        name: impl Into<String>,
        default_resources: ResourceManager,
        high_resources: ResourceManager,
    ) -> Self {
        Self {
            name: name.into(),
            default_resources,
            high_resources,
            stats: Arc::new(ClusterRetryStats::new()),
        }
    }

    /// Cluster name, used in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resource manager for `priority`.
    pub fn resource_manager(&self, priority: ResourcePriority) -> &ResourceManager {
        match priority {
            ResourcePriority::Default => &self.default_resources,
            ResourcePriority::High => &self.high_resources,
        }
    }

    /// Retry counters shared by every request on this cluster.
    pub fn stats(&self) -> &Arc<ClusterRetryStats> {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for upstream::cluster.
    use retrygate_domain::GatewayConfig;

    use super::*;

    /// Validates `Cluster::new` behavior for per-priority budgets.
    ///
    /// Assertions:
    /// - Confirms each priority gets its configured ceiling.
    /// - Confirms the budgets are independent.
    #[test]
    fn test_priorities_have_independent_budgets() {
        let config = GatewayConfig::from_toml_str(
            r#"
            [circuit_breakers.default]
            max_retries = 1

            [circuit_breakers.high]
            max_retries = 5
            "#,
        )
        .unwrap();
        let cluster = Cluster::new("backend", &config.circuit_breakers);

        let default = cluster.resource_manager(ResourcePriority::Default).retries();
        let high = cluster.resource_manager(ResourcePriority::High).retries();
        assert_eq!(default.max(), 1);
        assert_eq!(high.max(), 5);

        default.inc();
        assert!(!default.can_create());
        assert!(high.can_create());
        assert_eq!(cluster.name(), "backend");
    }

    #[test]
    fn test_shared_budget_handle() {
        let budget: Arc<dyn ResourceBudget> = Arc::new(RetryBudget::new(2));
        let cluster = Cluster::with_resource_managers(
            "shared",
            ResourceManager::with_retry_budget(Arc::clone(&budget)),
            ResourceManager::with_retry_budget(Arc::clone(&budget)),
        );

        cluster.resource_manager(ResourcePriority::High).retries().inc();
        assert_eq!(budget.count(), 1);
        assert_eq!(cluster.resource_manager(ResourcePriority::Default).retries().count(), 1);
    }
}
