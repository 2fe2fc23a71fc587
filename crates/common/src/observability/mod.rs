//! Observability primitives
//!
//! - Retry counters per upstream cluster (metrics/)

pub mod metrics;

// Re-export commonly used types for convenience
pub use metrics::{ClusterRetryStats, RetryStats, RetryStatsSnapshot};
