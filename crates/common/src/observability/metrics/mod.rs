//! Metrics module for upstream retry observability

pub mod retry;

// Re-export commonly used types
pub use retry::{ClusterRetryStats, RetryStats, RetryStatsSnapshot};
