//! Stream termination reasons and priority classes

use serde::{Deserialize, Serialize};

use crate::impl_wire_name_conversions;

/// Why an upstream stream ended without a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamResetReason {
    /// The connection to the upstream could not be established.
    ConnectionFailure,
    /// The connection was torn down mid-stream.
    ConnectionTermination,
    LocalReset,
    LocalRefusedStreamReset,
    /// Rejected locally by an admission guard; never retried.
    Overflow,
    RemoteReset,
    /// The upstream refused the stream before processing it.
    RemoteRefusedStreamReset,
}

impl_wire_name_conversions!(StreamResetReason {
    ConnectionFailure => "connection_failure",
    ConnectionTermination => "connection_termination",
    LocalReset => "local_reset",
    LocalRefusedStreamReset => "local_refused_stream_reset",
    Overflow => "overflow",
    RemoteReset => "remote_reset",
    RemoteRefusedStreamReset => "remote_refused_stream_reset",
});

/// Priority class partitioning a cluster's resource budgets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourcePriority {
    #[default]
    Default,
    High,
}

impl_wire_name_conversions!(ResourcePriority {
    Default => "default",
    High => "high",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_reason_names() {
        assert_eq!(StreamResetReason::Overflow.to_string(), "overflow");
        assert_eq!(
            "remote_refused_stream_reset".parse::<StreamResetReason>().unwrap(),
            StreamResetReason::RemoteRefusedStreamReset
        );
    }

    #[test]
    fn test_priority_default_and_parse() {
        assert_eq!(ResourcePriority::default(), ResourcePriority::Default);
        assert_eq!("HIGH".parse::<ResourcePriority>().unwrap(), ResourcePriority::High);
        assert!("urgent".parse::<ResourcePriority>().is_err());
    }
}
