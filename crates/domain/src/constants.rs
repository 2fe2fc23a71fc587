//! Gateway constants
//!
//! Centralized location for wire names and runtime keys shared by the
//! retry admission path.

// Client-supplied request headers
pub const HEADER_RETRY_ON: &str = "x-envoy-retry-on";
pub const HEADER_RETRY_GRPC_ON: &str = "x-envoy-retry-grpc-on";
pub const HEADER_MAX_RETRIES: &str = "x-envoy-max-retries";
pub const HEADER_RETRIABLE_STATUS_CODES: &str = "x-envoy-retriable-status-codes";

/// Request headers stripped before the request is forwarded upstream.
pub const STRIPPED_RETRY_HEADERS: [&str; 3] =
    [HEADER_RETRY_ON, HEADER_RETRY_GRPC_ON, HEADER_MAX_RETRIES];

// Response markers that always veto a retry
pub const HEADER_OVERLOADED: &str = "x-envoy-overloaded";
pub const HEADER_RATE_LIMITED: &str = "x-envoy-ratelimited";

/// Response header carrying the gRPC status code.
pub const HEADER_GRPC_STATUS: &str = "grpc-status";

// Runtime keys
pub const RUNTIME_BASE_RETRY_BACKOFF_MS: &str = "upstream.base_retry_backoff_ms";
pub const RUNTIME_USE_RETRY: &str = "upstream.use_retry";

pub const DEFAULT_BASE_RETRY_BACKOFF_MS: u64 = 25;
pub const DEFAULT_USE_RETRY_PERCENT: u64 = 100;

/// The backoff ceiling is this many times the base interval.
pub const MAX_BACKOFF_MULTIPLIER: u64 = 10;

// Route policy defaults
pub const DEFAULT_NUM_RETRIES: u32 = 1;
pub const DEFAULT_HOST_SELECTION_MAX_ATTEMPTS: u32 = 1;

/// Default ceiling of concurrent in-flight retries per priority class.
pub const DEFAULT_MAX_RETRIES_BUDGET: u64 = 3;
