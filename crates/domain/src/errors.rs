//! Error types used throughout the gateway configuration surface
//!
//! The request data path never fails; only trusted configuration decoding
//! can. Malformed client headers are ignored rather than reported.

use thiserror::Error;

/// Errors raised while decoding route or gateway configuration
#[derive(Error, Debug)]
pub enum RetryConfigError {
    #[error("unknown retry_on token: {0}")]
    UnknownRetryOn(String),

    #[error("unknown retry_grpc_on token: {0}")]
    UnknownRetryGrpcOn(String),

    #[error("invalid retriable status code {0}: must be within 100-599")]
    InvalidStatusCode(u32),

    #[error("invalid gateway configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type alias for configuration decoding
pub type Result<T> = std::result::Result<T, RetryConfigError>;
