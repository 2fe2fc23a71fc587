//! Canonical gRPC status codes

use crate::types::retry_on::RetryOn;

/// gRPC status carried by a response's `grpc-status` header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrpcStatus {
    Ok,
    Canceled,
    Unknown,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    ResourceExhausted,
    FailedPrecondition,
    Aborted,
    OutOfRange,
    Unimplemented,
    Internal,
    Unavailable,
    DataLoss,
    Unauthenticated,
    /// The header was present but did not hold a canonical code.
    InvalidCode,
}

impl GrpcStatus {
    /// Map a numeric code, anything outside 0-16 becoming `InvalidCode`
    pub const fn from_code(code: u64) -> Self {
        match code {
            0 => Self::Ok,
            1 => Self::Canceled,
            2 => Self::Unknown,
            3 => Self::InvalidArgument,
            4 => Self::DeadlineExceeded,
            5 => Self::NotFound,
            6 => Self::AlreadyExists,
            7 => Self::PermissionDenied,
            8 => Self::ResourceExhausted,
            9 => Self::FailedPrecondition,
            10 => Self::Aborted,
            11 => Self::OutOfRange,
            12 => Self::Unimplemented,
            13 => Self::Internal,
            14 => Self::Unavailable,
            15 => Self::DataLoss,
            16 => Self::Unauthenticated,
            _ => Self::InvalidCode,
        }
    }

    /// Parse a raw `grpc-status` header value.
    pub fn from_header_value(value: &str) -> Self {
        value.trim().parse::<u64>().map_or(Self::InvalidCode, Self::from_code)
    }

    /// The retry trigger that covers this status, if any.
    pub const fn retry_on_bit(self) -> Option<RetryOn> {
        match self {
            Self::Canceled => Some(RetryOn::GRPC_CANCELLED),
            Self::DeadlineExceeded => Some(RetryOn::GRPC_DEADLINE_EXCEEDED),
            Self::ResourceExhausted => Some(RetryOn::GRPC_RESOURCE_EXHAUSTED),
            Self::Unavailable => Some(RetryOn::GRPC_UNAVAILABLE),
            Self::Internal => Some(RetryOn::GRPC_INTERNAL),
            _ => None,
        }
    }
}
