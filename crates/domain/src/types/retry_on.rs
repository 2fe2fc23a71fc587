//! Retry trigger taxonomy
//!
//! `RetryOn` is a fixed-size bitset with one named constant per trigger
//! condition. Route configuration and client headers are both parsed into it
//! and merged with `|`.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

use crate::errors::{Result, RetryConfigError};

/// Set of conditions under which an upstream attempt may be retried
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RetryOn(u32);

impl RetryOn {
    pub const NONE: Self = Self(0);
    pub const FIVE_XX: Self = Self(0x1);
    pub const GATEWAY_ERROR: Self = Self(0x2);
    pub const CONNECT_FAILURE: Self = Self(0x4);
    pub const RETRIABLE_4XX: Self = Self(0x8);
    pub const REFUSED_STREAM: Self = Self(0x10);
    pub const GRPC_CANCELLED: Self = Self(0x20);
    pub const GRPC_DEADLINE_EXCEEDED: Self = Self(0x40);
    pub const GRPC_RESOURCE_EXHAUSTED: Self = Self(0x80);
    pub const GRPC_UNAVAILABLE: Self = Self(0x100);
    pub const GRPC_INTERNAL: Self = Self(0x200);
    pub const RETRIABLE_STATUS_CODES: Self = Self(0x400);

    /// Every gRPC status trigger.
    pub const GRPC_ANY: Self = Self(
        Self::GRPC_CANCELLED.0
            | Self::GRPC_DEADLINE_EXCEEDED.0
            | Self::GRPC_RESOURCE_EXHAUSTED.0
            | Self::GRPC_UNAVAILABLE.0
            | Self::GRPC_INTERNAL.0,
    );

    const ALL_BITS: u32 = 0x7ff;

    /// Tokens accepted in the HTTP `retry-on` list.
    pub const HTTP_TOKENS: [(&'static str, Self); 6] = [
        ("5xx", Self::FIVE_XX),
        ("gateway-error", Self::GATEWAY_ERROR),
        ("connect-failure", Self::CONNECT_FAILURE),
        ("retriable-4xx", Self::RETRIABLE_4XX),
        ("refused-stream", Self::REFUSED_STREAM),
        ("retriable-status-codes", Self::RETRIABLE_STATUS_CODES),
    ];

    /// Tokens accepted in the `retry-grpc-on` list.
    pub const GRPC_TOKENS: [(&'static str, Self); 5] = [
        ("cancelled", Self::GRPC_CANCELLED),
        ("deadline-exceeded", Self::GRPC_DEADLINE_EXCEEDED),
        ("resource-exhausted", Self::GRPC_RESOURCE_EXHAUSTED),
        ("unavailable", Self::GRPC_UNAVAILABLE),
        ("internal", Self::GRPC_INTERNAL),
    ];

    /// Raw bit representation
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Build from raw bits, dropping bits that name no trigger
    pub const fn from_bits_truncate(bits: u32) -> Self {
        Self(bits & Self::ALL_BITS)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when every bit of `other` is set in `self`
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    /// True when `self` and `other` share at least one bit
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Parse an HTTP `retry-on` list, ignoring unknown tokens.
    pub fn parse_retry_on(value: &str) -> Self {
        parse_lenient(value, &Self::HTTP_TOKENS)
    }

    /// Parse a `retry-grpc-on` list, ignoring unknown tokens.
    pub fn parse_retry_grpc_on(value: &str) -> Self {
        parse_lenient(value, &Self::GRPC_TOKENS)
    }

    /// Parse an HTTP `retry-on` list from trusted configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RetryConfigError::UnknownRetryOn`] for the first token that
    /// names no trigger.
    pub fn try_parse_retry_on(value: &str) -> Result<Self> {
        parse_strict(value, &Self::HTTP_TOKENS).map_err(RetryConfigError::UnknownRetryOn)
    }

    /// Parse a `retry-grpc-on` list from trusted configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RetryConfigError::UnknownRetryGrpcOn`] for the first token
    /// that names no trigger.
    pub fn try_parse_retry_grpc_on(value: &str) -> Result<Self> {
        parse_strict(value, &Self::GRPC_TOKENS).map_err(RetryConfigError::UnknownRetryGrpcOn)
    }

    fn names(self) -> impl Iterator<Item = &'static str> {
        Self::HTTP_TOKENS
            .into_iter()
            .chain(Self::GRPC_TOKENS)
            .filter(move |(_, bit)| self.contains(*bit))
            .map(|(name, _)| name)
    }
}

/// Split a comma-separated header or config list into trimmed, non-empty
/// tokens.
pub fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|token| !token.is_empty())
}

fn lookup(token: &str, table: &[(&'static str, RetryOn)]) -> Option<RetryOn> {
    table.iter().find(|(name, _)| *name == token).map(|(_, bit)| *bit)
}

fn parse_lenient(value: &str, table: &[(&'static str, RetryOn)]) -> RetryOn {
    split_list(value)
        .filter_map(|token| lookup(token, table))
        .fold(RetryOn::NONE, |acc, bit| acc | bit)
}

fn parse_strict(
    value: &str,
    table: &[(&'static str, RetryOn)],
) -> std::result::Result<RetryOn, String> {
    split_list(value).try_fold(RetryOn::NONE, |acc, token| {
        lookup(token, table).map(|bit| acc | bit).ok_or_else(|| token.to_string())
    })
}

impl BitOr for RetryOn {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for RetryOn {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for RetryOn {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Debug for RetryOn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RetryOn(")?;
        let mut first = true;
        for name in self.names() {
            if !first {
                f.write_str(" | ")?;
            }
            f.write_str(name)?;
            first = false;
        }
        write!(f, ")")
    }
}

impl fmt::Display for RetryOn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.names().collect();
        f.write_str(&names.join(","))
    }
}
