//! # RetryGate Domain
//!
//! Data types shared by the retry admission path.
//!
//! This crate contains:
//! - The retry trigger bitset and route retry policy
//! - gRPC status and stream reset taxonomies
//! - Configuration structures and their error type
//! - Wire names and runtime keys
//!
//! ## Architecture
//! - No dependencies on other RetryGate crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
