//! Domain types for retry admission

pub mod grpc;
pub mod policy;
pub mod reset;
pub mod retry_on;

pub use grpc::GrpcStatus;
pub use policy::{RetryHostPredicate, RetryPolicy, RetryPriority};
pub use reset::{ResourcePriority, StreamResetReason};
pub use retry_on::{split_list, RetryOn};
