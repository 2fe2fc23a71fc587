//! Upstream cluster context

pub mod cluster;

pub use cluster::{Cluster, ResourceManager};
