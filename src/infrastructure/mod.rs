//! Infrastructure layer - cache implementations, loaders and observability

pub mod cache;
pub mod logging;
pub mod metrics;
pub mod properties;
