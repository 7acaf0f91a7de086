//! # Middleware
//!
//! - [`metrics`]: Prometheus registry and HTTP request instrumentation.

pub mod metrics;
