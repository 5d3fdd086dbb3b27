//! Observability
//!
//! Metrics for question loading, sandbox provisioning and query runs.

pub mod metrics;
