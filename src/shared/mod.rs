/// Shared utilities used across all layers
///
/// This module contains:
/// - Prometheus metrics (global `METRICS`)

pub mod metrics;

pub use metrics::METRICS;
