//! Metrics and exposition for the exporter.
//!
//! This module owns the three node gauges and a small HTTP exporter that
//! serves them on `/metrics` in Prometheus text format.
//!
//! Typical usage in the binary:
//!
//! ```ignore
//! use std::sync::Arc;
//! use exporter::metrics::{MetricsRegistry, bind_metrics_listener, serve_metrics};
//!
//! let registry = Arc::new(MetricsRegistry::new()?);
//! let listener = bind_metrics_listener("0.0.0.0:9090".parse()?).await?;
//!
//! // Spawn the HTTP exporter in the background:
//! tokio::spawn(serve_metrics(listener, registry.clone(), shutdown.clone()));
//!
//! // Elsewhere, once per polling cycle:
//! registry.set_block_height(12_345);
//! ```

pub mod registry;
pub mod server;

pub use registry::{MetricsRegistry, NodeMetrics};
pub use server::{bind_metrics_listener, serve_metrics};
