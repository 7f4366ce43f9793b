//! Exporter library crate.
//!
//! This crate provides the building blocks of a sidecar that polls a
//! Tendermint/Cosmos node's RPC status API and republishes its health as
//! Prometheus gauges:
//!
//! - typed status snapshots and the HTTP status client (`client`),
//! - the gauge registry and `/metrics` HTTP exporter (`metrics`),
//! - one all-or-nothing fetch/compute/publish cycle (`collector`),
//! - the fixed-delay polling loop (`scheduler`),
//! - process configuration (`config`) and the error taxonomy (`error`).
//!
//! The `gaia-exporter` binary wires these together behind a CLI.

pub mod client;
pub mod collector;
pub mod config;
pub mod error;
pub mod metrics;
pub mod scheduler;

// Re-export top-level configuration types.
pub use config::{ExporterConfig, MetricsConfig, TargetConfig};

// Re-export the status client and its snapshots.
pub use client::{HttpStatusClient, NetInfoSnapshot, StatusSnapshot, StatusSource};

// Re-export the cycle and loop entry points.
pub use collector::{Observation, collect, run_cycle, run_cycle_at};
pub use scheduler::LoopSummary;

// Re-export errors.
pub use error::{ClientError, CycleError, ParseError, StartupError, TransportError};

// Re-export the metrics registry and exporter.
pub use metrics::{MetricsRegistry, bind_metrics_listener, serve_metrics};
