//! Top-level configuration for the exporter.
//!
//! This module aggregates configuration for:
//!
//! - the polled node (`TargetConfig`: host, RPC port, request timeout),
//! - the polling cadence,
//! - the Prometheus scrape endpoint (`MetricsConfig`).
//!
//! Binaries build an [`ExporterConfig`] from CLI flags/environment and call
//! [`ExporterConfig::validate`] before anything is started. The value is
//! immutable for the lifetime of the process.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::error::StartupError;

/// Default host of the polled node.
pub const DEFAULT_TARGET_HOST: &str = "localhost";
/// Default Tendermint RPC port.
pub const DEFAULT_TARGET_PORT: u16 = 26657;
/// Default delay between the end of one cycle and the start of the next.
pub const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_secs(15);
/// Default upper bound on a single outbound request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Default port of the `/metrics` endpoint.
pub const DEFAULT_LISTEN_PORT: u16 = 9090;

/// Where the node's RPC status API lives.
#[derive(Clone, Debug)]
pub struct TargetConfig {
    /// Hostname or IP of the node, e.g. `"localhost"`.
    pub host: String,
    /// RPC port of the node.
    pub port: u16,
    /// Timeout applied to each outbound request.
    pub request_timeout: Duration,
}

impl TargetConfig {
    /// Base URL of the node's RPC API, without a trailing slash.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_TARGET_HOST.to_string(),
            port: DEFAULT_TARGET_PORT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Configuration for the Prometheus scrape endpoint.
#[derive(Clone, Debug)]
pub struct MetricsConfig {
    /// Address to bind the metrics HTTP server to.
    pub listen_addr: SocketAddr,
    /// Optional prefix prepended to every metric name as `{namespace}_`.
    pub namespace: Option<String>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_LISTEN_PORT)),
            namespace: None,
        }
    }
}

/// Top-level configuration for the exporter process.
#[derive(Clone, Debug)]
pub struct ExporterConfig {
    pub target: TargetConfig,
    pub polling_interval: Duration,
    pub metrics: MetricsConfig,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            target: TargetConfig::default(),
            polling_interval: DEFAULT_POLLING_INTERVAL,
            metrics: MetricsConfig::default(),
        }
    }
}

impl ExporterConfig {
    /// Checks the invariants the rest of the exporter relies on.
    pub fn validate(&self) -> Result<(), StartupError> {
        if self.target.host.trim().is_empty() {
            return Err(invalid("target host must not be empty"));
        }
        if self.target.port == 0 {
            return Err(invalid("target port must be in 1..=65535"));
        }
        if self.target.request_timeout.is_zero() {
            return Err(invalid("request timeout must be positive"));
        }
        if self.polling_interval.is_zero() {
            return Err(invalid("polling interval must be positive"));
        }
        if self.metrics.listen_addr.port() == 0 {
            return Err(invalid("listen port must be in 1..=65535"));
        }
        if let Some(ns) = &self.metrics.namespace {
            if !is_valid_namespace(ns) {
                return Err(StartupError::InvalidConfig(format!(
                    "metric namespace {ns:?} must match [a-zA-Z_][a-zA-Z0-9_]*"
                )));
            }
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> StartupError {
    StartupError::InvalidConfig(msg.to_string())
}

fn is_valid_namespace(ns: &str) -> bool {
    let mut chars = ns.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
