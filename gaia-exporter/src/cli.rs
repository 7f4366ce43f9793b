//! Command-line interface.
//!
//! Every flag can also be supplied through a `GAIA_EXPORTER_*` environment
//! variable; an explicit flag wins over the environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use clap::Parser;

use exporter::config::{
    DEFAULT_LISTEN_PORT, DEFAULT_TARGET_HOST, DEFAULT_TARGET_PORT, ExporterConfig, MetricsConfig,
    TargetConfig,
};

/// Gaia simple Prometheus exporter
#[derive(Parser, Debug)]
#[command(name = "gaia-exporter", version, about, long_about = None)]
pub struct Cli {
    /// Hostname of the node's RPC server
    #[arg(long, env = "GAIA_EXPORTER_HOST", default_value = DEFAULT_TARGET_HOST)]
    pub host: String,

    /// Port of the node's RPC server
    #[arg(long, env = "GAIA_EXPORTER_PORT", default_value_t = DEFAULT_TARGET_PORT)]
    pub port: u16,

    /// Polling interval in seconds
    #[arg(long, env = "GAIA_EXPORTER_POLLING_INTERVAL", default_value_t = 15)]
    pub polling_interval: u64,

    /// Port to serve /metrics on
    #[arg(long, env = "GAIA_EXPORTER_LISTEN_PORT", default_value_t = DEFAULT_LISTEN_PORT)]
    pub listen_port: u16,

    /// Address to serve /metrics on
    #[arg(long, env = "GAIA_EXPORTER_LISTEN_ADDRESS", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub listen_address: IpAddr,

    /// Timeout for each request to the node, in seconds
    #[arg(long, env = "GAIA_EXPORTER_REQUEST_TIMEOUT", default_value_t = 10)]
    pub request_timeout: u64,

    /// Prefix for metric names, e.g. `gaia` gives `gaia_latest_block_height`
    #[arg(long, env = "GAIA_EXPORTER_NAMESPACE")]
    pub namespace: Option<String>,
}

impl From<Cli> for ExporterConfig {
    fn from(cli: Cli) -> Self {
        Self {
            target: TargetConfig {
                host: cli.host,
                port: cli.port,
                request_timeout: Duration::from_secs(cli.request_timeout),
            },
            polling_interval: Duration::from_secs(cli.polling_interval),
            metrics: MetricsConfig {
                listen_addr: SocketAddr::new(cli.listen_address, cli.listen_port),
                namespace: cli.namespace,
            },
        }
    }
}
