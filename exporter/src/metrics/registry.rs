//! Prometheus-backed gauge registry.
//!
//! [`MetricsRegistry`] owns a private Prometheus registry (no process or
//! platform collectors) and the three node gauges. Each gauge is an atomic
//! f64 cell, so a scrape running concurrently with a polling cycle sees
//! either the previous or the new value of each gauge, never a torn one.

use prometheus::{self, Encoder, Gauge, Opts, Registry, TextEncoder};

pub const LATEST_BLOCK_HEIGHT: &str = "latest_block_height";
pub const LATEST_BLOCK_TIME_LAG: &str = "latest_block_time_lag";
pub const NUMBER_OF_PEERS: &str = "number_of_peers";

/// Node health gauges.
#[derive(Clone)]
pub struct NodeMetrics {
    /// Height of the latest block the node knows about.
    pub latest_block_height: Gauge,
    /// Seconds between local wall-clock time and the latest block time.
    pub latest_block_time_lag: Gauge,
    /// Number of peers the node is connected to.
    pub number_of_peers: Gauge,
}

impl NodeMetrics {
    /// Registers the node gauges into the given `Registry`.
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        let latest_block_height =
            Gauge::with_opts(Opts::new(LATEST_BLOCK_HEIGHT, "Latest block height"))?;
        registry.register(Box::new(latest_block_height.clone()))?;

        let latest_block_time_lag =
            Gauge::with_opts(Opts::new(LATEST_BLOCK_TIME_LAG, "Latest block time lag"))?;
        registry.register(Box::new(latest_block_time_lag.clone()))?;

        let number_of_peers = Gauge::with_opts(Opts::new(NUMBER_OF_PEERS, "Number of peers"))?;
        registry.register(Box::new(number_of_peers.clone()))?;

        Ok(Self {
            latest_block_height,
            latest_block_time_lag,
            number_of_peers,
        })
    }
}

/// Wrapper around a Prometheus registry and the node gauges.
///
/// This is the handle shared (behind an `Arc`) between the polling loop,
/// which writes, and the scrape server, which renders.
#[derive(Clone)]
pub struct MetricsRegistry {
    registry: Registry,
    node: NodeMetrics,
}

impl MetricsRegistry {
    /// Creates a registry with unprefixed metric names.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::with_namespace(None)
    }

    /// Creates a registry whose metric names are prefixed with `{namespace}_`.
    pub fn with_namespace(namespace: Option<String>) -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(namespace, None)?;
        let node = NodeMetrics::register(&registry)?;
        Ok(Self { registry, node })
    }

    pub fn set_block_height(&self, height: u64) {
        self.node.latest_block_height.set(height as f64);
    }

    /// Sets the block time lag, in seconds.
    pub fn set_time_lag(&self, seconds: f64) {
        self.node.latest_block_time_lag.set(seconds);
    }

    pub fn set_peer_count(&self, peers: u64) {
        self.node.number_of_peers.set(peers as f64);
    }

    pub fn block_height(&self) -> f64 {
        self.node.latest_block_height.get()
    }

    pub fn time_lag(&self) -> f64 {
        self.node.latest_block_time_lag.get()
    }

    pub fn peer_count(&self) -> f64 {
        self.node.number_of_peers.get()
    }

    /// Encodes all metrics into the Prometheus text exposition format.
    ///
    /// Families are emitted sorted by name, so the output for a given set of
    /// values is always byte-identical.
    pub fn render(&self) -> String {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::error!(error = %e, "failed to encode Prometheus metrics");
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    use super::*;

    fn sample_value(text: &str, name: &str) -> Option<f64> {
        text.lines()
            .filter(|line| !line.starts_with('#'))
            .find_map(|line| {
                let (metric, value) = line.split_once(' ')?;
                if metric == name { value.parse().ok() } else { None }
            })
    }

    #[test]
    fn node_metrics_register_and_record() {
        let registry = Registry::new();
        let metrics = NodeMetrics::register(&registry).expect("register metrics");

        metrics.latest_block_height.set(10.0);
        metrics.latest_block_time_lag.set(0.5);
        metrics.number_of_peers.set(3.0);

        assert_eq!(registry.gather().len(), 3);
    }

    #[test]
    fn render_contains_set_values() {
        let registry = MetricsRegistry::new().expect("create metrics registry");
        registry.set_block_height(100);
        registry.set_time_lag(2.5);
        registry.set_peer_count(7);

        let text = registry.render();
        let samples: Vec<&str> = text.lines().filter(|l| !l.starts_with('#')).collect();
        assert_eq!(
            samples,
            vec![
                "latest_block_height 100",
                "latest_block_time_lag 2.5",
                "number_of_peers 7",
            ]
        );
        assert!(text.contains("# HELP latest_block_height Latest block height\n"));
        assert!(text.contains("# TYPE latest_block_height gauge\n"));
        assert!(text.contains("# TYPE latest_block_time_lag gauge\n"));
        assert!(text.contains("# TYPE number_of_peers gauge\n"));
    }

    #[test]
    fn render_is_idempotent() {
        let registry = MetricsRegistry::new().expect("create metrics registry");
        registry.set_block_height(42);
        assert_eq!(registry.render(), registry.render());
    }

    #[test]
    fn fresh_registry_renders_zeroes() {
        let registry = MetricsRegistry::new().expect("create metrics registry");
        let text = registry.render();
        assert_eq!(sample_value(&text, LATEST_BLOCK_HEIGHT), Some(0.0));
        assert_eq!(sample_value(&text, LATEST_BLOCK_TIME_LAG), Some(0.0));
        assert_eq!(sample_value(&text, NUMBER_OF_PEERS), Some(0.0));
    }

    #[test]
    fn namespace_prefixes_metric_names() {
        let registry =
            MetricsRegistry::with_namespace(Some("gaia".to_string())).expect("namespaced registry");
        registry.set_peer_count(4);
        let text = registry.render();
        assert_eq!(sample_value(&text, "gaia_number_of_peers"), Some(4.0));
        assert_eq!(sample_value(&text, NUMBER_OF_PEERS), None);
    }

    #[test]
    fn concurrent_render_only_observes_written_values() {
        const WRITES: u64 = 2_000;

        let registry = Arc::new(MetricsRegistry::new().expect("create metrics registry"));

        let writer = {
            let registry = registry.clone();
            thread::spawn(move || {
                for height in 1..=WRITES {
                    registry.set_block_height(height * 1_000_003);
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let registry = registry.clone();
                thread::spawn(move || {
                    let mut seen = HashSet::new();
                    for _ in 0..500 {
                        let text = registry.render();
                        let value = sample_value(&text, LATEST_BLOCK_HEIGHT)
                            .expect("height sample should always be rendered");
                        seen.insert(value as u64);
                    }
                    seen
                })
            })
            .collect();

        writer.join().expect("writer thread");
        let written: HashSet<u64> = std::iter::once(0)
            .chain((1..=WRITES).map(|h| h * 1_000_003))
            .collect();

        for reader in readers {
            for value in reader.join().expect("reader thread") {
                assert!(written.contains(&value), "observed unwritten value {value}");
            }
        }
    }
}
