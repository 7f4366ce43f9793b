//! Fixed-delay polling loop.
//!
//! Runs [`run_cycle`] forever, sleeping for `interval` after each cycle
//! completes (so a slow cycle pushes every later cycle back instead of
//! causing overlap or skips). Failed cycles are logged and the loop carries
//! on; there is no backoff. The loop only ends when `shutdown` is cancelled.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::client::StatusSource;
use crate::collector::run_cycle;
use crate::metrics::MetricsRegistry;

/// Counters reported when the loop stops.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoopSummary {
    /// Cycles that ran to completion, successful or not.
    pub cycles: u64,
    /// Cycles that ended with an error.
    pub failures: u64,
}

/// Polls `source` every `interval` until `shutdown` is cancelled.
///
/// Cancellation is observed both during the sleep and while a cycle is in
/// flight. An interrupted cycle has not written anything yet, because gauges
/// are only set after both fetches return.
pub async fn run<S>(
    interval: Duration,
    source: &S,
    metrics: &MetricsRegistry,
    shutdown: CancellationToken,
) -> LoopSummary
where
    S: StatusSource,
{
    let mut summary = LoopSummary::default();
    let mut consecutive_failures: u64 = 0;

    tracing::info!("polling loop running with interval {:?}", interval);

    loop {
        let outcome = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            outcome = run_cycle(source, metrics) => outcome,
        };
        summary.cycles += 1;

        match outcome {
            Ok(observation) => {
                if consecutive_failures > 0 {
                    tracing::info!(
                        failed_cycles = consecutive_failures,
                        "node status available again"
                    );
                }
                consecutive_failures = 0;

                tracing::debug!(
                    height = observation.status.latest_block_height,
                    time_lag = metrics.time_lag(),
                    peers = observation.net_info.peer_count,
                    "published node metrics"
                );
            }
            Err(e) => {
                summary.failures += 1;
                consecutive_failures += 1;
                tracing::warn!(
                    error = %e,
                    consecutive_failures,
                    "polling cycle failed, keeping previous values"
                );
            }
        }

        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    tracing::info!(
        cycles = summary.cycles,
        failures = summary.failures,
        "polling loop stopped"
    );
    summary
}
