//! One fetch/compute/publish cycle.
//!
//! A cycle fetches `/status`, then `/net_info`, and only when both succeed
//! writes the three gauges. Any failure aborts the cycle before the first
//! write, so the registry keeps the values of the last good cycle.

use chrono::{DateTime, Utc};

use crate::client::{NetInfoSnapshot, StatusSource, StatusSnapshot};
use crate::error::CycleError;
use crate::metrics::MetricsRegistry;

/// Both snapshots from one successful pair of fetches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Observation {
    pub status: StatusSnapshot,
    pub net_info: NetInfoSnapshot,
}

impl Observation {
    /// Seconds between `now` and the latest block time.
    ///
    /// Negative when the node's clock runs ahead of ours.
    pub fn time_lag(&self, now: DateTime<Utc>) -> f64 {
        let delta = now.signed_duration_since(self.status.latest_block_time);
        match delta.num_microseconds() {
            Some(us) => us as f64 / 1_000_000.0,
            None => delta.num_seconds() as f64,
        }
    }

    /// Writes all three gauges.
    pub fn publish(&self, metrics: &MetricsRegistry, now: DateTime<Utc>) {
        metrics.set_block_height(self.status.latest_block_height);
        metrics.set_time_lag(self.time_lag(now));
        metrics.set_peer_count(self.net_info.peer_count);
    }
}

/// Fetches both snapshots without touching any gauge.
pub async fn collect<S>(source: &S) -> Result<Observation, CycleError>
where
    S: StatusSource,
{
    let status = source.fetch_status().await.map_err(CycleError::Status)?;
    let net_info = source
        .fetch_net_info()
        .await
        .map_err(CycleError::NetInfo)?;
    Ok(Observation { status, net_info })
}

/// Runs one cycle, measuring the lag against the wall clock after both
/// fetches have completed.
pub async fn run_cycle<S>(
    source: &S,
    metrics: &MetricsRegistry,
) -> Result<Observation, CycleError>
where
    S: StatusSource,
{
    let observation = collect(source).await?;
    observation.publish(metrics, Utc::now());
    Ok(observation)
}

/// Like [`run_cycle`], but measures the lag against a fixed instant.
pub async fn run_cycle_at<S>(
    source: &S,
    metrics: &MetricsRegistry,
    now: DateTime<Utc>,
) -> Result<Observation, CycleError>
where
    S: StatusSource,
{
    let observation = collect(source).await?;
    observation.publish(metrics, now);
    Ok(observation)
}
