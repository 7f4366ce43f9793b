//! Clients for the node's RPC status API.
//!
//! [`StatusSource`] is the seam the collector and scheduler are generic over;
//! [`HttpStatusClient`] is the production implementation. Response parsing
//! lives in [`types`] and is free of I/O.

use std::future::Future;

pub mod http;
pub mod types;

pub use http::HttpStatusClient;
pub use types::{NetInfoSnapshot, StatusSnapshot, parse_block_time, parse_net_info, parse_status};

use crate::error::ClientError;

/// Source of node status snapshots.
///
/// Implementations must not retry internally; each call is one attempt.
pub trait StatusSource: Send + Sync {
    /// Fetches `latest_block_height` and `latest_block_time` from `/status`.
    fn fetch_status(&self) -> impl Future<Output = Result<StatusSnapshot, ClientError>> + Send;

    /// Fetches the peer count from `/net_info`.
    fn fetch_net_info(&self) -> impl Future<Output = Result<NetInfoSnapshot, ClientError>> + Send;
}
