//! Error taxonomy for the exporter.
//!
//! Errors are scoped by how far they are allowed to travel:
//!
//! - [`TransportError`] and [`ParseError`] come out of the status client and
//!   are combined into [`ClientError`],
//! - [`CycleError`] wraps a [`ClientError`] for one polling cycle and is only
//!   ever logged by the scheduler,
//! - [`StartupError`] is fatal and aborts the process before polling begins.

use std::net::SocketAddr;
use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// The target node could not be reached, or answered with a non-success status.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request did not complete within the configured timeout.
    #[error("GET {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    /// Connection refused, DNS failure, reset, or a body read failure.
    #[error("GET {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The node answered, but not with a 2xx status.
    #[error("GET {url} returned HTTP status {status}")]
    Status { url: String, status: StatusCode },
}

/// The response body was not the JSON document we expected.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Body is not JSON, or a required field is absent or of the wrong shape.
    #[error("malformed response body: {0}")]
    Json(#[from] serde_json::Error),

    /// A numeric field carried a value that is not an unsigned integer.
    #[error("field `{field}` is not an unsigned integer: {value:?}")]
    Number { field: &'static str, value: String },

    /// `latest_block_time` could not be interpreted as an RFC 3339 timestamp.
    #[error("invalid block timestamp {value:?}: {source}")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Failure of a single status-client call.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl ClientError {
    /// Returns `true` for network-level failures, as opposed to bad payloads.
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport(_))
    }
}

/// A polling cycle was aborted before any gauge was written.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("fetching /status: {0}")]
    Status(#[source] ClientError),
    #[error("fetching /net_info: {0}")]
    NetInfo(#[source] ClientError),
}

impl CycleError {
    /// The underlying client error, regardless of which endpoint failed.
    pub fn client_error(&self) -> &ClientError {
        match self {
            CycleError::Status(e) | CycleError::NetInfo(e) => e,
        }
    }
}

/// Fatal errors raised while bootstrapping the exporter.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to bind metrics listener on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("failed to initialise metrics registry: {0}")]
    Metrics(#[from] prometheus::Error),
}
