//! HTTP client for the node's RPC status API.
//!
//! Issues plain `GET /status` and `GET /net_info` requests against
//! `http://{host}:{port}` and hands the bodies to the pure parsers in
//! [`super::types`]. There are no retries here; a failed request is reported
//! once and the scheduler decides what happens next.

use std::time::Duration;

use bytes::Bytes;
use reqwest::Client;

use super::StatusSource;
use super::types::{NetInfoSnapshot, StatusSnapshot, parse_net_info, parse_status};
use crate::config::TargetConfig;
use crate::error::{ClientError, StartupError, TransportError};

/// HTTP status client.
///
/// Cheap to share: `reqwest::Client` pools connections internally and is
/// `Send + Sync`.
#[derive(Clone, Debug)]
pub struct HttpStatusClient {
    base_url: String,
    client: Client,
    timeout: Duration,
}

impl HttpStatusClient {
    /// Constructs a client for `http://{host}:{port}`.
    ///
    /// `timeout` bounds every request end to end; expiry is reported as
    /// [`TransportError::Timeout`].
    pub fn new(host: &str, port: u16, timeout: Duration) -> Result<Self, StartupError> {
        Self::with_base_url(format!("http://{host}:{port}"), timeout)
    }

    /// Constructs a client from a [`TargetConfig`].
    pub fn from_config(cfg: &TargetConfig) -> Result<Self, StartupError> {
        Self::with_base_url(cfg.base_url(), cfg.request_timeout)
    }

    fn with_base_url(base_url: String, timeout: Duration) -> Result<Self, StartupError> {
        // The node is polled directly; proxy environment variables are ignored.
        let client = Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .map_err(StartupError::HttpClient)?;

        Ok(Self {
            base_url,
            client,
            timeout,
        })
    }

    /// Base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        // Avoid accidental double slashes.
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// GETs `path` and returns the body of a 2xx response.
    async fn get(&self, path: &str) -> Result<Bytes, TransportError> {
        let url = self.endpoint(path);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(&url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::Status { url, status });
        }

        resp.bytes()
            .await
            .map_err(|e| self.transport_error(&url, e))
    }

    fn transport_error(&self, url: &str, source: reqwest::Error) -> TransportError {
        if source.is_timeout() {
            TransportError::Timeout {
                url: url.to_string(),
                timeout: self.timeout,
            }
        } else {
            TransportError::Request {
                url: url.to_string(),
                source,
            }
        }
    }
}

impl StatusSource for HttpStatusClient {
    async fn fetch_status(&self) -> Result<StatusSnapshot, ClientError> {
        let body = self.get("/status").await?;
        Ok(parse_status(&body)?)
    }

    async fn fetch_net_info(&self) -> Result<NetInfoSnapshot, ClientError> {
        let body = self.get("/net_info").await?;
        Ok(parse_net_info(&body)?)
    }
}
