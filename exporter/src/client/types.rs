//! Wire types for the node's RPC status API and their typed snapshots.
//!
//! The node answers with JSON-RPC envelopes of the form:
//!
//! ```json
//! GET /status
//! { "result": { "sync_info": {
//!     "latest_block_height": "12345",
//!     "latest_block_time": "2024-01-01T00:00:00.123456789Z"
//! } } }
//!
//! GET /net_info
//! { "result": { "n_peers": "4" } }
//! ```
//!
//! Numeric fields may arrive either as JSON strings or as JSON numbers.
//! Everything else in the envelope is ignored.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::ParseError;

/// Number of fractional-second digits kept before a timestamp is parsed.
pub const TIMESTAMP_FRACTION_DIGITS: usize = 6;

/// Sync state reported by `/status`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub latest_block_height: u64,
    /// Block time, truncated to microsecond precision.
    pub latest_block_time: DateTime<Utc>,
}

/// Peer information reported by `/net_info`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NetInfoSnapshot {
    pub peer_count: u64,
}

#[derive(Debug, Deserialize)]
struct RpcEnvelope<T> {
    result: T,
}

#[derive(Debug, Deserialize)]
struct StatusResult {
    sync_info: SyncInfo,
}

#[derive(Debug, Deserialize)]
struct SyncInfo {
    latest_block_height: NumberOrString,
    latest_block_time: String,
}

#[derive(Debug, Deserialize)]
struct NetInfoResult {
    n_peers: NumberOrString,
}

/// Tendermint encodes 64-bit integers as strings; some proxies re-encode
/// them as numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    String(String),
}

impl NumberOrString {
    fn into_u64(self, field: &'static str) -> Result<u64, ParseError> {
        match self {
            NumberOrString::Number(n) => Ok(n),
            NumberOrString::String(s) => s
                .trim()
                .parse::<u64>()
                .map_err(|_| ParseError::Number { field, value: s }),
        }
    }
}

/// Parses a `/status` response body.
pub fn parse_status(body: &[u8]) -> Result<StatusSnapshot, ParseError> {
    let envelope: RpcEnvelope<StatusResult> = serde_json::from_slice(body)?;
    let sync = envelope.result.sync_info;

    let latest_block_height = sync.latest_block_height.into_u64("latest_block_height")?;
    let latest_block_time = parse_block_time(&sync.latest_block_time)?;

    Ok(StatusSnapshot {
        latest_block_height,
        latest_block_time,
    })
}

/// Parses a `/net_info` response body.
pub fn parse_net_info(body: &[u8]) -> Result<NetInfoSnapshot, ParseError> {
    let envelope: RpcEnvelope<NetInfoResult> = serde_json::from_slice(body)?;
    let peer_count = envelope.result.n_peers.into_u64("n_peers")?;
    Ok(NetInfoSnapshot { peer_count })
}

/// Parses an RFC 3339 block time, truncating the fraction to microseconds.
///
/// Tendermint emits nanosecond fractions (`.123456789Z`). The fraction is cut
/// to [`TIMESTAMP_FRACTION_DIGITS`] digits without rounding before parsing;
/// the trailing `Z` or numeric offset is honoured.
pub fn parse_block_time(raw: &str) -> Result<DateTime<Utc>, ParseError> {
    let truncated = truncate_fraction(raw, TIMESTAMP_FRACTION_DIGITS);
    DateTime::parse_from_rfc3339(&truncated)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|source| ParseError::Timestamp {
            value: raw.to_string(),
            source,
        })
}

fn truncate_fraction(raw: &str, keep: usize) -> Cow<'_, str> {
    let Some(dot) = raw.find('.') else {
        return Cow::Borrowed(raw);
    };
    let fraction = &raw[dot + 1..];
    let digits = fraction.bytes().take_while(u8::is_ascii_digit).count();
    if digits <= keep {
        return Cow::Borrowed(raw);
    }

    let mut out = String::with_capacity(raw.len() - (digits - keep));
    out.push_str(&raw[..dot + 1 + keep]);
    out.push_str(&fraction[digits..]);
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    const STATUS_BODY: &str = r#"
    {
      "jsonrpc": "2.0",
      "id": -1,
      "result": {
        "node_info": { "network": "cosmoshub-4" },
        "sync_info": {
          "latest_block_hash": "C5A1F0",
          "latest_block_height": "12345",
          "latest_block_time": "2024-01-01T00:00:00.123456789Z",
          "catching_up": false
        }
      }
    }
    "#;

    #[test]
    fn status_body_is_parsed() {
        let snapshot = parse_status(STATUS_BODY.as_bytes()).expect("status should parse");
        assert_eq!(snapshot.latest_block_height, 12345);
        assert_eq!(
            snapshot.latest_block_time,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                + chrono::Duration::microseconds(123_456)
        );
    }

    #[test]
    fn status_parsing_is_deterministic() {
        let a = parse_status(STATUS_BODY.as_bytes()).unwrap();
        let b = parse_status(STATUS_BODY.as_bytes()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn numeric_height_is_accepted() {
        let body = r#"{"result":{"sync_info":{"latest_block_height":77,"latest_block_time":"2024-01-01T00:00:00Z"}}}"#;
        let snapshot = parse_status(body.as_bytes()).unwrap();
        assert_eq!(snapshot.latest_block_height, 77);
    }

    #[test]
    fn non_numeric_height_is_a_number_error() {
        let body = r#"{"result":{"sync_info":{"latest_block_height":"tall","latest_block_time":"2024-01-01T00:00:00Z"}}}"#;
        let err = parse_status(body.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            ParseError::Number {
                field: "latest_block_height",
                ..
            }
        ));
    }

    #[test]
    fn negative_height_is_rejected() {
        let body = r#"{"result":{"sync_info":{"latest_block_height":-1,"latest_block_time":"2024-01-01T00:00:00Z"}}}"#;
        assert!(parse_status(body.as_bytes()).is_err());
    }

    #[test]
    fn missing_sync_info_is_a_json_error() {
        let body = r#"{"result":{"node_info":{}}}"#;
        assert!(matches!(
            parse_status(body.as_bytes()),
            Err(ParseError::Json(_))
        ));
    }

    #[test]
    fn garbage_body_is_a_json_error() {
        assert!(matches!(
            parse_status(b"<html>502 Bad Gateway</html>"),
            Err(ParseError::Json(_))
        ));
    }

    #[test]
    fn bad_timestamp_is_a_timestamp_error() {
        let body = r#"{"result":{"sync_info":{"latest_block_height":"1","latest_block_time":"yesterday"}}}"#;
        assert!(matches!(
            parse_status(body.as_bytes()),
            Err(ParseError::Timestamp { .. })
        ));
    }

    #[test]
    fn net_info_accepts_string_and_number() {
        let s = parse_net_info(br#"{"result":{"listening":true,"n_peers":"4","peers":[]}}"#)
            .expect("string n_peers should parse");
        let n = parse_net_info(br#"{"result":{"n_peers":4}}"#).unwrap();
        assert_eq!(s.peer_count, 4);
        assert_eq!(s, n);
    }

    #[test]
    fn net_info_without_peers_field_fails() {
        assert!(parse_net_info(br#"{"result":{}}"#).is_err());
    }

    #[test]
    fn nanosecond_fraction_is_truncated_not_rounded() {
        let t = parse_block_time("2024-01-01T00:00:00.999999999Z").unwrap();
        assert_eq!(t.nanosecond(), 999_999_000);
    }

    #[test]
    fn short_fractions_and_no_fraction_parse_unchanged() {
        let t = parse_block_time("2024-01-01T00:00:00.5Z").unwrap();
        assert_eq!(t.nanosecond(), 500_000_000);

        let t = parse_block_time("2024-01-01T00:00:00Z").unwrap();
        assert_eq!(t.nanosecond(), 0);
    }

    #[test]
    fn numeric_offset_is_normalised_to_utc() {
        let t = parse_block_time("2024-01-01T02:00:00.123456789+02:00").unwrap();
        assert_eq!(
            t,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                + chrono::Duration::microseconds(123_456)
        );
    }

    #[test]
    fn truncate_fraction_keeps_suffix() {
        assert_eq!(
            truncate_fraction("2024-01-01T00:00:00.123456789Z", 6),
            "2024-01-01T00:00:00.123456Z"
        );
        assert_eq!(
            truncate_fraction("2024-01-01T00:00:00.123456789-05:00", 6),
            "2024-01-01T00:00:00.123456-05:00"
        );
        assert!(matches!(
            truncate_fraction("2024-01-01T00:00:00.123Z", 6),
            Cow::Borrowed(_)
        ));
    }
}
