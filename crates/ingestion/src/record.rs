//! Stored transaction decoding.
//!
//! Turns one persisted transaction object into a [`TransactionRecord`].
//! Fields the storage layer wrote loosely (status as text, bodies as nested
//! JSON, epoch or RFC 3339 timestamps) are coerced here so the classifier
//! only ever sees the normalized record.

use crate::headers::{self, json_kind};
use authscope_core::{Error, HttpMethod, OriginKind, Result, TransactionRecord};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

/// Tag the capture layer writes on token-acquisition records.
const ACQUIRE_TAG: &str = "acquire";

/// A transaction as persisted by the extension storage layer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTransaction {
    pub method: Option<String>,
    pub url: Option<String>,
    #[serde(default, alias = "statusCode")]
    pub status: Value,
    /// Merged `{request, response}` headers, or a bare request header collection.
    #[serde(default)]
    pub headers: Value,
    #[serde(default)]
    pub request_headers: Value,
    #[serde(default)]
    pub response_headers: Value,
    #[serde(default)]
    pub request_body: Value,
    #[serde(default)]
    pub response_body: Value,
    /// Capture origin, `"acquire"` for token fetches.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub timestamp: Value,
}

impl StoredTransaction {
    /// Build a normalized record.
    ///
    /// Only a missing URL or a malformed header collection is an error;
    /// unrecognized methods, statuses and timestamps are dropped with a warning.
    pub fn into_record(self) -> Result<TransactionRecord> {
        let url = self
            .url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .ok_or(Error::MissingField("url"))?;

        let method = self.method.as_deref().and_then(|m| {
            let parsed = HttpMethod::parse(m);
            if parsed.is_none() {
                warn!(method = m, %url, "Dropping unrecognized HTTP method");
            }
            parsed
        });

        let resolved = headers::resolve(
            Some(&self.headers),
            Some(&self.request_headers),
            Some(&self.response_headers),
        )?;

        Ok(TransactionRecord {
            method,
            status: parse_status(&self.status, &url),
            request_headers: resolved.request,
            response_headers: resolved.response,
            request_body: body_text(self.request_body),
            response_body: body_text(self.response_body),
            origin: self.kind.as_deref().map(parse_origin),
            timestamp: parse_timestamp(&self.timestamp, &url),
            url,
        })
    }
}

impl TryFrom<StoredTransaction> for TransactionRecord {
    type Error = Error;

    fn try_from(stored: StoredTransaction) -> Result<Self> {
        stored.into_record()
    }
}

fn parse_origin(kind: &str) -> OriginKind {
    if kind.trim().eq_ignore_ascii_case(ACQUIRE_TAG) {
        OriginKind::Acquire
    } else {
        OriginKind::Intercept
    }
}

fn parse_status(value: &Value, url: &str) -> Option<u16> {
    let status = match value {
        Value::Null => return None,
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Value::String(s) if s.trim().is_empty() => return None,
        Value::String(s) => s.trim().parse::<u16>().ok(),
        _ => None,
    };
    if status.is_none() {
        warn!(status = %value, url, "Dropping unparseable status");
    }
    status
}

fn body_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn parse_timestamp(value: &Value, url: &str) -> Option<DateTime<Utc>> {
    let ts = match value {
        Value::Null => return None,
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(DateTime::from_timestamp_millis),
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        _ => None,
    };
    if ts.is_none() {
        warn!(kind = json_kind(value), url, "Dropping unparseable timestamp");
    }
    ts
}
