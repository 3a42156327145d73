//! Header shape resolution.
//!
//! Stored transactions carry headers in one of two historical layouts:
//!
//! - merged: `headers: { "request": {...}, "response": {...} }`
//! - flat: `requestHeaders: {...}`, `responseHeaders: {...}`
//!
//! Each header collection is itself either a name/value object or a list of
//! `{ "name": ..., "value": ... }` entries as produced by the browser's
//! webRequest API. Everything is folded into [`Headers`].

use authscope_core::{Error, Headers, Result};
use serde_json::Value;
use tracing::warn;

/// Which layout a `headers` field used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderShape {
    /// Object with `request` and/or `response` sub-collections.
    Merged,
    /// Plain collection, taken as request headers.
    Bare,
}

/// Request and response headers after shape resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedHeaders {
    pub request: Headers,
    pub response: Headers,
}

/// Detect the layout of a `headers` value.
pub fn detect_shape(value: &Value) -> HeaderShape {
    match value {
        Value::Object(map) => {
            let is_collection = |v: &Value| v.is_object() || v.is_array();
            let merged = ["request", "response"]
                .iter()
                .any(|k| map.get(*k).is_some_and(is_collection));
            if merged {
                HeaderShape::Merged
            } else {
                HeaderShape::Bare
            }
        }
        _ => HeaderShape::Bare,
    }
}

/// Resolve request/response headers from both storage layouts.
///
/// Flat `requestHeaders`/`responseHeaders` take precedence over the merged
/// sub-collections for the same direction.
pub fn resolve(
    merged: Option<&Value>,
    flat_request: Option<&Value>,
    flat_response: Option<&Value>,
) -> Result<ResolvedHeaders> {
    let (mut request, mut response) = (None, None);

    if let Some(value) = merged.filter(|v| !v.is_null()) {
        match detect_shape(value) {
            HeaderShape::Merged => {
                request = value.get("request").map(collect).transpose()?;
                response = value.get("response").map(collect).transpose()?;
            }
            HeaderShape::Bare => request = Some(collect(value)?),
        }
    }

    if let Some(value) = flat_request.filter(|v| !v.is_null()) {
        request = Some(collect(value)?);
    }
    if let Some(value) = flat_response.filter(|v| !v.is_null()) {
        response = Some(collect(value)?);
    }

    Ok(ResolvedHeaders {
        request: request.unwrap_or_default(),
        response: response.unwrap_or_default(),
    })
}

/// Fold one header collection into a [`Headers`] map.
pub fn collect(value: &Value) -> Result<Headers> {
    let mut headers = Headers::new();
    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (name, v) in map {
                if let Some(text) = header_value(name, v) {
                    headers.insert(name, text);
                }
            }
        }
        Value::Array(entries) => {
            for entry in entries {
                let Some(name) = entry.get("name").and_then(Value::as_str) else {
                    warn!(?entry, "Skipping header entry without a name");
                    continue;
                };
                let v = entry.get("value").unwrap_or(&Value::Null);
                if let Some(text) = header_value(name, v) {
                    headers.insert(name, text);
                }
            }
        }
        other => {
            return Err(Error::record(format!(
                "header collection must be an object or list, got {}",
                json_kind(other)
            )))
        }
    }
    Ok(headers)
}

fn header_value(name: &str, value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .filter_map(|item| header_value(name, item))
                .collect();
            Some(parts.join(", "))
        }
        Value::Object(_) => {
            warn!(header = name, "Skipping header with object value");
            None
        }
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detect_shape() {
        assert_eq!(
            detect_shape(&json!({"request": {"Authorization": "x"}})),
            HeaderShape::Merged
        );
        assert_eq!(
            detect_shape(&json!({"Authorization": "x"})),
            HeaderShape::Bare
        );
        // A header literally named "request" with a string value is not a sub-collection.
        assert_eq!(detect_shape(&json!({"request": "x"})), HeaderShape::Bare);
    }

    #[test]
    fn test_resolve_merged() {
        let merged = json!({
            "request": {"Authorization": "Bearer abc"},
            "response": {"Content-Type": "application/json"}
        });
        let resolved = resolve(Some(&merged), None, None).unwrap();
        assert_eq!(resolved.request.get("authorization"), Some("Bearer abc"));
        assert_eq!(resolved.response.get("content-type"), Some("application/json"));
    }

    #[test]
    fn test_resolve_flat() {
        let request = json!({"Cookie": "sessionid=abc"});
        let response = json!([{"name": "Set-Cookie", "value": "a=b"}]);
        let resolved = resolve(None, Some(&request), Some(&response)).unwrap();
        assert_eq!(resolved.request.get("cookie"), Some("sessionid=abc"));
        assert_eq!(resolved.response.get("set-cookie"), Some("a=b"));
    }

    #[test]
    fn test_flat_wins_over_merged() {
        let merged = json!({"request": {"Authorization": "old"}, "response": {"X-A": "1"}});
        let flat = json!({"Authorization": "new"});
        let resolved = resolve(Some(&merged), Some(&flat), None).unwrap();
        assert_eq!(resolved.request.get("authorization"), Some("new"));
        assert_eq!(resolved.response.get("x-a"), Some("1"));
    }

    #[test]
    fn test_bare_headers_are_request_headers() {
        let bare = json!({"X-API-Key": "k"});
        let resolved = resolve(Some(&bare), None, None).unwrap();
        assert_eq!(resolved.request.get("x-api-key"), Some("k"));
        assert!(resolved.response.is_empty());
    }

    #[test]
    fn test_collect_value_kinds() {
        let headers = collect(&json!({
            "Content-Length": 42,
            "X-Flag": true,
            "Accept": ["text/html", "application/json"],
            "X-Null": null,
            "X-Nested": {"a": 1}
        }))
        .unwrap();
        assert_eq!(headers.get("content-length"), Some("42"));
        assert_eq!(headers.get("x-flag"), Some("true"));
        assert_eq!(headers.get("accept"), Some("text/html, application/json"));
        assert!(!headers.contains("x-null"));
        assert!(!headers.contains("x-nested"));
    }

    #[test]
    fn test_collect_rejects_scalar() {
        assert!(matches!(collect(&json!("nope")), Err(Error::Record(_))));
    }

    #[test]
    fn test_list_entry_without_name_skipped() {
        let headers = collect(&json!([{"value": "x"}, {"name": "A", "value": "1"}])).unwrap();
        assert_eq!(headers.len(), 1);
    }
}
