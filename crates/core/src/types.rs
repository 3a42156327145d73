//! Core data types for the authscope system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Returns true if the status code is in the 2xx range.
#[inline]
pub fn is_success(status: Option<u16>) -> bool {
    matches!(status, Some(200..=299))
}

/// HTTP verb of an observed transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    /// Parse a verb, ignoring ASCII case. Unknown verbs yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        let method = match s.trim().to_ascii_uppercase().as_str() {
            "GET" => HttpMethod::Get,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "PATCH" => HttpMethod::Patch,
            "DELETE" => HttpMethod::Delete,
            "HEAD" => HttpMethod::Head,
            "OPTIONS" => HttpMethod::Options,
            _ => return None,
        };
        Some(method)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a transaction was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginKind {
    /// Captured because a token was being acquired (background token fetch).
    Acquire,
    /// Ordinary intercepted request, possibly carrying a token.
    Intercept,
}

/// Header map with case-insensitive names.
///
/// Names are lowercased once on insertion, so every lookup sees the same
/// normalized key regardless of how the capture layer spelled it. Inserting a
/// name twice keeps the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>")]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    /// Create an empty header map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header, normalizing the name.
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.0
            .insert(name.as_ref().trim().to_ascii_lowercase(), value.into());
    }

    /// Look up a header by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&str> {
        if name.bytes().any(|b| b.is_ascii_uppercase()) {
            self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
        } else {
            self.0.get(name).map(String::as_str)
        }
    }

    /// Look up a header whose value is not blank.
    pub fn get_non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.trim().is_empty())
    }

    /// Whether the header is present at all, even with an empty value.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over normalized `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<BTreeMap<String, String>> for Headers {
    fn from(map: BTreeMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

/// A single observed network transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// HTTP verb, if captured.
    pub method: Option<HttpMethod>,
    /// Absolute request URL.
    pub url: String,
    /// Response status code.
    pub status: Option<u16>,
    /// Request headers.
    pub request_headers: Headers,
    /// Response headers.
    pub response_headers: Headers,
    /// Request body as text.
    pub request_body: Option<String>,
    /// Response body as text.
    pub response_body: Option<String>,
    /// Capture origin tag.
    pub origin: Option<OriginKind>,
    /// Capture time. Display only.
    pub timestamp: Option<DateTime<Utc>>,
}

impl TransactionRecord {
    /// Create a record for the given URL with every other field absent.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_request_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.request_headers.insert(name, value);
        self
    }

    pub fn with_response_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.response_headers.insert(name, value);
        self
    }

    pub fn with_request_body(mut self, body: impl Into<String>) -> Self {
        self.request_body = Some(body.into());
        self
    }

    pub fn with_response_body(mut self, body: impl Into<String>) -> Self {
        self.response_body = Some(body.into());
        self
    }

    pub fn with_origin(mut self, origin: OriginKind) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Was this record captured during token acquisition?
    #[inline]
    pub fn is_acquisition(&self) -> bool {
        self.origin == Some(OriginKind::Acquire)
    }
}

/// Inferred kind of authentication event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventType {
    Login,
    Logout,
    TokenRefresh,
    ExpiryCheck,
    Access,
    Unclassified,
}

impl EventType {
    /// Dashboard label.
    pub fn label(self) -> &'static str {
        match self {
            EventType::Login => "Login",
            EventType::Logout => "Logout",
            EventType::TokenRefresh => "Token Refresh",
            EventType::ExpiryCheck => "Expiry Check",
            EventType::Access => "Access",
            EventType::Unclassified => "Unclassified",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inferred kind of credential.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
    AccessTokenJwt,
    RefreshTokenJwt,
    IdTokenJwt,
    AccessTokenOpaque,
    RefreshTokenOpaque,
    AccessTokenAcquired,
    RefreshTokenAcquired,
    OAuthTokenAcquired,
    ApiKeyAcquired,
    AuthTokenAcquired,
    BasicAuth,
    ApiKey,
    CsrfToken,
    SessionToken,
    AccessTokenCookie,
    StateToken,
    /// Authorization header with an unrecognized scheme word.
    CustomScheme(String),
    Unknown,
}

/// Coarse grouping of token types, used for statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TokenFamily {
    Jwt,
    Opaque,
    Acquired,
    /// Non-bearer credentials: basic auth, API keys, cookies, custom schemes.
    Credential,
    /// CSRF and state tokens.
    AntiForgery,
    Unknown,
}

impl TokenType {
    /// Dashboard label.
    pub fn label(&self) -> String {
        let label = match self {
            TokenType::AccessTokenJwt => "Access Token (JWT)",
            TokenType::RefreshTokenJwt => "Refresh Token (JWT)",
            TokenType::IdTokenJwt => "ID Token (JWT)",
            TokenType::AccessTokenOpaque => "Access Token (Opaque)",
            TokenType::RefreshTokenOpaque => "Refresh Token (Opaque)",
            TokenType::AccessTokenAcquired => "Access Token (Acquired)",
            TokenType::RefreshTokenAcquired => "Refresh Token (Acquired)",
            TokenType::OAuthTokenAcquired => "OAuth Token (Acquired)",
            TokenType::ApiKeyAcquired => "API Key (Acquired)",
            TokenType::AuthTokenAcquired => "Auth Token (Acquired)",
            TokenType::BasicAuth => "Basic Auth",
            TokenType::ApiKey => "API Key",
            TokenType::CsrfToken => "CSRF Token",
            TokenType::SessionToken => "Session Token",
            TokenType::AccessTokenCookie => "Access Token (Cookie)",
            TokenType::StateToken => "State Token",
            TokenType::CustomScheme(scheme) => return format!("Custom ({scheme})"),
            TokenType::Unknown => "Unknown",
        };
        label.to_string()
    }

    pub fn family(&self) -> TokenFamily {
        match self {
            TokenType::AccessTokenJwt | TokenType::RefreshTokenJwt | TokenType::IdTokenJwt => {
                TokenFamily::Jwt
            }
            TokenType::AccessTokenOpaque | TokenType::RefreshTokenOpaque => TokenFamily::Opaque,
            TokenType::AccessTokenAcquired
            | TokenType::RefreshTokenAcquired
            | TokenType::OAuthTokenAcquired
            | TokenType::ApiKeyAcquired
            | TokenType::AuthTokenAcquired => TokenFamily::Acquired,
            TokenType::BasicAuth
            | TokenType::ApiKey
            | TokenType::SessionToken
            | TokenType::AccessTokenCookie
            | TokenType::CustomScheme(_) => TokenFamily::Credential,
            TokenType::CsrfToken | TokenType::StateToken => TokenFamily::AntiForgery,
            TokenType::Unknown => TokenFamily::Unknown,
        }
    }

    pub fn is_jwt(&self) -> bool {
        self.family() == TokenFamily::Jwt
    }

    pub fn is_opaque(&self) -> bool {
        self.family() == TokenFamily::Opaque
    }

    pub fn is_acquired(&self) -> bool {
        self.family() == TokenFamily::Acquired
    }

    /// Can this type only be inferred from a credential carried in the request?
    pub fn requires_credential(&self) -> bool {
        matches!(
            self.family(),
            TokenFamily::Jwt | TokenFamily::Opaque | TokenFamily::Credential
        )
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Classifier output for one transaction.
///
/// `method`, `status`, `url`, `headers` and `timestamp` are echoed from the
/// record unchanged for the caller's convenience.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventClassification {
    pub event_type: EventType,
    pub token_type: TokenType,
    pub method: Option<HttpMethod>,
    pub status: Option<u16>,
    pub url: String,
    /// Request header snapshot.
    pub headers: Headers,
    pub timestamp: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_success() {
        assert!(is_success(Some(200)));
        assert!(is_success(Some(299)));
        assert!(!is_success(Some(300)));
        assert!(!is_success(Some(199)));
        assert!(!is_success(None));
    }

    #[test]
    fn test_method_parse() {
        assert_eq!(HttpMethod::parse("post"), Some(HttpMethod::Post));
        assert_eq!(HttpMethod::parse(" Delete "), Some(HttpMethod::Delete));
        assert_eq!(HttpMethod::parse("BREW"), None);
        assert_eq!(HttpMethod::Options.to_string(), "OPTIONS");
    }

    #[test]
    fn test_headers_case_insensitive() {
        let mut headers = Headers::new();
        headers.insert("Authorization", "Bearer abc");
        assert_eq!(headers.get("authorization"), Some("Bearer abc"));
        assert_eq!(headers.get("AUTHORIZATION"), Some("Bearer abc"));

        headers.insert("authorization", "Basic xyz");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("Authorization"), Some("Basic xyz"));
    }

    #[test]
    fn test_headers_non_empty() {
        let headers: Headers = [("Cookie", "  "), ("X-API-Key", "")].into_iter().collect();
        assert!(headers.get_non_empty("cookie").is_none());
        assert!(headers.contains("x-api-key"));
        assert!(headers.get_non_empty("x-api-key").is_none());
    }

    #[test]
    fn test_headers_deserialize_normalizes() {
        let headers: Headers =
            serde_json::from_str(r#"{"Content-Type": "application/json"}"#).unwrap();
        assert_eq!(headers.iter().next(), Some(("content-type", "application/json")));
    }

    #[test]
    fn test_record_builder() {
        let record = TransactionRecord::new("https://example.com/login")
            .with_method(HttpMethod::Post)
            .with_status(200)
            .with_origin(OriginKind::Acquire);
        assert!(record.is_acquisition());
        assert_eq!(record.status, Some(200));
        assert!(record.request_body.is_none());
    }

    #[test]
    fn test_token_labels() {
        assert_eq!(TokenType::AccessTokenJwt.label(), "Access Token (JWT)");
        assert_eq!(
            TokenType::CustomScheme("Digest".to_string()).to_string(),
            "Custom (Digest)"
        );
        assert_eq!(EventType::TokenRefresh.to_string(), "Token Refresh");
    }

    #[test]
    fn test_token_families() {
        assert!(TokenType::IdTokenJwt.is_jwt());
        assert!(TokenType::RefreshTokenOpaque.is_opaque());
        assert!(TokenType::ApiKeyAcquired.is_acquired());
        assert!(TokenType::SessionToken.requires_credential());
        assert!(!TokenType::CsrfToken.requires_credential());
        assert!(!TokenType::AuthTokenAcquired.requires_credential());
        assert!(!TokenType::Unknown.requires_credential());
    }
}
