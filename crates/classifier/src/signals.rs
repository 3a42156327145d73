//! Per-record signals shared by both rule chains.
//!
//! Everything a rule might look at is derived once here: the lowercased URL,
//! the credential view, the parsed Authorization header and, for bearer
//! tokens, the JWT decode outcome.

use crate::credentials::{Authorization, Credentials};
use crate::jwt::{self, JwtDecode};
use authscope_core::{is_success, ClassifierConfig, HttpMethod, TransactionRecord};
use url::Url;

const CONTENT_TYPE: &str = "content-type";
const RELATIVE_BASE: &str = "http://relative.invalid/";

pub(crate) struct Signals<'a> {
    pub config: &'a ClassifierConfig,
    pub record: &'a TransactionRecord,
    /// Lowercased URL for marker matching.
    pub url: String,
    pub credentials: Credentials<'a>,
    pub authorization: Option<Authorization<'a>>,
    /// Set only when the Authorization scheme is Bearer.
    pub bearer: Option<JwtDecode>,
}

impl<'a> Signals<'a> {
    pub fn new(record: &'a TransactionRecord, config: &'a ClassifierConfig) -> Self {
        let credentials = Credentials::new(&record.request_headers, &config.credentials);
        let authorization = credentials.parsed_authorization();
        let bearer = match authorization {
            Some(Authorization::Bearer(token)) => Some(jwt::decode(token)),
            _ => None,
        };

        Self {
            config,
            record,
            url: record.url.to_lowercase(),
            credentials,
            authorization,
            bearer,
        }
    }

    /// Does the URL contain any of the markers?
    pub fn url_has_any(&self, markers: &[String]) -> bool {
        markers.iter().any(|m| self.url.contains(m.as_str()))
    }

    pub fn method_is(&self, method: HttpMethod) -> bool {
        self.record.method == Some(method)
    }

    pub fn is_success(&self) -> bool {
        is_success(self.record.status)
    }

    pub fn status_is(&self, status: u16) -> bool {
        self.record.status == Some(status)
    }

    pub fn has_token(&self) -> bool {
        self.credentials.has_token()
    }

    pub fn is_acquisition(&self) -> bool {
        self.record.is_acquisition()
    }

    /// Request body carries a refresh-token grant.
    pub fn has_refresh_grant(&self) -> bool {
        self.record
            .request_body
            .as_deref()
            .is_some_and(|body| body.contains("grant_type") && body.contains("refresh_token"))
    }

    /// Response declares a JSON content type.
    pub fn json_response(&self) -> bool {
        self.record
            .response_headers
            .get(CONTENT_TYPE)
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("json"))
    }

    /// URL carries a `state=` parameter in its query or fragment.
    ///
    /// Implicit-flow redirects return `state` in the fragment, so both
    /// components are searched. Relative URLs are resolved against a
    /// placeholder origin first.
    pub fn has_state_param(&self) -> bool {
        let parsed = Url::parse(&self.record.url)
            .or_else(|_| Url::parse(RELATIVE_BASE).and_then(|base| base.join(&self.record.url)));
        let Ok(url) = parsed else {
            return false;
        };
        let found = [url.query(), url.fragment()]
            .into_iter()
            .flatten()
            .any(|part| part.split('&').any(|pair| pair.starts_with("state=")));
        found
    }

    /// Which body sniff markers appear in the response body.
    pub fn response_body_hints(&self) -> Vec<&'a str> {
        let Some(body) = self.record.response_body.as_deref() else {
            return Vec::new();
        };
        let body = body.to_lowercase();
        let config: &'a ClassifierConfig = self.config;
        config
            .body_sniff
            .iter()
            .filter(|marker| body.contains(marker.as_str()))
            .map(String::as_str)
            .collect()
    }
}
