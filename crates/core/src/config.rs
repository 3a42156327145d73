//! Configuration structures for the authscope classifier.
//!
//! Every marker the rule chains look for lives here so deployments can widen
//! or narrow the heuristics without touching rule order. URL and header
//! markers are matched case-insensitively; cookie names are matched as given.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Main configuration for the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// URL markers for the event-type chain.
    pub endpoints: EndpointMarkers,
    /// URL markers for acquired-token shapes.
    pub acquisition: AcquisitionMarkers,
    /// Credential header and cookie names.
    pub credentials: CredentialMarkers,
    /// Response body substrings reported when the acquisition fallback fires.
    pub body_sniff: Vec<String>,
}

/// URL markers used by the event-type rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointMarkers {
    pub login: Vec<String>,
    pub logout: Vec<String>,
    /// Refresh endpoints (`/token` included).
    pub refresh: Vec<String>,
    /// A refresh endpoint also needs one of these in the URL, or a refresh grant body.
    pub refresh_hint: Vec<String>,
    pub validation: Vec<String>,
    /// Auth area for the acquisition fallback.
    pub auth_area: Vec<String>,
    /// Access is only inferred outside these.
    pub access_exclusions: Vec<String>,
    pub legacy_login: Vec<String>,
    pub legacy_logout: Vec<String>,
    pub legacy_refresh: Vec<String>,
}

impl Default for EndpointMarkers {
    fn default() -> Self {
        Self {
            login: strings(&["/auth/login", "/login", "/signin"]),
            logout: strings(&["/auth/logout", "/logout", "/signout"]),
            refresh: strings(&["/auth/refresh", "/refresh", "/token"]),
            refresh_hint: strings(&["refresh"]),
            validation: strings(&["/auth/validate", "/auth/verify", "/token/verify"]),
            auth_area: strings(&["/auth", "/login", "/token"]),
            access_exclusions: strings(&["/auth", "/login", "/logout"]),
            legacy_login: strings(&["/auth/login", "/login"]),
            legacy_logout: strings(&["/auth/logout", "/logout"]),
            legacy_refresh: strings(&["/auth/refresh", "/refresh"]),
        }
    }
}

/// URL markers used to name acquired tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionMarkers {
    /// URLs that suggest an auth endpoint even without an acquire tag.
    pub auth_endpoint: Vec<String>,
    pub refresh: Vec<String>,
    pub oauth: Vec<String>,
    pub api_key: Vec<String>,
    pub auth: Vec<String>,
    pub token: Vec<String>,
    /// Bearer tokens sent to these URLs are treated as refresh tokens.
    pub bearer_refresh_hint: Vec<String>,
}

impl Default for AcquisitionMarkers {
    fn default() -> Self {
        Self {
            auth_endpoint: strings(&[
                "/auth", "/login", "/signin", "/token", "/oauth", "/oidc", "/openid", "/refresh",
                "/renew", "/api-key", "/apikey",
            ]),
            refresh: strings(&["refresh", "renew"]),
            oauth: strings(&["oauth", "oidc", "openid"]),
            api_key: strings(&["api-key", "apikey", "key"]),
            auth: strings(&["auth", "login", "signin"]),
            token: strings(&["/token"]),
            bearer_refresh_hint: strings(&["refresh", "token", "renew"]),
        }
    }
}

/// Header and cookie names that carry credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialMarkers {
    pub api_key_headers: Vec<String>,
    pub csrf_headers: Vec<String>,
    pub state_headers: Vec<String>,
    /// Cookie name prefixes (including `=`) that identify a session cookie.
    pub session_cookies: Vec<String>,
    pub access_token_cookies: Vec<String>,
}

impl Default for CredentialMarkers {
    fn default() -> Self {
        Self {
            api_key_headers: strings(&["x-api-key", "api-key", "x-apikey"]),
            csrf_headers: strings(&["x-csrf-token", "x-xsrf-token"]),
            state_headers: strings(&["x-state-token"]),
            session_cookies: strings(&[
                "sessionid=",
                "session=",
                "JSESSIONID=",
                "PHPSESSID=",
                "ASP.NET_SessionId=",
            ]),
            access_token_cookies: strings(&["access_token="]),
        }
    }
}

impl ClassifierConfig {
    /// Load a configuration from JSON. Missing sections keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut config: ClassifierConfig = serde_json::from_str(json)?;
        config.validate()?;
        config.normalize();
        Ok(config)
    }

    /// Check that every marker list the rules depend on is usable.
    pub fn validate(&self) -> Result<()> {
        let e = &self.endpoints;
        let a = &self.acquisition;
        let c = &self.credentials;
        let lists: [(&str, &Vec<String>); 23] = [
            ("endpoints.login", &e.login),
            ("endpoints.logout", &e.logout),
            ("endpoints.refresh", &e.refresh),
            ("endpoints.refresh_hint", &e.refresh_hint),
            ("endpoints.validation", &e.validation),
            ("endpoints.auth_area", &e.auth_area),
            ("endpoints.access_exclusions", &e.access_exclusions),
            ("endpoints.legacy_login", &e.legacy_login),
            ("endpoints.legacy_logout", &e.legacy_logout),
            ("endpoints.legacy_refresh", &e.legacy_refresh),
            ("acquisition.auth_endpoint", &a.auth_endpoint),
            ("acquisition.refresh", &a.refresh),
            ("acquisition.oauth", &a.oauth),
            ("acquisition.api_key", &a.api_key),
            ("acquisition.auth", &a.auth),
            ("acquisition.token", &a.token),
            ("acquisition.bearer_refresh_hint", &a.bearer_refresh_hint),
            ("credentials.api_key_headers", &c.api_key_headers),
            ("credentials.csrf_headers", &c.csrf_headers),
            ("credentials.state_headers", &c.state_headers),
            ("credentials.session_cookies", &c.session_cookies),
            ("credentials.access_token_cookies", &c.access_token_cookies),
            ("body_sniff", &self.body_sniff),
        ];

        for (name, list) in lists {
            if list.is_empty() {
                return Err(Error::config(format!("{name} must not be empty")));
            }
            if list.iter().any(|m| m.trim().is_empty()) {
                return Err(Error::config(format!("{name} contains a blank marker")));
            }
        }
        Ok(())
    }

    /// Lowercase URL and header markers so matching can compare against
    /// lowercased input. Cookie names keep their case.
    pub fn normalize(&mut self) {
        let e = &mut self.endpoints;
        let a = &mut self.acquisition;
        let c = &mut self.credentials;
        for list in [
            &mut e.login,
            &mut e.logout,
            &mut e.refresh,
            &mut e.refresh_hint,
            &mut e.validation,
            &mut e.auth_area,
            &mut e.access_exclusions,
            &mut e.legacy_login,
            &mut e.legacy_logout,
            &mut e.legacy_refresh,
            &mut a.auth_endpoint,
            &mut a.refresh,
            &mut a.oauth,
            &mut a.api_key,
            &mut a.auth,
            &mut a.token,
            &mut a.bearer_refresh_hint,
            &mut c.api_key_headers,
            &mut c.csrf_headers,
            &mut c.state_headers,
            &mut self.body_sniff,
        ] {
            for marker in list.iter_mut() {
                *marker = marker.to_ascii_lowercase();
            }
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoints: EndpointMarkers::default(),
            acquisition: AcquisitionMarkers::default(),
            credentials: CredentialMarkers::default(),
            body_sniff: strings(&["access_token", "token", "jwt"]),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClassifierConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.endpoints.login.contains(&"/signin".to_string()));
        assert_eq!(config.credentials.session_cookies.len(), 5);
        assert_eq!(config.acquisition.token, vec!["/token".to_string()]);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ClassifierConfig::from_json_str(
            r#"{"credentials": {"api_key_headers": ["X-Custom-Key"]}}"#,
        )
        .unwrap();
        assert_eq!(config.credentials.api_key_headers, vec!["x-custom-key".to_string()]);
        assert_eq!(config.credentials.csrf_headers, vec!["x-csrf-token", "x-xsrf-token"]);
        assert_eq!(config.endpoints, EndpointMarkers::default());
    }

    #[test]
    fn test_empty_list_rejected() {
        let err = ClassifierConfig::from_json_str(r#"{"endpoints": {"login": []}}"#).unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("endpoints.login")));
    }

    #[test]
    fn test_empty_credential_lists_rejected() {
        let err =
            ClassifierConfig::from_json_str(r#"{"credentials":{"access_token_cookies":[]}}"#)
                .unwrap_err();
        assert!(
            matches!(err, Error::Config(ref msg) if msg.contains("credentials.access_token_cookies"))
        );

        let err = ClassifierConfig::from_json_str(r#"{"credentials":{"state_headers":[]}}"#)
            .unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("credentials.state_headers")));
    }

    #[test]
    fn test_empty_body_sniff_rejected() {
        let err = ClassifierConfig::from_json_str(r#"{"body_sniff":[]}"#).unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("body_sniff")));

        let err = ClassifierConfig::from_json_str(r#"{"body_sniff":["token",""]}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_blank_marker_rejected() {
        let err =
            ClassifierConfig::from_json_str(r#"{"acquisition": {"oauth": ["oauth", " "]}}"#)
                .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_invalid_json() {
        let err = ClassifierConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_normalize_keeps_cookie_case() {
        let mut config = ClassifierConfig::default();
        config.endpoints.login.push("/SSO/Start".to_string());
        config.normalize();
        assert!(config.endpoints.login.contains(&"/sso/start".to_string()));
        assert!(config
            .credentials
            .session_cookies
            .contains(&"JSESSIONID=".to_string()));
    }
}
