//! Credential view over request headers.
//!
//! Both rule chains ask the same questions of the headers (is there an
//! Authorization value, which scheme, is there a cookie or API key). They all
//! go through [`Credentials`] so the chains cannot disagree about whether a
//! credential is present.

use authscope_core::{config::CredentialMarkers, Headers};

pub const AUTHORIZATION: &str = "authorization";
pub const COOKIE: &str = "cookie";

/// Parsed `Authorization` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization<'a> {
    Bearer(&'a str),
    Basic(&'a str),
    ApiKey(&'a str),
    /// Any other scheme word. A value without whitespace is taken as the scheme.
    Other { scheme: &'a str },
}

impl<'a> Authorization<'a> {
    /// Split a header value into scheme and credential. Scheme words are
    /// compared without regard to ASCII case.
    pub fn parse(value: &'a str) -> Self {
        let value = value.trim_start();
        let Some((scheme, credential)) = value.split_once(char::is_whitespace) else {
            return Authorization::Other {
                scheme: value.trim_end(),
            };
        };
        let credential = credential.trim();

        if scheme.eq_ignore_ascii_case("bearer") {
            Authorization::Bearer(credential)
        } else if scheme.eq_ignore_ascii_case("basic") {
            Authorization::Basic(credential)
        } else if scheme.eq_ignore_ascii_case("apikey") || scheme.eq_ignore_ascii_case("api-key") {
            Authorization::ApiKey(credential)
        } else {
            Authorization::Other { scheme }
        }
    }
}

/// Credential lookups over one header map.
#[derive(Debug, Clone, Copy)]
pub struct Credentials<'a> {
    headers: &'a Headers,
    markers: &'a CredentialMarkers,
}

impl<'a> Credentials<'a> {
    pub fn new(headers: &'a Headers, markers: &'a CredentialMarkers) -> Self {
        Self { headers, markers }
    }

    /// Non-blank `Authorization` value.
    pub fn authorization(&self) -> Option<&'a str> {
        self.headers.get_non_empty(AUTHORIZATION)
    }

    pub fn parsed_authorization(&self) -> Option<Authorization<'a>> {
        self.authorization().map(Authorization::parse)
    }

    /// Non-blank `Cookie` value.
    pub fn cookie(&self) -> Option<&'a str> {
        self.headers.get_non_empty(COOKIE)
    }

    /// Whether any API-key header is present, even with an empty value.
    pub fn has_api_key(&self) -> bool {
        self.any_present(&self.markers.api_key_headers)
    }

    pub fn has_csrf(&self) -> bool {
        self.any_present(&self.markers.csrf_headers)
    }

    pub fn has_state_header(&self) -> bool {
        self.any_present(&self.markers.state_headers)
    }

    pub fn has_session_cookie(&self) -> bool {
        self.cookie_contains_any(&self.markers.session_cookies)
    }

    pub fn has_access_token_cookie(&self) -> bool {
        self.cookie_contains_any(&self.markers.access_token_cookies)
    }

    /// Does the request carry any credential at all?
    pub fn has_token(&self) -> bool {
        self.authorization().is_some() || self.cookie().is_some() || self.has_api_key()
    }

    fn any_present(&self, names: &[String]) -> bool {
        names.iter().any(|name| self.headers.contains(name))
    }

    fn cookie_contains_any(&self, names: &[String]) -> bool {
        self.cookie()
            .is_some_and(|cookie| names.iter().any(|name| cookie.contains(name.as_str())))
    }
}
