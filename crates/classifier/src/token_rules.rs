//! Token-type rule chain.
//!
//! Evaluated independently of the event chain. Each rule either names a
//! token type or passes; the first rule that names one wins.

use crate::credentials::Authorization;
use crate::jwt::JwtDecode;
use crate::signals::Signals;
use authscope_core::TokenType;
use tracing::trace;

/// One entry of the token chain.
pub(crate) struct TokenRule {
    pub name: &'static str,
    pub resolve: fn(&Signals<'_>) -> Option<TokenType>,
}

pub(crate) const TOKEN_RULES: &[TokenRule] = &[
    TokenRule {
        name: "acquired_by_url",
        resolve: acquired_by_url,
    },
    TokenRule {
        name: "bearer",
        resolve: bearer,
    },
    TokenRule {
        name: "basic_auth",
        resolve: |s| {
            matches!(s.authorization, Some(Authorization::Basic(_)))
                .then_some(TokenType::BasicAuth)
        },
    },
    TokenRule {
        name: "api_key_scheme",
        resolve: |s| {
            matches!(s.authorization, Some(Authorization::ApiKey(_))).then_some(TokenType::ApiKey)
        },
    },
    TokenRule {
        name: "api_key_header",
        resolve: |s| s.credentials.has_api_key().then_some(TokenType::ApiKey),
    },
    TokenRule {
        name: "csrf_header",
        resolve: |s| s.credentials.has_csrf().then_some(TokenType::CsrfToken),
    },
    TokenRule {
        name: "session_cookie",
        resolve: |s| s.credentials.has_session_cookie().then_some(TokenType::SessionToken),
    },
    TokenRule {
        name: "access_token_cookie",
        resolve: |s| {
            s.credentials
                .has_access_token_cookie()
                .then_some(TokenType::AccessTokenCookie)
        },
    },
    TokenRule {
        name: "state",
        resolve: |s| {
            (s.has_state_param() || s.credentials.has_state_header())
                .then_some(TokenType::StateToken)
        },
    },
    TokenRule {
        name: "custom_scheme",
        resolve: |s| match s.authorization {
            Some(Authorization::Other { scheme }) => {
                Some(TokenType::CustomScheme(scheme.to_string()))
            }
            _ => None,
        },
    },
    TokenRule {
        name: "acquired_generic",
        resolve: |s| s.is_acquisition().then_some(TokenType::AuthTokenAcquired),
    },
    TokenRule {
        name: "unknown",
        resolve: |_| Some(TokenType::Unknown),
    },
];

/// Acquisition records, or URLs that look like auth endpoints, named by URL shape.
fn acquired_by_url(s: &Signals<'_>) -> Option<TokenType> {
    let markers = &s.config.acquisition;
    if !(s.is_acquisition() || s.url_has_any(&markers.auth_endpoint)) {
        return None;
    }

    if s.url_has_any(&markers.refresh) {
        Some(TokenType::RefreshTokenAcquired)
    } else if s.url_has_any(&markers.oauth) {
        Some(TokenType::OAuthTokenAcquired)
    } else if s.url_has_any(&markers.api_key) {
        Some(TokenType::ApiKeyAcquired)
    } else if s.url_has_any(&markers.auth) {
        if s.json_response() {
            Some(TokenType::AccessTokenAcquired)
        } else {
            Some(TokenType::AuthTokenAcquired)
        }
    } else if s.url_has_any(&markers.token) {
        Some(TokenType::AccessTokenAcquired)
    } else {
        None
    }
}

fn bearer(s: &Signals<'_>) -> Option<TokenType> {
    let decoded = s.bearer.as_ref()?;
    let refresh_url = s.url_has_any(&s.config.acquisition.bearer_refresh_hint);

    if let JwtDecode::Decoded(jwt) = decoded {
        trace!(
            alg = ?jwt.algorithm(),
            exp = ?jwt.expires_at(),
            id_token = jwt.looks_like_id_token(),
            "Bearer token decoded as JWT"
        );
    }

    let token_type = match decoded {
        JwtDecode::Decoded(jwt) if jwt.looks_like_id_token() => TokenType::IdTokenJwt,
        JwtDecode::Decoded(_) if refresh_url => TokenType::RefreshTokenJwt,
        JwtDecode::Decoded(_) => TokenType::AccessTokenJwt,
        JwtDecode::NotJwt if refresh_url => TokenType::RefreshTokenOpaque,
        JwtDecode::NotJwt => TokenType::AccessTokenOpaque,
    };
    Some(token_type)
}

/// Evaluate the chain, returning the token type and the name of the rule that fired.
pub(crate) fn decide(signals: &Signals<'_>) -> (TokenType, &'static str) {
    TOKEN_RULES
        .iter()
        .find_map(|rule| (rule.resolve)(signals).map(|t| (t, rule.name)))
        .unwrap_or((TokenType::Unknown, "unknown"))
}
