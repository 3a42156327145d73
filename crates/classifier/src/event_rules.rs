//! Event-type rule chain.
//!
//! Rules are evaluated top to bottom and the first match wins. The table
//! order is the priority order; reordering entries changes results.

use crate::signals::Signals;
use authscope_core::{EventType, HttpMethod};

/// One entry of the event chain.
pub(crate) struct EventRule {
    pub name: &'static str,
    pub matches: fn(&Signals<'_>) -> bool,
    pub verdict: EventType,
}

pub(crate) const ACQUISITION_FALLBACK: &str = "acquisition_fallback";

pub(crate) const EVENT_RULES: &[EventRule] = &[
    EventRule {
        name: "login",
        matches: login,
        verdict: EventType::Login,
    },
    EventRule {
        name: "logout",
        matches: logout,
        verdict: EventType::Logout,
    },
    EventRule {
        name: "token_refresh",
        matches: token_refresh,
        verdict: EventType::TokenRefresh,
    },
    EventRule {
        name: "expiry_check",
        matches: expiry_check,
        verdict: EventType::ExpiryCheck,
    },
    EventRule {
        name: ACQUISITION_FALLBACK,
        matches: acquisition_fallback,
        verdict: EventType::Login,
    },
    EventRule {
        name: "access",
        matches: access,
        verdict: EventType::Access,
    },
    // Legacy URL-only fallbacks. The rules above already cover these URLs
    // with stricter conditions; kept so loosened markers still land here.
    EventRule {
        name: "legacy_login",
        matches: |s| s.url_has_any(&s.config.endpoints.legacy_login),
        verdict: EventType::Login,
    },
    EventRule {
        name: "legacy_logout",
        matches: |s| s.url_has_any(&s.config.endpoints.legacy_logout),
        verdict: EventType::Logout,
    },
    EventRule {
        name: "legacy_refresh",
        matches: |s| s.url_has_any(&s.config.endpoints.legacy_refresh),
        verdict: EventType::TokenRefresh,
    },
    EventRule {
        name: "default_access",
        matches: |s| s.has_token(),
        verdict: EventType::Access,
    },
    EventRule {
        name: "default_unclassified",
        matches: |_| true,
        verdict: EventType::Unclassified,
    },
];

fn login(s: &Signals<'_>) -> bool {
    s.method_is(HttpMethod::Post) && s.url_has_any(&s.config.endpoints.login) && s.is_success()
}

fn logout(s: &Signals<'_>) -> bool {
    (s.method_is(HttpMethod::Post) || s.method_is(HttpMethod::Delete))
        && s.url_has_any(&s.config.endpoints.logout)
}

fn token_refresh(s: &Signals<'_>) -> bool {
    let endpoints = &s.config.endpoints;
    s.method_is(HttpMethod::Post)
        && s.url_has_any(&endpoints.refresh)
        && (s.has_refresh_grant() || s.url_has_any(&endpoints.refresh_hint))
}

fn expiry_check(s: &Signals<'_>) -> bool {
    (s.status_is(401) && s.has_token())
        || (s.method_is(HttpMethod::Get) && s.url_has_any(&s.config.endpoints.validation))
}

fn acquisition_fallback(s: &Signals<'_>) -> bool {
    s.is_acquisition() || (s.is_success() && s.url_has_any(&s.config.endpoints.auth_area))
}

fn access(s: &Signals<'_>) -> bool {
    s.has_token() && s.is_success() && !s.url_has_any(&s.config.endpoints.access_exclusions)
}

/// Evaluate the chain, returning the verdict and the name of the rule that fired.
pub(crate) fn decide(signals: &Signals<'_>) -> (EventType, &'static str) {
    EVENT_RULES
        .iter()
        .find(|rule| (rule.matches)(signals))
        .map(|rule| (rule.verdict, rule.name))
        .unwrap_or((EventType::Unclassified, "default_unclassified"))
}
