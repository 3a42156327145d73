//! Transaction classification.
//!
//! Infers the authentication event a transaction represents and the kind of
//! credential it involves. Classification is a pure function of the record
//! and the configuration: no state is retained between calls, so a single
//! [`Classifier`] can be shared freely across threads.

use crate::event_rules::{self, ACQUISITION_FALLBACK};
use crate::signals::Signals;
use crate::token_rules;
use authscope_core::{ClassifierConfig, EventClassification, TransactionRecord};
use std::sync::OnceLock;
use tracing::debug;

/// Rule-based classifier for captured transactions.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    config: ClassifierConfig,
}

impl Classifier {
    /// Create a classifier with the default markers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a classifier with custom markers.
    ///
    /// Markers are normalized but not validated; an empty list simply never
    /// matches. Use [`ClassifierConfig::from_json_str`] to load a validated
    /// configuration.
    pub fn with_config(mut config: ClassifierConfig) -> Self {
        config.normalize();
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify a single transaction. Never fails: records without usable
    /// signals come back as `Unclassified` / `Unknown`.
    pub fn classify(&self, record: &TransactionRecord) -> EventClassification {
        let signals = Signals::new(record, &self.config);
        let (event_type, event_rule) = event_rules::decide(&signals);
        let (token_type, token_rule) = token_rules::decide(&signals);

        if event_rule == ACQUISITION_FALLBACK {
            debug!(
                url = %record.url,
                body_hints = ?signals.response_body_hints(),
                "Acquisition fallback matched"
            );
        }
        debug!(
            url = %record.url,
            event = %event_type,
            event_rule,
            token = %token_type,
            token_rule,
            "Classified transaction"
        );

        EventClassification {
            event_type,
            token_type,
            method: record.method,
            status: record.status,
            url: record.url.clone(),
            headers: record.request_headers.clone(),
            timestamp: record.timestamp,
        }
    }

    /// Classify transactions in order.
    pub fn classify_batch(&self, records: &[TransactionRecord]) -> Vec<EventClassification> {
        records.iter().map(|r| self.classify(r)).collect()
    }
}

/// Classify with the default markers.
pub fn classify(record: &TransactionRecord) -> EventClassification {
    static DEFAULT: OnceLock<Classifier> = OnceLock::new();
    DEFAULT.get_or_init(Classifier::new).classify(record)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use authscope_core::{HttpMethod, OriginKind};
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use proptest::prelude::*;

    fn method_strategy() -> impl Strategy<Value = Option<HttpMethod>> {
        prop_oneof![
            Just(None),
            Just(Some(HttpMethod::Get)),
            Just(Some(HttpMethod::Post)),
            Just(Some(HttpMethod::Put)),
            Just(Some(HttpMethod::Delete)),
        ]
    }

    fn path_strategy() -> impl Strategy<Value = String> {
        prop::collection::vec(
            prop_oneof![
                Just("auth".to_string()),
                Just("login".to_string()),
                Just("logout".to_string()),
                Just("refresh".to_string()),
                Just("token".to_string()),
                Just("oauth".to_string()),
                "[a-z0-9]{1,8}".prop_map(|s| s),
            ],
            0..4,
        )
        .prop_map(|parts| format!("https://api.example.com/{}", parts.join("/")))
    }

    /// Records without any credential, CSRF or state header.
    fn anonymous_record() -> impl Strategy<Value = TransactionRecord> {
        (
            method_strategy(),
            path_strategy(),
            prop::option::of(100u16..600),
            prop::option::of("[ -~]{0,40}"),
            prop::bool::ANY,
        )
            .prop_map(|(method, url, status, body, acquire)| TransactionRecord {
                method,
                url,
                status,
                request_body: body.clone(),
                response_body: body,
                origin: acquire.then_some(OriginKind::Acquire),
                ..TransactionRecord::default()
            })
    }

    proptest! {
        /// Property: without credentials only Unknown or acquired token types appear.
        #[test]
        fn anonymous_records_never_report_credentials(record in anonymous_record()) {
            let result = classify(&record);
            prop_assert!(
                result.token_type == authscope_core::TokenType::Unknown
                    || result.token_type.is_acquired(),
                "unexpected token type {:?} for {}",
                result.token_type,
                record.url
            );
        }

        /// Property: classification is a pure function of the record.
        #[test]
        fn classification_is_idempotent(
            record in anonymous_record(),
            auth in prop::option::of("[ -~]{0,60}"),
            cookie in prop::option::of("[ -~]{0,40}"),
        ) {
            let mut record = record;
            if let Some(auth) = auth {
                record.request_headers.insert("Authorization", auth);
            }
            if let Some(cookie) = cookie {
                record.request_headers.insert("Cookie", cookie);
            }
            prop_assert_eq!(classify(&record), classify(&record));
        }

        /// Property: POST /auth/login with 200 is always a login.
        #[test]
        fn successful_login_post_is_login(
            auth in prop::option::of("[ -~]{1,60}"),
            body in prop::option::of("[ -~]{0,40}"),
        ) {
            let mut record = TransactionRecord::new("https://api.example.com/auth/login")
                .with_method(HttpMethod::Post)
                .with_status(200);
            if let Some(auth) = auth {
                record.request_headers.insert("Authorization", auth);
            }
            record.request_body = body;
            prop_assert_eq!(classify(&record).event_type, authscope_core::EventType::Login);
        }

        /// Property: arbitrary bearer values never panic, and three valid JSON
        /// segments always classify as a JWT.
        #[test]
        fn bearer_values_never_panic(
            token in "[A-Za-z0-9_.=-]{0,80}",
            sub in "[a-z0-9]{1,12}",
        ) {
            let record = TransactionRecord::new("https://api.example.com/users/1")
                .with_status(200)
                .with_request_header("Authorization", format!("Bearer {token}"));
            let result = classify(&record);
            prop_assert!(result.token_type.is_jwt() || result.token_type.is_opaque());

            let jwt = format!(
                "{}.{}.{}",
                URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256"}"#),
                URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"{sub}"}}"#)),
                token,
            );
            let record = TransactionRecord::new("https://api.example.com/users/1")
                .with_status(200)
                .with_request_header("Authorization", format!("Bearer {jwt}"));
            let is_jwt = classify(&record).token_type.is_jwt();
            prop_assert_eq!(is_jwt, !token.contains('.'));
        }
    }
}
