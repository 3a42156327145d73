//! Transaction ingestion and normalization for the authscope system.
//!
//! This crate handles:
//! - Decoding persisted transactions into records
//! - Resolving the merged and flat header storage layouts
//! - Coercing loosely typed status, body and timestamp fields

pub mod headers;
pub mod record;

pub use headers::{HeaderShape, ResolvedHeaders};
pub use record::StoredTransaction;

use authscope_core::{Result, TransactionRecord};

/// Parse one stored transaction from JSON.
pub fn parse_record(json: &str) -> Result<TransactionRecord> {
    let stored: StoredTransaction = serde_json::from_str(json)?;
    stored.into_record()
}

/// Parse a JSON array of stored transactions, failing on the first bad one.
pub fn parse_records(json: &str) -> Result<Vec<TransactionRecord>> {
    let stored: Vec<StoredTransaction> = serde_json::from_str(json)?;
    stored.into_iter().map(StoredTransaction::into_record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use authscope_core::Error;

    #[test]
    fn test_parse_record() {
        let record = parse_record(
            r#"{"method":"GET","url":"https://api.example.com/users/42","status":200,
                "requestHeaders":{"Authorization":"Bearer abc"}}"#,
        )
        .unwrap();
        assert_eq!(record.request_headers.get("authorization"), Some("Bearer abc"));
    }

    #[test]
    fn test_parse_records() {
        let records = parse_records(
            r#"[{"url":"https://a.example.com/"},{"url":"https://b.example.com/","status":204}]"#,
        )
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].status, Some(204));
    }

    #[test]
    fn test_parse_records_fails_on_bad_entry() {
        let err = parse_records(r#"[{"url":"https://a.example.com/"},{"method":"GET"}]"#)
            .unwrap_err();
        assert!(matches!(err, Error::MissingField("url")));
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(matches!(parse_record("[1,"), Err(Error::Json(_))));
    }
}
