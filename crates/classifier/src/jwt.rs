//! Structural JWT decoding.
//!
//! Only shape and claim names are inspected. Signatures are never verified,
//! and every decode failure collapses into [`JwtDecode::NotJwt`] so callers
//! treat the token as opaque.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::fmt;
use tracing::trace;

/// Outcome of attempting to read a token as a JWT.
#[derive(Debug, Clone, PartialEq)]
pub enum JwtDecode {
    Decoded(Jwt),
    NotJwt,
}

impl JwtDecode {
    pub fn jwt(&self) -> Option<&Jwt> {
        match self {
            JwtDecode::Decoded(jwt) => Some(jwt),
            JwtDecode::NotJwt => None,
        }
    }

    pub fn is_jwt(&self) -> bool {
        matches!(self, JwtDecode::Decoded(_))
    }
}

/// Decoded header and payload of a JWT.
#[derive(Debug, Clone, PartialEq)]
pub struct Jwt {
    header: Map<String, Value>,
    payload: Map<String, Value>,
}

impl Jwt {
    pub fn header(&self) -> &Map<String, Value> {
        &self.header
    }

    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    /// Signing algorithm named in the header (`alg`).
    pub fn algorithm(&self) -> Option<&str> {
        self.header.get("alg").and_then(Value::as_str)
    }

    /// Whether the payload carries a non-null claim with this name.
    pub fn has_claim(&self, name: &str) -> bool {
        self.payload.get(name).is_some_and(|v| !v.is_null())
    }

    /// Expiry from the `exp` claim (seconds since epoch).
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let exp = self.payload.get("exp")?;
        let secs = exp.as_i64().or_else(|| exp.as_f64().map(|f| f as i64))?;
        DateTime::from_timestamp(secs, 0)
    }

    /// OpenID Connect ID tokens carry an audience, or a subject with an email.
    pub fn looks_like_id_token(&self) -> bool {
        (self.has_claim("sub") && self.has_claim("email")) || self.has_claim("aud")
    }
}

/// Why a candidate string was not a JWT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeFailure {
    SegmentCount(usize),
    Base64(Segment),
    Json(Segment),
    NotObject(Segment),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment {
    Header,
    Payload,
}

impl fmt::Display for DecodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeFailure::SegmentCount(n) => write!(f, "expected 3 segments, found {n}"),
            DecodeFailure::Base64(s) => write!(f, "{s:?} segment is not base64url"),
            DecodeFailure::Json(s) => write!(f, "{s:?} segment is not JSON"),
            DecodeFailure::NotObject(s) => write!(f, "{s:?} segment is not a JSON object"),
        }
    }
}

/// Decode a candidate token. Never panics, never errors.
pub fn decode(token: &str) -> JwtDecode {
    match try_decode(token.trim()) {
        Ok(jwt) => JwtDecode::Decoded(jwt),
        Err(failure) => {
            trace!(%failure, "Token is not a decodable JWT");
            JwtDecode::NotJwt
        }
    }
}

fn try_decode(token: &str) -> Result<Jwt, DecodeFailure> {
    let segments: Vec<&str> = token.split('.').collect();
    let [header, payload, _signature] = segments.as_slice() else {
        return Err(DecodeFailure::SegmentCount(segments.len()));
    };

    Ok(Jwt {
        header: decode_segment(header, Segment::Header)?,
        payload: decode_segment(payload, Segment::Payload)?,
    })
}

fn decode_segment(segment: &str, which: Segment) -> Result<Map<String, Value>, DecodeFailure> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment.trim_end_matches('='))
        .map_err(|_| DecodeFailure::Base64(which))?;
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(DecodeFailure::NotObject(which)),
        Err(_) => Err(DecodeFailure::Json(which)),
    }
}
