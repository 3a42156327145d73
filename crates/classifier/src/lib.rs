//! Authentication-event and token-type classification.
//!
//! This crate handles:
//! - Event-type inference (login, logout, refresh, expiry check, access)
//! - Token-type inference (JWT, opaque bearer, API key, cookies, ...)
//! - Structural JWT decoding without signature verification
//! - Batch statistics over classifications

pub mod classifier;
pub mod credentials;
pub mod jwt;
pub mod stats;

mod event_rules;
mod signals;
mod token_rules;

pub use classifier::{classify, Classifier};
pub use credentials::{Authorization, Credentials};
pub use jwt::{Jwt, JwtDecode};
pub use stats::ClassificationStats;
