//! Core types and configuration for the authscope system.
//!
//! This crate provides shared types used across all other crates:
//! - Transaction records and case-insensitive header maps
//! - Classification output (event and token types)
//! - Classifier configuration
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::ClassifierConfig;
pub use error::{Error, Result};
pub use types::*;
