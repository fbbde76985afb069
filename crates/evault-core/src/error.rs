//! # Error Primitives
//!
//! Structured error types shared across the Evidence Vault stack, built with
//! `thiserror`. No `Box<dyn Error>`, no `.unwrap()` outside tests.
//!
//! Domain-specific error enums (custody, access, integrity) live in their
//! owning crates; this module holds only the primitives they embed.

use thiserror::Error;

/// An input-constraint failure on a validated domain value.
///
/// Carries the field name and the reason so API consumers can surface the
/// failure without guesswork.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("validation failed for {field}: {reason}")]
pub struct ValidationError {
    /// The field that failed validation.
    pub field: &'static str,
    /// Why the value was rejected.
    pub reason: String,
}

impl ValidationError {
    /// Create a validation error for the named field.
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors parsing a stored content digest.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DigestError {
    /// The hex string is not the expected length for the algorithm.
    #[error("digest has invalid length: expected {expected} hex characters, got {actual}")]
    InvalidLength {
        /// Expected number of hex characters.
        expected: usize,
        /// Actual number of hex characters supplied.
        actual: usize,
    },

    /// The string contains a character that is not a hex digit.
    #[error("digest is not valid hex: \"{0}\"")]
    InvalidHex(String),
}
