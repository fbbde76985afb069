//! # Integrity Error Types
//!
//! Structured errors for digest computation and verification. The surface is
//! deliberately narrow: a digest mismatch is a *result* (`verify` returns
//! `Ok(false)`), never an error, so the only failure this crate can report
//! is a byte source that cannot be read at all.

use thiserror::Error;

/// Errors from integrity operations in the Evidence Vault stack.
#[derive(Error, Debug)]
pub enum IntegrityError {
    /// The underlying byte source could not be read.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] std::io::Error),
}
