//! # Access Control Error Types
//!
//! A denial is always surfaced as [`AccessError::Forbidden`], never silently
//! downgraded to a narrower capability.

use thiserror::Error;

use evault_core::ValidationError;

/// Errors from sensitivity classification and access-gate operations.
#[derive(Error, Debug)]
pub enum AccessError {
    /// The actor lacks the capability for this operation.
    #[error("forbidden: {reason}")]
    Forbidden {
        /// Why the operation was denied.
        reason: String,
    },

    /// An input constraint was violated.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
