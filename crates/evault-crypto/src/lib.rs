//! # evault-crypto — Integrity Primitives for the Evidence Vault Stack
//!
//! This crate provides the hash and integrity utility used throughout the
//! workspace:
//!
//! - **Streaming SHA-256 digest computation** over any [`std::io::Read`],
//!   producing [`ContentDigest`](evault_core::ContentDigest) values without
//!   buffering the input, so forensic images larger than memory hash fine.
//! - **Digest verification** against a stored hex digest — case-insensitive
//!   parse, constant-time comparison, mismatch as a `false` result rather
//!   than an error.
//! - **Audit chain links**: the SHA-256 link function and genesis constant
//!   for the tamper-evident audit trail, shared by the API and the offline
//!   verification tooling.
//!
//! Verification is idempotent and side-effect-free. The only error this
//! crate surfaces is [`IntegrityError::StorageUnavailable`]: the byte
//! source could not be read at all.

pub mod chain;
pub mod error;
pub mod sha256;

// Re-export primary types.
pub use chain::{chain_hash, GENESIS_HASH};
pub use error::IntegrityError;
pub use sha256::{compute_digest, verify, Sha256Stream};
