#![deny(missing_docs)]

//! # evault-core — Foundational Types for the Evidence Vault Stack
//!
//! This crate defines the foundational types that every other crate in the
//! workspace depends on. It has no internal crate dependencies — only `serde`,
//! `serde_json`, `thiserror`, `chrono`, and `uuid` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** Every identifier is a distinct
//!    type. You cannot pass a [`CaseId`] where an [`EvidenceId`] is expected.
//!
//! 2. **Closed enums with exact wire spellings.** [`Role`] serializes to the
//!    literal strings the audit exporters depend on (`SUPERVISOR`, not
//!    `Supervisor`), and every consumer matches exhaustively — adding a role
//!    forces every call site to be revisited at compile time.
//!
//! 3. **UTC everywhere.** [`Timestamp`] is UTC-only; local time conversion is
//!    a presentation concern handled at the API layer.
//!
//! 4. **Structured errors with `thiserror`.** No `Box<dyn Error>`, no
//!    `.unwrap()` outside tests.

pub mod digest;
pub mod error;
pub mod identity;
pub mod role;
pub mod temporal;

// Re-export primary types at crate root for ergonomic imports.
pub use digest::{ContentDigest, DigestAlgorithm};
pub use error::{DigestError, ValidationError};
pub use identity::{CaseId, EntryId, EvidenceId, UserId};
pub use role::Role;
pub use temporal::Timestamp;
