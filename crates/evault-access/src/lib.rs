#![deny(missing_docs)]

//! # evault-access — Attribute-Based Access Control for the Evidence Vault Stack
//!
//! This crate owns who may see and touch a case: the sensitivity
//! classification with its typed allow-lists, the assignment records, and
//! the fail-closed access gate.
//!
//! ## Model
//!
//! - [`SensitivityLevel`] — `NORMAL`, `RESTRICTED`, `CONFIDENTIAL`,
//!   `TOP_SECRET`. Exact wire spellings; exhaustive matches everywhere.
//! - [`SensitivityClassification`] — private fields, one mutation path
//!   ([`reclassify`](SensitivityClassification::reclassify), supervisory
//!   capability enforced inside), a narrow [`StoredSensitivity`] adapter
//!   at the persistence boundary.
//! - [`CaseAssignment`] — team membership the gate consults at
//!   `RESTRICTED` and `CONFIDENTIAL`.
//! - [`can_access`] — the single authorization entry point: pure, total,
//!   fail-closed, evaluated in a fixed priority order.
//! - [`CaseAccessFilter`] — the same decision as data, so listing N cases
//!   costs one query instead of N gate calls.

pub mod assignment;
pub mod error;
pub mod gate;
pub mod sensitivity;

// Re-export primary types at crate root for ergonomic imports.
pub use assignment::{AssignmentRole, CaseAssignment};
pub use error::AccessError;
pub use gate::{can_access, AccessSubject, CaseAccessFilter, CaseAccessView, CaseAction, ScopedClauses};
pub use sensitivity::{
    AccessRestrictions, SensitivityClassification, SensitivityLevel, StoredSensitivity,
};
