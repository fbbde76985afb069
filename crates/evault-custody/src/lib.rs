#![deny(missing_docs)]

//! # evault-custody — Chain-of-Custody Ledger for the Evidence Vault Stack
//!
//! This crate owns the custody relation: the append-only ledger every
//! evidence item carries, the status it derives, and the approval workflow
//! that gates status-changing entries.
//!
//! ## Model
//!
//! - [`CustodyStatus`] — where the item stands (`IN_VAULT`, `RELEASED`,
//!   `RETURNED`, `DISPOSED`). `DISPOSED` is terminal; `RETURNED` exists only
//!   on rows imported from the predecessor system.
//! - [`CustodyAction`] — the fifteen recordable actions, classified by
//!   [`ActionKind`] into intake, release, return, disposal, and handling.
//!   An action's [`effect`](CustodyAction::effect) is the single source of
//!   truth for which transitions are legal.
//! - [`CustodyEntry`] — one immutable ledger row. Entries carry an
//!   [`ApprovalStatus`]; only `APPROVED` entries are effective.
//! - [`EvidenceItem`] — the aggregate. All mutation flows through
//!   [`append`](EvidenceItem::append) and [`decide`](EvidenceItem::decide),
//!   which keep the denormalized status and the ledger in lockstep.
//!
//! ## Replay Invariant
//!
//! Folding the approved entries in ledger order from `IN_VAULT` always
//! reproduces the stored status. [`EvidenceItem::verify_ledger`] checks it;
//! [`EvidenceItem::handoff_gaps`] flags custodian/recorder mismatches as
//! data-quality signals without failing anything.

pub mod action;
pub mod entry;
pub mod error;
pub mod item;
pub mod status;

// Re-export primary types at crate root for ergonomic imports.
pub use action::{ActionKind, CustodyAction};
pub use entry::{ApprovalDecision, ApprovalStatus, CustodyEntry, NewCustodyEntry, Purpose};
pub use error::CustodyError;
pub use item::{EvidenceItem, EvidenceRecord, HandoffGap, SeizureRequest};
pub use status::{CustodyStatus, EvidenceCategory};
