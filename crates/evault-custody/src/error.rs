//! # Custody Error Types
//!
//! Structured errors for ledger operations. Every variant carries the
//! context a caller needs to recover by re-reading current state; none of
//! them is retried automatically by this crate.

use thiserror::Error;

use evault_core::{EntryId, EvidenceId, ValidationError};

use crate::action::CustodyAction;
use crate::entry::ApprovalStatus;
use crate::status::CustodyStatus;

/// Errors from chain-of-custody operations.
#[derive(Error, Debug)]
pub enum CustodyError {
    /// No evidence item with the given identifier exists.
    #[error("evidence item {evidence_id} not found")]
    EvidenceNotFound {
        /// The missing item.
        evidence_id: EvidenceId,
    },

    /// The action is not legal from the item's current custody status.
    #[error("invalid custody transition: {action} is not legal while {from}")]
    InvalidTransition {
        /// Current custody status.
        from: CustodyStatus,
        /// The rejected action.
        action: CustodyAction,
    },

    /// A pending status-changing entry must be decided first.
    #[error("custody entry {entry_id} is awaiting approval; decide it before appending further status changes")]
    ApprovalRequired {
        /// The undecided entry blocking the append.
        entry_id: EntryId,
    },

    /// The entry has already been approved or rejected.
    #[error("custody entry {entry_id} is already {status}")]
    AlreadyDecided {
        /// The decided entry.
        entry_id: EntryId,
        /// Its recorded decision.
        status: ApprovalStatus,
    },

    /// The custody status changed under a concurrent request.
    #[error("custody status changed concurrently: expected {expected}, found {actual}")]
    ConcurrentModification {
        /// The status the request validated against.
        expected: CustodyStatus,
        /// The status actually found at commit time.
        actual: CustodyStatus,
    },

    /// The actor lacks the capability for this operation.
    #[error("forbidden: {reason}")]
    Forbidden {
        /// Why the operation was denied.
        reason: String,
    },

    /// An input constraint was violated.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No custody entry with the given identifier exists on this item.
    #[error("no custody entry {entry_id} on this evidence item")]
    UnknownEntry {
        /// The missing entry.
        entry_id: EntryId,
    },
}
