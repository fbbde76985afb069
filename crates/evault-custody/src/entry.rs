//! # Custody Entries
//!
//! One immutable, timestamped fact in the evidence ledger: who had the
//! item, who received it, where it went, and why. Entries are write-once;
//! corrections are new compensating entries, never edits.
//!
//! ## Approval Workflow
//!
//! An entry recorded with `requires_approval = true` is committed as
//! `PENDING` and takes no effect on the item's custody status until a
//! supervisor approves it. Entries that need no approval commit as
//! `APPROVED` with no approver recorded, so replay is uniformly "apply the
//! approved entries".

use serde::{Deserialize, Serialize};

use evault_core::{EntryId, Timestamp, UserId, ValidationError};

use crate::action::CustodyAction;

/// The approval state of a custody entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApprovalStatus {
    /// Awaiting a supervisor decision. Not yet effective.
    #[serde(rename = "PENDING")]
    Pending,
    /// Approved and effective.
    #[serde(rename = "APPROVED")]
    Approved,
    /// Rejected. The entry remains in the ledger but never takes effect.
    #[serde(rename = "REJECTED")]
    Rejected,
}

impl ApprovalStatus {
    /// The canonical string name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }

    /// Convert a canonical name to an `ApprovalStatus`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "PENDING" => Some(Self::Pending),
            "APPROVED" => Some(Self::Approved),
            "REJECTED" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Whether a decision has been recorded.
    pub fn is_decided(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A supervisor's decision on a pending custody entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalDecision {
    /// Apply the entry's status change and mark it approved.
    #[serde(rename = "APPROVE")]
    Approve,
    /// Mark the entry rejected; the custody status is untouched.
    #[serde(rename = "REJECT")]
    Reject,
}

impl ApprovalDecision {
    /// The canonical string name of this decision.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "APPROVE",
            Self::Reject => "REJECT",
        }
    }

    /// Convert a canonical name to an `ApprovalDecision`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "APPROVE" => Some(Self::Approve),
            "REJECT" => Some(Self::Reject),
            _ => None,
        }
    }
}

impl std::fmt::Display for ApprovalDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The stated purpose of a custody action.
///
/// Wraps a `String` validated on construction: non-empty after trimming
/// and at most [`Purpose::MAX_CHARS`] characters. The inner value cannot
/// be mutated, so the invariant holds for the life of the entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Purpose(String);

impl Purpose {
    /// Maximum accepted length in characters.
    pub const MAX_CHARS: usize = 500;

    /// Create a validated purpose. The input is trimmed.
    pub fn new(purpose: impl Into<String>) -> Result<Self, ValidationError> {
        let trimmed = purpose.into().trim().to_string();
        if trimmed.is_empty() {
            return Err(ValidationError::new("purpose", "must not be empty"));
        }
        let chars = trimmed.chars().count();
        if chars > Self::MAX_CHARS {
            return Err(ValidationError::new(
                "purpose",
                format!("too long: {chars} chars (max {})", Self::MAX_CHARS),
            ));
        }
        Ok(Self(trimmed))
    }

    /// Return the purpose as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Purpose {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Purpose> for String {
    fn from(value: Purpose) -> Self {
        value.0
    }
}

impl std::fmt::Display for Purpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One committed fact in an evidence item's chain of custody.
///
/// Write-once: committed entries are never edited or removed. The approval
/// fields are the single exception — a `PENDING` entry records its decision
/// exactly once through the aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustodyEntry {
    /// Unique entry identifier.
    pub id: EntryId,
    /// Per-item sequence number, monotonically increasing from 1.
    pub seq: u64,
    /// The recorded action.
    pub action: CustodyAction,
    /// The custodian relinquishing the item. `None` only on intake.
    pub custodian_from: Option<UserId>,
    /// The custodian receiving the item.
    pub custodian_to: UserId,
    /// Where the item was before this action.
    pub location_from: Option<String>,
    /// Where the item went.
    pub location_to: Option<String>,
    /// Why the action was taken.
    pub purpose: Purpose,
    /// Opaque reference to a digital signature held by the signing service.
    pub signature_ref: Option<String>,
    /// Whether the entry needed supervisor approval to take effect.
    pub requires_approval: bool,
    /// The entry's approval state.
    pub approval_status: ApprovalStatus,
    /// The supervisor who decided the entry, if a decision was required.
    pub approved_by: Option<UserId>,
    /// When the decision was recorded.
    pub decided_at: Option<Timestamp>,
    /// Who recorded the entry.
    pub recorded_by: UserId,
    /// When the entry was committed.
    pub recorded_at: Timestamp,
}

impl CustodyEntry {
    /// Whether this entry counts when deriving the custody status.
    pub fn is_effective(&self) -> bool {
        self.approval_status == ApprovalStatus::Approved
    }

    /// Whether this entry is awaiting a decision.
    pub fn is_pending(&self) -> bool {
        self.approval_status == ApprovalStatus::Pending
    }
}

/// A proposed custody entry, before validation against the item's state.
///
/// `custodian_from` and `location_from` are not part of the request: the
/// ledger derives them from the item's current custodian and location so a
/// caller cannot fabricate the relinquishing side of a handoff.
#[derive(Debug, Clone)]
pub struct NewCustodyEntry {
    /// The proposed action.
    pub action: CustodyAction,
    /// The actor recording the entry.
    pub actor: UserId,
    /// The custodian receiving the item.
    pub custodian_to: UserId,
    /// Where the item is going, if it moves.
    pub location_to: Option<String>,
    /// Why the action is being taken.
    pub purpose: Purpose,
    /// Opaque reference to a digital signature, if one was captured.
    pub signature_ref: Option<String>,
    /// Whether the entry must be approved before taking effect.
    pub requires_approval: bool,
}
