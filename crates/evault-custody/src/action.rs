//! # Custody Actions
//!
//! Every kind of fact the custody ledger records. Actions fall into five
//! kinds: intake (the first entry of a newly registered item), release out
//! of the vault, return into the vault, disposal, and handling entries that
//! document work on the item without moving it.
//!
//! ## Design Decision
//!
//! The action set is a closed enum, not a string column. The ledger and the
//! access gate `match` exhaustively on it, so adding an action forces every
//! call site to be revisited at compile time, and the wire spellings are
//! pinned where the external audit export expects them.

use serde::{Deserialize, Serialize};

use crate::error::CustodyError;
use crate::status::CustodyStatus;

/// A custody action recorded in the chain-of-custody ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CustodyAction {
    /// Item seized at a scene or from a person. Intake.
    #[serde(rename = "SEIZED")]
    Seized,
    /// Item collected through a consensual or administrative process. Intake.
    #[serde(rename = "COLLECTED")]
    Collected,
    /// Item handed to a named custodian outside the vault.
    #[serde(rename = "TRANSFERRED")]
    Transferred,
    /// Item checked out of the vault.
    #[serde(rename = "CHECKOUT")]
    Checkout,
    /// Item returned to the vault.
    #[serde(rename = "RETURNED")]
    Returned,
    /// Item checked back into the vault.
    #[serde(rename = "CHECKIN")]
    Checkin,
    /// Item permanently disposed of. Terminal.
    #[serde(rename = "DISPOSED")]
    Disposed,
    /// Forensic analysis performed.
    #[serde(rename = "ANALYZED")]
    Analyzed,
    /// Item presented in court.
    #[serde(rename = "PRESENTED_COURT")]
    PresentedCourt,
    /// Item examined without alteration.
    #[serde(rename = "EXAMINED")]
    Examined,
    /// Item accessed in place.
    #[serde(rename = "ACCESSED")]
    Accessed,
    /// Item placed into a storage location.
    #[serde(rename = "STORED")]
    Stored,
    /// Forensic image taken of a digital item.
    #[serde(rename = "IMAGED")]
    Imaged,
    /// Evidence container sealed.
    #[serde(rename = "SEALED")]
    Sealed,
    /// Evidence container opened.
    #[serde(rename = "OPENED")]
    Opened,
}

/// The effect class of a custody action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// First entry of a newly registered item. Never appended afterwards.
    Intake,
    /// Moves the item out of the vault to a custodian.
    Release,
    /// Brings the item back into the vault.
    Return,
    /// Removes the item from circulation permanently.
    Disposal,
    /// Documents work on the item without moving it.
    Handling,
}

impl ActionKind {
    /// Whether an appended entry of this kind alters `custody_status`.
    pub fn moves_custody(&self) -> bool {
        matches!(self, Self::Release | Self::Return | Self::Disposal)
    }
}

impl CustodyAction {
    /// Every custody action, for exhaustive matrix tests.
    pub const ALL: [CustodyAction; 15] = [
        Self::Seized,
        Self::Collected,
        Self::Transferred,
        Self::Checkout,
        Self::Returned,
        Self::Checkin,
        Self::Disposed,
        Self::Analyzed,
        Self::PresentedCourt,
        Self::Examined,
        Self::Accessed,
        Self::Stored,
        Self::Imaged,
        Self::Sealed,
        Self::Opened,
    ];

    /// The canonical string name of this action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seized => "SEIZED",
            Self::Collected => "COLLECTED",
            Self::Transferred => "TRANSFERRED",
            Self::Checkout => "CHECKOUT",
            Self::Returned => "RETURNED",
            Self::Checkin => "CHECKIN",
            Self::Disposed => "DISPOSED",
            Self::Analyzed => "ANALYZED",
            Self::PresentedCourt => "PRESENTED_COURT",
            Self::Examined => "EXAMINED",
            Self::Accessed => "ACCESSED",
            Self::Stored => "STORED",
            Self::Imaged => "IMAGED",
            Self::Sealed => "SEALED",
            Self::Opened => "OPENED",
        }
    }

    /// Convert a canonical action name to a `CustodyAction`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "SEIZED" => Some(Self::Seized),
            "COLLECTED" => Some(Self::Collected),
            "TRANSFERRED" => Some(Self::Transferred),
            "CHECKOUT" => Some(Self::Checkout),
            "RETURNED" => Some(Self::Returned),
            "CHECKIN" => Some(Self::Checkin),
            "DISPOSED" => Some(Self::Disposed),
            "ANALYZED" => Some(Self::Analyzed),
            "PRESENTED_COURT" => Some(Self::PresentedCourt),
            "EXAMINED" => Some(Self::Examined),
            "ACCESSED" => Some(Self::Accessed),
            "STORED" => Some(Self::Stored),
            "IMAGED" => Some(Self::Imaged),
            "SEALED" => Some(Self::Sealed),
            "OPENED" => Some(Self::Opened),
            _ => None,
        }
    }

    /// The effect class of this action.
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Seized | Self::Collected => ActionKind::Intake,
            Self::Transferred | Self::Checkout => ActionKind::Release,
            Self::Returned | Self::Checkin => ActionKind::Return,
            Self::Disposed => ActionKind::Disposal,
            Self::Analyzed
            | Self::PresentedCourt
            | Self::Examined
            | Self::Accessed
            | Self::Stored
            | Self::Imaged
            | Self::Sealed
            | Self::Opened => ActionKind::Handling,
        }
    }

    /// Whether this action registers a new item.
    pub fn is_intake(&self) -> bool {
        matches!(self.kind(), ActionKind::Intake)
    }

    /// Resolve the status change this action produces from `from`.
    ///
    /// `Ok(Some(next))` commits a transition, `Ok(None)` appends an entry
    /// with the status unchanged. Intake actions are only legal while
    /// registering a new item and are rejected here, as is every action
    /// against a terminal status.
    pub fn effect(&self, from: CustodyStatus) -> Result<Option<CustodyStatus>, CustodyError> {
        if from.is_terminal() {
            return Err(CustodyError::InvalidTransition {
                from,
                action: *self,
            });
        }
        match self.kind() {
            ActionKind::Intake => Err(CustodyError::InvalidTransition {
                from,
                action: *self,
            }),
            ActionKind::Release => match from {
                CustodyStatus::InVault => Ok(Some(CustodyStatus::Released)),
                _ => Err(CustodyError::InvalidTransition {
                    from,
                    action: *self,
                }),
            },
            ActionKind::Return => match from {
                CustodyStatus::Released => Ok(Some(CustodyStatus::InVault)),
                _ => Err(CustodyError::InvalidTransition {
                    from,
                    action: *self,
                }),
            },
            ActionKind::Disposal => Ok(Some(CustodyStatus::Disposed)),
            ActionKind::Handling => Ok(None),
        }
    }
}

impl std::fmt::Display for CustodyAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
