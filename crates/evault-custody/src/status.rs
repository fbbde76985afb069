//! # Custody Status State Machine
//!
//! The lifecycle state of an evidence item, denormalized onto the item for
//! fast reads and always derivable by replaying its custody ledger:
//!
//! ```text
//! IN_VAULT ──TRANSFERRED/CHECKOUT──▶ RELEASED
//!     ▲                                  │
//!     └────────RETURNED/CHECKIN──────────┘
//!
//! IN_VAULT | RELEASED | RETURNED ──DISPOSED──▶ DISPOSED (terminal)
//! ```
//!
//! ## Design Decision
//!
//! Statuses are a closed enum with exact wire spellings rather than free
//! strings. The external audit export depends on the literal names, and an
//! exhaustive `match` in the ledger means a new status forces every call
//! site to be revisited at compile time.
//!
//! `RETURNED` (evidence released back to its owner) appears only on rows
//! imported from the predecessor system; no action sequence in the current
//! ledger produces it. From `RETURNED` the only legal continuations are
//! disposal and status-preserving entries.

use serde::{Deserialize, Serialize};

/// The custody state of an evidence item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CustodyStatus {
    /// Held in the evidence vault.
    #[serde(rename = "IN_VAULT")]
    InVault,
    /// Checked out to a custodian outside the vault.
    #[serde(rename = "RELEASED")]
    Released,
    /// Released back to its owner. Reached only via imported rows.
    #[serde(rename = "RETURNED")]
    Returned,
    /// Permanently removed from circulation. Terminal.
    #[serde(rename = "DISPOSED")]
    Disposed,
}

impl CustodyStatus {
    /// Every custody status, for exhaustive matrix tests.
    pub const ALL: [CustodyStatus; 4] = [
        Self::InVault,
        Self::Released,
        Self::Returned,
        Self::Disposed,
    ];

    /// The canonical string name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InVault => "IN_VAULT",
            Self::Released => "RELEASED",
            Self::Returned => "RETURNED",
            Self::Disposed => "DISPOSED",
        }
    }

    /// Convert a canonical status name to a `CustodyStatus`.
    ///
    /// Returns `None` for any other input; there are no aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "IN_VAULT" => Some(Self::InVault),
            "RELEASED" => Some(Self::Released),
            "RETURNED" => Some(Self::Returned),
            "DISPOSED" => Some(Self::Disposed),
            _ => None,
        }
    }

    /// Whether this is a terminal status (no further transitions).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Disposed)
    }

    /// The set of statuses reachable from this one.
    pub fn valid_transitions(&self) -> &'static [CustodyStatus] {
        match self {
            Self::InVault => &[Self::Released, Self::Disposed],
            Self::Released => &[Self::InVault, Self::Disposed],
            Self::Returned => &[Self::Disposed],
            Self::Disposed => &[],
        }
    }
}

impl std::fmt::Display for CustodyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The physical nature of an evidence item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvidenceCategory {
    /// Digital evidence: disk images, exports, recordings.
    #[serde(rename = "DIGITAL")]
    Digital,
    /// Physical evidence: objects in bags, boxes, and lockers.
    #[serde(rename = "PHYSICAL")]
    Physical,
}

impl EvidenceCategory {
    /// The canonical string name of this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Digital => "DIGITAL",
            Self::Physical => "PHYSICAL",
        }
    }

    /// Convert a canonical category name to an `EvidenceCategory`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "DIGITAL" => Some(Self::Digital),
            "PHYSICAL" => Some(Self::Physical),
            _ => None,
        }
    }
}

impl std::fmt::Display for EvidenceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_names_round_trip() {
        for status in CustodyStatus::ALL {
            assert_eq!(CustodyStatus::from_name(status.as_str()), Some(status));
        }
    }

    #[test]
    fn status_serialization_uses_wire_spellings() {
        assert_eq!(
            serde_json::to_string(&CustodyStatus::InVault).unwrap(),
            "\"IN_VAULT\""
        );
        let parsed: CustodyStatus = serde_json::from_str("\"DISPOSED\"").unwrap();
        assert_eq!(parsed, CustodyStatus::Disposed);
    }

    #[test]
    fn unknown_status_names_rejected() {
        assert_eq!(CustodyStatus::from_name("CHECKED_OUT"), None);
        assert_eq!(CustodyStatus::from_name("in_vault"), None);
        assert_eq!(CustodyStatus::from_name(""), None);
        let result: Result<CustodyStatus, _> = serde_json::from_str("\"VAULTED\"");
        assert!(result.is_err());
    }

    #[test]
    fn only_disposed_is_terminal() {
        assert!(!CustodyStatus::InVault.is_terminal());
        assert!(!CustodyStatus::Released.is_terminal());
        assert!(!CustodyStatus::Returned.is_terminal());
        assert!(CustodyStatus::Disposed.is_terminal());
    }

    #[test]
    fn valid_transitions_exhaustive() {
        assert_eq!(
            CustodyStatus::InVault.valid_transitions(),
            &[CustodyStatus::Released, CustodyStatus::Disposed]
        );
        assert_eq!(
            CustodyStatus::Released.valid_transitions(),
            &[CustodyStatus::InVault, CustodyStatus::Disposed]
        );
        assert_eq!(
            CustodyStatus::Returned.valid_transitions(),
            &[CustodyStatus::Disposed]
        );
        assert!(CustodyStatus::Disposed.valid_transitions().is_empty());
    }

    #[test]
    fn terminal_status_has_no_transitions() {
        for status in CustodyStatus::ALL {
            assert_eq!(
                status.is_terminal(),
                status.valid_transitions().is_empty(),
                "{status} terminality must match its transition set"
            );
        }
    }

    #[test]
    fn category_round_trip() {
        for category in [EvidenceCategory::Digital, EvidenceCategory::Physical] {
            assert_eq!(
                EvidenceCategory::from_name(category.as_str()),
                Some(category)
            );
        }
        assert_eq!(EvidenceCategory::from_name("VIRTUAL"), None);
    }

    #[test]
    fn category_serialization() {
        assert_eq!(
            serde_json::to_string(&EvidenceCategory::Physical).unwrap(),
            "\"PHYSICAL\""
        );
        let parsed: EvidenceCategory = serde_json::from_str("\"DIGITAL\"").unwrap();
        assert_eq!(parsed, EvidenceCategory::Digital);
    }
}
