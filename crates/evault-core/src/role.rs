//! # Role Hierarchy
//!
//! The closed set of roles issued by the external user directory. Roles are
//! wire-fidelity enums: the serialized spellings (`SUPER_ADMIN`, not
//! `SuperAdmin`) are depended on by allow-list documents, audit rows, and
//! the downstream SIEM exporters, so they must round-trip exactly.
//!
//! ## Security Invariant
//!
//! `Ord` follows ascending privilege, so privilege floors compare directly:
//! `role >= Role::Supervisor` is the supervisory capability check used by
//! custody approval and sensitivity classification. The access gate itself
//! never relies on ordering — it matches roles exhaustively so that adding
//! a role forces every decision site to be revisited at compile time.

use serde::{Deserialize, Serialize};

/// A user's role, in ascending privilege order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Read-only oversight: reviews audit trails and custody ledgers.
    Auditor,
    /// Field officer: seizes evidence and records custody handling.
    Officer,
    /// Forensic analyst: examines and images evidence.
    Analyst,
    /// Case investigator: owns and works investigation cases.
    Investigator,
    /// Prosecuting attorney attached to cases for court proceedings.
    Prosecutor,
    /// Unit supervisor: approves custody transfers, classifies cases.
    Supervisor,
    /// System administrator: full access bypass.
    Admin,
    /// Super administrator: full access bypass, manages administrators.
    SuperAdmin,
}

impl Role {
    /// Every role, in ascending privilege order.
    pub const ALL: [Role; 8] = [
        Role::Auditor,
        Role::Officer,
        Role::Analyst,
        Role::Investigator,
        Role::Prosecutor,
        Role::Supervisor,
        Role::Admin,
        Role::SuperAdmin,
    ];

    /// The canonical wire spelling of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Auditor => "AUDITOR",
            Role::Officer => "OFFICER",
            Role::Analyst => "ANALYST",
            Role::Investigator => "INVESTIGATOR",
            Role::Prosecutor => "PROSECUTOR",
            Role::Supervisor => "SUPERVISOR",
            Role::Admin => "ADMIN",
            Role::SuperAdmin => "SUPER_ADMIN",
        }
    }

    /// Parse a role from its canonical wire spelling.
    ///
    /// Returns `None` for unknown names. Callers must treat `None` as a
    /// denial, never as a default role.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "AUDITOR" => Some(Role::Auditor),
            "OFFICER" => Some(Role::Officer),
            "ANALYST" => Some(Role::Analyst),
            "INVESTIGATOR" => Some(Role::Investigator),
            "PROSECUTOR" => Some(Role::Prosecutor),
            "SUPERVISOR" => Some(Role::Supervisor),
            "ADMIN" => Some(Role::Admin),
            "SUPER_ADMIN" => Some(Role::SuperAdmin),
            _ => None,
        }
    }

    /// True for the roles holding supervisory capability: SUPERVISOR,
    /// ADMIN, and SUPER_ADMIN. This is the capability required to decide
    /// custody approvals and to mutate a case's sensitivity classification.
    pub fn is_supervisory(&self) -> bool {
        matches!(self, Role::Supervisor | Role::Admin | Role::SuperAdmin)
    }

    /// True for the administrator tier (ADMIN, SUPER_ADMIN) that bypasses
    /// the access gate entirely.
    pub fn is_admin_tier(&self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
