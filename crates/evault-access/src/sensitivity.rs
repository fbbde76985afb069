//! # Case Sensitivity Classification
//!
//! A case's sensitivity level, its typed allow-lists, and the audit fields
//! recording who classified it. The classification struct keeps its fields
//! private: [`SensitivityClassification::reclassify`] is the only write
//! path, so `is_sensitive` can never be stored inconsistently with the
//! level, and no collaborator can flip a level without the supervisory
//! capability check.
//!
//! Persistence goes through the narrow [`StoredSensitivity`] adapter. The
//! classification itself is deliberately not `Serialize`: handing the raw
//! struct to serde would reopen the side door this module exists to close.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use evault_core::{Role, Timestamp, UserId, ValidationError};

use crate::error::AccessError;

/// Maximum length of a classification reason.
const REASON_MAX_CHARS: usize = 1000;

/// A case's sensitivity level, gating visibility.
///
/// Wire spellings are exact: allow-list documents and audit rows depend on
/// the literal strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SensitivityLevel {
    /// Baseline: visible to any authenticated user.
    Normal,
    /// Visible to supervisors and the case's own team.
    Restricted,
    /// Visible to supervisors, the team, and the explicit allow-lists.
    Confidential,
    /// Visible only to explicitly allowed users. Roles never suffice.
    TopSecret,
}

impl SensitivityLevel {
    /// Every level, in ascending restriction order.
    pub const ALL: [SensitivityLevel; 4] = [
        SensitivityLevel::Normal,
        SensitivityLevel::Restricted,
        SensitivityLevel::Confidential,
        SensitivityLevel::TopSecret,
    ];

    /// The canonical wire spelling of this level.
    pub fn as_str(&self) -> &'static str {
        match self {
            SensitivityLevel::Normal => "NORMAL",
            SensitivityLevel::Restricted => "RESTRICTED",
            SensitivityLevel::Confidential => "CONFIDENTIAL",
            SensitivityLevel::TopSecret => "TOP_SECRET",
        }
    }

    /// Parse a level from its canonical wire spelling.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "NORMAL" => Some(SensitivityLevel::Normal),
            "RESTRICTED" => Some(SensitivityLevel::Restricted),
            "CONFIDENTIAL" => Some(SensitivityLevel::Confidential),
            "TOP_SECRET" => Some(SensitivityLevel::TopSecret),
            _ => None,
        }
    }
}

impl std::fmt::Display for SensitivityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The typed allow-lists granting access above a case's role-based default.
///
/// `BTreeSet` keeps membership checks cheap and the persisted order
/// deterministic, so two writes of the same restriction set produce the
/// same stored document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRestrictions {
    /// Users granted access by identifier.
    pub allowed_users: BTreeSet<UserId>,
    /// Roles granted access wholesale. Ignored at `TOP_SECRET`.
    pub allowed_roles: BTreeSet<Role>,
}

impl AccessRestrictions {
    /// An empty restriction set: nobody is allow-listed.
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether the user appears in the user allow-list.
    pub fn allows_user(&self, user_id: UserId) -> bool {
        self.allowed_users.contains(&user_id)
    }

    /// Whether the role appears in the role allow-list.
    pub fn allows_role(&self, role: Role) -> bool {
        self.allowed_roles.contains(&role)
    }
}

/// A case's sensitivity classification with its audit trail fields.
///
/// Fields are private; [`reclassify`](Self::reclassify) is the only
/// mutation path and it enforces the supervisory capability itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensitivityClassification {
    level: SensitivityLevel,
    restrictions: AccessRestrictions,
    reason: Option<String>,
    marked_by: Option<UserId>,
    marked_at: Option<Timestamp>,
}

impl Default for SensitivityClassification {
    fn default() -> Self {
        Self::normal()
    }
}

impl SensitivityClassification {
    /// The classification every new case starts with: `NORMAL`, no
    /// restrictions, no audit fields.
    pub fn normal() -> Self {
        Self {
            level: SensitivityLevel::Normal,
            restrictions: AccessRestrictions::none(),
            reason: None,
            marked_by: None,
            marked_at: None,
        }
    }

    /// The current sensitivity level.
    pub fn level(&self) -> SensitivityLevel {
        self.level
    }

    /// The current allow-lists.
    pub fn restrictions(&self) -> &AccessRestrictions {
        &self.restrictions
    }

    /// Why the case was classified, as recorded at the last change.
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Who last changed the classification.
    pub fn marked_by(&self) -> Option<UserId> {
        self.marked_by
    }

    /// When the classification last changed.
    pub fn marked_at(&self) -> Option<Timestamp> {
        self.marked_at
    }

    /// Whether the case is classified above baseline. Computed from the
    /// level, never stored separately.
    pub fn is_sensitive(&self) -> bool {
        self.level != SensitivityLevel::Normal
    }

    /// Change the classification. Supervisory capability required.
    ///
    /// Sets the level, allow-lists, reason, and audit fields atomically.
    /// Reclassifying to `NORMAL` clears the restrictions along with the
    /// level but keeps the audit fields: downgrading a case is itself a
    /// recorded act.
    pub fn reclassify(
        &mut self,
        level: SensitivityLevel,
        reason: impl Into<String>,
        restrictions: AccessRestrictions,
        actor: UserId,
        actor_role: Role,
    ) -> Result<(), AccessError> {
        if !actor_role.is_supervisory() {
            return Err(AccessError::Forbidden {
                reason: format!("role {actor_role} cannot classify case sensitivity"),
            });
        }
        let reason = reason.into();
        let trimmed = reason.trim();
        if trimmed.is_empty() {
            return Err(AccessError::Validation(ValidationError::new(
                "reason",
                "classification reason must not be empty",
            )));
        }
        if trimmed.chars().count() > REASON_MAX_CHARS {
            return Err(AccessError::Validation(ValidationError::new(
                "reason",
                format!("classification reason exceeds {REASON_MAX_CHARS} characters"),
            )));
        }

        self.level = level;
        self.restrictions = if level == SensitivityLevel::Normal {
            AccessRestrictions::none()
        } else {
            restrictions
        };
        self.reason = Some(trimmed.to_string());
        self.marked_by = Some(actor);
        self.marked_at = Some(Timestamp::now());
        Ok(())
    }

    /// Reassemble a classification from its stored shape.
    ///
    /// The persistence boundary is trusted as-recorded; no capability check
    /// re-runs here.
    pub fn from_stored(stored: StoredSensitivity) -> Self {
        Self {
            level: stored.level,
            restrictions: stored.restrictions,
            reason: stored.reason,
            marked_by: stored.marked_by,
            marked_at: stored.marked_at,
        }
    }

    /// Snapshot the classification for persistence.
    pub fn to_stored(&self) -> StoredSensitivity {
        StoredSensitivity {
            level: self.level,
            restrictions: self.restrictions.clone(),
            reason: self.reason.clone(),
            marked_by: self.marked_by,
            marked_at: self.marked_at,
        }
    }
}

/// The stored shape of a sensitivity classification.
///
/// Exists solely for the persistence boundary; everything else works with
/// [`SensitivityClassification`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSensitivity {
    /// The sensitivity level.
    pub level: SensitivityLevel,
    /// The allow-lists.
    #[serde(default)]
    pub restrictions: AccessRestrictions,
    /// Why the case was classified.
    #[serde(default)]
    pub reason: Option<String>,
    /// Who last changed the classification.
    #[serde(default)]
    pub marked_by: Option<UserId>,
    /// When the classification last changed.
    #[serde(default)]
    pub marked_at: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
