//! # Case Assignments
//!
//! The membership records tying users to cases. Assignment is one of the
//! attributes the access gate consults at `RESTRICTED` and `CONFIDENTIAL`:
//! being on the case team grants visibility that the role alone does not.

use serde::{Deserialize, Serialize};

use evault_core::{CaseId, Timestamp, UserId};

/// The capacity in which a user is assigned to a case.
///
/// Any assignment role satisfies the gate's "assigned" check; the
/// distinction matters to workload reporting, not to authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentRole {
    /// The investigator running the case.
    Lead,
    /// Supporting investigator or analyst.
    Support,
    /// Prosecuting attorney attached for court proceedings.
    Prosecutor,
    /// External-agency liaison.
    Liaison,
}

impl AssignmentRole {
    /// Every assignment role.
    pub const ALL: [AssignmentRole; 4] = [
        AssignmentRole::Lead,
        AssignmentRole::Support,
        AssignmentRole::Prosecutor,
        AssignmentRole::Liaison,
    ];

    /// The canonical wire spelling of this assignment role.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentRole::Lead => "LEAD",
            AssignmentRole::Support => "SUPPORT",
            AssignmentRole::Prosecutor => "PROSECUTOR",
            AssignmentRole::Liaison => "LIAISON",
        }
    }

    /// Parse an assignment role from its canonical wire spelling.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "LEAD" => Some(AssignmentRole::Lead),
            "SUPPORT" => Some(AssignmentRole::Support),
            "PROSECUTOR" => Some(AssignmentRole::Prosecutor),
            "LIAISON" => Some(AssignmentRole::Liaison),
            _ => None,
        }
    }
}

impl std::fmt::Display for AssignmentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One user's assignment to one case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseAssignment {
    /// The case.
    pub case_id: CaseId,
    /// The assigned user.
    pub user_id: UserId,
    /// The capacity of the assignment.
    pub role: AssignmentRole,
    /// When the assignment was made.
    pub assigned_at: Timestamp,
}

impl CaseAssignment {
    /// Assign a user to a case now.
    pub fn new(case_id: CaseId, user_id: UserId, role: AssignmentRole) -> Self {
        Self {
            case_id,
            user_id,
            role,
            assigned_at: Timestamp::now(),
        }
    }
}
