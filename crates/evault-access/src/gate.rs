//! # Access Gate
//!
//! The single authorization entry point. Every case operation and every
//! custody operation on a case's evidence asks this gate; no handler
//! re-checks `role == ADMIN` on its own.
//!
//! ## Decision Order
//!
//! [`can_access`] evaluates in a fixed priority order, first match wins:
//!
//! 1. `ADMIN` / `SUPER_ADMIN` → allow (the only bypass, centralized here).
//! 2. `NORMAL` case → allow any authenticated user.
//! 3. `RESTRICTED` → `SUPERVISOR`, or the case's lead investigator,
//!    creator, or an assigned user.
//! 4. `CONFIDENTIAL` → `SUPERVISOR`, or allow-listed user, or allow-listed
//!    role, or the step-3 team check.
//! 5. `TOP_SECRET` → allow-listed user **only**. Supervisor rank and role
//!    allow-lists do not reach this level.
//!
//! The function is pure and total: every role × level combination is
//! decided, and anything unmapped denies. Fail closed, never open.
//!
//! ## Listing
//!
//! Paginated case listings must not call the gate once per row. A
//! [`CaseAccessFilter`] derived from the subject expresses the same
//! decision declaratively: the store-backed path evaluates it in memory
//! per candidate, and the database layer renders it as a single `WHERE`
//! clause so listing N cases costs one query.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use evault_core::{Role, UserId};

use crate::sensitivity::{SensitivityClassification, SensitivityLevel};

/// The operation a caller is about to perform on a case.
///
/// The gate decides identically for all three; the action is part of the
/// contract so call sites declare intent and audit events can record what
/// was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseAction {
    /// Read the case or its evidence.
    View,
    /// Mutate the case or append to its evidence ledgers.
    Edit,
    /// Delete the case.
    Delete,
}

impl CaseAction {
    /// Every case action.
    pub const ALL: [CaseAction; 3] = [CaseAction::View, CaseAction::Edit, CaseAction::Delete];

    /// The canonical wire spelling of this action.
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseAction::View => "VIEW",
            CaseAction::Edit => "EDIT",
            CaseAction::Delete => "DELETE",
        }
    }

    /// Parse an action from its canonical wire spelling.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "VIEW" => Some(CaseAction::View),
            "EDIT" => Some(CaseAction::Edit),
            "DELETE" => Some(CaseAction::Delete),
            _ => None,
        }
    }
}

impl std::fmt::Display for CaseAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The requesting user's attributes, as issued by the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessSubject {
    /// The user.
    pub user_id: UserId,
    /// The user's directory role.
    pub role: Role,
}

impl AccessSubject {
    /// Build a subject.
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }
}

/// The case attributes the gate consumes.
///
/// A projection, not the case itself: the gate never sees case content,
/// only the classification and the membership attributes the decision
/// needs.
#[derive(Debug, Clone)]
pub struct CaseAccessView {
    /// The case's sensitivity classification.
    pub sensitivity: SensitivityClassification,
    /// Who created the case.
    pub created_by: UserId,
    /// The lead investigator, if one is set.
    pub lead_investigator: Option<UserId>,
    /// Users assigned to the case, in any capacity.
    pub assigned_users: BTreeSet<UserId>,
}

impl CaseAccessView {
    /// The step-3 membership check: lead investigator, creator, or
    /// assigned.
    pub fn is_team_member(&self, user_id: UserId) -> bool {
        self.lead_investigator == Some(user_id)
            || self.created_by == user_id
            || self.assigned_users.contains(&user_id)
    }
}

/// Decide whether `subject` may perform `action` on the case.
///
/// Pure and total. Evaluated in the priority order documented on the
/// module; every unmapped combination denies.
pub fn can_access(subject: &AccessSubject, case: &CaseAccessView, action: CaseAction) -> bool {
    // Step 1: administrator bypass. The single place it exists.
    if subject.role.is_admin_tier() {
        return true;
    }

    // Steps 2-5 decide identically for every action today; this match is
    // the compile-time reminder to revisit the decision if one is added.
    match action {
        CaseAction::View | CaseAction::Edit | CaseAction::Delete => {}
    }

    match case.sensitivity.level() {
        // Step 2: baseline cases are visible to any authenticated user.
        SensitivityLevel::Normal => true,

        // Step 3: supervisors and the case's own team.
        SensitivityLevel::Restricted => {
            subject.role == Role::Supervisor || case.is_team_member(subject.user_id)
        }

        // Step 4: step 3 plus the explicit allow-lists.
        SensitivityLevel::Confidential => {
            subject.role == Role::Supervisor
                || case.sensitivity.restrictions().allows_user(subject.user_id)
                || case.sensitivity.restrictions().allows_role(subject.role)
                || case.is_team_member(subject.user_id)
        }

        // Step 5: the user allow-list and nothing else. Supervisor rank,
        // role allow-lists, and assignment do not reach TOP_SECRET.
        SensitivityLevel::TopSecret => {
            case.sensitivity.restrictions().allows_user(subject.user_id)
        }
    }
}

/// The declarative listing predicate derived from one subject.
///
/// Carries the subject's visibility clauses as data so the database layer
/// can render them into one `WHERE` clause. Equivalent to calling
/// [`can_access`] with [`CaseAction::View`] on every candidate — the
/// `filter_matches_gate` tests pin that equivalence.
#[derive(Debug, Clone)]
pub enum CaseAccessFilter {
    /// Administrator tier: every case is listed, no predicate at all.
    Unrestricted,
    /// Everyone else: the disjunction of the subject's clauses.
    Scoped(ScopedClauses),
}

/// The clause set for a non-administrator subject. A case is listed when
/// any clause holds.
#[derive(Debug, Clone)]
pub struct ScopedClauses {
    /// The subject the clauses were derived from.
    pub user_id: UserId,
    /// The subject's directory role.
    pub role: Role,
    /// Levels visible to this subject wholesale, with no per-case check:
    /// always `NORMAL`; supervisors add `RESTRICTED` and `CONFIDENTIAL`.
    pub plain_levels: BTreeSet<SensitivityLevel>,
    /// Levels where lead/creator/assignment membership grants access.
    pub team_levels: BTreeSet<SensitivityLevel>,
    /// Levels where user allow-list membership grants access.
    pub allow_user_levels: BTreeSet<SensitivityLevel>,
    /// Levels where role allow-list membership grants access.
    pub allow_role_levels: BTreeSet<SensitivityLevel>,
}

impl CaseAccessFilter {
    /// Derive the listing predicate for a subject.
    pub fn for_subject(subject: &AccessSubject) -> Self {
        if subject.role.is_admin_tier() {
            return CaseAccessFilter::Unrestricted;
        }

        let mut plain_levels = BTreeSet::from([SensitivityLevel::Normal]);
        if subject.role == Role::Supervisor {
            plain_levels.insert(SensitivityLevel::Restricted);
            plain_levels.insert(SensitivityLevel::Confidential);
        }

        CaseAccessFilter::Scoped(ScopedClauses {
            user_id: subject.user_id,
            role: subject.role,
            plain_levels,
            team_levels: BTreeSet::from([
                SensitivityLevel::Restricted,
                SensitivityLevel::Confidential,
            ]),
            allow_user_levels: BTreeSet::from([
                SensitivityLevel::Confidential,
                SensitivityLevel::TopSecret,
            ]),
            allow_role_levels: BTreeSet::from([SensitivityLevel::Confidential]),
        })
    }

    /// Evaluate the predicate against one case, for the store-backed
    /// listing path.
    pub fn matches(&self, case: &CaseAccessView) -> bool {
        match self {
            CaseAccessFilter::Unrestricted => true,
            CaseAccessFilter::Scoped(clauses) => clauses.matches(case),
        }
    }
}

impl ScopedClauses {
    /// Evaluate the clause disjunction against one case.
    pub fn matches(&self, case: &CaseAccessView) -> bool {
        let level = case.sensitivity.level();
        if self.plain_levels.contains(&level) {
            return true;
        }
        if self.team_levels.contains(&level) && case.is_team_member(self.user_id) {
            return true;
        }
        if self.allow_user_levels.contains(&level)
            && case.sensitivity.restrictions().allows_user(self.user_id)
        {
            return true;
        }
        if self.allow_role_levels.contains(&level)
            && case.sensitivity.restrictions().allows_role(self.role)
        {
            return true;
        }
        false
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
