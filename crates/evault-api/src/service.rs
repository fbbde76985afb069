//! # Vault Operations
//!
//! Orchestration for every case and evidence operation the API exposes.
//! Each function loads state, runs the access gate, commits through the
//! in-memory stores, writes through to Postgres when a pool is attached,
//! and appends to the audit trail. Route handlers stay thin: extract,
//! call one function here, wrap the response.
//!
//! Nothing in this module touches Axum types; the functions are callable
//! from tests (and any future non-HTTP surface) directly.
//!
//! ## Concurrency
//!
//! Custody mutations are compare-and-swap: each request captures the
//! custody status it validated against and commits through
//! [`Store::try_update`], which re-checks that status under the write
//! lock. The loser of a race gets `ConcurrentModification` and re-reads.
//! When Postgres is attached the committed entry is persisted in a
//! row-locked transaction guarded on the same expected status, so a
//! divergent database row is detected rather than silently overwritten.
//!
//! ## Audit taxonomy
//!
//! | event_type                 | resource | action            |
//! |----------------------------|----------|-------------------|
//! | `case.created`             | case     | `CREATE`          |
//! | `case.assignment_added`    | case     | `ASSIGN`          |
//! | `case.assignment_removed`  | case     | `UNASSIGN`        |
//! | `case.sensitivity_changed` | case     | new level         |
//! | `case.sensitivity_denied`  | case     | requested level   |
//! | `evidence.registered`      | evidence | intake action     |
//! | `evidence.register_denied` | case     | intake action     |
//! | `custody.appended`         | evidence | custody action    |
//! | `custody.append_denied`    | evidence | custody action    |
//! | `custody.decided`          | evidence | `APPROVE`/`REJECT`|
//! | `custody.decision_denied`  | evidence | `APPROVE`/`REJECT`|
//!
//! Denied attempts are recorded with outcome `DENIED` and the refusal
//! reason in metadata. Lookups that miss entirely (404s) are not audited —
//! there is no resource to attach them to.

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use utoipa::ToSchema;
use uuid::Uuid;

use evault_access::{
    can_access, AccessRestrictions, AssignmentRole, CaseAccessFilter, CaseAction, CaseAssignment,
    SensitivityClassification, SensitivityLevel,
};
use evault_core::{CaseId, EntryId, EvidenceId, Timestamp, UserId};
use evault_crypto::compute_digest;
use evault_custody::{
    ApprovalDecision, CustodyEntry, CustodyError, CustodyStatus, EvidenceItem, EvidenceRecord,
    HandoffGap, NewCustodyEntry, SeizureRequest,
};

use crate::audit::{AuditOutcome, NewAuditEvent};
use crate::auth::{require_supervisory, CallerIdentity};
use crate::db;
use crate::error::AppError;
use crate::state::{AppState, CaseRecord};

// -- Reports -------------------------------------------------------------------

/// Result of verifying uploaded content against an item's stored digest.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IntegrityReport {
    /// The verified item.
    #[schema(value_type = Uuid)]
    pub evidence_id: EvidenceId,
    /// The digest algorithm.
    pub algorithm: String,
    /// Whether the recomputed digest matches the stored one.
    pub verified: bool,
    /// The digest recorded at intake, lowercase hex.
    pub stored_digest: String,
    /// The digest of the bytes presented for verification, lowercase hex.
    pub computed_digest: String,
}

/// Result of replaying an item's custody ledger against its stored status.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LedgerReport {
    /// The checked item.
    #[schema(value_type = Uuid)]
    pub evidence_id: EvidenceId,
    /// The status stored on the item.
    #[schema(value_type = String)]
    pub recorded_status: CustodyStatus,
    /// The status derived by replaying approved entries in order.
    #[schema(value_type = String)]
    pub derived_status: CustodyStatus,
    /// Whether the two agree.
    pub consistent: bool,
    /// Total ledger entries, pending and decided included.
    pub entry_count: usize,
    /// Handoffs recorded by someone other than the holding custodian.
    /// Data-quality flags, not rejections.
    #[schema(value_type = Vec<Object>)]
    pub handoff_gaps: Vec<HandoffGap>,
}

// -- Shared helpers ------------------------------------------------------------

fn load_case(state: &AppState, case_id: Uuid) -> Result<CaseRecord, AppError> {
    state
        .cases
        .get(&case_id)
        .ok_or_else(|| AppError::NotFound(format!("case {case_id} not found")))
}

fn load_evidence(state: &AppState, evidence_id: Uuid) -> Result<EvidenceItem, AppError> {
    state.evidence.get(&evidence_id).ok_or_else(|| {
        CustodyError::EvidenceNotFound {
            evidence_id: EvidenceId::from_uuid(evidence_id),
        }
        .into()
    })
}

/// Run the access gate for one case, fail-closed.
fn authorize(caller: CallerIdentity, case: &CaseRecord, action: CaseAction) -> Result<(), AppError> {
    if can_access(&caller.subject(), &case.access_view(), action) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "access to case {} denied",
            case.id
        )))
    }
}

/// Append to the audit trail and write the committed event through.
///
/// Audit persistence failures are logged, never surfaced: the audited
/// operation itself already committed, and the in-memory chain holds the
/// event. The chain is re-persisted wholesale on the next hydration cycle.
async fn record_audit(state: &AppState, event: NewAuditEvent) {
    let committed = state.audit.append(event);
    if let Some(pool) = &state.db_pool {
        if let Err(e) = db::audit::insert(pool, &committed).await {
            tracing::error!(
                error = %e,
                event_id = %committed.id,
                event_type = %committed.event_type,
                "failed to persist audit event"
            );
        }
    }
}

fn caller_event(
    caller: CallerIdentity,
    event_type: &str,
    resource_type: &str,
    resource_id: Uuid,
    action: &str,
    outcome: AuditOutcome,
    metadata: serde_json::Value,
) -> NewAuditEvent {
    NewAuditEvent {
        event_type: event_type.to_string(),
        actor_id: Some(caller.user_id),
        actor_role: Some(caller.role),
        resource_type: resource_type.to_string(),
        resource_id,
        action: action.to_string(),
        outcome,
        metadata,
    }
}

// -- Case operations -----------------------------------------------------------

/// Parameters for registering a case with the vault.
#[derive(Debug, Clone)]
pub struct NewCase {
    /// Human-facing case number.
    pub case_number: String,
    /// Short case title.
    pub title: String,
    /// The lead investigator, if already known.
    pub lead_investigator: Option<UserId>,
}

/// Register a case. Any authenticated caller may open one; it starts at
/// `NORMAL` sensitivity with no assignments.
pub async fn create_case(
    state: &AppState,
    caller: CallerIdentity,
    request: NewCase,
) -> Result<CaseRecord, AppError> {
    let now = Timestamp::now();
    let record = CaseRecord {
        id: CaseId::new(),
        case_number: request.case_number,
        title: request.title,
        created_by: caller.user_id,
        lead_investigator: request.lead_investigator,
        assignments: Vec::new(),
        sensitivity: SensitivityClassification::normal().to_stored(),
        created_at: now,
        updated_at: now,
    };
    let case_uuid = *record.id.as_uuid();
    state.cases.insert(case_uuid, record.clone());

    if let Some(pool) = &state.db_pool {
        if let Err(e) = db::cases::insert(pool, &record).await {
            tracing::error!(error = %e, case_id = %record.id, "failed to persist case");
            return Err(AppError::Internal(format!(
                "case recorded in memory but failed to persist: {e}"
            )));
        }
    }

    record_audit(
        state,
        caller_event(
            caller,
            "case.created",
            "case",
            case_uuid,
            "CREATE",
            AuditOutcome::Success,
            serde_json::json!({ "case_number": record.case_number }),
        ),
    )
    .await;

    Ok(record)
}

/// Fetch one case, gated on `VIEW`.
pub fn get_case(
    state: &AppState,
    caller: CallerIdentity,
    case_id: Uuid,
) -> Result<CaseRecord, AppError> {
    let case = load_case(state, case_id)?;
    authorize(caller, &case, CaseAction::View)?;
    Ok(case)
}

/// List the cases visible to the caller, newest first.
///
/// The visibility predicate is derived once from the caller
/// ([`CaseAccessFilter`]) and applied to every candidate — against the
/// store in memory-only mode, or rendered into a single `WHERE` clause
/// when Postgres is attached. Listing never evaluates the gate per row.
pub async fn list_cases(
    state: &AppState,
    caller: CallerIdentity,
    limit: i64,
    offset: i64,
) -> Result<Vec<CaseRecord>, AppError> {
    let filter = CaseAccessFilter::for_subject(&caller.subject());

    if let Some(pool) = &state.db_pool {
        return db::cases::list_visible(pool, &filter, limit, offset)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "case listing query failed");
                AppError::Internal("case listing query failed".to_string())
            });
    }

    let mut visible: Vec<CaseRecord> = state
        .cases
        .list()
        .into_iter()
        .filter(|case| filter.matches(&case.access_view()))
        .collect();
    visible.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(visible
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect())
}

/// Reclassify a case's sensitivity, gated on `EDIT` plus supervisory
/// capability. Both the change and any denial are audited.
pub async fn set_case_sensitivity(
    state: &AppState,
    caller: CallerIdentity,
    case_id: Uuid,
    level: SensitivityLevel,
    reason: String,
    restrictions: AccessRestrictions,
) -> Result<CaseRecord, AppError> {
    let case = load_case(state, case_id)?;

    if let Err(denied) = authorize(caller, &case, CaseAction::Edit) {
        record_audit(
            state,
            caller_event(
                caller,
                "case.sensitivity_denied",
                "case",
                case_id,
                level.as_str(),
                AuditOutcome::Denied,
                serde_json::json!({ "reason": "case access denied" }),
            ),
        )
        .await;
        return Err(denied);
    }

    // The capability check lives inside `reclassify`; run it atomically
    // with the write so racing reclassifications serialize cleanly.
    let outcome = state
        .cases
        .try_update(&case_id, |case| {
            let mut classification =
                SensitivityClassification::from_stored(case.sensitivity.clone());
            classification.reclassify(
                level,
                &reason,
                restrictions.clone(),
                caller.user_id,
                caller.role,
            )?;
            case.sensitivity = classification.to_stored();
            case.updated_at = Timestamp::now();
            Ok(case.clone())
        })
        .ok_or_else(|| AppError::NotFound(format!("case {case_id} not found")))?;

    let updated = match outcome {
        Ok(updated) => updated,
        Err(err) => {
            if matches!(err, evault_access::AccessError::Forbidden { .. }) {
                record_audit(
                    state,
                    caller_event(
                        caller,
                        "case.sensitivity_denied",
                        "case",
                        case_id,
                        level.as_str(),
                        AuditOutcome::Denied,
                        serde_json::json!({ "reason": err.to_string() }),
                    ),
                )
                .await;
            }
            return Err(err.into());
        }
    };

    if let Some(pool) = &state.db_pool {
        if let Err(e) =
            db::cases::update_sensitivity(pool, case_id, &updated.sensitivity, updated.updated_at)
                .await
        {
            tracing::error!(error = %e, case_id = %case_id, "failed to persist sensitivity change");
            return Err(AppError::Internal(format!(
                "sensitivity changed in memory but failed to persist: {e}"
            )));
        }
    }

    record_audit(
        state,
        caller_event(
            caller,
            "case.sensitivity_changed",
            "case",
            case_id,
            level.as_str(),
            AuditOutcome::Success,
            serde_json::json!({ "reason": reason }),
        ),
    )
    .await;

    Ok(updated)
}

/// Assign a user to a case, gated on `EDIT` plus supervisory capability.
pub async fn add_assignment(
    state: &AppState,
    caller: CallerIdentity,
    case_id: Uuid,
    user_id: UserId,
    role: AssignmentRole,
) -> Result<CaseRecord, AppError> {
    let case = load_case(state, case_id)?;
    authorize(caller, &case, CaseAction::Edit)?;
    require_supervisory(&caller)?;

    let assignment = CaseAssignment::new(CaseId::from_uuid(case_id), user_id, role);
    let outcome = state
        .cases
        .try_update(&case_id, |case| {
            if case.is_assigned(user_id) {
                return Err(AppError::Conflict(format!(
                    "user {user_id} is already assigned to case {case_id}"
                )));
            }
            case.assignments.push(assignment.clone());
            case.updated_at = Timestamp::now();
            Ok(case.clone())
        })
        .ok_or_else(|| AppError::NotFound(format!("case {case_id} not found")))?;
    let updated = outcome?;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = db::cases::insert_assignment(pool, &assignment, updated.updated_at).await {
            tracing::error!(error = %e, case_id = %case_id, "failed to persist assignment");
            return Err(AppError::Internal(format!(
                "assignment recorded in memory but failed to persist: {e}"
            )));
        }
    }

    record_audit(
        state,
        caller_event(
            caller,
            "case.assignment_added",
            "case",
            case_id,
            "ASSIGN",
            AuditOutcome::Success,
            serde_json::json!({ "user_id": user_id, "role": role.as_str() }),
        ),
    )
    .await;

    Ok(updated)
}

/// Remove a user's assignment, gated on `EDIT` plus supervisory capability.
pub async fn remove_assignment(
    state: &AppState,
    caller: CallerIdentity,
    case_id: Uuid,
    user_id: UserId,
) -> Result<CaseRecord, AppError> {
    let case = load_case(state, case_id)?;
    authorize(caller, &case, CaseAction::Edit)?;
    require_supervisory(&caller)?;

    let outcome = state
        .cases
        .try_update(&case_id, |case| {
            if !case.is_assigned(user_id) {
                return Err(AppError::NotFound(format!(
                    "user {user_id} is not assigned to case {case_id}"
                )));
            }
            case.assignments.retain(|a| a.user_id != user_id);
            case.updated_at = Timestamp::now();
            Ok(case.clone())
        })
        .ok_or_else(|| AppError::NotFound(format!("case {case_id} not found")))?;
    let updated = outcome?;

    if let Some(pool) = &state.db_pool {
        if let Err(e) =
            db::cases::delete_assignment(pool, case_id, user_id, updated.updated_at).await
        {
            tracing::error!(error = %e, case_id = %case_id, "failed to persist assignment removal");
            return Err(AppError::Internal(format!(
                "assignment removed in memory but failed to persist: {e}"
            )));
        }
    }

    record_audit(
        state,
        caller_event(
            caller,
            "case.assignment_removed",
            "case",
            case_id,
            "UNASSIGN",
            AuditOutcome::Success,
            serde_json::json!({ "user_id": user_id }),
        ),
    )
    .await;

    Ok(updated)
}

// -- Evidence operations ---------------------------------------------------------

/// Register a seized or collected item, gated on `EDIT` of the owning case.
///
/// The item starts `IN_VAULT` with its intake entry committed; `recorded_by`
/// is bound to the caller regardless of what the request carried.
pub async fn register_evidence(
    state: &AppState,
    caller: CallerIdentity,
    mut request: SeizureRequest,
) -> Result<EvidenceRecord, AppError> {
    let case_uuid = *request.case_id.as_uuid();
    let case = load_case(state, case_uuid)?;

    if let Err(denied) = authorize(caller, &case, CaseAction::Edit) {
        record_audit(
            state,
            caller_event(
                caller,
                "evidence.register_denied",
                "case",
                case_uuid,
                request.action.as_str(),
                AuditOutcome::Denied,
                serde_json::json!({ "reason": "case access denied" }),
            ),
        )
        .await;
        return Err(denied);
    }

    request.recorded_by = caller.user_id;
    let item = EvidenceItem::seize(request)?;
    let record = item.to_record();
    state.evidence.insert(*item.id.as_uuid(), item);

    if let Some(pool) = &state.db_pool {
        if let Err(e) = db::evidence::insert(pool, &record).await {
            tracing::error!(error = %e, evidence_id = %record.id, "failed to persist evidence item");
            return Err(AppError::Internal(format!(
                "evidence registered in memory but failed to persist: {e}"
            )));
        }
    }

    record_audit(
        state,
        caller_event(
            caller,
            "evidence.registered",
            "evidence",
            *record.id.as_uuid(),
            record.entries[0].action.as_str(),
            AuditOutcome::Success,
            serde_json::json!({
                "case_id": record.case_id,
                "category": record.category.as_str(),
                "storage_location": record.storage_location,
            }),
        ),
    )
    .await;

    Ok(record)
}

/// Fetch one evidence item, gated on `VIEW` of the owning case.
pub fn get_evidence(
    state: &AppState,
    caller: CallerIdentity,
    evidence_id: Uuid,
) -> Result<EvidenceRecord, AppError> {
    let item = load_evidence(state, evidence_id)?;
    let case = load_case(state, *item.case_id.as_uuid())?;
    authorize(caller, &case, CaseAction::View)?;
    Ok(item.to_record())
}

/// List a case's evidence in registration order, gated on `VIEW`.
pub fn list_evidence_by_case(
    state: &AppState,
    caller: CallerIdentity,
    case_id: Uuid,
) -> Result<Vec<EvidenceRecord>, AppError> {
    let case = load_case(state, case_id)?;
    authorize(caller, &case, CaseAction::View)?;

    let mut records: Vec<EvidenceRecord> = state
        .evidence
        .list()
        .into_iter()
        .filter(|item| *item.case_id.as_uuid() == case_id)
        .map(|item| item.to_record())
        .collect();
    records.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    Ok(records)
}

/// Append a custody entry, gated on `EDIT` of the owning case.
///
/// Compare-and-swap: the commit re-validates the custody status the caller
/// saw; a racing writer that moved it first wins and this request gets
/// `ConcurrentModification`. Committed entries and refusals are audited.
pub async fn append_custody_entry(
    state: &AppState,
    caller: CallerIdentity,
    evidence_id: Uuid,
    mut request: NewCustodyEntry,
) -> Result<(CustodyEntry, CustodyStatus), AppError> {
    let item = load_evidence(state, evidence_id)?;
    let case = load_case(state, *item.case_id.as_uuid())?;

    if let Err(denied) = authorize(caller, &case, CaseAction::Edit) {
        record_audit(
            state,
            caller_event(
                caller,
                "custody.append_denied",
                "evidence",
                evidence_id,
                request.action.as_str(),
                AuditOutcome::Denied,
                serde_json::json!({ "reason": "case access denied" }),
            ),
        )
        .await;
        return Err(denied);
    }

    request.actor = caller.user_id;
    let expected = item.status();
    let action_name = request.action.as_str();

    let outcome = state
        .evidence
        .try_update(&evidence_id, |live| {
            if live.status() != expected {
                return Err(CustodyError::ConcurrentModification {
                    expected,
                    actual: live.status(),
                });
            }
            let entry = live.append(request.clone())?.clone();
            Ok((entry, live.status()))
        })
        .ok_or(CustodyError::EvidenceNotFound {
            evidence_id: item.id,
        })?;

    let (entry, new_status) = match outcome {
        Ok(committed) => committed,
        Err(err) => {
            record_audit(
                state,
                caller_event(
                    caller,
                    "custody.append_denied",
                    "evidence",
                    evidence_id,
                    action_name,
                    AuditOutcome::Denied,
                    serde_json::json!({ "reason": err.to_string() }),
                ),
            )
            .await;
            return Err(err.into());
        }
    };

    if let Some(pool) = &state.db_pool {
        persist_ledger_commit(
            pool,
            evidence_id,
            expected,
            &entry,
            new_status,
            entry.recorded_at,
            db::evidence::LedgerWrite::Append,
        )
        .await?;
    }

    record_audit(
        state,
        caller_event(
            caller,
            "custody.appended",
            "evidence",
            evidence_id,
            action_name,
            AuditOutcome::Success,
            serde_json::json!({
                "entry_id": entry.id,
                "seq": entry.seq,
                "custodian_to": entry.custodian_to,
                "requires_approval": entry.requires_approval,
                "status": new_status.as_str(),
            }),
        ),
    )
    .await;

    Ok((entry, new_status))
}

/// Decide a pending custody entry, gated on `EDIT` of the owning case.
/// Supervisory capability and the self-approval ban are enforced by the
/// ledger itself. Every decision and every refusal is audited.
pub async fn decide_custody_entry(
    state: &AppState,
    caller: CallerIdentity,
    evidence_id: Uuid,
    entry_id: EntryId,
    decision: ApprovalDecision,
) -> Result<(CustodyEntry, CustodyStatus), AppError> {
    let item = load_evidence(state, evidence_id)?;
    let case = load_case(state, *item.case_id.as_uuid())?;

    if let Err(denied) = authorize(caller, &case, CaseAction::Edit) {
        record_audit(
            state,
            caller_event(
                caller,
                "custody.decision_denied",
                "evidence",
                evidence_id,
                decision.as_str(),
                AuditOutcome::Denied,
                serde_json::json!({ "entry_id": entry_id, "reason": "case access denied" }),
            ),
        )
        .await;
        return Err(denied);
    }

    let expected = item.status();
    let outcome = state
        .evidence
        .try_update(&evidence_id, |live| {
            if live.status() != expected {
                return Err(CustodyError::ConcurrentModification {
                    expected,
                    actual: live.status(),
                });
            }
            let entry = live
                .decide(entry_id, decision, caller.user_id, caller.role)?
                .clone();
            Ok((entry, live.status()))
        })
        .ok_or(CustodyError::EvidenceNotFound {
            evidence_id: item.id,
        })?;

    let (entry, new_status) = match outcome {
        Ok(decided) => decided,
        Err(err) => {
            // A decision on an entry that doesn't exist is a plain 404,
            // not a denied attempt on a real entry.
            if !matches!(err, CustodyError::UnknownEntry { .. }) {
                record_audit(
                    state,
                    caller_event(
                        caller,
                        "custody.decision_denied",
                        "evidence",
                        evidence_id,
                        decision.as_str(),
                        AuditOutcome::Denied,
                        serde_json::json!({ "entry_id": entry_id, "reason": err.to_string() }),
                    ),
                )
                .await;
            }
            return Err(err.into());
        }
    };

    if let Some(pool) = &state.db_pool {
        let updated_at = entry.decided_at.unwrap_or(entry.recorded_at);
        persist_ledger_commit(
            pool,
            evidence_id,
            expected,
            &entry,
            new_status,
            updated_at,
            db::evidence::LedgerWrite::Decision,
        )
        .await?;
    }

    record_audit(
        state,
        caller_event(
            caller,
            "custody.decided",
            "evidence",
            evidence_id,
            decision.as_str(),
            AuditOutcome::Success,
            serde_json::json!({
                "entry_id": entry.id,
                "action": entry.action.as_str(),
                "status": new_status.as_str(),
            }),
        ),
    )
    .await;

    Ok((entry, new_status))
}

/// Write one committed ledger mutation through to Postgres.
///
/// The transaction row-locks the item and re-checks the expected status.
/// A mismatch means the database diverged from the in-memory ledger
/// (another writer outside this process); that is surfaced as an internal
/// error, never papered over with a blind overwrite.
async fn persist_ledger_commit(
    pool: &sqlx::PgPool,
    evidence_id: Uuid,
    expected: CustodyStatus,
    entry: &CustodyEntry,
    new_status: CustodyStatus,
    updated_at: Timestamp,
    write: db::evidence::LedgerWrite,
) -> Result<(), AppError> {
    match db::evidence::commit_entry(pool, evidence_id, expected, entry, new_status, updated_at, write)
        .await
    {
        Ok(db::evidence::LedgerCommit::Committed) => Ok(()),
        Ok(db::evidence::LedgerCommit::StatusMoved { actual }) => {
            tracing::error!(
                evidence_id = %evidence_id,
                expected = %expected,
                actual = %actual,
                "custody status in database diverged from in-memory ledger"
            );
            Err(AppError::Internal(
                "custody ledger diverged from database".to_string(),
            ))
        }
        Ok(db::evidence::LedgerCommit::MissingRow) => {
            tracing::error!(
                evidence_id = %evidence_id,
                "evidence row missing from database during ledger write"
            );
            Err(AppError::Internal(
                "custody ledger diverged from database".to_string(),
            ))
        }
        Err(e) => {
            tracing::error!(error = %e, evidence_id = %evidence_id, "failed to persist custody entry");
            Err(AppError::Internal(format!(
                "custody entry recorded in memory but failed to persist: {e}"
            )))
        }
    }
}

/// Full custody history for one item, oldest first, gated on `VIEW`.
pub fn custody_history(
    state: &AppState,
    caller: CallerIdentity,
    evidence_id: Uuid,
) -> Result<Vec<CustodyEntry>, AppError> {
    let item = load_evidence(state, evidence_id)?;
    let case = load_case(state, *item.case_id.as_uuid())?;
    authorize(caller, &case, CaseAction::View)?;
    Ok(item.entries().to_vec())
}

/// Verify presented content against an item's stored digest, gated on `VIEW`.
///
/// A mismatch is a result, not an error. An item with no recorded digest
/// cannot be verified and returns a conflict.
pub fn verify_evidence_integrity(
    state: &AppState,
    caller: CallerIdentity,
    evidence_id: Uuid,
    content: &[u8],
) -> Result<IntegrityReport, AppError> {
    let item = load_evidence(state, evidence_id)?;
    let case = load_case(state, *item.case_id.as_uuid())?;
    authorize(caller, &case, CaseAction::View)?;

    let stored = item.content_hash.ok_or_else(|| {
        AppError::Conflict(format!(
            "evidence item {} has no recorded content digest to verify against",
            item.id
        ))
    })?;

    let computed = compute_digest(content)?;
    let verified = bool::from(computed.bytes.ct_eq(&stored.bytes));

    Ok(IntegrityReport {
        evidence_id: item.id,
        algorithm: "SHA-256".to_string(),
        verified,
        stored_digest: stored.to_hex(),
        computed_digest: computed.to_hex(),
    })
}

/// Replay an item's ledger and compare against its stored status, gated
/// on `VIEW`.
pub fn verify_custody_ledger(
    state: &AppState,
    caller: CallerIdentity,
    evidence_id: Uuid,
) -> Result<LedgerReport, AppError> {
    let item = load_evidence(state, evidence_id)?;
    let case = load_case(state, *item.case_id.as_uuid())?;
    authorize(caller, &case, CaseAction::View)?;

    let recorded = item.status();
    let derived = item.replay_status();
    Ok(LedgerReport {
        evidence_id: item.id,
        recorded_status: recorded,
        derived_status: derived,
        consistent: item.verify_ledger(),
        entry_count: item.entries().len(),
        handoff_gaps: item.handoff_gaps(),
    })
}
