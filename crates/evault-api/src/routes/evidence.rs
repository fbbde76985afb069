//! # Evidence API
//!
//! Evidence intake, the chain-of-custody ledger (append, decide, history),
//! the ledger replay report, and content integrity verification.
//!
//! Action and category names cross the wire as their canonical spellings
//! and are parsed during validation; whether an action is *legal* for the
//! item's current status stays with the custody state machine, which turns
//! refusals into 409s.

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use evault_core::{CaseId, ContentDigest, EntryId, UserId, ValidationError};
use evault_custody::{
    ApprovalDecision, CustodyAction, CustodyEntry, CustodyStatus, EvidenceCategory,
    EvidenceRecord, NewCustodyEntry, Purpose, SeizureRequest,
};

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::routes::PaginationParams;
use crate::service::{self, IntegrityReport, LedgerReport};
use crate::state::AppState;

/// Request to register a seized or collected item.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterEvidenceRequest {
    /// The owning case.
    pub case_id: Uuid,
    /// DIGITAL or PHYSICAL.
    pub category: String,
    /// Intake action: SEIZED or COLLECTED.
    pub action: String,
    /// The custodian taking the item into the vault.
    pub custodian: Uuid,
    /// Where the item is stored.
    pub storage_location: String,
    /// Why the item was taken.
    pub purpose: String,
    /// SHA-256 digest of the item's content, 64 hex characters. Expected
    /// for digital items; without it the item cannot be integrity-checked.
    pub content_hash: Option<String>,
    /// Retention schedule label, if assigned at intake.
    pub retention_label: Option<String>,
}

impl Validate for RegisterEvidenceRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if EvidenceCategory::from_name(&self.category).is_none() {
            return Err(ValidationError::new(
                "category",
                format!(
                    "invalid category '{}'. Valid categories: DIGITAL, PHYSICAL",
                    self.category
                ),
            ));
        }
        match CustodyAction::from_name(&self.action) {
            None => {
                return Err(ValidationError::new(
                    "action",
                    format!("invalid action '{}'", self.action),
                ))
            }
            Some(action) if !action.is_intake() => {
                return Err(ValidationError::new(
                    "action",
                    format!(
                        "'{}' is not an intake action. Valid intake actions: SEIZED, COLLECTED",
                        self.action
                    ),
                ));
            }
            Some(_) => {}
        }
        if self.storage_location.trim().is_empty() {
            return Err(ValidationError::new("storage_location", "must not be empty"));
        }
        if self.storage_location.len() > 255 {
            return Err(ValidationError::new(
                "storage_location",
                "must not exceed 255 characters",
            ));
        }
        Purpose::new(&self.purpose)?;
        if let Some(ref hex) = self.content_hash {
            ContentDigest::from_hex(hex)
                .map_err(|e| ValidationError::new("content_hash", e.to_string()))?;
        }
        Ok(())
    }
}

/// Request to append a custody entry to an item's ledger.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AppendCustodyRequest {
    /// The custody action, canonical spelling (TRANSFERRED, CHECKOUT, ...).
    pub action: String,
    /// The custodian receiving the item.
    pub custodian_to: Uuid,
    /// Where the item is going, if it moves.
    pub location_to: Option<String>,
    /// Why the action is being taken.
    pub purpose: String,
    /// Opaque reference to a captured digital signature.
    pub signature_ref: Option<String>,
    /// Whether the entry must wait for supervisor approval.
    #[serde(default)]
    pub requires_approval: bool,
}

impl Validate for AppendCustodyRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if CustodyAction::from_name(&self.action).is_none() {
            return Err(ValidationError::new(
                "action",
                format!("invalid action '{}'", self.action),
            ));
        }
        Purpose::new(&self.purpose)?;
        if let Some(ref location) = self.location_to {
            if location.len() > 255 {
                return Err(ValidationError::new(
                    "location_to",
                    "must not exceed 255 characters",
                ));
            }
        }
        Ok(())
    }
}

/// A supervisor's decision on a pending custody entry.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CustodyDecisionRequest {
    /// APPROVE or REJECT.
    pub decision: String,
}

impl Validate for CustodyDecisionRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if ApprovalDecision::from_name(&self.decision).is_none() {
            return Err(ValidationError::new(
                "decision",
                format!(
                    "invalid decision '{}'. Valid decisions: APPROVE, REJECT",
                    self.decision
                ),
            ));
        }
        Ok(())
    }
}

/// Query parameters for listing evidence.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ListEvidenceParams {
    /// The case whose evidence to list.
    pub case_id: Option<Uuid>,
}

/// A committed custody entry plus the item's status after it took effect.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CustodyEntryResponse {
    /// The committed entry.
    #[schema(value_type = Object)]
    pub entry: CustodyEntry,
    /// The item's custody status after the commit.
    #[schema(value_type = String)]
    pub status: CustodyStatus,
}

/// Build the evidence router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/evidence", get(list_evidence).post(register_evidence))
        .route("/v1/evidence/:id", get(get_evidence))
        .route(
            "/v1/evidence/:id/custody",
            get(custody_history).post(append_custody),
        )
        .route(
            "/v1/evidence/:id/custody/:entry_id/decision",
            post(decide_custody),
        )
        .route("/v1/evidence/:id/ledger", get(ledger_report))
        .route("/v1/evidence/:id/integrity/verify", post(verify_integrity))
}

/// POST /v1/evidence — Register a seized or collected item.
///
/// The item starts IN_VAULT with its intake entry already committed. The
/// recording actor is always the authenticated caller.
#[utoipa::path(
    post,
    path = "/v1/evidence",
    request_body = RegisterEvidenceRequest,
    responses(
        (status = 201, description = "Evidence registered", body = Object),
        (status = 403, description = "Access denied", body = crate::error::ErrorBody),
        (status = 404, description = "Case not found", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid request", body = crate::error::ErrorBody),
    ),
    tag = "evidence"
)]
pub(crate) async fn register_evidence(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<RegisterEvidenceRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<EvidenceRecord>), AppError> {
    let req = extract_validated_json(body)?;

    let category = EvidenceCategory::from_name(&req.category)
        .ok_or_else(|| AppError::Validation(format!("invalid category '{}'", req.category)))?;
    let action = CustodyAction::from_name(&req.action)
        .ok_or_else(|| AppError::Validation(format!("invalid action '{}'", req.action)))?;
    let purpose = Purpose::new(&req.purpose)?;
    let content_hash = match req.content_hash {
        Some(ref hex) => Some(
            ContentDigest::from_hex(hex)
                .map_err(|e| AppError::Validation(format!("invalid content_hash: {e}")))?,
        ),
        None => None,
    };

    let custodian = UserId::from_uuid(req.custodian);
    let record = service::register_evidence(
        &state,
        caller,
        SeizureRequest {
            case_id: CaseId::from_uuid(req.case_id),
            category,
            action,
            custodian,
            storage_location: req.storage_location,
            purpose,
            content_hash,
            retention_label: req.retention_label,
            // Overwritten with the caller identity by the service.
            recorded_by: custodian,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /v1/evidence?case_id= — List a case's evidence, gated on VIEW.
#[utoipa::path(
    get,
    path = "/v1/evidence",
    params(("case_id" = Uuid, Query, description = "Case whose evidence to list")),
    responses(
        (status = 200, description = "Evidence in registration order", body = Vec<Object>),
        (status = 400, description = "Missing case_id", body = crate::error::ErrorBody),
        (status = 403, description = "Access denied", body = crate::error::ErrorBody),
        (status = 404, description = "Case not found", body = crate::error::ErrorBody),
    ),
    tag = "evidence"
)]
pub(crate) async fn list_evidence(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Query(params): Query<ListEvidenceParams>,
) -> Result<Json<Vec<EvidenceRecord>>, AppError> {
    let case_id = params
        .case_id
        .ok_or_else(|| AppError::BadRequest("case_id query parameter is required".to_string()))?;
    let records = service::list_evidence_by_case(&state, caller, case_id)?;
    Ok(Json(records))
}

/// GET /v1/evidence/:id — Fetch one item, gated on VIEW of the owning case.
#[utoipa::path(
    get,
    path = "/v1/evidence/{id}",
    params(("id" = Uuid, Path, description = "Evidence ID")),
    responses(
        (status = 200, description = "Evidence found", body = Object),
        (status = 403, description = "Access denied", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "evidence"
)]
pub(crate) async fn get_evidence(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<EvidenceRecord>, AppError> {
    service::get_evidence(&state, caller, id).map(Json)
}

/// POST /v1/evidence/:id/custody — Append a custody entry.
///
/// Illegal transitions and stale writes surface as 409; the committed
/// entry comes back with the item's resulting status.
#[utoipa::path(
    post,
    path = "/v1/evidence/{id}/custody",
    params(("id" = Uuid, Path, description = "Evidence ID")),
    request_body = AppendCustodyRequest,
    responses(
        (status = 201, description = "Entry committed", body = CustodyEntryResponse),
        (status = 403, description = "Access denied", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "Illegal transition or concurrent update", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid request", body = crate::error::ErrorBody),
    ),
    tag = "evidence"
)]
pub(crate) async fn append_custody(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<AppendCustodyRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CustodyEntryResponse>), AppError> {
    let req = extract_validated_json(body)?;
    let action = CustodyAction::from_name(&req.action)
        .ok_or_else(|| AppError::Validation(format!("invalid action '{}'", req.action)))?;
    let purpose = Purpose::new(&req.purpose)?;

    let (entry, status) = service::append_custody_entry(
        &state,
        caller,
        id,
        NewCustodyEntry {
            action,
            actor: caller.user_id,
            custodian_to: UserId::from_uuid(req.custodian_to),
            location_to: req.location_to,
            purpose,
            signature_ref: req.signature_ref,
            requires_approval: req.requires_approval,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(CustodyEntryResponse { entry, status })))
}

/// GET /v1/evidence/:id/custody — The item's custody history, oldest first.
#[utoipa::path(
    get,
    path = "/v1/evidence/{id}/custody",
    params(
        ("id" = Uuid, Path, description = "Evidence ID"),
        ("limit" = Option<usize>, Query, description = "Max items to return (default 100, max 1000)"),
        ("offset" = Option<usize>, Query, description = "Items to skip (default 0)"),
    ),
    responses(
        (status = 200, description = "Custody entries in sequence order", body = Vec<Object>),
        (status = 403, description = "Access denied", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "evidence"
)]
pub(crate) async fn custody_history(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<Vec<CustodyEntry>>, AppError> {
    let entries = service::custody_history(&state, caller, id)?;
    let offset = pagination.effective_offset().min(entries.len());
    let limit = pagination.effective_limit();
    let page = entries.into_iter().skip(offset).take(limit).collect();
    Ok(Json(page))
}

/// POST /v1/evidence/:id/custody/:entry_id/decision — Decide a pending entry.
///
/// Supervisor only. Approving applies the entry's status change; rejecting
/// leaves the status untouched. Either way the entry is decided exactly
/// once; a second decision is a 409.
#[utoipa::path(
    post,
    path = "/v1/evidence/{id}/custody/{entry_id}/decision",
    params(
        ("id" = Uuid, Path, description = "Evidence ID"),
        ("entry_id" = Uuid, Path, description = "Custody entry ID"),
    ),
    request_body = CustodyDecisionRequest,
    responses(
        (status = 200, description = "Decision recorded", body = CustodyEntryResponse),
        (status = 403, description = "Access denied", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "Already decided or approval not required", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid request", body = crate::error::ErrorBody),
    ),
    tag = "evidence"
)]
pub(crate) async fn decide_custody(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((id, entry_id)): Path<(Uuid, Uuid)>,
    body: Result<Json<CustodyDecisionRequest>, JsonRejection>,
) -> Result<Json<CustodyEntryResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let decision = ApprovalDecision::from_name(&req.decision)
        .ok_or_else(|| AppError::Validation(format!("invalid decision '{}'", req.decision)))?;

    let (entry, status) =
        service::decide_custody_entry(&state, caller, id, EntryId::from_uuid(entry_id), decision)
            .await?;
    Ok(Json(CustodyEntryResponse { entry, status }))
}

/// GET /v1/evidence/:id/ledger — Replay the ledger and report consistency.
#[utoipa::path(
    get,
    path = "/v1/evidence/{id}/ledger",
    params(("id" = Uuid, Path, description = "Evidence ID")),
    responses(
        (status = 200, description = "Ledger replay report", body = LedgerReport),
        (status = 403, description = "Access denied", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "evidence"
)]
pub(crate) async fn ledger_report(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<LedgerReport>, AppError> {
    service::verify_custody_ledger(&state, caller, id).map(Json)
}

/// POST /v1/evidence/:id/integrity/verify — Verify content against the
/// stored digest.
///
/// The request body is the raw content bytes, not JSON. A mismatch is a
/// 200 with `verified: false`; an item that recorded no digest is a 409.
#[utoipa::path(
    post,
    path = "/v1/evidence/{id}/integrity/verify",
    params(("id" = Uuid, Path, description = "Evidence ID")),
    request_body(content = String, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Verification report", body = IntegrityReport),
        (status = 403, description = "Access denied", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "No stored digest", body = crate::error::ErrorBody),
    ),
    tag = "evidence"
)]
pub(crate) async fn verify_integrity(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<IntegrityReport>, AppError> {
    service::verify_evidence_integrity(&state, caller, id, &body).map(Json)
}
