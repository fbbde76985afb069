//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Evidence Vault API",
        version = "0.3.7",
        description = "Evidentiary integrity and access control: evidence registration, append-only chain-of-custody ledger, sensitivity-based case access, content integrity verification, and the tamper-evident audit trail.",
        license(name = "BUSL-1.1")
    ),
    paths(
        // Cases
        crate::routes::cases::create_case,
        crate::routes::cases::list_cases,
        crate::routes::cases::get_case,
        crate::routes::cases::set_sensitivity,
        crate::routes::cases::add_assignment,
        crate::routes::cases::remove_assignment,
        // Evidence
        crate::routes::evidence::register_evidence,
        crate::routes::evidence::list_evidence,
        crate::routes::evidence::get_evidence,
        crate::routes::evidence::append_custody,
        crate::routes::evidence::custody_history,
        crate::routes::evidence::decide_custody,
        crate::routes::evidence::ledger_report,
        crate::routes::evidence::verify_integrity,
        // Audit
        crate::routes::audit::list_events,
        crate::routes::audit::verify_chain,
    ),
    components(schemas(
        // State record types
        crate::state::CaseRecord,
        // Audit types
        crate::audit::AuditEvent,
        crate::audit::AuditOutcome,
        crate::audit::ChainIntegrityReport,
        // Report types
        crate::service::IntegrityReport,
        crate::service::LedgerReport,
        // Error types
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        // Case DTOs
        crate::routes::cases::CreateCaseRequest,
        crate::routes::cases::SetSensitivityRequest,
        crate::routes::cases::RestrictionsRequest,
        crate::routes::cases::AddAssignmentRequest,
        // Evidence DTOs
        crate::routes::evidence::RegisterEvidenceRequest,
        crate::routes::evidence::AppendCustodyRequest,
        crate::routes::evidence::CustodyDecisionRequest,
        crate::routes::evidence::CustodyEntryResponse,
        // Audit DTOs
        crate::routes::audit::AuditEventsResponse,
    )),
    tags(
        (name = "cases", description = "Case registration, sensitivity classification, and team assignment"),
        (name = "evidence", description = "Evidence intake, chain-of-custody ledger, and integrity verification"),
        (name = "audit", description = "Tamper-evident audit trail queries and chain verification"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
///
/// Serves the OpenAPI JSON spec at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
