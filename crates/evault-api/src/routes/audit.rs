//! # Audit API
//!
//! Read access to the tamper-evident audit trail: filtered event queries
//! and hash-chain verification. Both endpoints are restricted to auditors
//! and the supervisory tier; nothing here writes — events enter the trail
//! only through the operations that produce them.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::audit::{AuditEvent, AuditOutcome, AuditQuery, ChainIntegrityReport};
use crate::auth::{require_audit_access, CallerIdentity};
use crate::error::AppError;
use crate::routes::PaginationParams;
use crate::state::AppState;

/// Query parameters for the audit trail.
#[derive(Debug, Deserialize, Default, ToSchema)]
pub struct AuditEventsParams {
    /// Only events of this classification (e.g. `custody.entry_committed`).
    pub event_type: Option<String>,
    /// Only events on this kind of resource (`case`, `evidence`).
    pub resource_type: Option<String>,
    /// Only events on this resource.
    pub resource_id: Option<Uuid>,
    /// Only events with this outcome: SUCCESS or DENIED.
    pub outcome: Option<String>,
    /// Maximum number of events to return (default: 100, max: 1000).
    pub limit: Option<usize>,
    /// Number of events to skip (default: 0).
    pub offset: Option<usize>,
}

/// A page of audit events.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuditEventsResponse {
    /// Number of events in this page.
    pub count: usize,
    /// Total number of matching events (before pagination).
    pub total: usize,
    /// The events, oldest first.
    pub events: Vec<AuditEvent>,
}

/// Build the audit router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/audit/events", get(list_events))
        .route("/v1/audit/verify", get(verify_chain))
}

/// GET /v1/audit/events — Query the audit trail.
///
/// Requires AUDITOR or supervisory role. Filters combine with AND;
/// omitted filters match everything.
#[utoipa::path(
    get,
    path = "/v1/audit/events",
    params(
        ("event_type" = Option<String>, Query, description = "Event classification filter"),
        ("resource_type" = Option<String>, Query, description = "Resource kind filter"),
        ("resource_id" = Option<Uuid>, Query, description = "Resource id filter"),
        ("outcome" = Option<String>, Query, description = "SUCCESS or DENIED"),
        ("limit" = Option<usize>, Query, description = "Max events to return (default 100, max 1000)"),
        ("offset" = Option<usize>, Query, description = "Events to skip (default 0)"),
    ),
    responses(
        (status = 200, description = "Matching events, oldest first", body = AuditEventsResponse),
        (status = 403, description = "Access denied", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid filter", body = crate::error::ErrorBody),
    ),
    tag = "audit"
)]
pub(crate) async fn list_events(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Query(params): Query<AuditEventsParams>,
) -> Result<Json<AuditEventsResponse>, AppError> {
    require_audit_access(&caller)?;

    let outcome = match params.outcome {
        Some(ref name) => Some(AuditOutcome::from_name(name).ok_or_else(|| {
            AppError::Validation(format!(
                "invalid outcome '{name}'. Valid outcomes: SUCCESS, DENIED"
            ))
        })?),
        None => None,
    };

    let matching = state.audit.query(&AuditQuery {
        event_type: params.event_type,
        resource_type: params.resource_type,
        resource_id: params.resource_id,
        outcome,
    });

    let pagination = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    };
    let total = matching.len();
    let offset = pagination.effective_offset().min(total);
    let limit = pagination.effective_limit();
    let events: Vec<AuditEvent> = matching.into_iter().skip(offset).take(limit).collect();

    Ok(Json(AuditEventsResponse {
        count: events.len(),
        total,
        events,
    }))
}

/// GET /v1/audit/verify — Verify the audit hash chain.
///
/// Recomputes every link from genesis. Requires AUDITOR or supervisory
/// role.
#[utoipa::path(
    get,
    path = "/v1/audit/verify",
    responses(
        (status = 200, description = "Chain integrity report", body = ChainIntegrityReport),
        (status = 403, description = "Access denied", body = crate::error::ErrorBody),
    ),
    tag = "audit"
)]
pub(crate) async fn verify_chain(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<ChainIntegrityReport>, AppError> {
    require_audit_access(&caller)?;
    Ok(Json(state.audit.verify_chain()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::NewAuditEvent;
    use crate::auth::{auth_middleware, AuthConfig, SecretToken};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::middleware::from_fn;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn event(event_type: &str, outcome: AuditOutcome) -> NewAuditEvent {
        NewAuditEvent {
            event_type: event_type.to_string(),
            actor_id: None,
            actor_role: None,
            resource_type: "evidence".to_string(),
            resource_id: Uuid::new_v4(),
            action: "TRANSFERRED".to_string(),
            outcome,
            metadata: serde_json::Value::Null,
        }
    }

    fn test_app(state: AppState, secret: &str) -> Router {
        router()
            .with_state(state)
            .layer(from_fn(auth_middleware))
            .layer(axum::Extension(AuthConfig {
                token: Some(SecretToken::new(secret)),
            }))
    }

    async fn body_json<T: serde::de::DeserializeOwned>(resp: axum::response::Response) -> T {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get_as(uri: &str, auth: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("Authorization", auth)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn auditor_lists_events() {
        let state = AppState::new();
        state
            .audit
            .append(event("custody.entry_committed", AuditOutcome::Success));
        state
            .audit
            .append(event("custody.append_denied", AuditOutcome::Denied));

        let app = test_app(state, "s3cret");
        let auditor = format!("Bearer AUDITOR:{}:s3cret", Uuid::new_v4());

        let resp = app
            .oneshot(get_as("/v1/audit/events", &auditor))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let page: AuditEventsResponse = body_json(resp).await;
        assert_eq!(page.total, 2);
        assert_eq!(page.count, 2);
    }

    #[tokio::test]
    async fn officer_denied_list() {
        let app = test_app(AppState::new(), "s3cret");
        let officer = format!("Bearer OFFICER:{}:s3cret", Uuid::new_v4());

        let resp = app
            .oneshot(get_as("/v1/audit/events", &officer))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn outcome_filter_applies() {
        let state = AppState::new();
        state
            .audit
            .append(event("custody.entry_committed", AuditOutcome::Success));
        state
            .audit
            .append(event("custody.append_denied", AuditOutcome::Denied));

        let app = test_app(state, "s3cret");
        let supervisor = format!("Bearer SUPERVISOR:{}:s3cret", Uuid::new_v4());

        let resp = app
            .oneshot(get_as("/v1/audit/events?outcome=DENIED", &supervisor))
            .await
            .unwrap();
        let page: AuditEventsResponse = body_json(resp).await;
        assert_eq!(page.total, 1);
        assert_eq!(page.events[0].event_type, "custody.append_denied");
    }

    #[tokio::test]
    async fn unknown_outcome_returns_422() {
        let app = test_app(AppState::new(), "s3cret");
        let auditor = format!("Bearer AUDITOR:{}:s3cret", Uuid::new_v4());

        let resp = app
            .oneshot(get_as("/v1/audit/events?outcome=FAILED", &auditor))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn pagination_limits_page() {
        let state = AppState::new();
        for i in 0..5 {
            state
                .audit
                .append(event(&format!("event.{i}"), AuditOutcome::Success));
        }

        let app = test_app(state, "s3cret");
        let auditor = format!("Bearer AUDITOR:{}:s3cret", Uuid::new_v4());

        let resp = app
            .oneshot(get_as("/v1/audit/events?limit=2&offset=1", &auditor))
            .await
            .unwrap();
        let page: AuditEventsResponse = body_json(resp).await;
        assert_eq!(page.total, 5);
        assert_eq!(page.count, 2);
        assert_eq!(page.events[0].event_type, "event.1");
    }

    #[tokio::test]
    async fn verify_endpoint_reports_valid_chain() {
        let state = AppState::new();
        state
            .audit
            .append(event("case.created", AuditOutcome::Success));
        state
            .audit
            .append(event("evidence.registered", AuditOutcome::Success));

        let app = test_app(state, "s3cret");
        let supervisor = format!("Bearer SUPERVISOR:{}:s3cret", Uuid::new_v4());

        let resp = app
            .oneshot(get_as("/v1/audit/verify", &supervisor))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let report: ChainIntegrityReport = body_json(resp).await;
        assert!(report.chain_valid);
        assert_eq!(report.total_events, 2);
        assert_eq!(report.broken_links, 0);
    }

    #[tokio::test]
    async fn verify_denied_for_field_roles() {
        let app = test_app(AppState::new(), "s3cret");
        let analyst = format!("Bearer ANALYST:{}:s3cret", Uuid::new_v4());

        let resp = app
            .oneshot(get_as("/v1/audit/verify", &analyst))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
