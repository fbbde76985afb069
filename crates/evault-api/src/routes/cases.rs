//! # Case API
//!
//! Case registration, gated fetch and listing, the sensitivity classifier,
//! and assignment management. Every handler resolves the caller through
//! [`CallerIdentity`] and delegates the authorization decision to the
//! service layer; nothing here peeks at roles directly.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use evault_access::{AccessRestrictions, AssignmentRole, SensitivityLevel};
use evault_core::{Role, UserId, ValidationError};

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::routes::PaginationParams;
use crate::service::{self, NewCase};
use crate::state::{AppState, CaseRecord};

/// Request to register a case.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCaseRequest {
    /// Human-facing case number, unique in the agency's numbering scheme.
    pub case_number: String,
    /// Short case title.
    pub title: String,
    /// The lead investigator's directory id, if already known.
    pub lead_investigator: Option<Uuid>,
}

impl Validate for CreateCaseRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.case_number.trim().is_empty() {
            return Err(ValidationError::new("case_number", "must not be empty"));
        }
        if self.case_number.len() > 64 {
            return Err(ValidationError::new(
                "case_number",
                "must not exceed 64 characters",
            ));
        }
        if self.title.trim().is_empty() {
            return Err(ValidationError::new("title", "must not be empty"));
        }
        if self.title.len() > 255 {
            return Err(ValidationError::new(
                "title",
                "must not exceed 255 characters",
            ));
        }
        Ok(())
    }
}

/// Allow-lists accepted on a sensitivity change.
///
/// Names arrive as wire spellings and are parsed during validation, so an
/// unknown role is a 422 with a usable message rather than a bare serde
/// error.
#[derive(Debug, Deserialize, Default, ToSchema)]
pub struct RestrictionsRequest {
    /// Users granted access by directory id.
    #[serde(default)]
    pub allowed_users: Vec<Uuid>,
    /// Roles granted access wholesale (ignored at TOP_SECRET).
    #[serde(default)]
    pub allowed_roles: Vec<String>,
}

impl RestrictionsRequest {
    fn to_restrictions(&self) -> Result<AccessRestrictions, ValidationError> {
        let mut restrictions = AccessRestrictions::none();
        for user in &self.allowed_users {
            restrictions.allowed_users.insert(UserId::from_uuid(*user));
        }
        for name in &self.allowed_roles {
            let role = Role::from_name(name).ok_or_else(|| {
                ValidationError::new("allowed_roles", format!("unknown role: {name}"))
            })?;
            restrictions.allowed_roles.insert(role);
        }
        Ok(restrictions)
    }
}

/// Request to reclassify a case's sensitivity.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetSensitivityRequest {
    /// Target level: NORMAL, RESTRICTED, CONFIDENTIAL, TOP_SECRET.
    pub level: String,
    /// Why the case is being reclassified.
    pub reason: String,
    /// Allow-lists that apply at the new level.
    #[serde(default)]
    pub restrictions: RestrictionsRequest,
}

impl Validate for SetSensitivityRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if SensitivityLevel::from_name(&self.level).is_none() {
            return Err(ValidationError::new(
                "level",
                format!(
                    "invalid level '{}'. Valid levels: NORMAL, RESTRICTED, CONFIDENTIAL, TOP_SECRET",
                    self.level
                ),
            ));
        }
        if self.reason.trim().is_empty() {
            return Err(ValidationError::new("reason", "must not be empty"));
        }
        if self.reason.len() > 500 {
            return Err(ValidationError::new(
                "reason",
                "must not exceed 500 characters",
            ));
        }
        self.restrictions.to_restrictions().map(|_| ())
    }
}

/// Request to assign a user to a case.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddAssignmentRequest {
    /// The user's directory id.
    pub user_id: Uuid,
    /// The capacity: LEAD, SUPPORT, PROSECUTOR, LIAISON.
    pub role: String,
}

impl Validate for AddAssignmentRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if AssignmentRole::from_name(&self.role).is_none() {
            return Err(ValidationError::new(
                "role",
                format!(
                    "invalid role '{}'. Valid roles: LEAD, SUPPORT, PROSECUTOR, LIAISON",
                    self.role
                ),
            ));
        }
        Ok(())
    }
}

/// Build the cases router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/cases", get(list_cases).post(create_case))
        .route("/v1/cases/:id", get(get_case))
        .route("/v1/cases/:id/sensitivity", put(set_sensitivity))
        .route("/v1/cases/:id/assignments", post(add_assignment))
        .route(
            "/v1/cases/:id/assignments/:user_id",
            delete(remove_assignment),
        )
}

/// POST /v1/cases — Register a case.
#[utoipa::path(
    post,
    path = "/v1/cases",
    request_body = CreateCaseRequest,
    responses(
        (status = 201, description = "Case registered", body = CaseRecord),
        (status = 422, description = "Invalid request", body = crate::error::ErrorBody),
    ),
    tag = "cases"
)]
pub(crate) async fn create_case(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<CreateCaseRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CaseRecord>), AppError> {
    let req = extract_validated_json(body)?;
    let record = service::create_case(
        &state,
        caller,
        NewCase {
            case_number: req.case_number,
            title: req.title,
            lead_investigator: req.lead_investigator.map(UserId::from_uuid),
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /v1/cases — List the cases visible to the caller.
///
/// Visibility is computed once per request from the caller's subject and
/// applied as a single filter, so a page of results never mixes gate
/// decisions from different callers.
#[utoipa::path(
    get,
    path = "/v1/cases",
    params(
        ("limit" = Option<usize>, Query, description = "Max items to return (default 100, max 1000)"),
        ("offset" = Option<usize>, Query, description = "Items to skip (default 0)"),
    ),
    responses(
        (status = 200, description = "Visible cases, newest first", body = Vec<CaseRecord>),
    ),
    tag = "cases"
)]
pub(crate) async fn list_cases(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<Vec<CaseRecord>>, AppError> {
    let page = service::list_cases(
        &state,
        caller,
        pagination.effective_limit() as i64,
        pagination.effective_offset() as i64,
    )
    .await?;
    Ok(Json(page))
}

/// GET /v1/cases/:id — Fetch one case, gated on VIEW.
#[utoipa::path(
    get,
    path = "/v1/cases/{id}",
    params(("id" = Uuid, Path, description = "Case ID")),
    responses(
        (status = 200, description = "Case found", body = CaseRecord),
        (status = 403, description = "Access denied", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "cases"
)]
pub(crate) async fn get_case(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<CaseRecord>, AppError> {
    service::get_case(&state, caller, id).map(Json)
}

/// PUT /v1/cases/:id/sensitivity — Reclassify a case.
///
/// Requires EDIT on the case plus supervisory capability. Both the change
/// and a denied attempt land in the audit trail.
#[utoipa::path(
    put,
    path = "/v1/cases/{id}/sensitivity",
    params(("id" = Uuid, Path, description = "Case ID")),
    request_body = SetSensitivityRequest,
    responses(
        (status = 200, description = "Sensitivity updated", body = CaseRecord),
        (status = 403, description = "Access denied", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid request", body = crate::error::ErrorBody),
    ),
    tag = "cases"
)]
pub(crate) async fn set_sensitivity(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<SetSensitivityRequest>, JsonRejection>,
) -> Result<Json<CaseRecord>, AppError> {
    let req = extract_validated_json(body)?;

    // Both parses were checked by validate(); re-parse for the typed values.
    let level = SensitivityLevel::from_name(&req.level)
        .ok_or_else(|| AppError::Validation(format!("invalid level '{}'", req.level)))?;
    let restrictions = req.restrictions.to_restrictions()?;

    let record =
        service::set_case_sensitivity(&state, caller, id, level, req.reason, restrictions).await?;
    Ok(Json(record))
}

/// POST /v1/cases/:id/assignments — Assign a user to the case team.
#[utoipa::path(
    post,
    path = "/v1/cases/{id}/assignments",
    params(("id" = Uuid, Path, description = "Case ID")),
    request_body = AddAssignmentRequest,
    responses(
        (status = 201, description = "Assignment added", body = CaseRecord),
        (status = 403, description = "Access denied", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "Already assigned", body = crate::error::ErrorBody),
    ),
    tag = "cases"
)]
pub(crate) async fn add_assignment(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<AddAssignmentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CaseRecord>), AppError> {
    let req = extract_validated_json(body)?;
    let role = AssignmentRole::from_name(&req.role)
        .ok_or_else(|| AppError::Validation(format!("invalid role '{}'", req.role)))?;
    let record =
        service::add_assignment(&state, caller, id, UserId::from_uuid(req.user_id), role).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// DELETE /v1/cases/:id/assignments/:user_id — Remove a user from the team.
#[utoipa::path(
    delete,
    path = "/v1/cases/{id}/assignments/{user_id}",
    params(
        ("id" = Uuid, Path, description = "Case ID"),
        ("user_id" = Uuid, Path, description = "Assigned user ID"),
    ),
    responses(
        (status = 200, description = "Assignment removed", body = CaseRecord),
        (status = 403, description = "Access denied", body = crate::error::ErrorBody),
        (status = 404, description = "Case or assignment not found", body = crate::error::ErrorBody),
    ),
    tag = "cases"
)]
pub(crate) async fn remove_assignment(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<CaseRecord>, AppError> {
    let record =
        service::remove_assignment(&state, caller, id, UserId::from_uuid(user_id)).await?;
    Ok(Json(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{auth_middleware, AuthConfig, SecretToken};
    use axum::body::Body;
    use axum::http::Request;
    use axum::middleware::from_fn;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    // -- DTO validation ----------------------------------------------------

    #[test]
    fn create_case_request_valid() {
        let req = CreateCaseRequest {
            case_number: "2024-00417".to_string(),
            title: "Warehouse burglary".to_string(),
            lead_investigator: None,
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn create_case_request_empty_number_rejected() {
        let req = CreateCaseRequest {
            case_number: "  ".to_string(),
            title: "Warehouse burglary".to_string(),
            lead_investigator: None,
        };
        let err = req.validate().unwrap_err();
        assert_eq!(err.field, "case_number");
    }

    #[test]
    fn create_case_request_long_title_rejected() {
        let req = CreateCaseRequest {
            case_number: "2024-00417".to_string(),
            title: "t".repeat(256),
            lead_investigator: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn set_sensitivity_request_valid() {
        let req = SetSensitivityRequest {
            level: "RESTRICTED".to_string(),
            reason: "ongoing informant involvement".to_string(),
            restrictions: RestrictionsRequest::default(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn set_sensitivity_request_unknown_level_rejected() {
        let req = SetSensitivityRequest {
            level: "SECRET".to_string(),
            reason: "x".to_string(),
            restrictions: RestrictionsRequest::default(),
        };
        let err = req.validate().unwrap_err();
        assert_eq!(err.field, "level");
        assert!(err.reason.contains("SECRET"), "unexpected error: {err}");
    }

    #[test]
    fn set_sensitivity_request_empty_reason_rejected() {
        let req = SetSensitivityRequest {
            level: "NORMAL".to_string(),
            reason: "".to_string(),
            restrictions: RestrictionsRequest::default(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn set_sensitivity_request_unknown_role_in_allow_list_rejected() {
        let req = SetSensitivityRequest {
            level: "CONFIDENTIAL".to_string(),
            reason: "prosecution underway".to_string(),
            restrictions: RestrictionsRequest {
                allowed_users: vec![],
                allowed_roles: vec!["WARDEN".to_string()],
            },
        };
        let err = req.validate().unwrap_err();
        assert_eq!(err.field, "allowed_roles");
        assert!(err.reason.contains("WARDEN"), "unexpected error: {err}");
    }

    #[test]
    fn add_assignment_request_role_spellings() {
        for role in ["LEAD", "SUPPORT", "PROSECUTOR", "LIAISON"] {
            let req = AddAssignmentRequest {
                user_id: Uuid::new_v4(),
                role: role.to_string(),
            };
            assert!(req.validate().is_ok(), "{role}");
        }
        let bad = AddAssignmentRequest {
            user_id: Uuid::new_v4(),
            role: "lead".to_string(),
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn restrictions_request_parses_roles() {
        let req = RestrictionsRequest {
            allowed_users: vec![Uuid::new_v4()],
            allowed_roles: vec!["PROSECUTOR".to_string(), "AUDITOR".to_string()],
        };
        let restrictions = req.to_restrictions().unwrap();
        assert_eq!(restrictions.allowed_users.len(), 1);
        assert!(restrictions.allowed_roles.contains(&Role::Prosecutor));
        assert!(restrictions.allowed_roles.contains(&Role::Auditor));
    }

    // -- Handlers ------------------------------------------------------------

    /// Router with auth disabled: every request runs as SUPER_ADMIN.
    fn test_app() -> Router {
        router()
            .with_state(AppState::new())
            .layer(from_fn(auth_middleware))
            .layer(axum::Extension(AuthConfig { token: None }))
    }

    /// Router with bearer auth enabled, so tests can pick the caller's role.
    fn test_app_with_auth(state: AppState, secret: &str) -> Router {
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

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn handler_create_case_returns_201() {
        let app = test_app();
        let resp = app
            .oneshot(post_json(
                "/v1/cases",
                r#"{"case_number":"2024-00417","title":"Warehouse burglary"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let record: CaseRecord = body_json(resp).await;
        assert_eq!(record.case_number, "2024-00417");
        assert!(record.assignments.is_empty());
        assert_eq!(record.sensitivity.level, SensitivityLevel::Normal);
    }

    #[tokio::test]
    async fn handler_create_case_empty_number_returns_422() {
        let app = test_app();
        let resp = app
            .oneshot(post_json(
                "/v1/cases",
                r#"{"case_number":"","title":"Warehouse burglary"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn handler_create_case_malformed_json_returns_400() {
        let app = test_app();
        let resp = app
            .oneshot(post_json("/v1/cases", r#"{"case_number"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn handler_get_case_roundtrip() {
        let state = AppState::new();
        let app = router()
            .with_state(state)
            .layer(from_fn(auth_middleware))
            .layer(axum::Extension(AuthConfig { token: None }));

        let created: CaseRecord = body_json(
            app.clone()
                .oneshot(post_json(
                    "/v1/cases",
                    r#"{"case_number":"2024-00001","title":"Stolen vehicle"}"#,
                ))
                .await
                .unwrap(),
        )
        .await;

        let resp = app
            .oneshot(
                Request::builder()
                    .uri(format!("/v1/cases/{}", created.id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let fetched: CaseRecord = body_json(resp).await;
        assert_eq!(fetched.id, created.id);
    }

    #[tokio::test]
    async fn handler_get_case_unknown_returns_404() {
        let app = test_app();
        let resp = app
            .oneshot(
                Request::builder()
                    .uri(format!("/v1/cases/{}", Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn handler_set_sensitivity_as_supervisor() {
        let state = AppState::new();
        let app = test_app_with_auth(state, "s3cret");
        let supervisor = Uuid::new_v4();
        let auth = format!("Bearer SUPERVISOR:{supervisor}:s3cret");

        let create = Request::builder()
            .method("POST")
            .uri("/v1/cases")
            .header("content-type", "application/json")
            .header("Authorization", &auth)
            .body(Body::from(
                r#"{"case_number":"2024-00002","title":"Fraud ring"}"#,
            ))
            .unwrap();
        let created: CaseRecord = body_json(app.clone().oneshot(create).await.unwrap()).await;

        let update = Request::builder()
            .method("PUT")
            .uri(format!("/v1/cases/{}/sensitivity", created.id))
            .header("content-type", "application/json")
            .header("Authorization", &auth)
            .body(Body::from(
                r#"{"level":"RESTRICTED","reason":"informant involved"}"#,
            ))
            .unwrap();
        let resp = app.oneshot(update).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let updated: CaseRecord = body_json(resp).await;
        assert_eq!(updated.sensitivity.level, SensitivityLevel::Restricted);
        assert_eq!(
            updated.sensitivity.reason.as_deref(),
            Some("informant involved")
        );
    }

    #[tokio::test]
    async fn handler_set_sensitivity_officer_returns_403() {
        let state = AppState::new();
        let app = test_app_with_auth(state, "s3cret");
        let supervisor = format!("Bearer SUPERVISOR:{}:s3cret", Uuid::new_v4());
        let officer_id = Uuid::new_v4();
        let officer = format!("Bearer OFFICER:{officer_id}:s3cret");

        let create = Request::builder()
            .method("POST")
            .uri("/v1/cases")
            .header("content-type", "application/json")
            .header("Authorization", &officer)
            .body(Body::from(
                r#"{"case_number":"2024-00003","title":"Arson"}"#,
            ))
            .unwrap();
        let created: CaseRecord = body_json(app.clone().oneshot(create).await.unwrap()).await;
        let _ = supervisor;

        // The officer created the case so the gate grants EDIT, but the
        // classifier additionally requires supervisory capability.
        let update = Request::builder()
            .method("PUT")
            .uri(format!("/v1/cases/{}/sensitivity", created.id))
            .header("content-type", "application/json")
            .header("Authorization", &officer)
            .body(Body::from(
                r#"{"level":"CONFIDENTIAL","reason":"press interest"}"#,
            ))
            .unwrap();
        let resp = app.oneshot(update).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn handler_assignment_add_then_remove() {
        let app = test_app();
        let created: CaseRecord = body_json(
            app.clone()
                .oneshot(post_json(
                    "/v1/cases",
                    r#"{"case_number":"2024-00004","title":"Hit and run"}"#,
                ))
                .await
                .unwrap(),
        )
        .await;

        let analyst = Uuid::new_v4();
        let add = post_json(
            &format!("/v1/cases/{}/assignments", created.id),
            &format!(r#"{{"user_id":"{analyst}","role":"SUPPORT"}}"#),
        );
        let resp = app.clone().oneshot(add).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let updated: CaseRecord = body_json(resp).await;
        assert_eq!(updated.assignments.len(), 1);

        // Adding the same user again conflicts.
        let again = post_json(
            &format!("/v1/cases/{}/assignments", created.id),
            &format!(r#"{{"user_id":"{analyst}","role":"LEAD"}}"#),
        );
        let resp = app.clone().oneshot(again).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let remove = Request::builder()
            .method("DELETE")
            .uri(format!("/v1/cases/{}/assignments/{analyst}", created.id))
            .body(Body::empty())
            .unwrap();
        let resp = app.clone().oneshot(remove).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let cleared: CaseRecord = body_json(resp).await;
        assert!(cleared.assignments.is_empty());

        // Removing a user who is not assigned is a 404.
        let remove_again = Request::builder()
            .method("DELETE")
            .uri(format!("/v1/cases/{}/assignments/{analyst}", created.id))
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(remove_again).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn handler_list_cases_filters_by_caller() {
        let state = AppState::new();
        let app = test_app_with_auth(state, "s3cret");
        let supervisor = format!("Bearer SUPERVISOR:{}:s3cret", Uuid::new_v4());
        let outsider = format!("Bearer OFFICER:{}:s3cret", Uuid::new_v4());

        // Supervisor registers a case and locks it down to TOP_SECRET.
        let create = Request::builder()
            .method("POST")
            .uri("/v1/cases")
            .header("content-type", "application/json")
            .header("Authorization", &supervisor)
            .body(Body::from(
                r#"{"case_number":"2024-00005","title":"Internal affairs"}"#,
            ))
            .unwrap();
        let created: CaseRecord = body_json(app.clone().oneshot(create).await.unwrap()).await;

        let update = Request::builder()
            .method("PUT")
            .uri(format!("/v1/cases/{}/sensitivity", created.id))
            .header("content-type", "application/json")
            .header("Authorization", &supervisor)
            .body(Body::from(
                r#"{"level":"TOP_SECRET","reason":"officer under investigation"}"#,
            ))
            .unwrap();
        assert_eq!(
            app.clone().oneshot(update).await.unwrap().status(),
            StatusCode::OK
        );

        // An unrelated officer sees an empty listing.
        let list = Request::builder()
            .uri("/v1/cases")
            .header("Authorization", &outsider)
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(list).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let visible: Vec<CaseRecord> = body_json(resp).await;
        assert!(visible.is_empty());
    }
}
