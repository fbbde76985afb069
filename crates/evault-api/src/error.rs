//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps domain errors from evault-custody, evault-access, and evault-crypto
//! to HTTP status codes. Returns JSON error response bodies with error code,
//! message, and details. Never exposes internal error details in production
//! responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use evault_access::AccessError;
use evault_crypto::IntegrityError;
use evault_custody::CustodyError;

/// Structured JSON error response body.
///
/// All error responses use this format for consistency across the API surface.
/// The `details` field carries additional context for 422 validation errors
/// but is omitted for 500-class errors to prevent information leakage.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details, present only for client errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
///
/// Maps domain errors to appropriate HTTP status codes and structured
/// JSON error bodies. Internal error details are never exposed to clients.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Authentication failure, missing or invalid token (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authorization failure, insufficient permissions (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Conflict with current resource state (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A dependency this request needs is unreachable (503).
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::ServiceUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE")
            }
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal error messages to clients.
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        // Log internal errors for operator visibility.
        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Convert evault-core validation errors to API errors.
impl From<evault_core::ValidationError> for AppError {
    fn from(err: evault_core::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Convert custody ledger errors to API errors.
///
/// The 409 group (`InvalidTransition`, `ApprovalRequired`, `AlreadyDecided`,
/// `ConcurrentModification`) all mean "the request was well-formed but the
/// ledger's current state refuses it"; the client recovers by re-reading the
/// item and deciding again.
impl From<CustodyError> for AppError {
    fn from(err: CustodyError) -> Self {
        match &err {
            CustodyError::EvidenceNotFound { .. } | CustodyError::UnknownEntry { .. } => {
                Self::NotFound(err.to_string())
            }
            CustodyError::InvalidTransition { .. }
            | CustodyError::ApprovalRequired { .. }
            | CustodyError::AlreadyDecided { .. }
            | CustodyError::ConcurrentModification { .. } => Self::Conflict(err.to_string()),
            CustodyError::Forbidden { .. } => Self::Forbidden(err.to_string()),
            CustodyError::Validation(_) => Self::Validation(err.to_string()),
        }
    }
}

/// Convert access control errors to API errors.
impl From<AccessError> for AppError {
    fn from(err: AccessError) -> Self {
        match &err {
            AccessError::Forbidden { .. } => Self::Forbidden(err.to_string()),
            AccessError::Validation(_) => Self::Validation(err.to_string()),
        }
    }
}

/// Convert integrity utility errors to API errors.
///
/// The only failure the utility reports is an unreadable byte source, which
/// maps to 503: the stored object is temporarily unreachable, not wrong.
impl From<IntegrityError> for AppError {
    fn from(err: IntegrityError) -> Self {
        match &err {
            IntegrityError::StorageUnavailable(_) => Self::ServiceUnavailable(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use evault_core::{EntryId, EvidenceId, ValidationError};
    use evault_custody::{ApprovalStatus, CustodyAction, CustodyStatus};

    #[test]
    fn not_found_status_code() {
        let err = AppError::NotFound("missing item".to_string());
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "NOT_FOUND");
    }

    #[test]
    fn validation_status_code() {
        let err = AppError::Validation("bad field".to_string());
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(code, "VALIDATION_ERROR");
    }

    #[test]
    fn bad_request_status_code() {
        let err = AppError::BadRequest("malformed JSON".to_string());
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "BAD_REQUEST");
    }

    #[test]
    fn unauthorized_status_code() {
        let err = AppError::Unauthorized("no token".to_string());
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(code, "UNAUTHORIZED");
    }

    #[test]
    fn forbidden_status_code() {
        let err = AppError::Forbidden("insufficient scope".to_string());
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(code, "FORBIDDEN");
    }

    #[test]
    fn conflict_status_code() {
        let err = AppError::Conflict("status moved".to_string());
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(code, "CONFLICT");
    }

    #[test]
    fn service_unavailable_status_code() {
        let err = AppError::ServiceUnavailable("object storage offline".to_string());
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(code, "SERVICE_UNAVAILABLE");
    }

    #[test]
    fn internal_status_code() {
        let err = AppError::Internal("db connection failed".to_string());
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "INTERNAL_ERROR");
    }

    #[test]
    fn error_display_messages() {
        assert!(format!("{}", AppError::NotFound("x".into())).contains("x"));
        assert!(format!("{}", AppError::Validation("y".into())).contains("y"));
        assert!(format!("{}", AppError::BadRequest("z".into())).contains("z"));
        assert!(format!("{}", AppError::Unauthorized("a".into())).contains("a"));
        assert!(format!("{}", AppError::Forbidden("b".into())).contains("b"));
        assert!(format!("{}", AppError::Conflict("c".into())).contains("c"));
        assert!(format!("{}", AppError::ServiceUnavailable("s".into())).contains("s"));
        assert!(format!("{}", AppError::Internal("d".into())).contains("d"));
    }

    // -- Domain error conversions -----------------------------------------

    #[test]
    fn evidence_not_found_converts_to_404() {
        let err = CustodyError::EvidenceNotFound {
            evidence_id: EvidenceId::new(),
        };
        let app_err = AppError::from(err);
        let (status, _) = app_err.status_and_code();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn unknown_entry_converts_to_404() {
        let err = CustodyError::UnknownEntry {
            entry_id: EntryId::new(),
        };
        let app_err = AppError::from(err);
        let (status, _) = app_err.status_and_code();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn invalid_transition_converts_to_409() {
        let err = CustodyError::InvalidTransition {
            from: CustodyStatus::Disposed,
            action: CustodyAction::Transferred,
        };
        let app_err = AppError::from(err);
        let (status, code) = app_err.status_and_code();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(code, "CONFLICT");
    }

    #[test]
    fn approval_required_converts_to_409() {
        let err = CustodyError::ApprovalRequired {
            entry_id: EntryId::new(),
        };
        let (status, _) = AppError::from(err).status_and_code();
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[test]
    fn already_decided_converts_to_409() {
        let err = CustodyError::AlreadyDecided {
            entry_id: EntryId::new(),
            status: ApprovalStatus::Approved,
        };
        let (status, _) = AppError::from(err).status_and_code();
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[test]
    fn concurrent_modification_converts_to_409() {
        let err = CustodyError::ConcurrentModification {
            expected: CustodyStatus::InVault,
            actual: CustodyStatus::Released,
        };
        let app_err = AppError::from(err);
        let (status, _) = app_err.status_and_code();
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(format!("{app_err}").contains("IN_VAULT"));
        assert!(format!("{app_err}").contains("RELEASED"));
    }

    #[test]
    fn custody_forbidden_converts_to_403() {
        let err = CustodyError::Forbidden {
            reason: "role OFFICER cannot decide custody approvals".to_string(),
        };
        let (status, _) = AppError::from(err).status_and_code();
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn custody_validation_converts_to_422() {
        let err = CustodyError::Validation(ValidationError::new("purpose", "must not be empty"));
        let app_err = AppError::from(err);
        let (status, _) = app_err.status_and_code();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(format!("{app_err}").contains("purpose"));
    }

    #[test]
    fn access_forbidden_converts_to_403() {
        let err = AccessError::Forbidden {
            reason: "role ANALYST cannot classify case sensitivity".to_string(),
        };
        let (status, _) = AppError::from(err).status_and_code();
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn integrity_error_converts_to_503() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "object missing");
        let err = IntegrityError::from(io_err);
        let (status, code) = AppError::from(err).status_and_code();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(code, "SERVICE_UNAVAILABLE");
    }

    #[test]
    fn error_body_serializes() {
        let body = ErrorBody {
            error: ErrorDetail {
                code: "TEST".to_string(),
                message: "test message".to_string(),
                details: None,
            },
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("TEST"));
        assert!(json.contains("test message"));
        assert!(!json.contains("details")); // skipped when None
    }

    #[test]
    fn error_body_with_details_serializes() {
        let body = ErrorBody {
            error: ErrorDetail {
                code: "VALIDATION_ERROR".to_string(),
                message: "bad input".to_string(),
                details: Some(serde_json::json!({"field": "purpose"})),
            },
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("details"));
        assert!(json.contains("purpose"));
    }

    // -- into_response tests -----------------------------------------------

    use http_body_util::BodyExt;

    /// Helper to extract status and body from a Response.
    async fn response_parts(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn into_response_not_found() {
        let (status, body) = response_parts(AppError::NotFound("item 123".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error.code, "NOT_FOUND");
        assert!(body.error.message.contains("item 123"));
        assert!(body.error.details.is_none());
    }

    #[tokio::test]
    async fn into_response_validation() {
        let (status, body) = response_parts(AppError::Validation("bad field".into())).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.error.code, "VALIDATION_ERROR");
        assert!(body.error.message.contains("bad field"));
    }

    #[tokio::test]
    async fn into_response_forbidden() {
        let (status, body) = response_parts(AppError::Forbidden("nope".into())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body.error.code, "FORBIDDEN");
        assert!(body.error.message.contains("nope"));
    }

    #[tokio::test]
    async fn into_response_conflict() {
        let (status, body) = response_parts(AppError::Conflict("status moved".into())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.error.code, "CONFLICT");
        assert!(body.error.message.contains("status moved"));
    }

    #[tokio::test]
    async fn into_response_service_unavailable() {
        let (status, body) =
            response_parts(AppError::ServiceUnavailable("storage offline".into())).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.error.code, "SERVICE_UNAVAILABLE");
        assert!(body.error.message.contains("storage offline"));
    }

    #[tokio::test]
    async fn into_response_internal_hides_details() {
        let (status, body) =
            response_parts(AppError::Internal("db connection failed".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.code, "INTERNAL_ERROR");
        // The internal error message must NOT appear in the response body.
        assert!(
            !body.error.message.contains("db connection"),
            "internal error details must not leak: {}",
            body.error.message
        );
        assert_eq!(body.error.message, "An internal error occurred");
        assert!(body.error.details.is_none());
    }
}
