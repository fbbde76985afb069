//! # Authentication Middleware
//!
//! Bearer token middleware that binds each request to a directory identity.
//!
//! ## Token Format
//!
//! ```text
//! Bearer {role}:{user_id}:{secret}
//! ```
//!
//! The role uses its canonical wire spelling (`SUPERVISOR`, `OFFICER`, ...)
//! and the user id is the caller's directory UUID. The secret is compared in
//! constant time against the configured value. User and role provisioning
//! live in the external directory; this service consumes the identity the
//! token asserts and holds it accountable in the audit trail.
//!
//! ## CallerIdentity
//!
//! Every authenticated request gets a [`CallerIdentity`] injected into the
//! request extensions. Handlers extract it via the `FromRequestParts` impl,
//! and the access gate consumes it as an [`AccessSubject`].

use axum::extract::Request;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use subtle::ConstantTimeEq;
use uuid::Uuid;
use zeroize::{Zeroize, ZeroizeOnDrop};

use evault_access::AccessSubject;
use evault_core::{Role, UserId};

use crate::error::{AppError, ErrorBody, ErrorDetail};

// -- Secret handling ----------------------------------------------------------

/// The configured bearer secret.
///
/// Wrapped so the value is zeroized on drop and redacted in `Debug` output,
/// keeping credentials out of logs and panic messages.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretToken(String);

impl SecretToken {
    /// Wrap a secret loaded from configuration.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretToken([REDACTED])")
    }
}

// -- CallerIdentity ------------------------------------------------------------

/// Identity of the authenticated caller, extracted from the bearer token
/// and available to all route handlers via Axum's `FromRequestParts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerIdentity {
    /// The caller's directory user id.
    pub user_id: UserId,
    /// The caller's directory role.
    pub role: Role,
}

impl CallerIdentity {
    /// The caller as an access-gate subject.
    pub fn subject(&self) -> AccessSubject {
        AccessSubject::new(self.user_id, self.role)
    }
}

/// Axum `FromRequestParts` implementation for `CallerIdentity`.
///
/// Extracts the identity that the auth middleware injected into extensions.
/// Returns 401 if no identity is present (middleware didn't run or failed).
#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .copied()
            .ok_or_else(|| AppError::Unauthorized("no caller identity in request context".into()))
    }
}

/// Check that the caller holds supervisory capability.
/// Returns 403 Forbidden otherwise.
pub fn require_supervisory(caller: &CallerIdentity) -> Result<(), AppError> {
    if caller.role.is_supervisory() {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "supervisory capability required, caller has role {}",
            caller.role
        )))
    }
}

/// Check that the caller may read the audit trail: auditors, supervisors,
/// and the administrator tier. Returns 403 Forbidden otherwise.
pub fn require_audit_access(caller: &CallerIdentity) -> Result<(), AppError> {
    if caller.role == Role::Auditor || caller.role.is_supervisory() {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "audit access requires AUDITOR or supervisory role, caller has role {}",
            caller.role
        )))
    }
}

// -- Auth Configuration ----------------------------------------------------------

/// Auth configuration injected into request extensions.
///
/// The token value is a [`SecretToken`], so a derived `Debug` still redacts
/// the credential.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub token: Option<SecretToken>,
}

// -- Token Validation ------------------------------------------------------------

/// Constant-time comparison of bearer secrets.
///
/// Prevents timing side-channels that could reveal secret length or prefix.
/// When lengths differ, performs a dummy comparison to avoid leaking length
/// information through timing variance.
fn constant_time_token_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        // Dummy comparison to keep timing constant regardless of length match.
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Parse a bearer token in the format `{role}:{user_id}:{secret}`.
///
/// The secret is checked first, in constant time; role and user id parsing
/// only run once the secret matches. An unknown role name is a denial, never
/// a default role.
pub fn parse_bearer_token(provided: &str, expected_secret: &str) -> Result<CallerIdentity, String> {
    let parts: Vec<&str> = provided.splitn(3, ':').collect();
    if parts.len() != 3 {
        return Err("invalid token format, expected {role}:{user_id}:{secret}".into());
    }
    let (role_str, user_str, secret) = (parts[0], parts[1], parts[2]);

    if !constant_time_token_eq(secret, expected_secret) {
        return Err("invalid bearer token".into());
    }

    let role = Role::from_name(role_str).ok_or_else(|| format!("unknown role: {role_str}"))?;
    let user_id = user_str
        .parse::<Uuid>()
        .map_err(|e| format!("invalid user_id: {e}"))?;

    Ok(CallerIdentity {
        user_id: UserId::from_uuid(user_id),
        role,
    })
}

// -- Middleware --------------------------------------------------------------------

/// Extract and validate the Bearer token from the Authorization header.
///
/// Parses the token into a [`CallerIdentity`] (role + user binding) and
/// injects it into request extensions for downstream handlers.
///
/// When `AuthConfig.token` is `None`, all requests run with a fixed
/// `SUPER_ADMIN` identity (auth disabled / development mode). The nil user
/// id makes the development actor recognizable in audit rows.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let auth_config = request.extensions().get::<AuthConfig>().cloned();

    match auth_config {
        Some(AuthConfig {
            token: Some(ref expected),
        }) => {
            let auth_header = request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok());

            match auth_header {
                Some(header_value) if header_value.starts_with("Bearer ") => {
                    let provided = &header_value[7..];
                    match parse_bearer_token(provided, expected.expose()) {
                        Ok(identity) => {
                            request.extensions_mut().insert(identity);
                            next.run(request).await
                        }
                        Err(msg) => {
                            tracing::warn!(reason = %msg, "authentication failed: invalid bearer token");
                            unauthorized_response(&msg)
                        }
                    }
                }
                Some(_) => {
                    tracing::warn!("authentication failed: non-Bearer authorization scheme");
                    unauthorized_response("authorization header must use Bearer scheme")
                }
                None => {
                    tracing::warn!("authentication failed: missing authorization header");
                    unauthorized_response("missing authorization header")
                }
            }
        }
        _ => {
            // Auth disabled. Inject a fixed SUPER_ADMIN identity.
            request.extensions_mut().insert(CallerIdentity {
                user_id: UserId::from_uuid(Uuid::nil()),
                role: Role::SuperAdmin,
            });
            next.run(request).await
        }
    }
}

fn unauthorized_response(message: &str) -> Response {
    let body = ErrorBody {
        error: ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
            details: None,
        },
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
