//! # evault-api — Axum API Service for the Evidence Vault
//!
//! The Evidence Vault is the integrity and access-control core for case
//! evidence: it registers evidence items under investigation cases, records
//! every physical hand-off in an append-only chain-of-custody ledger,
//! enforces sensitivity-based access to cases, verifies evidence content
//! against stored SHA-256 digests, and keeps a hash-chained audit trail of
//! every decision it makes.
//!
//! ## API Surface
//!
//! | Prefix            | Module               | Domain                        |
//! |-------------------|----------------------|-------------------------------|
//! | `/v1/cases/*`     | [`routes::cases`]    | Cases, sensitivity, assignments |
//! | `/v1/evidence/*`  | [`routes::evidence`] | Evidence intake, custody, integrity |
//! | `/v1/audit/*`     | [`routes::audit`]    | Audit trail queries           |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → AuthMiddleware → RateLimitMiddleware → Handler
//! ```
//!
//! ## OpenAPI
//!
//! Auto-generated OpenAPI spec via utoipa derive macros at `/openapi.json`.

pub mod audit;
pub mod auth;
pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod service;
pub mod state;

use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::{IntoResponse, Response};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::middleware::rate_limit::{RateLimitConfig, RateLimiter};
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) are mounted outside the auth middleware
/// so they remain accessible without credentials.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };
    let limiter = RateLimiter::new(RateLimitConfig::default());

    // Authenticated API routes.
    let api = Router::new()
        .merge(routes::cases::router())
        .merge(routes::evidence::router())
        .merge(routes::audit::router())
        .merge(openapi::router())
        .layer(from_fn(middleware::rate_limit::rate_limit_middleware))
        .layer(from_fn(auth::auth_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(axum::Extension(auth_config))
        .layer(axum::Extension(limiter))
        .with_state(state.clone());

    // Unauthenticated health probes.
    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness))
        .with_state(state);

    Router::new().merge(health).merge(api)
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe.
///
/// In in-memory mode the service is ready as soon as the process is up.
/// With a database attached, readiness additionally requires a live
/// connection, so a broken pool flips the probe to 503 and takes the
/// instance out of rotation.
async fn readiness(State(state): State<AppState>) -> Response {
    if let Some(pool) = &state.db_pool {
        if let Err(e) = sqlx::query("SELECT 1").execute(pool).await {
            tracing::warn!("readiness probe failed: {e}");
            return (StatusCode::SERVICE_UNAVAILABLE, "database unreachable").into_response();
        }
    }
    (StatusCode::OK, "ready").into_response()
}
