//! # Request Extraction & Validation
//!
//! The [`Validate`] trait is the contract every mutating request DTO
//! implements, and [`extract_validated_json`] is the one helper handlers
//! call to run it.
//!
//! A body that fails to parse at all is a 400; a body that parses but
//! violates a field constraint is a 422 carrying a [`ValidationError`]
//! with the offending field named. The split matters to clients: only the
//! latter is worth echoing back to a user.

use axum::extract::rejection::JsonRejection;
use axum::Json;

use evault_core::ValidationError;

use crate::error::AppError;

/// Field-level constraints a request DTO enforces after deserialization.
///
/// Serde settles shape and types; this settles the constraints serde
/// cannot express: non-empty strings, length ceilings, and names that must
/// parse to a closed enum spelling.
pub trait Validate {
    /// Check every field constraint, naming the first field that fails.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Extract a JSON body, mapping deserialization errors to [`AppError::BadRequest`].
///
/// Handlers take the body as `Result<Json<T>, JsonRejection>` and pass it
/// through:
/// ```ignore
/// async fn handler(body: Result<Json<T>, JsonRejection>) -> Result<..., AppError> {
///     let req = extract_json(body)?;
///     // use req...
/// }
/// ```
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract a JSON body, then run the DTO's [`Validate`] impl.
///
/// Parse failures surface as 400, constraint failures as 422.
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate()?;
    Ok(value)
}
