/// Error handling for the API server
///
/// A unified error type mapping the whole failure taxonomy to HTTP
/// responses. Handlers return `Result<T, ApiError>` and the conversion
/// to the `{success: false, message, error}` envelope happens in one
/// place.
///
/// Mapping: validation and malformed input -> 400, missing/invalid/
/// expired session -> 401, authenticated-but-not-permitted -> 403,
/// missing record -> 404, unique-key conflict -> 409, everything else
/// -> 500 with a correlation id that is always logged and surfaced in
/// the body only outside production-like deployments.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use planboard_shared::auth::jwt::JwtError;
use planboard_shared::auth::password::PasswordError;
use planboard_shared::dates::DateError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use uuid::Uuid;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Whether 500 responses carry their correlation id in the body.
/// Set once at startup from the production flag; defaults to exposed
/// (development behavior) when never set.
static EXPOSE_INTERNAL: OnceLock<bool> = OnceLock::new();

/// Configures internal-error exposure; call once at startup
pub fn set_expose_internal_errors(expose: bool) {
    let _ = EXPOSE_INTERNAL.set(expose);
}

fn expose_internal_errors() -> bool {
    *EXPOSE_INTERNAL.get().unwrap_or(&true)
}

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Malformed identifiers, dates, or missing required fields (400)
    BadRequest(String),

    /// Missing, invalid, or expired session token (401)
    Unauthorized(String),

    /// Authenticated but not permitted (403)
    Forbidden(String),

    /// Missing record (404)
    NotFound(String),

    /// Unique constraint conflict, e.g. duplicate email (409)
    Conflict(String),

    /// Declarative schema validation failure (400, field-level details)
    Validation(Vec<FieldError>),

    /// Anything unexpected (500, opaque to the caller)
    Internal(String),
}

/// One failed field from request validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    /// Field path that failed validation
    pub field: String,

    /// Human-readable message
    pub message: String,
}

/// Detail payload in the error envelope: either a plain string or a
/// list of field errors
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    Fields(Vec<FieldError>),
}

/// Error response envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Always false
    pub success: bool,

    /// Human-readable error message
    pub message: String,

    /// Optional machine-readable detail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::Validation(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, error) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg, None),
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "Request validation failed".to_string(),
                Some(ErrorDetail::Fields(errors)),
            ),
            ApiError::Internal(msg) => {
                // Always logged; the underlying message never leaves the
                // process. The correlation id links a client report to
                // the log line.
                let correlation_id = Uuid::new_v4();
                tracing::error!(%correlation_id, error = %msg, "Internal server error");

                let detail = if expose_internal_errors() {
                    Some(ErrorDetail::Message(correlation_id.to_string()))
                } else {
                    None
                };

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                    detail,
                )
            }
        };

        let body = Json(ErrorBody {
            success: false,
            message,
            error,
        });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                ApiError::Conflict("A record with this value already exists".to_string())
            }
            other => ApiError::Internal(format!("Database error: {}", other)),
        }
    }
}

/// Convert session token errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::Unauthorized("Token has expired".to_string()),
            other => ApiError::Unauthorized(other.to_string()),
        }
    }
}

/// Convert password hashing errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::Internal(format!("Password operation failed: {}", err))
    }
}

/// Convert date parsing errors to API errors
impl From<DateError> for ApiError {
    fn from(err: DateError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

/// Convert declarative validation failures to field-level API errors
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details: Vec<FieldError> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| FieldError {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();

        ApiError::Validation(details)
    }
}
