/// Error handling for the web server
///
/// Handlers return `AppResult<T>`; any `AppError` becomes a JSON
/// `{error, message}` response with the matching status code. Form validation
/// failures are not errors: they re-render the page with field messages (see
/// [`field_errors`]).
///
/// # Example
///
/// ```no_run
/// use pingcrm_api::error::{AppError, AppResult};
/// use pingcrm_shared::models::organization::Organization;
/// use sqlx::SqlitePool;
///
/// async fn load(pool: &SqlitePool, id: i64) -> AppResult<Organization> {
///     Organization::find_by_id(pool, id)
///         .await?
///         .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))
/// }
/// ```

use std::collections::BTreeMap;

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pingcrm_shared::auth::{password::PasswordError, session::SessionError};
use serde::{Deserialize, Serialize};
use validator::ValidationErrors;

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

/// Field name to first error message, as shared with the client in `errors`
pub type FieldErrors = BTreeMap<String, String>;

/// Unified application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Bad request (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Unauthorized (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conflict (409), e.g. a unique constraint
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "not_found")
    pub error: String,

    /// Human-readable error message
    pub message: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "bad_request",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::InternalError(_) => "internal_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = self.code().to_string();

        let message = match self {
            AppError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
            AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => msg,
        };

        (status, Json(ErrorResponse { error, message })).into_response()
    }
}

/// Convert sqlx errors to application errors
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    return AppError::Conflict("A record with this value already exists".to_string());
                }
                if db_err.is_foreign_key_violation() {
                    return AppError::BadRequest("Referenced record does not exist".to_string());
                }

                AppError::InternalError(format!("Database error: {}", db_err))
            }
            _ => AppError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert password errors to application errors
impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        AppError::InternalError(format!("Password operation failed: {}", err))
    }
}

/// Convert session errors to application errors
impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::CreateError(msg) => AppError::InternalError(msg),
            SessionError::Expired => AppError::Unauthorized("Session expired".to_string()),
            SessionError::InvalidIssuer => AppError::Unauthorized("Invalid session issuer".to_string()),
            SessionError::Invalid(msg) => AppError::Unauthorized(msg),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InternalError(format!("Serialization failed: {}", err))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Collects the first message of every failing field
pub fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .iter()
        .filter_map(|(field, errors)| {
            let message = errors.first()?.message.as_ref()?.to_string();
            Some((field.to_string(), message))
        })
        .collect()
}
