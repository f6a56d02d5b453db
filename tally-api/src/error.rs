/// Error handling for the API server
///
/// All handlers return `Result<T, ApiError>`, which converts to an HTTP
/// status code and a JSON body:
///
/// ```json
/// {
///   "timestamp": "2024-02-01T12:00:00Z",
///   "status": 403,
///   "error": "access_denied",
///   "message": "Access denied: expense belongs to another user",
///   "path": "/v1/expenses/6f1c..."
/// }
/// ```
///
/// The body is built without the request path; the
/// [`error_path`](crate::middleware::error_path) layer fills it in.
///
/// # Example
///
/// ```no_run
/// use tally_api::error::{ApiError, ApiResult};
/// use axum::Json;
///
/// async fn handler() -> ApiResult<Json<Vec<String>>> {
///     Err(ApiError::NotFound("Expense not found".to_string()))
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tally_shared::auth::jwt::JwtError;
use tally_shared::error::{ErrorKind, FieldError, LedgerError};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403) - ownership guard failure
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Unprocessable entity (422) - validation errors
    ValidationError(Vec<FieldError>),

    /// Internal server error (500)
    InternalError(String),
}

/// Error response format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// When the error was produced
    pub timestamp: DateTime<Utc>,

    /// HTTP status code
    pub status: u16,

    /// Error code (e.g., "not_found", "access_denied")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Request path that failed
    pub path: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (
                StatusCode::FORBIDDEN,
                ErrorKind::AccessDenied.as_str(),
                msg,
                None,
            ),
            ApiError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorKind::NotFound.as_str(),
                msg,
                None,
            ),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorKind::Validation.as_str(),
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorKind::Internal.as_str(),
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            timestamp: Utc::now(),
            status: status.as_u16(),
            error: error_code.to_string(),
            message,
            path: String::new(),
            details,
        };

        let mut response = (status, Json(body.clone())).into_response();
        response.extensions_mut().insert(body);
        response
    }
}

/// Convert ledger errors to API errors
impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            LedgerError::AccessDenied(_) => ApiError::Forbidden(err.to_string()),
            LedgerError::Validation(fields) => ApiError::ValidationError(fields),
            LedgerError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

/// Convert JWT errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::InvalidIssuer { .. } => {
                ApiError::Unauthorized("Invalid token issuer".to_string())
            }
            _ => ApiError::Unauthorized(format!("Invalid token: {}", err)),
        }
    }
}
