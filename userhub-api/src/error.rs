/// Error handling for the API server
///
/// Handlers return `ApiResult<T>`; every failure becomes a JSON body of
/// the form `{ "error": string, "details"?: string }`.
///
/// # Example
///
/// ```
/// use userhub_api::error::{ApiError, ApiResult};
///
/// fn require_email(email: &str) -> ApiResult<&str> {
///     if email.trim().is_empty() {
///         return Err(ApiError::BadRequest("Email is required".to_string()));
///     }
///     Ok(email)
/// }
///
/// assert!(require_email("").is_err());
/// ```

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use userhub_shared::store::StoreError;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400): missing or malformed input
    BadRequest(String),

    /// Bad request (400) with a diagnostic, e.g. a JSON parse error
    InvalidBody { message: String, details: String },

    /// Not found (404)
    NotFound(String),

    /// Internal server error (500)
    InternalError {
        message: String,
        details: Option<String>,
    },
}

impl ApiError {
    /// 500 with a diagnostic string
    pub fn internal(details: impl Into<String>) -> Self {
        ApiError::InternalError {
            message: "Internal server error".to_string(),
            details: Some(details.into()),
        }
    }

    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::InvalidBody { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,

    /// Optional diagnostic detail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::InvalidBody { message, details } => {
                write!(f, "Bad request: {} ({})", message, details)
            }
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::InternalError { message, details } => match details {
                Some(details) => write!(f, "Internal error: {} ({})", message, details),
                None => write!(f, "Internal error: {}", message),
            },
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            ApiError::BadRequest(error) | ApiError::NotFound(error) => ErrorResponse {
                error,
                details: None,
            },
            ApiError::InvalidBody { message, details } => ErrorResponse {
                error: message,
                details: Some(details),
            },
            ApiError::InternalError { message, details } => {
                tracing::error!(details = ?details, "{}", message);
                ErrorResponse {
                    error: message,
                    details,
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Store failures are always 500; there is no dedicated conflict status
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::internal(err.to_string())
    }
}

/// Malformed JSON bodies
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody {
            message: "Invalid request body".to_string(),
            details: rejection.body_text(),
        }
    }
}
