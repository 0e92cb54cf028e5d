//! Error handling module for the ClubHub backend.
//!
//! Provides centralized error types with mapping to HTTP status codes and response envelopes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Error codes as constants to avoid stringly-typed errors.
#[allow(dead_code)]
pub mod codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const ROLE_MISMATCH: &str = "ROLE_MISMATCH";
    pub const ALREADY_MEMBER: &str = "ALREADY_MEMBER";
    pub const ALREADY_REGISTERED: &str = "ALREADY_REGISTERED";
    pub const ALREADY_CLAIMED: &str = "ALREADY_CLAIMED";
    pub const NOT_REGISTERED: &str = "NOT_REGISTERED";
    pub const CONFLICT: &str = "CONFLICT";
    pub const INVALID_STATE: &str = "INVALID_STATE";
    pub const INSUFFICIENT_POINTS: &str = "INSUFFICIENT_POINTS";
    pub const EVENT_FULL: &str = "EVENT_FULL";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const STORE_UNAVAILABLE: &str = "STORE_UNAVAILABLE";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
}

/// Application error type.
///
/// Every variant except `Store` is a local, recoverable condition surfaced to
/// the caller with enough context to render a user-facing message. `Store`
/// wraps persistence-layer failures; the engine never retries internally.
#[derive(Debug)]
pub enum AppError {
    /// Authentication required
    Unauthorized(String),
    /// Referenced entity does not exist
    NotFound(String),
    /// Actor or target does not hold the required system role
    RoleMismatch(String),
    /// User is already on the club roster
    AlreadyMember(String),
    /// User is already registered for the event
    AlreadyRegistered(String),
    /// Reward was already granted to the user
    AlreadyClaimed(String),
    /// User is not registered for the event
    NotRegistered(String),
    /// A uniqueness constraint (e.g. username) would be violated
    Conflict(String),
    /// Transition attempted from a state that does not permit it
    InvalidState(String),
    /// Point balance below the reward's claim threshold
    InsufficientPoints(String),
    /// Event has reached its participant capacity
    EventFull(String),
    /// Request payload failed validation
    Validation(String),
    /// Entity store failure (connectivity, timeout)
    Store(String),
    /// Internal server error
    Internal(String),
    /// Bad request
    BadRequest(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::RoleMismatch(_) => StatusCode::FORBIDDEN,
            AppError::AlreadyMember(_)
            | AppError::AlreadyRegistered(_)
            | AppError::AlreadyClaimed(_)
            | AppError::Conflict(_)
            | AppError::InvalidState(_)
            | AppError::EventFull(_) => StatusCode::CONFLICT,
            AppError::NotRegistered(_) => StatusCode::NOT_FOUND,
            AppError::InsufficientPoints(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => codes::UNAUTHORIZED,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::RoleMismatch(_) => codes::ROLE_MISMATCH,
            AppError::AlreadyMember(_) => codes::ALREADY_MEMBER,
            AppError::AlreadyRegistered(_) => codes::ALREADY_REGISTERED,
            AppError::AlreadyClaimed(_) => codes::ALREADY_CLAIMED,
            AppError::NotRegistered(_) => codes::NOT_REGISTERED,
            AppError::Conflict(_) => codes::CONFLICT,
            AppError::InvalidState(_) => codes::INVALID_STATE,
            AppError::InsufficientPoints(_) => codes::INSUFFICIENT_POINTS,
            AppError::EventFull(_) => codes::EVENT_FULL,
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::Store(_) => codes::STORE_UNAVAILABLE,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
            AppError::BadRequest(_) => codes::BAD_REQUEST,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::Unauthorized(msg)
            | AppError::NotFound(msg)
            | AppError::RoleMismatch(msg)
            | AppError::AlreadyMember(msg)
            | AppError::AlreadyRegistered(msg)
            | AppError::AlreadyClaimed(msg)
            | AppError::NotRegistered(msg)
            | AppError::Conflict(msg)
            | AppError::InvalidState(msg)
            | AppError::InsufficientPoints(msg)
            | AppError::EventFull(msg)
            | AppError::Validation(msg)
            | AppError::Store(msg)
            | AppError::Internal(msg)
            | AppError::BadRequest(msg) => msg.clone(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        AppError::Store(format!("Database error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        AppError::BadRequest(format!("JSON error: {}", err))
    }
}

/// Error details in the response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
}

/// Error response envelope.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetails,
    pub revision_id: i64,
}

impl ErrorResponse {
    pub fn new(error: &AppError, revision_id: i64) -> Self {
        Self {
            success: false,
            error: ErrorDetails {
                code: error.error_code().to_string(),
                message: error.message(),
            },
            revision_id,
        }
    }
}

/// Wrapper type for errors that carry revision_id context.
pub struct AppErrorWithRevision {
    pub error: AppError,
    pub revision_id: i64,
}

impl IntoResponse for AppErrorWithRevision {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        let body = ErrorResponse::new(&self.error, self.revision_id);
        (status, Json(body)).into_response()
    }
}
