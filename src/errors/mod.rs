//! Error handling module for the admin client.
//!
//! Every store action returns [`ApiError`]; callers decide whether to surface
//! or ignore it. HTTP statuses from the backend map onto the variants here.

use serde::Deserialize;
use thiserror::Error;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const FORBIDDEN: &str = "FORBIDDEN";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const CONFLICT: &str = "CONFLICT";
    pub const SERVER_ERROR: &str = "SERVER_ERROR";
    pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
    pub const DECODE_ERROR: &str = "DECODE_ERROR";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const CANCELLED: &str = "CANCELLED";
    pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
}

/// Client error type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// 400 from the backend
    #[error("Bad request: {0}")]
    BadRequest(String),
    /// 401 from the backend; the stored token has been cleared
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    /// 403 from the backend
    #[error("Forbidden: {0}")]
    Forbidden(String),
    /// 404 from the backend, or a lookup that resolved to nothing
    #[error("Not found: {0}")]
    NotFound(String),
    /// 409 from the backend (e.g. a duplicate verification)
    #[error("Conflict: {0}")]
    Conflict(String),
    /// Any other non-success status
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },
    /// No response at all
    #[error("Network error: {0}")]
    Network(String),
    /// The response body did not match the expected shape
    #[error("Decode error: {0}")]
    Decode(String),
    /// Rejected client-side before any request was made
    #[error("Validation error: {0}")]
    Validation(String),
    /// The request was superseded or cancelled by the caller
    #[error("Request cancelled")]
    Cancelled,
    /// Bad configuration value
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Build an error from a non-success HTTP status and the raw response body.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = ServerErrorBody::parse(body).unwrap_or_else(|| default_message(status));
        match status {
            400 => ApiError::BadRequest(message),
            401 => ApiError::Unauthorized(message),
            403 => ApiError::Forbidden(message),
            404 => ApiError::NotFound(message),
            409 => ApiError::Conflict(message),
            _ => ApiError::Server { status, message },
        }
    }

    /// Get the HTTP status code for this error, if it came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::BadRequest(_) => Some(400),
            ApiError::Unauthorized(_) => Some(401),
            ApiError::Forbidden(_) => Some(403),
            ApiError::NotFound(_) => Some(404),
            ApiError::Conflict(_) => Some(409),
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => codes::BAD_REQUEST,
            ApiError::Unauthorized(_) => codes::UNAUTHORIZED,
            ApiError::Forbidden(_) => codes::FORBIDDEN,
            ApiError::NotFound(_) => codes::NOT_FOUND,
            ApiError::Conflict(_) => codes::CONFLICT,
            ApiError::Server { .. } => codes::SERVER_ERROR,
            ApiError::Network(_) => codes::NETWORK_ERROR,
            ApiError::Decode(_) => codes::DECODE_ERROR,
            ApiError::Validation(_) => codes::VALIDATION_ERROR,
            ApiError::Cancelled => codes::CANCELLED,
            ApiError::Config(_) => codes::CONFIG_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::Network(msg)
            | ApiError::Decode(msg)
            | ApiError::Validation(msg)
            | ApiError::Config(msg) => msg.clone(),
            ApiError::Server { message, .. } => message.clone(),
            ApiError::Cancelled => "request cancelled".to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::from_status(status.as_u16(), "")
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(format!("JSON error: {}", err))
    }
}

/// Result alias used by every store action.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Error body returned by the backend. `message` is either a string or a list
/// of validation messages.
#[derive(Debug, Deserialize)]
struct ServerErrorBody {
    message: Option<MessageField>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MessageField {
    One(String),
    Many(Vec<String>),
}

impl ServerErrorBody {
    fn parse(body: &str) -> Option<String> {
        let parsed: ServerErrorBody = serde_json::from_str(body).ok()?;
        match parsed.message {
            Some(MessageField::One(msg)) if !msg.is_empty() => Some(msg),
            Some(MessageField::Many(msgs)) if !msgs.is_empty() => Some(msgs.join("; ")),
            _ => parsed.error.filter(|e| !e.is_empty()),
        }
    }
}

fn default_message(status: u16) -> String {
    match status {
        400 => "invalid data".to_string(),
        401 => "session expired".to_string(),
        403 => "permission denied, contact an administrator".to_string(),
        404 => "resource not found".to_string(),
        409 => "conflicting state".to_string(),
        s if s >= 500 => "server error, please try again".to_string(),
        s => format!("unexpected status {}", s),
    }
}
