//! # Client Errors
//!
//! One root error type for every failure the client can surface.
//! Callers match the whole enum or narrow on [`ErrorKind`].

use thiserror::Error;

/// Result type for client operations
pub type ChemSpiderResult<T> = Result<T, ChemSpiderError>;

/// Coarse classification of a [`ChemSpiderError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad input, caught before any I/O
    Validation,
    /// Credential rejected
    Auth,
    /// Identifier or record absent
    NotFound,
    /// Response shape mismatch
    Parse,
    /// No response within deadline
    Timeout,
    /// Remote failure or declared query failure
    Server,
    /// Any other HTTP or connection failure
    Http,
}

/// Client errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChemSpiderError {
    // ==================
    // Local Errors
    // ==================
    /// Invalid input rejected before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    // ==================
    // Remote Errors
    // ==================
    /// API key missing or rejected (401/403)
    #[error("Unauthorized ({status}): {message}")]
    Auth { status: u16, message: String },

    /// Record or resource not found (404 or empty payload)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed request (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// HTTP method rejected by the endpoint (405)
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// Request body too large (413)
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Too many requests in a given amount of time (429)
    #[error("Too many requests: {0}")]
    RateLimited(String),

    /// Remote server failure (5xx)
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Unclassified non-success HTTP status
    #[error("HTTP error ({status}): {message}")]
    Http { status: u16, message: String },

    /// Asynchronous query reached a failed terminal state
    #[error("Query failed ({status}): {message}")]
    QueryFailed { status: String, message: String },

    // ==================
    // Transport / Decoding
    // ==================
    /// Response body did not match the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// No response within the deadline
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Connection-level failure
    #[error("Transport error: {0}")]
    Transport(String),
}

impl ChemSpiderError {
    /// Classify a non-success HTTP status
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 => ChemSpiderError::BadRequest(message),
            401 | 403 => ChemSpiderError::Auth { status, message },
            404 => ChemSpiderError::NotFound(message),
            405 => ChemSpiderError::MethodNotAllowed(message),
            413 => ChemSpiderError::PayloadTooLarge(message),
            429 => ChemSpiderError::RateLimited(message),
            500..=599 => ChemSpiderError::Server { status, message },
            _ => ChemSpiderError::Http { status, message },
        }
    }

    /// Coarse kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChemSpiderError::Validation(_) | ChemSpiderError::Config(_) => ErrorKind::Validation,
            ChemSpiderError::Auth { .. } => ErrorKind::Auth,
            ChemSpiderError::NotFound(_) => ErrorKind::NotFound,
            ChemSpiderError::Parse(_) => ErrorKind::Parse,
            ChemSpiderError::Timeout(_) => ErrorKind::Timeout,
            ChemSpiderError::Server { .. } | ChemSpiderError::QueryFailed { .. } => {
                ErrorKind::Server
            }
            ChemSpiderError::BadRequest(_)
            | ChemSpiderError::MethodNotAllowed(_)
            | ChemSpiderError::PayloadTooLarge(_)
            | ChemSpiderError::RateLimited(_)
            | ChemSpiderError::Http { .. }
            | ChemSpiderError::Transport(_) => ErrorKind::Http,
        }
    }

    /// Stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            ChemSpiderError::Validation(_) => "CHEMSPIDER_VALIDATION",
            ChemSpiderError::Config(_) => "CHEMSPIDER_CONFIG",
            ChemSpiderError::Auth { .. } => "CHEMSPIDER_AUTH",
            ChemSpiderError::NotFound(_) => "CHEMSPIDER_NOT_FOUND",
            ChemSpiderError::BadRequest(_) => "CHEMSPIDER_BAD_REQUEST",
            ChemSpiderError::MethodNotAllowed(_) => "CHEMSPIDER_METHOD_NOT_ALLOWED",
            ChemSpiderError::PayloadTooLarge(_) => "CHEMSPIDER_PAYLOAD_TOO_LARGE",
            ChemSpiderError::RateLimited(_) => "CHEMSPIDER_RATE_LIMITED",
            ChemSpiderError::Server { .. } => "CHEMSPIDER_SERVER",
            ChemSpiderError::Http { .. } => "CHEMSPIDER_HTTP",
            ChemSpiderError::QueryFailed { .. } => "CHEMSPIDER_QUERY_FAILED",
            ChemSpiderError::Parse(_) => "CHEMSPIDER_PARSE",
            ChemSpiderError::Timeout(_) => "CHEMSPIDER_TIMEOUT",
            ChemSpiderError::Transport(_) => "CHEMSPIDER_TRANSPORT",
        }
    }

    /// HTTP status associated with this error, if it came from a response
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ChemSpiderError::Auth { status, .. }
            | ChemSpiderError::Server { status, .. }
            | ChemSpiderError::Http { status, .. } => Some(*status),
            ChemSpiderError::NotFound(_) => Some(404),
            ChemSpiderError::BadRequest(_) => Some(400),
            ChemSpiderError::MethodNotAllowed(_) => Some(405),
            ChemSpiderError::PayloadTooLarge(_) => Some(413),
            ChemSpiderError::RateLimited(_) => Some(429),
            _ => None,
        }
    }

    /// Whether the caller supplied something invalid
    pub fn is_client_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::Validation | ErrorKind::Auth | ErrorKind::NotFound)
            || matches!(self.status_code(), Some(s) if (400..500).contains(&s))
    }
}

impl From<serde_json::Error> for ChemSpiderError {
    fn from(err: serde_json::Error) -> Self {
        ChemSpiderError::Parse(err.to_string())
    }
}
