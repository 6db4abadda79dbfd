//! API error model.
//!
//! Two tiers: client-caused failures (400/401/403/404/409) carry a message
//! that is passed through to the client; internal failures (500) carry a
//! detail string that is logged server-side and replaced with a generic
//! message on the wire.

use thiserror::Error;

/// Result type used across the backend.
pub type ApiResult<T> = Result<T, ApiError>;

/// Application-level failure with an explicit HTTP status.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Malformed or out-of-range client input.
    #[error("{0}")]
    BadRequest(String),

    /// Missing, malformed, or expired credential.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated, but the resource belongs to someone else.
    #[error("{0}")]
    Forbidden(String),

    /// Resource (or route) does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Uniqueness conflict (e.g. duplicate course name for a user).
    #[error("{0}")]
    Conflict(String),

    /// Anything the client cannot fix. Detail stays server-side.
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal(detail.into())
    }

    /// HTTP status code for this failure.
    pub fn status(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Internal(_) => 500,
        }
    }

    /// Message safe to send to the client.
    ///
    /// Internal detail is never exposed; callers log it separately.
    pub fn client_message(&self) -> &str {
        match self {
            Self::BadRequest(m)
            | Self::Unauthorized(m)
            | Self::Forbidden(m)
            | Self::NotFound(m)
            | Self::Conflict(m) => m,
            Self::Internal(_) => "Internal server error",
        }
    }

    /// Server-side detail for logging. Equal to the client message for
    /// client-tier errors.
    pub fn detail(&self) -> &str {
        match self {
            Self::Internal(d) => d,
            other => other.client_message(),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(format!("serialization failed: {err}"))
    }
}
