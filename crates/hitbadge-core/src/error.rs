//! Shared error type across hitbadge crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// A required query parameter is missing or empty.
    MissingParameter,
    /// Invalid input / malformed configuration.
    BadRequest,
    /// Counter store could not be reached.
    StoreUnavailable,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in logs and tests.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::MissingParameter => "MISSING_PARAMETER",
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::StoreUnavailable => "STORE_UNAVAILABLE",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }

    /// HTTP status the transport should answer with.
    pub fn http_status(self) -> u16 {
        match self {
            ClientCode::MissingParameter | ClientCode::BadRequest => 400,
            ClientCode::StoreUnavailable => 503,
            ClientCode::UnsupportedVersion | ClientCode::Internal => 500,
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, HitBadgeError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum HitBadgeError {
    #[error("missing parameter: {0}")]
    MissingParameter(&'static str),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("render failure: {0}")]
    RenderFailure(String),
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl HitBadgeError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            HitBadgeError::MissingParameter(_) => ClientCode::MissingParameter,
            HitBadgeError::BadRequest(_) => ClientCode::BadRequest,
            HitBadgeError::RenderFailure(_) => ClientCode::Internal,
            HitBadgeError::StoreUnavailable(_) => ClientCode::StoreUnavailable,
            HitBadgeError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            HitBadgeError::Internal(_) => ClientCode::Internal,
        }
    }
}
