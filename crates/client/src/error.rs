//! Client-wide error types.

use reqwest::StatusCode;
use thiserror::Error;

/// Client-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Client-wide error type.
///
/// HTTP statuses other than 401 are classified here but otherwise passed
/// through to the caller unchanged; only 401 participates in the
/// refresh-and-retry protocol.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Not authenticated")]
    Unauthorized,

    #[error("Permission denied: {message}")]
    Forbidden { message: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Server error (status={status}): {message}")]
    Server { status: u16, message: String },

    #[error("API error (status={status}): {message}")]
    Api { status: u16, message: String },

    #[error("Session expired: {0}")]
    SessionExpired(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Build the classified error for a non-success HTTP status.
    ///
    /// 401 is mapped to [`Error::Unauthorized`]; callers in the pipeline
    /// intercept that variant before it reaches user code.
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized,
            StatusCode::FORBIDDEN => Self::Forbidden { message },
            StatusCode::NOT_FOUND => Self::NotFound { resource: message },
            s if s.is_server_error() => Self::Server {
                status: s.as_u16(),
                message,
            },
            s => Self::Api {
                status: s.as_u16(),
                message,
            },
        }
    }

    /// Whether this error means the session is gone and the user must log in
    /// again (forced-logout paths surface these).
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::SessionExpired(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_statuses() {
        assert!(matches!(
            Error::from_status(StatusCode::UNAUTHORIZED, "x".into()),
            Error::Unauthorized
        ));
        assert!(matches!(
            Error::from_status(StatusCode::FORBIDDEN, "x".into()),
            Error::Forbidden { .. }
        ));
        assert!(matches!(
            Error::from_status(StatusCode::NOT_FOUND, "x".into()),
            Error::NotFound { .. }
        ));
        assert!(matches!(
            Error::from_status(StatusCode::INTERNAL_SERVER_ERROR, "x".into()),
            Error::Server { status: 500, .. }
        ));
        assert!(matches!(
            Error::from_status(StatusCode::CONFLICT, "x".into()),
            Error::Api { status: 409, .. }
        ));
    }

    #[test]
    fn requires_login_variants() {
        assert!(Error::Unauthorized.requires_login());
        assert!(Error::SessionExpired("refresh failed".into()).requires_login());
        assert!(!Error::not_found("project").requires_login());
    }
}
