//! Error types for token lifecycle operations

/// Errors from token acquisition, refresh, storage, and authenticated calls.
///
/// Upstream variants carry the HTTP status (absent on transport errors) and
/// the response body when one could be read, so callers can log what the
/// server actually said.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("authentication failed: {message}")]
    AuthFailure {
        status: Option<u16>,
        message: String,
        body: Option<String>,
    },

    #[error("token refresh failed: {message}")]
    RefreshFailure {
        status: Option<u16>,
        message: String,
        body: Option<String>,
    },

    #[error("not authenticated: {0}")]
    NotAuthenticated(String),

    #[error("API request failed: {message}")]
    RequestFailure {
        status: Option<u16>,
        message: String,
        body: Option<String>,
    },

    #[error("token store error: {0}")]
    Store(String),
}

impl Error {
    pub(crate) fn auth(status: Option<u16>, message: String, body: Option<String>) -> Self {
        Error::AuthFailure {
            status,
            message,
            body,
        }
    }

    pub(crate) fn refresh(status: Option<u16>, message: String, body: Option<String>) -> Self {
        Error::RefreshFailure {
            status,
            message,
            body,
        }
    }

    pub(crate) fn request(status: Option<u16>, message: String, body: Option<String>) -> Self {
        Error::RequestFailure {
            status,
            message,
            body,
        }
    }

    /// HTTP status returned by the upstream, if the failure came from one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::AuthFailure { status, .. }
            | Error::RefreshFailure { status, .. }
            | Error::RequestFailure { status, .. } => *status,
            Error::NotAuthenticated(_) | Error::Store(_) => None,
        }
    }

    /// Upstream response body, if one was received.
    pub fn body(&self) -> Option<&str> {
        match self {
            Error::AuthFailure { body, .. }
            | Error::RefreshFailure { body, .. }
            | Error::RequestFailure { body, .. } => body.as_deref(),
            Error::NotAuthenticated(_) | Error::Store(_) => None,
        }
    }
}

/// Result alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;
