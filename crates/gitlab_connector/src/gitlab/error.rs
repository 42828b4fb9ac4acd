//! GitLab API error types.

use thiserror::Error;

use crate::http::HttpError;

/// Errors from the GitLab API or the transport underneath it.
///
/// Conflict and not-found carry their own variants so mutation callers
/// can classify idempotent outcomes without string matching.
#[derive(Debug, Error)]
pub enum GitlabError {
    #[error("gitlab API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("gitlab authentication failed ({status}): {message}")]
    Auth { status: u16, message: String },

    #[error("gitlab resource not found: {0}")]
    NotFound(String),

    #[error("gitlab conflict: {0}")]
    Conflict(String),

    #[error("http transport error: {0}")]
    Transport(String),

    #[error("gitlab response could not be decoded: {0}")]
    Json(#[from] serde_json::Error),

    #[error("gitlab client configuration error: {0}")]
    Config(String),
}

impl GitlabError {
    /// Classify a non-2xx status and response body into a typed error.
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        let message = String::from_utf8_lossy(body).to_string();
        match status {
            401 | 403 => Self::Auth { status, message },
            404 => Self::NotFound(message),
            409 => Self::Conflict(message),
            _ => Self::Api { status, message },
        }
    }
}

impl From<HttpError> for GitlabError {
    fn from(err: HttpError) -> Self {
        Self::Transport(err.to_string())
    }
}
