use thiserror::Error;

/// Error type for backend API operations
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response. `message` carries the server's `detail` field when
    /// one was sent, otherwise the HTTP status line.
    #[error("{message}")]
    Status {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("invalid base URL: {0}")]
    BadBaseUrl(String),

    #[error("auth token must not be empty")]
    EmptyToken,
}

impl ApiError {
    /// HTTP status of the failing response, when the server answered at all.
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status(),
            _ => None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
