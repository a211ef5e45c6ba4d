use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err)
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

/// Failures on the tracking side. None of these ever reach the visitor; they
/// surface through logs and the outbox failure channel.
#[derive(Debug, Error)]
pub enum TrackError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("insert rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("outbox is full")]
    QueueFull,

    #[error("outbox is closed")]
    QueueClosed,

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),
}

impl TrackError {
    /// Whether another attempt at the same insert could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Transport(_) => true,
            Self::Rejected { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
