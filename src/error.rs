//! Error types shared by the library and the HTTP service.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScribeError {
    #[error("{0}")]
    Validation(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// The record store or user directory could not be read or written.
    /// Never to be reported as an empty result.
    #[error("record retrieval failed: {0}")]
    Retrieval(String),

    #[error("language model error: {0}")]
    Model(String),

    #[error("speech service error: {0}")]
    Speech(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type ScribeResult<T> = Result<T, ScribeError>;

impl ScribeError {
    pub fn validation(message: impl Into<String>) -> Self {
        ScribeError::Validation(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ScribeError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ScribeError::NotFound(message.into())
    }

    /// True for failures caused by the caller rather than by this service
    /// or one of its upstreams.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ScribeError::Validation(_)
                | ScribeError::Unauthorized
                | ScribeError::Forbidden(_)
                | ScribeError::NotFound(_)
                | ScribeError::Conflict(_)
        )
    }
}
