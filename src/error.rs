use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlogError {
    #[error("Catalog source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Text backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Publish failed with HTTP status {status}: {body}")]
    PublishStatus { status: StatusCode, body: String },

    #[error("Publish failed: {0}")]
    PublishFailure(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Config error: {0}")]
    Config(String),
}

/// Result of a best-effort lookup: either the nominal value or the
/// built-in substitute used when the real source was unavailable.
#[derive(Debug, Clone, PartialEq)]
pub enum Tiered<T> {
    Primary(T),
    Fallback(T),
}

impl<T> Tiered<T> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Tiered::Fallback(_))
    }

    pub fn get(&self) -> &T {
        match self {
            Tiered::Primary(v) | Tiered::Fallback(v) => v,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Tiered::Primary(v) | Tiered::Fallback(v) => v,
        }
    }
}
