// core/src/error/api_error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid postman base url: {0}")]
    InvalidBaseUrl(String),

    #[error("request timeout")]
    Timeout,

    #[error("unauthorized (check api key)")]
    Unauthorized,

    #[error("rate limited")]
    RateLimited,

    #[error("unexpected status: {status}")]
    HttpStatus { status: u16, body_snippet: String },

    #[error("transport error")]
    Transport(#[source] anyhow::Error),

    #[error("decode/serde error")]
    Decode(#[source] anyhow::Error),
}

impl ApiError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Timeout | ApiError::RateLimited)
    }
}
