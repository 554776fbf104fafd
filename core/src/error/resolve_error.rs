// core/src/error/resolve_error.rs
use thiserror::Error;

use super::api_error::ApiError;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("found multiple environments with name '{0}'")]
    AmbiguousName(String),

    #[error("failed to find environment with name '{0}'")]
    NotFound(String),

    #[error("failed to list environments")]
    Catalog(#[from] ApiError),
}
