// core/src/error/action_error.rs
use thiserror::Error;

use super::{ProcessError, ReportError, ResolveError, RunConfigError};
use crate::action::ExtensionError;

/// Failure of a lifecycle transition. Reported to the platform as an
/// [`ExtensionError`]; a non-zero newman exit is never one of these.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("invalid action configuration")]
    Config(#[from] RunConfigError),

    #[error("failed to resolve postman environment")]
    Resolve(#[from] ResolveError),

    #[error("failed to control newman process")]
    Process(#[from] ProcessError),

    #[error("failed to read run report")]
    Report(#[from] ReportError),

    #[error("invalid action state: {0}")]
    InvalidState(String),
}

impl ActionError {
    pub fn to_extension_error(&self) -> ExtensionError {
        let source: &(dyn std::error::Error + 'static) = self;
        ExtensionError::from_error(&self.to_string(), Some(source))
    }
}

/// Renders the `#[source]` chain below the top-level message.
pub fn source_chain(err: &(dyn std::error::Error + 'static)) -> Option<String> {
    let mut parts = Vec::new();
    let mut cur = err.source();
    while let Some(e) = cur {
        parts.push(e.to_string());
        cur = e.source();
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(": "))
    }
}
