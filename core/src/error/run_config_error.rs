// core/src/error/run_config_error.rs
use thiserror::Error;

/// Malformed or missing action input, raised before any process is touched.
#[derive(Debug, Error)]
pub enum RunConfigError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("field '{field}' must be {expected}")]
    InvalidType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("field '{field}' is out of range: {value}")]
    OutOfRange { field: &'static str, value: String },
}
