// core/src/error/process_error.rs
use thiserror::Error;

use crate::process::ProcessHandle;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("command is empty")]
    EmptyCommand,

    #[error("failed to spawn process: {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no process registered for handle {0}")]
    NotFound(ProcessHandle),

    #[error("failed to signal process {pid}")]
    Signal {
        pid: u32,
        #[source]
        source: std::io::Error,
    },
}
