use serde::{Deserialize, Serialize};

/// Signal deaths map to `128 + signal`, like a shell would report them.
pub fn normalize_exit(status: std::process::ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        match (status.code(), status.signal()) {
            (Some(code), _) => code,
            (None, Some(sig)) => 128 + sig,
            (None, None) => 1,
        }
    }
    #[cfg(not(unix))]
    {
        status.code().unwrap_or(1)
    }
}

/// Terminal state of a supervised process. Written once by the waiter task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitState {
    pub code: i32,
    /// Set when the process ended because `kill` was requested.
    pub killed: bool,
}

impl ExitState {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}
