use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::process::{ExitState, ProcessHandle};

/// State blob the platform hands back on every lifecycle call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunState {
    /// newman argv; emptied once the process is started.
    #[serde(default)]
    pub command: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_handle: Option<ProcessHandle>,

    /// Run token; namespaces the report files of this run.
    #[serde(default)]
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunPhase {
    Created,
    Running,
    Completed,
    Failed,
}

impl RunPhase {
    pub fn of(state: &RunState, exit: Option<ExitState>) -> Self {
        match (state.process_handle, exit) {
            (None, _) => RunPhase::Created,
            (Some(_), None) => RunPhase::Running,
            (Some(_), Some(e)) if e.success() => RunPhase::Completed,
            (Some(_), Some(_)) => RunPhase::Failed,
        }
    }
}

/// Second-resolution UTC timestamp plus a random suffix, e.g. `20240501T101500Z-3f9a1c2e`.
pub fn new_run_token() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", Utc::now().format("%Y%m%dT%H%M%SZ"), &suffix[..8])
}
