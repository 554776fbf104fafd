use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::classify::classify_exit;
use super::config::RunConfig;
use super::state::{new_run_token, RunPhase, RunState};
use crate::action::{
    ExtensionError, Message, PrepareRequest, StateResult, StatusResult, StopResult,
};
use crate::catalog::{resolve_environment, PostmanCatalog};
use crate::command::{build_command, mask_secret, CommandSpec};
use crate::config::AppConfig;
use crate::error::{ActionError, ProcessError};
use crate::process::{ProcessHandle, ProcessSupervisor};
use crate::report::{collect_artifacts, read_summary, ReportPaths};

/// Settings the lifecycle needs from [`AppConfig`].
#[derive(Clone)]
pub struct RunSettings {
    pub executable: String,
    pub base_url: String,
    pub api_key: String,
    pub artifact_dir: PathBuf,
    pub stop_grace: Duration,
}

impl RunSettings {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            executable: cfg.runner.executable.clone(),
            base_url: cfg.postman.base_url.clone(),
            api_key: cfg.postman.api_key.clone(),
            artifact_dir: cfg.runner.artifact_dir(),
            stop_grace: Duration::from_millis(cfg.runner.stop_grace_ms),
        }
    }

    fn reports(&self, token: &str) -> ReportPaths {
        ReportPaths::new(&self.artifact_dir, token)
    }
}

impl std::fmt::Debug for RunSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunSettings")
            .field("executable", &self.executable)
            .field("base_url", &self.base_url)
            .field("api_key", &"*****")
            .field("artifact_dir", &self.artifact_dir)
            .field("stop_grace", &self.stop_grace)
            .finish()
    }
}

/// Prepare -> Start -> Status* -> Stop for one newman collection run.
pub struct CollectionRunAction {
    settings: RunSettings,
    catalog: Arc<dyn PostmanCatalog>,
    supervisor: Arc<dyn ProcessSupervisor>,
}

impl CollectionRunAction {
    pub fn new(
        settings: RunSettings,
        catalog: Arc<dyn PostmanCatalog>,
        supervisor: Arc<dyn ProcessSupervisor>,
    ) -> Self {
        Self {
            settings,
            catalog,
            supervisor,
        }
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Processes started and not yet stopped.
    pub fn active_runs(&self) -> usize {
        self.supervisor.active()
    }

    pub async fn prepare(
        &self,
        request: &PrepareRequest,
    ) -> Result<StateResult<RunState>, ActionError> {
        let config = RunConfig::from_request(request)?;

        let environment_id = match config.environment.as_deref() {
            Some(selector) => Some(resolve_environment(self.catalog.as_ref(), selector).await?),
            None => None,
        };

        let token = new_run_token();
        let reports = self.settings.reports(&token);
        let command = build_command(&CommandSpec {
            executable: &self.settings.executable,
            base_url: &self.settings.base_url,
            api_key: &self.settings.api_key,
            collection_id: &config.collection_id,
            environment_id: environment_id.as_deref(),
            config: &config,
            reports: &reports,
        });

        info!(
            run = %token,
            collection_id = %config.collection_id,
            command = %mask_secret(&command, &self.settings.api_key),
            "prepared collection run"
        );

        Ok(StateResult {
            state: RunState {
                command,
                pid: None,
                process_handle: None,
                timestamp: token,
            },
            messages: Vec::new(),
        })
    }

    pub async fn start(&self, mut state: RunState) -> Result<StateResult<RunState>, ActionError> {
        if state.process_handle.is_some() {
            return Err(ActionError::InvalidState("run already started".into()));
        }
        if state.command.is_empty() {
            return Err(ActionError::InvalidState(
                "no command to start; prepare the run first".into(),
            ));
        }

        info!(
            run = %state.timestamp,
            command = %mask_secret(&state.command, &self.settings.api_key),
            "starting newman"
        );
        let started = self.supervisor.start(&state.command).await?;

        state.pid = Some(started.pid);
        state.process_handle = Some(started.handle);
        state.command.clear();

        Ok(StateResult {
            state,
            messages: vec![Message::info(format!(
                "Started newman (pid {})",
                started.pid
            ))],
        })
    }

    pub async fn status(&self, state: &RunState) -> Result<StatusResult, ActionError> {
        let handle = started_handle(state)?;

        let exit = self.supervisor.exit_state(handle)?;
        // Output is fully drained once the exit state is published.
        let lines = self.supervisor.read_lines(handle, exit.is_some())?;
        let mut messages = lines_to_messages(lines);

        let phase = RunPhase::of(state, exit);
        debug!(run = %state.timestamp, ?phase, "status polled");

        let Some(exit) = exit else {
            return Ok(StatusResult {
                completed: false,
                error: None,
                messages,
            });
        };

        let classification =
            classify_exit(exit, read_summary(&self.settings.reports(&state.timestamp).summary));
        messages.extend(classification.messages);
        if let Some(err) = &classification.error {
            info!(run = %state.timestamp, code = exit.code, title = %err.title, "newman run failed");
        } else {
            info!(run = %state.timestamp, "newman run completed");
        }

        Ok(StatusResult {
            completed: true,
            error: classification.error,
            messages,
        })
    }

    /// Safe to repeat: a run that is already gone yields whatever artifacts
    /// are still on disk.
    pub async fn stop(&self, state: &RunState) -> Result<StopResult, ActionError> {
        let mut result = StopResult::default();

        if let Some(handle) = state.process_handle {
            self.stop_process(state, handle, &mut result).await?;
        } else {
            debug!(run = %state.timestamp, "stop on a run that was never started");
        }

        if !state.timestamp.is_empty() {
            let collected = collect_artifacts(&self.settings.reports(&state.timestamp));
            result.artifacts = collected.artifacts;
            if let Some(err) = collected.errors.first() {
                result.error = Some(ExtensionError::from_error(
                    "failed to read run report",
                    Some(err as &(dyn std::error::Error + 'static)),
                ));
            }
        }

        info!(
            run = %state.timestamp,
            artifacts = result.artifacts.len(),
            "collection run stopped"
        );
        Ok(result)
    }

    /// A missing record at any step means another stop already released the
    /// process.
    async fn stop_process(
        &self,
        state: &RunState,
        handle: ProcessHandle,
        result: &mut StopResult,
    ) -> Result<(), ActionError> {
        match self.terminate(state, handle, result).await {
            Ok(()) => Ok(()),
            Err(ProcessError::NotFound(_)) => {
                debug!(run = %state.timestamp, handle = %handle, "process already released");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn terminate(
        &self,
        state: &RunState,
        handle: ProcessHandle,
        result: &mut StopResult,
    ) -> Result<(), ProcessError> {
        self.supervisor.kill(handle)?;
        let exit = self
            .supervisor
            .wait(handle, self.settings.stop_grace)
            .await?;
        result
            .messages
            .extend(lines_to_messages(self.supervisor.read_lines(handle, true)?));

        match exit {
            None => {
                warn!(run = %state.timestamp, pid = ?state.pid, "newman did not exit in time");
                result.messages.push(Message::warn(
                    "newman did not exit within the stop grace period",
                ));
            }
            Some(exit) if exit.killed => {
                result.messages.push(Message::warn(format!(
                    "newman run was stopped before completion (exit code {})",
                    exit.code
                )));
            }
            Some(exit) if !exit.success() => {
                let classification = classify_exit(
                    exit,
                    read_summary(&self.settings.reports(&state.timestamp).summary),
                );
                if let Some(err) = classification.error {
                    result.messages.push(Message::error(err.title));
                }
                result.messages.extend(classification.messages);
            }
            Some(_) => {}
        }

        self.supervisor.dispose(handle).await
    }
}

fn started_handle(state: &RunState) -> Result<ProcessHandle, ActionError> {
    state
        .process_handle
        .ok_or_else(|| ActionError::InvalidState("run has not been started".into()))
}

fn lines_to_messages(lines: Vec<String>) -> Vec<Message> {
    lines
        .into_iter()
        .map(|line| Message::info(line.trim_end_matches(&['\n', '\r'][..])))
        .collect()
}
