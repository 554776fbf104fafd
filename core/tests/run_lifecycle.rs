//! Drives `CollectionRunAction` against real child processes.
//!
//! The commands are hand-written `sh -c` scripts standing in for newman, so
//! these tests only run on unix.
#![cfg(unix)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use postman_ext_core::api::{
    ApiError, CollectionRunAction, CollectionSummary, EnvironmentSummary, LocalSupervisor,
    MessageLevel, PostmanCatalog, RunSettings, RunState, StatusResult,
};
use postman_ext_core::report::{ReportPaths, HTML_ARTIFACT_LABEL, SUMMARY_ARTIFACT_LABEL};

struct EmptyCatalog;

#[async_trait]
impl PostmanCatalog for EmptyCatalog {
    fn name(&self) -> &str {
        "empty"
    }

    async fn list_collections(&self) -> Result<Vec<CollectionSummary>, ApiError> {
        Ok(vec![])
    }

    async fn list_environments(&self) -> Result<Vec<EnvironmentSummary>, ApiError> {
        Ok(vec![])
    }
}

fn action(artifact_dir: &Path) -> CollectionRunAction {
    action_with_grace(artifact_dir, Duration::from_secs(5))
}

fn action_with_grace(artifact_dir: &Path, stop_grace: Duration) -> CollectionRunAction {
    CollectionRunAction::new(
        RunSettings {
            executable: "newman".into(),
            base_url: "https://api.getpostman.com".into(),
            api_key: "KEY".into(),
            artifact_dir: artifact_dir.to_path_buf(),
            stop_grace,
        },
        Arc::new(EmptyCatalog),
        Arc::new(LocalSupervisor::new()),
    )
}

fn script(body: &str, token: &str) -> RunState {
    RunState {
        command: vec!["sh".into(), "-c".into(), body.into()],
        pid: None,
        process_handle: None,
        timestamp: token.into(),
    }
}

/// Polls status until the run completes; returns every message seen and the
/// final result.
async fn poll_until_completed(
    action: &CollectionRunAction,
    state: &RunState,
) -> (Vec<String>, StatusResult) {
    let mut seen = Vec::new();
    for _ in 0..200 {
        let status = action.status(state).await.unwrap();
        seen.extend(status.messages.iter().map(|m| m.message.clone()));
        if status.completed {
            return (seen, status);
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("run did not complete; messages so far: {seen:?}");
}

#[tokio::test]
async fn successful_run_completes_without_error() {
    let dir = tempfile::tempdir().unwrap();
    let action = action(dir.path());

    let started = action
        .start(script("echo first; echo second", "tok-ok"))
        .await
        .unwrap();
    assert!(started.state.pid.is_some());
    assert!(started.state.command.is_empty());
    assert!(started.messages[0].message.starts_with("Started newman"));

    let (seen, last) = poll_until_completed(&action, &started.state).await;
    assert!(last.error.is_none());
    assert_eq!(seen, vec!["first".to_string(), "second".to_string()]);

    let stopped = action.stop(&started.state).await.unwrap();
    assert!(stopped.error.is_none());
    assert!(stopped.artifacts.is_empty());
    assert_eq!(action.active_runs(), 0);
}

#[tokio::test]
async fn failed_assertions_are_reported_from_summary() {
    let dir = tempfile::tempdir().unwrap();
    let action = action(dir.path());
    let token = "tok-fail";
    let reports = ReportPaths::new(dir.path(), token);
    std::fs::write(
        &reports.summary,
        serde_json::json!({
            "Run": {
                "Stats": {
                    "Requests": {"total": 3, "pending": 0, "failed": 0},
                    "Assertions": {"total": 4, "pending": 0, "failed": 2}
                },
                "Failures": [
                    {"error": {"test": "Status code is 200", "message": "expected 500 to equal 200"}}
                ]
            }
        })
        .to_string(),
    )
    .unwrap();

    let started = action.start(script("exit 1", token)).await.unwrap();
    let (seen, last) = poll_until_completed(&action, &started.state).await;

    let err = last.error.expect("non-zero exit must carry an error");
    assert_eq!(err.title, "2 assertions failed");
    assert_eq!(err.detail.as_deref(), Some("exit code 1"));
    assert!(seen.contains(&"Status code is 200: expected 500 to equal 200".to_string()));
    assert!(last
        .messages
        .iter()
        .any(|m| m.level == MessageLevel::Error));

    let stopped = action.stop(&started.state).await.unwrap();
    assert!(stopped.error.is_none());
    assert_eq!(stopped.artifacts.len(), 1);
    assert_eq!(stopped.artifacts[0].label, SUMMARY_ARTIFACT_LABEL);
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(&stopped.artifacts[0].data)
        .unwrap();
    assert_eq!(decoded, std::fs::read(&reports.summary).unwrap());
}

#[tokio::test]
async fn stop_kills_running_process_and_flushes_partial_line() {
    let dir = tempfile::tempdir().unwrap();
    let action = action(dir.path());
    let reports = ReportPaths::new(dir.path(), "tok-stop");
    std::fs::write(&reports.html, "<html></html>").unwrap();

    let started = action
        .start(script("printf 'line1\\npartial'; exec sleep 30", "tok-stop"))
        .await
        .unwrap();

    // Wait for the complete line; the unterminated tail must stay buffered.
    let mut seen = Vec::new();
    for _ in 0..200 {
        let status = action.status(&started.state).await.unwrap();
        assert!(!status.completed);
        seen.extend(status.messages.into_iter().map(|m| m.message));
        if !seen.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    assert_eq!(seen, vec!["line1".to_string()]);

    let stopped = action.stop(&started.state).await.unwrap();
    let messages: Vec<&str> = stopped.messages.iter().map(|m| m.message.as_str()).collect();
    assert_eq!(messages[0], "partial");
    assert!(stopped.messages.iter().any(|m| {
        m.level == MessageLevel::Warn && m.message.contains("stopped before completion")
    }));
    assert_eq!(stopped.artifacts.len(), 1);
    assert_eq!(stopped.artifacts[0].label, HTML_ARTIFACT_LABEL);
    assert_eq!(action.active_runs(), 0);
}

#[tokio::test]
async fn stop_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let action = action(dir.path());

    let started = action
        .start(script("exec sleep 30", "tok-twice"))
        .await
        .unwrap();

    let first = action.stop(&started.state).await.unwrap();
    assert!(first.error.is_none());
    assert!(!first.messages.is_empty());

    let second = action.stop(&started.state).await.unwrap();
    assert!(second.error.is_none());
    assert!(second.messages.is_empty());
    assert!(second.artifacts.is_empty());

    // The record is gone, so status can no longer find the process.
    assert!(action.status(&started.state).await.is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn overlapping_stops_both_succeed() {
    let dir = tempfile::tempdir().unwrap();
    let action = Arc::new(action_with_grace(dir.path(), Duration::from_millis(200)));

    let started = action
        .start(script("sleep 30 & sleep 30", "tok-race"))
        .await
        .unwrap();

    let first = {
        let action = Arc::clone(&action);
        let state = started.state.clone();
        tokio::spawn(async move { action.stop(&state).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    let second = action.stop(&started.state).await.unwrap();
    let first = first.await.unwrap().unwrap();

    assert!(first.error.is_none());
    assert!(second.error.is_none());
    assert_eq!(action.active_runs(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_runs_keep_their_output_apart() {
    let dir = tempfile::tempdir().unwrap();
    let action = Arc::new(action(dir.path()));

    let alpha = action
        .start(script("echo alpha-1; echo alpha-2; echo alpha-3", "tok-alpha"))
        .await
        .unwrap();
    let beta = action
        .start(script("echo beta-1; echo beta-2", "tok-beta"))
        .await
        .unwrap();
    assert_ne!(alpha.state.process_handle, beta.state.process_handle);
    assert_eq!(action.active_runs(), 2);

    let poll = |state: RunState| {
        let action = Arc::clone(&action);
        tokio::spawn(async move { poll_until_completed(&action, &state).await })
    };
    let alpha_task = poll(alpha.state.clone());
    let beta_task = poll(beta.state.clone());
    let (alpha_seen, alpha_last) = alpha_task.await.unwrap();
    let (beta_seen, beta_last) = beta_task.await.unwrap();

    assert!(alpha_last.error.is_none());
    assert!(beta_last.error.is_none());
    assert_eq!(alpha_seen, vec!["alpha-1", "alpha-2", "alpha-3"]);
    assert_eq!(beta_seen, vec!["beta-1", "beta-2"]);

    action.stop(&alpha.state).await.unwrap();
    action.stop(&beta.state).await.unwrap();
    assert_eq!(action.active_runs(), 0);
}

#[tokio::test]
async fn start_rejects_already_started_state() {
    let dir = tempfile::tempdir().unwrap();
    let action = action(dir.path());

    let started = action.start(script("exit 0", "tok-dup")).await.unwrap();
    let again = action.start(started.state.clone()).await;
    assert!(again.is_err());

    action.stop(&started.state).await.unwrap();
}
