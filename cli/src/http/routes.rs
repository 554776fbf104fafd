//! Route table and handlers for the action and discovery endpoints.

use axum::{
    extract::State,
    middleware,
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use chrono::Local;
use serde::{de::DeserializeOwned, Serialize};

use postman_ext_core::api::{
    action_list, collection_run_description, ActionDescription, ActionList, PrepareRequest,
    RunState, StateRequest, StateResult, StatusResult, StopResult, ACTION_BASE_PATH,
};
use postman_ext_plugins::discovery::{
    self, AttributeDescriptions, DiscoveredTargets, DiscoveryDescription, DiscoveryList,
    TargetDescription, DISCOVERY_BASE_PATH,
};

use crate::http::{error::HttpServerError, middleware::track_requests, state::AppState};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route(ACTION_BASE_PATH, get(describe_handler))
        .route(&format!("{ACTION_BASE_PATH}/prepare"), post(prepare_handler))
        .route(&format!("{ACTION_BASE_PATH}/start"), post(start_handler))
        .route(&format!("{ACTION_BASE_PATH}/status"), post(status_handler))
        .route(&format!("{ACTION_BASE_PATH}/stop"), post(stop_handler))
        .route("/discovery", get(discovery_list_handler))
        .route(DISCOVERY_BASE_PATH, get(discovery_description_handler))
        .route(
            &format!("{DISCOVERY_BASE_PATH}/target-description"),
            get(target_description_handler),
        )
        .route(
            &format!("{DISCOVERY_BASE_PATH}/attribute-descriptions"),
            get(attribute_descriptions_handler),
        )
        .route(
            &format!("{DISCOVERY_BASE_PATH}/discovered-targets"),
            get(discovered_targets_handler),
        )
        .layer(middleware::from_fn_with_state(state.clone(), track_requests))
        .with_state(state)
}

/// Bodies arrive as raw bytes so malformed JSON becomes an `ExtensionError`
/// instead of axum's plain-text rejection.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, HttpServerError> {
    serde_json::from_slice(body).map_err(HttpServerError::InvalidBody)
}

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    #[serde(flatten)]
    pub actions: ActionList,
    #[serde(flatten)]
    pub discovery: DiscoveryList,
}

/// GET / - entry point the platform registers the extension with
async fn index_handler() -> Json<IndexResponse> {
    Json(IndexResponse {
        actions: action_list(),
        discovery: discovery::discovery_list(),
    })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: f64,
    pub requests_handled: u64,
    pub active_runs: usize,
    pub timestamp: String,
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let (uptime_seconds, requests_handled) = {
        let stats = state
            .stats
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        (stats.uptime_seconds(), stats.requests_total)
    };

    Json(HealthResponse {
        status: "healthy".into(),
        uptime_seconds,
        requests_handled,
        active_runs: state.services.action.active_runs(),
        timestamp: Local::now().to_rfc3339(),
    })
}

/// GET /postman/collection/run
async fn describe_handler() -> Json<ActionDescription> {
    Json(collection_run_description())
}

/// POST /postman/collection/run/prepare
async fn prepare_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<StateResult<RunState>>, HttpServerError> {
    let req: PrepareRequest = parse_body(&body)?;
    Ok(Json(state.services.action.prepare(&req).await?))
}

/// POST /postman/collection/run/start
async fn start_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<StateResult<RunState>>, HttpServerError> {
    let req: StateRequest<RunState> = parse_body(&body)?;
    Ok(Json(state.services.action.start(req.state).await?))
}

/// POST /postman/collection/run/status
async fn status_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<StatusResult>, HttpServerError> {
    let req: StateRequest<RunState> = parse_body(&body)?;
    Ok(Json(state.services.action.status(&req.state).await?))
}

/// POST /postman/collection/run/stop
async fn stop_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<StopResult>, HttpServerError> {
    let req: StateRequest<RunState> = parse_body(&body)?;
    Ok(Json(state.services.action.stop(&req.state).await?))
}

async fn discovery_list_handler() -> Json<DiscoveryList> {
    Json(discovery::discovery_list())
}

async fn discovery_description_handler() -> Json<DiscoveryDescription> {
    Json(discovery::discovery_description())
}

async fn target_description_handler() -> Json<TargetDescription> {
    Json(discovery::target_description())
}

async fn attribute_descriptions_handler() -> Json<AttributeDescriptions> {
    Json(discovery::attribute_descriptions())
}

/// Served from the cache the background refresh keeps warm.
async fn discovered_targets_handler(State(state): State<AppState>) -> Json<DiscoveredTargets> {
    Json(DiscoveredTargets {
        targets: state.services.discovery.targets().await,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
    };
    use postman_ext_core::api::{
        ApiError, CollectionRunAction, CollectionSummary, EnvironmentSummary, LocalSupervisor,
        PostmanCatalog, RunSettings,
    };
    use postman_ext_plugins::discovery::CollectionDiscovery;
    use postman_ext_plugins::Services;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    struct FixedCatalog;

    #[async_trait]
    impl PostmanCatalog for FixedCatalog {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn list_collections(&self) -> Result<Vec<CollectionSummary>, ApiError> {
            Ok(vec![CollectionSummary {
                id: "col-1".into(),
                name: "shopping-demo".into(),
                uid: None,
            }])
        }

        async fn list_environments(&self) -> Result<Vec<EnvironmentSummary>, ApiError> {
            Ok(vec![EnvironmentSummary {
                id: "env-1".into(),
                name: "dev".into(),
                uid: None,
            }])
        }
    }

    fn test_state(executable: &str, artifact_dir: &std::path::Path) -> AppState {
        let catalog: Arc<dyn PostmanCatalog> = Arc::new(FixedCatalog);
        let action = CollectionRunAction::new(
            RunSettings {
                executable: executable.into(),
                base_url: "https://api.getpostman.com".into(),
                api_key: "KEY".into(),
                artifact_dir: artifact_dir.to_path_buf(),
                stop_grace: Duration::from_secs(5),
            },
            catalog.clone(),
            Arc::new(LocalSupervisor::new()),
        );
        AppState::new(Services {
            action: Arc::new(action),
            discovery: Arc::new(CollectionDiscovery::new(catalog, Duration::from_secs(3600))),
        })
    }

    async fn call(state: &AppState, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let body = match body {
            Some(v) => Body::from(v.to_string()),
            None => Body::empty(),
        };
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body)
            .unwrap();
        let resp = create_router(state.clone()).oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn index_lists_action_and_discovery_endpoints() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state("newman", dir.path());
        let (status, body) = call(&state, Method::GET, "/", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["actions"][0]["path"], "/postman/collection/run");
        assert_eq!(body["discoveries"][0]["path"], "/discovery/collections");
        assert!(body["targetTypes"].is_array());
    }

    #[tokio::test]
    async fn describe_returns_action_description() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state("newman", dir.path());
        let (status, body) = call(&state, Method::GET, "/postman/collection/run", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "com.steadybit.extension_postman.collection.run");
        assert_eq!(body["status"]["callInterval"], "1s");
    }

    #[tokio::test]
    async fn prepare_builds_command_with_resolved_environment() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state("newman", dir.path());
        let (status, body) = call(
            &state,
            Method::POST,
            "/postman/collection/run/prepare",
            Some(json!({
                "config": {"environmentIdOrName": "dev", "iterations": 2},
                "target": {"attributes": {"postman.collection.id": ["col-1"]}}
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let command: Vec<String> =
            serde_json::from_value(body["state"]["command"].clone()).unwrap();
        assert_eq!(command[0], "newman");
        assert!(command.contains(
            &"https://api.getpostman.com/environments/env-1?apikey=KEY".to_string()
        ));
        assert!(body["state"]["timestamp"].as_str().is_some_and(|t| !t.is_empty()));
    }

    #[tokio::test]
    async fn prepare_without_collection_is_extension_error() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state("newman", dir.path());
        let (status, body) = call(
            &state,
            Method::POST,
            "/postman/collection/run/prepare",
            Some(json!({"config": {}})),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["title"], "invalid action configuration");
        assert_eq!(state.stats.read().unwrap().errors_total, 1);
    }

    #[tokio::test]
    async fn malformed_body_is_extension_error() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state("newman", dir.path());
        let req = Request::builder()
            .method(Method::POST)
            .uri("/postman/collection/run/status")
            .body(Body::from("{not json"))
            .unwrap();
        let resp = create_router(state).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["title"], "failed to parse request body");
    }

    #[tokio::test]
    async fn status_of_unstarted_run_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state("newman", dir.path());
        let (status, body) = call(
            &state,
            Method::POST,
            "/postman/collection/run/status",
            Some(json!({"state": {"command": [], "timestamp": "t"}})),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["title"].as_str().unwrap().contains("not been started"));
    }

    #[tokio::test]
    async fn stop_of_never_started_run_succeeds_without_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state("newman", dir.path());
        let (status, body) = call(
            &state,
            Method::POST,
            "/postman/collection/run/stop",
            Some(json!({"state": {"command": ["newman", "run"], "timestamp": "tok"}})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["artifacts"], json!([]));
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn discovered_targets_follow_refresh() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state("newman", dir.path());

        let (_, before) =
            call(&state, Method::GET, "/discovery/collections/discovered-targets", None).await;
        assert_eq!(before["targets"], json!([]));

        state.services.discovery.refresh().await.unwrap();
        let (status, after) =
            call(&state, Method::GET, "/discovery/collections/discovered-targets", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(after["targets"][0]["id"], "col-1");
        assert_eq!(after["targets"][0]["label"], "shopping-demo");
    }

    #[tokio::test]
    async fn health_reports_counters() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state("newman", dir.path());
        call(&state, Method::GET, "/", None).await;
        let (status, body) = call(&state, Method::GET, "/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["requests_handled"], 2);
        assert_eq!(body["active_runs"], 0);
    }

    /// `sh run <url> ...` fails to open the script `run` and exits 127, which
    /// drives the whole lifecycle without newman installed.
    #[cfg(unix)]
    #[tokio::test]
    async fn lifecycle_reports_non_zero_exit() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state("sh", dir.path());

        let (_, prepared) = call(
            &state,
            Method::POST,
            "/postman/collection/run/prepare",
            Some(json!({"config": {"collectionId": "col-1"}})),
        )
        .await;
        let (status, started) = call(
            &state,
            Method::POST,
            "/postman/collection/run/start",
            Some(json!({"state": prepared["state"]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(started["state"]["pid"].as_u64().is_some());

        let run_state = started["state"].clone();
        let mut completed = Value::Null;
        for _ in 0..100 {
            let (_, body) = call(
                &state,
                Method::POST,
                "/postman/collection/run/status",
                Some(json!({"state": run_state})),
            )
            .await;
            if body["completed"] == json!(true) {
                completed = body;
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert_eq!(completed["error"]["title"], "newman exited with code 127");

        let (status, stopped) = call(
            &state,
            Method::POST,
            "/postman/collection/run/stop",
            Some(json!({"state": run_state})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stopped["artifacts"], json!([]));
        assert_eq!(state.services.action.active_runs(), 0);
    }
}
