//! HTTP server lifecycle.

use std::net::SocketAddr;

use axum::{middleware, Router};
use tokio::signal;
use tracing::{info, warn};

use crate::http::{
    middleware::{create_timeout_layer, create_trace_layer, request_logger},
    routes::create_router,
    AppState,
};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_ms: u64,
}

pub fn build_app(state: AppState, request_timeout_ms: u64) -> Router {
    create_router(state)
        .layer(middleware::from_fn(request_logger))
        .layer(create_timeout_layer(request_timeout_ms))
        .layer(create_trace_layer())
}

/// Serves until Ctrl+C or SIGTERM.
pub async fn start_server(config: ServerConfig, state: AppState) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let app = build_app(state, config.request_timeout_ms);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    tokio::select! {
        res = signal::ctrl_c() => {
            match res {
                Ok(()) => info!("Received Ctrl+C signal"),
                Err(e) => warn!(error = %e, "failed to listen for Ctrl+C"),
            }
        }
        _ = wait_for_sigterm() => {
            info!("Received SIGTERM signal");
        }
    }
    info!("Starting graceful shutdown...");
}

#[cfg(unix)]
async fn wait_for_sigterm() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            warn!(error = %e, "failed to install SIGTERM handler");
            std::future::pending::<()>().await
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_sigterm() {
    std::future::pending::<()>().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use postman_ext_core::api::AppConfig;
    use tower::ServiceExt;

    #[tokio::test]
    async fn layered_app_serves_discovery_list() {
        let mut cfg = AppConfig::default();
        cfg.postman.api_key = "PMAK-test".into();
        let services = postman_ext_plugins::build_services(&cfg).unwrap();
        let app = build_app(AppState::new(services), cfg.http_server.request_timeout_ms);

        let req = Request::builder()
            .uri("/discovery")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_path_is_404() {
        let mut cfg = AppConfig::default();
        cfg.postman.api_key = "PMAK-test".into();
        let state = AppState::new(postman_ext_plugins::build_services(&cfg).unwrap());
        let app = build_app(state, 1_000);

        let req = Request::builder()
            .uri("/nope")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
