//! Request-level layers: timeout, tracing spans, per-request logging and counters.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use std::time::{Duration, Instant};
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::http::state::AppState;

/// Answers 408 when a handler exceeds `request_timeout_ms`; keep it above
/// `runner.stop_grace_ms` or Stop can be cut short.
pub fn create_timeout_layer(request_timeout_ms: u64) -> TimeoutLayer {
    TimeoutLayer::new(Duration::from_millis(request_timeout_ms))
}

pub fn create_trace_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
}

pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = Instant::now();

    let response = next.run(req).await;

    let duration = start.elapsed();
    let status = response.status();

    if status.is_client_error() || status.is_server_error() {
        warn!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            "Request failed"
        );
    } else {
        info!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            "Request completed"
        );
    }

    response
}

/// Feeds [`ServerStats`](crate::http::state::ServerStats).
pub async fn track_requests(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    state.record_request(req.uri().path());
    let response = next.run(req).await;
    if response.status().is_client_error() || response.status().is_server_error() {
        state.record_error();
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::{Method, StatusCode},
        middleware,
        response::IntoResponse,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    async fn ok_handler() -> impl IntoResponse {
        "OK"
    }

    async fn slow_handler() -> impl IntoResponse {
        tokio::time::sleep(Duration::from_millis(200)).await;
        "Slow response"
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn request_logger_passes_response_through() {
        let app = Router::new()
            .route("/test", get(ok_handler))
            .layer(middleware::from_fn(request_logger));

        let response = app.oneshot(get_request("/test")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn timeout_layer_lets_fast_handlers_finish() {
        let app = Router::new()
            .route("/test", get(ok_handler))
            .layer(create_timeout_layer(1_000));

        let response = app.oneshot(get_request("/test")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn timeout_layer_cuts_slow_handlers() {
        let app = Router::new()
            .route("/slow", get(slow_handler))
            .layer(create_timeout_layer(20));

        let response = app.oneshot(get_request("/slow")).await.unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    }
}
