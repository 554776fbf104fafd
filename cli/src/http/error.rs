use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use postman_ext_core::api::{ActionError, ExtensionError};
use thiserror::Error;

/// Failures of an action endpoint. The platform expects every one of them as
/// a 500 with an `ExtensionError` body.
#[derive(Debug, Error)]
pub enum HttpServerError {
    #[error(transparent)]
    Action(#[from] ActionError),

    #[error("failed to parse request body")]
    InvalidBody(#[source] serde_json::Error),
}

impl HttpServerError {
    pub fn to_extension_error(&self) -> ExtensionError {
        match self {
            HttpServerError::Action(err) => err.to_extension_error(),
            HttpServerError::InvalidBody(err) => {
                ExtensionError::new(self.to_string()).with_detail(err.to_string())
            }
        }
    }
}

impl IntoResponse for HttpServerError {
    fn into_response(self) -> Response {
        let body = self.to_extension_error();
        tracing::warn!(title = %body.title, detail = ?body.detail, "action call failed");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
