use std::time::Duration;

use async_trait::async_trait;
use postman_ext_core::api::{ApiError, CollectionSummary, EnvironmentSummary, PostmanCatalog};
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

const API_KEY_HEADER: &str = "X-API-Key";
const BODY_SNIPPET_CHARS: usize = 200;

#[derive(Debug, Deserialize)]
struct CollectionList {
    #[serde(default)]
    collections: Vec<CollectionSummary>,
}

#[derive(Debug, Deserialize)]
struct EnvironmentList {
    #[serde(default)]
    environments: Vec<EnvironmentSummary>,
}

/// Postman Cloud API client authenticated by API key.
pub struct PostmanClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl PostmanClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout_ms: u64,
    ) -> Result<Self, ApiError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::InvalidBaseUrl(base_url));
        }

        let http = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| ApiError::Transport(e.into()))?;

        Ok(Self {
            http,
            base_url,
            api_key: api_key.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "postman api request");

        let res = self
            .http
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(ACCEPT, "*/*")
            .header(
                USER_AGENT,
                format!("steadybit-extension-postman/{}", env!("CARGO_PKG_VERSION")),
            )
            .send()
            .await
            .map_err(map_transport)?;

        let status = res.status();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(ApiError::Unauthorized),
            StatusCode::TOO_MANY_REQUESTS => return Err(ApiError::RateLimited),
            s if !s.is_success() => {
                let body = res.text().await.unwrap_or_default();
                return Err(ApiError::HttpStatus {
                    status: s.as_u16(),
                    body_snippet: body.chars().take(BODY_SNIPPET_CHARS).collect(),
                });
            }
            _ => {}
        }

        let bytes = res.bytes().await.map_err(map_transport)?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.into()))
    }
}

fn map_transport(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Transport(e.into())
    }
}

#[async_trait]
impl PostmanCatalog for PostmanClient {
    fn name(&self) -> &str {
        "postman_api"
    }

    async fn list_collections(&self) -> Result<Vec<CollectionSummary>, ApiError> {
        let list: CollectionList = self.get_json("/collections").await?;
        debug!(count = list.collections.len(), "listed collections");
        Ok(list.collections)
    }

    async fn list_environments(&self) -> Result<Vec<EnvironmentSummary>, ApiError> {
        let list: EnvironmentList = self.get_json("/environments").await?;
        debug!(count = list.environments.len(), "listed environments");
        Ok(list.environments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_http_base_url() {
        assert!(matches!(
            PostmanClient::new("ftp://example.com", "k", 1000),
            Err(ApiError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn trims_trailing_slash() {
        let client = PostmanClient::new("https://api.getpostman.com/", "k", 1000).unwrap();
        assert_eq!(client.base_url(), "https://api.getpostman.com");
    }
}
