//! Read access to the Postman workspace: collections and environments.

mod resolve;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

pub use resolve::resolve_environment;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSummary {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentSummary {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

#[async_trait]
pub trait PostmanCatalog: Send + Sync {
    fn name(&self) -> &str;

    async fn list_collections(&self) -> Result<Vec<CollectionSummary>, ApiError>;

    async fn list_environments(&self) -> Result<Vec<EnvironmentSummary>, ApiError>;
}
