use std::sync::Arc;

use postman_ext_core::api::{
    ApiError, AppConfig, LocalSupervisor, PostmanCatalog, ProcessSupervisor,
};

use crate::discovery::CollectionDiscovery;
use crate::postman::PostmanClient;

pub fn build_catalog(cfg: &AppConfig) -> Result<Arc<dyn PostmanCatalog>, ApiError> {
    let client = PostmanClient::new(
        cfg.postman.base_url.clone(),
        cfg.postman.api_key.clone(),
        cfg.postman.timeout_ms,
    )?;
    Ok(Arc::new(client))
}

pub fn build_supervisor() -> Arc<dyn ProcessSupervisor> {
    Arc::new(LocalSupervisor::new())
}

pub fn build_discovery(
    cfg: &AppConfig,
    catalog: Arc<dyn PostmanCatalog>,
) -> Arc<CollectionDiscovery> {
    Arc::new(CollectionDiscovery::new(
        catalog,
        cfg.discovery.collection_interval,
    ))
}
