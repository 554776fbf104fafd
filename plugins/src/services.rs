//! Builds the runtime services the HTTP layer serves from.
use std::sync::Arc;

use postman_ext_core::api::{ApiError, AppConfig, CollectionRunAction, RunSettings};

use crate::discovery::CollectionDiscovery;
use crate::factory;

#[derive(Clone)]
pub struct Services {
    pub action: Arc<CollectionRunAction>,
    pub discovery: Arc<CollectionDiscovery>,
}

pub fn build_services(cfg: &AppConfig) -> Result<Services, ApiError> {
    let catalog = factory::build_catalog(cfg)?;
    let supervisor = factory::build_supervisor();
    let action = CollectionRunAction::new(
        RunSettings::from_config(cfg),
        catalog.clone(),
        supervisor,
    );
    Ok(Services {
        action: Arc::new(action),
        discovery: factory::build_discovery(cfg, catalog),
    })
}
