use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use postman_ext_core::api::{
    ApiError, CollectionSummary, EndpointRef, PostmanCatalog, TARGET_TYPE,
};
use postman_ext_core::run::COLLECTION_ID_ATTRIBUTE;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::types::{
    AttributeDescription, AttributeDescriptions, Column, DiscoveredTarget, DiscoveryDescription,
    DiscoveryList, OrderBy, PluralLabel, Table, TargetDescription,
};

pub const DISCOVERY_BASE_PATH: &str = "/discovery/collections";
pub const LABEL_ATTRIBUTE: &str = "steadybit.label";
pub const COLLECTION_NAME_ATTRIBUTE: &str = "postman.collection.name";

#[derive(Default)]
struct Cache {
    targets: Vec<DiscoveredTarget>,
    refreshed_at: Option<DateTime<Utc>>,
}

/// Postman collections as discovery targets, cached between refreshes.
pub struct CollectionDiscovery {
    catalog: Arc<dyn PostmanCatalog>,
    interval: Duration,
    cache: RwLock<Cache>,
}

impl CollectionDiscovery {
    pub fn new(catalog: Arc<dyn PostmanCatalog>, interval: Duration) -> Self {
        Self {
            catalog,
            interval,
            cache: RwLock::new(Cache::default()),
        }
    }

    /// Reloads the collection list. The previous targets stay in place on error.
    pub async fn refresh(&self) -> Result<usize, ApiError> {
        let collections = self.catalog.list_collections().await?;
        let targets: Vec<DiscoveredTarget> = collections.iter().map(to_target).collect();
        let count = targets.len();

        let mut cache = self.cache.write().await;
        cache.targets = targets;
        cache.refreshed_at = Some(Utc::now());
        Ok(count)
    }

    pub async fn targets(&self) -> Vec<DiscoveredTarget> {
        self.cache.read().await.targets.clone()
    }

    pub async fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.cache.read().await.refreshed_at
    }

    /// Refreshes now, then every `interval`, until the task is aborted.
    pub fn spawn_refresh(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            loop {
                ticker.tick().await;
                match self.refresh().await {
                    Ok(count) => info!(count, "discovered postman collections"),
                    Err(e) => warn!(
                        error = %e,
                        retryable = e.is_retryable(),
                        "collection discovery failed, keeping previous targets"
                    ),
                }
            }
        })
    }
}

fn to_target(c: &CollectionSummary) -> DiscoveredTarget {
    DiscoveredTarget {
        id: c.id.clone(),
        label: c.name.clone(),
        target_type: TARGET_TYPE.to_string(),
        attributes: [
            (LABEL_ATTRIBUTE.to_string(), vec![c.name.clone()]),
            (COLLECTION_ID_ATTRIBUTE.to_string(), vec![c.id.clone()]),
            (COLLECTION_NAME_ATTRIBUTE.to_string(), vec![c.name.clone()]),
        ]
        .into_iter()
        .collect(),
    }
}

pub fn discovery_list() -> DiscoveryList {
    DiscoveryList {
        discoveries: vec![EndpointRef::get(DISCOVERY_BASE_PATH)],
        target_types: vec![EndpointRef::get(format!(
            "{DISCOVERY_BASE_PATH}/target-description"
        ))],
        target_attributes: vec![EndpointRef::get(format!(
            "{DISCOVERY_BASE_PATH}/attribute-descriptions"
        ))],
    }
}

pub fn discovery_description() -> DiscoveryDescription {
    DiscoveryDescription {
        id: TARGET_TYPE.to_string(),
        discover: EndpointRef::get(format!("{DISCOVERY_BASE_PATH}/discovered-targets"))
            .every("1m"),
    }
}

pub fn target_description() -> TargetDescription {
    TargetDescription {
        id: TARGET_TYPE.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        label: PluralLabel::new("Postman Collection", "Postman Collections"),
        category: "postman".to_string(),
        table: Table {
            columns: vec![
                Column {
                    attribute: LABEL_ATTRIBUTE.to_string(),
                },
                Column {
                    attribute: COLLECTION_ID_ATTRIBUTE.to_string(),
                },
            ],
            order_by: vec![OrderBy {
                attribute: LABEL_ATTRIBUTE.to_string(),
                direction: "ASC".to_string(),
            }],
        },
    }
}

pub fn attribute_descriptions() -> AttributeDescriptions {
    AttributeDescriptions {
        attributes: vec![
            AttributeDescription {
                attribute: COLLECTION_ID_ATTRIBUTE.to_string(),
                label: PluralLabel::new("Collection Id", "Collection Ids"),
            },
            AttributeDescription {
                attribute: COLLECTION_NAME_ATTRIBUTE.to_string(),
                label: PluralLabel::new("Collection Name", "Collection Names"),
            },
        ],
    }
}
