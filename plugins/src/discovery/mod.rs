//! Collection discovery: targets the platform can select for a run.

mod collections;
mod types;

pub use collections::{
    attribute_descriptions, discovery_description, discovery_list, target_description,
    CollectionDiscovery, COLLECTION_NAME_ATTRIBUTE, DISCOVERY_BASE_PATH, LABEL_ATTRIBUTE,
};
pub use types::{
    AttributeDescription, AttributeDescriptions, DiscoveredTarget, DiscoveredTargets,
    DiscoveryDescription, DiscoveryList, PluralLabel, TargetDescription,
};
