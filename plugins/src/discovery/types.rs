use std::collections::HashMap;

use postman_ext_core::api::EndpointRef;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryList {
    pub discoveries: Vec<EndpointRef>,
    #[serde(rename = "targetTypes")]
    pub target_types: Vec<EndpointRef>,
    #[serde(rename = "targetAttributes")]
    pub target_attributes: Vec<EndpointRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryDescription {
    pub id: String,
    pub discover: EndpointRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluralLabel {
    pub one: String,
    pub other: String,
}

impl PluralLabel {
    pub fn new(one: &str, other: &str) -> Self {
        Self {
            one: one.into(),
            other: other.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub attribute: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBy {
    pub attribute: String,
    pub direction: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub columns: Vec<Column>,
    pub order_by: Vec<OrderBy>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetDescription {
    pub id: String,
    pub version: String,
    pub label: PluralLabel,
    pub category: String,
    pub table: Table,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeDescription {
    pub attribute: String,
    pub label: PluralLabel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeDescriptions {
    pub attributes: Vec<AttributeDescription>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredTarget {
    pub id: String,
    pub label: String,
    pub target_type: String,
    pub attributes: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveredTargets {
    pub targets: Vec<DiscoveredTarget>,
}
