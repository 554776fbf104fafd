//! Request and response envelopes exchanged with the orchestration platform.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::source_chain;

/// Problem description returned with a failed call or a failed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionError {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

impl ExtensionError {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            detail: None,
            kind: None,
            instance: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn from_error(title: &str, err: Option<&(dyn std::error::Error + 'static)>) -> Self {
        let mut out = Self::new(title);
        out.detail = err.and_then(source_chain);
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub level: MessageLevel,
    pub message: String,
}

impl Message {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            message: message.into(),
        }
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warn,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            message: message.into(),
        }
    }
}

/// A report file, base64 encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub label: String,
    pub data: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub attributes: HashMap<String, Vec<String>>,
}

impl Target {
    pub fn first_attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .get(key)
            .and_then(|v| v.first())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareRequest {
    #[serde(default)]
    pub config: serde_json::Map<String, serde_json::Value>,

    #[serde(default)]
    pub target: Option<Target>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_id: Option<serde_json::Value>,
}

/// Body of start/status/stop: the state blob the platform round-trips.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateRequest<S> {
    pub state: S,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateResult<S> {
    pub state: S,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResult {
    pub completed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ExtensionError>,

    #[serde(default)]
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ExtensionError>,

    #[serde(default)]
    pub messages: Vec<Message>,

    #[serde(default)]
    pub artifacts: Vec<Artifact>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_result_omits_absent_error() {
        let v = serde_json::to_value(StatusResult {
            completed: false,
            error: None,
            messages: vec![Message::info("hello")],
        })
        .unwrap();
        assert_eq!(
            v,
            json!({"completed": false, "messages": [{"level": "info", "message": "hello"}]})
        );
    }

    #[test]
    fn prepare_request_tolerates_missing_target() {
        let req: PrepareRequest =
            serde_json::from_value(json!({"config": {"verbose": true}})).unwrap();
        assert!(req.target.is_none());
        assert_eq!(req.config["verbose"], json!(true));
    }

    #[test]
    fn target_first_attribute() {
        let target: Target = serde_json::from_value(json!({
            "attributes": {"postman.collection.id": ["c-1", "c-2"]}
        }))
        .unwrap();
        assert_eq!(target.first_attribute("postman.collection.id"), Some("c-1"));
        assert_eq!(target.first_attribute("missing"), None);
    }
}
