use serde::{Deserialize, Serialize};

pub const ACTION_ID: &str = "com.steadybit.extension_postman.collection.run";
pub const TARGET_TYPE: &str = "com.steadybit.extension_postman.collection";
pub const ACTION_BASE_PATH: &str = "/postman/collection/run";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointRef {
    pub method: String,
    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_interval: Option<String>,
}

impl EndpointRef {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: "GET".into(),
            path: path.into(),
            call_interval: None,
        }
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self {
            method: "POST".into(),
            path: path.into(),
            call_interval: None,
        }
    }

    pub fn every(mut self, interval: impl Into<String>) -> Self {
        self.call_interval = Some(interval.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionList {
    pub actions: Vec<EndpointRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionParameter {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub advanced: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetSelection {
    pub target_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDescription {
    pub id: String,
    pub label: String,
    pub description: String,
    pub version: String,
    pub kind: String,
    pub time_control: String,
    pub target_selection: TargetSelection,
    pub parameters: Vec<ActionParameter>,
    pub prepare: EndpointRef,
    pub start: EndpointRef,
    pub status: EndpointRef,
    pub stop: EndpointRef,
}

fn param(name: &str, label: &str, kind: &str, description: &str) -> ActionParameter {
    ActionParameter {
        name: name.into(),
        label: label.into(),
        kind: kind.into(),
        description: Some(description.into()),
        default_value: None,
        required: false,
        advanced: false,
    }
}

pub fn action_list() -> ActionList {
    ActionList {
        actions: vec![EndpointRef::get(ACTION_BASE_PATH)],
    }
}

pub fn collection_run_description() -> ActionDescription {
    let mut duration = param(
        "duration",
        "Estimated duration",
        "duration",
        "As long as you have no timeout in place, the step will run as long as needed. \
         You can set this estimation to size the step in the experiment editor.",
    );
    duration.default_value = Some("30s".into());
    duration.required = true;

    let environment_id_or_name = param(
        "environmentIdOrName",
        "Environment ID or Name",
        "string",
        "Postman Environment ID or Name",
    );

    let mut environment = param(
        "environment",
        "Environment variables",
        "key_value",
        "Environment variables which will be passed to your Postman Collection",
    );
    environment.advanced = true;

    let mut iterations = param(
        "iterations",
        "Iterations",
        "integer",
        "Number of iterations to run the collection",
    );
    iterations.default_value = Some("1".into());
    iterations.advanced = true;

    let mut timeout = param(
        "timeout",
        "Timeout",
        "duration",
        "The time to wait for the entire collection run to complete execution. \
         If you hit this timeout, no reports will be generated.",
    );
    timeout.advanced = true;

    let mut timeout_request = param(
        "timeoutRequest",
        "Request Timeout",
        "duration",
        "The Request Timeout for each request.",
    );
    timeout_request.advanced = true;

    let mut verbose = param(
        "verbose",
        "Verbose",
        "boolean",
        "Show detailed information of collection run and each request sent.",
    );
    verbose.advanced = true;

    let mut bail = param(
        "bail",
        "Bail",
        "boolean",
        "Stops the runner when a test case fails.",
    );
    bail.advanced = true;

    ActionDescription {
        id: ACTION_ID.into(),
        label: "Postman".into(),
        description: "Integrate a Postman Collection via Postman Cloud API.".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        kind: "check".into(),
        time_control: "internal".into(),
        target_selection: TargetSelection {
            target_type: TARGET_TYPE.into(),
        },
        parameters: vec![
            duration,
            environment_id_or_name,
            environment,
            iterations,
            timeout,
            timeout_request,
            verbose,
            bail,
        ],
        prepare: EndpointRef::post(format!("{ACTION_BASE_PATH}/prepare")),
        start: EndpointRef::post(format!("{ACTION_BASE_PATH}/start")),
        status: EndpointRef::post(format!("{ACTION_BASE_PATH}/status")).every("1s"),
        stop: EndpointRef::post(format!("{ACTION_BASE_PATH}/stop")),
    }
}
