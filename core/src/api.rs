//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `postman_ext_core::api` instead of reaching into internal modules.

pub use crate::action::{
    action_list, collection_run_description, ActionDescription, ActionList, Artifact,
    EndpointRef, ExtensionError, Message, MessageLevel, PrepareRequest, StateRequest,
    StateResult, StatusResult, StopResult, Target, ACTION_BASE_PATH, ACTION_ID, TARGET_TYPE,
};
pub use crate::catalog::{CollectionSummary, EnvironmentSummary, PostmanCatalog};
pub use crate::config::{AppConfig, HttpServerConfig, LoggingConfig, PostmanConfig};
pub use crate::error::{ActionError, ApiError, ConfigError};
pub use crate::process::{LocalSupervisor, ProcessSupervisor};
pub use crate::run::{CollectionRunAction, RunSettings, RunState};
