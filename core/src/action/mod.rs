mod describe;
mod types;

pub use describe::{
    action_list, collection_run_description, ActionDescription, ActionList, ActionParameter,
    EndpointRef, TargetSelection, ACTION_BASE_PATH, ACTION_ID, TARGET_TYPE,
};
pub use types::{
    Artifact, ExtensionError, Message, MessageLevel, PrepareRequest, StateRequest, StateResult,
    StatusResult, StopResult, Target,
};
