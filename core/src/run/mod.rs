//! The collection-run action lifecycle.

mod classify;
mod config;
mod machine;
mod state;

pub use classify::{classify_exit, failure_title, Classification};
pub use config::{EnvVar, RunConfig, COLLECTION_ID_ATTRIBUTE};
pub use machine::{CollectionRunAction, RunSettings};
pub use state::{new_run_token, RunPhase, RunState};
