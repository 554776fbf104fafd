mod action_error;
mod api_error;
mod config_error;
mod process_error;
mod report_error;
mod resolve_error;
mod run_config_error;

pub use action_error::{source_chain, ActionError};
pub use api_error::ApiError;
pub use config_error::ConfigError;
pub use process_error::ProcessError;
pub use report_error::ReportError;
pub use resolve_error::ResolveError;
pub use run_config_error::RunConfigError;
