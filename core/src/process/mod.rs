//! Supervision of external processes: spawn, output capture, exit polling, kill.

mod buffer;
mod exit;
mod handle;
mod supervisor;

pub use buffer::{OutputBuffer, OutputStream};
pub use exit::{normalize_exit, ExitState};
pub use handle::{ProcessHandle, StartedProcess};
pub use supervisor::{LocalSupervisor, ProcessSupervisor};
