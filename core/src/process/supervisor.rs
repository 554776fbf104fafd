use std::collections::HashMap;
use std::process::Stdio;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::buffer::{OutputBuffer, OutputStream};
use super::exit::{normalize_exit, ExitState};
use super::handle::{ProcessHandle, StartedProcess};
use crate::error::ProcessError;

/// How long the waiter gives the output pumps to hit EOF after the child is reaped.
/// Grandchildren that inherited the pipes can keep them open indefinitely.
const PUMP_DRAIN_GRACE: Duration = Duration::from_secs(2);

/// How long `dispose` waits for the waiter task before aborting it.
const DISPOSE_JOIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Owns external processes keyed by [`ProcessHandle`].
#[async_trait]
pub trait ProcessSupervisor: Send + Sync {
    async fn start(&self, argv: &[String]) -> Result<StartedProcess, ProcessError>;

    /// `None` while the process runs.
    fn exit_state(&self, handle: ProcessHandle) -> Result<Option<ExitState>, ProcessError>;

    fn exit_code(&self, handle: ProcessHandle) -> Result<Option<i32>, ProcessError> {
        Ok(self.exit_state(handle)?.map(|s| s.code))
    }

    /// Output lines produced since the previous call. The unterminated tail is
    /// only included when `consume_all` is set.
    fn read_lines(
        &self,
        handle: ProcessHandle,
        consume_all: bool,
    ) -> Result<Vec<String>, ProcessError>;

    /// Requests termination. Calling it again, or after exit, is a no-op.
    fn kill(&self, handle: ProcessHandle) -> Result<(), ProcessError>;

    /// Waits up to `timeout` for the exit state. `Ok(None)` on timeout.
    async fn wait(
        &self,
        handle: ProcessHandle,
        timeout: Duration,
    ) -> Result<Option<ExitState>, ProcessError>;

    /// Forgets the process and joins its background task.
    async fn dispose(&self, handle: ProcessHandle) -> Result<(), ProcessError>;

    fn active(&self) -> usize;
}

struct ProcessRecord {
    pid: u32,
    output: Arc<Mutex<OutputBuffer>>,
    exit_rx: watch::Receiver<Option<ExitState>>,
    kill_tx: Mutex<Option<oneshot::Sender<()>>>,
    waiter: Mutex<Option<JoinHandle<()>>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// tokio-backed supervisor for processes on this host.
#[derive(Default)]
pub struct LocalSupervisor {
    records: RwLock<HashMap<ProcessHandle, Arc<ProcessRecord>>>,
}

impl LocalSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, handle: ProcessHandle) -> Result<Arc<ProcessRecord>, ProcessError> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&handle)
            .cloned()
            .ok_or(ProcessError::NotFound(handle))
    }

    fn spawn_child(argv: &[String]) -> Result<Child, ProcessError> {
        let (program, args) = argv.split_first().ok_or(ProcessError::EmptyCommand)?;
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Own process group, so a kill reaches everything the run spawned.
        #[cfg(unix)]
        cmd.process_group(0);
        cmd.spawn()
            .map_err(|source| ProcessError::Spawn {
                program: program.clone(),
                source,
            })
    }
}

#[async_trait]
impl ProcessSupervisor for LocalSupervisor {
    async fn start(&self, argv: &[String]) -> Result<StartedProcess, ProcessError> {
        let mut child = Self::spawn_child(argv)?;
        let pid = child.id().unwrap_or_default();
        let handle = ProcessHandle::new();

        let output = Arc::new(Mutex::new(OutputBuffer::new()));
        let mut pumps = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            pumps.push(tokio::spawn(pump(
                stdout,
                Arc::clone(&output),
                pid,
                OutputStream::Stdout,
            )));
        }
        if let Some(stderr) = child.stderr.take() {
            pumps.push(tokio::spawn(pump(
                stderr,
                Arc::clone(&output),
                pid,
                OutputStream::Stderr,
            )));
        }

        let (exit_tx, exit_rx) = watch::channel(None);
        let (kill_tx, kill_rx) = oneshot::channel();
        let waiter = tokio::spawn(wait_child(child, pid, kill_rx, pumps, exit_tx));

        let record = Arc::new(ProcessRecord {
            pid,
            output,
            exit_rx,
            kill_tx: Mutex::new(Some(kill_tx)),
            waiter: Mutex::new(Some(waiter)),
        });
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(handle, record);

        info!(pid, handle = %handle, "process started");
        Ok(StartedProcess { handle, pid })
    }

    fn exit_state(&self, handle: ProcessHandle) -> Result<Option<ExitState>, ProcessError> {
        let record = self.record(handle)?;
        let state = *record.exit_rx.borrow();
        Ok(state)
    }

    fn read_lines(
        &self,
        handle: ProcessHandle,
        consume_all: bool,
    ) -> Result<Vec<String>, ProcessError> {
        let record = self.record(handle)?;
        let lines = lock(&record.output).take_lines(consume_all);
        Ok(lines)
    }

    fn kill(&self, handle: ProcessHandle) -> Result<(), ProcessError> {
        let record = self.record(handle)?;
        if let Some(tx) = lock(&record.kill_tx).take() {
            debug!(pid = record.pid, handle = %handle, "kill requested");
            // The waiter is gone once the process has exited; nothing to do then.
            let _ = tx.send(());
        }
        Ok(())
    }

    async fn wait(
        &self,
        handle: ProcessHandle,
        timeout: Duration,
    ) -> Result<Option<ExitState>, ProcessError> {
        let mut rx = self.record(handle)?.exit_rx.clone();
        let result = tokio::time::timeout(timeout, rx.wait_for(Option::is_some)).await;
        match result {
            Ok(Ok(state)) => Ok(*state),
            // Sender dropped without a value: the waiter task died.
            Ok(Err(_)) => Ok(None),
            Err(_) => Ok(None),
        }
    }

    async fn dispose(&self, handle: ProcessHandle) -> Result<(), ProcessError> {
        let record = self
            .records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&handle)
            .ok_or(ProcessError::NotFound(handle))?;

        if let Some(tx) = lock(&record.kill_tx).take() {
            let _ = tx.send(());
        }
        let waiter = lock(&record.waiter).take();
        if let Some(mut waiter) = waiter {
            if tokio::time::timeout(DISPOSE_JOIN_TIMEOUT, &mut waiter)
                .await
                .is_err()
            {
                warn!(pid = record.pid, handle = %handle, "waiter task did not finish, aborting");
                waiter.abort();
            }
        }
        debug!(pid = record.pid, handle = %handle, "process disposed");
        Ok(())
    }

    fn active(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

async fn pump<R>(mut reader: R, output: Arc<Mutex<OutputBuffer>>, pid: u32, stream: OutputStream)
where
    R: AsyncRead + Unpin,
{
    let mut chunk = [0u8; 8192];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                debug!(
                    pid,
                    stream = stream.as_str(),
                    "newman: {}",
                    String::from_utf8_lossy(&chunk[..n]).trim_end()
                );
                lock(&output).push(stream, &chunk[..n]);
            }
            Err(e) => {
                warn!(pid, stream = stream.as_str(), error = %e, "failed to read process output");
                break;
            }
        }
    }
}

async fn wait_child(
    mut child: Child,
    pid: u32,
    mut kill_rx: oneshot::Receiver<()>,
    pumps: Vec<JoinHandle<()>>,
    exit_tx: watch::Sender<Option<ExitState>>,
) {
    let mut killed = false;
    let status = tokio::select! {
        res = child.wait() => res,
        Ok(()) = &mut kill_rx => {
            killed = true;
            kill_tree(&mut child, pid);
            child.wait().await
        }
    };

    let code = match status {
        Ok(status) => normalize_exit(status),
        Err(e) => {
            warn!(pid, error = %e, "failed to wait for process");
            -1
        }
    };

    // Exit code is published only after output is drained, so a reader that
    // sees the exit state can collect every remaining line.
    for mut task in pumps {
        if tokio::time::timeout(PUMP_DRAIN_GRACE, &mut task).await.is_ok() {
            continue;
        }
        // Leftover group members still hold the pipes.
        if kill_group(pid) && tokio::time::timeout(PUMP_DRAIN_GRACE, &mut task).await.is_ok() {
            continue;
        }
        debug!(pid, "output pump still open after exit, aborting");
        task.abort();
    }

    info!(pid, code, killed, "process exited");
    let _ = exit_tx.send(Some(ExitState { code, killed }));
}

/// Kills the child together with its process group, falling back to the
/// child alone when the group cannot be signalled.
fn kill_tree(child: &mut Child, pid: u32) {
    if kill_group(pid) {
        return;
    }
    if let Err(e) = child.start_kill() {
        warn!(pid, error = %e, "failed to kill process");
    }
}

/// SIGKILL to the process group led by `pid`. False when nothing was signalled.
#[cfg(unix)]
fn kill_group(pid: u32) -> bool {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };
    if raw <= 0 {
        return false;
    }
    match killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        Ok(()) => true,
        Err(e) => {
            debug!(pid, error = %e, "failed to signal process group");
            false
        }
    }
}

#[cfg(not(unix))]
fn kill_group(_pid: u32) -> bool {
    false
}
