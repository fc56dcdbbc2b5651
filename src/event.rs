//! Termination events delivered to the orchestrator.
//!
//! Each worker gets a watcher task that waits for the process to exit and
//! posts one [`Termination`]. The orchestrator is the only consumer, so all
//! bookkeeping happens in ordinary control flow on a single path.

use std::process::ExitStatus;

use tokio::process::Child;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::debug;

use crate::model::JobId;

/// A worker process has exited (or could not be waited on).
#[derive(Debug)]
pub struct Termination {
    pub job: JobId,
    pub pid: u32,
    pub status: std::io::Result<ExitStatus>,
}

pub type TerminationSender = mpsc::UnboundedSender<Termination>;
pub type TerminationReceiver = mpsc::UnboundedReceiver<Termination>;

pub fn termination_queue() -> (TerminationSender, TerminationReceiver) {
    mpsc::unbounded_channel()
}

/// Wait for `child` in the background and report its exit on `tx`.
///
/// The watcher owns the child. Aborting the returned handle drops it, which
/// kills a process that is still running.
pub fn watch(job: JobId, pid: u32, mut child: Child, tx: TerminationSender) -> AbortHandle {
    let task = tokio::spawn(async move {
        let status = child.wait().await;
        debug!(job = %job, pid, ?status, "worker terminated");
        // Receiver gone means the orchestrator already gave up on the run.
        let _ = tx.send(Termination { job, pid, status });
    });
    task.abort_handle()
}

/// Watchers of one run. Dropping the set aborts every watcher still waiting.
#[derive(Debug, Default)]
pub struct WatcherSet {
    handles: Vec<AbortHandle>,
}

impl WatcherSet {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            handles: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, handle: AbortHandle) {
        self.handles.push(handle);
    }
}

impl Drop for WatcherSet {
    fn drop(&mut self) {
        let waiting = self.handles.iter().filter(|h| !h.is_finished()).count();
        if waiting > 0 {
            debug!(waiting, "aborting worker watchers");
        }
        for handle in &self.handles {
            handle.abort();
        }
    }
}
