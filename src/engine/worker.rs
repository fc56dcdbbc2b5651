//! Worker lifecycle: spawn a process per job, run the job inside it, and
//! classify how the process ended.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use tokio::process::{Child, Command};
use tracing::{debug, error, warn};

use crate::channel::{self, Channel};
use crate::error::{Error, Result, TransportError};
use crate::histogram;
use crate::model::{FailureReason, Histogram, Job, WorkerOutcome};

/// Environment variable that starts the binary in worker mode.
///
/// Worker mode is selected out of band so that no input path, whatever its
/// name, can be mistaken for it.
pub const WORKER_ROLE_ENV: &str = "LETTERFREQ_ROLE";
pub const WORKER_ROLE: &str = "worker";

/// Exit codes a worker process uses to report how it ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    Success,
    ReadFailed,
    SendFailed,
    /// Sentinel input; mirrors the shell convention for SIGINT (128 + 2).
    Interrupted,
}

impl WorkerExit {
    pub fn code(self) -> u8 {
        match self {
            WorkerExit::Success => 0,
            WorkerExit::ReadFailed => 3,
            WorkerExit::SendFailed => 4,
            WorkerExit::Interrupted => 130,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(WorkerExit::Success),
            3 => Some(WorkerExit::ReadFailed),
            4 => Some(WorkerExit::SendFailed),
            130 => Some(WorkerExit::Interrupted),
            _ => None,
        }
    }
}

impl From<WorkerExit> for std::process::ExitCode {
    fn from(exit: WorkerExit) -> Self {
        std::process::ExitCode::from(exit.code())
    }
}

// ---------------------------------------------------------------------------
// Orchestrator side
// ---------------------------------------------------------------------------

/// Program used to start workers. The job input is appended as the last argument.
#[derive(Debug, Clone)]
pub struct WorkerCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl WorkerCommand {
    /// Re-execute `program` in worker mode.
    ///
    /// The input follows `--` so paths starting with `-` are not read as flags.
    pub fn letterfreq(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: vec!["--".to_string()],
            env: vec![(WORKER_ROLE_ENV.to_string(), WORKER_ROLE.to_string())],
        }
    }

    /// Re-execute the running binary in worker mode.
    pub fn current_exe() -> Result<Self> {
        Ok(Self::letterfreq(std::env::current_exe()?))
    }

    /// Arbitrary program with leading arguments.
    pub fn custom(program: impl Into<PathBuf>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            env: Vec::new(),
        }
    }
}

/// A started worker: its pid, the read half of its channel, and the process handle.
#[derive(Debug)]
pub struct SpawnedWorker {
    pub pid: u32,
    pub channel: Channel,
    pub child: Child,
}

/// Start one worker process for `job`, with its stdout as the job's channel.
pub fn spawn(command: &WorkerCommand, job: &Job) -> Result<SpawnedWorker> {
    let spawn_err = |source: std::io::Error| Error::Spawn {
        input: job.input.clone(),
        source,
    };

    let mut child = Command::new(&command.program)
        .args(&command.args)
        .arg(&job.input)
        .envs(command.env.iter().map(|(k, v)| (k, v)))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .spawn()
        .map_err(spawn_err)?;

    let pid = child
        .id()
        .ok_or_else(|| spawn_err(std::io::Error::other("worker exited before its pid was read")))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| spawn_err(std::io::Error::other("worker stdout was not captured")))?;

    debug!(
        job = %job.id,
        pid,
        program = %command.program.display(),
        "worker spawned"
    );

    Ok(SpawnedWorker {
        pid,
        channel: Channel::new(stdout),
        child,
    })
}

/// Decide a job's outcome from how its worker exited and what it left in the channel.
///
/// A non-zero exit always wins over a payload.
pub fn classify(
    status: &std::io::Result<ExitStatus>,
    payload: std::result::Result<Option<Histogram>, TransportError>,
) -> WorkerOutcome {
    let status = match status {
        Ok(status) => status,
        Err(e) => return WorkerOutcome::Failed(FailureReason::WaitFailed(e.to_string())),
    };

    let reason = match status.code() {
        Some(0) => {
            return match payload {
                Ok(Some(hist)) => WorkerOutcome::Completed(hist),
                Ok(None) => WorkerOutcome::Failed(FailureReason::MissingPayload),
                Err(e) => WorkerOutcome::Failed(FailureReason::Transport(e.to_string())),
            };
        }
        Some(code) => match WorkerExit::from_code(code) {
            Some(WorkerExit::Interrupted) => FailureReason::Interrupted,
            Some(WorkerExit::ReadFailed) => FailureReason::ReadFailed,
            Some(WorkerExit::SendFailed) => FailureReason::SendFailed,
            _ => FailureReason::Exited { code },
        },
        None => signal_reason(status),
    };
    WorkerOutcome::Failed(reason)
}

#[cfg(unix)]
fn signal_reason(status: &ExitStatus) -> FailureReason {
    use std::os::unix::process::ExitStatusExt;
    match status.signal() {
        Some(signal) => FailureReason::Signaled { signal },
        None => FailureReason::Exited { code: -1 },
    }
}

#[cfg(not(unix))]
fn signal_reason(_status: &ExitStatus) -> FailureReason {
    FailureReason::Exited { code: -1 }
}

// ---------------------------------------------------------------------------
// Worker side
// ---------------------------------------------------------------------------

/// Run one job inside the worker process, writing the payload to `out`.
///
/// Writes nothing unless the whole histogram was computed.
pub fn execute<W: Write>(input: &str, out: W) -> WorkerExit {
    if input == crate::model::SENTINEL_INPUT {
        warn!("sentinel input, terminating without a result");
        return WorkerExit::Interrupted;
    }

    let hist = match histogram::compute(Path::new(input)) {
        Ok(hist) => hist,
        Err(e) => {
            error!(input, "{e}");
            return WorkerExit::ReadFailed;
        }
    };

    if let Err(e) = channel::send(out, &hist) {
        error!(input, "failed to write result: {e}");
        return WorkerExit::SendFailed;
    }
    WorkerExit::Success
}

/// True when this process was started by an orchestrator as a worker.
pub fn in_worker_role() -> bool {
    std::env::var(WORKER_ROLE_ENV).is_ok_and(|role| role == WORKER_ROLE)
}

/// Entry point of the worker process: run `input` against this process's stdout.
pub fn run(input: &str) -> WorkerExit {
    let stdout = std::io::stdout().lock();
    execute(input, stdout)
}
