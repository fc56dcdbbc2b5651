//! Core data model.
//!
//! A job is one input file handed to one worker process. The worker's
//! histogram travels back over the job's channel and is persisted as one
//! record keyed by the worker's runtime identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of counters in a histogram, one per letter `a..=z`.
pub const ALPHABET_SIZE: usize = 26;

/// Input value that makes a worker terminate abnormally instead of reading a file.
pub const SENTINEL_INPUT: &str = "SIG";

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

/// Newtype for job identifiers. Assigned in argument order, starting at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(pub usize);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One input file and the worker assigned to it. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,

    /// Path of the input file, or [`SENTINEL_INPUT`].
    pub input: String,

    pub created_at: DateTime<Utc>,
}

impl Job {
    pub fn new(id: JobId, input: impl Into<String>) -> Self {
        Self {
            id,
            input: input.into(),
            created_at: Utc::now(),
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.input == SENTINEL_INPUT
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Channel allocated, worker process requested.
    Spawned,
    /// Worker process is alive.
    Running,
    /// Worker exited and delivered a histogram.
    Completed,
    /// Worker exited without a usable histogram.
    Failed,
    /// Outcome handled by the orchestrator. Terminal.
    Reaped,
}

impl JobState {
    /// Can transition from self to `to`?
    pub fn can_transition_to(self, to: JobState) -> bool {
        use JobState::*;
        matches!(
            (self, to),
            (Spawned, Running)
                | (Running, Completed)
                | (Running, Failed)
                | (Completed, Reaped)
                | (Failed, Reaped)
        )
    }

    /// Has the worker's outcome been observed?
    pub fn is_settled(self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }

    pub fn is_terminal(self) -> bool {
        self == JobState::Reaped
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobState::Spawned => "spawned",
            JobState::Running => "running",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
            JobState::Reaped => "reaped",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Case-folded letter counts, `a` through `z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Histogram {
    counts: [u32; ALPHABET_SIZE],
}

impl Histogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_counts(counts: [u32; ALPHABET_SIZE]) -> Self {
        Self { counts }
    }

    /// Count one input byte. Non-alphabetic bytes are ignored.
    pub fn record_byte(&mut self, byte: u8) {
        let folded = byte.to_ascii_lowercase();
        if folded.is_ascii_lowercase() {
            let slot = &mut self.counts[(folded - b'a') as usize];
            *slot = slot.saturating_add(1);
        }
    }

    pub fn record_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.record_byte(b);
        }
    }

    /// Count for `letter`, case-insensitive. Zero for anything outside `a..=z`.
    pub fn count(&self, letter: char) -> u32 {
        let folded = letter.to_ascii_lowercase();
        if folded.is_ascii_lowercase() {
            self.counts[(folded as u8 - b'a') as usize]
        } else {
            0
        }
    }

    pub fn counts(&self) -> &[u32; ALPHABET_SIZE] {
        &self.counts
    }

    /// Total number of alphabetic bytes counted.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| u64::from(c)).sum()
    }

    /// `(letter, count)` pairs in `a..=z` order.
    pub fn iter(&self) -> impl Iterator<Item = (char, u32)> + '_ {
        ('a'..='z').zip(self.counts.iter().copied())
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// What a worker produced. Exactly one per job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum WorkerOutcome {
    Completed(Histogram),
    Failed(FailureReason),
}

impl WorkerOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, WorkerOutcome::Completed(_))
    }

    pub fn histogram(&self) -> Option<&Histogram> {
        match self {
            WorkerOutcome::Completed(hist) => Some(hist),
            WorkerOutcome::Failed(_) => None,
        }
    }

    /// The settled state this outcome moves a running job into.
    pub fn state(&self) -> JobState {
        match self {
            WorkerOutcome::Completed(_) => JobState::Completed,
            WorkerOutcome::Failed(_) => JobState::Failed,
        }
    }
}

/// Why a worker did not deliver a histogram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    /// Worker received the sentinel input and simulated an interrupt.
    Interrupted,
    /// Worker could not open or read its input file.
    ReadFailed,
    /// Worker could not write its payload to the channel.
    SendFailed,
    /// Worker exited successfully but wrote nothing.
    MissingPayload,
    /// Worker exited with an unrecognised status code.
    Exited { code: i32 },
    /// Worker was killed by a signal.
    Signaled { signal: i32 },
    /// Channel payload was unreadable.
    Transport(String),
    /// Waiting on the worker process failed.
    WaitFailed(String),
}

impl FailureReason {
    /// Short stable label, used for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            FailureReason::Interrupted => "interrupted",
            FailureReason::ReadFailed => "read_failed",
            FailureReason::SendFailed => "send_failed",
            FailureReason::MissingPayload => "missing_payload",
            FailureReason::Exited { .. } => "exited",
            FailureReason::Signaled { .. } => "signaled",
            FailureReason::Transport(_) => "transport",
            FailureReason::WaitFailed(_) => "wait_failed",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::Interrupted => write!(f, "worker interrupted"),
            FailureReason::ReadFailed => write!(f, "worker could not read its input"),
            FailureReason::SendFailed => write!(f, "worker could not write its result"),
            FailureReason::MissingPayload => write!(f, "worker exited without a result"),
            FailureReason::Exited { code } => write!(f, "worker exited with status {code}"),
            FailureReason::Signaled { signal } => write!(f, "worker killed by signal {signal}"),
            FailureReason::Transport(msg) => write!(f, "channel error: {msg}"),
            FailureReason::WaitFailed(msg) => write!(f, "wait failed: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Record key
// ---------------------------------------------------------------------------

/// Identifies one persisted histogram. Derived from the worker's pid, with the
/// job id attached so keys stay unique even if the OS reuses a pid mid-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    pub job: JobId,
    pub pid: u32,
}

impl RecordKey {
    pub fn file_name(&self) -> String {
        format!("{self}.hist")
    }
}

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "file{}-{}", self.pid, self.job)
    }
}
