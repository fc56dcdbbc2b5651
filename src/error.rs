//! Error types for letterfreq.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::{FailureReason, JobId, JobState};

#[derive(Debug, Error)]
pub enum Error {
    #[error("usage: {0}")]
    Usage(String),

    #[error("failed to spawn worker for '{input}': {source}")]
    Spawn {
        input: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("channel error for job {job}: {source}")]
    Transport {
        job: JobId,
        #[source]
        source: TransportError,
    },

    #[error("failed to write record {key}: {source}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("job {job} failed: {reason}")]
    JobFailed { job: JobId, reason: FailureReason },

    #[error("unknown job: {0}")]
    UnknownJob(JobId),

    #[error("invalid state transition for job {job}: {from} -> {to}")]
    InvalidTransition {
        job: JobId,
        from: JobState,
        to: JobState,
    },

    #[error("termination queue closed with {outstanding} worker(s) outstanding")]
    QueueClosed { outstanding: usize },

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Failure of a single worker's channel, as seen from the reading side.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("payload of {len} bytes, expected 0 or {expected}")]
    BadLength { len: usize, expected: usize },

    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
