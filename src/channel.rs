//! One-shot transport from a worker process to the orchestrator.
//!
//! The worker's stdout is the channel. A payload is exactly [`PAYLOAD_LEN`]
//! bytes: the 26 counts as little-endian `u32`, `a` first. A worker that dies
//! before writing leaves the channel empty, which reads as `None`.

use std::io::Write;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::ChildStdout;

use crate::error::TransportError;
use crate::model::{ALPHABET_SIZE, Histogram};

/// Size of an encoded histogram in bytes.
pub const PAYLOAD_LEN: usize = ALPHABET_SIZE * 4;

pub fn encode(hist: &Histogram) -> [u8; PAYLOAD_LEN] {
    let mut out = [0u8; PAYLOAD_LEN];
    for (chunk, count) in out.chunks_exact_mut(4).zip(hist.counts()) {
        chunk.copy_from_slice(&count.to_le_bytes());
    }
    out
}

/// Decode an encoded histogram. `bytes` must be exactly [`PAYLOAD_LEN`] long.
pub fn decode(bytes: &[u8]) -> Result<Histogram, TransportError> {
    if bytes.len() != PAYLOAD_LEN {
        return Err(TransportError::BadLength {
            len: bytes.len(),
            expected: PAYLOAD_LEN,
        });
    }
    let mut counts = [0u32; ALPHABET_SIZE];
    for (slot, chunk) in counts.iter_mut().zip(bytes.chunks_exact(4)) {
        *slot = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    Ok(Histogram::from_counts(counts))
}

/// Worker side: write the payload and flush. Called at most once per channel.
pub fn send<W: Write>(mut writer: W, hist: &Histogram) -> std::io::Result<()> {
    writer.write_all(&encode(hist))?;
    writer.flush()
}

/// Orchestrator side: read whatever the worker left in the channel.
///
/// Reads to EOF, so it must only be called once the worker has exited.
/// Anything past one payload is treated as corruption.
pub async fn receive<R: AsyncRead + Unpin>(reader: R) -> Result<Option<Histogram>, TransportError> {
    let mut buf = Vec::with_capacity(PAYLOAD_LEN);
    reader
        .take(PAYLOAD_LEN as u64 + 1)
        .read_to_end(&mut buf)
        .await?;
    if buf.is_empty() {
        return Ok(None);
    }
    decode(&buf).map(Some)
}

/// Read half of a job's channel, held by the orchestrator until the worker exits.
#[derive(Debug)]
pub struct Channel {
    reader: ChildStdout,
}

impl Channel {
    pub fn new(reader: ChildStdout) -> Self {
        Self { reader }
    }

    /// Consume the channel and read its payload, if any.
    pub async fn receive(self) -> Result<Option<Histogram>, TransportError> {
        receive(self.reader).await
    }
}
