//! Letter counting over a file or any byte stream.
//!
//! Input is streamed through a fixed buffer, so memory use does not grow
//! with file size.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::Histogram;

const READ_BUFFER: usize = 8 * 1024;

/// Count the letters in the file at `path`.
pub fn compute(path: &Path) -> Result<Histogram> {
    let file = File::open(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    from_reader(file).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Count the letters in everything `reader` yields until EOF.
pub fn from_reader<R: Read>(mut reader: R) -> std::io::Result<Histogram> {
    let mut hist = Histogram::new();
    let mut buf = [0u8; READ_BUFFER];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => return Ok(hist),
            Ok(n) => hist.record_bytes(&buf[..n]),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}
