//! Persistence of finished histograms.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{Histogram, RecordKey};

/// Persists one histogram under a key unique to its job.
pub trait ResultWriter {
    /// Write `hist` and return where it landed.
    fn write(&self, key: &RecordKey, hist: &Histogram) -> Result<PathBuf>;
}

/// Render a histogram as 26 `"<letter> <count>"` lines in `a..=z` order.
pub fn format_record(hist: &Histogram) -> String {
    let mut out = String::with_capacity(26 * 8);
    for (letter, count) in hist.iter() {
        out.push(letter);
        out.push(' ');
        out.push_str(&count.to_string());
        out.push('\n');
    }
    out
}

/// Writes each record to `<dir>/<key>.hist`.
#[derive(Debug, Clone)]
pub struct FileResultWriter {
    dir: PathBuf,
}

impl FileResultWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create the output directory if it does not exist yet.
    pub fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ResultWriter for FileResultWriter {
    fn write(&self, key: &RecordKey, hist: &Histogram) -> Result<PathBuf> {
        let path = self.dir.join(key.file_name());
        let wrap = |source: std::io::Error| Error::Write {
            key: key.to_string(),
            source,
        };

        let mut file = std::fs::File::create(&path).map_err(wrap)?;
        file.write_all(format_record(hist).as_bytes()).map_err(wrap)?;
        file.sync_all().map_err(wrap)?;

        debug!(key = %key, path = %path.display(), "record written");
        Ok(path)
    }
}
