use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::record::ProductRecord;

/// Writes the run's records as one pretty-printed JSON array.
pub struct JsonWriter {
    path: PathBuf,
}

impl JsonWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrites any existing file. Missing parent directories are created.
    pub fn write(&self, records: &[ProductRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let file = File::create(&self.path)
            .with_context(|| format!("Failed to create {}", self.path.display()))?;
        let mut out = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut out, records)
            .with_context(|| format!("Failed to serialize records to {}", self.path.display()))?;
        out.write_all(b"\n")?;
        out.flush()
            .with_context(|| format!("Failed to flush {}", self.path.display()))?;

        debug!("Wrote {} records to {}", records.len(), self.path.display());
        Ok(())
    }
}
