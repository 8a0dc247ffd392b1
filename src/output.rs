use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{anyhow, Context, Result};

/// Incremental CSV sink: header once, then one flushed record per row, so an
/// aborted run keeps every row assembled before termination.
pub struct CsvSink<W: Write> {
    wtr: csv::Writer<W>,
}

impl CsvSink<File> {
    /// Create (or overwrite) the output file, creating parent directories,
    /// and write the header row.
    pub fn create(path: &Path, headers: &[&str]) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create output directory: {}", parent.display())
                })?;
            }
        }
        let wtr = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create output CSV: {}", path.display()))?;
        Self::start(wtr, headers)
    }
}

impl<W: Write> CsvSink<W> {
    pub fn from_writer(writer: W, headers: &[&str]) -> Result<Self> {
        Self::start(csv::Writer::from_writer(writer), headers)
    }

    fn start(mut wtr: csv::Writer<W>, headers: &[&str]) -> Result<Self> {
        wtr.write_record(headers)?;
        wtr.flush()?;
        Ok(Self { wtr })
    }

    pub fn write(&mut self, record: &[String]) -> Result<()> {
        self.wtr.write_record(record)?;
        self.wtr.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W> {
        self.wtr
            .into_inner()
            .map_err(|e| anyhow!("Failed to finish CSV output: {}", e))
    }
}

// ── Tests ──
