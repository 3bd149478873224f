//! Sinks that persist a cleaned [`Dataset`].

use crate::dataset::Dataset;
use crate::error::Result;
use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::info;

/// A collaborator that persists a dataset at a path.
pub trait DataSink {
    /// Write the dataset. An unwritable path is an I/O error.
    fn write(&self, dataset: &Dataset, path: &Path) -> Result<()>;
}

/// Writes a header row followed by delimited rows.
#[derive(Debug, Clone)]
pub struct CsvSink {
    separator: u8,
}

impl Default for CsvSink {
    fn default() -> Self {
        Self { separator: b',' }
    }
}

impl CsvSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }

    fn write_csv(&self, dataset: &Dataset, path: &Path) -> Result<()> {
        let mut file = File::create(path)?;
        let mut frame = dataset.frame().clone();

        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(self.separator)
            .with_quote_char(b'"')
            .finish(&mut frame)?;
        Ok(())
    }
}

impl DataSink for CsvSink {
    /// Rows are written to a sibling `.tmp` file which then replaces `path`,
    /// so a failed write leaves any existing file untouched.
    fn write(&self, dataset: &Dataset, path: &Path) -> Result<()> {
        let staging = staging_path(path);
        if let Err(e) = self.write_csv(dataset, &staging) {
            let _ = fs::remove_file(&staging);
            return Err(e);
        }
        fs::rename(&staging, path)?;

        info!("Dataset saved: {}", path.display());
        Ok(())
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
