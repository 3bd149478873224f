//! Data sources yielding a [`Dataset`] for a query.

use crate::dataset::Dataset;
use crate::error::{CleaningError, Result};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A collaborator that yields datasets for query strings.
///
/// `connect` establishes whatever the source needs (a connection, a handle
/// to a directory) and `query` turns query text into a dataset using it.
pub trait DataSource {
    type Handle;

    /// Open the source. Fails with [`CleaningError::Connection`] when it
    /// cannot be reached.
    fn connect(&self) -> Result<Self::Handle>;

    /// Run a query. Fails with [`CleaningError::Query`] when the query is
    /// malformed or names something that does not exist.
    fn query(&self, handle: &Self::Handle, text: &str) -> Result<Dataset>;
}

/// A directory of CSV files, one per table.
///
/// A query is a table name; `loans` reads `<dir>/loans.csv`.
#[derive(Debug, Clone)]
pub struct CsvDirectorySource {
    dir: PathBuf,
}

/// Open handle of a [`CsvDirectorySource`].
#[derive(Debug, Clone)]
pub struct CsvDirectory {
    root: PathBuf,
}

impl CsvDirectory {
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Table names available in the directory, sorted.
    pub fn tables(&self) -> Result<Vec<String>> {
        let mut tables: Vec<String> = std::fs::read_dir(&self.root)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "csv"))
            .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();
        tables.sort();
        Ok(tables)
    }
}

impl CsvDirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DataSource for CsvDirectorySource {
    type Handle = CsvDirectory;

    fn connect(&self) -> Result<CsvDirectory> {
        if !self.dir.is_dir() {
            return Err(CleaningError::Connection(format!(
                "'{}' is not a readable directory",
                self.dir.display()
            )));
        }
        debug!("Connected to CSV directory {}", self.dir.display());
        Ok(CsvDirectory {
            root: self.dir.clone(),
        })
    }

    fn query(&self, handle: &CsvDirectory, text: &str) -> Result<Dataset> {
        let table = text.trim();
        let valid = !table.is_empty()
            && table
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(CleaningError::Query(format!(
                "'{}' is not a valid table name",
                text
            )));
        }

        let path = handle.root.join(format!("{}.csv", table));
        if !path.is_file() {
            return Err(CleaningError::Query(format!(
                "Table '{}' does not exist in {}",
                table,
                handle.root.display()
            )));
        }

        read_csv(&path).map_err(|e| CleaningError::Query(format!("Table '{}': {}", table, e)))
    }
}

/// Read a CSV file with a header row into a dataset.
pub fn read_csv(path: impl AsRef<Path>) -> Result<Dataset> {
    let path = path.as_ref();
    let frame = CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    info!("Loaded {}: {:?}", path.display(), frame.shape());
    Ok(Dataset::new(frame))
}
