//! Collaborators at the edge of the pipeline: where datasets come from and
//! where cleaned datasets go.
//!
//! The core never reaches for these itself; callers load a [`Dataset`]
//! through a [`DataSource`], run the pipeline, and hand the result to a
//! [`DataSink`].
//!
//! [`Dataset`]: crate::dataset::Dataset

mod sink;
mod source;

pub use sink::{CsvSink, DataSink};
pub use source::{read_csv, CsvDirectory, CsvDirectorySource, DataSource};
