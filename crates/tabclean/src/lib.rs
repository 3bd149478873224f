//! Tabular Data Cleaning Library
//!
//! Profiling, type coercion, imputation, outlier removal and skew reduction
//! for in-memory tabular data, built on Polars.
//!
//! # Overview
//!
//! - **Profiling**: shape, null counts, include-all summary statistics and
//!   distinct-value counts
//! - **Type Coercion**: numeric, datetime, categorical and text conversion with
//!   unparsable values becoming missing
//! - **Symbol Cleaning**: ordered, literal substring removal
//! - **Imputation**: mean or median filling of numeric columns
//! - **Outlier Removal**: standardized-score filtering applied column by column
//! - **Skew Reduction**: picks the least skewed of `log`, `sqrt` and a shifted
//!   Box-Cox transform per column
//! - **Structured Reports**: every operation returns per-column outcomes
//!   instead of printing diagnostics
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tabclean::io::read_csv;
//! use tabclean::{CleaningConfig, CleaningPipeline, ImputationStrategy};
//!
//! let dataset = read_csv("loans.csv")?;
//!
//! let config = CleaningConfig::builder()
//!     .symbol_columns(["int_rate"])
//!     .symbols(["%"])
//!     .numeric_columns(["int_rate"])
//!     .imputation(ImputationStrategy::Median)
//!     .outlier_columns(["annual_inc"])
//!     .skew_columns(["annual_inc"])
//!     .build()?;
//!
//! let result = CleaningPipeline::builder().config(config).build()?.process(dataset)?;
//!
//! for (operation, outcome) in result.report.issues() {
//!     println!("{}: {} ({})", operation.display_name(), outcome.column, outcome.message);
//! }
//! ```
//!
//! # Using the stages directly
//!
//! Every stage takes the dataset by value and hands it back with a report,
//! so callers wanting the original keep a clone:
//!
//! ```rust,ignore
//! use tabclean::{OutlierRemover, SkewReducer, TransformKind};
//!
//! let original = dataset.clone();
//! let (dataset, outliers) = OutlierRemover::remove_outliers(dataset, &["income"], 3.0)?;
//! let (dataset, skew) = SkewReducer::reduce_skew(dataset, &["income"], &TransformKind::ALL)?;
//! ```

pub mod cleaner;
pub mod config;
pub mod dataset;
pub mod error;
pub mod imputers;
pub mod io;
pub mod pipeline;
pub mod profiler;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::TypeCoercer;
pub use config::{
    CleaningConfig, CleaningConfigBuilder, ConfigValidationError, ImputationStrategy,
    TransformKind,
};
pub use dataset::Dataset;
pub use error::{CleaningError, Result as CleaningResult, ResultExt};
pub use imputers::StatisticalImputer;
pub use pipeline::{
    CleaningPipeline, CleaningPipelineBuilder, ClosureProgressReporter, OutlierRemover,
    PipelineResult, PipelineStage, ProgressReporter, ProgressUpdate, SkewReducer,
};
pub use profiler::DataProfiler;
pub use types::{
    CentralTendency, CleaningReport, ColumnDescription, ColumnNullInfo, ColumnOutcome,
    ColumnStatistics, DatasetProfile, DatasetSummary, LogicalType, Operation, OperationReport,
    OutcomeStatus, SkewReport, SkewSelection, TransformCandidate,
};
