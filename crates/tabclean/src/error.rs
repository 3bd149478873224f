//! Error types for the cleaning pipeline.
//!
//! Fatal, call-aborting failures are returned as [`CleaningError`]. Per-column
//! problems (unknown columns, transform domain violations, degenerate columns)
//! are recorded in an [`OperationReport`](crate::types::OperationReport) instead,
//! but they reuse the same variants so that reports and errors share one set of
//! error codes.
//!
//! Errors are serializable as `{code, message}` so they can be embedded in
//! JSON reports.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the cleaning pipeline.
#[derive(Error, Debug)]
pub enum CleaningError {
    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Percentage-based reporting was asked for on a dataset with no rows.
    #[error("Dataset has no rows; null percentages are undefined")]
    EmptyDataset,

    /// Column has a logical type the operation cannot work with.
    #[error("Column '{column}' has logical type {found}, expected {expected}")]
    TypeMismatch {
        column: String,
        expected: String,
        found: String,
    },

    /// Column has zero variance, so standardized scores are undefined.
    #[error("Column '{0}' has zero variance; standardized scores are undefined")]
    DegenerateColumn(String),

    /// A transformation's numeric domain was violated by the column's values.
    #[error("Transformation '{transform}' cannot be applied to column '{column}': {reason}")]
    TransformDomain {
        column: String,
        transform: String,
        reason: String,
    },

    /// None of the requested transformations could be applied to a column.
    #[error("No requested transformation is valid for column '{0}'")]
    NoValidTransform(String),

    /// Column holds infinite values that a transformation cannot score.
    #[error("Column '{column}' has {count} infinite values")]
    NonFiniteValues { column: String, count: usize },

    /// No valid values found in a column for computation.
    #[error("No valid values found in column '{0}'")]
    NoValidValues(String),

    /// Unsupported strategy name (imputation or transformation).
    #[error("Unsupported strategy '{0}'")]
    UnsupportedStrategy(String),

    /// Unsupported or malformed date format string.
    #[error("Unsupported date format '{0}'")]
    UnsupportedFormat(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Data source could not be reached.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Data source rejected a query.
    #[error("Query error: {0}")]
    Query(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<CleaningError>,
    },
}

impl CleaningError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        CleaningError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable machine-readable code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::EmptyDataset => "EMPTY_DATASET",
            Self::TypeMismatch { .. } => "TYPE_MISMATCH",
            Self::DegenerateColumn(_) => "DEGENERATE_COLUMN",
            Self::TransformDomain { .. } => "TRANSFORM_DOMAIN",
            Self::NoValidTransform(_) => "NO_VALID_TRANSFORM",
            Self::NonFiniteValues { .. } => "NON_FINITE_VALUES",
            Self::NoValidValues(_) => "NO_VALID_VALUES",
            Self::UnsupportedStrategy(_) => "UNSUPPORTED_STRATEGY",
            Self::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Connection(_) => "CONNECTION_ERROR",
            Self::Query(_) => "QUERY_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether this error only concerns a single column.
    ///
    /// Column-scoped errors are recorded in the operation report and the
    /// remaining columns keep processing; everything else aborts the call.
    pub fn is_column_scoped(&self) -> bool {
        match self {
            Self::ColumnNotFound(_)
            | Self::DegenerateColumn(_)
            | Self::TransformDomain { .. }
            | Self::NoValidTransform(_)
            | Self::NonFiniteValues { .. }
            | Self::NoValidValues(_) => true,
            Self::WithContext { source, .. } => source.is_column_scoped(),
            _ => false,
        }
    }
}

impl Serialize for CleaningError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("CleaningError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for cleaning operations.
pub type Result<T> = std::result::Result<T, CleaningError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CleaningError::Polars(e).with_context(context))
    }
}
