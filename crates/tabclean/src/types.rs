use crate::error::CleaningError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Semantic interpretation of a column, independent of its storage dtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalType {
    Numeric,
    Text,
    Categorical,
    Temporal,
    Unresolved,
}

impl LogicalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Text => "text",
            Self::Categorical => "categorical",
            Self::Temporal => "temporal",
            Self::Unresolved => "unresolved",
        }
    }

    /// Text and categorical columns are the ones that get label statistics.
    pub fn is_label_like(&self) -> bool {
        matches!(self, Self::Text | Self::Categorical)
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// ============================================================================
// Profile snapshot
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnNullInfo {
    pub column: String,
    pub null_count: usize,
    pub null_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnStatistics {
    Numeric {
        count: usize,
        mean: Option<f64>,
        std: Option<f64>,
        min: Option<f64>,
        q25: Option<f64>,
        q50: Option<f64>,
        q75: Option<f64>,
        max: Option<f64>,
    },
    Categorical {
        count: usize,
        unique: usize,
        top: Option<String>,
        freq: Option<usize>,
    },
    Temporal {
        count: usize,
        unique: usize,
        min: Option<NaiveDateTime>,
        max: Option<NaiveDateTime>,
    },
    Unresolved {
        count: usize,
    },
}

impl ColumnStatistics {
    /// Number of present (non-missing) values.
    pub fn count(&self) -> usize {
        match self {
            Self::Numeric { count, .. }
            | Self::Categorical { count, .. }
            | Self::Temporal { count, .. }
            | Self::Unresolved { count } => *count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescription {
    pub column: String,
    pub logical_type: LogicalType,
    pub statistics: ColumnStatistics,
}

/// Mean, median and sample standard deviation of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentralTendency {
    pub column: String,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub shape: (usize, usize),
    pub null_info: Vec<ColumnNullInfo>,
    pub description: Vec<ColumnDescription>,
}

/// Immutable snapshot of a dataset produced by the profiler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetProfile {
    pub shape: (usize, usize),
    pub null_info: Vec<ColumnNullInfo>,
    pub description: Vec<ColumnDescription>,
    pub distinct_counts: BTreeMap<String, usize>,
}

impl DatasetProfile {
    pub fn null_info_for(&self, column: &str) -> Option<&ColumnNullInfo> {
        self.null_info.iter().find(|info| info.column == column)
    }

    pub fn description_for(&self, column: &str) -> Option<&ColumnDescription> {
        self.description.iter().find(|desc| desc.column == column)
    }
}

// ============================================================================
// Structured operation reports
// ============================================================================

/// Operations that produce an [`OperationReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    DropColumns,
    CleanSymbols,
    ConvertToNumeric,
    ConvertToDatetime,
    ConvertToCategorical,
    ConvertToText,
    ImputeMissing,
    RemoveOutliers,
    ReduceSkew,
}

impl Operation {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::DropColumns => "Drop columns",
            Self::CleanSymbols => "Clean symbols",
            Self::ConvertToNumeric => "Convert to numeric",
            Self::ConvertToDatetime => "Convert to datetime",
            Self::ConvertToCategorical => "Convert to categorical",
            Self::ConvertToText => "Convert to text",
            Self::ImputeMissing => "Impute missing values",
            Self::RemoveOutliers => "Remove outliers",
            Self::ReduceSkew => "Reduce skew",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// The column was processed as requested.
    Success,
    /// The column was not processed, and that is not an error (e.g. unknown name).
    Warning,
    /// The column was left unchanged because the operation does not apply to it.
    Skipped,
    /// The column could not be processed; it is left unchanged.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnOutcome {
    pub column: String,
    pub status: OutcomeStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl ColumnOutcome {
    pub fn success(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            status: OutcomeStatus::Success,
            message: message.into(),
            error_code: None,
        }
    }

    /// Outcome for a column name that does not exist in the dataset.
    pub fn unknown_column(column: impl Into<String>, available: &[String]) -> Self {
        let column = column.into();
        let message = format!(
            "Column '{}' does not exist. Available columns: {:?}",
            column, available
        );
        Self {
            column,
            status: OutcomeStatus::Warning,
            message,
            error_code: Some("COLUMN_NOT_FOUND".to_string()),
        }
    }

    pub fn skipped(column: impl Into<String>, error: &CleaningError) -> Self {
        Self {
            column: column.into(),
            status: OutcomeStatus::Skipped,
            message: error.to_string(),
            error_code: Some(error.error_code().to_string()),
        }
    }

    pub fn failed(column: impl Into<String>, error: &CleaningError) -> Self {
        Self {
            column: column.into(),
            status: OutcomeStatus::Failed,
            message: error.to_string(),
            error_code: Some(error.error_code().to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

/// Per-column outcomes of one operation over one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationReport {
    pub operation: Operation,
    pub rows_before: usize,
    pub rows_after: usize,
    pub outcomes: Vec<ColumnOutcome>,
}

impl OperationReport {
    pub fn new(operation: Operation, rows_before: usize) -> Self {
        Self {
            operation,
            rows_before,
            rows_after: rows_before,
            outcomes: Vec::new(),
        }
    }

    pub fn push(&mut self, outcome: ColumnOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn outcome_for(&self, column: &str) -> Option<&ColumnOutcome> {
        self.outcomes.iter().find(|o| o.column == column)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ColumnOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.status == OutcomeStatus::Warning)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ColumnOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.status == OutcomeStatus::Failed)
    }

    /// True when any column was not processed successfully.
    pub fn has_issues(&self) -> bool {
        self.outcomes.iter().any(|o| !o.is_success())
    }

    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }
}

// ============================================================================
// Skew reduction results
// ============================================================================

/// Score of one transformation tried on one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformCandidate {
    pub transform: String,
    /// Skewness of the transformed values; `None` when the candidate was rejected.
    pub skewness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected: Option<String>,
}

/// The transformation committed for a column, with every candidate's score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkewSelection {
    pub column: String,
    pub chosen: String,
    pub skewness_before: f64,
    pub skewness_after: f64,
    pub candidates: Vec<TransformCandidate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkewReport {
    pub report: OperationReport,
    pub selections: Vec<SkewSelection>,
}

impl SkewReport {
    pub fn selection_for(&self, column: &str) -> Option<&SkewSelection> {
        self.selections.iter().find(|s| s.column == column)
    }
}

/// Aggregated report of a full pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningReport {
    pub operations: Vec<OperationReport>,
    pub skew_selections: Vec<SkewSelection>,
}

impl CleaningReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_operation(&mut self, report: OperationReport) {
        self.operations.push(report);
    }

    pub fn add_skew(&mut self, skew: SkewReport) {
        self.skew_selections.extend(skew.selections);
        self.operations.push(skew.report);
    }

    pub fn operation(&self, operation: Operation) -> Option<&OperationReport> {
        self.operations.iter().find(|r| r.operation == operation)
    }

    /// Every outcome that was not a success, paired with its operation.
    pub fn issues(&self) -> Vec<(Operation, &ColumnOutcome)> {
        self.operations
            .iter()
            .flat_map(|r| {
                r.outcomes
                    .iter()
                    .filter(|o| !o.is_success())
                    .map(move |o| (r.operation, o))
            })
            .collect()
    }
}
