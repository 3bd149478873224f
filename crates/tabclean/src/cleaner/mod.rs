//! Type coercion and cleaning module.
//!
//! This module provides functionality for:
//! - Converting columns to numeric, temporal, categorical or text
//! - Stripping literal symbols from values
//! - Dropping columns
//!
//! Every operation takes the dataset by value, hands it back, and reports
//! one outcome per requested column. Unknown columns are warnings; only a
//! malformed call (bad date format, empty symbol) fails as a whole.

mod converters;
mod sanitizers;

use crate::dataset::Dataset;
use crate::error::{CleaningError, Result};
use crate::types::{ColumnOutcome, LogicalType, Operation, OperationReport};
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Column type conversions and value cleaning.
pub struct TypeCoercer;

impl TypeCoercer {
    /// Parse each column's values as numbers.
    ///
    /// Values that fail to parse become missing; the outcome message records
    /// how many.
    pub fn convert_to_numeric<S: AsRef<str>>(
        dataset: Dataset,
        columns: &[S],
    ) -> Result<(Dataset, OperationReport)> {
        let mut dataset = dataset;
        let mut report = OperationReport::new(Operation::ConvertToNumeric, dataset.height());

        for column in columns {
            let column = column.as_ref();
            let Some(series) = Self::target(&dataset, column, &mut report) else {
                continue;
            };

            let present_before = series.len() - series.null_count();
            let converted = converters::to_numeric(series)?;
            let lost = present_before.saturating_sub(converted.len() - converted.null_count());
            dataset.replace_column(converted, LogicalType::Numeric)?;

            let message = if lost > 0 {
                warn!("Column '{}': {} values could not be parsed as numbers", column, lost);
                format!("Converted to numeric; {} unparsable values set to missing", lost)
            } else {
                "Converted to numeric".to_string()
            };
            debug!("Converted column '{}' to numeric", column);
            report.push(ColumnOutcome::success(column, message));
        }

        Ok((dataset, report))
    }

    /// Parse each column's values as date/times.
    ///
    /// `format` is a chrono format string; `None` tries a fixed list of
    /// common formats per value. Unparsable values become missing. A format
    /// chrono cannot interpret fails the whole call before any column changes.
    pub fn convert_to_datetime<S: AsRef<str>>(
        dataset: Dataset,
        columns: &[S],
        format: Option<&str>,
    ) -> Result<(Dataset, OperationReport)> {
        if let Some(format) = format {
            converters::validate_date_format(format)?;
        }

        let mut dataset = dataset;
        let mut report = OperationReport::new(Operation::ConvertToDatetime, dataset.height());

        for column in columns {
            let column = column.as_ref();
            let Some(series) = Self::target(&dataset, column, &mut report) else {
                continue;
            };

            let present_before = series.len() - series.null_count();
            let converted = converters::to_datetime(series, format)?;
            let lost = present_before.saturating_sub(converted.len() - converted.null_count());
            dataset.replace_column(converted, LogicalType::Temporal)?;

            let message = if lost > 0 {
                warn!("Column '{}': {} values could not be parsed as dates", column, lost);
                format!("Converted to datetime; {} unparsable values set to missing", lost)
            } else {
                "Converted to datetime".to_string()
            };
            debug!("Converted column '{}' to datetime", column);
            report.push(ColumnOutcome::success(column, message));
        }

        Ok((dataset, report))
    }

    /// Tag each column as categorical. Values are left untouched.
    pub fn convert_to_categorical<S: AsRef<str>>(
        dataset: Dataset,
        columns: &[S],
    ) -> Result<(Dataset, OperationReport)> {
        let mut dataset = dataset;
        let mut report = OperationReport::new(Operation::ConvertToCategorical, dataset.height());

        for column in columns {
            let column = column.as_ref();
            if Self::target(&dataset, column, &mut report).is_none() {
                continue;
            }
            dataset.mark_categorical(column)?;
            let labels = dataset.categories(column)?.len();
            debug!("Converted column '{}' to categorical", column);
            report.push(ColumnOutcome::success(
                column,
                format!("Converted to categorical with {} labels", labels),
            ));
        }

        Ok((dataset, report))
    }

    /// Render each column's values as text.
    pub fn convert_to_text<S: AsRef<str>>(
        dataset: Dataset,
        columns: &[S],
    ) -> Result<(Dataset, OperationReport)> {
        let mut dataset = dataset;
        let mut report = OperationReport::new(Operation::ConvertToText, dataset.height());

        for column in columns {
            let column = column.as_ref();
            let Some(series) = Self::target(&dataset, column, &mut report) else {
                continue;
            };
            let converted = converters::to_text(series)?;
            dataset.replace_column(converted, LogicalType::Text)?;
            report.push(ColumnOutcome::success(column, "Converted to text"));
        }

        Ok((dataset, report))
    }

    /// Remove each symbol, as a literal substring, from every value of each
    /// column, in the order the symbols are given.
    ///
    /// Cleaned columns hold text afterwards. An empty symbol fails the call.
    pub fn clean_symbols<S: AsRef<str>, T: AsRef<str>>(
        dataset: Dataset,
        columns: &[S],
        symbols: &[T],
    ) -> Result<(Dataset, OperationReport)> {
        if symbols.iter().any(|s| s.as_ref().is_empty()) {
            return Err(CleaningError::InvalidConfig(
                "Symbols to remove must not be empty strings".to_string(),
            ));
        }

        let mut dataset = dataset;
        let mut report = OperationReport::new(Operation::CleanSymbols, dataset.height());

        for column in columns {
            let column = column.as_ref();
            let Some(series) = Self::target(&dataset, column, &mut report) else {
                continue;
            };
            let (cleaned, changed) = sanitizers::clean_series(series, symbols)?;
            let logical = match dataset.logical_type(column)? {
                LogicalType::Categorical => LogicalType::Categorical,
                _ => LogicalType::Text,
            };
            dataset.replace_column(cleaned, logical)?;
            debug!("Cleaned symbols from column '{}' ({} values changed)", column, changed);
            report.push(ColumnOutcome::success(
                column,
                format!("Removed symbols from {} values", changed),
            ));
        }

        Ok((dataset, report))
    }

    /// Remove whole columns from the dataset.
    pub fn drop_columns<S: AsRef<str>>(
        dataset: Dataset,
        columns: &[S],
    ) -> Result<(Dataset, OperationReport)> {
        let mut dataset = dataset;
        let mut report = OperationReport::new(Operation::DropColumns, dataset.height());
        let mut dropped: Vec<String> = Vec::new();

        for column in columns {
            let column = column.as_ref();
            if Self::target(&dataset, column, &mut report).is_none() {
                continue;
            }
            dropped.push(column.to_string());
            report.push(ColumnOutcome::success(column, "Dropped"));
        }

        dataset.drop_columns(&dropped);
        if !dropped.is_empty() {
            info!("Dropped {} columns: {:?}", dropped.len(), dropped);
        }

        Ok((dataset, report))
    }

    /// Look up a target column, recording a warning when it does not exist.
    fn target<'a>(
        dataset: &'a Dataset,
        column: &str,
        report: &mut OperationReport,
    ) -> Option<&'a Series> {
        match dataset.series(column) {
            Ok(series) => Some(series),
            Err(_) => {
                warn!("Column '{}' does not exist, skipping", column);
                report.push(ColumnOutcome::unknown_column(column, &dataset.column_names()));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OutcomeStatus;
    use pretty_assertions::assert_eq;

    fn raw_loans() -> Dataset {
        Dataset::new(
            df![
                "loan_amount" => ["$1,200", "$-,100", "950", "n/a"],
                "int_rate" => ["10.5%", "7%", "12%", "9.25%"],
                "issue_date" => ["2021-01-15", "2021-02-01", "bad", "2021-03-30"],
                "grade" => ["A", "B", "A", "C"],
            ]
            .unwrap(),
        )
    }

    fn text(dataset: &Dataset, column: &str) -> Vec<Option<String>> {
        dataset.text_values(column).unwrap()
    }

    #[test]
    fn test_clean_symbols_in_order() {
        let (ds, report) =
            TypeCoercer::clean_symbols(raw_loans(), &["loan_amount"], &["$", ","]).unwrap();
        assert_eq!(
            text(&ds, "loan_amount"),
            vec![
                Some("1200".to_string()),
                Some("-100".to_string()),
                Some("950".to_string()),
                Some("n/a".to_string()),
            ]
        );
        assert!(!report.has_issues());

        let (ds, _) =
            TypeCoercer::clean_symbols(raw_loans(), &["loan_amount"], &[",", "$"]).unwrap();
        assert_eq!(text(&ds, "loan_amount")[0].as_deref(), Some("1200"));
        assert_eq!(text(&ds, "loan_amount")[1].as_deref(), Some("-100"));
    }

    #[test]
    fn test_clean_symbols_adversarial_order() {
        let (first, _) =
            TypeCoercer::clean_symbols(raw_loans(), &["loan_amount"], &["-", "-,"]).unwrap();
        let (second, _) =
            TypeCoercer::clean_symbols(raw_loans(), &["loan_amount"], &["-,", "-"]).unwrap();
        assert_eq!(text(&first, "loan_amount")[1].as_deref(), Some("$,100"));
        assert_eq!(text(&second, "loan_amount")[1].as_deref(), Some("$100"));
    }

    #[test]
    fn test_clean_symbols_rejects_empty_symbol() {
        let result = TypeCoercer::clean_symbols(raw_loans(), &["loan_amount"], &["$", ""]);
        assert!(matches!(result, Err(CleaningError::InvalidConfig(_))));
    }

    #[test]
    fn test_convert_to_numeric_bad_values_become_missing() {
        let (ds, _) =
            TypeCoercer::clean_symbols(raw_loans(), &["loan_amount"], &["$", ","]).unwrap();
        let (ds, report) = TypeCoercer::convert_to_numeric(ds, &["loan_amount"]).unwrap();

        assert_eq!(ds.logical_type("loan_amount").unwrap(), LogicalType::Numeric);
        assert_eq!(
            ds.numeric_values("loan_amount").unwrap(),
            vec![Some(1200.0), Some(-100.0), Some(950.0), None]
        );
        let outcome = report.outcome_for("loan_amount").unwrap();
        assert_eq!(outcome.status, OutcomeStatus::Success);
        assert!(outcome.message.contains("1 unparsable"));
    }

    #[test]
    fn test_unknown_column_is_warning_and_others_continue() {
        let (ds, report) =
            TypeCoercer::convert_to_numeric(raw_loans(), &["missing", "grade"]).unwrap();
        assert_eq!(report.warnings().count(), 1);
        assert_eq!(report.outcome_for("missing").unwrap().status, OutcomeStatus::Warning);
        assert_eq!(report.outcome_for("grade").unwrap().status, OutcomeStatus::Success);
        assert_eq!(ds.logical_type("grade").unwrap(), LogicalType::Numeric);
        assert_eq!(ds.numeric_values("grade").unwrap(), vec![None; 4]);
    }

    #[test]
    fn test_numeric_text_numeric_is_stable() {
        let ds = Dataset::new(
            df!["x" => [Some("0.1"), Some("1e-7"), Some("oops"), None, Some(" 42 ")]].unwrap(),
        );
        let (ds, _) = TypeCoercer::convert_to_numeric(ds, &["x"]).unwrap();
        let first = ds.numeric_values("x").unwrap();
        let (ds, _) = TypeCoercer::convert_to_text(ds, &["x"]).unwrap();
        assert_eq!(ds.logical_type("x").unwrap(), LogicalType::Text);
        let (ds, _) = TypeCoercer::convert_to_numeric(ds, &["x"]).unwrap();
        assert_eq!(ds.numeric_values("x").unwrap(), first);
    }

    #[test]
    fn test_convert_to_datetime() {
        let (ds, report) =
            TypeCoercer::convert_to_datetime(raw_loans(), &["issue_date"], Some("%Y-%m-%d"))
                .unwrap();
        assert_eq!(ds.logical_type("issue_date").unwrap(), LogicalType::Temporal);
        assert_eq!(ds.series("issue_date").unwrap().null_count(), 1);
        assert!(report.outcome_for("issue_date").unwrap().message.contains("1 unparsable"));
    }

    #[test]
    fn test_convert_to_datetime_auto_detect() {
        let (ds, _) = TypeCoercer::convert_to_datetime(raw_loans(), &["issue_date"], None).unwrap();
        assert_eq!(ds.series("issue_date").unwrap().null_count(), 1);
    }

    #[test]
    fn test_convert_to_datetime_unsupported_format_is_fatal() {
        let result = TypeCoercer::convert_to_datetime(raw_loans(), &["issue_date"], Some("%Q"));
        assert!(matches!(result, Err(CleaningError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_convert_to_categorical_keeps_values() {
        let (ds, report) = TypeCoercer::convert_to_categorical(raw_loans(), &["grade"]).unwrap();
        assert_eq!(ds.logical_type("grade").unwrap(), LogicalType::Categorical);
        assert_eq!(ds.categories("grade").unwrap(), vec!["A", "B", "C"]);
        assert_eq!(text(&ds, "grade")[3].as_deref(), Some("C"));
        assert!(report.outcome_for("grade").unwrap().message.contains("3 labels"));
    }

    #[test]
    fn test_clean_symbols_keeps_categorical_tag() {
        let (ds, _) = TypeCoercer::convert_to_categorical(raw_loans(), &["int_rate"]).unwrap();
        let (ds, _) = TypeCoercer::clean_symbols(ds, &["int_rate"], &["%"]).unwrap();
        assert_eq!(ds.logical_type("int_rate").unwrap(), LogicalType::Categorical);
        assert_eq!(ds.categories("int_rate").unwrap(), vec!["10.5", "12", "7", "9.25"]);
    }

    #[test]
    fn test_drop_columns() {
        let (ds, report) =
            TypeCoercer::drop_columns(raw_loans(), &["grade", "nope", "int_rate"]).unwrap();
        assert_eq!(ds.column_names(), vec!["loan_amount", "issue_date"]);
        assert_eq!(report.warnings().count(), 1);
        assert_eq!(report.outcomes.len(), 3);
    }
}
