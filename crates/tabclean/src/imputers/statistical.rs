//! Statistical imputation methods.
//!
//! Provides mean and median imputation for numeric columns.

use crate::config::ImputationStrategy;
use crate::dataset::Dataset;
use crate::error::{CleaningError, Result};
use crate::types::{ColumnOutcome, LogicalType, Operation, OperationReport};
use crate::utils::{mean, median, present_values};
use polars::prelude::*;
use tracing::{debug, warn};

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Fill the missing values of every numeric column with the mean or
    /// median of its present values.
    ///
    /// Columns without missing values are left alone and not reported.
    /// Columns with no present values at all are reported as skipped.
    pub fn impute_missing(
        dataset: Dataset,
        strategy: ImputationStrategy,
    ) -> Result<(Dataset, OperationReport)> {
        let mut dataset = dataset;
        let mut report = OperationReport::new(Operation::ImputeMissing, dataset.height());

        for column in dataset.numeric_columns() {
            let values = dataset.numeric_values(&column)?;
            let missing = values.iter().filter(|v| v.is_none()).count();
            if missing == 0 {
                continue;
            }

            let present = present_values(&values);
            let fill = match strategy {
                ImputationStrategy::Mean => mean(&present),
                ImputationStrategy::Median => median(&present),
            };
            let Some(fill) = fill else {
                let error = CleaningError::NoValidValues(column.clone());
                warn!("Cannot impute column '{}': {}", column, error);
                report.push(ColumnOutcome::skipped(&column, &error));
                continue;
            };

            let filled: Vec<f64> = values.iter().map(|v| v.unwrap_or(fill)).collect();
            dataset.replace_column(
                Series::new(column.as_str().into(), filled),
                LogicalType::Numeric,
            )?;

            debug!(
                "Filled {} missing values in '{}' with {}: {:.4}",
                missing, column, strategy, fill
            );
            report.push(ColumnOutcome::success(
                &column,
                format!("Filled {} missing values with {} {}", missing, strategy, fill),
            ));
        }

        Ok((dataset, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OutcomeStatus;

    fn sample() -> Dataset {
        Dataset::new(
            df![
                "income" => [Some(10.0), None, Some(20.0), Some(60.0)],
                "score" => [Some(1.0), Some(2.0), Some(3.0), Some(4.0)],
                "empty" => [None::<f64>, None, None, None],
                "grade" => [Some("A"), None, Some("B"), Some("A")],
            ]
            .unwrap(),
        )
    }

    #[test]
    fn test_impute_mean() {
        let (ds, report) = StatisticalImputer::impute_missing(sample(), ImputationStrategy::Mean)
            .unwrap();
        assert_eq!(
            ds.numeric_values("income").unwrap(),
            vec![Some(10.0), Some(30.0), Some(20.0), Some(60.0)]
        );
        assert_eq!(report.outcome_for("income").unwrap().status, OutcomeStatus::Success);
        // complete columns are not touched or reported
        assert!(report.outcome_for("score").is_none());
    }

    #[test]
    fn test_impute_median() {
        let (ds, _) = StatisticalImputer::impute_missing(sample(), ImputationStrategy::Median)
            .unwrap();
        assert_eq!(ds.numeric_values("income").unwrap()[1], Some(20.0));
    }

    #[test]
    fn test_all_missing_column_is_skipped() {
        let (ds, report) = StatisticalImputer::impute_missing(sample(), ImputationStrategy::Mean)
            .unwrap();
        let outcome = report.outcome_for("empty").unwrap();
        assert_eq!(outcome.status, OutcomeStatus::Skipped);
        assert_eq!(outcome.error_code.as_deref(), Some("NO_VALID_VALUES"));
        assert_eq!(ds.series("empty").unwrap().null_count(), 4);
    }

    #[test]
    fn test_text_columns_are_not_imputed() {
        let (ds, _) = StatisticalImputer::impute_missing(sample(), ImputationStrategy::Mean)
            .unwrap();
        assert_eq!(ds.series("grade").unwrap().null_count(), 1);
    }
}
