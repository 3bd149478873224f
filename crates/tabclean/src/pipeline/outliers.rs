//! Outlier removal by standardized score.
//!
//! Each targeted column is scored against the rows that survived the
//! previous column, so the order of `columns` changes the result.

use crate::config::validate_z_threshold;
use crate::dataset::Dataset;
use crate::error::{CleaningError, Result};
use crate::types::{ColumnOutcome, LogicalType, Operation, OperationReport};
use crate::utils::{mean, std_dev};
use tracing::{debug, info, warn};

/// Removes rows whose values lie too many standard deviations from the mean.
pub struct OutlierRemover;

impl OutlierRemover {
    /// Remove outlier rows, one column at a time in the given order.
    ///
    /// Scores use the population standard deviation of the finite present
    /// values. Missing values score 0 and are kept; infinite values are
    /// always removed. A column whose finite values have zero variance and
    /// which holds no infinite value removes nothing and is reported as
    /// skipped.
    ///
    /// Every existing target must be numeric; otherwise the call fails before
    /// any row is removed.
    pub fn remove_outliers<S: AsRef<str>>(
        dataset: Dataset,
        columns: &[S],
        z_threshold: f64,
    ) -> Result<(Dataset, OperationReport)> {
        validate_z_threshold(z_threshold)?;

        for column in columns {
            let column = column.as_ref();
            if !dataset.has_column(column) {
                continue;
            }
            let logical = dataset.logical_type(column)?;
            if logical != LogicalType::Numeric {
                return Err(CleaningError::TypeMismatch {
                    column: column.to_string(),
                    expected: LogicalType::Numeric.to_string(),
                    found: logical.to_string(),
                });
            }
        }

        let mut dataset = dataset;
        let mut report = OperationReport::new(Operation::RemoveOutliers, dataset.height());

        for column in columns {
            let column = column.as_ref();
            if !dataset.has_column(column) {
                warn!("Column '{}' does not exist, skipping", column);
                report.push(ColumnOutcome::unknown_column(column, &dataset.column_names()));
                continue;
            }

            let values = dataset.numeric_values(column)?;
            let Some(scores) = z_scores(&values) else {
                let error = CleaningError::DegenerateColumn(column.to_string());
                warn!("{}", error);
                report.push(ColumnOutcome::skipped(column, &error));
                continue;
            };

            let infinite = values.iter().flatten().filter(|x| x.is_infinite()).count();
            let mask = retain_mask(&scores, z_threshold);
            let rows_before = dataset.height();
            dataset.filter_rows(&mask)?;
            let removed = rows_before - dataset.height();

            debug!(
                "Column '{}': removed {} rows with |z| >= {}",
                column, removed, z_threshold
            );
            let message = if infinite > 0 {
                format!("Removed {} rows ({} with infinite values)", removed, infinite)
            } else {
                format!("Removed {} rows", removed)
            };
            report.push(ColumnOutcome::success(column, message));
        }

        report.rows_after = dataset.height();
        if report.rows_removed() > 0 {
            info!(
                "Outlier removal: {} -> {} rows",
                report.rows_before, report.rows_after
            );
        }

        Ok((dataset, report))
    }
}

/// Standardized score of every value.
///
/// Mean and deviation come from the finite present values. Missing values
/// score 0 and infinite values keep their infinite score, so they always
/// fall outside the threshold. Returns `None` when the finite values have no
/// spread and there is no infinite value to remove.
pub(crate) fn z_scores(values: &[Option<f64>]) -> Option<Vec<f64>> {
    let finite: Vec<f64> = values.iter().flatten().copied().filter(|x| x.is_finite()).collect();
    let has_infinite = values.iter().flatten().any(|x| x.is_infinite());
    let spread = mean(&finite)
        .zip(std_dev(&finite, 0))
        .filter(|(_, std)| *std > 0.0);
    if spread.is_none() && !has_infinite {
        return None;
    }

    Some(
        values
            .iter()
            .map(|v| match (*v, spread) {
                (None, _) => 0.0,
                (Some(x), _) if x.is_infinite() => x,
                (Some(x), Some((mean, std))) => (x - mean) / std,
                (Some(_), None) => 0.0,
            })
            .collect(),
    )
}

/// Keep rows whose absolute score is strictly below the threshold.
pub(crate) fn retain_mask(scores: &[f64], z_threshold: f64) -> Vec<bool> {
    scores.iter().map(|z| z.abs() < z_threshold).collect()
}
