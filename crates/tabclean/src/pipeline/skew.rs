//! Skew reduction by choosing among monotonic transformations.
//!
//! Every requested [`TransformKind`] maps to a pure function in a strategy
//! table. For each column the reducer runs all of them over the present
//! values, scores each result by its skewness, and commits the one closest
//! to symmetric. Ties go to the transformation requested first.

use crate::config::TransformKind;
use crate::dataset::Dataset;
use crate::error::{CleaningError, Result};
use crate::types::{
    ColumnOutcome, LogicalType, Operation, OperationReport, SkewReport, SkewSelection,
    TransformCandidate,
};
use crate::utils::{present_values, skewness};
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Fixed power parameter of the shifted Box-Cox transform.
pub const BOXCOX_LAMBDA: f64 = 0.15;

/// A value outside a transformation's support.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("value {value} violates {requirement}")]
pub struct DomainError {
    pub value: f64,
    pub requirement: &'static str,
}

/// A transformation over the present values of a column.
pub type TransformFn = fn(&[f64]) -> std::result::Result<Vec<f64>, DomainError>;

impl TransformKind {
    /// The function implementing this transformation.
    pub fn function(&self) -> TransformFn {
        match self {
            Self::Log => log1p,
            Self::Sqrt => sqrt,
            Self::BoxCox => boxcox,
        }
    }
}

fn check_domain(
    values: &[f64],
    requirement: &'static str,
    holds: impl Fn(f64) -> bool,
) -> std::result::Result<(), DomainError> {
    match values.iter().find(|v| !holds(**v)) {
        Some(&value) => Err(DomainError { value, requirement }),
        None => Ok(()),
    }
}

/// `ln(1 + x)`, requires `x > -1`.
pub fn log1p(values: &[f64]) -> std::result::Result<Vec<f64>, DomainError> {
    check_domain(values, "x > -1", |x| x > -1.0)?;
    Ok(values.iter().map(|x| x.ln_1p()).collect())
}

/// `sqrt(x)`, requires `x >= 0`.
pub fn sqrt(values: &[f64]) -> std::result::Result<Vec<f64>, DomainError> {
    check_domain(values, "x >= 0", |x| x >= 0.0)?;
    Ok(values.iter().map(|x| x.sqrt()).collect())
}

/// `((1 + x)^λ - 1) / λ` with λ = 0.15, requires `x + 0.15 > 0`.
pub fn boxcox(values: &[f64]) -> std::result::Result<Vec<f64>, DomainError> {
    check_domain(values, "x + 0.15 > 0", |x| x + BOXCOX_LAMBDA > 0.0)?;
    Ok(values
        .iter()
        .map(|x| ((1.0 + x).powf(BOXCOX_LAMBDA) - 1.0) / BOXCOX_LAMBDA)
        .collect())
}

/// One transformation's result on a column's present values.
struct Scored {
    kind: TransformKind,
    values: Vec<f64>,
    skewness: f64,
}

/// Run every requested transformation and pick the one closest to symmetric.
///
/// Returns the winner (if any candidate was valid) and the score sheet of
/// all candidates in request order.
fn select_best(
    present: &[f64],
    transformations: &[TransformKind],
) -> (Option<Scored>, Vec<TransformCandidate>) {
    let mut best: Option<Scored> = None;
    let mut candidates = Vec::with_capacity(transformations.len());

    for kind in transformations {
        let outcome = kind.function()(present).map_err(|e| e.to_string()).and_then(|values| {
            match skewness(&values) {
                Some(skew) if skew.is_finite() => Ok((values, skew)),
                Some(_) => Err("skewness is not finite".to_string()),
                None => Err("produced no finite values".to_string()),
            }
        });

        match outcome {
            Ok((values, skew)) => {
                candidates.push(TransformCandidate {
                    transform: kind.to_string(),
                    skewness: Some(skew),
                    rejected: None,
                });
                if best.as_ref().is_none_or(|b| skew.abs() < b.skewness.abs()) {
                    best = Some(Scored {
                        kind: *kind,
                        values,
                        skewness: skew,
                    });
                }
            }
            Err(reason) => candidates.push(TransformCandidate {
                transform: kind.to_string(),
                skewness: None,
                rejected: Some(reason),
            }),
        }
    }

    (best, candidates)
}

/// Reduces skewness of numeric columns.
pub struct SkewReducer;

impl SkewReducer {
    /// Replace each column by its least-skewed transformation.
    ///
    /// Missing positions stay missing. A column holding infinite values, or
    /// one for which no requested transformation is valid, is left unchanged
    /// and reported as failed; the remaining columns still proceed.
    pub fn reduce_skew<S: AsRef<str>>(
        dataset: Dataset,
        columns: &[S],
        transformations: &[TransformKind],
    ) -> Result<(Dataset, SkewReport)> {
        if transformations.is_empty() {
            return Err(CleaningError::InvalidConfig(
                "At least one transformation must be requested".to_string(),
            ));
        }

        let mut dataset = dataset;
        let mut report = OperationReport::new(Operation::ReduceSkew, dataset.height());
        let mut selections = Vec::new();

        for column in columns {
            let column = column.as_ref();
            match Self::reduce_column(&mut dataset, column, transformations) {
                Ok(selection) => {
                    info!(
                        "Column '{}': applied {} (skewness {:.4} -> {:.4})",
                        column, selection.chosen, selection.skewness_before, selection.skewness_after
                    );
                    report.push(ColumnOutcome::success(
                        column,
                        format!(
                            "Applied {} (skewness {:.4} -> {:.4})",
                            selection.chosen, selection.skewness_before, selection.skewness_after
                        ),
                    ));
                    selections.push(selection);
                }
                Err(CleaningError::ColumnNotFound(_)) => {
                    warn!("Column '{}' does not exist, skipping", column);
                    report.push(ColumnOutcome::unknown_column(column, &dataset.column_names()));
                }
                Err(e) if e.is_column_scoped() || matches!(e, CleaningError::TypeMismatch { .. }) => {
                    warn!("Skew reduction failed for column '{}': {}", column, e);
                    report.push(ColumnOutcome::failed(column, &e));
                }
                Err(e) => return Err(e),
            }
        }

        Ok((dataset, SkewReport { report, selections }))
    }

    fn reduce_column(
        dataset: &mut Dataset,
        column: &str,
        transformations: &[TransformKind],
    ) -> Result<SkewSelection> {
        let values = dataset.numeric_values(column)?;
        let present = present_values(&values);
        let infinite = present.iter().filter(|v| v.is_infinite()).count();
        if infinite > 0 {
            return Err(CleaningError::NonFiniteValues {
                column: column.to_string(),
                count: infinite,
            });
        }
        let skewness_before =
            skewness(&present).ok_or_else(|| CleaningError::NoValidValues(column.to_string()))?;

        let (best, candidates) = select_best(&present, transformations);
        for candidate in &candidates {
            debug!(
                "Column '{}': {} -> skewness {:?}{}",
                column,
                candidate.transform,
                candidate.skewness,
                candidate
                    .rejected
                    .as_deref()
                    .map(|r| format!(" (rejected: {})", r))
                    .unwrap_or_default()
            );
        }

        let Some(best) = best else {
            return Err(match (transformations, candidates.first()) {
                ([kind], Some(candidate)) => CleaningError::TransformDomain {
                    column: column.to_string(),
                    transform: kind.to_string(),
                    reason: candidate.rejected.clone().unwrap_or_default(),
                },
                _ => CleaningError::NoValidTransform(column.to_string()),
            });
        };

        let mut transformed = best.values.into_iter();
        let committed: Vec<Option<f64>> = values
            .iter()
            .map(|&v| v.and_then(|_| transformed.next()))
            .collect();
        dataset.replace_column(Series::new(column.into(), committed), LogicalType::Numeric)?;

        Ok(SkewSelection {
            column: column.to_string(),
            chosen: best.kind.to_string(),
            skewness_before,
            skewness_after: best.skewness,
            candidates,
        })
    }
}
