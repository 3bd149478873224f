//! Per-column statistics used by the profiler.

use crate::dataset::Dataset;
use crate::error::Result;
use crate::types::{CentralTendency, ColumnDescription, ColumnStatistics, LogicalType};
use crate::utils::{mean, median, present_values, quantile_sorted, sorted, std_dev};
use chrono::{DateTime, NaiveDateTime};
use polars::prelude::*;
use std::collections::{HashMap, HashSet};

/// Number of missing values in a column.
///
/// For numeric columns a stray NaN counts as missing, matching how every
/// other stage reads numeric values.
pub(crate) fn missing_count(dataset: &Dataset, column: &str) -> Result<usize> {
    if dataset.is_numeric(column) {
        let values = dataset.numeric_values(column)?;
        return Ok(values.iter().filter(|v| v.is_none()).count());
    }
    Ok(dataset.series(column)?.null_count())
}

/// Summary statistics of one column, chosen by its logical type.
pub(crate) fn describe_column(dataset: &Dataset, column: &str) -> Result<ColumnDescription> {
    let logical_type = dataset.logical_type(column)?;
    let statistics = match logical_type {
        LogicalType::Numeric => numeric_statistics(&dataset.numeric_values(column)?),
        LogicalType::Text | LogicalType::Categorical => {
            label_statistics(&dataset.text_values(column)?)
        }
        LogicalType::Temporal => temporal_statistics(dataset.series(column)?)?,
        LogicalType::Unresolved => {
            let series = dataset.series(column)?;
            ColumnStatistics::Unresolved {
                count: series.len() - series.null_count(),
            }
        }
    };

    Ok(ColumnDescription {
        column: column.to_string(),
        logical_type,
        statistics,
    })
}

/// Count, mean, sample std, min, quartiles and max of the present values.
pub(crate) fn numeric_statistics(values: &[Option<f64>]) -> ColumnStatistics {
    let present = present_values(values);
    let ordered = sorted(&present);

    ColumnStatistics::Numeric {
        count: present.len(),
        mean: mean(&present),
        std: std_dev(&present, 1),
        min: ordered.first().copied(),
        q25: quantile_sorted(&ordered, 0.25),
        q50: quantile_sorted(&ordered, 0.5),
        q75: quantile_sorted(&ordered, 0.75),
        max: ordered.last().copied(),
    }
}

/// Count, distinct count, most frequent label and its frequency.
///
/// When several labels share the highest frequency, the one seen first wins.
pub(crate) fn label_statistics(values: &[Option<String>]) -> ColumnStatistics {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut count = 0;

    for value in values.iter().flatten() {
        count += 1;
        let entry = counts.entry(value.as_str()).or_insert_with(|| {
            order.push(value.as_str());
            0
        });
        *entry += 1;
    }

    let mut top: Option<(&str, usize)> = None;
    for label in &order {
        let freq = counts[label];
        if top.is_none_or(|(_, best)| freq > best) {
            top = Some((label, freq));
        }
    }

    ColumnStatistics::Categorical {
        count,
        unique: order.len(),
        top: top.map(|(label, _)| label.to_string()),
        freq: top.map(|(_, freq)| freq),
    }
}

/// Count, distinct count and range of a temporal column.
pub(crate) fn temporal_statistics(series: &Series) -> Result<ColumnStatistics> {
    if matches!(series.dtype(), DataType::Time) {
        // Times of day have no calendar range.
        let values: HashSet<String> = series
            .cast(&DataType::String)?
            .str()?
            .into_iter()
            .flatten()
            .map(|s| s.to_string())
            .collect();
        return Ok(ColumnStatistics::Temporal {
            count: series.len() - series.null_count(),
            unique: values.len(),
            min: None,
            max: None,
        });
    }

    let millis: Vec<i64> = series
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
        .cast(&DataType::Int64)?
        .i64()?
        .into_iter()
        .flatten()
        .collect();
    let unique: HashSet<i64> = millis.iter().copied().collect();

    Ok(ColumnStatistics::Temporal {
        count: millis.len(),
        unique: unique.len(),
        min: millis.iter().min().and_then(|ms| to_naive(*ms)),
        max: millis.iter().max().and_then(|ms| to_naive(*ms)),
    })
}

fn to_naive(millis: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc())
}

/// Mean, median and sample standard deviation of a numeric column.
pub(crate) fn central_tendency(dataset: &Dataset, column: &str) -> Result<CentralTendency> {
    let present = present_values(&dataset.numeric_values(column)?);
    Ok(CentralTendency {
        column: column.to_string(),
        mean: mean(&present),
        median: median(&present),
        std: std_dev(&present, 1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_statistics_excludes_missing() {
        let stats = numeric_statistics(&[Some(1.0), None, Some(2.0), Some(3.0), Some(4.0)]);
        match stats {
            ColumnStatistics::Numeric {
                count,
                mean,
                std,
                min,
                q25,
                q50,
                q75,
                max,
            } => {
                assert_eq!(count, 4);
                assert_eq!(mean, Some(2.5));
                assert!((std.unwrap() - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
                assert_eq!(min, Some(1.0));
                assert_eq!(q25, Some(1.75));
                assert_eq!(q50, Some(2.5));
                assert_eq!(q75, Some(3.25));
                assert_eq!(max, Some(4.0));
            }
            other => panic!("Expected numeric statistics, got {:?}", other),
        }
    }

    #[test]
    fn test_numeric_statistics_single_value_has_no_std() {
        let stats = numeric_statistics(&[Some(7.0), None]);
        assert!(matches!(
            stats,
            ColumnStatistics::Numeric {
                count: 1,
                std: None,
                ..
            }
        ));
    }

    #[test]
    fn test_label_statistics_top_tie_goes_to_first_seen() {
        let values: Vec<Option<String>> = ["B", "A", "A", "B", "C"]
            .iter()
            .map(|s| Some(s.to_string()))
            .chain(std::iter::once(None))
            .collect();

        assert_eq!(
            label_statistics(&values),
            ColumnStatistics::Categorical {
                count: 5,
                unique: 3,
                top: Some("B".to_string()),
                freq: Some(2),
            }
        );
    }

    #[test]
    fn test_label_statistics_all_missing() {
        assert_eq!(
            label_statistics(&[None, None]),
            ColumnStatistics::Categorical {
                count: 0,
                unique: 0,
                top: None,
                freq: None,
            }
        );
    }

    #[test]
    fn test_temporal_statistics_range() {
        let series = Series::new(
            "issued".into(),
            &[Some(86_400_000i64), None, Some(0), Some(86_400_000)],
        )
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
        .unwrap();

        match temporal_statistics(&series).unwrap() {
            ColumnStatistics::Temporal {
                count,
                unique,
                min,
                max,
            } => {
                assert_eq!(count, 3);
                assert_eq!(unique, 2);
                assert_eq!(min.unwrap().to_string(), "1970-01-01 00:00:00");
                assert_eq!(max.unwrap().to_string(), "1970-01-02 00:00:00");
            }
            other => panic!("Expected temporal statistics, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_count_treats_nan_as_missing() {
        let ds = Dataset::new(
            df!["v" => [Some(1.0), Some(f64::NAN), None]].unwrap(),
        );
        assert_eq!(missing_count(&ds, "v").unwrap(), 2);
    }
}
