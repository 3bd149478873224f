//! Data profiling module for dataset analysis.
//!
//! This module provides read-only profiling of a [`Dataset`]:
//! - Shape and null counts/percentages
//! - Include-all summary statistics per column
//! - Distinct-value counts for text and categorical columns
//! - Central tendency (mean, median, std) of numeric columns

mod statistics;

use crate::dataset::Dataset;
use crate::error::{CleaningError, Result};
use crate::types::{
    CentralTendency, ColumnDescription, ColumnNullInfo, DatasetProfile, DatasetSummary,
};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

pub(crate) use statistics::{describe_column, missing_count};

/// Data profiler for analyzing dataset structure and characteristics.
pub struct DataProfiler;

impl DataProfiler {
    /// Profile an entire dataset.
    ///
    /// Fails with [`CleaningError::EmptyDataset`] when the dataset has no rows,
    /// since null percentages are undefined there.
    pub fn profile(dataset: &Dataset) -> Result<DatasetProfile> {
        let null_info = Self::count_null_values(dataset)?;
        let description = Self::describe(dataset)?;
        let distinct_counts = Self::count_distinct_values(dataset)?;

        debug!(
            rows = dataset.height(),
            columns = dataset.width(),
            "Profiled dataset"
        );

        Ok(DatasetProfile {
            shape: dataset.shape(),
            null_info,
            description,
            distinct_counts,
        })
    }

    /// (rows, columns)
    pub fn shape(dataset: &Dataset) -> (usize, usize) {
        dataset.shape()
    }

    /// Summary statistics for every column, in dataset order.
    pub fn describe(dataset: &Dataset) -> Result<Vec<ColumnDescription>> {
        dataset
            .column_names()
            .iter()
            .map(|name| describe_column(dataset, name))
            .collect()
    }

    /// Null count and percentage for every column.
    pub fn count_null_values(dataset: &Dataset) -> Result<Vec<ColumnNullInfo>> {
        let rows = dataset.height();
        if rows == 0 {
            return Err(CleaningError::EmptyDataset);
        }

        let mut info = Vec::with_capacity(dataset.width());
        for name in dataset.column_names() {
            let null_count = missing_count(dataset, &name)?;
            let null_percentage = (null_count as f64 / rows as f64) * 100.0;
            debug!(column = %name, null_count, null_percentage, "Null count");
            info.push(ColumnNullInfo {
                column: name,
                null_count,
                null_percentage,
            });
        }
        Ok(info)
    }

    /// Distinct non-missing values per text or categorical column.
    pub fn count_distinct_values(dataset: &Dataset) -> Result<BTreeMap<String, usize>> {
        let mut counts = BTreeMap::new();
        for name in dataset.column_names() {
            if !dataset.logical_type(&name)?.is_label_like() {
                continue;
            }
            let distinct: HashSet<String> =
                dataset.text_values(&name)?.into_iter().flatten().collect();
            counts.insert(name, distinct.len());
        }
        Ok(counts)
    }

    /// Mean, median and sample standard deviation of each numeric column.
    pub fn extract_statistics(dataset: &Dataset) -> Result<Vec<CentralTendency>> {
        dataset
            .numeric_columns()
            .iter()
            .map(|name| statistics::central_tendency(dataset, name))
            .collect()
    }

    /// Shape, null info and description composed into one result.
    pub fn summary(dataset: &Dataset) -> Result<DatasetSummary> {
        Ok(DatasetSummary {
            shape: Self::shape(dataset),
            null_info: Self::count_null_values(dataset)?,
            description: Self::describe(dataset)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ColumnStatistics, LogicalType};
    use polars::prelude::*;
    use pretty_assertions::assert_eq;

    fn loans() -> Dataset {
        let frame = df![
            "loan_amount" => [Some(1000.0), Some(2500.0), None, Some(4000.0)],
            "grade" => [Some("A"), Some("B"), Some("A"), None],
            "term" => ["36 months", "60 months", "36 months", "36 months"],
        ]
        .unwrap();
        Dataset::with_categorical(frame, &["term"]).unwrap()
    }

    #[test]
    fn test_count_null_values() {
        let info = DataProfiler::count_null_values(&loans()).unwrap();
        assert_eq!(info.len(), 3);
        assert_eq!(info[0].null_count, 1);
        assert_eq!(info[0].null_percentage, 25.0);
        assert_eq!(info[2].null_count, 0);
        assert_eq!(info[2].null_percentage, 0.0);
    }

    #[test]
    fn test_null_percentage_bounds() {
        let frame = df![
            "all_null" => [None::<f64>, None, None],
            "none_null" => [1.0, 2.0, 3.0],
        ]
        .unwrap();
        let info = DataProfiler::count_null_values(&Dataset::new(frame)).unwrap();
        for entry in &info {
            assert!((0.0..=100.0).contains(&entry.null_percentage));
            assert_eq!(entry.null_percentage == 0.0, entry.null_count == 0);
        }
        assert_eq!(info[0].null_percentage, 100.0);
    }

    #[test]
    fn test_empty_dataset_is_error() {
        let frame = df!["x" => Vec::<f64>::new()].unwrap();
        let result = DataProfiler::count_null_values(&Dataset::new(frame));
        assert!(matches!(result, Err(CleaningError::EmptyDataset)));
    }

    #[test]
    fn test_count_distinct_values_skips_numeric() {
        let counts = DataProfiler::count_distinct_values(&loans()).unwrap();
        let expected: BTreeMap<String, usize> =
            [("grade".to_string(), 2), ("term".to_string(), 2)].into();
        assert_eq!(counts, expected);
    }

    #[test]
    fn test_describe_uses_logical_types() {
        let description = DataProfiler::describe(&loans()).unwrap();
        assert_eq!(description[0].logical_type, LogicalType::Numeric);
        assert_eq!(description[1].logical_type, LogicalType::Text);
        assert_eq!(description[2].logical_type, LogicalType::Categorical);
        assert_eq!(
            description[2].statistics,
            ColumnStatistics::Categorical {
                count: 4,
                unique: 2,
                top: Some("36 months".to_string()),
                freq: Some(3),
            }
        );
    }

    #[test]
    fn test_extract_statistics() {
        let stats = DataProfiler::extract_statistics(&loans()).unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].column, "loan_amount");
        assert_eq!(stats[0].mean, Some(2500.0));
        assert_eq!(stats[0].median, Some(2500.0));
        assert_eq!(stats[0].std, Some(1500.0));
    }

    #[test]
    fn test_summary_and_profile_agree() {
        let ds = loans();
        let summary = DataProfiler::summary(&ds).unwrap();
        let profile = DataProfiler::profile(&ds).unwrap();
        assert_eq!(summary.shape, (4, 3));
        assert_eq!(summary.null_info, profile.null_info);
        assert_eq!(summary.description, profile.description);
        assert_eq!(profile.null_info_for("grade").unwrap().null_count, 1);
    }
}
