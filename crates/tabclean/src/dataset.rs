//! In-memory rectangular dataset.
//!
//! [`Dataset`] wraps a polars [`DataFrame`] and adds what the frame alone does
//! not carry: the logical type of each column. Storage dtypes map onto logical
//! types directly, except for categorical columns, which keep their storage
//! and are tagged instead.

use crate::error::{CleaningError, Result};
use crate::types::LogicalType;
use crate::utils::{
    format_float, is_datetime_dtype, is_numeric_dtype, series_to_f64, series_to_text, sorted,
};
use polars::prelude::*;
use std::collections::{BTreeSet, HashSet};

/// Ordered, named, equal-length columns with a logical type each.
///
/// Cloning yields an independent copy; stages take a `Dataset` by value and
/// hand it back, so callers that want to keep the original clone it first.
#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
    categorical: BTreeSet<String>,
}

static_assertions::assert_impl_all!(Dataset: Send, Sync);

impl Dataset {
    pub fn new(frame: DataFrame) -> Self {
        Self {
            frame,
            categorical: BTreeSet::new(),
        }
    }

    /// Build a dataset whose listed columns are already categorical.
    pub fn with_categorical<S: AsRef<str>>(frame: DataFrame, categorical: &[S]) -> Result<Self> {
        let mut dataset = Self::new(frame);
        for name in categorical {
            dataset.mark_categorical(name.as_ref())?;
        }
        Ok(dataset)
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn width(&self) -> usize {
        self.frame.width()
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.frame.height(), self.frame.width())
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// Column names in dataset order.
    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.column(name).is_ok()
    }

    pub fn series(&self, name: &str) -> Result<&Series> {
        let col = self
            .frame
            .column(name)
            .map_err(|_| CleaningError::ColumnNotFound(name.to_string()))?;
        Ok(col.as_materialized_series())
    }

    pub fn logical_type(&self, name: &str) -> Result<LogicalType> {
        let series = self.series(name)?;
        if self.categorical.contains(name) {
            return Ok(LogicalType::Categorical);
        }
        Ok(logical_type_of(series.dtype()))
    }

    pub fn is_numeric(&self, name: &str) -> bool {
        matches!(self.logical_type(name), Ok(LogicalType::Numeric))
    }

    /// Names of the columns whose logical type is numeric.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.column_names()
            .into_iter()
            .filter(|name| self.is_numeric(name))
            .collect()
    }

    /// Values of a numeric column as `f64`, missing markers as `None`.
    pub fn numeric_values(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let logical = self.logical_type(name)?;
        if logical != LogicalType::Numeric {
            return Err(CleaningError::TypeMismatch {
                column: name.to_string(),
                expected: LogicalType::Numeric.to_string(),
                found: logical.to_string(),
            });
        }
        Ok(series_to_f64(self.series(name)?)?)
    }

    /// Values of any column rendered as text, missing markers as `None`.
    pub fn text_values(&self, name: &str) -> Result<Vec<Option<String>>> {
        Ok(series_to_text(self.series(name)?)?)
    }

    /// Replace a column's values in place and set its logical type.
    ///
    /// The series must be named like the column and have the dataset's height.
    pub fn replace_column(&mut self, series: Series, logical: LogicalType) -> Result<()> {
        let name = series.name().to_string();
        if series.len() != self.frame.height() {
            return Err(CleaningError::InvalidConfig(format!(
                "Replacement for column '{}' has {} rows, dataset has {}",
                name,
                series.len(),
                self.frame.height()
            )));
        }
        self.frame.replace(&name, series)?;
        if logical == LogicalType::Categorical {
            self.categorical.insert(name);
        } else {
            self.categorical.remove(&name);
        }
        Ok(())
    }

    /// Tag a column as categorical without touching its values.
    pub fn mark_categorical(&mut self, name: &str) -> Result<()> {
        self.series(name)?;
        self.categorical.insert(name.to_string());
        Ok(())
    }

    /// Sorted distinct labels of a categorical column.
    pub fn categories(&self, name: &str) -> Result<Vec<String>> {
        let logical = self.logical_type(name)?;
        if logical != LogicalType::Categorical {
            return Err(CleaningError::TypeMismatch {
                column: name.to_string(),
                expected: LogicalType::Categorical.to_string(),
                found: logical.to_string(),
            });
        }

        if is_numeric_dtype(self.series(name)?.dtype()) {
            // Numeric labels sort by value, not lexically.
            let values = self.numeric_labels(name)?;
            return Ok(sorted(&values).into_iter().map(format_float).collect());
        }

        let labels: BTreeSet<String> = self.text_values(name)?.into_iter().flatten().collect();
        Ok(labels.into_iter().collect())
    }

    fn numeric_labels(&self, name: &str) -> Result<Vec<f64>> {
        let mut seen = HashSet::new();
        let values = series_to_f64(self.series(name)?)?
            .into_iter()
            .flatten()
            .filter(|v| seen.insert(v.to_bits()))
            .collect();
        Ok(values)
    }

    /// Keep only the rows whose mask entry is `true`, across every column.
    pub fn filter_rows(&mut self, mask: &[bool]) -> Result<()> {
        if mask.len() != self.frame.height() {
            return Err(CleaningError::InvalidConfig(format!(
                "Row mask has {} entries, dataset has {} rows",
                mask.len(),
                self.frame.height()
            )));
        }
        let mask = BooleanChunked::from_slice("mask".into(), mask);
        self.frame = self.frame.filter(&mask)?;
        Ok(())
    }

    /// Drop the named columns; names that do not exist are ignored.
    pub fn drop_columns<S: AsRef<str>>(&mut self, names: &[S]) {
        let cols_ref: Vec<PlSmallStr> = names
            .iter()
            .map(|s| s.as_ref())
            .filter(|s| self.has_column(s))
            .map(|s| s.into())
            .collect();
        for name in &cols_ref {
            self.categorical.remove(name.as_str());
        }
        self.frame = self.frame.drop_many(cols_ref);
    }
}

impl From<DataFrame> for Dataset {
    fn from(frame: DataFrame) -> Self {
        Self::new(frame)
    }
}

/// Logical type implied by a storage dtype alone.
pub fn logical_type_of(dtype: &DataType) -> LogicalType {
    if is_numeric_dtype(dtype) {
        LogicalType::Numeric
    } else if is_datetime_dtype(dtype) {
        LogicalType::Temporal
    } else {
        match dtype {
            DataType::String => LogicalType::Text,
            DataType::Boolean | DataType::Categorical(_, _) => LogicalType::Categorical,
            _ => LogicalType::Unresolved,
        }
    }
}
