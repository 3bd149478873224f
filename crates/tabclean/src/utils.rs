//! Shared utilities for the cleaning pipeline.
//!
//! Dtype classification, conversions between polars Series and plain vectors,
//! and the small set of descriptive statistics every stage relies on.

use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Datetime(_, _) | DataType::Date | DataType::Time
    )
}

// =============================================================================
// Series Conversion Utilities
// =============================================================================

/// Read a numeric Series as `f64` values, with nulls and NaN as `None`.
pub fn series_to_f64(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let float_series = series.cast(&DataType::Float64)?;
    let values = float_series
        .f64()?
        .into_iter()
        .map(|v| v.filter(|val| !val.is_nan()))
        .collect();
    Ok(values)
}

/// Read any Series as text, with nulls as `None`.
///
/// Floats are rendered with Rust's shortest round-trip formatting so that
/// parsing the text back yields the identical value.
pub fn series_to_text(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    match series.dtype() {
        DataType::String => Ok(series
            .str()?
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect()),
        DataType::Float32 | DataType::Float64 => Ok(series_to_f64(series)?
            .into_iter()
            .map(|v| v.map(format_float))
            .collect()),
        _ => {
            let text_series = series.cast(&DataType::String)?;
            Ok(text_series
                .str()?
                .into_iter()
                .map(|v| v.map(|s| s.to_string()))
                .collect())
        }
    }
}

/// Format a float so that `s.parse::<f64>()` returns the same value.
pub fn format_float(value: f64) -> String {
    format!("{}", value)
}

/// Collect the present values of a column, dropping missing markers.
pub fn present_values(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().flatten().copied().collect()
}

// =============================================================================
// Descriptive Statistics
// =============================================================================

/// Arithmetic mean, or `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let sum: f64 = values.iter().sum();
    if sum.is_finite() || values.iter().any(|v| !v.is_finite()) {
        return Some(sum / n);
    }

    // The sum overflowed; average the rescaled values instead.
    let scale = magnitude(values);
    Some(values.iter().map(|v| v / scale).sum::<f64>() / n * scale)
}

/// Largest absolute value in the slice, `0.0` when empty.
fn magnitude(values: &[f64]) -> f64 {
    values.iter().fold(0.0, |max: f64, v| max.max(v.abs()))
}

/// Standard deviation with `ddof` delta degrees of freedom.
///
/// `ddof = 0` is the population deviation used for standardized scores,
/// `ddof = 1` the sample deviation reported by the profiler. Returns `None`
/// when there are not more than `ddof` values.
pub fn std_dev(values: &[f64], ddof: usize) -> Option<f64> {
    let std = unscaled_std_dev(values, ddof)?;
    if std.is_finite() || values.iter().any(|v| !v.is_finite()) {
        return Some(std);
    }

    // Squared deviations overflowed on finite input.
    let scale = magnitude(values);
    let scaled: Vec<f64> = values.iter().map(|v| v / scale).collect();
    unscaled_std_dev(&scaled, ddof).map(|std| std * scale)
}

fn unscaled_std_dev(values: &[f64], ddof: usize) -> Option<f64> {
    if values.len() <= ddof {
        return None;
    }
    let mean = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some((sum_sq / (values.len() - ddof) as f64).sqrt())
}

/// Sort a copy of the values in ascending total order.
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Quantile of already sorted values using linear interpolation.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Median of unsorted values.
pub fn median(values: &[f64]) -> Option<f64> {
    quantile_sorted(&sorted(values), 0.5)
}

/// Population skewness (g1): the mean of the cubed standardized deviations.
///
/// Non-finite values are ignored. Values are rescaled by their largest
/// magnitude before standardizing, so very large inputs cannot overflow.
/// Returns `None` when no finite value is present and `0.0` for a
/// zero-variance input.
pub fn skewness(values: &[f64]) -> Option<f64> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    let scale = magnitude(&finite);
    if scale == 0.0 {
        return Some(0.0);
    }

    let scaled: Vec<f64> = finite.iter().map(|v| v / scale).collect();
    let mean = mean(&scaled)?;
    let std = unscaled_std_dev(&scaled, 0)?;
    if std == 0.0 {
        return Some(0.0);
    }

    let n = scaled.len() as f64;
    Some(
        scaled
            .iter()
            .map(|v| ((v - mean) / std).powi(3))
            .sum::<f64>()
            / n,
    )
}
