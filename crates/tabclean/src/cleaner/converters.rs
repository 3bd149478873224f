//! Value conversion functions for type coercion.

use crate::error::{CleaningError, Result};
use crate::utils::{is_datetime_dtype, is_numeric_dtype, series_to_f64, series_to_text};
use chrono::format::{Item, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;

/// Formats tried in order when no date format is given.
pub(crate) const AUTO_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%d %b %Y",
    "%b %d, %Y",
    "%b-%Y",
];

/// Parse one value as a float.
///
/// Surrounding whitespace is ignored. Empty strings, unparsable text and NaN
/// all yield `None`.
pub(crate) fn parse_number(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| !v.is_nan())
}

/// Convert any series to Float64, turning unparsable values into nulls.
pub(crate) fn to_numeric(series: &Series) -> Result<Series> {
    let name = series.name().clone();
    let dtype = series.dtype();

    let values: Vec<Option<f64>> = if is_numeric_dtype(dtype) || dtype == &DataType::Boolean {
        series_to_f64(series)?
    } else {
        series_to_text(series)?
            .into_iter()
            .map(|v| v.as_deref().and_then(parse_number))
            .collect()
    };

    Ok(Series::new(name, values))
}

/// Render any series as a String series.
pub(crate) fn to_text(series: &Series) -> Result<Series> {
    Ok(Series::new(series.name().clone(), series_to_text(series)?))
}

/// Reject a date format chrono cannot interpret.
pub(crate) fn validate_date_format(format: &str) -> Result<()> {
    let malformed = StrftimeItems::new(format).any(|item| matches!(item, Item::Error));
    if format.trim().is_empty() || malformed {
        return Err(CleaningError::UnsupportedFormat(format.to_string()));
    }
    Ok(())
}

/// Parse one value against a chrono format, as epoch milliseconds.
///
/// Formats without a time component parse to midnight. Formats without a day
/// of month (e.g. `%b-%Y`) parse to the first of the month.
pub(crate) fn parse_datetime(value: &str, format: &str) -> Option<i64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
        return Some(dt.and_utc().timestamp_millis());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, format) {
        return midnight_millis(date);
    }
    if !format.contains("%d") && !format.contains("%e") && !format.contains("%j") {
        let padded_format = format!("%d {}", format);
        if let Ok(date) = NaiveDate::parse_from_str(&format!("1 {}", value), &padded_format) {
            return midnight_millis(date);
        }
    }
    None
}

fn midnight_millis(date: NaiveDate) -> Option<i64> {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// Parse one value by trying each of [`AUTO_DATE_FORMATS`] in order.
pub(crate) fn parse_datetime_auto(value: &str) -> Option<i64> {
    AUTO_DATE_FORMATS
        .iter()
        .find_map(|format| parse_datetime(value, format))
}

/// Convert any series to `Datetime(Milliseconds)`, turning unparsable values
/// into nulls.
///
/// Temporal series are re-cast. Numeric series are taken as epoch
/// milliseconds. Everything else is rendered as text and parsed.
pub(crate) fn to_datetime(series: &Series, format: Option<&str>) -> Result<Series> {
    let target = DataType::Datetime(TimeUnit::Milliseconds, None);
    let dtype = series.dtype();

    if is_datetime_dtype(dtype) && dtype != &DataType::Time {
        return Ok(series.cast(&target)?);
    }

    let millis: Vec<Option<i64>> = if is_numeric_dtype(dtype) {
        series_to_f64(series)?
            .into_iter()
            .map(|v| v.filter(|ms| ms.is_finite()).map(|ms| ms as i64))
            .collect()
    } else {
        series_to_text(series)?
            .into_iter()
            .map(|v| {
                v.as_deref().and_then(|s| match format {
                    Some(format) => parse_datetime(s, format),
                    None => parse_datetime_auto(s),
                })
            })
            .collect()
    };

    Ok(Series::new(series.name().clone(), millis).cast(&target)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_null_at(series: &Series, idx: usize) -> bool {
        matches!(series.get(idx).unwrap(), AnyValue::Null)
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 12.5 "), Some(12.5));
        assert_eq!(parse_number("-3"), Some(-3.0));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("$12"), None);
        assert_eq!(parse_number("NaN"), None);
    }

    #[test]
    fn test_to_numeric_from_strings() {
        let series = Series::new("amount".into(), &[Some("1.5"), Some("abc"), None, Some("7")]);
        let result = to_numeric(&series).unwrap();
        assert_eq!(result.dtype(), &DataType::Float64);
        let values: Vec<Option<f64>> = result.f64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(1.5), None, None, Some(7.0)]);
    }

    #[test]
    fn test_to_numeric_from_integers_and_booleans() {
        let ints = Series::new("n".into(), &[1i64, 2, 3]);
        assert_eq!(to_numeric(&ints).unwrap().dtype(), &DataType::Float64);

        let flags = Series::new("b".into(), &[true, false]);
        let values: Vec<Option<f64>> = to_numeric(&flags)
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(values, vec![Some(1.0), Some(0.0)]);
    }

    #[test]
    fn test_validate_date_format() {
        assert!(validate_date_format("%Y-%m-%d").is_ok());
        assert!(validate_date_format("%b-%Y").is_ok());
        let err = validate_date_format("%Q-%m").unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");
        assert!(validate_date_format("").is_err());
    }

    #[test]
    fn test_parse_datetime_with_format() {
        assert_eq!(parse_datetime("1970-01-02", "%Y-%m-%d"), Some(86_400_000));
        assert_eq!(
            parse_datetime("1970-01-01 00:00:01", "%Y-%m-%d %H:%M:%S"),
            Some(1_000)
        );
        assert_eq!(parse_datetime("02/01/1970", "%Y-%m-%d"), None);
        assert_eq!(parse_datetime("   ", "%Y-%m-%d"), None);
    }

    #[test]
    fn test_parse_datetime_month_year() {
        let expected = NaiveDate::from_ymd_opt(2021, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp_millis();
        assert_eq!(parse_datetime("Jan-2021", "%b-%Y"), Some(expected));
        assert_eq!(parse_datetime_auto("Jan-2021"), Some(expected));
    }

    #[test]
    fn test_parse_datetime_auto() {
        assert_eq!(parse_datetime_auto("1970-01-02"), Some(86_400_000));
        assert_eq!(parse_datetime_auto("01/02/1970"), Some(86_400_000));
        assert_eq!(parse_datetime_auto("not a date"), None);
    }

    #[test]
    fn test_to_datetime_unparsable_become_null() {
        let series = Series::new(
            "issued".into(),
            &[Some("2021-03-04"), Some("garbage"), None],
        );
        let result = to_datetime(&series, Some("%Y-%m-%d")).unwrap();
        assert_eq!(
            result.dtype(),
            &DataType::Datetime(TimeUnit::Milliseconds, None)
        );
        assert!(!is_null_at(&result, 0));
        assert!(is_null_at(&result, 1));
        assert!(is_null_at(&result, 2));
    }
}
