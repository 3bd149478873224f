//! Literal symbol removal.

use crate::utils::series_to_text;
use polars::prelude::*;

/// Remove every occurrence of each symbol from `value`, one symbol at a time
/// in the order given.
///
/// Symbols are literal substrings. Because each removal sees the output of
/// the previous one, overlapping symbols give order-dependent results.
pub(crate) fn remove_symbols<S: AsRef<str>>(value: &str, symbols: &[S]) -> String {
    symbols
        .iter()
        .fold(value.to_string(), |acc, symbol| acc.replace(symbol.as_ref(), ""))
}

/// Strip symbols from every value of a series, returning a String series.
///
/// Nulls stay null. Non-string series are rendered as text first. Also
/// returns how many values changed.
pub(crate) fn clean_series<S: AsRef<str>>(
    series: &Series,
    symbols: &[S],
) -> PolarsResult<(Series, usize)> {
    let mut changed = 0;
    let cleaned: Vec<Option<String>> = series_to_text(series)?
        .into_iter()
        .map(|opt_val| {
            opt_val.map(|val| {
                let cleaned = remove_symbols(&val, symbols);
                if cleaned != val {
                    changed += 1;
                }
                cleaned
            })
        })
        .collect();

    Ok((Series::new(series.name().clone(), cleaned), changed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_symbols_currency() {
        assert_eq!(remove_symbols("$1,200", &["$", ","]), "1200");
        assert_eq!(remove_symbols("$1,200", &[",", "$"]), "1200");
    }

    #[test]
    fn test_remove_symbols_is_literal() {
        // "." is not a wildcard
        assert_eq!(remove_symbols("1.5x", &["."]), "15x");
        assert_eq!(remove_symbols("a+b", &["a+"]), "b");
    }

    #[test]
    fn test_remove_symbols_order_matters() {
        assert_eq!(remove_symbols("$-,100", &["-", "-,"]), "$,100");
        assert_eq!(remove_symbols("$-,100", &["-,", "-"]), "$100");
        assert_eq!(remove_symbols("a---b", &["-", "--"]), "ab");
        assert_eq!(remove_symbols("a---b", &["--", "-"]), "ab");
        assert_eq!(remove_symbols("x--y-", &["--"]), "xy-");
    }

    #[test]
    fn test_clean_series_keeps_nulls() {
        let series = Series::new("price".into(), &[Some("$10"), None, Some("20")]);
        let (cleaned, changed) = clean_series(&series, &["$"]).unwrap();
        let values: Vec<Option<&str>> = cleaned.str().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some("10"), None, Some("20")]);
        assert_eq!(changed, 1);
    }

    #[test]
    fn test_clean_series_renders_numbers() {
        let series = Series::new("code".into(), &[1001i64, 2002]);
        let (cleaned, _) = clean_series(&series, &["0"]).unwrap();
        let values: Vec<Option<&str>> = cleaned.str().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some("11"), Some("22")]);
    }
}
