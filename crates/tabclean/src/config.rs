//! Configuration types for the cleaning pipeline.
//!
//! The core never loads configuration itself; callers build a
//! [`CleaningConfig`] (directly, through the builder, or from JSON) and hand
//! it to the pipeline.

use crate::error::CleaningError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default standardized-score threshold for outlier removal.
pub const DEFAULT_Z_THRESHOLD: f64 = 3.0;

/// Strategy for imputing missing numeric values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImputationStrategy {
    /// Use the mean of non-null values
    Mean,
    /// Use the median of non-null values
    #[default]
    Median,
}

impl ImputationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Median => "median",
        }
    }
}

impl FromStr for ImputationStrategy {
    type Err = CleaningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mean" => Ok(Self::Mean),
            "median" => Ok(Self::Median),
            _ => Err(CleaningError::UnsupportedStrategy(format!(
                "{} (choose 'mean' or 'median')",
                s
            ))),
        }
    }
}

impl fmt::Display for ImputationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Monotonic transformation tried by the skew reducer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformKind {
    /// `ln(1 + x)`
    Log,
    /// `sqrt(x)`
    Sqrt,
    /// Box-Cox power transform of `1 + x` with a fixed parameter of 0.15
    #[serde(rename = "boxcox")]
    BoxCox,
}

impl TransformKind {
    /// Every transformation, in the default request order.
    pub const ALL: [TransformKind; 3] = [Self::Log, Self::Sqrt, Self::BoxCox];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Sqrt => "sqrt",
            Self::BoxCox => "boxcox",
        }
    }
}

impl FromStr for TransformKind {
    type Err = CleaningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "log" => Ok(Self::Log),
            "sqrt" => Ok(Self::Sqrt),
            "boxcox" | "box-cox" => Ok(Self::BoxCox),
            _ => Err(CleaningError::UnsupportedStrategy(format!(
                "{} (choose 'log', 'sqrt' or 'boxcox')",
                s
            ))),
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Configuration for the cleaning pipeline.
///
/// Every column list is optional; a stage whose list is empty does not run.
/// Use [`CleaningConfig::builder()`] for a validated configuration.
///
/// # Example
///
/// ```rust,ignore
/// use tabclean::config::{CleaningConfig, ImputationStrategy};
///
/// let config = CleaningConfig::builder()
///     .symbols(["$", ","])
///     .symbol_columns(["loan_amount"])
///     .numeric_columns(["loan_amount"])
///     .imputation(ImputationStrategy::Median)
///     .outlier_columns(["loan_amount"])
///     .skew_columns(["annual_inc"])
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Columns removed before any other stage.
    pub drop_columns: Vec<String>,

    /// Columns whose values get `symbols` stripped.
    pub symbol_columns: Vec<String>,

    /// Literal substrings to remove, applied in this order.
    pub symbols: Vec<String>,

    /// Columns parsed as numbers.
    pub numeric_columns: Vec<String>,

    /// Columns parsed as date/times.
    pub datetime_columns: Vec<String>,

    /// chrono format for `datetime_columns`; `None` auto-detects per value.
    pub date_format: Option<String>,

    /// Columns tagged as categorical.
    pub categorical_columns: Vec<String>,

    /// Imputation for numeric columns with missing values; `None` skips it.
    pub imputation: Option<ImputationStrategy>,

    /// Columns filtered for outliers, in this order.
    pub outlier_columns: Vec<String>,

    /// Rows whose absolute standardized score reaches this value are removed.
    /// Default: 3.0
    pub z_threshold: f64,

    /// Columns whose skewness gets reduced.
    pub skew_columns: Vec<String>,

    /// Transformations tried by the skew reducer, in preference order.
    /// Default: log, sqrt, boxcox
    pub transformations: Vec<TransformKind>,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            drop_columns: Vec::new(),
            symbol_columns: Vec::new(),
            symbols: Vec::new(),
            numeric_columns: Vec::new(),
            datetime_columns: Vec::new(),
            date_format: None,
            categorical_columns: Vec::new(),
            imputation: None,
            outlier_columns: Vec::new(),
            z_threshold: DEFAULT_Z_THRESHOLD,
            skew_columns: Vec::new(),
            transformations: TransformKind::ALL.to_vec(),
        }
    }
}

impl CleaningConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CleaningConfigBuilder {
        CleaningConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        validate_z_threshold(self.z_threshold)?;

        if self.transformations.is_empty() {
            return Err(ConfigValidationError::NoTransformations);
        }

        if self.symbols.iter().any(|s| s.is_empty()) {
            return Err(ConfigValidationError::EmptySymbol);
        }

        if let Some(format) = &self.date_format
            && format.trim().is_empty()
        {
            return Err(ConfigValidationError::EmptyDateFormat);
        }

        Ok(())
    }
}

/// Check that a z threshold is a positive, finite number.
pub fn validate_z_threshold(threshold: f64) -> Result<(), ConfigValidationError> {
    if !threshold.is_finite() || threshold <= 0.0 {
        return Err(ConfigValidationError::InvalidZThreshold(threshold));
    }
    Ok(())
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid z threshold: {0} (must be a positive, finite number)")]
    InvalidZThreshold(f64),

    #[error("At least one transformation must be requested")]
    NoTransformations,

    #[error("Symbols to remove must not be empty strings")]
    EmptySymbol,

    #[error("Date format must not be empty; omit it to auto-detect")]
    EmptyDateFormat,
}

impl From<ConfigValidationError> for CleaningError {
    fn from(error: ConfigValidationError) -> Self {
        CleaningError::InvalidConfig(error.to_string())
    }
}

fn to_strings<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}

/// Builder for [`CleaningConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct CleaningConfigBuilder {
    drop_columns: Option<Vec<String>>,
    symbol_columns: Option<Vec<String>>,
    symbols: Option<Vec<String>>,
    numeric_columns: Option<Vec<String>>,
    datetime_columns: Option<Vec<String>>,
    date_format: Option<String>,
    categorical_columns: Option<Vec<String>>,
    imputation: Option<ImputationStrategy>,
    outlier_columns: Option<Vec<String>>,
    z_threshold: Option<f64>,
    skew_columns: Option<Vec<String>>,
    transformations: Option<Vec<TransformKind>>,
}

impl CleaningConfigBuilder {
    pub fn drop_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.drop_columns = Some(to_strings(columns));
        self
    }

    pub fn symbol_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.symbol_columns = Some(to_strings(columns));
        self
    }

    /// Set the literal substrings to strip. Order matters.
    pub fn symbols<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.symbols = Some(to_strings(symbols));
        self
    }

    pub fn numeric_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.numeric_columns = Some(to_strings(columns));
        self
    }

    pub fn datetime_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.datetime_columns = Some(to_strings(columns));
        self
    }

    /// Set the chrono format used for datetime columns.
    pub fn date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = Some(format.into());
        self
    }

    pub fn categorical_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categorical_columns = Some(to_strings(columns));
        self
    }

    pub fn imputation(mut self, strategy: ImputationStrategy) -> Self {
        self.imputation = Some(strategy);
        self
    }

    pub fn outlier_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outlier_columns = Some(to_strings(columns));
        self
    }

    pub fn z_threshold(mut self, threshold: f64) -> Self {
        self.z_threshold = Some(threshold);
        self
    }

    pub fn skew_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skew_columns = Some(to_strings(columns));
        self
    }

    pub fn transformations(mut self, transformations: Vec<TransformKind>) -> Self {
        self.transformations = Some(transformations);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `CleaningConfig` or an error if validation fails.
    pub fn build(self) -> Result<CleaningConfig, ConfigValidationError> {
        let config = CleaningConfig {
            drop_columns: self.drop_columns.unwrap_or_default(),
            symbol_columns: self.symbol_columns.unwrap_or_default(),
            symbols: self.symbols.unwrap_or_default(),
            numeric_columns: self.numeric_columns.unwrap_or_default(),
            datetime_columns: self.datetime_columns.unwrap_or_default(),
            date_format: self.date_format,
            categorical_columns: self.categorical_columns.unwrap_or_default(),
            imputation: self.imputation,
            outlier_columns: self.outlier_columns.unwrap_or_default(),
            z_threshold: self.z_threshold.unwrap_or(DEFAULT_Z_THRESHOLD),
            skew_columns: self.skew_columns.unwrap_or_default(),
            transformations: self
                .transformations
                .unwrap_or_else(|| TransformKind::ALL.to_vec()),
        };

        config.validate()?;
        Ok(config)
    }
}
