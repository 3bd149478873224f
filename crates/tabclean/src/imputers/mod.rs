//! Imputation module for handling missing values.
//!
//! This module provides statistical imputation (mean, median) for numeric
//! columns.

mod statistical;

pub use statistical::StatisticalImputer;
