//! Pipeline module.
//!
//! This module provides the outlier remover, the skew reducer, progress
//! reporting, and the `CleaningPipeline` that runs every stage in order.

mod builder;
pub mod outliers;
pub mod progress;
pub mod skew;

pub use builder::{CleaningPipeline, CleaningPipelineBuilder, PipelineResult};
pub use outliers::OutlierRemover;
pub use progress::{ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate};
pub use skew::{DomainError, SkewReducer, TransformFn, BOXCOX_LAMBDA};
