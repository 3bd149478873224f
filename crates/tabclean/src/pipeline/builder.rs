//! Main cleaning pipeline module.
//!
//! This module provides the `CleaningPipeline` struct and builder that thread
//! a dataset through every configured stage.

use crate::cleaner::TypeCoercer;
use crate::config::{CleaningConfig, ConfigValidationError};
use crate::dataset::Dataset;
use crate::error::{Result, ResultExt};
use crate::imputers::StatisticalImputer;
use crate::pipeline::outliers::OutlierRemover;
use crate::pipeline::progress::{
    ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
use crate::pipeline::skew::SkewReducer;
use crate::profiler::DataProfiler;
use crate::types::{CleaningReport, DatasetProfile, OperationReport};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Output of a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// The cleaned dataset.
    pub dataset: Dataset,
    /// Profile of the dataset as it was before cleaning.
    pub profile: DatasetProfile,
    /// Per-operation, per-column outcomes.
    pub report: CleaningReport,
}

/// The cleaning pipeline.
///
/// Stages run in a fixed order: profile, drop columns, clean symbols,
/// numeric, datetime and categorical conversion, imputation, outlier removal,
/// skew reduction. A stage with nothing configured is not run.
///
/// # Example
///
/// ```rust,ignore
/// use tabclean::{CleaningConfig, CleaningPipeline};
///
/// let config = CleaningConfig::builder()
///     .symbols(["$", ","])
///     .symbol_columns(["loan_amount"])
///     .numeric_columns(["loan_amount"])
///     .outlier_columns(["loan_amount"])
///     .build()?;
///
/// let result = CleaningPipeline::builder()
///     .config(config)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .process(dataset)?;
/// ```
pub struct CleaningPipeline {
    config: CleaningConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

// The pipeline can be moved to a worker thread.
static_assertions::assert_impl_all!(CleaningPipeline: Send);

impl CleaningPipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> CleaningPipelineBuilder {
        CleaningPipelineBuilder::default()
    }

    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    /// Run every configured stage over the dataset.
    ///
    /// # Errors
    ///
    /// Only call-level problems abort the run: an empty dataset, an
    /// unsupported date format, a non-numeric outlier column. Per-column
    /// issues are returned in the report instead.
    pub fn process(&self, dataset: Dataset) -> Result<PipelineResult> {
        match self.process_internal(dataset) {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete("Pipeline completed successfully"));
                Ok(result)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn stage(&self, stage: PipelineStage, message: &str) {
        debug!("{}", message);
        self.report_progress(ProgressUpdate::new(stage, 0.0, message));
    }

    fn process_internal(&self, dataset: Dataset) -> Result<PipelineResult> {
        let start_time = Instant::now();
        let config = &self.config;

        info!("Starting cleaning pipeline...");
        self.stage(PipelineStage::Initializing, "Starting cleaning pipeline...");

        // 1. Profile the raw data
        self.stage(PipelineStage::Profiling, "Profiling dataset...");
        let profile = DataProfiler::profile(&dataset).context("Profiling failed")?;
        info!(
            "Dataset: {} rows x {} columns",
            profile.shape.0, profile.shape.1
        );

        let mut dataset = dataset;
        let mut report = CleaningReport::new();

        // 2. Drop columns
        if !config.drop_columns.is_empty() {
            self.stage(PipelineStage::DroppingColumns, "Dropping columns...");
            let (ds, op) = TypeCoercer::drop_columns(dataset, &config.drop_columns)?;
            dataset = Self::record(&mut report, ds, op);
        }

        // 3. Clean symbols
        if !config.symbol_columns.is_empty() && !config.symbols.is_empty() {
            self.stage(PipelineStage::CleaningSymbols, "Cleaning symbols...");
            let (ds, op) =
                TypeCoercer::clean_symbols(dataset, &config.symbol_columns, &config.symbols)?;
            dataset = Self::record(&mut report, ds, op);
        }

        // 4. Type coercion
        let has_conversions = !config.numeric_columns.is_empty()
            || !config.datetime_columns.is_empty()
            || !config.categorical_columns.is_empty();
        if has_conversions {
            self.stage(PipelineStage::TypeCoercion, "Converting column types...");
        }
        if !config.numeric_columns.is_empty() {
            let (ds, op) = TypeCoercer::convert_to_numeric(dataset, &config.numeric_columns)?;
            dataset = Self::record(&mut report, ds, op);
        }
        if !config.datetime_columns.is_empty() {
            let (ds, op) = TypeCoercer::convert_to_datetime(
                dataset,
                &config.datetime_columns,
                config.date_format.as_deref(),
            )?;
            dataset = Self::record(&mut report, ds, op);
        }
        if !config.categorical_columns.is_empty() {
            let (ds, op) =
                TypeCoercer::convert_to_categorical(dataset, &config.categorical_columns)?;
            dataset = Self::record(&mut report, ds, op);
        }

        // 5. Imputation
        if let Some(strategy) = config.imputation {
            self.stage(PipelineStage::Imputation, "Imputing missing values...");
            let (ds, op) = StatisticalImputer::impute_missing(dataset, strategy)?;
            dataset = Self::record(&mut report, ds, op);
        }

        // 6. Outlier removal
        if !config.outlier_columns.is_empty() {
            self.stage(PipelineStage::OutlierRemoval, "Removing outliers...");
            let (ds, op) = OutlierRemover::remove_outliers(
                dataset,
                &config.outlier_columns,
                config.z_threshold,
            )?;
            dataset = Self::record(&mut report, ds, op);
        }

        // 7. Skew reduction
        if !config.skew_columns.is_empty() {
            self.stage(PipelineStage::SkewReduction, "Reducing skew...");
            let (ds, skew) =
                SkewReducer::reduce_skew(dataset, &config.skew_columns, &config.transformations)?;
            for outcome in skew.report.outcomes.iter().filter(|o| !o.is_success()) {
                debug!("Skew issue on '{}': {}", outcome.column, outcome.message);
            }
            report.add_skew(skew);
            dataset = ds;
        }

        let issues = report.issues().len();
        if issues > 0 {
            warn!("{} column-level issues; see the report for details", issues);
        }
        info!(
            "Pipeline completed in {:.2}s: {} -> {} rows, {} -> {} columns",
            start_time.elapsed().as_secs_f64(),
            profile.shape.0,
            dataset.height(),
            profile.shape.1,
            dataset.width()
        );

        Ok(PipelineResult {
            dataset,
            profile,
            report,
        })
    }

    fn record(report: &mut CleaningReport, dataset: Dataset, op: OperationReport) -> Dataset {
        debug!(
            "{}: {} columns, {} issues",
            op.operation.display_name(),
            op.outcomes.len(),
            op.outcomes.iter().filter(|o| !o.is_success()).count()
        );
        report.add_operation(op);
        dataset
    }
}

/// Builder for creating a [`CleaningPipeline`] instance.
///
/// Use [`CleaningPipeline::builder()`] to get started.
#[derive(Default)]
pub struct CleaningPipelineBuilder {
    config: Option<CleaningConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(CleaningPipelineBuilder: Send);

impl CleaningPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: CleaningConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<CleaningPipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(CleaningPipeline {
            config,
            progress_reporter: self.progress_reporter,
        })
    }
}
