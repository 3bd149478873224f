//! Integration tests for the cleaning pipeline.
//!
//! These tests run the whole pipeline over CSV fixtures and check the
//! cleaned data together with the structured report.

use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tabclean::io::{CsvDirectorySource, CsvSink, DataSink, DataSource, read_csv};
use tabclean::{
    CleaningConfig, CleaningPipeline, DataProfiler, Dataset, LogicalType, Operation,
    OutcomeStatus, PipelineStage, TypeCoercer,
};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_loans() -> Dataset {
    read_csv(fixtures_path().join("loans_subset.csv")).expect("Failed to read loans fixture")
}

fn loans_config() -> CleaningConfig {
    let content = std::fs::read_to_string(fixtures_path().join("loans_config.json"))
        .expect("Failed to read config fixture");
    serde_json::from_str(&content).expect("Config fixture should deserialize")
}

// ============================================================================
// Full Pipeline
// ============================================================================

#[test]
fn test_full_pipeline_loans() {
    let pipeline = CleaningPipeline::builder()
        .config(loans_config())
        .build()
        .unwrap();
    let result = pipeline.process(load_loans()).unwrap();
    let ds = &result.dataset;

    // id dropped, the 950000 income row removed as an outlier
    assert_eq!(ds.shape(), (11, 5));
    assert!(!ds.has_column("id"));

    assert_eq!(ds.logical_type("loan_amount").unwrap(), LogicalType::Numeric);
    assert_eq!(ds.logical_type("int_rate").unwrap(), LogicalType::Numeric);
    assert_eq!(ds.logical_type("issue_date").unwrap(), LogicalType::Temporal);
    assert_eq!(ds.logical_type("grade").unwrap(), LogicalType::Categorical);
    assert_eq!(ds.categories("grade").unwrap(), vec!["A", "B", "C"]);

    let amounts = ds.numeric_values("loan_amount").unwrap();
    assert_eq!(amounts[0], Some(1200.0));
    // missing amount filled with the median of the raw column
    assert_eq!(amounts[4], Some(5000.0));
    assert!(amounts.iter().all(|v| v.is_some()));

    let rates = ds.numeric_values("int_rate").unwrap();
    assert_eq!(rates[0], Some(10.5));
    assert_eq!(rates[2], Some(12.0));

    // "not a date" becomes missing; datetime columns are not imputed
    assert_eq!(ds.series("issue_date").unwrap().null_count(), 1);

    let incomes = ds.numeric_values("annual_inc").unwrap();
    assert!(incomes.iter().all(|v| v.is_some_and(f64::is_finite)));
}

#[test]
fn test_full_pipeline_report() {
    let pipeline = CleaningPipeline::builder()
        .config(loans_config())
        .build()
        .unwrap();
    let result = pipeline.process(load_loans()).unwrap();
    let report = &result.report;

    let outliers = report.operation(Operation::RemoveOutliers).unwrap();
    assert_eq!(outliers.rows_before, 12);
    assert_eq!(outliers.rows_after, 11);
    assert_eq!(outliers.rows_removed(), 1);

    let imputation = report.operation(Operation::ImputeMissing).unwrap();
    assert!(imputation.outcome_for("annual_inc").unwrap().is_success());
    assert!(imputation.outcome_for("loan_amount").unwrap().is_success());

    // Skew selection for income, type mismatch for the categorical grade
    assert_eq!(report.skew_selections.len(), 1);
    let selection = &report.skew_selections[0];
    assert_eq!(selection.column, "annual_inc");
    assert!(["log", "sqrt", "boxcox"].contains(&selection.chosen.as_str()));
    for candidate in &selection.candidates {
        if let Some(skewness) = candidate.skewness {
            assert!(selection.skewness_after.abs() <= skewness.abs());
        }
    }

    let issues = report.issues();
    assert_eq!(issues.len(), 1);
    let (operation, outcome) = issues[0];
    assert_eq!(operation, Operation::ReduceSkew);
    assert_eq!(outcome.column, "grade");
    assert_eq!(outcome.status, OutcomeStatus::Failed);
    assert_eq!(outcome.error_code.as_deref(), Some("TYPE_MISMATCH"));
}

#[test]
fn test_profile_reflects_raw_data() {
    let result = CleaningPipeline::builder()
        .config(loans_config())
        .build()
        .unwrap()
        .process(load_loans())
        .unwrap();
    let profile = &result.profile;

    assert_eq!(profile.shape, (12, 6));
    let income = profile.null_info_for("annual_inc").unwrap();
    assert_eq!(income.null_count, 1);
    assert!((income.null_percentage - 100.0 / 12.0).abs() < 1e-9);
    assert_eq!(profile.null_info_for("id").unwrap().null_percentage, 0.0);

    for info in &profile.null_info {
        assert!((0.0..=100.0).contains(&info.null_percentage));
    }

    assert_eq!(profile.distinct_counts.get("grade"), Some(&3));
    assert!(!profile.distinct_counts.contains_key("id"));
}

#[test]
fn test_pipeline_progress_stages() {
    let stages = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&stages);

    CleaningPipeline::builder()
        .config(loans_config())
        .on_progress(move |update| recorded.lock().unwrap().push(update.stage))
        .build()
        .unwrap()
        .process(load_loans())
        .unwrap();

    let stages = stages.lock().unwrap();
    assert_eq!(stages.first(), Some(&PipelineStage::Initializing));
    assert_eq!(stages.last(), Some(&PipelineStage::Complete));
    assert!(stages.contains(&PipelineStage::OutlierRemoval));
    assert!(stages.contains(&PipelineStage::SkewReduction));
}

#[test]
fn test_non_numeric_outlier_column_aborts() {
    let config = CleaningConfig::builder()
        .outlier_columns(["annual_inc", "grade"])
        .build()
        .unwrap();

    let err = CleaningPipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .process(load_loans())
        .unwrap_err();
    assert_eq!(err.error_code(), "TYPE_MISMATCH");
}

#[test]
fn test_unknown_columns_are_warnings() {
    let config = CleaningConfig::builder()
        .numeric_columns(["annual_inc", "payments"])
        .build()
        .unwrap();

    let result = CleaningPipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .process(load_loans())
        .unwrap();

    let issues = result.report.issues();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].1.column, "payments");
    assert_eq!(issues[0].1.status, OutcomeStatus::Warning);
    assert_eq!(result.dataset.shape(), (12, 6));
}

// ============================================================================
// Coercion Properties
// ============================================================================

#[test]
fn test_numeric_text_numeric_is_stable() {
    let ds = load_loans();
    let (ds, _) = TypeCoercer::clean_symbols(ds, &["loan_amount"], &["$", ","]).unwrap();
    let (ds, _) = TypeCoercer::convert_to_numeric(ds, &["loan_amount"]).unwrap();
    let first = ds.numeric_values("loan_amount").unwrap();

    let (ds, _) = TypeCoercer::convert_to_text(ds, &["loan_amount"]).unwrap();
    let (ds, _) = TypeCoercer::convert_to_numeric(ds, &["loan_amount"]).unwrap();
    assert_eq!(ds.numeric_values("loan_amount").unwrap(), first);
}

// ============================================================================
// Source and Sink
// ============================================================================

#[test]
fn test_csv_directory_source() {
    let source = CsvDirectorySource::new(fixtures_path());
    let handle = source.connect().unwrap();
    assert!(handle.tables().unwrap().contains(&"loans_subset".to_string()));

    let ds = source.query(&handle, "loans_subset").unwrap();
    assert_eq!(ds.shape(), (12, 6));

    let err = source.query(&handle, "missing_table").unwrap_err();
    assert_eq!(err.error_code(), "QUERY_ERROR");
}

#[test]
fn test_cleaned_dataset_round_trips_through_sink() {
    let result = CleaningPipeline::builder()
        .config(loans_config())
        .build()
        .unwrap()
        .process(load_loans())
        .unwrap();

    let dir = tempfile::tempdir().expect("Should create temp dir");
    let path = dir.path().join("loans_clean.csv");
    CsvSink::new().write(&result.dataset, &path).unwrap();

    let reloaded = read_csv(&path).unwrap();
    assert_eq!(reloaded.shape(), result.dataset.shape());
    assert_eq!(reloaded.column_names(), result.dataset.column_names());
    assert_eq!(
        reloaded.numeric_values("loan_amount").unwrap(),
        result.dataset.numeric_values("loan_amount").unwrap()
    );
}

#[test]
fn test_profiler_on_fixture() {
    let ds = load_loans();
    let (rows, cols) = DataProfiler::shape(&ds);
    assert_eq!((rows, cols), (12, 6));

    let stats = DataProfiler::extract_statistics(&ds).unwrap();
    let ids = stats.iter().find(|s| s.column == "id").unwrap();
    assert_eq!(ids.mean, Some(6.5));
    assert_eq!(ids.median, Some(6.5));
}
