//! Integration tests for the insights engine.
//!
//! These tests load fixture datasets from disk and verify the dashboard
//! metrics end to end.

use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use telecom_insights::{
    AggregationEngine, AnalysisConfig, CsvLoader, DataQualityAnalyzer, DatasetCache,
    DatasetLoader, InsightsError, NonNumericPolicy, ReportGenerator,
};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_csv(filename: &str) -> DataFrame {
    CsvLoader::new()
        .load(&fixtures_path().join(filename))
        .expect("Failed to read CSV file")
}

// ============================================================================
// Data Quality
// ============================================================================

#[test]
fn test_missing_values_from_csv() {
    let df = load_csv("telecom_subset.csv");
    let report = DataQualityAnalyzer::missing_value_report(&df).unwrap();

    assert_eq!(report.total_rows, 8);
    assert_eq!(report.len(), df.width());
    assert_eq!(report.get("CustomerID"), Some(0));
    assert_eq!(report.get("Age"), Some(1));
    assert_eq!(report.get("PlanType"), Some(1));
    assert_eq!(report.get("MonthlyCharges"), Some(1));
    assert_eq!(report.get("DataUsedGB"), Some(1));
    assert_eq!(report.get("Churn"), Some(1));
    assert_eq!(report.total_missing(), 5);
}

#[test]
fn test_duplicate_customers_from_csv() {
    let df = load_csv("telecom_subset.csv");

    assert_eq!(
        DataQualityAnalyzer::duplicate_count(&df, "CustomerID").unwrap(),
        1
    );
}

// ============================================================================
// Aggregations
// ============================================================================

#[test]
fn test_churn_rate_from_csv() {
    let df = load_csv("telecom_subset.csv");
    let churn = AggregationEngine::default()
        .frequency_distribution(&df, "Churn")
        .unwrap();

    let values: Vec<Option<&str>> = churn
        .categories
        .iter()
        .map(|share| share.value.as_deref())
        .collect();
    assert_eq!(values, vec![Some("No"), Some("Yes"), None]);
    assert_eq!(churn.get("No"), Some(62.5));
    assert_eq!(churn.get("Yes"), Some(25.0));
    assert_eq!(churn.missing(), Some(12.5));
}

#[test]
fn test_churn_rate_excluding_missing() {
    let df = load_csv("telecom_subset.csv");
    let churn = AggregationEngine::new(NonNumericPolicy::Skip, false)
        .frequency_distribution(&df, "Churn")
        .unwrap();

    assert_eq!(churn.len(), 2);
    assert_eq!(churn.missing(), None);
    assert!((churn.get("No").unwrap() - 500.0 / 7.0).abs() < 1e-9);
    assert!((churn.total_percentage() - 100.0).abs() < 1e-9);
}

#[test]
fn test_monthly_charges_by_plan_from_csv() {
    let df = load_csv("telecom_subset.csv");
    let charges = AggregationEngine::default()
        .grouped_mean(&df, "PlanType", "MonthlyCharges")
        .unwrap();

    // The row without a plan does not form a group.
    assert_eq!(charges.len(), 3);
    assert_eq!(charges.get("Basic"), Some(15.0));
    assert_eq!(charges.get("Premium"), Some(40.0));
    assert_eq!(charges.get("Standard"), Some(30.0));
}

#[test]
fn test_formatted_charges_are_parsed() {
    let df = load_csv("messy_charges.csv");
    let charges = AggregationEngine::default()
        .grouped_mean(&df, "PlanType", "MonthlyCharges")
        .unwrap();

    assert_eq!(charges.get("Basic"), Some(15.0));
    assert_eq!(charges.get("Premium"), Some(1040.0));
}

#[test]
fn test_strict_policy_rejects_unparseable_charges() {
    let df = load_csv("messy_charges.csv");
    let err = AggregationEngine::new(NonNumericPolicy::Strict, true)
        .grouped_mean(&df, "PlanType", "MonthlyCharges")
        .unwrap_err();

    match err {
        InsightsError::NonNumericColumn { column, value } => {
            assert_eq!(column, "MonthlyCharges");
            assert_eq!(value, "unknown");
        }
        other => panic!("Expected NonNumericColumn, got {:?}", other),
    }
}

#[test]
fn test_usage_vs_data_from_csv() {
    let df = load_csv("telecom_subset.csv");
    let scatter = AggregationEngine::default()
        .scatter_series(&df, "PlanType", "UsageMinutes", "DataUsedGB")
        .unwrap();

    let basic: Vec<(f64, f64)> = scatter
        .get("Basic")
        .unwrap()
        .iter()
        .map(|p| (p.x, p.y))
        .collect();
    assert_eq!(basic, vec![(120.0, 1.0), (80.0, 0.5), (60.0, 0.7)]);
    assert_eq!(scatter.get("Premium").unwrap().len(), 1);
    assert_eq!(scatter.get("Standard").unwrap().len(), 2);
    assert_eq!(scatter.point_count(), 6);
}

#[test]
fn test_missing_column_is_reported_by_every_operation() {
    let df = load_csv("telecom_subset.csv");
    let engine = AggregationEngine::default();

    let errors = vec![
        DataQualityAnalyzer::duplicate_count(&df, "AccountID").unwrap_err(),
        engine.frequency_distribution(&df, "Churned").unwrap_err(),
        engine.grouped_mean(&df, "Plan", "MonthlyCharges").unwrap_err(),
        engine.grouped_mean(&df, "PlanType", "Charges").unwrap_err(),
        engine
            .scatter_series(&df, "PlanType", "Minutes", "DataUsedGB")
            .unwrap_err(),
    ];

    for err in errors {
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    }
}

// ============================================================================
// Dashboard Report
// ============================================================================

#[test]
fn test_dashboard_report_from_csv() {
    let df = load_csv("telecom_subset.csv");
    let config = AnalysisConfig::default();
    let report =
        ReportGenerator::build_dashboard_report(&df, "telecom_subset.csv", &config).unwrap();

    assert_eq!(report.overview.rows, 8);
    assert_eq!(report.overview.preview.len(), 5);
    assert_eq!(report.duplicates.duplicate_count, 1);
    assert_eq!(report.duplicates.duplicate_percentage, 12.5);
    assert_eq!(report.churn_rate.get("Yes"), Some(25.0));
    assert_eq!(report.monthly_charges_by_plan.get("Premium"), Some(40.0));
    assert_eq!(report.usage_vs_data.point_count(), 6);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["duplicates"]["duplicate_count"], 1);
    assert_eq!(json["monthly_charges_by_plan"]["means"]["Basic"], 15.0);
}

#[test]
fn test_dashboard_report_on_header_only_file() {
    let df = load_csv("header_only.csv");
    let report =
        ReportGenerator::build_dashboard_report(&df, "header_only.csv", &AnalysisConfig::default())
            .unwrap();

    assert_eq!(report.overview.rows, 0);
    assert!(report.overview.preview.is_empty());
    assert_eq!(report.missing_values.total_missing(), 0);
    assert_eq!(report.duplicates.duplicate_count, 0);
    assert!(report.churn_rate.is_empty());
    assert!(report.monthly_charges_by_plan.is_empty());
    assert!(report.usage_vs_data.is_empty());
}

#[test]
fn test_remapped_columns() {
    let df = load_csv("messy_charges.csv");
    let builder = AnalysisConfig::builder()
        .churn_column("PlanType")
        .usage_column("MonthlyCharges")
        .data_column("MonthlyCharges");

    let config = builder.clone().build().unwrap();
    let report =
        ReportGenerator::build_dashboard_report(&df, "messy_charges.csv", &config).unwrap();
    assert_eq!(report.churn_rate.get("Basic"), Some(50.0));
    assert_eq!(report.usage_vs_data.get("Premium").unwrap().len(), 1);

    let strict = builder
        .non_numeric_policy(NonNumericPolicy::Strict)
        .build()
        .unwrap();
    let err = ReportGenerator::build_dashboard_report(&df, "messy_charges.csv", &strict)
        .unwrap_err();
    assert_eq!(err.error_code(), "NON_NUMERIC_COLUMN");
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_cache_returns_same_table() {
    let cache = DatasetCache::new();
    let loader = CsvLoader::new();
    let path = fixtures_path().join("telecom_subset.csv");

    let first = cache.get_or_load(&loader, &path).unwrap();
    let second = cache.get_or_load(&loader, &path).unwrap();

    assert_eq!(cache.len(), 1);
    assert!(first.equals_missing(&second));
    assert!(cache.invalidate(&path));
    assert!(cache.is_empty());
}

#[test]
fn test_missing_dataset_is_io_error() {
    let err = CsvLoader::new()
        .load(&fixtures_path().join("does_not_exist.csv"))
        .unwrap_err();

    assert_eq!(err.error_code(), "IO_ERROR");
    assert!(!err.is_caller_error());
}

// ============================================================================
// Queries
// ============================================================================

#[cfg(feature = "sqlite")]
mod query {
    use super::*;
    use pretty_assertions::assert_eq;
    use rusqlite::Connection;
    use telecom_insights::{QueryExecutor, QueryParam, SqliteExecutor};

    fn seeded_database(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "telecom-insights-it-{}-{}.db",
            std::process::id(),
            name
        ));
        std::fs::remove_file(&path).ok();

        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE customers (CustomerID TEXT, PlanType TEXT, MonthlyCharges REAL);
             INSERT INTO customers VALUES ('C001', 'Basic', 10.0);
             INSERT INTO customers VALUES ('C002', 'Basic', 20.0);
             INSERT INTO customers VALUES ('C003', 'Premium', 30.0);
             INSERT INTO customers VALUES ('C004', 'Premium', 50.0);",
        )
        .unwrap();
        path
    }

    #[test]
    fn test_query_result_feeds_engine() {
        let path = seeded_database("engine");
        let executor = SqliteExecutor::open_read_only(&path).unwrap();

        let df = executor
            .execute(
                "SELECT * FROM customers WHERE MonthlyCharges >= ?1",
                &[QueryParam::infer("15")],
            )
            .unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(df.height(), 3);
        let charges = AggregationEngine::default()
            .grouped_mean(&df, "PlanType", "MonthlyCharges")
            .unwrap();
        assert_eq!(charges.get("Basic"), Some(20.0));
        assert_eq!(charges.get("Premium"), Some(40.0));
    }

    #[test]
    fn test_read_only_database_rejects_writes() {
        let path = seeded_database("readonly");
        let executor = SqliteExecutor::open_read_only(&path).unwrap();

        let err = executor
            .execute("DELETE FROM customers", &[])
            .unwrap_err();
        let remaining = executor
            .execute("SELECT COUNT(*) AS n FROM customers", &[])
            .unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(err.error_code(), "QUERY_ERROR");
        assert_eq!(remaining.column("n").unwrap().i64().unwrap().get(0), Some(4));
    }
}
