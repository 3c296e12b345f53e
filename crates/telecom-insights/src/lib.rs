//! Telecommunications Customer Insights
//!
//! A data-quality and aggregation engine for telecommunications customer
//! datasets, built on Polars.
//!
//! # Overview
//!
//! This library provides:
//!
//! - **Data Quality**: Per-column missing-value counts and duplicate customer identifiers
//! - **Aggregations**: Churn rate, average monthly charges by plan, usage vs. data scatter
//! - **Loading**: CSV loading with fallbacks and an explicit, fingerprint-keyed cache
//! - **Queries**: Parameterized, read-only SQLite queries returning tables (feature `sqlite`)
//! - **Reports**: One serializable dashboard report for any presentation layer
//!
//! Every analysis is a pure function of a `DataFrame` passed in by the caller.
//! Nothing is cached behind the caller's back.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use telecom_insights::{AnalysisConfig, CsvLoader, DatasetLoader, ReportGenerator};
//! use std::path::Path;
//!
//! let df = CsvLoader::new().load(Path::new("telecommunications_data.csv"))?;
//! let config = AnalysisConfig::default();
//!
//! let report = ReportGenerator::build_dashboard_report(&df, "telecommunications_data.csv", &config)?;
//! println!("Duplicates: {}", report.duplicates.duplicate_count);
//! println!("Churn: {:?}", report.churn_rate.get("Yes"));
//! ```
//!
//! # Individual Metrics
//!
//! ```rust,ignore
//! use telecom_insights::{AggregationEngine, DataQualityAnalyzer};
//!
//! let missing = DataQualityAnalyzer::missing_value_report(&df)?;
//! let duplicates = DataQualityAnalyzer::duplicate_count(&df, "CustomerID")?;
//!
//! let engine = AggregationEngine::default();
//! let churn = engine.frequency_distribution(&df, "Churn")?;
//! let charges = engine.grouped_mean(&df, "PlanType", "MonthlyCharges")?;
//! let scatter = engine.scatter_series(&df, "PlanType", "UsageMinutes", "DataUsedGB")?;
//! ```
//!
//! # Null Handling
//!
//! - Duplicate detection treats absent keys (null or NaN) as equal to each other.
//! - Frequency distributions count nulls as their own category (configurable).
//! - Rows with a null or NaN group key never form a group.
//! - NaN counts as missing in floating point columns.

pub mod aggregation;
pub mod config;
pub mod error;
pub mod loader;
#[cfg(feature = "sqlite")]
pub mod query;
pub mod quality;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use aggregation::AggregationEngine;
pub use config::{
    AnalysisConfig, AnalysisConfigBuilder, ColumnMapping, ConfigValidationError, NonNumericPolicy,
};
pub use error::{InsightsError, Result as InsightsResult, ResultExt};
pub use loader::{CsvLoader, DatasetCache, DatasetLoader, SourceFingerprint};
pub use quality::DataQualityAnalyzer;
#[cfg(feature = "sqlite")]
pub use query::{QueryExecutor, QueryParam, SqliteExecutor};
pub use reporting::{DashboardReport, DatasetOverview, ReportGenerator, table_to_json_rows};
pub use types::{
    CategoryShare, ColumnMissing, DuplicateReport, FrequencyDistribution, GroupedMean,
    MissingValueReport, ScatterPoint, ScatterSeries,
};
