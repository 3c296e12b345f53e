//! Configuration types for dataset analysis.
//!
//! This module provides the column mapping and aggregation policies using the
//! builder pattern, plus environment-based defaults for the data source paths.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable naming the default dataset file.
pub const DATASET_ENV_VAR: &str = "TELECOM_DATASET";

/// Environment variable naming the default SQLite database file.
pub const DATABASE_ENV_VAR: &str = "TELECOM_DATABASE";

/// Directory that emitted reports are written to unless configured otherwise.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

const DEFAULT_DATASET_PATH: &str = "telecommunications_data.csv";
const DEFAULT_DATABASE_PATH: &str = "telecom_data.db";
const DEFAULT_PREVIEW_ROWS: usize = 5;
const MAX_PREVIEW_ROWS: usize = 1000;

/// How numeric aggregations treat present values that cannot be read as numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum NonNumericPolicy {
    /// Skip unparseable values; groups left with no values are omitted
    #[default]
    Skip,
    /// Fail the whole aggregation with `NonNumericColumn`
    Strict,
}

/// Names of the dataset columns each dashboard metric reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    /// Customer identifier used for duplicate detection.
    /// Default: "CustomerID"
    pub key_column: String,

    /// Churn flag used for the churn rate.
    /// Default: "Churn"
    pub churn_column: String,

    /// Subscription plan used for grouping.
    /// Default: "PlanType"
    pub plan_column: String,

    /// Monthly charges averaged per plan.
    /// Default: "MonthlyCharges"
    pub charges_column: String,

    /// Usage minutes (scatter x axis).
    /// Default: "UsageMinutes"
    pub usage_column: String,

    /// Data used in GB (scatter y axis).
    /// Default: "DataUsedGB"
    pub data_column: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            key_column: "CustomerID".to_string(),
            churn_column: "Churn".to_string(),
            plan_column: "PlanType".to_string(),
            charges_column: "MonthlyCharges".to_string(),
            usage_column: "UsageMinutes".to_string(),
            data_column: "DataUsedGB".to_string(),
        }
    }
}

impl ColumnMapping {
    /// Every configured column name, in metric order.
    pub fn names(&self) -> Vec<&str> {
        self.fields().into_iter().map(|(_, name)| name).collect()
    }

    fn fields(&self) -> [(&'static str, &str); 6] {
        [
            ("key_column", &self.key_column),
            ("churn_column", &self.churn_column),
            ("plan_column", &self.plan_column),
            ("charges_column", &self.charges_column),
            ("usage_column", &self.usage_column),
            ("data_column", &self.data_column),
        ]
    }
}

/// Configuration for dataset analysis.
///
/// Use [`AnalysisConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use telecom_insights::config::{AnalysisConfig, NonNumericPolicy};
///
/// let config = AnalysisConfig::builder()
///     .plan_column("Plan")
///     .non_numeric_policy(NonNumericPolicy::Strict)
///     .preview_rows(10)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Column names used by the dashboard metrics.
    pub columns: ColumnMapping,

    /// Policy for unparseable values in numeric aggregations.
    /// Default: Skip
    pub non_numeric_policy: NonNumericPolicy,

    /// Whether null values form their own category in frequency distributions.
    /// Default: true
    pub include_missing_category: bool,

    /// Number of rows included in the dataset preview.
    /// Default: 5
    pub preview_rows: usize,

    /// Path to the CSV dataset.
    /// Default: "telecommunications_data.csv"
    pub dataset_path: PathBuf,

    /// Path to the SQLite database used for ad-hoc queries.
    /// Default: "telecom_data.db"
    pub database_path: PathBuf,

    /// Output directory for emitted reports.
    /// Default: "output"
    pub output_dir: PathBuf,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            columns: ColumnMapping::default(),
            non_numeric_policy: NonNumericPolicy::default(),
            include_missing_category: true,
            preview_rows: DEFAULT_PREVIEW_ROWS,
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Create a builder seeded with data source paths from the environment.
    ///
    /// Reads [`DATASET_ENV_VAR`] and [`DATABASE_ENV_VAR`]; unset variables
    /// keep the defaults.
    pub fn builder_from_env() -> AnalysisConfigBuilder {
        let mut builder = AnalysisConfigBuilder::default();
        if let Ok(path) = std::env::var(DATASET_ENV_VAR) {
            builder = builder.dataset_path(path);
        }
        if let Ok(path) = std::env::var(DATABASE_ENV_VAR) {
            builder = builder.database_path(path);
        }
        builder
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        for (field, value) in self.columns.fields() {
            if value.trim().is_empty() {
                return Err(ConfigValidationError::EmptyColumnName(field.to_string()));
            }
        }

        if self.preview_rows > MAX_PREVIEW_ROWS {
            return Err(ConfigValidationError::InvalidPreviewRows(self.preview_rows));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Column name for '{0}' must not be empty")]
    EmptyColumnName(String),

    #[error("Invalid preview rows: {0} (must be at most 1000)")]
    InvalidPreviewRows(usize),
}

/// Builder for [`AnalysisConfig`] with fluent API.
#[derive(Debug, Clone, Default)]
pub struct AnalysisConfigBuilder {
    key_column: Option<String>,
    churn_column: Option<String>,
    plan_column: Option<String>,
    charges_column: Option<String>,
    usage_column: Option<String>,
    data_column: Option<String>,
    non_numeric_policy: Option<NonNumericPolicy>,
    include_missing_category: Option<bool>,
    preview_rows: Option<usize>,
    dataset_path: Option<PathBuf>,
    database_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
}

impl AnalysisConfigBuilder {
    /// Set the customer identifier column used for duplicate detection.
    pub fn key_column(mut self, column: impl Into<String>) -> Self {
        self.key_column = Some(column.into());
        self
    }

    /// Set the churn flag column.
    pub fn churn_column(mut self, column: impl Into<String>) -> Self {
        self.churn_column = Some(column.into());
        self
    }

    /// Set the plan column used for grouping.
    pub fn plan_column(mut self, column: impl Into<String>) -> Self {
        self.plan_column = Some(column.into());
        self
    }

    /// Set the monthly charges column.
    pub fn charges_column(mut self, column: impl Into<String>) -> Self {
        self.charges_column = Some(column.into());
        self
    }

    /// Set the usage minutes column.
    pub fn usage_column(mut self, column: impl Into<String>) -> Self {
        self.usage_column = Some(column.into());
        self
    }

    /// Set the data usage column.
    pub fn data_column(mut self, column: impl Into<String>) -> Self {
        self.data_column = Some(column.into());
        self
    }

    /// Set the policy for unparseable values in numeric aggregations.
    pub fn non_numeric_policy(mut self, policy: NonNumericPolicy) -> Self {
        self.non_numeric_policy = Some(policy);
        self
    }

    /// Include or exclude nulls as a category in frequency distributions.
    ///
    /// When excluded, percentages are computed over non-null rows only.
    pub fn include_missing_category(mut self, include: bool) -> Self {
        self.include_missing_category = Some(include);
        self
    }

    /// Set the number of preview rows.
    pub fn preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = Some(rows);
        self
    }

    /// Set the CSV dataset path.
    pub fn dataset_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.dataset_path = Some(path.into());
        self
    }

    /// Set the SQLite database path.
    pub fn database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = Some(path.into());
        self
    }

    /// Set the output directory for emitted reports.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AnalysisConfig` or an error if validation fails.
    pub fn build(self) -> Result<AnalysisConfig, ConfigValidationError> {
        let defaults = ColumnMapping::default();
        let config = AnalysisConfig {
            columns: ColumnMapping {
                key_column: self.key_column.unwrap_or(defaults.key_column),
                churn_column: self.churn_column.unwrap_or(defaults.churn_column),
                plan_column: self.plan_column.unwrap_or(defaults.plan_column),
                charges_column: self.charges_column.unwrap_or(defaults.charges_column),
                usage_column: self.usage_column.unwrap_or(defaults.usage_column),
                data_column: self.data_column.unwrap_or(defaults.data_column),
            },
            non_numeric_policy: self.non_numeric_policy.unwrap_or_default(),
            include_missing_category: self.include_missing_category.unwrap_or(true),
            preview_rows: self.preview_rows.unwrap_or(DEFAULT_PREVIEW_ROWS),
            dataset_path: self
                .dataset_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATASET_PATH)),
            database_path: self
                .database_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH)),
            output_dir: self
                .output_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
        };

        config.validate()?;
        Ok(config)
    }
}
