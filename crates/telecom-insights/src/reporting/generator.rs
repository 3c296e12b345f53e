use crate::aggregation::AggregationEngine;
use crate::config::{AnalysisConfig, DEFAULT_OUTPUT_DIR};
use crate::error::{Result, ResultExt};
use crate::quality::DataQualityAnalyzer;
use crate::types::{
    DuplicateReport, FrequencyDistribution, GroupedMean, MissingValueReport, ScatterSeries,
};
use crate::utils::{
    column_names, dtype_category_str, is_float_dtype, is_numeric_dtype, key_cells, require_columns,
};
use chrono::Local;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

// ============================================================================
// Report Types
// ============================================================================

/// Shape, schema and first rows of the analyzed table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetOverview {
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<String>,
    /// Logical type per column, in column order
    pub column_types: Vec<String>,
    /// First rows of the table as text cells (`None` = no value)
    pub preview: Vec<Vec<Option<String>>>,
}

/// Every dashboard metric computed from one table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    /// Where the table came from (file path or query)
    pub source: String,
    pub overview: DatasetOverview,
    pub missing_values: MissingValueReport,
    pub duplicates: DuplicateReport,
    pub churn_rate: FrequencyDistribution,
    pub monthly_charges_by_plan: GroupedMean,
    pub usage_vs_data: ScatterSeries,
}

pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl ReportGenerator {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    /// Create a generator writing to the configured output directory.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.output_dir.clone())
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Compute every dashboard metric for `df` using the configured columns.
    ///
    /// Every configured column is checked before any metric runs. Fails with
    /// the first error; no partial report is returned.
    pub fn build_dashboard_report(
        df: &DataFrame,
        source: &str,
        config: &AnalysisConfig,
    ) -> Result<DashboardReport> {
        let columns = &config.columns;
        require_columns(df, &columns.names()).context("Checking configured columns")?;
        let engine = AggregationEngine::from_config(config);

        let overview =
            Self::build_overview(df, config.preview_rows).context("Building dataset preview")?;
        let missing_values =
            DataQualityAnalyzer::missing_value_report(df).context("Counting missing values")?;
        let duplicates = DataQualityAnalyzer::duplicate_report(df, &columns.key_column)
            .context("Counting duplicate records")?;
        let churn_rate = engine
            .frequency_distribution(df, &columns.churn_column)
            .context("Computing churn rate")?;
        let monthly_charges_by_plan = engine
            .grouped_mean(df, &columns.plan_column, &columns.charges_column)
            .context("Averaging monthly charges by plan")?;
        let usage_vs_data = engine
            .scatter_series(
                df,
                &columns.plan_column,
                &columns.usage_column,
                &columns.data_column,
            )
            .context("Collecting usage vs. data points")?;

        info!(
            "Dashboard report built: {} rows, {} duplicates",
            overview.rows, duplicates.duplicate_count
        );

        Ok(DashboardReport {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            source: source.to_string(),
            overview,
            missing_values,
            duplicates,
            churn_rate,
            monthly_charges_by_plan,
            usage_vs_data,
        })
    }

    fn build_overview(df: &DataFrame, preview_rows: usize) -> Result<DatasetOverview> {
        let head = df.head(Some(preview_rows));

        let mut preview: Vec<Vec<Option<String>>> = vec![Vec::new(); head.height()];
        for col in head.get_columns() {
            let cells = key_cells(col.as_materialized_series())?;
            for (row, cell) in preview.iter_mut().zip(cells) {
                row.push(cell);
            }
        }

        let column_types = df
            .get_columns()
            .iter()
            .map(|col| dtype_category_str(col.as_materialized_series()).to_string())
            .collect();

        Ok(DatasetOverview {
            rows: df.height(),
            columns: df.width(),
            column_names: column_names(df),
            column_types,
            preview,
        })
    }

    /// Write a report as pretty JSON to `<output_dir>/<stem>_dashboard.json`.
    pub fn write_report_to_file(&self, report: &DashboardReport, stem: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let report_path = self.output_dir.join(format!("{}_dashboard.json", stem));
        let mut file = File::create(&report_path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());
        Ok(report_path)
    }
}

/// Convert a table into JSON row objects keyed by column name.
///
/// Integer and float cells become JSON numbers (NaN and infinity become null),
/// booleans stay booleans, and every other type is rendered as text.
pub fn table_to_json_rows(df: &DataFrame) -> Result<Vec<Value>> {
    let mut rows = vec![Map::new(); df.height()];

    for col in df.get_columns() {
        let series = col.as_materialized_series();
        let name = series.name().to_string();
        for (row, cell) in rows.iter_mut().zip(json_cells(series)?) {
            row.insert(name.clone(), cell);
        }
    }

    Ok(rows.into_iter().map(Value::Object).collect())
}

fn json_cells(series: &Series) -> Result<Vec<Value>> {
    let dtype = series.dtype();

    let cells = if is_float_dtype(dtype) {
        let floats = series.cast(&DataType::Float64)?;
        floats
            .f64()?
            .into_iter()
            .map(|v| v.map_or(Value::Null, Value::from))
            .collect()
    } else if is_numeric_dtype(dtype) {
        let ints = series.cast(&DataType::Int64)?;
        ints.i64()?
            .into_iter()
            .map(|v| v.map_or(Value::Null, Value::from))
            .collect()
    } else if matches!(dtype, DataType::Boolean) {
        series
            .bool()?
            .into_iter()
            .map(|v| v.map_or(Value::Null, Value::Bool))
            .collect()
    } else {
        key_cells(series)?
            .into_iter()
            .map(|v| v.map_or(Value::Null, Value::String))
            .collect()
    };

    Ok(cells)
}
