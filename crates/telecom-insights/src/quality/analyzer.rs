use crate::error::Result;
use crate::types::{ColumnMissing, DuplicateReport, MissingValueReport};
use crate::utils::{key_cells, missing_count, require_column};
use polars::prelude::*;
use std::collections::HashSet;
use tracing::debug;

/// Missing-value and duplicate-key analysis over a table.
pub struct DataQualityAnalyzer;

impl DataQualityAnalyzer {
    /// Count the rows with no value in each column.
    ///
    /// Null counts as missing everywhere; NaN counts as missing in floating
    /// point columns. Empty strings and zeros are values. Every column of the
    /// table appears exactly once, in table order, including for zero-row tables.
    pub fn missing_value_report(df: &DataFrame) -> Result<MissingValueReport> {
        let total_rows = df.height();
        let mut columns = Vec::with_capacity(df.width());

        for col in df.get_columns() {
            let series = col.as_materialized_series();
            let missing = missing_count(series)?;
            columns.push(ColumnMissing {
                column: series.name().to_string(),
                missing_count: missing,
                missing_percentage: percentage(missing, total_rows),
            });
        }

        debug!(
            "Missing value report: {} columns, {} rows",
            columns.len(),
            total_rows
        );

        Ok(MissingValueReport {
            total_rows,
            columns,
        })
    }

    /// Count rows whose key already appeared in an earlier row.
    ///
    /// First occurrences are not counted, and null keys are equal to each other.
    pub fn duplicate_count(df: &DataFrame, key_column: &str) -> Result<usize> {
        let series = require_column(df, key_column)?;
        let keys = key_cells(series)?;

        let mut seen: HashSet<Option<&str>> = HashSet::with_capacity(keys.len());
        let mut duplicates = 0;
        for key in &keys {
            if !seen.insert(key.as_deref()) {
                duplicates += 1;
            }
        }

        debug!("Column '{}': {} duplicate keys", key_column, duplicates);
        Ok(duplicates)
    }

    /// Duplicate count with totals for presentation.
    pub fn duplicate_report(df: &DataFrame, key_column: &str) -> Result<DuplicateReport> {
        let duplicate_count = Self::duplicate_count(df, key_column)?;
        let total_rows = df.height();

        Ok(DuplicateReport {
            key_column: key_column.to_string(),
            total_rows,
            duplicate_count,
            duplicate_percentage: percentage(duplicate_count, total_rows),
        })
    }
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (count as f64 / total as f64) * 100.0
    }
}
