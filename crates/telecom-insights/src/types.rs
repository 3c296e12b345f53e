//! Result types produced by the analysis engine.
//!
//! Every type here is a plain, immutable view computed fresh from a table.
//! They serialize with serde so a presentation layer can consume them as data.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Data quality
// ============================================================================

/// Missing-value count for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMissing {
    pub column: String,
    pub missing_count: usize,
    /// Share of rows with no value, 0.0 - 100.0 (0.0 for empty tables)
    pub missing_percentage: f64,
}

/// Missing-value counts for every column of a table, in column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingValueReport {
    pub total_rows: usize,
    pub columns: Vec<ColumnMissing>,
}

impl MissingValueReport {
    /// Missing count for a column, or `None` if the column is not in the table.
    pub fn get(&self, column: &str) -> Option<usize> {
        self.columns
            .iter()
            .find(|entry| entry.column == column)
            .map(|entry| entry.missing_count)
    }

    /// Number of columns covered by the report.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Total missing cells across all columns.
    pub fn total_missing(&self) -> usize {
        self.columns.iter().map(|entry| entry.missing_count).sum()
    }

    /// Columns with at least one missing value.
    pub fn columns_with_missing(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|entry| entry.missing_count > 0)
            .map(|entry| entry.column.as_str())
            .collect()
    }
}

/// Duplicate-key summary for one key column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateReport {
    pub key_column: String,
    pub total_rows: usize,
    /// Rows whose key already appeared in an earlier row
    pub duplicate_count: usize,
    pub duplicate_percentage: f64,
}

// ============================================================================
// Aggregations
// ============================================================================

/// One category of a frequency distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    /// Category value; `None` is the missing-value category
    pub value: Option<String>,
    pub count: usize,
    /// Share of counted rows, 0.0 - 100.0
    pub percentage: f64,
}

/// Value-frequency distribution of one column.
///
/// Categories are ordered by count (descending), ties by first appearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyDistribution {
    pub column: String,
    pub categories: Vec<CategoryShare>,
}

impl FrequencyDistribution {
    /// Percentage for a non-missing category value.
    pub fn get(&self, value: &str) -> Option<f64> {
        self.categories
            .iter()
            .find(|share| share.value.as_deref() == Some(value))
            .map(|share| share.percentage)
    }

    /// Percentage of the missing-value category, if present.
    pub fn missing(&self) -> Option<f64> {
        self.categories
            .iter()
            .find(|share| share.value.is_none())
            .map(|share| share.percentage)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Sum of all percentages (100.0 up to rounding for non-empty distributions).
    pub fn total_percentage(&self) -> f64 {
        self.categories.iter().map(|share| share.percentage).sum()
    }
}

/// Mean of a numeric column per group of a categorical column.
///
/// Groups with no usable values are absent, never NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedMean {
    pub group_column: String,
    pub value_column: String,
    pub means: BTreeMap<String, f64>,
}

impl GroupedMean {
    pub fn get(&self, group: &str) -> Option<f64> {
        self.means.get(group).copied()
    }

    pub fn len(&self) -> usize {
        self.means.len()
    }

    pub fn is_empty(&self) -> bool {
        self.means.is_empty()
    }
}

/// A single scatter plot coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
}

/// Per-group (x, y) point sequences, each in table row order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterSeries {
    pub group_column: String,
    pub x_column: String,
    pub y_column: String,
    pub groups: BTreeMap<String, Vec<ScatterPoint>>,
}

impl ScatterSeries {
    pub fn get(&self, group: &str) -> Option<&[ScatterPoint]> {
        self.groups.get(group).map(Vec::as_slice)
    }

    /// Total number of points across all groups.
    pub fn point_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
