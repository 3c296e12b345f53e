//! Shared utilities for dataset analysis.
//!
//! Every engine operation reads columns through one of two cell views:
//! [`key_cells`] (values as optional strings, for grouping and counting) and
//! [`numeric_cells`] (values as numbers, for means and coordinates).

use crate::error::{InsightsError, Result};
use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Category of a data type for analysis purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtypeCategory {
    /// Integer or floating point numbers
    Numeric,
    /// Date or datetime types
    Datetime,
    /// Boolean type
    Boolean,
    /// String/text type
    String,
    /// Column with no values at all
    Null,
    /// Other/unknown types
    Other,
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a floating point type (the only types that can hold NaN).
#[inline]
pub fn is_float_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Check if a DataType is a datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Datetime(_, _) | DataType::Date | DataType::Time
    )
}

/// Get the category of a DataType.
pub fn get_dtype_category(dtype: &DataType) -> DtypeCategory {
    if is_numeric_dtype(dtype) {
        DtypeCategory::Numeric
    } else if is_datetime_dtype(dtype) {
        DtypeCategory::Datetime
    } else if matches!(dtype, DataType::Boolean) {
        DtypeCategory::Boolean
    } else if matches!(dtype, DataType::String | DataType::Categorical(_, _)) {
        DtypeCategory::String
    } else if matches!(dtype, DataType::Null) {
        DtypeCategory::Null
    } else {
        DtypeCategory::Other
    }
}

/// Get the dtype category as a string for reports.
pub fn dtype_category_str(series: &Series) -> &'static str {
    match get_dtype_category(series.dtype()) {
        DtypeCategory::Numeric => "numeric",
        DtypeCategory::Datetime => "datetime",
        DtypeCategory::Boolean => "binary",
        DtypeCategory::String => "categorical",
        DtypeCategory::Null => "empty",
        DtypeCategory::Other => "other",
    }
}

// =============================================================================
// String Parsing Utilities
// =============================================================================

/// Characters commonly used in numeric formatting that should be stripped.
pub const NUMERIC_FORMAT_CHARS: [char; 6] = [',', '$', '%', '€', '£', ' '];

/// Text markers read as "no value" when loading tabular sources.
pub const NULL_MARKERS: [&str; 17] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "null",
];

/// Clean a string for numeric parsing by removing formatting characters.
///
/// # Example
///
/// ```rust,ignore
/// use telecom_insights::utils::clean_numeric_string;
///
/// assert_eq!(clean_numeric_string("$1,234.56"), "1234.56");
/// assert_eq!(clean_numeric_string("  42%  "), "42");
/// ```
pub fn clean_numeric_string(s: &str) -> String {
    let mut result = s.trim().to_string();
    for c in NUMERIC_FORMAT_CHARS {
        result = result.replace(c, "");
    }
    result
}

/// Try to parse a string as a numeric value (f64).
///
/// Handles common formatting like currency symbols, percentages, and thousands separators.
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    let cleaned = clean_numeric_string(s);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

// =============================================================================
// Column Access
// =============================================================================

/// Look up a column by name, mapping absence to [`InsightsError::ColumnNotFound`].
pub fn require_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|col| col.as_materialized_series())
        .map_err(|_| InsightsError::ColumnNotFound(name.to_string()))
}

/// Check that every named column exists before any work starts.
pub fn require_columns(df: &DataFrame, names: &[&str]) -> Result<()> {
    for name in names {
        require_column(df, name)?;
    }
    Ok(())
}

/// Column names in table order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}

// =============================================================================
// Cell Views
// =============================================================================

/// A single cell read through the numeric view.
#[derive(Debug, Clone, PartialEq)]
pub enum NumericCell {
    /// Null, or NaN in a floating point column
    Missing,
    /// A usable number
    Value(f64),
    /// Present text that does not parse as a number
    Invalid(String),
}

impl NumericCell {
    /// The numeric value, if any.
    pub fn value(&self) -> Option<f64> {
        match self {
            NumericCell::Value(v) => Some(*v),
            _ => None,
        }
    }
}

/// Read every cell of a series as an optional string key.
///
/// Null and floating point NaN both become `None`, matching [`missing_count`].
/// Negative zero renders like zero, so `-0.0` and `0.0` are the same key.
pub fn key_cells(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let as_text = series.cast(&DataType::String)?;
    let text = as_text.str()?;

    if !is_float_dtype(series.dtype()) {
        return Ok(text.into_iter().map(|value| value.map(str::to_string)).collect());
    }

    let floats = series.cast(&DataType::Float64)?;
    Ok(text
        .into_iter()
        .zip(floats.f64()?)
        .map(|(value, number)| match (value, number) {
            (_, Some(v)) if v.is_nan() => None,
            (Some(raw), Some(v)) if v == 0.0 && v.is_sign_negative() => {
                Some(raw.trim_start_matches('-').to_string())
            }
            (value, _) => value.map(str::to_string),
        })
        .collect())
}

/// Read every cell of a series through the numeric view.
///
/// Numeric columns yield values (NaN is missing). Text columns are parsed with
/// [`parse_numeric_string`]. Columns of any other type cannot be averaged and
/// fail with [`InsightsError::NonNumericColumn`].
pub fn numeric_cells(series: &Series) -> Result<Vec<NumericCell>> {
    match get_dtype_category(series.dtype()) {
        DtypeCategory::Numeric => {
            let floats = series.cast(&DataType::Float64)?;
            Ok(floats
                .f64()?
                .into_iter()
                .map(|value| match value {
                    Some(v) if !v.is_nan() => NumericCell::Value(v),
                    _ => NumericCell::Missing,
                })
                .collect())
        }
        DtypeCategory::String => {
            let text = series.cast(&DataType::String)?;
            Ok(text
                .str()?
                .into_iter()
                .map(|value| match value {
                    None => NumericCell::Missing,
                    Some(raw) => match parse_numeric_string(raw) {
                        Some(v) if !v.is_nan() => NumericCell::Value(v),
                        Some(_) => NumericCell::Missing,
                        None => NumericCell::Invalid(raw.to_string()),
                    },
                })
                .collect())
        }
        DtypeCategory::Null => Ok(vec![NumericCell::Missing; series.len()]),
        _ => Err(InsightsError::NonNumericColumn {
            column: series.name().to_string(),
            value: format!("<{}>", series.dtype()),
        }),
    }
}

/// Count cells with no value: nulls, plus NaN in floating point columns.
///
/// Empty strings and zeros are values.
pub fn missing_count(series: &Series) -> PolarsResult<usize> {
    let nulls = series.null_count();
    let nans = if is_float_dtype(series.dtype()) {
        let floats = series.cast(&DataType::Float64)?;
        floats
            .f64()?
            .into_iter()
            .filter(|value| value.is_some_and(f64::is_nan))
            .count()
    } else {
        0
    };
    Ok(nulls + nans)
}

// =============================================================================
// Tests
// =============================================================================
