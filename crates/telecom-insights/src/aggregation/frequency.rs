//! Value-frequency distributions.

use crate::error::Result;
use crate::types::{CategoryShare, FrequencyDistribution};
use crate::utils::{key_cells, require_column};
use polars::prelude::*;
use std::collections::HashMap;
use tracing::debug;

/// Compute the share of rows per distinct value of a column.
pub(crate) fn frequency_distribution(
    df: &DataFrame,
    column: &str,
    include_missing: bool,
) -> Result<FrequencyDistribution> {
    let series = require_column(df, column)?;
    let keys = key_cells(series)?;

    // (value, count) in first-appearance order
    let mut tallies: Vec<(Option<String>, usize)> = Vec::new();
    let mut positions: HashMap<Option<String>, usize> = HashMap::new();

    for key in keys {
        if key.is_none() && !include_missing {
            continue;
        }
        match positions.get(&key) {
            Some(&idx) => tallies[idx].1 += 1,
            None => {
                positions.insert(key.clone(), tallies.len());
                tallies.push((key, 1));
            }
        }
    }

    let counted: usize = tallies.iter().map(|(_, count)| count).sum();
    let mut categories: Vec<CategoryShare> = tallies
        .into_iter()
        .map(|(value, count)| CategoryShare {
            value,
            count,
            percentage: (count as f64 / counted as f64) * 100.0,
        })
        .collect();

    // Stable sort keeps first-appearance order among equal counts
    categories.sort_by(|a, b| b.count.cmp(&a.count));

    debug!(
        "Column '{}': {} categories over {} rows",
        column,
        categories.len(),
        counted
    );

    Ok(FrequencyDistribution {
        column: column.to_string(),
        categories,
    })
}
