//! Grouped means.

use crate::config::NonNumericPolicy;
use crate::error::{InsightsError, Result};
use crate::utils::{NumericCell, key_cells, numeric_cells, require_column};
use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Compute the mean of `value_column` for each non-null key of `group_column`.
///
/// Groups without any usable value are omitted. Values are summed in sorted
/// order so the result does not depend on row order.
pub(crate) fn group_means(
    df: &DataFrame,
    group_column: &str,
    value_column: &str,
    policy: NonNumericPolicy,
) -> Result<BTreeMap<String, f64>> {
    let groups = require_column(df, group_column)?;
    let values = require_column(df, value_column)?;

    let keys = key_cells(groups)?;
    let cells = numeric_cells(values)?;

    let mut buckets: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    let mut skipped = 0usize;

    for (key, cell) in keys.into_iter().zip(cells) {
        let Some(key) = key else {
            continue;
        };
        match cell {
            NumericCell::Value(v) => buckets.entry(key).or_default().push(v),
            NumericCell::Missing => {}
            NumericCell::Invalid(raw) => match policy {
                NonNumericPolicy::Skip => skipped += 1,
                NonNumericPolicy::Strict => {
                    return Err(InsightsError::NonNumericColumn {
                        column: value_column.to_string(),
                        value: raw,
                    });
                }
            },
        }
    }

    if skipped > 0 {
        warn!(
            "Skipped {} non-numeric values in column '{}'",
            skipped, value_column
        );
    }

    let means: BTreeMap<String, f64> = buckets
        .into_iter()
        .map(|(key, mut bucket)| {
            bucket.sort_by(f64::total_cmp);
            let sum: f64 = bucket.iter().sum();
            (key, sum / bucket.len() as f64)
        })
        .collect();

    debug!(
        "Mean of '{}' by '{}': {} groups",
        value_column,
        group_column,
        means.len()
    );

    Ok(means)
}
