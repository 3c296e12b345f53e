//! Grouped scatter series.

use crate::config::NonNumericPolicy;
use crate::error::{InsightsError, Result};
use crate::types::{ScatterPoint, ScatterSeries};
use crate::utils::{NumericCell, key_cells, numeric_cells, require_column};
use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

/// Collect (x, y) points per non-null group key, preserving row order.
///
/// Rows missing either coordinate are left out. A group whose rows all lack
/// coordinates is kept with an empty point list.
pub(crate) fn scatter_series(
    df: &DataFrame,
    group_column: &str,
    x_column: &str,
    y_column: &str,
    policy: NonNumericPolicy,
) -> Result<ScatterSeries> {
    let groups = require_column(df, group_column)?;
    let xs = require_column(df, x_column)?;
    let ys = require_column(df, y_column)?;

    let keys = key_cells(groups)?;
    let x_cells = numeric_cells(xs)?;
    let y_cells = numeric_cells(ys)?;

    let mut series: BTreeMap<String, Vec<ScatterPoint>> = BTreeMap::new();

    for ((key, x), y) in keys.into_iter().zip(x_cells).zip(y_cells) {
        let Some(key) = key else {
            continue;
        };

        if policy == NonNumericPolicy::Strict {
            check_numeric(&x, x_column)?;
            check_numeric(&y, y_column)?;
        }

        let points = series.entry(key).or_default();
        if let (Some(x), Some(y)) = (x.value(), y.value()) {
            points.push(ScatterPoint { x, y });
        }
    }

    debug!(
        "Scatter '{}' vs '{}' by '{}': {} groups",
        x_column,
        y_column,
        group_column,
        series.len()
    );

    Ok(ScatterSeries {
        group_column: group_column.to_string(),
        x_column: x_column.to_string(),
        y_column: y_column.to_string(),
        groups: series,
    })
}

fn check_numeric(cell: &NumericCell, column: &str) -> Result<()> {
    match cell {
        NumericCell::Invalid(raw) => Err(InsightsError::NonNumericColumn {
            column: column.to_string(),
            value: raw.clone(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn usage() -> DataFrame {
        df!(
            "PlanType" => &[Some("Basic"), Some("Premium"), Some("Basic"), None, Some("Premium")],
            "UsageMinutes" => &[Some(100.0), Some(300.0), Some(150.0), Some(999.0), None],
            "DataUsedGB" => &[Some(1.5), Some(8.0), Some(2.0), Some(9.9), Some(7.0)]
        )
        .unwrap()
    }

    #[test]
    fn test_points_grouped_in_row_order() {
        let series = scatter_series(
            &usage(),
            "PlanType",
            "UsageMinutes",
            "DataUsedGB",
            NonNumericPolicy::Skip,
        )
        .unwrap();

        assert_eq!(
            series.get("Basic").unwrap(),
            &[
                ScatterPoint { x: 100.0, y: 1.5 },
                ScatterPoint { x: 150.0, y: 2.0 }
            ]
        );
        assert_eq!(
            series.get("Premium").unwrap(),
            &[ScatterPoint { x: 300.0, y: 8.0 }]
        );
        assert_eq!(series.groups.len(), 2);
        assert_eq!(series.point_count(), 3);
    }

    #[test]
    fn test_group_without_coordinates_is_empty() {
        let df = df!(
            "PlanType" => &["Basic", "Family"],
            "UsageMinutes" => &[Some(10.0), None],
            "DataUsedGB" => &[Some(1.0), Some(2.0)]
        )
        .unwrap();

        let series = scatter_series(
            &df,
            "PlanType",
            "UsageMinutes",
            "DataUsedGB",
            NonNumericPolicy::Skip,
        )
        .unwrap();

        assert_eq!(series.get("Family").unwrap().len(), 0);
        assert_eq!(series.get("Basic").unwrap().len(), 1);
    }

    #[test]
    fn test_nan_group_key_not_grouped() {
        let df = df!(
            "Tier" => &[1.0, f64::NAN],
            "UsageMinutes" => &[10.0, 20.0],
            "DataUsedGB" => &[1.0, 2.0]
        )
        .unwrap();

        let series = scatter_series(
            &df,
            "Tier",
            "UsageMinutes",
            "DataUsedGB",
            NonNumericPolicy::Skip,
        )
        .unwrap();

        assert_eq!(series.groups.len(), 1);
        assert_eq!(series.point_count(), 1);
    }

    #[test]
    fn test_nan_coordinate_excluded() {
        let df = df!(
            "PlanType" => &["Basic", "Basic"],
            "UsageMinutes" => &[f64::NAN, 20.0],
            "DataUsedGB" => &[1.0, 2.0]
        )
        .unwrap();

        let series = scatter_series(
            &df,
            "PlanType",
            "UsageMinutes",
            "DataUsedGB",
            NonNumericPolicy::Skip,
        )
        .unwrap();

        assert_eq!(
            series.get("Basic").unwrap(),
            &[ScatterPoint { x: 20.0, y: 2.0 }]
        );
    }

    #[test]
    fn test_strict_policy_rejects_text_coordinate() {
        let df = df!(
            "PlanType" => &["Basic"],
            "UsageMinutes" => &["lots"],
            "DataUsedGB" => &[1.0]
        )
        .unwrap();

        let skip = scatter_series(
            &df,
            "PlanType",
            "UsageMinutes",
            "DataUsedGB",
            NonNumericPolicy::Skip,
        )
        .unwrap();
        assert_eq!(skip.point_count(), 0);

        let err = scatter_series(
            &df,
            "PlanType",
            "UsageMinutes",
            "DataUsedGB",
            NonNumericPolicy::Strict,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            InsightsError::NonNumericColumn { ref column, .. } if column == "UsageMinutes"
        ));
    }
}
