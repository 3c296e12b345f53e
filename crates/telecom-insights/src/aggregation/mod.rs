//! Aggregation engine for grouped statistics.
//!
//! This module provides:
//! - Value-frequency distributions (e.g. churn rate)
//! - Grouped means (e.g. average monthly charges by plan)
//! - Grouped scatter series (e.g. usage minutes vs. data used by plan)
//!
//! All operations are pure functions of the input table. Rows with a null
//! group key never form a group.

mod frequency;
mod grouped;
mod scatter;

use crate::config::{AnalysisConfig, NonNumericPolicy};
use crate::error::Result;
use crate::types::{FrequencyDistribution, GroupedMean, ScatterSeries};
use polars::prelude::*;
use std::collections::BTreeMap;

/// Grouped statistics over named table columns.
#[derive(Debug, Clone, Copy)]
pub struct AggregationEngine {
    non_numeric_policy: NonNumericPolicy,
    include_missing_category: bool,
}

static_assertions::assert_impl_all!(AggregationEngine: Send, Sync);

impl Default for AggregationEngine {
    fn default() -> Self {
        Self {
            non_numeric_policy: NonNumericPolicy::Skip,
            include_missing_category: true,
        }
    }
}

impl AggregationEngine {
    pub fn new(non_numeric_policy: NonNumericPolicy, include_missing_category: bool) -> Self {
        Self {
            non_numeric_policy,
            include_missing_category,
        }
    }

    /// Create an engine using the policies of an [`AnalysisConfig`].
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.non_numeric_policy, config.include_missing_category)
    }

    pub fn non_numeric_policy(&self) -> NonNumericPolicy {
        self.non_numeric_policy
    }

    /// Share of rows per distinct value of `column`, as percentages.
    ///
    /// Nulls form their own category unless the engine excludes them, in which
    /// case percentages are relative to the non-null rows. A zero-row table
    /// yields an empty distribution.
    pub fn frequency_distribution(
        &self,
        df: &DataFrame,
        column: &str,
    ) -> Result<FrequencyDistribution> {
        frequency::frequency_distribution(df, column, self.include_missing_category)
    }

    /// Mean of `value_column` per distinct value of `group_column`.
    pub fn grouped_mean(
        &self,
        df: &DataFrame,
        group_column: &str,
        value_column: &str,
    ) -> Result<GroupedMean> {
        let means = grouped::group_means(df, group_column, value_column, self.non_numeric_policy)?;
        Ok(GroupedMean {
            group_column: group_column.to_string(),
            value_column: value_column.to_string(),
            means,
        })
    }

    /// Mean of `value_column` for an externally supplied set of group keys.
    ///
    /// Every key appears in the result; keys without contributing rows map to `None`.
    pub fn grouped_mean_for_keys(
        &self,
        df: &DataFrame,
        group_column: &str,
        value_column: &str,
        keys: &[&str],
    ) -> Result<BTreeMap<String, Option<f64>>> {
        let means = grouped::group_means(df, group_column, value_column, self.non_numeric_policy)?;
        Ok(keys
            .iter()
            .map(|key| (key.to_string(), means.get(*key).copied()))
            .collect())
    }

    /// Per-group (x, y) points in table row order.
    pub fn scatter_series(
        &self,
        df: &DataFrame,
        group_column: &str,
        x_column: &str,
        y_column: &str,
    ) -> Result<ScatterSeries> {
        scatter::scatter_series(df, group_column, x_column, y_column, self.non_numeric_policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InsightsError;

    fn customers() -> DataFrame {
        df!(
            "CustomerID" => &["C1", "C2", "C3", "C4"],
            "PlanType" => &["Basic", "Basic", "Premium", "Premium"],
            "MonthlyCharges" => &[10.0, 20.0, 30.0, 50.0],
            "Churn" => &["Yes", "No", "No", "No"],
            "UsageMinutes" => &[100.0, 200.0, 300.0, 400.0],
            "DataUsedGB" => &[1.0, 2.0, 3.0, 4.0]
        )
        .unwrap()
    }

    #[test]
    fn test_from_config_uses_policies() {
        let config = AnalysisConfig::builder()
            .non_numeric_policy(NonNumericPolicy::Strict)
            .include_missing_category(false)
            .build()
            .unwrap();
        let engine = AggregationEngine::from_config(&config);

        assert_eq!(engine.non_numeric_policy(), NonNumericPolicy::Strict);
        let df = df!("Churn" => &[Some("Yes"), None]).unwrap();
        let dist = engine.frequency_distribution(&df, "Churn").unwrap();
        assert_eq!(dist.get("Yes"), Some(100.0));
        assert_eq!(dist.missing(), None);
    }

    #[test]
    fn test_every_operation_reports_missing_column() {
        let df = customers();
        let engine = AggregationEngine::default();

        let errors = vec![
            engine.frequency_distribution(&df, "Nope").unwrap_err(),
            engine.grouped_mean(&df, "Nope", "MonthlyCharges").unwrap_err(),
            engine.grouped_mean(&df, "PlanType", "Nope").unwrap_err(),
            engine
                .grouped_mean_for_keys(&df, "PlanType", "Nope", &["Basic"])
                .unwrap_err(),
            engine
                .scatter_series(&df, "Nope", "UsageMinutes", "DataUsedGB")
                .unwrap_err(),
            engine
                .scatter_series(&df, "PlanType", "UsageMinutes", "Nope")
                .unwrap_err(),
        ];

        for err in errors {
            assert!(matches!(err, InsightsError::ColumnNotFound(ref name) if name == "Nope"));
        }
    }

    #[test]
    fn test_grouped_mean_for_keys_external_domain() {
        let df = customers();
        let engine = AggregationEngine::default();

        let means = engine
            .grouped_mean_for_keys(&df, "PlanType", "MonthlyCharges", &["Basic", "Family"])
            .unwrap();

        assert_eq!(means.len(), 2);
        assert_eq!(means["Basic"], Some(15.0));
        assert_eq!(means["Family"], None);
    }
}
