//! Data quality analysis module.
//!
//! This module computes per-column missing-value counts and duplicate-key
//! counts over a loaded table.

mod analyzer;

pub use analyzer::DataQualityAnalyzer;
