//! Dashboard report module.
//!
//! [`DashboardReport`] gathers every metric the dashboard shows into one
//! serializable structure, suitable for:
//! - JSON output to stdout (`--json` CLI flag)
//! - JSON file output (`--emit-report` CLI flag)
//! - Programmatic access in library mode
//!
//! # Example
//!
//! ```rust,ignore
//! use telecom_insights::reporting::ReportGenerator;
//!
//! let report = ReportGenerator::build_dashboard_report(&df, "data.csv", &config)?;
//! println!("{}", serde_json::to_string_pretty(&report)?);
//!
//! let generator = ReportGenerator::from_config(&config);
//! generator.write_report_to_file(&report, "data")?;
//! ```

mod generator;

pub use generator::{DashboardReport, DatasetOverview, ReportGenerator, table_to_json_rows};
