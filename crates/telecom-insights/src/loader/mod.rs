//! Dataset loading.
//!
//! [`CsvLoader`] reads the customer dataset into a `DataFrame`, falling back
//! through progressively more lenient parse strategies. [`DatasetCache`]
//! memoizes loaded tables per path and reloads them when the file changes.

mod cache;

pub use cache::{DatasetCache, SourceFingerprint};

use crate::error::{InsightsError, Result};
use crate::utils::NULL_MARKERS;
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

const DEFAULT_INFER_SCHEMA_LENGTH: usize = 100;

/// Source of tables for the analysis engine.
pub trait DatasetLoader: Send + Sync {
    /// Load the table stored at `path`.
    fn load(&self, path: &Path) -> Result<DataFrame>;
}

/// CSV loader with a header row and schema inference.
#[derive(Debug, Clone)]
pub struct CsvLoader {
    infer_schema_length: usize,
}

impl Default for CsvLoader {
    fn default() -> Self {
        Self {
            infer_schema_length: DEFAULT_INFER_SCHEMA_LENGTH,
        }
    }
}

impl CsvLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how many rows are scanned to infer column types.
    pub fn with_infer_schema_length(mut self, rows: usize) -> Self {
        self.infer_schema_length = rows;
        self
    }

    /// Parse CSV content held in memory.
    pub fn load_from_str(&self, content: &str) -> Result<DataFrame> {
        let cursor = Cursor::new(content.to_owned());
        let df = self
            .read_options(true)
            .into_reader_with_file_handle(cursor)
            .finish()?;
        Ok(df)
    }

    fn read_options(&self, quoted: bool) -> CsvReadOptions {
        let null_values = NullValues::AllColumns(
            NULL_MARKERS
                .iter()
                .map(|marker| (*marker).into())
                .collect(),
        );
        let quote_char = if quoted { Some(b'"') } else { None };
        let parse_options = CsvParseOptions::default()
            .with_null_values(Some(null_values))
            .with_quote_char(quote_char);

        CsvReadOptions::default()
            .with_infer_schema_length(Some(self.infer_schema_length))
            .with_has_header(true)
            .with_parse_options(parse_options)
    }

    /// Parse the file at `path` with quote handling on or off.
    fn load_path(&self, path: &Path, quoted: bool) -> Result<DataFrame> {
        let df = self
            .read_options(quoted)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?;
        Ok(df)
    }

    fn load_with_fallbacks(&self, path: &Path) -> Result<DataFrame> {
        // Strategy 1: Standard loading with quote handling
        match self.load_path(path, true) {
            Ok(df) => return Ok(df),
            Err(e) => {
                debug!("Standard loading failed: {}", e);
            }
        }

        // Strategy 2: Quotes read as plain characters
        match self.load_path(path, false) {
            Ok(df) => return Ok(df),
            Err(e) => {
                debug!("Loading without quotes failed: {}", e);
            }
        }

        // Strategy 3: Pre-clean content
        let content = std::fs::read_to_string(path)?;
        self.load_from_str(&clean_csv_content(&content))
    }
}

impl DatasetLoader for CsvLoader {
    fn load(&self, path: &Path) -> Result<DataFrame> {
        if !path.exists() {
            return Err(InsightsError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Dataset not found: {}", path.display()),
            )));
        }

        info!("Loading dataset from: {}", path.display());
        let df = self.load_with_fallbacks(path)?;
        info!("Dataset loaded successfully: {:?}", df.shape());
        Ok(df)
    }
}

/// Collapse doubled quotes and drop blank lines.
fn clean_csv_content(content: &str) -> String {
    content
        .replace("\"\"\"", "\"")
        .replace("\"\"", "\"")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
