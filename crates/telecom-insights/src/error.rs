//! Error types for the insights engine.
//!
//! All library operations return [`InsightsError`]. Errors are serializable
//! as `{ code, message }` so a presentation layer can render them without
//! depending on the engine's internals.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for dataset analysis.
#[derive(Error, Debug)]
pub enum InsightsError {
    /// A referenced column does not exist in the table.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// A numeric aggregation hit a value it cannot use.
    #[error("Column '{column}' contains non-numeric value '{value}'")]
    NonNumericColumn { column: String, value: String },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    Query(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<InsightsError>,
    },
}

impl InsightsError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        InsightsError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::NonNumericColumn { .. } => "NON_NUMERIC_COLUMN",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Query(_) => "QUERY_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error was caused by a missing column, looking through context.
    pub fn is_column_not_found(&self) -> bool {
        match self {
            Self::ColumnNotFound(_) => true,
            Self::WithContext { source, .. } => source.is_column_not_found(),
            _ => false,
        }
    }

    /// Check if the caller can fix this error by changing its input
    /// (column names, configuration or query text).
    pub fn is_caller_error(&self) -> bool {
        match self {
            Self::ColumnNotFound(_)
            | Self::NonNumericColumn { .. }
            | Self::InvalidConfig(_)
            | Self::Query(_) => true,
            Self::WithContext { source, .. } => source.is_caller_error(),
            _ => false,
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for InsightsError {
    fn from(err: rusqlite::Error) -> Self {
        InsightsError::Query(err.to_string())
    }
}

impl From<crate::config::ConfigValidationError> for InsightsError {
    fn from(err: crate::config::ConfigValidationError) -> Self {
        InsightsError::InvalidConfig(err.to_string())
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for InsightsError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("InsightsError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for insights operations.
pub type Result<T> = std::result::Result<T, InsightsError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| InsightsError::Polars(e).with_context(context))
    }
}
