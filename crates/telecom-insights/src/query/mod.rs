//! Ad-hoc query execution against a relational store.
//!
//! The executor binds caller values as positional parameters and never splices
//! them into the query text. [`SqliteExecutor::open_read_only`] opens the
//! database without write access, so query text from an untrusted user cannot
//! modify the store.

use crate::error::{InsightsError, Result};
use polars::prelude::*;
use rusqlite::types::{ToSqlOutput, Value, ValueRef};
use rusqlite::{Connection, OpenFlags, ToSql, params_from_iter};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// A positional query parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryParam {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl QueryParam {
    /// Interpret command-line text as the narrowest matching parameter type.
    pub fn infer(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("null") {
            QueryParam::Null
        } else if let Ok(v) = raw.parse::<i64>() {
            QueryParam::Integer(v)
        } else if let Ok(v) = raw.parse::<f64>() {
            QueryParam::Real(v)
        } else {
            QueryParam::Text(raw.to_string())
        }
    }
}

impl ToSql for QueryParam {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            QueryParam::Null => ToSqlOutput::Owned(Value::Null),
            QueryParam::Integer(v) => ToSqlOutput::Owned(Value::Integer(*v)),
            QueryParam::Real(v) => ToSqlOutput::Owned(Value::Real(*v)),
            QueryParam::Text(v) => ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes())),
        })
    }
}

/// Executes query text and returns the result as a table.
pub trait QueryExecutor {
    /// Run `query` with positional `params` bound to `?1`, `?2`, ...
    fn execute(&self, query: &str, params: &[QueryParam]) -> Result<DataFrame>;
}

/// [`QueryExecutor`] backed by a SQLite connection.
pub struct SqliteExecutor {
    conn: Connection,
}

static_assertions::assert_impl_all!(SqliteExecutor: Send);

impl SqliteExecutor {
    /// Open an existing database file without write access.
    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        info!("Opened database read-only: {}", path.display());
        Ok(Self { conn })
    }

    /// Wrap a connection managed by the caller.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }
}

impl QueryExecutor for SqliteExecutor {
    fn execute(&self, query: &str, params: &[QueryParam]) -> Result<DataFrame> {
        debug!("Executing query with {} parameters", params.len());

        let mut stmt = self.conn.prepare(query)?;
        let column_names: Vec<String> = stmt
            .column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();

        let mut column_data: Vec<Vec<Value>> = vec![Vec::new(); column_names.len()];
        let mut rows = stmt.query(params_from_iter(params.iter()))?;
        while let Some(row) = rows.next()? {
            for (idx, values) in column_data.iter_mut().enumerate() {
                values.push(row.get::<_, Value>(idx)?);
            }
        }

        let columns: Vec<Column> = column_names
            .iter()
            .zip(column_data)
            .map(|(name, values)| Column::from(values_to_series(name, values)))
            .collect();

        let df = DataFrame::new(columns)
            .map_err(|e| InsightsError::Query(format!("Cannot build result table: {}", e)))?;
        debug!("Query returned {:?}", df.shape());
        Ok(df)
    }
}

/// Convert one result column: all integers → Int64, all numbers → Float64,
/// anything else → String. SQL NULL becomes a null cell.
fn values_to_series(name: &str, values: Vec<Value>) -> Series {
    let has_values = values.iter().any(|v| !matches!(v, Value::Null));
    let all_integer = values
        .iter()
        .all(|v| matches!(v, Value::Null | Value::Integer(_)));
    let all_numeric = values
        .iter()
        .all(|v| matches!(v, Value::Null | Value::Integer(_) | Value::Real(_)));

    if has_values && all_integer {
        let ints: Vec<Option<i64>> = values
            .iter()
            .map(|v| match v {
                Value::Integer(i) => Some(*i),
                _ => None,
            })
            .collect();
        Series::new(name.into(), ints)
    } else if has_values && all_numeric {
        let floats: Vec<Option<f64>> = values
            .iter()
            .map(|v| match v {
                Value::Integer(i) => Some(*i as f64),
                Value::Real(f) => Some(*f),
                _ => None,
            })
            .collect();
        Series::new(name.into(), floats)
    } else {
        let text: Vec<Option<String>> = values
            .into_iter()
            .map(|v| match v {
                Value::Null => None,
                Value::Integer(i) => Some(i.to_string()),
                Value::Real(f) => Some(f.to_string()),
                Value::Text(s) => Some(s),
                Value::Blob(b) => Some(String::from_utf8_lossy(&b).into_owned()),
            })
            .collect();
        Series::new(name.into(), text)
    }
}
