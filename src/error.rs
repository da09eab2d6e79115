// src/error.rs
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReadError>;

/// Everything a single `load` (or cache round trip) can fail with.
///
/// `Parse` and `Schema` are the two kinds callers are expected to branch on;
/// the rest are propagated as-is.
#[derive(Debug, Error)]
pub enum ReadError {
    /// A line-format extraction pattern did not match.
    #[error("failed parsing attribute `{attr}` on line number `{line}`")]
    Parse { attr: &'static str, line: usize },

    /// Required columns are absent from a table or a CSV header.
    #[error("non conforming table, missing required columns: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    /// A value exists but does not have the kind its column needs.
    #[error("column `{column}` row {row}: {reason}")]
    TypeCoercion {
        column: String,
        row: usize,
        reason: String,
    },

    /// Columns of one table disagree on their length.
    #[error("column `{column}` has {found} values, table has {expected} rows")]
    Shape {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("unsupported file {0:?}: supported extensions are .data and .csv")]
    UnsupportedExtension(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("cache artifact: {0}")]
    Cache(#[from] serde_json::Error),
}

impl ReadError {
    pub(crate) fn coercion(column: &str, row: usize, reason: impl Into<String>) -> Self {
        ReadError::TypeCoercion {
            column: column.to_owned(),
            row,
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(column: &str) -> Self {
        ReadError::Schema {
            missing: vec![column.to_owned()],
        }
    }

    #[inline]
    pub fn is_parse(&self) -> bool {
        matches!(self, ReadError::Parse { .. })
    }

    #[inline]
    pub fn is_schema(&self) -> bool {
        matches!(self, ReadError::Schema { .. })
    }
}
