// src/reader.rs
//! The contract every source format implements, plus the format-agnostic
//! validation and cache persistence helpers.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{ReadError, Result};
use crate::parser::LineReader;
use crate::table::BookTable;
use crate::top::TopBookReader;

/// Columns every canonical table must carry.
pub const REQUIRED_COLUMNS: [&str; 24] = [
    "nanosEpoch",
    "datetime",
    "date",
    "hour",
    "minute",
    "second",
    "microsecond",
    "time",
    "msuk",
    "source",
    "bidPx",
    "bidSz",
    "askPx",
    "askSz",
    "cbidPx",
    "cbidSz",
    "caskPx",
    "caskSz",
    "tradePx",
    "tradeSz",
    "direction",
    "spread",
    "cumulative_trade_volume",
    "size_imbalance",
];

pub trait DataReader {
    /// Reads and normalizes one source file in a single pass.
    fn load(&self, path: &Path) -> Result<BookTable>;

    fn validate(&self, table: &BookTable) -> Result<()> {
        validate(table)
    }

    fn serialize(&self, table: &BookTable, path: &Path) -> Result<()> {
        serialize(table, path)
    }

    fn deserialize(&self, path: &Path) -> Result<BookTable> {
        deserialize(path)
    }
}

/// Structural check only: the required columns are present. Values are not
/// inspected.
pub fn validate(table: &BookTable) -> Result<()> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !table.contains(c))
        .map(|c| c.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ReadError::Schema { missing })
    }
}

pub fn serialize(table: &BookTable, path: &Path) -> Result<()> {
    validate(table)?;
    let mut w = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut w, table)?;
    w.flush()?;
    debug!("serialized {} rows to {:?}", table.len(), path);
    Ok(())
}

pub fn deserialize(path: &Path) -> Result<BookTable> {
    let r = BufReader::new(File::open(path)?);
    let table: BookTable = serde_json::from_reader(r)?;
    validate(&table)?;
    debug!("deserialized {} rows from {:?}", table.len(), path);
    Ok(table)
}

/// Source format, chosen from the file extension alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReaderKind {
    /// `.data`: free-text book update lines.
    Line,
    /// `.csv`: top-of-book snapshots.
    Top,
}

impl ReaderKind {
    pub fn from_path(path: &Path) -> Result<ReaderKind> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("data") => Ok(ReaderKind::Line),
            Some("csv") => Ok(ReaderKind::Top),
            _ => Err(ReadError::UnsupportedExtension(path.to_path_buf())),
        }
    }
}

impl DataReader for ReaderKind {
    fn load(&self, path: &Path) -> Result<BookTable> {
        let table = match self {
            ReaderKind::Line => LineReader.load(path)?,
            ReaderKind::Top => TopBookReader.load(path)?,
        };
        validate(&table)?;
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;
    use std::path::PathBuf;

    fn conforming(rows: usize) -> BookTable {
        let mut t = BookTable::with_rows(rows);
        for name in REQUIRED_COLUMNS {
            t.insert(name, Column::Int(vec![0; rows])).unwrap();
        }
        t
    }

    #[test]
    fn validate_lists_every_missing_column() {
        let mut t = conforming(1);
        t.drop_column("bidSz");
        t.drop_column("spread");
        match validate(&t).unwrap_err() {
            ReadError::Schema { missing } => assert_eq!(missing, ["bidSz", "spread"]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn validate_ignores_extra_columns() {
        let mut t = conforming(2);
        t.insert("seqNum", Column::Int(vec![1, 2])).unwrap();
        validate(&t).unwrap();
    }

    #[test]
    fn kind_from_extension() {
        assert_eq!(ReaderKind::from_path(Path::new("a/b.data")).unwrap(), ReaderKind::Line);
        assert_eq!(ReaderKind::from_path(Path::new("top.csv")).unwrap(), ReaderKind::Top);
        let err = ReaderKind::from_path(Path::new("book.txt")).unwrap_err();
        assert!(matches!(err, ReadError::UnsupportedExtension(p) if p == PathBuf::from("book.txt")));
        assert!(ReaderKind::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn serialize_refuses_non_conforming_tables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.json");
        let mut t = conforming(1);
        t.drop_column("msuk");
        assert!(serialize(&t, &path).unwrap_err().is_schema());
        assert!(!path.exists());
    }

    #[test]
    fn deserialize_revalidates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.json");
        std::fs::write(&path, r#"{"rows":0,"columns":[]}"#).unwrap();
        assert!(deserialize(&path).unwrap_err().is_schema());
    }
}
