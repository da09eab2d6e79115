// src/top.rs
//! Top-of-book reader for `.csv` snapshot files.
//!
//! The header is checked before any row is read. After that, column kinds are
//! inferred from the text and only the columns the derivations need are
//! required to be numeric.
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use crate::error::{ReadError, Result};
use crate::reader::DataReader;
use crate::table::{BookTable, Column};
use crate::time::{datetime_from_nanos, insert_calendar_columns, TimeUnit};

/// Header columns a top-of-book file must provide.
pub const TOP_COLUMNS: [&str; 17] = [
    "nanosEpoch",
    "time",
    "msuk",
    "source",
    "cbidPx",
    "cbidSz",
    "caskPx",
    "caskSz",
    "bidPx",
    "bidSz",
    "askPx",
    "askSz",
    "tradePx",
    "tradeSz",
    "channelId",
    "seqNum",
    "msgIdx",
];

/// Reader for `.csv` files.
#[derive(Clone, Copy, Debug, Default)]
pub struct TopBookReader;

impl TopBookReader {
    pub fn read_table<R: Read>(r: R) -> Result<BookTable> {
        let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(r);
        let headers = rdr.headers()?.clone();
        check_header(&headers)?;

        let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
        for rec in rdr.records() {
            let rec = rec?;
            for (col, v) in raw.iter_mut().zip(rec.iter()) {
                col.push(v.to_owned());
            }
        }

        let rows = raw.first().map_or(0, Vec::len);
        let mut t = BookTable::with_rows(rows);
        for (name, values) in headers.iter().zip(raw) {
            t.insert(name, Column::infer(values))?;
        }

        Self::standardize(t)
    }

    /// Turns a table holding the raw CSV columns into a canonical one.
    pub fn standardize(mut t: BookTable) -> Result<BookTable> {
        // A header-only file infers every column as an empty Float.
        let nanos = if t.is_empty() {
            Vec::new()
        } else {
            normalize_epoch(t.ints("nanosEpoch")?)?
        };

        t.drop_column("channelId");
        insert_calendar_columns(&mut t, nanos.iter().map(|&ns| datetime_from_nanos(ns)).collect())?;
        t.insert("nanosEpoch", Column::Int(nanos))?;

        // Snapshots carry no trade direction.
        t.insert("direction", Column::Str(vec![String::new(); t.len()]))?;

        let spread = sub(&t, "askPx", "bidPx", "spread")?;
        t.insert("spread", widen(spread))?;

        // Placeholder kept for compatibility: snapshots have no trade flow to
        // accumulate, so this mirrors askSz rather than summing tradeSz.
        let ask_sz = t.column("askSz").cloned().ok_or_else(|| ReadError::missing("askSz"))?;
        t.insert("cumulative_trade_volume", ask_sz)?;

        let imbalance = sub(&t, "askSz", "bidSz", "size_imbalance")?;
        t.insert("size_imbalance", imbalance)?;

        Ok(t)
    }
}

fn check_header(headers: &StringRecord) -> Result<()> {
    let missing: Vec<String> = TOP_COLUMNS
        .iter()
        .filter(|c| !headers.iter().any(|h| h == **c))
        .map(|c| c.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ReadError::Schema { missing })
    }
}

/// Infers the unit from the first value and rescales every value to
/// nanoseconds.
fn normalize_epoch(raw: &[i64]) -> Result<Vec<i64>> {
    let Some(&first) = raw.first() else {
        return Ok(Vec::new());
    };
    // Mixed-resolution rows within one file are not supported; the first
    // value decides for all of them.
    let unit = TimeUnit::infer(first).ok_or_else(|| {
        ReadError::coercion("nanosEpoch", 1, format!("cannot infer timestamp unit of {first}"))
    })?;
    debug!("top reader: nanosEpoch unit={unit:?}");

    raw.iter()
        .enumerate()
        .map(|(i, &v)| {
            unit.to_nanos(v)
                .ok_or_else(|| ReadError::coercion("nanosEpoch", i + 1, format!("{v} overflows")))
        })
        .collect()
}

fn sub(t: &BookTable, a: &str, b: &str, name: &str) -> Result<Column> {
    let lhs = t.column(a).ok_or_else(|| ReadError::missing(a))?;
    let rhs = t.column(b).ok_or_else(|| ReadError::missing(b))?;
    lhs.sub(rhs, name)
}

/// Spreads are prices: always float, even when a file quotes integer ticks.
fn widen(c: Column) -> Column {
    match c {
        Column::Int(v) => Column::Float(v.into_iter().map(|x| x as f64).collect()),
        other => other,
    }
}

impl DataReader for TopBookReader {
    fn load(&self, path: &Path) -> Result<BookTable> {
        let f = File::open(path)?;
        let t = Self::read_table(f)?;
        debug!("top reader: {:?} rows={}", path, t.len());
        Ok(t)
    }
}
