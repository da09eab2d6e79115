// src/parser.rs
//! Line-format reader: one free-text book update per line.
//!
//! ```text
//! EUREX Modify CAU19(79889147) Sell 1819@82.8 (new qty/price) lvl=6 src=2019-08-07 01:14:22.433700419 CDT
//!     our=2019-08-07 01:14:22.433706420 CDT flags= seq=227633875336 bid:37@82.2 ask:1137@82.3 cbid:37@82.2 cask:1137@82.3
//! ```
//!
//! Parsing is all-or-nothing per file: the first line an attribute cannot be
//! extracted from aborts the load with [`ReadError::Parse`].
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::sync::OnceLock;

use chrono::NaiveDateTime;
use hashbrown::HashMap;
use regex::{Captures, Regex};
use tracing::debug;

use crate::error::{ReadError, Result};
use crate::reader::DataReader;
use crate::table::{BookTable, Column};
use crate::time::{insert_calendar_columns, nanos_from_datetime, parse_naive};

/// Price/size pairs carried by every line, in extraction order.
const LEVELS: [&str; 5] = ["trade", "bid", "cbid", "ask", "cask"];

struct Patterns {
    source: Regex,
    msuk: Regex,
    datetime: Regex,
    direction: Regex,
    levels: [Regex; 5],
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let re = |p: &str| Regex::new(p).expect("static pattern compiles");
        Patterns {
            source: re(r"^\s*(\S+)"),
            msuk: re(r"\w+\((\d+)\)"),
            datetime: re(r"our=(\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(?:\.\d+)?) \w+ flags="),
            direction: re(r"Buy|Sell"),
            levels: [
                re(r"(?:Buy|Sell) (\S+)@(\S+)"),
                re(r"\bbid:(\S+)@(\S+)"),
                re(r"cbid:(\S+)@(\S+)"),
                re(r"\bask:(\S+)@(\S+)"),
                re(r"cask:(\S+)@(\S+)"),
            ],
        }
    })
}

#[inline]
fn search<'l>(re: &Regex, line: &'l str, line_no: usize, attr: &'static str) -> Result<Captures<'l>> {
    re.captures(line).ok_or(ReadError::Parse { attr, line: line_no })
}

/// Attributes of one line, coerced to their column kinds.
#[derive(Clone, Debug, PartialEq)]
pub struct LineEntry {
    pub source: String,
    pub msuk: i64,
    pub datetime: NaiveDateTime,
    pub direction: String,
    /// `(size, price)` for trade, bid, cbid, ask, cask.
    pub levels: [(i64, f64); 5],
}

impl LineEntry {
    #[inline]
    pub fn trade(&self) -> (i64, f64) {
        self.levels[0]
    }
    #[inline]
    pub fn bid(&self) -> (i64, f64) {
        self.levels[1]
    }
    #[inline]
    pub fn ask(&self) -> (i64, f64) {
        self.levels[3]
    }
}

/// Extracts one line. `line_no` is 1-based and only used for errors.
pub fn parse_line(line: &str, line_no: usize) -> Result<LineEntry> {
    let p = patterns();

    let source = search(&p.source, line, line_no, "source")?[1].to_owned();

    let caps = search(&p.msuk, line, line_no, "msuk")?;
    let msuk = coerce_int("msuk", line_no, &caps[1])?;

    let caps = search(&p.datetime, line, line_no, "datetime")?;
    let datetime = parse_naive("datetime", line_no, &caps[1])?;

    let direction = p
        .direction
        .find(line)
        .ok_or(ReadError::Parse { attr: "direction", line: line_no })?
        .as_str()
        .to_owned();

    let mut levels = [(0i64, 0f64); 5];
    for (slot, (&attr, re)) in levels.iter_mut().zip(LEVELS.iter().zip(&p.levels)) {
        let caps = search(re, line, line_no, attr)?;
        let size = coerce_int(&format!("{attr}Sz"), line_no, &caps[1])?;
        let price = coerce_float(&format!("{attr}Px"), line_no, &caps[2])?;
        *slot = (size, price);
    }

    Ok(LineEntry {
        source,
        msuk,
        datetime,
        direction,
        levels,
    })
}

fn coerce_int(column: &str, line_no: usize, raw: &str) -> Result<i64> {
    raw.parse()
        .map_err(|_| ReadError::coercion(column, line_no, format!("{raw:?} is not an integer")))
}

fn coerce_float(column: &str, line_no: usize, raw: &str) -> Result<f64> {
    raw.parse()
        .map_err(|_| ReadError::coercion(column, line_no, format!("{raw:?} is not a number")))
}

/// Reader for `.data` files.
#[derive(Clone, Copy, Debug, Default)]
pub struct LineReader;

impl LineReader {
    pub fn read_entries<R: Read>(r: R) -> Result<Vec<LineEntry>> {
        let mut br = BufReader::new(r);
        let mut line = String::new();
        let mut out = Vec::new();
        let mut line_no = 0usize;

        loop {
            line.clear();
            if br.read_line(&mut line)? == 0 {
                break;
            }
            line_no += 1;
            out.push(parse_line(line.trim_end_matches(&['\r', '\n'][..]), line_no)?);
        }

        Ok(out)
    }

    /// Builds the canonical table from already extracted entries.
    pub fn build_table(entries: &[LineEntry]) -> Result<BookTable> {
        let n = entries.len();
        let mut t = BookTable::with_rows(n);

        t.insert("msuk", Column::Int(entries.iter().map(|e| e.msuk).collect()))?;
        t.insert("source", Column::Str(entries.iter().map(|e| e.source.clone()).collect()))?;
        t.insert(
            "direction",
            Column::Str(entries.iter().map(|e| e.direction.clone()).collect()),
        )?;
        for (i, attr) in LEVELS.iter().enumerate() {
            t.insert(
                &format!("{attr}Sz"),
                Column::Int(entries.iter().map(|e| e.levels[i].0).collect()),
            )?;
            t.insert(
                &format!("{attr}Px"),
                Column::Float(entries.iter().map(|e| e.levels[i].1).collect()),
            )?;
        }

        let spread = entries.iter().map(|e| e.ask().1 - e.bid().1).collect();
        t.insert("spread", Column::Float(spread))?;

        let mut nanos = Vec::with_capacity(n);
        for (i, e) in entries.iter().enumerate() {
            let ns = nanos_from_datetime(&e.datetime).ok_or_else(|| {
                ReadError::coercion("nanosEpoch", i + 1, format!("{} out of range", e.datetime))
            })?;
            nanos.push(ns);
        }

        let cumulative = cumulative_volume(&nanos, entries);
        t.insert("nanosEpoch", Column::Int(nanos))?;
        insert_calendar_columns(&mut t, entries.iter().map(|e| e.datetime).collect())?;
        t.insert("cumulative_trade_volume", Column::Int(cumulative))?;

        let imbalance = entries.iter().map(|e| e.ask().0 - e.bid().0).collect();
        t.insert("size_imbalance", Column::Int(imbalance))?;

        Ok(t)
    }
}

/// Running sum of trade size per `(nanosEpoch, direction)`, in file order.
fn cumulative_volume(nanos: &[i64], entries: &[LineEntry]) -> Vec<i64> {
    let mut running: HashMap<(i64, &str), i64> = HashMap::new();
    nanos
        .iter()
        .zip(entries)
        .map(|(&ns, e)| {
            let acc = running.entry((ns, e.direction.as_str())).or_insert(0);
            *acc += e.trade().0;
            *acc
        })
        .collect()
}

impl DataReader for LineReader {
    fn load(&self, path: &Path) -> Result<BookTable> {
        let f = File::open(path)?;
        let entries = Self::read_entries(f)?;
        debug!("line reader: {:?} lines={}", path, entries.len());
        Self::build_table(&entries)
    }
}
