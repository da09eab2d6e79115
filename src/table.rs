// src/table.rs
//! Canonical columnar table produced by every reader.
//!
//! A [`BookTable`] is an ordered list of named, equally sized columns. Both
//! readers build one in a single pass over their source file; after that the
//! table is treated as immutable and consumers that narrow it (filters, chart
//! views) work on copies obtained through [`BookTable::take`].
//!
//! ## Column kinds
//!
//! - **Int / Float**: ids, sizes, prices and derived numbers
//! - **Str**: `source`, `direction` and any text column passed through from CSV
//! - **Date / Time / DateTime**: calendar decomposition of the event timestamp,
//!   all at nanosecond precision
//!
//! ## Example
//!
//! ```rust
//! use book_reader::table::{BookTable, Column};
//!
//! let mut t = BookTable::with_rows(2);
//! t.insert("askSz", Column::Int(vec![180, 90])).unwrap();
//! t.insert("bidSz", Column::Int(vec![200, 100])).unwrap();
//!
//! let imbalance = t.column("askSz").unwrap().sub(t.column("bidSz").unwrap(), "size_imbalance").unwrap();
//! assert_eq!(imbalance, Column::Int(vec![-20, -10]));
//! ```

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{ReadError, Result};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Column {
    Int(Vec<i64>),
    Float(#[serde(with = "non_finite")] Vec<f64>),
    Str(Vec<String>),
    Date(Vec<NaiveDate>),
    Time(Vec<NaiveTime>),
    DateTime(Vec<NaiveDateTime>),
}

/// One value borrowed out of a [`Column`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Cell<'a> {
    Int(i64),
    Float(f64),
    Str(&'a str),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
}

impl fmt::Display for Cell<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Int(v) => write!(f, "{v}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Str(v) => f.write_str(v),
            Cell::Date(v) => write!(f, "{v}"),
            Cell::Time(v) => write!(f, "{v}"),
            Cell::DateTime(v) => write!(f, "{v}"),
        }
    }
}

impl Column {
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Column::Int(v) => v.len(),
            Column::Float(v) => v.len(),
            Column::Str(v) => v.len(),
            Column::Date(v) => v.len(),
            Column::Time(v) => v.len(),
            Column::DateTime(v) => v.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Column::Int(_) => "int",
            Column::Float(_) => "float",
            Column::Str(_) => "str",
            Column::Date(_) => "date",
            Column::Time(_) => "time",
            Column::DateTime(_) => "datetime",
        }
    }

    pub fn get(&self, row: usize) -> Option<Cell<'_>> {
        Some(match self {
            Column::Int(v) => Cell::Int(*v.get(row)?),
            Column::Float(v) => Cell::Float(*v.get(row)?),
            Column::Str(v) => Cell::Str(v.get(row)?.as_str()),
            Column::Date(v) => Cell::Date(*v.get(row)?),
            Column::Time(v) => Cell::Time(*v.get(row)?),
            Column::DateTime(v) => Cell::DateTime(*v.get(row)?),
        })
    }

    /// Kind inference for raw CSV text: all integers, else all numbers
    /// (blank cells become NaN), else text. An empty column is `Float`.
    pub fn infer(raw: Vec<String>) -> Column {
        if raw.is_empty() {
            return Column::Float(Vec::new());
        }
        if let Some(ints) = raw
            .iter()
            .map(|s| s.trim().parse::<i64>().ok())
            .collect::<Option<Vec<_>>>()
        {
            return Column::Int(ints);
        }
        if let Some(floats) = raw.iter().map(|s| parse_float(s)).collect::<Option<Vec<_>>>() {
            return Column::Float(floats);
        }
        Column::Str(raw)
    }

    /// Element-wise `self - other`. Int stays Int; any float operand widens
    /// the result to Float. `name` is only used in error messages.
    pub fn sub(&self, other: &Column, name: &str) -> Result<Column> {
        if self.len() != other.len() {
            return Err(ReadError::Shape {
                column: name.to_owned(),
                expected: self.len(),
                found: other.len(),
            });
        }
        let out = match (self, other) {
            (Column::Int(a), Column::Int(b)) => {
                Column::Int(a.iter().zip(b).map(|(x, y)| x.wrapping_sub(*y)).collect())
            }
            (Column::Float(a), Column::Float(b)) => {
                Column::Float(a.iter().zip(b).map(|(x, y)| x - y).collect())
            }
            (Column::Int(a), Column::Float(b)) => {
                Column::Float(a.iter().zip(b).map(|(x, y)| *x as f64 - y).collect())
            }
            (Column::Float(a), Column::Int(b)) => {
                Column::Float(a.iter().zip(b).map(|(x, y)| x - *y as f64).collect())
            }
            (a, b) => {
                return Err(ReadError::coercion(
                    name,
                    1,
                    format!("cannot subtract {} from {}", b.kind(), a.kind()),
                ))
            }
        };
        Ok(out)
    }

    fn take(&self, rows: &[usize]) -> Column {
        fn pick<T: Clone>(v: &[T], rows: &[usize]) -> Vec<T> {
            rows.iter().map(|&i| v[i].clone()).collect()
        }
        match self {
            Column::Int(v) => Column::Int(pick(v, rows)),
            Column::Float(v) => Column::Float(pick(v, rows)),
            Column::Str(v) => Column::Str(pick(v, rows)),
            Column::Date(v) => Column::Date(pick(v, rows)),
            Column::Time(v) => Column::Time(pick(v, rows)),
            Column::DateTime(v) => Column::DateTime(pick(v, rows)),
        }
    }
}

fn parse_float(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return Some(f64::NAN);
    }
    s.parse().ok()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub values: Column,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTable")]
pub struct BookTable {
    rows: usize,
    columns: Vec<Field>,
}

#[derive(Deserialize)]
struct RawTable {
    rows: usize,
    columns: Vec<Field>,
}

impl TryFrom<RawTable> for BookTable {
    type Error = ReadError;

    fn try_from(raw: RawTable) -> Result<Self> {
        let mut t = BookTable::with_rows(raw.rows);
        for f in raw.columns {
            t.insert(&f.name, f.values)?;
        }
        Ok(t)
    }
}

impl BookTable {
    #[inline]
    pub fn with_rows(rows: usize) -> Self {
        Self {
            rows,
            columns: Vec::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(|f| f.name.as_str())
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    #[inline]
    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|f| f.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.position(name).map(|i| &self.columns[i].values)
    }

    /// Replaces a column in place, or appends it at the end.
    pub fn insert(&mut self, name: &str, values: Column) -> Result<()> {
        if values.len() != self.rows {
            return Err(ReadError::Shape {
                column: name.to_owned(),
                expected: self.rows,
                found: values.len(),
            });
        }
        match self.position(name) {
            Some(i) => self.columns[i].values = values,
            None => self.columns.push(Field {
                name: name.to_owned(),
                values,
            }),
        }
        Ok(())
    }

    pub fn drop_column(&mut self, name: &str) -> Option<Column> {
        let i = self.position(name)?;
        Some(self.columns.remove(i).values)
    }

    pub fn cell(&self, name: &str, row: usize) -> Option<Cell<'_>> {
        self.column(name)?.get(row)
    }

    fn require(&self, name: &str) -> Result<&Column> {
        self.column(name).ok_or_else(|| ReadError::missing(name))
    }

    pub fn ints(&self, name: &str) -> Result<&[i64]> {
        match self.require(name)? {
            Column::Int(v) => Ok(v),
            other => Err(wrong_kind(name, "int", other)),
        }
    }

    pub fn floats(&self, name: &str) -> Result<&[f64]> {
        match self.require(name)? {
            Column::Float(v) => Ok(v),
            other => Err(wrong_kind(name, "float", other)),
        }
    }

    pub fn strs(&self, name: &str) -> Result<&[String]> {
        match self.require(name)? {
            Column::Str(v) => Ok(v),
            other => Err(wrong_kind(name, "str", other)),
        }
    }

    pub fn dates(&self, name: &str) -> Result<&[NaiveDate]> {
        match self.require(name)? {
            Column::Date(v) => Ok(v),
            other => Err(wrong_kind(name, "date", other)),
        }
    }

    pub fn times(&self, name: &str) -> Result<&[NaiveTime]> {
        match self.require(name)? {
            Column::Time(v) => Ok(v),
            other => Err(wrong_kind(name, "time", other)),
        }
    }

    pub fn datetimes(&self, name: &str) -> Result<&[NaiveDateTime]> {
        match self.require(name)? {
            Column::DateTime(v) => Ok(v),
            other => Err(wrong_kind(name, "datetime", other)),
        }
    }

    /// Int or Float column widened to f64.
    pub fn numbers(&self, name: &str) -> Result<Vec<f64>> {
        match self.require(name)? {
            Column::Int(v) => Ok(v.iter().map(|&x| x as f64).collect()),
            Column::Float(v) => Ok(v.clone()),
            other => Err(wrong_kind(name, "number", other)),
        }
    }

    /// Copy of the selected rows, in the given order.
    pub fn take(&self, rows: &[usize]) -> BookTable {
        BookTable {
            rows: rows.len(),
            columns: self
                .columns
                .iter()
                .map(|f| Field {
                    name: f.name.clone(),
                    values: f.values.take(rows),
                })
                .collect(),
        }
    }
}

fn wrong_kind(name: &str, want: &str, got: &Column) -> ReadError {
    ReadError::coercion(name, 1, format!("expected {want} column, found {}", got.kind()))
}

/// JSON numbers are finite only. NaN and the infinities are written as the
/// strings `"NaN"`, `"inf"` and `"-inf"`; `null` still reads back as NaN.
mod non_finite {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Num(f64),
        Tag(String),
    }

    pub fn serialize<S: Serializer>(v: &[f64], s: S) -> Result<S::Ok, S::Error> {
        let repr: Vec<Repr> = v
            .iter()
            .map(|&x| match x {
                x if x.is_finite() => Repr::Num(x),
                x if x.is_nan() => Repr::Tag("NaN".to_owned()),
                x if x > 0.0 => Repr::Tag("inf".to_owned()),
                _ => Repr::Tag("-inf".to_owned()),
            })
            .collect();
        repr.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<f64>, D::Error> {
        Vec::<Option<Repr>>::deserialize(d)?
            .into_iter()
            .map(|r| match r {
                Some(Repr::Num(x)) => Ok(x),
                None => Ok(f64::NAN),
                Some(Repr::Tag(t)) => match t.as_str() {
                    "NaN" => Ok(f64::NAN),
                    "inf" => Ok(f64::INFINITY),
                    "-inf" => Ok(f64::NEG_INFINITY),
                    other => Err(D::Error::custom(format!("unknown float tag {other:?}"))),
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BookTable {
        let mut t = BookTable::with_rows(3);
        t.insert("msuk", Column::Int(vec![1, 2, 1])).unwrap();
        t.insert("bidPx", Column::Float(vec![82.5, 82.4, 82.6])).unwrap();
        t.insert("source", Column::Str(vec!["A".into(), "B".into(), "C".into()]))
            .unwrap();
        t
    }

    #[test]
    fn insert_rejects_wrong_length() {
        let mut t = sample();
        let err = t.insert("askPx", Column::Float(vec![1.0])).unwrap_err();
        assert!(matches!(err, ReadError::Shape { expected: 3, found: 1, .. }));
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut t = sample();
        t.insert("msuk", Column::Int(vec![7, 8, 9])).unwrap();
        assert_eq!(t.names().collect::<Vec<_>>(), ["msuk", "bidPx", "source"]);
        assert_eq!(t.ints("msuk").unwrap(), &[7, 8, 9]);
    }

    #[test]
    fn typed_access_reports_missing_and_wrong_kind() {
        let t = sample();
        assert!(t.ints("askSz").unwrap_err().is_schema());
        assert!(matches!(
            t.ints("source").unwrap_err(),
            ReadError::TypeCoercion { .. }
        ));
        assert_eq!(t.numbers("msuk").unwrap(), vec![1.0, 2.0, 1.0]);
    }

    #[test]
    fn take_copies_rows() {
        let t = sample();
        let sub = t.take(&[2, 0]);
        assert_eq!(sub.len(), 2);
        assert_eq!(sub.strs("source").unwrap(), &["C".to_string(), "A".to_string()]);
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn infer_prefers_int_then_float_then_str() {
        assert_eq!(Column::infer(vec!["1".into(), " 2".into()]), Column::Int(vec![1, 2]));
        assert_eq!(
            Column::infer(vec!["1".into(), "2.5".into()]),
            Column::Float(vec![1.0, 2.5])
        );
        assert_eq!(Column::infer(vec!["x".into(), "2".into()]).kind(), "str");
        match Column::infer(vec!["".into(), "2".into()]) {
            Column::Float(v) => assert!(v[0].is_nan() && v[1] == 2.0),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn sub_widens_mixed_kinds() {
        let a = Column::Int(vec![10, 20]);
        let b = Column::Float(vec![0.5, 1.5]);
        assert_eq!(a.sub(&b, "x").unwrap(), Column::Float(vec![9.5, 18.5]));
        let s = Column::Str(vec!["a".into(), "b".into()]);
        assert!(a.sub(&s, "x").is_err());
    }

    #[test]
    fn json_keeps_non_finite_floats() {
        let mut t = BookTable::with_rows(4);
        t.insert("px", Column::Float(vec![f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 0.1]))
            .unwrap();
        let text = serde_json::to_string(&t).unwrap();
        assert!(text.contains(r#"["NaN","inf","-inf",0.1]"#));

        let back: BookTable = serde_json::from_str(&text).unwrap();
        let v = back.floats("px").unwrap();
        assert!(v[0].is_nan());
        assert_eq!(v[1], f64::INFINITY);
        assert_eq!(v[2], f64::NEG_INFINITY);
        assert_eq!(v[3], 0.1);

        let legacy = r#"{"rows":1,"columns":[{"name":"px","values":{"Float":[null]}}]}"#;
        let back: BookTable = serde_json::from_str(legacy).unwrap();
        assert!(back.floats("px").unwrap()[0].is_nan());

        let bogus = r#"{"rows":1,"columns":[{"name":"px","values":{"Float":["big"]}}]}"#;
        assert!(serde_json::from_str::<BookTable>(bogus).is_err());
    }

    #[test]
    fn json_rejects_ragged_columns() {
        let ragged = r#"{"rows":2,"columns":[{"name":"a","values":{"Int":[1]}}]}"#;
        assert!(serde_json::from_str::<BookTable>(ragged).is_err());
    }
}
