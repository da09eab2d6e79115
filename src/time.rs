// src/time.rs
//! Timestamp helpers shared by both readers.
//!
//! Sources do not describe the resolution of their epoch column, so the unit
//! is guessed from the digit count of a value. Every canonical table carries
//! `nanosEpoch` in nanoseconds plus a naive `datetime` and its calendar
//! decomposition.

use chrono::{DateTime, NaiveDateTime, Timelike};

use crate::error::{ReadError, Result};
use crate::table::{BookTable, Column};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeUnit {
    Seconds,
    Millis,
    Micros,
    Nanos,
}

impl TimeUnit {
    /// 10 digits -> seconds, 13 -> millis, 16 -> micros, 19 -> nanos.
    pub fn infer(value: i64) -> Option<TimeUnit> {
        match digit_count(value) {
            10 => Some(TimeUnit::Seconds),
            13 => Some(TimeUnit::Millis),
            16 => Some(TimeUnit::Micros),
            19 => Some(TimeUnit::Nanos),
            _ => None,
        }
    }

    #[inline]
    pub fn nanos_per_unit(self) -> i64 {
        match self {
            TimeUnit::Seconds => 1_000_000_000,
            TimeUnit::Millis => 1_000_000,
            TimeUnit::Micros => 1_000,
            TimeUnit::Nanos => 1,
        }
    }

    /// `None` on i64 overflow.
    #[inline]
    pub fn to_nanos(self, value: i64) -> Option<i64> {
        value.checked_mul(self.nanos_per_unit())
    }
}

fn digit_count(value: i64) -> u32 {
    match value.unsigned_abs() {
        0 => 1,
        v => v.ilog10() + 1,
    }
}

#[inline]
pub fn datetime_from_nanos(nanos: i64) -> NaiveDateTime {
    DateTime::from_timestamp_nanos(nanos).naive_utc()
}

/// `None` outside the range representable as i64 nanoseconds (1677..2262).
#[inline]
pub fn nanos_from_datetime(dt: &NaiveDateTime) -> Option<i64> {
    dt.and_utc().timestamp_nanos_opt()
}

/// Writes `datetime`, `date`, `hour`, `minute`, `second`, `microsecond` and
/// `time` into `table`, replacing any existing columns with those names.
pub fn insert_calendar_columns(table: &mut BookTable, datetimes: Vec<NaiveDateTime>) -> Result<()> {
    let n = datetimes.len();
    let mut date = Vec::with_capacity(n);
    let mut hour = Vec::with_capacity(n);
    let mut minute = Vec::with_capacity(n);
    let mut second = Vec::with_capacity(n);
    let mut micro = Vec::with_capacity(n);
    let mut time = Vec::with_capacity(n);

    for dt in &datetimes {
        let t = dt.time();
        date.push(dt.date());
        hour.push(i64::from(t.hour()));
        minute.push(i64::from(t.minute()));
        second.push(i64::from(t.second()));
        micro.push(i64::from(t.nanosecond() / 1_000));
        time.push(t);
    }

    table.insert("datetime", Column::DateTime(datetimes))?;
    table.insert("date", Column::Date(date))?;
    table.insert("hour", Column::Int(hour))?;
    table.insert("minute", Column::Int(minute))?;
    table.insert("second", Column::Int(second))?;
    table.insert("microsecond", Column::Int(micro))?;
    table.insert("time", Column::Time(time))?;
    Ok(())
}

pub(crate) fn parse_naive(column: &str, row: usize, raw: &str) -> Result<NaiveDateTime> {
    let normalized = raw.replacen('T', " ", 1);
    NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M:%S%.f")
        .map_err(|e| ReadError::coercion(column, row, format!("{raw:?} is not a timestamp: {e}")))
}
