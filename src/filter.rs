// src/filter.rs
//! Row selection used by the dashboard: one date, an optional instrument, and
//! inclusive ranges on each time-of-day component.
use std::ops::RangeInclusive;

use chrono::NaiveDate;

use crate::error::Result;
use crate::table::BookTable;

/// Full domain of each time-of-day component (half-open upper bound).
pub const TIME_RANGES: [(&str, i64, i64); 4] = [
    ("hour", 0, 24),
    ("minute", 0, 60),
    ("second", 0, 60),
    ("microsecond", 0, 1_000_000),
];

/// `None` everywhere means "All".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub date: Option<NaiveDate>,
    pub msuk: Option<i64>,
    pub hour: Option<RangeInclusive<i64>>,
    pub minute: Option<RangeInclusive<i64>>,
    pub second: Option<RangeInclusive<i64>>,
    pub microsecond: Option<RangeInclusive<i64>>,
}

impl Selection {
    /// Indices of matching rows, in table order.
    pub fn matching_rows(&self, t: &BookTable) -> Result<Vec<usize>> {
        let mut keep = vec![true; t.len()];

        if let Some(d) = self.date {
            retain(&mut keep, t.dates("date")?, |v| *v == d);
        }
        if let Some(m) = self.msuk {
            retain(&mut keep, t.ints("msuk")?, |v| *v == m);
        }
        let ranges = [
            ("hour", &self.hour),
            ("minute", &self.minute),
            ("second", &self.second),
            ("microsecond", &self.microsecond),
        ];
        for (name, range) in ranges {
            if let Some(r) = range {
                retain(&mut keep, t.ints(name)?, |v| r.contains(v));
            }
        }

        Ok(keep
            .iter()
            .enumerate()
            .filter_map(|(i, &k)| k.then_some(i))
            .collect())
    }

    /// First component whose range leaves its [`TIME_RANGES`] domain.
    pub fn out_of_domain(&self) -> Option<&'static str> {
        let ranges = [&self.hour, &self.minute, &self.second, &self.microsecond];
        TIME_RANGES
            .iter()
            .zip(ranges)
            .find(|((_, lo, hi), r)| {
                r.as_ref()
                    .is_some_and(|r| r.start() < lo || r.end() >= hi || r.start() > r.end())
            })
            .map(|((name, _, _), _)| *name)
    }

    /// Filtered copy; `t` is left untouched.
    pub fn apply(&self, t: &BookTable) -> Result<BookTable> {
        Ok(t.take(&self.matching_rows(t)?))
    }
}

fn retain<T>(keep: &mut [bool], values: &[T], pred: impl Fn(&T) -> bool) {
    for (k, v) in keep.iter_mut().zip(values) {
        *k = *k && pred(v);
    }
}

/// Distinct instrument ids in first-seen order.
pub fn msuks(t: &BookTable) -> Result<Vec<i64>> {
    let mut seen = hashbrown::HashSet::new();
    Ok(t.ints("msuk")?
        .iter()
        .copied()
        .filter(|m| seen.insert(*m))
        .collect())
}

/// Distinct dates in first-seen order.
pub fn dates(t: &BookTable) -> Result<Vec<NaiveDate>> {
    let mut seen = hashbrown::HashSet::new();
    Ok(t.dates("date")?
        .iter()
        .copied()
        .filter(|d| seen.insert(*d))
        .collect())
}
