// src/views.rs
//! Data behind the dashboard charts. Rendering lives elsewhere; these
//! functions only pick and reshape columns of a (usually filtered) table.
use chrono::NaiveDateTime;
use hashbrown::hash_map::Entry;
use hashbrown::{HashMap, HashSet};
use serde::Serialize;

use crate::error::Result;
use crate::table::BookTable;

/// Time-series features offered in the feature selector: `(label, column)`.
pub const FEATURES: [(&str, &str); 5] = [
    ("Bid Size", "bidSz"),
    ("Bid Price", "bidPx"),
    ("Ask Size", "askSz"),
    ("Ask Price", "askPx"),
    ("Spread", "spread"),
];

/// Columns shown in the data table, in display order.
pub const DATA_TABLE_COLUMNS: [&str; 9] = [
    "time",
    "date",
    "bidSz",
    "bidPx",
    "askPx",
    "askSz",
    "tradePx",
    "tradeSz",
    "direction",
];

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Point {
    pub at: NaiveDateTime,
    pub value: f64,
}

/// `(datetime, column)` points for a line chart.
pub fn series(t: &BookTable, column: &str) -> Result<Vec<Point>> {
    let at = t.datetimes("datetime")?;
    let values = t.numbers(column)?;
    Ok(at
        .iter()
        .zip(values)
        .map(|(&at, value)| Point { at, value })
        .collect())
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TradeBar {
    pub price: f64,
    pub size: f64,
}

/// Trades executed at one instant, split by aggressor side.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TradeVolumeDetail {
    /// `Sell` trades.
    pub asks: Vec<TradeBar>,
    /// `Buy` trades.
    pub bids: Vec<TradeBar>,
}

pub fn trade_volume_detail(t: &BookTable, at: NaiveDateTime) -> Result<TradeVolumeDetail> {
    let when = t.datetimes("datetime")?;
    let direction = t.strs("direction")?;
    let px = t.numbers("tradePx")?;
    let sz = t.numbers("tradeSz")?;

    let mut out = TradeVolumeDetail::default();
    for i in (0..t.len()).filter(|&i| when[i] == at) {
        let bar = TradeBar {
            price: px[i],
            size: sz[i],
        };
        match direction[i].as_str() {
            "Sell" => out.asks.push(bar),
            "Buy" => out.bids.push(bar),
            _ => {}
        }
    }
    Ok(out)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Side {
    Bid,
    Ask,
}

/// One cell of the cumulative depth heatmap.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DepthPoint {
    pub at: NaiveDateTime,
    pub side: Side,
    /// Trade price over best bid (buys) or best ask (sells), 5 decimals.
    pub relative_px: f64,
    pub cumulative_volume: f64,
}

pub fn depth_points(t: &BookTable) -> Result<Vec<DepthPoint>> {
    let when = t.datetimes("datetime")?;
    let direction = t.strs("direction")?;
    let trade = t.numbers("tradePx")?;
    let bid = t.numbers("bidPx")?;
    let ask = t.numbers("askPx")?;
    let cum = t.numbers("cumulative_trade_volume")?;

    let mut out = Vec::new();
    for i in 0..t.len() {
        let (side, best) = match direction[i].as_str() {
            "Buy" => (Side::Bid, bid[i]),
            "Sell" => (Side::Ask, ask[i]),
            _ => continue,
        };
        out.push(DepthPoint {
            at: when[i],
            side,
            relative_px: round5(trade[i] / best),
            cumulative_volume: cum[i],
        });
    }
    Ok(out)
}

/// Traded size at one price and instant.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct VolumeCell {
    pub at: NaiveDateTime,
    pub price: f64,
    pub size: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Touch {
    pub at: NaiveDateTime,
    pub bid: f64,
    pub ask: f64,
}

/// Data behind the non-cumulative depth heatmap.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct VolumeDepth {
    pub cells: Vec<VolumeCell>,
    /// Best bid/ask per distinct datetime, from the first row at that instant.
    pub touch: Vec<Touch>,
}

pub fn volume_points(t: &BookTable) -> Result<VolumeDepth> {
    let when = t.datetimes("datetime")?;
    let px = t.numbers("tradePx")?;
    let sz = t.numbers("tradeSz")?;
    let bid = t.numbers("bidPx")?;
    let ask = t.numbers("askPx")?;

    let mut out = VolumeDepth::default();
    let mut slots: HashMap<(NaiveDateTime, u64), usize> = HashMap::new();
    let mut seen: HashSet<NaiveDateTime> = HashSet::new();
    for i in 0..t.len() {
        if seen.insert(when[i]) {
            out.touch.push(Touch {
                at: when[i],
                bid: bid[i],
                ask: ask[i],
            });
        }
        match slots.entry((when[i], px[i].to_bits())) {
            Entry::Occupied(e) => out.cells[*e.get()].size += sz[i],
            Entry::Vacant(e) => {
                e.insert(out.cells.len());
                out.cells.push(VolumeCell {
                    at: when[i],
                    price: px[i],
                    size: sz[i],
                });
            }
        }
    }
    Ok(out)
}

#[inline]
fn round5(x: f64) -> f64 {
    (x * 1e5).round() / 1e5
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::LineReader;
    use std::io::Cursor;

    const LINES: &str = "\
S Modify F(7) Buy 10@100.0 our=2019-08-07 01:00:00.5 CDT flags= bid:1@99.0 ask:2@101.0 cbid:1@99.0 cask:2@101.0
S Modify F(7) Sell 4@101.0 our=2019-08-07 01:00:00.5 CDT flags= bid:1@99.0 ask:2@101.0 cbid:1@99.0 cask:2@101.0
S Modify F(7) Buy 5@99.5 our=2019-08-07 01:00:00.5 CDT flags= bid:1@99.0 ask:2@101.0 cbid:1@99.0 cask:2@101.0
S Modify F(7) Buy 1@100.0 our=2019-08-07 01:00:01 CDT flags= bid:1@99.0 ask:3@101.0 cbid:1@99.0 cask:3@101.0
";

    fn table() -> BookTable {
        let entries = LineReader::read_entries(Cursor::new(LINES)).unwrap();
        LineReader::build_table(&entries).unwrap()
    }

    #[test]
    fn every_feature_is_a_numeric_column() {
        let t = table();
        for (_, col) in FEATURES {
            assert_eq!(series(&t, col).unwrap().len(), 4);
        }
        assert!(series(&t, "direction").is_err());
    }

    #[test]
    fn detail_splits_by_direction() {
        let t = table();
        let at = t.datetimes("datetime").unwrap()[0];
        let d = trade_volume_detail(&t, at).unwrap();
        assert_eq!(d.bids, vec![TradeBar { price: 100.0, size: 10.0 }, TradeBar { price: 99.5, size: 5.0 }]);
        assert_eq!(d.asks, vec![TradeBar { price: 101.0, size: 4.0 }]);
    }

    #[test]
    fn depth_is_relative_to_touch() {
        let t = table();
        let pts = depth_points(&t).unwrap();
        assert_eq!(pts.len(), 4);
        assert_eq!(pts[0].side, Side::Bid);
        assert_eq!(pts[0].relative_px, round5(100.0 / 99.0));
        assert_eq!(pts[1].relative_px, 1.0);
        assert_eq!(pts[2].cumulative_volume, 15.0);
    }

    #[test]
    fn volume_cells_sum_per_price_and_touch_is_first_row() {
        let t = table();
        let v = volume_points(&t).unwrap();
        assert_eq!(v.cells.len(), 4);
        assert_eq!((v.cells[0].price, v.cells[0].size), (100.0, 10.0));
        assert_eq!((v.cells[2].price, v.cells[2].size), (99.5, 5.0));
        assert_eq!(v.touch.len(), 2);
        assert_eq!((v.touch[0].bid, v.touch[0].ask), (99.0, 101.0));
        assert_eq!(v.touch[1].at, t.datetimes("datetime").unwrap()[3]);

        // Row 0 twice: same instant and price collapse into one cell.
        let doubled = t.take(&[0, 0, 1]);
        let v = volume_points(&doubled).unwrap();
        assert_eq!(v.cells.len(), 2);
        assert_eq!(v.cells[0].size, 20.0);
        assert_eq!(v.cells[1], VolumeCell { at: v.touch[0].at, price: 101.0, size: 4.0 });
        assert_eq!(v.touch.len(), 1);
    }
}
