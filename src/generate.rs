// src/generate.rs
//! Seeded synthetic data in both source formats, for demos and tests.
use std::io::Write;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::Result;
use crate::time::datetime_from_nanos;
use crate::top::TOP_COLUMNS;

pub const START_NANOS: i64 = 1_565_157_926_599_450_000;
pub const MSUK: i64 = 79_889_147;
pub const SOURCE: &str = "EUREX";
const START_PX: f64 = 82.2;
const SEQ_NUM: i64 = 597_283;

/// One synthetic top-of-book snapshot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quote {
    pub nanos: i64,
    pub bid_px: f64,
    pub bid_sz: i64,
    pub ask_px: f64,
    pub ask_sz: i64,
}

/// Random walk of `n` quotes: ~0.5 ms apart, ask above bid, sizes near 100.
pub fn quotes(n: usize, seed: u64) -> Vec<Quote> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut nanos = START_NANOS;
    let mut log_px = 0.0f64;
    let mut out = Vec::with_capacity(n);

    for _ in 0..n {
        nanos += rng.gen_range(400..=600) * 1_000;
        log_px += rng.gen_range(-0.01..0.0102);
        let bid_px = round_to(START_PX * log_px.exp(), 3);
        let ask_px = round_to(bid_px + rng.gen_range(0.01..0.05), 2).max(bid_px);
        out.push(Quote {
            nanos,
            bid_px,
            bid_sz: rng.gen_range(80..=120),
            ask_px,
            ask_sz: rng.gen_range(80..=120),
        });
    }
    out
}

fn round_to(x: f64, decimals: i32) -> f64 {
    let k = 10f64.powi(decimals);
    (x * k).round() / k
}

/// Writes a `.csv` top-of-book file with the full header.
pub fn write_top<W: Write>(w: W, quotes: &[Quote]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(w);
    wtr.write_record(TOP_COLUMNS)?;
    for (i, q) in quotes.iter().enumerate() {
        let time = datetime_from_nanos(q.nanos).to_string();
        wtr.write_record([
            q.nanos.to_string(),
            time,
            MSUK.to_string(),
            SOURCE.to_string(),
            q.bid_px.to_string(),
            q.bid_sz.to_string(),
            q.ask_px.to_string(),
            q.ask_sz.to_string(),
            q.bid_px.to_string(),
            q.bid_sz.to_string(),
            q.ask_px.to_string(),
            q.ask_sz.to_string(),
            "0".to_string(),
            "0".to_string(),
            "0".to_string(),
            SEQ_NUM.to_string(),
            i.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes a `.data` line file; each quote becomes one trade, buys on even
/// rows at the ask and sells on odd rows at the bid.
pub fn write_lines<W: Write>(mut w: W, quotes: &[Quote]) -> Result<()> {
    for (i, q) in quotes.iter().enumerate() {
        let (direction, px, sz) = if i % 2 == 0 {
            ("Buy", q.ask_px, q.ask_sz / 2)
        } else {
            ("Sell", q.bid_px, q.bid_sz / 2)
        };
        let at = datetime_from_nanos(q.nanos);
        writeln!(
            w,
            "{SOURCE} Modify CAU19({MSUK}) {direction} {sz}@{px} (new qty/price) lvl=1 \
             src={at} CDT our={at} CDT flags= seq={seq} \
             bid:{bs}@{bp} ask:{as_}@{ap} cbid:{bs}@{bp} cask:{as_}@{ap}",
            seq = SEQ_NUM + i as i64,
            bs = q.bid_sz,
            bp = q.bid_px,
            as_ = q.ask_sz,
            ap = q.ask_px,
        )?;
    }
    w.flush()?;
    Ok(())
}
