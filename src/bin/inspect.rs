use std::{collections::HashSet, path::PathBuf};

use anyhow::{Context, Result};
use book_reader::reader::{DataReader, ReaderKind};

fn main() -> Result<()> {
    let path: PathBuf = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/data_lines.data"));

    let kind = ReaderKind::from_path(&path)?;
    let t = kind.load(&path).with_context(|| format!("load {:?}", path))?;

    let insts: HashSet<i64> = t.ints("msuk")?.iter().copied().collect();
    let mut buys = 0u64;
    let mut sells = 0u64;
    let mut quotes = 0u64;
    for d in t.strs("direction")? {
        match d.as_str() {
            "Buy" => buys += 1,
            "Sell" => sells += 1,
            _ => quotes += 1,
        }
    }

    println!("reader={kind:?}");
    println!("rows={}", t.len());
    println!("unique_instruments={}", insts.len());
    println!("buy={buys}");
    println!("sell={sells}");
    println!("quote={quotes}");
    Ok(())
}
