// src/main.rs
use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser as ClapParser, Subcommand, ValueEnum};
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    ops::RangeInclusive,
    path::{Path, PathBuf},
};
use tracing::info;

use book_reader::{
    config::{Settings, DEFAULT_CACHE_DIR, DEFAULT_DATA_DIR},
    filter::{self, Selection},
    generate,
    store::DataStore,
    table::BookTable,
    views::DATA_TABLE_COLUMNS,
};

#[derive(ClapParser, Debug)]
#[command(name = "book-reader", version)]
struct Cli {
    /// Directory source files are resolved against.
    #[arg(long, global = true, env = "BOOK_READER_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,
    /// Directory cache artifacts are written to.
    #[arg(long, global = true, env = "BOOK_READER_CACHE_DIR", default_value = DEFAULT_CACHE_DIR)]
    cache_dir: PathBuf,
    /// Print load metrics (Prometheus text) to stderr before exiting.
    #[arg(long, global = true, default_value_t = false)]
    metrics: bool,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Row count, columns, date span and instruments of one file.
    Summary {
        #[arg(long)]
        file: PathBuf,
        #[arg(long, default_value_t = false)]
        use_cache: bool,
    },
    /// Filtered data table as CSV.
    Table {
        #[arg(long)]
        file: PathBuf,
        #[arg(long, default_value_t = false)]
        use_cache: bool,
        /// YYYY-MM-DD
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        msuk: Option<i64>,
        /// Inclusive range, e.g. 6-10
        #[arg(long, value_parser = parse_range)]
        hour: Option<RangeInclusive<i64>>,
        #[arg(long, value_parser = parse_range)]
        minute: Option<RangeInclusive<i64>>,
        #[arg(long, value_parser = parse_range)]
        second: Option<RangeInclusive<i64>>,
        #[arg(long, value_parser = parse_range)]
        microsecond: Option<RangeInclusive<i64>>,
        /// Maximum rows written; 0 means all.
        #[arg(long, default_value_t = 0)]
        limit: usize,
        /// Output path; stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Write a synthetic source file.
    Generate {
        #[arg(long, value_enum)]
        format: Format,
        #[arg(long, default_value_t = 1_000)]
        rows: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Top,
    Line,
}

fn parse_range(s: &str) -> Result<RangeInclusive<i64>, String> {
    let (lo, hi) = s
        .split_once('-')
        .ok_or_else(|| format!("expected LO-HI, got {s:?}"))?;
    let lo: i64 = lo.trim().parse().map_err(|e| format!("{lo:?}: {e}"))?;
    let hi: i64 = hi.trim().parse().map_err(|e| format!("{hi:?}: {e}"))?;
    Ok(lo..=hi)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let store = DataStore::new(Settings::new(cli.data_dir, cli.cache_dir));

    let res = match cli.cmd {
        Cmd::Summary { file, use_cache } => summary(&store, &file, use_cache),
        Cmd::Table {
            file,
            use_cache,
            date,
            msuk,
            hour,
            minute,
            second,
            microsecond,
            limit,
            out,
        } => {
            let sel = Selection {
                date,
                msuk,
                hour,
                minute,
                second,
                microsecond,
            };
            table(&store, &file, use_cache, &sel, limit, out.as_deref())
        }
        Cmd::Generate {
            format,
            rows,
            seed,
            out,
        } => generate_file(format, rows, seed, &out),
    };

    if cli.metrics {
        eprint!("{}", store.metrics().prometheus_text());
    }
    res
}

fn summary(store: &DataStore, file: &Path, use_cache: bool) -> Result<()> {
    let t = store
        .load(file, use_cache)
        .with_context(|| format!("load {:?}", file))?;

    let dates = filter::dates(&t)?;
    let msuks = filter::msuks(&t)?;
    let span = t.datetimes("datetime")?;

    println!("rows={}", t.len());
    println!("columns={}", t.names().collect::<Vec<_>>().join(","));
    println!(
        "dates={}",
        dates.iter().map(|d| d.to_string()).collect::<Vec<_>>().join(",")
    );
    println!(
        "msuks={}",
        msuks.iter().map(|m| m.to_string()).collect::<Vec<_>>().join(",")
    );
    if let (Some(first), Some(last)) = (span.iter().min(), span.iter().max()) {
        println!("first={first}");
        println!("last={last}");
    }
    Ok(())
}

fn table(
    store: &DataStore,
    file: &Path,
    use_cache: bool,
    sel: &Selection,
    limit: usize,
    out: Option<&Path>,
) -> Result<()> {
    if let Some(name) = sel.out_of_domain() {
        bail!("--{name} range is outside its domain");
    }

    let t = store
        .load(file, use_cache)
        .with_context(|| format!("load {:?}", file))?;
    let view = sel.apply(&t)?;
    info!("table: {} of {} rows selected", view.len(), t.len());

    match out {
        Some(p) => {
            let f = File::create(p).with_context(|| format!("create {:?}", p))?;
            write_table(BufWriter::new(f), &view, limit)?;
            info!("wrote data table to {:?}", p);
        }
        None => write_table(io::stdout().lock(), &view, limit)?,
    }
    Ok(())
}

fn write_table<W: Write>(w: W, t: &BookTable, limit: usize) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(w);
    wtr.write_record(DATA_TABLE_COLUMNS)?;

    let cols = DATA_TABLE_COLUMNS
        .iter()
        .map(|c| t.column(c).ok_or_else(|| anyhow!("table has no `{c}` column")))
        .collect::<Result<Vec<_>>>()?;

    let n = if limit == 0 { t.len() } else { limit.min(t.len()) };
    for row in 0..n {
        wtr.write_record(cols.iter().map(|c| {
            c.get(row).map(|v| v.to_string()).unwrap_or_default()
        }))?;
    }
    wtr.flush()?;
    Ok(())
}

fn generate_file(format: Format, rows: usize, seed: u64, out: &Path) -> Result<()> {
    let quotes = generate::quotes(rows, seed);
    let f = File::create(out).with_context(|| format!("create {:?}", out))?;
    let w = BufWriter::new(f);
    match format {
        Format::Top => generate::write_top(w, &quotes)?,
        Format::Line => generate::write_lines(w, &quotes)?,
    }
    info!("generated {rows} {format:?} rows into {:?}", out);
    Ok(())
}
