// tests/golden_smoke.rs
use std::process::Command;

const LINES: &str = "\
EUREX Modify CAU19(79889147) Buy 150@82.55 (new qty/price) lvl=6 src=2019-08-07 01:14:22.433700419 CDT our=2019-08-07 01:14:22.433706420 CDT flags= seq=227633875336 bid:200@82.50 ask:180@82.60 cbid:200@82.50 cask:180@82.60
EUREX Modify CAU19(79889147) Sell 20@82.50 (new qty/price) lvl=6 src=2019-08-07 06:30:00.000000001 CDT our=2019-08-07 06:30:00.000000002 CDT flags= seq=227633875337 bid:180@82.50 ask:180@82.60 cbid:180@82.50 cask:180@82.60
";

fn exe() -> &'static str {
    env!("CARGO_BIN_EXE_book-reader")
}

#[test]
fn golden_smoke_summary_and_table() {
    let tmp = tempfile::tempdir().unwrap();
    let data = tmp.path().join("data");
    let cache = tmp.path().join("cache");
    std::fs::create_dir(&data).unwrap();
    std::fs::write(data.join("lines.data"), LINES).unwrap();

    let out = Command::new(exe())
        .args(["--data-dir", data.to_str().unwrap()])
        .args(["--cache-dir", cache.to_str().unwrap()])
        .args(["summary", "--file", "lines.data"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let text = String::from_utf8(out.stdout).unwrap();
    assert!(text.contains("rows=2\n"));
    assert!(text.contains("msuks=79889147\n"));
    assert!(text.contains("dates=2019-08-07\n"));
    assert!(cache.join("lines.json").exists());

    let table_path = tmp.path().join("table.csv");
    let status = Command::new(exe())
        .args(["--data-dir", data.to_str().unwrap()])
        .args(["--cache-dir", cache.to_str().unwrap()])
        .args([
            "table",
            "--file",
            "lines.data",
            "--use-cache",
            "--date",
            "2019-08-07",
            "--hour",
            "6-10",
            "--out",
            table_path.to_str().unwrap(),
        ])
        .status()
        .unwrap();
    assert!(status.success());

    let csv = std::fs::read_to_string(&table_path).unwrap();
    let mut rows = csv.lines();
    assert_eq!(
        rows.next(),
        Some("time,date,bidSz,bidPx,askPx,askSz,tradePx,tradeSz,direction")
    );
    let row = rows.next().unwrap();
    assert!(row.starts_with("06:30:00.000000002,2019-08-07,180,82.5,82.6,180,82.5,20,Sell"));
    assert_eq!(rows.next(), None);
}

#[test]
fn golden_smoke_generate_then_load_top() {
    let tmp = tempfile::tempdir().unwrap();
    let top = tmp.path().join("top.csv");

    let status = Command::new(exe())
        .args(["generate", "--format", "top", "--rows", "25", "--seed", "3"])
        .args(["--out", top.to_str().unwrap()])
        .status()
        .unwrap();
    assert!(status.success());

    let out = Command::new(env!("CARGO_BIN_EXE_inspect"))
        .arg(&top)
        .output()
        .unwrap();
    assert!(out.status.success());
    let text = String::from_utf8(out.stdout).unwrap();
    assert!(text.contains("reader=Top\n"));
    assert!(text.contains("rows=25\n"));
    assert!(text.contains("unique_instruments=1\n"));
    assert!(text.contains("quote=25\n"));
}

#[test]
fn golden_smoke_malformed_line_fails() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("bad.data"), format!("{LINES}garbage\n")).unwrap();

    let out = Command::new(exe())
        .args(["--data-dir", tmp.path().to_str().unwrap()])
        .args(["--cache-dir", tmp.path().join("cache").to_str().unwrap()])
        .args(["summary", "--file", "bad.data"])
        .output()
        .unwrap();
    assert!(!out.status.success());
    let err = String::from_utf8_lossy(&out.stderr);
    assert!(err.contains("line number `3`"));
}
