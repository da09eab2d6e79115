// src/metrics.rs
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Default)]
pub struct LoadMetrics {
    pub files_total: AtomicU64,
    pub rows_total: AtomicU64,
    pub cache_hits: AtomicU64,
    pub load_errors: AtomicU64,

    // load latency buckets in ms
    pub load_lat_b0: AtomicU64,
    pub load_lat_b1: AtomicU64,
    pub load_lat_b2: AtomicU64,
    pub load_lat_b3: AtomicU64,
    pub load_lat_b4: AtomicU64,
}

impl LoadMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_rows(&self, rows: usize) {
        self.files_total.fetch_add(1, Ordering::Relaxed);
        self.rows_total.fetch_add(rows as u64, Ordering::Relaxed);
    }
    #[inline]
    pub fn inc_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }
    #[inline]
    pub fn inc_error(&self) {
        self.load_errors.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_load(&self, dur: Duration) {
        let ms = dur.as_millis();
        // buckets: <10ms, <100ms, <1s, <10s, >=10s
        if ms < 10 {
            self.load_lat_b0.fetch_add(1, Ordering::Relaxed);
        } else if ms < 100 {
            self.load_lat_b1.fetch_add(1, Ordering::Relaxed);
        } else if ms < 1_000 {
            self.load_lat_b2.fetch_add(1, Ordering::Relaxed);
        } else if ms < 10_000 {
            self.load_lat_b3.fetch_add(1, Ordering::Relaxed);
        } else {
            self.load_lat_b4.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn prometheus_text(&self) -> String {
        let files = self.files_total.load(Ordering::Relaxed);
        let rows = self.rows_total.load(Ordering::Relaxed);
        let hits = self.cache_hits.load(Ordering::Relaxed);
        let errs = self.load_errors.load(Ordering::Relaxed);

        let b0 = self.load_lat_b0.load(Ordering::Relaxed);
        let b1 = self.load_lat_b1.load(Ordering::Relaxed);
        let b2 = self.load_lat_b2.load(Ordering::Relaxed);
        let b3 = self.load_lat_b3.load(Ordering::Relaxed);
        let b4 = self.load_lat_b4.load(Ordering::Relaxed);

        format!(
            "\
# TYPE book_reader_files_loaded_total counter
book_reader_files_loaded_total {files}
# TYPE book_reader_rows_loaded_total counter
book_reader_rows_loaded_total {rows}
# TYPE book_reader_cache_hits_total counter
book_reader_cache_hits_total {hits}
# TYPE book_reader_load_errors_total counter
book_reader_load_errors_total {errs}
# TYPE book_reader_load_latency_bucket counter
book_reader_load_latency_bucket{{le=\"10\"}} {b0}
book_reader_load_latency_bucket{{le=\"100\"}} {b1}
book_reader_load_latency_bucket{{le=\"1000\"}} {b2}
book_reader_load_latency_bucket{{le=\"10000\"}} {b3}
book_reader_load_latency_bucket{{le=\"+Inf\"}} {b4}
"
        )
    }
}
