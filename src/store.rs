// src/store.rs
//! Data-access layer: picks the reader from the file extension and keeps an
//! on-disk cache of canonical tables keyed by the file's relative path.
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::config::Settings;
use crate::error::Result;
use crate::metrics::LoadMetrics;
use crate::reader::{DataReader, ReaderKind};
use crate::table::BookTable;

pub struct DataStore {
    settings: Settings,
    metrics: Arc<LoadMetrics>,
}

impl DataStore {
    pub fn new(settings: Settings) -> Self {
        Self::with_metrics(settings, Arc::new(LoadMetrics::new()))
    }

    pub fn with_metrics(settings: Settings, metrics: Arc<LoadMetrics>) -> Self {
        Self { settings, metrics }
    }

    #[inline]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[inline]
    pub fn metrics(&self) -> &Arc<LoadMetrics> {
        &self.metrics
    }

    /// Loads `file` (relative to the data directory). With `use_cache`, a
    /// previously written artifact is returned instead of re-parsing; a fresh
    /// parse always refreshes the artifact.
    pub fn load(&self, file: &Path, use_cache: bool) -> Result<BookTable> {
        let started = Instant::now();
        let res = self.load_inner(file, use_cache);
        self.metrics.record_load(started.elapsed());
        match &res {
            Ok(t) => self.metrics.record_rows(t.len()),
            Err(e) => {
                self.metrics.inc_error();
                warn!("load {:?} failed: {e}", file);
            }
        }
        res
    }

    fn load_inner(&self, file: &Path, use_cache: bool) -> Result<BookTable> {
        let reader = ReaderKind::from_path(file)?;

        let cache = self.settings.cache_path(file);
        fs::create_dir_all(cache.parent().unwrap_or(&self.settings.cache_dir))?;

        if use_cache && cache.exists() {
            let t = reader.deserialize(&cache)?;
            self.metrics.inc_cache_hit();
            info!("cache: {:?} rows={} from {:?}", file, t.len(), cache);
            return Ok(t);
        }

        let source = self.settings.source_path(file);
        let t = reader.load(&source)?;
        info!("load: {:?} reader={reader:?} rows={} cols={}", source, t.len(), t.width());
        reader.serialize(&t, &cache)?;
        Ok(t)
    }
}
