// src/config.rs
use std::path::{Component, Path, PathBuf};

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_CACHE_DIR: &str = "cache";

/// Where source files live and where cache artifacts are written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub cache_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
        }
    }
}

impl Settings {
    pub fn new(data_dir: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            cache_dir: cache_dir.into(),
        }
    }

    #[inline]
    pub fn source_path(&self, file: &Path) -> PathBuf {
        self.data_dir.join(file)
    }

    /// `<cache_dir>/<file without extension>.json`. The relative directory of
    /// `file` is part of the key; root and `..` components are dropped so the
    /// artifact always lands under `cache_dir`.
    pub fn cache_path(&self, file: &Path) -> PathBuf {
        let rel: PathBuf = file
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part),
                _ => None,
            })
            .collect();
        self.cache_dir.join(rel.with_extension("json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_keeps_the_relative_directory() {
        let s = Settings::new("/srv/data", "/tmp/cache");
        assert_eq!(s.source_path(Path::new("top.csv")), PathBuf::from("/srv/data/top.csv"));
        assert_eq!(s.cache_path(Path::new("top.csv")), PathBuf::from("/tmp/cache/top.json"));
        assert_eq!(
            s.cache_path(Path::new("lines.big.data")),
            PathBuf::from("/tmp/cache/lines.big.json")
        );
        assert_ne!(s.cache_path(Path::new("a/x.csv")), s.cache_path(Path::new("b/x.csv")));
        assert_eq!(s.cache_path(Path::new("a/x.csv")), PathBuf::from("/tmp/cache/a/x.json"));
        assert_eq!(
            s.cache_path(Path::new("/abs/../x.data")),
            PathBuf::from("/tmp/cache/abs/x.json")
        );
    }
}
