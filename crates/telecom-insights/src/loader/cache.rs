//! Explicit memoization of loaded datasets.

use super::DatasetLoader;
use crate::error::Result;
use parking_lot::Mutex;
use polars::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// Identity of a dataset file's contents: byte length plus modification time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceFingerprint {
    len: u64,
    modified: Option<SystemTime>,
}

impl SourceFingerprint {
    /// Read the fingerprint of the file at `path`.
    pub fn of(path: &Path) -> Result<Self> {
        let meta = std::fs::metadata(path)?;
        Ok(Self {
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

struct CachedDataset {
    fingerprint: SourceFingerprint,
    df: DataFrame,
}

/// Per-path cache of loaded tables.
///
/// An entry is reused only while the file's [`SourceFingerprint`] is
/// unchanged; otherwise the table is reloaded and the entry replaced.
/// Entries can also be dropped explicitly with [`DatasetCache::invalidate`].
#[derive(Default)]
pub struct DatasetCache {
    entries: Mutex<HashMap<PathBuf, CachedDataset>>,
}

static_assertions::assert_impl_all!(DatasetCache: Send, Sync);

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for `path`, loading it if absent or stale.
    pub fn get_or_load(&self, loader: &dyn DatasetLoader, path: &Path) -> Result<DataFrame> {
        let fingerprint = SourceFingerprint::of(path)?;

        {
            let entries = self.entries.lock();
            if let Some(entry) = entries.get(path)
                && entry.fingerprint == fingerprint
            {
                debug!("Dataset cache hit: {}", path.display());
                return Ok(entry.df.clone());
            }
        }

        debug!("Dataset cache miss: {}", path.display());
        let df = loader.load(path)?;
        self.entries.lock().insert(
            path.to_path_buf(),
            CachedDataset {
                fingerprint,
                df: df.clone(),
            },
        );
        Ok(df)
    }

    /// Drop the entry for `path`. Returns whether an entry existed.
    pub fn invalidate(&self, path: &Path) -> bool {
        self.entries.lock().remove(path).is_some()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::CsvLoader;
    use crate::loader::tests::temp_csv;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingLoader {
        inner: CsvLoader,
        loads: AtomicUsize,
    }

    impl CountingLoader {
        fn new() -> Self {
            Self {
                inner: CsvLoader::new(),
                loads: AtomicUsize::new(0),
            }
        }

        fn loads(&self) -> usize {
            self.loads.load(Ordering::SeqCst)
        }
    }

    impl DatasetLoader for CountingLoader {
        fn load(&self, path: &Path) -> Result<DataFrame> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.inner.load(path)
        }
    }

    #[test]
    fn test_second_call_is_cache_hit() {
        let path = temp_csv("cache-hit", "CustomerID\nC1\nC2\n");
        let cache = DatasetCache::new();
        let loader = CountingLoader::new();

        let first = cache.get_or_load(&loader, &path).unwrap();
        let second = cache.get_or_load(&loader, &path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loader.loads(), 1);
        assert_eq!(cache.len(), 1);
        assert!(first.equals(&second));
    }

    #[test]
    fn test_changed_file_is_reloaded() {
        let path = temp_csv("cache-change", "CustomerID\nC1\n");
        let cache = DatasetCache::new();
        let loader = CountingLoader::new();

        let before = cache.get_or_load(&loader, &path).unwrap();
        std::fs::write(&path, "CustomerID\nC1\nC2\nC3\n").unwrap();
        let after = cache.get_or_load(&loader, &path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loader.loads(), 2);
        assert_eq!(before.height(), 1);
        assert_eq!(after.height(), 3);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalidate_forces_reload() {
        let path = temp_csv("cache-invalidate", "CustomerID\nC1\n");
        let cache = DatasetCache::new();
        let loader = CountingLoader::new();

        cache.get_or_load(&loader, &path).unwrap();
        assert!(cache.invalidate(&path));
        assert!(!cache.invalidate(&path));
        cache.get_or_load(&loader, &path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loader.loads(), 2);
    }

    #[test]
    fn test_clear() {
        let path = temp_csv("cache-clear", "CustomerID\nC1\n");
        let cache = DatasetCache::new();

        cache.get_or_load(&CsvLoader::new(), &path).unwrap();
        std::fs::remove_file(&path).ok();
        assert!(!cache.is_empty());

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_missing_file_not_cached() {
        let cache = DatasetCache::new();
        let result = cache.get_or_load(&CsvLoader::new(), Path::new("/nonexistent/data.csv"));

        assert!(result.is_err());
        assert!(cache.is_empty());
    }
}
