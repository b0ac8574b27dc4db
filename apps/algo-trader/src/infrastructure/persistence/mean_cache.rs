//! JSON cache of per-symbol mean rate of change.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use super::StorageError;

/// Symbol to mean rate of change, ordered by symbol.
pub type MeanMap = BTreeMap<String, f64>;

/// Mean cache stored as a flat JSON object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeanCache {
    path: PathBuf,
}

impl MeanCache {
    /// Wrap a path. Nothing is touched on disk.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the cache. A missing file is an empty cache.
    pub fn load(&self) -> Result<MeanMap, StorageError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No mean cache yet");
                return Ok(MeanMap::new());
            }
            Err(e) => return Err(StorageError::io(&self.path, e)),
        };

        serde_json::from_str(&contents).map_err(|e| StorageError::json(&self.path, e))
    }

    /// Replace the cache with `means`.
    pub fn store(&self, means: &MeanMap) -> Result<(), StorageError> {
        let mut buf = Vec::new();
        let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        means
            .serialize(&mut ser)
            .map_err(|e| StorageError::json(&self.path, e))?;
        buf.push(b'\n');

        fs::write(&self.path, buf).map_err(|e| StorageError::io(&self.path, e))?;
        tracing::debug!(path = %self.path.display(), count = means.len(), "Stored mean cache");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let cache = MeanCache::new(dir.path().join("means.json"));
        assert!(cache.load().unwrap().is_empty());
    }

    #[test]
    fn store_writes_sorted_pretty_json() {
        let dir = TempDir::new().unwrap();
        let cache = MeanCache::new(dir.path().join("means.json"));
        let mut means = MeanMap::new();
        means.insert("MSFT".to_string(), 0.5);
        means.insert("AAPL".to_string(), -0.25);

        cache.store(&means).unwrap();

        assert_eq!(
            fs::read_to_string(cache.path()).unwrap(),
            "{\n    \"AAPL\": -0.25,\n    \"MSFT\": 0.5\n}\n"
        );
        assert_eq!(cache.load().unwrap(), means);
    }

    #[test]
    fn corrupt_file_is_json_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("means.json");
        fs::write(&path, "not json").unwrap();

        let err = MeanCache::new(path).load().unwrap_err();
        assert!(matches!(err, StorageError::Json { .. }));
    }
}
