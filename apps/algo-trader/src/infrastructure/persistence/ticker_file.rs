//! Plain-text ticker list, one symbol per line.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::StorageError;

/// Universe file for the mean-reversion strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerFile {
    path: PathBuf,
}

impl TickerFile {
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

    /// Whether the file is present.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Append each symbol on its own line, creating the file if needed.
    ///
    /// Writes are not atomic; an interrupted run can leave a partial file.
    pub fn bootstrap<S: AsRef<str>>(&self, symbols: &[S]) -> Result<(), StorageError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StorageError::io(&self.path, e))?;

        for symbol in symbols {
            writeln!(file, "{}", symbol.as_ref()).map_err(|e| StorageError::io(&self.path, e))?;
        }

        tracing::info!(path = %self.path.display(), count = symbols.len(), "Wrote ticker file");
        Ok(())
    }

    /// Read the symbols, trimming each line and dropping blank ones.
    pub fn read(&self) -> Result<Vec<String>, StorageError> {
        let contents =
            fs::read_to_string(&self.path).map_err(|e| StorageError::io(&self.path, e))?;

        Ok(contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn bootstrap_then_read_preserves_order() {
        let dir = TempDir::new().unwrap();
        let file = TickerFile::new(dir.path().join("tickers.txt"));
        assert!(!file.exists());

        file.bootstrap(&["TSLA", "ROKU", "COIN"]).unwrap();

        assert!(file.exists());
        assert_eq!(fs::read_to_string(file.path()).unwrap(), "TSLA\nROKU\nCOIN\n");
        assert_eq!(file.read().unwrap(), vec!["TSLA", "ROKU", "COIN"]);
    }

    #[test]
    fn bootstrap_appends_to_existing_file() {
        let dir = TempDir::new().unwrap();
        let file = TickerFile::new(dir.path().join("tickers.txt"));
        file.bootstrap(&["AAPL"]).unwrap();
        file.bootstrap(&["MSFT"]).unwrap();
        assert_eq!(file.read().unwrap(), vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn read_trims_and_skips_blank_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tickers.txt");
        fs::write(&path, "  AAPL \r\n\nMSFT\n   \n").unwrap();

        assert_eq!(TickerFile::new(path).read().unwrap(), vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn empty_file_is_empty_universe() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tickers.txt");
        fs::write(&path, "").unwrap();

        assert!(TickerFile::new(path).read().unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = TickerFile::new(dir.path().join("absent.txt"))
            .read()
            .unwrap_err();
        assert!(matches!(err, StorageError::Io { .. }));
    }
}
