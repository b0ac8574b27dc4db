//! Local file persistence for the mean-reversion universe and statistics.

mod mean_cache;
mod ticker_file;

use std::path::PathBuf;

use thiserror::Error;

pub use mean_cache::{MeanCache, MeanMap};
pub use ticker_file::TickerFile;

/// Errors reading or writing local files.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem failure.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// File content was not valid JSON of the expected shape.
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}
