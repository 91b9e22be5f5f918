//! Error types for fleet-output.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    /// The output directory could not be created.
    #[error("cannot create output directory {path}: {source}")]
    OutputDir {
        path:   PathBuf,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type OutputResult<T> = Result<T, OutputError>;

/// Create `dir` (and parents) if it does not exist yet.
pub(crate) fn ensure_dir(dir: &std::path::Path) -> OutputResult<()> {
    std::fs::create_dir_all(dir).map_err(|source| OutputError::OutputDir { path: dir.to_path_buf(), source })
}
