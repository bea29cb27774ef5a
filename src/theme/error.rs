use std::path::PathBuf;
use thiserror::Error;

/// Errors from theme persistence
#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("invalid theme mode {0:?}, expected \"light\" or \"dark\"")]
    InvalidMode(String),

    #[error("theme storage {path:?}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("theme storage is not valid JSON: {0}")]
    Serialize(#[from] serde_json::Error),
}
