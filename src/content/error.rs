//! Content resolution errors

use std::path::PathBuf;
use thiserror::Error;

use super::Category;

/// Errors raised while resolving content files
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("{category} entry {identifier:?} not found at {path:?}")]
    NotFound {
        category: Category,
        identifier: String,
        path: PathBuf,
    },

    #[error("failed to parse front-matter in {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("front-matter in {path:?} has no title")]
    MissingTitle { path: PathBuf },

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ContentError {
    /// Whether this error means the requested entry does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, ContentError::NotFound { .. })
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ContentError::Io {
            path: path.into(),
            source,
        }
    }
}
