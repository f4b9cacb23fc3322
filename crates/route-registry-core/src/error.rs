//! Error taxonomy shared by the scanner, the artifact loader, and the
//! vector store.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RegistryError>;

#[derive(Error, Debug)]
pub enum RegistryError {
    /// The filesystem could not be read or written.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A route entry file or a persisted artifact does not exist.
    #[error("{what} not found: {key}")]
    NotFound { what: &'static str, key: String },

    /// An entry file is not syntactically analyzable, or an artifact is
    /// not valid registry JSON.
    #[error("Failed to parse '{}': {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    /// The vectorizer could not produce an embedding.
    #[error("Embedding failed ({model}): {reason}")]
    Embedding { model: String, reason: String },

    /// A caller mixed vectors of different dimensionality.
    #[error("Dimension mismatch: store uses {expected} dims, query has {actual}")]
    Usage { expected: usize, actual: usize },
}

impl RegistryError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn embedding(model: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Embedding {
            model: model.into(),
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
