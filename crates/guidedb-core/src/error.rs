use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Bad chunking or engine parameters.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Vectors that should share a dimensionality do not.
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    EmbeddingDimension { expected: usize, actual: usize },

    #[error("Index not found: {}", .0.display())]
    IndexNotFound(PathBuf),

    #[error("Index is corrupt: {0}")]
    IndexCorrupt(String),

    /// Cosine similarity is undefined for a zero-norm vector.
    #[error("Cannot compare a zero-norm vector")]
    ZeroVector,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The embedding provider failed; callers may retry.
    #[error("Embedding provider failed: {0}")]
    Provider(String),

    /// The provider refused the request or answered with something unusable;
    /// repeating the call would fail the same way.
    #[error("Embedding provider rejected the request: {0}")]
    ProviderRejected(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether retrying the same call could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Provider(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
