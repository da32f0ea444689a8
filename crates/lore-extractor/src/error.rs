//! Error types for the Extractor

use lore_store::{EmbeddingError, StoreError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building an index or extracting a record
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Stories directory does not exist
    #[error("Stories directory not found: {}", .0.display())]
    StoriesNotFound(PathBuf),

    /// Stories directory holds no eligible documents
    #[error("No stories found in {}", .0.display())]
    NoStories(PathBuf),

    /// No index has been built yet
    #[error("Index snapshot not found at {}; build the index first", .0.display())]
    SnapshotNotFound(PathBuf),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller supplied an unusable argument
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Embedding provider error
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Model answered with something that is not a valid record
    #[error("Invalid record format: {0}")]
    InvalidFormat(String),

    /// Vector store error
    #[error("Store error: {0}")]
    Store(StoreError),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractorError {
    /// Whether the failure means something must be set up first
    pub fn is_configuration_missing(&self) -> bool {
        matches!(
            self,
            Self::StoriesNotFound(_) | Self::NoStories(_) | Self::SnapshotNotFound(_) | Self::Config(_)
        )
    }

    /// Whether the failure came from an embedding or generation provider
    pub fn is_provider_error(&self) -> bool {
        matches!(self, Self::Embedding(_) | Self::Llm(_) | Self::InvalidFormat(_))
    }
}

impl From<StoreError> for ExtractorError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::SnapshotNotFound(path) => Self::SnapshotNotFound(path),
            StoreError::Embedding(inner) => Self::Embedding(inner),
            StoreError::Io(inner) => Self::Io(inner),
            other => Self::Store(other),
        }
    }
}
