//! Lore Storage Layer
//!
//! Embedding providers, the HNSW vector index and the persisted story index.
//!
//! # Architecture
//!
//! - [`embedding`]: the `EmbeddingModel` capability, an offline hashing model
//!   and the factory that rebuilds an embedder from a recorded configuration
//! - [`huggingface`]: hosted feature-extraction embeddings
//! - [`vector_index`]: in-memory HNSW nearest-neighbor search
//! - [`StoryIndex`]: documents + vectors + index, saved to and restored from a
//!   single SQLite snapshot together with the embedding configuration
//!
//! # Examples
//!
//! ```no_run
//! use lore_domain::{Document, EmbeddingConfig};
//! use lore_store::{HashingEmbeddingModel, StoryIndex};
//!
//! let embedder = HashingEmbeddingModel::new(256);
//! let docs = vec![Document::new("Mira keeps the lighthouse.", "stories/harbor.txt")];
//! let index = StoryIndex::from_documents(docs, &embedder).unwrap();
//! index.save("story_embeddings/index.sqlite3".as_ref(), &EmbeddingConfig::hashing(256)).unwrap();
//! ```

#![warn(missing_docs)]

pub mod embedding;
pub mod huggingface;
mod snapshot;
mod story_index;
pub mod vector_index;

use std::path::PathBuf;
use thiserror::Error;

pub use embedding::{
    cosine_similarity, normalize, DefaultEmbedderFactory, EmbedderFactory, EmbeddingError,
    EmbeddingModel, HashingEmbeddingModel,
};
pub use huggingface::HuggingFaceEmbedder;
pub use story_index::{ScoredDocument, StoryIndex};
pub use vector_index::{VectorIndex, VectorIndexError};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No snapshot has been written at the given path
    #[error("Index snapshot not found at {}", .0.display())]
    SnapshotNotFound(PathBuf),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Vector index error
    #[error("Vector index error: {0}")]
    Index(#[from] VectorIndexError),

    /// Embedding error
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),
}
