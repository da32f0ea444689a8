//! Index builder: stories directory to persisted snapshot

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::loader::load_stories;
use lore_store::{EmbedderFactory, StoryIndex};
use std::path::PathBuf;
use tracing::info;

/// Outcome of a successful build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    /// Number of indexed documents
    pub documents: usize,

    /// Embedding dimension
    pub dimension: usize,

    /// Where the snapshot was written
    pub snapshot_path: PathBuf,
}

/// Builds a fresh [`StoryIndex`] from the stories directory and saves it
///
/// Every build is a full rebuild that replaces the previous snapshot.
pub struct IndexBuilder<F: EmbedderFactory> {
    config: ExtractorConfig,
    factory: F,
}

impl<F: EmbedderFactory> IndexBuilder<F> {
    /// Create a builder
    pub fn new(config: ExtractorConfig, factory: F) -> Self {
        Self { config, factory }
    }

    /// Configuration in use
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Load, embed, index and persist the stories
    pub fn build(&self) -> Result<BuildSummary, ExtractorError> {
        self.config.validate().map_err(ExtractorError::Config)?;

        let documents = load_stories(&self.config.stories_dir, self.config.max_document_chars)?;
        info!(
            "Loaded {} stories from {}",
            documents.len(),
            self.config.stories_dir.display()
        );

        let embedder = self.factory.create(&self.config.embedding)?;
        let index = StoryIndex::from_documents(documents, embedder.as_ref())?;

        let snapshot_path = self.config.snapshot_path();
        index.save(&snapshot_path, &self.config.embedding)?;

        Ok(BuildSummary {
            documents: index.len(),
            dimension: index.dimension(),
            snapshot_path,
        })
    }
}
