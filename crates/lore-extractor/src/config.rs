//! Configuration for the index builder and the extractor

use lore_domain::EmbeddingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Placeholder replaced by the character name in the retrieval query
pub const NAME_PLACEHOLDER: &str = "{name}";

/// File name of the snapshot inside `storage_dir`
pub const SNAPSHOT_FILE: &str = "index.sqlite3";

/// Pipeline configuration shared by the index builder and the extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Directory holding the `*.txt` stories
    pub stories_dir: PathBuf,

    /// Directory holding the index snapshot
    pub storage_dir: PathBuf,

    /// Number of documents retrieved per query
    pub top_k: usize,

    /// Minimum HNSW candidate list size at query time; search widens it to the corpus size
    pub ef_search: usize,

    /// Retrieval query; `{name}` is replaced by the character name
    pub query_template: String,

    /// Documents longer than this are indexed with a warning
    pub max_document_chars: usize,

    /// Embedding function used when building
    pub embedding: EmbeddingConfig,
}

impl ExtractorConfig {
    /// Path of the snapshot file
    pub fn snapshot_path(&self) -> PathBuf {
        self.storage_dir.join(SNAPSHOT_FILE)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.top_k == 0 {
            return Err("top_k must be greater than 0".to_string());
        }
        if self.ef_search < self.top_k {
            return Err(format!(
                "ef_search ({}) cannot be smaller than top_k ({})",
                self.ef_search, self.top_k
            ));
        }
        if !self.query_template.contains(NAME_PLACEHOLDER) {
            return Err(format!("query_template must contain {}", NAME_PLACEHOLDER));
        }
        if self.max_document_chars == 0 {
            return Err("max_document_chars must be greater than 0".to_string());
        }
        if self.embedding.model_name.trim().is_empty() {
            return Err("embedding.model_name must not be empty".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            stories_dir: PathBuf::from("stories"),
            storage_dir: PathBuf::from("story_embeddings"),
            top_k: 2,
            ef_search: 64,
            query_template: "Tell me about the character {name}".to_string(),
            max_document_chars: 20_000,
            embedding: EmbeddingConfig::default(),
        }
    }
}
