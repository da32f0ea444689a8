//! Embedding configuration - the identity of an embedding function
//!
//! The configuration is recorded next to every index snapshot and read back
//! verbatim at query time. Query embeddings are only comparable to indexed
//! embeddings when both were produced under an equal configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Default embedding model
pub const DEFAULT_EMBEDDING_MODEL: &str = "google/embeddinggemma-300m";

/// Runtime hint naming the device the model runs on
pub const DEVICE_KEY: &str = "device";

/// Encode hint controlling L2 normalization of output vectors
pub const NORMALIZE_KEY: &str = "normalize_embeddings";

/// Which embedding implementation produces the vectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Hosted Hugging Face inference (feature extraction)
    HuggingFace,
    /// Offline feature-hashing embeddings
    Hashing,
}

impl fmt::Display for EmbeddingBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbeddingBackend::HuggingFace => write!(f, "huggingface"),
            EmbeddingBackend::Hashing => write!(f, "hashing"),
        }
    }
}

impl FromStr for EmbeddingBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "huggingface" => Ok(EmbeddingBackend::HuggingFace),
            "hashing" => Ok(EmbeddingBackend::Hashing),
            other => Err(format!("Unknown embedding backend: {}", other)),
        }
    }
}

/// Parameters that identify an embedding function
///
/// Secrets are never part of the configuration; they are supplied at
/// construction time by whoever builds the embedder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Embedding implementation
    #[serde(default = "default_backend")]
    pub backend: EmbeddingBackend,

    /// Model identifier
    #[serde(default = "default_model_name")]
    pub model_name: String,

    /// Runtime hints (e.g. `device = "cpu"`)
    #[serde(default = "default_model_kwargs")]
    pub model_kwargs: BTreeMap<String, String>,

    /// Encode-time hints (e.g. `normalize_embeddings = "true"`)
    #[serde(default = "default_encode_kwargs")]
    pub encode_kwargs: BTreeMap<String, String>,
}

impl EmbeddingConfig {
    /// Configuration for the offline hashing backend
    pub fn hashing(dimension: usize) -> Self {
        let mut model_kwargs = BTreeMap::new();
        model_kwargs.insert("dimension".to_string(), dimension.to_string());
        Self {
            backend: EmbeddingBackend::Hashing,
            model_name: "feature-hashing".to_string(),
            model_kwargs,
            encode_kwargs: default_encode_kwargs(),
        }
    }

    /// Whether output vectors should be L2-normalized
    pub fn normalize_embeddings(&self) -> bool {
        self.encode_kwargs
            .get(NORMALIZE_KEY)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    /// Device hint, if any
    pub fn device(&self) -> Option<&str> {
        self.model_kwargs.get(DEVICE_KEY).map(String::as_str)
    }

    /// Parse a runtime hint as a number
    pub fn model_kwarg_usize(&self, key: &str) -> Option<usize> {
        self.model_kwargs.get(key).and_then(|v| v.parse().ok())
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            model_name: default_model_name(),
            model_kwargs: default_model_kwargs(),
            encode_kwargs: default_encode_kwargs(),
        }
    }
}

fn default_backend() -> EmbeddingBackend {
    EmbeddingBackend::HuggingFace
}

fn default_model_name() -> String {
    DEFAULT_EMBEDDING_MODEL.to_string()
}

fn default_model_kwargs() -> BTreeMap<String, String> {
    let mut kwargs = BTreeMap::new();
    kwargs.insert(DEVICE_KEY.to_string(), "cpu".to_string());
    kwargs
}

fn default_encode_kwargs() -> BTreeMap<String, String> {
    let mut kwargs = BTreeMap::new();
    kwargs.insert(NORMALIZE_KEY.to_string(), "true".to_string());
    kwargs
}
