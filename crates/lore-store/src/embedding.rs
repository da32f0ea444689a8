//! Embedding Models for Text Vectorization
//!
//! This module provides text-to-vector conversion for semantic search.
//!
//! # Architecture
//!
//! - **EmbeddingModel**: the capability the index and extractor depend on
//! - **HashingEmbeddingModel**: offline feature-hashing embeddings
//! - **HuggingFaceEmbedder**: hosted model embeddings (see [`crate::huggingface`])
//! - **EmbedderFactory**: rebuilds an embedder from a recorded [`EmbeddingConfig`]
//!
//! # Examples
//!
//! ```rust
//! use lore_store::embedding::{HashingEmbeddingModel, EmbeddingModel};
//!
//! let model = HashingEmbeddingModel::new(384);
//! let embedding = model.embed("The sky is blue").unwrap();
//! assert_eq!(embedding.len(), 384);
//!
//! // Same text always produces same embedding
//! assert_eq!(embedding, model.embed("The sky is blue").unwrap());
//! ```

use crate::huggingface::{self, HuggingFaceEmbedder};
use lore_domain::{EmbeddingBackend, EmbeddingConfig};
use std::time::Duration;
use thiserror::Error;

/// Dimension used by the hashing backend when the config does not name one
pub const DEFAULT_HASHING_DIMENSION: usize = 384;

/// Errors that can occur during embedding generation
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// Invalid input text
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration cannot produce an embedder
    #[error("Invalid embedding configuration: {0}")]
    InvalidConfig(String),

    /// Credentials needed by a hosted provider are absent
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// Provider call failed (network, auth, quota)
    #[error("Embedding provider error: {0}")]
    Provider(String),

    /// Provider answered with something that is not an embedding
    #[error("Invalid embedding response: {0}")]
    InvalidResponse(String),
}

/// Trait for embedding models
pub trait EmbeddingModel {
    /// Identifier of the underlying model
    fn model_name(&self) -> &str;

    /// Generate an embedding vector for the given text
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Embed several texts, preserving order
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}

/// Builds an embedder from a recorded configuration
///
/// Both the index builder and the extractor go through a factory, so query
/// embeddings are produced by the same configuration as the indexed ones.
/// Closures with the right signature are factories too, which keeps tests free
/// of network calls.
pub trait EmbedderFactory {
    /// Create an embedder for `config`
    fn create(&self, config: &EmbeddingConfig) -> Result<Box<dyn EmbeddingModel>, EmbeddingError>;
}

impl<F> EmbedderFactory for F
where
    F: Fn(&EmbeddingConfig) -> Result<Box<dyn EmbeddingModel>, EmbeddingError>,
{
    fn create(&self, config: &EmbeddingConfig) -> Result<Box<dyn EmbeddingModel>, EmbeddingError> {
        self(config)
    }
}

/// Factory dispatching on [`EmbeddingBackend`]
#[derive(Debug, Clone)]
pub struct DefaultEmbedderFactory {
    huggingface_token: Option<String>,
    endpoint: String,
    timeout: Duration,
}

impl DefaultEmbedderFactory {
    /// Create a factory; the token is only checked when a hosted model embeds
    pub fn new(huggingface_token: Option<String>) -> Self {
        Self {
            huggingface_token,
            endpoint: huggingface::DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(huggingface::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Override the inference endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Override the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl EmbedderFactory for DefaultEmbedderFactory {
    fn create(&self, config: &EmbeddingConfig) -> Result<Box<dyn EmbeddingModel>, EmbeddingError> {
        match config.backend {
            EmbeddingBackend::Hashing => {
                let dimension = config
                    .model_kwarg_usize("dimension")
                    .unwrap_or(DEFAULT_HASHING_DIMENSION);
                if dimension == 0 {
                    return Err(EmbeddingError::InvalidConfig(
                        "hashing dimension must be greater than 0".to_string(),
                    ));
                }
                Ok(Box::new(
                    HashingEmbeddingModel::new(dimension).with_normalize(config.normalize_embeddings()),
                ))
            }
            EmbeddingBackend::HuggingFace => Ok(Box::new(
                HuggingFaceEmbedder::new(config, self.huggingface_token.clone(), self.timeout)?
                    .with_endpoint(self.endpoint.clone()),
            )),
        }
    }
}

/// Offline feature-hashing embedding model
///
/// Text is split into lower-cased alphanumeric tokens and each token adds one
/// to the bucket its hash selects. The embeddings are:
///
/// - **Deterministic**: Same text always produces same embedding
/// - **Lexical**: Texts sharing tokens have positive similarity
/// - **Normalized**: Unit length unless normalization is turned off
pub struct HashingEmbeddingModel {
    dimension: usize,
    normalize: bool,
}

impl HashingEmbeddingModel {
    /// Create a new hashing model
    ///
    /// # Parameters
    ///
    /// - `dimension`: The embedding dimension (e.g., 384)
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            normalize: true,
        }
    }

    /// Toggle L2 normalization of output vectors
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Get the dimension of embeddings produced by this model
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    // FNV-1a keeps bucket assignment stable across toolchains, unlike DefaultHasher.
    fn hash_token(token: &str) -> u64 {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in token.bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        hash
    }
}

impl EmbeddingModel for HashingEmbeddingModel {
    fn model_name(&self) -> &str {
        "feature-hashing"
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::InvalidInput(
                "Empty text cannot be embedded".to_string(),
            ));
        }

        if self.dimension == 0 {
            return Err(EmbeddingError::InvalidConfig(
                "hashing dimension must be greater than 0".to_string(),
            ));
        }

        let mut embedding = vec![0.0f32; self.dimension];
        let mut token_count = 0usize;

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let hash = Self::hash_token(&token.to_lowercase());
            embedding[(hash % self.dimension as u64) as usize] += 1.0;
            token_count += 1;
        }

        if token_count == 0 {
            return Err(EmbeddingError::InvalidInput(
                "Text contains no alphanumeric tokens".to_string(),
            ));
        }

        if self.normalize {
            normalize(&mut embedding);
        }

        Ok(embedding)
    }
}

/// Scale a vector to unit length in place; zero vectors are left untouched
pub fn normalize(vector: &mut [f32]) {
    let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if magnitude > 0.0 {
        for value in vector.iter_mut() {
            *value /= magnitude;
        }
    }
}

/// Calculate cosine similarity between two embedding vectors
///
/// # Returns
///
/// Cosine similarity in range [-1, 1], where:
/// - 1.0 = identical direction
/// - 0.0 = orthogonal
/// - -1.0 = opposite direction
///
/// Vectors of different lengths, or a zero vector, yield 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot_product / (magnitude_a * magnitude_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hashing_embedding_deterministic() {
        let model = HashingEmbeddingModel::new(384);

        let text = "The quick brown fox jumps over the lazy dog";
        let embedding1 = model.embed(text).unwrap();
        let embedding2 = model.embed(text).unwrap();

        assert_eq!(embedding1, embedding2, "Same text should produce same embedding");
    }

    #[test]
    fn test_hashing_embedding_dimension() {
        let model = HashingEmbeddingModel::new(128);

        let embedding = model.embed("test").unwrap();
        assert_eq!(embedding.len(), 128);
        assert_eq!(model.dimension(), 128);
    }

    #[test]
    fn test_hashing_embedding_case_insensitive() {
        let model = HashingEmbeddingModel::new(64);
        assert_eq!(model.embed("Mira").unwrap(), model.embed("mira").unwrap());
    }

    #[test]
    fn test_shared_tokens_raise_similarity() {
        let model = HashingEmbeddingModel::new(4096);

        let query = model.embed("Tell me about Mira").unwrap();
        let related = model.embed("Mira lit the lamp at dusk").unwrap();
        let unrelated = model.embed("Goats graze on the far hill").unwrap();

        assert!(cosine_similarity(&query, &related) > cosine_similarity(&query, &unrelated));
    }

    #[test]
    fn test_hashing_embedding_empty_text() {
        let model = HashingEmbeddingModel::new(384);

        let result = model.embed("   ");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Empty text"));
    }

    #[test]
    fn test_hashing_embedding_punctuation_only() {
        let model = HashingEmbeddingModel::new(16);
        assert!(matches!(model.embed("?!..."), Err(EmbeddingError::InvalidInput(_))));
    }

    #[test]
    fn test_unnormalized_keeps_counts() {
        let model = HashingEmbeddingModel::new(32).with_normalize(false);
        let embedding = model.embed("echo echo echo").unwrap();
        let total: f32 = embedding.iter().map(|x| x.abs()).sum();
        assert_eq!(total, 3.0);
    }

    #[test]
    fn test_default_factory_builds_hashing_model() {
        let factory = DefaultEmbedderFactory::new(None);
        let embedder = factory.create(&EmbeddingConfig::hashing(48)).unwrap();
        assert_eq!(embedder.embed("hello").unwrap().len(), 48);
    }

    #[test]
    fn test_default_factory_rejects_zero_dimension() {
        let factory = DefaultEmbedderFactory::new(None);
        let result = factory.create(&EmbeddingConfig::hashing(0));
        assert!(matches!(result, Err(EmbeddingError::InvalidConfig(_))));
    }

    #[test]
    fn test_closure_is_a_factory() {
        let factory = |_: &EmbeddingConfig| -> Result<Box<dyn EmbeddingModel>, EmbeddingError> {
            Ok(Box::new(HashingEmbeddingModel::new(8)))
        };
        let embedder = factory.create(&EmbeddingConfig::default()).unwrap();
        assert_eq!(embedder.embed("x").unwrap().len(), 8);
    }

    #[test]
    fn test_cosine_similarity_identical() {
        let vec = vec![1.0, 0.0, 0.0];
        let similarity = cosine_similarity(&vec, &vec);
        assert!((similarity - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let vec1 = vec![1.0, 0.0, 0.0];
        let vec2 = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&vec1, &vec2).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_length_mismatch() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), 0.0);
    }

    proptest! {
        #[test]
        fn prop_hashing_embeddings_are_unit_length(text in "[a-zA-Z]{1,12}( [a-zA-Z]{1,12}){0,8}") {
            let model = HashingEmbeddingModel::new(64);
            let embedding = model.embed(&text).unwrap();
            let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
            prop_assert!((magnitude - 1.0).abs() < 1e-4);
        }

        #[test]
        fn prop_hashing_components_are_non_negative(text in "[a-z]{1,12}( [a-z]{1,12}){0,8}") {
            let model = HashingEmbeddingModel::new(16).with_normalize(false);
            let embedding = model.embed(&text).unwrap();
            prop_assert!(embedding.iter().all(|x| *x >= 0.0));
            prop_assert_eq!(embedding.iter().sum::<f32>(), text.split(' ').count() as f32);
        }
    }
}
