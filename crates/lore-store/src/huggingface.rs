//! Hugging Face Inference Embeddings
//!
//! Calls the hosted feature-extraction pipeline for a sentence-embedding
//! model. The access token is checked when `embed` runs, not when the
//! embedder is built, so a missing secret only fails the call that needs it.
//!
//! # Examples
//!
//! ```no_run
//! use lore_domain::EmbeddingConfig;
//! use lore_store::{EmbeddingModel, HuggingFaceEmbedder};
//! use std::time::Duration;
//!
//! let token = std::env::var("HUGGINGFACE_TOKEN").ok();
//! let embedder = HuggingFaceEmbedder::new(&EmbeddingConfig::default(), token, Duration::from_secs(30)).unwrap();
//! let vector = embedder.embed("Tell me about the character Mira").unwrap();
//! ```

use crate::embedding::{normalize, EmbeddingError, EmbeddingModel};
use lore_domain::EmbeddingConfig;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default inference endpoint (model id is appended)
pub const DEFAULT_ENDPOINT: &str = "https://router.huggingface.co/hf-inference/models";

/// Default timeout for embedding requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Embedder backed by the Hugging Face inference API
pub struct HuggingFaceEmbedder {
    endpoint: String,
    model: String,
    token: Option<String>,
    normalize: bool,
    client: Client,
}

#[derive(Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: &'a str,
    normalize: bool,
}

/// Sentence models answer with one vector; token-level models with a matrix
#[derive(Deserialize)]
#[serde(untagged)]
enum FeatureExtractionResponse {
    Vector(Vec<f32>),
    Matrix(Vec<Vec<f32>>),
}

impl HuggingFaceEmbedder {
    /// Create an embedder for the model named in `config`
    pub fn new(
        config: &EmbeddingConfig,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, EmbeddingError> {
        if config.model_name.trim().is_empty() {
            return Err(EmbeddingError::InvalidConfig(
                "model_name must not be empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EmbeddingError::Provider(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: config.model_name.clone(),
            token: token.filter(|t| !t.trim().is_empty()),
            normalize: config.normalize_embeddings(),
            client,
        })
    }

    /// Point the embedder at a different inference endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self) -> String {
        format!("{}/{}/pipeline/feature-extraction", self.endpoint, self.model)
    }

    fn into_vector(response: FeatureExtractionResponse) -> Result<Vec<f32>, EmbeddingError> {
        match response {
            FeatureExtractionResponse::Vector(vector) => Ok(vector),
            FeatureExtractionResponse::Matrix(rows) => mean_pool(rows),
        }
    }
}

impl EmbeddingModel for HuggingFaceEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::InvalidInput(
                "Empty text cannot be embedded".to_string(),
            ));
        }

        let token = self.token.as_deref().ok_or_else(|| {
            EmbeddingError::MissingCredentials("HUGGINGFACE_TOKEN is not set".to_string())
        })?;

        debug!("Embedding {} chars with {}", text.len(), self.model);

        let response = self
            .client
            .post(self.url())
            .bearer_auth(token)
            .json(&FeatureExtractionRequest {
                inputs: text,
                normalize: self.normalize,
            })
            .send()
            .map_err(|e| EmbeddingError::Provider(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(EmbeddingError::Provider(describe_status(status, &body)));
        }

        let parsed: FeatureExtractionResponse = response
            .json()
            .map_err(|e| EmbeddingError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        let mut vector = Self::into_vector(parsed)?;
        if vector.is_empty() {
            return Err(EmbeddingError::InvalidResponse("Empty embedding".to_string()));
        }
        if self.normalize {
            normalize(&mut vector);
        }
        Ok(vector)
    }
}

fn describe_status(status: StatusCode, body: &str) -> String {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            format!("HTTP {}: access denied, check HUGGINGFACE_TOKEN ({})", status, body)
        }
        StatusCode::NOT_FOUND => format!("HTTP {}: model not available ({})", status, body),
        StatusCode::TOO_MANY_REQUESTS => format!("HTTP {}: rate limit exceeded", status),
        _ => format!("HTTP {}: {}", status, body),
    }
}

fn mean_pool(rows: Vec<Vec<f32>>) -> Result<Vec<f32>, EmbeddingError> {
    let width = rows
        .first()
        .map(Vec::len)
        .ok_or_else(|| EmbeddingError::InvalidResponse("Empty embedding matrix".to_string()))?;

    if rows.iter().any(|row| row.len() != width) {
        return Err(EmbeddingError::InvalidResponse(
            "Ragged embedding matrix".to_string(),
        ));
    }

    let count = rows.len() as f32;
    let mut pooled = vec![0.0f32; width];
    for row in &rows {
        for (acc, value) in pooled.iter_mut().zip(row) {
            *acc += value;
        }
    }
    for value in &mut pooled {
        *value /= count;
    }
    Ok(pooled)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedder(token: Option<&str>) -> HuggingFaceEmbedder {
        HuggingFaceEmbedder::new(
            &EmbeddingConfig::default(),
            token.map(str::to_string),
            Duration::from_secs(1),
        )
        .unwrap()
    }

    #[test]
    fn test_url_includes_model() {
        let embedder = embedder(Some("hf_x")).with_endpoint("http://localhost:9000/models/");
        assert_eq!(
            embedder.url(),
            "http://localhost:9000/models/google/embeddinggemma-300m/pipeline/feature-extraction"
        );
    }

    #[test]
    fn test_missing_token_fails_at_embed_time() {
        let embedder = embedder(None);
        let result = embedder.embed("Mira");
        assert!(matches!(result, Err(EmbeddingError::MissingCredentials(_))));
    }

    #[test]
    fn test_blank_token_counts_as_missing() {
        let embedder = embedder(Some("  "));
        assert!(matches!(embedder.embed("Mira"), Err(EmbeddingError::MissingCredentials(_))));
    }

    #[test]
    fn test_empty_model_name_rejected() {
        let mut config = EmbeddingConfig::default();
        config.model_name = String::new();
        let result = HuggingFaceEmbedder::new(&config, None, Duration::from_secs(1));
        assert!(matches!(result, Err(EmbeddingError::InvalidConfig(_))));
    }

    #[test]
    fn test_parse_flat_and_nested_responses() {
        let flat: FeatureExtractionResponse = serde_json::from_str("[0.5, 0.5]").unwrap();
        assert_eq!(HuggingFaceEmbedder::into_vector(flat).unwrap(), vec![0.5, 0.5]);

        let nested: FeatureExtractionResponse =
            serde_json::from_str("[[1.0, 0.0], [0.0, 1.0]]").unwrap();
        assert_eq!(HuggingFaceEmbedder::into_vector(nested).unwrap(), vec![0.5, 0.5]);
    }

    #[test]
    fn test_ragged_matrix_rejected() {
        let result = mean_pool(vec![vec![1.0, 2.0], vec![1.0]]);
        assert!(matches!(result, Err(EmbeddingError::InvalidResponse(_))));
    }

    #[test]
    fn test_unreachable_endpoint_is_provider_error() {
        let embedder = embedder(Some("hf_x")).with_endpoint("http://127.0.0.1:9");
        assert!(matches!(embedder.embed("Mira"), Err(EmbeddingError::Provider(_))));
    }

    #[test]
    #[ignore] // Needs HUGGINGFACE_TOKEN and network access
    fn test_huggingface_embed_integration() {
        let token = std::env::var("HUGGINGFACE_TOKEN").ok();
        let embedder = embedder(token.as_deref());
        let vector = embedder.embed("A lighthouse keeper named Mira").unwrap();
        assert!(!vector.is_empty());
    }
}
