//! Ollama Provider Implementation
//!
//! Provides integration with Ollama's local chat API for running models
//! without a hosted key. Structured output uses the `format` field, which
//! Ollama accepts as a JSON schema.
//!
//! # Examples
//!
//! ```no_run
//! use lore_llm::OllamaProvider;
//!
//! let provider = OllamaProvider::new("http://localhost:11434", "mistral").unwrap();
//! ```

use crate::mistral::map_status;
use crate::LlmError;
use lore_domain::{GenerationProvider, GenerationRequest};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default model, as named in the Ollama library
pub const DEFAULT_MODEL: &str = "mistral";

/// Default timeout for LLM requests (60 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Ollama API provider for local LLM inference
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    temperature: f32,
    client: Client,
}

/// Request body for Ollama chat API
#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: [OllamaMessage<'a>; 2],
    format: Value,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
}

/// Response from Ollama chat API
#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaResponseMessage,
}

#[derive(Deserialize)]
struct OllamaResponseMessage {
    content: String,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "llama3", "mistral")
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        Self::with_timeout(endpoint, model, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a provider with a custom request timeout
    pub fn with_timeout(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Communication(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            temperature: crate::mistral::DEFAULT_TEMPERATURE,
            client,
        })
    }

    /// Create a new Ollama provider on `http://localhost:11434`
    pub fn default_endpoint(model: impl Into<String>) -> Result<Self, LlmError> {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn build_body<'a>(
        &'a self,
        request: &GenerationRequest<'a>,
    ) -> Result<OllamaChatRequest<'a>, LlmError> {
        let format: Value = serde_json::from_str(request.schema)
            .map_err(|e| LlmError::InvalidRequest(format!("Schema is not valid JSON: {}", e)))?;

        Ok(OllamaChatRequest {
            model: &self.model,
            messages: [
                OllamaMessage {
                    role: "system",
                    content: request.system,
                },
                OllamaMessage {
                    role: "user",
                    content: request.user,
                },
            ],
            format,
            stream: false,
            options: OllamaOptions {
                temperature: self.temperature,
            },
        })
    }
}

impl GenerationProvider for OllamaProvider {
    type Error = LlmError;

    fn model_name(&self) -> &str {
        &self.model
    }

    fn generate_structured(&self, request: &GenerationRequest<'_>) -> Result<String, Self::Error> {
        let url = format!("{}/api/chat", self.endpoint);
        let body = self.build_body(request)?;
        debug!("Sending structured request to {} ({})", self.model, url);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(map_status(status, &self.model, error_text));
        }

        response
            .json::<OllamaChatResponse>()
            .map(|parsed| parsed.message.content)
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerationRequest<'static> {
        GenerationRequest {
            system: "You extract characters.",
            user: "Extract information about the character: Bram",
            schema_name: "character_record",
            schema: r#"{"type":"object"}"#,
        }
    }

    #[test]
    fn test_ollama_provider_creation() {
        let provider = OllamaProvider::new("http://localhost:11434/", "llama3").unwrap();
        assert_eq!(provider.endpoint, "http://localhost:11434");
        assert_eq!(provider.model_name(), "llama3");
    }

    #[test]
    fn test_ollama_provider_default_endpoint() {
        let provider = OllamaProvider::default_endpoint("mistral").unwrap();
        assert_eq!(provider.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(provider.model, "mistral");
    }

    #[test]
    fn test_request_body_carries_schema() {
        let provider = OllamaProvider::default_endpoint("mistral")
            .unwrap()
            .with_temperature(0.5);
        let req = request();
        let body = serde_json::to_value(provider.build_body(&req).unwrap()).unwrap();

        assert_eq!(body["format"]["type"], "object");
        assert_eq!(body["stream"], false);
        assert_eq!(body["options"]["temperature"], 0.5);
        assert_eq!(body["messages"][0]["role"], "system");
    }

    #[test]
    fn test_ollama_error_handling() {
        // Nothing listens on the discard port
        let provider =
            OllamaProvider::with_timeout("http://127.0.0.1:9", "llama3", Duration::from_secs(1))
                .unwrap();

        let result = provider.generate_structured(&request());
        match result {
            Err(LlmError::Communication(_)) => {} // Expected
            _ => panic!("Expected Communication error"),
        }
    }

    // Integration tests (requires running Ollama)
    #[test]
    #[ignore] // Only run when Ollama is available
    fn test_ollama_generate_integration() {
        let provider = OllamaProvider::default_endpoint("llama3").unwrap();
        let result = provider.generate_structured(&request());
        if let Ok(response) = result {
            assert!(!response.is_empty());
        }
    }
}
