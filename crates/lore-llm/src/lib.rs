//! Lore LLM Provider Layer
//!
//! Schema-constrained generation providers.
//!
//! # Architecture
//!
//! This crate provides implementations of the `GenerationProvider` trait from
//! `lore-domain`. Every provider is blocking and answers one request with one
//! JSON document.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `MistralProvider`: Hosted Mistral chat completions with `json_schema` output
//! - `OllamaProvider`: Local Ollama chat API with a `format` schema
//! - `ConfiguredProvider`: one of the above, chosen by [`ProviderSettings`]
//!
//! # Examples
//!
//! ```
//! use lore_llm::MockProvider;
//! use lore_domain::{GenerationProvider, GenerationRequest};
//!
//! let provider = MockProvider::new(r#"{"answer": 42}"#);
//! let request = GenerationRequest {
//!     system: "Answer in JSON",
//!     user: "What is the answer?",
//!     schema_name: "answer",
//!     schema: "{}",
//! };
//! assert_eq!(provider.generate_structured(&request).unwrap(), r#"{"answer": 42}"#);
//! ```

#![warn(missing_docs)]

pub mod mistral;
pub mod ollama;
pub mod settings;

use lore_domain::{GenerationProvider, GenerationRequest};
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use mistral::MistralProvider;
pub use ollama::OllamaProvider;
pub use settings::{ConfiguredProvider, ProviderKind, ProviderSettings};

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Request could not be built (bad schema, bad settings)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Provider rejected the credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Required API key is not configured
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// What the mock does when a request matches a fragment
#[derive(Debug, Clone)]
enum MockReply {
    Respond(String),
    Fail,
}

/// Mock LLM provider for deterministic testing
///
/// Returns pre-configured responses without making any network calls.
/// Specific replies are keyed by a fragment of the user message; the first
/// registered fragment contained in the message wins, otherwise the default
/// response is returned.
///
/// # Examples
///
/// ```
/// use lore_llm::MockProvider;
/// use lore_domain::{GenerationProvider, GenerationRequest};
///
/// let mut provider = MockProvider::default();
/// provider.add_response("Mira", r#"{"name": "Mira"}"#);
///
/// let request = GenerationRequest {
///     system: "",
///     user: "Extract information about the character: Mira",
///     schema_name: "character",
///     schema: "{}",
/// };
/// assert_eq!(provider.generate_structured(&request).unwrap(), r#"{"name": "Mira"}"#);
/// assert_eq!(provider.call_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    replies: Arc<Mutex<Vec<(String, MockReply)>>>,
    call_count: Arc<Mutex<usize>>,
    last_request: Arc<Mutex<Option<RecordedRequest>>>,
}

/// A request as seen by [`MockProvider`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// System instruction
    pub system: String,
    /// User instruction
    pub user: String,
    /// Schema name
    pub schema_name: String,
    /// Serialized schema
    pub schema: String,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all requests
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            replies: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    /// Answer `response` whenever the user message contains `fragment`
    pub fn add_response(&mut self, fragment: impl Into<String>, response: impl Into<String>) {
        self.replies
            .lock()
            .unwrap()
            .push((fragment.into(), MockReply::Respond(response.into())));
    }

    /// Fail whenever the user message contains `fragment`
    pub fn add_error(&mut self, fragment: impl Into<String>) {
        self.replies
            .lock()
            .unwrap()
            .push((fragment.into(), MockReply::Fail));
    }

    /// Get the number of times generate_structured was called
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *self.call_count.lock().unwrap() = 0;
    }

    /// The most recent request, if any
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("{}")
    }
}

impl GenerationProvider for MockProvider {
    type Error = LlmError;

    fn model_name(&self) -> &str {
        "mock"
    }

    fn generate_structured(&self, request: &GenerationRequest<'_>) -> Result<String, Self::Error> {
        *self.call_count.lock().unwrap() += 1;
        *self.last_request.lock().unwrap() = Some(RecordedRequest {
            system: request.system.to_string(),
            user: request.user.to_string(),
            schema_name: request.schema_name.to_string(),
            schema: request.schema.to_string(),
        });

        let replies = self.replies.lock().unwrap();
        match replies
            .iter()
            .find(|(fragment, _)| request.user.contains(fragment.as_str()))
        {
            Some((_, MockReply::Respond(response))) => Ok(response.clone()),
            Some((_, MockReply::Fail)) => Err(LlmError::Other("Mock error".to_string())),
            None => Ok(self.default_response.clone()),
        }
    }
}
