//! Provider selection from configuration

use crate::{mistral, ollama, LlmError, MistralProvider, OllamaProvider};
use lore_domain::{GenerationProvider, GenerationRequest};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

/// Which generation backend to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Hosted Mistral API
    #[default]
    Mistral,
    /// Local Ollama server
    Ollama,
}

impl ProviderKind {
    /// Model used when the settings name none
    pub fn default_model(self) -> &'static str {
        match self {
            Self::Mistral => mistral::DEFAULT_MODEL,
            Self::Ollama => ollama::DEFAULT_MODEL,
        }
    }
}

/// Generation settings as they appear in `lore.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Backend
    pub provider: ProviderKind,

    /// Model identifier; the backend's default model when absent
    pub model: Option<String>,

    /// Endpoint override; the backend default when absent
    pub endpoint: Option<String>,

    /// Sampling temperature
    pub temperature: f32,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Mistral,
            model: None,
            endpoint: None,
            temperature: mistral::DEFAULT_TEMPERATURE,
            timeout_secs: mistral::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ProviderSettings {
    /// The configured model, or the provider's default
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), String> {
        if self.model().trim().is_empty() {
            return Err("generation.model must not be empty".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "generation.temperature must be within 0.0..=2.0, got {}",
                self.temperature
            ));
        }
        if self.timeout_secs == 0 {
            return Err("generation.timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// A provider chosen at runtime from [`ProviderSettings`]
pub enum ConfiguredProvider {
    /// Mistral chat completions
    Mistral(MistralProvider),
    /// Ollama chat
    Ollama(OllamaProvider),
}

impl ConfiguredProvider {
    /// Build the provider `settings` names
    ///
    /// `mistral_key` is only consulted by the Mistral backend, and only when a
    /// request is sent.
    pub fn from_settings(
        settings: &ProviderSettings,
        mistral_key: Option<String>,
    ) -> Result<Self, LlmError> {
        settings.validate().map_err(LlmError::InvalidRequest)?;
        let timeout = Duration::from_secs(settings.timeout_secs);

        let provider = match settings.provider {
            ProviderKind::Mistral => {
                let mut provider = MistralProvider::with_timeout(mistral_key, timeout)?
                    .with_model(settings.model())
                    .with_temperature(settings.temperature);
                if let Some(endpoint) = &settings.endpoint {
                    provider = provider.with_endpoint(endpoint.clone());
                }
                Self::Mistral(provider)
            }
            ProviderKind::Ollama => {
                let endpoint = settings
                    .endpoint
                    .clone()
                    .unwrap_or_else(|| ollama::DEFAULT_ENDPOINT.to_string());
                Self::Ollama(
                    OllamaProvider::with_timeout(endpoint, settings.model(), timeout)?
                        .with_temperature(settings.temperature),
                )
            }
        };

        info!(
            "Using {:?} generation provider with model {}",
            settings.provider,
            provider.model_name()
        );
        Ok(provider)
    }
}

impl GenerationProvider for ConfiguredProvider {
    type Error = LlmError;

    fn model_name(&self) -> &str {
        match self {
            Self::Mistral(p) => p.model_name(),
            Self::Ollama(p) => p.model_name(),
        }
    }

    fn generate_structured(&self, request: &GenerationRequest<'_>) -> Result<String, Self::Error> {
        match self {
            Self::Mistral(p) => p.generate_structured(request),
            Self::Ollama(p) => p.generate_structured(request),
        }
    }
}
