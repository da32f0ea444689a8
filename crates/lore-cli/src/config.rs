//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use lore_extractor::ExtractorConfig;
use lore_llm::ProviderSettings;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file, looked up in the working directory
pub const CONFIG_FILE: &str = "lore.toml";

/// Environment variable naming an alternative configuration file
pub const CONFIG_ENV: &str = "LORE_CONFIG";

/// Environment variable holding the Hugging Face access token
pub const HUGGINGFACE_TOKEN_ENV: &str = "HUGGINGFACE_TOKEN";

/// Environment variable holding the Mistral API key
pub const MISTRAL_KEY_ENV: &str = "MISTRAL_KEY";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where the extracted record is written
    #[serde(default = "default_output_file")]
    pub output_file: PathBuf,

    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Index and retrieval settings
    #[serde(default)]
    pub pipeline: ExtractorConfig,

    /// Generation provider settings
    #[serde(default)]
    pub generation: ProviderSettings,
}

impl AppConfig {
    /// Configuration file path: `$LORE_CONFIG` or `lore.toml`.
    pub fn path() -> PathBuf {
        env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
    }

    /// Load configuration from `path`, or defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let contents = fs::read_to_string(path)?;
            toml::from_str(&contents)?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.pipeline.validate().map_err(CliError::Config)?;
        self.generation.validate().map_err(CliError::Config)?;
        if self.output_file.as_os_str().is_empty() {
            return Err(CliError::Config("output_file must not be empty".to_string()));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_file: default_output_file(),
            color: true,
            pipeline: ExtractorConfig::default(),
            generation: ProviderSettings::default(),
        }
    }
}

/// Provider secrets, read once per process.
#[derive(Clone, Default)]
pub struct Secrets {
    /// Hugging Face access token
    pub huggingface_token: Option<String>,

    /// Mistral API key
    pub mistral_key: Option<String>,
}

impl Secrets {
    /// Read secrets from the environment. Absent values only fail when the
    /// provider that needs them is called.
    pub fn from_env() -> Self {
        Self {
            huggingface_token: non_empty_var(HUGGINGFACE_TOKEN_ENV),
            mistral_key: non_empty_var(MISTRAL_KEY_ENV),
        }
    }
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("huggingface_token", &self.huggingface_token.as_ref().map(|_| "<set>"))
            .field("mistral_key", &self.mistral_key.as_ref().map(|_| "<set>"))
            .finish()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn default_output_file() -> PathBuf {
    PathBuf::from("result.json")
}

fn default_true() -> bool {
    true
}
