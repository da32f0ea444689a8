//! Lore Extractor
//!
//! Builds the story index and turns a character name into a structured
//! record using retrieval-augmented generation.
//!
//! # Architecture
//!
//! ```text
//! stories/*.txt → IndexBuilder → Embedder → StoryIndex snapshot
//!
//! name → Extractor → retrieve top-K stories → context → LLM → CharacterRecord
//! ```
//!
//! # Key Features
//!
//! - **Full rebuilds**: every build replaces the snapshot and its embedding
//!   configuration together
//! - **Consistent embeddings**: queries are embedded with the configuration
//!   recorded at build time
//! - **Schema-constrained output**: the model receives the record's JSON schema
//!   and its answer is accepted only if it deserializes into a record
//! - **Not-found sentinel**: a record with an empty name is a normal result
//!
//! # Example Usage
//!
//! ```no_run
//! use lore_extractor::{Extractor, ExtractorConfig, IndexBuilder};
//! use lore_llm::MockProvider;
//! use lore_store::DefaultEmbedderFactory;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ExtractorConfig::default();
//! let token = std::env::var("HUGGINGFACE_TOKEN").ok();
//!
//! let summary = IndexBuilder::new(config.clone(), DefaultEmbedderFactory::new(token.clone())).build()?;
//! println!("Indexed {} stories", summary.documents);
//!
//! let llm = MockProvider::new(r#"{"name":"","storyTitle":"","summary":"","relations":[],"characterType":""}"#);
//! let extractor = Extractor::new(llm, DefaultEmbedderFactory::new(token), config);
//! let record = extractor.extract("Mira")?;
//! assert!(record.is_not_found());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod builder;
mod config;
mod context;
mod error;
mod extractor;
mod loader;
mod parser;
mod prompt;
mod schema;

#[cfg(test)]
mod tests;

pub use builder::{BuildSummary, IndexBuilder};
pub use config::{ExtractorConfig, NAME_PLACEHOLDER, SNAPSHOT_FILE};
pub use context::{assemble_context, story_title, UNKNOWN_STORY};
pub use error::ExtractorError;
pub use extractor::{ExtractionReport, Extractor, RetrievedStory};
pub use loader::load_stories;
pub use parser::parse_character_record;
pub use prompt::{retrieval_query, PromptBuilder, SYSTEM_PROMPT};
pub use schema::{add_additional_properties_false, character_record_schema, SCHEMA_NAME};
