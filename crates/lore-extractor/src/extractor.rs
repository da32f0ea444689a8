//! Core Extractor implementation

use crate::config::ExtractorConfig;
use crate::context::{assemble_context, story_title};
use crate::error::ExtractorError;
use crate::parser::parse_character_record;
use crate::prompt::{retrieval_query, PromptBuilder};
use crate::schema::{character_record_schema, SCHEMA_NAME};
use lore_domain::{CharacterRecord, EmbeddingConfig, GenerationProvider, GenerationRequest};
use lore_store::{EmbedderFactory, StoryIndex};
use std::fmt::Display;
use tracing::{debug, info, warn};

/// A story that contributed to the context
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedStory {
    /// Title shown to the model
    pub title: String,

    /// Source path, if known
    pub source: Option<String>,

    /// Cosine similarity to the retrieval query
    pub score: f32,
}

/// Full outcome of one extraction
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionReport {
    /// The validated record; an empty name means "not found"
    pub record: CharacterRecord,

    /// Retrieved stories, most similar first
    pub retrieved: Vec<RetrievedStory>,

    /// False when query embeddings came from a configuration other than the
    /// one the index was built with; retrieval quality is then undefined
    pub config_consistent: bool,
}

/// Retrieves story context for a character and asks the model for a record
pub struct Extractor<L, F>
where
    L: GenerationProvider,
    F: EmbedderFactory,
{
    llm: L,
    factory: F,
    config: ExtractorConfig,
    embedding_override: Option<EmbeddingConfig>,
}

impl<L, F> Extractor<L, F>
where
    L: GenerationProvider,
    L::Error: Display,
    F: EmbedderFactory,
{
    /// Create a new Extractor
    pub fn new(llm: L, factory: F, config: ExtractorConfig) -> Self {
        Self {
            llm,
            factory,
            config,
            embedding_override: None,
        }
    }

    /// Embed queries with `config` instead of the configuration recorded in
    /// the snapshot
    pub fn with_embedding_override(mut self, config: EmbeddingConfig) -> Self {
        self.embedding_override = Some(config);
        self
    }

    /// Configuration in use
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract the record for `character_name`
    pub fn extract(&self, character_name: &str) -> Result<CharacterRecord, ExtractorError> {
        self.extract_detailed(character_name).map(|report| report.record)
    }

    /// Extract the record together with retrieval details
    pub fn extract_detailed(&self, character_name: &str) -> Result<ExtractionReport, ExtractorError> {
        let name = character_name.trim();
        if name.is_empty() {
            return Err(ExtractorError::InvalidInput(
                "Character name must not be empty".to_string(),
            ));
        }
        self.config.validate().map_err(ExtractorError::Config)?;

        // 1. Restore the index and the embedding function it was built with
        let snapshot_path = self.config.snapshot_path();
        let (index, recorded) = StoryIndex::load(&snapshot_path)?;
        let (active, config_consistent) = self.resolve_embedding(recorded);
        let embedder = self.factory.create(&active)?;

        // 2. Retrieve
        let query = retrieval_query(&self.config.query_template, name);
        let hits = index.similarity_search(
            embedder.as_ref(),
            &query,
            self.config.top_k,
            self.config.ef_search,
        )?;
        debug!("Retrieved {} stories for '{}'", hits.len(), name);

        // 3. Assemble context
        let context = assemble_context(hits.iter().map(|hit| &hit.document));
        let retrieved = hits
            .iter()
            .map(|hit| RetrievedStory {
                title: story_title(hit.document.source.as_deref()),
                source: hit.document.source.clone(),
                score: hit.score,
            })
            .collect();

        // 4. Generate
        let prompt = PromptBuilder::new(name, &context);
        let user = prompt.user();
        let schema = character_record_schema()?.to_string();
        let request = GenerationRequest {
            system: prompt.system(),
            user: &user,
            schema_name: SCHEMA_NAME,
            schema: &schema,
        };

        info!("Requesting record for '{}' from {}", name, self.llm.model_name());
        let raw = self
            .llm
            .generate_structured(&request)
            .map_err(|e| ExtractorError::Llm(e.to_string()))?;

        // 5. Validate
        let record = parse_character_record(&raw)?;
        if record.is_not_found() {
            info!("Character '{}' not found in the retrieved stories", name);
        }

        Ok(ExtractionReport {
            record,
            retrieved,
            config_consistent,
        })
    }

    fn resolve_embedding(&self, recorded: EmbeddingConfig) -> (EmbeddingConfig, bool) {
        match &self.embedding_override {
            Some(over) if *over != recorded => {
                warn!(
                    "Embedding configuration {} ({}) differs from the one the index was built with, {} ({}); retrieval quality is undefined",
                    over.model_name, over.backend, recorded.model_name, recorded.backend
                );
                (over.clone(), false)
            }
            _ => (recorded, true),
        }
    }
}
