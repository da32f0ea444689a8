//! Pipeline tests for the index builder and the Extractor

#[cfg(test)]
mod tests {
    use crate::{Extractor, ExtractorConfig, ExtractorError, IndexBuilder, SCHEMA_NAME};
    use lore_domain::{EmbeddingConfig, GenerationProvider};
    use lore_llm::MockProvider;
    use lore_store::{
        normalize, DefaultEmbedderFactory, EmbedderFactory, EmbeddingError, EmbeddingModel,
        StoreError, StoryIndex, VectorIndexError,
    };
    use serde_json::Value;
    use std::fs;
    use tempfile::TempDir;

    const AXES: [&str; 4] = ["mira", "bram", "odile", "lighthouse"];

    /// One dimension per keyword plus a constant bias dimension
    struct KeywordEmbedder {
        model: String,
    }

    impl EmbeddingModel for KeywordEmbedder {
        fn model_name(&self) -> &str {
            &self.model
        }

        fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            let lower = text.to_lowercase();
            let mut vector: Vec<f32> = AXES
                .iter()
                .map(|axis| lower.matches(axis).count() as f32)
                .collect();
            vector.push(1.0);
            normalize(&mut vector);
            Ok(vector)
        }
    }

    fn keyword_factory(config: &EmbeddingConfig) -> Result<Box<dyn EmbeddingModel>, EmbeddingError> {
        Ok(Box::new(KeywordEmbedder {
            model: config.model_name.clone(),
        }))
    }

    /// Keyword axes for the recorded config, the default factory for anything else
    fn mixed_factory(config: &EmbeddingConfig) -> Result<Box<dyn EmbeddingModel>, EmbeddingError> {
        if config.model_name == "keyword-axes" {
            keyword_factory(config)
        } else {
            DefaultEmbedderFactory::new(None).create(config)
        }
    }

    fn offline_factory(_: &EmbeddingConfig) -> Result<Box<dyn EmbeddingModel>, EmbeddingError> {
        Err(EmbeddingError::MissingCredentials(
            "HUGGINGFACE_TOKEN is not set".to_string(),
        ))
    }

    fn keyword_config() -> EmbeddingConfig {
        let mut config = EmbeddingConfig::hashing(AXES.len() + 1);
        config.model_name = "keyword-axes".to_string();
        config
    }

    fn record_json(name: &str, story: &str) -> String {
        serde_json::json!({
            "name": name,
            "storyTitle": story,
            "summary": format!("{} appears in {}.", name, story),
            "relations": [{"name": "Bram", "relation": "friend"}],
            "characterType": "protagonist"
        })
        .to_string()
    }

    const NOT_FOUND_JSON: &str =
        r#"{"name":"","storyTitle":"","summary":"","relations":[],"characterType":""}"#;

    /// A temporary workspace with three stories
    fn setup() -> (TempDir, ExtractorConfig) {
        let dir = TempDir::new().unwrap();
        let stories = dir.path().join("stories");
        fs::create_dir(&stories).unwrap();
        fs::write(
            stories.join("glass-harbor.txt"),
            "Mira keeps the lighthouse. Every night Mira climbs the stairs; Mira never sleeps.",
        )
        .unwrap();
        fs::write(
            stories.join("goat-hills.txt"),
            "Bram herds goats. Bram sings to them and Bram is happy.",
        )
        .unwrap();
        fs::write(
            stories.join("tower-bell.txt"),
            "Odile repairs the bell. Odile is patient and Odile is proud.",
        )
        .unwrap();

        let config = ExtractorConfig {
            stories_dir: stories,
            storage_dir: dir.path().join("story_embeddings"),
            embedding: keyword_config(),
            ..ExtractorConfig::default()
        };
        (dir, config)
    }

    #[test]
    fn test_round_trip_retrieval() {
        let (_dir, config) = setup();
        let summary = IndexBuilder::new(config.clone(), keyword_factory).build().unwrap();
        assert_eq!(summary.documents, 3);
        assert_eq!(summary.dimension, AXES.len() + 1);
        assert!(summary.snapshot_path.exists());

        let llm = MockProvider::new(record_json("Mira", "Glass Harbor"));
        let extractor = Extractor::new(llm.clone(), keyword_factory, config);
        let report = extractor.extract_detailed("Mira").unwrap();

        assert_eq!(report.retrieved.len(), 2);
        assert_eq!(report.retrieved[0].title, "Glass Harbor");
        assert!(report.retrieved[0].score >= report.retrieved[1].score);
        assert!(report.config_consistent);

        let request = llm.last_request().unwrap();
        assert!(request
            .user
            .starts_with("Extract information about the character: Mira"));
        assert!(request.user.contains("Stories Context:\nStory: Glass Harbor\n"));
        assert!(request.user.contains("\n\n---\n\n"));
        assert_eq!(request.schema_name, SCHEMA_NAME);
        assert_eq!(llm.call_count(), 1);
    }

    #[test]
    fn test_top_k_is_configurable() {
        let (_dir, mut config) = setup();
        IndexBuilder::new(config.clone(), keyword_factory).build().unwrap();

        config.top_k = 1;
        let extractor = Extractor::new(MockProvider::new(NOT_FOUND_JSON), keyword_factory, config);
        let report = extractor.extract_detailed("Odile").unwrap();
        assert_eq!(report.retrieved.len(), 1);
        assert_eq!(report.retrieved[0].title, "Tower Bell");
    }

    #[test]
    fn test_config_consistency() {
        let (_dir, config) = setup();
        IndexBuilder::new(config.clone(), keyword_factory).build().unwrap();

        let recorded = StoryIndex::read_config(&config.snapshot_path()).unwrap();
        assert_eq!(recorded, config.embedding);

        let same = Extractor::new(MockProvider::new(NOT_FOUND_JSON), keyword_factory, config.clone())
            .with_embedding_override(config.embedding.clone());
        assert!(same.extract_detailed("Mira").unwrap().config_consistent);

        let mut mismatched = config.embedding.clone();
        mismatched.model_name = "some-other-model".to_string();
        let extractor = Extractor::new(MockProvider::new(NOT_FOUND_JSON), keyword_factory, config)
            .with_embedding_override(mismatched);

        // Undefined-quality retrieval is flagged, not fatal
        let report = extractor.extract_detailed("Mira").unwrap();
        assert!(!report.config_consistent);
    }

    #[test]
    fn test_override_with_other_dimension_fails_cleanly() {
        let (_dir, config) = setup();
        IndexBuilder::new(config.clone(), keyword_factory).build().unwrap();

        let llm = MockProvider::new(NOT_FOUND_JSON);
        let extractor = Extractor::new(llm.clone(), mixed_factory, config)
            .with_embedding_override(EmbeddingConfig::hashing(7));

        let result = extractor.extract_detailed("Mira");
        assert!(matches!(
            result,
            Err(ExtractorError::Store(StoreError::Index(
                VectorIndexError::DimensionMismatch {
                    expected: 5,
                    actual: 7
                }
            )))
        ));
        assert_eq!(llm.call_count(), 0);
    }

    #[test]
    fn test_not_found_sentinel() {
        let (_dir, config) = setup();
        IndexBuilder::new(config.clone(), keyword_factory).build().unwrap();

        let extractor = Extractor::new(MockProvider::new(NOT_FOUND_JSON), keyword_factory, config);
        let record = extractor.extract("Zebulon").unwrap();
        assert!(record.is_not_found());
        assert!(record.relations.is_empty());
    }

    #[test]
    fn test_idempotent_rebuild() {
        let (_dir, config) = setup();
        let builder = IndexBuilder::new(config.clone(), keyword_factory);

        let first = builder.build().unwrap();
        let (before, _) = StoryIndex::load(&first.snapshot_path).unwrap();
        let second = builder.build().unwrap();
        let (after, recorded) = StoryIndex::load(&second.snapshot_path).unwrap();

        assert_eq!(first, second);
        assert_eq!(before.documents(), after.documents());
        assert_eq!(recorded, config.embedding);

        let embedder = KeywordEmbedder {
            model: "keyword-axes".to_string(),
        };
        let query = "Tell me about the character Bram";
        let titles = |index: &StoryIndex| {
            index
                .similarity_search(&embedder, query, 2, 64)
                .unwrap()
                .into_iter()
                .map(|hit| hit.document.source)
                .collect::<Vec<_>>()
        };
        assert_eq!(titles(&before), titles(&after));
    }

    #[test]
    fn test_rebuild_picks_up_new_stories() {
        let (_dir, config) = setup();
        let builder = IndexBuilder::new(config.clone(), keyword_factory);
        builder.build().unwrap();

        fs::write(config.stories_dir.join("new-tale.txt"), "A brand new tale.").unwrap();
        assert_eq!(builder.build().unwrap().documents, 4);
    }

    #[test]
    fn test_schema_conformance() {
        let (_dir, config) = setup();
        IndexBuilder::new(config.clone(), keyword_factory).build().unwrap();

        let llm = MockProvider::new(record_json("Mira", "Glass Harbor"));
        let extractor = Extractor::new(llm.clone(), keyword_factory, config.clone());
        let record = extractor.extract("Mira").unwrap();
        assert_eq!(record.relations[0].name, "Bram");
        assert_eq!(record.character_type, "protagonist");

        let schema: Value = serde_json::from_str(&llm.last_request().unwrap().schema).unwrap();
        assert_eq!(schema["additionalProperties"], false);
        assert_eq!(schema["required"].as_array().unwrap().len(), 5);

        // A response missing characterType is rejected, never defaulted
        let partial = r#"{"name":"Mira","storyTitle":"Glass Harbor","summary":"x","relations":[]}"#;
        let extractor = Extractor::new(MockProvider::new(partial), keyword_factory, config.clone());
        let err = extractor.extract("Mira").unwrap_err();
        assert!(matches!(err, ExtractorError::InvalidFormat(_)));
        assert!(err.is_provider_error());

        let extractor = Extractor::new(MockProvider::new("I think Mira is nice."), keyword_factory, config);
        assert!(matches!(
            extractor.extract("Mira"),
            Err(ExtractorError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_empty_corpus() {
        let (dir, mut config) = setup();
        let empty = dir.path().join("empty");
        fs::create_dir(&empty).unwrap();
        config.stories_dir = empty;

        let err = IndexBuilder::new(config.clone(), keyword_factory)
            .build()
            .unwrap_err();
        assert!(matches!(err, ExtractorError::NoStories(_)));
        assert!(err.is_configuration_missing());
        assert!(!config.snapshot_path().exists());
    }

    #[test]
    fn test_missing_stories_directory() {
        let (dir, mut config) = setup();
        config.stories_dir = dir.path().join("nowhere");

        let err = IndexBuilder::new(config, keyword_factory).build().unwrap_err();
        assert!(matches!(err, ExtractorError::StoriesNotFound(_)));
    }

    #[test]
    fn test_query_before_build() {
        let (_dir, config) = setup();
        let llm = MockProvider::new(NOT_FOUND_JSON);
        let extractor = Extractor::new(llm.clone(), keyword_factory, config);

        let err = extractor.extract("Mira").unwrap_err();
        assert!(matches!(err, ExtractorError::SnapshotNotFound(_)));
        assert!(err.is_configuration_missing());
        assert_eq!(llm.call_count(), 0);
    }

    #[test]
    fn test_provider_errors_propagate() {
        let (_dir, config) = setup();
        IndexBuilder::new(config.clone(), keyword_factory).build().unwrap();

        let mut llm = MockProvider::default();
        llm.add_error("Mira");
        let extractor = Extractor::new(llm, keyword_factory, config.clone());
        assert!(matches!(extractor.extract("Mira"), Err(ExtractorError::Llm(_))));

        let extractor = Extractor::new(MockProvider::new(NOT_FOUND_JSON), offline_factory, config.clone());
        let err = extractor.extract("Mira").unwrap_err();
        assert!(matches!(err, ExtractorError::Embedding(EmbeddingError::MissingCredentials(_))));

        let err = IndexBuilder::new(config, offline_factory).build().unwrap_err();
        assert!(err.is_provider_error());
    }

    #[test]
    fn test_blank_name_rejected() {
        let (_dir, config) = setup();
        let llm = MockProvider::new(NOT_FOUND_JSON);
        let extractor = Extractor::new(llm.clone(), keyword_factory, config);

        assert!(matches!(
            extractor.extract("   "),
            Err(ExtractorError::InvalidInput(_))
        ));
        assert_eq!(llm.call_count(), 0);
    }

    #[test]
    fn test_hashing_backend_end_to_end() {
        let (_dir, mut config) = setup();
        config.embedding = EmbeddingConfig::hashing(512);
        let factory = DefaultEmbedderFactory::new(None);

        let summary = IndexBuilder::new(config.clone(), factory.clone()).build().unwrap();
        assert_eq!(summary.dimension, 512);

        let llm = MockProvider::new(record_json("Mira", "Glass Harbor"));
        assert_eq!(llm.model_name(), "mock");
        let extractor = Extractor::new(llm, factory, config);
        let report = extractor.extract_detailed("Mira").unwrap();
        assert_eq!(report.retrieved.len(), 2);
        assert_eq!(report.record.name, "Mira");
    }
}
