//! Story index - the persisted vector store over story documents

use crate::embedding::{cosine_similarity, EmbeddingModel};
use crate::snapshot;
use crate::vector_index::VectorIndex;
use crate::StoreError;
use lore_domain::{Document, EmbeddingConfig};
use std::path::Path;
use tracing::{debug, info};

/// A document returned by similarity search
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument {
    /// The retrieved document
    pub document: Document,

    /// Cosine similarity to the query (higher is closer)
    pub score: f32,
}

/// Documents, their embeddings and an HNSW index over them
///
/// A `StoryIndex` is never updated in place: building one always starts
/// from the full document set, and saving replaces the whole snapshot.
pub struct StoryIndex {
    documents: Vec<Document>,
    embeddings: Vec<Vec<f32>>,
    index: VectorIndex,
}

impl StoryIndex {
    /// Embed every document and index the results
    pub fn from_documents(
        documents: Vec<Document>,
        embedder: &dyn EmbeddingModel,
    ) -> Result<Self, StoreError> {
        info!(
            "Embedding {} documents with {}",
            documents.len(),
            embedder.model_name()
        );

        let texts: Vec<&str> = documents.iter().map(|d| d.content.as_str()).collect();
        let embeddings = embedder.embed_batch(&texts)?;

        Self::from_embeddings(documents, embeddings)
    }

    /// Index documents whose embeddings are already known
    pub fn from_embeddings(
        documents: Vec<Document>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<Self, StoreError> {
        if documents.is_empty() {
            return Err(StoreError::InvalidData(
                "Cannot build an index with no documents".to_string(),
            ));
        }
        if documents.len() != embeddings.len() {
            return Err(StoreError::InvalidData(format!(
                "{} documents but {} embeddings",
                documents.len(),
                embeddings.len()
            )));
        }

        let dimension = embeddings[0].len();
        let mut index = VectorIndex::with_capacity(dimension, documents.len());
        for (id, embedding) in embeddings.iter().enumerate() {
            index.add(id, embedding)?;
        }

        debug!("Indexed {} vectors of dimension {}", index.len(), dimension);

        Ok(Self {
            documents,
            embeddings,
            index,
        })
    }

    /// Embed `query` and return the `k` most similar documents, most similar first
    pub fn similarity_search(
        &self,
        embedder: &dyn EmbeddingModel,
        query: &str,
        k: usize,
        ef_search: usize,
    ) -> Result<Vec<ScoredDocument>, StoreError> {
        let query_embedding = embedder.embed(query)?;
        self.search_by_vector(&query_embedding, k, ef_search)
    }

    /// Return the `k` documents closest to `vector`, most similar first
    ///
    /// Results are exact. The HNSW candidate list is widened to the whole
    /// corpus, every candidate is re-scored against its stored embedding, and
    /// documents the graph walk did not reach are scored directly.
    /// `ef_search` is a lower bound on the candidate list size.
    pub fn search_by_vector(
        &self,
        vector: &[f32],
        k: usize,
        ef_search: usize,
    ) -> Result<Vec<ScoredDocument>, StoreError> {
        let total = self.len();
        let candidates = self.index.search(vector, total, ef_search.max(total))?;
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut seen = vec![false; total];
        let mut scored = Vec::with_capacity(total);
        for (id, _) in candidates {
            let embedding = self.embeddings.get(id).ok_or_else(|| {
                StoreError::InvalidData(format!("Index returned unknown document id {}", id))
            })?;
            if seen[id] {
                continue;
            }
            seen[id] = true;
            scored.push((id, cosine_similarity(vector, embedding)));
        }

        let unreached = seen.iter().filter(|visited| !**visited).count();
        if unreached > 0 {
            debug!("{} documents unreached by the graph walk; scoring them directly", unreached);
            for (id, embedding) in self.embeddings.iter().enumerate() {
                if !seen[id] {
                    scored.push((id, cosine_similarity(vector, embedding)));
                }
            }
        }

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(id, score)| ScoredDocument {
                document: self.documents[id].clone(),
                score,
            })
            .collect())
    }

    /// Persist the index together with the configuration that produced it
    pub fn save(&self, path: &Path, config: &EmbeddingConfig) -> Result<(), StoreError> {
        snapshot::write(
            path,
            &self.documents,
            &self.embeddings,
            self.dimension(),
            config,
        )?;
        info!("Saved {} documents to {}", self.len(), path.display());
        Ok(())
    }

    /// Restore an index and its recorded embedding configuration
    pub fn load(path: &Path) -> Result<(Self, EmbeddingConfig), StoreError> {
        let contents = snapshot::read(path)?;
        info!(
            "Loaded {} documents ({} dimensions) from {}",
            contents.documents.len(),
            contents.dimension,
            path.display()
        );
        let index = Self::from_embeddings(contents.documents, contents.embeddings)?;
        Ok((index, contents.config))
    }

    /// Read only the recorded embedding configuration
    pub fn read_config(path: &Path) -> Result<EmbeddingConfig, StoreError> {
        snapshot::read_config(path).map(|(config, _)| config)
    }

    /// Indexed documents, in insertion order
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Embedding dimension
    pub fn dimension(&self) -> usize {
        self.index.dimension()
    }

    /// Number of indexed documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the index holds no documents
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
