//! HNSW Vector Index for Semantic Search
//!
//! This module provides a wrapper around the HNSW algorithm for
//! nearest-neighbor search over document embeddings.
//!
//! # Architecture
//!
//! - In-memory only; the persisted snapshot stores raw vectors and the index
//!   is rebuilt from them on load
//! - Internal ids are document positions in the owning [`crate::StoryIndex`]
//!
//! # HNSW Parameters
//!
//! - **M**: Number of bi-directional links per node (default: 16)
//! - **efConstruction**: Size of dynamic candidate list during construction (default: 200)
//! - **efSearch**: Size of dynamic candidate list during search (caller supplied)

use hnsw_rs::prelude::*;
use thiserror::Error;

const DEFAULT_M: usize = 16;
const DEFAULT_EF_CONSTRUCTION: usize = 200;
const MAX_LAYERS: usize = 16;

/// Errors that can occur during vector index operations
#[derive(Error, Debug)]
pub enum VectorIndexError {
    /// Invalid embedding dimension
    #[error("Invalid embedding dimension: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension provided
        actual: usize,
    },

    /// Internal HNSW error
    #[error("HNSW error: {0}")]
    Internal(String),
}

/// A wrapper around HNSW for vector similarity search
///
/// # Examples
///
/// ```no_run
/// use lore_store::vector_index::VectorIndex;
///
/// let mut index = VectorIndex::with_capacity(3, 10);
/// index.add(0, &[1.0, 0.0, 0.0]).unwrap();
///
/// let results = index.search(&[1.0, 0.0, 0.0], 1, 64).unwrap();
/// assert_eq!(results[0].0, 0);
/// ```
pub struct VectorIndex {
    dimension: usize,
    hnsw: Hnsw<'static, f32, DistCosine>,
    len: usize,
}

impl VectorIndex {
    /// Create an index sized for about `capacity` vectors
    pub fn with_capacity(dimension: usize, capacity: usize) -> Self {
        let max_elements = capacity.max(1);
        let nb_layer = MAX_LAYERS
            .min((max_elements as f32).ln().trunc() as usize)
            .max(1);

        let hnsw = Hnsw::<'static, f32, DistCosine>::new(
            DEFAULT_M,
            max_elements,
            nb_layer,
            DEFAULT_EF_CONSTRUCTION,
            DistCosine {},
        );

        Self {
            dimension,
            hnsw,
            len: 0,
        }
    }

    /// Expected vector dimension
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Add a vector under `id`
    pub fn add(&mut self, id: usize, embedding: &[f32]) -> Result<(), VectorIndexError> {
        if embedding.len() != self.dimension {
            return Err(VectorIndexError::DimensionMismatch {
                expected: self.dimension,
                actual: embedding.len(),
            });
        }

        self.hnsw.insert((embedding, id));
        self.len += 1;
        Ok(())
    }

    /// Search for the k nearest neighbors to the given embedding
    ///
    /// Returns `(id, similarity)` pairs sorted by similarity (descending).
    pub fn search(
        &self,
        query: &[f32],
        k: usize,
        ef_search: usize,
    ) -> Result<Vec<(usize, f32)>, VectorIndexError> {
        if query.len() != self.dimension {
            return Err(VectorIndexError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        if k == 0 || self.len == 0 {
            return Ok(Vec::new());
        }

        let k = k.min(self.len);
        let neighbours = self.hnsw.search(query, k, ef_search.max(k));

        // HNSW returns cosine distance; similarity = 1 - distance
        let mut results: Vec<(usize, f32)> = neighbours
            .into_iter()
            .map(|neighbour| (neighbour.d_id, 1.0 - neighbour.distance))
            .collect();

        results.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        results.truncate(k);

        Ok(results)
    }

    /// Get the number of vectors in the index
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_index_creation() {
        let index = VectorIndex::with_capacity(384, 10);
        assert_eq!(index.dimension(), 384);
        assert!(index.is_empty());
    }

    #[test]
    fn test_add_and_search() {
        let mut index = VectorIndex::with_capacity(384, 10);

        let embedding1: Vec<f32> = (0..384).map(|i| (i as f32) / 384.0).collect();
        index.add(0, &embedding1).unwrap();

        let mut embedding2: Vec<f32> = (0..384).map(|i| (i as f32) / 384.0).collect();
        embedding2[0] = 0.5;
        index.add(1, &embedding2).unwrap();

        assert_eq!(index.len(), 2);

        let results = index.search(&embedding1, 2, 64).unwrap();
        assert_eq!(results.len(), 2);

        // First result should be the exact match
        assert_eq!(results[0].0, 0);
        assert!(results[0].1 > 0.99);
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut index = VectorIndex::with_capacity(384, 10);

        let result = index.add(0, &[0.1; 128]);
        assert!(matches!(result, Err(VectorIndexError::DimensionMismatch { .. })));

        let result = index.search(&[0.1; 128], 1, 64);
        assert!(matches!(result, Err(VectorIndexError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_search_empty_index() {
        let index = VectorIndex::with_capacity(3, 1);
        assert!(index.search(&[1.0, 0.0, 0.0], 2, 64).unwrap().is_empty());
    }

    #[test]
    fn test_k_larger_than_index() {
        let mut index = VectorIndex::with_capacity(3, 2);
        index.add(0, &[1.0, 0.0, 0.0]).unwrap();
        index.add(1, &[0.0, 1.0, 0.0]).unwrap();

        let results = index.search(&[1.0, 0.0, 0.0], 10, 64).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_cosine_ordering() {
        let mut index = VectorIndex::with_capacity(3, 3);

        index.add(0, &[1.0, 0.0, 0.0]).unwrap(); // Unit vector along X
        index.add(1, &[0.0, 1.0, 0.0]).unwrap(); // Orthogonal
        index.add(2, &[0.7071, 0.7071, 0.0]).unwrap(); // 45 degrees from X

        let results = index.search(&[1.0, 0.0, 0.0], 3, 64).unwrap();

        assert_eq!(results[0].0, 0);
        assert!(results[0].1 > 0.99);

        assert_eq!(results[1].0, 2);
        assert!(results[1].1 > 0.5);

        assert_eq!(results[2].0, 1);
        assert!(results[2].1 < 0.1);
    }
}
