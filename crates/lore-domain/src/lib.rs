//! Lore Domain Layer
//!
//! Core data model and capability traits for the Lore character extractor.
//! Infrastructure (embedding, vector storage, language models) lives in other
//! crates and plugs in through the traits defined here.
//!
//! ## Key Concepts
//!
//! - **Document**: one story file, loaded whole and never mutated
//! - **Character Record**: the structured answer for one character query
//! - **Embedding Configuration**: everything needed to reproduce the embedding
//!   function an index was built with
//!
//! ## Architecture
//!
//! - Pure data and trait definitions only
//! - No I/O, no network, no persistence
//! - Serialization derives so records can cross the generation boundary

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod character;
pub mod document;
pub mod embedding_config;
pub mod traits;

// Re-exports for convenience
pub use character::{CharacterRecord, Relation};
pub use document::Document;
pub use embedding_config::{EmbeddingBackend, EmbeddingConfig};
pub use traits::{GenerationProvider, GenerationRequest};
