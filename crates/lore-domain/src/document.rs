//! Document module - one unit of raw narrative text

use serde::{Deserialize, Serialize};
use std::path::Path;

/// A story loaded from disk
///
/// Each story file becomes exactly one document; there is no sub-document
/// chunking. Documents are immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Full text of the story
    pub content: String,

    /// Originating file path, if known
    pub source: Option<String>,
}

impl Document {
    /// Create a document with a known source
    ///
    /// # Examples
    ///
    /// ```
    /// use lore_domain::Document;
    ///
    /// let doc = Document::new("Once upon a time...", "stories/the-fox.txt");
    /// assert_eq!(doc.source.as_deref(), Some("stories/the-fox.txt"));
    /// ```
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: Some(source.into()),
        }
    }

    /// Create a document with no source metadata
    pub fn without_source(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: None,
        }
    }

    /// Create a document from a file path and its text
    pub fn from_path(path: &Path, content: impl Into<String>) -> Self {
        Self::new(content, path.to_string_lossy())
    }
}
