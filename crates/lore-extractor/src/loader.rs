//! Story loading from a directory of text files

use crate::error::ExtractorError;
use lore_domain::Document;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const STORY_EXTENSION: &str = "txt";

/// Load every `*.txt` file directly inside `dir` as one document
///
/// Files are visited in name order. Whitespace-only files are skipped.
/// Documents longer than `max_chars` are kept but logged.
pub fn load_stories(dir: &Path, max_chars: usize) -> Result<Vec<Document>, ExtractorError> {
    if !dir.is_dir() {
        return Err(ExtractorError::StoriesNotFound(dir.to_path_buf()));
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<_, _>>()?;
    paths.retain(|path| {
        path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some(STORY_EXTENSION)
    });
    paths.sort();

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let content = fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            warn!("Skipping empty story {}", path.display());
            continue;
        }

        let chars = content.chars().count();
        if chars > max_chars {
            warn!(
                "Story {} has {} characters (limit {}); its embedding may be truncated",
                path.display(),
                chars,
                max_chars
            );
        }

        debug!("Loaded {} ({} chars)", path.display(), chars);
        documents.push(Document::from_path(&path, content));
    }

    if documents.is_empty() {
        return Err(ExtractorError::NoStories(dir.to_path_buf()));
    }
    Ok(documents)
}
