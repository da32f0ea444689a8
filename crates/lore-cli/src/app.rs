//! Query and build flows shared by the binaries.

use crate::error::Result;
use crate::output::Formatter;
use lore_domain::{CharacterRecord, GenerationProvider};
use lore_extractor::{BuildSummary, Extractor, ExtractorConfig, IndexBuilder};
use lore_store::EmbedderFactory;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// What a query produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// The record was printed and written to `path`
    Saved {
        /// Output file
        path: PathBuf,
    },
    /// The character does not appear in the retrieved stories; nothing written
    NotFound,
}

/// Serialize a record with two-space indentation.
pub fn render_record(record: &CharacterRecord) -> Result<String> {
    Ok(serde_json::to_string_pretty(record)?)
}

/// Extract `character_name`, then print and save the record unless it is the
/// not-found sentinel.
pub fn run_query<L, F>(
    extractor: &Extractor<L, F>,
    character_name: &str,
    output_file: &Path,
    formatter: &Formatter,
) -> Result<QueryOutcome>
where
    L: GenerationProvider,
    L::Error: Display,
    F: EmbedderFactory,
{
    let report = extractor.extract_detailed(character_name)?;
    if !report.config_consistent {
        println!(
            "{}",
            formatter.warning("Embedding configuration differs from the index; results may be unreliable")
        );
    }

    if report.record.is_not_found() {
        warn!("Character '{}' not found in the stories", character_name);
        println!(
            "{}",
            formatter.warning(&format!("Character '{}' not found in the stories.", character_name))
        );
        return Ok(QueryOutcome::NotFound);
    }

    let json = render_record(&report.record)?;
    println!("{}", formatter.record_block(&json));

    fs::write(output_file, &json)?;
    info!("Output saved to: {}", output_file.display());
    println!(
        "{}",
        formatter.success(&format!("Output saved to: {}", output_file.display()))
    );

    Ok(QueryOutcome::Saved {
        path: output_file.to_path_buf(),
    })
}

/// The line a binary prints to stderr before exiting with status 1.
pub fn render_error(formatter: &Formatter, error: &dyn Display) -> String {
    formatter.error(&format!("Error: {}", error))
}

/// Rebuild the index and report what was written.
pub fn run_build<F: EmbedderFactory>(
    config: ExtractorConfig,
    factory: F,
    formatter: &Formatter,
) -> Result<BuildSummary> {
    let summary = IndexBuilder::new(config, factory).build()?;

    println!(
        "{}",
        formatter.info(&format!(
            "Indexed {} stories ({} dimensions)",
            summary.documents, summary.dimension
        ))
    );
    println!(
        "{}",
        formatter.success(&format!("Index saved to: {}", summary.snapshot_path.display()))
    );
    Ok(summary)
}
