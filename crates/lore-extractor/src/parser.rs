//! Parse LLM output into a character record

use crate::error::ExtractorError;
use lore_domain::CharacterRecord;

/// Parse and validate the model's raw answer
///
/// Deserialization is the validation step: every field must be present with
/// the right type and unknown fields are rejected.
pub fn parse_character_record(response: &str) -> Result<CharacterRecord, ExtractorError> {
    let json_str = extract_json(response)?;

    serde_json::from_str(json_str)
        .map_err(|e| ExtractorError::InvalidFormat(format!("Record does not match schema: {}", e)))
}

/// Extract JSON from response, handling markdown code blocks
fn extract_json(response: &str) -> Result<&str, ExtractorError> {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        return Err(ExtractorError::InvalidFormat("Empty response".to_string()));
    }

    if let Some(rest) = trimmed.strip_prefix("```") {
        // Drop the language tag, which may share a line with the payload
        let body = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
        let body = body.trim_end();
        let body = body.strip_suffix("```").unwrap_or(body).trim();
        if body.is_empty() {
            return Err(ExtractorError::InvalidFormat("Empty code block".to_string()));
        }
        Ok(body)
    } else {
        Ok(trimmed)
    }
}
