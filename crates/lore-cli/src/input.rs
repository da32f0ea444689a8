//! Interactive input.

use crate::error::{CliError, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

const NAME_PROMPT: &str = "Enter the character name to extract details for: ";

/// Prompt for a character name on the terminal.
pub fn read_character_name() -> Result<String> {
    let mut editor = DefaultEditor::new()
        .map_err(|e| CliError::Readline(format!("Failed to initialize editor: {}", e)))?;

    match editor.readline(NAME_PROMPT) {
        Ok(line) => parse_character_name(&line),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
            Err(CliError::InvalidInput("No character name entered".to_string()))
        }
        Err(e) => Err(CliError::Readline(e.to_string())),
    }
}

/// Trim the entered name; a blank name is rejected.
pub fn parse_character_name(line: &str) -> Result<String> {
    let name = line.trim();
    if name.is_empty() {
        return Err(CliError::InvalidInput(
            "Character name must not be empty".to_string(),
        ));
    }
    Ok(name.to_string())
}
