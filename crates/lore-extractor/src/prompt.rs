//! LLM prompt construction for character extraction

use crate::config::NAME_PLACEHOLDER;

/// Fixed system instruction for every extraction request
pub const SYSTEM_PROMPT: &str = r#"You are an expert at extracting character information from story texts.
Your task is to analyze the given stories and extract structured information about one character.

Extract the following fields:
1. name: The full name of the character.
2. storyTitle: The title of the story where the character appears.
3. summary: A brief summary (2-3 sentences) of the character's role and significance in the story.
4. relations: The character's relationships with other characters, each with the type of relationship.
5. characterType: The type of character (protagonist, antagonist or side character).

Rules:
- Extract only factual information from the provided stories
- If the character is not found, keep every field empty
- Include only relationships explicitly mentioned in the text
- Return only valid JSON, no additional text"#;

/// Builds the user instruction for one character
pub struct PromptBuilder<'a> {
    character_name: &'a str,
    context: &'a str,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder
    pub fn new(character_name: &'a str, context: &'a str) -> Self {
        Self {
            character_name,
            context,
        }
    }

    /// System instruction
    pub fn system(&self) -> &'static str {
        SYSTEM_PROMPT
    }

    /// User instruction carrying the name and retrieved stories
    pub fn user(&self) -> String {
        format!(
            "Extract information about the character: {}\n\nStories Context:\n{}\n\nReturn the JSON object:",
            self.character_name, self.context
        )
    }
}

/// Retrieval query for `character_name`
pub fn retrieval_query(template: &str, character_name: &str) -> String {
    template.replace(NAME_PLACEHOLDER, character_name)
}
