//! Character record - the structured answer produced per query

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A relationship between the queried character and another character
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Relation {
    /// Name of the related character
    pub name: String,

    /// Type of relationship
    pub relation: String,
}

/// Structured information about one character
///
/// Every field is required on deserialization and unknown fields are
/// rejected, so a record that parses is schema-conformant. An empty `name`
/// is the designed "character not found" signal; it is not an error.
///
/// Serialized keys are camelCase (`storyTitle`, `characterType`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CharacterRecord {
    /// Name of the character
    pub name: String,

    /// Title of the story
    pub story_title: String,

    /// Brief character summary in 2-3 sentences
    pub summary: String,

    /// List of character relationships
    pub relations: Vec<Relation>,

    /// Character type: protagonist/antagonist/side character
    pub character_type: String,
}

impl CharacterRecord {
    /// The sentinel record for a character absent from the stories
    ///
    /// # Examples
    ///
    /// ```
    /// use lore_domain::CharacterRecord;
    ///
    /// assert!(CharacterRecord::not_found().is_not_found());
    /// ```
    pub fn not_found() -> Self {
        Self {
            name: String::new(),
            story_title: String::new(),
            summary: String::new(),
            relations: Vec::new(),
            character_type: String::new(),
        }
    }

    /// Whether this record signals that the character was not found
    pub fn is_not_found(&self) -> bool {
        self.name.trim().is_empty()
    }
}
