//! JSON schema of the character record handed to the generation provider

use crate::error::ExtractorError;
use lore_domain::CharacterRecord;
use serde_json::Value;

/// Name under which the schema is sent
pub const SCHEMA_NAME: &str = "character_record";

/// Schema for [`CharacterRecord`] with `additionalProperties: false` on every object
pub fn character_record_schema() -> Result<Value, ExtractorError> {
    let schema = schemars::schema_for!(CharacterRecord);
    let mut value = serde_json::to_value(schema)
        .map_err(|e| ExtractorError::Config(format!("Failed to serialize record schema: {}", e)))?;
    add_additional_properties_false(&mut value);
    Ok(value)
}

/// Close every object schema in `value` to unknown properties
///
/// Strict structured-output modes reject schemas that leave objects open.
pub fn add_additional_properties_false(value: &mut Value) {
    match value {
        Value::Object(map) => {
            let is_object_schema = map.get("type").and_then(Value::as_str) == Some("object")
                || map.contains_key("properties");
            if is_object_schema {
                map.insert("additionalProperties".to_string(), Value::Bool(false));
            }
            for child in map.values_mut() {
                add_additional_properties_false(child);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(add_additional_properties_false),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_requires_every_field() {
        let schema = character_record_schema().unwrap();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();

        for field in ["name", "storyTitle", "summary", "relations", "characterType"] {
            assert!(required.contains(&field), "{} not required", field);
        }
        assert_eq!(schema["additionalProperties"], false);
    }

    #[test]
    fn test_relations_are_an_array_of_closed_objects() {
        let schema = character_record_schema().unwrap();
        assert_eq!(schema["properties"]["relations"]["type"], "array");

        let relation = schema["$defs"]["Relation"].clone();
        assert_eq!(relation["additionalProperties"], false);
        assert!(relation["properties"]["relation"].is_object());
    }

    #[test]
    fn test_nested_objects_are_closed() {
        let mut value = json!({
            "type": "object",
            "properties": {
                "inner": { "type": "object", "properties": { "x": { "type": "string" } } },
                "list": { "type": "array", "items": [{ "properties": {} }] }
            }
        });
        add_additional_properties_false(&mut value);

        assert_eq!(value["additionalProperties"], false);
        assert_eq!(value["properties"]["inner"]["additionalProperties"], false);
        assert_eq!(value["properties"]["list"]["items"][0]["additionalProperties"], false);
        assert!(value["properties"]["inner"]["properties"]["x"]
            .get("additionalProperties")
            .is_none());
    }
}
