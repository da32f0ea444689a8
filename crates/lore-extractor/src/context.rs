//! Context assembly from retrieved stories

use lore_domain::Document;
use std::path::Path;

/// Title used when a document has no source
pub const UNKNOWN_STORY: &str = "Unknown Story";

/// Separator between stories in the assembled context
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Human-readable title derived from a document's source path
///
/// `stories/the-glass_harbor.txt` becomes `The Glass Harbor`.
pub fn story_title(source: Option<&str>) -> String {
    let stem = source
        .and_then(|s| Path::new(s).file_stem())
        .map(|stem| title_case(&stem.to_string_lossy().replace(['-', '_'], " ")));

    match stem {
        Some(title) if !title.is_empty() => title,
        _ => UNKNOWN_STORY.to_string(),
    }
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Join retrieved documents into one context block, in the given order
pub fn assemble_context<'a, I>(documents: I) -> String
where
    I: IntoIterator<Item = &'a Document>,
{
    documents
        .into_iter()
        .map(|doc| format!("Story: {}\n{}", story_title(doc.source.as_deref()), doc.content))
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_title_from_hyphenated_stem() {
        assert_eq!(story_title(Some("stories/the-glass-harbor.txt")), "The Glass Harbor");
        assert_eq!(story_title(Some("goat_HILLS.txt")), "Goat Hills");
    }

    #[test]
    fn test_missing_source_is_unknown() {
        assert_eq!(story_title(None), UNKNOWN_STORY);
        assert_eq!(story_title(Some("")), UNKNOWN_STORY);
        assert_eq!(story_title(Some("stories/---.txt")), UNKNOWN_STORY);
    }

    #[test]
    fn test_context_layout() {
        let docs = vec![
            Document::new("Mira keeps the light.", "stories/glass-harbor.txt"),
            Document::without_source("An old tale."),
        ];
        assert_eq!(
            assemble_context(&docs),
            "Story: Glass Harbor\nMira keeps the light.\n\n---\n\nStory: Unknown Story\nAn old tale."
        );
    }

    #[test]
    fn test_empty_context() {
        assert_eq!(assemble_context(&Vec::<Document>::new()), "");
    }

    proptest! {
        #[test]
        fn prop_title_words_are_capitalized(words in prop::collection::vec("[a-z]{1,8}", 1..5)) {
            let source = format!("stories/{}.txt", words.join("-"));
            let title = story_title(Some(&source));

            prop_assert_eq!(title.split(' ').count(), words.len());
            for word in title.split(' ') {
                let first = word.chars().next().unwrap();
                prop_assert!(first.is_uppercase());
                prop_assert!(word.chars().skip(1).all(|c| c.is_lowercase()));
            }
        }

        #[test]
        fn prop_context_has_one_part_per_document(count in 1usize..6) {
            let docs: Vec<Document> = (0..count)
                .map(|i| Document::new(format!("content {}", i), format!("s{}.txt", i)))
                .collect();
            let context = assemble_context(&docs);
            prop_assert_eq!(context.split(CONTEXT_SEPARATOR).count(), count);
        }
    }
}
