//! Normalized activity events.
//!
//! An `ActivityEvent` is one line of the research narration: a phase title
//! plus a small display payload.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Joined list text longer than this is rendered one item per line.
const INLINE_LIST_LIMIT: usize = 100;
/// Mappings rendered as `key: value` lines must have fewer keys than this.
const FIELD_KEY_LIMIT: usize = 5;
/// Mappings rendered as `key: value` lines must serialize shorter than this.
const FIELD_JSON_LIMIT: usize = 200;

/// Phase label of an activity event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityTitle {
    GeneratingSearchQueries,
    WebResearch,
    Reflection,
    FinalizingAnswer,
    /// Fallback label for displayable events outside the fixed phases.
    Other(String),
}

impl ActivityTitle {
    /// Returns the display label.
    pub fn label(&self) -> &str {
        match self {
            Self::GeneratingSearchQueries => "Generating Search Queries",
            Self::WebResearch => "Web Research",
            Self::Reflection => "Reflection",
            Self::FinalizingAnswer => "Finalizing Answer",
            Self::Other(label) => label,
        }
    }
}

impl fmt::Display for ActivityTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Display payload of an activity event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActivityData {
    Text(String),
    List(Vec<String>),
    Fields(BTreeMap<String, String>),
}

impl ActivityData {
    /// Renders the payload as terminal text.
    ///
    /// - Text is returned verbatim.
    /// - Lists are comma-joined, or one item per line once the joined form
    ///   exceeds 100 characters.
    /// - Small mappings (1–4 keys, under 200 chars of JSON) become `key: value`
    ///   lines; anything larger falls back to compact JSON.
    pub fn render(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::List(items) => {
                let joined = items.join(", ");
                if joined.chars().count() > INLINE_LIST_LIMIT {
                    items
                        .iter()
                        .map(|item| format!("• {}", item))
                        .collect::<Vec<_>>()
                        .join("\n")
                } else {
                    joined
                }
            }
            Self::Fields(fields) => {
                let json = serde_json::to_string(fields).unwrap_or_default();
                if !fields.is_empty()
                    && fields.len() < FIELD_KEY_LIMIT
                    && json.chars().count() < FIELD_JSON_LIMIT
                {
                    fields
                        .iter()
                        .map(|(key, value)| format!("{}: {}", key, value))
                        .collect::<Vec<_>>()
                        .join("\n")
                } else {
                    json
                }
            }
        }
    }
}

impl From<String> for ActivityData {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for ActivityData {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// A single entry of a research timeline.
///
/// Events are created by the classifier and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub title: ActivityTitle,
    pub data: ActivityData,
}

impl ActivityEvent {
    pub fn new(title: ActivityTitle, data: impl Into<ActivityData>) -> Self {
        Self {
            title,
            data: data.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_labels() {
        assert_eq!(
            ActivityTitle::GeneratingSearchQueries.label(),
            "Generating Search Queries"
        );
        assert_eq!(ActivityTitle::WebResearch.to_string(), "Web Research");
        assert_eq!(ActivityTitle::Other("Thinking".into()).label(), "Thinking");
    }

    #[test]
    fn test_short_list_renders_inline() {
        let data = ActivityData::List(vec!["rust".into(), "tokio".into()]);
        assert_eq!(data.render(), "rust, tokio");
    }

    #[test]
    fn test_long_list_renders_one_per_line() {
        let items: Vec<String> = (0..12).map(|i| format!("query number {}", i)).collect();
        let rendered = ActivityData::List(items).render();

        assert_eq!(rendered.lines().count(), 12);
        assert!(rendered.starts_with("• query number 0"));
    }

    #[test]
    fn test_small_fields_render_as_lines() {
        let mut fields = BTreeMap::new();
        fields.insert("loop".to_string(), "2".to_string());
        fields.insert("model".to_string(), "flash".to_string());

        assert_eq!(ActivityData::Fields(fields).render(), "loop: 2\nmodel: flash");
    }

    #[test]
    fn test_large_fields_fall_back_to_json() {
        let fields: BTreeMap<String, String> = (0..6)
            .map(|i| (format!("k{}", i), "v".to_string()))
            .collect();
        let rendered = ActivityData::Fields(fields).render();

        assert!(rendered.starts_with('{'));
        assert!(rendered.contains("\"k5\":\"v\""));
    }
}
