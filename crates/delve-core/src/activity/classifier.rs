//! Backend update classification.
//!
//! Maps one raw backend update to at most one `ActivityEvent`. The mapping is
//! pure; the finalize side effect is reported through `Classification` so the
//! caller decides where the turn-completion flag lives.

use super::backend_event::{
    BackendEvent, GenerateQueryUpdate, ReflectionUpdate, SourceRecord, WebResearchUpdate,
};
use super::event::{ActivityEvent, ActivityTitle};
use serde_json::Value;

/// Maximum number of source labels quoted in a web-research summary.
const MAX_SOURCE_LABELS: usize = 3;

const REFLECTION_SUFFICIENT: &str = "Search successful, generating final answer.";
const FINALIZE_MESSAGE: &str = "Composing and presenting the final answer.";

/// Result of classifying one backend update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// The timeline entry to append, if the update is narrated.
    pub event: Option<ActivityEvent>,
    /// True when the update is the terminal finalize step.
    pub finalizes_turn: bool,
}

impl Classification {
    fn narrated(event: ActivityEvent) -> Self {
        Self {
            event: Some(event),
            finalizes_turn: false,
        }
    }

    fn ignored() -> Self {
        Self {
            event: None,
            finalizes_turn: false,
        }
    }
}

/// Classifies a typed backend update.
pub fn classify(event: &BackendEvent) -> Classification {
    match event {
        BackendEvent::GenerateQuery(update) => Classification::narrated(generate_query(update)),
        BackendEvent::WebResearch(update) => Classification::narrated(web_research(update)),
        BackendEvent::Reflection(update) => Classification::narrated(reflection(update)),
        BackendEvent::FinalizeAnswer(_) => Classification {
            event: Some(ActivityEvent::new(
                ActivityTitle::FinalizingAnswer,
                FINALIZE_MESSAGE,
            )),
            finalizes_turn: true,
        },
        BackendEvent::Other(_) => Classification::ignored(),
    }
}

/// Classifies a raw backend update object.
pub fn classify_value(value: &Value) -> Classification {
    classify(&BackendEvent::from_value(value))
}

fn generate_query(update: &GenerateQueryUpdate) -> ActivityEvent {
    ActivityEvent::new(
        ActivityTitle::GeneratingSearchQueries,
        update.query_list.join(", "),
    )
}

fn web_research(update: &WebResearchUpdate) -> ActivityEvent {
    let labels = distinct_labels(&update.sources_gathered);
    let related = if labels.is_empty() {
        "N/A".to_string()
    } else {
        labels.join(", ")
    };

    ActivityEvent::new(
        ActivityTitle::WebResearch,
        format!(
            "Gathered {} sources. Related to: {}.",
            update.sources_gathered.len(),
            related
        ),
    )
}

fn reflection(update: &ReflectionUpdate) -> ActivityEvent {
    let data = if update.is_sufficient {
        REFLECTION_SUFFICIENT.to_string()
    } else {
        format!(
            "Need more information, searching for {}.",
            update.follow_up_queries.join(", ")
        )
    };

    ActivityEvent::new(ActivityTitle::Reflection, data)
}

/// Distinct non-empty labels in first-seen order, capped at three.
fn distinct_labels(sources: &[SourceRecord]) -> Vec<&str> {
    let mut labels: Vec<&str> = Vec::with_capacity(MAX_SOURCE_LABELS);
    for label in sources
        .iter()
        .filter_map(|source| source.label.as_deref())
        .filter(|label| !label.is_empty())
    {
        if !labels.contains(&label) {
            labels.push(label);
            if labels.len() == MAX_SOURCE_LABELS {
                break;
            }
        }
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::ActivityData;
    use serde_json::json;

    fn data_of(classification: &Classification) -> String {
        match &classification.event {
            Some(ActivityEvent {
                data: ActivityData::Text(text),
                ..
            }) => text.clone(),
            other => panic!("expected text event, got {:?}", other),
        }
    }

    #[test]
    fn test_generate_query_joins_queries() {
        let result = classify_value(&json!({
            "generate_query": {"query_list": ["euro 2024 winner", "euro 2024 top scorer"]}
        }));

        let event = result.event.as_ref().unwrap();
        assert_eq!(event.title, ActivityTitle::GeneratingSearchQueries);
        assert_eq!(data_of(&result), "euro 2024 winner, euro 2024 top scorer");
        assert!(!result.finalizes_turn);
    }

    #[test]
    fn test_web_research_summary_dedups_and_skips_empty_labels() {
        let result = classify_value(&json!({
            "web_research": {"sources_gathered": [
                {"label": "A"}, {"label": "A"}, {"label": "B"}, {"label": ""}
            ]}
        }));

        assert_eq!(
            result.event.as_ref().unwrap().title,
            ActivityTitle::WebResearch
        );
        assert_eq!(data_of(&result), "Gathered 4 sources. Related to: A, B.");
    }

    #[test]
    fn test_web_research_caps_labels_at_three() {
        let result = classify_value(&json!({
            "web_research": {"sources_gathered": [
                {"label": "uefa"}, {"label": "bbc"}, {"label": "espn"}, {"label": "wiki"}
            ]}
        }));

        assert_eq!(
            data_of(&result),
            "Gathered 4 sources. Related to: uefa, bbc, espn."
        );
    }

    #[test]
    fn test_web_research_without_labels_says_na() {
        let result = classify_value(&json!({"web_research": {}}));
        assert_eq!(data_of(&result), "Gathered 0 sources. Related to: N/A.");

        let result = classify_value(&json!({
            "web_research": {"sources_gathered": [{"short_url": "x"}, {"label": ""}]}
        }));
        assert_eq!(data_of(&result), "Gathered 2 sources. Related to: N/A.");
    }

    #[test]
    fn test_false_step_falls_through_to_next_key() {
        let result = classify_value(&json!({
            "generate_query": false,
            "web_research": {"sources_gathered": [{"label": "docs"}]}
        }));

        assert_eq!(
            result.event.as_ref().map(|event| &event.title),
            Some(&ActivityTitle::WebResearch)
        );
        assert_eq!(data_of(&result), "Gathered 1 sources. Related to: docs.");
    }

    #[test]
    fn test_reflection_sufficient() {
        let result = classify_value(&json!({
            "reflection": {"is_sufficient": true, "follow_up_queries": ["ignored"]}
        }));

        assert_eq!(
            result.event.as_ref().unwrap().title,
            ActivityTitle::Reflection
        );
        assert_eq!(data_of(&result), "Search successful, generating final answer.");
    }

    #[test]
    fn test_reflection_needs_more() {
        let result = classify_value(&json!({
            "reflection": {"is_sufficient": false, "follow_up_queries": ["x", "y"]}
        }));

        assert_eq!(data_of(&result), "Need more information, searching for x, y.");
    }

    #[test]
    fn test_reflection_missing_follow_ups_degrades() {
        let result = classify_value(&json!({"reflection": {"is_sufficient": false}}));
        assert_eq!(data_of(&result), "Need more information, searching for .");
    }

    #[test]
    fn test_finalize_sets_completion() {
        let result = classify_value(&json!({"finalize_answer": {"messages": []}}));

        assert!(result.finalizes_turn);
        assert_eq!(
            result.event.as_ref().unwrap().title,
            ActivityTitle::FinalizingAnswer
        );
        assert_eq!(data_of(&result), "Composing and presenting the final answer.");
    }

    #[test]
    fn test_unrecognized_update_is_ignored() {
        let result = classify_value(&json!({"evaluate_research": {"route": "web_research"}}));

        assert_eq!(result.event, None);
        assert!(!result.finalizes_turn);
    }
}
