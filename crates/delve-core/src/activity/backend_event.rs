//! Raw research backend updates.
//!
//! The backend streams one JSON object per graph step, keyed by the name of
//! the step that produced it (`{"generate_query": {...}}`). `BackendEvent` is
//! the closed set of steps the timeline narrates, plus a catch-all.
//!
//! Payload parsing is lenient: missing or mistyped fields fall back to empty
//! values instead of failing, since the backend may evolve its payloads
//! independently of the front-end.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Step keys in classification priority order.
const GENERATE_QUERY: &str = "generate_query";
const WEB_RESEARCH: &str = "web_research";
const REFLECTION: &str = "reflection";
const FINALIZE_ANSWER: &str = "finalize_answer";

/// Payload of the query-generation step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateQueryUpdate {
    #[serde(deserialize_with = "lenient_strings")]
    pub query_list: Vec<String>,
}

/// One gathered source citation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceRecord {
    #[serde(deserialize_with = "lenient_string")]
    pub label: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub short_url: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub value: Option<String>,
}

/// Payload of a web-research step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebResearchUpdate {
    #[serde(deserialize_with = "lenient_sources")]
    pub sources_gathered: Vec<SourceRecord>,
}

/// Payload of the reflection step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflectionUpdate {
    #[serde(deserialize_with = "lenient_truthy")]
    pub is_sufficient: bool,
    #[serde(deserialize_with = "lenient_strings")]
    pub follow_up_queries: Vec<String>,
}

/// Payload of the finalize step. Its content is carried by the message list,
/// so only the curated sources are kept here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinalizeAnswerUpdate {
    #[serde(deserialize_with = "lenient_sources")]
    pub sources_gathered: Vec<SourceRecord>,
}

/// A raw backend update, one variant per narrated step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    GenerateQuery(GenerateQueryUpdate),
    WebResearch(WebResearchUpdate),
    Reflection(ReflectionUpdate),
    FinalizeAnswer(FinalizeAnswerUpdate),
    /// Auxiliary update the timeline does not narrate. Holds the first key
    /// of the update object, if any, for diagnostics.
    Other(Option<String>),
}

impl BackendEvent {
    /// Interprets a raw update object.
    ///
    /// Each update carries at most one recognized step key; if several are
    /// present the first in priority order wins. A key whose value is falsy
    /// (`null`, `false`, `0` or `""`) counts as absent.
    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::Other(None);
        };

        let step = |key: &str| object.get(key).filter(|payload| is_present(payload));

        if let Some(payload) = step(GENERATE_QUERY) {
            Self::GenerateQuery(parse_payload(GENERATE_QUERY, payload))
        } else if let Some(payload) = step(WEB_RESEARCH) {
            Self::WebResearch(parse_payload(WEB_RESEARCH, payload))
        } else if let Some(payload) = step(REFLECTION) {
            Self::Reflection(parse_payload(REFLECTION, payload))
        } else if let Some(payload) = step(FINALIZE_ANSWER) {
            Self::FinalizeAnswer(parse_payload(FINALIZE_ANSWER, payload))
        } else {
            Self::Other(object.keys().next().cloned())
        }
    }

    /// Returns the backend step name for logging.
    pub fn step_name(&self) -> &str {
        match self {
            Self::GenerateQuery(_) => GENERATE_QUERY,
            Self::WebResearch(_) => WEB_RESEARCH,
            Self::Reflection(_) => REFLECTION,
            Self::FinalizeAnswer(_) => FINALIZE_ANSWER,
            Self::Other(Some(key)) => key,
            Self::Other(None) => "unknown",
        }
    }
}

impl From<&Value> for BackendEvent {
    fn from(value: &Value) -> Self {
        Self::from_value(value)
    }
}

fn parse_payload<T>(step: &str, payload: &Value) -> T
where
    T: serde::de::DeserializeOwned + Default,
{
    match serde_json::from_value(payload.clone()) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!("[BackendEvent] Malformed '{}' payload, using empty: {}", step, e);
            T::default()
        }
    }
}

/// Empty objects and arrays still count as present; only scalar falsy values do not.
fn is_present(payload: &Value) -> bool {
    match payload {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

// ============================================================================
// Lenient field deserializers
// ============================================================================

fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(text) => Some(text),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Value::String(text) => vec![text],
        _ => Vec::new(),
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}

fn lenient_sources<'de, D>(deserializer: D) -> Result<Vec<SourceRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };

    // Every array element counts as a source, even if it is not an object.
    Ok(items
        .into_iter()
        .map(|item| serde_json::from_value(item).unwrap_or_default())
        .collect())
}

fn lenient_truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(flag) => flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
        Value::Null => false,
    })
}
