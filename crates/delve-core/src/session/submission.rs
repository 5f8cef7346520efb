//! Submission parameters.
//!
//! Translates the coarse effort tier chosen by the user into the numeric
//! generation parameters the research backend expects, and assembles the
//! outbound request.

use super::message::Message;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Reasoning models offered by the input form. Other model names are passed through.
pub const SUPPORTED_MODELS: &[&str] = &[
    "gemini-2.0-flash",
    "gemini-2.5-flash-preview-04-17",
    "gemini-2.5-pro-preview-05-06",
];

/// Model selected when nothing else is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-04-17";

/// Coarse research effort tier.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Effort {
    Low,
    #[default]
    Medium,
    High,
}

impl Effort {
    /// Returns the generation parameters for this tier.
    pub fn params(self) -> ResearchParams {
        match self {
            Self::Low => ResearchParams {
                initial_search_query_count: 1,
                max_research_loops: 1,
            },
            Self::Medium => ResearchParams {
                initial_search_query_count: 3,
                max_research_loops: 3,
            },
            Self::High => ResearchParams {
                initial_search_query_count: 5,
                max_research_loops: 10,
            },
        }
    }
}

/// Numeric generation parameters sent with every submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchParams {
    pub initial_search_query_count: u32,
    pub max_research_loops: u32,
}

impl ResearchParams {
    /// Maps an effort string to parameters.
    ///
    /// Unknown tiers map to zero for both parameters.
    pub fn for_effort(effort: &str) -> Self {
        Effort::from_str(effort)
            .map(Effort::params)
            .unwrap_or_default()
    }
}

/// Request issued to the research backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub messages: Vec<Message>,
    pub initial_search_query_count: u32,
    pub max_research_loops: u32,
    pub reasoning_model: String,
}

impl SubmitRequest {
    /// Builds the request for a new user turn.
    ///
    /// Returns `None` when `text` is empty after trimming; nothing should be
    /// reset or sent in that case. The user message keeps the raw, untrimmed text.
    pub fn prepare(history: &[Message], text: &str, effort: &str, model: &str) -> Option<Self> {
        if text.trim().is_empty() {
            return None;
        }

        let params = ResearchParams::for_effort(effort);
        let mut messages = history.to_vec();
        messages.push(Message::human(text));

        Some(Self {
            messages,
            initial_search_query_count: params.initial_search_query_count,
            max_research_loops: params.max_research_loops,
            reasoning_model: model.to_string(),
        })
    }
}
