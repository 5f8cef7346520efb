//! Notifications delivered by the streaming collaborator.

use super::message::Message;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One notification from an in-flight research stream.
///
/// Updates are delivered one at a time, in emission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum StreamUpdate {
    /// A raw graph-step update (`{"generate_query": {...}}`, ...).
    Update(Value),
    /// The full, current message list.
    Messages(Vec<Message>),
    /// A stream-level failure description.
    Error(String),
    /// The stream settled; nothing else will be delivered.
    Finished,
}
