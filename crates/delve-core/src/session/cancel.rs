//! Cancellation policy.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// What happens to session state when the user stops a turn.
///
/// In both modes the cancelled turn's partial timeline is never archived.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CancelBehavior {
    /// Start over from a fresh session: messages, timelines, archive and
    /// notifications are all dropped.
    #[default]
    Reset,
    /// Keep the conversation and earlier archived timelines; only the
    /// in-flight turn state is discarded.
    KeepHistory,
}
