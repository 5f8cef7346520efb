//! Message/activity binding.
//!
//! Pure decision functions that associate timelines with messages. They never
//! mutate anything; `ChatSession` applies the archive commit they request.

use super::message::Message;
use crate::activity::{ActivityArchive, Timeline};

/// Which timeline, if any, a rendered message shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityBinding<'a> {
    /// The in-flight turn's live timeline.
    Live(&'a Timeline),
    /// A finalized snapshot from the archive.
    Archived(&'a Timeline),
    /// No activity for this message.
    None,
}

impl<'a> ActivityBinding<'a> {
    pub fn timeline(&self) -> Option<&'a Timeline> {
        match self {
            Self::Live(timeline) | Self::Archived(timeline) => Some(timeline),
            Self::None => None,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live(_))
    }
}

/// Returns the message id the live timeline should be archived under, if the
/// commit precondition holds:
///
/// 1. a finalize step was observed this turn,
/// 2. the stream is not loading,
/// 3. the message list is non-empty,
/// 4. the last message is an assistant message with an id.
pub fn commit_target(messages: &[Message], loading: bool, finalized: bool) -> Option<&str> {
    if !finalized || loading {
        return None;
    }

    messages
        .last()
        .filter(|message| message.is_assistant())
        .and_then(|message| message.id.as_deref())
}

/// Resolves the timeline shown under the message at `index`.
///
/// The last message shows the live timeline while the stream is loading;
/// every other assistant message shows its archived snapshot, if one exists.
/// User messages never show activity.
pub fn resolve_activity<'a>(
    messages: &[Message],
    index: usize,
    loading: bool,
    live: &'a Timeline,
    archive: &'a ActivityArchive,
) -> ActivityBinding<'a> {
    let Some(message) = messages.get(index) else {
        return ActivityBinding::None;
    };
    if !message.is_assistant() {
        return ActivityBinding::None;
    }

    let is_last = index + 1 == messages.len();
    if is_last && loading {
        return ActivityBinding::Live(live);
    }

    message
        .id
        .as_deref()
        .and_then(|id| archive.lookup(id))
        .map_or(ActivityBinding::None, ActivityBinding::Archived)
}

/// True while a turn is loading but no assistant message has arrived yet.
pub fn awaiting_response(messages: &[Message], loading: bool) -> bool {
    loading && messages.last().is_none_or(Message::is_human)
}
