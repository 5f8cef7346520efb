//! Per-message activity archive.

use super::timeline::Timeline;
use crate::error::{DelveError, Result};
use std::collections::HashMap;

/// Finalized timelines keyed by assistant message id.
///
/// Entries are write-once: a commit for an id that already has a snapshot is
/// refused and the original snapshot is kept. The archive only shrinks on a
/// full session reset.
#[derive(Debug, Clone, Default)]
pub struct ActivityArchive {
    entries: HashMap<String, Timeline>,
}

impl ActivityArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an owned copy of `timeline` under `message_id`.
    ///
    /// # Errors
    ///
    /// Returns `DelveError::AlreadyArchived` if `message_id` was committed before.
    pub fn commit(&mut self, message_id: impl Into<String>, timeline: &Timeline) -> Result<()> {
        let message_id = message_id.into();
        if self.entries.contains_key(&message_id) {
            return Err(DelveError::AlreadyArchived { message_id });
        }

        self.entries.insert(message_id, timeline.snapshot());
        Ok(())
    }

    /// Returns the archived timeline for `message_id`, if any.
    ///
    /// Absence is normal: user messages and in-flight assistant messages are
    /// never archived.
    pub fn lookup(&self, message_id: &str) -> Option<&Timeline> {
        self.entries.get(message_id)
    }

    pub fn contains(&self, message_id: &str) -> bool {
        self.entries.contains_key(message_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
