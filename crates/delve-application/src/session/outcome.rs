use delve_core::activity::ActivityEvent;

/// What reducing one stream update changed in a `ChatSession`.
///
/// Front-ends use this to redraw only what moved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Event appended to the live timeline.
    pub activity: Option<ActivityEvent>,
    /// The message list was replaced.
    pub messages_changed: bool,
    /// Id of a toast queued by this update.
    pub toast: Option<u64>,
    /// Loading switched from on to off.
    pub settled: bool,
    /// Message id the live timeline was archived under.
    pub archived: Option<String>,
}

impl UpdateOutcome {
    /// True when nothing observable changed.
    pub fn is_noop(&self) -> bool {
        self == &Self::default()
    }
}
