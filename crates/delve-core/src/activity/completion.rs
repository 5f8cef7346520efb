//! Turn-completion flag.

/// Records whether the terminal finalize step has been seen in the current turn.
///
/// The classifier side marks it; only the binder's commit step (or a new
/// submission/session reset) clears it. Splitting set and clear this way keeps
/// the flag stable while post-finalize updates are still arriving.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurnCompletion {
    finalized: bool,
}

impl TurnCompletion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the current turn as finalized.
    pub fn mark_finalized(&mut self) {
        self.finalized = true;
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Returns the flag and clears it in one step.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.finalized)
    }

    pub fn reset(&mut self) {
        self.finalized = false;
    }
}
