//! Activity domain module.
//!
//! This module turns the research backend's heterogeneous update stream into
//! the normalized activity timeline shown next to assistant messages.
//!
//! # Module Structure
//!
//! - `event`: Normalized timeline entries (`ActivityEvent`, `ActivityTitle`, `ActivityData`)
//! - `backend_event`: Closed variant type for raw backend updates (`BackendEvent`)
//! - `classifier`: Raw update → `ActivityEvent` mapping
//! - `timeline`: Live, append-only timeline for the in-flight turn
//! - `completion`: Turn-completion flag
//! - `archive`: Write-once per-message timeline snapshots
//!
//! # Usage
//!
//! ```ignore
//! use delve_core::activity::{classify, Timeline, TurnCompletion, ActivityArchive};
//! ```

mod archive;
mod backend_event;
mod classifier;
mod completion;
mod event;
mod timeline;

// Re-export public API
pub use archive::ActivityArchive;
pub use backend_event::{
    BackendEvent, FinalizeAnswerUpdate, GenerateQueryUpdate, ReflectionUpdate, SourceRecord,
    WebResearchUpdate,
};
pub use classifier::{Classification, classify, classify_value};
pub use completion::TurnCompletion;
pub use event::{ActivityData, ActivityEvent, ActivityTitle};
pub use timeline::Timeline;
