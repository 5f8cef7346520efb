//! Execution layer for DELVE.
//!
//! Drives research turns against a `ResearchBackend` and bootstraps logging.

pub mod logging;
pub mod turn_executor;
pub mod warning_layer;

pub use turn_executor::{SessionSignal, TurnExecutor};
pub use warning_layer::{LogNotice, WarningLayer};
