//! Application layer for DELVE.
//!
//! This crate owns per-session state and reduces stream updates into it,
//! delegating every decision to the pure domain functions in `delve-core`.

pub mod session;

pub use session::{ChatSession, SharedSession, UpdateOutcome};
