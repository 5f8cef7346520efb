//! Domain layer for DELVE.
//!
//! Everything in this crate is synchronous and side-effect free apart from the
//! `ResearchBackend` trait, which describes the collaborator that runs the
//! research agent.

pub mod activity;
pub mod config;
pub mod error;
pub mod notification;
pub mod session;

// Re-export common error type
pub use error::DelveError;
