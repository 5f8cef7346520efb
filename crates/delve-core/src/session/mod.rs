//! Session domain module.
//!
//! This module contains the conversation model and the pure pieces of a chat
//! turn: submission parameters, stream notifications, the backend interface
//! and the message/activity binder.
//!
//! # Module Structure
//!
//! - `message`: Conversation message types (`Message`, `MessageRole`, `MessageContent`)
//! - `submission`: Effort tiers and outbound requests (`Effort`, `ResearchParams`, `SubmitRequest`)
//! - `stream`: Inbound stream notifications (`StreamUpdate`)
//! - `backend`: Research backend trait (`ResearchBackend`)
//! - `binder`: Archive commit decision and per-message activity resolution
//! - `cancel`: Cancellation policy (`CancelBehavior`)

mod backend;
pub mod binder;
mod cancel;
mod message;
mod stream;
mod submission;

// Re-export public API
pub use backend::ResearchBackend;
pub use binder::{ActivityBinding, awaiting_response, commit_target, resolve_activity};
pub use cancel::CancelBehavior;
pub use message::{Message, MessageContent, MessageRole};
pub use stream::StreamUpdate;
pub use submission::{DEFAULT_MODEL, Effort, ResearchParams, SUPPORTED_MODELS, SubmitRequest};
