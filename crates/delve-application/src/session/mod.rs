//! Session state management.
//!
//! - `chat`: The `ChatSession` controller
//! - `outcome`: What a reduced update changed (`UpdateOutcome`)

mod chat;
mod outcome;

pub use chat::{ChatSession, SharedSession};
pub use outcome::UpdateOutcome;
