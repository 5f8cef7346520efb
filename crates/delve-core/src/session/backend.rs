//! Research backend trait.
//!
//! Defines the interface to the collaborator that runs the research agent and
//! streams its progress back.

use super::stream::StreamUpdate;
use super::submission::SubmitRequest;
use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// An abstract research backend.
///
/// This trait decouples the chat session from the transport used to reach the
/// agent (HTTP stream, recorded transcript, test double).
///
/// # Implementation Notes
///
/// Implementations should:
/// - Deliver updates in emission order on the returned channel
/// - Close the channel (optionally after `StreamUpdate::Finished`) once the run settles
/// - Own any retry/reconnect policy; callers never retry
#[async_trait]
pub trait ResearchBackend: Send + Sync {
    /// Starts a research run for `request`.
    ///
    /// # Returns
    ///
    /// - `Ok(receiver)`: Stream of updates for this run
    /// - `Err(_)`: The run could not be started
    async fn submit(&self, request: SubmitRequest) -> Result<mpsc::Receiver<StreamUpdate>>;

    /// Asks the backend to stop the in-flight run. Fire-and-forget.
    async fn stop(&self);
}
