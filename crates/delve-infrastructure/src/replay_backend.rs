//! Transcript replay backend.
//!
//! Implements `ResearchBackend` by replaying a recorded JSONL transcript, one
//! frame per line:
//!
//! ```text
//! {"kind":"update","data":{"generate_query":{"query_list":["rust async"]}}}
//! {"kind":"message","data":{"type":"ai","content":"..."}}
//! {"kind":"error","data":"quota exceeded"}
//! ```
//!
//! Every turn replays the whole transcript on top of the submitted history.

use async_trait::async_trait;
use delve_core::config::BackendConfig;
use delve_core::error::{DelveError, Result};
use delve_core::session::{Message, ResearchBackend, StreamUpdate, SubmitRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 64;

/// One line of a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum TranscriptFrame {
    /// Raw graph-step update, forwarded as-is.
    Update(Value),
    /// A message appended to the conversation.
    Message(Message),
    /// Stream failure; replay stops after it.
    Error(String),
}

/// Replays a fixed transcript for every submitted turn.
pub struct TranscriptBackend {
    frames: Arc<Vec<TranscriptFrame>>,
    frame_delay: Duration,
    /// Token of the in-flight replay, if any.
    current: Mutex<Option<CancellationToken>>,
}

impl TranscriptBackend {
    pub fn new(frames: Vec<TranscriptFrame>, frame_delay: Duration) -> Self {
        Self {
            frames: Arc::new(frames),
            frame_delay,
            current: Mutex::new(None),
        }
    }

    /// Parses JSONL transcript text. Blank lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns a serialization error naming the first malformed line.
    pub fn parse(text: &str) -> Result<Vec<TranscriptFrame>> {
        text.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| {
                serde_json::from_str(line).map_err(|e| DelveError::Serialization {
                    format: "JSON".to_string(),
                    message: format!("transcript line {}: {}", index + 1, e),
                })
            })
            .collect()
    }

    /// Loads a transcript file.
    pub async fn from_file(path: &Path, frame_delay: Duration) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            DelveError::backend(format!("cannot read transcript {}: {}", path.display(), e))
        })?;
        let frames = Self::parse(&text)?;

        tracing::info!(
            "[TranscriptBackend] Loaded {} frames from {}",
            frames.len(),
            path.display()
        );
        Ok(Self::new(frames, frame_delay))
    }

    /// Builds the backend described by the `[backend]` config section.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no transcript is configured.
    pub async fn from_config(config: &BackendConfig) -> Result<Self> {
        let path = config.transcript.as_deref().ok_or_else(|| {
            DelveError::config("no research backend configured: set [backend] transcript")
        })?;
        Self::from_file(path, Duration::from_millis(config.frame_delay_ms)).await
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

#[async_trait]
impl ResearchBackend for TranscriptBackend {
    async fn submit(&self, request: SubmitRequest) -> Result<mpsc::Receiver<StreamUpdate>> {
        let token = CancellationToken::new();
        if let Some(previous) = self.current.lock().await.replace(token.clone()) {
            previous.cancel();
        }

        tracing::debug!(
            "[TranscriptBackend] Replaying {} frames (model={}, queries={}, loops={})",
            self.frames.len(),
            request.reasoning_model,
            request.initial_search_query_count,
            request.max_research_loops
        );

        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        tokio::spawn(replay(
            Arc::clone(&self.frames),
            request.messages,
            self.frame_delay,
            token,
            tx,
        ));
        Ok(rx)
    }

    async fn stop(&self) {
        if let Some(token) = self.current.lock().await.take() {
            tracing::debug!("[TranscriptBackend] Stop requested");
            token.cancel();
        }
    }
}

async fn replay(
    frames: Arc<Vec<TranscriptFrame>>,
    mut messages: Vec<Message>,
    frame_delay: Duration,
    token: CancellationToken,
    tx: mpsc::Sender<StreamUpdate>,
) {
    for frame in frames.iter() {
        tokio::select! {
            _ = token.cancelled() => {
                tracing::debug!("[TranscriptBackend] Replay cancelled");
                return;
            }
            _ = tokio::time::sleep(frame_delay) => {}
        }

        let (update, last) = match frame {
            TranscriptFrame::Update(raw) => (StreamUpdate::Update(raw.clone()), false),
            TranscriptFrame::Message(message) => {
                messages.push(with_run_id(message.clone()));
                (StreamUpdate::Messages(messages.clone()), false)
            }
            TranscriptFrame::Error(description) => (StreamUpdate::Error(description.clone()), true),
        };

        if tx.send(update).await.is_err() {
            // Receiver gone; nobody is listening any more.
            return;
        }
        if last {
            return;
        }
    }

    if !token.is_cancelled() {
        let _ = tx.send(StreamUpdate::Finished).await;
    }
}

/// Assistant messages need an id for their activity to be archived.
fn with_run_id(mut message: Message) -> Message {
    if message.is_assistant() && message.id.is_none() {
        message.id = Some(format!("run-{}", Uuid::new_v4()));
    }
    message
}
