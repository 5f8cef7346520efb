//! Research turn execution.
//!
//! A `TurnExecutor` submits a turn through the shared `ChatSession`, hands
//! the request to the backend and reduces every streamed update into the
//! session as it arrives. Front-ends learn what changed from
//! `SessionSignal`s and read the details from the session.

use delve_application::{ChatSession, SharedSession, UpdateOutcome};
use delve_core::activity::ActivityEvent;
use delve_core::session::{ResearchBackend, StreamUpdate, SubmitRequest};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Change notifications emitted while a turn runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionSignal {
    /// An event was appended to the live timeline.
    Activity(ActivityEvent),
    /// The message list was replaced.
    MessagesChanged,
    /// A toast was queued.
    Toast(u64),
    /// The timeline was archived outside of a settle.
    Archived(String),
    /// The turn stopped loading.
    Settled { archived: Option<String> },
    /// The turn was cancelled by the user.
    Cancelled,
}

/// Runs one turn at a time against a research backend.
pub struct TurnExecutor {
    backend: Arc<dyn ResearchBackend>,
    session: SharedSession,
    signals: mpsc::UnboundedSender<SessionSignal>,
    /// Cancels the driver task of the in-flight turn.
    current: Mutex<Option<CancellationToken>>,
}

impl TurnExecutor {
    /// Creates a new executor.
    ///
    /// # Arguments
    ///
    /// * `backend` - The research backend to stream from
    /// * `session` - The session updates are reduced into
    /// * `signals` - Receives a `SessionSignal` for every observable change
    pub fn new(
        backend: Arc<dyn ResearchBackend>,
        session: SharedSession,
        signals: mpsc::UnboundedSender<SessionSignal>,
    ) -> Self {
        Self {
            backend,
            session,
            signals,
            current: Mutex::new(None),
        }
    }

    /// Wraps `session` for sharing and builds an executor around it.
    pub fn with_session(
        backend: Arc<dyn ResearchBackend>,
        session: ChatSession,
        signals: mpsc::UnboundedSender<SessionSignal>,
    ) -> Self {
        Self::new(backend, session.into_shared(), signals)
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    /// Starts a turn.
    ///
    /// # Returns
    ///
    /// The driver task, or `None` when the session refused the submission
    /// (blank text, or a turn already running). The backend is not contacted
    /// in that case.
    pub async fn start(&self, text: &str, effort: &str, model: &str) -> Option<JoinHandle<()>> {
        let (request, token) = {
            let mut session = self.session.lock().await;
            let request = session.submit(text, effort, model)?;

            // Retires a driver still draining the previous turn's stream
            // before it can touch the new turn.
            let token = CancellationToken::new();
            if let Some(previous) = self.current.lock().await.replace(token.clone()) {
                previous.cancel();
            }
            (request, token)
        };

        let driver = TurnDriver {
            backend: Arc::clone(&self.backend),
            session: Arc::clone(&self.session),
            signals: self.signals.clone(),
            token,
        };
        Some(tokio::spawn(driver.run(request)))
    }

    /// Stops the in-flight turn.
    ///
    /// The session is cleaned up according to its cancel behavior and the
    /// backend is told to stop. Returns false, touching nothing, when no
    /// turn is loading.
    pub async fn cancel(&self) -> bool {
        {
            let mut session = self.session.lock().await;
            if !session.is_loading() {
                return false;
            }

            // Cancelled under the session lock so the driver cannot apply
            // another update after the session is cleaned up.
            if let Some(token) = self.current.lock().await.take() {
                token.cancel();
            }
            session.cancel();
        }

        self.backend.stop().await;
        let _ = self.signals.send(SessionSignal::Cancelled);
        true
    }
}

/// Owns the stream of one turn until it closes or the turn is cancelled.
struct TurnDriver {
    backend: Arc<dyn ResearchBackend>,
    session: SharedSession,
    signals: mpsc::UnboundedSender<SessionSignal>,
    token: CancellationToken,
}

impl TurnDriver {
    async fn run(self, request: SubmitRequest) {
        let mut updates = match self.backend.submit(request).await {
            Ok(updates) => updates,
            Err(err) => {
                let toast = {
                    let mut session = self.session.lock().await;
                    if self.token.is_cancelled() {
                        return;
                    }
                    session.fail_submission(&err)
                };
                self.emit(SessionSignal::Toast(toast));
                self.emit(SessionSignal::Settled { archived: None });
                return;
            }
        };

        loop {
            let update = tokio::select! {
                _ = self.token.cancelled() => return,
                update = updates.recv() => update,
            };

            // A closed channel settles the turn if `Finished` never came.
            let closed = update.is_none();
            let update = update.unwrap_or(StreamUpdate::Finished);

            let outcome = {
                let mut session = self.session.lock().await;
                if self.token.is_cancelled() {
                    return;
                }
                session.apply(update)
            };
            if outcome.settled {
                tracing::debug!("[TurnDriver] Turn settled");
            }
            self.publish(outcome);

            // Updates after a settle are still reduced until the stream closes.
            if closed {
                return;
            }
        }
    }

    fn publish(&self, outcome: UpdateOutcome) {
        if let Some(event) = outcome.activity {
            self.emit(SessionSignal::Activity(event));
        }
        if outcome.messages_changed {
            self.emit(SessionSignal::MessagesChanged);
        }
        if let Some(toast) = outcome.toast {
            self.emit(SessionSignal::Toast(toast));
        }
        if outcome.settled {
            self.emit(SessionSignal::Settled {
                archived: outcome.archived,
            });
        } else if let Some(message_id) = outcome.archived {
            self.emit(SessionSignal::Archived(message_id));
        }
    }

    fn emit(&self, signal: SessionSignal) {
        // Receiver dropped means the front-end is gone; the session still
        // holds the state.
        let _ = self.signals.send(signal);
    }
}
