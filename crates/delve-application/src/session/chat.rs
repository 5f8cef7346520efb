//! The per-session controller.

use super::outcome::UpdateOutcome;
use chrono::{DateTime, Utc};
use delve_core::activity::{ActivityArchive, ActivityEvent, Timeline, TurnCompletion, classify_value};
use delve_core::error::DelveError;
use delve_core::notification::{NotificationCenter, Toast, ToastInput};
use delve_core::session::{
    ActivityBinding, CancelBehavior, Message, StreamUpdate, SubmitRequest, awaiting_response,
    commit_target, resolve_activity,
};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// A session shared between the turn executor and the front-end.
pub type SharedSession = Arc<Mutex<ChatSession>>;

/// Owns everything one chat session knows: the conversation, the in-flight
/// turn's live timeline and completion flag, the archive of finalized
/// timelines and the toast queue.
///
/// All mutation goes through `&mut self`, so each stream update is reduced
/// atomically with respect to the others. The archive commit and the flag
/// reset happen inside a single `bind` call.
#[derive(Debug, Clone)]
pub struct ChatSession {
    id: String,
    messages: Vec<Message>,
    loading: bool,
    live: Timeline,
    completion: TurnCompletion,
    archive: ActivityArchive,
    notifications: NotificationCenter,
    cancel_behavior: CancelBehavior,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self::with_cancel_behavior(CancelBehavior::default())
    }

    pub fn with_cancel_behavior(cancel_behavior: CancelBehavior) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            messages: Vec::new(),
            loading: false,
            live: Timeline::new(),
            completion: TurnCompletion::new(),
            archive: ActivityArchive::new(),
            notifications: NotificationCenter::new(),
            cancel_behavior,
        }
    }

    /// Wraps the session for sharing across tasks.
    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    // ------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------

    /// Starts a new turn.
    ///
    /// # Arguments
    ///
    /// * `text` - The user's message, sent verbatim
    /// * `effort` - Effort tier (`low`, `medium`, `high`)
    /// * `model` - Reasoning model identifier
    ///
    /// # Returns
    ///
    /// The request to hand to the backend, or `None` when the text is blank
    /// or a turn is already running. Nothing is reset in that case.
    pub fn submit(&mut self, text: &str, effort: &str, model: &str) -> Option<SubmitRequest> {
        if self.loading {
            tracing::debug!("[ChatSession] {} submit ignored: turn in flight", self.id);
            return None;
        }

        let request = SubmitRequest::prepare(&self.messages, text, effort, model)?;

        self.live.reset();
        self.completion.reset();
        self.messages = request.messages.clone();
        self.loading = true;

        tracing::info!(
            "[ChatSession] {} submitted turn (effort={}, model={}, queries={}, loops={})",
            self.id,
            effort,
            model,
            request.initial_search_query_count,
            request.max_research_loops
        );
        Some(request)
    }

    /// Records that the backend refused to start the turn.
    pub fn fail_submission(&mut self, err: &DelveError) -> u64 {
        tracing::error!("[ChatSession] {} submission failed: {}", self.id, err);
        self.loading = false;
        self.notifications.add(ToastInput::stream_error(&err.to_string()))
    }

    // ------------------------------------------------------------------
    // Stream reduction
    // ------------------------------------------------------------------

    /// Reduces one stream update, then re-evaluates the archive binding.
    pub fn apply(&mut self, update: StreamUpdate) -> UpdateOutcome {
        let mut outcome = UpdateOutcome::default();

        match update {
            StreamUpdate::Update(raw) => {
                outcome.activity = self.record_update(&raw);
            }
            StreamUpdate::Messages(messages) => {
                self.messages = messages;
                outcome.messages_changed = true;
            }
            StreamUpdate::Error(description) => {
                tracing::error!("[ChatSession] {} stream error: {}", self.id, description);
                outcome.toast = Some(
                    self.notifications
                        .add(ToastInput::stream_error(&description)),
                );
            }
            StreamUpdate::Finished => {
                outcome.settled = self.loading;
                self.loading = false;
            }
        }

        outcome.archived = self.bind();
        outcome
    }

    /// Classifies a raw backend update into the live timeline.
    ///
    /// Returns the appended event; unrecognized updates are skipped.
    pub fn record_update(&mut self, raw: &Value) -> Option<ActivityEvent> {
        let classification = classify_value(raw);
        if classification.finalizes_turn {
            self.completion.mark_finalized();
        }

        let Some(event) = classification.event else {
            tracing::debug!("[ChatSession] {} skipped unnarrated update", self.id);
            return None;
        };

        tracing::debug!(
            "[ChatSession] {} activity #{}: {}",
            self.id,
            self.live.len() + 1,
            event.title
        );
        self.live.append(event.clone());
        Some(event)
    }

    /// Archives the live timeline if the commit precondition holds.
    ///
    /// The completion flag is consumed in the same call, so evaluating this
    /// any number of times for one finalized turn commits at most once.
    ///
    /// # Returns
    ///
    /// The message id the timeline was archived under, if a commit happened.
    pub fn bind(&mut self) -> Option<String> {
        let message_id =
            commit_target(&self.messages, self.loading, self.completion.is_finalized())?
                .to_string();
        self.completion.reset();

        match self.archive.commit(message_id.clone(), &self.live) {
            Ok(()) => {
                tracing::info!(
                    "[ChatSession] {} archived {} activity events for message {}",
                    self.id,
                    self.live.len(),
                    message_id
                );
                Some(message_id)
            }
            Err(err) => {
                tracing::warn!("[ChatSession] {} archive commit refused: {}", self.id, err);
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Cancellation
    // ------------------------------------------------------------------

    /// Abandons the in-flight turn according to the session's cancel policy.
    ///
    /// The cancelled turn is never archived. Returns true if a turn was
    /// actually running.
    pub fn cancel(&mut self) -> bool {
        let was_loading = self.loading;

        match self.cancel_behavior {
            CancelBehavior::Reset => self.reset(),
            CancelBehavior::KeepHistory => {
                self.live.reset();
                self.completion.reset();
                self.loading = false;
            }
        }

        tracing::info!(
            "[ChatSession] {} cancelled (behavior={}, was_loading={})",
            self.id,
            self.cancel_behavior,
            was_loading
        );
        was_loading
    }

    /// Drops all session state and starts over under a fresh id.
    pub fn reset(&mut self) {
        *self = Self::with_cancel_behavior(self.cancel_behavior);
    }

    pub fn cancel_behavior(&self) -> CancelBehavior {
        self.cancel_behavior
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn live_timeline(&self) -> &Timeline {
        &self.live
    }

    pub fn archive(&self) -> &ActivityArchive {
        &self.archive
    }

    pub fn is_finalized(&self) -> bool {
        self.completion.is_finalized()
    }

    /// Timeline shown under the message at `index`.
    pub fn activity_for(&self, index: usize) -> ActivityBinding<'_> {
        resolve_activity(
            &self.messages,
            index,
            self.loading,
            &self.live,
            &self.archive,
        )
    }

    /// True while loading with no assistant reply yet.
    pub fn awaiting_response(&self) -> bool {
        awaiting_response(&self.messages, self.loading)
    }

    pub fn last_assistant_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|message| message.is_assistant())
    }

    // ------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------

    pub fn notify(&mut self, input: ToastInput) -> u64 {
        self.notifications.add(input)
    }

    pub fn dismiss(&mut self, toast_id: u64) {
        self.notifications.remove(toast_id);
    }

    pub fn prune_notifications(&mut self, now: DateTime<Utc>) {
        self.notifications.prune(now);
    }

    pub fn notifications(&self) -> &[Toast] {
        self.notifications.toasts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delve_core::activity::ActivityTitle;
    use serde_json::json;

    fn assistant(id: &str, text: &str) -> Message {
        Message::assistant(Some(id.to_string()), text)
    }

    fn with_reply(session: &ChatSession, id: &str) -> Vec<Message> {
        let mut messages = session.messages().to_vec();
        messages.push(assistant(id, "answer"));
        messages
    }

    /// Drives a full turn and leaves the session settled.
    fn run_turn(session: &mut ChatSession, text: &str, reply_id: &str) {
        session.submit(text, "low", "m").unwrap();
        session.apply(StreamUpdate::Update(json!({"generate_query": {"query_list": ["q"]}})));
        session.apply(StreamUpdate::Update(json!({"finalize_answer": {}})));
        let messages = with_reply(session, reply_id);
        session.apply(StreamUpdate::Messages(messages));
        session.apply(StreamUpdate::Finished);
    }

    #[test]
    fn test_submit_prepares_turn() {
        let mut session = ChatSession::new();
        let request = session.submit("what is rust?", "medium", "gemini-2.0-flash").unwrap();

        assert!(session.is_loading());
        assert!(session.awaiting_response());
        assert_eq!(session.messages().len(), 1);
        assert_eq!(request.messages, session.messages());
        assert_eq!(request.initial_search_query_count, 3);
        assert_eq!(request.max_research_loops, 3);
        assert_eq!(request.reasoning_model, "gemini-2.0-flash");
    }

    #[test]
    fn test_blank_submit_is_noop() {
        let mut session = ChatSession::new();
        run_turn(&mut session, "first", "run-1");
        session.record_update(&json!({"reflection": {"is_sufficient": true}}));
        let before = session.clone();

        assert!(session.submit("  \n\t", "low", "m").is_none());

        assert_eq!(session.messages(), before.messages());
        assert_eq!(session.live_timeline(), before.live_timeline());
        assert!(!session.is_loading());
    }

    #[test]
    fn test_submit_while_loading_is_refused() {
        let mut session = ChatSession::new();
        session.submit("first", "low", "m").unwrap();
        session.record_update(&json!({"generate_query": {"query_list": ["a"]}}));

        assert!(session.submit("second", "low", "m").is_none());
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.live_timeline().len(), 1);
    }

    #[test]
    fn test_submit_resets_live_timeline_and_flag() {
        let mut session = ChatSession::new();
        session.submit("first", "low", "m").unwrap();
        session.apply(StreamUpdate::Update(json!({"finalize_answer": {}})));
        session.apply(StreamUpdate::Finished);
        assert!(session.is_finalized());

        session.submit("second", "low", "m").unwrap();
        assert!(session.live_timeline().is_empty());
        assert!(!session.is_finalized());
    }

    #[test]
    fn test_full_turn_archives_under_assistant_id() {
        let mut session = ChatSession::new();
        session.submit("q", "high", "m").unwrap();

        let outcome =
            session.apply(StreamUpdate::Update(json!({"generate_query": {"query_list": ["a", "b"]}})));
        assert_eq!(
            outcome.activity.map(|event| event.title),
            Some(ActivityTitle::GeneratingSearchQueries)
        );

        session.apply(StreamUpdate::Update(json!({"finalize_answer": {}})));
        // Auxiliary updates are skipped.
        let outcome = session.apply(StreamUpdate::Update(json!({"heartbeat": 1})));
        assert!(outcome.is_noop());

        let messages = with_reply(&session, "run-42");
        let outcome = session.apply(StreamUpdate::Messages(messages));
        assert!(outcome.messages_changed);
        assert_eq!(outcome.archived, None);
        assert!(session.activity_for(1).is_live());

        let outcome = session.apply(StreamUpdate::Finished);
        assert!(outcome.settled);
        assert_eq!(outcome.archived.as_deref(), Some("run-42"));
        assert!(!session.is_finalized());

        let archived = session.archive().lookup("run-42").unwrap();
        assert_eq!(archived, session.live_timeline());
        assert_eq!(archived.len(), 2);
        assert_eq!(session.activity_for(1), ActivityBinding::Archived(archived));
    }

    #[test]
    fn test_bind_twice_commits_once() {
        let mut session = ChatSession::new();
        run_turn(&mut session, "q", "run-1");

        assert!(session.archive().contains("run-1"));
        assert_eq!(session.bind(), None);
        assert_eq!(session.bind(), None);
        assert_eq!(session.archive().len(), 1);
    }

    #[test]
    fn test_post_finalize_events_are_in_snapshot() {
        let mut session = ChatSession::new();
        session.submit("q", "low", "m").unwrap();
        session.apply(StreamUpdate::Update(json!({"finalize_answer": {}})));
        session.apply(StreamUpdate::Update(json!({"reflection": {"is_sufficient": true}})));
        let messages = with_reply(&session, "run-1");
        session.apply(StreamUpdate::Messages(messages));
        session.apply(StreamUpdate::Finished);

        let archived = session.archive().lookup("run-1").unwrap();
        assert_eq!(archived.len(), 2);
        assert_eq!(
            archived.last().map(|event| &event.title),
            Some(&ActivityTitle::Reflection)
        );
    }

    #[test]
    fn test_archive_is_independent_of_later_turns() {
        let mut session = ChatSession::new();
        run_turn(&mut session, "first", "run-1");
        let first = session.archive().lookup("run-1").cloned().unwrap();

        run_turn(&mut session, "second", "run-2");

        assert_eq!(session.archive().lookup("run-1"), Some(&first));
        assert_eq!(session.archive().len(), 2);
        assert!(session.activity_for(1).timeline().is_some());
        assert!(session.activity_for(3).timeline().is_some());
    }

    #[test]
    fn test_stream_error_queues_toast_without_commit() {
        let mut session = ChatSession::new();
        session.submit("q", "low", "m").unwrap();
        session.apply(StreamUpdate::Update(json!({"generate_query": {"query_list": ["a"]}})));

        let outcome = session.apply(StreamUpdate::Error("connection reset".into()));
        let toast_id = outcome.toast.unwrap();
        assert_eq!(session.notifications()[0].id, toast_id);
        assert_eq!(session.notifications()[0].message, "Stream error: connection reset");
        assert_eq!(session.live_timeline().len(), 1);

        let outcome = session.apply(StreamUpdate::Finished);
        assert_eq!(outcome.archived, None);
        assert!(session.archive().is_empty());
    }

    #[test]
    fn test_cancel_keep_history_never_archives() {
        let mut session = ChatSession::with_cancel_behavior(CancelBehavior::KeepHistory);
        run_turn(&mut session, "first", "run-1");

        session.submit("second", "low", "m").unwrap();
        session.apply(StreamUpdate::Update(json!({"finalize_answer": {}})));
        let messages = with_reply(&session, "run-2");
        session.apply(StreamUpdate::Messages(messages));

        assert!(session.cancel());
        assert!(!session.is_loading());
        assert!(session.live_timeline().is_empty());
        assert!(!session.is_finalized());

        // A late settle signal must not commit the cancelled turn.
        session.apply(StreamUpdate::Finished);
        assert!(!session.archive().contains("run-2"));
        assert!(session.archive().contains("run-1"));
        assert_eq!(session.messages().len(), 4);
    }

    #[test]
    fn test_cancel_reset_starts_fresh() {
        let mut session = ChatSession::new();
        run_turn(&mut session, "first", "run-1");
        let old_id = session.id().to_string();
        session.submit("second", "low", "m").unwrap();
        session.notify(ToastInput::info("hello"));

        assert!(session.cancel());

        assert_ne!(session.id(), old_id);
        assert!(session.messages().is_empty());
        assert!(session.archive().is_empty());
        assert!(session.notifications().is_empty());
        assert!(!session.is_loading());
        assert_eq!(session.cancel_behavior(), CancelBehavior::Reset);
    }

    #[test]
    fn test_cancel_when_idle_reports_false() {
        let mut session = ChatSession::with_cancel_behavior(CancelBehavior::KeepHistory);
        assert!(!session.cancel());
    }

    #[test]
    fn test_fail_submission_stops_loading() {
        let mut session = ChatSession::new();
        session.submit("q", "low", "m").unwrap();

        session.fail_submission(&DelveError::backend("transcript missing"));

        assert!(!session.is_loading());
        assert!(session.notifications()[0].message.contains("transcript missing"));
    }

    #[test]
    fn test_messages_after_settle_still_archive() {
        let mut session = ChatSession::new();
        session.submit("q", "low", "m").unwrap();
        session.apply(StreamUpdate::Update(json!({"finalize_answer": {}})));

        let settled = session.apply(StreamUpdate::Finished);
        assert!(settled.settled);
        assert_eq!(settled.archived, None);
        assert!(session.is_finalized());

        let messages = with_reply(&session, "late");
        let outcome = session.apply(StreamUpdate::Messages(messages));

        assert!(outcome.messages_changed);
        assert!(!outcome.settled);
        assert_eq!(outcome.archived.as_deref(), Some("late"));
        assert!(!session.is_finalized());
        assert_eq!(session.archive().lookup("late").map(Timeline::len), Some(1));
    }

    #[test]
    fn test_dismiss_removes_only_that_toast() {
        let mut session = ChatSession::new();
        let first = session.notify(ToastInput::info("first"));
        let second = session.notify(ToastInput::warning("second"));

        session.dismiss(first);
        session.dismiss(first);

        assert_eq!(session.notifications().len(), 1);
        assert_eq!(session.notifications()[0].id, second);
    }

    #[test]
    fn test_last_assistant_message() {
        let mut session = ChatSession::new();
        assert!(session.last_assistant_message().is_none());

        run_turn(&mut session, "q", "run-1");
        session.submit("again", "low", "m").unwrap();

        assert_eq!(
            session.last_assistant_message().and_then(|m| m.id.as_deref()),
            Some("run-1")
        );
    }
}
