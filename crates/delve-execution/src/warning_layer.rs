//! Tracing layer that forwards warnings to the front-end.
//!
//! Warnings such as degraded backend payloads or refused archive commits are
//! worth showing to the user, not just writing to the log file.

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// A warning captured from the tracing pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogNotice {
    /// Event target (e.g. "delve_application::session::chat")
    pub target: String,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Forwards WARN-level events to a channel.
///
/// Errors are not forwarded: the session already surfaces them as toasts.
pub struct WarningLayer {
    sender: mpsc::UnboundedSender<LogNotice>,
}

impl WarningLayer {
    pub fn new(sender: mpsc::UnboundedSender<LogNotice>) -> Self {
        Self { sender }
    }
}

impl<S> Layer<S> for WarningLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() != Level::WARN {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        // Receiver dropped means the front-end is gone; nothing to do.
        let _ = self.sender.send(LogNotice {
            target: event.metadata().target().to_string(),
            message: visitor.message,
            at: Utc::now(),
        });
    }
}

/// Extracts the formatted `message` field of an event.
#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;

    #[test]
    fn test_only_warnings_are_forwarded() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let subscriber = tracing_subscriber::registry().with(WarningLayer::new(tx));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("not forwarded");
            tracing::warn!("archive commit refused for {}", "run-1");
            tracing::error!("stream error");
        });

        let notice = rx.try_recv().unwrap();
        assert_eq!(notice.message, "archive commit refused for run-1");
        assert!(rx.try_recv().is_err());
    }
}
