//! Transient user notifications (toasts).
//!
//! The notification center only queues toasts; how and where they are drawn
//! is up to the front-end.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Display time used when a toast does not specify one.
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(5000);

/// Display time for stream errors.
pub const STREAM_ERROR_TOAST_DURATION: Duration = Duration::from_millis(7000);

/// Severity of a toast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ToastKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

/// A single queued notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub kind: ToastKind,
    /// `None` keeps the toast until it is removed explicitly.
    pub duration: Option<Duration>,
    pub created_at: DateTime<Utc>,
}

impl Toast {
    /// Returns true once the toast's display time has elapsed at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let Some(duration) = self.duration else {
            return false;
        };

        match chrono::Duration::from_std(duration)
            .ok()
            .and_then(|delta| self.created_at.checked_add_signed(delta))
        {
            Some(expires_at) => expires_at <= now,
            None => false,
        }
    }
}

/// Parameters for a new toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastInput {
    pub message: String,
    pub kind: ToastKind,
    pub duration: Option<Duration>,
}

impl ToastInput {
    pub fn new(kind: ToastKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
            duration: Some(DEFAULT_TOAST_DURATION),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Error, message)
    }

    /// Toast for a stream-level failure.
    pub fn stream_error(description: &str) -> Self {
        let description = if description.trim().is_empty() {
            "An unexpected error occurred."
        } else {
            description
        };

        Self {
            message: format!("Stream error: {}", description),
            kind: ToastKind::Error,
            duration: Some(STREAM_ERROR_TOAST_DURATION),
        }
    }

    pub fn with_duration(mut self, duration: Option<Duration>) -> Self {
        self.duration = duration;
        self
    }
}

/// Queue of visible toasts, newest first.
#[derive(Debug, Clone, Default)]
pub struct NotificationCenter {
    toasts: Vec<Toast>,
    next_id: u64,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a toast and returns its id.
    pub fn add(&mut self, input: ToastInput) -> u64 {
        self.add_at(input, Utc::now())
    }

    /// Queues a toast created at `now`.
    pub fn add_at(&mut self, input: ToastInput, now: DateTime<Utc>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        self.toasts.insert(
            0,
            Toast {
                id,
                message: input.message,
                kind: input.kind,
                duration: input.duration,
                created_at: now,
            },
        );
        id
    }

    /// Removes a toast. Unknown ids are ignored.
    pub fn remove(&mut self, id: u64) {
        self.toasts.retain(|toast| toast.id != id);
    }

    /// Drops every toast whose display time has elapsed at `now`.
    pub fn prune(&mut self, now: DateTime<Utc>) {
        self.toasts.retain(|toast| !toast.is_expired(now));
    }

    /// Visible toasts, newest first.
    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_first_with_increasing_ids() {
        let mut center = NotificationCenter::new();
        let first = center.add(ToastInput::info("one"));
        let second = center.add(ToastInput::info("two"));

        assert!(second > first);
        let messages: Vec<&str> = center.toasts().iter().map(|t| t.message.as_str()).collect();
        assert_eq!(messages, vec!["two", "one"]);
    }

    #[test]
    fn test_remove() {
        let mut center = NotificationCenter::new();
        let id = center.add(ToastInput::warning("copy failed"));
        center.remove(id);
        center.remove(42);

        assert!(center.toasts().is_empty());
    }

    #[test]
    fn test_prune_respects_duration() {
        let mut center = NotificationCenter::new();
        let start = Utc::now();
        center.add_at(ToastInput::info("short"), start);
        center.add_at(ToastInput::stream_error("boom"), start);
        center.add_at(ToastInput::info("sticky").with_duration(None), start);

        center.prune(start + chrono::Duration::milliseconds(6000));
        let messages: Vec<&str> = center.toasts().iter().map(|t| t.message.as_str()).collect();
        assert_eq!(messages, vec!["sticky", "Stream error: boom"]);

        center.prune(start + chrono::Duration::milliseconds(7000));
        assert_eq!(center.toasts().len(), 1);
        assert_eq!(center.toasts()[0].message, "sticky");
    }

    #[test]
    fn test_stream_error_fallback_text() {
        let toast = ToastInput::stream_error("");
        assert_eq!(toast.message, "Stream error: An unexpected error occurred.");
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.duration, Some(STREAM_ERROR_TOAST_DURATION));
    }
}
