//! Terminal rendering of messages, timelines and toasts.
//!
//! Every function returns lines instead of printing so output can be
//! assembled under the session lock and printed afterwards.

use colored::{ColoredString, Colorize};
use delve_application::ChatSession;
use delve_core::activity::{ActivityEvent, Timeline};
use delve_core::notification::{Toast, ToastKind};
use delve_core::session::{ActivityBinding, Message, MessageRole};

const TIMELINE_HEADER: &str = "Research Activity";
const SEARCHING: &str = "Searching...";
const NO_ACTIVITY: &str = "No activity to display.";

pub fn welcome() -> Vec<String> {
    vec![
        "=== DELVE ===".bright_magenta().bold().to_string(),
        "Welcome.".bold().to_string(),
        "How can I help you today?".bright_black().to_string(),
        "Type /help for commands, or 'quit' to exit.".bright_black().to_string(),
    ]
}

pub fn help() -> Vec<String> {
    [
        ("<text>", "Ask a research question"),
        ("/effort [low|medium|high]", "Show or set the research effort"),
        ("/model [name]", "Show or set the reasoning model"),
        ("/history", "Show the conversation with its research activity"),
        ("/activity", "Show the current turn's activity"),
        ("/stop", "Cancel the running turn"),
        ("/copy", "Copy the last answer to the clipboard"),
        ("/toasts [clear]", "List or dismiss active notifications"),
        ("/config save", "Save effort and model as defaults"),
        ("quit", "Exit"),
    ]
    .iter()
    .map(|(usage, description)| format!("  {} {}", format!("{:<28}", usage).bright_cyan(), description))
    .collect()
}

/// One timeline entry. Multi-line payloads continue on indented lines.
pub fn event_lines(event: &ActivityEvent) -> Vec<String> {
    let rendered = event.data.render();
    let mut data = rendered.lines();

    let mut lines = vec![format!(
        "  {} {}",
        format!("{}:", event.title).cyan(),
        data.next().unwrap_or_default().bright_black()
    )];
    lines.extend(data.map(|line| format!("    {}", line.bright_black())));
    lines
}

/// The timeline shown under a message.
///
/// Live timelines list every event (or a searching placeholder). Archived
/// timelines collapse to a header with the step count unless `expanded`.
pub fn timeline(binding: ActivityBinding<'_>, expanded: bool) -> Vec<String> {
    match binding {
        ActivityBinding::Live(timeline) if timeline.is_empty() => {
            vec![format!("  {}", SEARCHING.bright_black().italic())]
        }
        ActivityBinding::Live(timeline) => events(timeline),
        ActivityBinding::Archived(timeline) if timeline.is_empty() => {
            vec![format!("  {}", NO_ACTIVITY.bright_black())]
        }
        ActivityBinding::Archived(timeline) => {
            let mut lines = vec![header(timeline, expanded)];
            if expanded {
                lines.extend(events(timeline));
            }
            lines
        }
        ActivityBinding::None => Vec::new(),
    }
}

fn header(timeline: &Timeline, expanded: bool) -> String {
    let marker = if expanded { "▾" } else { "▸" };
    let steps = match timeline.len() {
        1 => "1 step".to_string(),
        n => format!("{} steps", n),
    };
    format!("  {} {} ({})", marker, TIMELINE_HEADER, steps)
        .bright_black()
        .to_string()
}

fn events(timeline: &Timeline) -> Vec<String> {
    timeline.iter().flat_map(event_lines).collect()
}

/// The most recent turn's timeline, expanded.
pub fn current_activity(session: &ChatSession) -> Vec<String> {
    let live = session.live_timeline();
    if session.is_loading() {
        return timeline(ActivityBinding::Live(live), true);
    }
    if live.is_empty() {
        return vec![format!("  {}", NO_ACTIVITY.bright_black())];
    }

    let mut lines = vec![header(live, true)];
    lines.extend(events(live));
    lines
}

/// A message bubble: a role tag followed by its content.
pub fn message(message: &Message) -> Vec<String> {
    let text = message.content.to_display_text();
    let (tag, paint): (ColoredString, fn(&str) -> ColoredString) = match message.role {
        MessageRole::Human => ("you".green().bold(), |line| line.green()),
        MessageRole::Assistant => ("delve".bright_blue().bold(), |line| line.bright_blue()),
    };

    let mut lines = vec![format!("[{}]", tag)];
    lines.extend(text.lines().map(|line| paint(line).to_string()));
    lines
}

/// The whole conversation, each assistant message followed by its activity.
pub fn history(session: &ChatSession) -> Vec<String> {
    if session.messages().is_empty() {
        return vec!["No messages yet.".bright_black().to_string()];
    }

    let mut lines = Vec::new();
    for (index, msg) in session.messages().iter().enumerate() {
        let binding = session.activity_for(index);
        if msg.is_assistant() {
            lines.extend(timeline(binding, false));
        }
        lines.extend(message(msg));
        lines.push(String::new());
    }
    if session.awaiting_response() {
        lines.extend(timeline(ActivityBinding::Live(session.live_timeline()), true));
    }
    lines
}

pub fn toast(toast: &Toast) -> String {
    let text = toast.message.as_str();
    match toast.kind {
        ToastKind::Info => format!("ℹ {}", text).bright_white().to_string(),
        ToastKind::Success => format!("✔ {}", text).bright_green().to_string(),
        ToastKind::Warning => format!("⚠ {}", text).yellow().to_string(),
        ToastKind::Error => format!("✖ {}", text).red().to_string(),
    }
}

/// Every active toast, newest first.
pub fn toasts(toasts: &[Toast]) -> Vec<String> {
    if toasts.is_empty() {
        return vec!["No notifications.".bright_black().to_string()];
    }
    toasts.iter().map(toast).collect()
}
