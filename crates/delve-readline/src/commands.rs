//! REPL input parsing.

use delve_core::session::Effort;

/// Slash commands offered for completion.
pub const COMMANDS: &[&str] = &[
    "/effort", "/model", "/history", "/activity", "/stop", "/copy", "/toasts", "/config", "/help",
];

/// One line of REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Free text to submit as a research turn.
    Submit(String),
    /// Show (no argument) or set the effort tier.
    Effort(Option<Effort>),
    /// Show (no argument) or set the reasoning model.
    Model(Option<String>),
    History,
    Activity,
    Stop,
    Copy,
    /// List the toasts that have not expired.
    Toasts,
    /// Dismiss every visible toast.
    DismissToasts,
    SaveConfig,
    Help,
    Quit,
    Empty,
    /// A malformed command with the reason to show.
    Invalid(String),
}

/// Parses a line of input. Free text is kept verbatim.
pub fn parse(line: &str) -> Input {
    let trimmed = line.trim();

    if trimmed.is_empty() {
        return Input::Empty;
    }
    if trimmed == "quit" || trimmed == "exit" {
        return Input::Quit;
    }
    if !trimmed.starts_with('/') {
        return Input::Submit(line.to_string());
    }

    let (command, argument) = match trimmed.split_once(char::is_whitespace) {
        Some((command, argument)) => (command, Some(argument.trim())),
        None => (trimmed, None),
    };

    match (command, argument) {
        ("/effort", None) => Input::Effort(None),
        ("/effort", Some(tier)) => match tier.parse::<Effort>() {
            Ok(effort) => Input::Effort(Some(effort)),
            Err(_) => Input::Invalid(format!(
                "Unknown effort '{}'. Choose low, medium or high.",
                tier
            )),
        },
        ("/model", model) => Input::Model(model.map(str::to_string)),
        ("/history", None) => Input::History,
        ("/activity", None) => Input::Activity,
        ("/stop", None) => Input::Stop,
        ("/copy", None) => Input::Copy,
        ("/toasts", None) => Input::Toasts,
        ("/toasts", Some("clear")) => Input::DismissToasts,
        ("/toasts", _) => Input::Invalid("Usage: /toasts [clear]".to_string()),
        ("/config", Some("save")) => Input::SaveConfig,
        ("/config", _) => Input::Invalid("Usage: /config save".to_string()),
        ("/help", None) => Input::Help,
        _ => Input::Invalid(format!("Unknown command: {}", trimmed)),
    }
}
