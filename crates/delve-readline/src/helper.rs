//! rustyline helper: slash-command completion, highlighting and hints.

use std::borrow::Cow::{self, Borrowed, Owned};

use colored::Colorize;
use delve_core::session::{Effort, SUPPORTED_MODELS};
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};
use strum::IntoEnumIterator;

use crate::commands::COMMANDS;

#[derive(Clone)]
pub struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    pub fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|cmd| cmd.to_string()).collect(),
        }
    }

    /// Candidates for the argument of `/effort` and `/model`.
    fn argument_candidates(command: &str) -> Vec<String> {
        match command {
            "/effort" => Effort::iter().map(|effort| effort.to_string()).collect(),
            "/model" => SUPPORTED_MODELS.iter().map(|model| model.to_string()).collect(),
            "/config" => vec!["save".to_string()],
            "/toasts" => vec!["clear".to_string()],
            _ => Vec::new(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if !line.starts_with('/') {
            return Ok((0, vec![]));
        }

        let to_pair = |candidate: &String| Pair {
            display: candidate.clone(),
            replacement: candidate.clone(),
        };

        match line.split_once(' ') {
            Some((command, partial)) => {
                let candidates = Self::argument_candidates(command)
                    .iter()
                    .filter(|candidate| candidate.starts_with(partial))
                    .map(to_pair)
                    .collect();
                Ok((command.len() + 1, candidates))
            }
            None => {
                let candidates = self
                    .commands
                    .iter()
                    .filter(|cmd| cmd.starts_with(line))
                    .map(to_pair)
                    .collect();
                Ok((0, candidates))
            }
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, line: &str, _pos: usize, _forced: bool) -> bool {
        line.starts_with('/')
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}
