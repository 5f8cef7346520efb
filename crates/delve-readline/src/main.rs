use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use colored::Colorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use tokio::sync::mpsc;

use delve_application::{ChatSession, SharedSession};
use delve_core::notification::ToastInput;
use delve_core::session::{ActivityBinding, Effort, SUPPORTED_MODELS};
use delve_execution::{LogNotice, SessionSignal, TurnExecutor, logging};
use delve_infrastructure::{ConfigService, DelvePaths, TranscriptBackend};

mod clipboard;
mod commands;
mod helper;
mod render;

use clipboard::SystemClipboard;
use commands::Input;
use helper::CliHelper;

#[derive(Parser)]
#[command(name = "delve")]
#[command(about = "DELVE - chat with a streaming AI research assistant", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSONL transcript to replay, overriding `[backend] transcript`
    #[arg(long)]
    transcript: Option<PathBuf>,

    /// Effort tier for this run (low, medium, high)
    #[arg(long)]
    effort: Option<Effort>,

    /// Reasoning model for this run
    #[arg(long)]
    model: Option<String>,
}

/// Current input-form selections.
struct Preferences {
    effort: Effort,
    model: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ===== Configuration & Logging =====
    let config_service = match cli.config {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new()?,
    };
    let mut config = config_service
        .get_config()
        .with_context(|| format!("failed to load {}", config_service.path().display()))?;
    if let Some(transcript) = cli.transcript {
        config.backend.transcript = Some(transcript);
    }

    // Logs stay out of the REPL unless no config directory exists.
    if config.logging.directory.is_none() {
        config.logging.directory = DelvePaths::logs_dir().ok();
    }

    let (notice_tx, notice_rx) = mpsc::unbounded_channel::<LogNotice>();
    logging::init(&config.logging, Some(notice_tx))?;

    // ===== Backend & Session =====
    let backend = TranscriptBackend::from_config(&config.backend)
        .await
        .context("failed to start the research backend")?;

    let (signal_tx, signal_rx) = mpsc::unbounded_channel::<SessionSignal>();
    let executor = TurnExecutor::with_session(
        Arc::new(backend),
        ChatSession::with_cancel_behavior(config.chat.cancel_behavior),
        signal_tx,
    );
    let session = Arc::clone(executor.session());

    let renderer = tokio::spawn(render_signals(Arc::clone(&session), signal_rx, notice_rx));

    let mut prefs = Preferences {
        effort: cli.effort.unwrap_or(config.chat.default_effort),
        model: cli.model.unwrap_or(config.chat.default_model),
    };

    // ===== REPL Setup =====
    let mut rl: Editor<CliHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));
    let mut clipboard = SystemClipboard::default();

    print_lines(render::welcome());
    println!();

    // ===== Main REPL Loop =====
    loop {
        let line = match rl.readline(">> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                if !executor.cancel().await {
                    println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
                }
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        };

        let input = commands::parse(&line);
        if input != Input::Empty {
            let _ = rl.add_history_entry(line.as_str());
        }

        match input {
            Input::Empty => {}
            Input::Quit => {
                println!("{}", "Goodbye!".bright_green());
                break;
            }
            Input::Submit(text) => {
                if executor
                    .start(&text, prefs.effort.as_ref(), &prefs.model)
                    .await
                    .is_none()
                {
                    println!(
                        "{}",
                        "A turn is already running. Use /stop to cancel it.".yellow()
                    );
                    continue;
                }

                let session = session.lock().await;
                if session.awaiting_response() {
                    print_lines(render::timeline(
                        ActivityBinding::Live(session.live_timeline()),
                        true,
                    ));
                }
            }
            Input::Effort(None) => {
                println!("Effort: {}", prefs.effort.as_ref().bright_cyan());
            }
            Input::Effort(Some(effort)) => {
                prefs.effort = effort;
                println!("Effort set to {}", effort.as_ref().bright_cyan());
            }
            Input::Model(None) => {
                println!("Model: {}", prefs.model.bright_cyan());
                for model in SUPPORTED_MODELS {
                    println!("  {}", model.bright_black());
                }
            }
            Input::Model(Some(model)) => {
                if !SUPPORTED_MODELS.contains(&model.as_str()) {
                    println!("{}", format!("'{}' is not a listed model; using it anyway.", model).yellow());
                }
                println!("Model set to {}", model.bright_cyan());
                prefs.model = model;
            }
            Input::History => {
                print_lines(render::history(&*session.lock().await));
            }
            Input::Activity => {
                let session = session.lock().await;
                print_lines(render::current_activity(&session));
            }
            Input::Stop => {
                if !executor.cancel().await {
                    println!("{}", "No turn is running.".bright_black());
                }
            }
            Input::Copy => {
                let mut session = session.lock().await;
                let text = session
                    .last_assistant_message()
                    .map(|message| message.content.to_display_text());
                let toast = match text {
                    None => ToastInput::info("Nothing to copy yet."),
                    Some(text) => match clipboard.copy(&text) {
                        Ok(()) => ToastInput::success("Copied to clipboard."),
                        Err(err) => {
                            tracing::debug!("[REPL] Clipboard copy failed: {}", err);
                            ToastInput::warning(format!("Failed to copy text: {}", err))
                        }
                    },
                };
                println!("{}", show_toast(&mut session, toast));
            }
            Input::Toasts => {
                let mut session = session.lock().await;
                session.prune_notifications(Utc::now());
                print_lines(render::toasts(session.notifications()));
            }
            Input::DismissToasts => {
                let mut session = session.lock().await;
                let ids: Vec<u64> = session.notifications().iter().map(|toast| toast.id).collect();
                for id in &ids {
                    session.dismiss(*id);
                }
                println!("{}", format!("Dismissed {} notification(s).", ids.len()).bright_black());
            }
            Input::SaveConfig => {
                let result = config_service.update(|config| {
                    config.chat.default_effort = prefs.effort;
                    config.chat.default_model = prefs.model.clone();
                });
                let toast = match result {
                    Ok(_) => ToastInput::success(format!(
                        "Saved defaults to {}",
                        config_service.path().display()
                    )),
                    Err(err) => ToastInput::error(format!("Failed to save config: {}", err)),
                };
                println!("{}", show_toast(&mut *session.lock().await, toast));
            }
            Input::Help => print_lines(render::help()),
            Input::Invalid(reason) => println!("{}", reason.yellow()),
        }
    }

    executor.cancel().await;
    renderer.abort();

    Ok(())
}

/// Prints everything the running turn reports, as it happens.
async fn render_signals(
    session: SharedSession,
    mut signals: mpsc::UnboundedReceiver<SessionSignal>,
    mut notices: mpsc::UnboundedReceiver<LogNotice>,
) {
    loop {
        tokio::select! {
            signal = signals.recv() => match signal {
                Some(signal) => render_signal(&session, signal).await,
                None => break,
            },
            Some(notice) = notices.recv() => {
                let mut session = session.lock().await;
                println!("{}", show_toast(&mut session, ToastInput::warning(notice.message)));
            }
        }
    }
}

async fn render_signal(session: &SharedSession, signal: SessionSignal) {
    match signal {
        SessionSignal::Activity(event) => print_lines(render::event_lines(&event)),
        SessionSignal::MessagesChanged => {}
        SessionSignal::Toast(id) => {
            let mut session = session.lock().await;
            session.prune_notifications(Utc::now());
            if let Some(toast) = session.notifications().iter().find(|toast| toast.id == id) {
                println!("{}", render::toast(toast));
            }
        }
        SessionSignal::Archived(message_id) => {
            tracing::debug!("[REPL] Activity archived late for {}", message_id);
        }
        SessionSignal::Settled { .. } => {
            let session = session.lock().await;
            let Some(index) = session.messages().len().checked_sub(1) else {
                return;
            };
            let Some(last) = session.messages().last().filter(|m| m.is_assistant()) else {
                return;
            };

            println!();
            print_lines(render::timeline(session.activity_for(index), false));
            print_lines(render::message(last));
            println!();
        }
        SessionSignal::Cancelled => println!("{}", "Turn cancelled.".yellow()),
    }
}

/// Queues a toast and returns its rendered line.
fn show_toast(session: &mut ChatSession, input: ToastInput) -> String {
    session.prune_notifications(Utc::now());
    let id = session.notify(input);
    session
        .notifications()
        .iter()
        .find(|toast| toast.id == id)
        .map(render::toast)
        .unwrap_or_default()
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}
