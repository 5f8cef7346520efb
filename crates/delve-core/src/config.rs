//! Application configuration model.
//!
//! Mirrors `config.toml`. Every section and field has a default, so a
//! partial or empty file is valid.

use crate::session::{CancelBehavior, DEFAULT_MODEL, Effort};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default pause between replayed transcript frames.
pub const DEFAULT_FRAME_DELAY_MS: u64 = 150;

/// Default log level when `RUST_LOG` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelveConfig {
    pub chat: ChatConfig,
    pub backend: BackendConfig,
    pub logging: LoggingConfig,
}

/// Defaults for the chat input form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub default_effort: Effort,
    pub default_model: String,
    pub cancel_behavior: CancelBehavior,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_effort: Effort::default(),
            default_model: DEFAULT_MODEL.to_string(),
            cancel_behavior: CancelBehavior::default(),
        }
    }
}

/// Research backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// JSONL transcript replayed for every turn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<PathBuf>,
    pub frame_delay_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            transcript: None,
            frame_delay_ms: DEFAULT_FRAME_DELAY_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// When set, logs go to `delve.log` in this directory instead of stderr.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            directory: None,
        }
    }
}
