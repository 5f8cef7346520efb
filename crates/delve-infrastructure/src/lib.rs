//! Infrastructure layer for DELVE.
//!
//! File-system paths, the TOML configuration service and the transcript
//! replay implementation of `ResearchBackend`.

pub mod config_service;
pub mod paths;
pub mod replay_backend;
pub mod storage;

pub use config_service::ConfigService;
pub use paths::{DelvePaths, PathError};
pub use replay_backend::{TranscriptBackend, TranscriptFrame};
