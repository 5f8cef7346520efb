//! Path resolution for DELVE's files.
//!
//! ```text
//! ~/.config/delve/        # Platform config directory (via `dirs`)
//! ├── config.toml         # Application configuration
//! └── logs/               # Suggested log directory
//!     └── delve.log
//! ```

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// The platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for delve_core::DelveError {
    fn from(err: PathError) -> Self {
        delve_core::DelveError::config(err.to_string())
    }
}

/// Application directory name under the platform config directory.
const APP_DIR: &str = "delve";

pub struct DelvePaths;

impl DelvePaths {
    /// Returns the DELVE configuration directory (e.g. `~/.config/delve/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the path to `config.toml`.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the conventional log directory.
    pub fn logs_dir() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("logs"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_nested_under_config_dir() {
        // Some CI sandboxes have no resolvable config dir.
        let Ok(dir) = DelvePaths::config_dir() else {
            return;
        };

        assert!(dir.ends_with(APP_DIR));
        assert_eq!(DelvePaths::config_file().unwrap(), dir.join("config.toml"));
        assert_eq!(DelvePaths::logs_dir().unwrap(), dir.join("logs"));
    }
}
