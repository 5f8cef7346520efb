//! Configuration service implementation.
//!
//! Loads `DelveConfig` from `config.toml` (by default
//! `~/.config/delve/config.toml`) and caches it after the first read.

use crate::paths::DelvePaths;
use crate::storage::AtomicTomlFile;
use delve_core::config::DelveConfig;
use delve_core::error::Result;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// Configuration service that loads and caches the root configuration.
///
/// Clones share the cache.
#[derive(Debug, Clone)]
pub struct ConfigService {
    file: AtomicTomlFile<DelveConfig>,
    /// Cached configuration, filled lazily on first access.
    config: Arc<RwLock<Option<DelveConfig>>>,
}

impl ConfigService {
    /// Creates a service for the platform default config file.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the config directory cannot be resolved.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(DelvePaths::config_file()?))
    }

    /// Creates a service for an explicit config file (`--config`).
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            file: AtomicTomlFile::new(path),
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Returns the configuration, reading the file on first access.
    ///
    /// A missing or blank file yields the defaults without creating it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn get_config(&self) -> Result<DelveConfig> {
        {
            let cached = self.config.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(config) = cached.as_ref() {
                return Ok(config.clone());
            }
        }

        let loaded = match self.file.load()? {
            Some(config) => {
                tracing::debug!("[ConfigService] Loaded {}", self.path().display());
                config
            }
            None => {
                tracing::debug!(
                    "[ConfigService] No config at {}, using defaults",
                    self.path().display()
                );
                DelveConfig::default()
            }
        };

        self.store(loaded.clone());
        Ok(loaded)
    }

    /// Writes `config` to disk and refreshes the cache.
    pub fn save(&self, config: &DelveConfig) -> Result<()> {
        self.file.save(config)?;
        self.store(config.clone());
        tracing::info!("[ConfigService] Saved {}", self.path().display());
        Ok(())
    }

    /// Applies `f` to the on-disk configuration under the file lock.
    ///
    /// # Returns
    ///
    /// The configuration as written.
    pub fn update<F>(&self, f: F) -> Result<DelveConfig>
    where
        F: FnOnce(&mut DelveConfig),
    {
        let written = self.file.update(DelveConfig::default(), f)?;
        self.store(written.clone());
        tracing::info!("[ConfigService] Updated {}", self.path().display());
        Ok(written)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn store(&self, config: DelveConfig) {
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = Some(config);
    }
}
