//! Path management for Seasons configuration files.
//!
//! ```text
//! ~/.config/seasons/        # Config directory (platform config dir)
//! └── config.toml           # Backend, gallery and logging settings
//! ```

use std::path::PathBuf;

use seasons_core::error::{Result, SeasonsError};

const APP_DIR_NAME: &str = "seasons";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Resolves Seasons paths, optionally under a custom base directory (tests).
#[derive(Debug, Clone, Default)]
pub struct SeasonsPaths {
    base_dir: Option<PathBuf>,
}

impl SeasonsPaths {
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self { base_dir }
    }

    /// Returns the Seasons configuration directory.
    ///
    /// # Errors
    ///
    /// `Config` when the platform has no config directory (no home).
    pub fn config_dir(&self) -> Result<PathBuf> {
        match &self.base_dir {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR_NAME))
                .ok_or_else(|| SeasonsError::config("Cannot find config directory")),
        }
    }

    /// Returns the path to `config.toml`.
    pub fn config_file(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join(CONFIG_FILE_NAME))
    }
}
