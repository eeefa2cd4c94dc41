//! Application configuration model.
//!
//! Loaded from `config.toml` by `seasons_infrastructure::ConfigService`.

use serde::{Deserialize, Serialize};

use crate::card::DEFAULT_PAGE_SIZE;
use crate::error::{Result, SeasonsError};

/// Root of `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SeasonsConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub gallery: GallerySettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Hosted backend project settings.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendConfig {
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub storage_bucket: String,
    #[serde(default)]
    pub auth_domain: String,
}

impl BackendConfig {
    /// Fails when any field needed to reach the hosted backend is blank.
    pub fn ensure_complete(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("project_id", &self.project_id),
            ("api_key", &self.api_key),
            ("storage_bucket", &self.storage_bucket),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(SeasonsError::config(format!(
                "backend settings missing: {}",
                missing.join(", ")
            )))
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct GallerySettings {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for GallerySettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// `tracing` filter directive, e.g. `info` or `seasons_application=debug`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
