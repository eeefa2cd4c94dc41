//! Configuration service implementation.
//!
//! Loads `SeasonsConfig` from `config.toml`, creating the file with defaults
//! when it does not exist, and layers environment overrides on top.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use anyhow::Context;
use seasons_core::config::SeasonsConfig;
use seasons_core::error::{Result, SeasonsError};

use crate::paths::SeasonsPaths;

pub const ENV_PROJECT_ID: &str = "SEASONS_PROJECT_ID";
pub const ENV_API_KEY: &str = "SEASONS_API_KEY";
pub const ENV_STORAGE_BUCKET: &str = "SEASONS_STORAGE_BUCKET";

/// Configuration service that loads and caches the root configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<SeasonsConfig>>>,
}

impl ConfigService {
    /// Creates a service reading the platform default `config.toml`.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(SeasonsPaths::default().config_file()?))
    }

    /// Creates a service reading `path` (used by tests and custom setups).
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Gets the configuration, loading from file if not cached.
    ///
    /// Environment overrides are applied on every load, not persisted.
    pub fn get_config(&self) -> Result<SeasonsConfig> {
        if let Some(cached) = self.read_cache() {
            return Ok(cached);
        }

        let loaded = self
            .load_or_create()
            .map_err(|e| SeasonsError::config(format!("{:#}", e)))?;
        let loaded = apply_env_overrides(loaded, |key| std::env::var(key).ok());

        if let Ok(mut cache) = self.config.write() {
            *cache = Some(loaded.clone());
        }
        Ok(loaded)
    }

    /// Writes `config` to disk and refreshes the cache.
    pub fn save(&self, config: &SeasonsConfig) -> Result<()> {
        self.write_file(config)
            .map_err(|e| SeasonsError::config(format!("{:#}", e)))?;
        self.invalidate_cache();
        Ok(())
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut cache) = self.config.write() {
            *cache = None;
        }
    }

    fn read_cache(&self) -> Option<SeasonsConfig> {
        self.config.read().ok().and_then(|cache| cache.clone())
    }

    fn load_or_create(&self) -> anyhow::Result<SeasonsConfig> {
        if !self.path.exists() {
            tracing::info!("[ConfigService] Creating default config at {:?}", self.path);
            let config = SeasonsConfig::default();
            self.write_file(&config)?;
            return Ok(config);
        }

        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let config = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;
        tracing::debug!("[ConfigService] Loaded config from {:?}", self.path);
        Ok(config)
    }

    fn write_file(&self, config: &SeasonsConfig) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let raw = toml::to_string_pretty(config).context("Failed to serialize config")?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }
}

/// Applies `SEASONS_*` overrides read through `lookup`. Blank values are ignored.
pub fn apply_env_overrides(
    mut config: SeasonsConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> SeasonsConfig {
    let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(project_id) = get(ENV_PROJECT_ID) {
        config.backend.project_id = project_id;
    }
    if let Some(api_key) = get(ENV_API_KEY) {
        config.backend.api_key = api_key;
    }
    if let Some(bucket) = get(ENV_STORAGE_BUCKET) {
        config.backend.storage_bucket = bucket;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_creates_default_config_when_missing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");
        let service = ConfigService::with_path(&path);

        let config = service.get_config().unwrap();

        assert_eq!(config.gallery.page_size, 12);
        assert!(path.exists());
    }

    #[test]
    fn test_save_then_reload() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(temp_dir.path().join("config.toml"));

        let mut config = service.get_config().unwrap();
        config.backend.project_id = "seasons-test".to_string();
        config.gallery.page_size = 6;
        service.save(&config).unwrap();

        let reloaded = ConfigService::with_path(service.path().clone())
            .get_config()
            .unwrap();
        assert_eq!(reloaded.gallery.page_size, 6);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[gallery\npage_size = ").unwrap();

        let err = ConfigService::with_path(&path).get_config().unwrap_err();
        assert!(matches!(err, SeasonsError::Config(_)));
    }

    #[test]
    fn test_env_overrides() {
        let config = apply_env_overrides(SeasonsConfig::default(), |key| match key {
            ENV_PROJECT_ID => Some("from-env".to_string()),
            ENV_API_KEY => Some("   ".to_string()),
            _ => None,
        });
        assert_eq!(config.backend.project_id, "from-env");
        assert!(config.backend.api_key.is_empty());
    }
}
