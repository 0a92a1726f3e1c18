use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;

use crate::domain::error::{AppError, Result};
use crate::domain::feedback::ExplorerConfig;

pub const CONFIG_PATH_ENV: &str = "FEEDBACK_EXPLORER_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "feedback_explorer.toml";
pub const ENV_PREFIX: &str = "FEEDBACK_EXPLORER_";

/// Layers defaults, the TOML file and `FEEDBACK_EXPLORER_*` variables
pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    /// Loads `.env` first so it can point at a config file or override values
    pub fn new() -> Self {
        let _ = dotenvy::dotenv();
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self { path }
    }

    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<ExplorerConfig> {
        let config: ExplorerConfig = self
            .figment()
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| AppError::ConfigError(e.to_string()))?;

        config.validate().map_err(AppError::ConfigError)?;
        Ok(config)
    }

    /// Defaults plus the TOML file; a missing file contributes nothing
    fn figment(&self) -> Figment {
        Figment::from(Serialized::defaults(ExplorerConfig::default()))
            .merge(Toml::file(&self.path))
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}
