use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use decarb_core::EngineConfig;

pub const DEFAULT_CONFIG_FILE: &str = "decarb.toml";
const DEFAULT_STORE_DIR: &str = ".decarb";

/// Contents of `decarb.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Directory of the JSON record store.
    pub store_dir: Option<String>,
    pub engine: EngineConfig,
}

impl CliConfig {
    pub fn store_dir(&self) -> PathBuf {
        PathBuf::from(self.store_dir.as_deref().unwrap_or(DEFAULT_STORE_DIR))
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config file error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
            ConfigError::Serialize(e) => write!(f, "config serialization error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        ConfigError::Io(value)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        ConfigError::Parse(value)
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(value: toml::ser::Error) -> Self {
        ConfigError::Serialize(value)
    }
}

/// Load `path` (or `decarb.toml`). A missing default file yields the
/// defaults; a missing explicit file is an error.
pub fn load_or_default(path: Option<&str>) -> Result<CliConfig, ConfigError> {
    let explicit = path.is_some();
    let path = Path::new(path.unwrap_or(DEFAULT_CONFIG_FILE));
    if !explicit && !path.exists() {
        tracing::debug!("no {} found, using defaults", DEFAULT_CONFIG_FILE);
        return Ok(CliConfig::default());
    }
    let content = fs::read_to_string(path)?;
    let cfg: CliConfig = toml::from_str(&content)?;
    tracing::debug!(path = %path.display(), "config loaded");
    Ok(cfg)
}
