use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the config file location
pub const CONFIG_ENV_VAR: &str = "HBG_CONFIG";

/// Name of the project-local config file
pub const CONFIG_FILE_NAME: &str = "hbg.toml";

pub const DEFAULT_SOURCE_DIR: &str = "src/main/groovy";
pub const DEFAULT_TARGET_DIR: &str = "target/classes";
pub const DEFAULT_EXTENSION: &str = "groovy";
pub const DEFAULT_ACTION_KEY: f64 = 0.1;

/// Keys accepted by [`GeneratorConfig::get`] and [`GeneratorConfig::set`]
pub const KNOWN_KEYS: &[&str] = &[
    "source-dir",
    "target-dir",
    "extension",
    "keep-line-count",
    "log-file",
    "default-action-key",
];

/// Error type for loading or updating the configuration
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
    UnknownKey(String),
    InvalidValue { key: String, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Failed to parse config: {}", e),
            ConfigError::Serialize(e) => write!(f, "Failed to serialize config: {}", e),
            ConfigError::UnknownKey(key) => write!(
                f,
                "Unknown config key: {}. Supported keys: {}",
                key,
                KNOWN_KEYS.join(", ")
            ),
            ConfigError::InvalidValue { key, value } => {
                write!(f, "Invalid value for {}: {}", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(e: toml::ser::Error) -> Self {
        ConfigError::Serialize(e)
    }
}

/// Settings read from `hbg.toml`. Every field is optional; command line flags
/// take precedence over the file, the file over the built-in defaults.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct GeneratorConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_line_count: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_action_key: Option<f64>,
}

impl GeneratorConfig {
    /// Resolve the config file location.
    ///
    /// `HBG_CONFIG` wins when set and non-empty, then `./hbg.toml` if it exists,
    /// then the per-user file under the platform config directory.
    pub fn path() -> PathBuf {
        if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
            let trimmed = env_path.trim();
            if !trimmed.is_empty() {
                return PathBuf::from(trimmed);
            }
        }

        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return local;
        }

        #[cfg(not(target_os = "windows"))]
        let user = dirs::home_dir().map(|h| h.join(".config").join("hbg"));

        #[cfg(target_os = "windows")]
        let user = dirs::config_dir().map(|c| c.join("hbg"));

        user.map_or(local, |dir| dir.join(CONFIG_FILE_NAME))
    }

    /// Load from the resolved location, returning defaults if the file doesn't exist
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(&Self::path())
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(GeneratorConfig::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let value = match key {
            "source-dir" => self.source_dir.as_ref().map(|p| p.display().to_string()),
            "target-dir" => self.target_dir.as_ref().map(|p| p.display().to_string()),
            "extension" => self.extension.clone(),
            "keep-line-count" => self.keep_line_count.map(|b| b.to_string()),
            "log-file" => self.log_file.as_ref().map(|p| p.display().to_string()),
            "default-action-key" => self.default_action_key.map(|k| k.to_string()),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        };
        Ok(value)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };
        match key {
            "source-dir" => self.source_dir = Some(PathBuf::from(value)),
            "target-dir" => self.target_dir = Some(PathBuf::from(value)),
            "extension" => self.extension = Some(value.trim_start_matches('.').to_string()),
            "keep-line-count" => self.keep_line_count = Some(value.parse().map_err(|_| invalid())?),
            "log-file" => self.log_file = Some(PathBuf::from(value)),
            "default-action-key" => {
                let key_value: f64 = value.parse().map_err(|_| invalid())?;
                if !key_value.is_finite() {
                    return Err(invalid());
                }
                self.default_action_key = Some(key_value);
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self == &GeneratorConfig::default()
    }

    /// All configured (non-default) values as key/value pairs, in [`KNOWN_KEYS`] order
    pub fn values_iter(&self) -> Vec<(&'static str, String)> {
        KNOWN_KEYS
            .iter()
            .filter_map(|key| self.get(key).ok().flatten().map(|value| (*key, value)))
            .collect()
    }

    pub fn source_dir_or_default(&self) -> PathBuf {
        self.source_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE_DIR))
    }

    pub fn target_dir_or_default(&self) -> PathBuf {
        self.target_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TARGET_DIR))
    }

    pub fn extension_or_default(&self) -> String {
        self.extension
            .clone()
            .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
    }

    pub fn keep_line_count_or_default(&self) -> bool {
        self.keep_line_count.unwrap_or(false)
    }

    pub fn default_action_key_or_default(&self) -> f64 {
        self.default_action_key.unwrap_or(DEFAULT_ACTION_KEY)
    }
}
