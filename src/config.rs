use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use setlog_core::DEFAULT_PAGE_SIZE;

/// Default per-request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Base URL of the sets API (e.g. "https://api.example.com")
    pub api_url: ConfigValue<Option<String>>,
    /// File holding the session token
    pub token_path: ConfigValue<PathBuf>,
    /// Number of sets per page
    pub page_size: ConfigValue<u32>,
    /// Upper bound for a single request
    pub request_timeout_secs: ConfigValue<u64>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    api_url: Option<String>,
    token_path: Option<PathBuf>,
    page_size: Option<u32>,
    request_timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        // Start with defaults
        let mut api_url = ConfigValue::new(None, ConfigSource::Default);
        let mut token_path = ConfigValue::new(Self::default_token_path(), ConfigSource::Default);
        let mut page_size = ConfigValue::new(DEFAULT_PAGE_SIZE, ConfigSource::Default);
        let mut request_timeout_secs =
            ConfigValue::new(DEFAULT_TIMEOUT_SECS, ConfigSource::Default);
        let mut config_file = None;

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(url) = file_config.api_url {
                api_url = ConfigValue::new(Some(url), ConfigSource::File);
            }
            if let Some(file_token_path) = file_config.token_path {
                // Resolve relative paths against config file's directory
                let resolved_path = if file_token_path.is_relative() {
                    path.parent()
                        .map(|p| p.join(&file_token_path))
                        .unwrap_or(file_token_path)
                } else {
                    file_token_path
                };
                token_path = ConfigValue::new(resolved_path, ConfigSource::File);
            }
            if let Some(size) = file_config.page_size {
                page_size = ConfigValue::new(size, ConfigSource::File);
            }
            if let Some(secs) = file_config.request_timeout_secs {
                request_timeout_secs = ConfigValue::new(secs, ConfigSource::File);
            }
        }

        // Apply environment variable overrides
        if let Ok(url) = std::env::var("SETLOG_API_URL") {
            api_url = ConfigValue::new(Some(url), ConfigSource::Environment);
        }
        if let Ok(path) = std::env::var("SETLOG_TOKEN_PATH") {
            token_path = ConfigValue::new(PathBuf::from(path), ConfigSource::Environment);
        }
        if let Ok(size) = std::env::var("SETLOG_PAGE_SIZE") {
            let size = parse_env("SETLOG_PAGE_SIZE", &size)?;
            page_size = ConfigValue::new(size, ConfigSource::Environment);
        }
        if let Ok(secs) = std::env::var("SETLOG_TIMEOUT_SECS") {
            let secs = parse_env("SETLOG_TIMEOUT_SECS", &secs)?;
            request_timeout_secs = ConfigValue::new(secs, ConfigSource::Environment);
        }

        if page_size.value == 0 {
            return Err(ConfigError::InvalidValue {
                name: "page_size".to_string(),
                value: "0".to_string(),
            });
        }

        Ok(Self {
            api_url,
            token_path,
            page_size,
            request_timeout_secs,
            config_file,
        })
    }

    /// Returns the API base URL, or an error telling the user how to set it.
    pub fn require_api_url(&self) -> Result<&str, ConfigError> {
        self.api_url
            .value
            .as_deref()
            .ok_or(ConfigError::MissingApiUrl)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.value)
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/setlog/
    /// - macOS: ~/Library/Application Support/setlog/
    /// - Windows: %APPDATA%/setlog/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("setlog")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/setlog/
    /// - macOS: ~/Library/Application Support/setlog/
    /// - Windows: %APPDATA%/setlog/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("setlog")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }

    pub fn default_token_path() -> PathBuf {
        Self::default_data_dir().join("token")
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name: name.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidValue { name: String, value: String },
    MissingApiUrl,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidValue { name, value } => {
                write!(f, "Invalid value '{}' for {}", value, name)
            }
            ConfigError::MissingApiUrl => write!(
                f,
                "API URL not configured. Set api_url in config or SETLOG_API_URL."
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
