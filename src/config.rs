//! Configuration loading.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.dragoman/config.toml` (user)
//! 3. `/etc/dragoman/config.toml` (system)
//!
//! Every section and field is optional; omitted values take their defaults.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cache::CacheConfig;
use crate::dispatcher::DebounceConfig;
use crate::http::DEFAULT_TIMEOUT;
use crate::providers::{DEFAULT_GOOGLE_ENDPOINT, DEFAULT_LIBRE_ENDPOINT};
use crate::types::{DEFAULT_MAX_HISTORY_ITEMS, DEFAULT_MAX_TEXT_LENGTH, LanguageCode};
use crate::{DragomanError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub translation: TranslationConfig,
    #[serde(default)]
    pub debounce: DebounceConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// Language defaults and input limits.
#[derive(Debug, Clone, Deserialize)]
pub struct TranslationConfig {
    /// Initial source language (default: "ar").
    #[serde(default = "default_source")]
    pub source: LanguageCode,
    /// Initial target language (default: "am").
    #[serde(default = "default_target")]
    pub target: LanguageCode,
    /// Longest accepted input, in characters (default: 50000).
    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,
    /// History entries retained (default: 100).
    #[serde(default = "default_max_history_items")]
    pub max_history_items: usize,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            target: default_target(),
            max_text_length: default_max_text_length(),
            max_history_items: default_max_history_items(),
        }
    }
}

fn default_source() -> LanguageCode {
    LanguageCode::arabic()
}

fn default_target() -> LanguageCode {
    LanguageCode::amharic()
}

fn default_max_text_length() -> usize {
    DEFAULT_MAX_TEXT_LENGTH
}

fn default_max_history_items() -> usize {
    DEFAULT_MAX_HISTORY_ITEMS
}

/// Provider chain configuration. Providers are tried in the order listed
/// here: Google first, LibreTranslate second.
#[derive(Debug, Clone, Deserialize)]
pub struct ProvidersConfig {
    /// Network timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub google: GoogleConfig,
    #[serde(default)]
    pub libretranslate: LibreConfig,
    /// Extra hosts routed through the api cache policy.
    #[serde(default)]
    pub api_hosts: Vec<String>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            google: GoogleConfig::default(),
            libretranslate: LibreConfig::default(),
            api_hosts: Vec::new(),
        }
    }
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

fn default_true() -> bool {
    true
}

/// Google `gtx` endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_google_endpoint")]
    pub endpoint: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_google_endpoint(),
        }
    }
}

fn default_google_endpoint() -> String {
    DEFAULT_GOOGLE_ENDPOINT.to_string()
}

/// LibreTranslate configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LibreConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Base URL; `/translate` is appended.
    #[serde(default = "default_libre_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for LibreConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_libre_endpoint(),
            api_key: None,
        }
    }
}

fn default_libre_endpoint() -> String {
    DEFAULT_LIBRE_ENDPOINT.to_string()
}

/// Where persisted state lives.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    /// Keep everything in memory; nothing survives the process.
    #[serde(default)]
    pub in_memory: bool,
    /// Database file (default: `<data dir>/dragoman/dragoman.redb`).
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    /// The database path, falling back to the user data directory.
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from(".dragoman"))
                .join("dragoman")
                .join("dragoman.redb")
        })
    }
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided)
    /// 2. `~/.dragoman/config.toml`
    /// 3. `/etc/dragoman/config.toml`
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_config_path(explicit_path)?.ok_or_else(|| {
            DragomanError::Configuration(
                "No config file found. Create ~/.dragoman/config.toml or /etc/dragoman/config.toml"
                    .to_string(),
            )
        })?;
        Self::from_file(&path)
    }

    /// Like [`load`](Self::load), but an absent file yields the defaults.
    ///
    /// An explicit path that does not exist is still an error.
    pub fn load_or_default(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| DragomanError::Configuration(format!("Failed to parse config: {e}")))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            DragomanError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            DragomanError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Resolve the config file path, if any exists.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(DragomanError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".dragoman").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/dragoman/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }
}
