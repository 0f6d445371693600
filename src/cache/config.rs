//! Cache configuration and region naming.

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{DragomanError, Result};

/// Default generation tag appended to region names.
pub const DEFAULT_CACHE_VERSION: &str = "v2";

/// How long a stored API response stays usable as a fallback.
pub const DEFAULT_API_TTL: Duration = Duration::from_secs(60 * 60 * 24);

/// The two cache regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheRegion {
    /// Static assets: cache-first, no expiry.
    Static,
    /// Translation API responses: network-first, read back on failure only.
    Api,
}

impl CacheRegion {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheRegion::Static => "static",
            CacheRegion::Api => "api",
        }
    }
}

impl fmt::Display for CacheRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for the cache manager and the static-asset policy.
///
/// ```rust
/// # use dragoman::cache::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .version("v3")
///     .api_ttl(Duration::from_secs(3600));
/// assert_eq!(config.static_region_name(), "translator-v3");
/// assert_eq!(config.api_region_name(), "translator-api-v3");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Generation tag. Bumping it purges every region of older generations.
    pub version: String,
    /// Name stem of the static-asset region.
    pub static_prefix: String,
    /// Name stem of the API-response region.
    pub api_prefix: String,
    /// Retention of API responses, in seconds. Default: 24 hours.
    pub api_ttl_secs: u64,
    /// Capacity of the in-memory hot tier. Default: 1,000.
    pub hot_entries: u64,
    /// URLs seeded into the static region at startup.
    pub static_assets: Vec<String>,
    /// Root document served to HTML requests when the network is down.
    pub shell_url: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            version: DEFAULT_CACHE_VERSION.to_string(),
            static_prefix: "translator".to_string(),
            api_prefix: "translator-api".to_string(),
            api_ttl_secs: DEFAULT_API_TTL.as_secs(),
            hot_entries: 1_000,
            static_assets: Vec::new(),
            shell_url: None,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn api_ttl(mut self, ttl: Duration) -> Self {
        self.api_ttl_secs = ttl.as_secs();
        self
    }

    pub fn hot_entries(mut self, n: u64) -> Self {
        self.hot_entries = n;
        self
    }

    pub fn static_assets(mut self, assets: Vec<String>) -> Self {
        self.static_assets = assets;
        self
    }

    pub fn shell_url(mut self, url: impl Into<String>) -> Self {
        self.shell_url = Some(url.into());
        self
    }

    pub fn static_region_name(&self) -> String {
        format!("{}-{}", self.static_prefix, self.version)
    }

    pub fn api_region_name(&self) -> String {
        format!("{}-{}", self.api_prefix, self.version)
    }

    /// Check that region names can be read back from store keys.
    ///
    /// Entries live under `cache/region/<name>/<key>`, so a name must be
    /// non-empty and free of `/`.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("version", &self.version),
            ("static_prefix", &self.static_prefix),
            ("api_prefix", &self.api_prefix),
        ] {
            if value.is_empty() || value.contains('/') {
                return Err(DragomanError::Configuration(format!(
                    "cache {field} must be non-empty and must not contain '/': {value:?}"
                )));
            }
        }
        Ok(())
    }

    /// Names of the regions belonging to the current generation.
    pub fn current_region_names(&self) -> HashSet<String> {
        HashSet::from([self.static_region_name(), self.api_region_name()])
    }
}
