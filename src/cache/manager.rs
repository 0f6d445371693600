//! Versioned cache regions over the persistent store.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{CacheConfig, CacheRegion};
use crate::http::{HttpResponse, ResponseOrigin};
use crate::store::PersistentStore;
use crate::telemetry;
use crate::{DragomanError, Result};

/// Store key listing every region name ever opened and not yet swept.
const REGISTRY_KEY: &str = "cache/registry";

/// Prefix under which region entries live: `cache/region/<name>/<key>`.
const REGION_ROOT: &str = "cache/region/";

/// One stored response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub request_key: String,
    pub response: HttpResponse,
    pub stored_at: DateTime<Utc>,
    pub region: CacheRegion,
}

impl CacheEntry {
    pub fn new(region: CacheRegion, request_key: impl Into<String>, response: HttpResponse) -> Self {
        Self {
            request_key: request_key.into(),
            response,
            stored_at: Utc::now(),
            region,
        }
    }

    /// Age relative to now; zero if the clock went backwards.
    pub fn age(&self) -> Duration {
        (Utc::now() - self.stored_at).to_std().unwrap_or_default()
    }
}

/// Owner of the static and API cache regions.
///
/// Two tiers: a bounded in-memory hot tier (moka) in front of the
/// [`PersistentStore`]. Writes go to both; reads consult the hot tier
/// first and promote store hits into it. Region sweeps invalidate the
/// whole hot tier.
///
/// API entries older than the configured TTL read as absent. They are not
/// deleted eagerly; the next successful write for the same key replaces
/// them.
pub struct CacheManager {
    store: Arc<dyn PersistentStore>,
    static_name: String,
    api_name: String,
    api_ttl: Duration,
    hot: Cache<(CacheRegion, String), Arc<CacheEntry>>,
}

impl CacheManager {
    /// Open the current generation's regions and sweep every other region.
    ///
    /// Fails with [`DragomanError::Configuration`] when the configured
    /// region names are unusable.
    pub async fn open(store: Arc<dyn PersistentStore>, config: &CacheConfig) -> Result<Self> {
        config.validate()?;
        let manager = Self {
            store,
            static_name: config.static_region_name(),
            api_name: config.api_region_name(),
            api_ttl: Duration::from_secs(config.api_ttl_secs),
            hot: Cache::builder().max_capacity(config.hot_entries).build(),
        };

        let current = manager.current_names();
        let mut registry = manager.read_registry().await?;
        registry.extend(current.iter().cloned());
        manager.write_registry(&registry).await?;

        let swept = manager.delete_regions_except(&current).await?;
        info!(
            static_region = %manager.static_name,
            api_region = %manager.api_name,
            swept = swept.len(),
            "cache regions opened"
        );
        Ok(manager)
    }

    /// Name of a region in the current generation.
    pub fn region_name(&self, region: CacheRegion) -> &str {
        match region {
            CacheRegion::Static => &self.static_name,
            CacheRegion::Api => &self.api_name,
        }
    }

    /// Names of both current regions.
    pub fn current_names(&self) -> HashSet<String> {
        HashSet::from([self.static_name.clone(), self.api_name.clone()])
    }

    /// Store `response` under `key`, replacing any previous entry.
    pub async fn put(&self, region: CacheRegion, key: &str, response: HttpResponse) -> Result<()> {
        self.put_entry(CacheEntry::new(region, key, response)).await
    }

    /// Store a pre-built entry, keeping its `stored_at` stamp.
    pub async fn put_entry(&self, entry: CacheEntry) -> Result<()> {
        let store_key = self.entry_key(entry.region, &entry.request_key);
        let bytes = serde_json::to_vec(&entry)?;
        self.store.put(&store_key, bytes).await?;
        self.hot
            .insert((entry.region, entry.request_key.clone()), Arc::new(entry))
            .await;
        Ok(())
    }

    /// Look up a live entry.
    ///
    /// The returned response is marked [`ResponseOrigin::Cache`].
    pub async fn get(&self, region: CacheRegion, key: &str) -> Result<Option<HttpResponse>> {
        Ok(self
            .get_entry(region, key)
            .await?
            .map(|entry| entry.response.clone().with_origin(ResponseOrigin::Cache)))
    }

    /// Look up a live entry with its metadata.
    pub async fn get_entry(&self, region: CacheRegion, key: &str) -> Result<Option<Arc<CacheEntry>>> {
        let hot_key = (region, key.to_owned());
        let entry = match self.hot.get(&hot_key).await {
            Some(entry) => Some(entry),
            None => match self.load(region, key).await? {
                Some(entry) => {
                    let entry = Arc::new(entry);
                    self.hot.insert(hot_key, Arc::clone(&entry)).await;
                    Some(entry)
                }
                None => None,
            },
        };

        let entry = entry.filter(|entry| {
            let expired = region == CacheRegion::Api && entry.age() > self.api_ttl;
            if expired {
                debug!(region = %region, key, "cached entry expired");
            }
            !expired
        });

        let counter = if entry.is_some() {
            telemetry::CACHE_HITS_TOTAL
        } else {
            telemetry::CACHE_MISSES_TOTAL
        };
        metrics::counter!(counter, "region" => region.as_str()).increment(1);
        Ok(entry)
    }

    /// Number of entries stored in a current region (expired ones included).
    pub async fn entry_count(&self, region: CacheRegion) -> Result<usize> {
        let prefix = region_prefix(self.region_name(region));
        Ok(self.store.keys_with_prefix(&prefix).await?.len())
    }

    /// Every region known to the store: registered ones plus any that
    /// still hold entries.
    pub async fn region_names(&self) -> Result<BTreeSet<String>> {
        let mut names = self.read_registry().await?;
        for key in self.store.keys_with_prefix(REGION_ROOT).await? {
            if let Some((name, _)) = key[REGION_ROOT.len()..].split_once('/') {
                names.insert(name.to_owned());
            }
        }
        Ok(names)
    }

    /// Delete, in full, every region whose name is not in `keep`.
    ///
    /// Returns the names of the deleted regions.
    pub async fn delete_regions_except(&self, keep: &HashSet<String>) -> Result<Vec<String>> {
        let mut deleted = Vec::new();
        for name in self.region_names().await? {
            if keep.contains(&name) {
                continue;
            }
            let removed = self.store.delete_prefix(&region_prefix(&name)).await?;
            info!(region = %name, entries = removed, "deleting old cache region");
            deleted.push(name);
        }

        if !deleted.is_empty() {
            let mut registry = self.read_registry().await?;
            registry.retain(|name| keep.contains(name));
            self.write_registry(&registry).await?;
            self.hot.invalidate_all();
        }
        Ok(deleted)
    }

    fn entry_key(&self, region: CacheRegion, key: &str) -> String {
        format!("{}{key}", region_prefix(self.region_name(region)))
    }

    async fn load(&self, region: CacheRegion, key: &str) -> Result<Option<CacheEntry>> {
        let Some(bytes) = self.store.get(&self.entry_key(region, key)).await? else {
            return Ok(None);
        };
        match serde_json::from_slice(&bytes) {
            Ok(entry) => Ok(Some(entry)),
            Err(e) => {
                warn!(region = %region, key, error = %e, "dropping unreadable cache entry");
                Ok(None)
            }
        }
    }

    async fn read_registry(&self) -> Result<BTreeSet<String>> {
        match self.store.get(REGISTRY_KEY).await? {
            Some(bytes) => serde_json::from_slice(&bytes).or_else(|e| {
                warn!(error = %e, "cache registry unreadable, rebuilding");
                Ok::<_, DragomanError>(BTreeSet::new())
            }),
            None => Ok(BTreeSet::new()),
        }
    }

    async fn write_registry(&self, names: &BTreeSet<String>) -> Result<()> {
        self.store
            .put(REGISTRY_KEY, serde_json::to_vec(names)?)
            .await
    }
}

fn region_prefix(name: &str) -> String {
    format!("{REGION_ROOT}{name}/")
}
