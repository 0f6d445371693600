//! Builder for assembling a translator instance

use std::sync::Arc;

use tracing::{debug, info};
use url::Url;

use super::Dragoman;
use crate::cache::CacheManager;
use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::http::{Connectivity, ReqwestTransport, Transport};
use crate::interceptor::RequestInterceptor;
use crate::providers::{
    GoogleTranslateClient, LibreTranslateClient, ProviderRegistry, TranslationProvider,
};
use crate::store::{HistoryLog, MemoryStore, PersistentStore, Preferences, RedbStore};
use crate::{DragomanError, Result};

/// Builder for configuring a [`Dragoman`] instance.
///
/// Defaults come from [`Config::default`]; anything set explicitly on the
/// builder wins over the config.
pub struct DragomanBuilder {
    config: Config,
    store: Option<Arc<dyn PersistentStore>>,
    network: Option<Arc<dyn Transport>>,
    connectivity: Connectivity,
    extra_providers: Vec<Arc<dyn TranslationProvider>>,
    install_assets: bool,
}

impl DragomanBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            store: None,
            network: None,
            connectivity: Connectivity::online(),
            extra_providers: Vec::new(),
            install_assets: true,
        }
    }

    /// Use a loaded configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Use this store instead of the one described by `[store]`.
    pub fn store(mut self, store: Arc<dyn PersistentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use this transport for real network access instead of `reqwest`.
    pub fn network(mut self, network: Arc<dyn Transport>) -> Self {
        self.network = Some(network);
        self
    }

    /// Share an existing connectivity flag.
    pub fn connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }

    /// Append a provider after the configured ones (lowest priority).
    pub fn provider(mut self, provider: Arc<dyn TranslationProvider>) -> Self {
        self.extra_providers.push(provider);
        self
    }

    /// Whether to seed the static region from `[cache].static_assets` on
    /// build (default: true).
    pub fn install_assets(mut self, install: bool) -> Self {
        self.install_assets = install;
        self
    }

    /// Build the instance.
    ///
    /// Opening the cache sweeps regions of older versions.
    pub async fn build(self) -> Result<Dragoman> {
        let config = self.config;

        let store: Arc<dyn PersistentStore> = match self.store {
            Some(store) => store,
            None if config.store.in_memory => Arc::new(MemoryStore::new()),
            None => {
                let path = config.store.resolved_path();
                debug!(?path, "opening store");
                Arc::new(RedbStore::open(&path)?)
            }
        };

        let cache = Arc::new(CacheManager::open(Arc::clone(&store), &config.cache).await?);

        let network: Arc<dyn Transport> = match self.network {
            Some(network) => network,
            None => Arc::new(ReqwestTransport::new(std::time::Duration::from_secs(
                config.providers.timeout_secs,
            ))?),
        };

        // Provider endpoints are api-class regardless of the default host list
        let mut interceptor =
            RequestInterceptor::new(network, Arc::clone(&cache), self.connectivity.clone());
        for host in config
            .providers
            .api_hosts
            .iter()
            .cloned()
            .chain(provider_hosts(&config))
        {
            interceptor = interceptor.add_api_host(host);
        }
        if let Some(shell) = &config.cache.shell_url {
            interceptor = interceptor.shell_url(shell.clone());
        }
        let interceptor = Arc::new(interceptor);
        let transport: Arc<dyn Transport> = interceptor.clone();

        // Registration order is fallback order
        let mut registry = ProviderRegistry::new();
        let providers = &config.providers;
        if providers.google.enabled {
            registry.add(Arc::new(GoogleTranslateClient::with_endpoint(
                providers.google.endpoint.clone(),
                Arc::clone(&transport),
            )));
        }
        if providers.libretranslate.enabled {
            let mut client = LibreTranslateClient::with_endpoint(
                providers.libretranslate.endpoint.clone(),
                Arc::clone(&transport),
            );
            if let Some(key) = &providers.libretranslate.api_key {
                client = client.api_key(key.clone());
            }
            registry.add(Arc::new(client));
        }
        for provider in self.extra_providers {
            registry.add(provider);
        }
        if registry.is_empty() {
            return Err(DragomanError::NoProvider);
        }
        let provider_names = registry.provider_names();

        if self.install_assets && !config.cache.static_assets.is_empty() {
            interceptor.install(&config.cache.static_assets).await;
        }

        let history = Arc::new(HistoryLog::new(
            Arc::clone(&store),
            config.translation.max_history_items,
        ));
        let preferences = Preferences::new(Arc::clone(&store));
        let dispatcher = Arc::new(
            Dispatcher::new(
                Arc::new(registry),
                Arc::clone(&history),
                self.connectivity.clone(),
            )
            .max_text_length(config.translation.max_text_length),
        );

        info!(
            providers = ?provider_names,
            cache_version = %config.cache.version,
            "translator ready"
        );

        Ok(Dragoman {
            config,
            store,
            cache,
            interceptor,
            dispatcher,
            history,
            preferences,
            connectivity: self.connectivity,
        })
    }
}

impl Default for DragomanBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Hosts of the enabled, configured provider endpoints.
fn provider_hosts(config: &Config) -> Vec<String> {
    let providers = &config.providers;
    [
        (providers.google.enabled, &providers.google.endpoint),
        (providers.libretranslate.enabled, &providers.libretranslate.endpoint),
    ]
    .into_iter()
    .filter(|(enabled, _)| *enabled)
    .filter_map(|(_, endpoint)| Url::parse(endpoint).ok()?.host_str().map(str::to_owned))
    .collect()
}
