//! The assembled translator.

use std::sync::Arc;

use super::DragomanBuilder;
use crate::cache::CacheManager;
use crate::config::Config;
use crate::dispatcher::{Dispatcher, Session};
use crate::error::TranslationError;
use crate::http::Connectivity;
use crate::interceptor::RequestInterceptor;
use crate::store::{HistoryLog, PersistentStore, Preferences};
use crate::types::{LanguageCode, TranslationResult};

/// Main entry point: a fully wired translator.
///
/// Cheap to share behind an `Arc`; every component is itself shared.
pub struct Dragoman {
    pub(super) config: Config,
    pub(super) store: Arc<dyn PersistentStore>,
    pub(super) cache: Arc<CacheManager>,
    pub(super) interceptor: Arc<RequestInterceptor>,
    pub(super) dispatcher: Arc<Dispatcher>,
    pub(super) history: Arc<HistoryLog>,
    pub(super) preferences: Preferences,
    pub(super) connectivity: Connectivity,
}

impl Dragoman {
    /// Create a new builder.
    pub fn builder() -> DragomanBuilder {
        DragomanBuilder::new()
    }

    /// Translate immediately, bypassing the debounce.
    pub async fn translate(
        &self,
        text: &str,
        source: &LanguageCode,
        target: &LanguageCode,
    ) -> Result<TranslationResult, TranslationError> {
        self.dispatcher.dispatch(text, source, target).await
    }

    /// A fresh session with the configured default languages.
    pub fn session(&self) -> Session {
        self.session_with(
            self.config.translation.source.clone(),
            self.config.translation.target.clone(),
        )
    }

    /// A fresh session with explicit languages.
    pub fn session_with(&self, source: LanguageCode, target: LanguageCode) -> Session {
        Session::new(
            Arc::clone(&self.dispatcher),
            source,
            target,
            self.config.debounce.clone(),
        )
    }

    /// Re-fetch `urls` into the static region.
    pub async fn cache_urls(&self, urls: &[String]) -> usize {
        self.interceptor.cache_urls(urls).await
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn PersistentStore> {
        &self.store
    }

    pub fn cache(&self) -> &Arc<CacheManager> {
        &self.cache
    }

    pub fn interceptor(&self) -> &Arc<RequestInterceptor> {
        &self.interceptor
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn history(&self) -> &Arc<HistoryLog> {
        &self.history
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn connectivity(&self) -> &Connectivity {
        &self.connectivity
    }
}
