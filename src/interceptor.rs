//! Request interception and offline cache policies.
//!
//! The [`RequestInterceptor`] sits between providers and the network. Every
//! outbound request is classified by host:
//!
//! - **api**: the host is, or is a subdomain of, a translation provider
//!   domain. Network-first; successful responses are stored and replayed
//!   only when a later attempt fails outright. With the connectivity flag
//!   down no attempt is made at all.
//! - **static**: everything else. Cache-first; misses go to the network and
//!   successful GETs are stored.
//!
//! The interceptor never fails: when neither network nor cache can answer it
//! synthesizes a 503. Cache I/O errors are logged and treated as misses.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use crate::cache::{CacheManager, CacheRegion};
use crate::http::{Connectivity, HttpRequest, HttpResponse, Transport};
use crate::telemetry;
use crate::Result;

/// Provider domains routed through the api policy by default.
pub const DEFAULT_API_HOSTS: &[&str] = &["translate.googleapis.com", "libretranslate.com"];

/// Which cache policy a request falls under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    Static,
    Api,
}

/// A [`Transport`] that applies the offline cache policies in front of a
/// real network transport.
pub struct RequestInterceptor {
    network: Arc<dyn Transport>,
    cache: Arc<CacheManager>,
    connectivity: Connectivity,
    api_hosts: Vec<String>,
    shell_url: Option<String>,
}

impl RequestInterceptor {
    pub fn new(
        network: Arc<dyn Transport>,
        cache: Arc<CacheManager>,
        connectivity: Connectivity,
    ) -> Self {
        Self {
            network,
            cache,
            connectivity,
            api_hosts: DEFAULT_API_HOSTS.iter().map(|h| h.to_string()).collect(),
            shell_url: None,
        }
    }

    /// Replace the provider domain list.
    pub fn api_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.api_hosts = hosts
            .into_iter()
            .map(|h| h.into().to_ascii_lowercase())
            .collect();
        self
    }

    /// Add one provider domain.
    pub fn add_api_host(mut self, host: impl Into<String>) -> Self {
        let host = host.into().to_ascii_lowercase();
        if !self.api_hosts.contains(&host) {
            self.api_hosts.push(host);
        }
        self
    }

    /// Document served to HTML requests when the network is unreachable.
    pub fn shell_url(mut self, url: impl Into<String>) -> Self {
        self.shell_url = Some(url.into());
        self
    }

    pub fn connectivity(&self) -> &Connectivity {
        &self.connectivity
    }

    pub fn cache(&self) -> &Arc<CacheManager> {
        &self.cache
    }

    /// Classify a request by its host.
    pub fn classify(&self, request: &HttpRequest) -> RequestClass {
        let Some(host) = request.url.host_str() else {
            return RequestClass::Static;
        };
        let host = host.to_ascii_lowercase();
        let is_api = self.api_hosts.iter().any(|domain| {
            host == *domain
                || host
                    .strip_suffix(domain.as_str())
                    .is_some_and(|rest| rest.ends_with('.'))
        });
        if is_api {
            RequestClass::Api
        } else {
            RequestClass::Static
        }
    }

    /// Route a request through the policy of its class.
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    pub async fn handle(&self, request: HttpRequest) -> HttpResponse {
        match self.classify(&request) {
            RequestClass::Api => self.handle_api(request).await,
            RequestClass::Static => self.handle_static(request).await,
        }
    }

    async fn handle_api(&self, request: HttpRequest) -> HttpResponse {
        if !self.connectivity.is_online() {
            debug!("offline, short-circuiting api request");
            metrics::counter!(telemetry::SYNTHESIZED_RESPONSES_TOTAL, "reason" => "offline")
                .increment(1);
            return offline_response();
        }

        let key = request.fingerprint();
        match self.network.send(request).await {
            Ok(response) => {
                if response.is_success() {
                    if let Err(e) = self.cache.put(CacheRegion::Api, &key, response.clone()).await {
                        warn!(error = %e, "failed to cache api response");
                    }
                }
                response
            }
            Err(e) => {
                warn!(error = %e, "api request failed");
                if let Some(cached) = self.lookup(CacheRegion::Api, &key).await {
                    debug!("serving stale api response");
                    return cached;
                }
                metrics::counter!(telemetry::SYNTHESIZED_RESPONSES_TOTAL, "reason" => "network_failure")
                    .increment(1);
                HttpResponse::synthesized_json(
                    503,
                    &json!({
                        "error": "connection error",
                        "message": "please check your internet connection",
                    }),
                )
            }
        }
    }

    async fn handle_static(&self, request: HttpRequest) -> HttpResponse {
        let is_get = request.method == Method::GET;
        let key = static_key(&request);

        if is_get {
            if let Some(cached) = self.lookup(CacheRegion::Static, &key).await {
                debug!("static cache hit");
                return cached;
            }
            debug!("static cache miss");
        }

        let accepts_html = request.accepts_html();
        match self.network.send(request).await {
            Ok(response) => {
                if response.is_success() && is_get {
                    self.store_static(&key, &response).await;
                }
                response
            }
            Err(e) => {
                warn!(error = %e, "static request failed");
                if accepts_html {
                    if let Some(shell) = self.shell().await {
                        return shell;
                    }
                }
                metrics::counter!(telemetry::SYNTHESIZED_RESPONSES_TOTAL, "reason" => "network_failure")
                    .increment(1);
                HttpResponse::synthesized_text(503, "Service Unavailable", "connection error")
            }
        }
    }

    /// Seed the static region at startup.
    ///
    /// Each asset is fetched and stored independently; failures are logged
    /// and skipped. Returns the number of assets stored.
    pub async fn install(&self, assets: &[String]) -> usize {
        let stored = self.cache_urls(assets).await;
        info!(stored, requested = assets.len(), "static assets installed");
        stored
    }

    /// Fetch `urls` from the network and store the successful ones in the
    /// static region, bypassing the cache-first lookup.
    pub async fn cache_urls(&self, urls: &[String]) -> usize {
        let mut stored = 0;
        for url in urls {
            let request = match HttpRequest::get(url) {
                Ok(request) => request,
                Err(e) => {
                    warn!(%url, error = %e, "skipping asset");
                    continue;
                }
            };
            let key = static_key(&request);
            match self.network.send(request).await {
                Ok(response) if response.is_success() => {
                    if self.store_static(&key, &response).await {
                        stored += 1;
                    }
                }
                Ok(response) => {
                    warn!(%url, status = response.status, "asset fetch returned an error status");
                }
                Err(e) => warn!(%url, error = %e, "asset fetch failed"),
            }
        }
        stored
    }

    async fn store_static(&self, key: &str, response: &HttpResponse) -> bool {
        match self.cache.put(CacheRegion::Static, key, response.clone()).await {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "failed to cache static response");
                false
            }
        }
    }

    async fn shell(&self) -> Option<HttpResponse> {
        let url = self.shell_url.as_deref()?;
        let request = HttpRequest::get(url).ok()?;
        self.lookup(CacheRegion::Static, &static_key(&request)).await
    }

    async fn lookup(&self, region: CacheRegion, key: &str) -> Option<HttpResponse> {
        self.cache.get(region, key).await.unwrap_or_else(|e| {
            warn!(region = %region, error = %e, "cache read failed, treating as miss");
            None
        })
    }
}

#[async_trait]
impl Transport for RequestInterceptor {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        Ok(self.handle(request).await)
    }
}

/// Static entries are keyed by their normalised URL.
fn static_key(request: &HttpRequest) -> String {
    request.url.as_str().to_owned()
}

fn offline_response() -> HttpResponse {
    HttpResponse::synthesized_json(
        503,
        &json!({
            "error": "no internet connection",
            "offline": true,
        }),
    )
}
