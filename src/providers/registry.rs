//! Provider registry with fallback chain semantics.
//!
//! The `ProviderRegistry` stores providers in priority order (index 0 = primary).
//! A translation walks the chain as an explicit state machine:
//!
//! ```text
//! Trying(0) ──ok──► Succeeded
//!     │ fallback-triggering error
//!     ▼
//! Trying(1) ──ok──► Succeeded
//!     │
//!     ▼
//!    …
//!     │
//!     ▼
//! Exhausted ──► Err(AllProvidersExhausted { last })
//! ```
//!
//! # Fallback Triggers
//!
//! Network failures, non-2xx statuses (including 429) and malformed or empty
//! payloads move on to the next provider. Client-side validation errors are
//! terminal and returned as-is. There is no retry inside a provider; the
//! chain is the only retry mechanism.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, instrument, warn};

use super::traits::TranslationProvider;
use crate::telemetry;
use crate::types::LanguageCode;
use crate::{DragomanError, Result};

/// Where the chain currently stands.
#[derive(Debug)]
pub enum FallbackState {
    /// About to call the provider at this index.
    Trying(usize),
    /// The provider at `index` produced `text`.
    Succeeded { index: usize, text: String },
    /// No provider left to try.
    Exhausted,
}

/// A translation and the provider that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderTranslation {
    pub text: String,
    pub provider: String,
}

/// Registry of translation providers with fallback chain semantics.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn TranslationProvider>>,
}

impl ProviderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a provider (appended to end of chain = lowest priority).
    ///
    /// Call in priority order: first registered = primary.
    pub fn add(&mut self, provider: Arc<dyn TranslationProvider>) {
        self.providers.push(provider);
    }

    /// Builder-style [`add`](Self::add).
    pub fn with(mut self, provider: Arc<dyn TranslationProvider>) -> Self {
        self.add(provider);
        self
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Registered provider names, in priority order.
    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    /// Translate using the fallback chain.
    #[instrument(skip(self, text), fields(chars = text.chars().count(), %source, %target))]
    pub async fn translate(
        &self,
        text: &str,
        source: &LanguageCode,
        target: &LanguageCode,
    ) -> Result<ProviderTranslation> {
        let start = Instant::now();
        let mut last_err = None;
        let mut state = FallbackState::Trying(0);

        loop {
            state = match state {
                FallbackState::Trying(index) => match self.providers.get(index) {
                    None => FallbackState::Exhausted,
                    Some(provider) => match provider.translate(text, source, target).await {
                        Ok(text) => FallbackState::Succeeded { index, text },
                        Err(e) if e.is_fallback_trigger() => {
                            warn!(provider = provider.name(), error = %e, "provider failed, falling back");
                            metrics::counter!(telemetry::FALLBACKS_TOTAL,
                                "provider" => provider.name().to_owned(),
                            )
                            .increment(1);
                            last_err = Some(e);
                            FallbackState::Trying(index + 1)
                        }
                        Err(e) => {
                            Self::record_request(provider.name(), start, false);
                            return Err(e);
                        }
                    },
                },
                FallbackState::Succeeded { index, text } => {
                    let provider = self.providers[index].name().to_owned();
                    debug!(%provider, "translation succeeded");
                    Self::record_request(&provider, start, true);
                    return Ok(ProviderTranslation { text, provider });
                }
                FallbackState::Exhausted => {
                    Self::record_request("none", start, false);
                    return Err(match last_err {
                        Some(last) => DragomanError::AllProvidersExhausted {
                            last: Box::new(last),
                        },
                        None => DragomanError::NoProvider,
                    });
                }
            };
        }
    }

    /// Record request outcome metrics (counter + histogram).
    fn record_request(provider: &str, start: Instant, ok: bool) {
        let status = if ok { "ok" } else { "error" };
        metrics::counter!(telemetry::REQUESTS_TOTAL,
            "provider" => provider.to_owned(),
            "status" => status,
        )
        .increment(1);
        metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS,
            "provider" => provider.to_owned(),
        )
        .record(start.elapsed().as_secs_f64());
    }
}
