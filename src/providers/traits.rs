//! Provider trait for translation backends.
//!
//! A provider turns `(text, source, target)` into a plain translated string.
//! Each backend has its own wire contract; normalising the payload into a
//! trimmed string is the provider's job, so the registry only ever sees
//! `Result<String>`.
//!
//! # Fallback Semantics
//!
//! Any error whose [`is_fallback_trigger()`](crate::DragomanError::is_fallback_trigger)
//! is true sends the registry on to the next provider. Client-side
//! validation errors (`InvalidInput`, `EmptyText`, `TextTooLong`) are
//! terminal. Providers never retry internally.

use async_trait::async_trait;

use crate::http::HttpResponse;
use crate::types::LanguageCode;
use crate::{DragomanError, Result};

/// A translation backend.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Provider name for logging/metrics.
    fn name(&self) -> &str;

    /// Translate `text`. Returns the normalised, non-empty translation.
    async fn translate(
        &self,
        text: &str,
        source: &LanguageCode,
        target: &LanguageCode,
    ) -> Result<String>;
}

/// Map a non-2xx response to an error.
///
/// Shared by the HTTP providers: `429` becomes `RateLimited` (with a
/// numeric `Retry-After` hint if present), the interceptor's offline reply
/// becomes `Offline`, anything else becomes `Api`.
pub(crate) fn check_status(response: &HttpResponse, provider: &str) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    if response.is_offline_marker() {
        return Err(DragomanError::Offline);
    }
    match response.status {
        429 => {
            let retry_after = response
                .header_value("retry-after")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(std::time::Duration::from_secs);
            Err(DragomanError::RateLimited { retry_after })
        }
        code => Err(DragomanError::Api {
            status: code,
            message: format!("{provider} returned {code} {}", response.status_text),
        }),
    }
}

/// Trim a provider's output and reject empty translations.
pub(crate) fn normalise(text: &str) -> Result<String> {
    let text = text.trim();
    if text.is_empty() {
        return Err(DragomanError::EmptyResponse);
    }
    Ok(text.to_owned())
}
