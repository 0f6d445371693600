//! LibreTranslate client (fallback provider).
//!
//! Wire contract: `POST <endpoint>/translate` with JSON body
//! `{q, source, target, format: "text"}` → `{"translatedText": "..."}`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::traits::{TranslationProvider, check_status, normalise};
use crate::http::{HttpRequest, Transport};
use crate::types::LanguageCode;
use crate::{DragomanError, Result};

/// Default LibreTranslate base URL.
pub const DEFAULT_LIBRE_ENDPOINT: &str = "https://libretranslate.com";

/// Client for a LibreTranslate instance.
#[derive(Clone)]
pub struct LibreTranslateClient {
    endpoint: String,
    api_key: Option<String>,
    transport: Arc<dyn Transport>,
}

impl LibreTranslateClient {
    /// Create a client for the public instance.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_endpoint(DEFAULT_LIBRE_ENDPOINT, transport)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_endpoint(endpoint: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: None,
            transport,
        }
    }

    /// Send an API key with every request (required by some instances).
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    fn translate_url(&self) -> String {
        format!("{}/translate", self.endpoint.trim_end_matches('/'))
    }
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
}

#[async_trait]
impl TranslationProvider for LibreTranslateClient {
    fn name(&self) -> &str {
        "libretranslate"
    }

    async fn translate(
        &self,
        text: &str,
        source: &LanguageCode,
        target: &LanguageCode,
    ) -> Result<String> {
        let body = TranslateRequest {
            q: text,
            source: source.as_str(),
            target: target.as_str(),
            format: "text",
            api_key: self.api_key.as_deref(),
        };
        let request = HttpRequest::post_json(&self.translate_url(), &body)?;
        let response = self.transport.send(request).await?;
        check_status(&response, self.name())?;

        let parsed: TranslateResponse = response.json()?;
        let translated = parsed.translated_text.ok_or_else(|| {
            DragomanError::MalformedResponse("missing field `translatedText`".into())
        })?;
        normalise(&translated)
    }
}
