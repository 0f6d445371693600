//! Google Translate "gtx" endpoint client (primary provider).
//!
//! Wire contract:
//!
//! ```text
//! GET <endpoint>?client=gtx&sl=<src>&tl=<tgt>&dt=t&q=<urlencoded text>
//! → [[["seg one","src one",…],["seg two","src two",…],…],…]
//! ```
//!
//! The translation is the concatenation of `response[0][i][0]` over all
//! segments `i`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::traits::{TranslationProvider, check_status, normalise};
use crate::http::{HttpRequest, Transport};
use crate::types::LanguageCode;
use crate::{DragomanError, Result};

/// Default endpoint of the gtx API.
pub const DEFAULT_GOOGLE_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Client for the free Google Translate gtx endpoint.
#[derive(Clone)]
pub struct GoogleTranslateClient {
    endpoint: String,
    transport: Arc<dyn Transport>,
}

impl GoogleTranslateClient {
    /// Create a client for the public endpoint.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_endpoint(DEFAULT_GOOGLE_ENDPOINT, transport)
    }

    /// Create a client with a custom endpoint (for testing with wiremock).
    pub fn with_endpoint(endpoint: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            endpoint: endpoint.into(),
            transport,
        }
    }

    /// Build the request URL for a translation.
    pub fn request_url(&self, text: &str, source: &LanguageCode, target: &LanguageCode) -> String {
        format!(
            "{}?client=gtx&sl={}&tl={}&dt=t&q={}",
            self.endpoint,
            source,
            target,
            urlencoding::encode(text)
        )
    }
}

/// Concatenate the translated segments of a gtx payload.
pub(crate) fn join_segments(payload: &Value) -> Result<String> {
    let segments = payload
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| DragomanError::MalformedResponse("missing segment list".into()))?;
    Ok(segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect())
}

#[async_trait]
impl TranslationProvider for GoogleTranslateClient {
    fn name(&self) -> &str {
        "google"
    }

    async fn translate(
        &self,
        text: &str,
        source: &LanguageCode,
        target: &LanguageCode,
    ) -> Result<String> {
        let request = HttpRequest::get(&self.request_url(text, source, target))?
            .header("Accept", "application/json");
        let response = self.transport.send(request).await?;
        check_status(&response, self.name())?;

        let payload: Value = response.json()?;
        normalise(&join_segments(&payload)?)
    }
}
