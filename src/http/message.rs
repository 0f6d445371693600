//! Transport-neutral request and response values.
//!
//! Providers build an [`HttpRequest`], the interceptor inspects and routes
//! it, and whatever answers (network, cache, or a synthesized reply) comes
//! back as an [`HttpResponse`]. Responses are serializable so they can be
//! stored verbatim in a cache region.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use url::Url;

use crate::{DragomanError, Result};

/// An outbound request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    /// A GET request for `url`.
    pub fn get(url: &str) -> Result<Self> {
        Ok(Self::new(Method::GET, parse_url(url)?))
    }

    /// A POST request carrying `body` as JSON.
    pub fn post_json<T: Serialize>(url: &str, body: &T) -> Result<Self> {
        let mut request = Self::new(Method::POST, parse_url(url)?);
        request.body = Some(serde_json::to_vec(body)?);
        Ok(request.header("Content-Type", "application/json"))
    }

    /// Append a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Case-insensitive header lookup (first match).
    pub fn header_value(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Whether the caller expects an HTML document back.
    pub fn accepts_html(&self) -> bool {
        self.header_value("accept")
            .is_some_and(|accept| accept.contains("text/html"))
    }

    /// Stable identity of this request: method, URL and body.
    ///
    /// Hex-encoded SHA-256, so it is stable across processes and safe to
    /// persist as a cache key.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.method.as_str().as_bytes());
        hasher.update(b" ");
        hasher.update(self.url.as_str().as_bytes());
        hasher.update(b"\n");
        if let Some(body) = &self.body {
            hasher.update(body);
        }
        hex::encode(hasher.finalize())
    }
}

fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| DragomanError::InvalidInput(format!("invalid URL {url:?}: {e}")))
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseOrigin {
    #[default]
    Network,
    Cache,
    /// Built locally because the network could not be used.
    Synthesized,
}

/// A response, live or replayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    #[serde(with = "body_base64")]
    pub body: Vec<u8>,
    #[serde(skip)]
    pub origin: ResponseOrigin,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        let status_text = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or_default()
            .to_string();
        Self {
            status,
            status_text,
            headers: Vec::new(),
            body: body.into(),
            origin: ResponseOrigin::Network,
        }
    }

    /// A locally built JSON response.
    pub fn synthesized_json(status: u16, body: &serde_json::Value) -> Self {
        let mut response = Self::new(status, body.to_string());
        response
            .headers
            .push(("Content-Type".into(), "application/json".into()));
        response.origin = ResponseOrigin::Synthesized;
        response
    }

    /// A locally built plain-text response.
    pub fn synthesized_text(status: u16, status_text: &str, body: &str) -> Self {
        let mut response = Self::new(status, body);
        response.status_text = status_text.to_string();
        response.origin = ResponseOrigin::Synthesized;
        response
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_origin(mut self, origin: ResponseOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| DragomanError::MalformedResponse(e.to_string()))
    }

    /// Whether this is the interceptor's "no connectivity" reply.
    ///
    /// Only a locally synthesized reply qualifies; a server answering 503
    /// with a similar body does not.
    pub fn is_offline_marker(&self) -> bool {
        self.origin == ResponseOrigin::Synthesized
            && self.status == 503
            && serde_json::from_slice::<serde_json::Value>(&self.body)
                .ok()
                .and_then(|v| v.get("offline").and_then(|o| o.as_bool()))
                .unwrap_or(false)
    }
}

mod body_base64 {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(body: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(body))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_covers_method_url_and_body() {
        let a = HttpRequest::post_json("https://example.com/t", &serde_json::json!({"q": "a"}))
            .unwrap();
        let b = HttpRequest::post_json("https://example.com/t", &serde_json::json!({"q": "b"}))
            .unwrap();
        let c = HttpRequest::get("https://example.com/t").unwrap();
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_eq!(a.fingerprint(), a.clone().fingerprint());
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let req = HttpRequest::get("https://example.com/")
            .unwrap()
            .header("Accept", "text/html,application/xhtml+xml");
        assert!(req.accepts_html());
        assert_eq!(req.header_value("ACCEPT"), Some("text/html,application/xhtml+xml"));
    }

    #[test]
    fn response_survives_serialization_with_binary_body() {
        let response = HttpResponse::new(200, vec![0u8, 159, 146, 150]).with_header("X-A", "1");
        let json = serde_json::to_string(&response).unwrap();
        let back: HttpResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(back, response);
    }

    #[test]
    fn offline_marker_detected() {
        let offline = HttpResponse::synthesized_json(
            503,
            &serde_json::json!({"error": "offline", "offline": true}),
        );
        assert!(offline.is_offline_marker());
        assert!(!HttpResponse::new(503, "busy").is_offline_marker());
    }

    #[test]
    fn server_reply_with_offline_body_is_not_the_marker() {
        let from_server = HttpResponse::new(503, r#"{"error":"maintenance","offline":true}"#)
            .with_header("Content-Type", "application/json");
        assert_eq!(from_server.origin, ResponseOrigin::Network);
        assert!(!from_server.is_offline_marker());

        let replayed = from_server.with_origin(ResponseOrigin::Cache);
        assert!(!replayed.is_offline_marker());
    }
}
