//! Integration tests for the provider wire contracts and the fallback chain.
//!
//! Providers talk to wiremock servers through the real `reqwest` transport.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dragoman::http::{DEFAULT_TIMEOUT, ReqwestTransport, Transport};
use dragoman::providers::{
    GoogleTranslateClient, LibreTranslateClient, ProviderRegistry, TranslationProvider,
};
use dragoman::{DragomanError, ErrorKind, LanguageCode, Result};

// ============================================================================
// Helpers
// ============================================================================

fn transport() -> Arc<dyn Transport> {
    Arc::new(ReqwestTransport::new(DEFAULT_TIMEOUT).unwrap())
}

fn google(server: &MockServer) -> Arc<GoogleTranslateClient> {
    Arc::new(GoogleTranslateClient::with_endpoint(
        format!("{}/translate_a/single", server.uri()),
        transport(),
    ))
}

fn libre(server: &MockServer) -> Arc<LibreTranslateClient> {
    Arc::new(LibreTranslateClient::with_endpoint(server.uri(), transport()))
}

fn ar() -> LanguageCode {
    LanguageCode::arabic()
}

fn am() -> LanguageCode {
    LanguageCode::amharic()
}

fn gtx_payload(segments: &[&str]) -> serde_json::Value {
    let segments: Vec<_> = segments.iter().map(|s| json!([s, "src", null, null])).collect();
    json!([segments, null, "ar"])
}

/// Counts calls and fails with the configured error.
struct FailingProvider {
    calls: AtomicUsize,
    error: fn() -> DragomanError,
}

#[async_trait]
impl TranslationProvider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn translate(
        &self,
        _text: &str,
        _source: &LanguageCode,
        _target: &LanguageCode,
    ) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err((self.error)())
    }
}

/// Counts calls and echoes the input.
#[derive(Default)]
struct EchoProvider {
    calls: AtomicUsize,
}

#[async_trait]
impl TranslationProvider for EchoProvider {
    fn name(&self) -> &str {
        "echo"
    }

    async fn translate(
        &self,
        text: &str,
        _source: &LanguageCode,
        _target: &LanguageCode,
    ) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(text.to_string())
    }
}

// ============================================================================
// Wire contracts
// ============================================================================

#[tokio::test]
async fn google_sends_gtx_query_and_joins_segments() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/translate_a/single"))
        .and(query_param("client", "gtx"))
        .and(query_param("sl", "ar"))
        .and(query_param("tl", "am"))
        .and(query_param("dt", "t"))
        .and(query_param("q", "مرحبا بالعالم & more"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(gtx_payload(&["  ሰላም ", "ዓለም  "])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let text = google(&server)
        .translate("مرحبا بالعالم & more", &ar(), &am())
        .await
        .unwrap();
    assert_eq!(text, "ሰላም ዓለም", "segments concatenated then trimmed");
}

#[tokio::test]
async fn libre_posts_json_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/translate"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({
            "q": "hello",
            "source": "ar",
            "target": "am",
            "format": "text",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"translatedText": " ሰላም\n"})))
        .expect(1)
        .mount(&server)
        .await;

    let text = libre(&server).translate("hello", &ar(), &am()).await.unwrap();
    assert_eq!(text, "ሰላም");
}

#[tokio::test]
async fn libre_sends_api_key_when_configured() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/translate"))
        .and(body_json(json!({
            "q": "hello",
            "source": "ar",
            "target": "am",
            "format": "text",
            "api_key": "secret",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"translatedText": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = LibreTranslateClient::with_endpoint(format!("{}/", server.uri()), transport())
        .api_key("secret");
    assert_eq!(client.translate("hello", &ar(), &am()).await.unwrap(), "ok");
}

#[tokio::test]
async fn libre_missing_field_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/translate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "nope"})))
        .mount(&server)
        .await;

    let err = libre(&server).translate("hello", &ar(), &am()).await.unwrap_err();
    assert!(matches!(err, DragomanError::MalformedResponse(_)), "got {err:?}");
}

#[tokio::test]
async fn google_blank_translation_is_empty_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/translate_a/single"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gtx_payload(&["   "])))
        .mount(&server)
        .await;

    let err = google(&server).translate("x", &ar(), &am()).await.unwrap_err();
    assert!(matches!(err, DragomanError::EmptyResponse), "got {err:?}");
}

#[tokio::test]
async fn rate_limit_reads_retry_after() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
        .mount(&server)
        .await;

    let err = google(&server).translate("x", &ar(), &am()).await.unwrap_err();
    assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
}

// ============================================================================
// Fallback chain
// ============================================================================

#[tokio::test]
async fn primary_failure_falls_back_to_secondary() {
    let google_server = MockServer::start().await;
    let libre_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&google_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/translate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"translatedText": "ሰላም"})))
        .expect(1) // no retry, no further fallback
        .mount(&libre_server)
        .await;

    let registry = ProviderRegistry::new()
        .with(google(&google_server))
        .with(libre(&libre_server));

    let translation = registry.translate("مرحبا", &ar(), &am()).await.unwrap();
    assert_eq!(translation.text, "ሰላም");
    assert_eq!(translation.provider, "libretranslate");
}

#[tokio::test]
async fn primary_success_skips_secondary() {
    let google_server = MockServer::start().await;
    let libre_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gtx_payload(&["ሰላም"])))
        .expect(1)
        .mount(&google_server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"translatedText": "x"})))
        .expect(0)
        .mount(&libre_server)
        .await;

    let registry = ProviderRegistry::new()
        .with(google(&google_server))
        .with(libre(&libre_server));

    let translation = registry.translate("مرحبا", &ar(), &am()).await.unwrap();
    assert_eq!(translation.provider, "google");
}

#[tokio::test]
async fn malformed_primary_payload_falls_back() {
    let google_server = MockServer::start().await;
    let libre_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>captcha</html>"))
        .mount(&google_server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"translatedText": "ok"})))
        .expect(1)
        .mount(&libre_server)
        .await;

    let registry = ProviderRegistry::new()
        .with(google(&google_server))
        .with(libre(&libre_server));

    assert_eq!(registry.translate("x", &ar(), &am()).await.unwrap().text, "ok");
}

#[tokio::test]
async fn unreachable_primary_falls_back() {
    let libre_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"translatedText": "ok"})))
        .expect(1)
        .mount(&libre_server)
        .await;

    // Nothing listens on port 1
    let dead = Arc::new(GoogleTranslateClient::with_endpoint(
        "http://127.0.0.1:1/translate_a/single",
        transport(),
    ));
    let registry = ProviderRegistry::new().with(dead).with(libre(&libre_server));

    assert_eq!(registry.translate("x", &ar(), &am()).await.unwrap().text, "ok");
}

#[tokio::test]
async fn all_failing_is_exhausted_with_last_error() {
    let google_server = MockServer::start().await;
    let libre_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&google_server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&libre_server)
        .await;

    let registry = ProviderRegistry::new()
        .with(google(&google_server))
        .with(libre(&libre_server));

    let err = registry.translate("x", &ar(), &am()).await.unwrap_err();
    match &err {
        DragomanError::AllProvidersExhausted { last } => {
            assert!(matches!(**last, DragomanError::Api { status: 503, .. }), "got {last:?}");
        }
        other => panic!("expected AllProvidersExhausted, got {other:?}"),
    }
    assert_eq!(ErrorKind::of(&err), ErrorKind::AllProvidersExhausted);
}

#[tokio::test]
async fn exhausted_by_rate_limit_classifies_as_rate_limited() {
    let google_server = MockServer::start().await;
    let libre_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&google_server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&libre_server)
        .await;

    let registry = ProviderRegistry::new()
        .with(google(&google_server))
        .with(libre(&libre_server));

    let err = registry.translate("x", &ar(), &am()).await.unwrap_err();
    assert_eq!(ErrorKind::of(&err), ErrorKind::RateLimited);
}

#[tokio::test]
async fn validation_errors_stop_the_chain() {
    let failing = Arc::new(FailingProvider {
        calls: AtomicUsize::new(0),
        error: || DragomanError::InvalidInput("unsupported language pair".into()),
    });
    let echo = Arc::new(EchoProvider::default());

    let registry = ProviderRegistry::new()
        .with(failing.clone())
        .with(echo.clone());

    let err = registry.translate("x", &ar(), &am()).await.unwrap_err();
    assert!(matches!(err, DragomanError::InvalidInput(_)), "got {err:?}");
    assert_eq!(failing.calls.load(Ordering::SeqCst), 1);
    assert_eq!(echo.calls.load(Ordering::SeqCst), 0, "fallback must not run");
}

#[tokio::test]
async fn provider_errors_fall_through_to_later_providers() {
    let first = Arc::new(FailingProvider {
        calls: AtomicUsize::new(0),
        error: || DragomanError::Network("reset".into()),
    });
    let second = Arc::new(FailingProvider {
        calls: AtomicUsize::new(0),
        error: || DragomanError::EmptyResponse,
    });
    let echo = Arc::new(EchoProvider::default());

    let registry = ProviderRegistry::new()
        .with(first.clone())
        .with(second.clone())
        .with(echo.clone());

    let translation = registry.translate("hi", &ar(), &am()).await.unwrap();
    assert_eq!(translation.provider, "echo");
    assert_eq!(first.calls.load(Ordering::SeqCst), 1);
    assert_eq!(second.calls.load(Ordering::SeqCst), 1);
    assert_eq!(echo.calls.load(Ordering::SeqCst), 1);
    assert_eq!(registry.provider_names(), vec!["failing", "failing", "echo"]);
}

#[tokio::test]
async fn empty_registry_has_no_provider() {
    let registry = ProviderRegistry::new();
    assert!(registry.is_empty());
    let err = registry.translate("x", &ar(), &am()).await.unwrap_err();
    assert!(matches!(err, DragomanError::NoProvider));
}
