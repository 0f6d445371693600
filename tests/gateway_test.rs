//! End-to-end tests for the assembled translator.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dragoman::cache::CacheRegion;
use dragoman::config::Config;
use dragoman::store::MemoryStore;
use dragoman::{Dragoman, DragomanError, ErrorKind, LanguageCode, Theme};

fn config_for(google: &MockServer, libre: &MockServer) -> Config {
    let mut config = Config::default();
    config.store.in_memory = true;
    config.providers.google.endpoint = format!("{}/translate_a/single", google.uri());
    config.providers.libretranslate.endpoint = libre.uri();
    config
}

fn gtx(text: &str) -> serde_json::Value {
    json!([[[text, "src", null, null]], null, "ar"])
}

#[tokio::test]
async fn translates_through_google() {
    let google = MockServer::start().await;
    let libre = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/translate_a/single"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gtx("ሰላም")))
        .expect(1)
        .mount(&google)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&libre)
        .await;

    let dragoman = Dragoman::builder()
        .config(config_for(&google, &libre))
        .build()
        .await
        .unwrap();

    let result = dragoman
        .translate("مرحبا", &LanguageCode::arabic(), &LanguageCode::amharic())
        .await
        .unwrap();
    assert_eq!(result.text, "ሰላም");
    assert_eq!(result.provider_used, "google");

    let history = dragoman.history().entries().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].target_text, "ሰላም");

    // Provider hosts are routed through the api policy and cached
    assert_eq!(dragoman.cache().entry_count(CacheRegion::Api).await.unwrap(), 1);
}

#[tokio::test]
async fn falls_back_to_libretranslate() {
    let google = MockServer::start().await;
    let libre = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&google)
        .await;
    Mock::given(method("POST"))
        .and(path("/translate"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"translatedText": "ሰላም"})),
        )
        .expect(1)
        .mount(&libre)
        .await;

    let dragoman = Dragoman::builder()
        .config(config_for(&google, &libre))
        .build()
        .await
        .unwrap();

    let result = dragoman
        .translate("مرحبا", &LanguageCode::arabic(), &LanguageCode::amharic())
        .await
        .unwrap();
    assert_eq!(result.provider_used, "libretranslate");
}

#[tokio::test]
async fn offline_fails_without_network() {
    let google = MockServer::start().await;
    let libre = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gtx("x")))
        .expect(0)
        .mount(&google)
        .await;

    let dragoman = Dragoman::builder()
        .config(config_for(&google, &libre))
        .build()
        .await
        .unwrap();
    dragoman.connectivity().set_online(false);

    let err = dragoman
        .translate("hello", &LanguageCode::english(), &LanguageCode::arabic())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Offline);
    assert!(dragoman.history().entries().await.unwrap().is_empty());
}

#[tokio::test]
async fn no_enabled_provider_is_an_error() {
    let mut config = Config::default();
    config.store.in_memory = true;
    config.providers.google.enabled = false;
    config.providers.libretranslate.enabled = false;

    let err = Dragoman::builder().config(config).build().await.err().unwrap();
    assert!(matches!(err, DragomanError::NoProvider));
}

#[tokio::test]
async fn static_assets_are_installed_on_build() {
    let google = MockServer::start().await;
    let libre = MockServer::start().await;
    let assets = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/app.js"))
        .respond_with(ResponseTemplate::new(200).set_body_string("console.log(1)"))
        .mount(&assets)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing.css"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&assets)
        .await;

    let app_js = format!("{}/app.js", assets.uri());
    let mut config = config_for(&google, &libre);
    config.cache.static_assets = vec![app_js.clone(), format!("{}/missing.css", assets.uri())];

    let dragoman = Dragoman::builder().config(config).build().await.unwrap();

    let cached = dragoman
        .cache()
        .get(CacheRegion::Static, &app_js)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cached.text(), "console.log(1)");
    assert_eq!(
        dragoman.cache().entry_count(CacheRegion::Static).await.unwrap(),
        1
    );
}

#[tokio::test]
async fn shared_store_keeps_preferences() {
    let google = MockServer::start().await;
    let libre = MockServer::start().await;
    let store = Arc::new(MemoryStore::new());

    let first = Dragoman::builder()
        .config(config_for(&google, &libre))
        .store(store.clone())
        .build()
        .await
        .unwrap();
    assert_eq!(first.preferences().theme().await.unwrap(), None);
    first.preferences().set_theme(Theme::Dark).await.unwrap();
    drop(first);

    let second = Dragoman::builder()
        .config(config_for(&google, &libre))
        .store(store)
        .build()
        .await
        .unwrap();
    assert_eq!(second.preferences().theme().await.unwrap(), Some(Theme::Dark));
}

#[tokio::test]
async fn session_uses_configured_languages() {
    let google = MockServer::start().await;
    let libre = MockServer::start().await;
    let mut config = config_for(&google, &libre);
    config.translation.target = LanguageCode::english();

    let dragoman = Dragoman::builder().config(config).build().await.unwrap();
    let session = dragoman.session();

    assert_eq!(session.source(), &LanguageCode::arabic());
    assert_eq!(session.target(), &LanguageCode::english());
}
