//! Tests for request dispatch: validation, supersession and recording.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use dragoman::http::Connectivity;
use dragoman::providers::{ProviderRegistry, TranslationProvider};
use dragoman::store::{HistoryLog, MemoryStore, PersistentStore};
use dragoman::{
    DispatchState, Dispatcher, DragomanError, ErrorKind, LanguageCode, Result,
};

// ============================================================================
// Mock providers and stores
// ============================================================================

/// Uppercases its input; texts starting with "slow" take 100ms.
#[derive(Default)]
struct UpperProvider {
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl UpperProvider {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationProvider for UpperProvider {
    fn name(&self) -> &str {
        "upper"
    }

    async fn translate(
        &self,
        text: &str,
        _source: &LanguageCode,
        _target: &LanguageCode,
    ) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(text.to_string());
        if text.starts_with("slow") {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        Ok(text.to_uppercase())
    }
}

struct StatusProvider(u16);

#[async_trait]
impl TranslationProvider for StatusProvider {
    fn name(&self) -> &str {
        "status"
    }

    async fn translate(
        &self,
        _text: &str,
        _source: &LanguageCode,
        _target: &LanguageCode,
    ) -> Result<String> {
        Err(match self.0 {
            429 => DragomanError::RateLimited { retry_after: None },
            status => DragomanError::Api {
                status,
                message: "failed".into(),
            },
        })
    }
}

/// A store whose writes always fail.
struct ReadOnlyStore;

#[async_trait]
impl PersistentStore for ReadOnlyStore {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }

    async fn put(&self, _key: &str, _value: Vec<u8>) -> Result<()> {
        Err(DragomanError::Store("read-only".into()))
    }

    async fn delete(&self, _key: &str) -> Result<bool> {
        Err(DragomanError::Store("read-only".into()))
    }

    async fn keys_with_prefix(&self, _prefix: &str) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    async fn delete_prefix(&self, _prefix: &str) -> Result<usize> {
        Err(DragomanError::Store("read-only".into()))
    }
}

struct Fixture {
    dispatcher: Arc<Dispatcher>,
    provider: Arc<UpperProvider>,
    history: Arc<HistoryLog>,
    connectivity: Connectivity,
}

fn fixture() -> Fixture {
    let provider = Arc::new(UpperProvider::default());
    let registry = ProviderRegistry::new().with(provider.clone());
    let history = Arc::new(HistoryLog::new(Arc::new(MemoryStore::new()), 100));
    let connectivity = Connectivity::online();
    let dispatcher = Arc::new(
        Dispatcher::new(Arc::new(registry), history.clone(), connectivity.clone())
            .max_text_length(20),
    );
    Fixture {
        dispatcher,
        provider,
        history,
        connectivity,
    }
}

fn ar() -> LanguageCode {
    LanguageCode::arabic()
}

fn am() -> LanguageCode {
    LanguageCode::amharic()
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn blank_text_fails_without_network() {
    let f = fixture();

    for text in ["", "   ", "\n\t "] {
        let err = f.dispatcher.dispatch(text, &ar(), &am()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::EmptyText);
    }
    assert_eq!(f.provider.calls(), 0);
    assert_eq!(f.dispatcher.latest_request_id(), 0, "no id consumed");
}

#[tokio::test]
async fn oversized_text_fails_without_network() {
    let f = fixture();

    let err = f
        .dispatcher
        .dispatch(&"a".repeat(21), &ar(), &am())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::TextTooLong);
    assert!(matches!(
        err.source,
        DragomanError::TextTooLong { len: 21, max: 20 }
    ));
    assert_eq!(f.provider.calls(), 0);

    // Exactly at the limit is fine, and surrounding whitespace does not count
    f.dispatcher
        .dispatch(&format!("  {}  ", "a".repeat(20)), &ar(), &am())
        .await
        .unwrap();
    assert_eq!(f.provider.calls(), 1);
}

#[tokio::test]
async fn offline_fails_fast() {
    let f = fixture();
    f.connectivity.set_online(false);

    let err = f.dispatcher.dispatch("hello", &ar(), &am()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Offline);
    assert_eq!(
        err.user_message(),
        "Please check your internet connection and try again."
    );
    assert_eq!(f.provider.calls(), 0);
    assert_eq!(f.dispatcher.state(), DispatchState::Idle);
}

// ============================================================================
// Success path
// ============================================================================

#[tokio::test]
async fn success_returns_result_and_records_history() {
    let f = fixture();

    let result = f.dispatcher.dispatch("  hello ", &ar(), &am()).await.unwrap();

    assert_eq!(result.text, "HELLO");
    assert_eq!(result.provider_used, "upper");
    assert_eq!(result.source_text, "hello", "dispatched text is trimmed");
    assert_eq!(result.request_id, 1);
    assert_eq!(f.provider.seen.lock().unwrap().as_slice(), ["hello"]);

    let entries = f.history.entries().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].source_text, "hello");
    assert_eq!(entries[0].target_text, "HELLO");
    assert_eq!(entries[0].source_lang, ar());
    assert_eq!(entries[0].target_lang, am());
    assert_eq!(f.dispatcher.state(), DispatchState::Idle);
}

#[tokio::test]
async fn request_ids_increase() {
    let f = fixture();
    let a = f.dispatcher.dispatch("a", &ar(), &am()).await.unwrap();
    let b = f.dispatcher.dispatch("b", &ar(), &am()).await.unwrap();
    assert!(b.request_id > a.request_id);
    assert_eq!(f.dispatcher.latest_request_id(), b.request_id);
}

#[tokio::test]
async fn history_failure_does_not_fail_translation() {
    let provider = Arc::new(UpperProvider::default());
    let registry = ProviderRegistry::new().with(provider);
    let history = Arc::new(HistoryLog::new(Arc::new(ReadOnlyStore), 100));
    let dispatcher = Dispatcher::new(Arc::new(registry), history, Connectivity::online());

    let result = dispatcher.dispatch("hi", &ar(), &am()).await.unwrap();
    assert_eq!(result.text, "HI");
}

// ============================================================================
// Supersession
// ============================================================================

#[tokio::test(start_paused = true)]
async fn late_result_of_older_request_is_dropped() {
    let f = fixture();
    let (ar, am) = (ar(), am());

    let (older, newer) = tokio::join!(
        f.dispatcher.dispatch("slow one", &ar, &am),
        f.dispatcher.dispatch("fast two", &ar, &am),
    );

    let newer = newer.unwrap();
    assert_eq!(newer.text, "FAST TWO");
    assert_eq!(newer.request_id, 2);

    let err = older.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Superseded);
    assert!(matches!(
        err.source,
        DragomanError::Superseded { request_id: 1 }
    ));

    let entries = f.history.entries().await.unwrap();
    assert_eq!(entries.len(), 1, "superseded result never recorded");
    assert_eq!(entries[0].source_text, "fast two");
    assert_eq!(f.dispatcher.state(), DispatchState::Idle);
}

#[tokio::test(start_paused = true)]
async fn invalidate_supersedes_in_flight_request() {
    let f = fixture();

    let dispatcher = f.dispatcher.clone();
    let pending =
        tokio::spawn(async move { dispatcher.dispatch("slow", &ar(), &am()).await });
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(f.dispatcher.state().is_translating());
    f.dispatcher.invalidate();
    assert_eq!(f.dispatcher.state(), DispatchState::Idle);

    let err = pending.await.unwrap().unwrap_err();
    assert_eq!(err.kind, ErrorKind::Superseded);
    assert!(f.history.entries().await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn state_reports_translating_while_in_flight() {
    let f = fixture();
    let mut states = f.dispatcher.subscribe();

    let dispatcher = f.dispatcher.clone();
    let pending =
        tokio::spawn(async move { dispatcher.dispatch("slow text", &ar(), &am()).await });

    states.changed().await.unwrap();
    assert_eq!(
        *states.borrow_and_update(),
        DispatchState::Translating {
            request_id: 1,
            chars: 9
        }
    );

    pending.await.unwrap().unwrap();
    states.changed().await.unwrap();
    assert_eq!(*states.borrow(), DispatchState::Idle);
}

// ============================================================================
// Failure classification
// ============================================================================

#[tokio::test]
async fn exhausted_chain_maps_to_user_facing_kind() {
    let registry = ProviderRegistry::new()
        .with(Arc::new(StatusProvider(500)))
        .with(Arc::new(StatusProvider(502)));
    let history = Arc::new(HistoryLog::new(Arc::new(MemoryStore::new()), 100));
    let dispatcher = Dispatcher::new(Arc::new(registry), history.clone(), Connectivity::online());

    let err = dispatcher.dispatch("hi", &ar(), &am()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::AllProvidersExhausted);
    assert!(history.entries().await.unwrap().is_empty());
}

#[tokio::test]
async fn exhausted_by_rate_limit_maps_to_rate_limited() {
    let registry = ProviderRegistry::new()
        .with(Arc::new(StatusProvider(500)))
        .with(Arc::new(StatusProvider(429)));
    let history = Arc::new(HistoryLog::new(Arc::new(MemoryStore::new()), 100));
    let dispatcher = Dispatcher::new(Arc::new(registry), history, Connectivity::online());

    let err = dispatcher.dispatch("hi", &ar(), &am()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::RateLimited);
}
