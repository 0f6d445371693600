//! Request dispatch: validation, supersession and result recording.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use crate::error::TranslationError;
use crate::http::Connectivity;
use crate::providers::ProviderRegistry;
use crate::store::HistoryLog;
use crate::telemetry;
use crate::types::{
    DEFAULT_MAX_TEXT_LENGTH, DispatchState, LanguageCode, TranslationRequest, TranslationResult,
};
use crate::DragomanError;

/// Turns validated text into at most one recorded translation per request.
///
/// Every dispatch that passes validation gets a fresh, strictly increasing
/// request id. When a provider answers, the answer is kept only if its id
/// is still the latest one issued; otherwise it is dropped with
/// [`ErrorKind::Superseded`](crate::ErrorKind::Superseded) and never
/// recorded. Loading state is published on a watch channel.
pub struct Dispatcher {
    registry: Arc<ProviderRegistry>,
    history: Arc<HistoryLog>,
    connectivity: Connectivity,
    max_text_length: usize,
    latest: AtomicU64,
    state: watch::Sender<DispatchState>,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        history: Arc<HistoryLog>,
        connectivity: Connectivity,
    ) -> Self {
        Self {
            registry,
            history,
            connectivity,
            max_text_length: DEFAULT_MAX_TEXT_LENGTH,
            latest: AtomicU64::new(0),
            state: watch::channel(DispatchState::Idle).0,
        }
    }

    /// Override the maximum accepted text length (characters).
    pub fn max_text_length(mut self, max: usize) -> Self {
        self.max_text_length = max;
        self
    }

    pub fn history(&self) -> &Arc<HistoryLog> {
        &self.history
    }

    /// Current loading state.
    pub fn state(&self) -> DispatchState {
        *self.state.borrow()
    }

    /// Watch loading-state transitions.
    pub fn subscribe(&self) -> watch::Receiver<DispatchState> {
        self.state.subscribe()
    }

    /// Id of the most recently issued request (0 before the first).
    pub fn latest_request_id(&self) -> u64 {
        self.latest.load(Ordering::Acquire)
    }

    /// Supersede whatever is in flight and go idle.
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::AcqRel);
        self.state.send_replace(DispatchState::Idle);
    }

    /// Validate and dispatch raw text.
    pub async fn dispatch(
        &self,
        text: &str,
        source: &LanguageCode,
        target: &LanguageCode,
    ) -> Result<TranslationResult, TranslationError> {
        let request =
            TranslationRequest::new(text, source.clone(), target.clone(), self.max_text_length)?;
        self.dispatch_request(request).await
    }

    /// Dispatch an already validated request.
    #[instrument(skip(self, request), fields(chars = request.char_count(), source = %request.source(), target = %request.target()))]
    pub async fn dispatch_request(
        &self,
        request: TranslationRequest,
    ) -> Result<TranslationResult, TranslationError> {
        let request_id = self.latest.fetch_add(1, Ordering::AcqRel) + 1;

        if !self.connectivity.is_online() {
            debug!(request_id, "offline, not dispatching");
            self.finish(request_id);
            return Err(DragomanError::Offline.into());
        }

        self.state.send_replace(DispatchState::Translating {
            request_id,
            chars: request.char_count(),
        });

        let outcome = self
            .registry
            .translate(request.text(), request.source(), request.target())
            .await;

        if self.latest_request_id() != request_id {
            debug!(request_id, "dropping superseded result");
            metrics::counter!(telemetry::SUPERSEDED_TOTAL).increment(1);
            return Err(DragomanError::Superseded { request_id }.into());
        }
        self.finish(request_id);

        let translation = outcome?;
        let result = TranslationResult {
            request_id,
            text: translation.text,
            provider_used: translation.provider,
            timestamp: Utc::now(),
            source_text: request.text().to_owned(),
            source_lang: request.source().clone(),
            target_lang: request.target().clone(),
        };

        if let Err(e) = self.history.record(&result).await {
            warn!(request_id, error = %e, "failed to record history");
        }
        Ok(result)
    }

    /// Go idle if `request_id` is still the latest.
    fn finish(&self, request_id: u64) {
        self.state.send_if_modified(|state| {
            if self.latest.load(Ordering::Acquire) == request_id && state.is_translating() {
                *state = DispatchState::Idle;
                true
            } else {
                false
            }
        });
    }
}
