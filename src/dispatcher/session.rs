//! Interactive translation session.
//!
//! A [`Session`] is the explicit context for one editing surface: the two
//! language selections, the source text, the last translation and the
//! debounce state. It consumes a stream of [`InputEvent`]s and reports
//! [`SessionOutput`]s to the rendering side.

use std::sync::Arc;

use futures_util::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, warn};

use super::debounce::{DebounceAction, DebounceConfig, Debouncer};
use super::Dispatcher;
use crate::error::{ErrorKind, TranslationError};
use crate::types::{DispatchState, HistoryEntry, LanguageCode, LanguageSlot, TranslationResult};

/// Something the user did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// The source text was edited.
    TextChanged { text: String },
    /// A language selector changed.
    LanguageChanged { slot: LanguageSlot, lang: LanguageCode },
    /// Swap source and target; the last translation becomes the source text.
    SwapLanguages,
    /// Translate the current text without waiting for the debounce.
    TranslateNow,
    /// Clear the source text and the translation.
    Clear,
    /// Restore a history entry into the session.
    LoadFromHistory { id: i64 },
}

/// Something the rendering side should show.
#[derive(Debug)]
pub enum SessionOutput {
    Translated(TranslationResult),
    Failed(TranslationError),
    Cleared,
    Restored(HistoryEntry),
    State(DispatchState),
}

/// Mutable session context.
pub struct Session {
    dispatcher: Arc<Dispatcher>,
    debouncer: Debouncer,
    source: LanguageCode,
    target: LanguageCode,
    source_text: String,
    translation: Option<String>,
}

type InFlight = JoinSet<Result<TranslationResult, TranslationError>>;

impl Session {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        source: LanguageCode,
        target: LanguageCode,
        debounce: DebounceConfig,
    ) -> Self {
        Self {
            dispatcher,
            debouncer: Debouncer::new(debounce),
            source,
            target,
            source_text: String::new(),
            translation: None,
        }
    }

    pub fn source(&self) -> &LanguageCode {
        &self.source
    }

    pub fn target(&self) -> &LanguageCode {
        &self.target
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    /// The translation currently shown, if any.
    pub fn translation(&self) -> Option<&str> {
        self.translation.as_deref()
    }

    /// Drive the session until `events` ends and nothing is pending, or
    /// until `out` is closed.
    ///
    /// A debounce deadline armed before the stream ended still fires, and
    /// in-flight translations are awaited.
    pub async fn run<S>(mut self, events: S, out: mpsc::Sender<SessionOutput>) -> Self
    where
        S: Stream<Item = InputEvent>,
    {
        let mut events = std::pin::pin!(events);
        let mut state_rx = self.dispatcher.subscribe();
        let mut in_flight = InFlight::new();
        let mut deadline: Option<(u64, Instant)> = None;
        let mut events_done = false;

        loop {
            if events_done && deadline.is_none() && in_flight.is_empty() {
                break;
            }
            let wake_at = deadline.map_or_else(Instant::now, |(_, at)| at);

            let output = tokio::select! {
                event = events.next(), if !events_done => match event {
                    Some(event) => self.on_event(event, &mut deadline, &mut in_flight).await,
                    None => {
                        events_done = true;
                        None
                    }
                },
                () = sleep_until(wake_at), if deadline.is_some() => {
                    let generation = deadline.take().map(|(generation, _)| generation);
                    if let Some(text) = generation.and_then(|g| self.debouncer.on_timer(g)) {
                        debug!(chars = text.chars().count(), "debounce elapsed");
                        self.spawn(text, &mut in_flight);
                    }
                    None
                },
                Some(joined) = in_flight.join_next() => match joined {
                    Ok(outcome) => self.on_outcome(outcome),
                    Err(e) => {
                        warn!(error = %e, "translation task failed");
                        None
                    }
                },
                Ok(()) = state_rx.changed() => Some(SessionOutput::State(*state_rx.borrow_and_update())),
                else => break,
            };

            if let Some(output) = output {
                if out.send(output).await.is_err() {
                    debug!("session output closed");
                    break;
                }
            }
        }
        self
    }

    async fn on_event(
        &mut self,
        event: InputEvent,
        deadline: &mut Option<(u64, Instant)>,
        in_flight: &mut InFlight,
    ) -> Option<SessionOutput> {
        match event {
            InputEvent::TextChanged { text } => {
                let action = self.debouncer.on_input(&text);
                self.source_text = text;
                match action {
                    DebounceAction::Schedule { generation, delay } => {
                        *deadline = Some((generation, Instant::now() + delay));
                        None
                    }
                    DebounceAction::Clear => {
                        *deadline = None;
                        Some(self.clear())
                    }
                }
            }
            InputEvent::LanguageChanged { slot, lang } => {
                match slot {
                    LanguageSlot::Source => self.source = lang,
                    LanguageSlot::Target => self.target = lang,
                }
                self.translate_now(deadline, in_flight);
                None
            }
            InputEvent::SwapLanguages => {
                std::mem::swap(&mut self.source, &mut self.target);
                self.source_text = self.translation.take().unwrap_or_default();
                if self.source_text.trim().is_empty() {
                    *deadline = None;
                    self.debouncer.cancel();
                    return Some(self.clear());
                }
                self.translate_now(deadline, in_flight);
                None
            }
            InputEvent::TranslateNow => {
                self.translate_now(deadline, in_flight);
                None
            }
            InputEvent::Clear => {
                *deadline = None;
                self.debouncer.cancel();
                self.source_text.clear();
                Some(self.clear())
            }
            InputEvent::LoadFromHistory { id } => match self.dispatcher.history().find(id).await {
                Ok(Some(entry)) => {
                    *deadline = None;
                    self.debouncer.cancel();
                    self.dispatcher.invalidate();
                    self.source = entry.source_lang.clone();
                    self.target = entry.target_lang.clone();
                    self.source_text = entry.source_text.clone();
                    self.translation = Some(entry.target_text.clone());
                    Some(SessionOutput::Restored(entry))
                }
                Ok(None) => {
                    debug!(id, "history entry not found");
                    None
                }
                Err(e) => {
                    warn!(id, error = %e, "failed to read history");
                    None
                }
            },
        }
    }

    fn on_outcome(
        &mut self,
        outcome: Result<TranslationResult, TranslationError>,
    ) -> Option<SessionOutput> {
        match outcome {
            Ok(result) => {
                self.translation = Some(result.text.clone());
                Some(SessionOutput::Translated(result))
            }
            Err(e) if e.kind == ErrorKind::Superseded => None,
            Err(e) => Some(SessionOutput::Failed(e)),
        }
    }

    /// Cancel the pending deadline and dispatch the current text, if any.
    fn translate_now(&mut self, deadline: &mut Option<(u64, Instant)>, in_flight: &mut InFlight) {
        *deadline = None;
        self.debouncer.cancel();
        if self.source_text.trim().is_empty() {
            return;
        }
        self.spawn(self.source_text.clone(), in_flight);
    }

    fn spawn(&self, text: String, in_flight: &mut InFlight) {
        let dispatcher = Arc::clone(&self.dispatcher);
        let source = self.source.clone();
        let target = self.target.clone();
        in_flight.spawn(async move { dispatcher.dispatch(&text, &source, &target).await });
    }

    fn clear(&mut self) -> SessionOutput {
        self.translation = None;
        if self.source_text.trim().is_empty() {
            self.source_text.clear();
        }
        self.dispatcher.invalidate();
        SessionOutput::Cleared
    }
}
