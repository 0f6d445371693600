//! Trailing-edge debounce, as a pure state machine.
//!
//! The [`Debouncer`] owns no timer. Each input yields a [`DebounceAction`]
//! telling the caller which deadline to arm; when that deadline elapses
//! the caller reports the generation back through
//! [`Debouncer::on_timer`]. Only the latest generation fires, so a
//! deadline armed by an earlier edit is a no-op even if the caller failed
//! to cancel it.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Delay after an edit to a text of ordinary length.
pub const DEFAULT_SHORT_DELAY: Duration = Duration::from_millis(1500);

/// Delay after an edit to a long text.
pub const DEFAULT_LONG_DELAY: Duration = Duration::from_millis(3000);

/// Texts longer than this many characters use the long delay.
pub const DEFAULT_LONG_TEXT_THRESHOLD: usize = 5000;

/// Debounce timings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebounceConfig {
    pub short_delay_ms: u64,
    pub long_delay_ms: u64,
    pub long_text_threshold: usize,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            short_delay_ms: DEFAULT_SHORT_DELAY.as_millis() as u64,
            long_delay_ms: DEFAULT_LONG_DELAY.as_millis() as u64,
            long_text_threshold: DEFAULT_LONG_TEXT_THRESHOLD,
        }
    }
}

impl DebounceConfig {
    /// Quiet period required after an edit producing `text`.
    pub fn delay_for(&self, text: &str) -> Duration {
        if text.chars().count() > self.long_text_threshold {
            Duration::from_millis(self.long_delay_ms)
        } else {
            Duration::from_millis(self.short_delay_ms)
        }
    }
}

/// What the caller should do after an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceAction {
    /// Cancel any armed deadline and arm a new one.
    Schedule { generation: u64, delay: Duration },
    /// The text is blank: cancel any armed deadline and clear the output.
    Clear,
}

/// Trailing-edge debouncer over text edits.
#[derive(Debug, Default)]
pub struct Debouncer {
    config: DebounceConfig,
    generation: u64,
    pending: Option<(u64, String)>,
}

impl Debouncer {
    pub fn new(config: DebounceConfig) -> Self {
        Self {
            config,
            generation: 0,
            pending: None,
        }
    }

    pub fn config(&self) -> &DebounceConfig {
        &self.config
    }

    /// React to an edit.
    pub fn on_input(&mut self, text: &str) -> DebounceAction {
        self.generation += 1;
        if text.trim().is_empty() {
            self.pending = None;
            return DebounceAction::Clear;
        }
        self.pending = Some((self.generation, text.to_owned()));
        DebounceAction::Schedule {
            generation: self.generation,
            delay: self.config.delay_for(text),
        }
    }

    /// A deadline armed for `generation` elapsed.
    ///
    /// Returns the text to dispatch if no edit happened since.
    pub fn on_timer(&mut self, generation: u64) -> Option<String> {
        match &self.pending {
            Some((pending, _)) if *pending == generation => {
                self.pending.take().map(|(_, text)| text)
            }
            _ => None,
        }
    }

    /// Drop the pending edit, if any.
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
