//! Translation request and result types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::LanguageCode;
use crate::{DragomanError, Result};

/// Default upper bound on the length of a translation input, in characters.
pub const DEFAULT_MAX_TEXT_LENGTH: usize = 50_000;

/// A validated translation request.
///
/// Construction trims the input and rejects blank or oversized text, so a
/// value of this type is always safe to dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    text: String,
    source: LanguageCode,
    target: LanguageCode,
}

impl TranslationRequest {
    /// Build a request, enforcing `1 <= chars(trim(text)) <= max_len`.
    pub fn new(
        text: &str,
        source: LanguageCode,
        target: LanguageCode,
        max_len: usize,
    ) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DragomanError::EmptyText);
        }
        let len = text.chars().count();
        if len > max_len {
            return Err(DragomanError::TextTooLong { len, max: max_len });
        }
        Ok(Self {
            text: text.to_owned(),
            source,
            target,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn source(&self) -> &LanguageCode {
        &self.source
    }

    pub fn target(&self) -> &LanguageCode {
        &self.target
    }

    /// Length of the text in characters.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// A successful translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResult {
    /// Id assigned by the dispatcher; strictly increasing per dispatcher.
    pub request_id: u64,
    /// Translated text, trimmed.
    pub text: String,
    /// Name of the provider that produced the translation.
    pub provider_used: String,
    pub timestamp: DateTime<Utc>,
    pub source_text: String,
    pub source_lang: LanguageCode,
    pub target_lang: LanguageCode,
}

/// Loading/idle state published by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchState {
    #[default]
    Idle,
    Translating {
        request_id: u64,
        /// Character count of the text in flight.
        chars: usize,
    },
}

impl DispatchState {
    pub fn is_translating(&self) -> bool {
        matches!(self, DispatchState::Translating { .. })
    }
}
