//! Translation history entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{LanguageCode, TranslationResult};

/// Default cap on stored history entries.
pub const DEFAULT_MAX_HISTORY_ITEMS: usize = 100;

/// One recorded translation.
///
/// Serialized with camelCase keys, matching the stored history format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Epoch milliseconds at creation, bumped to stay strictly increasing.
    pub id: i64,
    pub source_lang: LanguageCode,
    pub target_lang: LanguageCode,
    pub source_text: String,
    pub target_text: String,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    /// Build an entry for a translation result with the given id.
    pub fn from_result(id: i64, result: &TranslationResult) -> Self {
        Self {
            id,
            source_lang: result.source_lang.clone(),
            target_lang: result.target_lang.clone(),
            source_text: result.source_text.clone(),
            target_text: result.text.clone(),
            timestamp: result.timestamp,
        }
    }
}
