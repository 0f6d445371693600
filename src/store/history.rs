//! Translation history log.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::PersistentStore;
use crate::types::{HistoryEntry, TranslationResult};
use crate::Result;

/// Store key holding the JSON-encoded history list.
pub const HISTORY_KEY: &str = "translationHistory";

/// Newest-first, capped list of past translations.
///
/// The whole list lives under [`HISTORY_KEY`] as one JSON document, so
/// every mutation is a read-modify-write; mutations are serialized through
/// an internal lock. A document that fails to parse is treated as an empty
/// history (and logged) rather than as an error.
pub struct HistoryLog {
    store: Arc<dyn PersistentStore>,
    max_items: usize,
    write_lock: Mutex<()>,
    last_id: AtomicI64,
}

impl HistoryLog {
    pub fn new(store: Arc<dyn PersistentStore>, max_items: usize) -> Self {
        Self {
            store,
            max_items,
            write_lock: Mutex::new(()),
            last_id: AtomicI64::new(0),
        }
    }

    /// Maximum number of retained entries.
    pub fn max_items(&self) -> usize {
        self.max_items
    }

    /// All entries, newest first.
    pub async fn entries(&self) -> Result<Vec<HistoryEntry>> {
        let Some(bytes) = self.store.get(HISTORY_KEY).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_slice(&bytes) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!(error = %e, "history is unreadable, starting empty");
                Ok(Vec::new())
            }
        }
    }

    /// Look up one entry.
    pub async fn find(&self, id: i64) -> Result<Option<HistoryEntry>> {
        Ok(self.entries().await?.into_iter().find(|e| e.id == id))
    }

    /// Record a successful translation, returning the stored entry.
    pub async fn record(&self, result: &TranslationResult) -> Result<HistoryEntry> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.entries().await?;
        let floor = entries.first().map_or(0, |newest| newest.id);
        let entry = HistoryEntry::from_result(self.next_id(floor), result);
        entries.insert(0, entry.clone());
        self.save(entries).await?;
        Ok(entry)
    }

    /// Remove one entry. Returns whether it existed.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.entries().await?;
        let before = entries.len();
        entries.retain(|e| e.id != id);
        if entries.len() == before {
            return Ok(false);
        }
        self.save(entries).await?;
        Ok(true)
    }

    /// Remove every entry. Returns how many were removed.
    pub async fn clear(&self) -> Result<usize> {
        let _guard = self.write_lock.lock().await;
        let count = self.entries().await?.len();
        self.store.delete(HISTORY_KEY).await?;
        Ok(count)
    }

    async fn save(&self, mut entries: Vec<HistoryEntry>) -> Result<()> {
        if entries.len() > self.max_items {
            debug!(evicted = entries.len() - self.max_items, "history cap reached");
            entries.truncate(self.max_items);
        }
        let bytes = serde_json::to_vec(&entries)?;
        self.store.put(HISTORY_KEY, bytes).await
    }

    /// Epoch milliseconds, strictly greater than any id handed out before
    /// and than `floor`.
    fn next_id(&self, floor: i64) -> i64 {
        let now = Utc::now().timestamp_millis();
        let mut issued = now;
        // fetch_update only fails when the closure returns None.
        let _ = self
            .last_id
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                issued = now.max(last + 1).max(floor + 1);
                Some(issued)
            });
        issued
    }
}
