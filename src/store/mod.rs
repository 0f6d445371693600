//! Persistent key/value storage.
//!
//! [`PersistentStore`] is the single storage seam of the crate: the history
//! log, preferences and both cache regions sit on top of it. Implementations
//! must make each single-key operation atomic; no multi-key transactions are
//! assumed, and concurrent writers to the same key are last-writer-wins.
//!
//! Two implementations ship:
//!
//! - [`MemoryStore`]: process-local, for tests and ephemeral sessions.
//! - [`RedbStore`]: disk-backed, using the `redb` embedded database.

mod disk;
mod history;
mod memory;
mod preferences;

pub use disk::RedbStore;
pub use history::{HISTORY_KEY, HistoryLog};
pub use memory::MemoryStore;
pub use preferences::{Preferences, THEME_KEY};

use async_trait::async_trait;

use crate::Result;

/// Key/value byte storage with atomic single-key operations and a
/// prefix sweep.
#[async_trait]
pub trait PersistentStore: Send + Sync {
    /// Read a value. `Ok(None)` when the key is absent.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write a value, replacing any previous one.
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Remove a key. Returns whether it existed.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// All keys starting with `prefix`, in ascending order.
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;

    /// Remove every key starting with `prefix`. Returns how many were removed.
    async fn delete_prefix(&self, prefix: &str) -> Result<usize>;
}
