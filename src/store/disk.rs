//! Disk-backed store on `redb`.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use redb::{Database, ReadableTable, TableDefinition};

use super::PersistentStore;
use crate::{DragomanError, Result};

const TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("dragoman");

/// [`PersistentStore`] persisted in a single redb database file.
///
/// Every operation runs in its own redb transaction on the blocking pool,
/// which gives atomic single-key writes and consistent prefix sweeps.
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open (creating if absent) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                DragomanError::Store(format!("failed to create {}: {e}", parent.display()))
            })?;
        }
        let db = Database::create(path).map_err(store_err)?;

        // Create the table up front so readers never see it missing.
        let txn = db.begin_write().map_err(store_err)?;
        txn.open_table(TABLE).map_err(store_err)?;
        txn.commit().map_err(store_err)?;

        Ok(Self { db: Arc::new(db) })
    }

    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Database) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| DragomanError::Store(format!("store task failed: {e}")))?
    }
}

fn store_err(e: impl Into<redb::Error>) -> DragomanError {
    DragomanError::from(e.into())
}

#[async_trait]
impl PersistentStore for RedbStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let key = key.to_owned();
        self.blocking(move |db| {
            let txn = db.begin_read().map_err(store_err)?;
            let table = txn.open_table(TABLE).map_err(store_err)?;
            let value = table.get(key.as_str()).map_err(store_err)?;
            Ok(value.map(|v| v.value().to_vec()))
        })
        .await
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let key = key.to_owned();
        self.blocking(move |db| {
            let txn = db.begin_write().map_err(store_err)?;
            {
                let mut table = txn.open_table(TABLE).map_err(store_err)?;
                table
                    .insert(key.as_str(), value.as_slice())
                    .map_err(store_err)?;
            }
            txn.commit().map_err(store_err)
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let key = key.to_owned();
        self.blocking(move |db| {
            let txn = db.begin_write().map_err(store_err)?;
            let existed = {
                let mut table = txn.open_table(TABLE).map_err(store_err)?;
                let removed = table.remove(key.as_str()).map_err(store_err)?;
                removed.is_some()
            };
            txn.commit().map_err(store_err)?;
            Ok(existed)
        })
        .await
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let prefix = prefix.to_owned();
        self.blocking(move |db| {
            let txn = db.begin_read().map_err(store_err)?;
            let table = txn.open_table(TABLE).map_err(store_err)?;
            collect_prefixed(&table, &prefix)
        })
        .await
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<usize> {
        let prefix = prefix.to_owned();
        self.blocking(move |db| {
            let txn = db.begin_write().map_err(store_err)?;
            let removed = {
                let mut table = txn.open_table(TABLE).map_err(store_err)?;
                let keys = collect_prefixed(&table, &prefix)?;
                for key in &keys {
                    table.remove(key.as_str()).map_err(store_err)?;
                }
                keys.len()
            };
            txn.commit().map_err(store_err)?;
            Ok(removed)
        })
        .await
    }
}

fn collect_prefixed(
    table: &impl ReadableTable<&'static str, &'static [u8]>,
    prefix: &str,
) -> Result<Vec<String>> {
    let mut keys = Vec::new();
    for item in table.range(prefix..).map_err(store_err)? {
        let (key, _) = item.map_err(store_err)?;
        let key = key.value();
        if !key.starts_with(prefix) {
            break;
        }
        keys.push(key.to_owned());
    }
    Ok(keys)
}
