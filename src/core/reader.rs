//! Reading the room, pruning index entries whose records have expired.

use crate::config::ChatConfig;
use crate::core::keys::Keyspace;
use crate::core::message::Message;
use crate::core::store::last_index;
use crate::error::Result;
use crate::storage::KeyValueStore;
use std::sync::Arc;

/// Reads the visible message window.
#[derive(Clone)]
pub struct MessageReader {
    store: Arc<dyn KeyValueStore>,
    keys: Keyspace,
    window_size: usize,
}

impl MessageReader {
    /// Create a reader over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, keys: Keyspace, config: &ChatConfig) -> Self {
        Self {
            store,
            keys,
            // A zero window would read the whole index.
            window_size: config.window_size.max(1),
        }
    }

    /// Return the live messages in the window, newest first.
    ///
    /// Index entries whose record is gone are removed from the index before
    /// returning, so the index converges on live keys without a sweeper.
    ///
    /// # Errors
    ///
    /// Returns `Error::StoreUnavailable` if the store cannot be read or the
    /// stale entries cannot be pruned. Expired entries are never an error.
    pub fn list_recent(&self) -> Result<Vec<Message>> {
        let index_key = self.keys.room_index();
        let record_keys = self
            .store
            .list_range(&index_key, 0, last_index(self.window_size))?;

        if record_keys.is_empty() {
            return Ok(Vec::new());
        }

        let records = self.store.multi_get(&record_keys)?;

        let mut live = Vec::with_capacity(record_keys.len());
        let mut stale = Vec::new();
        for (key, record) in record_keys.iter().zip(records) {
            match record.map(|r| serde_json::from_str::<Message>(&r)) {
                Some(Ok(message)) => live.push(message),
                Some(Err(e)) => {
                    tracing::warn!(%key, error = %e, "pruning undecodable message record");
                    stale.push(key);
                }
                None => stale.push(key),
            }
        }

        for key in &stale {
            self.store.list_remove(&index_key, 0, key)?;
        }
        if !stale.is_empty() {
            tracing::info!(pruned = stale.len(), "reconciled expired index entries");
        }

        Ok(live)
    }

    /// The index exactly as stored, without resolving or pruning anything.
    ///
    /// # Errors
    ///
    /// Returns `Error::StoreUnavailable` if the store cannot be read.
    pub fn raw_index(&self) -> Result<Vec<String>> {
        self.store.list_range(&self.keys.room_index(), 0, -1)
    }
}
