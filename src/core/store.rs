//! Message persistence: one expiring record per message plus a bounded index.

use crate::config::ChatConfig;
use crate::core::keys::Keyspace;
use crate::core::message::Message;
use crate::error::Result;
use crate::storage::KeyValueStore;
use std::sync::Arc;
use std::time::Duration;

/// Writes messages into the room.
#[derive(Clone)]
pub struct MessageStore {
    store: Arc<dyn KeyValueStore>,
    keys: Keyspace,
    window_size: usize,
    ttl: Duration,
}

impl MessageStore {
    /// Create a message store over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, keys: Keyspace, config: &ChatConfig) -> Self {
        Self {
            store,
            keys,
            // A zero window would turn the trim into a no-op.
            window_size: config.window_size.max(1),
            ttl: config.message_ttl(),
        }
    }

    /// Persist a message from `sender` and make it the newest in the room.
    ///
    /// The record is written before its key is indexed, so a failure part
    /// way through can orphan a record but never index a missing one.
    /// Records trimmed out of the index are left to expire on their own.
    ///
    /// # Errors
    ///
    /// Returns `Error::StoreUnavailable` if any store write fails.
    pub fn post(&self, sender: &str, body: &str) -> Result<Message> {
        let message = Message::new(sender, body);
        let record_key = self.keys.new_message_key();
        let record = serde_json::to_string(&message)?;

        self.store.set_with_expiry(&record_key, &record, self.ttl)?;

        let index_key = self.keys.room_index();
        let len = self.store.list_push_front(&index_key, &record_key)?;
        self.store.list_trim(&index_key, 0, last_index(self.window_size))?;

        tracing::debug!(
            %sender,
            key = %record_key,
            index_len = len.min(self.window_size),
            "posted message"
        );
        Ok(message)
    }
}

/// Inclusive stop index covering a window of `window_size` entries.
pub(crate) fn last_index(window_size: usize) -> isize {
    isize::try_from(window_size)
        .unwrap_or(isize::MAX)
        .saturating_sub(1)
}
