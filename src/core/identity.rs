//! Session to nickname mapping with sliding expiration.

use crate::config::ChatConfig;
use crate::core::keys::Keyspace;
use crate::error::{Error, Result};
use crate::storage::KeyValueStore;
use std::sync::Arc;
use std::time::Duration;

/// Resolves sessions to nicknames, provisioning one on first contact.
///
/// Every resolution renews the nickname's TTL, so a session keeps its name
/// as long as it is active at least once per TTL window.
#[derive(Clone)]
pub struct IdentityRegistry {
    store: Arc<dyn KeyValueStore>,
    keys: Keyspace,
    ttl: Duration,
    prefix: String,
    length: usize,
}

impl IdentityRegistry {
    /// Create a registry over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, keys: Keyspace, config: &ChatConfig) -> Self {
        Self {
            store,
            keys,
            ttl: config.nickname_ttl(),
            prefix: config.nickname_prefix.clone(),
            length: config.nickname_length,
        }
    }

    /// Look up (or create) the nickname for a session and renew its TTL.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for an empty session id and
    /// `Error::StoreUnavailable` if the store cannot be reached.
    pub fn resolve_nickname(&self, session_id: &str) -> Result<String> {
        if session_id.is_empty() {
            return Err(Error::InvalidInput("session id is empty".to_string()));
        }

        let key = self.keys.nickname(session_id);

        if let Some(nickname) = self.store.get(&key)? {
            if self.store.expire(&key, self.ttl)? {
                tracing::debug!(%nickname, "refreshed nickname");
            } else {
                // Expired between the read and the refresh.
                self.store.set_with_expiry(&key, &nickname, self.ttl)?;
                tracing::debug!(%nickname, "rewrote nickname that expired mid-refresh");
            }
            return Ok(nickname);
        }

        let nickname = derive_nickname(&self.prefix, session_id, self.length);
        self.store.set_with_expiry(&key, &nickname, self.ttl)?;
        tracing::debug!(%nickname, "assigned nickname");
        Ok(nickname)
    }
}

/// Build a nickname from a fixed prefix and the head of the session id.
///
/// The same inputs always give the same nickname.
#[must_use]
pub fn derive_nickname(prefix: &str, session_id: &str, length: usize) -> String {
    let head: String = session_id.chars().take(length).collect();
    format!("{prefix}{head}")
}
