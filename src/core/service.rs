//! Entry points for the outer shell.

use crate::config::Config;
use crate::core::identity::IdentityRegistry;
use crate::core::keys::Keyspace;
use crate::core::message::Message;
use crate::core::reader::MessageReader;
use crate::core::store::MessageStore;
use crate::error::Result;
use crate::storage::KeyValueStore;
use std::sync::Arc;

/// The chat room: identity, writes and reads over one shared store.
#[derive(Clone)]
pub struct ChatService {
    identities: IdentityRegistry,
    writer: MessageStore,
    reader: MessageReader,
    store: Arc<dyn KeyValueStore>,
    keys: Keyspace,
}

impl ChatService {
    /// Wire the chat services to `store` using `config`.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, config: &Config) -> Self {
        let keys = Keyspace::new(config.store.namespace.clone());
        Self {
            identities: IdentityRegistry::new(Arc::clone(&store), keys.clone(), &config.chat),
            writer: MessageStore::new(Arc::clone(&store), keys.clone(), &config.chat),
            reader: MessageReader::new(Arc::clone(&store), keys.clone(), &config.chat),
            store,
            keys,
        }
    }

    /// See [`IdentityRegistry::resolve_nickname`].
    ///
    /// # Errors
    ///
    /// Propagates store and input errors.
    pub fn resolve_nickname(&self, session_id: &str) -> Result<String> {
        self.identities.resolve_nickname(session_id)
    }

    /// Post `body` on behalf of a session, under its nickname.
    ///
    /// # Errors
    ///
    /// Propagates store and input errors. If the nickname cannot be
    /// resolved, nothing is written.
    pub fn post_as(&self, session_id: &str, body: &str) -> Result<Message> {
        let nickname = self.identities.resolve_nickname(session_id)?;
        self.writer.post(&nickname, body)
    }

    /// See [`MessageStore::post`].
    ///
    /// # Errors
    ///
    /// Propagates store errors.
    pub fn post(&self, sender: &str, body: &str) -> Result<Message> {
        self.writer.post(sender, body)
    }

    /// See [`MessageReader::list_recent`].
    ///
    /// # Errors
    ///
    /// Propagates store errors.
    pub fn list_recent(&self) -> Result<Vec<Message>> {
        self.reader.list_recent()
    }

    /// See [`MessageReader::raw_index`].
    ///
    /// # Errors
    ///
    /// Propagates store errors.
    pub fn raw_index(&self) -> Result<Vec<String>> {
        self.reader.raw_index()
    }

    /// Drop the room index. Records stay until their TTL runs out, but
    /// nothing can reach them any more.
    ///
    /// # Errors
    ///
    /// Propagates store errors.
    pub fn clear(&self) -> Result<()> {
        self.store.delete(&self.keys.room_index())?;
        tracing::info!("cleared room index");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::storage::MemoryBackend;

    fn service() -> (ChatService, Arc<MemoryBackend>) {
        let store = Arc::new(MemoryBackend::new());
        (ChatService::new(store.clone(), &Config::default()), store)
    }

    #[test]
    fn post_as_uses_nickname() {
        let (chat, _store) = service();

        let message = chat.post_as("f00dcafe", "hello").unwrap();
        assert_eq!(message.sender, "anonf00d");

        let messages = chat.list_recent().unwrap();
        assert_eq!(messages, vec![message]);
    }

    #[test]
    fn post_as_writes_nothing_on_bad_session() {
        let (chat, _store) = service();

        assert!(matches!(
            chat.post_as("", "hello"),
            Err(Error::InvalidInput(_))
        ));
        assert!(chat.raw_index().unwrap().is_empty());
    }

    #[test]
    fn clear_hides_every_message() {
        let (chat, _store) = service();
        chat.post("anon", "A").unwrap();
        chat.post("anon", "B").unwrap();

        chat.clear().unwrap();

        assert!(chat.list_recent().unwrap().is_empty());
    }

    #[test]
    fn namespace_isolates_rooms() {
        let store = Arc::new(MemoryBackend::new());
        let mut config = Config::default();
        config.store.namespace = "blue:".to_string();
        let blue = ChatService::new(store.clone(), &config);
        config.store.namespace = "green:".to_string();
        let green = ChatService::new(store.clone(), &config);

        blue.post("anon", "only in blue").unwrap();

        assert_eq!(blue.list_recent().unwrap().len(), 1);
        assert!(green.list_recent().unwrap().is_empty());
    }
}
