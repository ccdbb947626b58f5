//! Key layout in the backing store.

use uuid::Uuid;

const ROOM_INDEX_KEY: &str = "chat:room:main";
const MESSAGE_KEY_PREFIX: &str = "chat:message:";
const NICKNAME_KEY_PREFIX: &str = "user:nickname:";

/// Builds every key parlor reads or writes, under an optional namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyspace {
    namespace: String,
}

impl Keyspace {
    /// Create a keyspace whose keys all start with `namespace`.
    #[must_use]
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// The list holding message record keys, newest first.
    #[must_use]
    pub fn room_index(&self) -> String {
        format!("{}{ROOM_INDEX_KEY}", self.namespace)
    }

    /// A fresh, never-before-used message record key.
    #[must_use]
    pub fn new_message_key(&self) -> String {
        format!("{}{MESSAGE_KEY_PREFIX}{}", self.namespace, Uuid::new_v4())
    }

    /// The key holding a session's nickname.
    #[must_use]
    pub fn nickname(&self, session_id: &str) -> String {
        format!("{}{NICKNAME_KEY_PREFIX}{session_id}", self.namespace)
    }
}
