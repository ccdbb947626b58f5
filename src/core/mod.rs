//! Core chat types and services.

pub mod identity;
pub mod keys;
pub mod message;
pub mod reader;
pub mod service;
pub mod store;

pub use identity::{IdentityRegistry, derive_nickname};
pub use keys::Keyspace;
pub use message::Message;
pub use reader::MessageReader;
pub use service::ChatService;
pub use store::MessageStore;
