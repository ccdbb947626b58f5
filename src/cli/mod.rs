//! CLI command implementations.

pub mod clear;
pub mod index;
pub mod list;
pub mod nick;
pub mod post;

use crate::config::Config;
use crate::core::ChatService;
use crate::error::Result;
use crate::storage::RedisBackend;
use std::sync::Arc;

/// Build the chat service against the configured Redis server.
///
/// # Errors
///
/// Returns an error if the store URL is invalid.
pub fn connect(config: &Config) -> Result<ChatService> {
    let store = RedisBackend::open(&config.store)?;
    Ok(ChatService::new(Arc::new(store), config))
}
