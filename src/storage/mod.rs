//! Storage backends for chat state.

pub mod memory;
pub mod redis_backend;
pub mod traits;

pub use memory::MemoryBackend;
pub use redis_backend::RedisBackend;
pub use traits::KeyValueStore;
