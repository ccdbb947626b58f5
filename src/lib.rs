//! parlor - minimal chat relay over an expiring key-value store.
//!
//! Each message lives in its own record with a TTL; a bounded list of
//! record keys orders the room and is pruned lazily on read.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
