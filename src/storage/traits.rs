//! Storage trait definitions.

use crate::error::Result;
use std::time::Duration;

/// Remote key-value store with per-key expiration.
///
/// Every operation is atomic for the single key it touches. There is no
/// cross-key transaction. List indices are inclusive and may be negative,
/// counting back from the tail (`-1` is the last element).
pub trait KeyValueStore: Send + Sync {
    /// Get a string value.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Set a string value that expires after `ttl`, replacing any old value.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Reset the expiration of an existing key to `ttl` from now.
    ///
    /// Returns `false` if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn expire(&self, key: &str, ttl: Duration) -> Result<bool>;

    /// Get several string values at once.
    ///
    /// The result is index-aligned with `keys`; missing keys are `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn multi_get(&self, keys: &[String]) -> Result<Vec<Option<String>>>;

    /// Push a value onto the head of a list, returning the new length.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn list_push_front(&self, key: &str, value: &str) -> Result<usize>;

    /// Keep only the elements in `start..=stop`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn list_trim(&self, key: &str, start: isize, stop: isize) -> Result<()>;

    /// Read the elements in `start..=stop`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn list_range(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>>;

    /// Remove elements equal to `value`, returning how many were removed.
    ///
    /// `count == 0` removes every occurrence, `count > 0` removes up to
    /// `count` from the head, `count < 0` up to `|count|` from the tail.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn list_remove(&self, key: &str, count: isize, value: &str) -> Result<usize>;

    /// Delete a key of any type. Succeeds if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn delete(&self, key: &str) -> Result<()>;
}
