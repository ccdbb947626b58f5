//! In-memory storage backend for testing.
//!
//! Mirrors Redis semantics for the commands parlor uses, including lazy
//! expiry: an expired key is dropped the next time anything touches it.

use crate::error::{Error, Result};
use crate::storage::traits::KeyValueStore;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

const WRONG_TYPE: &str = "WRONGTYPE Operation against a key holding the wrong kind of value";

#[derive(Debug, Clone)]
enum Value {
    Str(String),
    List(VecDeque<String>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

#[derive(Debug, Default)]
struct State {
    entries: HashMap<String, Entry>,
    /// How far the backend clock runs ahead of the wall clock.
    skew: Duration,
}

impl State {
    fn now(&self) -> Instant {
        Instant::now() + self.skew
    }

    /// Look up a key, evicting it first if it has expired.
    fn live_entry(&mut self, key: &str) -> Option<&mut Entry> {
        let now = self.now();
        if self
            .entries
            .get(key)
            .is_some_and(|e| e.expires_at.is_some_and(|at| at <= now))
        {
            self.entries.remove(key);
        }
        self.entries.get_mut(key)
    }

    fn live_list(&mut self, key: &str) -> Result<Option<&mut VecDeque<String>>> {
        match self.live_entry(key) {
            None => Ok(None),
            Some(Entry {
                value: Value::List(list),
                ..
            }) => Ok(Some(list)),
            Some(_) => Err(Error::StoreCommand(WRONG_TYPE.to_string())),
        }
    }

    /// Redis drops lists once their last element is removed.
    fn drop_if_empty(&mut self, key: &str) {
        if matches!(
            self.entries.get(key),
            Some(Entry { value: Value::List(list), .. }) if list.is_empty()
        ) {
            self.entries.remove(key);
        }
    }
}

/// In-memory storage backend for testing.
#[derive(Debug)]
pub struct MemoryBackend {
    state: Mutex<State>,
    available: AtomicBool,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self {
            state: Mutex::new(State::default()),
            available: AtomicBool::new(true),
        }
    }
}

impl MemoryBackend {
    /// Create a new in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the backend clock forward, expiring anything whose TTL elapses.
    pub fn advance(&self, by: Duration) {
        self.state_guard().skew += by;
    }

    /// Simulate the store going down (`false`) or coming back (`true`).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Remaining lifetime of a key, or `None` if it is missing or persistent.
    #[must_use]
    pub fn time_to_live(&self, key: &str) -> Option<Duration> {
        let mut state = self.state_guard();
        let now = state.now();
        state
            .live_entry(key)
            .and_then(|e| e.expires_at)
            .map(|at| at.saturating_duration_since(now))
    }

    fn state_guard(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn connect(&self) -> Result<MutexGuard<'_, State>> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(Error::StoreUnavailable(
                "memory backend marked unavailable".to_string(),
            ));
        }
        Ok(self.state_guard())
    }
}

impl KeyValueStore for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let mut state = self.connect()?;
        match state.live_entry(key) {
            None => Ok(None),
            Some(Entry {
                value: Value::Str(s),
                ..
            }) => Ok(Some(s.clone())),
            Some(_) => Err(Error::StoreCommand(WRONG_TYPE.to_string())),
        }
    }

    fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        if ttl.is_zero() {
            return Err(Error::StoreCommand(
                "invalid expire time in 'set' command".to_string(),
            ));
        }
        let mut state = self.connect()?;
        let expires_at = Some(state.now() + ttl);
        state.entries.insert(
            key.to_string(),
            Entry {
                value: Value::Str(value.to_string()),
                expires_at,
            },
        );
        Ok(())
    }

    fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        let mut state = self.connect()?;
        let expires_at = state.now() + ttl;
        if ttl.is_zero() {
            // A non-positive timeout deletes the key outright.
            return Ok(state.live_entry(key).is_some() && state.entries.remove(key).is_some());
        }
        match state.live_entry(key) {
            Some(entry) => {
                entry.expires_at = Some(expires_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn multi_get(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        let mut state = self.connect()?;
        // Wrong-typed keys read as nil, as MGET does.
        Ok(keys
            .iter()
            .map(|key| match state.live_entry(key) {
                Some(Entry {
                    value: Value::Str(s),
                    ..
                }) => Some(s.clone()),
                _ => None,
            })
            .collect())
    }

    fn list_push_front(&self, key: &str, value: &str) -> Result<usize> {
        let mut state = self.connect()?;
        if let Some(list) = state.live_list(key)? {
            list.push_front(value.to_string());
            return Ok(list.len());
        }
        state.entries.insert(
            key.to_string(),
            Entry {
                value: Value::List(VecDeque::from([value.to_string()])),
                expires_at: None,
            },
        );
        Ok(1)
    }

    fn list_trim(&self, key: &str, start: isize, stop: isize) -> Result<()> {
        let mut state = self.connect()?;
        let Some(list) = state.live_list(key)? else {
            return Ok(());
        };
        match resolve_range(list.len(), start, stop) {
            Some((first, last)) => {
                list.truncate(last + 1);
                list.drain(..first);
            }
            None => list.clear(),
        }
        state.drop_if_empty(key);
        Ok(())
    }

    fn list_range(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>> {
        let mut state = self.connect()?;
        let Some(list) = state.live_list(key)? else {
            return Ok(Vec::new());
        };
        Ok(match resolve_range(list.len(), start, stop) {
            Some((first, last)) => list.range(first..=last).cloned().collect(),
            None => Vec::new(),
        })
    }

    fn list_remove(&self, key: &str, count: isize, value: &str) -> Result<usize> {
        let mut state = self.connect()?;
        let Some(list) = state.live_list(key)? else {
            return Ok(0);
        };
        let removed = remove_matching(list, count, value);
        state.drop_if_empty(key);
        Ok(removed)
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut state = self.connect()?;
        state.entries.remove(key);
        Ok(())
    }
}

/// Clamp an inclusive, possibly negative range the way LRANGE/LTRIM do.
fn resolve_range(len: usize, start: isize, stop: isize) -> Option<(usize, usize)> {
    let len = isize::try_from(len).unwrap_or(isize::MAX);
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
    if start > stop || start >= len {
        return None;
    }
    Some((start.unsigned_abs(), stop.unsigned_abs()))
}

fn remove_matching(list: &mut VecDeque<String>, count: isize, value: &str) -> usize {
    let limit = if count == 0 {
        usize::MAX
    } else {
        count.unsigned_abs()
    };
    let mut removed = 0;

    if count >= 0 {
        let mut i = 0;
        while i < list.len() && removed < limit {
            if list[i] == value {
                list.remove(i);
                removed += 1;
            } else {
                i += 1;
            }
        }
    } else {
        let mut i = list.len();
        while i > 0 && removed < limit {
            i -= 1;
            if list[i] == value {
                list.remove(i);
                removed += 1;
            }
        }
    }

    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    fn seeded_list(store: &MemoryBackend, key: &str, items: &[&str]) {
        // Push in reverse so the list reads in `items` order.
        for item in items.iter().rev() {
            store.list_push_front(key, item).unwrap();
        }
    }

    #[test]
    fn get_missing_key() {
        let store = MemoryBackend::new();
        assert!(store.get("nonexistent").unwrap().is_none());
    }

    #[test]
    fn set_and_get() {
        let store = MemoryBackend::new();
        store.set_with_expiry("k", "v", TTL).unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn value_expires_after_ttl() {
        let store = MemoryBackend::new();
        store.set_with_expiry("k", "v", TTL).unwrap();

        store.advance(Duration::from_secs(59));
        assert!(store.get("k").unwrap().is_some());

        store.advance(Duration::from_secs(1));
        assert!(store.get("k").unwrap().is_none());
    }

    #[test]
    fn zero_ttl_set_is_rejected() {
        let store = MemoryBackend::new();
        let result = store.set_with_expiry("k", "v", Duration::ZERO);
        assert!(matches!(result, Err(Error::StoreCommand(_))));
    }

    #[test]
    fn expire_extends_lifetime() {
        let store = MemoryBackend::new();
        store.set_with_expiry("k", "v", TTL).unwrap();

        store.advance(Duration::from_secs(50));
        assert!(store.expire("k", TTL).unwrap());

        store.advance(Duration::from_secs(50));
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        let remaining = store.time_to_live("k").unwrap();
        assert!(remaining <= Duration::from_secs(10));
        assert!(remaining > Duration::from_secs(9));
    }

    #[test]
    fn expire_missing_key_returns_false() {
        let store = MemoryBackend::new();
        assert!(!store.expire("nonexistent", TTL).unwrap());
    }

    #[test]
    fn expire_after_expiry_returns_false() {
        let store = MemoryBackend::new();
        store.set_with_expiry("k", "v", TTL).unwrap();
        store.advance(TTL);
        assert!(!store.expire("k", TTL).unwrap());
    }

    #[test]
    fn multi_get_is_index_aligned() {
        let store = MemoryBackend::new();
        store.set_with_expiry("a", "1", TTL).unwrap();
        store.set_with_expiry("c", "3", TTL).unwrap();

        let keys = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let values = store.multi_get(&keys).unwrap();
        assert_eq!(
            values,
            vec![Some("1".to_string()), None, Some("3".to_string())]
        );
    }

    #[test]
    fn multi_get_treats_lists_as_missing() {
        let store = MemoryBackend::new();
        store.list_push_front("list", "x").unwrap();
        let values = store.multi_get(&["list".to_string()]).unwrap();
        assert_eq!(values, vec![None]);
    }

    #[test]
    fn push_front_orders_newest_first() {
        let store = MemoryBackend::new();
        assert_eq!(store.list_push_front("l", "a").unwrap(), 1);
        assert_eq!(store.list_push_front("l", "b").unwrap(), 2);
        assert_eq!(store.list_range("l", 0, -1).unwrap(), vec!["b", "a"]);
    }

    #[test]
    fn list_ops_on_string_key_fail() {
        let store = MemoryBackend::new();
        store.set_with_expiry("s", "v", TTL).unwrap();
        assert!(matches!(
            store.list_push_front("s", "x"),
            Err(Error::StoreCommand(_))
        ));
        assert!(matches!(
            store.list_range("s", 0, -1),
            Err(Error::StoreCommand(_))
        ));
    }

    #[test]
    fn get_on_list_key_fails() {
        let store = MemoryBackend::new();
        store.list_push_front("l", "x").unwrap();
        assert!(matches!(store.get("l"), Err(Error::StoreCommand(_))));
    }

    #[test]
    fn range_clamps_out_of_bounds() {
        let store = MemoryBackend::new();
        seeded_list(&store, "l", &["a", "b", "c"]);

        assert_eq!(store.list_range("l", 0, 49).unwrap(), vec!["a", "b", "c"]);
        assert_eq!(store.list_range("l", 1, 1).unwrap(), vec!["b"]);
        assert_eq!(store.list_range("l", -2, -1).unwrap(), vec!["b", "c"]);
        assert_eq!(store.list_range("l", -100, 0).unwrap(), vec!["a"]);
        assert!(store.list_range("l", 5, 10).unwrap().is_empty());
        assert!(store.list_range("l", 2, 1).unwrap().is_empty());
    }

    #[test]
    fn range_of_missing_list_is_empty() {
        let store = MemoryBackend::new();
        assert!(store.list_range("nope", 0, -1).unwrap().is_empty());
    }

    #[test]
    fn trim_keeps_head() {
        let store = MemoryBackend::new();
        seeded_list(&store, "l", &["a", "b", "c", "d"]);

        store.list_trim("l", 0, 1).unwrap();
        assert_eq!(store.list_range("l", 0, -1).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn trim_with_larger_window_is_noop() {
        let store = MemoryBackend::new();
        seeded_list(&store, "l", &["a", "b"]);

        store.list_trim("l", 0, 49).unwrap();
        assert_eq!(store.list_range("l", 0, -1).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn trim_to_empty_range_deletes_list() {
        let store = MemoryBackend::new();
        seeded_list(&store, "l", &["a", "b"]);

        store.list_trim("l", 5, 10).unwrap();
        assert!(store.list_range("l", 0, -1).unwrap().is_empty());
        // Key is gone, so it can be reused as a string.
        store.set_with_expiry("l", "v", TTL).unwrap();
    }

    #[test]
    fn remove_all_occurrences() {
        let store = MemoryBackend::new();
        seeded_list(&store, "l", &["x", "a", "x", "b", "x"]);

        assert_eq!(store.list_remove("l", 0, "x").unwrap(), 3);
        assert_eq!(store.list_range("l", 0, -1).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn remove_from_head_and_tail() {
        let store = MemoryBackend::new();
        seeded_list(&store, "l", &["x", "a", "x", "b", "x"]);

        assert_eq!(store.list_remove("l", 1, "x").unwrap(), 1);
        assert_eq!(
            store.list_range("l", 0, -1).unwrap(),
            vec!["a", "x", "b", "x"]
        );

        assert_eq!(store.list_remove("l", -1, "x").unwrap(), 1);
        assert_eq!(store.list_range("l", 0, -1).unwrap(), vec!["a", "x", "b"]);
    }

    #[test]
    fn remove_last_element_deletes_list() {
        let store = MemoryBackend::new();
        store.list_push_front("l", "only").unwrap();

        assert_eq!(store.list_remove("l", 0, "only").unwrap(), 1);
        store.set_with_expiry("l", "now a string", TTL).unwrap();
    }

    #[test]
    fn remove_from_missing_list() {
        let store = MemoryBackend::new();
        assert_eq!(store.list_remove("nope", 0, "x").unwrap(), 0);
    }

    #[test]
    fn delete_removes_any_type() {
        let store = MemoryBackend::new();
        store.set_with_expiry("s", "v", TTL).unwrap();
        store.list_push_front("l", "x").unwrap();

        store.delete("s").unwrap();
        store.delete("l").unwrap();
        store.delete("nonexistent").unwrap();

        assert!(store.get("s").unwrap().is_none());
        assert!(store.list_range("l", 0, -1).unwrap().is_empty());
    }

    #[test]
    fn unavailable_backend_fails_every_call() {
        let store = MemoryBackend::new();
        store.set_with_expiry("k", "v", TTL).unwrap();
        store.set_available(false);

        assert!(matches!(store.get("k"), Err(Error::StoreUnavailable(_))));
        assert!(matches!(
            store.list_push_front("l", "x"),
            Err(Error::StoreUnavailable(_))
        ));

        store.set_available(true);
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn resolve_range_matches_redis() {
        assert_eq!(resolve_range(0, 0, -1), None);
        assert_eq!(resolve_range(3, 0, -1), Some((0, 2)));
        assert_eq!(resolve_range(3, 0, 49), Some((0, 2)));
        assert_eq!(resolve_range(3, -1, -1), Some((2, 2)));
        assert_eq!(resolve_range(3, 0, -4), None);
        assert_eq!(resolve_range(3, 3, 5), None);
    }

    #[test]
    fn concurrent_pushes() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(MemoryBackend::new());

        let mut handles = vec![];
        for i in 0..10 {
            let store_clone = Arc::clone(&store);
            let handle = thread::spawn(move || {
                for j in 0..10 {
                    store_clone
                        .list_push_front("shared", &format!("{i}-{j}"))
                        .unwrap();
                }
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.join().expect("Thread panicked");
        }

        assert_eq!(store.list_range("shared", 0, -1).unwrap().len(), 100);
    }
}
