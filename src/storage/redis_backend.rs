//! Redis storage backend.

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::storage::traits::KeyValueStore;
use redis::{Client, Cmd, Connection, FromRedisValue};
use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Redis-backed store over a single lazily (re)established connection.
///
/// Commands are serialized through the connection lock, which is held for
/// one round trip only. A transport failure discards the connection so the
/// next command reconnects; the failed command itself is not retried.
///
/// Requests that share one backend queue behind that single socket, and a
/// reconnect holds the lock for up to the connect timeout. Callers that need
/// parallel round trips should open one backend per worker.
pub struct RedisBackend {
    client: Client,
    connect_timeout: Duration,
    io_timeout: Duration,
    conn: Mutex<Option<Connection>>,
}

impl fmt::Debug for RedisBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisBackend")
            .field("addr", &self.client.get_connection_info().addr)
            .field("connect_timeout", &self.connect_timeout)
            .field("io_timeout", &self.io_timeout)
            .finish_non_exhaustive()
    }
}

impl RedisBackend {
    /// Create a backend for the configured server.
    ///
    /// No connection is made until the first command.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the URL cannot be parsed.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| Error::Config(format!("invalid store url {}: {e}", config.url)))?;
        Ok(Self {
            client,
            connect_timeout: Duration::from_millis(config.connect_timeout_ms),
            io_timeout: Duration::from_millis(config.io_timeout_ms),
            conn: Mutex::new(None),
        })
    }

    fn connect(&self) -> Result<Connection> {
        let conn = self.client.get_connection_with_timeout(self.connect_timeout)?;
        conn.set_read_timeout(Some(self.io_timeout))?;
        conn.set_write_timeout(Some(self.io_timeout))?;
        tracing::debug!(addr = %self.client.get_connection_info().addr, "connected to store");
        Ok(conn)
    }

    fn query<T: FromRedisValue>(&self, cmd: &Cmd) -> Result<T> {
        let mut slot = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let mut conn = match slot.take() {
            Some(conn) => conn,
            None => self.connect()?,
        };

        match cmd.query::<T>(&mut conn) {
            Ok(value) => {
                *slot = Some(conn);
                Ok(value)
            }
            Err(err) => {
                let err = Error::from(err);
                if err.is_transient() {
                    tracing::warn!(error = %err, "dropping store connection");
                } else {
                    *slot = Some(conn);
                }
                Err(err)
            }
        }
    }
}

fn millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX)
}

impl KeyValueStore for RedisBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let mut cmd = redis::cmd("GET");
        cmd.arg(key);
        self.query(&cmd)
    }

    fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value).arg("PX").arg(millis(ttl));
        self.query(&cmd)
    }

    fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        let mut cmd = redis::cmd("PEXPIRE");
        cmd.arg(key).arg(millis(ttl));
        self.query(&cmd)
    }

    fn multi_get(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut cmd = redis::cmd("MGET");
        cmd.arg(keys);
        self.query(&cmd)
    }

    fn list_push_front(&self, key: &str, value: &str) -> Result<usize> {
        let mut cmd = redis::cmd("LPUSH");
        cmd.arg(key).arg(value);
        self.query(&cmd)
    }

    fn list_trim(&self, key: &str, start: isize, stop: isize) -> Result<()> {
        let mut cmd = redis::cmd("LTRIM");
        cmd.arg(key).arg(start).arg(stop);
        self.query(&cmd)
    }

    fn list_range(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>> {
        let mut cmd = redis::cmd("LRANGE");
        cmd.arg(key).arg(start).arg(stop);
        self.query(&cmd)
    }

    fn list_remove(&self, key: &str, count: isize, value: &str) -> Result<usize> {
        let mut cmd = redis::cmd("LREM");
        cmd.arg(key).arg(count).arg(value);
        self.query(&cmd)
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut cmd = redis::cmd("DEL");
        cmd.arg(key);
        self.query(&cmd)
    }
}
