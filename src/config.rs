//! Configuration loading and management.
//!
//! Configuration is loaded with the following precedence:
//! 1. Environment variables (`PARLOR_*`)
//! 2. Config file (`~/.parlor/config.toml`)
//! 3. Defaults

use crate::error::{Error, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration struct.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Store connection configuration.
    pub store: StoreConfig,

    /// Chat retention configuration.
    pub chat: ChatConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Reject settings the chat core cannot run with.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` naming the first offending setting.
    pub fn validate(&self) -> Result<()> {
        if self.chat.window_size == 0 {
            return Err(Error::Config("chat.window_size must be at least 1".to_string()));
        }
        if self.chat.message_ttl_seconds == 0 {
            return Err(Error::Config(
                "chat.message_ttl_seconds must be at least 1".to_string(),
            ));
        }
        if self.chat.nickname_ttl_seconds == 0 {
            return Err(Error::Config(
                "chat.nickname_ttl_seconds must be at least 1".to_string(),
            ));
        }
        if self.chat.nickname_length == 0 {
            return Err(Error::Config(
                "chat.nickname_length must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Store connection configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Redis connection URL.
    pub url: String,

    /// Prefix prepended to every key, e.g. `"parlor:"`. Empty by default.
    pub namespace: String,

    /// How long to wait for a connection.
    pub connect_timeout_ms: u64,

    /// Read/write timeout for a single command.
    pub io_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379/".to_string(),
            namespace: String::new(),
            connect_timeout_ms: 2000,
            io_timeout_ms: 2000,
        }
    }
}

/// Chat retention configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Maximum number of messages visible in the room.
    pub window_size: usize,

    /// Lifetime of a single message record.
    pub message_ttl_seconds: u64,

    /// Sliding expiration window for a session's nickname.
    pub nickname_ttl_seconds: u64,

    /// Prefix for generated nicknames.
    pub nickname_prefix: String,

    /// How many characters of the session id follow the prefix.
    pub nickname_length: usize,
}

impl ChatConfig {
    /// Message record lifetime.
    #[must_use]
    pub fn message_ttl(&self) -> Duration {
        Duration::from_secs(self.message_ttl_seconds)
    }

    /// Nickname sliding-expiration window.
    #[must_use]
    pub fn nickname_ttl(&self) -> Duration {
        Duration::from_secs(self.nickname_ttl_seconds)
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            window_size: 50,
            message_ttl_seconds: 5 * 60,
            nickname_ttl_seconds: 60 * 60,
            nickname_prefix: "anon".to_string(),
            nickname_length: 4,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,

    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
            json: false,
        }
    }
}

/// Get the default parlor home directory.
fn default_parlor_home() -> PathBuf {
    dirs::home_dir().map_or_else(|| PathBuf::from(".parlor"), |h| h.join(".parlor"))
}

/// Load configuration with precedence: env vars → file → defaults.
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if
/// the resulting configuration is invalid.
pub fn load_config() -> Result<Config> {
    let mut config = load_config_file(&get_config_path())?;

    // Override with environment variables
    apply_env_overrides(&mut config);

    config.validate()?;
    Ok(config)
}

/// Read a config file, falling back to defaults if it does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config_file(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = fs::read_to_string(path)?;
    toml::from_str(&contents).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
}

/// Get the path to the config file.
fn get_config_path() -> PathBuf {
    if let Ok(path) = env::var("PARLOR_CONFIG") {
        return PathBuf::from(path);
    }

    if let Ok(home) = env::var("PARLOR_HOME") {
        return PathBuf::from(home).join("config.toml");
    }

    default_parlor_home().join("config.toml")
}

/// Apply environment variable overrides to config.
fn apply_env_overrides(config: &mut Config) {
    // Store
    if let Ok(url) = env::var("PARLOR_STORE_URL") {
        config.store.url = url;
    }

    if let Ok(namespace) = env::var("PARLOR_NAMESPACE") {
        config.store.namespace = namespace;
    }

    // Chat
    if let Ok(val) = env::var("PARLOR_WINDOW_SIZE") {
        if let Ok(size) = val.parse() {
            config.chat.window_size = size;
        }
    }

    if let Ok(val) = env::var("PARLOR_MESSAGE_TTL") {
        if let Ok(secs) = val.parse() {
            config.chat.message_ttl_seconds = secs;
        }
    }

    if let Ok(val) = env::var("PARLOR_NICKNAME_TTL") {
        if let Ok(secs) = val.parse() {
            config.chat.nickname_ttl_seconds = secs;
        }
    }

    // Logging
    if let Ok(filter) = env::var("PARLOR_LOG") {
        config.logging.filter = filter;
    }
}
