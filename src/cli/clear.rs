//! `parlor clear` command implementation.

use crate::config::Config;
use crate::error::Result;

/// Run the clear command.
///
/// # Errors
///
/// Returns an error if the store is unavailable.
pub fn run(config: &Config) -> Result<()> {
    let chat = super::connect(config)?;
    chat.clear()?;
    println!(
        "Room index cleared. Records expire within {}s.",
        config.chat.message_ttl_seconds
    );
    Ok(())
}
