//! `parlor nick` command implementation.

use crate::config::Config;
use crate::error::Result;

/// Run the nick command.
///
/// Prints the session's nickname, assigning one if needed.
///
/// # Errors
///
/// Returns an error if the store is unavailable.
pub fn run(config: &Config, session_id: &str) -> Result<()> {
    let chat = super::connect(config)?;
    println!("{}", chat.resolve_nickname(session_id)?);
    Ok(())
}
