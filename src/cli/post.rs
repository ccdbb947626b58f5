//! `parlor post` command implementation.

use crate::cli::list::format_message;
use crate::config::Config;
use crate::error::Result;

/// Run the post command.
///
/// Posts `body` under the session's nickname and echoes the stored message.
///
/// # Errors
///
/// Returns an error if the session id is empty or the store is unavailable.
pub fn run(config: &Config, session_id: &str, body: &str) -> Result<()> {
    let chat = super::connect(config)?;
    let message = chat.post_as(session_id, body)?;
    println!("{}", format_message(&message));
    Ok(())
}
