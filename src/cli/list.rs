//! `parlor list` command implementation.

use crate::config::Config;
use crate::core::Message;
use crate::error::Result;
use chrono::{DateTime, Local, Utc};
use serde_json::json;

/// Run the list command.
///
/// Shows the visible window newest first, or the `{"messages": [...]}`
/// document polling clients consume when `json` is set.
///
/// # Errors
///
/// Returns an error if the store is unavailable.
pub fn run(config: &Config, json: bool) -> Result<()> {
    let chat = super::connect(config)?;
    let messages = chat.list_recent()?;

    if json {
        println!("{}", render_json(&messages)?);
        return Ok(());
    }

    if messages.is_empty() {
        println!("No messages.");
        return Ok(());
    }

    for message in &messages {
        println!("{}", format_message(message));
    }

    println!("{}", "─".repeat(60));
    println!("Showing {} message(s)", messages.len());

    Ok(())
}

/// Render messages as the polling endpoint's JSON body.
fn render_json(messages: &[Message]) -> Result<String> {
    Ok(serde_json::to_string(&json!({ "messages": messages }))?)
}

/// One display line: local time, sender, first line of the body.
pub(crate) fn format_message(message: &Message) -> String {
    let body = message.body.lines().next().unwrap_or("");
    format!(
        "[{}] {}: {}",
        format_local_time(message.timestamp),
        message.sender,
        body
    )
}

/// Format UTC time as local time for display.
fn format_local_time(utc: DateTime<Utc>) -> String {
    let local: DateTime<Local> = utc.into();
    local.format("%H:%M:%S").to_string()
}
