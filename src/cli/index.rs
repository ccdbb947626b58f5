//! `parlor index` command implementation.

use crate::config::Config;
use crate::error::Result;

/// Run the index command.
///
/// Dumps the room index as stored, including entries whose records have
/// already expired. Nothing is pruned.
///
/// # Errors
///
/// Returns an error if the store is unavailable.
pub fn run(config: &Config) -> Result<()> {
    let chat = super::connect(config)?;
    let index = chat.raw_index()?;

    if index.is_empty() {
        println!("Index is empty.");
        return Ok(());
    }

    for (position, key) in index.iter().enumerate() {
        println!("{position:>3}  {key}");
    }
    println!("{} entr{}", index.len(), if index.len() == 1 { "y" } else { "ies" });

    Ok(())
}
