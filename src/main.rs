//! parlor CLI - minimal chat relay.

use clap::{Parser, Subcommand};
use parlor::config::load_config;
use parlor::logging::init_logging;
use parlor::{Config, cli};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "parlor")]
#[command(author, version, about = "Minimal chat relay over Redis", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the nickname for a session, assigning one on first contact.
    Nick {
        /// Session ID.
        session_id: String,
    },

    /// Post a message on behalf of a session.
    Post {
        /// Session ID.
        session_id: String,

        /// Message text.
        body: String,
    },

    /// Show the visible message window, newest first.
    List {
        /// Print `{"messages": [...]}` JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// [Debug] Dump the raw room index without pruning.
    Index,

    /// Drop the room index.
    Clear,
}

fn run(cli: Cli, config: &Config) -> parlor::Result<()> {
    match cli.command {
        Commands::Nick { session_id } => cli::nick::run(config, &session_id),
        Commands::Post { session_id, body } => cli::post::run(config, &session_id, &body),
        Commands::List { json } => cli::list::run(config, json),
        Commands::Index => cli::index::run(config),
        Commands::Clear => cli::clear::run(config),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = load_config().and_then(|config| {
        init_logging(&config.logging)?;
        run(cli, &config)
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("parlor: error: {e}");
            ExitCode::FAILURE
        }
    }
}
