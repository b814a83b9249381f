//! notesync - Markdown notes synced to GitHub
//!
//! Serves the note API and runs one-shot sync, auth and config commands.
//! Run without arguments to start the server.

use std::io;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use notesync::cli::commands::{Cli, Commands};
use notesync::cli::{auth, config, sync};
use notesync::error::{NotesError, Result};
use notesync::server;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // The server logs requests by default; one-shot commands stay quiet
    let default_level = match cli.command {
        None | Some(Commands::Serve { .. }) => "info",
        Some(_) => "warn",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = cli.settings()?;

    match cli.command {
        // No subcommand - start the server
        None | Some(Commands::Serve { .. }) => server::serve(&settings).await,

        Some(Commands::Auth(args)) => auth::handle_auth(args.command, &settings).await,

        // These take the workspace lock synchronously
        Some(Commands::Sync { message }) => {
            blocking(move || sync::handle_sync(&settings, &message)).await
        }
        Some(Commands::Config(args)) => {
            blocking(move || config::handle_config(args.command, &settings)).await
        }
        Some(Commands::Notes(args)) => sync::handle_notes(args.command, &settings),
    }
}

/// Run a synchronous handler on the blocking pool
async fn blocking<F>(f: F) -> Result<()>
where
    F: FnOnce() -> Result<()> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| NotesError::Io(io::Error::other(e.to_string())))?
}
