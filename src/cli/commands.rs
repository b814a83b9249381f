//! CLI command definitions using clap
//!
//! Defines the command structure for the `notesync` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::core::config::Settings;
use crate::error::Result;

/// notesync - Markdown notes synced to GitHub
///
/// Serves a small HTTP API over a folder of Markdown notes and keeps the
/// folder in sync with a GitHub repository.
/// Run without arguments to start the server.
#[derive(Parser, Debug)]
#[command(name = "notesync", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding the notes (and their git working copy)
    #[arg(long, global = true, env = "NOTESYNC_NOTES_DIR")]
    pub notes_dir: Option<PathBuf>,

    /// JSON file holding the repository URL, token and identity
    #[arg(long, global = true, env = "NOTESYNC_CREDENTIALS_FILE")]
    pub credentials_file: Option<PathBuf>,

    /// OAuth App client secret sent with device-flow token polls
    #[arg(long, global = true, env = "NOTESYNC_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Settings from the config file with command-line overrides applied
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::load()?;
        if let Some(dir) = &self.notes_dir {
            settings.notes_dir = dir.clone();
        }
        if let Some(file) = &self.credentials_file {
            settings.credentials_file = file.clone();
        }
        if let Some(secret) = &self.client_secret {
            settings.client_secret = Some(secret.clone());
        }
        if let Some(Commands::Serve { listen: Some(addr) }) = &self.command {
            settings.listen_addr = addr.clone();
        }
        Ok(settings)
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP API (default)
    Serve {
        /// Address to listen on, e.g. 127.0.0.1:3286
        #[arg(long, env = "NOTESYNC_LISTEN")]
        listen: Option<String>,
    },

    /// Stage, commit, pull --rebase and push the notes once
    Sync {
        /// Commit message used when no file changes are detected
        #[arg(short, long, default_value = "")]
        message: String,
    },

    /// Authenticate with GitHub
    Auth(AuthArgs),

    /// Manage the repository connection
    Config(ConfigArgs),

    /// Inspect notes
    Notes(NotesArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Authentication commands
#[derive(Parser, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// Login to GitHub with the OAuth Device Flow
    Login {
        /// Replace a token that is already stored
        #[arg(long)]
        force: bool,
    },
    /// Remove the stored token
    Logout,
    /// Show current authentication status
    Status,
}

// ─────────────────────────────────────────────────────────────────────────────
// Config Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration commands
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Connect the notes to a repository and configure `origin`
    Set {
        /// Repository URL, e.g. https://github.com/you/notes.git
        #[arg(long)]
        repo_url: Option<String>,

        /// Commit author name
        #[arg(long)]
        username: Option<String>,

        /// Commit author email
        #[arg(long)]
        email: Option<String>,

        /// Access token (normally obtained with `notesync auth login`)
        #[arg(long)]
        token: Option<String>,
    },

    /// Show the current connection with the token masked
    Show,
}

// ─────────────────────────────────────────────────────────────────────────────
// Notes Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Note commands
#[derive(Parser, Debug)]
pub struct NotesArgs {
    #[command(subcommand)]
    pub command: NotesCommand,
}

#[derive(Subcommand, Debug)]
pub enum NotesCommand {
    /// List all notes
    List,
}
