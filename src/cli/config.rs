//! Configuration CLI command handlers
//!
//! Both handlers are synchronous; `set` takes the workspace lock and must be
//! called off the async runtime.

use crate::cli::commands::ConfigCommand;
use crate::core::config::Settings;
use crate::core::credentials::{Credential, CredentialStore};
use crate::core::workspace::Workspace;
use crate::error::{NotesError, Result};
use secrecy::SecretString;

/// Handle configuration commands
pub fn handle_config(command: ConfigCommand, settings: &Settings) -> Result<()> {
    match command {
        ConfigCommand::Set {
            repo_url,
            username,
            email,
            token,
        } => handle_set(settings, repo_url, username, email, token),
        ConfigCommand::Show => handle_show(settings),
    }
}

/// Merge the given fields into the stored credential and rebind `origin`
fn handle_set(
    settings: &Settings,
    repo_url: Option<String>,
    username: Option<String>,
    email: Option<String>,
    token: Option<String>,
) -> Result<()> {
    let workspace = Workspace::open(settings)?;
    let current = workspace.credential();

    let credential = Credential {
        repo_url: repo_url.unwrap_or(current.repo_url),
        token: token.map(SecretString::from).unwrap_or(current.token),
        username: username.unwrap_or(current.username),
        email: email.unwrap_or(current.email),
    };
    if credential.repo_url.is_empty() {
        return Err(NotesError::InvalidInput(
            "No repository URL configured. Pass --repo-url <URL>.".to_string(),
        ));
    }

    let report = workspace.configure(credential)?;

    println!("✓ Remote 'origin' configured.");
    if report.initialized {
        println!("  Initialized a new repository in {}", workspace.root().display());
    }
    if let Some(error) = report.initial_pull_error {
        println!("  Initial pull failed (the remote may be empty):");
        println!("  {}", error.trim());
    }
    if !workspace.credential().has_token() {
        println!();
        println!("  No token stored yet. Run 'notesync auth login' before syncing.");
    }
    Ok(())
}

/// Print the connection with the token masked
fn handle_show(settings: &Settings) -> Result<()> {
    let store = CredentialStore::load(&settings.credentials_file);
    let masked = store.credential().to_masked();
    let or_unset = |value: &str| {
        if value.is_empty() {
            "Not configured".to_string()
        } else {
            value.to_string()
        }
    };

    println!("Repository: {}", or_unset(&masked.repo_url));
    println!("Token:      {}", or_unset(&masked.token));
    println!("Username:   {}", or_unset(&masked.username));
    println!("Email:      {}", or_unset(&masked.email));
    println!();
    println!("Notes directory: {}", settings.notes_dir.display());
    println!("Branch:          {}", settings.branch);
    if let Ok(path) = Settings::config_path() {
        println!("Settings file:   {}", path.display());
    }
    Ok(())
}
