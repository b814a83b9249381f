//! Authentication CLI command handlers

use tokio::sync::watch;

use crate::cli::commands::AuthCommand;
use crate::core::config::Settings;
use crate::core::credentials::CredentialStore;
use crate::core::workspace::Workspace;
use crate::error::Result;
use crate::github::auth::DeviceFlowClient;
use crate::github::client::fill_identity_from_github;
use crate::github::error_handler::open_browser;

/// Handle authentication commands
pub async fn handle_auth(command: AuthCommand, settings: &Settings) -> Result<()> {
    match command {
        AuthCommand::Login { force } => handle_login(settings, force).await,
        AuthCommand::Logout => handle_logout(settings),
        AuthCommand::Status => handle_status(settings),
    }
}

/// Handle the login command using OAuth Device Flow
async fn handle_login(settings: &Settings, force: bool) -> Result<()> {
    if !force && CredentialStore::load(&settings.credentials_file).credential().has_token() {
        println!("✓ Already authenticated with GitHub.");
        println!();
        println!("  To re-authenticate, run: notesync auth login --force");
        return Ok(());
    }

    println!("Starting GitHub authentication...\n");

    let workspace = Workspace::open(settings)?;
    let client = DeviceFlowClient::from_settings(settings)?;
    let session = client.start().await?;

    // Display the code prominently
    println!("┌────────────────────────────────────┐");
    println!("│  Your code:  {:<22}│", session.user_code);
    println!("└────────────────────────────────────┘");
    println!();

    // Always show the URL
    println!("Open this URL in your browser:");
    println!("  {}", session.verification_uri);
    println!();

    if open_browser(&session.verification_uri) {
        println!("✓ Browser opened automatically.");
    }

    println!("Enter the code shown above and authorize the app.");
    println!();
    println!("Waiting for authorization... (Ctrl-C to cancel)");

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = cancel_tx.send(true);
        }
    });

    let token = client.wait_for_token(&session, cancel_rx).await?;
    workspace.store_token(&token).await?;
    fill_identity_from_github(&workspace, &token).await;

    println!("\n✓ Successfully authenticated with GitHub!");
    let credential = CredentialStore::load(&settings.credentials_file).credential().clone();
    if !credential.username.is_empty() {
        println!("  Committing as {} <{}>", credential.username, credential.email);
    }
    if credential.repo_url.is_empty() {
        println!();
        println!("  Next, connect a repository: notesync config set --repo-url <URL>");
    }
    Ok(())
}

/// Handle the logout command
fn handle_logout(settings: &Settings) -> Result<()> {
    let mut store = CredentialStore::load(&settings.credentials_file);
    if !store.credential().has_token() {
        println!("Not currently authenticated.");
        return Ok(());
    }

    store.clear_token()?;
    println!("✓ Logged out. The stored token has been removed.");
    Ok(())
}

/// Handle the status command
fn handle_status(settings: &Settings) -> Result<()> {
    let store = CredentialStore::load(&settings.credentials_file);
    let credential = store.credential();

    if credential.has_token() {
        println!(
            "✓ Authenticated with GitHub (token {})",
            CredentialStore::mask_token(&credential.token)
        );
    } else {
        println!("✗ Not authenticated");
        println!();
        println!("  Run 'notesync auth login' to authenticate.");
    }

    if credential.is_sync_ready() {
        println!("  Sync target: {}", credential.repo_url);
    }
    println!("  Credential file: {}", store.path().display());
    Ok(())
}
