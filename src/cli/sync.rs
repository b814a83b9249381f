//! Sync and notes CLI command handlers
//!
//! Synchronous: run them off the async runtime.

use crate::cli::commands::NotesCommand;
use crate::core::config::Settings;
use crate::core::notes::NoteStore;
use crate::core::workspace::Workspace;
use crate::error::Result;

/// Run one sync and print what was committed
pub fn handle_sync(settings: &Settings, message: &str) -> Result<()> {
    let workspace = Workspace::open(settings)?;
    let report = workspace.sync(message)?;

    println!("✓ Synced: {}", report.commit_message);
    if report.changes.is_empty() {
        println!("  No local changes.");
    } else {
        println!("  {} file(s) changed.", report.changes.len());
    }
    for failure in &report.absorbed {
        println!("  ! {} step did not complete: {}", failure.stage, failure.error.trim());
    }
    Ok(())
}

/// Handle note commands
pub fn handle_notes(command: NotesCommand, settings: &Settings) -> Result<()> {
    match command {
        NotesCommand::List => {
            let notes = NoteStore::new(&settings.notes_dir).list()?;
            if notes.is_empty() {
                println!("No notes in {}", settings.notes_dir.display());
            }
            for note in notes {
                println!("{}", note);
            }
            Ok(())
        }
    }
}
