//! Core functionality for notesync
//!
//! This module contains the sync engine and its supporting pieces:
//! - Settings and the credential file
//! - Git invocation with timeouts and credential redaction
//! - Porcelain status classification and commit messages
//! - Remote binding and the sync state machine
//! - The note store and the shared workspace lock

pub mod changes;
pub mod config;
pub mod credentials;
#[cfg(test)]
pub(crate) mod fake_git;
pub mod git;
pub mod notes;
pub mod remote;
pub mod sync;
pub mod workspace;

pub use changes::{classify, synthesize, ChangeSet};
pub use config::Settings;
pub use credentials::{Credential, CredentialStore};
pub use git::{GitRepository, GitRunner, ProcessGitRunner};
pub use notes::NoteStore;
pub use remote::RemoteBinder;
pub use sync::{SyncOrchestrator, SyncReport, SyncResult};
pub use workspace::Workspace;
