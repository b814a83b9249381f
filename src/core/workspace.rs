//! The shared service context
//!
//! One `Workspace` is created at startup and shared (`Arc`) by every
//! handler. It owns the credential store behind a single mutex; holding that
//! mutex is the critical section for every mutating operation: note writes,
//! deletes and moves, credential changes, remote configuration and the whole
//! sync run. Two syncs therefore never overlap, and a note edit never lands
//! in the middle of a commit.
//!
//! The synchronous methods use `blocking_lock` and must run off the async
//! executor (`tokio::task::spawn_blocking`). Only `store_token` and
//! `fill_identity` are async, so a device-flow poll never blocks a runtime
//! thread while a sync holds the lock.

use std::path::Path;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

use crate::core::config::Settings;
use crate::core::credentials::{Credential, CredentialStore, StoredCredential};
use crate::core::git::{GitCli, GitRepository, GitRunner, ProcessGitRunner};
use crate::core::notes::NoteStore;
use crate::core::remote::{BindReport, RemoteBinder};
use crate::core::sync::{SyncOrchestrator, SyncReport};
use crate::error::Result;

/// Branch, head commit and remote of the working copy
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GitInfo {
    pub branch: String,
    pub commit: Option<String>,
    pub remote_url: Option<String>,
}

/// Shared state behind the HTTP API and the CLI
pub struct Workspace {
    notes: NoteStore,
    branch: String,
    runner: Arc<dyn GitRunner>,
    credentials: Mutex<CredentialStore>,
}

impl Workspace {
    /// Build a workspace from explicit parts
    pub fn new(
        notes: NoteStore,
        branch: impl Into<String>,
        runner: Arc<dyn GitRunner>,
        credentials: CredentialStore,
    ) -> Self {
        Self {
            notes,
            branch: branch.into(),
            runner,
            credentials: Mutex::new(credentials),
        }
    }

    /// Open the workspace described by `settings`
    ///
    /// Creates the notes directory, seeds `.gitignore` and loads the
    /// credential file.
    pub fn open(settings: &Settings) -> Result<Self> {
        let notes = NoteStore::new(&settings.notes_dir);
        notes.ensure_layout()?;
        let credentials = CredentialStore::load(&settings.credentials_file);
        info!(
            notes_dir = %settings.notes_dir.display(),
            configured = credentials.credential().is_sync_ready(),
            "workspace opened"
        );

        Ok(Self::new(
            notes,
            settings.branch.clone(),
            Arc::new(ProcessGitRunner::new(settings.git_timeout())),
            credentials,
        ))
    }

    pub fn notes(&self) -> &NoteStore {
        &self.notes
    }

    pub fn root(&self) -> &Path {
        self.notes.root()
    }

    fn git(&self) -> GitCli<'_> {
        GitCli::new(self.runner.as_ref(), self.notes.root())
    }

    /// Enter the critical section from a blocking context
    fn lock(&self) -> MutexGuard<'_, CredentialStore> {
        self.credentials.blocking_lock()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Sync engine
    // ─────────────────────────────────────────────────────────────────────────

    /// Run a full sync under the workspace lock
    pub fn sync(&self, user_message: &str) -> Result<SyncReport> {
        let store = self.lock();
        SyncOrchestrator::new(self.git(), &self.branch).run(store.credential(), user_message)
    }

    /// Replace the credential, persist it and rebind `origin`
    ///
    /// An empty token, or the masked form of the stored one, keeps the token
    /// already stored.
    pub fn configure(&self, mut credential: Credential) -> Result<BindReport> {
        let mut store = self.lock();
        if !credential.has_token() || store.is_masked_echo(&credential.token) {
            credential.token = store.credential().token.clone();
        }
        store.replace(credential)?;
        RemoteBinder::new(self.git(), &self.branch).configure(store.credential())
    }

    /// Copy of the current credential
    pub fn credential(&self) -> Credential {
        self.lock().credential().clone()
    }

    /// Current credential with the token masked
    pub fn masked_credential(&self) -> StoredCredential {
        self.lock().credential().to_masked()
    }

    /// Forget the stored token
    pub fn clear_token(&self) -> Result<()> {
        self.lock().clear_token()
    }

    /// Store a device-flow token (async: waits for the lock without blocking)
    pub async fn store_token(&self, token: &SecretString) -> Result<()> {
        let mut store = self.credentials.lock().await;
        store.store_token(token.expose_secret())?;
        info!("stored new GitHub token");
        Ok(())
    }

    /// Fill empty username/email fields (async)
    pub async fn fill_identity(&self, username: &str, email: &str) -> Result<bool> {
        self.credentials.lock().await.fill_identity(username, email)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Notes
    // ─────────────────────────────────────────────────────────────────────────

    pub fn list_notes(&self) -> Result<Vec<String>> {
        self.notes.list()
    }

    pub fn read_note(&self, path: &str) -> Result<String> {
        self.notes.read(path)
    }

    pub fn write_note(&self, path: &str, content: &str) -> Result<String> {
        let _guard = self.lock();
        self.notes.write(path, content)
    }

    pub fn delete_note(&self, path: &str) -> Result<()> {
        let _guard = self.lock();
        self.notes.delete(path)
    }

    pub fn move_note(&self, old_path: &str, new_path: &str) -> Result<()> {
        let _guard = self.lock();
        self.notes.rename(old_path, new_path)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Git introspection
    // ─────────────────────────────────────────────────────────────────────────

    pub fn git_info(&self) -> Result<GitInfo> {
        let repo = GitRepository::open(self.notes.root())?;
        Ok(GitInfo {
            branch: repo.current_branch()?,
            commit: repo.head_commit()?,
            remote_url: repo.origin_url()?,
        })
    }

    /// Whether a note is tracked; false when there is no repository yet
    pub fn is_tracked(&self, path: &str) -> Result<bool> {
        match GitRepository::open(self.notes.root()) {
            Ok(repo) => repo.is_tracked(path),
            Err(_) => Ok(false),
        }
    }
}
