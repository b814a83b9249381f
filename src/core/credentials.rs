//! Credential storage backed by a JSON file
//!
//! Holds the remote repository URL, the GitHub access token and the commit
//! identity. The file is read once at startup and rewritten after every
//! change. In memory the token is kept as a `SecretString` so it never ends
//! up in logs via `Debug`.
//!
//! The store itself does no locking: it lives inside the workspace mutex
//! (see `core::workspace`), and every mutation happens while that lock is
//! held.

use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;

/// Remote access credential and commit identity
#[derive(Debug, Clone)]
pub struct Credential {
    /// Plain repository URL, e.g. `https://github.com/user/notes.git`
    pub repo_url: String,
    /// GitHub access token
    pub token: SecretString,
    /// Commit author name
    pub username: String,
    /// Commit author email
    pub email: String,
}

impl Default for Credential {
    fn default() -> Self {
        Self {
            repo_url: String::new(),
            token: SecretString::from(String::new()),
            username: String::new(),
            email: String::new(),
        }
    }
}

impl Credential {
    /// Both a remote and a token are present, so a sync may be attempted
    pub fn is_sync_ready(&self) -> bool {
        !self.repo_url.is_empty() && !self.token.expose_secret().is_empty()
    }

    /// Whether a token has been stored
    pub fn has_token(&self) -> bool {
        !self.token.expose_secret().is_empty()
    }

    /// Convert to the on-disk format
    pub fn to_stored(&self) -> StoredCredential {
        StoredCredential {
            repo_url: self.repo_url.clone(),
            token: self.token.expose_secret().to_string(),
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }

    /// Same as `to_stored` but with the token masked, for display
    pub fn to_masked(&self) -> StoredCredential {
        StoredCredential {
            token: if self.has_token() {
                CredentialStore::mask_token(&self.token)
            } else {
                String::new()
            },
            ..self.to_stored()
        }
    }
}

impl From<StoredCredential> for Credential {
    fn from(stored: StoredCredential) -> Self {
        Self {
            repo_url: stored.repo_url,
            token: SecretString::from(stored.token),
            username: stored.username,
            email: stored.email,
        }
    }
}

/// Serializable credential format
///
/// Uses plain strings since SecretString doesn't implement Serialize.
/// This is also the JSON body accepted by `POST /api/config`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCredential {
    #[serde(default)]
    pub repo_url: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
}

/// File-backed credential store
#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
    credential: Credential,
}

impl CredentialStore {
    /// Load the credential file, starting empty if it is missing or unreadable
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let credential = match Self::read_file(&path) {
            Ok(Some(stored)) => Credential::from(stored),
            Ok(None) => {
                debug!(path = %path.display(), "no credential file, starting unconfigured");
                Credential::default()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable credential file");
                Credential::default()
            }
        };

        Self { path, credential }
    }

    fn read_file(path: &Path) -> Result<Option<StoredCredential>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    /// Current credential
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the whole credential and persist it
    ///
    /// The file is written first; on failure the in-memory credential is
    /// left untouched.
    pub fn replace(&mut self, credential: Credential) -> Result<()> {
        self.persist(&credential)?;
        self.credential = credential;
        Ok(())
    }

    /// Store a freshly issued access token and persist it
    pub fn store_token(&mut self, token: &str) -> Result<()> {
        let mut next = self.credential.clone();
        next.token = SecretString::from(token.to_string());
        self.replace(next)
    }

    /// Fill in the commit identity where it is still empty
    ///
    /// Returns true if anything changed (and was persisted).
    pub fn fill_identity(&mut self, username: &str, email: &str) -> Result<bool> {
        let mut next = self.credential.clone();
        let mut changed = false;
        if next.username.is_empty() && !username.is_empty() {
            next.username = username.to_string();
            changed = true;
        }
        if next.email.is_empty() && !email.is_empty() {
            next.email = email.to_string();
            changed = true;
        }
        if changed {
            self.replace(next)?;
        }
        Ok(changed)
    }

    /// Forget the token, keeping the repository URL and identity
    pub fn clear_token(&mut self) -> Result<()> {
        let mut next = self.credential.clone();
        next.token = SecretString::from(String::new());
        self.replace(next)
    }

    /// Whether `token` is the masked form of the stored token
    ///
    /// A settings form that round-trips `GET /api/config` posts the mask back.
    pub fn is_masked_echo(&self, token: &SecretString) -> bool {
        self.credential.has_token()
            && token.expose_secret() == Self::mask_token(&self.credential.token)
    }

    /// Write the credential file atomically (temp file + rename)
    fn persist(&self, credential: &Credential) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(&credential.to_stored())?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), "credential file written");
        Ok(())
    }

    /// Get a masked version of a token for display (shows first 4 and last 4 chars)
    pub fn mask_token(token: &SecretString) -> String {
        let exposed = token.expose_secret();
        let count = exposed.chars().count();
        if count <= 8 {
            "*".repeat(count)
        } else {
            let head: String = exposed.chars().take(4).collect();
            let tail: String = exposed.chars().skip(count - 4).collect();
            format!("{}...{}", head, tail)
        }
    }
}
