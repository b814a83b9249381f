//! Application configuration management
//!
//! Handles loading and saving service settings:
//! - Where notes and the credential file live
//! - HTTP listen address
//! - Sync branch and git command timeout
//! - OAuth app parameters for the device flow

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{NotesError, Result};

/// GitHub OAuth App Client ID used for the device flow
pub const DEFAULT_CLIENT_ID: &str = "Ov23liq3HVgaBCjZ6Pda";

/// Base URL of GitHub's OAuth endpoints
pub const DEFAULT_OAUTH_BASE_URL: &str = "https://github.com/login";

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Root of the note working copy
    #[serde(default = "default_notes_dir")]
    pub notes_dir: PathBuf,

    /// JSON file holding repo URL, token and identity
    #[serde(default = "default_credentials_file")]
    pub credentials_file: PathBuf,

    /// Address the HTTP API binds to
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Branch pulled from and pushed to
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Upper bound for a single git command, in seconds
    #[serde(default = "default_git_timeout")]
    pub git_timeout_secs: u64,

    /// Base URL for `/device/code` and `/oauth/access_token`
    #[serde(default = "default_oauth_base_url")]
    pub oauth_base_url: String,

    /// OAuth App client ID
    #[serde(default = "default_client_id")]
    pub client_id: String,

    /// OAuth App client secret, sent with token polls when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
}

fn default_notes_dir() -> PathBuf {
    PathBuf::from("./notes")
}

fn default_credentials_file() -> PathBuf {
    PathBuf::from("./config.json")
}

fn default_listen_addr() -> String {
    "127.0.0.1:3286".to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_git_timeout() -> u64 {
    120
}

fn default_oauth_base_url() -> String {
    DEFAULT_OAUTH_BASE_URL.to_string()
}

fn default_client_id() -> String {
    DEFAULT_CLIENT_ID.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            notes_dir: default_notes_dir(),
            credentials_file: default_credentials_file(),
            listen_addr: default_listen_addr(),
            branch: default_branch(),
            git_timeout_secs: default_git_timeout(),
            oauth_base_url: default_oauth_base_url(),
            client_id: default_client_id(),
            client_secret: None,
        }
    }
}

impl Settings {
    /// Load settings from the config directory, or defaults if not present
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&contents)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Get the settings file path
    pub fn config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "notesync", "notesync")
            .ok_or_else(|| NotesError::Config("Could not determine config directory".into()))?;

        Ok(project_dirs.config_dir().join("config.toml"))
    }

    /// Timeout applied to each git invocation
    pub fn git_timeout(&self) -> Duration {
        Duration::from_secs(self.git_timeout_secs)
    }
}
