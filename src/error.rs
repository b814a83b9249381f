//! Custom error types for notesync
//!
//! User-friendly error messages for all failure scenarios. Messages that wrap
//! a git failure always carry the tool's combined output so the problem can
//! be diagnosed without shell access to the machine running the service.

use thiserror::Error;

/// Main error type for notesync
#[derive(Error, Debug)]
pub enum NotesError {
    /// No remote or token configured yet
    #[error("Git sync is not configured.\n\n  → Connect a GitHub repository in the settings, or run 'notesync auth login' and 'notesync config set'.")]
    ConfigMissing,

    /// A git command exited unsuccessfully
    #[error("`{command}` failed: {output}")]
    Git {
        /// The command line that was run, e.g. `git push origin main`
        command: String,
        /// Combined stdout/stderr of the command
        output: String,
    },

    /// A git command did not finish within the configured timeout
    #[error("`{command}` did not finish within {secs}s and was stopped.\n\n  → Check your network connection and the remote URL.")]
    GitTimeout { command: String, secs: u64 },

    /// The `origin` remote could not be (re)created
    #[error("Could not add remote: {0}\n\n  → Check the repository URL in the settings.")]
    RemoteConfig(String),

    /// OAuth provider call failed or returned something unexpected
    #[error("GitHub request failed: {0}\n\n  → Check your internet connection.")]
    Upstream(String),

    /// Authorization was refused by the user or the provider
    #[error("GitHub authentication failed: {0}\n\n  → Try running 'notesync auth login' again.")]
    AuthenticationFailed(String),

    /// OAuth device code expired before the user authorized it
    #[error("Authentication timed out - the code expired.\n\n  → Run 'notesync auth login' again and complete the process within the time shown.")]
    AuthenticationExpired,

    /// Git repository introspection error
    #[error("Git repository error: {0}")]
    Repository(#[from] git2::Error),

    /// Note or path does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input from user
    #[error("{0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("File operation failed: {0}")]
    Io(#[from] std::io::Error),

    /// Network request error
    #[error("Network request failed: {0}\n\n  → Check your internet connection.")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML serialization/deserialization error
    #[error("Configuration file is invalid: {0}")]
    Toml(String),

    /// Operation cancelled by user
    #[error("Operation cancelled.")]
    Cancelled,
}

impl NotesError {
    /// Build a git failure from the command arguments and its output
    pub fn git(args: &[&str], output: impl Into<String>) -> Self {
        NotesError::Git {
            command: format!("git {}", args.join(" ")),
            output: output.into(),
        }
    }
}

impl From<toml::de::Error> for NotesError {
    fn from(err: toml::de::Error) -> Self {
        NotesError::Toml(err.to_string())
    }
}

impl From<octocrab::Error> for NotesError {
    fn from(err: octocrab::Error) -> Self {
        NotesError::Upstream(err.to_string())
    }
}

/// Result type alias using NotesError
pub type Result<T> = std::result::Result<T, NotesError>;
