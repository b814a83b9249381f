//! GitHub API client wrapper using octocrab
//!
//! Only used to look up who owns a freshly issued token, so commits made by
//! the sync engine carry a real identity.

use octocrab::Octocrab;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use crate::core::workspace::Workspace;
use crate::github::error_handler::classify_github_error;
use crate::error::Result;

/// Login and commit email of a GitHub account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubIdentity {
    pub login: String,
    pub email: String,
}

impl GitHubIdentity {
    /// Identity using GitHub's private noreply address
    pub fn with_noreply_email(login: &str, id: impl std::fmt::Display) -> Self {
        Self {
            login: login.to_string(),
            email: format!("{}+{}@users.noreply.github.com", id, login),
        }
    }
}

/// GitHub API client wrapper
pub struct GitHubClient {
    inner: Octocrab,
}

impl GitHubClient {
    /// Create a client authenticated with `token`
    pub fn new(token: &SecretString) -> Result<Self> {
        let octocrab = Octocrab::builder()
            .personal_token(token.expose_secret().to_string())
            .build()?;
        Ok(Self { inner: octocrab })
    }

    /// Account the token belongs to
    pub async fn identity(&self) -> Result<GitHubIdentity> {
        let user = self
            .inner
            .current()
            .user()
            .await
            .map_err(classify_github_error)?;
        Ok(GitHubIdentity::with_noreply_email(&user.login, user.id))
    }
}

/// Fill the workspace's empty username/email from the token owner
///
/// Best effort: failures are logged and swallowed.
pub async fn fill_identity_from_github(workspace: &Workspace, token: &SecretString) {
    let identity = match GitHubClient::new(token) {
        Ok(client) => client.identity().await,
        Err(e) => Err(e),
    };

    match identity {
        Ok(identity) => match workspace.fill_identity(&identity.login, &identity.email).await {
            Ok(true) => info!(login = %identity.login, "filled commit identity from GitHub"),
            Ok(false) => debug!("commit identity already set"),
            Err(e) => warn!(error = %e, "could not persist commit identity"),
        },
        Err(e) => warn!(error = %e, "GitHub identity lookup failed"),
    }
}
