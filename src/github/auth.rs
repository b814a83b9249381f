//! OAuth Device Flow authentication for GitHub
//!
//! Implements the OAuth 2.0 Device Authorization Grant used to obtain the
//! token that is embedded in the `origin` URL.
//! See: https://docs.github.com/en/apps/oauth-apps/building-oauth-apps/authorizing-oauth-apps#device-flow
//!
//! Two ways to drive it:
//! - `poll` is a single stateless request. HTTP clients call it repeatedly
//!   and own the cadence.
//! - `wait_for_token` loops on behalf of the CLI, honoring the interval,
//!   `slow_down` and the code's expiry, and stops when cancelled.

use std::time::{Duration, Instant};

use reqwest::Client;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::core::config::Settings;
use crate::core::workspace::Workspace;
use crate::error::{NotesError, Result};

/// OAuth scope needed to push to the notes repository
const OAUTH_SCOPES: &str = "repo";

/// Grant type for device-code token requests
const DEVICE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// Extra wait GitHub asks for on `slow_down`
const SLOW_DOWN_STEP: Duration = Duration::from_secs(5);

/// Upper bound for a single provider request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

fn default_interval() -> u64 {
    5
}

/// Device code response from GitHub
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSession {
    /// The device verification code
    pub device_code: String,
    /// The user-facing code to enter on GitHub
    pub user_code: String,
    /// The URL where users should enter the code
    pub verification_uri: String,
    /// Time in seconds until the codes expire
    pub expires_in: u64,
    /// Minimum polling interval in seconds
    #[serde(default = "default_interval")]
    pub interval: u64,
}

/// Decoded result of one token poll
#[derive(Debug, Clone)]
pub enum PollOutcome {
    /// The user authorized the device
    Token(SecretString),
    /// Not yet authorized; poll again later
    Pending {
        slow_down: bool,
        /// Interval the provider asked for, if it sent one
        interval: Option<u64>,
    },
    /// The provider refused (`expired_token`, `access_denied`, ...)
    Rejected {
        error: String,
        description: Option<String>,
    },
}

/// A started device flow: the provider's JSON and the decoded session
#[derive(Debug, Clone)]
pub struct DeviceStart {
    pub raw: Value,
    pub session: DeviceSession,
}

/// One token poll: the provider's JSON and what it means
#[derive(Debug, Clone)]
pub struct TokenPoll {
    pub raw: Value,
    pub outcome: PollOutcome,
}

/// Device code request body
#[derive(Serialize)]
struct DeviceCodeRequest<'a> {
    client_id: &'a str,
    scope: &'a str,
}

/// Token request body
#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    device_code: &'a str,
    grant_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_secret: Option<&'a str>,
}

/// Decode a token endpoint response body
pub fn parse_token_response(raw: &Value) -> Result<PollOutcome> {
    if let Some(token) = raw.get("access_token").and_then(Value::as_str) {
        if !token.is_empty() {
            return Ok(PollOutcome::Token(SecretString::from(token.to_string())));
        }
    }

    let Some(error) = raw.get("error").and_then(Value::as_str) else {
        return Err(NotesError::Upstream(
            "token response had neither access_token nor error".to_string(),
        ));
    };

    let outcome = match error {
        "authorization_pending" => PollOutcome::Pending {
            slow_down: false,
            interval: None,
        },
        "slow_down" => PollOutcome::Pending {
            slow_down: true,
            interval: raw.get("interval").and_then(Value::as_u64),
        },
        other => PollOutcome::Rejected {
            error: other.to_string(),
            description: raw
                .get("error_description")
                .and_then(Value::as_str)
                .map(str::to_string),
        },
    };
    Ok(outcome)
}

fn upstream(context: &str, err: impl std::fmt::Display) -> NotesError {
    NotesError::Upstream(format!("{}: {}", context, err))
}

/// Resolves once `cancel` carries `true`; never if the sender goes away
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    loop {
        if *cancel.borrow_and_update() {
            return;
        }
        if cancel.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// OAuth Device Flow client
pub struct DeviceFlowClient {
    client: Client,
    base_url: String,
    client_id: String,
    client_secret: Option<String>,
}

impl DeviceFlowClient {
    /// Create a client for the OAuth app described by `settings`
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::with_base_url(
            &settings.oauth_base_url,
            &settings.client_id,
            settings.client_secret.clone(),
        )
    }

    /// Create a client against an arbitrary provider base URL
    pub fn with_base_url(
        base_url: &str,
        client_id: &str,
        client_secret: Option<String>,
    ) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.filter(|s| !s.is_empty()),
        })
    }

    /// Request a device code
    ///
    /// Never touches the credential store.
    pub async fn start(&self) -> Result<DeviceSession> {
        Ok(self.start_session().await?.session)
    }

    /// Request a device code, keeping the provider's response as sent
    pub async fn start_session(&self) -> Result<DeviceStart> {
        let request = DeviceCodeRequest {
            client_id: &self.client_id,
            scope: OAUTH_SCOPES,
        };

        let response = self
            .client
            .post(format!("{}/device/code", self.base_url))
            .header("Accept", "application/json")
            .form(&request)
            .send()
            .await
            .map_err(|e| upstream("device code request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotesError::Upstream(format!(
                "device code request returned {}: {}",
                status,
                body.trim()
            )));
        }

        let raw: Value = response
            .json()
            .await
            .map_err(|e| upstream("could not decode device code response", e))?;
        let session: DeviceSession = serde_json::from_value(raw.clone()).map_err(|e| {
            NotesError::Upstream(format!("device code response is missing fields: {}", e))
        })?;
        debug!(user_code = %session.user_code, expires_in = session.expires_in, "device code issued");
        Ok(DeviceStart { raw, session })
    }

    /// Ask once whether the user has authorized `device_code`
    pub async fn poll(&self, device_code: &str) -> Result<TokenPoll> {
        let request = TokenRequest {
            client_id: &self.client_id,
            device_code,
            grant_type: DEVICE_GRANT_TYPE,
            client_secret: self.client_secret.as_deref(),
        };

        let response = self
            .client
            .post(format!("{}/oauth/access_token", self.base_url))
            .header("Accept", "application/json")
            .form(&request)
            .send()
            .await
            .map_err(|e| upstream("token request failed", e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| upstream("token response unreadable", e))?;
        let raw: Value = serde_json::from_str(&text).map_err(|_| {
            NotesError::Upstream(format!(
                "token endpoint returned {} with an undecodable body",
                status
            ))
        })?;

        let outcome = parse_token_response(&raw)?;
        Ok(TokenPoll { raw, outcome })
    }

    /// Poll once and store a granted token in the workspace
    ///
    /// Only waits for the workspace lock when there is a token to write.
    pub async fn poll_and_store(&self, workspace: &Workspace, device_code: &str) -> Result<TokenPoll> {
        let poll = self.poll(device_code).await?;
        if let PollOutcome::Token(token) = &poll.outcome {
            workspace.store_token(token).await?;
        }
        Ok(poll)
    }

    /// Poll until the user authorizes, the code expires or `cancel` fires
    pub async fn wait_for_token(
        &self,
        session: &DeviceSession,
        mut cancel: watch::Receiver<bool>,
    ) -> Result<SecretString> {
        let mut interval = Duration::from_secs(session.interval);
        let deadline = Instant::now() + Duration::from_secs(session.expires_in);

        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = cancelled(&mut cancel) => {
                    info!("device authorization cancelled");
                    return Err(NotesError::Cancelled);
                }
            }

            if Instant::now() > deadline {
                return Err(NotesError::AuthenticationExpired);
            }

            match self.poll(&session.device_code).await?.outcome {
                PollOutcome::Token(token) => return Ok(token),
                PollOutcome::Pending {
                    slow_down: false, ..
                } => continue,
                PollOutcome::Pending {
                    slow_down: true,
                    interval: requested,
                } => {
                    let requested = requested.map(Duration::from_secs).unwrap_or_default();
                    interval = (interval + SLOW_DOWN_STEP).max(requested);
                    debug!(interval_secs = interval.as_secs(), "provider asked to slow down");
                }
                PollOutcome::Rejected { error, description } => {
                    warn!(%error, "device authorization rejected");
                    return Err(match error.as_str() {
                        "expired_token" => NotesError::AuthenticationExpired,
                        "access_denied" => NotesError::AuthenticationFailed(
                            "Authorization was denied by the user".to_string(),
                        ),
                        _ => NotesError::AuthenticationFailed(description.unwrap_or(error)),
                    });
                }
            }
        }
    }
}
