//! GitHub integration module
//!
//! This module provides the GitHub-facing side of the sync engine:
//! - OAuth Device Flow authentication
//! - Token owner lookup for the commit identity
//! - Opening the verification page in a browser

pub mod auth;
pub mod client;
pub mod error_handler;

pub use auth::{DeviceFlowClient, DeviceSession, DeviceStart, PollOutcome, TokenPoll};
pub use client::{fill_identity_from_github, GitHubClient, GitHubIdentity};
pub use error_handler::open_browser;
