//! notesync - a Markdown note store that syncs to GitHub
//!
//! This library provides the sync engine (credential store, device-flow
//! login, remote binding and the stage/commit/rebase/push cycle) together
//! with the HTTP API and CLI built on top of it.

pub mod cli;
pub mod core;
pub mod error;
pub mod github;
pub mod server;

pub use error::{NotesError, Result};
