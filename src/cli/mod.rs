//! CLI module for notesync
//!
//! This module contains all CLI command definitions and handlers using clap.

pub mod auth;
pub mod commands;
pub mod config;
pub mod sync;

pub use commands::{Cli, Commands};
