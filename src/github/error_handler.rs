//! GitHub API error classification
//!
//! Turns octocrab errors into messages a user can act on, and opens the
//! device verification page in a browser.

use once_cell::sync::Lazy;
use regex::Regex;
use std::process::Command;

use crate::error::NotesError;

/// HTTP status GitHub reported, as it appears in octocrab's debug output
static STATUS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"status_code: (\d{3})").expect("Invalid regex pattern for status detection")
});

/// Classifies an octocrab error into a user-facing `NotesError`
pub fn classify_github_error(err: octocrab::Error) -> NotesError {
    // Display only returns "GitHub"; the details live in Debug
    let error_message = format!("{:?}", err);

    if is_rate_limit_error(&error_message) {
        return NotesError::Upstream(
            "API rate limit exceeded. Please wait a few minutes and try again.".to_string(),
        );
    }

    match extract_status(&error_message) {
        Some(401) => NotesError::AuthenticationFailed(
            "GitHub rejected the token (Bad credentials)".to_string(),
        ),
        Some(403) => NotesError::AuthenticationFailed(
            "The token is missing a required scope".to_string(),
        ),
        _ => NotesError::Upstream(error_message),
    }
}

fn extract_status(error_message: &str) -> Option<u16> {
    STATUS_PATTERN
        .captures(error_message)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Check if error is a rate limit error
fn is_rate_limit_error(error_message: &str) -> bool {
    error_message.contains("rate limit")
        || (error_message.contains("403") && error_message.contains("limit exceeded"))
}

/// Attempt to open a URL in the default browser
///
/// Returns true if the browser was successfully launched, false otherwise.
#[allow(unused_variables)]
pub fn open_browser(url: &str) -> bool {
    #[cfg(target_os = "macos")]
    {
        Command::new("open").arg(url).spawn().is_ok()
    }
    #[cfg(target_os = "linux")]
    {
        Command::new("xdg-open").arg(url).spawn().is_ok()
    }
    #[cfg(target_os = "windows")]
    {
        Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .is_ok()
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        false
    }
}
