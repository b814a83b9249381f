//! In-memory `GitRunner` for unit tests
//!
//! Models just enough of git for the sync engine: a porcelain status
//! listing, staging, commits, the `origin` remote and scripted failures.
//! Every invocation is recorded, and overlapping invocations are counted
//! so tests can check the workspace lock.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use crate::core::git::{GitOutput, GitRunner};
use crate::error::Result;

#[derive(Default)]
struct RepoState {
    status: String,
    staged: bool,
    commits: Vec<String>,
    remotes: BTreeMap<String, String>,
}

#[derive(Default)]
pub(crate) struct FakeGit {
    calls: Mutex<Vec<String>>,
    state: Mutex<RepoState>,
    failures: Vec<(String, String)>,
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeGit {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Porcelain listing returned by `git status --porcelain`
    pub(crate) fn with_status(self, status: &str) -> Self {
        self.state.lock().unwrap().status = status.to_string();
        self
    }

    /// Make every command starting with `prefix` fail with `stderr`
    pub(crate) fn fail_on(mut self, prefix: &str, stderr: &str) -> Self {
        self.failures.push((prefix.to_string(), stderr.to_string()));
        self
    }

    /// Sleep inside every invocation
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn commits(&self) -> Vec<String> {
        self.state.lock().unwrap().commits.clone()
    }

    pub(crate) fn remotes(&self) -> BTreeMap<String, String> {
        self.state.lock().unwrap().remotes.clone()
    }

    /// Highest number of invocations observed running at once
    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn respond(&self, args: &[String], joined: &str) -> GitOutput {
        if let Some((_, stderr)) = self
            .failures
            .iter()
            .find(|(prefix, _)| joined.starts_with(prefix.as_str()))
        {
            return GitOutput::failed(stderr.clone());
        }

        let mut state = self.state.lock().unwrap();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        match args.as_slice() {
            ["status", "--porcelain"] => GitOutput::ok(state.status.clone()),
            ["add", "."] => {
                state.staged = !state.status.trim().is_empty();
                GitOutput::ok("")
            }
            ["commit", "-m", message] => {
                if !state.staged {
                    return GitOutput {
                        stdout: "nothing to commit, working tree clean\n".to_string(),
                        ..GitOutput::failed("")
                    };
                }
                state.commits.push(message.to_string());
                state.status.clear();
                state.staged = false;
                GitOutput::ok(format!("[main abc1234] {}\n", message))
            }
            ["remote", "remove", name] => match state.remotes.remove(*name) {
                Some(_) => GitOutput::ok(""),
                None => GitOutput::failed(format!("error: No such remote: '{}'\n", name)),
            },
            ["remote", "add", name, url] => {
                if state.remotes.contains_key(*name) {
                    return GitOutput::failed(format!(
                        "error: remote {} already exists.\n",
                        name
                    ));
                }
                state.remotes.insert(name.to_string(), url.to_string());
                GitOutput::ok("")
            }
            _ => GitOutput::ok(""),
        }
    }
}

impl GitRunner for FakeGit {
    fn run(&self, args: &[String], _workdir: &Path) -> Result<GitOutput> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        let joined = args.join(" ");
        self.calls.lock().unwrap().push(joined.clone());
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        let output = self.respond(args, &joined);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(output)
    }
}
