//! The sync state machine
//!
//! `Idle → Staging → Committing → Rebasing → Pushing → Synced | Failed`
//!
//! Each stage reports a `Step`. Commit and rebase failures are absorbed so
//! that remote-only changes are still pulled and local commits still pushed;
//! a failed `git add` or push ends the run. A git timeout always ends the
//! run, whatever the stage, so a hung remote is not waited on twice.
//!
//! The orchestrator holds no lock itself: callers run it inside the
//! workspace critical section (`Workspace::sync`).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::core::changes::{classify, synthesize, ChangeSet};
use crate::core::credentials::Credential;
use crate::core::git::GitCli;
use crate::error::{NotesError, Result};

/// Stages of a sync run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStage {
    Staging,
    Committing,
    Rebasing,
    Pushing,
}

impl SyncStage {
    pub const ORDER: [SyncStage; 4] = [
        SyncStage::Staging,
        SyncStage::Committing,
        SyncStage::Rebasing,
        SyncStage::Pushing,
    ];
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncStage::Staging => "staging",
            SyncStage::Committing => "committing",
            SyncStage::Rebasing => "rebasing",
            SyncStage::Pushing => "pushing",
        };
        f.write_str(name)
    }
}

/// Result of one stage transition
#[derive(Debug)]
pub enum Step {
    /// Stage succeeded, continue
    Advanced,
    /// Stage failed, logged and skipped
    Absorbed(NotesError),
    /// Stage failed, the run ends here
    Halted(NotesError),
}

impl Step {
    /// Failure policy for stages whose errors may be skipped
    fn absorb(err: NotesError) -> Self {
        match err {
            NotesError::GitTimeout { .. } => Step::Halted(err),
            other => Step::Absorbed(other),
        }
    }
}

/// A failure that was logged but did not stop the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbsorbedFailure {
    pub stage: SyncStage,
    pub error: String,
}

/// Details of a successful sync
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub commit_message: String,
    pub changes: ChangeSet,
    pub absorbed: Vec<AbsorbedFailure>,
    pub finished_at: DateTime<Utc>,
}

/// Final state of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Synced,
    Failed,
}

/// Outcome surfaced to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncResult {
    pub status: SyncStatus,
    pub message: String,
}

impl From<&Result<SyncReport>> for SyncResult {
    fn from(outcome: &Result<SyncReport>) -> Self {
        match outcome {
            Ok(report) => SyncResult {
                status: SyncStatus::Synced,
                message: report.commit_message.clone(),
            },
            Err(e) => SyncResult {
                status: SyncStatus::Failed,
                message: e.to_string(),
            },
        }
    }
}

/// Runs stage → commit → rebase-pull → push against one working copy
pub struct SyncOrchestrator<'a> {
    git: GitCli<'a>,
    branch: &'a str,
}

impl<'a> SyncOrchestrator<'a> {
    pub fn new(git: GitCli<'a>, branch: &'a str) -> Self {
        Self { git, branch }
    }

    /// Reconcile the working copy with `origin`
    ///
    /// Fails with `ConfigMissing` before touching git when no remote or
    /// token is configured.
    pub fn run(&self, credential: &Credential, user_message: &str) -> Result<SyncReport> {
        if !credential.is_sync_ready() {
            return Err(NotesError::ConfigMissing);
        }

        let mut report = SyncReport {
            commit_message: String::new(),
            changes: ChangeSet::default(),
            absorbed: Vec::new(),
            finished_at: Utc::now(),
        };

        for stage in SyncStage::ORDER {
            let step = match stage {
                SyncStage::Staging => self.stage(&mut report, user_message),
                SyncStage::Committing => self.commit(&report.commit_message),
                SyncStage::Rebasing => self.rebase(),
                SyncStage::Pushing => self.push(),
            };

            match step {
                Step::Advanced => debug!(%stage, "sync stage done"),
                Step::Absorbed(e) => {
                    warn!(%stage, error = %e, "sync stage failed, continuing");
                    report.absorbed.push(AbsorbedFailure {
                        stage,
                        error: e.to_string(),
                    });
                }
                Step::Halted(e) => {
                    error!(%stage, error = %e, "sync failed");
                    return Err(e);
                }
            }
        }

        report.finished_at = Utc::now();
        info!(
            message = %report.commit_message,
            files = report.changes.len(),
            absorbed = report.absorbed.len(),
            "sync complete"
        );
        Ok(report)
    }

    /// Snapshot status, build the message, then `git add .`
    fn stage(&self, report: &mut SyncReport, user_message: &str) -> Step {
        match self.git.run(&["status", "--porcelain"]) {
            Ok(output) => report.changes = classify(output.stdout.lines()),
            Err(e @ NotesError::GitTimeout { .. }) => return Step::Halted(e),
            // Treated as an empty listing
            Err(e) => {
                warn!(error = %e, "could not read status, assuming no changes");
                report.absorbed.push(AbsorbedFailure {
                    stage: SyncStage::Staging,
                    error: e.to_string(),
                });
            }
        }
        report.commit_message = synthesize(&report.changes, user_message);

        match self.git.run(&["add", "."]) {
            Ok(_) => Step::Advanced,
            Err(e) => Step::Halted(e),
        }
    }

    /// Commit staged changes; "nothing to commit" is expected and absorbed
    fn commit(&self, message: &str) -> Step {
        match self.git.run(&["commit", "-m", message]) {
            Ok(_) => Step::Advanced,
            Err(e) => Step::absorb(e),
        }
    }

    /// Replay local commits on top of the remote branch
    ///
    /// A failed rebase is left as is (no `rebase --abort`); the following
    /// push will then fail and report the real problem.
    fn rebase(&self) -> Step {
        match self.git.run(&["pull", "--rebase", "origin", self.branch]) {
            Ok(_) => Step::Advanced,
            Err(e) => Step::absorb(e),
        }
    }

    fn push(&self) -> Step {
        match self.git.run(&["push", "origin", self.branch]) {
            Ok(_) => Step::Advanced,
            Err(e) => Step::Halted(e),
        }
    }
}
