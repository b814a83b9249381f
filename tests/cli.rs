//! End-to-end checks of the `notesync` binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// The binary with notes, credentials and config isolated in `dir`
fn notesync(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("notesync").unwrap();
    cmd.env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join("xdg"))
        .env_remove("NOTESYNC_CLIENT_SECRET")
        .env_remove("RUST_LOG")
        .arg("--notes-dir")
        .arg(dir.path().join("notes"))
        .arg("--credentials-file")
        .arg(dir.path().join("config.json"));
    cmd
}

#[test]
fn help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    notesync(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sync"))
        .stdout(predicate::str::contains("auth"));
}

#[test]
fn sync_without_configuration_fails_with_guidance() {
    let dir = TempDir::new().unwrap();
    notesync(&dir)
        .arg("sync")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Git sync is not configured"));
}

#[test]
fn auth_status_when_logged_out() {
    let dir = TempDir::new().unwrap();
    notesync(&dir)
        .args(["auth", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not authenticated"));
}

#[test]
fn config_show_masks_token() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("config.json"),
        r#"{"repoUrl":"https://github.com/u/notes.git","token":"gho_abcdefghijkl","username":"u","email":"u@example.com"}"#,
    )
    .unwrap();

    notesync(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gho_...ijkl"))
        .stdout(predicate::str::contains("gho_abcdefghijkl").not());
}

#[test]
fn notes_list_prints_relative_paths() {
    let dir = TempDir::new().unwrap();
    let notes = dir.path().join("notes");
    std::fs::create_dir_all(notes.join("journal")).unwrap();
    std::fs::write(notes.join("journal").join("monday.md"), "# Monday").unwrap();
    std::fs::write(notes.join("scratch.txt"), "ignored").unwrap();

    notesync(&dir)
        .args(["notes", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("journal/monday.md"))
        .stdout(predicate::str::contains("scratch.txt").not());
}
