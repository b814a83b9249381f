//! Markdown note files under the notes root
//!
//! Plain file I/O. Paths are relative to the root and always use `/`.
//! The store does not lock; the workspace wraps mutating calls in its
//! critical section.

use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::error::{NotesError, Result};

/// Extension every note carries
pub const NOTE_EXTENSION: &str = ".md";

/// Seeded `.gitignore`: track Markdown files and directories only
const GITIGNORE_CONTENTS: &str = "*\n!*.md\n!*/\n";

/// File-system note store rooted at one directory
#[derive(Debug, Clone)]
pub struct NoteStore {
    root: PathBuf,
}

impl NoteStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root directory and seed `.gitignore` if missing
    pub fn ensure_layout(&self) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        let gitignore = self.root.join(".gitignore");
        if !gitignore.exists() {
            fs::write(&gitignore, GITIGNORE_CONTENTS)?;
            debug!(path = %gitignore.display(), "seeded .gitignore");
        }
        Ok(())
    }

    /// All notes, as sorted relative paths
    pub fn list(&self) -> Result<Vec<String>> {
        let mut notes = Vec::new();
        if self.root.exists() {
            self.collect(&self.root, &mut notes)?;
        }
        notes.sort();
        Ok(notes)
    }

    fn collect(&self, dir: &Path, notes: &mut Vec<String>) -> Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if entry.file_name() == ".git" {
                continue;
            }
            if entry.file_type()?.is_dir() {
                self.collect(&path, notes)?;
            } else if entry
                .file_name()
                .to_string_lossy()
                .ends_with(NOTE_EXTENSION)
            {
                if let Ok(rel) = path.strip_prefix(&self.root) {
                    notes.push(to_slash(rel));
                }
            }
        }
        Ok(())
    }

    /// Content of one note
    pub fn read(&self, path: &str) -> Result<String> {
        let full = self.resolve(path)?;
        fs::read_to_string(&full).map_err(|e| match e.kind() {
            ErrorKind::NotFound => NotesError::NotFound(path.to_string()),
            _ => e.into(),
        })
    }

    /// Create or overwrite a note, appending `.md` when missing
    ///
    /// Returns the relative path actually written.
    pub fn write(&self, path: &str, content: &str) -> Result<String> {
        let path = if path.ends_with(NOTE_EXTENSION) {
            path.to_string()
        } else {
            format!("{}{}", path, NOTE_EXTENSION)
        };
        let full = self.resolve(&path)?;
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&full, content)?;
        Ok(path)
    }

    /// Remove a note; a missing note is not an error
    pub fn delete(&self, path: &str) -> Result<()> {
        let full = self.resolve(path)?;
        match fs::remove_file(&full) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Move or rename a note (or folder), creating the destination folder
    pub fn rename(&self, old_path: &str, new_path: &str) -> Result<()> {
        let from = self.resolve(old_path)?;
        let to = self.resolve(new_path)?;
        if !from.exists() {
            return Err(NotesError::NotFound(old_path.to_string()));
        }
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(&from, &to)?;
        Ok(())
    }

    /// Map a relative note path to a location under the root
    ///
    /// Rejects empty, absolute and parent-escaping paths.
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        if path.trim().is_empty() {
            return Err(NotesError::InvalidInput("Note path is empty".to_string()));
        }
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(NotesError::InvalidInput(format!(
                "Invalid note path: {}",
                path
            )));
        }
        Ok(self.root.join(relative))
    }
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_ensure_layout_seeds_gitignore_once() {
        let dir = tempdir().unwrap();
        let store = NoteStore::new(dir.path().join("notes"));
        store.ensure_layout().unwrap();

        let gitignore = store.root().join(".gitignore");
        assert_eq!(fs::read_to_string(&gitignore).unwrap(), "*\n!*.md\n!*/\n");

        fs::write(&gitignore, "custom\n").unwrap();
        store.ensure_layout().unwrap();
        assert_eq!(fs::read_to_string(&gitignore).unwrap(), "custom\n");
    }

    #[test]
    fn test_write_list_read() {
        let dir = tempdir().unwrap();
        let store = NoteStore::new(dir.path());

        assert_eq!(store.write("journal/monday", "# Monday").unwrap(), "journal/monday.md");
        store.write("inbox.md", "todo").unwrap();
        fs::write(dir.path().join("image.png"), [0u8; 4]).unwrap();
        fs::create_dir_all(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git").join("HEAD.md"), "x").unwrap();

        assert_eq!(store.list().unwrap(), vec!["inbox.md", "journal/monday.md"]);
        assert_eq!(store.read("journal/monday.md").unwrap(), "# Monday");
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let store = NoteStore::new(dir.path());
        assert!(matches!(store.read("nope.md"), Err(NotesError::NotFound(_))));
    }

    #[test]
    fn test_rejects_escaping_paths() {
        let dir = tempdir().unwrap();
        let store = NoteStore::new(dir.path());
        assert!(matches!(
            store.write("../outside", "x"),
            Err(NotesError::InvalidInput(_))
        ));
        assert!(matches!(
            store.read("/etc/passwd"),
            Err(NotesError::InvalidInput(_))
        ));
        assert!(matches!(store.delete(""), Err(NotesError::InvalidInput(_))));
    }

    #[test]
    fn test_delete_missing_is_ok() {
        let dir = tempdir().unwrap();
        let store = NoteStore::new(dir.path());
        store.delete("ghost.md").unwrap();
    }

    #[test]
    fn test_rename_creates_destination_folder() {
        let dir = tempdir().unwrap();
        let store = NoteStore::new(dir.path());
        store.write("a.md", "content").unwrap();

        store.rename("a.md", "archive/2024/a.md").unwrap();
        assert_eq!(store.list().unwrap(), vec!["archive/2024/a.md"]);
        assert!(matches!(
            store.rename("a.md", "b.md"),
            Err(NotesError::NotFound(_))
        ));
    }
}
