//! Working-tree change classification and commit message synthesis
//!
//! `classify` turns `git status --porcelain` lines into a `ChangeSet`;
//! `synthesize` turns a `ChangeSet` into the commit message used by sync.

use std::collections::HashSet;

use serde::Serialize;

/// Commit message used when nothing changed and no message was supplied
pub const NO_CHANGES_MESSAGE: &str = "Auto sync: no changes detected";

/// Files touched since the last commit, bucketed by kind
///
/// Order inside each bucket follows the status listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    pub added: Vec<String>,
    pub modified: Vec<String>,
    pub deleted: Vec<String>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.deleted.is_empty()
    }

    /// Number of files across all buckets
    pub fn len(&self) -> usize {
        self.added.len() + self.modified.len() + self.deleted.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Added,
    Modified,
    Deleted,
}

/// Classify porcelain status lines
///
/// Each line is a two-character status code, a space, then the path. Lines
/// shorter than three characters are skipped. Precedence is first match:
/// untracked (`??`) or any `A` is added, else any `M` is modified, else any
/// `D` is deleted. Any other code (`UU` after a conflicted rebase, `T`) is
/// counted as modified.
///
/// Renames and copies (`R`/`C`) are recognised before that precedence: the
/// `old -> new` form is split, the new path is added and, for a rename, the
/// old path is deleted. A path only ever lands in one bucket; later
/// occurrences of an already classified path are ignored.
pub fn classify<I, S>(lines: I) -> ChangeSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut changes = ChangeSet::default();
    let mut seen = HashSet::new();

    let mut push = |changes: &mut ChangeSet, kind: Kind, path: String| {
        if path.is_empty() || !seen.insert(path.clone()) {
            return;
        }
        match kind {
            Kind::Added => changes.added.push(path),
            Kind::Modified => changes.modified.push(path),
            Kind::Deleted => changes.deleted.push(path),
        }
    };

    for line in lines {
        let line = line.as_ref().trim_end();
        if line.len() < 3 {
            continue;
        }
        let (Some(code), Some(rest)) = (line.get(..2), line.get(2..)) else {
            continue;
        };
        let rest = rest.trim();

        if code.contains('R') || code.contains('C') {
            if let Some((old, new)) = rest.split_once(" -> ") {
                push(&mut changes, Kind::Added, unquote(new));
                if code.contains('R') {
                    push(&mut changes, Kind::Deleted, unquote(old));
                }
                continue;
            }
        }

        let kind = if code == "??" || code.contains('A') {
            Kind::Added
        } else if code.contains('M') {
            Kind::Modified
        } else if code.contains('D') {
            Kind::Deleted
        } else {
            Kind::Modified
        };
        push(&mut changes, kind, unquote(rest));
    }

    changes
}

/// Undo git's C-style quoting of unusual paths (`"a \"b\".md"`)
fn unquote(path: &str) -> String {
    let path = path.trim();
    let Some(inner) = path
        .strip_prefix('"')
        .and_then(|p| p.strip_suffix('"'))
    else {
        return path.to_string();
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Build the sync commit message
///
/// Produces `Added: a, b; Updated: c; Deleted: d`, leaving out empty
/// buckets. The user message is only used when nothing changed; any
/// detected change always wins over it.
pub fn synthesize(changes: &ChangeSet, user_message: &str) -> String {
    let parts: Vec<String> = [
        ("Added", &changes.added),
        ("Updated", &changes.modified),
        ("Deleted", &changes.deleted),
    ]
    .into_iter()
    .filter(|(_, files)| !files.is_empty())
    .map(|(label, files)| format!("{}: {}", label, files.join(", ")))
    .collect();

    if !parts.is_empty() {
        parts.join("; ")
    } else if !user_message.trim().is_empty() {
        user_message.to_string()
    } else {
        NO_CHANGES_MESSAGE.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(added: &[&str], modified: &[&str], deleted: &[&str]) -> ChangeSet {
        let owned = |v: &[&str]| -> Vec<String> { v.iter().map(|s| s.to_string()).collect() };
        ChangeSet {
            added: owned(added),
            modified: owned(modified),
            deleted: owned(deleted),
        }
    }

    #[test]
    fn test_classify_basic_codes() {
        let changes = classify([
            "?? new.md",
            "A  staged.md",
            " M edited.md",
            "M  index-edited.md",
            " D gone.md",
            "D  removed.md",
        ]);
        assert_eq!(changes.added, vec!["new.md", "staged.md"]);
        assert_eq!(changes.modified, vec!["edited.md", "index-edited.md"]);
        assert_eq!(changes.deleted, vec!["gone.md", "removed.md"]);
    }

    #[test]
    fn test_classify_precedence_added_over_modified() {
        // Added in the index then edited in the worktree
        let changes = classify(["AM draft.md", "MD odd.md"]);
        assert_eq!(changes.added, vec!["draft.md"]);
        assert_eq!(changes.modified, vec!["odd.md"]);
        assert!(changes.deleted.is_empty());
    }

    #[test]
    fn test_classify_skips_short_and_blank_lines() {
        let changes = classify(["", "M", "??", "   ", "?? ok.md"]);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes.added, vec!["ok.md"]);
    }

    #[test]
    fn test_classify_rename_splits_paths() {
        let changes = classify(["R  old/name.md -> new/name.md", "C  a.md -> b.md"]);
        assert_eq!(changes.added, vec!["new/name.md", "b.md"]);
        assert_eq!(changes.deleted, vec!["old/name.md"]);
        assert!(changes.modified.is_empty());
    }

    #[test]
    fn test_classify_unquotes_paths() {
        let changes = classify([r#"?? "my \"quoted\" note.md""#, "?? plain note.md"]);
        assert_eq!(changes.added, vec![r#"my "quoted" note.md"#, "plain note.md"]);
    }

    #[test]
    fn test_classify_each_path_in_exactly_one_bucket() {
        let lines = [
            "?? a.md", " M b.md", " D c.md", "AM a.md", "M  b.md", "D  d.md", "?? e.md",
            " M e.md", "UU f.md", " T g.md", "", "x",
        ];
        let changes = classify(lines);

        let mut all: Vec<&String> = changes
            .added
            .iter()
            .chain(&changes.modified)
            .chain(&changes.deleted)
            .collect();
        let total = all.len();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), total, "a path appeared in more than one bucket");

        let expected: HashSet<&str> =
            ["a.md", "b.md", "c.md", "d.md", "e.md", "f.md", "g.md"].into();
        let actual: HashSet<&str> = all.iter().map(|s| s.as_str()).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_classify_conflicted_path_is_modified() {
        let changes = classify(["UU conflict.md", "?? a.md"]);
        assert_eq!(changes.added, vec!["a.md"]);
        assert_eq!(changes.modified, vec!["conflict.md"]);
        assert!(changes.deleted.is_empty());
    }

    #[test]
    fn test_synthesize_single_bucket() {
        assert_eq!(synthesize(&set(&["a.md"], &[], &[]), ""), "Added: a.md");
    }

    #[test]
    fn test_synthesize_all_buckets() {
        let changes = set(&["a", "b"], &["c"], &["d"]);
        assert_eq!(
            synthesize(&changes, ""),
            "Added: a, b; Updated: c; Deleted: d"
        );
    }

    #[test]
    fn test_synthesize_fallbacks() {
        assert_eq!(synthesize(&ChangeSet::default(), ""), NO_CHANGES_MESSAGE);
        assert_eq!(synthesize(&ChangeSet::default(), "hello"), "hello");
    }

    #[test]
    fn test_synthesize_overrides_user_message() {
        let changes = set(&["a"], &["b"], &[]);
        assert_eq!(synthesize(&changes, "ignored"), "Added: a; Updated: b");
    }
}
