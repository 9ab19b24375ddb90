pub mod file;
pub mod full;
pub mod hunk;

pub use file::{FileDiff, Hunk};
pub use full::{Diff, FileSection};
pub use hunk::{HunkHeader, HunkRange};

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Changed line numbers of every file in a diff, keyed by absolute path
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChangedLines {
    files: HashMap<PathBuf, HashSet<u32>>,
}

impl ChangedLines {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the changed lines of one file.
    ///
    /// A file recorded twice keeps the union of both sets.
    pub fn insert(&mut self, path: PathBuf, lines: HashSet<u32>) {
        self.files.entry(path).or_default().extend(lines);
    }

    /// Changed lines of `path`, if the file was recorded
    #[must_use]
    pub fn lines(&self, path: &Path) -> Option<&HashSet<u32>> {
        self.files.get(path)
    }

    #[must_use]
    pub fn contains(&self, path: &Path, line: u32) -> bool {
        self.lines(path).is_some_and(|lines| lines.contains(&line))
    }

    /// Number of changed lines across all files
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.values().map(HashSet::len).sum()
    }

    /// True when no file has a single changed line, even if files were recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.values().all(HashSet::is_empty)
    }
}

impl FromIterator<(PathBuf, HashSet<u32>)> for ChangedLines {
    fn from_iter<T: IntoIterator<Item = (PathBuf, HashSet<u32>)>>(iter: T) -> Self {
        let mut changed = Self::new();
        for (path, lines) in iter {
            changed.insert(path, lines);
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(lines: &[u32]) -> HashSet<u32> {
        lines.iter().copied().collect()
    }

    #[test]
    fn files_are_independent() {
        let changed: ChangedLines = [
            (PathBuf::from("/repo/a.php"), set(&[1, 2])),
            (PathBuf::from("/repo/b.php"), set(&[7])),
        ]
        .into_iter()
        .collect();

        assert!(changed.contains(Path::new("/repo/a.php"), 2));
        assert!(!changed.contains(Path::new("/repo/a.php"), 7));
        assert!(changed.contains(Path::new("/repo/b.php"), 7));
        assert!(!changed.contains(Path::new("/repo/c.php"), 1));
        assert_eq!(changed.len(), 3);
    }

    #[test]
    fn repeated_insert_unions() {
        let mut changed = ChangedLines::new();
        changed.insert(PathBuf::from("a.php"), set(&[1, 2]));
        changed.insert(PathBuf::from("a.php"), set(&[2, 3]));
        assert_eq!(changed.lines(Path::new("a.php")), Some(&set(&[1, 2, 3])));
    }

    #[test]
    fn files_without_lines_are_empty() {
        let mut changed = ChangedLines::new();
        assert!(changed.is_empty());

        changed.insert(PathBuf::from("renamed.php"), HashSet::new());
        assert!(changed.is_empty());
        assert_eq!(changed.lines(Path::new("renamed.php")), Some(&HashSet::new()));

        changed.insert(PathBuf::from("edited.php"), set(&[4]));
        assert!(!changed.is_empty());
    }
}
