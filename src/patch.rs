use crate::GitPhpcsError;
use crate::diff::Diff;
use crate::provider::{DiffProvider, resolve_path};
use std::path::{Path, PathBuf};

/// Changes read from an existing multi-file diff instead of from git
#[derive(Debug)]
pub struct PatchDiff {
    root: PathBuf,
    /// Absolute path and diff text of every file section, in diff order
    sections: Vec<(PathBuf, String)>,
}

impl PatchDiff {
    /// Split `text` per file, resolving its paths against `root`
    #[must_use]
    pub fn new(root: &Path, text: &str) -> Self {
        let sections = Diff::parse(text)
            .files
            .into_iter()
            .map(|section| (resolve_path(root, &section.path), section.text))
            .collect();
        Self {
            root: root.to_path_buf(),
            sections,
        }
    }
}

impl DiffProvider for PatchDiff {
    fn root(&self) -> &Path {
        &self.root
    }

    fn changed_files(&self) -> Result<Vec<PathBuf>, GitPhpcsError> {
        let mut files: Vec<PathBuf> = Vec::new();
        for (path, _) in &self.sections {
            if !files.contains(path) {
                files.push(path.clone());
            }
        }
        Ok(files)
    }

    fn file_diff(&self, file: &Path) -> Result<String, GitPhpcsError> {
        Ok(self
            .sections
            .iter()
            .filter(|(path, _)| path == file)
            .map(|(_, text)| text.as_str())
            .collect())
    }
}
