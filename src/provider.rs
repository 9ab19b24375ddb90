//! Seams between the checking pipeline and the tools that feed it.

use crate::GitPhpcsError;
use std::fs;
use std::path::{Path, PathBuf};

/// Source of the changes to check
pub trait DiffProvider {
    /// Directory that relative paths of this diff are resolved against
    fn root(&self) -> &Path;

    /// Absolute paths of the files that differ between the compared versions
    fn changed_files(&self) -> Result<Vec<PathBuf>, GitPhpcsError>;

    /// Zero-context diff text of a single file
    fn file_diff(&self, file: &Path) -> Result<String, GitPhpcsError>;
}

/// Source of the style-checker report for a set of files
pub trait ReportProvider {
    /// Raw JSON report covering `files`
    fn report(&self, files: &[PathBuf]) -> Result<String, GitPhpcsError>;
}

/// Resolve a diff-relative path to the absolute path the report uses.
///
/// Existing files are canonicalized so symlinked checkouts match the paths
/// the style checker prints; paths that do not exist are joined as-is.
pub fn resolve_path(root: &Path, relative: &str) -> PathBuf {
    let joined = root.join(relative);
    fs::canonicalize(&joined).unwrap_or(joined)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn resolve_existing_file() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/a.php"), "<?php\n").unwrap();

        let resolved = resolve_path(dir.path(), "src/a.php");
        assert!(resolved.is_absolute());
        assert_eq!(resolved, fs::canonicalize(dir.path().join("src/a.php")).unwrap());
    }

    #[test]
    fn resolve_missing_file() {
        let resolved = resolve_path(Path::new("/nonexistent/repo"), "src/gone.php");
        assert_eq!(resolved, PathBuf::from("/nonexistent/repo/src/gone.php"));
    }
}
