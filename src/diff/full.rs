use super::file::{FileDiff, unquote};

/// The part of a multi-file diff that belongs to one file
#[derive(Debug, PartialEq, Eq)]
pub struct FileSection {
    /// Path in the new version (from the `+++ b/path` header)
    pub path: String,
    /// Raw diff text of this file, starting at its `diff --git` line
    pub text: String,
}

/// A complete git diff split into per-file sections
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Diff {
    pub files: Vec<FileSection>,
}

impl Diff {
    /// Split complete `git diff` output on its `diff --git` boundaries.
    ///
    /// Deleted files are dropped since they cannot contain changed lines.
    /// Files without hunks (renames, mode changes) keep a section so they
    /// still count as changed.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut files = Vec::new();
        let mut current_file_text = String::new();

        for line in text.lines() {
            if line.starts_with("diff --git ") {
                if let Some(section) = Self::section(&current_file_text) {
                    files.push(section);
                }
                current_file_text = line.to_string();
                current_file_text.push('\n');
            } else if !current_file_text.is_empty() {
                current_file_text.push_str(line);
                current_file_text.push('\n');
            }
        }

        if let Some(section) = Self::section(&current_file_text) {
            files.push(section);
        }

        Diff { files }
    }

    fn section(text: &str) -> Option<FileSection> {
        if text.is_empty() || is_deletion(text) {
            return None;
        }
        let path = FileDiff::parse(text)
            .path
            .or_else(|| text.lines().next().and_then(git_header_path))?;
        Some(FileSection {
            path,
            text: text.to_string(),
        })
    }
}

fn is_deletion(text: &str) -> bool {
    text.lines()
        .take_while(|line| !line.starts_with("@@ "))
        .any(|line| line.starts_with("+++ /dev/null") || line.starts_with("deleted file mode"))
}

/// New-side path from a `diff --git a/<old> b/<new>` line.
///
/// Paths may contain spaces, so the last ` b/` is taken as the separator.
/// Quoted paths (`"b/t\303\244.php"`) are decoded.
fn git_header_path(line: &str) -> Option<String> {
    let rest = line.strip_prefix("diff --git ")?;
    if rest.ends_with('"') {
        let quote_pos = rest.rfind(" \"b/")?;
        return unquote(&rest[quote_pos + 1..])?
            .strip_prefix("b/")
            .map(str::to_string);
    }
    let b_pos = rest.rfind(" b/")?;
    Some(rest[b_pos + 3..].to_string())
}
