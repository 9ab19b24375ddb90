use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Branch whose fork point is the default comparison base
pub const DEFAULT_FORK_BASE: &str = "develop";

/// Dotfile in the home directory holding default `--standard` values
pub const STANDARD_FILE: &str = "standard.phpcs";

/// Dotfile in the home directory holding default `--exclude` values
pub const EXCLUDE_FILE: &str = "exclude.phpcs";

/// Which two versions of the code to compare
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefSelection {
    /// Compare uncommitted changes instead of two branches
    pub changes: bool,
    /// Compare the branches as they are on `origin`
    pub origin: bool,
    /// Defaults to the checked-out branch
    pub current_branch: Option<String>,
    /// Defaults to the fork point of `fork_base` and the current branch
    pub base_branch: Option<String>,
    pub fork_base: String,
}

impl Default for RefSelection {
    fn default() -> Self {
        Self {
            changes: false,
            origin: false,
            current_branch: None,
            base_branch: None,
            fork_base: DEFAULT_FORK_BASE.to_string(),
        }
    }
}

impl RefSelection {
    /// Name of `branch` as it should be compared, `origin/` prefixed when asked
    #[must_use]
    pub fn remote(&self, branch: &str) -> String {
        if self.origin {
            format!("origin/{branch}")
        } else {
            branch.to_string()
        }
    }
}

/// Everything a check run needs to know
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub refs: RefSelection,
    /// Comma-separated coding standards passed as `--standard`
    pub standard: Option<String>,
    /// Comma-separated sniffs passed as `--exclude`
    pub exclude: Option<String>,
    /// Explicit phpcs executable
    pub phpcs: Option<PathBuf>,
}

impl Config {
    /// Fill unset rule selections from the dotfiles in `home`.
    ///
    /// Values given explicitly always win. Missing, unreadable and blank
    /// dotfiles are ignored.
    #[must_use]
    pub fn with_dotfiles(mut self, home: Option<&Path>) -> Self {
        let Some(home) = home else {
            return self;
        };
        if self.standard.is_none() {
            self.standard = read_dotfile(&home.join(STANDARD_FILE));
        }
        if self.exclude.is_none() {
            self.exclude = read_dotfile(&home.join(EXCLUDE_FILE));
        }
        self
    }
}

fn read_dotfile(path: &Path) -> Option<String> {
    let text = fs::read_to_string(path).ok()?;
    let value = text.trim();
    if value.is_empty() {
        return None;
    }
    debug!(path = %path.display(), value, "using dotfile");
    Some(value.to_string())
}
