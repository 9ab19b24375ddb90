use crate::config::RefSelection;
use crate::provider::{DiffProvider, resolve_path};
use crate::{GitCommandError, GitPhpcsError};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// The two versions of the code a diff is taken between
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparison {
    /// Uncommitted changes against `HEAD`
    WorkingTree,
    /// Changes from `base` to `current`
    Refs { base: String, current: String },
}

impl Comparison {
    /// Turn a ref selection into concrete revisions, asking git in `dir`
    /// for whatever the selection leaves open.
    ///
    /// # Errors
    ///
    /// Returns [`GitCommandError`] when git fails or no fork point exists.
    pub fn resolve(dir: &Path, refs: &RefSelection) -> Result<Self, GitCommandError> {
        if refs.changes {
            return Ok(Comparison::WorkingTree);
        }

        let current = match &refs.current_branch {
            Some(branch) => branch.clone(),
            None => current_branch(dir)?,
        };
        let current = refs.remote(&current);

        let base = match &refs.base_branch {
            Some(branch) => refs.remote(branch),
            None => fork_point(dir, &refs.fork_base, &current)?,
        };

        debug!(base, current, "resolved comparison");
        Ok(Comparison::Refs { base, current })
    }

    /// Revision arguments for `git diff`
    #[must_use]
    pub fn args(&self) -> Vec<&str> {
        match self {
            Comparison::WorkingTree => vec!["HEAD"],
            Comparison::Refs { base, current } => vec![base.as_str(), current.as_str()],
        }
    }
}

/// Name of the checked-out branch, `HEAD` when detached
///
/// # Errors
///
/// Returns [`GitCommandError`] if git cannot be run in `dir`.
pub fn current_branch(dir: &Path) -> Result<String, GitCommandError> {
    let branch = run_git(dir, ["branch", "--show-current"])?;
    let branch = branch.trim();
    Ok(if branch.is_empty() { "HEAD" } else { branch }.to_string())
}

/// Commit where `branch` forked off `base`
///
/// # Errors
///
/// Returns [`GitCommandError::NoForkPoint`] when git finds none.
pub fn fork_point(dir: &Path, base: &str, branch: &str) -> Result<String, GitCommandError> {
    fork_point_sha(
        run_git(dir, ["merge-base", "--fork-point", base, branch]),
        base,
        branch,
    )
}

/// `merge-base --fork-point` exits non-zero or prints nothing when there is
/// no fork point; failing to run git at all is reported as is
fn fork_point_sha(
    output: Result<String, GitCommandError>,
    base: &str,
    branch: &str,
) -> Result<String, GitCommandError> {
    let no_fork_point = || GitCommandError::NoForkPoint {
        base: base.to_string(),
        branch: branch.to_string(),
    };
    let sha = match output {
        Err(GitCommandError::ExitError { .. }) => return Err(no_fork_point()),
        other => other?,
    };
    let sha = sha.trim();
    if sha.is_empty() {
        return Err(no_fork_point());
    }
    Ok(sha.to_string())
}

/// Root of the working tree containing `dir`
///
/// # Errors
///
/// Returns [`GitCommandError`] if `dir` is not inside a git repository.
pub fn toplevel(dir: &Path) -> Result<PathBuf, GitCommandError> {
    let root = PathBuf::from(run_git(dir, ["rev-parse", "--show-toplevel"])?.trim_end());
    Ok(fs::canonicalize(&root).unwrap_or(root))
}

/// Changes of a git repository, read with the `git` command line
#[derive(Debug, Clone)]
pub struct GitDiff {
    root: PathBuf,
    comparison: Comparison,
}

impl GitDiff {
    /// Diff the repository containing `dir`
    ///
    /// # Errors
    ///
    /// Returns [`GitCommandError`] if `dir` is not inside a git repository.
    pub fn open(dir: &Path, comparison: Comparison) -> Result<Self, GitCommandError> {
        Ok(Self {
            root: toplevel(dir)?,
            comparison,
        })
    }
}

impl DiffProvider for GitDiff {
    fn root(&self) -> &Path {
        &self.root
    }

    fn changed_files(&self) -> Result<Vec<PathBuf>, GitPhpcsError> {
        let mut args = vec![
            "diff",
            "--name-only",
            "-z",
            "--no-renames",
            "--diff-filter=d",
        ];
        args.extend(self.comparison.args());

        let output = run_git(&self.root, &args)?;
        Ok(output
            .split('\0')
            .filter(|name| !name.is_empty())
            .map(|name| resolve_path(&self.root, name))
            .collect())
    }

    fn file_diff(&self, file: &Path) -> Result<String, GitPhpcsError> {
        let mut args = vec![
            OsStr::new("diff"),
            OsStr::new("-U0"),
            OsStr::new("--no-color"),
            OsStr::new("--no-ext-diff"),
            OsStr::new("--no-renames"),
        ];
        args.extend(self.comparison.args().into_iter().map(OsStr::new));
        args.push(OsStr::new("--"));
        args.push(file.as_os_str());

        Ok(run_git(&self.root, &args)?)
    }
}

/// Run git in `dir` and return its standard output
fn run_git<I, S>(dir: &Path, args: I) -> Result<String, GitCommandError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<S> = args.into_iter().collect();
    let command = args
        .iter()
        .map(|arg| arg.as_ref().to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ");
    debug!(dir = %dir.display(), command, "running git");

    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(&args)
        .output()
        .map_err(|e| GitCommandError::SpawnFailed {
            command: command.clone(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GitCommandError::ExitError {
            command,
            stderr: stderr.trim_end().to_string(),
        });
    }

    String::from_utf8(output.stdout).map_err(|e| GitCommandError::InvalidUtf8 {
        command,
        message: e.to_string(),
    })
}
