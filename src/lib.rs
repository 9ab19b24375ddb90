use error_set::error_set;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub mod config;
pub mod diff;
pub mod filter;
pub mod git;
pub mod patch;
pub mod phpcs;
pub mod provider;
pub mod render;
pub mod report;

pub use config::{Config, RefSelection};
pub use diff::{ChangedLines, FileDiff};
pub use filter::{FileFindings, FilteredReport, filter};
pub use git::{Comparison, GitDiff};
pub use patch::PatchDiff;
pub use phpcs::{Phpcs, PhpcsError};
pub use provider::{DiffProvider, ReportProvider};
pub use report::{Finding, ReportError, Severity, ViolationReport};

error_set! {
    /// Top-level error for git-phpcs operations
    GitPhpcsError := {
        ReportError(ReportError),
        PhpcsError(PhpcsError),
    } || GitCommandError

    /// Errors from git command execution
    GitCommandError := {
        #[display("Failed to run git {command}: {message}")]
        SpawnFailed { command: String, message: String },
        #[display("git {command} failed: {stderr}")]
        ExitError { command: String, stderr: String },
        #[display("Invalid UTF-8 in git {command} output: {message}")]
        InvalidUtf8 { command: String, message: String },
        #[display("No fork point between {base} and {branch}")]
        NoForkPoint { base: String, branch: String },
    }
}

/// Terminal result of checking a diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing changed between the compared versions
    NoFiles,
    /// Files changed, but none of them has an added or modified line
    NoChangedLines,
    /// The style checker found nothing in the changed files
    NoViolations,
    /// Violations exist, but none of them is on a changed line
    NoViolationsOnChangedLines,
    /// Violations on changed lines
    Violations(FilteredReport),
}

/// Check the changes described by `diff` against the findings of `report`.
///
/// # Errors
///
/// Returns [`GitPhpcsError`] only when a provider fails or the report cannot
/// be decoded. Empty inputs are reported through [`Outcome`].
pub fn check(
    diff: &dyn DiffProvider,
    report: &dyn ReportProvider,
) -> Result<Outcome, GitPhpcsError> {
    let files = diff.changed_files()?;
    if files.is_empty() {
        info!("no changed files");
        return Ok(Outcome::NoFiles);
    }
    info!(files = files.len(), "collecting changed lines");

    let changed = changed_lines(diff, &files)?;
    if changed.is_empty() {
        info!("no changed lines");
        return Ok(Outcome::NoChangedLines);
    }

    let violations = ViolationReport::from_json(&report.report(&files)?)?;
    if violations.is_empty() {
        info!("no violations in changed files");
        return Ok(Outcome::NoViolations);
    }
    debug!(findings = violations.len(), "decoded report");

    let filtered = filter(&changed, &violations);
    if filtered.is_empty() {
        info!("no violations on changed lines");
        return Ok(Outcome::NoViolationsOnChangedLines);
    }

    info!(findings = filtered.len(), "violations on changed lines");
    Ok(Outcome::Violations(filtered))
}

/// Build the changed-line set of every file, one file diff at a time
///
/// # Errors
///
/// Returns [`GitPhpcsError`] if the diff of any file cannot be obtained.
pub fn changed_lines(
    diff: &dyn DiffProvider,
    files: &[PathBuf],
) -> Result<ChangedLines, GitPhpcsError> {
    files
        .iter()
        .map(|file| {
            let lines = FileDiff::parse(&diff.file_diff(file)?).changed_lines();
            debug!(file = %file.display(), lines = lines.len(), "changed lines");
            Ok::<_, GitPhpcsError>((file.clone(), lines))
        })
        .collect()
}

/// Run a full check from a resolved configuration.
///
/// Uses `patch` as the diff when given, otherwise asks git for the changes
/// selected by `config.refs`. The repository containing `dir` anchors
/// relative paths and the default phpcs location.
///
/// # Errors
///
/// Returns [`GitPhpcsError`] when git or phpcs fail.
pub fn run(config: &Config, dir: &Path, patch: Option<&str>) -> Result<Outcome, GitPhpcsError> {
    let diff: Box<dyn DiffProvider> = match patch {
        Some(text) => {
            let root = git::toplevel(dir).unwrap_or_else(|_| dir.to_path_buf());
            Box::new(PatchDiff::new(&root, text))
        }
        None => Box::new(GitDiff::open(dir, Comparison::resolve(dir, &config.refs)?)?),
    };

    let root = diff.root().to_path_buf();
    let phpcs = Phpcs::new(Phpcs::locate(&root, config.phpcs.as_deref()), root)
        .with_standard(config.standard.clone())
        .with_exclude(config.exclude.clone());

    check(diff.as_ref(), &phpcs)
}
