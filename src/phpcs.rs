use crate::GitPhpcsError;
use crate::provider::ReportProvider;
use error_set::error_set;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

error_set! {
    /// Errors from running PHP_CodeSniffer
    PhpcsError := {
        #[display("Failed to run {program}: {message}")]
        SpawnFailed { program: String, message: String },
        #[display("{program} exited with status {code}: {stderr}")]
        ExitError { program: String, code: i32, stderr: String },
        #[display("{program} was terminated by a signal")]
        Terminated { program: String },
        #[display("Invalid UTF-8 in {program} output: {message}")]
        InvalidUtf8 { program: String, message: String },
    }
}

/// Highest exit status phpcs uses to say it ran and found something.
///
/// Older releases exit 1 for errors and 2 for warnings; newer ones combine
/// found (1) and fixable (2) bits into 0 to 3.
const MAX_REPORT_STATUS: i32 = 3;

/// Project-local install location, relative to the repository root
const VENDOR_PHPCS: &str = "vendor/bin/phpcs";

/// Runs `phpcs --report=json` over the changed files
#[derive(Debug, Clone)]
pub struct Phpcs {
    program: PathBuf,
    standard: Option<String>,
    exclude: Option<String>,
    /// Working directory, so project rulesets are picked up
    dir: PathBuf,
}

impl Phpcs {
    #[must_use]
    pub fn new(program: PathBuf, dir: PathBuf) -> Self {
        Self {
            program,
            standard: None,
            exclude: None,
            dir,
        }
    }

    #[must_use]
    pub fn with_standard(mut self, standard: Option<String>) -> Self {
        self.standard = standard;
        self
    }

    #[must_use]
    pub fn with_exclude(mut self, exclude: Option<String>) -> Self {
        self.exclude = exclude;
        self
    }

    /// Pick the phpcs executable: `explicit` if given, else the project's
    /// composer install under `root`, else `phpcs` from `PATH`
    #[must_use]
    pub fn locate(root: &Path, explicit: Option<&Path>) -> PathBuf {
        if let Some(program) = explicit {
            return program.to_path_buf();
        }
        let vendored = root.join(VENDOR_PHPCS);
        if vendored.is_file() {
            return vendored;
        }
        PathBuf::from("phpcs")
    }

    /// Arguments for checking `files`
    #[must_use]
    pub fn args(&self, files: &[PathBuf]) -> Vec<String> {
        let mut args = vec!["-s".to_string(), "--report=json".to_string()];
        if let Some(standard) = &self.standard {
            args.push(format!("--standard={standard}"));
        }
        if let Some(exclude) = &self.exclude {
            args.push(format!("--exclude={exclude}"));
        }
        args.extend(files.iter().map(|file| file.to_string_lossy().into_owned()));
        args
    }

    fn run(&self, files: &[PathBuf]) -> Result<String, PhpcsError> {
        let program = self.program.to_string_lossy().into_owned();
        let args = self.args(files);
        debug!(program, ?args, "running phpcs");

        let output = Command::new(&self.program)
            .args(&args)
            .current_dir(&self.dir)
            .output()
            .map_err(|e| PhpcsError::SpawnFailed {
                program: program.clone(),
                message: e.to_string(),
            })?;

        match output.status.code() {
            Some(code) if (0..=MAX_REPORT_STATUS).contains(&code) => {
                debug!(code, "phpcs finished");
            }
            Some(code) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(PhpcsError::ExitError {
                    program,
                    code,
                    stderr: stderr.trim_end().to_string(),
                });
            }
            None => return Err(PhpcsError::Terminated { program }),
        }

        String::from_utf8(output.stdout).map_err(|e| PhpcsError::InvalidUtf8 {
            program,
            message: e.to_string(),
        })
    }
}

impl ReportProvider for Phpcs {
    fn report(&self, files: &[PathBuf]) -> Result<String, GitPhpcsError> {
        Ok(self.run(files)?)
    }
}
