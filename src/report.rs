//! Decoding of PHP_CodeSniffer's JSON report.
//!
//! `phpcs --report=json` emits a document shaped like
//!
//! ```json
//! {
//!   "totals": { "errors": 1, "warnings": 0, "fixable": 0 },
//!   "files": {
//!     "/repo/src/a.php": {
//!       "errors": 1,
//!       "warnings": 0,
//!       "messages": [
//!         {
//!           "message": "Missing doc comment",
//!           "source": "Squiz.Commenting.FunctionComment.Missing",
//!           "severity": 5,
//!           "fixable": false,
//!           "type": "ERROR",
//!           "line": 12,
//!           "column": 5
//!         }
//!       ]
//!     }
//!   }
//! }
//! ```
//!
//! Only `files` and the fields of each message are read. File order and
//! message order are kept as they appear in the document.

use error_set::error_set;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::PathBuf;

error_set! {
    /// Errors from decoding a style-checker report
    ReportError := {
        /// Report text is not a JSON document of the expected shape
        #[display("Invalid report: {message}")]
        InvalidJson { message: String },
        /// A file entry in the report could not be decoded
        #[display("Invalid report entry for {file}: {message}")]
        InvalidFile { file: String, message: String },
    }
}

/// Severity of a finding, as reported in the message's `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Warning => write!(f, "WARNING"),
        }
    }
}

/// A single violation reported at a line of a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// 1-based line number
    pub line: u32,
    #[serde(rename = "type")]
    pub severity: Severity,
    pub message: String,
    /// Identifier of the sniff that produced the finding
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    #[serde(default)]
    pub fixable: bool,
}

/// All findings the report holds for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileViolations {
    pub path: PathBuf,
    pub findings: Vec<Finding>,
}

/// Findings of a whole report, in report order
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ViolationReport {
    files: Vec<FileViolations>,
}

#[derive(Deserialize)]
struct RawReport {
    #[serde(default)]
    files: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
struct RawFile {
    #[serde(default)]
    messages: Vec<Finding>,
}

impl ViolationReport {
    /// Decode a JSON report.
    ///
    /// Blank text, a missing or null `files` key and an empty `files` object
    /// all decode to an empty report.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] if the text is not JSON or a message lacks
    /// one of `line`, `type`, `message` and `source`.
    pub fn from_json(text: &str) -> Result<Self, ReportError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }

        let raw: RawReport =
            serde_json::from_str(text).map_err(|e| ReportError::InvalidJson {
                message: e.to_string(),
            })?;

        raw.files
            .unwrap_or_default()
            .into_iter()
            .map(|(file, value)| {
                let raw_file: RawFile =
                    serde_json::from_value(value).map_err(|e| ReportError::InvalidFile {
                        file: file.clone(),
                        message: e.to_string(),
                    })?;
                Ok::<_, ReportError>(FileViolations {
                    path: PathBuf::from(file),
                    findings: raw_file.messages,
                })
            })
            .collect()
    }

    #[must_use]
    pub fn files(&self) -> &[FileViolations] {
        &self.files
    }

    /// Total number of findings across all files
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.iter().map(|file| file.findings.len()).sum()
    }

    /// True when no file carries a finding
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.iter().all(|file| file.findings.is_empty())
    }
}

impl FromIterator<FileViolations> for ViolationReport {
    fn from_iter<T: IntoIterator<Item = FileViolations>>(iter: T) -> Self {
        Self {
            files: iter.into_iter().collect(),
        }
    }
}
