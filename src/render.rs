use crate::Outcome;
use crate::filter::FilteredReport;
use crate::report::Severity;
use colored::{ColoredString, Colorize};
use std::fmt::Write;

/// Human-readable text for an outcome, colored when `color` is set
#[must_use]
pub fn render(outcome: &Outcome, color: bool) -> String {
    let paint = |text: &str, style: fn(&str) -> ColoredString| {
        if color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    };

    match outcome {
        Outcome::NoFiles => format!("{}\n", paint("There are no files to check.", |s| s.red())),
        Outcome::NoChangedLines => {
            format!("{}\n", paint("There are no lines to check.", |s| s.red()))
        }
        Outcome::NoViolations => format!(
            "{}\n",
            paint("There are no violations on changed files.", |s| s.green())
        ),
        Outcome::NoViolationsOnChangedLines => format!(
            "{}\n",
            paint("There are no violations on changed lines.", |s| s.green())
        ),
        Outcome::Violations(report) => render_violations(report, &paint),
    }
}

fn render_violations(
    report: &FilteredReport,
    paint: &dyn Fn(&str, fn(&str) -> ColoredString) -> String,
) -> String {
    let mut out = String::new();
    for file in &report.files {
        let header = format!("FILE: {}", file.path.display());
        let _ = writeln!(out, "\n{}", paint(&header, |s| s.bold()));

        for finding in &file.findings {
            let severity = finding.severity.to_string();
            let severity = match finding.severity {
                Severity::Error => paint(&severity, |s| s.red()),
                Severity::Warning => paint(&severity, |s| s.yellow()),
            };
            let _ = writeln!(
                out,
                "LINE {} ({}) {} ({})",
                finding.line, severity, finding.message, finding.source
            );
        }
    }
    out
}
