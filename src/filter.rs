use crate::diff::ChangedLines;
use crate::report::{Finding, ViolationReport};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::PathBuf;

/// Findings of one file that sit on changed lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFindings {
    pub path: PathBuf,
    /// At most one finding per line, in the order lines first appear in the report
    pub findings: Vec<Finding>,
}

/// Report restricted to changed lines
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FilteredReport {
    pub files: Vec<FileFindings>,
}

impl FilteredReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of findings across all files
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.iter().map(|file| file.findings.len()).sum()
    }
}

/// Keep only the findings whose line changed in their file.
///
/// Files missing from `changed` have no changed lines. Files left without
/// findings are omitted. When several findings share a line, the last one
/// wins but keeps the position where the line first appeared.
#[must_use]
pub fn filter(changed: &ChangedLines, report: &ViolationReport) -> FilteredReport {
    let files = report
        .files()
        .iter()
        .filter_map(|file| {
            let lines = changed.lines(&file.path)?;

            let mut findings: Vec<Finding> = Vec::new();
            let mut slots: HashMap<u32, usize> = HashMap::new();
            for finding in file.findings.iter().filter(|f| lines.contains(&f.line)) {
                match slots.entry(finding.line) {
                    Entry::Occupied(slot) => findings[*slot.get()] = finding.clone(),
                    Entry::Vacant(slot) => {
                        slot.insert(findings.len());
                        findings.push(finding.clone());
                    }
                }
            }

            (!findings.is_empty()).then(|| FileFindings {
                path: file.path.clone(),
                findings,
            })
        })
        .collect();

    FilteredReport { files }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::report::{FileViolations, Severity};
    use similar_asserts::assert_eq;
    use std::collections::HashSet;

    const SCENARIO_REPORT: &str = r#"{"files":{"a.php":{"messages":[{"line":12,"type":"ERROR","message":"X","source":"Std.Rule"}]}}}"#;

    fn changed(entries: &[(&str, &[u32])]) -> ChangedLines {
        entries
            .iter()
            .map(|(path, lines)| (PathBuf::from(path), lines.iter().copied().collect()))
            .collect()
    }

    fn finding(line: u32, severity: Severity, source: &str) -> Finding {
        Finding {
            line,
            severity,
            message: format!("message on {line}"),
            source: source.to_string(),
            column: None,
            fixable: false,
        }
    }

    fn lines_of(report: &FilteredReport, path: &str) -> Vec<u32> {
        report
            .files
            .iter()
            .find(|f| f.path == PathBuf::from(path))
            .map(|f| f.findings.iter().map(|x| x.line).collect())
            .unwrap_or_default()
    }

    #[test]
    fn finding_on_changed_line_survives() {
        let report = ViolationReport::from_json(SCENARIO_REPORT).unwrap();
        let filtered = filter(&changed(&[("a.php", &[11, 12, 13])]), &report);

        assert_eq!(filtered.files.len(), 1);
        assert_eq!(filtered.files[0].path, PathBuf::from("a.php"));
        assert_eq!(filtered.files[0].findings[0].line, 12);
        assert_eq!(filtered.files[0].findings[0].message, "X");
        assert_eq!(filtered.files[0].findings[0].source, "Std.Rule");
    }

    #[test]
    fn file_without_surviving_findings_is_omitted() {
        let report = ViolationReport::from_json(SCENARIO_REPORT).unwrap();
        let filtered = filter(&changed(&[("a.php", &[1, 2, 3])]), &report);
        assert!(filtered.is_empty());
    }

    #[test]
    fn empty_inputs_give_empty_output() {
        let report = ViolationReport::from_json(SCENARIO_REPORT).unwrap();
        assert!(filter(&ChangedLines::new(), &report).is_empty());

        let empty_report = ViolationReport::from_json("").unwrap();
        assert!(filter(&changed(&[("a.php", &[12])]), &empty_report).is_empty());
    }

    #[test]
    fn file_missing_from_changed_lines_is_dropped() {
        let report: ViolationReport = [
            FileViolations {
                path: PathBuf::from("/repo/a.php"),
                findings: vec![finding(3, Severity::Error, "A")],
            },
            FileViolations {
                path: PathBuf::from("/repo/untouched.php"),
                findings: vec![finding(3, Severity::Error, "A")],
            },
        ]
        .into_iter()
        .collect();

        let filtered = filter(&changed(&[("/repo/a.php", &[3])]), &report);
        assert_eq!(filtered.files.len(), 1);
        assert_eq!(filtered.files[0].path, PathBuf::from("/repo/a.php"));
    }

    #[test]
    fn report_order_is_preserved() {
        let report: ViolationReport = [
            FileViolations {
                path: PathBuf::from("z.php"),
                findings: vec![
                    finding(30, Severity::Warning, "A"),
                    finding(4, Severity::Error, "B"),
                    finding(17, Severity::Error, "C"),
                ],
            },
            FileViolations {
                path: PathBuf::from("a.php"),
                findings: vec![finding(9, Severity::Error, "D"), finding(1, Severity::Error, "E")],
            },
        ]
        .into_iter()
        .collect();

        let filtered = filter(
            &changed(&[("z.php", &[4, 17, 30]), ("a.php", &[1, 9])]),
            &report,
        );

        let paths: Vec<_> = filtered.files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(paths, vec![PathBuf::from("z.php"), PathBuf::from("a.php")]);
        assert_eq!(lines_of(&filtered, "z.php"), vec![30, 4, 17]);
        assert_eq!(lines_of(&filtered, "a.php"), vec![9, 1]);
    }

    #[test]
    fn last_finding_on_a_line_wins() {
        let report: ViolationReport = [FileViolations {
            path: PathBuf::from("a.php"),
            findings: vec![
                finding(5, Severity::Warning, "First"),
                finding(8, Severity::Error, "Other"),
                finding(5, Severity::Error, "Second"),
            ],
        }]
        .into_iter()
        .collect();

        let filtered = filter(&changed(&[("a.php", &[5, 8])]), &report);
        let findings = &filtered.files[0].findings;

        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].line, 5);
        assert_eq!(findings[0].source, "Second");
        assert_eq!(findings[0].severity, Severity::Error);
        assert_eq!(findings[1].source, "Other");
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn non_contiguous_ranges() {
        let report: ViolationReport = [FileViolations {
            path: PathBuf::from("a.php"),
            findings: (1..=40).map(|l| finding(l, Severity::Error, "R")).collect(),
        }]
        .into_iter()
        .collect();

        let lines: HashSet<u32> = (3..=5).chain(20..=21).chain([40]).collect();
        let filtered = filter(&[(PathBuf::from("a.php"), lines)].into_iter().collect(), &report);
        assert_eq!(lines_of(&filtered, "a.php"), vec![3, 4, 5, 20, 21, 40]);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::report::{FileViolations, Severity};
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn arb_finding() -> impl Strategy<Value = Finding> {
        (1..60u32, any::<bool>()).prop_map(|(line, error)| Finding {
            line,
            severity: if error {
                Severity::Error
            } else {
                Severity::Warning
            },
            message: "m".to_string(),
            source: "S".to_string(),
            column: None,
            fixable: false,
        })
    }

    proptest! {
        /// Surviving findings are exactly the distinct report lines that changed
        #[test]
        fn only_changed_lines_survive(
            lines in prop::collection::hash_set(1..60u32, 0..30),
            findings in prop::collection::vec(arb_finding(), 0..50),
        ) {
            let report: ViolationReport = [FileViolations {
                path: PathBuf::from("a.php"),
                findings: findings.clone(),
            }]
            .into_iter()
            .collect();
            let changed: ChangedLines = [(PathBuf::from("a.php"), lines.clone())].into_iter().collect();

            let filtered = filter(&changed, &report);

            for file in &filtered.files {
                for finding in &file.findings {
                    prop_assert!(lines.contains(&finding.line));
                }
            }

            let expected: HashSet<u32> = findings
                .iter()
                .map(|f| f.line)
                .filter(|l| lines.contains(l))
                .collect();
            prop_assert_eq!(filtered.len(), expected.len());
            prop_assert_eq!(filtered.is_empty(), expected.is_empty());
        }
    }
}
