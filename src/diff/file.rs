use super::hunk::HunkHeader;
use std::collections::HashSet;
use tracing::{trace, warn};

/// Largest new-side line count a hunk may announce before it is skipped
pub const MAX_HUNK_LINES: u32 = 1 << 20;

/// One hunk of a file diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub header: HunkHeader,
    /// New-side numbers of the `+` lines, kept only when the body also
    /// carries context lines and the header range would overstate the change
    pub added: Option<Vec<u32>>,
}

impl Hunk {
    fn lines(&self) -> Vec<u32> {
        match &self.added {
            Some(added) => added.clone(),
            None => self.header.added_lines().collect(),
        }
    }
}

/// Hunks of a single file's diff.
///
/// With `-U0` every hunk body consists of exactly the lines its header
/// announces, so the header alone determines which lines of the new file
/// changed. Hunks with context (a plain `git diff`) are narrowed down to
/// their `+` lines.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FileDiff {
    /// Path from the `+++ b/path` header, if the text carried one.
    /// `None` for deleted files and for bare hunk text.
    pub path: Option<String>,
    /// Every well-formed hunk, in diff order
    pub hunks: Vec<Hunk>,
}

impl FileDiff {
    /// Parse the diff text of one file.
    ///
    /// Never fails: text without hunks (renames, mode changes, binary files)
    /// yields no hunks, and malformed or oversized hunk headers are skipped.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut path = None;
        let mut hunks = Vec::new();
        let mut in_header = true;
        let mut body: Option<HunkBody> = None;

        for line in text.lines() {
            if let Some(mut current) = body.take() {
                if current.consume(line) {
                    if current.is_done() {
                        hunks.push(current.finish());
                    } else {
                        body = Some(current);
                    }
                    continue;
                }
                hunks.push(current.finish());
            }

            if line.starts_with("diff --git ") {
                in_header = true;
            } else if line.starts_with("@@ ") {
                in_header = false;
                match HunkHeader::parse(line) {
                    Some(header) if header.new.count > MAX_HUNK_LINES => {
                        warn!(line, "skipping oversized hunk");
                    }
                    Some(header) => {
                        let current = HunkBody::new(header);
                        if current.is_done() {
                            hunks.push(current.finish());
                        } else {
                            body = Some(current);
                        }
                    }
                    None => trace!(line, "skipping malformed hunk header"),
                }
            } else if in_header && let Some(target) = line.strip_prefix("+++ ") {
                path = target_path(target);
            }
            // Extended headers (index, mode, rename) carry no line numbers
        }

        if let Some(current) = body {
            hunks.push(current.finish());
        }

        FileDiff { path, hunks }
    }

    /// Union of the changed new-side lines of all hunks
    #[must_use]
    pub fn changed_lines(&self) -> HashSet<u32> {
        self.hunks.iter().flat_map(Hunk::lines).collect()
    }
}

/// Body of the hunk being read, counted down against its header
struct HunkBody {
    header: HunkHeader,
    next_line: u32,
    old_left: u32,
    new_left: u32,
    added: Vec<u32>,
    has_context: bool,
}

impl HunkBody {
    fn new(header: HunkHeader) -> Self {
        Self {
            header,
            next_line: header.new.start,
            old_left: header.old.count,
            new_left: header.new.count,
            added: Vec::new(),
            has_context: false,
        }
    }

    /// Account for one body line; `false` when the line cannot belong here
    fn consume(&mut self, line: &str) -> bool {
        match line.as_bytes().first() {
            Some(b'+') if self.new_left > 0 => {
                self.added.push(self.next_line);
                self.next_line = self.next_line.saturating_add(1);
                self.new_left -= 1;
            }
            Some(b'-') if self.old_left > 0 => self.old_left -= 1,
            // Some tools strip the leading space of empty context lines
            Some(b' ') | None if self.old_left > 0 && self.new_left > 0 => {
                self.has_context = true;
                self.next_line = self.next_line.saturating_add(1);
                self.old_left -= 1;
                self.new_left -= 1;
            }
            Some(b'\\') => {}
            _ => return false,
        }
        true
    }

    fn is_done(&self) -> bool {
        self.old_left == 0 && self.new_left == 0
    }

    fn finish(self) -> Hunk {
        Hunk {
            header: self.header,
            added: self.has_context.then_some(self.added),
        }
    }
}

/// Path named by a `+++` target.
///
/// Git appends a tab to names containing spaces and C-quotes names with
/// unusual characters. `/dev/null` and other targets without the `b/`
/// prefix name no path.
pub(crate) fn target_path(target: &str) -> Option<String> {
    let target = match target.split_once('\t') {
        Some((name, _)) => name,
        None => target,
    };
    let target = if target.starts_with('"') {
        unquote(target)?
    } else {
        target.to_string()
    };
    target.strip_prefix("b/").map(str::to_string)
}

/// Decode a C-quoted path such as `"b/t\303\244.php"`
pub(crate) fn unquote(quoted: &str) -> Option<String> {
    let inner = quoted.strip_prefix('"')?.strip_suffix('"')?;
    let mut bytes = Vec::with_capacity(inner.len());
    let mut input = inner.bytes();

    while let Some(byte) = input.next() {
        if byte != b'\\' {
            bytes.push(byte);
            continue;
        }
        let escaped = match input.next()? {
            b'a' => 0x07,
            b'b' => 0x08,
            b't' => b'\t',
            b'n' => b'\n',
            b'v' => 0x0b,
            b'f' => 0x0c,
            b'r' => b'\r',
            digit @ b'0'..=b'7' => {
                let mut value = u32::from(digit - b'0');
                for _ in 0..2 {
                    let digit = input.next().filter(u8::is_ascii_digit)?;
                    if digit > b'7' {
                        return None;
                    }
                    value = value * 8 + u32::from(digit - b'0');
                }
                u8::try_from(value).ok()?
            }
            other => other,
        };
        bytes.push(escaped);
    }

    String::from_utf8(bytes).ok()
}
