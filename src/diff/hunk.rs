use nom::{
    IResult, Parser,
    bytes::complete::tag,
    character::complete::{char, u32 as line_number},
    combinator::{map, opt},
    sequence::{delimited, preceded},
};
use std::fmt;
use std::ops::Range;

/// One side of a hunk header: `start` or `start,count`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HunkRange {
    pub start: u32,
    /// Number of lines covered; `1` when the header omits it
    pub count: u32,
}

impl HunkRange {
    /// Line numbers covered by this range.
    ///
    /// Empty for a zero count (pure deletion on this side) and for a zero
    /// start, which only appears together with a zero count in valid diffs.
    #[must_use]
    pub fn lines(&self) -> Range<u32> {
        if self.start == 0 || self.count == 0 {
            return 0..0;
        }
        self.start..self.start.saturating_add(self.count)
    }
}

impl fmt::Display for HunkRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.count {
            1 => write!(f, "{}", self.start),
            n => write!(f, "{},{}", self.start, n),
        }
    }
}

/// Parsed `@@ -old +new @@` header of a single hunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HunkHeader {
    pub old: HunkRange,
    pub new: HunkRange,
}

impl HunkHeader {
    /// Parse a hunk header line.
    ///
    /// Anything after the closing `@@` (git's function context) is ignored.
    /// Returns `None` when the line does not follow the header grammar.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        header(line).ok().map(|(_, header)| header)
    }

    /// Lines in the new version of the file touched by this hunk
    #[must_use]
    pub fn added_lines(&self) -> Range<u32> {
        self.new.lines()
    }
}

impl fmt::Display for HunkHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@@ -{} +{} @@", self.old, self.new)
    }
}

fn range(input: &str) -> IResult<&str, HunkRange> {
    map(
        (line_number, opt(preceded(char(','), line_number))),
        |(start, count)| HunkRange {
            start,
            count: count.unwrap_or(1),
        },
    )
    .parse(input)
}

fn header(input: &str) -> IResult<&str, HunkHeader> {
    map(
        (
            preceded(tag("@@ -"), range),
            delimited(tag(" +"), range, tag(" @@")),
        ),
        |(old, new)| HunkHeader { old, new },
    )
    .parse(input)
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    proptest! {
        /// An explicit new-side count covers exactly `count` consecutive lines
        #[test]
        fn counted_range_is_contiguous(
            a in 0..10_000u32,
            b in 0..500u32,
            c in 1..10_000u32,
            d in 1..500u32,
        ) {
            let header = HunkHeader::parse(&format!("@@ -{a},{b} +{c},{d} @@")).unwrap();
            let lines: BTreeSet<u32> = header.added_lines().collect();
            let expected: BTreeSet<u32> = (c..c + d).collect();
            prop_assert_eq!(lines, expected);
        }

        /// An omitted new-side count means exactly the start line
        #[test]
        fn omitted_count_is_single_line(a in 0..10_000u32, c in 1..10_000u32) {
            let header = HunkHeader::parse(&format!("@@ -{a} +{c} @@")).unwrap();
            prop_assert_eq!(header.added_lines().collect::<Vec<_>>(), vec![c]);
        }

        /// A zero new-side count never contributes lines
        #[test]
        fn zero_count_is_empty(a in 0..10_000u32, b in 0..500u32, c in 0..10_000u32) {
            let header = HunkHeader::parse(&format!("@@ -{a},{b} +{c},0 @@")).unwrap();
            prop_assert_eq!(header.added_lines().count(), 0);
        }
    }
}
