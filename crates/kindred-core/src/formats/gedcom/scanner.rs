// SPDX-License-Identifier: AGPL-3.0-or-later
//! Line scanner and lookahead cursor
//!
//! A line is `LEVEL [@XREF@] TAG [VALUE]`. Scanning never fails: lines that
//! do not fit that shape are dropped.

/// Marker wrapping cross-reference ids on both ends
pub const XREF_MARKER: char = '@';

/// One scanned line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// 1-based line number in the input
    pub number: usize,
    pub level: u32,
    pub xref: Option<&'a str>,
    pub tag: &'a str,
    pub value: &'a str,
}

impl Line<'_> {
    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }
}

/// Split the first whitespace-delimited token off `s`
fn split_token(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    match s.find(char::is_whitespace) {
        Some(i) => Some((&s[..i], s[i..].trim())),
        None => Some((s, "")),
    }
}

/// Scan a single line. Returns `None` for empty or tagless lines and for
/// lines whose level is not a number.
pub fn scan_line(number: usize, raw: &str) -> Option<Line<'_>> {
    let (level_token, rest) = split_token(raw)?;
    let level = level_token.parse::<u32>().ok()?;
    let (first, rest) = split_token(rest)?;

    if first.starts_with(XREF_MARKER) {
        if let Some((tag, value)) = split_token(rest) {
            return Some(Line {
                number,
                level,
                xref: Some(strip_xref(first)),
                tag,
                value,
            });
        }
    }

    Some(Line {
        number,
        level,
        xref: None,
        tag: first,
        value: rest,
    })
}

/// Scan every line of `input`
pub fn scan(input: &str) -> Vec<Line<'_>> {
    input
        .lines()
        .enumerate()
        .filter_map(|(i, raw)| scan_line(i + 1, raw))
        .collect()
}

/// Strip the cross-reference markers from `@ID@`. Values without markers
/// are returned trimmed.
pub fn strip_xref(token: &str) -> &str {
    token.trim().trim_matches(XREF_MARKER)
}

/// Restartable cursor over scanned lines
#[derive(Debug, Clone)]
pub struct Cursor<'l, 'a> {
    lines: &'l [Line<'a>],
    pos: usize,
}

impl<'l, 'a> Cursor<'l, 'a> {
    pub fn new(lines: &'l [Line<'a>]) -> Self {
        Self { lines, pos: 0 }
    }

    /// Lines following the current position nested deeper than `level`,
    /// without advancing the cursor
    pub fn subtree(&self, level: u32) -> Subtree<'l, 'a> {
        Subtree {
            lines: self.lines,
            pos: self.pos,
            level,
        }
    }

    /// Advance past every line nested deeper than `level`
    pub fn skip_subtree(&mut self, level: u32) {
        let consumed = self.subtree(level).count();
        self.pos += consumed;
    }
}

impl<'l, 'a> Iterator for Cursor<'l, 'a> {
    type Item = &'l Line<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.lines.get(self.pos)?;
        self.pos += 1;
        Some(line)
    }
}

/// Lines nested under a parent line; stops at the first line whose level is
/// not greater than the parent's
#[derive(Debug, Clone)]
pub struct Subtree<'l, 'a> {
    lines: &'l [Line<'a>],
    pos: usize,
    level: u32,
}

impl<'l, 'a> Iterator for Subtree<'l, 'a> {
    type Item = &'l Line<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.lines.get(self.pos).filter(|l| l.level > self.level)?;
        self.pos += 1;
        Some(line)
    }
}

impl<'l, 'a> Subtree<'l, 'a> {
    /// First `DATE` value in this subtree. With `direct_only`, only lines
    /// exactly one level below the parent are considered.
    pub fn find_date(self, direct_only: bool) -> Option<&'a str> {
        let parent = self.level;
        self.filter(|line| !direct_only || line.level == parent + 1)
            .find(|line| line.is_tag("DATE"))
            .map(|line| line.value)
    }
}
