// SPDX-License-Identifier: AGPL-3.0-or-later
//! Permissive union recovery
//!
//! Hand-edited files often break the nesting rules (a `FAM` header indented
//! under a person, `HUSB` lines at the wrong depth). When the structured pass
//! finds no unions at all, the raw text is scanned again with patterns that
//! ignore levels entirely.

use crate::model::Union;
use once_cell::sync::Lazy;
use regex::Regex;

static UNION_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*\d+\s+@([^@\s]+)@\s+FAM\b").expect("valid union header regex")
});
static RECORD_HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d+\s+@[^@\s]+@\s+\S").expect("valid record header regex"));
static TOP_LEVEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*0\s+\S").expect("valid top level regex"));
static MEMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*\d+\s+(HUSB|WIFE|CHIL)\s+@?([^@\s]+)@?").expect("valid member regex")
});

/// Scan raw lines for union records and their parent/child tags regardless
/// of nesting. A union ends at the next record header or level-0 line.
pub fn recover_unions(input: &str) -> Vec<Union> {
    let mut recovered: Vec<Union> = Vec::new();
    let mut current: Option<Union> = None;

    for raw in input.lines() {
        if let Some(caps) = UNION_HEADER_RE.captures(raw) {
            recovered.extend(current.take());
            current = Some(Union::new(&caps[1]));
            continue;
        }

        if RECORD_HEADER_RE.is_match(raw) || TOP_LEVEL_RE.is_match(raw) {
            recovered.extend(current.take());
            continue;
        }

        let Some(union) = current.as_mut() else {
            continue;
        };
        if let Some(caps) = MEMBER_RE.captures(raw) {
            if caps[1].eq_ignore_ascii_case("CHIL") {
                union.add_child(&caps[2]);
            } else {
                union.add_parent(&caps[2]);
            }
        }
    }
    recovered.extend(current);

    tracing::debug!(count = recovered.len(), "structural recovery finished");
    recovered
}

/// Append recovered unions whose ids are not already present
pub fn merge_unions(existing: &mut Vec<Union>, recovered: Vec<Union>) -> usize {
    let mut added = 0;
    for union in recovered {
        if existing.iter().all(|u| u.id != union.id) {
            existing.push(union);
            added += 1;
        }
    }
    added
}
