// SPDX-License-Identifier: AGPL-3.0-or-later
//! Family graph data model
//!
//! People and unions are flat records keyed by cross-reference id. Edges are
//! stored on both sides: a union lists its parents and children, and a person
//! lists the unions it belongs to. The reference linker and validator keep the
//! two sides consistent.

use serde::{Deserialize, Serialize};

/// Recorded gender of a person
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unknown,
}

impl Gender {
    /// Interpret a `SEX` value. Anything but `M`/`F` is unknown.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            c if c.eq_ignore_ascii_case("m") => Self::Male,
            c if c.eq_ignore_ascii_case("f") => Self::Female,
            _ => Self::Unknown,
        }
    }

    /// Single-letter code used by the line format
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
            Self::Unknown => "U",
        }
    }
}

/// How much of a date was recognised
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DatePrecision {
    #[default]
    Unknown,
    Year,
    Month,
    Day,
}

/// A date as written in the source plus whatever could be extracted from it.
///
/// This is a label, not a calendar value: no validation of month lengths,
/// calendars or time zones is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StructuredDate {
    pub original: String,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub precision: DatePrecision,
    /// `YYYY-MM-DD`, only at day precision
    pub exact_iso: Option<String>,
    /// `YYYY-MM-DD` with missing month/day defaulted to `01`
    pub approx_iso: Option<String>,
}

/// An individual
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    pub name: String,
    pub gender: Gender,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth: Option<StructuredDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub death: Option<StructuredDate>,
    /// Unions this person belongs to, as parent or child. Deduplicated.
    pub unions: Vec<String>,
}

impl Person {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            gender: Gender::Unknown,
            birth: None,
            death: None,
            unions: Vec::new(),
        }
    }

    /// Record membership in a union. Returns false if it was already present.
    pub fn add_union(&mut self, union_id: &str) -> bool {
        push_unique(&mut self.unions, union_id)
    }
}

/// A parents-to-children grouping (marriage or partnership)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Union {
    pub id: String,
    /// Parent ids in first-seen order
    pub parents: Vec<String>,
    pub children: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marriage: Option<StructuredDate>,
}

impl Union {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parents: Vec::new(),
            children: Vec::new(),
            marriage: None,
        }
    }

    pub fn add_parent(&mut self, person_id: &str) -> bool {
        push_unique(&mut self.parents, person_id)
    }

    pub fn add_child(&mut self, person_id: &str) -> bool {
        push_unique(&mut self.children, person_id)
    }

    pub fn has_parent(&self, person_id: &str) -> bool {
        self.parents.iter().any(|p| p == person_id)
    }

    pub fn has_child(&self, person_id: &str) -> bool {
        self.children.iter().any(|c| c == person_id)
    }
}

fn push_unique(list: &mut Vec<String>, id: &str) -> bool {
    if id.is_empty() || list.iter().any(|existing| existing == id) {
        return false;
    }
    list.push(id.to_string());
    true
}

/// The parsed graph of people and unions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FamilyGraph {
    pub people: Vec<Person>,
    pub unions: Vec<Union>,
    /// Preserved raw source (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_source: Option<String>,
}

impl FamilyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn person(&self, id: &str) -> Option<&Person> {
        self.people.iter().find(|p| p.id == id)
    }

    pub fn union(&self, id: &str) -> Option<&Union> {
        self.unions.iter().find(|u| u.id == id)
    }

    /// Unions listing `person_id` as a child
    pub fn unions_as_child<'a>(&'a self, person_id: &'a str) -> impl Iterator<Item = &'a Union> {
        self.unions.iter().filter(move |u| u.has_child(person_id))
    }

    /// Unions listing `person_id` as a parent
    pub fn unions_as_parent<'a>(&'a self, person_id: &'a str) -> impl Iterator<Item = &'a Union> {
        self.unions.iter().filter(move |u| u.has_parent(person_id))
    }

    pub fn parents_of(&self, person_id: &str) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for union in self.unions.iter().filter(|u| u.has_child(person_id)) {
            for parent in &union.parents {
                if !out.contains(&parent.as_str()) {
                    out.push(parent);
                }
            }
        }
        out
    }

    pub fn children_of(&self, person_id: &str) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for union in self.unions.iter().filter(|u| u.has_parent(person_id)) {
            for child in &union.children {
                if !out.contains(&child.as_str()) {
                    out.push(child);
                }
            }
        }
        out
    }

    /// Co-parents of `person_id` across all of their unions
    pub fn spouses_of(&self, person_id: &str) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for union in self.unions.iter().filter(|u| u.has_parent(person_id)) {
            for parent in &union.parents {
                if parent != person_id && !out.contains(&parent.as_str()) {
                    out.push(parent);
                }
            }
        }
        out
    }
}

/// Category of a data-quality problem found while validating references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    DanglingUnionRef,
    DanglingParentRef,
    DanglingChildRef,
}

/// A data-quality problem. Reported as data, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    /// The record holding the bad reference
    pub entity_id: String,
    /// The id that could not be resolved
    pub reference_id: String,
}

impl Diagnostic {
    pub fn dangling_union(person_id: &str, union_id: &str) -> Self {
        Self {
            kind: DiagnosticKind::DanglingUnionRef,
            message: format!("person {person_id} references missing union {union_id}"),
            entity_id: person_id.to_string(),
            reference_id: union_id.to_string(),
        }
    }

    pub fn dangling_parent(union_id: &str, person_id: &str) -> Self {
        Self {
            kind: DiagnosticKind::DanglingParentRef,
            message: format!("union {union_id} references missing parent {person_id}"),
            entity_id: union_id.to_string(),
            reference_id: person_id.to_string(),
        }
    }

    pub fn dangling_child(union_id: &str, person_id: &str) -> Self {
        Self {
            kind: DiagnosticKind::DanglingChildRef,
            message: format!("union {union_id} references missing child {person_id}"),
            entity_id: union_id.to_string(),
            reference_id: person_id.to_string(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Destination for diagnostics produced during a call
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Everything a parse produces: the validated graph plus its diagnostics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseOutcome {
    #[serde(flatten)]
    pub graph: FamilyGraph,
    pub diagnostics: Vec<Diagnostic>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FamilyGraph {
        let mut f1 = Union::new("F1");
        f1.add_parent("I1");
        f1.add_parent("I2");
        f1.add_child("I3");
        let mut f2 = Union::new("F2");
        f2.add_parent("I3");
        f2.add_parent("I4");
        f2.add_child("I5");
        FamilyGraph {
            people: ["I1", "I2", "I3", "I4", "I5"].into_iter().map(Person::new).collect(),
            unions: vec![f1, f2],
            raw_source: None,
        }
    }

    #[test]
    fn test_push_unique_dedups() {
        let mut union = Union::new("F1");
        assert!(union.add_child("I1"));
        assert!(!union.add_child("I1"));
        assert!(!union.add_child(""));
        assert_eq!(union.children, vec!["I1"]);
    }

    #[test]
    fn test_gender_codes() {
        assert_eq!(Gender::from_code("m"), Gender::Male);
        assert_eq!(Gender::from_code(" F "), Gender::Female);
        assert_eq!(Gender::from_code("X"), Gender::Unknown);
        assert_eq!(Gender::Female.code(), "F");
    }

    #[test]
    fn test_graph_queries() {
        let graph = sample();
        assert_eq!(graph.parents_of("I3"), vec!["I1", "I2"]);
        assert_eq!(graph.children_of("I3"), vec!["I5"]);
        assert_eq!(graph.spouses_of("I3"), vec!["I4"]);
        assert!(graph.parents_of("I1").is_empty());
        assert_eq!(graph.unions_as_child("I5").count(), 1);
    }

    #[test]
    fn test_outcome_serializes_flat() {
        let outcome = ParseOutcome {
            graph: sample(),
            diagnostics: vec![Diagnostic::dangling_child("F1", "X")],
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert!(json.get("people").is_some());
        assert!(json.get("unions").is_some());
        assert_eq!(json["diagnostics"][0]["kind"], "dangling-child-ref");
        assert_eq!(json["diagnostics"][0]["reference_id"], "X");
    }
}
