// SPDX-License-Identifier: AGPL-3.0-or-later
//! Record builders
//!
//! A record opens on a level-0 `INDI` or `FAM` line and absorbs nested tag
//! events until the next level-0 line or end of input closes it.

use super::date::parse_date;
use super::scanner::{strip_xref, Cursor, Line};
use crate::model::{Gender, Person, Union};

/// A finished top-level record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Person(Person),
    Union(Union),
}

/// Classification of a level-0 line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Header {
    Person(String),
    Union(String),
    Other,
}

impl Header {
    pub fn from_line(line: &Line<'_>) -> Self {
        let tag = line.tag.to_ascii_uppercase();
        let id = || match line.xref {
            Some(xref) if !xref.is_empty() => xref.to_string(),
            _ => format!("{}#{}", tag, line.number),
        };
        match tag.as_str() {
            "INDI" => Self::Person(id()),
            "FAM" => Self::Union(id()),
            _ => Self::Other,
        }
    }
}

/// A nested tag, interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagEvent<'a> {
    Name(&'a str),
    Gender(&'a str),
    Birth(Option<&'a str>),
    Death(Option<&'a str>),
    HasUnion(&'a str),
    Parent(&'a str),
    Child(&'a str),
    Marriage(Option<&'a str>),
    Ignored,
}

impl<'a> TagEvent<'a> {
    /// Interpret a nested line. Event tags without an inline value pull
    /// their date from the lines below; the cursor is advanced past the
    /// event's whole subtree either way.
    pub fn from_line(line: &Line<'a>, cursor: &mut Cursor<'_, 'a>) -> Self {
        match line.tag.to_ascii_uppercase().as_str() {
            "NAME" => Self::Name(line.value),
            "SEX" => Self::Gender(line.value),
            "FAMS" | "FAMC" => Self::HasUnion(strip_xref(line.value)),
            "HUSB" | "WIFE" => Self::Parent(strip_xref(line.value)),
            "CHIL" => Self::Child(strip_xref(line.value)),
            "BIRT" => Self::Birth(event_date(line, cursor, false)),
            "DEAT" => Self::Death(event_date(line, cursor, false)),
            "MARR" => Self::Marriage(event_date(line, cursor, true)),
            _ => Self::Ignored,
        }
    }
}

/// Blank date text counts as no date at all
fn event_date<'a>(
    line: &Line<'a>,
    cursor: &mut Cursor<'_, 'a>,
    direct_only: bool,
) -> Option<&'a str> {
    let date = if line.value.trim().is_empty() {
        cursor.subtree(line.level).find_date(direct_only)
    } else {
        Some(line.value)
    };
    cursor.skip_subtree(line.level);
    date.filter(|value| !value.trim().is_empty())
}

/// Remove surname delimiters and collapse whitespace
pub fn normalize_name(value: &str) -> String {
    value
        .split(|c: char| c == '/' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// The record currently being assembled
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OpenRecord {
    #[default]
    Closed,
    Person(Person),
    Union(Union),
}

impl OpenRecord {
    /// Transition on a level-0 line. Returns the new state and the record
    /// that was open before, now finished.
    pub fn transition(self, header: Header) -> (Self, Option<Record>) {
        let finished = self.finish();
        let next = match header {
            Header::Person(id) => Self::Person(Person::new(id)),
            Header::Union(id) => Self::Union(Union::new(id)),
            Header::Other => Self::Closed,
        };
        (next, finished)
    }

    /// Close whatever is open
    pub fn finish(self) -> Option<Record> {
        match self {
            Self::Closed => None,
            Self::Person(person) => Some(Record::Person(person)),
            Self::Union(union) => Some(Record::Union(union)),
        }
    }

    /// Apply a nested tag to the open record. Events that do not belong to
    /// the open record type are ignored.
    pub fn apply(&mut self, event: TagEvent<'_>) {
        match (self, event) {
            (Self::Person(person), TagEvent::Name(value)) => person.name = normalize_name(value),
            (Self::Person(person), TagEvent::Gender(value)) => {
                person.gender = Gender::from_code(value);
            }
            (Self::Person(person), TagEvent::Birth(date)) => {
                if let Some(text) = date {
                    person.birth = Some(parse_date(text));
                }
            }
            (Self::Person(person), TagEvent::Death(date)) => {
                if let Some(text) = date {
                    person.death = Some(parse_date(text));
                }
            }
            (Self::Person(person), TagEvent::HasUnion(id)) => {
                person.add_union(id);
            }
            (Self::Union(union), TagEvent::Parent(id)) => {
                union.add_parent(id);
            }
            (Self::Union(union), TagEvent::Child(id)) => {
                union.add_child(id);
            }
            (Self::Union(union), TagEvent::Marriage(date)) => {
                if let Some(text) = date {
                    union.marriage = Some(parse_date(text));
                }
            }
            _ => {}
        }
    }
}
