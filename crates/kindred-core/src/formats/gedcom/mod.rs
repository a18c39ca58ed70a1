// SPDX-License-Identifier: AGPL-3.0-or-later
//! GEDCOM-style line format handler
//!
//! Parsing runs in four stages:
//! 1. scan lines into `(level, xref, tag, value)`
//! 2. assemble person/union records in a single pass
//! 3. recover unions permissively if the structured pass found none
//! 4. cross-link memberships, then strip dangling references

pub mod builder;
pub mod date;
pub mod recovery;
pub mod references;
pub mod scanner;
mod writer;

use crate::model::{FamilyGraph, ParseOutcome};
use crate::traits::{ParseConfig, Parser, RenderConfig, Renderer, Result};
use builder::{Header, OpenRecord, Record, TagEvent};
use scanner::{Cursor, Line};

pub use date::parse_date;

/// GEDCOM-style format handler
pub struct GedcomHandler;

impl GedcomHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GedcomHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for GedcomHandler {
    fn parse(&self, input: &str, config: &ParseConfig) -> ParseOutcome {
        let lines = scanner::scan(input);
        let mut graph = assemble(&lines);

        if graph.unions.is_empty() && config.structural_recovery {
            let recovered = recovery::recover_unions(input);
            let added = recovery::merge_unions(&mut graph.unions, recovered);
            tracing::debug!(added, "structured pass found no unions; used structural recovery");
        }

        let mut diagnostics = Vec::new();
        references::link(&mut graph);
        references::validate(&mut graph, &mut diagnostics);

        if config.preserve_raw_source {
            graph.raw_source = Some(input.to_string());
        }

        tracing::debug!(
            people = graph.people.len(),
            unions = graph.unions.len(),
            diagnostics = diagnostics.len(),
            "parsed family graph"
        );

        ParseOutcome { graph, diagnostics }
    }
}

/// Single left-to-right pass over scanned lines
fn assemble(lines: &[Line<'_>]) -> FamilyGraph {
    let mut graph = FamilyGraph::new();
    let mut open = OpenRecord::Closed;
    let mut cursor = Cursor::new(lines);

    while let Some(line) = cursor.next() {
        if line.level == 0 {
            let (next, finished) = open.transition(Header::from_line(line));
            open = next;
            push_record(&mut graph, finished);
        } else {
            let event = TagEvent::from_line(line, &mut cursor);
            open.apply(event);
        }
    }
    push_record(&mut graph, open.finish());

    graph
}

fn push_record(graph: &mut FamilyGraph, record: Option<Record>) {
    match record {
        Some(Record::Person(person)) => {
            tracing::trace!(id = %person.id, "closed person record");
            graph.people.push(person);
        }
        Some(Record::Union(union)) => {
            tracing::trace!(id = %union.id, "closed union record");
            graph.unions.push(union);
        }
        None => {}
    }
}

impl Renderer for GedcomHandler {
    fn render(&self, graph: &FamilyGraph, config: &RenderConfig) -> Result<String> {
        let mut output = String::new();
        writer::render_graph(&mut output, graph, config);
        Ok(output)
    }
}
