// SPDX-License-Identifier: AGPL-3.0-or-later
//! Cross-linking and validation of person/union references
//!
//! Linking must run before validation: it only adds memberships, and the
//! validator is the single place references are removed.

use crate::model::{Diagnostic, DiagnosticSink, FamilyGraph};
use std::collections::{HashMap, HashSet};

/// Add each union's id to the membership list of every parent and child it
/// names. Purely additive.
pub fn link(graph: &mut FamilyGraph) {
    let mut index: HashMap<String, usize> = HashMap::new();
    for (i, person) in graph.people.iter().enumerate() {
        index.entry(person.id.clone()).or_insert(i);
    }

    for union in &graph.unions {
        for member in union.parents.iter().chain(&union.children) {
            if let Some(&i) = index.get(member) {
                graph.people[i].add_union(&union.id);
            }
        }
    }
}

/// Drop references to records that do not exist, reporting one diagnostic
/// per removal. Returns the number of removed references.
///
/// Running this on an already-clean graph removes and reports nothing.
pub fn validate(graph: &mut FamilyGraph, sink: &mut impl DiagnosticSink) -> usize {
    let person_ids: HashSet<String> = graph.people.iter().map(|p| p.id.clone()).collect();
    let union_ids: HashSet<String> = graph.unions.iter().map(|u| u.id.clone()).collect();
    let mut removed = 0;

    for person in &mut graph.people {
        person.unions.retain(|union_id| {
            let keep = union_ids.contains(union_id);
            if !keep {
                tracing::debug!(
                    person = %person.id,
                    union = %union_id,
                    "dropping dangling union reference"
                );
                sink.report(Diagnostic::dangling_union(&person.id, union_id));
                removed += 1;
            }
            keep
        });
    }

    for union in &mut graph.unions {
        union.parents.retain(|parent_id| {
            let keep = person_ids.contains(parent_id);
            if !keep {
                tracing::debug!(
                    union = %union.id,
                    parent = %parent_id,
                    "dropping dangling parent reference"
                );
                sink.report(Diagnostic::dangling_parent(&union.id, parent_id));
                removed += 1;
            }
            keep
        });
        union.children.retain(|child_id| {
            let keep = person_ids.contains(child_id);
            if !keep {
                tracing::debug!(
                    union = %union.id,
                    child = %child_id,
                    "dropping dangling child reference"
                );
                sink.report(Diagnostic::dangling_child(&union.id, child_id));
                removed += 1;
            }
            keep
        });
    }

    removed
}
