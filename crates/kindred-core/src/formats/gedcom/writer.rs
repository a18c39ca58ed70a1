// SPDX-License-Identifier: AGPL-3.0-or-later
//! Graph to line-format serialisation

use crate::model::{FamilyGraph, Gender, Person, StructuredDate, Union};
use crate::traits::RenderConfig;

pub(super) fn render_graph(output: &mut String, graph: &FamilyGraph, config: &RenderConfig) {
    if config.header {
        output.push_str("0 HEAD\n1 CHAR UTF-8\n");
    }
    for person in &graph.people {
        render_person(output, person, graph);
    }
    for union in &graph.unions {
        render_union(output, union, graph);
    }
    if config.trailer {
        output.push_str("0 TRLR\n");
    }
}

fn render_person(output: &mut String, person: &Person, graph: &FamilyGraph) {
    output.push_str(&format!("0 @{}@ INDI\n", person.id));
    if !person.name.is_empty() {
        output.push_str(&format!("1 NAME {}\n", person.name));
    }
    if person.gender != Gender::Unknown {
        output.push_str(&format!("1 SEX {}\n", person.gender.code()));
    }
    render_event(output, "BIRT", person.birth.as_ref());
    render_event(output, "DEAT", person.death.as_ref());
    for union_id in &person.unions {
        let as_child = graph
            .union(union_id)
            .is_some_and(|u| u.has_child(&person.id));
        let tag = if as_child { "FAMC" } else { "FAMS" };
        output.push_str(&format!("1 {tag} @{union_id}@\n"));
    }
}

fn render_union(output: &mut String, union: &Union, graph: &FamilyGraph) {
    output.push_str(&format!("0 @{}@ FAM\n", union.id));
    for (i, parent_id) in union.parents.iter().enumerate() {
        let gender = graph.person(parent_id).map(|p| p.gender);
        let tag = match gender {
            Some(Gender::Male) => "HUSB",
            Some(Gender::Female) => "WIFE",
            _ if i == 0 => "HUSB",
            _ => "WIFE",
        };
        output.push_str(&format!("1 {tag} @{parent_id}@\n"));
    }
    for child_id in &union.children {
        output.push_str(&format!("1 CHIL @{child_id}@\n"));
    }
    render_event(output, "MARR", union.marriage.as_ref());
}

/// Events with empty date text are omitted entirely
fn render_event(output: &mut String, tag: &str, date: Option<&StructuredDate>) {
    let Some(date) = date.filter(|d| !d.original.trim().is_empty()) else {
        return;
    };
    output.push_str(&format!("1 {tag}\n2 DATE {}\n", date.original.trim()));
}
