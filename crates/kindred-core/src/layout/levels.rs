// SPDX-License-Identifier: AGPL-3.0-or-later
//! Level assignment

use crate::model::FamilyGraph;
use std::collections::{BTreeSet, HashMap, VecDeque};

/// Hard cap on relaxation rounds. Remarriage loops can make the constraints
/// unsatisfiable; the cap is what guarantees termination.
pub const MAX_RELAXATION_ROUNDS: usize = 8;

/// Index-based view of the graph. Only the first record for a given person
/// id takes part; references to unknown ids are skipped.
pub(super) struct FamilyIndex<'g> {
    pub ids: Vec<&'g str>,
    by_id: HashMap<&'g str, usize>,
    pub union_ids: Vec<&'g str>,
    pub union_parents: Vec<Vec<usize>>,
    pub union_children: Vec<Vec<usize>>,
    /// Unions in which each person is a parent
    pub parent_in: Vec<Vec<usize>>,
    /// Unions in which each person is a child
    pub child_in: Vec<Vec<usize>>,
}

impl<'g> FamilyIndex<'g> {
    pub fn new(graph: &'g FamilyGraph) -> Self {
        let mut ids = Vec::new();
        let mut by_id = HashMap::new();
        for person in &graph.people {
            if !by_id.contains_key(person.id.as_str()) {
                by_id.insert(person.id.as_str(), ids.len());
                ids.push(person.id.as_str());
            }
        }

        let resolve = |list: &[String]| -> Vec<usize> {
            let mut out: Vec<usize> = Vec::new();
            for i in list.iter().filter_map(|id| by_id.get(id.as_str()).copied()) {
                if !out.contains(&i) {
                    out.push(i);
                }
            }
            out
        };

        let mut parent_in = vec![Vec::new(); ids.len()];
        let mut child_in = vec![Vec::new(); ids.len()];
        let mut union_ids = Vec::with_capacity(graph.unions.len());
        let mut union_parents = Vec::with_capacity(graph.unions.len());
        let mut union_children = Vec::with_capacity(graph.unions.len());

        for (u, union) in graph.unions.iter().enumerate() {
            let parents = resolve(&union.parents);
            let children = resolve(&union.children);
            for &p in &parents {
                parent_in[p].push(u);
            }
            for &c in &children {
                child_in[c].push(u);
            }
            union_ids.push(union.id.as_str());
            union_parents.push(parents);
            union_children.push(children);
        }

        Self {
            ids,
            by_id,
            union_ids,
            union_parents,
            union_children,
            parent_in,
            child_in,
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    /// True when both people are parents in a shared union
    pub fn are_spouses(&self, a: usize, b: usize) -> bool {
        self.parent_in[a].iter().any(|u| self.parent_in[b].contains(u))
    }

    fn has_parents(&self, person: usize) -> bool {
        self.child_in[person]
            .iter()
            .any(|&u| !self.union_parents[u].is_empty())
    }
}

pub(super) type Levels = Vec<Option<i64>>;

/// Breadth-first walk upward from `focal`. Level 0 is the focal person and
/// each union's parents sit one level above its child. Only direct
/// ancestors are reached.
pub(super) fn ancestor_levels(
    index: &FamilyIndex<'_>,
    focal: usize,
    max_generations: usize,
) -> Levels {
    let bound = depth_bound(max_generations);
    let mut levels: Levels = vec![None; index.len()];
    let mut queue = VecDeque::from([focal]);
    levels[focal] = Some(0);

    while let Some(person) = queue.pop_front() {
        let Some(level) = levels[person] else {
            continue;
        };
        if level >= bound {
            continue;
        }
        for &u in &index.child_in[person] {
            for &parent in &index.union_parents[u] {
                if levels[parent].is_none() {
                    levels[parent] = Some(level + 1);
                    queue.push_back(parent);
                }
            }
        }
    }

    levels
}

/// Level assignment for the whole graph. Returns the levels and the number
/// of relaxation rounds used.
pub(super) fn general_levels(index: &FamilyIndex<'_>, max_generations: usize) -> (Levels, usize) {
    let mut levels = seed_levels(index);
    let rounds = relax(index, &mut levels);
    adopt_spouse_levels(index, &mut levels);
    normalize(&mut levels);

    let bound = depth_bound(max_generations);
    for level in &mut levels {
        if level.is_some_and(|l| l > bound) {
            *level = None;
        }
    }

    (levels, rounds)
}

/// Deepest kept level; bounds beyond `i64::MAX` mean unbounded
fn depth_bound(max_generations: usize) -> i64 {
    i64::try_from(max_generations).unwrap_or(i64::MAX)
}

/// Parentless people at level 0, then breadth-first through child edges.
/// The first visit is the shortest path, so converging paths keep the
/// minimum level.
fn seed_levels(index: &FamilyIndex<'_>) -> Levels {
    let mut levels: Levels = vec![None; index.len()];
    let mut queue = VecDeque::new();
    for person in 0..index.len() {
        if !index.has_parents(person) {
            levels[person] = Some(0);
            queue.push_back(person);
        }
    }

    while let Some(person) = queue.pop_front() {
        let Some(level) = levels[person] else {
            continue;
        };
        for &u in &index.parent_in[person] {
            for &child in &index.union_children[u] {
                if levels[child].is_none() {
                    levels[child] = Some(level + 1);
                    queue.push_back(child);
                }
            }
        }
    }

    levels
}

/// Work-list relaxation over unions. A union is revisited only when one of
/// its members changed level while another union was processed.
fn relax(index: &FamilyIndex<'_>, levels: &mut Levels) -> usize {
    let mut dirty: BTreeSet<usize> = (0..index.union_ids.len()).collect();
    let mut rounds = 0;

    while !dirty.is_empty() && rounds < MAX_RELAXATION_ROUNDS {
        rounds += 1;
        let current = std::mem::take(&mut dirty);
        for u in current {
            for person in relax_union(index, u, levels) {
                for &other in index.parent_in[person].iter().chain(&index.child_in[person]) {
                    if other != u {
                        dirty.insert(other);
                    }
                }
            }
        }
        tracing::trace!(round = rounds, pending = dirty.len(), "relaxation round");
    }

    if !dirty.is_empty() {
        tracing::debug!(pending = dirty.len(), "relaxation stopped at round cap");
    }
    rounds
}

/// Bring one union's members into agreement. Returns the people whose level
/// changed.
fn relax_union(index: &FamilyIndex<'_>, u: usize, levels: &mut Levels) -> Vec<usize> {
    let parents = &index.union_parents[u];
    let children = &index.union_children[u];

    let child_levels: Vec<i64> = children.iter().filter_map(|&c| levels[c]).collect();
    let min_child = child_levels.iter().copied().min();
    let children_disagree = child_levels.iter().any(|&l| Some(l) != min_child);

    let anchor = parents.iter().find_map(|&p| levels[p]);
    let parent_level = match (anchor, min_child) {
        (_, Some(min)) if children_disagree => min - 1,
        (Some(level), _) => level,
        (None, Some(min)) => min - 1,
        (None, None) => return Vec::new(),
    };

    let mut changed = Vec::new();
    for &p in parents {
        if levels[p] != Some(parent_level) {
            levels[p] = Some(parent_level);
            changed.push(p);
        }
    }
    for &c in children {
        if levels[c] != Some(parent_level + 1) {
            levels[c] = Some(parent_level + 1);
            changed.push(c);
        }
    }
    changed
}

/// In-laws take their partner's level: when a union's parent is a child in
/// some other union, every parent of this union moves to that parent's
/// level.
fn adopt_spouse_levels(index: &FamilyIndex<'_>, levels: &mut Levels) {
    for (u, parents) in index.union_parents.iter().enumerate() {
        let anchor = parents.iter().find_map(|&p| {
            let bloodline = index.child_in[p].iter().any(|&other| other != u);
            if bloodline {
                levels[p]
            } else {
                None
            }
        });
        if let Some(level) = anchor {
            for &p in parents {
                levels[p] = Some(level);
            }
        }
    }
}

/// Shift levels so the smallest is zero
fn normalize(levels: &mut Levels) {
    if let Some(min) = levels.iter().flatten().copied().min() {
        for level in levels.iter_mut().flatten() {
            *level -= min;
        }
    }
}
