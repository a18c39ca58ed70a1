// SPDX-License-Identifier: AGPL-3.0-or-later
//! Deterministic family tree layout
//!
//! Two phases:
//! 1. Level assignment: either an ancestor walk from a focal person, or a
//!    breadth-first pass from parentless people followed by bounded
//!    relaxation over unions.
//! 2. Positioning: people are grouped per level, spouses paired, groups
//!    spread evenly across the canvas; unions sit between their parents and
//!    children.
//!
//! Output is a pure function of the graph and the configuration.

mod levels;
mod position;

use crate::model::FamilyGraph;
use crate::traits::{KindredError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use levels::MAX_RELAXATION_ROUNDS;

/// Horizontal padding on each side of the canvas
pub const HORIZONTAL_PADDING: f64 = 40.0;
/// Total vertical padding (split evenly above and below)
pub const VERTICAL_PADDING: f64 = 40.0;
/// Gap between the two members of a spouse pair
pub const SPOUSE_GAP: f64 = 16.0;
/// Vertical offset of a one-sided union from its members, in row heights
pub const UNION_OFFSET_FRACTION: f64 = 0.5;

/// Layout parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub horizontal_gap: f64,
    pub vertical_gap: f64,
    pub node_size: f64,
    /// Deepest level kept in the output
    pub max_generations: usize,
    /// Lay out this person's ancestors only. `None` lays out everyone.
    pub focal: Option<String>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            horizontal_gap: 40.0,
            vertical_gap: 60.0,
            node_size: 120.0,
            max_generations: 4,
            focal: None,
        }
    }
}

impl LayoutConfig {
    /// Reject spacing that would produce negative or degenerate geometry
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("horizontal_gap", self.horizontal_gap),
            ("vertical_gap", self.vertical_gap),
            ("node_size", self.node_size),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(KindredError::InvalidConfig { field, value });
            }
        }
        Ok(())
    }

    /// Height of one row band
    pub fn row_height(&self) -> f64 {
        self.node_size + self.vertical_gap
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

/// Which level assignment ran
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    Ancestors,
    General,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutStats {
    pub mode: LayoutMode,
    /// Relaxation rounds used (always 0 for the ancestor walk)
    pub relaxation_rounds: usize,
    /// Number of distinct levels in the output
    pub levels: usize,
}

/// Computed coordinates. People or unions without a level are absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutResult {
    pub person_positions: BTreeMap<String, Point>,
    pub union_positions: BTreeMap<String, Point>,
    pub bounds: Bounds,
    pub stats: LayoutStats,
}

/// Lay out `graph`. Fails only on invalid configuration.
pub fn compute_layout(graph: &FamilyGraph, config: &LayoutConfig) -> Result<LayoutResult> {
    config.validate()?;

    let index = levels::FamilyIndex::new(graph);
    let (mode, assigned, rounds) = match config.focal.as_deref() {
        Some(focal) => {
            let assigned = match index.position(focal) {
                Some(focal) => levels::ancestor_levels(&index, focal, config.max_generations),
                None => {
                    tracing::debug!(focal, "focal person not found; nothing to lay out");
                    vec![None; index.len()]
                }
            };
            (LayoutMode::Ancestors, assigned, 0)
        }
        None => {
            let (assigned, rounds) = levels::general_levels(&index, config.max_generations);
            (LayoutMode::General, assigned, rounds)
        }
    };

    let placed = position::place(&index, &assigned, config, mode);
    let level_count = assigned
        .iter()
        .flatten()
        .max()
        .map_or(0, |max| *max as usize + 1);

    tracing::debug!(
        ?mode,
        people = placed.people.len(),
        unions = placed.unions.len(),
        rounds,
        "computed layout"
    );

    Ok(LayoutResult {
        person_positions: placed.people,
        union_positions: placed.unions,
        bounds: placed.bounds,
        stats: LayoutStats {
            mode,
            relaxation_rounds: rounds,
            levels: level_count,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Person, Union};
    use proptest::prelude::*;

    fn family(unions: &[(&str, &[&str], &[&str])], people: &[&str]) -> FamilyGraph {
        let mut graph = FamilyGraph::new();
        graph.people = people.iter().copied().map(Person::new).collect();
        for (id, parents, children) in unions {
            let mut union = Union::new(*id);
            parents.iter().for_each(|p| {
                union.add_parent(p);
            });
            children.iter().for_each(|c| {
                union.add_child(c);
            });
            graph.unions.push(union);
        }
        crate::formats::gedcom::references::link(&mut graph);
        graph
    }

    fn three_generations() -> FamilyGraph {
        family(
            &[
                ("F1", &["GF", "GM"], &["DAD"]),
                ("F2", &["DAD", "MOM"], &["KID", "SIB"]),
                ("F3", &["MGF"], &["MOM"]),
            ],
            &["GF", "GM", "MGF", "DAD", "MOM", "KID", "SIB"],
        )
    }

    #[test]
    fn test_rejects_bad_spacing() {
        let graph = FamilyGraph::new();
        for config in [
            LayoutConfig {
                node_size: 0.0,
                ..LayoutConfig::default()
            },
            LayoutConfig {
                horizontal_gap: -5.0,
                ..LayoutConfig::default()
            },
            LayoutConfig {
                vertical_gap: f64::NAN,
                ..LayoutConfig::default()
            },
        ] {
            let err = compute_layout(&graph, &config).unwrap_err();
            assert!(matches!(err, KindredError::InvalidConfig { .. }), "{err}");
        }
    }

    #[test]
    fn test_ancestor_walk_excludes_siblings() {
        let graph = three_generations();
        let config = LayoutConfig {
            focal: Some("KID".into()),
            ..LayoutConfig::default()
        };
        let layout = compute_layout(&graph, &config).unwrap();
        let placed: Vec<&str> = layout.person_positions.keys().map(String::as_str).collect();
        assert_eq!(placed, vec!["DAD", "GF", "GM", "KID", "MGF", "MOM"]);
        assert_eq!(layout.stats.mode, LayoutMode::Ancestors);
        assert_eq!(layout.stats.levels, 3);

        let kid = layout.person_positions["KID"];
        let dad = layout.person_positions["DAD"];
        let gf = layout.person_positions["GF"];
        assert!(kid.y < dad.y && dad.y < gf.y);
        assert_eq!(dad.y, layout.person_positions["MOM"].y);
    }

    #[test]
    fn test_ancestor_walk_skips_focal_descendant_union() {
        let graph = three_generations();
        let config = LayoutConfig {
            focal: Some("DAD".into()),
            ..LayoutConfig::default()
        };
        let layout = compute_layout(&graph, &config).unwrap();
        let unions: Vec<&str> = layout.union_positions.keys().map(String::as_str).collect();
        assert_eq!(unions, vec!["F1"]);
        assert!(!layout.person_positions.contains_key("KID"));
    }

    #[test]
    fn test_ancestor_walk_depth_bound() {
        let graph = three_generations();
        let config = LayoutConfig {
            focal: Some("KID".into()),
            max_generations: 1,
            ..LayoutConfig::default()
        };
        let layout = compute_layout(&graph, &config).unwrap();
        assert_eq!(layout.person_positions.len(), 3);
        assert!(!layout.person_positions.contains_key("GF"));
    }

    #[test]
    fn test_unbounded_depth_matches_large_depth() {
        let graph = three_generations();
        for focal in [None, Some("KID".to_string())] {
            let bounded = LayoutConfig {
                max_generations: 100,
                focal: focal.clone(),
                ..LayoutConfig::default()
            };
            let unbounded = LayoutConfig {
                max_generations: usize::MAX,
                ..bounded.clone()
            };
            let expected = compute_layout(&graph, &bounded).unwrap();
            let actual = compute_layout(&graph, &unbounded).unwrap();
            assert_eq!(actual.person_positions, expected.person_positions);
            assert_eq!(actual.bounds, expected.bounds);
        }
    }

    #[test]
    fn test_unknown_focal_is_empty() {
        let graph = three_generations();
        let config = LayoutConfig {
            focal: Some("NOBODY".into()),
            ..LayoutConfig::default()
        };
        let layout = compute_layout(&graph, &config).unwrap();
        assert!(layout.person_positions.is_empty());
        assert!(layout.union_positions.is_empty());
        assert_eq!(layout.stats.levels, 0);
    }

    #[test]
    fn test_general_layout_levels() {
        let graph = three_generations();
        let layout = compute_layout(&graph, &LayoutConfig::default()).unwrap();
        assert_eq!(layout.stats.mode, LayoutMode::General);
        let y = |id: &str| layout.person_positions[id].y;
        assert_eq!(y("GF"), y("GM"));
        assert!(y("GF") < y("DAD"));
        // MOM is an in-law: she takes DAD's level, not her own ancestry depth
        assert_eq!(y("DAD"), y("MOM"));
        assert_eq!(y("KID"), y("SIB"));
        assert!(y("DAD") < y("KID"));
    }

    #[test]
    fn test_union_sits_between_parents_and_children() {
        let graph = three_generations();
        let layout = compute_layout(&graph, &LayoutConfig::default()).unwrap();
        let f2 = layout.union_positions["F2"];
        let dad = layout.person_positions["DAD"];
        let kid = layout.person_positions["KID"];
        assert!(dad.y < f2.y && f2.y < kid.y);
    }

    #[test]
    fn test_single_group_is_centered() {
        let graph = family(&[], &["SOLO"]);
        let layout = compute_layout(&graph, &LayoutConfig::default()).unwrap();
        let solo = layout.person_positions["SOLO"];
        assert_eq!(solo.x, layout.bounds.width / 2.0);
    }

    #[test]
    fn test_spouses_are_paired_symmetrically() {
        let graph = family(&[("F1", &["A", "B"], &[])], &["A", "X", "B"]);
        let config = LayoutConfig::default();
        let layout = compute_layout(&graph, &config).unwrap();
        let a = layout.person_positions["A"];
        let b = layout.person_positions["B"];
        let f1 = layout.union_positions["F1"];
        assert_eq!(b.x - a.x, config.node_size + SPOUSE_GAP);
        assert_eq!(f1.x, (a.x + b.x) / 2.0);
        assert_eq!(f1.y, a.y + UNION_OFFSET_FRACTION * config.row_height());
    }

    #[test]
    fn test_remarriage_cycle_terminates() {
        // A is both parent and child of B's unions
        let graph = family(
            &[("F1", &["A", "B"], &["C"]), ("F2", &["C"], &["A"])],
            &["A", "B", "C"],
        );
        let layout = compute_layout(&graph, &LayoutConfig::default()).unwrap();
        assert!(layout.stats.relaxation_rounds <= MAX_RELAXATION_ROUNDS);
        assert!(layout.bounds.height.is_finite());
    }

    fn arb_graph() -> impl Strategy<Value = FamilyGraph> {
        let ids = prop::sample::select(vec!["A", "B", "C", "D", "E", "F", "G", "H"]);
        prop::collection::vec(
            (
                prop::collection::vec(ids.clone(), 0..3),
                prop::collection::vec(ids, 0..4),
            ),
            0..6,
        )
        .prop_map(|unions| {
            let mut graph = FamilyGraph::new();
            graph.people = ["A", "B", "C", "D", "E", "F", "G", "H"]
                .into_iter()
                .map(Person::new)
                .collect();
            for (i, (parents, children)) in unions.into_iter().enumerate() {
                let mut union = Union::new(format!("U{i}"));
                parents.iter().for_each(|p| {
                    union.add_parent(p);
                });
                children.iter().for_each(|c| {
                    union.add_child(c);
                });
                graph.unions.push(union);
            }
            crate::formats::gedcom::references::link(&mut graph);
            graph
        })
    }

    proptest! {
        #[test]
        fn layout_is_deterministic(graph in arb_graph(), focal in prop::option::of(prop::sample::select(vec!["A", "C", "H"]))) {
            let config = LayoutConfig { focal: focal.map(String::from), ..LayoutConfig::default() };
            let first = compute_layout(&graph, &config).unwrap();
            let second = compute_layout(&graph, &config).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn deeper_bound_never_shrinks_height(graph in arb_graph(), depth in 0usize..6, focal in prop::option::of(prop::sample::select(vec!["A", "C", "H"]))) {
            let shallow = LayoutConfig { max_generations: depth, focal: focal.map(String::from), ..LayoutConfig::default() };
            let deep = LayoutConfig { max_generations: depth + 1, ..shallow.clone() };
            let a = compute_layout(&graph, &shallow).unwrap();
            let b = compute_layout(&graph, &deep).unwrap();
            prop_assert!(b.bounds.height >= a.bounds.height);
        }

        #[test]
        fn wider_gap_never_shrinks_width(graph in arb_graph(), gap in 1.0f64..200.0, extra in 0.0f64..200.0) {
            let narrow = LayoutConfig { horizontal_gap: gap, ..LayoutConfig::default() };
            let wide = LayoutConfig { horizontal_gap: gap + extra, ..LayoutConfig::default() };
            let a = compute_layout(&graph, &narrow).unwrap();
            let b = compute_layout(&graph, &wide).unwrap();
            prop_assert!(b.bounds.width >= a.bounds.width);
        }

        #[test]
        fn positions_stay_inside_bounds(graph in arb_graph()) {
            let layout = compute_layout(&graph, &LayoutConfig::default()).unwrap();
            for point in layout.person_positions.values() {
                prop_assert!(point.x >= 0.0 && point.x <= layout.bounds.width);
                prop_assert!(point.y >= 0.0 && point.y <= layout.bounds.height);
            }
        }
    }
}
