// SPDX-License-Identifier: AGPL-3.0-or-later
//! Coordinate assignment

use super::levels::{FamilyIndex, Levels};
use super::{
    Bounds, LayoutConfig, LayoutMode, Point, HORIZONTAL_PADDING, SPOUSE_GAP,
    UNION_OFFSET_FRACTION, VERTICAL_PADDING,
};
use std::collections::BTreeMap;

/// One slot in a row: a lone person or a spouse pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Group {
    Single(usize),
    Pair(usize, usize),
}

impl Group {
    fn width(&self, node_size: f64) -> f64 {
        match self {
            Self::Single(_) => node_size,
            Self::Pair(..) => 2.0 * node_size + SPOUSE_GAP,
        }
    }
}

pub(super) struct Placement {
    pub people: BTreeMap<String, Point>,
    pub unions: BTreeMap<String, Point>,
    pub bounds: Bounds,
}

/// Assign coordinates. In ancestor mode only unions leading to a placed
/// child are kept, so the focal person's own unions are left out.
pub(super) fn place(
    index: &FamilyIndex<'_>,
    levels: &Levels,
    config: &LayoutConfig,
    mode: LayoutMode,
) -> Placement {
    let rows = group_rows(index, levels);
    let row_height = config.row_height();

    let content_width = rows
        .iter()
        .map(|groups| row_span(groups, config))
        .fold(config.node_size, f64::max);
    let width = 2.0 * HORIZONTAL_PADDING + content_width;
    let max_level = rows.len().saturating_sub(1);
    let height = (2 * max_level + 1) as f64 * row_height + VERTICAL_PADDING;

    let mut points: Vec<Option<Point>> = vec![None; index.len()];
    for (level, groups) in rows.iter().enumerate() {
        if groups.is_empty() {
            continue;
        }
        let y = VERTICAL_PADDING / 2.0 + (2 * level) as f64 * row_height + row_height / 2.0;
        let slot = content_width / groups.len() as f64;
        for (i, group) in groups.iter().enumerate() {
            let center = HORIZONTAL_PADDING + slot * (i as f64 + 0.5);
            match *group {
                Group::Single(p) => points[p] = Some(Point { x: center, y }),
                Group::Pair(a, b) => {
                    let offset = (config.node_size + SPOUSE_GAP) / 2.0;
                    points[a] = Some(Point { x: center - offset, y });
                    points[b] = Some(Point { x: center + offset, y });
                }
            }
        }
    }

    let mut people = BTreeMap::new();
    for (p, point) in points.iter().enumerate() {
        if let Some(point) = point {
            people.insert(index.ids[p].to_string(), *point);
        }
    }

    let mut unions = BTreeMap::new();
    for (u, id) in index.union_ids.iter().enumerate() {
        let parents = mean(index.union_parents[u].iter().filter_map(|&p| points[p]));
        let children = mean(index.union_children[u].iter().filter_map(|&c| points[c]));
        let offset = UNION_OFFSET_FRACTION * row_height;
        let point = match (parents, children) {
            (Some(p), Some(c)) => Point {
                x: (p.x + c.x) / 2.0,
                y: (p.y + c.y) / 2.0,
            },
            (Some(_), None) if mode == LayoutMode::Ancestors => continue,
            (Some(p), None) => Point { x: p.x, y: p.y + offset },
            (None, Some(c)) => Point { x: c.x, y: c.y - offset },
            (None, None) => continue,
        };
        unions.entry((*id).to_string()).or_insert(point);
    }

    Placement {
        people,
        unions,
        bounds: Bounds { width, height },
    }
}

/// People bucketed by level in graph order, spouses paired greedily
fn group_rows(index: &FamilyIndex<'_>, levels: &Levels) -> Vec<Vec<Group>> {
    let max_level = levels.iter().flatten().copied().max();
    let Some(max_level) = max_level else {
        return Vec::new();
    };

    let mut rows: Vec<Vec<usize>> = vec![Vec::new(); max_level as usize + 1];
    for (p, level) in levels.iter().enumerate() {
        if let Some(level) = level {
            rows[*level as usize].push(p);
        }
    }

    let mut grouped = vec![false; index.len()];
    rows.iter()
        .map(|row| {
            let mut groups = Vec::new();
            for (i, &p) in row.iter().enumerate() {
                if grouped[p] {
                    continue;
                }
                grouped[p] = true;
                let partner = row[i + 1..]
                    .iter()
                    .copied()
                    .find(|&q| !grouped[q] && index.are_spouses(p, q));
                match partner {
                    Some(q) => {
                        grouped[q] = true;
                        groups.push(Group::Pair(p, q));
                    }
                    None => groups.push(Group::Single(p)),
                }
            }
            groups
        })
        .collect()
}

fn row_span(groups: &[Group], config: &LayoutConfig) -> f64 {
    if groups.is_empty() {
        return 0.0;
    }
    let nodes: f64 = groups.iter().map(|g| g.width(config.node_size)).sum();
    nodes + (groups.len() - 1) as f64 * config.horizontal_gap
}

fn mean(points: impl Iterator<Item = Point>) -> Option<Point> {
    let (mut x, mut y, mut n) = (0.0, 0.0, 0usize);
    for point in points {
        x += point.x;
        y += point.y;
        n += 1;
    }
    (n > 0).then(|| Point {
        x: x / n as f64,
        y: y / n as f64,
    })
}
