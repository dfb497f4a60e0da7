//! Rebuild edge and corner tables from vertex identity.
//!
//! [`complete`] assumes `tree_to_vertex` and a valid face skeleton and
//! regenerates every edge and corner record by matching endpoint
//! vertices across trees. Periodicity that is not encoded in the vertex
//! list is lost here; that is a documented limitation, not a bug.

use std::collections::HashMap;

use crate::topology::connectivity::{
    clear_corners, clear_edges, reset_edge_corner_index, Connectivity, TopIdx,
};
use crate::topology::constants::{CORNER_FACES, EDGES, EDGE_CORNERS, EDGE_FACES};
use crate::topology::transform::{corner_across, edge_across};

/// Replace the edge and corner tables of `conn` with tables derived from
/// `tree_to_vertex`.
///
/// Tree edges whose endpoint vertex pair occurs in several trees are
/// grouped into one macro-edge per vertex pair; groups that are fully
/// described by face reciprocity are not recorded. Corners work the same
/// way, keyed by a single vertex. With no vertices present this is a
/// no-op that leaves an edge-less, corner-less connectivity.
pub fn complete(conn: &mut Connectivity) {
    clear_edges(conn);
    clear_corners(conn);
    if conn.vertices.is_empty() {
        conn.tree_to_edge.clear();
        conn.tree_to_corner.clear();
        return;
    }
    reset_edge_corner_index(conn);

    complete_edges(conn);
    complete_corners(conn);
    if conn.num_edges() == 0 {
        conn.tree_to_edge.clear();
    }
    if conn.num_corners() == 0 {
        conn.tree_to_corner.clear();
    }
}

/// Sides grouped under a key, preserving first-seen key order so the
/// output is deterministic.
struct Grouper<K> {
    index: HashMap<K, usize>,
    groups: Vec<Vec<(TopIdx, usize, bool)>>,
}

impl<K: std::hash::Hash + Eq + Copy> Grouper<K> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            groups: Vec::new(),
        }
    }

    fn push(&mut self, key: K, side: (TopIdx, usize, bool)) {
        let groups = &mut self.groups;
        let at = *self.index.entry(key).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        self.groups[at].push(side);
    }
}

fn complete_edges(conn: &mut Connectivity) {
    let num_trees = conn.tree_to_tree.len();
    let mut grouper = Grouper::new();
    for tree in 0..num_trees {
        for edge in 0..EDGES {
            let [c0, c1] = EDGE_CORNERS[edge];
            let v0 = conn.tree_to_vertex[tree][c0];
            let v1 = conn.tree_to_vertex[tree][c1];
            let key = (v0.min(v1), v0.max(v1));
            grouper.push(key, (tree as TopIdx, edge, v0 > v1));
        }
    }

    for group in &grouper.groups {
        if group.len() < 2 || all_pairs_face_described(conn, group, edge_described) {
            continue;
        }
        let bucket = conn.ett_offset.len() as TopIdx - 1;
        let reference_dir = group[0].2;
        for &(tree, edge, dir) in group {
            conn.tree_to_edge[tree as usize][edge] = bucket;
            conn.edge_to_tree.push(tree);
            conn.edge_to_edge
                .push((edge + 12 * usize::from(dir != reference_dir)) as i8);
        }
        conn.ett_offset.push(conn.edge_to_tree.len() as TopIdx);
    }
}

fn complete_corners(conn: &mut Connectivity) {
    let num_trees = conn.tree_to_tree.len();
    let mut grouper = Grouper::new();
    for tree in 0..num_trees {
        for corner in 0..8 {
            let key = conn.tree_to_vertex[tree][corner];
            grouper.push(key, (tree as TopIdx, corner, false));
        }
    }

    for group in &grouper.groups {
        if group.len() < 2 || all_pairs_face_described(conn, group, corner_described) {
            continue;
        }
        let bucket = conn.ctt_offset.len() as TopIdx - 1;
        for &(tree, corner, _) in group {
            conn.tree_to_corner[tree as usize][corner] = bucket;
            conn.corner_to_tree.push(tree);
            conn.corner_to_corner.push(corner as i8);
        }
        conn.ctt_offset.push(conn.corner_to_tree.len() as TopIdx);
    }
}

fn all_pairs_face_described(
    conn: &Connectivity,
    group: &[(TopIdx, usize, bool)],
    described: fn(&Connectivity, TopIdx, usize, TopIdx, usize) -> bool,
) -> bool {
    for (i, &(t, a, _)) in group.iter().enumerate() {
        for &(t2, b, _) in &group[i + 1..] {
            if !described(conn, t, a, t2, b) {
                return false;
            }
        }
    }
    true
}

/// Whether the two edge sides are identified by a single face relation.
fn edge_described(conn: &Connectivity, tree: TopIdx, edge: usize, ntree: TopIdx, nedge: usize) -> bool {
    EDGE_FACES[edge].iter().any(|&f| {
        conn.face_neighbor(tree, f)
            .is_some_and(|(t2, f2, o)| t2 == ntree && edge_across(f, f2, o, edge).0 == nedge)
    })
}

/// Whether the two corner sides are identified by a single face relation.
fn corner_described(
    conn: &Connectivity,
    tree: TopIdx,
    corner: usize,
    ntree: TopIdx,
    ncorner: usize,
) -> bool {
    CORNER_FACES[corner].iter().any(|&f| {
        conn.face_neighbor(tree, f)
            .is_some_and(|(t2, f2, o)| t2 == ntree && corner_across(f, f2, o, corner) == ncorner)
    })
}
