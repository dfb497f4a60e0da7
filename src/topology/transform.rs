//! Coordinate-aware neighbor queries across faces, edges, and corners.
//!
//! The three `find_*_transform` routines decode the neighbor relations
//! stored in a [`Connectivity`] into plain-value transform descriptors
//! that remain usable after the connectivity is gone. They are pure
//! functions of their inputs: the same query on the same connectivity
//! always produces bit-identical output.

use serde::{Deserialize, Serialize};

use crate::topology::connectivity::{Connectivity, TopIdx};
use crate::topology::constants::{
    face_axis, face_permutation, face_side, CORNER_EDGES, CORNER_FACES, CORNER_FACE_CORNERS,
    EDGE_CORNERS, EDGE_FACES, FACES, FACE_CORNERS, FTRANSFORM,
};

/// Map a corner through a face gluing. The corner must lie on `face`.
#[inline]
pub(crate) fn corner_across(face: usize, nface: usize, orientation: usize, corner: usize) -> usize {
    let i = CORNER_FACE_CORNERS[corner][face];
    debug_assert!(i >= 0, "corner not on face");
    FACE_CORNERS[nface][face_permutation(face, nface, orientation)[i as usize]]
}

/// Map an edge through a face gluing. The edge must lie on `face`.
/// Returns the neighbor edge and whether the identification reverses the
/// edge direction.
#[inline]
pub(crate) fn edge_across(
    face: usize,
    nface: usize,
    orientation: usize,
    edge: usize,
) -> (usize, bool) {
    let [c0, c1] = EDGE_CORNERS[edge];
    let d0 = corner_across(face, nface, orientation, c0);
    let d1 = corner_across(face, nface, orientation, c1);
    let pair = [d0.min(d1), d1.max(d0)];
    let nedge = EDGE_CORNERS
        .iter()
        .position(|ec| *ec == pair)
        .expect("corner pair spans an edge");
    (nedge, d0 > d1)
}

/// The in-face axis sequences and reversal flags relating two glued
/// tree faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceTransform {
    /// The face neighbor tree.
    pub ntree: TopIdx,
    /// Axis encoding:
    /// `[0..2]` the coordinate axis sequence of the origin face (in-face
    /// axes first, normal axis last), `[3..5]` the same for the target
    /// face aligned to the origin sequence, `[6..7]` reversal flags for
    /// the two in-face axes, `[8]` a code for the normal direction:
    /// 0 both faces low, 1 both faces high, 2 opposite sides.
    pub ftransform: [i32; FTRANSFORM],
}

/// Decode the face relation of `(tree, face)` into a [`FaceTransform`].
///
/// Returns `None` when the face is on the outside boundary of the
/// forest.
pub fn find_face_transform(
    conn: &Connectivity,
    tree: TopIdx,
    face: usize,
) -> Option<FaceTransform> {
    debug_assert!(conn.in_tree_range(tree), "tree index out of range");
    debug_assert!(face < FACES, "face index out of range");

    let (ntree, nface, orientation) = conn.face_neighbor(tree, face)?;

    let my_axis = face_axis(face);
    let target_axis = face_axis(nface);
    let my_inface = inface_axes(my_axis);
    let target_inface = inface_axes(target_axis);

    let perm = face_permutation(face, nface, orientation);
    let origin = perm[0];
    // the permutation is affine over two bits: it either keeps or swaps
    // the in-face axes, then reverses directions per the origin image
    let swap = (perm[0] ^ perm[1]) == 2;

    let mut ftransform = [0i32; FTRANSFORM];
    ftransform[0] = my_inface[0] as i32;
    ftransform[1] = my_inface[1] as i32;
    ftransform[2] = my_axis as i32;
    ftransform[3] = target_inface[usize::from(swap)] as i32;
    ftransform[4] = target_inface[usize::from(!swap)] as i32;
    ftransform[5] = target_axis as i32;
    ftransform[6] = ((origin >> usize::from(swap)) & 1) as i32;
    ftransform[7] = ((origin >> usize::from(!swap)) & 1) as i32;
    ftransform[8] = if face_side(face) != face_side(nface) {
        2
    } else {
        face_side(face) as i32
    };
    Some(FaceTransform { ntree, ftransform })
}

#[inline]
fn inface_axes(normal: usize) -> [usize; 2] {
    match normal {
        0 => [1, 2],
        1 => [0, 2],
        _ => [0, 1],
    }
}

/// One edge neighbor that is not already reachable through a face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeTransform {
    /// The edge neighbor tree.
    pub ntree: TopIdx,
    /// The neighbor's local edge number.
    pub nedge: i8,
    /// Axis sequence of the neighbor edge: the axis it runs along
    /// followed by the two transverse axes in ascending order.
    pub naxis: [i8; 3],
    /// 1 when the neighbor edge runs opposite to the origin edge.
    pub nflip: i8,
    /// Alignment index of the neighbor edge around the macro-edge.
    pub corners: i8,
}

/// All edge neighbors of one tree edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeInfo {
    /// The originating local edge.
    pub iedge: i8,
    /// Transforms to every neighbor not covered by face reciprocity.
    pub transforms: Vec<EdgeTransform>,
}

/// Collect the diagonal edge neighbors of `(tree, edge)`.
///
/// An empty list means the edge is interior to the tree or fully
/// described by its two face relations.
pub fn find_edge_transform(conn: &Connectivity, tree: TopIdx, edge: usize) -> EdgeInfo {
    let mut transforms = Vec::new();
    find_edge_transform_into(conn, tree, edge, &mut transforms);
    EdgeInfo {
        iedge: edge as i8,
        transforms,
    }
}

/// Like [`find_edge_transform`], reusing a caller-provided buffer to
/// amortize allocation across many queries.
pub fn find_edge_transform_into(
    conn: &Connectivity,
    tree: TopIdx,
    edge: usize,
    transforms: &mut Vec<EdgeTransform>,
) {
    debug_assert!(conn.in_tree_range(tree), "tree index out of range");
    debug_assert!(edge < EDGE_CORNERS.len(), "edge index out of range");
    transforms.clear();

    let bucket = match conn.tree_to_edge(tree) {
        Some(row) if row[edge] >= 0 => row[edge],
        _ => return,
    };
    let (to_tree, to_edge) = conn.edge_bucket(bucket);

    // orientation of the originating side within the bucket
    let iflip = to_tree
        .iter()
        .zip(to_edge)
        .find(|&(&t, &code)| t == tree && code as usize % 12 == edge)
        .map(|(_, &code)| code as usize / 12)
        .expect("bucket lists the originating side");

    for (&ntree, &code) in to_tree.iter().zip(to_edge) {
        let nedge = code as usize % 12;
        let nflip = code as usize / 12;
        if ntree == tree && nedge == edge {
            continue;
        }
        // suppress neighbors already reachable through either face
        // touching the originating edge
        let face_reachable = EDGE_FACES[edge].iter().any(|&f| {
            conn.face_neighbor(tree, f).is_some_and(|(t2, f2, o)| {
                t2 == ntree && edge_across(f, f2, o, edge).0 == nedge
            })
        });
        if face_reachable {
            continue;
        }
        transforms.push(EdgeTransform {
            ntree,
            nedge: nedge as i8,
            naxis: [
                (nedge / 4) as i8,
                if nedge < 4 { 1 } else { 0 },
                if nedge < 8 { 2 } else { 1 },
            ],
            nflip: (nflip ^ iflip) as i8,
            corners: (nedge % 4) as i8,
        });
    }
}

/// One corner neighbor that is not already reachable through a face or
/// an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CornerTransform {
    /// The corner neighbor tree.
    pub ntree: TopIdx,
    /// The neighbor's local corner number.
    pub ncorner: i8,
}

/// All corner neighbors of one tree corner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CornerInfo {
    /// The originating local corner.
    pub icorner: i8,
    /// Transforms to every neighbor not covered by face or edge
    /// reciprocity.
    pub transforms: Vec<CornerTransform>,
}

/// Collect the diagonal corner neighbors of `(tree, corner)`.
pub fn find_corner_transform(conn: &Connectivity, tree: TopIdx, corner: usize) -> CornerInfo {
    let mut transforms = Vec::new();
    find_corner_transform_into(conn, tree, corner, &mut transforms);
    CornerInfo {
        icorner: corner as i8,
        transforms,
    }
}

/// Like [`find_corner_transform`], reusing a caller-provided buffer.
pub fn find_corner_transform_into(
    conn: &Connectivity,
    tree: TopIdx,
    corner: usize,
    transforms: &mut Vec<CornerTransform>,
) {
    debug_assert!(conn.in_tree_range(tree), "tree index out of range");
    debug_assert!(corner < 8, "corner index out of range");
    transforms.clear();

    let bucket = match conn.tree_to_corner(tree) {
        Some(row) if row[corner] >= 0 => row[corner],
        _ => return,
    };

    // corner sides reachable through the three faces at the corner
    let mut reachable: Vec<(TopIdx, usize)> = Vec::new();
    for &f in &CORNER_FACES[corner] {
        if let Some((t2, f2, o)) = conn.face_neighbor(tree, f) {
            reachable.push((t2, corner_across(f, f2, o, corner)));
        }
    }
    // and through the recorded buckets of the three edges at the corner
    for &e in &CORNER_EDGES[corner] {
        let Some(row) = conn.tree_to_edge(tree) else {
            break;
        };
        if row[e] < 0 {
            continue;
        }
        let (to_tree, to_edge) = conn.edge_bucket(row[e]);
        let myflip = to_tree
            .iter()
            .zip(to_edge)
            .find(|&(&t, &code)| t == tree && code as usize % 12 == e)
            .map(|(_, &code)| code as usize / 12)
            .expect("bucket lists the originating side");
        let end = EDGE_CORNERS[e].iter().position(|&c| c == corner).unwrap() ^ myflip;
        for (&t2, &code) in to_tree.iter().zip(to_edge) {
            let (e2, flip2) = (code as usize % 12, code as usize / 12);
            reachable.push((t2, EDGE_CORNERS[e2][end ^ flip2]));
        }
    }

    let (to_tree, to_corner) = conn.corner_bucket(bucket);
    for (&ntree, &ncorner) in to_tree.iter().zip(to_corner) {
        let ncorner = ncorner as usize;
        if ntree == tree && ncorner == corner {
            continue;
        }
        if reachable.contains(&(ntree, ncorner)) {
            continue;
        }
        transforms.push(CornerTransform {
            ntree,
            ncorner: ncorner as i8,
        });
    }
}
