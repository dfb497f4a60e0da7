//! Built-in connectivity factories.
//!
//! The larger factories lay their trees out in an integer lattice (or a
//! cubed-sphere arrangement of one) and glue faces by matching corner
//! points, then derive the edge and corner tables by closing the face
//! relations transitively. Every factory output satisfies
//! [`Connectivity::is_valid`].

use std::collections::{HashMap, HashSet};

use crate::forest_error::ForestMeshError;
use crate::topology::connectivity::{
    glue_faces, reset_edge_corner_index, Connectivity, TopIdx,
};
use crate::topology::constants::{
    face_permutation, CORNER_FACES, CORNER_FACE_CORNERS, EDGES, EDGE_CORNERS, EDGE_FACES,
    FACE_CORNERS, FACES,
};
use crate::topology::transform::{corner_across, edge_across};

/// Corner coordinate bits in zyx order.
#[inline]
fn corner_bits(corner: usize) -> [i64; 3] {
    [
        (corner & 1) as i64,
        ((corner >> 1) & 1) as i64,
        ((corner >> 2) & 1) as i64,
    ]
}

/// One tree, unit cube, all faces on the boundary.
pub fn unitcube() -> Connectivity {
    let mut conn = Connectivity::new(8, 1, 0, 0, 0, 0);
    for corner in 0..8 {
        let b = corner_bits(corner);
        conn.vertices[corner] = [b[0] as f64, b[1] as f64, b[2] as f64];
        conn.tree_to_vertex[0][corner] = corner as TopIdx;
    }
    conn
}

/// One tree with all three face pairs identified periodically.
pub fn periodic() -> Connectivity {
    let mut conn = unitcube();
    for axis in 0..3 {
        glue_faces(&mut conn, 0, 2 * axis, 0, 2 * axis + 1, 0);
    }
    derive_edges(&mut conn);
    derive_corners(&mut conn);
    conn
}

/// One tree; x faces identified, y faces identified with a rotation,
/// z faces on the boundary.
pub fn rotwrap() -> Connectivity {
    let mut conn = unitcube();
    glue_faces(&mut conn, 0, 0, 0, 1, 0);
    glue_faces(&mut conn, 0, 2, 0, 3, 1);
    derive_edges(&mut conn);
    derive_corners(&mut conn);
    conn
}

/// Two trees glued along one face.
pub fn twocubes() -> Connectivity {
    let mut conn = from_lattice(2, 1, 1);
    derive_edges(&mut conn);
    derive_corners(&mut conn);
    conn
}

/// Two trees whose outward faces are also identified periodically.
pub fn twowrap() -> Connectivity {
    let mut conn = from_lattice(2, 1, 1);
    glue_faces(&mut conn, 0, 0, 1, 1, 0);
    derive_edges(&mut conn);
    derive_corners(&mut conn);
    conn
}

/// Corner points of the six rotcubes trees. Each tree carries a
/// different rotation of the reference frame so that every face
/// orientation code 0..4 occurs somewhere in the arrangement.
const ROTCUBES_POINTS: [[[i64; 3]; 8]; 6] = [
    [
        [1, 1, 1], [0, 1, 1], [1, 1, 0], [0, 1, 0],
        [1, 0, 1], [0, 0, 1], [1, 0, 0], [0, 0, 0],
    ],
    [
        [2, 0, 1], [1, 0, 1], [2, 1, 1], [1, 1, 1],
        [2, 0, 0], [1, 0, 0], [2, 1, 0], [1, 1, 0],
    ],
    [
        [0, 2, 1], [0, 1, 1], [0, 2, 0], [0, 1, 0],
        [1, 2, 1], [1, 1, 1], [1, 2, 0], [1, 1, 0],
    ],
    [
        [1, 2, 1], [1, 2, 0], [2, 2, 1], [2, 2, 0],
        [1, 1, 1], [1, 1, 0], [2, 1, 1], [2, 1, 0],
    ],
    [
        [1, 2, 2], [2, 2, 2], [1, 1, 2], [2, 1, 2],
        [1, 2, 1], [2, 2, 1], [1, 1, 1], [2, 1, 1],
    ],
    [
        [1, 1, 2], [1, 2, 2], [1, 1, 1], [1, 2, 1],
        [0, 1, 2], [0, 2, 2], [0, 1, 1], [0, 2, 1],
    ],
];

/// Six mutually rotated trees; exercises every face orientation code.
pub fn rotcubes() -> Connectivity {
    let mut conn = from_embedding(6, |tree, corner| ROTCUBES_POINTS[tree][corner]);
    derive_edges(&mut conn);
    derive_corners(&mut conn);
    conn
}

/// An m-by-n-by-p lattice of trees with optional axis-wise periodicity.
pub fn brick(
    m: i32,
    n: i32,
    p: i32,
    periodic_x: bool,
    periodic_y: bool,
    periodic_z: bool,
) -> Result<Connectivity, ForestMeshError> {
    for (what, got) in [("brick m", m), ("brick n", n), ("brick p", p)] {
        if got < 1 {
            return Err(ForestMeshError::OutOfRange {
                what,
                got: got as i64,
                bound: TopIdx::MAX as i64,
            });
        }
    }
    let (m, n, p) = (m as i64, n as i64, p as i64);
    let mut conn = from_lattice(m, n, p);
    let tree = |i: i64, j: i64, k: i64| (i + m * (j + n * k)) as TopIdx;
    if periodic_x {
        for j in 0..n {
            for k in 0..p {
                glue_faces(&mut conn, tree(0, j, k), 0, tree(m - 1, j, k), 1, 0);
            }
        }
    }
    if periodic_y {
        for i in 0..m {
            for k in 0..p {
                glue_faces(&mut conn, tree(i, 0, k), 2, tree(i, n - 1, k), 3, 0);
            }
        }
    }
    if periodic_z {
        for i in 0..m {
            for j in 0..n {
                glue_faces(&mut conn, tree(i, j, 0), 4, tree(i, j, p - 1), 5, 0);
            }
        }
    }
    derive_edges(&mut conn);
    derive_corners(&mut conn);
    Ok(conn)
}

/// Cartesian point of a cubed-sphere patch: the radial scale `q` and the
/// two in-patch coordinates `a`, `b` mapped by the patch's sign
/// permutation. The patch order matches the shell geometry.
#[inline]
fn shell_patch_point(patch: usize, q: i64, a: i64, b: i64) -> [i64; 3] {
    match patch {
        0 => [q, -q * a, -q * b],      // right
        1 => [-q * b, -q * a, -q],     // bottom
        2 => [-q, -q * a, q * b],      // left
        3 => [q * b, -q * a, q],       // top
        4 => [-q * a, q, q * b],       // back
        _ => [q * a, -q, q * b],       // front
    }
}

/// 24 trees forming a six-patch spherical shell, four trees per patch.
///
/// Vertices are coarse anchors on the cubed sphere and are reused
/// between patches; the true geometry comes from the shell mapping, so
/// this connectivity is not suitable for the vertex-based completer.
pub fn shell() -> Connectivity {
    let mut conn = from_embedding(24, |tree, corner| {
        let (patch, quad) = (tree / 4, tree % 4);
        let bits = corner_bits(corner);
        let a = (quad as i64 & 1) - 1 + bits[0];
        let b = (quad as i64 >> 1) - 1 + bits[1];
        let q = 1 + bits[2];
        shell_patch_point(patch, q, a, b)
    });
    derive_edges(&mut conn);
    derive_corners(&mut conn);
    conn
}

/// Cartesian point of a solid-sphere patch; the patch order matches the
/// sphere geometry.
#[inline]
fn sphere_patch_point(patch: usize, q: i64, a: i64, b: i64) -> [i64; 3] {
    match patch {
        0 => [q * a, -q, q * b],       // front
        1 => [q * a, q * b, q],        // top
        2 => [q * a, q, -q * b],       // back
        3 => [q, -q * a, -q * b],      // right
        4 => [-q * b, -q * a, -q],     // bottom
        _ => [-q, -q * a, q * b],      // left
    }
}

/// 13 trees forming a solid sphere: six outer-shell patches, six
/// inner-shell patches, and a center cube.
///
/// Like [`shell`], vertices are reused reference anchors and the
/// connectivity is unsuited to the completer.
pub fn sphere() -> Connectivity {
    let mut conn = from_embedding(13, |tree, corner| {
        let bits = corner_bits(corner);
        if tree == 12 {
            return [2 * bits[0] - 1, 2 * bits[1] - 1, 2 * bits[2] - 1];
        }
        let a = 2 * bits[0] - 1;
        let b = 2 * bits[1] - 1;
        let r = 1 + bits[2];
        let q = if tree < 6 { 2 * r } else { r };
        sphere_patch_point(tree % 6, q, a, b)
    });
    derive_edges(&mut conn);
    derive_corners(&mut conn);
    conn
}

/// Axis-aligned lattice of unit cubes with the full vertex grid.
fn from_lattice(m: i64, n: i64, p: i64) -> Connectivity {
    from_embedding((m * n * p) as usize, move |tree, corner| {
        let t = tree as i64;
        let (i, j, k) = (t % m, (t / m) % n, t / (m * n));
        let bits = corner_bits(corner);
        [i + bits[0], j + bits[1], k + bits[2]]
    })
}

/// Build the face skeleton of a connectivity from an embedding of tree
/// corners into integer points: faces whose four corner points coincide
/// are glued, with the orientation code read off the corner matching.
/// Distinct points become shared vertices.
fn from_embedding(
    num_trees: usize,
    point: impl Fn(usize, usize) -> [i64; 3],
) -> Connectivity {
    let mut conn = Connectivity::new(0, num_trees as TopIdx, 0, 0, 0, 0);

    let mut by_face_points: HashMap<[[i64; 3]; 4], Vec<(usize, usize)>> = HashMap::new();
    for tree in 0..num_trees {
        for face in 0..FACES {
            let mut key = [[0i64; 3]; 4];
            for (slot, &corner) in FACE_CORNERS[face].iter().enumerate() {
                key[slot] = point(tree, corner);
            }
            key.sort_unstable();
            by_face_points.entry(key).or_default().push((tree, face));
        }
    }

    for sides in by_face_points.values() {
        debug_assert!(sides.len() <= 2, "more than two faces share a square");
        if let [(tree, face), (ntree, nface)] = sides[..] {
            let by_point: HashMap<[i64; 3], usize> = FACE_CORNERS[nface]
                .iter()
                .map(|&c| (point(ntree, c), c))
                .collect();
            let mut perm = [0usize; 4];
            for (i, &c) in FACE_CORNERS[face].iter().enumerate() {
                let nc = by_point[&point(tree, c)];
                perm[i] = CORNER_FACE_CORNERS[nc][nface] as usize;
            }
            let orientation = if face <= nface {
                perm[0]
            } else {
                perm.iter().position(|&x| x == 0).unwrap()
            };
            debug_assert_eq!(*face_permutation(face, nface, orientation), perm);
            glue_faces(&mut conn, tree as TopIdx, face, ntree as TopIdx, nface, orientation);
        }
    }

    let mut vertex_ids: HashMap<[i64; 3], TopIdx> = HashMap::new();
    conn.tree_to_vertex = vec![[0; 8]; num_trees];
    for tree in 0..num_trees {
        for corner in 0..8 {
            let p = point(tree, corner);
            let next = vertex_ids.len() as TopIdx;
            let id = *vertex_ids.entry(p).or_insert(next);
            if id == next {
                conn.vertices
                    .push([p[0] as f64, p[1] as f64, p[2] as f64]);
            }
            conn.tree_to_vertex[tree][corner] = id;
        }
    }
    conn
}

type Side = (TopIdx, usize);

/// Normalized unordered pair of sides.
#[inline]
fn pair(a: Side, b: Side) -> (Side, Side) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Derive the edge table by transitively closing the face relations.
///
/// Tree edges identified through chains of face gluings form one
/// macro-edge. A macro-edge is recorded iff some pair of its sides is
/// not identified by a single face relation (a diagonal pair), which is
/// exactly when face reciprocity alone does not describe it.
pub(crate) fn derive_edges(conn: &mut Connectivity) {
    if conn.tree_to_edge.is_empty() {
        reset_edge_corner_index(conn);
    }
    let num_trees = conn.tree_to_tree.len();
    let mut seen: HashMap<Side, bool> = HashMap::new();
    let mut direct: HashSet<(Side, Side)> = HashSet::new();
    let mut groups: Vec<Vec<(Side, bool)>> = Vec::new();

    for tree in 0..num_trees as TopIdx {
        for edge in 0..EDGES {
            if seen.contains_key(&(tree, edge)) {
                continue;
            }
            let mut group: Vec<(Side, bool)> = Vec::new();
            let mut queue = vec![((tree, edge), false)];
            seen.insert((tree, edge), false);
            while let Some((side, flip)) = queue.pop() {
                group.push((side, flip));
                let (t, e) = side;
                for &f in &EDGE_FACES[e] {
                    let Some((t2, f2, o)) = conn.face_neighbor(t, f) else {
                        continue;
                    };
                    let (e2, reversed) = edge_across(f, f2, o, e);
                    direct.insert(pair(side, (t2, e2)));
                    if !seen.contains_key(&(t2, e2)) {
                        seen.insert((t2, e2), flip ^ reversed);
                        queue.push(((t2, e2), flip ^ reversed));
                    }
                }
            }
            group.sort_by_key(|&(side, _)| side);
            groups.push(group);
        }
    }

    for group in &groups {
        let stored = group.iter().enumerate().any(|(i, &(a, _))| {
            direct.contains(&pair(a, a))
                || group[i + 1..]
                    .iter()
                    .any(|&(b, _)| !direct.contains(&pair(a, b)))
        });
        if !stored {
            continue;
        }
        let bucket = conn.ett_offset.len() as TopIdx - 1;
        for &((t, e), flip) in group {
            conn.tree_to_edge[t as usize][e] = bucket;
            conn.edge_to_tree.push(t);
            conn.edge_to_edge.push((e + 12 * usize::from(flip)) as i8);
        }
        conn.ett_offset.push(conn.edge_to_tree.len() as TopIdx);
    }
    if conn.num_edges() == 0 {
        conn.tree_to_edge.clear();
    }
}

/// Derive the corner table by transitively closing the face relations.
///
/// A macro-corner is recorded iff some pair of its sides is identified
/// neither by a single face relation nor through a recorded edge bucket.
pub(crate) fn derive_corners(conn: &mut Connectivity) {
    let num_trees = conn.tree_to_tree.len();
    let elink = edge_linked_pairs(conn);
    let mut seen: HashSet<Side> = HashSet::new();

    for tree in 0..num_trees as TopIdx {
        for corner in 0..8 {
            if seen.contains(&(tree, corner)) {
                continue;
            }
            let mut group: Vec<Side> = Vec::new();
            let mut direct: HashSet<(Side, Side)> = HashSet::new();
            let mut queue = vec![(tree, corner)];
            seen.insert((tree, corner));
            while let Some(side) = queue.pop() {
                group.push(side);
                let (t, c) = side;
                for &f in &CORNER_FACES[c] {
                    let Some((t2, f2, o)) = conn.face_neighbor(t, f) else {
                        continue;
                    };
                    let c2 = corner_across(f, f2, o, c);
                    direct.insert(pair(side, (t2, c2)));
                    if seen.insert((t2, c2)) {
                        queue.push((t2, c2));
                    }
                }
            }
            group.sort_unstable();

            let stored = group.iter().enumerate().any(|(i, &a)| {
                direct.contains(&pair(a, a))
                    || group[i + 1..].iter().any(|&b| {
                        !direct.contains(&pair(a, b)) && !elink.contains(&pair(a, b))
                    })
            });
            if !stored {
                continue;
            }
            let bucket = conn.ctt_offset.len() as TopIdx - 1;
            for &(t, c) in &group {
                conn.tree_to_corner[t as usize][c] = bucket;
                conn.corner_to_tree.push(t);
                conn.corner_to_corner.push(c as i8);
            }
            conn.ctt_offset.push(conn.corner_to_tree.len() as TopIdx);
        }
    }
    if conn.num_corners() == 0 {
        conn.tree_to_corner.clear();
    }
}

/// Corner-side pairs identified through a recorded edge bucket.
fn edge_linked_pairs(conn: &Connectivity) -> HashSet<(Side, Side)> {
    let mut out = HashSet::new();
    for bucket in 0..conn.num_edges() {
        let (to_tree, to_edge) = conn.edge_bucket(bucket);
        let ends: Vec<(TopIdx, [usize; 2])> = to_tree
            .iter()
            .zip(to_edge)
            .map(|(&t, &code)| {
                let (e, flip) = (code as usize % 12, code as usize / 12);
                let [c0, c1] = EDGE_CORNERS[e];
                (t, if flip == 1 { [c1, c0] } else { [c0, c1] })
            })
            .collect();
        for (i, &(t, a)) in ends.iter().enumerate() {
            for &(t2, b) in &ends[i + 1..] {
                out.insert(pair((t, a[0]), (t2, b[0])));
                out.insert(pair((t, a[1]), (t2, b[1])));
            }
        }
    }
    out
}
