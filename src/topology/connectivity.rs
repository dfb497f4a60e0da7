//! The macro-mesh graph: vertices, trees, and their face/edge/corner
//! gluings.
//!
//! A [`Connectivity`] owns every buffer it references and is immutable in
//! the steady state: factories and the completer populate it, after which
//! any number of threads may run read-only queries concurrently. The edge
//! and corner tables are compressed ragged arrays: the entries of edge `e`
//! live at `edge_to_tree[ett_offset[e]..ett_offset[e + 1]]`, and likewise
//! for corners.

use crate::forest_error::ForestMeshError;
use crate::topology::constants::{EDGES, FACES};

/// Topology index: wide enough for the total tree/vertex/edge/corner count.
pub type TopIdx = i32;

/// 3D inter-tree connectivity information.
///
/// The per-tree arrays are stored in z order: corners 0..8 wrt. zyx as
/// 000 001 010 011 100 101 110 111, faces as -x +x -y +y -z +z.
/// `tree_to_face` values are in 0..24, packing the neighbor's face number
/// (`ttf % 6`) and the face orientation code (`ttf / 6`). A face with no
/// distinct neighbor connects to itself with orientation zero.
///
/// Edges and corners are recorded only when they connect trees beyond
/// what face reciprocity already describes; otherwise the `tree_to_edge`
/// or `tree_to_corner` entry is -1. `edge_to_edge` values are in 0..24,
/// where the lower 12 indicate one edge orientation and the higher 12 the
/// opposite orientation.
#[derive(Debug, Clone, PartialEq)]
pub struct Connectivity {
    pub(crate) vertices: Vec<[f64; 3]>,
    pub(crate) tree_to_vertex: Vec<[TopIdx; 8]>,
    pub(crate) tree_to_attr: Option<Vec<i8>>,

    pub(crate) tree_to_tree: Vec<[TopIdx; 6]>,
    pub(crate) tree_to_face: Vec<[i8; 6]>,

    pub(crate) tree_to_edge: Vec<[TopIdx; 12]>,
    pub(crate) ett_offset: Vec<TopIdx>,
    pub(crate) edge_to_tree: Vec<TopIdx>,
    pub(crate) edge_to_edge: Vec<i8>,

    pub(crate) tree_to_corner: Vec<[TopIdx; 8]>,
    pub(crate) ctt_offset: Vec<TopIdx>,
    pub(crate) corner_to_tree: Vec<TopIdx>,
    pub(crate) corner_to_corner: Vec<i8>,
}

impl Connectivity {
    /// Allocate a connectivity with all arrays sized for the given counts.
    ///
    /// Trees start out with all six faces self-connected and no edge or
    /// corner records; vertex coordinates start at the origin. The caller
    /// populates the arrays before use.
    pub fn new(
        num_vertices: TopIdx,
        num_trees: TopIdx,
        num_edges: TopIdx,
        num_ett: TopIdx,
        num_corners: TopIdx,
        num_ctt: TopIdx,
    ) -> Self {
        let nv = num_vertices.max(0) as usize;
        let nt = num_trees.max(0) as usize;
        let ne = num_edges.max(0) as usize;
        let nc = num_corners.max(0) as usize;
        Self {
            vertices: vec![[0.0; 3]; nv],
            tree_to_vertex: if nv > 0 { vec![[0; 8]; nt] } else { Vec::new() },
            tree_to_attr: None,
            tree_to_tree: (0..nt as TopIdx).map(|t| [t; 6]).collect(),
            tree_to_face: (0..nt).map(|_| [0, 1, 2, 3, 4, 5]).collect(),
            tree_to_edge: if ne > 0 { vec![[-1; 12]; nt] } else { Vec::new() },
            ett_offset: vec![0; ne + 1],
            edge_to_tree: vec![0; num_ett.max(0) as usize],
            edge_to_edge: vec![0; num_ett.max(0) as usize],
            tree_to_corner: if nc > 0 { vec![[-1; 8]; nt] } else { Vec::new() },
            ctt_offset: vec![0; nc + 1],
            corner_to_tree: vec![0; num_ctt.max(0) as usize],
            corner_to_corner: vec![0; num_ctt.max(0) as usize],
        }
    }

    /// Deep-copy caller-provided arrays into a new connectivity and
    /// validate it.
    ///
    /// Vertex data may be empty, in which case `tree_to_vertex` must be
    /// empty as well. Returns [`ForestMeshError::InvalidConnectivity`]
    /// when any structural invariant fails; the partially built value is
    /// dropped before returning.
    #[allow(clippy::too_many_arguments)]
    pub fn from_arrays(
        vertices: &[[f64; 3]],
        tree_to_vertex: &[[TopIdx; 8]],
        tree_to_tree: &[[TopIdx; 6]],
        tree_to_face: &[[i8; 6]],
        tree_to_edge: &[[TopIdx; 12]],
        ett_offset: &[TopIdx],
        edge_to_tree: &[TopIdx],
        edge_to_edge: &[i8],
        tree_to_corner: &[[TopIdx; 8]],
        ctt_offset: &[TopIdx],
        corner_to_tree: &[TopIdx],
        corner_to_corner: &[i8],
    ) -> Result<Self, ForestMeshError> {
        let conn = Self {
            vertices: vertices.to_vec(),
            tree_to_vertex: tree_to_vertex.to_vec(),
            tree_to_attr: None,
            tree_to_tree: tree_to_tree.to_vec(),
            tree_to_face: tree_to_face.to_vec(),
            tree_to_edge: tree_to_edge.to_vec(),
            ett_offset: ett_offset.to_vec(),
            edge_to_tree: edge_to_tree.to_vec(),
            edge_to_edge: edge_to_edge.to_vec(),
            tree_to_corner: tree_to_corner.to_vec(),
            ctt_offset: ctt_offset.to_vec(),
            corner_to_tree: corner_to_tree.to_vec(),
            corner_to_corner: corner_to_corner.to_vec(),
        };
        match conn.validate() {
            Ok(()) => Ok(conn),
            Err(reason) => Err(ForestMeshError::InvalidConnectivity(reason)),
        }
    }

    /// Number of geometric vertices; zero when the connectivity carries
    /// no vertex anchors.
    #[inline]
    pub fn num_vertices(&self) -> TopIdx {
        self.vertices.len() as TopIdx
    }

    /// Number of trees.
    #[inline]
    pub fn num_trees(&self) -> TopIdx {
        self.tree_to_tree.len() as TopIdx
    }

    /// Number of tree-connecting edges.
    #[inline]
    pub fn num_edges(&self) -> TopIdx {
        (self.ett_offset.len() - 1) as TopIdx
    }

    /// Number of tree-connecting corners.
    #[inline]
    pub fn num_corners(&self) -> TopIdx {
        (self.ctt_offset.len() - 1) as TopIdx
    }

    /// Total entries in the edge-to-tree table.
    #[inline]
    pub fn num_ett(&self) -> TopIdx {
        self.edge_to_tree.len() as TopIdx
    }

    /// Total entries in the corner-to-tree table.
    #[inline]
    pub fn num_ctt(&self) -> TopIdx {
        self.corner_to_tree.len() as TopIdx
    }

    /// Coordinates of one vertex.
    #[inline]
    pub fn vertex(&self, vertex: TopIdx) -> [f64; 3] {
        self.vertices[vertex as usize]
    }

    /// Corner vertex indices of one tree; `None` when vertices are absent.
    #[inline]
    pub fn tree_to_vertex(&self, tree: TopIdx) -> Option<&[TopIdx; 8]> {
        self.tree_to_vertex.get(tree as usize)
    }

    /// Face neighbor trees of one tree.
    #[inline]
    pub fn tree_to_tree(&self, tree: TopIdx) -> &[TopIdx; 6] {
        &self.tree_to_tree[tree as usize]
    }

    /// Packed neighbor face/orientation codes of one tree.
    #[inline]
    pub fn tree_to_face(&self, tree: TopIdx) -> &[i8; 6] {
        &self.tree_to_face[tree as usize]
    }

    /// Edge table indices of one tree, -1 where no edge is recorded.
    #[inline]
    pub fn tree_to_edge(&self, tree: TopIdx) -> Option<&[TopIdx; 12]> {
        self.tree_to_edge.get(tree as usize)
    }

    /// Corner table indices of one tree, -1 where no corner is recorded.
    #[inline]
    pub fn tree_to_corner(&self, tree: TopIdx) -> Option<&[TopIdx; 8]> {
        self.tree_to_corner.get(tree as usize)
    }

    /// All `(tree, edge code)` sides of one macro-edge, as borrowed
    /// slices into the compressed tables.
    #[inline]
    pub fn edge_bucket(&self, edge: TopIdx) -> (&[TopIdx], &[i8]) {
        let lo = self.ett_offset[edge as usize] as usize;
        let hi = self.ett_offset[edge as usize + 1] as usize;
        (&self.edge_to_tree[lo..hi], &self.edge_to_edge[lo..hi])
    }

    /// All `(tree, corner)` sides of one macro-corner.
    #[inline]
    pub fn corner_bucket(&self, corner: TopIdx) -> (&[TopIdx], &[i8]) {
        let lo = self.ctt_offset[corner as usize] as usize;
        let hi = self.ctt_offset[corner as usize + 1] as usize;
        (&self.corner_to_tree[lo..hi], &self.corner_to_corner[lo..hi])
    }

    /// Decode a face entry into `(neighbor_tree, neighbor_face,
    /// orientation)`, or `None` for a boundary face.
    #[inline]
    pub fn face_neighbor(&self, tree: TopIdx, face: usize) -> Option<(TopIdx, usize, usize)> {
        let ntree = self.tree_to_tree[tree as usize][face];
        let code = self.tree_to_face[tree as usize][face] as usize;
        let (nface, orientation) = (code % 6, code / 6);
        if ntree == tree && nface == face {
            None
        } else {
            Some((ntree, nface, orientation))
        }
    }

    /// User attribute byte of one tree, if attributes are enabled.
    #[inline]
    pub fn tree_attr(&self, tree: TopIdx) -> Option<i8> {
        self.tree_to_attr.as_ref().map(|a| a[tree as usize])
    }

    /// Set the attribute byte of one tree. Attributes must be enabled.
    #[inline]
    pub fn set_tree_attr_value(&mut self, tree: TopIdx, attr: i8) {
        self.tree_to_attr
            .as_mut()
            .expect("tree attributes are not enabled")[tree as usize] = attr;
    }

    /// Allocate or free the per-tree attribute array. Idempotent.
    pub fn set_tree_attr(&mut self, enable: bool) {
        if enable {
            if self.tree_to_attr.is_none() {
                self.tree_to_attr = Some(vec![0; self.tree_to_tree.len()]);
            }
        } else {
            self.tree_to_attr = None;
        }
    }

    /// Memory used by this connectivity in bytes, including every owned
    /// buffer.
    pub fn memory_used(&self) -> usize {
        use std::mem::size_of;
        size_of::<Self>()
            + self.vertices.len() * size_of::<[f64; 3]>()
            + self.tree_to_vertex.len() * size_of::<[TopIdx; 8]>()
            + self.tree_to_attr.as_ref().map_or(0, |a| a.len())
            + self.tree_to_tree.len() * size_of::<[TopIdx; 6]>()
            + self.tree_to_face.len() * size_of::<[i8; 6]>()
            + self.tree_to_edge.len() * size_of::<[TopIdx; 12]>()
            + self.ett_offset.len() * size_of::<TopIdx>()
            + self.edge_to_tree.len() * size_of::<TopIdx>()
            + self.edge_to_edge.len()
            + self.tree_to_corner.len() * size_of::<[TopIdx; 8]>()
            + self.ctt_offset.len() * size_of::<TopIdx>()
            + self.corner_to_tree.len() * size_of::<TopIdx>()
            + self.corner_to_corner.len()
    }

    #[inline]
    pub(crate) fn in_tree_range(&self, tree: TopIdx) -> bool {
        tree >= 0 && (tree as usize) < self.tree_to_tree.len()
    }
}

/// Glue two tree faces together with the given orientation, writing both
/// reciprocal entries.
pub(crate) fn glue_faces(
    conn: &mut Connectivity,
    tree: TopIdx,
    face: usize,
    ntree: TopIdx,
    nface: usize,
    orientation: usize,
) {
    debug_assert!(face < FACES && nface < FACES && orientation < 4);
    conn.tree_to_tree[tree as usize][face] = ntree;
    conn.tree_to_face[tree as usize][face] = (nface + 6 * orientation) as i8;
    conn.tree_to_tree[ntree as usize][nface] = tree;
    conn.tree_to_face[ntree as usize][nface] = (face + 6 * orientation) as i8;
}

/// Drop all edge records, leaving an edge-less connectivity.
pub(crate) fn clear_edges(conn: &mut Connectivity) {
    conn.tree_to_edge.clear();
    conn.ett_offset = vec![0];
    conn.edge_to_tree.clear();
    conn.edge_to_edge.clear();
}

/// Drop all corner records.
pub(crate) fn clear_corners(conn: &mut Connectivity) {
    conn.tree_to_corner.clear();
    conn.ctt_offset = vec![0];
    conn.corner_to_tree.clear();
    conn.corner_to_corner.clear();
}

/// Size the per-tree edge/corner index arrays, filled with -1.
pub(crate) fn reset_edge_corner_index(conn: &mut Connectivity) {
    let nt = conn.tree_to_tree.len();
    conn.tree_to_edge = vec![[-1; EDGES]; nt];
    conn.tree_to_corner = vec![[-1; 8]; nt];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_self_connected() {
        let conn = Connectivity::new(0, 2, 0, 0, 0, 0);
        assert_eq!(conn.num_trees(), 2);
        assert_eq!(conn.num_vertices(), 0);
        assert!(conn.face_neighbor(1, 3).is_none());
        assert!(conn.tree_to_vertex(0).is_none());
        assert!(conn.is_valid());
    }

    #[test]
    fn attr_toggle_is_idempotent() {
        let mut conn = Connectivity::new(0, 3, 0, 0, 0, 0);
        assert_eq!(conn.tree_attr(1), None);
        conn.set_tree_attr(true);
        conn.set_tree_attr(true);
        conn.set_tree_attr_value(1, 7);
        assert_eq!(conn.tree_attr(1), Some(7));
        conn.set_tree_attr(false);
        assert_eq!(conn.tree_attr(1), None);
    }

    #[test]
    fn memory_used_counts_buffers() {
        let small = Connectivity::new(0, 1, 0, 0, 0, 0).memory_used();
        let big = Connectivity::new(8, 4, 3, 12, 1, 8).memory_used();
        assert!(big > small);
    }
}
