//! Structural validation of a connectivity.
//!
//! [`Connectivity::is_valid`] is the sole non-assertive invariant
//! checker: it walks every face entry, edge bucket, and corner bucket
//! once and reports the result as a boolean, logging the first violation
//! it finds. Runtime is linear in the number of trees plus the bucket
//! table sizes.

use crate::topology::connectivity::{Connectivity, TopIdx};

impl Connectivity {
    /// Check every structural invariant.
    ///
    /// Returns true iff all counts, index ranges, face reciprocity
    /// relations, and edge/corner bucket closures hold. The first
    /// violation is logged at `warn` level.
    pub fn is_valid(&self) -> bool {
        match self.validate() {
            Ok(()) => true,
            Err(reason) => {
                log::warn!("connectivity invalid: {reason}");
                false
            }
        }
    }

    /// Deep structural equality; exposed for parity with the C-style
    /// interface. Identical to `==`.
    #[inline]
    pub fn is_equal(&self, other: &Connectivity) -> bool {
        self == other
    }

    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        let num_trees = self.tree_to_tree.len();
        let num_vertices = self.vertices.len();

        if self.tree_to_face.len() != num_trees {
            return Err("tree_to_face length mismatch");
        }
        if num_vertices == 0 {
            if !self.tree_to_vertex.is_empty() {
                return Err("tree_to_vertex present without vertices");
            }
        } else if self.tree_to_vertex.len() != num_trees {
            return Err("tree_to_vertex length mismatch");
        }
        if let Some(attr) = &self.tree_to_attr {
            if attr.len() != num_trees {
                return Err("tree_to_attr length mismatch");
            }
        }

        self.validate_faces()?;
        self.validate_vertex_indices()?;
        validate_buckets(
            num_trees,
            &self.tree_to_edge,
            &self.ett_offset,
            &self.edge_to_tree,
            &self.edge_to_edge,
            24,
        )?;
        validate_buckets(
            num_trees,
            &self.tree_to_corner,
            &self.ctt_offset,
            &self.corner_to_tree,
            &self.corner_to_corner,
            8,
        )
    }

    fn validate_faces(&self) -> Result<(), &'static str> {
        let num_trees = self.tree_to_tree.len() as TopIdx;
        for tree in 0..num_trees {
            for face in 0..6 {
                let ntree = self.tree_to_tree[tree as usize][face];
                let code = self.tree_to_face[tree as usize][face];
                if ntree < 0 || ntree >= num_trees {
                    return Err("tree_to_tree out of range");
                }
                if !(0..24).contains(&code) {
                    return Err("tree_to_face out of range");
                }
                let (nface, orientation) = (code as usize % 6, code as usize / 6);
                if ntree == tree && nface == face {
                    if orientation != 0 {
                        return Err("boundary face with nonzero orientation");
                    }
                    continue;
                }
                // reciprocity with the identical orientation code
                if self.tree_to_tree[ntree as usize][nface] != tree {
                    return Err("face neighbor does not point back");
                }
                let back = self.tree_to_face[ntree as usize][nface] as usize;
                if back % 6 != face || back / 6 != orientation {
                    return Err("face reciprocity code mismatch");
                }
            }
        }
        Ok(())
    }

    fn validate_vertex_indices(&self) -> Result<(), &'static str> {
        let num_vertices = self.vertices.len() as TopIdx;
        for corners in &self.tree_to_vertex {
            for &v in corners {
                if v < 0 || v >= num_vertices {
                    return Err("tree_to_vertex out of range");
                }
            }
        }
        Ok(())
    }
}

/// Shared range and closure checks for the edge and corner tables.
/// Every bucket entry must point back through the per-tree index, and
/// every recorded `(tree, local)` pair must occur in its bucket exactly
/// once.
fn validate_buckets<const N: usize>(
    num_trees: usize,
    per_tree: &[[TopIdx; N]],
    offset: &[TopIdx],
    to_tree: &[TopIdx],
    to_local: &[i8],
    code_bound: i8,
) -> Result<(), &'static str> {
    let num_buckets = offset.len() as TopIdx - 1;
    if !per_tree.is_empty() && per_tree.len() != num_trees {
        return Err("per-tree index table length mismatch");
    }
    if to_tree.len() != to_local.len() {
        return Err("bucket table length mismatch");
    }
    if offset.is_empty() || offset[0] != 0 {
        return Err("bucket offsets must start at zero");
    }
    if *offset.last().unwrap() as usize != to_tree.len() {
        return Err("bucket offsets must end at the table size");
    }
    if offset.windows(2).any(|w| w[0] > w[1]) {
        return Err("bucket offsets must be non-decreasing");
    }
    if num_buckets > 0 && per_tree.is_empty() {
        return Err("buckets recorded without a per-tree index table");
    }

    for k in 0..num_buckets as usize {
        let lo = offset[k] as usize;
        let hi = offset[k + 1] as usize;
        for i in lo..hi {
            let tree = to_tree[i];
            let code = to_local[i];
            if tree < 0 || tree as usize >= num_trees {
                return Err("bucket tree out of range");
            }
            if code < 0 || code >= code_bound {
                return Err("bucket code out of range");
            }
            let local = code as usize % N;
            if per_tree[tree as usize][local] != k as TopIdx {
                return Err("bucket entry does not point back");
            }
        }
    }

    for (tree, row) in per_tree.iter().enumerate() {
        for (local, &bucket) in row.iter().enumerate() {
            if bucket < -1 || bucket >= num_buckets {
                return Err("per-tree bucket index out of range");
            }
            if bucket < 0 {
                continue;
            }
            let lo = offset[bucket as usize] as usize;
            let hi = offset[bucket as usize + 1] as usize;
            let hits = (lo..hi)
                .filter(|&i| to_tree[i] as usize == tree && to_local[i] as usize % N == local)
                .count();
            if hits != 1 {
                return Err("bucket must list each recorded side exactly once");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::topology::builtin;
    use crate::topology::connectivity::glue_faces;

    #[test]
    fn broken_reciprocity_is_rejected() {
        let mut conn = builtin::twocubes();
        assert!(conn.is_valid());
        // point tree 0's +x face at the wrong orientation
        conn.tree_to_face[0][1] = 6;
        assert!(!conn.is_valid());
    }

    #[test]
    fn broken_bucket_is_rejected() {
        let mut conn = builtin::periodic();
        assert!(conn.is_valid());
        conn.edge_to_edge[0] ^= 1;
        assert!(!conn.is_valid());
    }

    #[test]
    fn boundary_orientation_must_be_zero() {
        let mut conn = builtin::unitcube();
        conn.tree_to_face[0][0] = 6;
        assert!(!conn.is_valid());
        conn.tree_to_face[0][0] = 0;
        assert!(conn.is_valid());
    }

    #[test]
    fn self_gluing_through_distinct_faces_is_accepted() {
        let mut conn = builtin::unitcube();
        glue_faces(&mut conn, 0, 0, 0, 1, 0);
        assert!(conn.is_valid());
    }
}
