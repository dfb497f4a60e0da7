//! Every factory output satisfies the full invariant web, checked both
//! through the validator and by quantifying the reciprocity and bucket
//! closure properties directly.

use forest_mesh::prelude::*;
use forest_mesh::topology::builtin;

fn all_builtins() -> Vec<(&'static str, Connectivity)> {
    vec![
        ("unitcube", builtin::unitcube()),
        ("periodic", builtin::periodic()),
        ("rotwrap", builtin::rotwrap()),
        ("twocubes", builtin::twocubes()),
        ("twowrap", builtin::twowrap()),
        ("rotcubes", builtin::rotcubes()),
        ("brick221", builtin::brick(2, 2, 1, false, false, false).unwrap()),
        ("brick222p", builtin::brick(2, 2, 2, true, true, false).unwrap()),
        ("brick321", builtin::brick(3, 2, 1, true, false, true).unwrap()),
        ("shell", builtin::shell()),
        ("sphere", builtin::sphere()),
    ]
}

#[test]
fn factories_validate() {
    for (name, conn) in all_builtins() {
        assert!(conn.is_valid(), "{name}");
    }
}

#[test]
fn face_reciprocity_holds_everywhere() {
    for (name, conn) in all_builtins() {
        for tree in 0..conn.num_trees() {
            for face in 0..6 {
                match conn.face_neighbor(tree, face) {
                    None => {
                        assert_eq!(conn.tree_to_tree(tree)[face], tree, "{name}");
                        assert_eq!(conn.tree_to_face(tree)[face] as usize, face, "{name}");
                    }
                    Some((ntree, nface, orientation)) => {
                        let (btree, bface, borientation) =
                            conn.face_neighbor(ntree, nface).expect("reciprocal entry");
                        assert_eq!((btree, bface, borientation), (tree, face, orientation),
                            "{name}: tree {tree} face {face}");
                    }
                }
            }
        }
    }
}

#[test]
fn edge_buckets_close() {
    for (name, conn) in all_builtins() {
        for tree in 0..conn.num_trees() {
            let Some(row) = conn.tree_to_edge(tree) else {
                assert_eq!(conn.num_edges(), 0, "{name}");
                continue;
            };
            for (edge, &bucket) in row.iter().enumerate() {
                if bucket < 0 {
                    continue;
                }
                let (to_tree, to_edge) = conn.edge_bucket(bucket);
                let hits = to_tree
                    .iter()
                    .zip(to_edge)
                    .filter(|&(&t, &code)| t == tree && code as usize % 12 == edge)
                    .count();
                assert_eq!(hits, 1, "{name}: tree {tree} edge {edge}");
            }
        }
        // and the reverse direction
        for bucket in 0..conn.num_edges() {
            let (to_tree, to_edge) = conn.edge_bucket(bucket);
            assert!(!to_tree.is_empty(), "{name}: empty bucket {bucket}");
            for (&t, &code) in to_tree.iter().zip(to_edge) {
                let edge = code as usize % 12;
                assert_eq!(conn.tree_to_edge(t).unwrap()[edge], bucket, "{name}");
            }
        }
    }
}

#[test]
fn corner_buckets_close() {
    for (name, conn) in all_builtins() {
        for tree in 0..conn.num_trees() {
            let Some(row) = conn.tree_to_corner(tree) else {
                assert_eq!(conn.num_corners(), 0, "{name}");
                continue;
            };
            for (corner, &bucket) in row.iter().enumerate() {
                if bucket < 0 {
                    continue;
                }
                let (to_tree, to_corner) = conn.corner_bucket(bucket);
                let hits = to_tree
                    .iter()
                    .zip(to_corner)
                    .filter(|&(&t, &c)| t == tree && c as usize == corner)
                    .count();
                assert_eq!(hits, 1, "{name}: tree {tree} corner {corner}");
            }
        }
        for bucket in 0..conn.num_corners() {
            let (to_tree, to_corner) = conn.corner_bucket(bucket);
            assert!(!to_tree.is_empty(), "{name}: empty bucket {bucket}");
            for (&t, &c) in to_tree.iter().zip(to_corner) {
                assert_eq!(
                    conn.tree_to_corner(t).unwrap()[c as usize],
                    bucket,
                    "{name}"
                );
            }
        }
    }
}

#[test]
fn completer_outputs_validate() {
    for (name, mut conn) in all_builtins() {
        if matches!(name, "shell" | "sphere") {
            // vertex reuse makes these unsuited to completion
            continue;
        }
        complete(&mut conn);
        assert!(conn.is_valid(), "{name} after complete");
    }
}

#[test]
fn from_arrays_round_trips_and_validates() {
    let conn = builtin::periodic();
    let rebuilt = Connectivity::from_arrays(
        &(0..conn.num_vertices()).map(|v| conn.vertex(v)).collect::<Vec<_>>(),
        &[*conn.tree_to_vertex(0).unwrap()],
        &[*conn.tree_to_tree(0)],
        &[*conn.tree_to_face(0)],
        &[*conn.tree_to_edge(0).unwrap()],
        &[0, 4, 8, 12],
        &(0..conn.num_edges())
            .flat_map(|e| conn.edge_bucket(e).0.to_vec())
            .collect::<Vec<_>>(),
        &(0..conn.num_edges())
            .flat_map(|e| conn.edge_bucket(e).1.to_vec())
            .collect::<Vec<_>>(),
        &[*conn.tree_to_corner(0).unwrap()],
        &[0, conn.corner_bucket(0).0.len() as TopIdx],
        conn.corner_bucket(0).0,
        conn.corner_bucket(0).1,
    )
    .unwrap();
    assert!(rebuilt.is_equal(&conn));

    // a broken face entry must be rejected
    let mut bad_faces = [*conn.tree_to_face(0)];
    bad_faces[0][0] = 7;
    assert!(Connectivity::from_arrays(
        &(0..conn.num_vertices()).map(|v| conn.vertex(v)).collect::<Vec<_>>(),
        &[*conn.tree_to_vertex(0).unwrap()],
        &[*conn.tree_to_tree(0)],
        &bad_faces,
        &[*conn.tree_to_edge(0).unwrap()],
        &[0, 4, 8, 12],
        &(0..conn.num_edges())
            .flat_map(|e| conn.edge_bucket(e).0.to_vec())
            .collect::<Vec<_>>(),
        &(0..conn.num_edges())
            .flat_map(|e| conn.edge_bucket(e).1.to_vec())
            .collect::<Vec<_>>(),
        &[*conn.tree_to_corner(0).unwrap()],
        &[0, 8],
        conn.corner_bucket(0).0,
        conn.corner_bucket(0).1,
    )
    .is_err());
}
