//! Numerical contracts of the built-in geometries: positive Jacobian
//! determinants, agreement between the fast determinant path and the
//! full Jacobian, cofactor inverse correctness, and continuity of the
//! forward map across glued patch faces.

use forest_mesh::prelude::*;
use forest_mesh::topology::builtin;
use forest_mesh::topology::constants::face_side;

const REL: f64 = 1e-10;

fn grid(samples: usize) -> Vec<f64> {
    (0..samples)
        .map(|i| (i as f64 + 0.5) / samples as f64)
        .collect()
}

/// Reference-cube domain of one axis of one tree.
fn axis_domain(geometry_trees: TopIdx, tree: TopIdx, axis: usize) -> (f64, f64) {
    // the radial axis of shell/sphere patches runs over [1, 2]
    let radial = axis == 2 && (geometry_trees == 24 || (geometry_trees == 13 && tree < 12));
    if radial {
        (1.0, 2.0)
    } else {
        (-1.0, 1.0)
    }
}

fn check_jacobians(geom: &dyn Geometry, num_trees: TopIdx) {
    let mut jac = [[0.0; 3]; 3];
    let mut jit = [[0.0; 3]; 3];
    for tree in 0..num_trees {
        for &u in &grid(4) {
            for &v in &grid(4) {
                for &w in &grid(4) {
                    let abc = [
                        lerp(axis_domain(num_trees, tree, 0), u),
                        lerp(axis_domain(num_trees, tree, 1), v),
                        lerp(axis_domain(num_trees, tree, 2), w),
                    ];
                    let fast = geom.d(tree, abc);
                    assert!(fast > 0.0, "tree {tree} at {abc:?}: det {fast}");
                    let full = geom.j(tree, abc, &mut jac);
                    assert!(
                        (full - fast).abs() <= REL * full.abs(),
                        "tree {tree} at {abc:?}: {full} vs {fast}"
                    );
                    let det = geom.jit(tree, abc, &mut jit);
                    assert!((det - full).abs() <= REL * full.abs());
                    // Jit^T J = I
                    for row in 0..3 {
                        for col in 0..3 {
                            let mut sum = 0.0;
                            for k in 0..3 {
                                sum += jit[k][row] * jac[k][col];
                            }
                            let expect = if row == col { 1.0 } else { 0.0 };
                            assert!(
                                (sum - expect).abs() < REL,
                                "tree {tree} at {abc:?}: ({row},{col}) = {sum}"
                            );
                        }
                    }
                }
            }
        }
    }
}

fn lerp((lo, hi): (f64, f64), u: f64) -> f64 {
    lo + (hi - lo) * u
}

#[test]
fn identity_jacobians() {
    check_jacobians(&IdentityGeometry, 1);
}

#[test]
fn shell_jacobians() {
    check_jacobians(&ShellGeometry::new(2.0, 1.0), 24);
    check_jacobians(&ShellGeometry::new(6.371, 3.480), 24);
}

#[test]
fn sphere_jacobians() {
    check_jacobians(&SphereGeometry::new(2.0, 1.0, 0.5), 13);
    check_jacobians(&SphereGeometry::new(10.0, 4.0, 1.5), 13);
}

/// Map a point on a tree face into the neighbor's reference frame using
/// the face transform, normalizing each axis over its domain.
fn across_face(
    conn: &Connectivity,
    num_trees: TopIdx,
    tree: TopIdx,
    face: usize,
    inface: [f64; 2],
) -> Option<(TopIdx, [f64; 3])> {
    let ft = find_face_transform(conn, tree, face)?;
    let t = &ft.ftransform;
    let (a0, a1) = (t[0] as usize, t[1] as usize);

    let mut unit = [0.0; 3];
    unit[a0] = inface[0];
    unit[a1] = inface[1];
    unit[t[2] as usize] = face_side(face) as f64;

    let (b0, b1, b2) = (t[3] as usize, t[4] as usize, t[5] as usize);
    let (_, nface, _) = conn.face_neighbor(tree, face).unwrap();
    let mut nunit = [0.0; 3];
    nunit[b0] = if t[6] == 1 { 1.0 - unit[a0] } else { unit[a0] };
    nunit[b1] = if t[7] == 1 { 1.0 - unit[a1] } else { unit[a1] };
    nunit[b2] = face_side(nface) as f64;

    let mut abc = [0.0; 3];
    for axis in 0..3 {
        abc[axis] = lerp(axis_domain(num_trees, ft.ntree, axis), nunit[axis]);
    }
    Some((ft.ntree, abc))
}

fn check_continuity(conn: &Connectivity, geom: &dyn Geometry) {
    let num_trees = conn.num_trees();
    for tree in 0..num_trees {
        for face in 0..6 {
            for &u in &grid(3) {
                for &v in &grid(3) {
                    let Some((ntree, nabc)) =
                        across_face(conn, num_trees, tree, face, [u, v])
                    else {
                        continue;
                    };
                    let ft = find_face_transform(conn, tree, face).unwrap();
                    let t = &ft.ftransform;
                    let mut unit = [0.0; 3];
                    unit[t[0] as usize] = u;
                    unit[t[1] as usize] = v;
                    unit[t[2] as usize] = face_side(face) as f64;
                    let mut abc = [0.0; 3];
                    for axis in 0..3 {
                        abc[axis] = lerp(axis_domain(num_trees, tree, axis), unit[axis]);
                    }

                    let here = geom.x(tree, abc);
                    let there = geom.x(ntree, nabc);
                    for axis in 0..3 {
                        assert!(
                            (here[axis] - there[axis]).abs() < 1e-12,
                            "tree {tree} face {face} at ({u},{v}): {here:?} vs {there:?}"
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn shell_map_is_continuous_across_patches() {
    check_continuity(&builtin::shell(), &ShellGeometry::new(2.0, 1.0));
}

#[test]
fn sphere_map_is_continuous_across_patches() {
    check_continuity(&builtin::sphere(), &SphereGeometry::new(2.0, 1.0, 0.5));
}

#[test]
fn shell_forward_map_scenario() {
    let geom = ShellGeometry::new(2.0, 1.0);
    let xyz = geom.x(0, [0.0, 0.0, 1.5]);
    let r = 0.5 * 2.0_f64.powf(1.5);
    assert!((xyz[0] - r).abs() < 1e-8);
    assert!(xyz[1].abs() < 1e-12 && xyz[2].abs() < 1e-12);
}

#[test]
fn sphere_center_scenario() {
    let geom = SphereGeometry::new(2.0, 1.0, 0.5);
    let c = 0.5 / 3.0_f64.sqrt();
    let xyz = geom.x(12, [1.0, 1.0, 1.0]);
    assert_eq!(xyz, [c, c, c]);
    assert!((geom.d(12, [1.0, 1.0, 1.0]) - c * c * c).abs() < 1e-15);
}

#[test]
fn boundary_faces_have_no_partner() {
    // the shell's inner and outer radial boundaries stay boundaries
    let conn = builtin::shell();
    for tree in 0..24 {
        assert!(find_face_transform(&conn, tree, 4).is_none());
        assert!(find_face_transform(&conn, tree, 5).is_none());
    }
}
