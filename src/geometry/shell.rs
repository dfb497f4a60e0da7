//! Spherical shell geometry.
//!
//! Maps the 24-tree shell connectivity onto the volume between two
//! concentric spheres. The two angular axes are graded with a tangent
//! transform for uniform surface spacing; the radial axis `abc[2]` in
//! `[1, 2]` is graded exponentially between the inner radius `r1` and
//! the outer radius `r2`.

use std::f64::consts::FRAC_PI_4;

use crate::geometry::{check_det, det3, place_rows, Geometry};
use crate::topology::connectivity::TopIdx;

/// Which Cartesian axis receives the x-, y-, and radial component of a
/// patch, by patch id `which_tree / 4`: right, bottom, left, top, back,
/// front.
const PATCH_AXES: [[usize; 3]; 6] = [
    [1, 2, 0],
    [1, 0, 2],
    [1, 2, 0],
    [1, 0, 2],
    [0, 2, 1],
    [0, 2, 1],
];
const PATCH_SIGNS: [[f64; 3]; 6] = [
    [-1.0, -1.0, 1.0],
    [-1.0, -1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, 1.0, 1.0],
    [-1.0, 1.0, 1.0],
    [1.0, 1.0, -1.0],
];

/// Geometry of a spherical shell between radii `r1 < r2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShellGeometry {
    r2: f64,
    r1: f64,
    r2_by_r1: f64,
    r1sqr_by_r2: f64,
    rlog: f64,
}

impl ShellGeometry {
    /// Build a shell geometry for outer radius `r2` and inner radius
    /// `r1`.
    pub fn new(r2: f64, r1: f64) -> Self {
        assert!(0.0 < r1 && r1 < r2, "need 0 < r1 < r2");
        Self {
            r2,
            r1,
            r2_by_r1: r2 / r1,
            r1sqr_by_r2: r1 * r1 / r2,
            rlog: (r2 / r1).ln(),
        }
    }

    /// Outer radius.
    #[inline]
    pub fn r2(&self) -> f64 {
        self.r2
    }

    /// Inner radius.
    #[inline]
    pub fn r1(&self) -> f64 {
        self.r1
    }

    #[inline]
    fn radius(&self, c: f64) -> f64 {
        self.r1sqr_by_r2 * self.r2_by_r1.powf(c)
    }

    #[inline]
    fn check_domain(&self, which_tree: TopIdx, abc: [f64; 3]) {
        debug_assert!((0..24).contains(&which_tree), "shell tree out of range");
        debug_assert!(abc[0].abs() <= 1.0 + 1e-12 && abc[1].abs() <= 1.0 + 1e-12);
        debug_assert!((1.0 - 1e-12..=2.0 + 1e-12).contains(&abc[2]));
        let _ = (which_tree, abc);
    }
}

impl Geometry for ShellGeometry {
    fn x(&self, which_tree: TopIdx, abc: [f64; 3]) -> [f64; 3] {
        self.check_domain(which_tree, abc);

        // tangent grading of the angular axes
        let x = (abc[0] * FRAC_PI_4).tan();
        let y = (abc[1] * FRAC_PI_4).tan();
        let r = self.radius(abc[2]);
        let q = r / (x * x + y * y + 1.0).sqrt();

        let patch = which_tree as usize / 4;
        let axes = PATCH_AXES[patch];
        let signs = PATCH_SIGNS[patch];
        let mut xyz = [0.0; 3];
        xyz[axes[0]] = signs[0] * q * x;
        xyz[axes[1]] = signs[1] * q * y;
        xyz[axes[2]] = signs[2] * q;
        xyz
    }

    fn j(&self, which_tree: TopIdx, abc: [f64; 3], jac: &mut [[f64; 3]; 3]) -> f64 {
        self.check_domain(which_tree, abc);

        let cx = (abc[0] * FRAC_PI_4).cos();
        let derx = FRAC_PI_4 / (cx * cx);
        let x = (abc[0] * FRAC_PI_4).tan();
        let cy = (abc[1] * FRAC_PI_4).cos();
        let dery = FRAC_PI_4 / (cy * cy);
        let y = (abc[1] * FRAC_PI_4).tan();

        let r = self.radius(abc[2]);
        let t = 1.0 / (x * x + y * y + 1.0);
        let q = r * t.sqrt();
        let rlog = self.rlog;

        let patch = which_tree as usize / 4;
        place_rows(
            jac,
            PATCH_AXES[patch],
            PATCH_SIGNS[patch],
            [
                [
                    q * (1.0 - x * x * t) * derx,
                    -q * x * y * t * dery,
                    q * x * rlog,
                ],
                [
                    -q * x * y * t * derx,
                    q * (1.0 - y * y * t) * dery,
                    q * y * rlog,
                ],
                [-q * x * t * derx, -q * y * t * dery, q * rlog],
            ],
        );
        check_det(which_tree, det3(jac))
    }

    fn d(&self, which_tree: TopIdx, abc: [f64; 3]) -> f64 {
        self.check_domain(which_tree, abc);

        let cx = (abc[0] * FRAC_PI_4).cos();
        let derx = FRAC_PI_4 / (cx * cx);
        let x = (abc[0] * FRAC_PI_4).tan();
        let cy = (abc[1] * FRAC_PI_4).cos();
        let dery = FRAC_PI_4 / (cy * cy);
        let y = (abc[1] * FRAC_PI_4).tan();

        let r = self.radius(abc[2]);
        let t = 1.0 / (x * x + y * y + 1.0);
        let q = r * t.sqrt();

        // determinant of the patch-independent normalized Jacobian; the
        // patch permutation has determinant one
        let m = [
            [1.0 - x * x * t, -x * y * t, x],
            [-x * y * t, 1.0 - y * y * t, y],
            [-x * t, -y * t, 1.0],
        ];
        check_det(which_tree, det3(&m) * q * q * q * derx * dery * self.rlog)
    }
}
