//! Solid sphere geometry.
//!
//! Maps the 13-tree sphere connectivity onto a ball of radius `r2`:
//! trees 0..6 form an outer shell between `r1` and `r2`, trees 6..12 a
//! blended inner shell between `r0` and `r1`, and tree 12 a scaled cube
//! at the center. The inner shell interpolates between the cube at its
//! inner surface and the tangent-graded shell mapping at its outer
//! surface, so the map is continuous across all three layers.

use std::f64::consts::FRAC_PI_4;

use crate::geometry::{check_det, det3, place_rows, Geometry};
use crate::topology::connectivity::TopIdx;

/// Axis and sign assignment per patch `which_tree % 6`: front, top,
/// back, right, bottom, left.
const PATCH_AXES: [[usize; 3]; 6] = [
    [0, 2, 1],
    [0, 1, 2],
    [0, 2, 1],
    [1, 2, 0],
    [1, 0, 2],
    [1, 2, 0],
];
const PATCH_SIGNS: [[f64; 3]; 6] = [
    [1.0, 1.0, -1.0],
    [1.0, 1.0, 1.0],
    [1.0, -1.0, 1.0],
    [-1.0, -1.0, 1.0],
    [-1.0, -1.0, -1.0],
    [-1.0, 1.0, -1.0],
];

/// Geometry of a solid sphere with layer radii `r0 < r1 < r2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereGeometry {
    r2: f64,
    r1: f64,
    r0: f64,
    r2_by_r1: f64,
    r1sqr_by_r2: f64,
    r1log: f64,
    r1_by_r0: f64,
    r0sqr_by_r1: f64,
    r0log: f64,
    center_length: f64,
    center_det: f64,
}

impl SphereGeometry {
    /// Build a sphere geometry for outer radius `r2`, inner-shell radius
    /// `r1`, and center-cube radius `r0`.
    pub fn new(r2: f64, r1: f64, r0: f64) -> Self {
        assert!(0.0 < r0 && r0 < r1 && r1 < r2, "need 0 < r0 < r1 < r2");
        let center_length = r0 / 3.0_f64.sqrt();
        Self {
            r2,
            r1,
            r0,
            r2_by_r1: r2 / r1,
            r1sqr_by_r2: r1 * r1 / r2,
            r1log: (r2 / r1).ln(),
            r1_by_r0: r1 / r0,
            r0sqr_by_r1: r0 * r0 / r1,
            r0log: (r1 / r0).ln(),
            center_length,
            center_det: center_length.powi(3),
        }
    }

    /// Outer radius.
    #[inline]
    pub fn r2(&self) -> f64 {
        self.r2
    }

    /// Radius of the outer/inner shell interface.
    #[inline]
    pub fn r1(&self) -> f64 {
        self.r1
    }

    /// Radius of the inner shell/center cube interface.
    #[inline]
    pub fn r0(&self) -> f64 {
        self.r0
    }

    #[inline]
    fn check_domain(&self, which_tree: TopIdx, abc: [f64; 3]) {
        debug_assert!((0..13).contains(&which_tree), "sphere tree out of range");
        debug_assert!(abc[0].abs() <= 1.0 + 1e-12 && abc[1].abs() <= 1.0 + 1e-12);
        if which_tree < 12 {
            debug_assert!((1.0 - 1e-12..=2.0 + 1e-12).contains(&abc[2]));
        } else {
            debug_assert!(abc[2].abs() <= 1.0 + 1e-12);
        }
        let _ = (which_tree, abc);
    }

    /// Angular coordinates, radius factor, and squared-tangent terms of
    /// the inner-shell blend at a reference point.
    #[inline]
    fn inner_blend(&self, abc: [f64; 3]) -> InnerBlend {
        let p = 2.0 - abc[2];
        let tanx = (abc[0] * FRAC_PI_4).tan();
        let tany = (abc[1] * FRAC_PI_4).tan();
        let x = p * abc[0] + (1.0 - p) * tanx;
        let y = p * abc[1] + (1.0 - p) * tany;
        let r = self.r0sqr_by_r1 * self.r1_by_r0.powf(abc[2]);
        let tsqr = tanx * tanx + tany * tany;
        let t = 1.0 / (1.0 + (1.0 - p) * tsqr + 2.0 * p);
        InnerBlend {
            p,
            tanx,
            tany,
            x,
            y,
            t,
            q: r * t.sqrt(),
            rlog: self.r0log + t * (1.0 - 0.5 * tsqr),
        }
    }
}

struct InnerBlend {
    p: f64,
    tanx: f64,
    tany: f64,
    x: f64,
    y: f64,
    t: f64,
    q: f64,
    rlog: f64,
}

impl Geometry for SphereGeometry {
    fn x(&self, which_tree: TopIdx, abc: [f64; 3]) -> [f64; 3] {
        self.check_domain(which_tree, abc);

        let (x, y, q) = if which_tree < 6 {
            // outer shell
            let x = (abc[0] * FRAC_PI_4).tan();
            let y = (abc[1] * FRAC_PI_4).tan();
            let r = self.r1sqr_by_r2 * self.r2_by_r1.powf(abc[2]);
            (x, y, r / (x * x + y * y + 1.0).sqrt())
        } else if which_tree < 12 {
            // inner shell
            let b = self.inner_blend(abc);
            (b.x, b.y, b.q)
        } else {
            // center cube
            return [
                abc[0] * self.center_length,
                abc[1] * self.center_length,
                abc[2] * self.center_length,
            ];
        };

        let patch = which_tree as usize % 6;
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

        if which_tree >= 12 {
            *jac = [[0.0; 3]; 3];
            jac[0][0] = self.center_length;
            jac[1][1] = self.center_length;
            jac[2][2] = self.center_length;
            return self.center_det;
        }

        let patch = which_tree as usize % 6;
        let rows = if which_tree < 6 {
            let cx = (abc[0] * FRAC_PI_4).cos();
            let derx = FRAC_PI_4 / (cx * cx);
            let x = (abc[0] * FRAC_PI_4).tan();
            let cy = (abc[1] * FRAC_PI_4).cos();
            let dery = FRAC_PI_4 / (cy * cy);
            let y = (abc[1] * FRAC_PI_4).tan();

            let r = self.r1sqr_by_r2 * self.r2_by_r1.powf(abc[2]);
            let t = 1.0 / (x * x + y * y + 1.0);
            let q = r * t.sqrt();
            let rlog = self.r1log;
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
            ]
        } else {
            let b = self.inner_blend(abc);
            let cx = (abc[0] * FRAC_PI_4).cos();
            let derx = (1.0 - b.p) * FRAC_PI_4 / (cx * cx);
            let cy = (abc[1] * FRAC_PI_4).cos();
            let dery = (1.0 - b.p) * FRAC_PI_4 / (cy * cy);
            let q = b.q;
            [
                [
                    q * (b.p + (1.0 - b.x * b.tanx * b.t) * derx),
                    -q * b.x * b.tany * b.t * dery,
                    q * (b.x * b.rlog - abc[0] + b.tanx),
                ],
                [
                    -q * b.y * b.tanx * b.t * derx,
                    q * (b.p + (1.0 - b.y * b.tany * b.t) * dery),
                    q * (b.y * b.rlog - abc[1] + b.tany),
                ],
                [
                    -q * b.tanx * b.t * derx,
                    -q * b.tany * b.t * dery,
                    q * b.rlog,
                ],
            ]
        };
        place_rows(jac, PATCH_AXES[patch], PATCH_SIGNS[patch], rows);
        check_det(which_tree, det3(jac))
    }

    fn d(&self, which_tree: TopIdx, abc: [f64; 3]) -> f64 {
        self.check_domain(which_tree, abc);

        let (m, factor) = if which_tree < 6 {
            let cx = (abc[0] * FRAC_PI_4).cos();
            let derx = FRAC_PI_4 / (cx * cx);
            let x = (abc[0] * FRAC_PI_4).tan();
            let cy = (abc[1] * FRAC_PI_4).cos();
            let dery = FRAC_PI_4 / (cy * cy);
            let y = (abc[1] * FRAC_PI_4).tan();

            let r = self.r1sqr_by_r2 * self.r2_by_r1.powf(abc[2]);
            let t = 1.0 / (x * x + y * y + 1.0);
            let q = r * t.sqrt();
            (
                [
                    [1.0 - x * x * t, -x * y * t, x],
                    [-x * y * t, 1.0 - y * y * t, y],
                    [-x * t, -y * t, 1.0],
                ],
                q * q * q * derx * dery * self.r1log,
            )
        } else if which_tree < 12 {
            let b = self.inner_blend(abc);
            let cx = (abc[0] * FRAC_PI_4).cos();
            let derx = (1.0 - b.p) * FRAC_PI_4 / (cx * cx);
            let cy = (abc[1] * FRAC_PI_4).cos();
            let dery = (1.0 - b.p) * FRAC_PI_4 / (cy * cy);
            (
                [
                    [
                        b.p + (1.0 - b.x * b.tanx * b.t) * derx,
                        -b.x * b.tany * b.t * dery,
                        b.x * b.rlog - abc[0] + b.tanx,
                    ],
                    [
                        -b.y * b.tanx * b.t * derx,
                        b.p + (1.0 - b.y * b.tany * b.t) * dery,
                        b.y * b.rlog - abc[1] + b.tany,
                    ],
                    [-b.tanx * b.t * derx, -b.tany * b.t * dery, b.rlog],
                ],
                b.q * b.q * b.q,
            )
        } else {
            return self.center_det;
        };
        check_det(which_tree, det3(&m) * factor)
    }
}
