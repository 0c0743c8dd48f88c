// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal column-major 4×4 transform.
//!
//! This type covers the subset of 3-D affine transforms that scene nodes
//! need: composition, point mapping, inversion for picking, and conversion to
//! and from the 2-D [`Affine`] used by shape geometry. It does not pull in a
//! full linear-algebra crate.

use core::ops::Mul;

use kurbo::Affine;

use crate::math::Vec3;

/// Coarse classification of a transform, used to pick fast paths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum TransformClass {
    /// Exactly the identity.
    Identity,
    /// Pure translation.
    Translate,
    /// Axis-aligned scale followed by a translation.
    ScaleTranslate,
    /// Anything else (rotation, shear, projection).
    General,
}

/// A column-major 4×4 affine transform stored as `[[f64; 4]; 4]`.
///
/// Each inner array is one *column* of the matrix, so `cols[j][i]` is the
/// element at row `i`, column `j`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform3d {
    /// Four columns, each a 4-element array `[x, y, z, w]`.
    pub cols: [[f64; 4]; 4],
}

impl Transform3d {
    /// The 4×4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Creates a transform from four column arrays.
    #[inline]
    #[must_use]
    pub const fn from_cols(col0: [f64; 4], col1: [f64; 4], col2: [f64; 4], col3: [f64; 4]) -> Self {
        Self {
            cols: [col0, col1, col2, col3],
        }
    }

    /// Returns column `i` (0-based).
    ///
    /// # Panics
    ///
    /// Panics if `i >= 4`.
    #[inline]
    #[must_use]
    pub const fn col(self, i: usize) -> [f64; 4] {
        self.cols[i]
    }

    /// Creates a pure translation transform.
    #[inline]
    #[must_use]
    pub const fn from_translation(x: f64, y: f64, z: f64) -> Self {
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [x, y, z, 1.0],
            ],
        }
    }

    /// Creates a non-uniform scale transform.
    #[inline]
    #[must_use]
    pub const fn from_scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self {
            cols: [
                [sx, 0.0, 0.0, 0.0],
                [0.0, sy, 0.0, 0.0],
                [0.0, 0.0, sz, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a rotation around the Z axis (radians).
    #[inline]
    #[must_use]
    pub fn from_rotation_z(radians: f64) -> Self {
        let (s, c) = radians.sin_cos();
        Self {
            cols: [
                [c, s, 0.0, 0.0],
                [-s, c, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a rotation of `radians` around an arbitrary `axis`.
    ///
    /// Returns the identity when the axis has zero length.
    #[must_use]
    pub fn from_rotation(axis: Vec3, radians: f64) -> Self {
        let Some(n) = axis.normalize() else {
            return Self::IDENTITY;
        };
        let (s, c) = radians.sin_cos();
        let t = 1.0 - c;
        let (x, y, z) = (n.x, n.y, n.z);
        Self {
            cols: [
                [t * x * x + c, t * x * y + s * z, t * x * z - s * y, 0.0],
                [t * x * y - s * z, t * y * y + c, t * y * z + s * x, 0.0],
                [t * x * z + s * y, t * y * z - s * x, t * z * z + c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Embeds a 2-D affine transform, leaving Z untouched.
    #[must_use]
    pub fn from_affine2d(affine: Affine) -> Self {
        let [a, b, c, d, e, f] = affine.as_coeffs();
        Self {
            cols: [
                [a, b, 0.0, 0.0],
                [c, d, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [e, f, 0.0, 1.0],
            ],
        }
    }

    /// Projects onto the XY plane, discarding any Z contribution.
    #[must_use]
    pub fn to_affine2d(&self) -> Affine {
        let c = &self.cols;
        Affine::new([c[0][0], c[0][1], c[1][0], c[1][1], c[3][0], c[3][1]])
    }

    /// Classifies this transform for fast-path selection.
    #[must_use]
    pub fn classify(&self) -> TransformClass {
        let c = &self.cols;
        let affine_row = c[0][3] == 0.0 && c[1][3] == 0.0 && c[2][3] == 0.0 && c[3][3] == 1.0;
        let off_diagonal_zero = c[0][1] == 0.0
            && c[0][2] == 0.0
            && c[1][0] == 0.0
            && c[1][2] == 0.0
            && c[2][0] == 0.0
            && c[2][1] == 0.0;
        if !affine_row || !off_diagonal_zero {
            return TransformClass::General;
        }
        let unit_diagonal = c[0][0] == 1.0 && c[1][1] == 1.0 && c[2][2] == 1.0;
        if !unit_diagonal {
            TransformClass::ScaleTranslate
        } else if c[3][0] == 0.0 && c[3][1] == 0.0 && c[3][2] == 0.0 {
            TransformClass::Identity
        } else {
            TransformClass::Translate
        }
    }

    /// Maps a point, dividing by the homogeneous coordinate when it is not 1.
    #[must_use]
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        let c = &self.cols;
        let x = c[0][0] * p.x + c[1][0] * p.y + c[2][0] * p.z + c[3][0];
        let y = c[0][1] * p.x + c[1][1] * p.y + c[2][1] * p.z + c[3][1];
        let z = c[0][2] * p.x + c[1][2] * p.y + c[2][2] * p.z + c[3][2];
        let w = c[0][3] * p.x + c[1][3] * p.y + c[2][3] * p.z + c[3][3];
        if w == 1.0 || w == 0.0 {
            Vec3::new(x, y, z)
        } else {
            Vec3::new(x / w, y / w, z / w)
        }
    }

    /// Maps a direction vector (translation is ignored).
    #[must_use]
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        let c = &self.cols;
        Vec3::new(
            c[0][0] * v.x + c[1][0] * v.y + c[2][0] * v.z,
            c[0][1] * v.x + c[1][1] * v.y + c[2][1] * v.z,
            c[0][2] * v.x + c[1][2] * v.y + c[2][2] * v.z,
        )
    }

    /// Determinant of the full 4×4 matrix.
    #[must_use]
    pub fn determinant(&self) -> f64 {
        let m = self.to_rows();
        let mut det = 0.0;
        for (j, &pivot) in m[0].iter().enumerate() {
            let sign = if j % 2 == 0 { 1.0 } else { -1.0 };
            det += sign * pivot * minor3(&m, 0, j);
        }
        det
    }

    /// Inverse via Gauss-Jordan elimination with partial pivoting.
    ///
    /// Returns `None` when the matrix is singular or not finite.
    #[must_use]
    pub fn inverse(&self) -> Option<Self> {
        if !self.is_finite() {
            return None;
        }
        let mut a = self.to_rows();
        let mut inv = Self::IDENTITY.to_rows();
        for col in 0..4 {
            let mut pivot = col;
            for row in col + 1..4 {
                if a[row][col].abs() > a[pivot][col].abs() {
                    pivot = row;
                }
            }
            if a[pivot][col].abs() < 1e-300 {
                return None;
            }
            a.swap(col, pivot);
            inv.swap(col, pivot);
            let p = a[col][col];
            for k in 0..4 {
                a[col][k] /= p;
                inv[col][k] /= p;
            }
            for row in 0..4 {
                if row == col {
                    continue;
                }
                let factor = a[row][col];
                if factor == 0.0 {
                    continue;
                }
                for k in 0..4 {
                    a[row][k] -= factor * a[col][k];
                    inv[row][k] -= factor * inv[col][k];
                }
            }
        }
        let out = Self::from_rows(inv);
        out.is_finite().then_some(out)
    }

    /// Is this transform [finite]?
    ///
    /// [finite]: f64::is_finite
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.cols.iter().flatten().all(|v| v.is_finite())
    }

    /// Is this transform [NaN]?
    ///
    /// [NaN]: f64::is_nan
    #[inline]
    #[must_use]
    pub fn is_nan(&self) -> bool {
        self.cols.iter().flatten().any(|v| v.is_nan())
    }

    fn to_rows(self) -> [[f64; 4]; 4] {
        let mut rows = [[0.0; 4]; 4];
        for (j, col) in self.cols.iter().enumerate() {
            for (i, v) in col.iter().enumerate() {
                rows[i][j] = *v;
            }
        }
        rows
    }

    fn from_rows(rows: [[f64; 4]; 4]) -> Self {
        let mut cols = [[0.0; 4]; 4];
        for (i, row) in rows.iter().enumerate() {
            for (j, v) in row.iter().enumerate() {
                cols[j][i] = *v;
            }
        }
        Self { cols }
    }
}

fn minor3(m: &[[f64; 4]; 4], skip_row: usize, skip_col: usize) -> f64 {
    let mut sub = [[0.0; 3]; 3];
    let mut si = 0;
    for (i, row) in m.iter().enumerate() {
        if i == skip_row {
            continue;
        }
        let mut sj = 0;
        for (j, v) in row.iter().enumerate() {
            if j == skip_col {
                continue;
            }
            sub[si][sj] = *v;
            sj += 1;
        }
        si += 1;
    }
    sub[0][0] * (sub[1][1] * sub[2][2] - sub[1][2] * sub[2][1])
        - sub[0][1] * (sub[1][0] * sub[2][2] - sub[1][2] * sub[2][0])
        + sub[0][2] * (sub[1][0] * sub[2][1] - sub[1][1] * sub[2][0])
}

impl Default for Transform3d {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform3d {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let a = &self.cols;
        let b = &rhs.cols;
        let mut out = [[0.0_f64; 4]; 4];
        for (j, out_col) in out.iter_mut().enumerate() {
            for (i, v) in out_col.iter_mut().enumerate() {
                *v = a[0][i] * b[j][0] + a[1][i] * b[j][1] + a[2][i] * b[j][2] + a[3][i] * b[j][3];
            }
        }
        Self { cols: out }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-9
    }

    #[test]
    fn default_is_identity() {
        assert_eq!(Transform3d::default(), Transform3d::IDENTITY);
        assert_eq!(Transform3d::IDENTITY.classify(), TransformClass::Identity);
    }

    #[test]
    fn translation_composition() {
        let a = Transform3d::from_translation(1.0, 0.0, 0.0);
        let b = Transform3d::from_translation(0.0, 2.0, 0.0);
        let c = a * b;
        assert_eq!(c.col(3), [1.0, 2.0, 0.0, 1.0]);
        assert_eq!(c.classify(), TransformClass::Translate);
    }

    #[test]
    fn scale_then_translate() {
        let s = Transform3d::from_scale(2.0, 2.0, 2.0);
        let t = Transform3d::from_translation(3.0, 4.0, 0.0);
        let combined = t * s;
        assert_eq!(combined.col(0), [2.0, 0.0, 0.0, 0.0]);
        assert_eq!(combined.col(3), [3.0, 4.0, 0.0, 1.0]);
        assert_eq!(combined.classify(), TransformClass::ScaleTranslate);
        let p = combined.transform_point(Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(p, Vec3::new(5.0, 6.0, 2.0));
    }

    #[test]
    fn rotation_z_ninety_degrees() {
        let r = Transform3d::from_rotation_z(core::f64::consts::FRAC_PI_2);
        let eps = 1e-6;
        assert!((r.col(0)[0] - 0.0).abs() < eps);
        assert!((r.col(0)[1] - 1.0).abs() < eps);
        assert!((r.col(1)[0] + 1.0).abs() < eps);
        assert_eq!(r.classify(), TransformClass::General);
    }

    #[test]
    fn axis_rotation_matches_z_rotation() {
        let a = Transform3d::from_rotation(Vec3::Z_AXIS, 0.7);
        let b = Transform3d::from_rotation_z(0.7);
        let p = Vec3::new(3.0, -1.0, 2.0);
        assert!(approx(a.transform_point(p), b.transform_point(p)));
    }

    #[test]
    fn inverse_round_trips() {
        let t = Transform3d::from_translation(3.0, -2.0, 5.0)
            * Transform3d::from_rotation(Vec3::new(1.0, 1.0, 0.0), 0.4)
            * Transform3d::from_scale(2.0, 0.5, 3.0);
        let inv = t.inverse().expect("invertible");
        let p = Vec3::new(0.3, 7.0, -1.5);
        assert!(approx(inv.transform_point(t.transform_point(p)), p));
        assert!((t.determinant() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn singular_has_no_inverse() {
        let s = Transform3d::from_scale(1.0, 0.0, 1.0);
        assert_eq!(s.determinant(), 0.0);
        assert!(s.inverse().is_none());
    }

    #[test]
    fn affine_round_trip() {
        let a = Affine::new([2.0, 0.5, -0.25, 3.0, 10.0, -4.0]);
        assert_eq!(Transform3d::from_affine2d(a).to_affine2d(), a);
    }

    #[test]
    fn nan_detected() {
        let mut t = Transform3d::IDENTITY;
        t.cols[2][1] = f64::NAN;
        assert!(!t.is_finite());
        assert!(t.is_nan());
        assert!(t.inverse().is_none());
    }
}
