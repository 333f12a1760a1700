//! General 2x2 linear transformation matrices.

use std::ops::Mul;

use serde::{Deserialize, Serialize};

use crate::coord::EPSILON;
use crate::point::DVector;

/// A 2x2 matrix describing a linear transformation.
///
/// Unlike [`ComplexTrans`](crate::complex::ComplexTrans), a matrix can
/// represent shear and anisotropic magnification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix2d {
    m11: f64,
    m12: f64,
    m21: f64,
    m22: f64,
}

impl Default for Matrix2d {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix2d {
    /// Creates a matrix from its elements, row by row.
    pub fn new(m11: f64, m12: f64, m21: f64, m22: f64) -> Self {
        Self { m11, m12, m21, m22 }
    }

    /// The identity matrix.
    pub fn identity() -> Self {
        Self::new(1., 0., 0., 1.)
    }

    /// A uniform scaling matrix.
    pub fn from_mag(mag: f64) -> Self {
        Self::new(mag, 0., 0., mag)
    }

    /// A scaling matrix with different factors along x and y.
    pub fn from_mag_xy(mx: f64, my: f64) -> Self {
        Self::new(mx, 0., 0., my)
    }

    /// A counter-clockwise rotation by `angle` degrees.
    pub fn from_angle(angle: f64) -> Self {
        let (s, c) = angle.to_radians().sin_cos();
        Self::new(c, -s, s, c)
    }

    /// The upper left element.
    #[inline]
    pub fn m11(&self) -> f64 {
        self.m11
    }

    /// The upper right element.
    #[inline]
    pub fn m12(&self) -> f64 {
        self.m12
    }

    /// The lower left element.
    #[inline]
    pub fn m21(&self) -> f64 {
        self.m21
    }

    /// The lower right element.
    #[inline]
    pub fn m22(&self) -> f64 {
        self.m22
    }

    /// The determinant.
    pub fn det(&self) -> f64 {
        self.m11 * self.m22 - self.m12 * self.m21
    }

    /// The magnification along the x axis (length of the first column).
    pub fn mag_x(&self) -> f64 {
        self.m11.hypot(self.m21)
    }

    /// The magnification along the y axis (length of the second column).
    pub fn mag_y(&self) -> f64 {
        self.m12.hypot(self.m22)
    }

    /// Returns `true` if the matrix flips orientation.
    pub fn is_mirror(&self) -> bool {
        self.det() < 0.
    }

    /// Returns `true` if the columns are not perpendicular.
    pub fn has_shear(&self) -> bool {
        let mx = self.mag_x();
        let my = self.mag_y();
        if mx == 0. || my == 0. {
            return false;
        }
        let dot = (self.m11 * self.m12 + self.m21 * self.m22) / (mx * my);
        dot.abs() > EPSILON
    }

    /// The rotation angle of the first column in degrees, in `[0, 360)`.
    pub fn angle(&self) -> f64 {
        crate::wrap_angle(self.m21.atan2(self.m11).to_degrees())
    }

    /// The inverse matrix, or `None` if the matrix is singular.
    pub fn inverted(&self) -> Option<Self> {
        let d = self.det();
        if d.abs() <= EPSILON {
            return None;
        }
        Some(Self::new(
            self.m22 / d,
            -self.m12 / d,
            -self.m21 / d,
            self.m11 / d,
        ))
    }

    /// Multiplies the matrix with a vector.
    pub fn trans_vector(&self, v: DVector) -> DVector {
        DVector::new(
            self.m11 * v.x + self.m12 * v.y,
            self.m21 * v.x + self.m22 * v.y,
        )
    }
}

impl Mul for Matrix2d {
    type Output = Self;

    fn mul(self, o: Self) -> Self {
        Self::new(
            self.m11 * o.m11 + self.m12 * o.m21,
            self.m11 * o.m12 + self.m12 * o.m22,
            self.m21 * o.m11 + self.m22 * o.m21,
            self.m21 * o.m12 + self.m22 * o.m22,
        )
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn rotation_has_no_shear() {
        let m = Matrix2d::from_angle(30.);
        assert!(!m.has_shear());
        assert!(!m.is_mirror());
        assert_abs_diff_eq!(m.angle(), 30., epsilon = 1e-9);
        assert_abs_diff_eq!(m.mag_x(), 1., epsilon = 1e-12);
    }

    #[test]
    fn anisotropic_scaling_is_detected() {
        let m = Matrix2d::from_mag_xy(2., 3.);
        assert!(!m.has_shear());
        assert_eq!(m.mag_x(), 2.);
        assert_eq!(m.mag_y(), 3.);
    }

    #[test]
    fn inverse_multiplies_to_identity() {
        let m = Matrix2d::new(1., 0.5, -0.25, 2.);
        let p = m * m.inverted().unwrap();
        assert_abs_diff_eq!(p.m11(), 1., epsilon = 1e-12);
        assert_abs_diff_eq!(p.m12(), 0., epsilon = 1e-12);
        assert_abs_diff_eq!(p.m21(), 0., epsilon = 1e-12);
        assert_abs_diff_eq!(p.m22(), 1., epsilon = 1e-12);
        assert!(Matrix2d::from_mag(0.).inverted().is_none());
    }
}
