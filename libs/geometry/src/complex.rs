//! General affine transformations with magnification and arbitrary rotation.

use std::cmp::Ordering;
use std::marker::PhantomData;
use std::ops::Mul;

use serde::{Deserialize, Serialize};

use crate::coord::{Coord, EPSILON};
use crate::matrix::Matrix2d;
use crate::point::{DPoint, DVector, Point, Vector};
use crate::transform::{DispTrans, FixpointTrans, SimpleTrans, Transformation};

/// A transformation composed of magnification, rotation by an arbitrary
/// angle, an optional mirror at the x axis and a displacement.
///
/// Points are mirrored first, then rotated, then magnified and finally
/// displaced. `I` is the coordinate type of the input space and `F` the
/// coordinate type of the output space; outputs are rounded when `F` is
/// integral.
#[derive(Debug, Serialize, Deserialize)]
pub struct ComplexTrans<I = i64, F = I> {
    u: DVector,
    sin: f64,
    cos: f64,
    /// Negative values indicate mirroring.
    mag: f64,
    #[serde(skip)]
    _marker: PhantomData<fn(I) -> F>,
}

/// An integer-to-integer complex transformation.
pub type ICplxTrans = ComplexTrans<i64, i64>;

/// An integer-to-floating-point complex transformation.
pub type CplxTrans = ComplexTrans<i64, f64>;

/// A floating-point-to-integer complex transformation.
pub type VCplxTrans = ComplexTrans<f64, i64>;

/// A floating-point complex transformation.
pub type DCplxTrans = ComplexTrans<f64, f64>;

impl<I, F> Clone for ComplexTrans<I, F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<I, F> Copy for ComplexTrans<I, F> {}

impl<I: Coord, F: Coord> Default for ComplexTrans<I, F> {
    fn default() -> Self {
        Self::identity()
    }
}

impl<I, F> PartialEq for ComplexTrans<I, F> {
    /// Exact comparison of all components.
    fn eq(&self, other: &Self) -> bool {
        self.u == other.u && self.sin == other.sin && self.cos == other.cos && self.mag == other.mag
    }
}

impl<I, F> PartialOrd for ComplexTrans<I, F> {
    /// Exact lexicographic ordering of displacement, sine, cosine and magnification.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        (self.u.x, self.u.y, self.sin, self.cos, self.mag).partial_cmp(&(
            other.u.x,
            other.u.y,
            other.sin,
            other.cos,
            other.mag,
        ))
    }
}

impl<I: Coord, F: Coord> ComplexTrans<I, F> {
    fn from_raw(u: DVector, sin: f64, cos: f64, mag: f64) -> Self {
        Self {
            u,
            sin,
            cos,
            mag,
            _marker: PhantomData,
        }
    }

    /// The identity transformation.
    pub fn identity() -> Self {
        Self::from_raw(DVector::zero(), 0., 1., 1.)
    }

    /// Creates a transformation from a magnification, a counter-clockwise
    /// rotation angle in degrees, a mirror flag and a displacement.
    ///
    /// Multiples of 90 degrees produce exact sine and cosine values.
    ///
    /// # Panics
    ///
    /// Panics if `mag <= 0`.
    pub fn new(mag: f64, angle: f64, mirror: bool, u: Vector<F>) -> Self {
        assert!(mag > 0., "magnification must be positive, got {mag}");
        let wrapped = crate::wrap_angle(angle);
        let (cos, sin) = if wrapped % 90. == 0. {
            FixpointTrans::new((wrapped / 90.) as i32, false).cos_sin()
        } else {
            let rad = angle.to_radians();
            (rad.cos(), rad.sin())
        };
        Self::from_raw(
            Self::to_dvector(u),
            sin,
            cos,
            if mirror { -mag } else { mag },
        )
    }

    /// A pure displacement.
    pub fn from_disp(u: Vector<F>) -> Self {
        Self::from_raw(Self::to_dvector(u), 0., 1., 1.)
    }

    /// A pure magnification.
    ///
    /// # Panics
    ///
    /// Panics if `mag <= 0`.
    pub fn from_mag(mag: f64) -> Self {
        Self::new(mag, 0., false, Vector::zero())
    }

    /// Builds a transformation from a linear matrix and a displacement.
    ///
    /// # Panics
    ///
    /// Panics if the matrix contains shear, anisotropic magnification or is singular,
    /// since such matrices cannot be represented by a complex transformation.
    pub fn from_matrix(m: &Matrix2d, u: Vector<F>) -> Self {
        assert!(
            !m.has_shear(),
            "matrix with shear cannot be converted to a complex transformation"
        );
        let mx = m.mag_x();
        let my = m.mag_y();
        assert!(
            (mx - my).abs() <= EPSILON * mx.max(my),
            "matrix with anisotropic magnification cannot be converted to a complex transformation"
        );
        assert!(mx > 0., "singular matrix cannot be converted to a complex transformation");
        let mirror = m.is_mirror();
        Self::from_raw(
            Self::to_dvector(u),
            m.m21() / mx,
            m.m11() / mx,
            if mirror { -mx } else { mx },
        )
    }

    fn to_dvector<C: Coord>(v: Vector<C>) -> DVector {
        DVector::new(v.x.to_f64(), v.y.to_f64())
    }

    /// The linear part as a matrix.
    pub fn to_matrix(&self) -> Matrix2d {
        let m = self.mag.abs();
        let s = if self.is_mirror() { -1. } else { 1. };
        Matrix2d::new(
            m * self.cos,
            -m * s * self.sin,
            m * self.sin,
            m * s * self.cos,
        )
    }

    /// Reinterprets the transformation for other coordinate types.
    pub fn convert<I2: Coord, F2: Coord>(&self) -> ComplexTrans<I2, F2> {
        ComplexTrans::from_raw(self.u, self.sin, self.cos, self.mag)
    }

    /// The rotation angle in degrees, in the interval `[0, 360)`.
    pub fn angle(&self) -> f64 {
        let a = self.sin.atan2(self.cos).to_degrees();
        if a < -EPSILON {
            a + 360.
        } else if a <= EPSILON {
            0.
        } else {
            a
        }
    }

    /// The cosine of the rotation angle.
    #[inline]
    pub fn rcos(&self) -> f64 {
        self.cos
    }

    /// The sine of the rotation angle.
    #[inline]
    pub fn rsin(&self) -> f64 {
        self.sin
    }

    /// The magnification (always positive).
    #[inline]
    pub fn mag(&self) -> f64 {
        self.mag.abs()
    }

    /// Sets the magnification, keeping the mirror flag.
    ///
    /// # Panics
    ///
    /// Panics if `mag <= 0`.
    pub fn set_mag(&mut self, mag: f64) {
        assert!(mag > 0., "magnification must be positive, got {mag}");
        self.mag = if self.is_mirror() { -mag } else { mag };
    }

    /// Returns `true` if the transformation mirrors.
    #[inline]
    pub fn is_mirror(&self) -> bool {
        self.mag < 0.
    }

    /// Returns `true` if the magnification differs from 1.
    #[inline]
    pub fn is_mag(&self) -> bool {
        (self.mag.abs() - 1.).abs() > EPSILON
    }

    /// Returns `true` if the rotation angle is a multiple of 90 degrees.
    #[inline]
    pub fn is_ortho(&self) -> bool {
        (self.sin * self.cos).abs() <= EPSILON
    }

    /// Returns `true` if the transformation is magnifying or not Manhattan.
    #[inline]
    pub fn is_complex(&self) -> bool {
        self.is_mag() || !self.is_ortho()
    }

    /// Returns `true` if the transformation is the identity.
    pub fn is_unity(&self) -> bool {
        !self.is_mag()
            && !self.is_mirror()
            && self.sin.abs() <= EPSILON
            && (self.cos - 1.).abs() <= EPSILON
            && f64::equal(self.u.x, 0.)
            && f64::equal(self.u.y, 0.)
    }

    /// The Manhattan orientation closest to this transformation's rotation.
    ///
    /// Exact for orthogonal transformations. The quadrant selection order
    /// reproduces the exact orientation when sine and cosine carry rounding
    /// errors near multiples of 90 degrees.
    pub fn fp_trans(&self) -> FixpointTrans {
        let eps = EPSILON;
        let c = if self.cos > eps && self.sin >= -eps {
            0
        } else if self.cos <= eps && self.sin > eps {
            1
        } else if self.cos < -eps && self.sin <= eps {
            2
        } else {
            3
        };
        FixpointTrans::new(c, self.is_mirror())
    }

    /// The displacement in output coordinates.
    pub fn disp(&self) -> Vector<F> {
        Vector::new(F::rounded(self.u.x), F::rounded(self.u.y))
    }

    /// The displacement without rounding.
    #[inline]
    pub fn ddisp(&self) -> DVector {
        self.u
    }

    /// Sets the displacement.
    pub fn set_disp(&mut self, u: Vector<F>) {
        self.u = Self::to_dvector(u);
    }

    fn trans_dvector(&self, v: DVector) -> DVector {
        let m = self.mag.abs();
        let y = if self.is_mirror() { -v.y } else { v.y };
        DVector::new(
            m * (self.cos * v.x - self.sin * y),
            m * (self.sin * v.x + self.cos * y),
        )
    }

    /// Transforms a floating-point point without rounding.
    pub fn trans_dpoint(&self, p: DPoint) -> DPoint {
        let v = self.trans_dvector(p.to_vector());
        DPoint::new(v.x + self.u.x, v.y + self.u.y)
    }

    /// Returns the inverse transformation, which maps from `F` back to `I`.
    pub fn inverted(&self) -> ComplexTrans<F, I> {
        let s = if self.is_mirror() { -1. } else { 1. };
        let mut inv = ComplexTrans::<F, I>::from_raw(DVector::zero(), -s * self.sin, self.cos, 1. / self.mag);
        let u = inv.trans_dvector(self.u);
        inv.u = DVector::new(-u.x, -u.y);
        inv
    }

    /// Fuzzy equality using a tolerance for the angle, magnification and displacement.
    pub fn equal(&self, other: &Self) -> bool {
        self.u.equal(&other.u)
            && (self.sin - other.sin).abs() <= EPSILON
            && (self.cos - other.cos).abs() <= EPSILON
            && (self.mag - other.mag).abs() <= EPSILON
    }

    /// Fuzzy strict ordering consistent with [`ComplexTrans::equal`].
    pub fn less(&self, other: &Self) -> bool {
        if !self.u.equal(&other.u) {
            return self.u.less(&other.u);
        }
        if (self.sin - other.sin).abs() > EPSILON {
            return self.sin < other.sin;
        }
        if (self.cos - other.cos).abs() > EPSILON {
            return self.cos < other.cos;
        }
        if (self.mag - other.mag).abs() > EPSILON {
            return self.mag < other.mag;
        }
        false
    }

    /// Concatenates two transformations of the same type through the
    /// floating-point representation, applying `t` first.
    pub fn concat_same(&self, t: &Self) -> Self {
        let a: DCplxTrans = self.convert();
        let b: DCplxTrans = t.convert();
        (a * b).convert()
    }
}

impl<C: Coord> ComplexTrans<C, C> {
    /// Inverts this transformation in place.
    pub fn invert(&mut self) -> &mut Self {
        *self = self.inverted();
        self
    }
}

impl<I: Coord, F: Coord> Transformation<I, F> for ComplexTrans<I, F> {
    fn trans_point(&self, p: Point<I>) -> Point<F> {
        let q = self.trans_dpoint(DPoint::new(p.x.to_f64(), p.y.to_f64()));
        Point::new(F::rounded(q.x), F::rounded(q.y))
    }

    fn trans_vector(&self, v: Vector<I>) -> Vector<F> {
        let q = self.trans_dvector(DVector::new(v.x.to_f64(), v.y.to_f64()));
        Vector::new(F::rounded(q.x), F::rounded(q.y))
    }

    fn ctrans(&self, d: I) -> F {
        F::rounded(d.to_f64() * self.mag.abs())
    }

    fn is_unity(&self) -> bool {
        ComplexTrans::is_unity(self)
    }

    fn is_ortho(&self) -> bool {
        ComplexTrans::is_ortho(self)
    }

    fn is_mirror(&self) -> bool {
        ComplexTrans::is_mirror(self)
    }

    fn mag(&self) -> f64 {
        ComplexTrans::mag(self)
    }

    fn fp_trans(&self) -> FixpointTrans {
        ComplexTrans::fp_trans(self)
    }

    fn to_complex(&self) -> ComplexTrans<I, F> {
        *self
    }
}

impl<I: Coord, M: Coord, F: Coord> Mul<ComplexTrans<I, M>> for ComplexTrans<M, F> {
    type Output = ComplexTrans<I, F>;

    fn mul(self, t: ComplexTrans<I, M>) -> ComplexTrans<I, F> {
        let s = if self.is_mirror() { -1. } else { 1. };
        let v = self.trans_dvector(t.u);
        ComplexTrans::from_raw(
            DVector::new(v.x + self.u.x, v.y + self.u.y),
            self.sin * t.cos + s * self.cos * t.sin,
            self.cos * t.cos - s * self.sin * t.sin,
            self.mag * t.mag,
        )
    }
}

impl<I: Coord, F: Coord> From<FixpointTrans> for ComplexTrans<I, F> {
    fn from(f: FixpointTrans) -> Self {
        let (cos, sin) = f.cos_sin();
        Self::from_raw(
            DVector::zero(),
            sin,
            cos,
            if f.is_mirror() { -1. } else { 1. },
        )
    }
}

impl<C: Coord> From<DispTrans<C>> for ComplexTrans<C, C> {
    fn from(d: DispTrans<C>) -> Self {
        Self::from_disp(d.disp())
    }
}

impl<C: Coord> From<SimpleTrans<C>> for ComplexTrans<C, C> {
    fn from(t: SimpleTrans<C>) -> Self {
        let mut c = Self::from(t.fp_trans());
        c.set_disp(t.disp());
        c
    }
}

impl<I: Coord, F: Coord> approx::AbsDiffEq for ComplexTrans<I, F> {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        (self.u.x - other.u.x).abs() <= epsilon
            && (self.u.y - other.u.y).abs() <= epsilon
            && (self.sin - other.sin).abs() <= epsilon
            && (self.cos - other.cos).abs() <= epsilon
            && (self.mag - other.mag).abs() <= epsilon
    }
}

/// Wraps a [`ComplexTrans`] so that it can be used as a key in ordered
/// collections, comparing with the fuzzy [`ComplexTrans::equal`] and
/// [`ComplexTrans::less`] predicates.
#[derive(Debug, Clone, Copy)]
pub struct FuzzyKey<I = i64, F = I>(pub ComplexTrans<I, F>);

impl<I: Coord, F: Coord> PartialEq for FuzzyKey<I, F> {
    fn eq(&self, other: &Self) -> bool {
        self.0.equal(&other.0)
    }
}

impl<I: Coord, F: Coord> Eq for FuzzyKey<I, F> {}

impl<I: Coord, F: Coord> PartialOrd for FuzzyKey<I, F> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<I: Coord, F: Coord> Ord for FuzzyKey<I, F> {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.0.less(&other.0) {
            Ordering::Less
        } else if other.0.less(&self.0) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}
