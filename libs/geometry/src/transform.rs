//! Transformation types and traits.
//!
//! The algebra consists of the identity ([`UnitTrans`]), the eight Manhattan
//! orientations ([`FixpointTrans`]), pure displacements ([`DispTrans`]),
//! displacement plus orientation ([`SimpleTrans`]), general affine
//! transformations with magnification and arbitrary angles
//! ([`ComplexTrans`](crate::complex::ComplexTrans)) and the concatenation
//! of two transformations ([`CombinedTrans`]).
//!
//! For every type, `a * b` means "apply `b` first, then `a`".

use std::ops::Mul;

use impl_trait_for_tuples::impl_for_tuples;
use serde::{Deserialize, Serialize};

use crate::complex::ComplexTrans;
use crate::coord::Coord;
use crate::point::{Point, Vector};

/// The interface shared by all transformations.
///
/// `I` is the coordinate type of the input space, `O` the coordinate
/// type of the output space.
pub trait Transformation<I: Coord = i64, O: Coord = I> {
    /// Transforms a point.
    fn trans_point(&self, p: Point<I>) -> Point<O>;

    /// Transforms a vector, ignoring any displacement.
    fn trans_vector(&self, v: Vector<I>) -> Vector<O>;

    /// Transforms a distance (a length that is subject to magnification only).
    fn ctrans(&self, d: I) -> O;

    /// Returns `true` if this transformation leaves every point unchanged.
    fn is_unity(&self) -> bool;

    /// Returns `true` if the rotation angle is a multiple of 90 degrees.
    fn is_ortho(&self) -> bool;

    /// Returns `true` if this transformation mirrors.
    fn is_mirror(&self) -> bool;

    /// The magnification factor.
    fn mag(&self) -> f64 {
        1.
    }

    /// The Manhattan part of this transformation.
    fn fp_trans(&self) -> FixpointTrans;

    /// Expresses this transformation as a [`ComplexTrans`].
    fn to_complex(&self) -> ComplexTrans<I, O>;
}

/// The identity transformation.
#[derive(Debug, Default, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitTrans;

impl<C: Coord> Transformation<C, C> for UnitTrans {
    #[inline]
    fn trans_point(&self, p: Point<C>) -> Point<C> {
        p
    }

    #[inline]
    fn trans_vector(&self, v: Vector<C>) -> Vector<C> {
        v
    }

    #[inline]
    fn ctrans(&self, d: C) -> C {
        d
    }

    fn is_unity(&self) -> bool {
        true
    }

    fn is_ortho(&self) -> bool {
        true
    }

    fn is_mirror(&self) -> bool {
        false
    }

    fn fp_trans(&self) -> FixpointTrans {
        FixpointTrans::R0
    }

    fn to_complex(&self) -> ComplexTrans<C, C> {
        ComplexTrans::identity()
    }
}

impl<T: Copy> Mul<T> for UnitTrans {
    type Output = T;

    #[inline]
    fn mul(self, rhs: T) -> T {
        rhs
    }
}

/// One of the eight Manhattan orientations.
///
/// Codes 0 to 3 are counter-clockwise rotations by 0, 90, 180 and 270 degrees.
/// Codes 4 to 7 first mirror at the x axis and then rotate by 0, 90, 180
/// and 270 degrees. The resulting mirror axes are at 0, 45, 90 and 135 degrees.
///
/// All operations are exact integer swaps and negations.
#[derive(Debug, Default, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FixpointTrans {
    f: u8,
}

impl FixpointTrans {
    /// No rotation.
    pub const R0: Self = Self { f: 0 };
    /// Rotation by 90 degrees counter-clockwise.
    pub const R90: Self = Self { f: 1 };
    /// Rotation by 180 degrees.
    pub const R180: Self = Self { f: 2 };
    /// Rotation by 270 degrees counter-clockwise.
    pub const R270: Self = Self { f: 3 };
    /// Mirror at the x axis.
    pub const M0: Self = Self { f: 4 };
    /// Mirror at the 45 degree axis.
    pub const M45: Self = Self { f: 5 };
    /// Mirror at the y axis.
    pub const M90: Self = Self { f: 6 };
    /// Mirror at the 135 degree axis.
    pub const M135: Self = Self { f: 7 };

    /// Creates a fixpoint transformation from its code.
    ///
    /// # Panics
    ///
    /// Panics if `code > 7`.
    #[inline]
    pub fn from_code(code: u8) -> Self {
        assert!(code < 8, "invalid fixpoint transformation code: {code}");
        Self { f: code }
    }

    /// Creates a fixpoint transformation from a rotation in units of 90 degrees
    /// and a mirror flag. Mirroring is applied before the rotation.
    #[inline]
    pub fn new(rot: i32, mirror: bool) -> Self {
        Self {
            f: (rot.rem_euclid(4) as u8) + if mirror { 4 } else { 0 },
        }
    }

    /// Returns all eight codes in ascending order.
    pub fn all() -> [Self; 8] {
        [0, 1, 2, 3, 4, 5, 6, 7].map(Self::from_code)
    }

    /// The code of this transformation (0 to 7).
    #[inline]
    pub fn code(&self) -> u8 {
        self.f
    }

    /// The rotation in units of 90 degrees (0 to 3).
    #[inline]
    pub fn rot(&self) -> u8 {
        self.f & 3
    }

    /// The rotation angle in degrees.
    #[inline]
    pub fn angle(&self) -> f64 {
        f64::from(self.rot()) * 90.
    }

    /// Returns `true` if this transformation mirrors.
    #[inline]
    pub fn is_mirror(&self) -> bool {
        self.f & 4 != 0
    }

    /// Returns the inverse transformation.
    pub fn inverted(&self) -> Self {
        if self.is_mirror() {
            *self
        } else {
            Self {
                f: (4 - self.f) & 3,
            }
        }
    }

    /// Inverts this transformation in place.
    pub fn invert(&mut self) -> &mut Self {
        *self = self.inverted();
        self
    }

    /// The cosine and sine of the rotation angle.
    pub(crate) fn cos_sin(&self) -> (f64, f64) {
        match self.rot() {
            0 => (1., 0.),
            1 => (0., 1.),
            2 => (-1., 0.),
            _ => (0., -1.),
        }
    }

    #[inline]
    fn apply<C: Coord>(&self, x: C, y: C) -> (C, C) {
        match self.f {
            0 => (x, y),
            1 => (-y, x),
            2 => (-x, -y),
            3 => (y, -x),
            4 => (x, -y),
            5 => (y, x),
            6 => (-x, y),
            _ => (-y, -x),
        }
    }
}

impl<C: Coord> Transformation<C, C> for FixpointTrans {
    #[inline]
    fn trans_point(&self, p: Point<C>) -> Point<C> {
        let (x, y) = self.apply(p.x, p.y);
        Point::new(x, y)
    }

    #[inline]
    fn trans_vector(&self, v: Vector<C>) -> Vector<C> {
        let (x, y) = self.apply(v.x, v.y);
        Vector::new(x, y)
    }

    #[inline]
    fn ctrans(&self, d: C) -> C {
        d
    }

    fn is_unity(&self) -> bool {
        self.f == 0
    }

    fn is_ortho(&self) -> bool {
        true
    }

    fn is_mirror(&self) -> bool {
        FixpointTrans::is_mirror(self)
    }

    fn fp_trans(&self) -> FixpointTrans {
        *self
    }

    fn to_complex(&self) -> ComplexTrans<C, C> {
        ComplexTrans::from(*self)
    }
}

impl Mul for FixpointTrans {
    type Output = Self;

    fn mul(self, t: Self) -> Self {
        let f = i32::from(self.f);
        let tf = i32::from(t.f);
        let f = ((f + (1 - ((f & 4) >> 1)) * tf) & 3) + ((f ^ tf) & 4);
        Self { f: f as u8 }
    }
}

/// A pure displacement.
#[derive(Debug, Default, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DispTrans<C = i64> {
    u: Vector<C>,
}

impl<C: Coord> DispTrans<C> {
    /// Creates a displacement by `u`.
    #[inline]
    pub fn new(u: Vector<C>) -> Self {
        Self { u }
    }

    /// The displacement vector.
    #[inline]
    pub fn disp(&self) -> Vector<C> {
        self.u
    }

    /// Returns the inverse displacement.
    #[inline]
    pub fn inverted(&self) -> Self {
        Self { u: -self.u }
    }
}

impl<C: Coord> Transformation<C, C> for DispTrans<C> {
    #[inline]
    fn trans_point(&self, p: Point<C>) -> Point<C> {
        p + self.u
    }

    #[inline]
    fn trans_vector(&self, v: Vector<C>) -> Vector<C> {
        v
    }

    #[inline]
    fn ctrans(&self, d: C) -> C {
        d
    }

    fn is_unity(&self) -> bool {
        self.u.is_zero()
    }

    fn is_ortho(&self) -> bool {
        true
    }

    fn is_mirror(&self) -> bool {
        false
    }

    fn fp_trans(&self) -> FixpointTrans {
        FixpointTrans::R0
    }

    fn to_complex(&self) -> ComplexTrans<C, C> {
        ComplexTrans::from_disp(self.u)
    }
}

impl<C: Coord> Mul for DispTrans<C> {
    type Output = Self;

    fn mul(self, t: Self) -> Self {
        Self { u: self.u + t.u }
    }
}

/// A Manhattan orientation followed by a displacement: `p' = f(p) + u`.
#[derive(Debug, Default, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SimpleTrans<C = i64> {
    f: FixpointTrans,
    u: Vector<C>,
}

/// An integer simple transformation.
pub type Trans = SimpleTrans<i64>;

/// A floating-point simple transformation.
pub type DTrans = SimpleTrans<f64>;

impl<C: Coord> SimpleTrans<C> {
    /// Creates a transformation applying `f` and then displacing by `u`.
    #[inline]
    pub fn new(f: FixpointTrans, u: Vector<C>) -> Self {
        Self { f, u }
    }

    /// The identity transformation.
    #[inline]
    pub fn identity() -> Self {
        Self::new(FixpointTrans::R0, Vector::zero())
    }

    /// A pure displacement.
    #[inline]
    pub fn from_disp(u: Vector<C>) -> Self {
        Self::new(FixpointTrans::R0, u)
    }

    /// Builds a simple transformation from the Manhattan part and the
    /// rounded displacement of a complex transformation.
    ///
    /// Magnification and non-Manhattan rotation are dropped.
    pub fn from_complex<I: Coord>(ct: &ComplexTrans<I, C>) -> Self {
        Self::new(ct.fp_trans(), ct.disp())
    }

    /// The Manhattan part.
    #[inline]
    pub fn fp_trans(&self) -> FixpointTrans {
        self.f
    }

    /// The displacement.
    #[inline]
    pub fn disp(&self) -> Vector<C> {
        self.u
    }

    /// The rotation in units of 90 degrees.
    #[inline]
    pub fn rot(&self) -> u8 {
        self.f.rot()
    }

    /// Returns the inverse transformation.
    pub fn inverted(&self) -> Self {
        let f = self.f.inverted();
        Self {
            f,
            u: -f.trans_vector(self.u),
        }
    }

    /// Inverts this transformation in place.
    pub fn invert(&mut self) -> &mut Self {
        *self = self.inverted();
        self
    }

    /// Fuzzy equality.
    pub fn equal(&self, other: &Self) -> bool {
        self.f == other.f && self.u.equal(&other.u)
    }

    /// Fuzzy ordering consistent with [`SimpleTrans::equal`].
    pub fn less(&self, other: &Self) -> bool {
        if self.f != other.f {
            self.f < other.f
        } else {
            self.u.less(&other.u)
        }
    }
}

impl<C: Coord> Transformation<C, C> for SimpleTrans<C> {
    #[inline]
    fn trans_point(&self, p: Point<C>) -> Point<C> {
        self.f.trans_point(p) + self.u
    }

    #[inline]
    fn trans_vector(&self, v: Vector<C>) -> Vector<C> {
        self.f.trans_vector(v)
    }

    #[inline]
    fn ctrans(&self, d: C) -> C {
        d
    }

    fn is_unity(&self) -> bool {
        self.f.code() == 0 && self.u.is_zero()
    }

    fn is_ortho(&self) -> bool {
        true
    }

    fn is_mirror(&self) -> bool {
        self.f.is_mirror()
    }

    fn fp_trans(&self) -> FixpointTrans {
        self.f
    }

    fn to_complex(&self) -> ComplexTrans<C, C> {
        ComplexTrans::from(*self)
    }
}

impl<C: Coord> Mul for SimpleTrans<C> {
    type Output = Self;

    fn mul(self, t: Self) -> Self {
        Self {
            f: self.f * t.f,
            u: self.f.trans_vector(t.u) + self.u,
        }
    }
}

impl<C: Coord> From<FixpointTrans> for SimpleTrans<C> {
    fn from(f: FixpointTrans) -> Self {
        Self::new(f, Vector::zero())
    }
}

impl<C: Coord> From<DispTrans<C>> for SimpleTrans<C> {
    fn from(d: DispTrans<C>) -> Self {
        Self::from_disp(d.disp())
    }
}

/// The concatenation of two transformations: `first` applied after `second`.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedTrans<A, B> {
    first: A,
    second: B,
}

impl<A, B> CombinedTrans<A, B> {
    /// Combines `first` and `second`, where `second` is applied first.
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    /// The transformation applied last.
    pub fn first(&self) -> &A {
        &self.first
    }

    /// The transformation applied first.
    pub fn second(&self) -> &B {
        &self.second
    }
}

impl<C: Coord, A: Transformation<C, C>, B: Transformation<C, C>> Transformation<C, C>
    for CombinedTrans<A, B>
{
    fn trans_point(&self, p: Point<C>) -> Point<C> {
        self.first.trans_point(self.second.trans_point(p))
    }

    fn trans_vector(&self, v: Vector<C>) -> Vector<C> {
        self.first.trans_vector(self.second.trans_vector(v))
    }

    fn ctrans(&self, d: C) -> C {
        self.first.ctrans(self.second.ctrans(d))
    }

    fn is_unity(&self) -> bool {
        self.to_complex().is_unity()
    }

    fn is_ortho(&self) -> bool {
        self.first.is_ortho() && self.second.is_ortho()
    }

    fn is_mirror(&self) -> bool {
        self.first.is_mirror() != self.second.is_mirror()
    }

    fn mag(&self) -> f64 {
        self.first.mag() * self.second.mag()
    }

    fn fp_trans(&self) -> FixpointTrans {
        self.first.fp_trans() * self.second.fp_trans()
    }

    fn to_complex(&self) -> ComplexTrans<C, C> {
        self.first.to_complex() * self.second.to_complex()
    }
}

/// A trait for specifying how an object is changed by a [`Transformation`].
pub trait TransformMut {
    /// Applies the transformation `trans` in place.
    fn transform_mut<T: Transformation>(&mut self, trans: &T);
}

#[impl_for_tuples(16)]
impl TransformMut for TupleIdentifier {
    fn transform_mut<T: Transformation>(&mut self, trans: &T) {
        for_tuples!( #( TupleIdentifier.transform_mut(trans); )* );
    }
}

impl<E: TransformMut> TransformMut for Vec<E> {
    fn transform_mut<T: Transformation>(&mut self, trans: &T) {
        for i in self.iter_mut() {
            i.transform_mut(trans);
        }
    }
}

impl<E: TransformMut> TransformMut for Option<E> {
    fn transform_mut<T: Transformation>(&mut self, trans: &T) {
        if let Some(inner) = self.as_mut() {
            inner.transform_mut(trans);
        }
    }
}

/// A trait for specifying how an object is changed by a [`Transformation`].
///
/// Takes in an owned copy of the shape and returns the transformed version.
pub trait Transform: TransformMut + Sized {
    /// Applies the transformation `trans`, returning the transformed object.
    #[inline]
    fn transform<T: Transformation>(mut self, trans: &T) -> Self {
        self.transform_mut(trans);
        self
    }
}

impl<E: TransformMut + Sized> Transform for E {}

/// A trait for specifying how a shape is translated by a [`Vector`].
pub trait TranslateMut {
    /// Translates the shape by a [`Vector`] through mutation.
    fn translate_mut(&mut self, v: Vector);
}

#[impl_for_tuples(16)]
impl TranslateMut for TupleIdentifier {
    fn translate_mut(&mut self, v: Vector) {
        for_tuples!( #( TupleIdentifier.translate_mut(v); )* );
    }
}

impl<E: TranslateMut> TranslateMut for Vec<E> {
    fn translate_mut(&mut self, v: Vector) {
        for i in self.iter_mut() {
            i.translate_mut(v);
        }
    }
}

impl<E: TranslateMut> TranslateMut for Option<E> {
    fn translate_mut(&mut self, v: Vector) {
        if let Some(inner) = self.as_mut() {
            inner.translate_mut(v);
        }
    }
}

/// A trait for specifying how a shape is translated by a [`Vector`].
///
/// Takes in an owned copy of the shape and returns the translated version.
pub trait Translate: TranslateMut + Sized {
    /// Translates the shape, returning the translated object.
    fn translate(mut self, v: Vector) -> Self {
        self.translate_mut(v);
        self
    }
}

impl<E: TranslateMut + Sized> Translate for E {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rect::Rect;

    fn sample_points() -> Vec<Point> {
        vec![
            Point::new(0, 0),
            Point::new(2, 1),
            Point::new(-7, 3),
            Point::new(1000, -999),
            Point::new(i64::from(i32::MAX), -5),
        ]
    }

    #[test]
    fn fixpoint_codes_map_points_exactly() {
        let p = Point::new(2, 1);
        let expected = [
            Point::new(2, 1),
            Point::new(-1, 2),
            Point::new(-2, -1),
            Point::new(1, -2),
            Point::new(2, -1),
            Point::new(1, 2),
            Point::new(-2, 1),
            Point::new(-1, -2),
        ];
        for (f, e) in FixpointTrans::all().into_iter().zip(expected) {
            assert_eq!(f.trans_point(p), e, "code {}", f.code());
        }
    }

    #[test]
    fn fixpoint_composition_is_closed_and_matches_application() {
        for a in FixpointTrans::all() {
            for b in FixpointTrans::all() {
                let c = a * b;
                assert!(c.code() < 8);
                for p in sample_points() {
                    assert_eq!(
                        c.trans_point(p),
                        a.trans_point(b.trans_point(p)),
                        "{} * {}",
                        a.code(),
                        b.code()
                    );
                }
            }
        }
    }

    #[test]
    fn fixpoint_composition_is_associative() {
        for a in FixpointTrans::all() {
            for b in FixpointTrans::all() {
                for c in FixpointTrans::all() {
                    assert_eq!((a * b) * c, a * (b * c));
                }
            }
            assert_eq!(a * FixpointTrans::R0, a);
            assert_eq!(FixpointTrans::R0 * a, a);
        }
    }

    #[test]
    fn fixpoint_inverse_round_trips_exactly() {
        for f in FixpointTrans::all() {
            for p in sample_points() {
                assert_eq!(f.inverted().trans_point(f.trans_point(p)), p);
            }
            assert_eq!(f * f.inverted(), FixpointTrans::R0);
        }
    }

    #[test]
    fn simple_trans_composition_applies_right_operand_first() {
        let a = Trans::new(FixpointTrans::R90, Vector::new(10, 0));
        let b = Trans::new(FixpointTrans::M0, Vector::new(0, 5));
        let c = Trans::new(FixpointTrans::R180, Vector::new(-3, 7));
        for p in sample_points() {
            assert_eq!((a * b).trans_point(p), a.trans_point(b.trans_point(p)));
        }
        assert_eq!((a * b) * c, a * (b * c));
        assert_eq!(a * Trans::identity(), a);
        assert_eq!(a * a.inverted(), Trans::identity());
    }

    #[test]
    fn disp_trans_composes_additively() {
        let a = DispTrans::new(Vector::new(1, 2));
        let b = DispTrans::new(Vector::new(-4, 8));
        assert_eq!((a * b).disp(), Vector::new(-3, 10));
        assert!((a * a.inverted()).is_unity());
    }

    #[test]
    fn combined_trans_applies_second_first() {
        let a = Trans::new(FixpointTrans::R90, Vector::zero());
        let b = DispTrans::new(Vector::new(5, 0));
        let c = CombinedTrans::new(a, b);
        assert_eq!(c.trans_point(Point::new(0, 0)), Point::new(0, 5));
        assert_eq!(c.fp_trans(), FixpointTrans::R90);
    }

    #[test]
    fn transform_works_for_tuples_and_vecs() {
        let t = Trans::new(FixpointTrans::R90, Vector::zero());
        let mut tuple = (
            Rect::from_sides(0, 0, 100, 200),
            Rect::from_sides(50, -50, 150, 0),
        );
        tuple.transform_mut(&t);
        assert_eq!(
            tuple,
            (
                Rect::from_sides(-200, 0, 0, 100),
                Rect::from_sides(0, 50, 50, 150)
            )
        );

        let v = vec![Point::new(1, 0), Point::new(0, 1)].transform(&t);
        assert_eq!(v, vec![Point::new(0, 1), Point::new(-1, 0)]);
    }

    #[test]
    fn translate_works_for_vecs() {
        let mut v = vec![
            Rect::from_sides(0, 0, 100, 200),
            Rect::from_sides(50, -50, 150, 0),
        ];
        v.translate_mut(Vector::new(5, 10));
        assert_eq!(
            v,
            vec![
                Rect::from_sides(5, 10, 105, 210),
                Rect::from_sides(55, -40, 155, 10)
            ]
        );
    }
}
