//! 2-D points and vectors.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use crate::bbox::Bbox;
use crate::coord::Coord;
use crate::rect::Rect;
use crate::transform::{Transformation, TransformMut, TranslateMut};

/// A point in two-dimensional space.
///
/// Points order by x-coordinate first, then by y-coordinate.
#[derive(
    Debug, Copy, Clone, Default, Hash, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord,
)]
pub struct Point<C = i64> {
    /// The x-coordinate of the point.
    pub x: C,
    /// The y-coordinate of the point.
    pub y: C,
}

/// A displacement in two-dimensional space.
#[derive(
    Debug, Copy, Clone, Default, Hash, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord,
)]
pub struct Vector<C = i64> {
    /// The x-component of the vector.
    pub x: C,
    /// The y-component of the vector.
    pub y: C,
}

/// A point with floating-point coordinates.
pub type DPoint = Point<f64>;

/// A vector with floating-point coordinates.
pub type DVector = Vector<f64>;

impl<C: Coord> Point<C> {
    /// Creates a new [`Point`] from (x,y) coordinates.
    #[inline]
    pub const fn new(x: C, y: C) -> Self {
        Self { x, y }
    }

    /// Returns the origin, `(0, 0)`.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let origin = Point::<i64>::zero();
    /// assert_eq!(origin, Point::new(0, 0));
    /// ```
    #[inline]
    pub fn zero() -> Self {
        Self::new(C::zero(), C::zero())
    }

    /// The vector from the origin to this point.
    #[inline]
    pub fn to_vector(self) -> Vector<C> {
        Vector::new(self.x, self.y)
    }

    /// Converts the point to another coordinate type, rounding if necessary.
    #[inline]
    pub fn convert<D: Coord>(self) -> Point<D> {
        Point::new(D::rounded(self.x.to_f64()), D::rounded(self.y.to_f64()))
    }

    /// Fuzzy equality, tolerant of rounding errors for floating-point coordinates.
    #[inline]
    pub fn equal(&self, other: &Self) -> bool {
        C::equal(self.x, other.x) && C::equal(self.y, other.y)
    }

    /// Fuzzy ordering consistent with [`Point::equal`].
    pub fn less(&self, other: &Self) -> bool {
        if !C::equal(self.x, other.x) {
            C::less(self.x, other.x)
        } else {
            C::less(self.y, other.y)
        }
    }

    /// The euclidian distance to another point.
    pub fn distance(&self, other: &Self) -> f64 {
        let dx = other.x.to_f64() - self.x.to_f64();
        let dy = other.y.to_f64() - self.y.to_f64();
        dx.hypot(dy)
    }
}

impl<C: Coord> Vector<C> {
    /// Creates a new [`Vector`] from its components.
    #[inline]
    pub const fn new(x: C, y: C) -> Self {
        Self { x, y }
    }

    /// The null vector.
    #[inline]
    pub fn zero() -> Self {
        Self::new(C::zero(), C::zero())
    }

    /// Returns `true` if both components are zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        C::equal(self.x, C::zero()) && C::equal(self.y, C::zero())
    }

    /// The point this vector points to when starting at the origin.
    #[inline]
    pub fn to_point(self) -> Point<C> {
        Point::new(self.x, self.y)
    }

    /// Converts the vector to another coordinate type, rounding if necessary.
    #[inline]
    pub fn convert<D: Coord>(self) -> Vector<D> {
        Vector::new(D::rounded(self.x.to_f64()), D::rounded(self.y.to_f64()))
    }

    /// Fuzzy equality, tolerant of rounding errors for floating-point coordinates.
    #[inline]
    pub fn equal(&self, other: &Self) -> bool {
        C::equal(self.x, other.x) && C::equal(self.y, other.y)
    }

    /// Fuzzy ordering consistent with [`Vector::equal`].
    pub fn less(&self, other: &Self) -> bool {
        if !C::equal(self.x, other.x) {
            C::less(self.x, other.x)
        } else {
            C::less(self.y, other.y)
        }
    }

    /// The length of the vector.
    #[inline]
    pub fn length(&self) -> f64 {
        self.x.to_f64().hypot(self.y.to_f64())
    }
}

impl Bbox for Point {
    fn bbox(&self) -> Option<Rect> {
        Some(Rect::from_point(*self))
    }
}

impl TranslateMut for Point {
    fn translate_mut(&mut self, v: Vector) {
        *self += v;
    }
}

impl TransformMut for Point {
    fn transform_mut<T: Transformation>(&mut self, trans: &T) {
        *self = trans.trans_point(*self);
    }
}

impl<C: Coord> Add<Vector<C>> for Point<C> {
    type Output = Self;
    fn add(self, rhs: Vector<C>) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl<C: Coord> AddAssign<Vector<C>> for Point<C> {
    fn add_assign(&mut self, rhs: Vector<C>) {
        *self = *self + rhs;
    }
}

impl<C: Coord> Sub<Vector<C>> for Point<C> {
    type Output = Self;
    fn sub(self, rhs: Vector<C>) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl<C: Coord> SubAssign<Vector<C>> for Point<C> {
    fn sub_assign(&mut self, rhs: Vector<C>) {
        *self = *self - rhs;
    }
}

impl<C: Coord> Sub<Point<C>> for Point<C> {
    type Output = Vector<C>;
    fn sub(self, rhs: Point<C>) -> Self::Output {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl<C: Coord> Add<Vector<C>> for Vector<C> {
    type Output = Self;
    fn add(self, rhs: Vector<C>) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl<C: Coord> AddAssign<Vector<C>> for Vector<C> {
    fn add_assign(&mut self, rhs: Vector<C>) {
        *self = *self + rhs;
    }
}

impl<C: Coord> Sub<Vector<C>> for Vector<C> {
    type Output = Self;
    fn sub(self, rhs: Vector<C>) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl<C: Coord> Neg for Vector<C> {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y)
    }
}

impl<C: Coord> Mul<C> for Vector<C> {
    type Output = Self;

    /// Scales both components.
    fn mul(self, rhs: C) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl<C: Coord> From<(C, C)> for Point<C> {
    fn from(value: (C, C)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl<C: Coord> From<(C, C)> for Vector<C> {
    fn from(value: (C, C)) -> Self {
        Self::new(value.0, value.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_vector_arithmetic() {
        let p = Point::new(3, 4);
        let v = Vector::new(-1, 2);
        assert_eq!(p + v, Point::new(2, 6));
        assert_eq!((p + v) - p, v);
        assert_eq!(-v, Vector::new(1, -2));
    }

    #[test]
    fn convert_rounds_half_away_from_zero() {
        let p = DPoint::new(1.5, -1.5);
        assert_eq!(p.convert::<i64>(), Point::new(2, -2));
    }
}
