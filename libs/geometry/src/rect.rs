//! Axis-aligned rectangles ("boxes").

use serde::{Deserialize, Serialize};

use crate::bbox::{Bbox, BoundingUnion};
use crate::coord::Coord;
use crate::point::{Point, Vector};
use crate::transform::{TransformMut, Transformation, TranslateMut};

/// An axis-aligned rectangle, specified by lower-left and upper-right corners.
///
/// Use [`Rect`] for regular integer boxes, [`ShortRect`] for the compact
/// 32-bit variant and [`DRect`] for floating-point boxes. An empty box is
/// represented by `None` wherever a box can be empty.
#[derive(
    Debug, Default, Copy, Clone, Hash, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord,
)]
pub struct GenericRect<C = i64> {
    /// The lower-left corner.
    p0: Point<C>,
    /// The upper-right corner.
    p1: Point<C>,
}

/// A box with 64-bit integer coordinates.
pub type Rect = GenericRect<i64>;

/// A box with 32-bit integer coordinates.
pub type ShortRect = GenericRect<i32>;

/// A box with floating-point coordinates.
pub type DRect = GenericRect<f64>;

impl<C: Coord> GenericRect<C> {
    /// Creates a new rectangle from the given opposite corner points.
    ///
    /// # Examples
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let rect = Rect::new(Point::new(30, 20), Point::new(15, 40));
    /// assert_eq!(rect.left(), 15);
    /// assert_eq!(rect.bot(), 20);
    /// assert_eq!(rect.right(), 30);
    /// assert_eq!(rect.top(), 40);
    /// ```
    #[inline]
    pub fn new(p0: Point<C>, p1: Point<C>) -> Self {
        Self {
            p0: Point::new(C::min_of(p0.x, p1.x), C::min_of(p0.y, p1.y)),
            p1: Point::new(C::max_of(p0.x, p1.x), C::max_of(p0.y, p1.y)),
        }
    }

    /// Creates a rectangle from all 4 sides (left, bottom, right, top).
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let rect = Rect::from_sides(15, 20, 30, 40);
    /// assert_eq!(rect.left(), 15);
    /// assert_eq!(rect.top(), 40);
    /// ```
    ///
    /// # Panics
    ///
    /// This method panics if `left > right` or if `bot > top`.
    ///
    /// If you want sides to be sorted for you, consider using [`GenericRect::new`] instead.
    #[inline]
    pub fn from_sides(left: C, bot: C, right: C, top: C) -> Self {
        assert!(
            left <= right,
            "Rect::from_sides requires that left ({:?}) <= right ({:?})",
            left,
            right
        );
        assert!(
            bot <= top,
            "Rect::from_sides requires that bot ({:?}) <= top ({:?})",
            bot,
            top
        );
        Self {
            p0: Point::new(left, bot),
            p1: Point::new(right, top),
        }
    }

    /// Creates a rectangle from all 4 sides (left, bottom, right, top),
    /// but returns `None` if the given sides would make the rectangle empty.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let rect = Rect::from_sides_option(15, 20, 30, 40);
    /// assert_eq!(rect, Some(Rect::from_sides(15, 20, 30, 40)));
    ///
    /// let rect = Rect::from_sides_option(10, 20, 0, 40);
    /// assert_eq!(rect, None);
    /// ```
    #[inline]
    pub fn from_sides_option(left: C, bot: C, right: C, top: C) -> Option<Self> {
        if left > right || bot > top {
            None
        } else {
            Some(Self::from_sides(left, bot, right, top))
        }
    }

    /// Creates a zero-area rectangle containing the given point.
    #[inline]
    pub fn from_point(p: Point<C>) -> Self {
        Self { p0: p, p1: p }
    }

    /// The smallest rectangle containing all the given points, or `None` if
    /// there are no points.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let pts = [Point::new(3, 9), Point::new(-1, 4), Point::new(7, 5)];
    /// assert_eq!(Rect::from_points(pts), Some(Rect::from_sides(-1, 4, 7, 9)));
    /// ```
    pub fn from_points(points: impl IntoIterator<Item = Point<C>>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut rect = Self::from_point(first);
        for p in iter {
            rect = rect.union(Self::from_point(p));
        }
        Some(rect)
    }

    /// Returns the left x-coordinate of the rectangle.
    #[inline]
    pub fn left(&self) -> C {
        self.p0.x
    }

    /// Returns the bottom y-coordinate of the rectangle.
    #[inline]
    pub fn bot(&self) -> C {
        self.p0.y
    }

    /// Returns the right x-coordinate of the rectangle.
    #[inline]
    pub fn right(&self) -> C {
        self.p1.x
    }

    /// Returns the top y-coordinate of the rectangle.
    #[inline]
    pub fn top(&self) -> C {
        self.p1.y
    }

    /// The lower-left corner.
    #[inline]
    pub fn lower_left(&self) -> Point<C> {
        self.p0
    }

    /// The upper-right corner.
    #[inline]
    pub fn upper_right(&self) -> Point<C> {
        self.p1
    }

    /// The four corners, counter-clockwise starting at the lower left.
    pub fn corners(&self) -> [Point<C>; 4] {
        [
            self.p0,
            Point::new(self.p1.x, self.p0.y),
            self.p1,
            Point::new(self.p0.x, self.p1.y),
        ]
    }

    /// Returns the horizontal width of the rectangle.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let rect = Rect::from_sides(10, 20, 30, 50);
    /// assert_eq!(rect.width(), 20);
    /// assert_eq!(rect.height(), 30);
    /// ```
    #[inline]
    pub fn width(&self) -> C {
        self.p1.x - self.p0.x
    }

    /// Returns the vertical height of the rectangle.
    #[inline]
    pub fn height(&self) -> C {
        self.p1.y - self.p0.y
    }

    /// Returns the area of the rectangle.
    #[inline]
    pub fn area(&self) -> f64 {
        self.width().to_f64() * self.height().to_f64()
    }

    /// Returns `true` if the point lies inside the rectangle or on its boundary.
    pub fn contains(&self, p: Point<C>) -> bool {
        self.p0.x <= p.x && p.x <= self.p1.x && self.p0.y <= p.y && p.y <= self.p1.y
    }

    /// Returns `true` if the rectangles share at least one point, including
    /// touching edges and corners.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let a = Rect::from_sides(0, 0, 10, 10);
    /// assert!(a.touches(&Rect::from_sides(10, 10, 20, 20)));
    /// assert!(!a.overlaps(&Rect::from_sides(10, 10, 20, 20)));
    /// ```
    pub fn touches(&self, other: &Self) -> bool {
        self.p0.x <= other.p1.x
            && other.p0.x <= self.p1.x
            && self.p0.y <= other.p1.y
            && other.p0.y <= self.p1.y
    }

    /// Returns `true` if the rectangles share an interior area.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.p0.x < other.p1.x
            && other.p0.x < self.p1.x
            && self.p0.y < other.p1.y
            && other.p0.y < self.p1.y
    }

    /// Computes the smallest rectangle containing both `self` and `other`.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let r1 = Rect::from_sides(0, 0, 100, 200);
    /// let r2 = Rect::from_sides(-50, 20, 120, 160);
    /// assert_eq!(r1.union(r2), Rect::from_sides(-50, 0, 120, 200));
    /// ```
    pub fn union(self, other: Self) -> Self {
        Self {
            p0: Point::new(C::min_of(self.p0.x, other.p0.x), C::min_of(self.p0.y, other.p0.y)),
            p1: Point::new(C::max_of(self.p1.x, other.p1.x), C::max_of(self.p1.y, other.p1.y)),
        }
    }

    /// The intersection with `other`, or `None` if the rectangles do not touch.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let r1 = Rect::from_sides(0, 0, 100, 200);
    /// let r2 = Rect::from_sides(-50, 20, 120, 160);
    /// assert_eq!(r1.intersection(r2), Some(Rect::from_sides(0, 20, 100, 160)));
    ///
    /// let r2 = Rect::from_sides(200, 20, 220, 160);
    /// assert_eq!(r1.intersection(r2), None);
    /// ```
    pub fn intersection(self, other: Self) -> Option<Self> {
        Self::from_sides_option(
            C::max_of(self.p0.x, other.p0.x),
            C::max_of(self.p0.y, other.p0.y),
            C::min_of(self.p1.x, other.p1.x),
            C::min_of(self.p1.y, other.p1.y),
        )
    }

    /// Expands the rectangle by `dx` horizontally and `dy` vertically on each side.
    ///
    /// Returns `None` if shrinking (negative amounts) makes the rectangle empty.
    pub fn enlarged(&self, dx: C, dy: C) -> Option<Self> {
        Self::from_sides_option(
            self.p0.x - dx,
            self.p0.y - dy,
            self.p1.x + dx,
            self.p1.y + dy,
        )
    }

    /// Returns the rectangle shifted by `v`.
    #[inline]
    pub fn moved(&self, v: Vector<C>) -> Self {
        Self {
            p0: self.p0 + v,
            p1: self.p1 + v,
        }
    }

    /// Converts the rectangle to another coordinate type, rounding if necessary.
    pub fn convert<D: Coord>(&self) -> GenericRect<D> {
        GenericRect::new(self.p0.convert(), self.p1.convert())
    }

    /// Applies a transformation, possibly changing the coordinate type.
    ///
    /// Non-orthogonal transformations yield the bounding box of the
    /// transformed corners.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let rect = Rect::from_sides(0, 0, 10, 20);
    /// let t = CplxTrans::new(0.5, 0., false, Vector::new(1., 1.));
    /// assert_eq!(rect.transformed(&t), DRect::from_sides(1., 1., 6., 11.));
    /// ```
    pub fn transformed<F: Coord, T: Transformation<C, F>>(&self, trans: &T) -> GenericRect<F> {
        if trans.is_ortho() {
            GenericRect::new(trans.trans_point(self.p0), trans.trans_point(self.p1))
        } else {
            let [a, b, c, d] = self.corners().map(|p| trans.trans_point(p));
            GenericRect::new(a, c).union(GenericRect::new(b, d))
        }
    }
}

impl Bbox for Rect {
    fn bbox(&self) -> Option<Rect> {
        Some(*self)
    }
}

impl Bbox for ShortRect {
    fn bbox(&self) -> Option<Rect> {
        Some(self.convert())
    }
}

impl BoundingUnion<Rect> for Rect {
    type Output = Rect;
    fn bounding_union(&self, other: &Rect) -> Self::Output {
        self.union(*other)
    }
}

impl TranslateMut for Rect {
    fn translate_mut(&mut self, v: Vector) {
        *self = self.moved(v);
    }
}

impl TransformMut for Rect {
    fn transform_mut<T: Transformation>(&mut self, trans: &T) {
        *self = self.transformed(trans);
    }
}

impl TranslateMut for ShortRect {
    fn translate_mut(&mut self, v: Vector) {
        let r: Rect = self.convert();
        *self = r.moved(v).convert();
    }
}

impl TransformMut for ShortRect {
    fn transform_mut<T: Transformation>(&mut self, trans: &T) {
        let r: Rect = self.convert();
        *self = r.transformed(trans).convert();
    }
}
