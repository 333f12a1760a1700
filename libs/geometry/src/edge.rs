//! Directed edges and edge pairs.

use serde::{Deserialize, Serialize};

use crate::bbox::Bbox;
use crate::point::{Point, Vector};
use crate::polygon::SimplePolygon;
use crate::rect::Rect;
use crate::transform::{TransformMut, Transformation, TranslateMut};

/// A directed edge from `p1` to `p2`.
#[derive(
    Debug, Default, Clone, Copy, Serialize, Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord,
)]
pub struct Edge {
    p1: Point,
    p2: Point,
}

impl Edge {
    /// Create a new edge.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let edge = Edge::new(Point::new(0, 0), Point::new(30, 40));
    /// assert_eq!(edge.length(), 50.);
    /// ```
    pub fn new(p1: Point, p2: Point) -> Self {
        Self { p1, p2 }
    }

    /// The start point.
    #[inline]
    pub fn p1(&self) -> Point {
        self.p1
    }

    /// The end point.
    #[inline]
    pub fn p2(&self) -> Point {
        self.p2
    }

    /// The horizontal extent, `p2.x - p1.x`.
    #[inline]
    pub fn dx(&self) -> i64 {
        self.p2.x - self.p1.x
    }

    /// The vertical extent, `p2.y - p1.y`.
    #[inline]
    pub fn dy(&self) -> i64 {
        self.p2.y - self.p1.y
    }

    /// The direction vector.
    #[inline]
    pub fn d(&self) -> Vector {
        self.p2 - self.p1
    }

    /// The euclidian length.
    pub fn length(&self) -> f64 {
        self.p1.distance(&self.p2)
    }

    /// Returns `true` if start and end point coincide.
    pub fn is_degenerate(&self) -> bool {
        self.p1 == self.p2
    }

    /// The edge with start and end point swapped.
    pub fn swapped(&self) -> Self {
        Self::new(self.p2, self.p1)
    }
}

impl Bbox for Edge {
    fn bbox(&self) -> Option<Rect> {
        Some(Rect::new(self.p1, self.p2))
    }
}

impl TranslateMut for Edge {
    fn translate_mut(&mut self, v: Vector) {
        self.p1 += v;
        self.p2 += v;
    }
}

impl TransformMut for Edge {
    fn transform_mut<T: Transformation>(&mut self, trans: &T) {
        self.p1 = trans.trans_point(self.p1);
        self.p2 = trans.trans_point(self.p2);
    }
}

/// Two edges, typically the result of a check between two edges.
///
/// A symmetric edge pair does not distinguish between its first and second
/// edge; its edges are stored sorted so that equal pairs compare equal.
#[derive(
    Debug, Default, Clone, Copy, Serialize, Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord,
)]
pub struct EdgePair {
    first: Edge,
    second: Edge,
    symmetric: bool,
}

impl EdgePair {
    /// Creates an edge pair.
    pub fn new(first: Edge, second: Edge) -> Self {
        Self {
            first,
            second,
            symmetric: false,
        }
    }

    /// Creates a symmetric edge pair.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let a = Edge::new(Point::new(0, 0), Point::new(0, 10));
    /// let b = Edge::new(Point::new(5, 10), Point::new(5, 0));
    /// assert_eq!(EdgePair::symmetric(a, b), EdgePair::symmetric(b, a));
    /// assert_ne!(EdgePair::new(a, b), EdgePair::new(b, a));
    /// ```
    pub fn symmetric(first: Edge, second: Edge) -> Self {
        let (first, second) = if second < first {
            (second, first)
        } else {
            (first, second)
        };
        Self {
            first,
            second,
            symmetric: true,
        }
    }

    /// The first edge.
    #[inline]
    pub fn first(&self) -> Edge {
        self.first
    }

    /// The second edge.
    #[inline]
    pub fn second(&self) -> Edge {
        self.second
    }

    /// Returns `true` if first and second edge are interchangeable.
    #[inline]
    pub fn is_symmetric(&self) -> bool {
        self.symmetric
    }

    /// The polygon spanned by the two edges.
    pub fn to_simple_polygon(&self) -> SimplePolygon {
        SimplePolygon::with_compression(
            vec![self.first.p1, self.first.p2, self.second.p1, self.second.p2],
            false,
        )
    }

    fn renormalized(mut self) -> Self {
        if self.symmetric && self.second < self.first {
            std::mem::swap(&mut self.first, &mut self.second);
        }
        self
    }
}

impl Bbox for EdgePair {
    fn bbox(&self) -> Option<Rect> {
        (self.first, self.second).bbox()
    }
}

impl TranslateMut for EdgePair {
    fn translate_mut(&mut self, v: Vector) {
        self.first.translate_mut(v);
        self.second.translate_mut(v);
        *self = self.renormalized();
    }
}

impl TransformMut for EdgePair {
    fn transform_mut<T: Transformation>(&mut self, trans: &T) {
        self.first.transform_mut(trans);
        self.second.transform_mut(trans);
        *self = self.renormalized();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{FixpointTrans, Trans, Transform};

    #[test]
    fn edge_transform_keeps_direction() {
        let e = Edge::new(Point::new(0, 0), Point::new(10, 0));
        let t = Trans::new(FixpointTrans::R90, Vector::new(1, 1));
        let et = e.transform(&t);
        assert_eq!(et.p1(), Point::new(1, 1));
        assert_eq!(et.p2(), Point::new(1, 11));
        assert_eq!(et.bbox(), Some(Rect::from_sides(1, 1, 1, 11)));
    }

    #[test]
    fn edge_pair_bbox_covers_both_edges() {
        let ep = EdgePair::new(
            Edge::new(Point::new(0, 0), Point::new(0, 10)),
            Edge::new(Point::new(5, 12), Point::new(5, -2)),
        );
        assert_eq!(ep.bbox(), Some(Rect::from_sides(0, -2, 5, 12)));
        assert_eq!(ep.to_simple_polygon().hull().len(), 4);
    }

    #[test]
    fn symmetric_pairs_stay_sorted_under_transformation() {
        let a = Edge::new(Point::new(0, 0), Point::new(0, 10));
        let b = Edge::new(Point::new(5, 10), Point::new(5, 0));
        let ep = EdgePair::symmetric(a, b);
        let t = Trans::new(FixpointTrans::M90, Vector::zero());
        let et = ep.transform(&t);
        assert!(et.first() <= et.second());
        assert!(et.is_symmetric());
    }
}
