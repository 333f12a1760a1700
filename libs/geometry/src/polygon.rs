//! Integer coordinate polygons.
//!
//! Contours are stored normalized: consecutive duplicate points are removed,
//! hulls run clockwise and holes counter-clockwise, and every contour starts
//! at its smallest point. Two polygons describing the same contours with the
//! same vertices therefore compare equal, which is what the shape
//! repositories rely on for deduplication.

use serde::{Deserialize, Serialize};

use crate::bbox::Bbox;
use crate::edge::Edge;
use crate::point::{Point, Vector};
use crate::rect::Rect;
use crate::transform::{TransformMut, Transformation, TranslateMut};

/// A polygon with a hull and any number of holes.
#[derive(Debug, Default, Clone, Hash, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct Polygon {
    hull: Vec<Point>,
    holes: Vec<Vec<Point>>,
}

/// A polygon without holes.
#[derive(Debug, Default, Clone, Hash, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct SimplePolygon {
    hull: Vec<Point>,
}

/// Twice the signed area of a closed contour (positive for counter-clockwise).
fn area2(points: &[Point]) -> i128 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            i128::from(a.x) * i128::from(b.y) - i128::from(b.x) * i128::from(a.y)
        })
        .sum()
}

fn cross(a: Point, b: Point, c: Point) -> i128 {
    let u = b - a;
    let v = c - b;
    i128::from(u.x) * i128::from(v.y) - i128::from(u.y) * i128::from(v.x)
}

fn remove_duplicates(points: &mut Vec<Point>) {
    points.dedup();
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
}

fn remove_collinear(points: &mut Vec<Point>) {
    loop {
        let n = points.len();
        if n < 3 {
            return;
        }
        let Some(i) =
            (0..n).find(|&i| cross(points[(i + n - 1) % n], points[i], points[(i + 1) % n]) == 0)
        else {
            return;
        };
        points.remove(i);
        remove_duplicates(points);
    }
}

/// Brings a contour into canonical form.
fn normalize_contour(points: impl IntoIterator<Item = Point>, hole: bool, compress: bool) -> Vec<Point> {
    let mut points: Vec<Point> = points.into_iter().collect();
    remove_duplicates(&mut points);
    if compress {
        remove_collinear(&mut points);
    }
    let a = area2(&points);
    if (!hole && a > 0) || (hole && a < 0) {
        points.reverse();
    }
    if let Some((imin, _)) = points.iter().enumerate().min_by_key(|(_, p)| **p) {
        points.rotate_left(imin);
    }
    points
}

fn contour_edges(points: &[Point]) -> impl Iterator<Item = Edge> + '_ {
    let n = points.len();
    (0..n).map(move |i| Edge::new(points[i], points[(i + 1) % n]))
}

impl Polygon {
    /// Creates a polygon from its hull, removing collinear points.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let p = Polygon::new(vec![
    ///     Point::new(0, 0),
    ///     Point::new(10, 0),
    ///     Point::new(20, 0),
    ///     Point::new(20, 10),
    ///     Point::new(0, 10),
    /// ]);
    /// assert_eq!(p.hull().len(), 4);
    /// assert_eq!(p.hull()[0], Point::new(0, 0));
    /// assert_eq!(p.hull()[1], Point::new(0, 10));
    /// ```
    pub fn new(hull: Vec<Point>) -> Self {
        Self::with_compression(hull, true)
    }

    /// Creates a polygon from its hull, removing collinear points only if `compress` is set.
    pub fn with_compression(hull: Vec<Point>, compress: bool) -> Self {
        Self {
            hull: normalize_contour(hull, false, compress),
            holes: Vec::new(),
        }
    }

    /// Creates a polygon from a hull and a list of holes.
    pub fn with_holes(hull: Vec<Point>, holes: Vec<Vec<Point>>) -> Self {
        let mut poly = Self::new(hull);
        for h in holes {
            poly.insert_hole(h);
        }
        poly
    }

    /// Adds a hole. Holes are kept sorted.
    pub fn insert_hole(&mut self, hole: Vec<Point>) {
        self.insert_hole_with_compression(hole, true);
    }

    fn insert_hole_with_compression(&mut self, hole: Vec<Point>, compress: bool) {
        let hole = normalize_contour(hole, true, compress);
        let pos = self.holes.partition_point(|h| *h < hole);
        self.holes.insert(pos, hole);
    }

    /// The hull contour (clockwise).
    pub fn hull(&self) -> &[Point] {
        &self.hull
    }

    /// The hole contours (counter-clockwise).
    pub fn holes(&self) -> &[Vec<Point>] {
        &self.holes
    }

    /// The total number of vertices in hull and holes.
    pub fn vertices(&self) -> usize {
        self.hull.len() + self.holes.iter().map(Vec::len).sum::<usize>()
    }

    /// Returns `true` if the polygon has no vertices.
    pub fn is_empty(&self) -> bool {
        self.hull.is_empty()
    }

    /// Returns `true` if the polygon is an axis-aligned rectangle.
    pub fn is_box(&self) -> bool {
        self.holes.is_empty()
            && self.hull.len() == 4
            && contour_edges(&self.hull).all(|e| e.dx() == 0 || e.dy() == 0)
    }

    /// The enclosed area (hull minus holes).
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let p = Polygon::with_holes(
    ///     Rect::from_sides(0, 0, 10, 10).into(),
    ///     vec![Rect::from_sides(2, 2, 4, 4).into()],
    /// );
    /// assert_eq!(p.area(), 96.);
    /// ```
    pub fn area(&self) -> f64 {
        let hull = area2(&self.hull).abs();
        let holes: i128 = self.holes.iter().map(|h| area2(h).abs()).sum();
        (hull - holes) as f64 / 2.
    }

    /// All edges of the hull and the holes.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        contour_edges(&self.hull).chain(self.holes.iter().flat_map(|h| contour_edges(h)))
    }

    /// Applies a transformation, optionally compressing collinear points of
    /// the transformed contours.
    ///
    /// Rounding in non-Manhattan transformations may produce collinear or
    /// coincident points; compression is off by default so that no vertex
    /// information is lost.
    pub fn transformed_with<T: Transformation>(&self, trans: &T, compress: bool) -> Self {
        let mut poly = Self {
            hull: normalize_contour(
                self.hull.iter().map(|p| trans.trans_point(*p)),
                false,
                compress,
            ),
            holes: Vec::with_capacity(self.holes.len()),
        };
        for h in &self.holes {
            poly.insert_hole_with_compression(h.iter().map(|p| trans.trans_point(*p)).collect(), compress);
        }
        poly
    }

    /// Returns the polygon shifted by `v`.
    pub fn moved(&self, v: Vector) -> Self {
        Self {
            hull: self.hull.iter().map(|p| *p + v).collect(),
            holes: self
                .holes
                .iter()
                .map(|h| h.iter().map(|p| *p + v).collect())
                .collect(),
        }
    }
}

impl SimplePolygon {
    /// Creates a simple polygon from its hull, removing collinear points.
    pub fn new(hull: Vec<Point>) -> Self {
        Self::with_compression(hull, true)
    }

    /// Creates a simple polygon, removing collinear points only if `compress` is set.
    pub fn with_compression(hull: Vec<Point>, compress: bool) -> Self {
        Self {
            hull: normalize_contour(hull, false, compress),
        }
    }

    /// The hull contour (clockwise).
    pub fn hull(&self) -> &[Point] {
        &self.hull
    }

    /// Returns `true` if the polygon has no vertices.
    pub fn is_empty(&self) -> bool {
        self.hull.is_empty()
    }

    /// The enclosed area.
    pub fn area(&self) -> f64 {
        area2(&self.hull).abs() as f64 / 2.
    }

    /// All edges of the hull.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        contour_edges(&self.hull)
    }

    /// Applies a transformation, optionally compressing collinear points.
    pub fn transformed_with<T: Transformation>(&self, trans: &T, compress: bool) -> Self {
        Self {
            hull: normalize_contour(
                self.hull.iter().map(|p| trans.trans_point(*p)),
                false,
                compress,
            ),
        }
    }

    /// Returns the polygon shifted by `v`.
    pub fn moved(&self, v: Vector) -> Self {
        Self {
            hull: self.hull.iter().map(|p| *p + v).collect(),
        }
    }

    /// Builds a simple polygon from the hull of `poly`. Holes are dropped.
    pub fn from_hull(poly: &Polygon) -> Self {
        Self {
            hull: poly.hull.clone(),
        }
    }
}

impl From<SimplePolygon> for Polygon {
    fn from(value: SimplePolygon) -> Self {
        Self {
            hull: value.hull,
            holes: Vec::new(),
        }
    }
}

impl From<Rect> for Vec<Point> {
    fn from(value: Rect) -> Self {
        value.corners().to_vec()
    }
}

impl From<Rect> for Polygon {
    fn from(value: Rect) -> Self {
        Self::new(value.into())
    }
}

impl From<Rect> for SimplePolygon {
    fn from(value: Rect) -> Self {
        Self::new(value.into())
    }
}

impl Bbox for Polygon {
    fn bbox(&self) -> Option<Rect> {
        Rect::from_points(self.hull.iter().copied())
    }
}

impl Bbox for SimplePolygon {
    fn bbox(&self) -> Option<Rect> {
        Rect::from_points(self.hull.iter().copied())
    }
}

impl TranslateMut for Polygon {
    fn translate_mut(&mut self, v: Vector) {
        *self = self.moved(v);
    }
}

impl TransformMut for Polygon {
    fn transform_mut<T: Transformation>(&mut self, trans: &T) {
        *self = self.transformed_with(trans, false);
    }
}

impl TranslateMut for SimplePolygon {
    fn translate_mut(&mut self, v: Vector) {
        *self = self.moved(v);
    }
}

impl TransformMut for SimplePolygon {
    fn transform_mut<T: Transformation>(&mut self, trans: &T) {
        *self = self.transformed_with(trans, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complex::ICplxTrans;
    use crate::transform::{FixpointTrans, Trans, Transform};

    fn triangle() -> Vec<Point> {
        vec![Point::new(0, 0), Point::new(10, 0), Point::new(0, 10)]
    }

    #[test]
    fn normalization_is_independent_of_start_and_orientation() {
        let a = Polygon::new(triangle());
        let mut rev = triangle();
        rev.reverse();
        rev.rotate_left(1);
        let b = Polygon::new(rev);
        assert_eq!(a, b);
        assert_eq!(a.hull()[0], Point::new(0, 0));
        assert!(area2(a.hull()) < 0);
    }

    #[test]
    fn duplicates_are_removed() {
        let p = Polygon::new(vec![
            Point::new(0, 0),
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(0, 10),
            Point::new(0, 0),
        ]);
        assert_eq!(p.hull().len(), 3);
    }

    #[test]
    fn compression_is_optional() {
        let pts = vec![
            Point::new(0, 0),
            Point::new(5, 0),
            Point::new(10, 0),
            Point::new(10, 10),
            Point::new(0, 10),
        ];
        assert_eq!(Polygon::new(pts.clone()).hull().len(), 4);
        assert_eq!(Polygon::with_compression(pts, false).hull().len(), 5);
    }

    #[test]
    fn holes_run_counter_clockwise() {
        let p = Polygon::with_holes(
            Rect::from_sides(0, 0, 10, 10).into(),
            vec![Rect::from_sides(2, 2, 4, 4).into()],
        );
        assert!(area2(&p.holes()[0]) > 0);
        assert_eq!(p.vertices(), 8);
        assert_eq!(p.edges().count(), 8);
    }

    #[test]
    fn mirroring_renormalizes_orientation() {
        let p = Polygon::new(triangle());
        for f in FixpointTrans::all() {
            let t = p.clone().transform(&Trans::new(f, Vector::zero()));
            assert!(area2(t.hull()) < 0, "code {}", f.code());
            assert_eq!(t.area(), p.area());
        }
    }

    #[test]
    fn transform_does_not_compress_by_default() {
        let p = Polygon::with_compression(
            vec![
                Point::new(0, 0),
                Point::new(5, 0),
                Point::new(10, 0),
                Point::new(10, 10),
            ],
            false,
        );
        let t = ICplxTrans::new(2., 0., false, Vector::zero());
        assert_eq!(p.clone().transform(&t).hull().len(), 4);
        assert_eq!(p.transformed_with(&t, true).hull().len(), 3);
    }

    #[test]
    fn rect_polygon_is_box() {
        let p = Polygon::from(Rect::from_sides(0, 0, 20, 10));
        assert!(p.is_box());
        assert_eq!(p.bbox(), Some(Rect::from_sides(0, 0, 20, 10)));
        assert_eq!(SimplePolygon::from_hull(&p), SimplePolygon::from(Rect::from_sides(0, 0, 20, 10)));
    }
}
