//! Paths: a spine of points with a width and end extensions.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::bbox::Bbox;
use crate::coord::Coord;
use crate::point::{DPoint, DVector, Point, Vector};
use crate::polygon::Polygon;
use crate::rect::Rect;
use crate::transform::{TransformMut, Transformation, TranslateMut};

/// The number of segments used to approximate a full circle for round path ends.
pub const CIRCLE_SEGMENTS: usize = 32;

/// A path with a spine, a width and begin and end extensions.
///
/// Round paths have elliptic ends whose half-axes are the extension along
/// the path and half the width across it.
#[derive(Debug, Default, Clone, Hash, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct Path {
    points: Vec<Point>,
    width: i64,
    bgn_ext: i64,
    end_ext: i64,
    round: bool,
}

fn unit(d: DVector) -> DVector {
    let l = d.length();
    if l == 0. {
        DVector::new(1., 0.)
    } else {
        DVector::new(d.x / l, d.y / l)
    }
}

fn left_normal(d: DVector) -> DVector {
    DVector::new(-d.y, d.x)
}

fn round_point(p: DPoint) -> Point {
    Point::new(i64::rounded(p.x), i64::rounded(p.y))
}

impl Path {
    /// Creates a flat-ended path without extensions.
    ///
    /// Consecutive duplicate points are removed.
    pub fn new(points: Vec<Point>, width: i64) -> Self {
        let mut points = points;
        points.dedup();
        Self {
            points,
            width,
            bgn_ext: 0,
            end_ext: 0,
            round: false,
        }
    }

    /// Sets the begin and end extensions.
    pub fn with_extensions(mut self, bgn_ext: i64, end_ext: i64) -> Self {
        self.bgn_ext = bgn_ext;
        self.end_ext = end_ext;
        self
    }

    /// Sets the round-ends flag.
    pub fn with_round_ends(mut self, round: bool) -> Self {
        self.round = round;
        self
    }

    /// The spine points.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The path width.
    pub fn width(&self) -> i64 {
        self.width
    }

    /// The extension beyond the first point.
    pub fn bgn_ext(&self) -> i64 {
        self.bgn_ext
    }

    /// The extension beyond the last point.
    pub fn end_ext(&self) -> i64 {
        self.end_ext
    }

    /// Returns `true` if the path has round ends.
    pub fn round(&self) -> bool {
        self.round
    }

    /// The length of the spine including the extensions.
    pub fn length(&self) -> f64 {
        let spine: f64 = self
            .points
            .windows(2)
            .map(|w| w[0].distance(&w[1]))
            .sum();
        spine + (self.bgn_ext + self.end_ext) as f64
    }

    /// Converts the path into its outline polygon.
    ///
    /// Interior vertices use miter joins. Round ends are approximated with
    /// [`CIRCLE_SEGMENTS`] segments per full circle.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let path = Path::new(vec![Point::new(0, 0), Point::new(100, 0)], 20)
    ///     .with_extensions(5, 10);
    /// assert_eq!(path.polygon(), Polygon::from(Rect::from_sides(-5, -10, 110, 10)));
    /// ```
    pub fn polygon(&self) -> Polygon {
        if self.points.is_empty() {
            return Polygon::default();
        }
        let mut contour = Vec::with_capacity(2 * self.points.len() + CIRCLE_SEGMENTS + 2);
        self.outline(|p| contour.push(round_point(p)));
        Polygon::new(contour)
    }

    fn spine(&self, i: usize) -> DPoint {
        let p = self.points[i];
        DPoint::new(p.x as f64, p.y as f64)
    }

    /// The unit direction of segment `i`.
    fn dir(&self, i: usize) -> DVector {
        if self.points.len() < 2 {
            DVector::new(1., 0.)
        } else {
            unit(self.spine(i + 1) - self.spine(i))
        }
    }

    /// The vector from spine point `i` to its left outline point.
    fn offset(&self, i: usize, hw: f64) -> DVector {
        let n = self.points.len();
        if i == 0 {
            left_normal(self.dir(0)) * hw
        } else if i == n - 1 {
            left_normal(self.dir(n - 2)) * hw
        } else {
            let n1 = left_normal(self.dir(i - 1));
            let n2 = left_normal(self.dir(i));
            let denom = 1. + n1.x * n2.x + n1.y * n2.y;
            if denom.abs() < 1e-10 {
                n2 * hw
            } else {
                (n1 + n2) * (hw / denom)
            }
        }
    }

    /// Emits the outline points in contour order: the left side from the
    /// first to the last spine point, then the right side back.
    ///
    /// The path must not be empty.
    fn outline(&self, mut emit: impl FnMut(DPoint)) {
        let n = self.points.len();
        let hw = self.width as f64 / 2.;
        let d_first = self.dir(0);
        let d_last = self.dir(n.saturating_sub(2));
        let start = self.spine(0);
        let end = self.spine(n - 1);

        if self.round {
            self.cap(start, -d_first, self.bgn_ext as f64, hw, &mut emit);
            for i in 0..n {
                emit(self.spine(i) + self.offset(i, hw));
            }
            self.cap(end, d_last, self.end_ext as f64, hw, &mut emit);
            for i in (0..n).rev() {
                emit(self.spine(i) - self.offset(i, hw));
            }
            return;
        }

        let b = d_first * (self.bgn_ext as f64);
        let e = d_last * (self.end_ext as f64);
        let first = self.offset(0, hw);
        let last = self.offset(n - 1, hw);
        emit(start + first - b);
        for i in 1..n.saturating_sub(1) {
            emit(self.spine(i) + self.offset(i, hw));
        }
        emit(end + last + e);
        emit(end - last + e);
        for i in (1..n.saturating_sub(1)).rev() {
            emit(self.spine(i) - self.offset(i, hw));
        }
        emit(start - first - b);
    }

    /// Half an ellipse around `center`, pointing into direction `d`, from
    /// the left side to the right side when looking along `d`.
    fn cap(
        &self,
        center: DPoint,
        d: DVector,
        ext: f64,
        hw: f64,
        emit: &mut impl FnMut(DPoint),
    ) {
        let nrm = left_normal(d);
        let steps = CIRCLE_SEGMENTS / 2;
        for k in 0..=steps {
            let a = PI / 2. - PI * k as f64 / steps as f64;
            emit(center + d * (ext * a.cos()) + nrm * (hw * a.sin()));
        }
    }

    /// Returns the path shifted by `v`.
    pub fn moved(&self, v: Vector) -> Self {
        Self {
            points: self.points.iter().map(|p| *p + v).collect(),
            ..self.clone()
        }
    }
}

impl Bbox for Path {
    /// The bounding box of the outline, without building the polygon.
    fn bbox(&self) -> Option<Rect> {
        if self.points.is_empty() {
            return None;
        }
        let mut bbox: Option<Rect> = None;
        self.outline(|p| {
            let p = Rect::from_point(round_point(p));
            bbox = Some(bbox.map_or(p, |b| b.union(p)));
        });
        bbox
    }
}

impl TranslateMut for Path {
    fn translate_mut(&mut self, v: Vector) {
        for p in &mut self.points {
            *p += v;
        }
    }
}

impl TransformMut for Path {
    fn transform_mut<T: Transformation>(&mut self, trans: &T) {
        for p in &mut self.points {
            *p = trans.trans_point(*p);
        }
        self.points.dedup();
        self.width = trans.ctrans(self.width);
        self.bgn_ext = trans.ctrans(self.bgn_ext);
        self.end_ext = trans.ctrans(self.end_ext);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complex::ICplxTrans;
    use crate::transform::{FixpointTrans, Trans, Transform};

    #[test]
    fn straight_path_is_a_box() {
        let p = Path::new(vec![Point::new(0, 0), Point::new(0, 50)], 10);
        assert!(p.polygon().is_box());
        assert_eq!(p.bbox(), Some(Rect::from_sides(-5, 0, 5, 50)));
    }

    #[test]
    fn bent_path_uses_miter_joins() {
        let p = Path::new(
            vec![Point::new(0, 0), Point::new(100, 0), Point::new(100, 100)],
            20,
        );
        let poly = p.polygon();
        assert_eq!(poly.hull().len(), 6);
        assert_eq!(poly.bbox(), Some(Rect::from_sides(0, -10, 110, 100)));
    }

    #[test]
    fn round_path_has_elliptic_ends() {
        let p = Path::new(vec![Point::new(0, 0), Point::new(100, 0)], 20)
            .with_extensions(10, 10)
            .with_round_ends(true);
        let poly = p.polygon();
        assert!(poly.hull().len() > 4);
        assert_eq!(poly.bbox(), Some(Rect::from_sides(-10, -10, 110, 10)));
    }

    #[test]
    fn bbox_matches_outline_polygon() {
        let paths = [
            Path::new(vec![Point::new(0, 0), Point::new(100, 0), Point::new(130, 70)], 20)
                .with_extensions(7, 3),
            Path::new(vec![Point::new(0, 0), Point::new(40, 40), Point::new(80, 0)], 15)
                .with_extensions(10, 20)
                .with_round_ends(true),
            Path::new(vec![Point::new(5, 5)], 10)
                .with_extensions(5, 5)
                .with_round_ends(true),
        ];
        for p in paths {
            assert_eq!(p.bbox(), p.polygon().bbox());
        }
        assert_eq!(Path::new(Vec::new(), 10).bbox(), None);
    }

    #[test]
    fn transform_scales_width_and_extensions() {
        let p = Path::new(vec![Point::new(0, 0), Point::new(10, 0)], 4).with_extensions(1, 2);
        let t = ICplxTrans::new(3., 90., false, Vector::zero());
        let pt = p.transform(&t);
        assert_eq!(pt.points(), &[Point::new(0, 0), Point::new(0, 30)]);
        assert_eq!(pt.width(), 12);
        assert_eq!((pt.bgn_ext(), pt.end_ext()), (3, 6));
    }

    #[test]
    fn single_point_path() {
        let p = Path::new(vec![Point::new(5, 5)], 10).with_extensions(5, 5);
        assert_eq!(p.polygon(), Polygon::from(Rect::from_sides(0, 0, 10, 10)));
        let moved = p.transform(&Trans::new(FixpointTrans::R0, Vector::new(1, 0)));
        assert_eq!(moved.points(), &[Point::new(6, 5)]);
    }
}
