//! 2-D integer geometry and the transformation algebra used by the layout database.
//!
//! # Examples
//!
//! Rotate a [rectangle](crate::rect::Rect) by 90 degrees and shift it:
//!
//! ```
//! # use geometry::prelude::*;
//! let rect = Rect::from_sides(0, 0, 10, 20);
//! let t = Trans::new(FixpointTrans::R90, Vector::new(100, 0));
//! assert_eq!(rect.transformed(&t), Rect::from_sides(80, 0, 100, 10));
//! ```
#![warn(missing_docs)]

extern crate self as geometry;

pub mod bbox;
pub mod complex;
pub mod coord;
pub mod edge;
pub mod matrix;
pub mod orientation;
pub mod path;
pub mod point;
pub mod polygon;
pub mod prelude;
pub mod rect;
pub mod text;
pub mod transform;

/// Wraps the given angle to the interval `[0, 360)` degrees.
///
/// # Examples
///
/// ```
/// use geometry::wrap_angle;
///
/// assert_eq!(wrap_angle(10.), 10.);
/// assert_eq!(wrap_angle(-10.), 350.);
/// assert_eq!(wrap_angle(-740.), 340.);
/// assert_eq!(wrap_angle(725.), 5.);
/// assert_eq!(wrap_angle(360.), 0.);
/// ```
pub fn wrap_angle(angle: f64) -> f64 {
    ((angle % 360.) + 360.) % 360.
}
