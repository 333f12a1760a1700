//! Coordinate types.

use std::fmt::Debug;
use std::ops::{Add, Mul, Neg, Sub};

/// The tolerance used when comparing floating-point coordinates.
pub const COORD_EPSILON: f64 = 1e-5;

/// The tolerance used when comparing angles, sines/cosines and magnifications.
pub const EPSILON: f64 = 1e-10;

/// A scalar coordinate type.
///
/// Integer coordinates round half away from zero when produced from
/// floating-point values, so that transformations of integer geometry
/// are symmetric around the origin.
pub trait Coord:
    Copy
    + Debug
    + Default
    + PartialEq
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
    + Send
    + Sync
    + 'static
{
    /// Whether this coordinate type is an integer type.
    const INTEGRAL: bool;

    /// The additive identity.
    fn zero() -> Self;

    /// Converts a floating-point value, rounding if the coordinate is integral.
    fn rounded(v: f64) -> Self;

    /// Converts the coordinate to a floating-point value.
    fn to_f64(self) -> f64;

    /// Compares two coordinates, allowing for rounding errors in floating-point types.
    fn equal(a: Self, b: Self) -> bool;

    /// Strict ordering that treats fuzzy-equal floating-point values as equal.
    fn less(a: Self, b: Self) -> bool;

    /// Returns the smaller of two coordinates.
    #[inline]
    fn min_of(a: Self, b: Self) -> Self {
        if b < a {
            b
        } else {
            a
        }
    }

    /// Returns the larger of two coordinates.
    #[inline]
    fn max_of(a: Self, b: Self) -> Self {
        if b > a {
            b
        } else {
            a
        }
    }
}

macro_rules! impl_integral_coord {
    ($($t:ty),*) => {
        $(
            impl Coord for $t {
                const INTEGRAL: bool = true;

                #[inline]
                fn zero() -> Self {
                    0
                }

                #[inline]
                fn rounded(v: f64) -> Self {
                    v.round() as $t
                }

                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn equal(a: Self, b: Self) -> bool {
                    a == b
                }

                #[inline]
                fn less(a: Self, b: Self) -> bool {
                    a < b
                }
            }
        )*
    };
}

impl_integral_coord!(i32, i64);

impl Coord for f64 {
    const INTEGRAL: bool = false;

    #[inline]
    fn zero() -> Self {
        0.
    }

    #[inline]
    fn rounded(v: f64) -> Self {
        v
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn equal(a: Self, b: Self) -> bool {
        (a - b).abs() < COORD_EPSILON
    }

    #[inline]
    fn less(a: Self, b: Self) -> bool {
        a < b - COORD_EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_rounding_is_symmetric() {
        assert_eq!(<i64 as Coord>::rounded(2.5), 3);
        assert_eq!(<i64 as Coord>::rounded(-2.5), -3);
        assert_eq!(<i32 as Coord>::rounded(-0.4), 0);
    }

    #[test]
    fn float_comparisons_are_fuzzy() {
        assert!(f64::equal(1.0, 1.0 + 1e-7));
        assert!(!f64::less(1.0, 1.0 + 1e-7));
        assert!(f64::less(1.0, 1.1));
    }
}
