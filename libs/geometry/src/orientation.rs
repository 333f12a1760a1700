//! Named Manhattan orientations.

use serde::{Deserialize, Serialize};

use crate::transform::FixpointTrans;

/// A named orientation, one for each [`FixpointTrans`] code.
#[derive(
    Debug, Default, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
pub enum NamedOrientation {
    /// No rotations or reflections.
    #[default]
    R0,
    /// Rotate 90 degrees counter-clockwise.
    R90,
    /// Rotate 180 degrees counter-clockwise.
    R180,
    /// Rotate 270 degrees counter-clockwise.
    R270,
    /// Reflect vertically (ie. about the x-axis).
    ReflectVert,
    /// Flip across the line y = x.
    FlipYx,
    /// Reflect horizontally (ie. about the y-axis).
    ReflectHoriz,
    /// Flip across the line y = -x.
    FlipMinusYx,
}

impl NamedOrientation {
    /// Returns all named orientations, ordered by fixpoint code.
    pub fn all() -> [Self; 8] {
        [
            Self::R0,
            Self::R90,
            Self::R180,
            Self::R270,
            Self::ReflectVert,
            Self::FlipYx,
            Self::ReflectHoriz,
            Self::FlipMinusYx,
        ]
    }

    /// The corresponding fixpoint transformation.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// assert_eq!(NamedOrientation::FlipYx.fp_trans(), FixpointTrans::M45);
    /// ```
    pub fn fp_trans(self) -> FixpointTrans {
        FixpointTrans::from_code(self as u8)
    }

    /// The short name used in layout files (`r0` ... `m135`).
    pub fn short_name(self) -> &'static str {
        match self {
            Self::R0 => "r0",
            Self::R90 => "r90",
            Self::R180 => "r180",
            Self::R270 => "r270",
            Self::ReflectVert => "m0",
            Self::FlipYx => "m45",
            Self::ReflectHoriz => "m90",
            Self::FlipMinusYx => "m135",
        }
    }
}

impl From<FixpointTrans> for NamedOrientation {
    fn from(value: FixpointTrans) -> Self {
        Self::all()[usize::from(value.code())]
    }
}

impl From<NamedOrientation> for FixpointTrans {
    fn from(value: NamedOrientation) -> Self {
        value.fp_trans()
    }
}
