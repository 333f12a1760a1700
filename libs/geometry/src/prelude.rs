//! An import prelude that re-exports commonly used items.

pub use crate::bbox::{Bbox, BoundingUnion};
pub use crate::complex::{CplxTrans, DCplxTrans, ICplxTrans, VCplxTrans};
pub use crate::coord::Coord;
pub use crate::edge::{Edge, EdgePair};
pub use crate::orientation::NamedOrientation;
pub use crate::path::Path;
pub use crate::point::{DPoint, DVector, Point, Vector};
pub use crate::polygon::{Polygon, SimplePolygon};
pub use crate::rect::{DRect, Rect, ShortRect};
pub use crate::text::{HAlign, Text, VAlign};
pub use crate::transform::{
    DTrans, FixpointTrans, Trans, Transform, TransformMut, Transformation, Translate, TranslateMut,
};
