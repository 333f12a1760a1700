//! Shape kinds, type masks and shape handles.

use std::ops::{BitAnd, BitOr, BitOrAssign, Not};

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

use crate::id::ObjectId;

mod object;
mod stored;

pub use object::*;
pub use stored::*;

/// The runtime tag of a stored shape.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShapeKind {
    /// A polygon with holes, stored by value.
    Polygon,
    /// A reference to an interned polygon.
    PolygonRef,
    /// A regular array of polygon references.
    PolygonPtrArray,
    /// A polygon without holes, stored by value.
    SimplePolygon,
    /// A reference to an interned simple polygon.
    SimplePolygonRef,
    /// A regular array of simple polygon references.
    SimplePolygonPtrArray,
    /// A path, stored by value.
    Path,
    /// A reference to an interned path.
    PathRef,
    /// A regular array of path references.
    PathPtrArray,
    /// A box.
    Box,
    /// A regular array of boxes.
    BoxArray,
    /// A box with 32-bit coordinates.
    ShortBox,
    /// A regular array of short boxes.
    ShortBoxArray,
    /// An edge.
    Edge,
    /// A pair of edges.
    EdgePair,
    /// A point.
    Point,
    /// A text, stored by value.
    Text,
    /// A reference to an interned text.
    TextRef,
    /// A regular array of text references.
    TextPtrArray,
    /// An application-defined object.
    UserObject,
}

impl ShapeKind {
    /// All shape kinds.
    pub const ALL: [ShapeKind; 20] = [
        ShapeKind::Polygon,
        ShapeKind::PolygonRef,
        ShapeKind::PolygonPtrArray,
        ShapeKind::SimplePolygon,
        ShapeKind::SimplePolygonRef,
        ShapeKind::SimplePolygonPtrArray,
        ShapeKind::Path,
        ShapeKind::PathRef,
        ShapeKind::PathPtrArray,
        ShapeKind::Box,
        ShapeKind::BoxArray,
        ShapeKind::ShortBox,
        ShapeKind::ShortBoxArray,
        ShapeKind::Edge,
        ShapeKind::EdgePair,
        ShapeKind::Point,
        ShapeKind::Text,
        ShapeKind::TextRef,
        ShapeKind::TextPtrArray,
        ShapeKind::UserObject,
    ];

    /// The type mask category this kind belongs to.
    pub fn category(self) -> ShapeFlags {
        use ShapeKind::*;
        match self {
            Polygon | PolygonRef | PolygonPtrArray | SimplePolygon | SimplePolygonRef
            | SimplePolygonPtrArray => ShapeFlags::POLYGONS,
            Path | PathRef | PathPtrArray => ShapeFlags::PATHS,
            Box | BoxArray | ShortBox | ShortBoxArray => ShapeFlags::BOXES,
            Edge => ShapeFlags::EDGES,
            EdgePair => ShapeFlags::EDGE_PAIRS,
            Point => ShapeFlags::POINTS,
            Text | TextRef | TextPtrArray => ShapeFlags::TEXTS,
            UserObject => ShapeFlags::USER_OBJECTS,
        }
    }

    /// Returns `true` for the array kinds.
    pub fn is_array(self) -> bool {
        use ShapeKind::*;
        matches!(
            self,
            PolygonPtrArray
                | SimplePolygonPtrArray
                | PathPtrArray
                | BoxArray
                | ShortBoxArray
                | TextPtrArray
        )
    }

    /// Returns `true` for the kinds referring into a shape repository.
    pub fn is_ref(self) -> bool {
        use ShapeKind::*;
        matches!(self, PolygonRef | SimplePolygonRef | PathRef | TextRef)
    }
}

/// A shape type mask.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeFlags(u32);

impl ShapeFlags {
    /// No shapes.
    pub const NONE: ShapeFlags = ShapeFlags(0);
    /// Polygons and simple polygons in all forms.
    pub const POLYGONS: ShapeFlags = ShapeFlags(1);
    /// Paths in all forms.
    pub const PATHS: ShapeFlags = ShapeFlags(1 << 1);
    /// Boxes and short boxes in all forms.
    pub const BOXES: ShapeFlags = ShapeFlags(1 << 2);
    /// Edges.
    pub const EDGES: ShapeFlags = ShapeFlags(1 << 3);
    /// Edge pairs.
    pub const EDGE_PAIRS: ShapeFlags = ShapeFlags(1 << 4);
    /// Points.
    pub const POINTS: ShapeFlags = ShapeFlags(1 << 5);
    /// Texts in all forms.
    pub const TEXTS: ShapeFlags = ShapeFlags(1 << 6);
    /// User objects.
    pub const USER_OBJECTS: ShapeFlags = ShapeFlags(1 << 7);
    /// Restricts a mask to shapes carrying properties.
    pub const PROPERTIES: ShapeFlags = ShapeFlags(1 << 8);
    /// All shape categories.
    pub const ALL: ShapeFlags = ShapeFlags((1 << 8) - 1);

    /// Returns `true` if all bits of `other` are set in `self`.
    pub fn contains(self, other: ShapeFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if any bit of `other` is set in `self`.
    pub fn intersects(self, other: ShapeFlags) -> bool {
        self.0 & other.0 != 0
    }

    /// Returns `true` if shapes of layer `key` are selected by this mask.
    pub fn applies(self, key: LayerKey) -> bool {
        self.intersects(key.kind.category())
            && (key.with_props || !self.contains(ShapeFlags::PROPERTIES))
    }
}

impl Default for ShapeFlags {
    fn default() -> Self {
        ShapeFlags::ALL
    }
}

impl BitOr for ShapeFlags {
    type Output = ShapeFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        ShapeFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for ShapeFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for ShapeFlags {
    type Output = ShapeFlags;

    fn bitand(self, rhs: Self) -> Self::Output {
        ShapeFlags(self.0 & rhs.0)
    }
}

impl Not for ShapeFlags {
    type Output = ShapeFlags;

    fn not(self) -> Self::Output {
        ShapeFlags(!self.0 & (ShapeFlags::ALL.0 | ShapeFlags::PROPERTIES.0))
    }
}

/// Returns `true` if shapes of layer `key` are selected by `flags`.
pub fn type_mask_applies(key: LayerKey, flags: ShapeFlags) -> bool {
    flags.applies(key)
}

/// Identifies the single layer of a container holding one stored type.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerKey {
    /// The shape kind.
    pub kind: ShapeKind,
    /// Whether the shapes carry a properties id.
    pub with_props: bool,
}

impl LayerKey {
    /// Creates a layer key.
    pub fn new(kind: ShapeKind, with_props: bool) -> Self {
        Self { kind, with_props }
    }
}

new_key_type! {
    /// A key into a stable layer store.
    pub struct ShapeKey;
}

/// The position of a shape within its layer.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub enum Slot {
    /// A key that survives insertion and removal of other shapes.
    Stable(ShapeKey),
    /// A vector index that shifts when earlier shapes are removed.
    Unstable(usize),
}

/// A handle to a shape within a [`Shapes`](crate::Shapes) container.
///
/// Handles compare by value. A handle may address a single member of an
/// array shape; such handles are read-only.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub struct Shape {
    pub(crate) key: LayerKey,
    pub(crate) slot: Slot,
    pub(crate) member: Option<(u32, u32)>,
    pub(crate) container: ObjectId,
}

impl Shape {
    pub(crate) fn new(key: LayerKey, slot: Slot, container: ObjectId) -> Self {
        Self {
            key,
            slot,
            member: None,
            container,
        }
    }

    /// The kind of the stored shape.
    pub fn kind(&self) -> ShapeKind {
        self.key.kind
    }

    /// The layer the shape lives in.
    pub fn layer_key(&self) -> LayerKey {
        self.key
    }

    /// Returns `true` if the shape carries a properties id.
    pub fn has_prop_id(&self) -> bool {
        self.key.with_props
    }

    /// The position of the shape within its layer.
    pub fn slot(&self) -> Slot {
        self.slot
    }

    /// Returns `true` if the handle addresses a single array member.
    pub fn is_array_member(&self) -> bool {
        self.member.is_some()
    }

    /// The array member indices `(ia, ib)`, if any.
    pub fn array_member(&self) -> Option<(u32, u32)> {
        self.member
    }

    /// The identity of the owning container.
    pub fn container(&self) -> ObjectId {
        self.container
    }

    pub(crate) fn with_member(self, ia: u32, ib: u32) -> Self {
        Self {
            member: Some((ia, ib)),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_one_category() {
        for kind in ShapeKind::ALL {
            let c = kind.category();
            assert!(ShapeFlags::ALL.contains(c));
            assert_eq!(c.0.count_ones(), 1);
        }
    }

    #[test]
    fn properties_flag_restricts_to_annotated_layers() {
        let plain = LayerKey::new(ShapeKind::Box, false);
        let props = LayerKey::new(ShapeKind::Box, true);
        assert!(type_mask_applies(plain, ShapeFlags::BOXES));
        assert!(type_mask_applies(props, ShapeFlags::BOXES));
        assert!(!type_mask_applies(plain, ShapeFlags::BOXES | ShapeFlags::PROPERTIES));
        assert!(type_mask_applies(props, ShapeFlags::ALL | ShapeFlags::PROPERTIES));
        assert!(!type_mask_applies(plain, ShapeFlags::POLYGONS));
    }

    #[test]
    fn arrays_and_refs_are_classified() {
        assert!(ShapeKind::BoxArray.is_array());
        assert!(!ShapeKind::PathRef.is_array());
        assert!(ShapeKind::PathRef.is_ref());
        assert_eq!(ShapeKind::ALL.iter().filter(|k| k.is_array()).count(), 6);
    }
}
