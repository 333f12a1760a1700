use std::fmt::Debug;

use geometry::prelude::*;

use crate::properties::PropertiesId;

use super::object::*;
use super::{LayerKey, ShapeKind};

/// A concrete type that can be stored in a shape layer.
///
/// Every stored type belongs to exactly one [`LayerKey`].
pub trait StoredShape: Clone + PartialEq + Debug + Bbox + Send + Sync + 'static {
    /// The kind of the stored shape.
    const KIND: ShapeKind;
    /// Whether the stored shape carries a properties id.
    const WITH_PROPS: bool = false;

    /// The layer key of this type.
    fn key() -> LayerKey {
        LayerKey::new(Self::KIND, Self::WITH_PROPS)
    }

    /// The properties id, if any.
    fn prop_id(&self) -> Option<PropertiesId> {
        None
    }

    /// Converts the shape into an owned object without properties.
    fn to_object(&self) -> ShapeObject;

    /// Recovers the stored type from an object and properties id.
    ///
    /// Returns `None` if they do not describe this type.
    fn from_object(obj: ShapeObject, prop_id: Option<PropertiesId>) -> Option<Self>;
}

macro_rules! stored_shape {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl StoredShape for $ty {
                const KIND: ShapeKind = ShapeKind::$kind;

                fn to_object(&self) -> ShapeObject {
                    ShapeObject::$kind(self.clone())
                }

                fn from_object(obj: ShapeObject, prop_id: Option<PropertiesId>) -> Option<Self> {
                    match (obj, prop_id) {
                        (ShapeObject::$kind(x), None) => Some(x),
                        _ => None,
                    }
                }
            }
        )*
    };
}

stored_shape! {
    Polygon => Polygon,
    PolygonRef => PolygonRef,
    PolygonPtrArray => PolygonPtrArray,
    SimplePolygon => SimplePolygon,
    SimplePolygonRef => SimplePolygonRef,
    SimplePolygonPtrArray => SimplePolygonPtrArray,
    Path => Path,
    PathRef => PathRef,
    PathPtrArray => PathPtrArray,
    Rect => Box,
    BoxArray => BoxArray,
    ShortRect => ShortBox,
    ShortBoxArray => ShortBoxArray,
    Edge => Edge,
    EdgePair => EdgePair,
    Point => Point,
    Text => Text,
    TextRef => TextRef,
    TextPtrArray => TextPtrArray,
    UserObject => UserObject,
}

impl<T: StoredShape> StoredShape for ObjectWithProperties<T> {
    const KIND: ShapeKind = T::KIND;
    const WITH_PROPS: bool = true;

    fn prop_id(&self) -> Option<PropertiesId> {
        Some(ObjectWithProperties::prop_id(self))
    }

    fn to_object(&self) -> ShapeObject {
        self.obj().to_object()
    }

    fn from_object(obj: ShapeObject, prop_id: Option<PropertiesId>) -> Option<Self> {
        let prop_id = prop_id?;
        T::from_object(obj, None).map(|obj| ObjectWithProperties::new(obj, prop_id))
    }
}

/// An operation generic over the concrete stored type of a shape.
pub(crate) trait ShapeVisitor {
    type Output;

    fn visit<S: StoredShape>(&mut self, s: S) -> Self::Output;
}

impl ShapeObject {
    /// Calls `visitor` with the stored type selected by the kind of the
    /// object and the presence of `prop_id`.
    pub(crate) fn visit<V: ShapeVisitor>(
        self,
        prop_id: Option<PropertiesId>,
        visitor: &mut V,
    ) -> V::Output {
        macro_rules! dispatch {
            ($x:expr) => {
                match prop_id {
                    Some(pid) => visitor.visit(ObjectWithProperties::new($x, pid)),
                    None => visitor.visit($x),
                }
            };
        }

        match self {
            ShapeObject::Polygon(x) => dispatch!(x),
            ShapeObject::PolygonRef(x) => dispatch!(x),
            ShapeObject::PolygonPtrArray(x) => dispatch!(x),
            ShapeObject::SimplePolygon(x) => dispatch!(x),
            ShapeObject::SimplePolygonRef(x) => dispatch!(x),
            ShapeObject::SimplePolygonPtrArray(x) => dispatch!(x),
            ShapeObject::Path(x) => dispatch!(x),
            ShapeObject::PathRef(x) => dispatch!(x),
            ShapeObject::PathPtrArray(x) => dispatch!(x),
            ShapeObject::Box(x) => dispatch!(x),
            ShapeObject::BoxArray(x) => dispatch!(x),
            ShapeObject::ShortBox(x) => dispatch!(x),
            ShapeObject::ShortBoxArray(x) => dispatch!(x),
            ShapeObject::Edge(x) => dispatch!(x),
            ShapeObject::EdgePair(x) => dispatch!(x),
            ShapeObject::Point(x) => dispatch!(x),
            ShapeObject::Text(x) => dispatch!(x),
            ShapeObject::TextRef(x) => dispatch!(x),
            ShapeObject::TextPtrArray(x) => dispatch!(x),
            ShapeObject::UserObject(x) => dispatch!(x),
        }
    }
}
