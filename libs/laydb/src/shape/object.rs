use std::fmt::Debug;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use downcast_rs::{impl_downcast, DowncastSync};
use geometry::prelude::*;

use crate::error::{LayoutError, LayoutResult};
use crate::properties::PropertiesId;
use crate::repository::{Interned, RegularArray, RepositorySpace};

use super::ShapeKind;

/// A shape stored as an interned object plus a displacement.
#[derive(Debug, Clone)]
pub struct ShapeRef<T> {
    obj: Arc<T>,
    disp: Vector,
}

impl<T: PartialEq> PartialEq for ShapeRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.disp == other.disp && (Arc::ptr_eq(&self.obj, &other.obj) || *self.obj == *other.obj)
    }
}

impl<T: Eq> Eq for ShapeRef<T> {}

impl<T: Hash> Hash for ShapeRef<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.obj.hash(state);
        self.disp.hash(state);
    }
}

impl<T: Interned> ShapeRef<T> {
    /// Interns `obj` in `space`.
    ///
    /// The object is stored relative to its anchor, so equal objects at
    /// different positions share storage.
    pub fn new(obj: T, space: &RepositorySpace) -> Self {
        let anchor = obj.anchor();
        let obj = space.intern(obj.translate(-anchor));
        Self { obj, disp: anchor }
    }

    /// The interned object, relative to the displacement.
    pub fn obj(&self) -> &T {
        &self.obj
    }

    /// The shared pointer to the interned object.
    pub fn shared(&self) -> &Arc<T> {
        &self.obj
    }

    /// The displacement.
    pub fn disp(&self) -> Vector {
        self.disp
    }

    /// Returns the referenced object at its actual position.
    pub fn instantiate(&self) -> T {
        (*self.obj).clone().translate(self.disp)
    }

    /// Re-interns the object in another space.
    pub fn translated(&self, space: &RepositorySpace) -> Self {
        Self {
            obj: space.intern((*self.obj).clone()),
            disp: self.disp,
        }
    }
}

impl<T: Interned> Bbox for ShapeRef<T> {
    fn bbox(&self) -> Option<Rect> {
        self.obj.bbox().map(|b| b.moved(self.disp))
    }
}

impl<T> TranslateMut for ShapeRef<T> {
    fn translate_mut(&mut self, v: Vector) {
        self.disp += v;
    }
}

/// A regular array of one object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShapeArray<T> {
    obj: T,
    array: Arc<RegularArray>,
}

impl<T: Clone + Bbox + Translate> ShapeArray<T> {
    /// Creates an array of `obj` with the descriptor interned in `space`.
    pub fn new(obj: T, array: RegularArray, space: &RepositorySpace) -> Self {
        Self {
            obj,
            array: space.arrays().intern(array),
        }
    }

    /// Creates an array from an already shared descriptor.
    pub fn from_shared(obj: T, array: Arc<RegularArray>) -> Self {
        Self { obj, array }
    }

    /// The object at member `(0, 0)`.
    pub fn obj(&self) -> &T {
        &self.obj
    }

    /// The array descriptor.
    pub fn array(&self) -> &Arc<RegularArray> {
        &self.array
    }

    /// The number of members.
    pub fn len(&self) -> usize {
        self.array.len()
    }

    /// Always `false`; arrays have at least one member.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The object at member `(ia, ib)`.
    pub fn member(&self, ia: u32, ib: u32) -> T {
        self.obj.clone().translate(self.array.displacement(ia, ib))
    }

    /// All members with their indices.
    pub fn members(&self) -> impl Iterator<Item = ((u32, u32), T)> + '_ {
        self.array
            .members()
            .map(|(idx, d)| (idx, self.obj.clone().translate(d)))
    }
}

impl<T: Bbox> Bbox for ShapeArray<T> {
    fn bbox(&self) -> Option<Rect> {
        self.obj.bbox().map(|b| self.array.bbox_of(b))
    }
}

/// A stored shape annotated with a properties id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectWithProperties<T> {
    obj: T,
    prop_id: PropertiesId,
}

impl<T> ObjectWithProperties<T> {
    /// Attaches `prop_id` to `obj`.
    pub fn new(obj: T, prop_id: PropertiesId) -> Self {
        Self { obj, prop_id }
    }

    /// The annotated object.
    pub fn obj(&self) -> &T {
        &self.obj
    }

    /// The properties id.
    pub fn prop_id(&self) -> PropertiesId {
        self.prop_id
    }

    /// Splits off the properties id.
    pub fn into_inner(self) -> (T, PropertiesId) {
        (self.obj, self.prop_id)
    }
}

impl<T: Bbox> Bbox for ObjectWithProperties<T> {
    fn bbox(&self) -> Option<Rect> {
        self.obj.bbox()
    }
}

/// An application-defined shape.
pub trait UserObjectBase: DowncastSync + Debug {
    /// A name identifying the object class.
    fn class_name(&self) -> &str;

    /// The bounding box of the object.
    fn bbox(&self) -> Option<Rect>;

    /// Returns `true` if `other` is equal to `self`.
    fn equals(&self, other: &dyn UserObjectBase) -> bool;

    /// Returns a transformed copy of the object.
    fn transformed(&self, trans: &ICplxTrans) -> Arc<dyn UserObjectBase>;
}
impl_downcast!(sync UserObjectBase);

/// A shared handle to a [`UserObjectBase`].
#[derive(Debug, Clone)]
pub struct UserObject(Arc<dyn UserObjectBase>);

impl UserObject {
    /// Wraps `obj`.
    pub fn new(obj: impl UserObjectBase) -> Self {
        Self(Arc::new(obj))
    }

    /// The wrapped object.
    pub fn get(&self) -> &dyn UserObjectBase {
        self.0.as_ref()
    }

    /// The wrapped object as a concrete type, if it is one.
    pub fn downcast_ref<T: UserObjectBase>(&self) -> Option<&T> {
        self.0.as_ref().downcast_ref::<T>()
    }

    /// Returns a transformed copy.
    pub fn transformed(&self, trans: &ICplxTrans) -> Self {
        Self(self.0.transformed(trans))
    }
}

impl PartialEq for UserObject {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.equals(other.0.as_ref())
    }
}

impl Bbox for UserObject {
    fn bbox(&self) -> Option<Rect> {
        self.0.bbox()
    }
}

impl TranslateMut for UserObject {
    fn translate_mut(&mut self, v: Vector) {
        *self = self.transformed(&ICplxTrans::from_disp(v));
    }
}

/// A reference to an interned polygon.
pub type PolygonRef = ShapeRef<Polygon>;
/// An array of polygon references.
pub type PolygonPtrArray = ShapeArray<PolygonRef>;
/// A reference to an interned simple polygon.
pub type SimplePolygonRef = ShapeRef<SimplePolygon>;
/// An array of simple polygon references.
pub type SimplePolygonPtrArray = ShapeArray<SimplePolygonRef>;
/// A reference to an interned path.
pub type PathRef = ShapeRef<Path>;
/// An array of path references.
pub type PathPtrArray = ShapeArray<PathRef>;
/// An array of boxes.
pub type BoxArray = ShapeArray<Rect>;
/// An array of short boxes.
pub type ShortBoxArray = ShapeArray<ShortRect>;
/// A reference to an interned text.
pub type TextRef = ShapeRef<Text>;
/// An array of text references.
pub type TextPtrArray = ShapeArray<TextRef>;

/// An owned shape of any kind.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum ShapeObject {
    Polygon(Polygon),
    PolygonRef(PolygonRef),
    PolygonPtrArray(PolygonPtrArray),
    SimplePolygon(SimplePolygon),
    SimplePolygonRef(SimplePolygonRef),
    SimplePolygonPtrArray(SimplePolygonPtrArray),
    Path(Path),
    PathRef(PathRef),
    PathPtrArray(PathPtrArray),
    Box(Rect),
    BoxArray(BoxArray),
    ShortBox(ShortRect),
    ShortBoxArray(ShortBoxArray),
    Edge(Edge),
    EdgePair(EdgePair),
    Point(Point),
    Text(Text),
    TextRef(TextRef),
    TextPtrArray(TextPtrArray),
    UserObject(UserObject),
}

macro_rules! shape_object_from {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl From<$ty> for ShapeObject {
                fn from(value: $ty) -> Self {
                    ShapeObject::$kind(value)
                }
            }
        )*
    };
}

shape_object_from! {
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

fn transform_box(b: Rect, trans: &ICplxTrans) -> ShapeObject {
    if trans.is_ortho() {
        ShapeObject::Box(b.transformed(trans))
    } else {
        ShapeObject::Polygon(Polygon::from(b).transform(trans))
    }
}

fn transform_ref<T>(obj: T, trans: &ICplxTrans, space: Option<&RepositorySpace>) -> ShapeObject
where
    T: Interned,
    ShapeObject: From<T> + From<ShapeRef<T>>,
{
    let obj = obj.transform(trans);
    match space {
        Some(space) => ShapeRef::new(obj, space).into(),
        None => obj.into(),
    }
}

impl ShapeObject {
    /// The kind of the shape.
    pub fn kind(&self) -> ShapeKind {
        match self {
            ShapeObject::Polygon(_) => ShapeKind::Polygon,
            ShapeObject::PolygonRef(_) => ShapeKind::PolygonRef,
            ShapeObject::PolygonPtrArray(_) => ShapeKind::PolygonPtrArray,
            ShapeObject::SimplePolygon(_) => ShapeKind::SimplePolygon,
            ShapeObject::SimplePolygonRef(_) => ShapeKind::SimplePolygonRef,
            ShapeObject::SimplePolygonPtrArray(_) => ShapeKind::SimplePolygonPtrArray,
            ShapeObject::Path(_) => ShapeKind::Path,
            ShapeObject::PathRef(_) => ShapeKind::PathRef,
            ShapeObject::PathPtrArray(_) => ShapeKind::PathPtrArray,
            ShapeObject::Box(_) => ShapeKind::Box,
            ShapeObject::BoxArray(_) => ShapeKind::BoxArray,
            ShapeObject::ShortBox(_) => ShapeKind::ShortBox,
            ShapeObject::ShortBoxArray(_) => ShapeKind::ShortBoxArray,
            ShapeObject::Edge(_) => ShapeKind::Edge,
            ShapeObject::EdgePair(_) => ShapeKind::EdgePair,
            ShapeObject::Point(_) => ShapeKind::Point,
            ShapeObject::Text(_) => ShapeKind::Text,
            ShapeObject::TextRef(_) => ShapeKind::TextRef,
            ShapeObject::TextPtrArray(_) => ShapeKind::TextPtrArray,
            ShapeObject::UserObject(_) => ShapeKind::UserObject,
        }
    }

    /// Replaces repository references by values.
    ///
    /// Reference arrays are expanded into their members. Box arrays do not
    /// refer to shape storage and are kept.
    pub fn dereferenced(&self) -> Vec<ShapeObject> {
        match self {
            ShapeObject::PolygonRef(r) => vec![r.instantiate().into()],
            ShapeObject::SimplePolygonRef(r) => vec![r.instantiate().into()],
            ShapeObject::PathRef(r) => vec![r.instantiate().into()],
            ShapeObject::TextRef(r) => vec![r.instantiate().into()],
            ShapeObject::PolygonPtrArray(a) => {
                a.members().map(|(_, r)| r.instantiate().into()).collect()
            }
            ShapeObject::SimplePolygonPtrArray(a) => {
                a.members().map(|(_, r)| r.instantiate().into()).collect()
            }
            ShapeObject::PathPtrArray(a) => {
                a.members().map(|(_, r)| r.instantiate().into()).collect()
            }
            ShapeObject::TextPtrArray(a) => {
                a.members().map(|(_, r)| r.instantiate().into()).collect()
            }
            other => vec![other.clone()],
        }
    }

    /// Splits arrays into their members. Other shapes are returned as is.
    pub fn expanded(&self) -> Vec<ShapeObject> {
        match self {
            ShapeObject::PolygonPtrArray(a) => a.members().map(|(_, m)| m.into()).collect(),
            ShapeObject::SimplePolygonPtrArray(a) => a.members().map(|(_, m)| m.into()).collect(),
            ShapeObject::PathPtrArray(a) => a.members().map(|(_, m)| m.into()).collect(),
            ShapeObject::BoxArray(a) => a.members().map(|(_, m)| m.into()).collect(),
            ShapeObject::ShortBoxArray(a) => a.members().map(|(_, m)| m.into()).collect(),
            ShapeObject::TextPtrArray(a) => a.members().map(|(_, m)| m.into()).collect(),
            other => vec![other.clone()],
        }
    }

    /// The member `(ia, ib)` of an array shape, or `None` for other kinds.
    pub fn member(&self, ia: u32, ib: u32) -> Option<ShapeObject> {
        match self {
            ShapeObject::PolygonPtrArray(a) => Some(a.member(ia, ib).into()),
            ShapeObject::SimplePolygonPtrArray(a) => Some(a.member(ia, ib).into()),
            ShapeObject::PathPtrArray(a) => Some(a.member(ia, ib).into()),
            ShapeObject::BoxArray(a) => Some(a.member(ia, ib).into()),
            ShapeObject::ShortBoxArray(a) => Some(a.member(ia, ib).into()),
            ShapeObject::TextPtrArray(a) => Some(a.member(ia, ib).into()),
            _ => None,
        }
    }

    /// The array member indices of an array shape.
    pub fn member_indices(&self) -> Vec<(u32, u32)> {
        let array = match self {
            ShapeObject::PolygonPtrArray(a) => a.array(),
            ShapeObject::SimplePolygonPtrArray(a) => a.array(),
            ShapeObject::PathPtrArray(a) => a.array(),
            ShapeObject::BoxArray(a) => a.array(),
            ShapeObject::ShortBoxArray(a) => a.array(),
            ShapeObject::TextPtrArray(a) => a.array(),
            _ => return Vec::new(),
        };
        array.members().map(|(idx, _)| idx).collect()
    }

    /// Re-interns all shared data of the shape in `space`.
    pub fn translated(&self, space: &RepositorySpace) -> ShapeObject {
        let arrays = space.arrays();
        match self {
            ShapeObject::PolygonRef(r) => r.translated(space).into(),
            ShapeObject::SimplePolygonRef(r) => r.translated(space).into(),
            ShapeObject::PathRef(r) => r.translated(space).into(),
            ShapeObject::TextRef(r) => r.translated(space).into(),
            ShapeObject::PolygonPtrArray(a) => {
                ShapeArray::from_shared(a.obj().translated(space), arrays.intern(**a.array()))
                    .into()
            }
            ShapeObject::SimplePolygonPtrArray(a) => {
                ShapeArray::from_shared(a.obj().translated(space), arrays.intern(**a.array()))
                    .into()
            }
            ShapeObject::PathPtrArray(a) => {
                ShapeArray::from_shared(a.obj().translated(space), arrays.intern(**a.array()))
                    .into()
            }
            ShapeObject::TextPtrArray(a) => {
                ShapeArray::from_shared(a.obj().translated(space), arrays.intern(**a.array()))
                    .into()
            }
            ShapeObject::BoxArray(a) => {
                ShapeArray::from_shared(*a.obj(), arrays.intern(**a.array())).into()
            }
            ShapeObject::ShortBoxArray(a) => {
                ShapeArray::from_shared(*a.obj(), arrays.intern(**a.array())).into()
            }
            other => other.clone(),
        }
    }

    /// Transforms the shape.
    ///
    /// References are re-interned in `space`, or dereferenced if there is
    /// none. Boxes under non-orthogonal transformations become polygons.
    /// Polygons are not compressed.
    ///
    /// # Errors
    ///
    /// Array shapes cannot be transformed and return
    /// [`LayoutError::ArrayTransform`].
    pub fn transformed(
        &self,
        trans: &ICplxTrans,
        space: Option<&RepositorySpace>,
    ) -> LayoutResult<ShapeObject> {
        Ok(match self {
            ShapeObject::Polygon(p) => p.clone().transform(trans).into(),
            ShapeObject::PolygonRef(r) => transform_ref(r.instantiate(), trans, space),
            ShapeObject::SimplePolygon(p) => p.clone().transform(trans).into(),
            ShapeObject::SimplePolygonRef(r) => transform_ref(r.instantiate(), trans, space),
            ShapeObject::Path(p) => p.clone().transform(trans).into(),
            ShapeObject::PathRef(r) => transform_ref(r.instantiate(), trans, space),
            ShapeObject::Box(b) => transform_box(*b, trans),
            ShapeObject::ShortBox(b) => match transform_box(b.convert(), trans) {
                ShapeObject::Box(b) => ShapeObject::ShortBox(b.convert()),
                other => other,
            },
            ShapeObject::Edge(e) => e.transform(trans).into(),
            ShapeObject::EdgePair(e) => e.transform(trans).into(),
            ShapeObject::Point(p) => p.transform(trans).into(),
            ShapeObject::Text(t) => t.clone().transform(trans).into(),
            ShapeObject::TextRef(r) => transform_ref(r.instantiate(), trans, space),
            ShapeObject::UserObject(u) => u.transformed(trans).into(),
            ShapeObject::PolygonPtrArray(_)
            | ShapeObject::SimplePolygonPtrArray(_)
            | ShapeObject::PathPtrArray(_)
            | ShapeObject::BoxArray(_)
            | ShapeObject::ShortBoxArray(_)
            | ShapeObject::TextPtrArray(_) => return Err(LayoutError::ArrayTransform),
        })
    }

    /// The outline of polygonal shapes (polygons, paths and boxes).
    pub fn polygon(&self) -> Option<Polygon> {
        match self {
            ShapeObject::Polygon(p) => Some(p.clone()),
            ShapeObject::PolygonRef(r) => Some(r.instantiate()),
            ShapeObject::SimplePolygon(p) => Some(p.clone().into()),
            ShapeObject::SimplePolygonRef(r) => Some(r.instantiate().into()),
            ShapeObject::Path(p) => Some(p.polygon()),
            ShapeObject::PathRef(r) => Some(r.instantiate().polygon()),
            ShapeObject::Box(b) => Some((*b).into()),
            ShapeObject::ShortBox(b) => Some(b.convert::<i64>().into()),
            _ => None,
        }
    }
}

impl Bbox for ShapeObject {
    fn bbox(&self) -> Option<Rect> {
        match self {
            ShapeObject::Polygon(x) => x.bbox(),
            ShapeObject::PolygonRef(x) => x.bbox(),
            ShapeObject::PolygonPtrArray(x) => x.bbox(),
            ShapeObject::SimplePolygon(x) => x.bbox(),
            ShapeObject::SimplePolygonRef(x) => x.bbox(),
            ShapeObject::SimplePolygonPtrArray(x) => x.bbox(),
            ShapeObject::Path(x) => x.bbox(),
            ShapeObject::PathRef(x) => x.bbox(),
            ShapeObject::PathPtrArray(x) => x.bbox(),
            ShapeObject::Box(x) => x.bbox(),
            ShapeObject::BoxArray(x) => x.bbox(),
            ShapeObject::ShortBox(x) => x.bbox(),
            ShapeObject::ShortBoxArray(x) => x.bbox(),
            ShapeObject::Edge(x) => x.bbox(),
            ShapeObject::EdgePair(x) => x.bbox(),
            ShapeObject::Point(x) => x.bbox(),
            ShapeObject::Text(x) => x.bbox(),
            ShapeObject::TextRef(x) => x.bbox(),
            ShapeObject::TextPtrArray(x) => x.bbox(),
            ShapeObject::UserObject(x) => x.bbox(),
        }
    }
}
