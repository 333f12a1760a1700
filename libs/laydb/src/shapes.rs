//! The [`Shapes`] container.

use geometry::prelude::*;
use indexmap::IndexMap;
use tracing::{debug, error};

use crate::error::{LayoutError, LayoutResult};
use crate::id::ObjectId;
use crate::layer::{Layer, ShapeLayer};
use crate::properties::PropertiesId;
use crate::repository::RepositorySpace;
use crate::shape::{
    LayerKey, ObjectWithProperties, Shape, ShapeFlags, ShapeObject, ShapeVisitor, StoredShape,
};
use crate::undo::{lock, Op, ShapesOp, SharedManager};

/// A heterogeneous collection of shapes, organized in one layer per stored
/// type.
///
/// A container bound to a layout shares the layout's [`RepositorySpace`];
/// a container without a space is standalone and stores every shape by
/// value. Editable containers use stable storage and support erasing and
/// replacing shapes. If a transaction manager is attached and recording,
/// every mutation queues the operation that reverts it.
///
/// Clones keep the identity of the original, so undo operations recorded
/// for one apply to the other.
#[derive(Debug, Clone)]
pub struct Shapes {
    id: ObjectId,
    layers: IndexMap<LayerKey, Box<dyn ShapeLayer>>,
    editable: bool,
    space: Option<RepositorySpace>,
    manager: Option<SharedManager>,
    dirty: bool,
}

struct InsertVisitor<'a> {
    shapes: &'a mut Shapes,
    record: bool,
}

impl ShapeVisitor for InsertVisitor<'_> {
    type Output = Shape;

    fn visit<S: StoredShape>(&mut self, s: S) -> Shape {
        if self.record {
            self.shapes.insert(s)
        } else {
            self.shapes.insert_raw(s)
        }
    }
}

struct FindVisitor<'a> {
    shapes: &'a Shapes,
}

impl ShapeVisitor for FindVisitor<'_> {
    type Output = Option<Shape>;

    fn visit<S: StoredShape>(&mut self, s: S) -> Option<Shape> {
        let slot = self.shapes.layer::<S>()?.find(&s)?;
        Some(Shape::new(S::key(), slot, self.shapes.id))
    }
}

impl Shapes {
    /// Creates an empty standalone container.
    pub fn new(editable: bool) -> Self {
        Self {
            id: ObjectId::unique(),
            layers: IndexMap::new(),
            editable,
            space: None,
            manager: None,
            dirty: false,
        }
    }

    /// Creates an empty container storing shared data in `space`.
    pub fn with_space(editable: bool, space: RepositorySpace) -> Self {
        Self {
            space: Some(space),
            ..Self::new(editable)
        }
    }

    /// Attaches a transaction manager.
    pub fn with_manager(mut self, manager: SharedManager) -> Self {
        self.manager = Some(manager);
        self
    }

    pub(crate) fn with_id(mut self, id: ObjectId) -> Self {
        self.id = id;
        self
    }

    pub(crate) fn set_manager(&mut self, manager: Option<SharedManager>) {
        self.manager = manager;
    }

    /// The identity undo operations refer to.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Returns `true` if shapes can be erased and replaced.
    pub fn is_editable(&self) -> bool {
        self.editable
    }

    /// The repository space, or `None` for standalone containers.
    pub fn space(&self) -> Option<&RepositorySpace> {
        self.space.as_ref()
    }

    /// Returns `true` if the container has no repository space.
    pub fn is_standalone(&self) -> bool {
        self.space.is_none()
    }

    /// The attached transaction manager.
    pub fn manager(&self) -> Option<&SharedManager> {
        self.manager.as_ref()
    }

    fn transacting(&self) -> bool {
        self.manager.as_ref().is_some_and(|m| lock(m).transacting())
    }

    fn queue_layer_op(
        &self,
        insert: bool,
        key: LayerKey,
        objects: Vec<(ShapeObject, Option<PropertiesId>)>,
    ) {
        if let Some(manager) = &self.manager {
            let mut manager = lock(manager);
            if manager.transacting() {
                manager.queue_or_append(Op::Shapes(
                    self.id,
                    ShapesOp::Layer {
                        insert,
                        key,
                        objects,
                    },
                ));
            }
        }
    }

    fn queue_full_layer_op(&self, insert: bool, layer: Box<dyn ShapeLayer>) {
        if let Some(manager) = &self.manager {
            lock(manager).queue(Op::Shapes(self.id, ShapesOp::FullLayer { insert, layer }));
        }
    }

    fn check_editable(&self, function: &'static str) -> LayoutResult<()> {
        if self.editable {
            Ok(())
        } else {
            Err(LayoutError::NotEditable { function })
        }
    }

    fn check_handle(&self, shape: &Shape, function: &'static str) -> LayoutResult<()> {
        if shape.is_array_member() {
            error!(function, ?shape, "array member passed to a mutating function");
            panic!("function '{function}' cannot be applied to an array member");
        }
        if shape.container != self.id {
            return Err(LayoutError::InvalidShape);
        }
        Ok(())
    }

    /// The layer of stored type `S`, if present.
    pub fn layer<S: StoredShape>(&self) -> Option<&Layer<S>> {
        let layer = self.layers.get(&S::key())?;
        match (**layer).downcast_ref::<Layer<S>>() {
            Some(layer) => Some(layer),
            None => {
                error!(key = ?S::key(), "layer does not hold its key's type");
                panic!("layer does not hold its key's type");
            }
        }
    }

    fn layer_mut<S: StoredShape>(&mut self) -> &mut Layer<S> {
        let editable = self.editable;
        let layer = self.layers.entry(S::key()).or_insert_with(|| {
            debug!(key = ?S::key(), editable, "creating shape layer");
            Box::new(Layer::<S>::new(editable))
        });
        match (**layer).downcast_mut::<Layer<S>>() {
            Some(layer) => layer,
            None => {
                error!(key = ?S::key(), "layer does not hold its key's type");
                panic!("layer does not hold its key's type");
            }
        }
    }

    fn insert_raw<S: StoredShape>(&mut self, s: S) -> Shape {
        self.dirty = true;
        let slot = self.layer_mut::<S>().insert(s);
        Shape::new(S::key(), slot, self.id)
    }

    /// Inserts a shape of a concrete stored type.
    ///
    /// Equal shapes may be inserted more than once.
    pub fn insert<S: StoredShape>(&mut self, s: S) -> Shape {
        let record = self
            .transacting()
            .then(|| (s.to_object(), s.prop_id()));
        let shape = self.insert_raw(s);
        if let Some(obj) = record {
            self.queue_layer_op(true, S::key(), vec![obj]);
        }
        shape
    }

    /// Inserts a shape with a properties id.
    pub fn insert_with_props<S: StoredShape>(&mut self, s: S, prop_id: PropertiesId) -> Shape {
        self.insert(ObjectWithProperties::new(s, prop_id))
    }

    /// Inserts an owned shape of any kind.
    pub fn insert_object(&mut self, obj: ShapeObject, prop_id: Option<PropertiesId>) -> Shape {
        obj.visit(
            prop_id,
            &mut InsertVisitor {
                shapes: self,
                record: true,
            },
        )
    }

    fn insert_object_raw(&mut self, obj: ShapeObject, prop_id: Option<PropertiesId>) -> Shape {
        obj.visit(
            prop_id,
            &mut InsertVisitor {
                shapes: self,
                record: false,
            },
        )
    }

    /// Inserts the shapes of `other` selected by `flags`.
    ///
    /// If both containers share a repository space, layers missing here
    /// are copied whole and the others are merged shape by shape. A
    /// standalone target receives dereferenced copies. Otherwise, shared
    /// data is re-interned in this container's space.
    ///
    /// Properties ids are kept as they are.
    pub fn insert_shapes(&mut self, other: &Shapes, flags: ShapeFlags) {
        let selected = other
            .layers
            .iter()
            .filter(|(key, layer)| flags.applies(**key) && !layer.is_empty());
        match (self.space.clone(), &other.space) {
            (Some(space), Some(other_space)) if space.same_as(other_space) => {
                for (key, layer) in selected {
                    if !self.layers.contains_key(key) && layer.is_stable() == self.editable {
                        debug!(?key, "copying shape layer");
                        let copy = layer.clone_layer();
                        if self.transacting() {
                            self.queue_full_layer_op(true, copy.clone_layer());
                        }
                        self.layers.insert(*key, copy);
                        self.dirty = true;
                    } else {
                        layer.insert_into(self);
                    }
                }
            }
            (None, _) => {
                for (_, layer) in selected {
                    layer.deref_into(self);
                }
            }
            (Some(space), _) => {
                for (_, layer) in selected {
                    layer.translate_into(self, &space);
                }
            }
        }
    }

    /// Inserts a copy of a single shape of `other`.
    ///
    /// The shape is converted the way [`Shapes::insert_shapes`] converts
    /// it. Dereferencing may expand an array into several shapes, so all
    /// new handles are returned.
    pub fn insert_from(&mut self, other: &Shapes, shape: &Shape) -> LayoutResult<Vec<Shape>> {
        let obj = other.object(shape).ok_or(LayoutError::InvalidShape)?;
        let prop_id = other.prop_id(shape);
        let objects = match (&self.space, &other.space) {
            (Some(space), Some(other_space)) if space.same_as(other_space) => vec![obj],
            (None, _) => obj.dereferenced(),
            (Some(space), _) => vec![obj.translated(space)],
        };
        Ok(objects
            .into_iter()
            .map(|obj| self.insert_object(obj, prop_id))
            .collect())
    }

    /// Inserts `obj` transformed by `trans`, with its properties id mapped
    /// through `pid_map`.
    ///
    /// References are re-interned in this container's space, or stored by
    /// value in standalone containers. Polygons are not compressed.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::ArrayTransform`] for array shapes.
    pub fn do_insert<F>(
        &mut self,
        obj: &ShapeObject,
        prop_id: Option<PropertiesId>,
        trans: &ICplxTrans,
        pid_map: F,
    ) -> LayoutResult<Shape>
    where
        F: FnMut(PropertiesId) -> PropertiesId,
    {
        let obj = obj.transformed(trans, self.space.as_ref())?;
        Ok(self.insert_object(obj, prop_id.map(pid_map)))
    }

    /// Finds a shape equal to `obj` with the same properties id.
    pub fn find(&self, obj: &ShapeObject, prop_id: Option<PropertiesId>) -> Option<Shape> {
        obj.clone().visit(prop_id, &mut FindVisitor { shapes: self })
    }

    fn erase_raw(&mut self, shape: &Shape) -> Option<(ShapeObject, Option<PropertiesId>)> {
        let removed = self.layers.get_mut(&shape.key)?.erase_slot(shape.slot)?;
        self.dirty = true;
        Some(removed)
    }

    /// Erases a shape.
    ///
    /// # Errors
    ///
    /// Fails on non-editable containers and on handles that do not refer
    /// to a shape of this container.
    ///
    /// # Panics
    ///
    /// Panics if `shape` addresses an array member.
    pub fn erase(&mut self, shape: &Shape) -> LayoutResult<()> {
        self.check_editable("erase")?;
        self.check_handle(shape, "erase")?;
        let layer = self.layers.get(&shape.key).ok_or(LayoutError::InvalidShape)?;
        let obj = layer.object_at(shape.slot).ok_or(LayoutError::InvalidShape)?;
        if self.transacting() {
            self.queue_layer_op(false, shape.key, vec![obj]);
        }
        self.erase_raw(shape);
        Ok(())
    }

    /// Erases several shapes.
    ///
    /// All handles are checked before anything is erased, so a failing call
    /// leaves the container unchanged. Repeated handles are erased once.
    pub fn erase_shapes(&mut self, shapes: &[Shape]) -> LayoutResult<()> {
        self.check_editable("erase_shapes")?;
        let mut pending: Vec<Shape> = Vec::with_capacity(shapes.len());
        for shape in shapes {
            self.check_handle(shape, "erase_shapes")?;
            if !self.is_valid(shape) {
                return Err(LayoutError::InvalidShape);
            }
            if !pending.contains(shape) {
                pending.push(*shape);
            }
        }
        for shape in &pending {
            self.erase(shape)?;
        }
        Ok(())
    }

    /// Replaces a shape by `obj` with properties id `prop_id`.
    ///
    /// The shape is replaced in place if the new object is stored in the
    /// same layer. Otherwise it is erased and the new object is inserted,
    /// and the returned handle differs from `shape`.
    pub fn replace(
        &mut self,
        shape: &Shape,
        obj: ShapeObject,
        prop_id: Option<PropertiesId>,
    ) -> LayoutResult<Shape> {
        self.check_editable("replace")?;
        self.check_handle(shape, "replace")?;
        let key = LayerKey::new(obj.kind(), prop_id.is_some());
        if key != shape.key {
            self.erase(shape)?;
            return Ok(self.insert_object(obj, prop_id));
        }

        let layer = self.layers.get(&shape.key).ok_or(LayoutError::InvalidShape)?;
        let old = layer.object_at(shape.slot).ok_or(LayoutError::InvalidShape)?;
        let transacting = self.transacting();
        if transacting {
            self.queue_layer_op(false, key, vec![old]);
        }
        let new = transacting.then(|| (obj.clone(), prop_id));
        let layer = self
            .layers
            .get_mut(&shape.key)
            .ok_or(LayoutError::InvalidShape)?;
        if !layer.replace_slot(shape.slot, obj, prop_id) {
            error!(?key, "replacement does not match the layer type");
            panic!("replacement does not match the layer type");
        }
        self.dirty = true;
        if let Some(new) = new {
            self.queue_layer_op(true, key, vec![new]);
        }
        Ok(*shape)
    }

    /// Replaces the properties id of a shape.
    pub fn replace_prop_id(
        &mut self,
        shape: &Shape,
        prop_id: Option<PropertiesId>,
    ) -> LayoutResult<Shape> {
        self.check_editable("replace_prop_id")?;
        self.check_handle(shape, "replace_prop_id")?;
        let obj = self.object(shape).ok_or(LayoutError::InvalidShape)?;
        self.replace(shape, obj, prop_id)
    }

    /// Transforms a single shape.
    ///
    /// Boxes become polygons under non-orthogonal transformations, in which
    /// case the returned handle differs from `shape`.
    pub fn transform_shape(&mut self, shape: &Shape, trans: &ICplxTrans) -> LayoutResult<Shape> {
        self.check_editable("transform")?;
        self.check_handle(shape, "transform")?;
        let obj = self.object(shape).ok_or(LayoutError::InvalidShape)?;
        let prop_id = self.prop_id(shape);
        let obj = obj.transformed(trans, self.space.as_ref())?;
        self.replace(shape, obj, prop_id)
    }

    /// Transforms all shapes. Arrays are expanded into their members.
    pub fn transform(&mut self, trans: &ICplxTrans) -> LayoutResult<()> {
        let objects: Vec<(ShapeObject, Option<PropertiesId>)> = self
            .objects()
            .into_iter()
            .flat_map(|(obj, prop_id)| obj.expanded().into_iter().map(move |o| (o, prop_id)))
            .collect();
        self.clear();
        for (obj, prop_id) in objects {
            self.do_insert(&obj, prop_id, trans, |p| p)?;
        }
        Ok(())
    }

    fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// Removes all shapes.
    pub fn clear(&mut self) {
        self.clear_flags(ShapeFlags::ALL);
    }

    /// Removes the shapes selected by `flags`.
    ///
    /// While recording, layers are removed last to first so that undo
    /// restores them in their original order.
    pub fn clear_flags(&mut self, flags: ShapeFlags) {
        self.invalidate();
        let transacting = self.transacting();
        let keys: Vec<LayerKey> = self
            .layers
            .keys()
            .rev()
            .filter(|key| flags.applies(**key))
            .copied()
            .collect();
        for key in keys {
            if let Some(layer) = self.layers.shift_remove(&key) {
                if transacting {
                    self.queue_full_layer_op(false, layer);
                }
            }
        }
    }

    /// The bounding box of all shapes.
    pub fn bbox(&self) -> Option<Rect> {
        self.layers
            .values()
            .fold(None, |acc, layer| acc.bounding_union(&layer.bbox()))
    }

    /// Rebuilds all spatial indices and marks the container clean.
    pub fn update(&mut self) {
        self.sort();
        self.dirty = false;
    }

    /// Rebuilds all spatial indices.
    pub fn sort(&mut self) {
        for layer in self.layers.values_mut() {
            layer.sort();
        }
    }

    /// Returns `true` if the container or any layer changed since the last
    /// [`Shapes::update`].
    pub fn is_bbox_dirty(&self) -> bool {
        self.dirty || self.layers.values().any(|layer| layer.is_tree_dirty())
    }

    /// Clears the container's own dirty flag.
    pub fn reset_bbox_dirty(&mut self) {
        self.dirty = false;
    }

    /// Exchanges the shapes of two containers.
    pub fn swap(&mut self, other: &mut Shapes) {
        self.invalidate();
        other.invalidate();
        std::mem::swap(&mut self.layers, &mut other.layers);
    }

    /// The number of stored shapes. Arrays count once.
    pub fn len(&self) -> usize {
        self.layers.values().map(|layer| layer.len()).sum()
    }

    /// Returns `true` if the container holds no shapes.
    pub fn is_empty(&self) -> bool {
        self.layers.values().all(|layer| layer.is_empty())
    }

    /// The keys of the layers present.
    pub fn layer_keys(&self) -> impl Iterator<Item = LayerKey> + '_ {
        self.layers.keys().copied()
    }

    /// Handles to all shapes selected by `flags`.
    pub fn iter(&self, flags: ShapeFlags) -> impl Iterator<Item = Shape> + '_ {
        let id = self.id;
        self.layers
            .iter()
            .filter(move |(key, _)| flags.applies(**key))
            .flat_map(move |(key, layer)| {
                layer
                    .handles()
                    .into_iter()
                    .map(move |slot| Shape::new(*key, slot, id))
            })
    }

    /// Handles to the shapes selected by `flags` whose bounding box touches
    /// `region`.
    pub fn touching(&self, region: &Rect, flags: ShapeFlags) -> Vec<Shape> {
        let id = self.id;
        self.layers
            .iter()
            .filter(|(key, _)| flags.applies(**key))
            .flat_map(|(key, layer)| {
                layer
                    .touching(region)
                    .into_iter()
                    .map(move |slot| Shape::new(*key, slot, id))
            })
            .collect()
    }

    /// Handles to the members of an array shape.
    ///
    /// Returns an empty list for other shapes.
    pub fn array_members(&self, shape: &Shape) -> Vec<Shape> {
        if shape.is_array_member() {
            return Vec::new();
        }
        self.layers
            .get(&shape.key)
            .and_then(|layer| layer.object_at(shape.slot))
            .map(|(obj, _)| obj.member_indices())
            .unwrap_or_default()
            .into_iter()
            .map(|(ia, ib)| shape.with_member(ia, ib))
            .collect()
    }

    /// All shapes as owned objects with their properties ids.
    pub fn objects(&self) -> Vec<(ShapeObject, Option<PropertiesId>)> {
        self.layers
            .values()
            .flat_map(|layer| layer.objects())
            .collect()
    }

    /// The shape behind a handle. Array member handles yield the member.
    pub fn object(&self, shape: &Shape) -> Option<ShapeObject> {
        if shape.container != self.id {
            return None;
        }
        let (obj, _) = self.layers.get(&shape.key)?.object_at(shape.slot)?;
        match shape.member {
            Some((ia, ib)) => obj.member(ia, ib),
            None => Some(obj),
        }
    }

    /// The properties id of a shape.
    pub fn prop_id(&self, shape: &Shape) -> Option<PropertiesId> {
        if shape.container != self.id {
            return None;
        }
        self.layers
            .get(&shape.key)?
            .object_at(shape.slot)
            .and_then(|(_, prop_id)| prop_id)
    }

    /// The outline of a polygonal shape.
    pub fn polygon(&self, shape: &Shape) -> Option<Polygon> {
        self.object(shape)?.polygon()
    }

    /// The bounding box of a shape.
    pub fn shape_bbox(&self, shape: &Shape) -> Option<Rect> {
        if shape.member.is_some() {
            return self.object(shape)?.bbox();
        }
        if shape.container != self.id {
            return None;
        }
        self.layers.get(&shape.key)?.bbox_at(shape.slot)
    }

    /// Returns `true` if the handle refers to a shape of this container.
    pub fn is_valid(&self, shape: &Shape) -> bool {
        self.object(shape).is_some()
    }

    /// The stored shape behind a handle, as its concrete type.
    ///
    /// # Panics
    ///
    /// Panics if the handle belongs to a different stored type.
    pub fn get<S: StoredShape>(&self, shape: &Shape) -> Option<&S> {
        if shape.key != S::key() {
            error!(handle = ?shape.key, requested = ?S::key(), "shape kind mismatch");
            panic!("shape kind mismatch: handle is {:?}", shape.key);
        }
        if shape.container != self.id {
            return None;
        }
        self.layer::<S>()?.get(shape.slot)
    }

    /// All stored shapes of a concrete type.
    pub fn iter_typed<S: StoredShape>(&self) -> impl Iterator<Item = &S> + '_ {
        self.layer::<S>()
            .into_iter()
            .flat_map(|layer| layer.iter().map(|(_, s)| s))
    }

    fn insert_layer_raw(&mut self, layer: Box<dyn ShapeLayer>) {
        self.dirty = true;
        match self.layers.get_mut(&layer.key()) {
            Some(existing) => existing.append_layer(&*layer),
            None => {
                self.layers.insert(layer.key(), layer);
            }
        }
    }

    fn apply(&mut self, op: &ShapesOp, inverse: bool) {
        match op {
            ShapesOp::Layer {
                insert, objects, ..
            } => {
                if *insert != inverse {
                    for (obj, prop_id) in objects {
                        self.insert_object_raw(obj.clone(), *prop_id);
                    }
                } else {
                    for (obj, prop_id) in objects {
                        if let Some(shape) = self.find(obj, *prop_id) {
                            self.erase_raw(&shape);
                        }
                    }
                }
            }
            ShapesOp::FullLayer { insert, layer } => {
                if *insert != inverse {
                    self.insert_layer_raw(layer.clone_layer());
                } else {
                    self.dirty = true;
                    self.layers.shift_remove(&layer.key());
                }
            }
        }
    }

    /// Reverts a recorded operation.
    pub fn undo(&mut self, op: &ShapesOp) {
        self.apply(op, true);
    }

    /// Reapplies a recorded operation.
    pub fn redo(&mut self, op: &ShapesOp) {
        self.apply(op, false);
    }
}

#[cfg(test)]
mod tests;
