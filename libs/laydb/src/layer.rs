//! Typed shape layers.
//!
//! A [`Shapes`] container keeps one [`Layer`] per stored type, behind the
//! type-erased [`ShapeLayer`] interface.

use std::fmt::Debug;

use downcast_rs::{impl_downcast, DowncastSync};
use geometry::prelude::*;
use slotmap::SlotMap;
use tracing::error;

use crate::properties::PropertiesId;
use crate::repository::RepositorySpace;
use crate::shape::{LayerKey, ShapeKey, ShapeObject, Slot, StoredShape};
use crate::shapes::Shapes;

/// Storage for the shapes of one layer.
#[derive(Debug, Clone)]
pub enum Store<T> {
    /// Keys remain valid when other shapes are inserted or removed.
    Stable(SlotMap<ShapeKey, T>),
    /// Contiguous storage; indices shift when earlier shapes are removed.
    Unstable(Vec<T>),
}

impl<T> Store<T> {
    /// Creates an empty store of the given strategy.
    pub fn new(stable: bool) -> Self {
        if stable {
            Store::Stable(SlotMap::with_key())
        } else {
            Store::Unstable(Vec::new())
        }
    }

    /// Returns `true` for stable stores.
    pub fn is_stable(&self) -> bool {
        matches!(self, Store::Stable(_))
    }

    /// The number of stored shapes.
    pub fn len(&self) -> usize {
        match self {
            Store::Stable(m) => m.len(),
            Store::Unstable(v) => v.len(),
        }
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stores `obj`, returning its slot.
    pub fn insert(&mut self, obj: T) -> Slot {
        match self {
            Store::Stable(m) => Slot::Stable(m.insert(obj)),
            Store::Unstable(v) => {
                v.push(obj);
                Slot::Unstable(v.len() - 1)
            }
        }
    }

    /// The shape at `slot`.
    pub fn get(&self, slot: Slot) -> Option<&T> {
        match (self, slot) {
            (Store::Stable(m), Slot::Stable(k)) => m.get(k),
            (Store::Unstable(v), Slot::Unstable(i)) => v.get(i),
            _ => None,
        }
    }

    /// The shape at `slot`, mutably.
    pub fn get_mut(&mut self, slot: Slot) -> Option<&mut T> {
        match (self, slot) {
            (Store::Stable(m), Slot::Stable(k)) => m.get_mut(k),
            (Store::Unstable(v), Slot::Unstable(i)) => v.get_mut(i),
            _ => None,
        }
    }

    /// Removes the shape at `slot`.
    pub fn remove(&mut self, slot: Slot) -> Option<T> {
        match (self, slot) {
            (Store::Stable(m), Slot::Stable(k)) => m.remove(k),
            (Store::Unstable(v), Slot::Unstable(i)) if i < v.len() => Some(v.remove(i)),
            _ => None,
        }
    }

    /// Iterates over all shapes with their slots.
    pub fn iter(&self) -> Box<dyn Iterator<Item = (Slot, &T)> + '_> {
        match self {
            Store::Stable(m) => Box::new(m.iter().map(|(k, v)| (Slot::Stable(k), v))),
            Store::Unstable(v) => Box::new(v.iter().enumerate().map(|(i, v)| (Slot::Unstable(i), v))),
        }
    }
}

/// The shapes of one stored type, with a cached bounding box and a
/// spatial index sorted by left edge.
#[derive(Debug, Clone)]
pub struct Layer<S> {
    store: Store<S>,
    bbox: Option<Rect>,
    index: Vec<(Rect, Slot)>,
    tree_dirty: bool,
}

impl<S: StoredShape> Layer<S> {
    /// Creates an empty layer.
    pub fn new(stable: bool) -> Self {
        Self {
            store: Store::new(stable),
            bbox: None,
            index: Vec::new(),
            tree_dirty: false,
        }
    }

    /// Stores `s`.
    pub fn insert(&mut self, s: S) -> Slot {
        self.tree_dirty = true;
        self.store.insert(s)
    }

    /// The shape at `slot`.
    pub fn get(&self, slot: Slot) -> Option<&S> {
        self.store.get(slot)
    }

    /// The slot of the first shape equal to `s`.
    pub fn find(&self, s: &S) -> Option<Slot> {
        self.store.iter().find(|(_, x)| *x == s).map(|(slot, _)| slot)
    }

    /// Removes the shape at `slot`.
    pub fn erase(&mut self, slot: Slot) -> Option<S> {
        let s = self.store.remove(slot)?;
        self.tree_dirty = true;
        Some(s)
    }

    /// Replaces the shape at `slot`, returning the previous one.
    pub fn replace(&mut self, slot: Slot, s: S) -> Option<S> {
        let old = std::mem::replace(self.store.get_mut(slot)?, s);
        self.tree_dirty = true;
        Some(old)
    }

    /// Iterates over all shapes with their slots.
    pub fn iter(&self) -> impl Iterator<Item = (Slot, &S)> + '_ {
        self.store.iter()
    }

    fn compute_bbox(&self) -> Option<Rect> {
        self.store
            .iter()
            .fold(None, |acc, (_, s)| acc.bounding_union(&s.bbox()))
    }
}

/// The type-erased interface of a [`Layer`].
pub trait ShapeLayer: DowncastSync + Debug {
    /// The key of the stored type.
    fn key(&self) -> LayerKey;

    /// The number of shapes.
    fn len(&self) -> usize;

    /// Returns `true` if the layer holds no shapes.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if the layer uses a stable store.
    fn is_stable(&self) -> bool;

    /// The bounding box of all shapes.
    ///
    /// Uses the cached box unless the spatial index is out of date.
    fn bbox(&self) -> Option<Rect>;

    /// Returns `true` if the spatial index and cached box are out of date.
    fn is_tree_dirty(&self) -> bool;

    /// Rebuilds the spatial index and the cached box.
    fn sort(&mut self);

    /// A boxed copy of the layer.
    fn clone_layer(&self) -> Box<dyn ShapeLayer>;

    /// Inserts all shapes into `target` unchanged.
    fn insert_into(&self, target: &mut Shapes);

    /// Inserts all shapes into `target` with references replaced by values.
    fn deref_into(&self, target: &mut Shapes);

    /// Inserts all shapes into `target` with shared data re-interned in `space`.
    fn translate_into(&self, target: &mut Shapes, space: &RepositorySpace);

    /// All shapes as owned objects with their properties ids.
    fn objects(&self) -> Vec<(ShapeObject, Option<PropertiesId>)>;

    /// The slots of all shapes.
    fn handles(&self) -> Vec<Slot>;

    /// The slots of all shapes whose bounding box touches `region`.
    fn touching(&self, region: &Rect) -> Vec<Slot>;

    /// The shape at `slot` as an owned object.
    fn object_at(&self, slot: Slot) -> Option<(ShapeObject, Option<PropertiesId>)>;

    /// The bounding box of the shape at `slot`.
    fn bbox_at(&self, slot: Slot) -> Option<Rect>;

    /// Removes the shape at `slot`.
    fn erase_slot(&mut self, slot: Slot) -> Option<(ShapeObject, Option<PropertiesId>)>;

    /// Replaces the shape at `slot`.
    ///
    /// Returns `false` if the slot is empty or the object is not of this
    /// layer's type.
    fn replace_slot(&mut self, slot: Slot, obj: ShapeObject, prop_id: Option<PropertiesId>)
        -> bool;

    /// Moves the shapes of another layer of the same type into this one.
    fn append_layer(&mut self, other: &dyn ShapeLayer);
}
impl_downcast!(sync ShapeLayer);

impl Clone for Box<dyn ShapeLayer> {
    fn clone(&self) -> Self {
        self.clone_layer()
    }
}

impl<S: StoredShape> ShapeLayer for Layer<S> {
    fn key(&self) -> LayerKey {
        S::key()
    }

    fn len(&self) -> usize {
        self.store.len()
    }

    fn is_stable(&self) -> bool {
        self.store.is_stable()
    }

    fn bbox(&self) -> Option<Rect> {
        if self.tree_dirty {
            self.compute_bbox()
        } else {
            self.bbox
        }
    }

    fn is_tree_dirty(&self) -> bool {
        self.tree_dirty
    }

    fn sort(&mut self) {
        if !self.tree_dirty {
            return;
        }
        let mut index: Vec<(Rect, Slot)> = self
            .store
            .iter()
            .filter_map(|(slot, s)| s.bbox().map(|b| (b, slot)))
            .collect();
        index.sort_by_key(|(b, _)| (b.left(), b.bot()));
        self.bbox = self.compute_bbox();
        self.index = index;
        self.tree_dirty = false;
    }

    fn clone_layer(&self) -> Box<dyn ShapeLayer> {
        Box::new(self.clone())
    }

    fn insert_into(&self, target: &mut Shapes) {
        for (_, s) in self.store.iter() {
            target.insert(s.clone());
        }
    }

    fn deref_into(&self, target: &mut Shapes) {
        for (_, s) in self.store.iter() {
            for obj in s.to_object().dereferenced() {
                target.insert_object(obj, s.prop_id());
            }
        }
    }

    fn translate_into(&self, target: &mut Shapes, space: &RepositorySpace) {
        for (_, s) in self.store.iter() {
            target.insert_object(s.to_object().translated(space), s.prop_id());
        }
    }

    fn objects(&self) -> Vec<(ShapeObject, Option<PropertiesId>)> {
        self.store
            .iter()
            .map(|(_, s)| (s.to_object(), s.prop_id()))
            .collect()
    }

    fn handles(&self) -> Vec<Slot> {
        self.store.iter().map(|(slot, _)| slot).collect()
    }

    fn touching(&self, region: &Rect) -> Vec<Slot> {
        if self.tree_dirty {
            return self
                .store
                .iter()
                .filter(|(_, s)| s.bbox().is_some_and(|b| b.touches(region)))
                .map(|(slot, _)| slot)
                .collect();
        }
        let end = self.index.partition_point(|(b, _)| b.left() <= region.right());
        self.index[..end]
            .iter()
            .filter(|(b, _)| b.touches(region))
            .map(|(_, slot)| *slot)
            .collect()
    }

    fn object_at(&self, slot: Slot) -> Option<(ShapeObject, Option<PropertiesId>)> {
        self.store.get(slot).map(|s| (s.to_object(), s.prop_id()))
    }

    fn bbox_at(&self, slot: Slot) -> Option<Rect> {
        self.store.get(slot).and_then(|s| s.bbox())
    }

    fn erase_slot(&mut self, slot: Slot) -> Option<(ShapeObject, Option<PropertiesId>)> {
        self.erase(slot).map(|s| (s.to_object(), s.prop_id()))
    }

    fn replace_slot(
        &mut self,
        slot: Slot,
        obj: ShapeObject,
        prop_id: Option<PropertiesId>,
    ) -> bool {
        match S::from_object(obj, prop_id) {
            Some(s) => self.replace(slot, s).is_some(),
            None => false,
        }
    }

    fn append_layer(&mut self, other: &dyn ShapeLayer) {
        let Some(other) = other.downcast_ref::<Layer<S>>() else {
            error!(
                target = ?S::key(),
                source = ?other.key(),
                "cannot append a layer of a different type"
            );
            panic!("cannot append a layer of a different type");
        };
        for (_, s) in other.store.iter() {
            self.insert(s.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxes(stable: bool) -> Layer<Rect> {
        let mut layer = Layer::new(stable);
        for i in 0..5 {
            layer.insert(Rect::from_sides(i * 20, 0, i * 20 + 10, 10));
        }
        layer
    }

    #[test]
    fn stable_slots_survive_erase() {
        let mut layer = boxes(true);
        let slots = layer.handles();
        layer.erase(slots[1]);
        assert_eq!(layer.get(slots[3]), Some(&Rect::from_sides(60, 0, 70, 10)));
        assert_eq!(layer.get(slots[1]), None);
    }

    #[test]
    fn unstable_slots_shift_on_erase() {
        let mut layer = boxes(false);
        layer.erase(Slot::Unstable(1));
        assert_eq!(
            layer.get(Slot::Unstable(1)),
            Some(&Rect::from_sides(40, 0, 50, 10))
        );
        assert_eq!(layer.len(), 4);
    }

    #[test]
    fn bbox_is_fresh_while_tree_is_dirty() {
        let mut layer = boxes(true);
        assert!(layer.is_tree_dirty());
        assert_eq!(ShapeLayer::bbox(&layer), Some(Rect::from_sides(0, 0, 90, 10)));
        layer.sort();
        assert!(!layer.is_tree_dirty());
        layer.insert(Rect::from_sides(-5, -5, 0, 0));
        assert_eq!(ShapeLayer::bbox(&layer), Some(Rect::from_sides(-5, -5, 90, 10)));
    }

    #[test]
    fn touching_uses_the_sorted_index() {
        let mut layer = boxes(true);
        let region = Rect::from_sides(15, 0, 45, 5);
        let dirty = layer.touching(&region).len();
        layer.sort();
        assert_eq!(layer.touching(&region).len(), dirty);
        assert_eq!(dirty, 2);
    }

    #[test]
    fn append_requires_same_type() {
        let mut a = boxes(true);
        let b = boxes(false);
        a.append_layer(&b);
        assert_eq!(a.len(), 10);
    }

    #[test]
    #[should_panic]
    fn append_of_other_type_panics() {
        let mut a = boxes(true);
        let b: Layer<Point> = Layer::new(true);
        a.append_layer(&b);
    }
}
