//! Deduplicating storage for heavyweight shape data.

use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};

use geometry::prelude::*;
use serde::{Deserialize, Serialize};

/// An interning store handing out shared pointers to equal values.
#[derive(Debug)]
pub struct Repository<T> {
    objects: Mutex<HashSet<Arc<T>>>,
}

impl<T> Default for Repository<T> {
    fn default() -> Self {
        Self {
            objects: Mutex::new(HashSet::new()),
        }
    }
}

impl<T: Hash + Eq> Repository<T> {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the shared copy of `obj`, storing it if it is not present yet.
    pub fn intern(&self, obj: T) -> Arc<T> {
        let mut objects = self.objects.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = objects.get(&obj) {
            return existing.clone();
        }
        let obj = Arc::new(obj);
        objects.insert(obj.clone());
        obj
    }

    /// Returns `true` if `obj` points into this repository.
    pub fn contains(&self, obj: &Arc<T>) -> bool {
        let objects = self.objects.lock().unwrap_or_else(PoisonError::into_inner);
        objects
            .get(obj.as_ref())
            .is_some_and(|stored| Arc::ptr_eq(stored, obj))
    }

    /// The number of distinct stored values.
    pub fn len(&self) -> usize {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops values that are no longer referenced outside the repository.
    ///
    /// Returns the number of values removed.
    pub fn purge(&self) -> usize {
        let mut objects = self.objects.lock().unwrap_or_else(PoisonError::into_inner);
        let before = objects.len();
        objects.retain(|obj| Arc::strong_count(obj) > 1);
        before - objects.len()
    }
}

/// Interned storage for polygons, simple polygons, paths and texts.
#[derive(Debug, Default)]
pub struct ShapeRepository {
    polygons: Repository<Polygon>,
    simple_polygons: Repository<SimplePolygon>,
    paths: Repository<Path>,
    texts: Repository<Text>,
}

impl ShapeRepository {
    /// Creates an empty shape repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops all values no longer referenced by any shape.
    pub fn purge(&self) -> usize {
        self.polygons.purge()
            + self.simple_polygons.purge()
            + self.paths.purge()
            + self.texts.purge()
    }
}

/// A value type that can be stored in a [`ShapeRepository`].
pub trait Interned:
    Clone + Debug + Hash + Eq + Send + Sync + Bbox + Transform + Translate + 'static
{
    /// The repository holding values of this type.
    fn repository(repo: &ShapeRepository) -> &Repository<Self>;

    /// The displacement factored out of the value when it is interned.
    ///
    /// Equal values at different positions share storage.
    fn anchor(&self) -> Vector;
}

impl Interned for Polygon {
    fn repository(repo: &ShapeRepository) -> &Repository<Self> {
        &repo.polygons
    }

    fn anchor(&self) -> Vector {
        self.hull().first().copied().unwrap_or_default().to_vector()
    }
}

impl Interned for SimplePolygon {
    fn repository(repo: &ShapeRepository) -> &Repository<Self> {
        &repo.simple_polygons
    }

    fn anchor(&self) -> Vector {
        self.hull().first().copied().unwrap_or_default().to_vector()
    }
}

impl Interned for Path {
    fn repository(repo: &ShapeRepository) -> &Repository<Self> {
        &repo.paths
    }

    fn anchor(&self) -> Vector {
        self.points().first().copied().unwrap_or_default().to_vector()
    }
}

impl Interned for Text {
    fn repository(repo: &ShapeRepository) -> &Repository<Self> {
        &repo.texts
    }

    fn anchor(&self) -> Vector {
        self.trans().disp()
    }
}

/// A regular two-dimensional array: `na` steps of `a` by `nb` steps of `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegularArray {
    a: Vector,
    b: Vector,
    na: u32,
    nb: u32,
}

impl RegularArray {
    /// Creates a regular array.
    ///
    /// # Panics
    ///
    /// Panics if either count is zero.
    pub fn new(a: Vector, b: Vector, na: u32, nb: u32) -> Self {
        assert!(na > 0 && nb > 0, "array dimensions must be positive");
        Self { a, b, na, nb }
    }

    /// The first step vector.
    pub fn a(&self) -> Vector {
        self.a
    }

    /// The second step vector.
    pub fn b(&self) -> Vector {
        self.b
    }

    /// The number of steps along `a`.
    pub fn na(&self) -> u32 {
        self.na
    }

    /// The number of steps along `b`.
    pub fn nb(&self) -> u32 {
        self.nb
    }

    /// The number of members.
    pub fn len(&self) -> usize {
        self.na as usize * self.nb as usize
    }

    /// Always `false`; arrays have at least one member.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The displacement of member `(ia, ib)`.
    pub fn displacement(&self, ia: u32, ib: u32) -> Vector {
        self.a * i64::from(ia) + self.b * i64::from(ib)
    }

    /// All member indices with their displacements, `a` varying fastest.
    pub fn members(&self) -> impl Iterator<Item = ((u32, u32), Vector)> + '_ {
        (0..self.nb).flat_map(move |ib| (0..self.na).map(move |ia| ((ia, ib), self.displacement(ia, ib))))
    }

    /// The bounding box of `bbox` repeated over all members.
    pub fn bbox_of(&self, bbox: Rect) -> Rect {
        let ea = self.displacement(self.na - 1, 0);
        let eb = self.displacement(0, self.nb - 1);
        [ea, eb, ea + eb]
            .into_iter()
            .fold(bbox, |acc, v| acc.union(bbox.moved(v)))
    }

    /// The array with both step vectors transformed.
    pub fn transformed<T: Transformation>(&self, trans: &T) -> Self {
        Self {
            a: trans.trans_vector(self.a),
            b: trans.trans_vector(self.b),
            ..*self
        }
    }
}

/// Interned storage for array descriptors.
#[derive(Debug, Default)]
pub struct ArrayRepository {
    arrays: Repository<RegularArray>,
}

impl ArrayRepository {
    /// Creates an empty array repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the shared copy of `array`.
    pub fn intern(&self, array: RegularArray) -> Arc<RegularArray> {
        self.arrays.intern(array)
    }
}

/// The shape and array repositories shared by all containers of one layout.
///
/// Two containers are in the same space iff they hold the very same
/// repositories.
#[derive(Debug, Clone, Default)]
pub struct RepositorySpace {
    shapes: Arc<ShapeRepository>,
    arrays: Arc<ArrayRepository>,
}

impl RepositorySpace {
    /// Creates a fresh space.
    pub fn new() -> Self {
        Self::default()
    }

    /// The shape repository.
    pub fn shapes(&self) -> &ShapeRepository {
        &self.shapes
    }

    /// The array repository.
    pub fn arrays(&self) -> &ArrayRepository {
        &self.arrays
    }

    /// Interns a value in this space.
    pub fn intern<T: Interned>(&self, obj: T) -> Arc<T> {
        T::repository(&self.shapes).intern(obj)
    }

    /// Returns `true` if both spaces share their repositories.
    pub fn same_as(&self, other: &RepositorySpace) -> bool {
        Arc::ptr_eq(&self.shapes, &other.shapes) && Arc::ptr_eq(&self.arrays, &other.arrays)
    }
}
