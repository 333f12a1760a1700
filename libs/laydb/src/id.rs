//! Typed identifiers.

use std::cmp::Ordering;
use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use serde::{Deserialize, Serialize};

/// An identifier for an object of type `T`.
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<T>(u64, #[serde(skip)] PhantomData<fn() -> T>);

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for Id<T> {}

impl<T> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl<T> Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T> Debug for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Id({})", self.0)
    }
}

impl<T> Default for Id<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Id<T> {
    pub(crate) fn new() -> Self {
        Self(0, PhantomData)
    }

    /// The raw identifier value.
    pub fn raw(&self) -> u64 {
        self.0
    }

    pub(crate) fn alloc(&mut self) -> Self {
        *self = Id(self.0 + 1, PhantomData);
        *self
    }
}

/// Marker for identifiers of undo targets.
#[derive(Debug)]
pub enum Objects {}

/// The identity of a container that undo operations refer to.
pub type ObjectId = Id<Objects>;

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

impl ObjectId {
    /// Returns a process-wide unique object identifier.
    pub fn unique() -> Self {
        Id(NEXT_OBJECT_ID.fetch_add(1, AtomicOrdering::Relaxed), PhantomData)
    }
}
