//! A library for assigning unique names.
//!
//! Names that are already taken receive a `$N` suffix, the way library
//! proxies and copied cells are disambiguated in layout databases.

use std::collections::HashMap;
use std::hash::Hash;

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

/// A set of unique names.
///
/// Each key of type `K` is assigned a unique name, and each name maps back
/// to exactly one key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Names<K: Hash + Eq> {
    names: HashMap<ArcStr, K>,
    assignments: HashMap<K, ArcStr>,
}

impl<K: Hash + Eq> Default for Names<K> {
    fn default() -> Self {
        Self {
            names: HashMap::new(),
            assignments: HashMap::new(),
        }
    }
}

impl<K: Hash + Eq + Clone> Names<K> {
    /// Creates a new, empty name set.
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns the name associated with this key, if it exists.
    pub fn name(&self, id: &K) -> Option<ArcStr> {
        self.assignments.get(id).cloned()
    }

    /// Returns the key that owns `name`, if any.
    pub fn key(&self, name: &str) -> Option<&K> {
        self.names.get(name)
    }

    /// Returns `true` if `name` is taken.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// The number of assigned names.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Returns `true` if no names are assigned.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Returns the first name derived from `base_name` that is not taken.
    ///
    /// # Example
    ///
    /// ```
    /// # use uniquify::Names;
    /// let mut names = Names::new();
    /// names.assign_name(0, "INV");
    /// assert_eq!(names.unique_name("INV"), "INV$1");
    /// assert_eq!(names.unique_name("NAND"), "NAND");
    /// ```
    pub fn unique_name(&self, base_name: &str) -> ArcStr {
        if !self.names.contains_key(base_name) {
            return base_name.into();
        }
        let mut i = 1;
        loop {
            let new_name = arcstr::format!("{}${}", base_name, i);
            if !self.names.contains_key(&new_name) {
                break new_name;
            }
            i += 1;
        }
    }

    /// Allocates a new, unique name associated with the given ID.
    ///
    /// The name will be based on the given `base_name`. Any name previously
    /// assigned to `id` is released.
    pub fn assign_name(&mut self, id: K, base_name: &str) -> ArcStr {
        self.release(&id);
        let name = self.unique_name(base_name);
        self.names.insert(name.clone(), id.clone());
        self.assignments.insert(id, name.clone());
        name
    }

    /// Releases the name of `id`, returning it.
    pub fn release(&mut self, id: &K) -> Option<ArcStr> {
        let name = self.assignments.remove(id)?;
        self.names.remove(&name);
        Some(name)
    }

    /// Renames `id` to exactly `name`.
    ///
    /// Returns `false` and leaves the names unchanged if `name` belongs to
    /// another key.
    pub fn rename(&mut self, id: K, name: &str) -> bool {
        match self.names.get(name) {
            Some(owner) if *owner != id => false,
            _ => {
                self.release(&id);
                let name: ArcStr = name.into();
                self.names.insert(name.clone(), id.clone());
                self.assignments.insert(id, name);
                true
            }
        }
    }
}
