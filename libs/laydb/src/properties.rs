//! User properties attached to shapes.

use std::collections::{BTreeMap, HashMap};

use arcstr::ArcStr;
use indexmap::IndexMap;

use crate::id::Id;

/// A set of named property values.
pub type PropertySet = BTreeMap<ArcStr, ArcStr>;

/// Marker for property set identifiers.
#[derive(Debug)]
pub enum Properties {}

/// The identifier of an interned [`PropertySet`].
pub type PropertiesId = Id<Properties>;

/// Maps property sets to identifiers and back.
///
/// Equal sets receive the same identifier.
#[derive(Debug, Clone, Default)]
pub struct PropertiesRepository {
    next_id: PropertiesId,
    sets: IndexMap<PropertiesId, PropertySet>,
    ids: HashMap<PropertySet, PropertiesId>,
}

impl PropertiesRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the identifier of `set`, allocating one if needed.
    pub fn properties_id(&mut self, set: PropertySet) -> PropertiesId {
        if let Some(id) = self.ids.get(&set) {
            return *id;
        }
        let id = self.next_id.alloc();
        self.ids.insert(set.clone(), id);
        self.sets.insert(id, set);
        id
    }

    /// The property set with identifier `id`.
    pub fn properties(&self, id: PropertiesId) -> Option<&PropertySet> {
        self.sets.get(&id)
    }

    /// The number of distinct property sets.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Returns `true` if no property sets are stored.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Translates an identifier of `source` into an identifier of `self`
    /// that denotes an equal property set.
    ///
    /// Unknown identifiers map to the empty set.
    pub fn translate(&mut self, source: &PropertiesRepository, id: PropertiesId) -> PropertiesId {
        let set = source.properties(id).cloned().unwrap_or_default();
        self.properties_id(set)
    }

    /// Returns a function translating identifiers of `source` into `self`.
    ///
    /// # Example
    ///
    /// ```
    /// # use laydb::{PropertiesRepository, PropertySet};
    /// let mut a = PropertiesRepository::new();
    /// let mut b = PropertiesRepository::new();
    /// b.properties_id(PropertySet::from([("x".into(), "0".into())]));
    /// let set = PropertySet::from([("net".into(), "VDD".into())]);
    /// let id = a.properties_id(set.clone());
    /// let mapped = b.pid_map(&a)(id);
    /// assert_eq!(b.properties(mapped), Some(&set));
    /// ```
    pub fn pid_map<'a>(
        &'a mut self,
        source: &'a PropertiesRepository,
    ) -> impl FnMut(PropertiesId) -> PropertiesId + 'a {
        move |id| self.translate(source, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(pairs: &[(&str, &str)]) -> PropertySet {
        pairs
            .iter()
            .map(|(k, v)| (ArcStr::from(*k), ArcStr::from(*v)))
            .collect()
    }

    #[test]
    fn equal_sets_share_ids() {
        let mut repo = PropertiesRepository::new();
        let a = repo.properties_id(set(&[("net", "A")]));
        let b = repo.properties_id(set(&[("net", "A")]));
        let c = repo.properties_id(set(&[("net", "B")]));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(repo.len(), 2);
    }

    #[test]
    fn translation_preserves_values() {
        let mut source = PropertiesRepository::new();
        let mut target = PropertiesRepository::new();
        target.properties_id(set(&[("other", "1")]));
        let id = source.properties_id(set(&[("net", "A")]));
        let mapped = target.translate(&source, id);
        assert_ne!(mapped, id);
        assert_eq!(target.properties(mapped), source.properties(id));
    }
}
