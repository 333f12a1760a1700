//! Libraries: named, technology-scoped layouts that other layouts refer to
//! through proxy cells.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak,
};

use arcstr::ArcStr;
use tracing::debug;

use crate::id::ObjectId;
use crate::layout::{CellIndex, Layout};
use crate::library_manager::LibId;

const UNREGISTERED: usize = usize::MAX;

#[derive(Debug, Default)]
struct ProxyRefs {
    refcount: HashMap<CellIndex, usize>,
    retired: HashMap<CellIndex, usize>,
    referrers: HashMap<ObjectId, (Weak<RwLock<Layout>>, usize)>,
}

/// A named layout whose cells are used by other layouts through proxies.
///
/// A library is identified by its name and technology set. Registering it
/// with a [`LibraryManager`](crate::LibraryManager) assigns an id and may
/// replace a previously registered library with the same identity.
#[derive(Debug)]
pub struct Library {
    name: ArcStr,
    description: ArcStr,
    technologies: BTreeSet<ArcStr>,
    id: AtomicUsize,
    layout: RwLock<Layout>,
    refs: Mutex<ProxyRefs>,
}

impl Library {
    /// Creates an unregistered library wrapping `layout`.
    pub fn new(name: impl Into<ArcStr>, layout: Layout) -> Self {
        Self {
            name: name.into(),
            description: ArcStr::default(),
            technologies: BTreeSet::new(),
            id: AtomicUsize::new(UNREGISTERED),
            layout: RwLock::new(layout),
            refs: Mutex::new(ProxyRefs::default()),
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = description.into();
        self
    }

    /// Restricts the library to a technology. May be called repeatedly.
    pub fn with_technology(mut self, technology: impl Into<ArcStr>) -> Self {
        self.technologies.insert(technology.into());
        self
    }

    /// The library name.
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// The description.
    pub fn description(&self) -> &ArcStr {
        &self.description
    }

    /// The technologies the library is restricted to. Empty means all.
    pub fn technologies(&self) -> &BTreeSet<ArcStr> {
        &self.technologies
    }

    /// Returns `true` if the library is restricted to any technology.
    pub fn for_technologies(&self) -> bool {
        !self.technologies.is_empty()
    }

    /// Returns `true` if the library is explicitly made for `technology`.
    pub fn is_for_technology(&self, technology: &str) -> bool {
        self.technologies.contains(technology)
    }

    /// The id assigned by the library manager, or `None` if the library
    /// is not registered.
    pub fn id(&self) -> Option<LibId> {
        match self.id.load(Ordering::Acquire) {
            UNREGISTERED => None,
            id => Some(id),
        }
    }

    pub(crate) fn set_id(&self, id: Option<LibId>) {
        self.id.store(id.unwrap_or(UNREGISTERED), Ordering::Release);
    }

    /// Read access to the library layout.
    pub fn layout(&self) -> RwLockReadGuard<'_, Layout> {
        self.layout.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write access to the library layout.
    ///
    /// Call [`Library::refresh`] afterwards to update existing proxies.
    pub fn layout_mut(&self) -> RwLockWriteGuard<'_, Layout> {
        self.layout.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn refs(&self) -> MutexGuard<'_, ProxyRefs> {
        self.refs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records a proxy of `layout` referring to `lib_cell`.
    pub fn register_proxy(&self, lib_cell: CellIndex, layout: &Layout) {
        let mut refs = self.refs();
        *refs.refcount.entry(lib_cell).or_default() += 1;
        refs.referrers
            .entry(layout.id())
            .or_insert_with(|| (layout.self_ref().clone(), 0))
            .1 += 1;
    }

    /// Releases a proxy of `layout` referring to `lib_cell`.
    pub fn unregister_proxy(&self, lib_cell: CellIndex, layout: &Layout) {
        let mut refs = self.refs();
        if let Some((_, count)) = refs.referrers.get_mut(&layout.id()) {
            *count -= 1;
            if *count == 0 {
                refs.referrers.remove(&layout.id());
            }
        }
        if let Some(count) = refs.refcount.get_mut(&lib_cell) {
            *count -= 1;
            if *count == 0 {
                refs.refcount.remove(&lib_cell);
                refs.retired.remove(&lib_cell);
            }
        }
    }

    /// Marks one reference to `lib_cell` as retired.
    ///
    /// Retired references keep the proxy restorable by undo.
    pub fn retire_proxy(&self, lib_cell: CellIndex) {
        *self.refs().retired.entry(lib_cell).or_default() += 1;
    }

    /// Reverts one [`Library::retire_proxy`] call.
    pub fn unretire_proxy(&self, lib_cell: CellIndex) {
        let mut refs = self.refs();
        if let Some(count) = refs.retired.get_mut(&lib_cell) {
            *count -= 1;
            if *count == 0 {
                refs.retired.remove(&lib_cell);
            }
        }
    }

    /// Returns `true` if every reference to `lib_cell` has been retired.
    ///
    /// # Example
    ///
    /// ```
    /// # use laydb::{Layout, Library};
    /// let lib = Library::new("L", Layout::default());
    /// let user = Layout::default();
    /// lib.register_proxy(0, &user);
    /// assert!(!lib.is_retired(0));
    /// lib.retire_proxy(0);
    /// assert!(lib.is_retired(0));
    /// ```
    pub fn is_retired(&self, lib_cell: CellIndex) -> bool {
        let refs = self.refs();
        match (refs.refcount.get(&lib_cell), refs.retired.get(&lib_cell)) {
            (Some(r), Some(c)) => r == c,
            _ => false,
        }
    }

    /// The number of proxies referring to `lib_cell`.
    pub fn refcount(&self, lib_cell: CellIndex) -> usize {
        self.refs().refcount.get(&lib_cell).copied().unwrap_or(0)
    }

    /// The number of distinct layouts holding proxies into this library.
    pub fn referrer_count(&self) -> usize {
        self.refs().referrers.len()
    }

    fn referrers(&self) -> Vec<Arc<RwLock<Layout>>> {
        self.refs()
            .referrers
            .values()
            .filter_map(|(layout, _)| layout.upgrade())
            .collect()
    }

    /// Points all proxies into this library to the cells of the same name
    /// in `other`, or turns them into cold proxies if `other` is `None`.
    ///
    /// Only shared layouts can be reached. The referring layouts are locked
    /// for writing one after another, so the caller must not hold any of
    /// them.
    pub fn remap_to(&self, other: Option<&Arc<Library>>) {
        let referrers = self.referrers();
        debug!(
            lib = %self.name,
            target = other.map(|l| l.name().as_str()),
            layouts = referrers.len(),
            "remapping library"
        );
        for layout in referrers {
            layout
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .remap_lib_proxies(self, other);
        }
    }

    /// Copies the current library content into all proxies.
    pub fn refresh(self: &Arc<Self>) {
        for layout in self.referrers() {
            layout
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .refresh_lib_proxies(self);
        }
    }
}
