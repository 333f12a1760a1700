//! The registry of libraries.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};

use arcstr::ArcStr;
use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use tracing::{debug, error};

use crate::layout::Layout;
use crate::library::Library;

/// The id of a registered library.
pub type LibId = usize;

#[derive(Debug, Default)]
struct Registry {
    libs: Vec<Option<Arc<Library>>>,
    by_name: IndexMap<ArcStr, Vec<LibId>>,
}

impl Registry {
    fn get(&self, id: LibId) -> Option<&Arc<Library>> {
        self.libs.get(id).and_then(Option::as_ref)
    }

    fn remove(&mut self, id: LibId) {
        if let Some(slot) = self.libs.get_mut(id) {
            *slot = None;
        }
        for ids in self.by_name.values_mut() {
            ids.retain(|i| *i != id);
        }
        self.by_name.retain(|_, ids| !ids.is_empty());
    }
}

/// The outcome of [`LibraryManager::reserve`], consumed by
/// [`LibraryManager::propagate`].
#[derive(Debug)]
#[must_use = "a reservation must be propagated"]
pub struct Registration {
    lib: Arc<Library>,
    id: LibId,
    replaced: Option<Arc<Library>>,
    fresh: bool,
}

impl Registration {
    /// The id assigned to the library.
    pub fn id(&self) -> LibId {
        self.id
    }

    /// The library being replaced, if any.
    pub fn replaced(&self) -> Option<&Arc<Library>> {
        self.replaced.as_ref()
    }

    /// Returns `false` if the library was already registered.
    pub fn is_fresh(&self) -> bool {
        self.fresh
    }
}

type Listener = Arc<dyn Fn() + Send + Sync>;

/// A registry of libraries by id and name.
///
/// Lookups and the id table are guarded by a mutex, so a manager can be
/// shared between threads. Registration runs in two phases:
/// [`LibraryManager::reserve`] updates the tables under the lock, and
/// [`LibraryManager::propagate`] remaps proxies and restores cold proxies
/// without it, since both call back into the manager.
#[derive(Default)]
pub struct LibraryManager {
    state: Mutex<Registry>,
    cold_proxies: Mutex<HashMap<ArcStr, Vec<Weak<RwLock<Layout>>>>>,
    listeners: Mutex<Vec<Listener>>,
}

impl fmt::Debug for LibraryManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibraryManager")
            .field("state", &self.state)
            .field("cold_proxies", &self.cold_proxies)
            .finish_non_exhaustive()
    }
}

static INSTANCE: OnceCell<Arc<LibraryManager>> = OnceCell::new();

impl LibraryManager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide manager, created on first use.
    ///
    /// It lives until the process exits; [`LibraryManager::clear`] empties
    /// it.
    pub fn instance() -> Arc<LibraryManager> {
        INSTANCE
            .get_or_init(|| Arc::new(LibraryManager::new()))
            .clone()
    }

    fn state(&self) -> MutexGuard<'_, Registry> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Assigns an id to `lib` and makes its name resolve to it.
    ///
    /// If a library of the same name and technology set is registered, it
    /// is recorded as replaced. Its proxies are moved by
    /// [`LibraryManager::propagate`].
    ///
    /// # Panics
    ///
    /// Panics if `lib` carries an id that belongs to another library.
    pub fn reserve(&self, lib: &Arc<Library>) -> Registration {
        let mut state = self.state();

        if let Some(id) = lib.id() {
            if !state.get(id).is_some_and(|l| Arc::ptr_eq(l, lib)) {
                error!(lib = %lib.name(), id, "library registered under a foreign id");
                panic!("library '{}' is registered under a foreign id {id}", lib.name());
            }
            return Registration {
                lib: lib.clone(),
                id,
                replaced: None,
                fresh: false,
            };
        }

        let replaced = state.by_name.get(lib.name()).and_then(|ids| {
            ids.iter()
                .filter_map(|id| state.get(*id))
                .find(|l| l.technologies() == lib.technologies())
                .cloned()
        });

        let id = match state.libs.iter().position(Option::is_none) {
            Some(id) => id,
            None => {
                state.libs.push(None);
                state.libs.len() - 1
            }
        };
        state.libs[id] = Some(lib.clone());
        lib.set_id(Some(id));

        let ids = state.by_name.entry(lib.name().clone()).or_default();
        match replaced.as_ref().and_then(|old| old.id()) {
            Some(old_id) => {
                for i in ids.iter_mut().filter(|i| **i == old_id) {
                    *i = id;
                }
            }
            None => ids.push(id),
        }

        debug!(lib = %lib.name(), id, replacing = replaced.is_some(), "registered library");
        Registration {
            lib: lib.clone(),
            id,
            replaced,
            fresh: true,
        }
    }

    /// Completes a registration: moves the proxies of a replaced library to
    /// the new one, retires the replaced library, restores cold proxies
    /// waiting for the library's name and notifies listeners.
    ///
    /// Must be called without holding any layout that refers to the
    /// libraries involved.
    pub fn propagate(&self, registration: Registration) -> LibId {
        let Registration {
            lib,
            id,
            replaced,
            fresh,
        } = registration;
        if !fresh {
            return id;
        }

        if let Some(old) = replaced {
            old.remap_to(Some(&lib));
            if let Some(old_id) = old.id() {
                let mut state = self.state();
                if state.get(old_id).is_some_and(|l| Arc::ptr_eq(l, &old)) {
                    state.libs[old_id] = None;
                }
            }
            old.set_id(None);
        }

        self.restore_cold_proxies(lib.name());
        self.notify();
        id
    }

    /// Registers `lib`, returning its id.
    ///
    /// Registering a library twice returns the same id.
    pub fn register_lib(&self, lib: &Arc<Library>) -> LibId {
        let registration = self.reserve(lib);
        self.propagate(registration)
    }

    fn restore_cold_proxies(&self, name: &ArcStr) {
        let layouts: Vec<_> = {
            let mut cold = self.cold_proxies.lock().unwrap_or_else(PoisonError::into_inner);
            let Some(layouts) = cold.get_mut(name) else {
                return;
            };
            layouts.retain(|l| l.strong_count() > 0);
            layouts.iter().filter_map(Weak::upgrade).collect()
        };
        for layout in layouts {
            let restored = layout
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .restore_proxies(self);
            debug!(lib = %name, restored, "restored cold proxies");
        }
    }

    fn notify(&self) {
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in listeners {
            listener();
        }
    }

    /// Removes `lib` from the registry.
    ///
    /// Proxies into the library become cold proxies. Returns `false` if the
    /// library was not registered.
    pub fn unregister_lib(&self, lib: &Arc<Library>) -> bool {
        let Some(id) = lib.id() else {
            return false;
        };
        {
            let mut state = self.state();
            if !state.get(id).is_some_and(|l| Arc::ptr_eq(l, lib)) {
                return false;
            }
            state.remove(id);
        }
        lib.remap_to(None);
        lib.set_id(None);
        debug!(lib = %lib.name(), id, "unregistered library");
        self.notify();
        true
    }

    /// Unregisters `lib` if it is registered.
    ///
    /// The library itself is released once the last reference to it is
    /// dropped. Returns `true` if the library was registered.
    pub fn delete_lib(&self, lib: Arc<Library>) -> bool {
        self.unregister_lib(&lib)
    }

    /// The library with id `id`.
    pub fn lib(&self, id: LibId) -> Option<Arc<Library>> {
        self.state().get(id).cloned()
    }

    /// Finds a library by name for the given technologies.
    ///
    /// The first library made for all of `technologies` wins. If none
    /// matches and technologies were requested, the first library not
    /// restricted to any technology is used.
    pub fn lib_by_name(&self, name: &str, technologies: &BTreeSet<ArcStr>) -> Option<LibId> {
        let state = self.state();
        let registry: &Registry = &state;
        let ids = registry.by_name.get(name)?;
        let candidates = move || {
            ids.iter()
                .filter_map(move |id| Some((*id, registry.get(*id)?)))
        };
        let exact = candidates()
            .find(|(_, lib)| technologies.iter().all(|t| lib.is_for_technology(t)))
            .map(|(id, _)| id);
        if exact.is_some() || technologies.is_empty() {
            return exact;
        }
        let fallback = candidates()
            .find(|(_, lib)| !lib.for_technologies())
            .map(|(id, _)| id);
        fallback
    }

    /// Like [`LibraryManager::lib_by_name`], returning the library.
    pub fn lib_ptr_by_name(
        &self,
        name: &str,
        technologies: &BTreeSet<ArcStr>,
    ) -> Option<Arc<Library>> {
        let id = self.lib_by_name(name, technologies)?;
        self.lib(id)
    }

    /// All registered libraries, ordered by id.
    pub fn libraries(&self) -> Vec<Arc<Library>> {
        self.state().libs.iter().flatten().cloned().collect()
    }

    /// Records that `layout` holds cold proxies waiting for `lib_name`.
    pub fn register_cold_proxy(&self, lib_name: ArcStr, layout: Weak<RwLock<Layout>>) {
        if layout.strong_count() == 0 {
            return;
        }
        let mut cold = self.cold_proxies.lock().unwrap_or_else(PoisonError::into_inner);
        let layouts = cold.entry(lib_name).or_default();
        if !layouts.iter().any(|l| Weak::ptr_eq(l, &layout)) {
            layouts.push(layout);
        }
    }

    /// Calls `listener` whenever the set of libraries changes.
    ///
    /// Listeners run without any lock of the manager held and may register
    /// libraries or further listeners.
    pub fn on_changed(&self, listener: impl Fn() + Send + Sync + 'static) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(listener));
    }

    /// Unregisters all libraries, turning their proxies into cold proxies.
    pub fn clear(&self) {
        let libs: Vec<Arc<Library>> = {
            let mut state = self.state();
            let libs = state.libs.drain(..).flatten().collect();
            state.by_name.clear();
            libs
        };
        for lib in &libs {
            lib.remap_to(None);
            lib.set_id(None);
        }
        if !libs.is_empty() {
            debug!(count = libs.len(), "cleared library manager");
            self.notify();
        }
    }
}
