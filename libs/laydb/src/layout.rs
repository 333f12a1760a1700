//! Layouts: cells of per-layer shape containers.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock, Weak};

use arcstr::ArcStr;
use geometry::prelude::*;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uniquify::Names;

use crate::config::LayoutConfig;
use crate::error::{LayoutError, LayoutResult};
use crate::id::ObjectId;
use crate::library::Library;
use crate::library_manager::{LibId, LibraryManager};
use crate::properties::PropertiesRepository;
use crate::repository::RepositorySpace;
use crate::shapes::Shapes;
use crate::undo::{lock, LayoutOp, Op, SharedManager};

/// The index of a cell within its layout.
pub type CellIndex = usize;

/// The index of a layer within its layout.
pub type LayerIndex = usize;

/// A layout that libraries and other threads can refer to.
pub type SharedLayout = Arc<RwLock<Layout>>;

/// The identification of a layout layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerInfo {
    /// The layer number.
    pub layer: i32,
    /// The datatype number.
    pub datatype: i32,
    /// An optional layer name.
    pub name: Option<ArcStr>,
}

impl LayerInfo {
    /// Creates an unnamed layer.
    pub fn new(layer: i32, datatype: i32) -> Self {
        Self {
            layer,
            datatype,
            name: None,
        }
    }

    /// Sets the layer name.
    pub fn with_name(mut self, name: impl Into<ArcStr>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// What a cold proxy stands in for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProxyContextInfo {
    /// The name of the library the cell came from.
    pub lib_name: ArcStr,
    /// The name of the cell within that library.
    pub cell_name: ArcStr,
}

/// The role of a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellKind {
    /// A cell with its own content.
    Regular,
    /// A copy of a library cell, kept in sync with the library.
    LibraryProxy {
        /// The library id.
        lib_id: LibId,
        /// The cell index within the library layout.
        lib_cell: CellIndex,
    },
    /// A placeholder for a library cell that could not be resolved.
    ColdProxy(ProxyContextInfo),
}

/// A named cell holding one shape container per layer.
#[derive(Debug, Clone)]
pub struct Cell {
    name: ArcStr,
    kind: CellKind,
    shapes: IndexMap<LayerIndex, Shapes>,
}

impl Cell {
    /// The cell name.
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// The role of the cell.
    pub fn kind(&self) -> &CellKind {
        &self.kind
    }

    /// Returns `true` for library and cold proxies.
    pub fn is_proxy(&self) -> bool {
        !matches!(self.kind, CellKind::Regular)
    }

    /// The shapes on `layer`, if any were created.
    pub fn shapes(&self, layer: LayerIndex) -> Option<&Shapes> {
        self.shapes.get(&layer)
    }

    /// The layers holding shape containers.
    pub fn layers(&self) -> impl Iterator<Item = LayerIndex> + '_ {
        self.shapes.keys().copied()
    }

    /// The bounding box of all shapes of the cell.
    pub fn bbox(&self) -> Option<Rect> {
        self.shapes
            .values()
            .fold(None, |acc, shapes| acc.bounding_union(&shapes.bbox()))
    }
}

/// A layout database.
#[derive(Debug)]
pub struct Layout {
    id: ObjectId,
    self_ref: Weak<RwLock<Layout>>,
    config: LayoutConfig,
    space: RepositorySpace,
    properties: PropertiesRepository,
    manager: Option<SharedManager>,
    library_manager: Option<Arc<LibraryManager>>,
    layers: Vec<LayerInfo>,
    cells: Vec<Option<Cell>>,
    names: Names<CellIndex>,
    containers: HashMap<ObjectId, (CellIndex, LayerIndex)>,
    lib_proxies: HashMap<(LibId, CellIndex), CellIndex>,
    proxy_libs: HashMap<LibId, Weak<Library>>,
}

impl Default for Layout {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl Layout {
    /// Creates an empty layout.
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            id: ObjectId::unique(),
            self_ref: Weak::new(),
            config,
            space: RepositorySpace::new(),
            properties: PropertiesRepository::new(),
            manager: None,
            library_manager: None,
            layers: Vec::new(),
            cells: Vec::new(),
            names: Names::new(),
            containers: HashMap::new(),
            lib_proxies: HashMap::new(),
            proxy_libs: HashMap::new(),
        }
    }

    /// Attaches a transaction manager.
    ///
    /// Shape containers created later record their changes with it.
    pub fn with_manager(mut self, manager: SharedManager) -> Self {
        for cell in self.cells.iter_mut().flatten() {
            for shapes in cell.shapes.values_mut() {
                shapes.set_manager(Some(manager.clone()));
            }
        }
        self.manager = Some(manager);
        self
    }

    /// Links the library manager used to resolve library proxies.
    pub fn with_library_manager(mut self, library_manager: Arc<LibraryManager>) -> Self {
        self.library_manager = Some(library_manager);
        self
    }

    /// Moves the layout behind a lock that libraries can refer to.
    pub fn into_shared(mut self) -> SharedLayout {
        Arc::new_cyclic(|weak| {
            self.self_ref = weak.clone();
            RwLock::new(self)
        })
    }

    /// The identity of the layout.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// A weak reference to the shared layout, if it is shared.
    pub fn self_ref(&self) -> &Weak<RwLock<Layout>> {
        &self.self_ref
    }

    /// The configuration the layout was created with.
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Returns `true` if shape containers are editable.
    pub fn is_editable(&self) -> bool {
        self.config.editable
    }

    /// The database unit in micrometers.
    pub fn dbu(&self) -> f64 {
        self.config.dbu
    }

    /// The technologies library lookups are restricted to.
    pub fn technologies(&self) -> BTreeSet<ArcStr> {
        self.config.technology.iter().cloned().collect()
    }

    /// The repository space shared by all shape containers.
    pub fn space(&self) -> &RepositorySpace {
        &self.space
    }

    /// The properties repository.
    pub fn properties(&self) -> &PropertiesRepository {
        &self.properties
    }

    /// The properties repository, mutably.
    pub fn properties_mut(&mut self) -> &mut PropertiesRepository {
        &mut self.properties
    }

    /// The transaction manager.
    pub fn manager(&self) -> Option<&SharedManager> {
        self.manager.as_ref()
    }

    /// The library manager.
    pub fn library_manager(&self) -> Option<&Arc<LibraryManager>> {
        self.library_manager.as_ref()
    }

    fn transacting(&self) -> bool {
        self.manager.as_ref().is_some_and(|m| lock(m).transacting())
    }

    fn queue(&self, op: LayoutOp) {
        if let Some(manager) = &self.manager {
            lock(manager).queue(Op::Layout(op));
        }
    }

    /// Opens a transaction on the attached manager.
    pub fn transaction(&self, description: impl Into<ArcStr>) -> LayoutResult<()> {
        let manager = self.manager.as_ref().ok_or(LayoutError::NoManager)?;
        lock(manager).transaction(description);
        Ok(())
    }

    /// Commits the open transaction.
    pub fn commit(&self) -> LayoutResult<()> {
        let manager = self.manager.as_ref().ok_or(LayoutError::NoManager)?;
        lock(manager).commit();
        Ok(())
    }

    /// Reverts and discards the open transaction.
    pub fn cancel(&mut self) -> LayoutResult<()> {
        let manager = self.manager.clone().ok_or(LayoutError::NoManager)?;
        let ops = lock(&manager).cancel();
        for op in &ops {
            self.apply(op, true);
        }
        Ok(())
    }

    /// Reverts the most recent transaction.
    ///
    /// Returns `false` if there is nothing to undo.
    pub fn undo(&mut self) -> LayoutResult<bool> {
        let manager = self.manager.clone().ok_or(LayoutError::NoManager)?;
        let Some(ops) = lock(&manager).undo() else {
            return Ok(false);
        };
        for op in &ops {
            self.apply(op, true);
        }
        Ok(true)
    }

    /// Reapplies the most recently undone transaction.
    ///
    /// Returns `false` if there is nothing to redo.
    pub fn redo(&mut self) -> LayoutResult<bool> {
        let manager = self.manager.clone().ok_or(LayoutError::NoManager)?;
        let Some(ops) = lock(&manager).redo() else {
            return Ok(false);
        };
        for op in &ops {
            self.apply(op, false);
        }
        Ok(true)
    }

    fn apply(&mut self, op: &Op, inverse: bool) {
        match op {
            Op::Shapes(target, op) => {
                let Some(&(cell, layer)) = self.containers.get(target) else {
                    warn!(?target, "undo operation for unknown shape container");
                    return;
                };
                let editable = self.config.editable;
                let space = self.space.clone();
                let manager = self.manager.clone();
                let Some(cell) = self.cells.get_mut(cell).and_then(Option::as_mut) else {
                    warn!(cell, "undo operation for deleted cell");
                    return;
                };
                let shapes = cell.shapes.entry(layer).or_insert_with(|| {
                    let mut shapes = Shapes::with_space(editable, space).with_id(*target);
                    shapes.set_manager(manager);
                    shapes
                });
                if inverse {
                    shapes.undo(op);
                } else {
                    shapes.redo(op);
                }
            }
            Op::Layout(LayoutOp::InsertCell { index, cell }) => {
                if inverse {
                    self.remove_cell(*index, true);
                } else {
                    self.place_cell(*index, (**cell).clone(), true);
                }
            }
            Op::Layout(LayoutOp::DeleteCell { index, cell }) => {
                if inverse {
                    self.place_cell(*index, (**cell).clone(), true);
                } else {
                    self.remove_cell(*index, true);
                }
            }
        }
    }

    /// Adds a layer, returning its index.
    pub fn insert_layer(&mut self, info: LayerInfo) -> LayerIndex {
        self.layers.push(info);
        self.layers.len() - 1
    }

    /// Finds the first layer with the given layer and datatype numbers.
    pub fn find_layer(&self, layer: i32, datatype: i32) -> Option<LayerIndex> {
        self.layers
            .iter()
            .position(|info| info.layer == layer && info.datatype == datatype)
    }

    /// The description of a layer.
    pub fn layer_info(&self, layer: LayerIndex) -> Option<&LayerInfo> {
        self.layers.get(layer)
    }

    /// The number of layers.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// The cell with index `index`.
    pub fn cell(&self, index: CellIndex) -> Option<&Cell> {
        self.cells.get(index).and_then(Option::as_ref)
    }

    /// Finds a cell by name.
    pub fn cell_by_name(&self, name: &str) -> Option<CellIndex> {
        self.names.key(name).copied()
    }

    /// Iterates over all live cells.
    pub fn cells(&self) -> impl Iterator<Item = (CellIndex, &Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.as_ref().map(|c| (i, c)))
    }

    /// The number of live cells.
    pub fn cell_count(&self) -> usize {
        self.cells.iter().flatten().count()
    }

    fn place_cell(&mut self, index: CellIndex, mut cell: Cell, replay: bool) {
        if self.cells.len() <= index {
            self.cells.resize_with(index + 1, || None);
        }
        if !self.names.rename(index, &cell.name) {
            cell.name = self.names.assign_name(index, &cell.name);
        }
        for (layer, shapes) in cell.shapes.iter_mut() {
            shapes.set_manager(self.manager.clone());
            self.containers.insert(shapes.id(), (index, *layer));
        }
        if let CellKind::LibraryProxy { lib_id, lib_cell } = cell.kind {
            self.lib_proxies.insert((lib_id, lib_cell), index);
            if replay {
                if let Some(lib) = self.proxy_library(lib_id) {
                    lib.unretire_proxy(lib_cell);
                }
            }
        }
        self.cells[index] = Some(cell);
    }

    fn remove_cell(&mut self, index: CellIndex, retire: bool) -> Option<Cell> {
        let cell = self.cells.get_mut(index)?.take()?;
        self.names.release(&index);
        // Retired cells may come back through undo, which finds their
        // containers here.
        if !retire {
            for shapes in cell.shapes.values() {
                self.containers.remove(&shapes.id());
            }
        }
        if let CellKind::LibraryProxy { lib_id, lib_cell } = cell.kind {
            self.lib_proxies.remove(&(lib_id, lib_cell));
            if let Some(lib) = self.proxy_library(lib_id) {
                if retire {
                    lib.retire_proxy(lib_cell);
                } else {
                    lib.unregister_proxy(lib_cell, self);
                }
            }
        }
        Some(cell)
    }

    fn new_cell(
        &mut self,
        name: &str,
        kind: CellKind,
        shapes: IndexMap<LayerIndex, Shapes>,
    ) -> CellIndex {
        let index = self.cells.len();
        let cell = Cell {
            name: name.into(),
            kind,
            shapes,
        };
        self.place_cell(index, cell, false);
        if self.transacting() {
            if let Some(cell) = self.cell(index) {
                self.queue(LayoutOp::InsertCell {
                    index,
                    cell: Box::new(cell.clone()),
                });
            }
        }
        index
    }

    /// Adds an empty cell. Taken names receive a `$N` suffix.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidCellName`] for empty names.
    pub fn add_cell(&mut self, name: &str) -> LayoutResult<CellIndex> {
        if name.is_empty() {
            return Err(LayoutError::InvalidCellName(name.into()));
        }
        Ok(self.new_cell(name, CellKind::Regular, IndexMap::new()))
    }

    /// Deletes a cell.
    ///
    /// While recording, library proxies are retired rather than released so
    /// that undo can restore them.
    pub fn delete_cell(&mut self, index: CellIndex) -> LayoutResult<()> {
        let transacting = self.transacting();
        let cell = self.cell(index).ok_or(LayoutError::NoSuchCell(index))?;
        if transacting {
            self.queue(LayoutOp::DeleteCell {
                index,
                cell: Box::new(cell.clone()),
            });
        }
        self.remove_cell(index, transacting);
        Ok(())
    }

    /// The shapes of `cell` on `layer`, if any were created.
    pub fn shapes(&self, cell: CellIndex, layer: LayerIndex) -> Option<&Shapes> {
        self.cell(cell)?.shapes(layer)
    }

    /// The shapes of `cell` on `layer`, created on first access.
    pub fn shapes_mut(
        &mut self,
        cell: CellIndex,
        layer: LayerIndex,
    ) -> LayoutResult<&mut Shapes> {
        if layer >= self.layers.len() {
            return Err(LayoutError::NoSuchLayer(layer));
        }
        let editable = self.config.editable;
        let space = self.space.clone();
        let manager = self.manager.clone();
        let containers = &mut self.containers;
        let index = cell;
        let cell = self
            .cells
            .get_mut(index)
            .and_then(Option::as_mut)
            .ok_or(LayoutError::NoSuchCell(index))?;
        Ok(cell.shapes.entry(layer).or_insert_with(|| {
            let mut shapes = Shapes::with_space(editable, space);
            shapes.set_manager(manager);
            containers.insert(shapes.id(), (index, layer));
            shapes
        }))
    }

    /// The bounding box of a cell's shapes.
    pub fn cell_bbox(&self, cell: CellIndex) -> Option<Rect> {
        self.cell(cell)?.bbox()
    }

    fn proxy_library(&self, lib_id: LibId) -> Option<Arc<Library>> {
        self.proxy_libs
            .get(&lib_id)
            .and_then(Weak::upgrade)
            .or_else(|| self.library_manager.as_ref()?.lib(lib_id))
    }

    /// Copies the shapes of a library cell into this layout's space.
    fn copy_cell_content(
        &mut self,
        source: &Layout,
        cell: CellIndex,
        target: CellIndex,
    ) -> LayoutResult<IndexMap<LayerIndex, Shapes>> {
        let src = source.cell(cell).ok_or(LayoutError::NoSuchCell(cell))?;
        let mut content = IndexMap::new();
        for (src_layer, src_shapes) in &src.shapes {
            let Some(info) = source.layer_info(*src_layer) else {
                continue;
            };
            let layer = match self.find_layer(info.layer, info.datatype) {
                Some(layer) => layer,
                None => self.insert_layer(info.clone()),
            };
            let mut shapes = Shapes::with_space(self.config.editable, self.space.clone());
            for (obj, prop_id) in src_shapes.objects() {
                let prop_id = prop_id.map(|p| self.properties.translate(&source.properties, p));
                shapes.insert_object(obj.translated(&self.space), prop_id);
            }
            shapes.update();
            shapes.set_manager(self.manager.clone());
            self.containers.insert(shapes.id(), (target, layer));
            content.insert(layer, shapes);
        }
        Ok(content)
    }

    /// Returns the cell standing in for `lib_cell` of `lib`, creating it
    /// if needed.
    ///
    /// The proxy receives a copy of the library cell's shapes and is
    /// registered with the library.
    pub fn get_lib_proxy(
        &mut self,
        lib: &Arc<Library>,
        lib_cell: CellIndex,
    ) -> LayoutResult<CellIndex> {
        let lib_id = lib
            .id()
            .ok_or_else(|| LayoutError::LibraryNotRegistered(lib.name().clone()))?;
        if let Some(&index) = self.lib_proxies.get(&(lib_id, lib_cell)) {
            return Ok(index);
        }

        let index = self.cells.len();
        let (name, content) = {
            let lib_layout = lib.layout();
            let name = lib_layout
                .cell(lib_cell)
                .ok_or_else(|| LayoutError::LibraryCellNotFound {
                    library: lib.name().clone(),
                    cell: arcstr::format!("#{lib_cell}"),
                })?
                .name()
                .clone();
            let content = self.copy_cell_content(&lib_layout, lib_cell, index)?;
            (name, content)
        };
        self.proxy_libs.insert(lib_id, Arc::downgrade(lib));
        let index = self.new_cell(&name, CellKind::LibraryProxy { lib_id, lib_cell }, content);
        lib.register_proxy(lib_cell, self);
        debug!(lib = %lib.name(), cell = %name, index, "created library proxy");
        Ok(index)
    }

    /// Adds a placeholder for a library cell that cannot be resolved now.
    ///
    /// The proxy is restored by [`Layout::restore_proxies`] once a matching
    /// library is registered.
    pub fn create_cold_proxy(&mut self, info: ProxyContextInfo) -> CellIndex {
        let name = info.cell_name.clone();
        let lib_name = info.lib_name.clone();
        let index = self.new_cell(&name, CellKind::ColdProxy(info), IndexMap::new());
        self.register_cold_proxy(&lib_name);
        index
    }

    fn register_cold_proxy(&self, lib_name: &ArcStr) {
        if let Some(library_manager) = &self.library_manager {
            library_manager.register_cold_proxy(lib_name.clone(), self.self_ref.clone());
        }
    }

    fn make_cold(&mut self, index: CellIndex, lib_name: ArcStr, cell_name: ArcStr) {
        if let Some(cell) = self.cells.get_mut(index).and_then(Option::as_mut) {
            cell.kind = CellKind::ColdProxy(ProxyContextInfo {
                lib_name: lib_name.clone(),
                cell_name,
            });
        }
        self.register_cold_proxy(&lib_name);
    }

    fn attach_proxy(
        &mut self,
        index: CellIndex,
        lib: &Arc<Library>,
        lib_cell: CellIndex,
    ) -> LayoutResult<()> {
        let Some(lib_id) = lib.id() else {
            return Ok(());
        };
        let content = {
            let lib_layout = lib.layout();
            self.copy_cell_content(&lib_layout, lib_cell, index)?
        };
        if let Some(cell) = self.cells.get_mut(index).and_then(Option::as_mut) {
            for shapes in cell.shapes.values() {
                self.containers.remove(&shapes.id());
            }
            cell.kind = CellKind::LibraryProxy { lib_id, lib_cell };
            cell.shapes = content;
        }
        self.lib_proxies.insert((lib_id, lib_cell), index);
        self.proxy_libs.insert(lib_id, Arc::downgrade(lib));
        lib.register_proxy(lib_cell, self);
        Ok(())
    }

    fn proxies_of(&self, lib_id: LibId) -> Vec<(CellIndex, CellIndex)> {
        self.cells()
            .filter_map(|(index, cell)| match cell.kind {
                CellKind::LibraryProxy {
                    lib_id: id,
                    lib_cell,
                } if id == lib_id => Some((index, lib_cell)),
                _ => None,
            })
            .collect()
    }

    /// Points the proxies into library `old` to the cells of the same name
    /// in `new`.
    ///
    /// Proxies whose cell does not exist in `new`, or all proxies if `new`
    /// is `None`, become cold proxies.
    pub fn remap_lib_proxies(&mut self, old: &Library, new: Option<&Arc<Library>>) {
        let Some(old_id) = old.id() else {
            return;
        };
        let proxies = self.proxies_of(old_id);
        if proxies.is_empty() {
            return;
        }
        debug!(lib = %old.name(), count = proxies.len(), "remapping library proxies");
        for (index, lib_cell) in proxies {
            self.lib_proxies.remove(&(old_id, lib_cell));
            old.unregister_proxy(lib_cell, self);
            let cell_name = old
                .layout()
                .cell(lib_cell)
                .map(|c| c.name().clone())
                .or_else(|| self.cell(index).map(|c| c.name().clone()))
                .unwrap_or_default();
            let target = new.and_then(|lib| {
                let lib_cell = lib.layout().cell_by_name(&cell_name)?;
                Some((lib, lib_cell))
            });
            match target {
                Some((lib, lib_cell)) => {
                    if let Err(err) = self.attach_proxy(index, lib, lib_cell) {
                        warn!(%err, cell = %cell_name, "failed to remap library proxy");
                        self.make_cold(index, old.name().clone(), cell_name);
                    }
                }
                None => {
                    if let Some(lib) = new {
                        warn!(
                            lib = %lib.name(),
                            cell = %cell_name,
                            "library cell vanished, keeping a cold proxy"
                        );
                    }
                    self.make_cold(index, old.name().clone(), cell_name);
                }
            }
        }
    }

    /// Copies the current content of `lib` into its proxies.
    pub fn refresh_lib_proxies(&mut self, lib: &Arc<Library>) {
        let Some(lib_id) = lib.id() else {
            return;
        };
        for (index, lib_cell) in self.proxies_of(lib_id) {
            let content = {
                let lib_layout = lib.layout();
                if lib_layout.cell(lib_cell).is_none() {
                    None
                } else {
                    Some(self.copy_cell_content(&lib_layout, lib_cell, index))
                }
            };
            match content {
                Some(Ok(content)) => {
                    if let Some(cell) = self.cells.get_mut(index).and_then(Option::as_mut) {
                        for shapes in cell.shapes.values() {
                            self.containers.remove(&shapes.id());
                        }
                        cell.shapes = content;
                    }
                }
                Some(Err(err)) => warn!(%err, index, "failed to refresh library proxy"),
                None => {
                    let cell_name = self.cell(index).map(|c| c.name().clone()).unwrap_or_default();
                    warn!(lib = %lib.name(), cell = %cell_name, "library cell vanished, keeping a cold proxy");
                    self.lib_proxies.remove(&(lib_id, lib_cell));
                    lib.unregister_proxy(lib_cell, self);
                    self.make_cold(index, lib.name().clone(), cell_name);
                }
            }
        }
    }

    /// Turns cold proxies whose library has become available back into
    /// library proxies.
    ///
    /// Returns the number of restored proxies.
    pub fn restore_proxies(&mut self, library_manager: &LibraryManager) -> usize {
        let technologies = self.technologies();
        let cold: Vec<(CellIndex, ProxyContextInfo)> = self
            .cells()
            .filter_map(|(index, cell)| match &cell.kind {
                CellKind::ColdProxy(info) => Some((index, info.clone())),
                _ => None,
            })
            .collect();
        let mut restored = 0;
        for (index, info) in cold {
            let Some(lib) = library_manager.lib_ptr_by_name(&info.lib_name, &technologies) else {
                continue;
            };
            let Some(lib_cell) = lib.layout().cell_by_name(&info.cell_name) else {
                continue;
            };
            match self.attach_proxy(index, &lib, lib_cell) {
                Ok(()) => restored += 1,
                Err(err) => warn!(%err, cell = %info.cell_name, "failed to restore cold proxy"),
            }
        }
        if restored > 0 {
            debug!(restored, "restored cold proxies");
        }
        restored
    }
}

#[cfg(test)]
mod tests;
