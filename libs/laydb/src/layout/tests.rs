use std::sync::Arc;

use approx::assert_relative_eq;
use geometry::prelude::*;
use test_log::test;

use super::*;
use crate::undo::Manager;

fn recorded() -> Layout {
    Layout::new(LayoutConfig::default()).with_manager(Manager::shared())
}

fn inv_library(name: &str, rect: Rect) -> Arc<Library> {
    let mut layout = Layout::default();
    let layer = layout.insert_layer(LayerInfo::new(1, 0).with_name("metal1"));
    let cell = layout.add_cell("INV").unwrap();
    layout.shapes_mut(cell, layer).unwrap().insert(rect);
    Arc::new(Library::new(name, layout))
}

#[test]
fn configuration_is_read_from_toml() {
    let config = LayoutConfig::from_toml_str("dbu = 0.005\ntechnology = \"sky130\"").unwrap();
    assert!(config.editable);
    assert_relative_eq!(config.dbu, 0.005);

    let layout = Layout::new(config);
    assert_eq!(layout.technologies().len(), 1);
    assert!(matches!(
        LayoutConfig::from_toml_str("dbu = \"fine\""),
        Err(LayoutError::Config(_))
    ));
}

#[test]
fn cell_names_are_unique() {
    let mut layout = Layout::default();
    let a = layout.add_cell("A").unwrap();
    let b = layout.add_cell("A").unwrap();
    assert_eq!(layout.cell(b).unwrap().name(), "A$1");
    assert_eq!(layout.cell_by_name("A"), Some(a));
    assert!(matches!(
        layout.add_cell(""),
        Err(LayoutError::InvalidCellName(_))
    ));
    assert_eq!(layout.cell_count(), 2);
}

#[test]
fn shapes_require_existing_cells_and_layers() {
    let mut layout = Layout::default();
    let cell = layout.add_cell("TOP").unwrap();
    assert!(matches!(
        layout.shapes_mut(cell, 0),
        Err(LayoutError::NoSuchLayer(0))
    ));
    let layer = layout.insert_layer(LayerInfo::new(1, 0));
    assert!(matches!(
        layout.shapes_mut(7, layer),
        Err(LayoutError::NoSuchCell(7))
    ));
    assert!(layout.shapes(cell, layer).is_none());

    let shapes = layout.shapes_mut(cell, layer).unwrap();
    assert!(shapes.space().is_some());
    shapes.insert(Rect::from_sides(0, 0, 10, 10));
    assert_eq!(layout.cell_bbox(cell), Some(Rect::from_sides(0, 0, 10, 10)));
    assert_eq!(layout.find_layer(1, 0), Some(layer));
}

#[test]
fn undo_requires_a_manager() {
    let mut layout = Layout::default();
    assert!(matches!(layout.undo(), Err(LayoutError::NoManager)));
    assert!(!recorded().undo().unwrap());
}

#[test]
fn cell_creation_is_undone_with_its_shapes() {
    let mut layout = recorded();
    let layer = layout.insert_layer(LayerInfo::new(1, 0));

    layout.transaction("create").unwrap();
    let cell = layout.add_cell("TOP").unwrap();
    layout
        .shapes_mut(cell, layer)
        .unwrap()
        .insert(Rect::from_sides(0, 0, 10, 10));
    layout.commit().unwrap();

    assert!(layout.undo().unwrap());
    assert!(layout.cell(cell).is_none());
    assert_eq!(layout.cell_by_name("TOP"), None);

    assert!(layout.redo().unwrap());
    assert_eq!(layout.cell_by_name("TOP"), Some(cell));
    assert_eq!(layout.cell_bbox(cell), Some(Rect::from_sides(0, 0, 10, 10)));
}

#[test]
fn deleted_cells_come_back_on_undo() {
    let mut layout = recorded();
    let layer = layout.insert_layer(LayerInfo::new(1, 0));
    let cell = layout.add_cell("TOP").unwrap();
    layout
        .shapes_mut(cell, layer)
        .unwrap()
        .insert(triangle_at(5));

    layout.transaction("delete").unwrap();
    layout.delete_cell(cell).unwrap();
    layout.commit().unwrap();
    assert!(layout.cell(cell).is_none());
    assert!(matches!(
        layout.delete_cell(cell),
        Err(LayoutError::NoSuchCell(_))
    ));

    layout.undo().unwrap();
    assert_eq!(layout.cell(cell).unwrap().name(), "TOP");
    assert_eq!(layout.cell_bbox(cell), Some(Rect::from_sides(5, 5, 25, 25)));

    // Shapes of the restored cell are still recorded.
    layout.transaction("insert").unwrap();
    layout
        .shapes_mut(cell, layer)
        .unwrap()
        .insert(Point::new(100, 100));
    layout.commit().unwrap();
    layout.undo().unwrap();
    assert_eq!(layout.shapes(cell, layer).unwrap().len(), 1);
}

#[test]
fn deleted_cells_release_their_containers() {
    let mut layout = Layout::default();
    let layer = layout.insert_layer(LayerInfo::new(1, 0));
    for _ in 0..4 {
        let cell = layout.add_cell("TMP").unwrap();
        layout
            .shapes_mut(cell, layer)
            .unwrap()
            .insert(Rect::from_sides(0, 0, 1, 1));
        layout.delete_cell(cell).unwrap();
    }
    assert!(layout.containers.is_empty());

    // Recorded deletions keep them for undo.
    let mut layout = recorded();
    let layer = layout.insert_layer(LayerInfo::new(1, 0));
    let cell = layout.add_cell("TOP").unwrap();
    let id = layout.shapes_mut(cell, layer).unwrap().id();
    layout.transaction("delete").unwrap();
    layout.delete_cell(cell).unwrap();
    layout.commit().unwrap();
    assert_eq!(layout.containers.get(&id), Some(&(cell, layer)));
}

fn triangle_at(o: i64) -> Polygon {
    Polygon::new(vec![
        Point::new(o, o),
        Point::new(o + 20, o),
        Point::new(o, o + 20),
    ])
}

#[test]
fn cancel_reverts_the_open_transaction() {
    let mut layout = recorded();
    layout.transaction("scratch").unwrap();
    let cell = layout.add_cell("TMP").unwrap();
    layout.cancel().unwrap();
    assert!(layout.cell(cell).is_none());
    assert!(!layout.undo().unwrap());
}

#[test]
fn library_proxies_copy_and_share_cells() {
    let manager = Arc::new(LibraryManager::new());
    let lib = inv_library("stdcells", Rect::from_sides(0, 0, 4, 8));
    let id = manager.register_lib(&lib);
    let lib_cell = lib.layout().cell_by_name("INV").unwrap();

    let mut layout = Layout::default().with_library_manager(manager);
    let proxy = layout.get_lib_proxy(&lib, lib_cell).unwrap();
    assert_eq!(layout.get_lib_proxy(&lib, lib_cell).unwrap(), proxy);

    let cell = layout.cell(proxy).unwrap();
    assert!(cell.is_proxy());
    assert_eq!(cell.kind(), &CellKind::LibraryProxy { lib_id: id, lib_cell });
    assert_eq!(layout.cell_bbox(proxy), Some(Rect::from_sides(0, 0, 4, 8)));
    let layer = layout.find_layer(1, 0).unwrap();
    assert_eq!(layout.layer_info(layer).unwrap().name.as_deref(), Some("metal1"));
    assert_eq!(lib.refcount(lib_cell), 1);
}

#[test]
fn unregistered_libraries_cannot_be_referenced() {
    let lib = inv_library("loose", Rect::from_sides(0, 0, 1, 1));
    let mut layout = Layout::default();
    assert!(matches!(
        layout.get_lib_proxy(&lib, 0),
        Err(LayoutError::LibraryNotRegistered(_))
    ));
}

#[test]
fn deleting_a_proxy_retires_it_until_undo() {
    let manager = Arc::new(LibraryManager::new());
    let lib = inv_library("stdcells", Rect::from_sides(0, 0, 4, 8));
    manager.register_lib(&lib);

    let mut layout = recorded().with_library_manager(manager);
    let proxy = layout.get_lib_proxy(&lib, 0).unwrap();

    layout.transaction("delete proxy").unwrap();
    layout.delete_cell(proxy).unwrap();
    layout.commit().unwrap();
    assert!(lib.is_retired(0));

    layout.undo().unwrap();
    assert!(!lib.is_retired(0));
    assert_eq!(layout.get_lib_proxy(&lib, 0).unwrap(), proxy);

    assert_eq!(lib.refcount(0), 1);
    layout.delete_cell(proxy).unwrap();
    assert_eq!(lib.refcount(0), 0);
}

#[test]
fn cold_proxies_keep_their_context() {
    let mut layout = Layout::default();
    let info = ProxyContextInfo {
        lib_name: "missing".into(),
        cell_name: "NAND2".into(),
    };
    let cold = layout.create_cold_proxy(info.clone());
    assert_eq!(layout.cell(cold).unwrap().kind(), &CellKind::ColdProxy(info));
    assert_eq!(layout.cell_by_name("NAND2"), Some(cold));
    assert_eq!(layout.restore_proxies(&LibraryManager::new()), 0);
}
