use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use arcstr::ArcStr;
use geometry::prelude::*;
use test_log::test;

use crate::*;

fn library(name: &str, techs: &[&str], cell: &str, rect: Rect) -> Arc<Library> {
    let mut layout = Layout::default();
    let layer = layout.insert_layer(LayerInfo::new(1, 0));
    let index = layout.add_cell(cell).unwrap();
    layout.shapes_mut(index, layer).unwrap().insert(rect);
    let lib = techs
        .iter()
        .fold(Library::new(name, layout), |lib, t| lib.with_technology(*t));
    Arc::new(lib)
}

fn techs(names: &[&str]) -> BTreeSet<ArcStr> {
    names.iter().map(|n| ArcStr::from(*n)).collect()
}

fn user_layout(manager: &Arc<LibraryManager>) -> SharedLayout {
    Layout::default()
        .with_library_manager(manager.clone())
        .into_shared()
}

#[test]
fn replacing_a_library_remaps_its_proxies() {
    let manager = Arc::new(LibraryManager::new());
    let l1 = library("X", &[], "INV", Rect::from_sides(0, 0, 10, 10));
    let id1 = manager.register_lib(&l1);

    let user = user_layout(&manager);
    let proxy = user.write().unwrap().get_lib_proxy(&l1, 0).unwrap();
    assert_eq!(l1.referrer_count(), 1);

    let l2 = library("X", &[], "INV", Rect::from_sides(0, 0, 20, 40));
    let id2 = manager.register_lib(&l2);
    assert_ne!(id1, id2);

    let found = manager.lib_ptr_by_name("X", &BTreeSet::new()).unwrap();
    assert!(Arc::ptr_eq(&found, &l2));
    assert_eq!(l1.id(), None);
    assert!(manager.lib(id1).is_none());
    assert_eq!(l1.referrer_count(), 0);
    assert_eq!(l2.refcount(0), 1);

    let user = user.read().unwrap();
    assert_eq!(
        user.cell(proxy).unwrap().kind(),
        &CellKind::LibraryProxy {
            lib_id: id2,
            lib_cell: 0
        }
    );
    assert_eq!(user.cell_bbox(proxy), Some(Rect::from_sides(0, 0, 20, 40)));
}

#[test]
fn replacement_without_the_cell_leaves_a_cold_proxy() {
    let manager = Arc::new(LibraryManager::new());
    let l1 = library("X", &[], "INV", Rect::from_sides(0, 0, 10, 10));
    manager.register_lib(&l1);
    let user = user_layout(&manager);
    let proxy = user.write().unwrap().get_lib_proxy(&l1, 0).unwrap();

    manager.register_lib(&library("X", &[], "NAND", Rect::from_sides(0, 0, 1, 1)));

    let kind = user.read().unwrap().cell(proxy).unwrap().kind().clone();
    assert_eq!(
        kind,
        CellKind::ColdProxy(ProxyContextInfo {
            lib_name: "X".into(),
            cell_name: "INV".into(),
        })
    );

    manager.register_lib(&library("X", &[], "INV", Rect::from_sides(0, 0, 3, 3)));
    let user = user.read().unwrap();
    assert!(matches!(
        user.cell(proxy).unwrap().kind(),
        CellKind::LibraryProxy { .. }
    ));
    assert_eq!(user.cell_bbox(proxy), Some(Rect::from_sides(0, 0, 3, 3)));
}

#[test]
fn cold_proxies_are_restored_on_registration() {
    let manager = Arc::new(LibraryManager::new());
    let user = user_layout(&manager);
    let cold = user.write().unwrap().create_cold_proxy(ProxyContextInfo {
        lib_name: "late".into(),
        cell_name: "BUF".into(),
    });

    let lib = library("late", &[], "BUF", Rect::from_sides(-5, -5, 5, 5));
    let id = manager.register_lib(&lib);

    let user = user.read().unwrap();
    assert_eq!(
        user.cell(cold).unwrap().kind(),
        &CellKind::LibraryProxy {
            lib_id: id,
            lib_cell: 0
        }
    );
    assert_eq!(user.cell_bbox(cold), Some(Rect::from_sides(-5, -5, 5, 5)));
    assert_eq!(lib.refcount(0), 1);
}

#[test]
fn unregistering_turns_proxies_cold() {
    let manager = Arc::new(LibraryManager::new());
    let lib = library("X", &[], "INV", Rect::from_sides(0, 0, 10, 10));
    manager.register_lib(&lib);
    let user = user_layout(&manager);
    let proxy = user.write().unwrap().get_lib_proxy(&lib, 0).unwrap();

    assert!(manager.unregister_lib(&lib));
    assert!(!manager.unregister_lib(&lib));
    assert_eq!(lib.id(), None);
    assert!(manager.lib_by_name("X", &BTreeSet::new()).is_none());
    assert!(matches!(
        user.read().unwrap().cell(proxy).unwrap().kind(),
        CellKind::ColdProxy(_)
    ));

    manager.register_lib(&lib);
    assert!(matches!(
        user.read().unwrap().cell(proxy).unwrap().kind(),
        CellKind::LibraryProxy { .. }
    ));
}

#[test]
fn retirement_needs_every_reference() {
    let lib = library("X", &[], "INV", Rect::from_sides(0, 0, 1, 1));
    let users: Vec<Layout> = (0..3).map(|_| Layout::default()).collect();
    for user in &users {
        lib.register_proxy(0, user);
    }
    assert_eq!(lib.referrer_count(), 3);

    lib.retire_proxy(0);
    lib.retire_proxy(0);
    assert!(!lib.is_retired(0));
    lib.retire_proxy(0);
    assert!(lib.is_retired(0));

    lib.unretire_proxy(0);
    assert!(!lib.is_retired(0));
    assert!(!lib.is_retired(1));
}

#[test]
fn lookup_prefers_matching_technologies() {
    let manager = LibraryManager::new();
    let tech = library("X", &["t1"], "A", Rect::from_sides(0, 0, 1, 1));
    let generic = library("X", &[], "A", Rect::from_sides(0, 0, 1, 1));
    let both = library("Y", &["t1", "t2"], "A", Rect::from_sides(0, 0, 1, 1));
    let tech_id = manager.register_lib(&tech);
    let generic_id = manager.register_lib(&generic);
    let both_id = manager.register_lib(&both);

    assert_eq!(manager.lib_by_name("X", &techs(&["t1"])), Some(tech_id));
    assert_eq!(manager.lib_by_name("X", &techs(&["t2"])), Some(generic_id));
    assert_eq!(manager.lib_by_name("X", &techs(&[])), Some(tech_id));
    assert_eq!(manager.lib_by_name("Y", &techs(&["t2", "t1"])), Some(both_id));
    assert_eq!(manager.lib_by_name("Y", &techs(&["t3"])), None);
    assert_eq!(manager.lib_by_name("Z", &techs(&[])), None);
    assert_eq!(manager.libraries().len(), 3);
}

#[test]
fn registration_is_idempotent() {
    let manager = LibraryManager::new();
    let lib = library("X", &[], "A", Rect::from_sides(0, 0, 1, 1));
    let id = manager.register_lib(&lib);
    let again = manager.reserve(&lib);
    assert!(!again.is_fresh());
    assert_eq!(manager.propagate(again), id);
    assert_eq!(manager.libraries().len(), 1);
}

#[test]
fn freed_ids_are_reused() {
    let manager = LibraryManager::new();
    let a = library("A", &[], "A", Rect::from_sides(0, 0, 1, 1));
    let b = library("B", &[], "B", Rect::from_sides(0, 0, 1, 1));
    let a_id = manager.register_lib(&a);
    manager.register_lib(&b);
    assert!(manager.delete_lib(a));

    let c = library("C", &[], "C", Rect::from_sides(0, 0, 1, 1));
    assert_eq!(manager.register_lib(&c), a_id);
}

#[test]
#[should_panic]
fn registering_under_a_foreign_id_panics() {
    let a = LibraryManager::new();
    let b = LibraryManager::new();
    let lib = library("X", &[], "A", Rect::from_sides(0, 0, 1, 1));
    a.register_lib(&lib);
    a.register_lib(&library("Y", &[], "A", Rect::from_sides(0, 0, 1, 1)));
    b.register_lib(&library("Z", &[], "A", Rect::from_sides(0, 0, 1, 1)));
    b.register_lib(&lib);
}

#[test]
fn listeners_observe_changes() {
    let manager = LibraryManager::new();
    let count = Arc::new(AtomicUsize::new(0));
    let seen = count.clone();
    manager.on_changed(move || {
        seen.fetch_add(1, Ordering::SeqCst);
    });

    let lib = library("X", &[], "A", Rect::from_sides(0, 0, 1, 1));
    manager.register_lib(&lib);
    manager.register_lib(&lib);
    manager.unregister_lib(&lib);
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[test]
fn listeners_may_call_back_into_the_manager() {
    let manager = Arc::new(LibraryManager::new());
    let lib = library("X", &[], "A", Rect::from_sides(0, 0, 1, 1));
    let weak = Arc::downgrade(&manager);
    let target = lib.clone();
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    manager.on_changed(move || {
        seen.fetch_add(1, Ordering::SeqCst);
        if let Some(manager) = weak.upgrade() {
            manager.unregister_lib(&target);
        }
    });
    let inner = calls.clone();
    manager.on_changed(move || {
        inner.fetch_add(1, Ordering::SeqCst);
    });

    manager.register_lib(&lib);
    assert_eq!(lib.id(), None);
    assert!(manager.libraries().is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[test]
fn clear_unregisters_everything() {
    let manager = LibraryManager::instance();
    assert!(Arc::ptr_eq(&manager, &LibraryManager::instance()));

    let lib = library("process_wide", &[], "A", Rect::from_sides(0, 0, 1, 1));
    manager.register_lib(&lib);
    manager.clear();
    assert_eq!(lib.id(), None);
    assert!(manager
        .lib_by_name("process_wide", &BTreeSet::new())
        .is_none());
}
