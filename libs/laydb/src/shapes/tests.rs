use geometry::prelude::*;
use test_log::test;

use super::*;
use crate::properties::{PropertiesRepository, PropertySet};
use crate::repository::{Interned, RegularArray};
use crate::shape::{BoxArray, PolygonRef, ShapeKind};
use crate::undo::Manager;

fn triangle() -> Polygon {
    Polygon::new(vec![Point::new(0, 0), Point::new(20, 0), Point::new(0, 20)])
}

fn replay(shapes: &mut Shapes, ops: Vec<Op>, inverse: bool) {
    for op in ops {
        if let Op::Shapes(id, op) = op {
            assert_eq!(id, shapes.id());
            if inverse {
                shapes.undo(&op);
            } else {
                shapes.redo(&op);
            }
        }
    }
}

#[test]
fn clearing_boxes_keeps_polygons() {
    let mut shapes = Shapes::new(true);
    let rect = Rect::from_sides(30, 30, 40, 40);
    shapes.insert(rect);
    shapes.insert(triangle());
    assert_eq!(shapes.len(), 2);
    let union = rect.union(triangle().bbox().unwrap());
    assert_eq!(union, Rect::from_sides(0, 0, 40, 40));
    assert_eq!(shapes.bbox(), Some(union));

    shapes.clear_flags(ShapeFlags::BOXES);

    assert_eq!(shapes.len(), 1);
    assert_eq!(shapes.iter_typed::<Rect>().count(), 0);
    assert_eq!(shapes.iter_typed::<Polygon>().next(), Some(&triangle()));
    assert_eq!(shapes.bbox(), Some(Rect::from_sides(0, 0, 20, 20)));
}

#[test]
fn find_respects_properties() {
    let mut props = PropertiesRepository::new();
    let pid = props.properties_id(PropertySet::from([("net".into(), "VDD".into())]));
    let rect = Rect::from_sides(0, 0, 10, 10);

    let mut shapes = Shapes::new(true);
    let shape = shapes.insert_with_props(rect, pid);
    assert!(shape.has_prop_id());
    assert_eq!(shapes.prop_id(&shape), Some(pid));

    assert_eq!(shapes.find(&ShapeObject::Box(rect), Some(pid)), Some(shape));
    assert_eq!(shapes.find(&ShapeObject::Box(rect), None), None);

    shapes.erase(&shape).unwrap();
    assert!(shapes.is_empty());
    assert!(!shapes.is_valid(&shape));
}

#[test]
fn erased_shapes_are_no_longer_found() {
    let mut shapes = Shapes::new(true);
    let objects = [
        ShapeObject::Box(Rect::from_sides(0, 0, 10, 10)),
        ShapeObject::Polygon(triangle()),
        ShapeObject::Text(Text::new("VDD", Trans::from_disp(Vector::new(5, 5)))),
    ];
    let handles: Vec<Shape> = objects
        .iter()
        .map(|obj| shapes.insert_object(obj.clone(), None))
        .collect();

    for (obj, handle) in objects.iter().zip(&handles) {
        assert_eq!(shapes.find(obj, None), Some(*handle));
        shapes.erase(handle).unwrap();
        assert_eq!(shapes.find(obj, None), None);
    }
    assert!(shapes.is_empty());
}

#[test]
fn find_does_not_match_across_properties() {
    let mut props = PropertiesRepository::new();
    let pid = props.properties_id(PropertySet::from([("net".into(), "VSS".into())]));
    let rect = Rect::from_sides(0, 0, 10, 10);

    let mut shapes = Shapes::new(true);
    let plain = shapes.insert(rect);
    assert_eq!(shapes.find(&ShapeObject::Box(rect), Some(pid)), None);

    let with_props = shapes.insert_with_props(rect, pid);
    assert_eq!(shapes.find(&ShapeObject::Box(rect), Some(pid)), Some(with_props));
    assert_eq!(shapes.find(&ShapeObject::Box(rect), None), Some(plain));

    shapes.erase(&plain).unwrap();
    assert_eq!(shapes.find(&ShapeObject::Box(rect), None), None);
    assert_eq!(shapes.find(&ShapeObject::Box(rect), Some(pid)), Some(with_props));
}

#[test]
fn erase_shapes_checks_every_handle_first() {
    let manager = Manager::shared();
    let mut shapes = Shapes::with_space(true, RepositorySpace::new()).with_manager(manager.clone());
    let a = shapes.insert(Rect::from_sides(0, 0, 10, 10));
    let b = shapes.insert(triangle());
    let foreign = Shapes::new(true).insert(Point::new(1, 1));

    lock(&manager).transaction("erase");
    assert!(matches!(
        shapes.erase_shapes(&[a, b, foreign]),
        Err(LayoutError::InvalidShape)
    ));
    assert_eq!(shapes.len(), 2);
    assert!(shapes.is_valid(&a) && shapes.is_valid(&b));

    shapes.erase_shapes(&[b, a, b]).unwrap();
    lock(&manager).commit();
    assert!(shapes.is_empty());

    let ops = lock(&manager).undo().unwrap();
    replay(&mut shapes, ops, true);
    assert_eq!(shapes.len(), 2);
}

#[test]
fn insert_from_another_space_reinterns() {
    let a = RepositorySpace::new();
    let b = RepositorySpace::new();
    let poly = triangle().translate(Vector::new(100, 50));

    let mut src = Shapes::with_space(true, a.clone());
    src.insert(PolygonRef::new(poly.clone(), &a));

    let mut dst = Shapes::with_space(true, b.clone());
    dst.insert_shapes(&src, ShapeFlags::ALL);

    let shape = dst.iter(ShapeFlags::ALL).next().unwrap();
    assert_eq!(shape.kind(), ShapeKind::PolygonRef);
    assert_eq!(dst.polygon(&shape), Some(poly));
    assert_eq!(Polygon::repository(b.shapes()).len(), 1);
}

#[test]
fn insert_into_standalone_dereferences() {
    let space = RepositorySpace::new();
    let mut src = Shapes::with_space(true, space.clone());
    src.insert(PolygonRef::new(triangle(), &space));
    src.insert(BoxArray::new(
        Rect::from_sides(0, 0, 5, 5),
        RegularArray::new(Vector::new(10, 0), Vector::new(0, 10), 2, 2),
        &space,
    ));

    let mut dst = Shapes::new(true);
    dst.insert_shapes(&src, ShapeFlags::ALL);

    assert_eq!(dst.iter_typed::<Polygon>().next(), Some(&triangle()));
    assert_eq!(dst.iter_typed::<BoxArray>().count(), 1);
    assert_eq!(dst.bbox(), src.bbox());
}

#[test]
fn insert_within_one_space_copies_layers() {
    let space = RepositorySpace::new();
    let mut src = Shapes::with_space(true, space.clone());
    for i in 0..4 {
        src.insert(Rect::from_sides(i * 10, 0, i * 10 + 5, 5));
    }
    src.insert(Point::new(3, 3));

    let mut dst = Shapes::with_space(true, space);
    dst.insert(Rect::from_sides(-10, -10, -5, -5));
    dst.insert_shapes(&src, ShapeFlags::BOXES);

    assert_eq!(dst.len(), 5);
    assert_eq!(dst.iter_typed::<Point>().count(), 0);
}

#[test]
fn undo_and_redo_of_inserts_and_erases() {
    let manager = Manager::shared();
    let mut shapes = Shapes::with_space(true, RepositorySpace::new()).with_manager(manager.clone());

    lock(&manager).transaction("insert");
    let a = shapes.insert(Rect::from_sides(0, 0, 10, 10));
    shapes.insert(Rect::from_sides(20, 0, 30, 10));
    lock(&manager).commit();

    lock(&manager).transaction("erase");
    shapes.erase(&a).unwrap();
    lock(&manager).commit();
    assert_eq!(shapes.len(), 1);

    let ops = lock(&manager).undo().unwrap();
    replay(&mut shapes, ops, true);
    assert_eq!(shapes.len(), 2);
    assert!(shapes
        .find(&Rect::from_sides(0, 0, 10, 10).into(), None)
        .is_some());

    let ops = lock(&manager).undo().unwrap();
    replay(&mut shapes, ops, true);
    assert!(shapes.is_empty());

    let ops = lock(&manager).redo().unwrap();
    replay(&mut shapes, ops, false);
    assert_eq!(shapes.len(), 2);
    assert_eq!(lock(&manager).available_redo(), Some("erase"));
}

#[test]
fn undo_of_clear_restores_layer_order() {
    let manager = Manager::shared();
    let mut shapes = Shapes::new(true).with_manager(manager.clone());
    shapes.insert(Rect::from_sides(0, 0, 10, 10));
    shapes.insert(triangle());
    shapes.insert(Edge::new(Point::new(0, 0), Point::new(5, 5)));
    let keys: Vec<LayerKey> = shapes.layer_keys().collect();

    lock(&manager).transaction("clear");
    shapes.clear();
    lock(&manager).commit();
    assert!(shapes.is_empty());

    let ops = lock(&manager).undo().unwrap();
    replay(&mut shapes, ops, true);
    assert_eq!(shapes.layer_keys().collect::<Vec<_>>(), keys);
    assert_eq!(shapes.len(), 3);
}

#[test]
fn changes_outside_transactions_are_not_recorded() {
    let manager = Manager::shared();
    let mut shapes = Shapes::new(true).with_manager(manager.clone());
    shapes.insert(Point::new(1, 1));
    assert!(lock(&manager).available_undo().is_none());
}

#[test]
fn non_editable_containers_reject_mutation() {
    let mut shapes = Shapes::new(false);
    let shape = shapes.insert(Rect::from_sides(0, 0, 10, 10));
    assert!(matches!(
        shapes.erase(&shape),
        Err(LayoutError::NotEditable { function: "erase" })
    ));
    assert!(matches!(
        shapes.transform_shape(&shape, &ICplxTrans::identity()),
        Err(LayoutError::NotEditable { function: "transform" })
    ));
    assert_eq!(shapes.len(), 1);
}

#[test]
fn handles_of_other_containers_are_rejected() {
    let mut a = Shapes::new(true);
    let mut b = Shapes::new(true);
    let shape = a.insert(Point::new(0, 0));
    b.insert(Point::new(0, 0));
    assert!(matches!(b.erase(&shape), Err(LayoutError::InvalidShape)));
    assert_eq!(b.object(&shape), None);
}

#[test]
fn arrays_cannot_be_inserted_transformed() {
    let space = RepositorySpace::new();
    let mut shapes = Shapes::with_space(true, space.clone());
    let array = BoxArray::new(
        Rect::from_sides(0, 0, 5, 5),
        RegularArray::new(Vector::new(10, 0), Vector::new(0, 10), 3, 2),
        &space,
    );
    let result = shapes.do_insert(
        &array.into(),
        None,
        &ICplxTrans::from_disp(Vector::new(1, 1)),
        |p| p,
    );
    assert!(matches!(result, Err(LayoutError::ArrayTransform)));
    assert!(shapes.is_empty());
}

#[test]
fn do_insert_maps_properties() {
    let mut source = PropertiesRepository::new();
    let mut target = PropertiesRepository::new();
    target.properties_id(PropertySet::from([("a".into(), "1".into())]));
    let pid = source.properties_id(PropertySet::from([("b".into(), "2".into())]));

    let mut shapes = Shapes::new(true);
    let shape = shapes
        .do_insert(
            &Point::new(1, 2).into(),
            Some(pid),
            &ICplxTrans::from_disp(Vector::new(10, 0)),
            target.pid_map(&source),
        )
        .unwrap();

    let mapped = shapes.prop_id(&shape).unwrap();
    assert_eq!(target.properties(mapped), source.properties(pid));
    assert_eq!(shapes.object(&shape), Some(Point::new(11, 2).into()));
}

#[test]
fn array_members_are_addressable() {
    let space = RepositorySpace::new();
    let mut shapes = Shapes::with_space(true, space.clone());
    let shape = shapes.insert(BoxArray::new(
        Rect::from_sides(0, 0, 5, 5),
        RegularArray::new(Vector::new(10, 0), Vector::new(0, 10), 3, 2),
        &space,
    ));
    let members = shapes.array_members(&shape);
    assert_eq!(members.len(), 6);
    assert_eq!(
        shapes.object(&members[1]),
        Some(Rect::from_sides(10, 0, 15, 5).into())
    );
    assert_eq!(
        shapes.shape_bbox(&members[5]),
        Some(Rect::from_sides(20, 10, 25, 15))
    );
    assert_eq!(shapes.shape_bbox(&shape), Some(Rect::from_sides(0, 0, 25, 15)));
}

#[test]
#[should_panic]
fn erasing_an_array_member_panics() {
    let space = RepositorySpace::new();
    let mut shapes = Shapes::with_space(true, space.clone());
    let shape = shapes.insert(BoxArray::new(
        Rect::from_sides(0, 0, 5, 5),
        RegularArray::new(Vector::new(10, 0), Vector::new(0, 10), 2, 1),
        &space,
    ));
    let member = shapes.array_members(&shape)[0];
    let _ = shapes.erase(&member);
}

#[test]
fn replace_with_another_kind_reinserts() {
    let mut shapes = Shapes::new(true);
    let shape = shapes.insert(Rect::from_sides(0, 0, 10, 10));
    let new = shapes.replace(&shape, triangle().into(), None).unwrap();
    assert_eq!(new.kind(), ShapeKind::Polygon);
    assert!(!shapes.is_valid(&shape));
    assert_eq!(shapes.len(), 1);

    let same = shapes
        .replace(&new, Polygon::from(Rect::from_sides(0, 0, 1, 1)).into(), None)
        .unwrap();
    assert_eq!(same, new);
}

#[test]
fn rotating_a_box_off_axis_yields_a_polygon() {
    let mut shapes = Shapes::new(true);
    let shape = shapes.insert(Rect::from_sides(0, 0, 10, 10));

    let rotated = shapes
        .transform_shape(&shape, &ICplxTrans::new(1., 90., false, Vector::zero()))
        .unwrap();
    assert_eq!(rotated.kind(), ShapeKind::Box);
    assert_eq!(shapes.shape_bbox(&rotated), Some(Rect::from_sides(-10, 0, 0, 10)));

    let tilted = shapes
        .transform_shape(&rotated, &ICplxTrans::new(1., 45., false, Vector::zero()))
        .unwrap();
    assert_eq!(tilted.kind(), ShapeKind::Polygon);
    assert_eq!(shapes.len(), 1);
}

#[test]
fn dirty_state_follows_mutation_and_update() {
    let mut shapes = Shapes::new(true);
    assert!(!shapes.is_bbox_dirty());

    shapes.insert(Rect::from_sides(0, 0, 10, 10));
    assert!(shapes.is_bbox_dirty());
    assert_eq!(shapes.bbox(), Some(Rect::from_sides(0, 0, 10, 10)));
    assert!(shapes.is_bbox_dirty());

    shapes.update();
    assert!(!shapes.is_bbox_dirty());

    let mut other = Shapes::new(true);
    other.update();
    shapes.swap(&mut other);
    assert!(shapes.is_bbox_dirty());
    assert!(other.is_bbox_dirty());
    assert!(shapes.is_empty());
    assert_eq!(other.len(), 1);
}

#[test]
fn touching_selects_by_region_and_kind() {
    let mut shapes = Shapes::new(true);
    for i in 0..10 {
        shapes.insert(Rect::from_sides(i * 10, 0, i * 10 + 5, 5));
    }
    shapes.insert(Point::new(32, 2));
    shapes.update();

    let region = Rect::from_sides(26, 0, 44, 5);
    assert_eq!(shapes.touching(&region, ShapeFlags::ALL).len(), 3);
    assert_eq!(shapes.touching(&region, ShapeFlags::BOXES).len(), 2);
}

#[test]
fn transforming_all_shapes_expands_arrays() {
    let space = RepositorySpace::new();
    let mut shapes = Shapes::with_space(true, space.clone());
    shapes.insert(BoxArray::new(
        Rect::from_sides(0, 0, 5, 5),
        RegularArray::new(Vector::new(10, 0), Vector::new(0, 10), 2, 1),
        &space,
    ));
    shapes
        .transform(&ICplxTrans::from_disp(Vector::new(0, 100)))
        .unwrap();
    assert_eq!(shapes.iter_typed::<Rect>().count(), 2);
    assert_eq!(shapes.bbox(), Some(Rect::from_sides(0, 100, 15, 105)));
}
