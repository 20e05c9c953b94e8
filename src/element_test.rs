#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use serde_json::json;

use super::*;

fn make_rect(seed: u32) -> Element {
    Element::new(ElementData::Rectangle { seed }, Point::new(0.0, 0.0), Size::new(100.0, 80.0), ElementOptions::default())
}

fn make_line(points: &[(f64, f64)]) -> Element {
    Element::new(
        ElementData::Line { points: points.iter().map(|(x, y)| Point::new(*x, *y)).collect(), seed: 7 },
        Point::new(10.0, 10.0),
        Size::default(),
        ElementOptions::default(),
    )
}

// =============================================================
// Shape classification
// =============================================================

#[test]
fn classify_every_shape() {
    let cases = [
        (Shape::Selection, ShapeKind::Generic),
        (Shape::Rectangle, ShapeKind::Generic),
        (Shape::Ellipse, ShapeKind::Generic),
        (Shape::Line, ShapeKind::Linear),
        (Shape::Arrow, ShapeKind::Linear),
        (Shape::Freedraw, ShapeKind::Freedraw),
        (Shape::Text, ShapeKind::Text),
        (Shape::Image, ShapeKind::Image),
    ];
    for (shape, kind) in cases {
        assert_eq!(shape.kind(), kind, "{shape:?}");
    }
}

#[test]
fn seeded_shapes() {
    assert!(Shape::Rectangle.has_seed());
    assert!(Shape::Ellipse.has_seed());
    assert!(Shape::Line.has_seed());
    assert!(Shape::Arrow.has_seed());
    assert!(!Shape::Freedraw.has_seed());
    assert!(!Shape::Text.has_seed());
    assert!(!Shape::Image.has_seed());
    assert!(!Shape::Selection.has_seed());
}

#[test]
fn point_based_shapes() {
    assert!(Shape::Line.is_point_based());
    assert!(Shape::Freedraw.is_point_based());
    assert!(!Shape::Rectangle.is_point_based());
    assert!(!Shape::Text.is_point_based());
}

// =============================================================
// Serde
// =============================================================

#[test]
fn element_serializes_flat_with_shape_tag() {
    let mut el = make_rect(42);
    el.group_ids.push(uuid::Uuid::nil());
    let value = serde_json::to_value(&el).unwrap();
    assert_eq!(value["shape"], json!("rectangle"));
    assert_eq!(value["seed"], json!(42));
    assert_eq!(value["status"], json!("idle"));
    assert_eq!(value["size"], json!({ "width": 100.0, "height": 80.0 }));
    assert_eq!(value["groupIds"], json!([uuid::Uuid::nil()]));
    assert_eq!(value["options"]["strokeColor"], json!("#000000"));
}

#[test]
fn text_element_uses_camel_case_fields() {
    let el = Element::new(
        ElementData::Text { text: "hello".into(), font_family: FontFamily::Monospace, font_size: 24.0 },
        Point::new(0.0, 0.0),
        Size::new(10.0, 10.0),
        ElementOptions::default(),
    );
    let value = serde_json::to_value(&el).unwrap();
    assert_eq!(value["shape"], json!("text"));
    assert_eq!(value["fontFamily"], json!("monospace"));
    assert_eq!(value["fontSize"], json!(24.0));
    let back: Element = serde_json::from_value(value).unwrap();
    assert_eq!(back, el);
}

#[test]
fn element_deserializes_without_group_ids() {
    let value = json!({
        "id": uuid::Uuid::new_v4(),
        "point": { "x": 1.0, "y": 2.0 },
        "size": { "width": 3.0, "height": 4.0 },
        "status": "selected",
        "options": {},
        "shape": "ellipse",
        "seed": 9,
    });
    let el: Element = serde_json::from_value(value).unwrap();
    assert_eq!(el.shape(), Shape::Ellipse);
    assert!(el.group_ids.is_empty());
    assert!(el.is_selected());
    assert_eq!(el.options, ElementOptions::default());
}

#[test]
fn options_serde_enums() {
    let options = ElementOptions { fill_style: FillStyle::CrossHatch, font_size: FontSize::ExtraLarge, ..Default::default() };
    let value = serde_json::to_value(&options).unwrap();
    assert_eq!(value["fillStyle"], json!("cross-hatch"));
    assert_eq!(value["fontSize"], json!("extra-large"));
}

// =============================================================
// Status lifecycle
// =============================================================

#[test]
fn status_select_unselect_roundtrip() {
    let mut el = make_rect(1);
    el.select();
    assert!(el.is_selected());
    el.unselect();
    assert_eq!(el.status, ElementStatus::Idle);
}

#[test]
fn deleted_is_terminal() {
    let mut el = make_rect(1);
    el.delete();
    el.select();
    assert!(el.is_deleted());
    el.unselect();
    assert!(el.is_deleted());
}

// =============================================================
// Geometry helpers
// =============================================================

#[test]
fn absolute_points_roundtrip() {
    let mut el = make_line(&[(0.0, 0.0), (30.0, 40.0)]);
    assert_eq!(el.absolute_points(), vec![Point::new(10.0, 10.0), Point::new(40.0, 50.0)]);
    el.set_absolute_points(&[Point::new(-5.0, 0.0), Point::new(5.0, 20.0), Point::new(0.0, -10.0)]);
    assert_eq!(el.point, Point::new(-5.0, 0.0));
    assert_eq!(el.points().unwrap()[0], Point::new(0.0, 0.0));
    assert_eq!(el.size, Size::new(10.0, 30.0));
}

#[test]
fn sync_size_from_points_measures_extent() {
    let mut el = make_line(&[(0.0, 0.0), (-20.0, 5.0), (10.0, -15.0)]);
    el.sync_size_from_points();
    assert_eq!(el.size, Size::new(30.0, 20.0));
}

#[test]
fn seed_accessors() {
    let mut el = make_rect(3);
    assert_eq!(el.seed(), Some(3));
    el.set_seed(11);
    assert_eq!(el.seed(), Some(11));
    let free = Element::new(ElementData::Freedraw { points: vec![] }, Point::default(), Size::default(), ElementOptions::default());
    assert_eq!(free.seed(), None);
}

#[test]
fn top_group_is_last_token() {
    let mut el = make_rect(1);
    assert!(el.top_group().is_none());
    let (inner, outer) = (uuid::Uuid::new_v4(), uuid::Uuid::new_v4());
    el.group_ids = vec![inner, outer];
    assert_eq!(el.top_group(), Some(outer));
}

#[test]
fn zero_size_detection() {
    assert!(Size::new(0.0, 0.0).is_zero());
    assert!(!Size::new(0.0, 1.0).is_zero());
}

// =============================================================
// ElementStore
// =============================================================

#[test]
fn store_insert_keeps_draw_order() {
    let mut store = ElementStore::new();
    let (a, b, c) = (make_rect(1), make_rect(2), make_rect(3));
    let ids = [a.id, b.id, c.id];
    store.insert(a);
    store.insert(b);
    store.insert(c);
    let order: Vec<ElementId> = store.iter().map(|e| e.id).collect();
    assert_eq!(order, ids);
}

#[test]
fn store_replace_keeps_position() {
    let mut store = ElementStore::new();
    let (a, b) = (make_rect(1), make_rect(2));
    let a_id = a.id;
    store.insert(a.clone());
    store.insert(b);
    let mut moved = a;
    moved.point = Point::new(9.0, 9.0);
    store.insert(moved);
    assert_eq!(store.len(), 2);
    assert_eq!(store.iter().next().unwrap().id, a_id);
    assert_eq!(store.get(&a_id).unwrap().point, Point::new(9.0, 9.0));
}

#[test]
fn store_tracks_seeds() {
    let mut store = ElementStore::new();
    let a = make_rect(5);
    let id = a.id;
    store.insert(a);
    assert!(store.seed_in_use(5));
    store.remove(&id);
    assert!(!store.seed_in_use(5));
}

#[test]
fn store_selection_helpers() {
    let mut store = ElementStore::new();
    let (a, b) = (make_rect(1), make_rect(2));
    let (a_id, b_id) = (a.id, b.id);
    store.insert(a);
    store.insert(b);
    store.select_only(&HashSet::from([b_id]));
    assert_eq!(store.selected_ids(), vec![b_id]);
    assert_eq!(store.selected_count(), 1);
    store.unselect_all();
    assert_eq!(store.selected_count(), 0);
    assert!(store.contains(&a_id));
}

#[test]
fn store_compact_drops_deleted_and_undrawn() {
    let mut store = ElementStore::new();
    let keep = make_rect(1);
    let mut gone = make_rect(2);
    gone.delete();
    let empty = Element::new(ElementData::Ellipse { seed: 3 }, Point::default(), Size::default(), ElementOptions::default());
    let keep_id = keep.id;
    store.insert(keep);
    store.insert(gone);
    store.insert(empty);
    assert_eq!(store.compact(), 2);
    assert_eq!(store.len(), 1);
    assert!(store.contains(&keep_id));
    assert!(!store.seed_in_use(2));
}

#[test]
fn store_live_skips_deleted() {
    let mut store = ElementStore::new();
    let mut gone = make_rect(1);
    gone.delete();
    store.insert(gone);
    store.insert(make_rect(2));
    assert_eq!(store.live().count(), 1);
    assert_eq!(store.iter().count(), 2);
}

#[test]
fn store_snapshot_and_load() {
    let mut store = ElementStore::new();
    store.insert(make_rect(1));
    store.insert(make_rect(2));
    let snapshot = store.snapshot();

    let mut other = ElementStore::new();
    other.insert(make_rect(99));
    other.load(snapshot.clone());
    assert_eq!(other.snapshot(), snapshot);
    assert!(other.seed_in_use(1));
    assert!(!other.seed_in_use(99));
}

#[test]
fn store_default_is_empty() {
    let store = ElementStore::default();
    assert!(store.is_empty());
    assert_eq!(store.len(), 0);
}
