#![allow(clippy::float_cmp)]

use super::*;
use crate::collab::FixedWidthMeasurer;
use crate::element::{ElementOptions, FontFamily};

fn rect(x: f64, y: f64, w: f64, h: f64) -> Element {
    Element::new(ElementData::Rectangle { seed: 1 }, Point::new(x, y), Size::new(w, h), ElementOptions::default())
}

fn line(points: &[(f64, f64)]) -> Element {
    let mut el = Element::new(
        ElementData::Line { points: Vec::new(), seed: 1 },
        Point::default(),
        Size::default(),
        ElementOptions::default(),
    );
    let abs: Vec<Point> = points.iter().map(|(x, y)| Point::new(*x, *y)).collect();
    el.set_absolute_points(&abs);
    el
}

fn text(x: f64, y: f64, content: &str, font_size: f64) -> Element {
    let measured = FixedWidthMeasurer.measure(&TextMeasureRequest {
        font_family: FontFamily::Monospace,
        font_size,
        line_height: font_size * LINE_HEIGHT_RATIO,
        text: content,
        dpr: 1.0,
    });
    Element::new(
        ElementData::Text { text: content.into(), font_family: FontFamily::Monospace, font_size },
        Point::new(x, y),
        measured.canvas_size(1.0),
        ElementOptions::default(),
    )
}

fn p(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn approx(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
}

// =============================================================
// Direction model
// =============================================================

#[test]
fn diagonal_and_orthogonal_partition() {
    let diagonal = Direction::ALL.iter().filter(|d| d.is_diagonal()).count();
    let orthogonal = Direction::ALL.iter().filter(|d| d.is_orthogonal()).count();
    assert_eq!((diagonal, orthogonal), (4, 4));
}

#[test]
fn direction_serde_kebab() {
    assert_eq!(serde_json::to_string(&Direction::UpLeft).unwrap(), "\"up-left\"");
    assert_eq!(serde_json::from_str::<Direction>("\"right\"").unwrap(), Direction::Right);
}

#[test]
fn small_selection_offers_corners_only() {
    let dirs = available_directions(Size::new(20.0, 200.0), true, 30.0);
    assert_eq!(dirs.len(), 4);
    assert!(dirs.iter().all(|d| d.is_diagonal()));
}

#[test]
fn large_selection_offers_all_handles() {
    assert_eq!(available_directions(Size::new(200.0, 200.0), true, 30.0).len(), 8);
    assert_eq!(available_directions(Size::new(200.0, 200.0), false, 30.0).len(), 4);
}

#[test]
fn handle_points_sit_on_bounds() {
    let b = Bounds { min_x: 0.0, min_y: 0.0, max_x: 100.0, max_y: 50.0 };
    assert_eq!(Direction::Down.handle_point(&b), p(50.0, 50.0));
    assert_eq!(Direction::Left.handle_point(&b), p(0.0, 25.0));
    assert_eq!(Direction::UpRight.handle_point(&b), p(100.0, 0.0));
}

// =============================================================
// Fixed point and quadrants
// =============================================================

#[test]
fn fixed_point_is_opposite_corner() {
    let b = Bounds { min_x: 10.0, min_y: 20.0, max_x: 110.0, max_y: 70.0 };
    assert_eq!(fixed_point(&b, Direction::DownRight), p(10.0, 20.0));
    assert_eq!(fixed_point(&b, Direction::DownLeft), p(110.0, 20.0));
    assert_eq!(fixed_point(&b, Direction::UpRight), p(10.0, 70.0));
    assert_eq!(fixed_point(&b, Direction::UpLeft), p(110.0, 70.0));
}

#[test]
fn fixed_point_for_edges() {
    let b = Bounds { min_x: 10.0, min_y: 20.0, max_x: 110.0, max_y: 70.0 };
    assert_eq!(fixed_point(&b, Direction::Down).y, 20.0);
    assert_eq!(fixed_point(&b, Direction::Up).y, 70.0);
    assert_eq!(fixed_point(&b, Direction::Right).x, 10.0);
    assert_eq!(fixed_point(&b, Direction::Left).x, 110.0);
}

#[test]
fn fixed_point_of_line_uses_bounding_box() {
    let el = line(&[(50.0, 50.0), (10.0, 90.0), (80.0, 60.0)]);
    assert_eq!(element_fixed_point(&el, Direction::DownRight), p(10.0, 50.0));
    assert_eq!(element_fixed_point(&el, Direction::UpLeft), p(80.0, 90.0));
}

#[test]
fn quadrants() {
    let f = p(0.0, 0.0);
    assert_eq!(quadrant(p(5.0, 5.0), f), Direction::DownRight);
    assert_eq!(quadrant(p(-5.0, 5.0), f), Direction::DownLeft);
    assert_eq!(quadrant(p(5.0, -5.0), f), Direction::UpRight);
    assert_eq!(quadrant(p(-5.0, -5.0), f), Direction::UpLeft);
    assert_eq!(quadrant(f, f), Direction::DownRight);
}

#[test]
fn effective_direction_flips_edges() {
    let f = p(10.0, 10.0);
    assert_eq!(effective_direction(Direction::Down, p(99.0, 20.0), f), Direction::Down);
    assert_eq!(effective_direction(Direction::Down, p(99.0, 0.0), f), Direction::Up);
    assert_eq!(effective_direction(Direction::Left, p(20.0, -99.0), f), Direction::Right);
    assert_eq!(effective_direction(Direction::UpLeft, p(20.0, 20.0), f), Direction::DownRight);
}

// =============================================================
// Generic resize
// =============================================================

#[test]
fn diagonal_resize_spans_pointer_and_anchor() {
    let mut el = rect(10.0, 10.0, 100.0, 50.0);
    let fixed = element_fixed_point(&el, Direction::DownRight);
    resize_generic(&mut el, Direction::DownRight, p(210.0, 110.0), fixed);
    assert_eq!(el.point, p(10.0, 10.0));
    assert_eq!(el.size, Size::new(200.0, 100.0));
}

#[test]
fn diagonal_resize_drags_through_anchor() {
    let mut el = rect(10.0, 10.0, 100.0, 50.0);
    let fixed = element_fixed_point(&el, Direction::DownRight);
    resize_generic(&mut el, Direction::DownRight, p(0.0, 0.0), fixed);
    assert_eq!(el.point, p(0.0, 0.0));
    assert_eq!(el.size, Size::new(10.0, 10.0));
}

#[test]
fn orthogonal_resize_touches_one_axis() {
    let mut el = rect(10.0, 10.0, 100.0, 50.0);
    let fixed = element_fixed_point(&el, Direction::Right);
    resize_generic(&mut el, Direction::Right, p(300.0, 999.0), fixed);
    assert_eq!(el.point, p(10.0, 10.0));
    assert_eq!(el.size, Size::new(290.0, 50.0));

    let fixed = element_fixed_point(&el, Direction::Up);
    resize_generic(&mut el, Direction::Up, p(-50.0, -40.0), fixed);
    assert_eq!(el.point, p(10.0, -40.0));
    assert_eq!(el.size, Size::new(290.0, 100.0));
}

#[test]
fn anchor_never_moves_for_any_direction() {
    let ticks = [p(300.0, 250.0), p(-80.0, 400.0), p(-200.0, -150.0), p(120.0, -60.0), p(55.0, 35.0)];
    for direction in Direction::ALL {
        let mut el = rect(10.0, 10.0, 100.0, 50.0);
        let fixed = element_fixed_point(&el, direction);
        let origin = ResizeOrigin::capture(Some(&el), direction.handle_point(&bounding_box(&el)));
        for current in ticks {
            resize_element(&mut el, direction, &origin, current, fixed, &FixedWidthMeasurer, 1.0);
            let live = effective_direction(direction, current, fixed);
            let after = element_fixed_point(&el, live);
            assert!(approx(after, fixed), "{direction:?}: anchor moved from {fixed:?} to {after:?}");
        }
    }
}

// =============================================================
// Point-based resize
// =============================================================

#[test]
fn point_based_scales_offsets() {
    let mut el = line(&[(0.0, 0.0), (100.0, 50.0)]);
    let fixed = element_fixed_point(&el, Direction::DownRight);
    let origin = ResizeOrigin::capture(Some(&el), p(100.0, 50.0));
    resize_point_based(&mut el, Direction::DownRight, &origin, p(200.0, 100.0), fixed);
    assert_eq!(el.absolute_points(), vec![p(0.0, 0.0), p(200.0, 100.0)]);
    assert_eq!(el.size, Size::new(200.0, 100.0));
    assert_eq!(el.points().unwrap()[0], p(0.0, 0.0));
}

#[test]
fn point_based_mirrors_when_crossing_anchor() {
    let mut el = line(&[(0.0, 0.0), (100.0, 50.0)]);
    let fixed = element_fixed_point(&el, Direction::Right);
    let origin = ResizeOrigin::capture(Some(&el), p(100.0, 25.0));
    resize_point_based(&mut el, Direction::Right, &origin, p(-100.0, 25.0), fixed);
    assert_eq!(el.absolute_points(), vec![p(0.0, 0.0), p(-100.0, 50.0)]);

    resize_point_based(&mut el, Direction::Right, &origin, p(-50.0, 25.0), fixed);
    assert_eq!(el.absolute_points(), vec![p(0.0, 0.0), p(-50.0, 50.0)]);
}

#[test]
fn point_based_recovers_after_a_tick_on_the_anchor() {
    let mut el = line(&[(0.0, 0.0), (100.0, 50.0)]);
    let fixed = element_fixed_point(&el, Direction::Right);
    let origin = ResizeOrigin::capture(Some(&el), p(100.0, 25.0));
    resize_point_based(&mut el, Direction::Right, &origin, p(0.0, 25.0), fixed);
    assert_eq!(el.absolute_points(), vec![p(0.0, 0.0), p(0.0, 50.0)]);

    resize_point_based(&mut el, Direction::Right, &origin, p(80.0, 25.0), fixed);
    assert_eq!(el.absolute_points(), vec![p(0.0, 0.0), p(80.0, 50.0)]);
    assert_eq!(el.size, Size::new(80.0, 50.0));
}

#[test]
fn point_based_flat_axis_is_left_alone() {
    let mut el = line(&[(0.0, 0.0), (100.0, 0.0)]);
    let fixed = element_fixed_point(&el, Direction::DownRight);
    let origin = ResizeOrigin::capture(Some(&el), p(100.0, 0.0));
    resize_point_based(&mut el, Direction::DownRight, &origin, p(50.0, 80.0), fixed);
    assert_eq!(el.absolute_points(), vec![p(0.0, 0.0), p(50.0, 0.0)]);
}

#[test]
fn origin_ignores_box_shaped_elements() {
    let el = rect(0.0, 0.0, 10.0, 10.0);
    assert!(ResizeOrigin::capture(Some(&el), p(10.0, 10.0)).points.is_empty());
    assert!(ResizeOrigin::capture(None, p(10.0, 10.0)).points.is_empty());
}

// =============================================================
// Text resize
// =============================================================

#[test]
fn text_resize_scales_font_with_height() {
    let mut el = text(0.0, 0.0, "hello", 40.0);
    assert_eq!(el.size.height, 50.0);
    let fixed = element_fixed_point(&el, Direction::DownRight);
    resize_text(&mut el, Direction::DownRight, p(500.0, 100.0), fixed, &FixedWidthMeasurer, 1.0);
    assert_eq!(el.font_size(), Some(80.0));
    assert_eq!(el.size.height, 100.0);
    assert_eq!(el.point, p(0.0, 0.0));
}

#[test]
fn text_resize_ignores_edges() {
    let mut el = text(0.0, 0.0, "hello", 40.0);
    let before = el.clone();
    resize_text(&mut el, Direction::Down, p(0.0, 300.0), p(0.0, 0.0), &FixedWidthMeasurer, 1.0);
    assert_eq!(el, before);
}

#[test]
fn text_resize_floors_height_per_line() {
    let mut el = text(0.0, 0.0, "a\nb", 40.0);
    let fixed = element_fixed_point(&el, Direction::DownRight);
    resize_text(&mut el, Direction::DownRight, p(1.0, 1.0), fixed, &FixedWidthMeasurer, 1.0);
    assert_eq!(el.size.height, 60.0);
}

#[test]
fn text_resize_keeps_anchor_in_up_left_quadrant() {
    let mut el = text(100.0, 100.0, "hey", 40.0);
    let fixed = element_fixed_point(&el, Direction::UpLeft);
    resize_text(&mut el, Direction::UpLeft, p(0.0, fixed.y - 100.0), fixed, &FixedWidthMeasurer, 1.0);
    assert!(approx(element_fixed_point(&el, Direction::UpLeft), fixed));
}

// =============================================================
// Multi resize
// =============================================================

#[test]
fn multi_resize_scales_about_anchor() {
    let mut store = ElementStore::new();
    let a = rect(0.0, 0.0, 50.0, 50.0);
    let b = rect(50.0, 50.0, 50.0, 50.0);
    let ids = vec![a.id, b.id];
    store.insert(a);
    store.insert(b);
    let fixed = p(0.0, 0.0);
    assert!(resize_multiple(&mut store, &ids, Direction::DownRight, p(200.0, 150.0), fixed, p(100.0, 100.0)));
    let b = store.get(&ids[1]).unwrap();
    assert_eq!(b.point, p(100.0, 100.0));
    assert_eq!(b.size, Size::new(100.0, 100.0));
}

#[test]
fn multi_resize_aborts_on_flip() {
    let mut store = ElementStore::new();
    let a = rect(0.0, 0.0, 50.0, 50.0);
    let b = rect(50.0, 50.0, 50.0, 50.0);
    let ids = vec![a.id, b.id];
    store.insert(a.clone());
    store.insert(b);
    assert!(!resize_multiple(&mut store, &ids, Direction::DownRight, p(-20.0, 40.0), p(0.0, 0.0), p(100.0, 100.0)));
    assert_eq!(store.get(&ids[0]), Some(&a));
}

#[test]
fn multi_resize_edge_scales_one_axis() {
    let mut store = ElementStore::new();
    let a = rect(0.0, 0.0, 50.0, 50.0);
    let b = line(&[(50.0, 0.0), (100.0, 50.0)]);
    let ids = vec![a.id, b.id];
    store.insert(a);
    store.insert(b);
    assert!(resize_multiple(&mut store, &ids, Direction::Right, p(200.0, 25.0), p(0.0, 0.0), p(100.0, 25.0)));
    assert_eq!(store.get(&ids[0]).unwrap().size, Size::new(100.0, 50.0));
    assert_eq!(store.get(&ids[1]).unwrap().absolute_points(), vec![p(100.0, 0.0), p(200.0, 50.0)]);
}

// =============================================================
// Linear point handles
// =============================================================

#[test]
fn two_point_line_has_virtual_midpoint() {
    let el = line(&[(0.0, 0.0), (100.0, 0.0)]);
    assert_eq!(linear_handle_count(&el), 3);
    assert_eq!(linear_handle_points(&el), vec![p(0.0, 0.0), p(50.0, 0.0), p(100.0, 0.0)]);
}

#[test]
fn moving_midpoint_inserts_real_point() {
    let mut el = line(&[(0.0, 0.0), (100.0, 0.0)]);
    resize_linear_point(&mut el, 1, p(50.0, 40.0), p(50.0, 0.0)).unwrap();
    assert_eq!(el.absolute_points(), vec![p(0.0, 0.0), p(50.0, 40.0), p(100.0, 0.0)]);
    resize_linear_point(&mut el, 1, p(50.0, 60.0), p(50.0, 40.0)).unwrap();
    assert_eq!(el.absolute_points(), vec![p(0.0, 0.0), p(50.0, 60.0), p(100.0, 0.0)]);
}

#[test]
fn moving_end_handle_of_two_point_line() {
    let mut el = line(&[(0.0, 0.0), (100.0, 0.0)]);
    resize_linear_point(&mut el, 2, p(110.0, 10.0), p(100.0, 0.0)).unwrap();
    assert_eq!(el.absolute_points(), vec![p(0.0, 0.0), p(110.0, 10.0)]);
}

#[test]
fn moving_first_point_keeps_others_in_place() {
    let mut el = line(&[(10.0, 10.0), (60.0, 10.0), (60.0, 60.0)]);
    resize_linear_point(&mut el, 0, p(0.0, 0.0), p(10.0, 10.0)).unwrap();
    assert_eq!(el.point, p(0.0, 0.0));
    assert_eq!(el.absolute_points(), vec![p(0.0, 0.0), p(60.0, 10.0), p(60.0, 60.0)]);
    assert_eq!(el.points().unwrap()[1], p(60.0, 10.0));
}

#[test]
fn linear_point_rejects_bad_targets() {
    let mut el = line(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
    assert_eq!(
        resize_linear_point(&mut el, 3, p(0.0, 0.0), p(0.0, 0.0)),
        Err(EngineError::PointIndexOutOfRange { index: 3, len: 3 })
    );
    let mut r = rect(0.0, 0.0, 1.0, 1.0);
    assert_eq!(resize_linear_point(&mut r, 0, p(0.0, 0.0), p(0.0, 0.0)), Err(EngineError::NotLinear(r.id)));
}
