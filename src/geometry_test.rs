#![allow(clippy::float_cmp)]

use super::*;
use crate::element::{ElementData, ElementOptions, Size};

fn rect(x: f64, y: f64, w: f64, h: f64) -> Element {
    Element::new(ElementData::Rectangle { seed: 1 }, Point::new(x, y), Size::new(w, h), ElementOptions::default())
}

fn line(x: f64, y: f64, offsets: &[(f64, f64)]) -> Element {
    let mut el = Element::new(
        ElementData::Line { points: offsets.iter().map(|(px, py)| Point::new(*px, *py)).collect(), seed: 1 },
        Point::new(x, y),
        Size::default(),
        ElementOptions::default(),
    );
    el.sync_size_from_points();
    el
}

fn bounds(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Bounds {
    Bounds { min_x, min_y, max_x, max_y }
}

// --- bounding_box ---

#[test]
fn bounding_box_generic_uses_point_and_size() {
    assert_eq!(bounding_box(&rect(10.0, 20.0, 30.0, 40.0)), bounds(10.0, 20.0, 40.0, 60.0));
}

#[test]
fn bounding_box_linear_uses_offsets() {
    let el = line(100.0, 100.0, &[(0.0, 0.0), (-20.0, 50.0), (30.0, -10.0)]);
    assert_eq!(bounding_box(&el), bounds(80.0, 90.0, 130.0, 150.0));
}

#[test]
fn bounding_box_single_point_is_degenerate() {
    let el = line(5.0, 6.0, &[(0.0, 0.0)]);
    assert_eq!(bounding_box(&el), bounds(5.0, 6.0, 5.0, 6.0));
}

#[test]
fn bounding_box_text_and_image_use_point_and_size() {
    let text = Element::new(
        ElementData::Text { text: "hi".into(), font_family: crate::element::FontFamily::Sans, font_size: 20.0 },
        Point::new(1.0, 2.0),
        Size::new(10.0, 25.0),
        ElementOptions::default(),
    );
    assert_eq!(bounding_box(&text), bounds(1.0, 2.0, 11.0, 27.0));
    let image = Element::new(
        ElementData::Image { file_id: uuid::Uuid::new_v4() },
        Point::new(-5.0, -5.0),
        Size::new(10.0, 10.0),
        ElementOptions::default(),
    );
    assert_eq!(bounding_box(&image), bounds(-5.0, -5.0, 5.0, 5.0));
}

// --- union / center ---

#[test]
fn union_covers_all_members() {
    let a = rect(0.0, 0.0, 10.0, 10.0);
    let b = line(50.0, 50.0, &[(0.0, 0.0), (10.0, -80.0)]);
    let u = union_bounding_box([&a, &b]).unwrap();
    assert_eq!(u, bounds(0.0, -30.0, 60.0, 50.0));
}

#[test]
fn union_of_nothing_is_none() {
    assert!(union_bounding_box(std::iter::empty::<&Element>()).is_none());
}

#[test]
fn center_is_midpoint() {
    assert_eq!(center(&bounds(0.0, 10.0, 20.0, 50.0)), Point::new(10.0, 30.0));
}

// --- intersects ---

#[test]
fn intersects_partial_overlap() {
    assert!(intersects(&bounds(0.0, 0.0, 10.0, 10.0), &bounds(5.0, 5.0, 15.0, 15.0)));
}

#[test]
fn intersects_touching_edge() {
    assert!(intersects(&bounds(0.0, 0.0, 10.0, 10.0), &bounds(10.0, 0.0, 20.0, 10.0)));
}

#[test]
fn intersects_strict_containment() {
    assert!(intersects(&bounds(0.0, 0.0, 100.0, 100.0), &bounds(10.0, 10.0, 20.0, 20.0)));
}

#[test]
fn intersects_containment_sharing_one_edge() {
    assert!(intersects(&bounds(0.0, 0.0, 100.0, 100.0), &bounds(0.0, 10.0, 20.0, 20.0)));
}

// Suspect, but kept: identical boxes fall between the containment and overlap cases.
#[test]
fn intersects_exactly_equal_box_is_excluded() {
    let b = bounds(10.0, 10.0, 110.0, 60.0);
    assert!(!intersects(&b, &b));
}

#[test]
fn intersects_disjoint_on_either_axis() {
    let sel = bounds(0.0, 0.0, 10.0, 10.0);
    assert!(!intersects(&sel, &bounds(11.0, 0.0, 20.0, 10.0)));
    assert!(!intersects(&sel, &bounds(0.0, -20.0, 10.0, -0.5)));
    assert!(!intersects(&sel, &bounds(-30.0, 2.0, -20.0, 8.0)));
    assert!(!intersects(&sel, &bounds(2.0, 10.5, 8.0, 30.0)));
}

#[test]
fn intersects_target_enclosing_selection() {
    assert!(intersects(&bounds(10.0, 10.0, 20.0, 20.0), &bounds(0.0, 0.0, 100.0, 100.0)));
}

// --- distance / closeness ---

#[test]
fn distance_is_euclidean() {
    assert_eq!(distance(3.0, 4.0), 5.0);
    assert_eq!(distance(-3.0, -4.0), 5.0);
}

#[test]
fn closeness_threshold_scales_with_zoom() {
    assert_eq!(closeness_threshold(1.0), 10.0);
    assert_eq!(closeness_threshold(2.0), 5.0);
    assert_eq!(closeness_threshold(0.5), 20.0);
}

#[test]
fn closes_loop_needs_three_points() {
    let two = [Point::new(0.0, 0.0), Point::new(3.0, 3.0)];
    assert!(!closes_loop(&two, 1.0));
    let loop_pts = [Point::new(0.0, 0.0), Point::new(100.0, 0.0), Point::new(4.0, 3.0)];
    assert!(closes_loop(&loop_pts, 1.0));
    assert!(!closes_loop(&loop_pts, 2.0));
}

#[test]
fn repeats_last_point_compares_tail() {
    let pts = [Point::new(0.0, 0.0), Point::new(50.0, 50.0), Point::new(52.0, 51.0)];
    assert!(repeats_last_point(&pts, 1.0));
    assert!(!repeats_last_point(&pts[..2], 1.0));
    assert!(!repeats_last_point(&pts[..1], 1.0));
}
