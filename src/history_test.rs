use super::*;
use crate::camera::Point;
use crate::element::{ElementData, Size};

fn version(tag: u32) -> Version {
    let el = Element::new(
        ElementData::Rectangle { seed: tag },
        Point::default(),
        Size::new(1.0, 1.0),
        ElementOptions::default(),
    );
    Version { elements: vec![el], element_options: ElementOptions::default() }
}

fn tag(v: &Version) -> Option<u32> {
    v.elements.first().and_then(Element::seed)
}

// =============================================================
// Recording
// =============================================================

#[test]
fn starts_with_one_version() {
    let h = History::default();
    assert_eq!(h.version_count(), 1);
    assert_eq!(h.cursor(), 0);
    assert!(!h.can_undo());
    assert!(!h.can_redo());
}

#[test]
fn record_appends_and_moves_cursor() {
    let mut h = History::default();
    h.record(version(1));
    h.record(version(2));
    assert_eq!(h.version_count(), 3);
    assert_eq!(h.cursor(), 2);
    assert_eq!(tag(h.current()), Some(2));
}

#[test]
fn redo_branch_is_truncated() {
    let mut h = History::default();
    h.record(version(1));
    h.record(version(2));
    h.record(version(3));
    h.seek(-1);
    assert_eq!(tag(h.seek(-1)), Some(1));
    h.record(version(4));
    assert_eq!(h.version_count(), 3);
    assert_eq!(tag(h.seek(-1)), Some(1));
    assert_eq!(tag(h.seek(1)), Some(4));
    assert!(!h.can_redo());
}

// =============================================================
// Seeking
// =============================================================

#[test]
fn undo_at_start_is_noop() {
    let mut h = History::new(version(9));
    assert_eq!(tag(h.seek(-1)), Some(9));
    assert_eq!(h.cursor(), 0);
}

#[test]
fn redo_at_end_is_noop() {
    let mut h = History::default();
    h.record(version(1));
    assert_eq!(tag(h.seek(1)), Some(1));
    assert_eq!(h.cursor(), 1);
}

#[test]
fn cursor_stays_in_bounds_for_any_sequence() {
    let mut h = History::default();
    let steps: [isize; 12] = [1, -1, -1, 5, -7, 1, 1, -1, 2, -2, 0, 1];
    for (i, step) in steps.iter().enumerate() {
        if i % 3 == 0 {
            h.record(version(u32::try_from(i).unwrap()));
        }
        h.seek(*step);
        assert!(h.cursor() < h.version_count());
    }
}

#[test]
fn reset_drops_everything() {
    let mut h = History::default();
    h.record(version(1));
    h.reset(version(5));
    assert_eq!(h.version_count(), 1);
    assert_eq!(tag(h.current()), Some(5));
}
