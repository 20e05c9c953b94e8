//! Resize engine: direction model, fixed anchors and per-kind resize math.
//!
//! DESIGN
//! ======
//! A resize gesture caches one fixed point at start: the corner or edge
//! opposite the dragged handle. Every tick recomputes geometry from that
//! anchor and the live pointer, so the anchor never drifts. Dragging past the
//! anchor flips the effective handle ("drag-through"); [`effective_direction`]
//! re-derives it from the quadrant the pointer sits in.
//!
//! Dispatch on the element kind is a closed match in [`resize_element`], so a
//! new shape family cannot be added without deciding how it resizes.

#[cfg(test)]
#[path = "resize_test.rs"]
mod resize_test;

use serde::{Deserialize, Serialize};

use crate::camera::Point;
use crate::collab::{TextMeasureRequest, TextMeasurer};
use crate::consts::{LINE_HEIGHT_RATIO, TEXT_MIN_LINE_HEIGHT_PX};
use crate::element::{Element, ElementData, ElementId, ElementStore, ShapeKind, Size};
use crate::error::EngineError;
use crate::geometry::{Bounds, bounding_box, union_bounding_box};

/// Resize handle direction: four edges and four corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl Direction {
    /// Every direction, corners first.
    pub const ALL: [Direction; 8] = [
        Self::UpLeft,
        Self::UpRight,
        Self::DownLeft,
        Self::DownRight,
        Self::Up,
        Self::Down,
        Self::Left,
        Self::Right,
    ];

    #[must_use]
    pub fn is_diagonal(self) -> bool {
        matches!(self, Self::UpLeft | Self::UpRight | Self::DownLeft | Self::DownRight)
    }

    #[must_use]
    pub fn is_orthogonal(self) -> bool {
        !self.is_diagonal()
    }

    /// Whether this handle changes the horizontal extent.
    #[must_use]
    pub fn affects_x(self) -> bool {
        !matches!(self, Self::Up | Self::Down)
    }

    /// Whether this handle changes the vertical extent.
    #[must_use]
    pub fn affects_y(self) -> bool {
        !matches!(self, Self::Left | Self::Right)
    }

    /// Where the handle for this direction sits on `bounds`.
    #[must_use]
    pub fn handle_point(self, bounds: &Bounds) -> Point {
        let mid_x = (bounds.min_x + bounds.max_x) / 2.0;
        let mid_y = (bounds.min_y + bounds.max_y) / 2.0;
        match self {
            Self::Up => Point::new(mid_x, bounds.min_y),
            Self::Down => Point::new(mid_x, bounds.max_y),
            Self::Left => Point::new(bounds.min_x, mid_y),
            Self::Right => Point::new(bounds.max_x, mid_y),
            Self::UpLeft => Point::new(bounds.min_x, bounds.min_y),
            Self::UpRight => Point::new(bounds.max_x, bounds.min_y),
            Self::DownLeft => Point::new(bounds.min_x, bounds.max_y),
            Self::DownRight => Point::new(bounds.max_x, bounds.max_y),
        }
    }
}

/// Directions offered for a selection whose on-screen box is `on_screen`.
///
/// Corners are always available; edges only when both sides exceed
/// `min_px` and the caller allows them.
#[must_use]
pub fn available_directions(on_screen: Size, allow_orthogonal: bool, min_px: f64) -> Vec<Direction> {
    let edges = allow_orthogonal && on_screen.width > min_px && on_screen.height > min_px;
    Direction::ALL
        .into_iter()
        .filter(|d| d.is_diagonal() || edges)
        .collect()
}

/// The anchor of `bounds` that stays put while dragging `direction`.
#[must_use]
pub fn fixed_point(bounds: &Bounds, direction: Direction) -> Point {
    match direction {
        Direction::DownRight | Direction::Down | Direction::Right => Point::new(bounds.min_x, bounds.min_y),
        Direction::DownLeft | Direction::Left => Point::new(bounds.max_x, bounds.min_y),
        Direction::UpRight | Direction::Up => Point::new(bounds.min_x, bounds.max_y),
        Direction::UpLeft => Point::new(bounds.max_x, bounds.max_y),
    }
}

/// [`fixed_point`] of a single element's bounding box.
#[must_use]
pub fn element_fixed_point(element: &Element, direction: Direction) -> Point {
    fixed_point(&bounding_box(element), direction)
}

/// Diagonal direction of the quadrant `current` occupies around `fixed`.
///
/// Quadrant 1 is down-right, 2 down-left, 3 up-right, 4 up-left. Points on an
/// axis belong to the down / right side.
#[must_use]
pub fn quadrant(current: Point, fixed: Point) -> Direction {
    match (current.x >= fixed.x, current.y >= fixed.y) {
        (true, true) => Direction::DownRight,
        (false, true) => Direction::DownLeft,
        (true, false) => Direction::UpRight,
        (false, false) => Direction::UpLeft,
    }
}

/// The handle actually being dragged once the pointer may have crossed the anchor.
#[must_use]
pub fn effective_direction(direction: Direction, current: Point, fixed: Point) -> Direction {
    match direction {
        Direction::Up | Direction::Down => {
            if current.y >= fixed.y {
                Direction::Down
            } else {
                Direction::Up
            }
        }
        Direction::Left | Direction::Right => {
            if current.x >= fixed.x {
                Direction::Right
            } else {
                Direction::Left
            }
        }
        _ => quadrant(current, fixed),
    }
}

// =============================================================================
// SINGLE ELEMENT
// =============================================================================

/// Resize one element, dispatching on its geometry family.
pub fn resize_element(
    element: &mut Element,
    direction: Direction,
    origin: &ResizeOrigin,
    current: Point,
    fixed: Point,
    measurer: &dyn TextMeasurer,
    dpr: f64,
) {
    match element.kind() {
        ShapeKind::Generic | ShapeKind::Image => resize_generic(element, direction, current, fixed),
        ShapeKind::Linear | ShapeKind::Freedraw => resize_point_based(element, direction, origin, current, fixed),
        ShapeKind::Text => resize_text(element, direction, current, fixed, measurer, dpr),
    }
}

/// Box resize. Diagonal handles span `current`..`fixed` on both axes;
/// edge handles recompute one axis and leave the other alone.
pub fn resize_generic(element: &mut Element, direction: Direction, current: Point, fixed: Point) {
    if direction.affects_x() {
        element.point.x = current.x.min(fixed.x);
        element.size.width = (current.x - fixed.x).abs();
    }
    if direction.affects_y() {
        element.point.y = current.y.min(fixed.y);
        element.size.height = (current.y - fixed.y).abs();
    }
}

/// Where a resize gesture started.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResizeOrigin {
    /// Canvas position of the pointer when the handle was grabbed.
    pub pointer: Point,
    /// Absolute points of a point-based element at that moment; empty for
    /// every other kind.
    pub points: Vec<Point>,
}

impl ResizeOrigin {
    /// Capture the starting geometry of `element` (if any) under `pointer`.
    pub fn capture(element: Option<&Element>, pointer: Point) -> Self {
        let points = element
            .filter(|e| matches!(e.kind(), ShapeKind::Linear | ShapeKind::Freedraw))
            .map(Element::absolute_points)
            .unwrap_or_default();
        Self { pointer, points }
    }
}

/// Scale the starting points about `fixed` so the far edge follows `current`.
///
/// Every tick scales from `origin`, never from the live shape, so a tick
/// that lands on the anchor flattens the stroke only until the next one.
/// The starting extent is signed by the side the handle was grabbed on, so
/// crossing the anchor mirrors the points.
pub fn resize_point_based(element: &mut Element, direction: Direction, origin: &ResizeOrigin, current: Point, fixed: Point) {
    if origin.points.is_empty() {
        return;
    }
    let (min, max) = origin.points.iter().fold(
        (Point::new(f64::INFINITY, f64::INFINITY), Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY)),
        |(lo, hi), p| (Point::new(lo.x.min(p.x), lo.y.min(p.y)), Point::new(hi.x.max(p.x), hi.y.max(p.y))),
    );
    let grabbed = origin.pointer;
    let scale_x = axis_scale(direction.affects_x(), max.x - min.x, grabbed.x - fixed.x, current.x - fixed.x);
    let scale_y = axis_scale(direction.affects_y(), max.y - min.y, grabbed.y - fixed.y, current.y - fixed.y);
    let scaled: Vec<Point> = origin
        .points
        .iter()
        .map(|p| Point::new(fixed.x + (p.x - fixed.x) * scale_x, fixed.y + (p.y - fixed.y) * scale_y))
        .collect();
    element.set_absolute_points(&scaled);
}

fn axis_scale(active: bool, extent: f64, grabbed_offset: f64, current_offset: f64) -> f64 {
    if !active || extent <= 0.0 {
        return 1.0;
    }
    let old = if grabbed_offset >= 0.0 { extent } else { -extent };
    current_offset / old
}

/// Text resize: corners only. Font size follows the height ratio, the block
/// is re-measured and placed back against the anchor.
pub fn resize_text(
    element: &mut Element,
    direction: Direction,
    current: Point,
    fixed: Point,
    measurer: &dyn TextMeasurer,
    dpr: f64,
) {
    if direction.is_orthogonal() {
        return;
    }
    let old_height = element.size.height;
    let ElementData::Text { text, font_family, font_size } = &mut element.data else {
        return;
    };
    if old_height <= 0.0 {
        return;
    }
    let lines = text.split('\n').count().max(1);
    #[allow(clippy::cast_precision_loss)]
    let floor = lines as f64 * TEXT_MIN_LINE_HEIGHT_PX;
    let new_height = (current.y - fixed.y).abs().max(floor);
    let new_font = *font_size * new_height / old_height;
    let metrics = measurer.measure(&TextMeasureRequest {
        font_family: *font_family,
        font_size: new_font,
        line_height: new_font * LINE_HEIGHT_RATIO,
        text: text.as_str(),
        dpr,
    });
    *font_size = new_font;
    let size = metrics.canvas_size(dpr);
    element.size = size;
    element.point = match quadrant(current, fixed) {
        Direction::DownLeft => Point::new(fixed.x - size.width, fixed.y),
        Direction::UpRight => Point::new(fixed.x, fixed.y - size.height),
        Direction::UpLeft => Point::new(fixed.x - size.width, fixed.y - size.height),
        _ => fixed,
    };
}

// =============================================================================
// MULTIPLE ELEMENTS
// =============================================================================

/// Scale a multi-element selection about `fixed` with one shared factor.
///
/// Returns `false` when the tick is skipped: the pointer is on a different
/// side of the anchor than at `start`, or the union box has no extent along
/// the dragged axis.
pub fn resize_multiple(
    store: &mut ElementStore,
    ids: &[ElementId],
    direction: Direction,
    current: Point,
    fixed: Point,
    start: Point,
) -> bool {
    if effective_direction(direction, current, fixed) != effective_direction(direction, start, fixed) {
        return false;
    }
    let Some(union) = union_bounding_box(ids.iter().filter_map(|id| store.get(id))) else {
        return false;
    };
    let ratio = |extent: f64, offset: f64| (extent > 0.0).then(|| offset.abs() / extent);
    let sx = if direction.affects_x() { ratio(union.width(), current.x - fixed.x) } else { None };
    let sy = if direction.affects_y() { ratio(union.height(), current.y - fixed.y) } else { None };
    let scale = match (sx, sy) {
        (Some(x), Some(y)) => x.max(y),
        (Some(s), None) | (None, Some(s)) => s,
        (None, None) => return false,
    };
    let (scale_x, scale_y) = if direction.is_diagonal() {
        (scale, scale)
    } else if direction.affects_x() {
        (scale, 1.0)
    } else {
        (1.0, scale)
    };
    for id in ids {
        if let Some(element) = store.get_mut(id) {
            scale_about(element, fixed, scale_x, scale_y, direction.is_diagonal());
        }
    }
    true
}

fn scale_about(element: &mut Element, fixed: Point, scale_x: f64, scale_y: f64, uniform: bool) {
    let map = |p: Point| Point::new(fixed.x + (p.x - fixed.x) * scale_x, fixed.y + (p.y - fixed.y) * scale_y);
    match element.kind() {
        ShapeKind::Linear | ShapeKind::Freedraw => {
            let scaled: Vec<Point> = element.absolute_points().into_iter().map(map).collect();
            element.set_absolute_points(&scaled);
        }
        ShapeKind::Text => {
            element.point = map(element.point);
            if uniform {
                element.size = Size::new(element.size.width * scale_x, element.size.height * scale_y);
                if let ElementData::Text { font_size, .. } = &mut element.data {
                    *font_size *= scale_y;
                }
            }
        }
        ShapeKind::Generic | ShapeKind::Image => {
            element.point = map(element.point);
            element.size = Size::new(element.size.width * scale_x, element.size.height * scale_y);
        }
    }
}

// =============================================================================
// LINEAR POINT HANDLES
// =============================================================================

/// Number of point handles a linear element exposes: its stored points, plus
/// a virtual midpoint when there are exactly two.
#[must_use]
pub fn linear_handle_count(element: &Element) -> usize {
    match element.points().map(<[Point]>::len) {
        Some(2) => 3,
        Some(n) => n,
        None => 0,
    }
}

/// Absolute position of every point handle, virtual midpoint included.
#[must_use]
pub fn linear_handle_points(element: &Element) -> Vec<Point> {
    let points = element.absolute_points();
    match points.as_slice() {
        [a, b] => vec![*a, Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0), *b],
        _ => points,
    }
}

/// Move handle `index` of a linear element by the pointer delta `previous → current`.
///
/// On a two-point line index 1 is the virtual midpoint: moving it inserts a
/// real middle point, and index 2 is the stored end point. Moving index 0
/// re-anchors the element while every other point keeps its canvas position.
///
/// # Errors
///
/// `NotLinear` for elements without a linear point list and
/// `PointIndexOutOfRange` for an index past the last handle.
pub fn resize_linear_point(element: &mut Element, index: usize, current: Point, previous: Point) -> Result<(), EngineError> {
    if element.kind() != ShapeKind::Linear {
        return Err(EngineError::NotLinear(element.id));
    }
    let handles = linear_handle_count(element);
    if index >= handles {
        return Err(EngineError::PointIndexOutOfRange { index, len: handles });
    }
    let delta = current - previous;
    let mut points = element.absolute_points();
    let stored = if points.len() == 2 {
        match index {
            1 => {
                let (a, b) = (points[0], points[1]);
                points.insert(1, Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0));
                1
            }
            2 => 1,
            _ => 0,
        }
    } else {
        index
    };
    if let Some(p) = points.get_mut(stored) {
        *p = *p + delta;
    }
    element.set_absolute_points(&points);
    Ok(())
}
