//! Geometry kernel: bounding boxes, intersection, distances and closeness.
//!
//! Everything here is pure. The engine and the resize functions read element
//! geometry only through these helpers so every shape family is handled by one
//! exhaustive match.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use crate::camera::Point;
use crate::consts::CLOSENESS_PX;
use crate::element::{Element, ShapeKind};

/// Axis-aligned bounding box in canvas space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Box spanned by two arbitrary corners.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            min_x: a.x.min(b.x),
            min_y: a.y.min(b.y),
            max_x: a.x.max(b.x),
            max_y: a.y.max(b.y),
        }
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    #[must_use]
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    /// Grow the box by `pad` on every side.
    #[must_use]
    pub fn inflate(&self, pad: f64) -> Self {
        Self {
            min_x: self.min_x - pad,
            min_y: self.min_y - pad,
            max_x: self.max_x + pad,
            max_y: self.max_y + pad,
        }
    }

    fn union(&self, other: &Bounds) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }
}

/// Bounding box of a single element.
///
/// Box-shaped elements use `point` / `point + size`; point-based elements take
/// the extent of `point + offset` over every stored offset.
#[must_use]
pub fn bounding_box(element: &Element) -> Bounds {
    match element.kind() {
        ShapeKind::Generic | ShapeKind::Text | ShapeKind::Image => Bounds {
            min_x: element.point.x,
            min_y: element.point.y,
            max_x: element.point.x + element.size.width,
            max_y: element.point.y + element.size.height,
        },
        ShapeKind::Linear | ShapeKind::Freedraw => {
            let mut bounds = Bounds::from_corners(element.point, element.point);
            for p in element.absolute_points() {
                bounds = bounds.union(&Bounds::from_corners(p, p));
            }
            bounds
        }
    }
}

/// Union of the bounding boxes of `elements`. `None` for an empty input.
pub fn union_bounding_box<'a, I>(elements: I) -> Option<Bounds>
where
    I: IntoIterator<Item = &'a Element>,
{
    elements
        .into_iter()
        .map(bounding_box)
        .reduce(|acc, b| acc.union(&b))
}

/// Midpoint of a box.
#[must_use]
pub fn center(bounds: &Bounds) -> Point {
    Point::new((bounds.min_x + bounds.max_x) / 2.0, (bounds.min_y + bounds.max_y) / 2.0)
}

/// Whether a marquee `selection` box picks up a `target` box.
///
/// Overlap, touching edges and strict containment all count. A target whose
/// box is exactly equal to the selection box does not.
#[must_use]
pub fn intersects(selection: &Bounds, target: &Bounds) -> bool {
    let separated = target.min_x > selection.max_x
        || target.max_x < selection.min_x
        || target.min_y > selection.max_y
        || target.max_y < selection.min_y;
    if separated {
        return false;
    }
    selection != target
}

/// Euclidean norm of `(dx, dy)`.
#[must_use]
pub fn distance(dx: f64, dy: f64) -> f64 {
    dx.hypot(dy)
}

/// Canvas-space distance under which two points are considered the same spot.
#[must_use]
pub fn closeness_threshold(zoom: f64) -> f64 {
    CLOSENESS_PX / zoom
}

/// Whether two points are within [`closeness_threshold`] of each other.
#[must_use]
pub fn is_close(a: Point, b: Point, zoom: f64) -> bool {
    a.distance_to(b) < closeness_threshold(zoom)
}

/// The last point of a polyline (at least three points) lands on its start.
#[must_use]
pub fn closes_loop(points: &[Point], zoom: f64) -> bool {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) if points.len() >= 3 => is_close(*first, *last, zoom),
        _ => false,
    }
}

/// The last two points of a polyline sit on the same spot.
#[must_use]
pub fn repeats_last_point(points: &[Point], zoom: f64) -> bool {
    match points {
        [.., previous, last] => is_close(*previous, *last, zoom),
        _ => false,
    }
}
