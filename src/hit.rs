//! Hit testing: which element, handle or point lies under a canvas position.
//!
//! Handles of the current selection win over element bodies, and bodies are
//! tested topmost first. All slop is specified in screen pixels and converted
//! through the camera so handles keep their on-screen size at any zoom.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::{Camera, Point};
use crate::consts::{HANDLE_RADIUS_PX, ORTHOGONAL_HANDLE_MIN_PX};
use crate::element::{ElementId, ElementStore, Shape, ShapeKind, Size};
use crate::geometry::{bounding_box, union_bounding_box};
use crate::resize::{Direction, available_directions, linear_handle_points};

/// Which part of an element was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle(Direction),
    /// Point handle of a linear element, virtual midpoint included.
    LinearPoint(usize),
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub element_id: ElementId,
    pub part: HitPart,
}

/// Resize handles of the current selection, with their canvas positions.
///
/// Edge handles are offered only for a single non-text element whose
/// on-screen box is large enough; a lone linear element exposes point
/// handles instead and gets none here.
#[must_use]
pub fn selection_handles(store: &ElementStore, camera: &Camera) -> Vec<(Direction, Point)> {
    let selected: Vec<_> = store.selected().collect();
    if let [only] = selected.as_slice() {
        if only.kind() == ShapeKind::Linear {
            return Vec::new();
        }
    }
    let Some(bounds) = union_bounding_box(selected.iter().copied()) else {
        return Vec::new();
    };
    let on_screen = Size::new(bounds.width() * camera.zoom / camera.dpr, bounds.height() * camera.zoom / camera.dpr);
    let allow_orthogonal = selected.len() == 1 && selected.iter().all(|e| e.kind() != ShapeKind::Text);
    available_directions(on_screen, allow_orthogonal, ORTHOGONAL_HANDLE_MIN_PX)
        .into_iter()
        .map(|d| (d, d.handle_point(&bounds)))
        .collect()
}

/// Test what lies under `canvas_pt`, checking selection handles first.
#[must_use]
pub fn hit_test(canvas_pt: Point, store: &ElementStore, camera: &Camera) -> Option<Hit> {
    let slop = camera.client_dist_to_canvas(HANDLE_RADIUS_PX);
    let selected: Vec<_> = store.selected().collect();

    if let [only] = selected.as_slice() {
        if only.kind() == ShapeKind::Linear {
            let handle = linear_handle_points(only)
                .into_iter()
                .position(|p| p.distance_to(canvas_pt) <= slop);
            if let Some(index) = handle {
                return Some(Hit { element_id: only.id, part: HitPart::LinearPoint(index) });
            }
        }
    }

    if let Some(first) = selected.first() {
        let handle = selection_handles(store, camera)
            .into_iter()
            .find(|(_, p)| p.distance_to(canvas_pt) <= slop);
        if let Some((direction, _)) = handle {
            return Some(Hit { element_id: first.id, part: HitPart::ResizeHandle(direction) });
        }
    }

    let ordered: Vec<_> = store.live().filter(|e| e.shape() != Shape::Selection).collect();
    ordered
        .into_iter()
        .rev()
        .find(|e| bounding_box(e).inflate(slop).contains_point(canvas_pt))
        .map(|e| Hit { element_id: e.id, part: HitPart::Body })
}
