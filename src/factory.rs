//! Element factory: well-formed new elements with unique roughness seeds.

#[cfg(test)]
#[path = "factory_test.rs"]
mod factory_test;

use rand::Rng;

use crate::camera::Point;
use crate::collab::{TextMeasureRequest, TextMeasurer};
use crate::consts::{LINE_HEIGHT_RATIO, SEED_MAX};
use crate::element::{Element, ElementData, ElementOptions, ElementStore, FileId, Shape, Size};

/// Draw a seed uniformly from `1..SEED_MAX`, rejecting any already in `store`.
pub fn fresh_seed<R: Rng + ?Sized>(store: &ElementStore, rng: &mut R) -> u32 {
    loop {
        let seed = rng.random_range(1..SEED_MAX);
        if !store.seed_in_use(seed) {
            return seed;
        }
    }
}

/// Build a new element of `shape` at `start` with zero extent.
///
/// Linear shapes start with two coincident points so the first draw tick only
/// replaces the last one; freedraw starts with one. Text is measured empty and
/// shifted up by half its height so the caret sits on the pointer. Images get
/// a nil file id; the caller attaches the decoded file.
pub fn create_element<R: Rng + ?Sized>(
    shape: Shape,
    options: &ElementOptions,
    start: Point,
    store: &ElementStore,
    dpr: f64,
    measurer: &dyn TextMeasurer,
    rng: &mut R,
) -> Element {
    let origin = Point::default();
    let (data, point, size) = match shape {
        Shape::Selection => (ElementData::Selection, start, Size::default()),
        Shape::Rectangle => (ElementData::Rectangle { seed: fresh_seed(store, rng) }, start, Size::default()),
        Shape::Ellipse => (ElementData::Ellipse { seed: fresh_seed(store, rng) }, start, Size::default()),
        Shape::Line => (
            ElementData::Line { points: vec![origin, origin], seed: fresh_seed(store, rng) },
            start,
            Size::default(),
        ),
        Shape::Arrow => (
            ElementData::Arrow { points: vec![origin, origin], seed: fresh_seed(store, rng) },
            start,
            Size::default(),
        ),
        Shape::Freedraw => (ElementData::Freedraw { points: vec![origin] }, start, Size::default()),
        Shape::Text => {
            let font_size = options.font_size.px();
            let metrics = measurer.measure(&TextMeasureRequest {
                font_family: options.font_family,
                font_size,
                line_height: font_size * LINE_HEIGHT_RATIO,
                text: "",
                dpr,
            });
            let size = metrics.canvas_size(dpr);
            let data = ElementData::Text { text: String::new(), font_family: options.font_family, font_size };
            (data, Point::new(start.x, start.y - size.height / 2.0), size)
        }
        Shape::Image => (ElementData::Image { file_id: FileId::nil() }, start, Size::default()),
    };
    Element::new(data, point, size, options.clone())
}

/// Build an image element for a registered file at its intrinsic size.
#[must_use]
pub fn create_image(file_id: FileId, options: &ElementOptions, at: Point, size: Size) -> Element {
    Element::new(ElementData::Image { file_id }, at, size, options.clone())
}
