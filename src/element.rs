//! Element model: drawable elements, their style options, and the arena that owns them.
//!
//! This module defines the core data types that describe what is on the canvas
//! (`Element`, `ElementData`, `Shape`), the style record shared by new elements
//! (`ElementOptions`), and the runtime store that owns all live elements
//! (`ElementStore`).
//!
//! Every mutation the interaction engine performs is an in-place update of a
//! record addressed by id. The store keeps insertion order for draw order and
//! an index of roughness seeds in use so element creation can reject
//! collisions in constant time.

#[cfg(test)]
#[path = "element_test.rs"]
mod element_test;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::Point;

/// Unique identifier for an element. Never reused.
pub type ElementId = Uuid;

/// Opaque group token appended to `group_ids`.
pub type GroupId = Uuid;

/// Identifier of an image registered in the file registry.
pub type FileId = Uuid;

/// Every shape the user can put on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    /// Marquee rubber band.
    Selection,
    Rectangle,
    Ellipse,
    Line,
    Arrow,
    Freedraw,
    Text,
    Image,
}

/// Geometry family of a shape. Drives bounding-box, resize and draw dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// Bounding box only.
    Generic,
    /// Ordered point list, straight segments.
    Linear,
    /// Ordered point list sampled from the pointer.
    Freedraw,
    Text,
    Image,
}

impl Shape {
    /// Classify a shape into its geometry family.
    #[must_use]
    pub fn kind(self) -> ShapeKind {
        match self {
            Self::Selection | Self::Rectangle | Self::Ellipse => ShapeKind::Generic,
            Self::Line | Self::Arrow => ShapeKind::Linear,
            Self::Freedraw => ShapeKind::Freedraw,
            Self::Text => ShapeKind::Text,
            Self::Image => ShapeKind::Image,
        }
    }

    /// Whether elements of this shape carry a roughness seed.
    #[must_use]
    pub fn has_seed(self) -> bool {
        matches!(self, Self::Rectangle | Self::Ellipse | Self::Line | Self::Arrow)
    }

    /// Whether geometry is stored as point offsets rather than a bounding box.
    #[must_use]
    pub fn is_point_based(self) -> bool {
        matches!(self.kind(), ShapeKind::Linear | ShapeKind::Freedraw)
    }
}

/// Width and height in canvas units. Never negative.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both dimensions are zero: the element was never drawn.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }
}

/// Lifecycle status. `Deleted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementStatus {
    #[default]
    Idle,
    Selected,
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FillStyle {
    #[default]
    Hachure,
    CrossHatch,
    Solid,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    #[default]
    Handwritten,
    Sans,
    Monospace,
}

impl FontFamily {
    /// CSS font family name handed to the text measurer.
    #[must_use]
    pub fn css_name(self) -> &'static str {
        match self {
            Self::Handwritten => "Virgil",
            Self::Sans => "Helvetica",
            Self::Monospace => "Cascadia",
        }
    }
}

/// Font size presets offered for new text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
    ExtraLarge,
}

impl FontSize {
    /// Size in canvas pixels.
    #[must_use]
    pub fn px(self) -> f64 {
        match self {
            Self::Small => 16.0,
            Self::Medium => 24.0,
            Self::Large => 32.0,
            Self::ExtraLarge => 48.0,
        }
    }
}

/// Style record applied to new elements and carried by every element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElementOptions {
    pub stroke_color: String,
    pub background_color: String,
    pub fill_style: FillStyle,
    pub stroke_width: f64,
    /// Dash pattern in canvas units; empty for a solid stroke.
    pub stroke_line_dash: Vec<f64>,
    pub roughness: f64,
    pub font_family: FontFamily,
    pub font_size: FontSize,
}

impl Default for ElementOptions {
    fn default() -> Self {
        Self {
            stroke_color: "#000000".into(),
            background_color: "transparent".into(),
            fill_style: FillStyle::default(),
            stroke_width: 1.0,
            stroke_line_dash: Vec::new(),
            roughness: 1.0,
            font_family: FontFamily::default(),
            font_size: FontSize::default(),
        }
    }
}

/// Shape-specific payload, tagged by `shape` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum ElementData {
    Selection,
    Rectangle {
        seed: u32,
    },
    Ellipse {
        seed: u32,
    },
    Line {
        points: Vec<Point>,
        seed: u32,
    },
    Arrow {
        points: Vec<Point>,
        seed: u32,
    },
    Freedraw {
        points: Vec<Point>,
    },
    #[serde(rename_all = "camelCase")]
    Text {
        text: String,
        font_family: FontFamily,
        font_size: f64,
    },
    #[serde(rename_all = "camelCase")]
    Image {
        file_id: FileId,
    },
}

impl ElementData {
    #[must_use]
    pub fn shape(&self) -> Shape {
        match self {
            Self::Selection => Shape::Selection,
            Self::Rectangle { .. } => Shape::Rectangle,
            Self::Ellipse { .. } => Shape::Ellipse,
            Self::Line { .. } => Shape::Line,
            Self::Arrow { .. } => Shape::Arrow,
            Self::Freedraw { .. } => Shape::Freedraw,
            Self::Text { .. } => Shape::Text,
            Self::Image { .. } => Shape::Image,
        }
    }
}

/// Registry entry for a decoded image: its intrinsic pixel size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageFile {
    pub id: FileId,
    pub width: f64,
    pub height: f64,
}

/// A drawable element as stored in the arena, in versions, and on the clipboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: ElementId,
    /// Top-left corner for box shapes; anchor of the offsets for point-based shapes.
    pub point: Point,
    pub size: Size,
    pub status: ElementStatus,
    pub options: ElementOptions,
    /// Group tokens, innermost first; the last one is the top-level group.
    #[serde(default)]
    pub group_ids: Vec<GroupId>,
    #[serde(flatten)]
    pub data: ElementData,
}

impl Element {
    /// Build an idle, ungrouped element with a fresh id.
    #[must_use]
    pub fn new(data: ElementData, point: Point, size: Size, options: ElementOptions) -> Self {
        Self {
            id: Uuid::new_v4(),
            point,
            size,
            status: ElementStatus::Idle,
            options,
            group_ids: Vec::new(),
            data,
        }
    }

    #[must_use]
    pub fn shape(&self) -> Shape {
        self.data.shape()
    }

    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        self.shape().kind()
    }

    /// Roughness seed, for shapes that carry one.
    #[must_use]
    pub fn seed(&self) -> Option<u32> {
        match &self.data {
            ElementData::Rectangle { seed }
            | ElementData::Ellipse { seed }
            | ElementData::Line { seed, .. }
            | ElementData::Arrow { seed, .. } => Some(*seed),
            _ => None,
        }
    }

    pub fn set_seed(&mut self, value: u32) {
        match &mut self.data {
            ElementData::Rectangle { seed }
            | ElementData::Ellipse { seed }
            | ElementData::Line { seed, .. }
            | ElementData::Arrow { seed, .. } => *seed = value,
            _ => {}
        }
    }

    /// Point offsets relative to `point`, for linear and freedraw elements.
    #[must_use]
    pub fn points(&self) -> Option<&[Point]> {
        match &self.data {
            ElementData::Line { points, .. } | ElementData::Arrow { points, .. } | ElementData::Freedraw { points } => {
                Some(points)
            }
            _ => None,
        }
    }

    pub fn points_mut(&mut self) -> Option<&mut Vec<Point>> {
        match &mut self.data {
            ElementData::Line { points, .. } | ElementData::Arrow { points, .. } | ElementData::Freedraw { points } => {
                Some(points)
            }
            _ => None,
        }
    }

    /// Absolute canvas positions of the stored points.
    #[must_use]
    pub fn absolute_points(&self) -> Vec<Point> {
        self.points()
            .map(|pts| pts.iter().map(|p| self.point + *p).collect())
            .unwrap_or_default()
    }

    /// Replace the point list from absolute positions, re-anchoring on the first one.
    pub fn set_absolute_points(&mut self, absolute: &[Point]) {
        let Some(anchor) = absolute.first().copied() else {
            return;
        };
        self.point = anchor;
        if let Some(points) = self.points_mut() {
            *points = absolute.iter().map(|p| *p - anchor).collect();
        }
        self.sync_size_from_points();
    }

    /// Recompute `size` from the extent of the point offsets.
    pub fn sync_size_from_points(&mut self) {
        let Some(points) = self.points() else {
            return;
        };
        let Some(first) = points.first() else {
            self.size = Size::default();
            return;
        };
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        self.size = Size::new(max_x - min_x, max_y - min_y);
    }

    /// Text content, for text elements.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.data {
            ElementData::Text { text, .. } => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub fn font_size(&self) -> Option<f64> {
        match &self.data {
            ElementData::Text { font_size, .. } => Some(*font_size),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.status == ElementStatus::Selected
    }

    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.status == ElementStatus::Deleted
    }

    /// Mark selected. Deleted elements stay deleted.
    pub fn select(&mut self) {
        if !self.is_deleted() {
            self.status = ElementStatus::Selected;
        }
    }

    /// Mark idle. Deleted elements stay deleted.
    pub fn unselect(&mut self) {
        if !self.is_deleted() {
            self.status = ElementStatus::Idle;
        }
    }

    pub fn delete(&mut self) {
        self.status = ElementStatus::Deleted;
    }

    /// The top-level group this element belongs to, if any.
    #[must_use]
    pub fn top_group(&self) -> Option<GroupId> {
        self.group_ids.last().copied()
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.point.x += dx;
        self.point.y += dy;
    }
}

/// In-memory arena of elements, keyed by id and kept in draw order.
#[derive(Debug, Clone, Default)]
pub struct ElementStore {
    elements: HashMap<ElementId, Element>,
    order: Vec<ElementId>,
    seeds: HashSet<u32>,
}

impl ElementStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an element. New elements go on top of the draw order.
    pub fn insert(&mut self, element: Element) {
        let id = element.id;
        let seed = element.seed();
        if let Some(previous) = self.elements.insert(id, element) {
            self.release_seed(&previous);
        } else {
            self.order.push(id);
        }
        if let Some(seed) = seed {
            self.seeds.insert(seed);
        }
    }

    /// Remove an element by id, returning it if it was present.
    pub fn remove(&mut self, id: &ElementId) -> Option<Element> {
        let removed = self.elements.remove(id)?;
        self.order.retain(|o| o != id);
        self.release_seed(&removed);
        Some(removed)
    }

    /// Return a reference to an element by id.
    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    /// Mutable access by id. Seeds must not be changed through this handle.
    pub fn get_mut(&mut self, id: &ElementId) -> Option<&mut Element> {
        self.elements.get_mut(id)
    }

    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.elements.contains_key(id)
    }

    /// Whether any stored element already uses `seed`.
    #[must_use]
    pub fn seed_in_use(&self, seed: u32) -> bool {
        self.seeds.contains(&seed)
    }

    /// All elements in draw order, including deleted ones.
    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.order.iter().filter_map(|id| self.elements.get(id))
    }

    /// Elements that are not deleted, in draw order.
    pub fn live(&self) -> impl Iterator<Item = &Element> {
        self.iter().filter(|e| !e.is_deleted())
    }

    /// Selected elements, in draw order.
    pub fn selected(&self) -> impl Iterator<Item = &Element> {
        self.iter().filter(|e| e.is_selected())
    }

    #[must_use]
    pub fn selected_ids(&self) -> Vec<ElementId> {
        self.selected().map(|e| e.id).collect()
    }

    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.selected().count()
    }

    pub fn unselect_all(&mut self) {
        for element in self.elements.values_mut() {
            element.unselect();
        }
    }

    /// Select exactly the given ids; everything else becomes idle.
    pub fn select_only(&mut self, ids: &HashSet<ElementId>) {
        for element in self.elements.values_mut() {
            if ids.contains(&element.id) {
                element.select();
            } else {
                element.unselect();
            }
        }
    }

    /// Drop deleted entries and entries that were never drawn. Returns the number removed.
    pub fn compact(&mut self) -> usize {
        let doomed: Vec<ElementId> = self
            .iter()
            .filter(|e| e.is_deleted() || e.size.is_zero())
            .map(|e| e.id)
            .collect();
        for id in &doomed {
            self.remove(id);
        }
        doomed.len()
    }

    /// Owned copy of every element in draw order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Element> {
        self.iter().cloned().collect()
    }

    /// Replace all elements with a snapshot, preserving its order.
    pub fn load(&mut self, elements: Vec<Element>) {
        self.elements.clear();
        self.order.clear();
        self.seeds.clear();
        for element in elements {
            if let Some(seed) = element.seed() {
                self.seeds.insert(seed);
            }
            self.order.push(element.id);
            self.elements.insert(element.id, element);
        }
    }

    /// Number of elements currently in the store, deleted ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if the store contains no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn release_seed(&mut self, element: &Element) {
        if let Some(seed) = element.seed() {
            if !self.elements.values().any(|e| e.seed() == Some(seed)) {
                self.seeds.remove(&seed);
            }
        }
    }
}
