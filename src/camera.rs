//! Viewport camera: client ↔ canvas coordinate transforms, pan and zoom.
//!
//! Client space is what pointer events report (CSS pixels). The camera origin
//! lives in device pixels, so the forward transform first scales by the device
//! pixel ratio and then removes the pan origin and zoom. Canvas space is what
//! every element coordinate is stored in.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// A point in either client or canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance_to(self, other: Point) -> f64 {
        crate::geometry::distance(self.x - other.x, self.y - other.y)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Convert a client-space point to canvas space.
///
/// `x = (client.x * dpr - origin.x) / zoom`, symmetric for `y`.
#[must_use]
pub fn canvas_point_from_client(client: Point, dpr: f64, zoom: f64, origin: Point) -> Point {
    Point {
        x: (client.x * dpr - origin.x) / zoom,
        y: (client.y * dpr - origin.y) / zoom,
    }
}

/// Inverse of [`canvas_point_from_client`].
#[must_use]
pub fn client_point_from_canvas(canvas: Point, dpr: f64, zoom: f64, origin: Point) -> Point {
    Point {
        x: (canvas.x * zoom + origin.x) / dpr,
        y: (canvas.y * zoom + origin.y) / dpr,
    }
}

/// Camera state for pan/zoom on the infinite canvas.
///
/// `origin` is in device pixels, `zoom` is a scale factor (1.0 = no zoom) and
/// `dpr` is the device pixel ratio of the display surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub origin: Point,
    pub zoom: f64,
    pub dpr: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { origin: Point::default(), zoom: 1.0, dpr: 1.0 }
    }
}

impl Camera {
    /// Convert a client-space point to canvas coordinates.
    #[must_use]
    pub fn client_to_canvas(&self, client: Point) -> Point {
        canvas_point_from_client(client, self.dpr, self.zoom, self.origin)
    }

    /// Convert a canvas-space point to client coordinates.
    #[must_use]
    pub fn canvas_to_client(&self, canvas: Point) -> Point {
        client_point_from_canvas(canvas, self.dpr, self.zoom, self.origin)
    }

    /// Convert a client-space distance (CSS pixels) to a canvas-space distance.
    #[must_use]
    pub fn client_dist_to_canvas(&self, client_dist: f64) -> f64 {
        client_dist * self.dpr / self.zoom
    }

    /// Shift the origin by a client-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.origin.x += dx * self.dpr;
        self.origin.y += dy * self.dpr;
    }

    /// Multiply the zoom by `factor`, clamped to `[min_zoom, max_zoom]`, keeping
    /// the canvas point under `client` stationary.
    pub fn zoom_at(&mut self, client: Point, factor: f64, min_zoom: f64, max_zoom: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let anchor = self.client_to_canvas(client);
        self.zoom = (self.zoom * factor).clamp(min_zoom, max_zoom);
        self.origin = Point {
            x: client.x * self.dpr - anchor.x * self.zoom,
            y: client.y * self.dpr - anchor.y * self.zoom,
        };
    }
}
