//! Image <-> canvas coordinate conversion.
//!
//! The image is scaled to fit the canvas and centered on it. Keypoint
//! coordinates are always stored relative to the image; markers on the canvas
//! are anchored at their top-left corner, so converting a keypoint to a marker
//! position subtracts half the (scaled) marker diameter and converting back
//! re-adds it.

use serde::{Deserialize, Serialize};

/// A position in canvas or screen space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Where the base image sits on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImagePlacement {
    /// Natural image width in pixels
    pub image_width: f64,
    /// Natural image height in pixels
    pub image_height: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub canvas_width: f64,
    pub canvas_height: f64,
}

impl ImagePlacement {
    /// Size the canvas to cover both the image and its container, then fit the
    /// image into it with a uniform scale.
    pub fn fit(image_width: u32, image_height: u32, container_width: f64, container_height: f64) -> Self {
        let image_width = f64::from(image_width.max(1));
        let image_height = f64::from(image_height.max(1));
        let canvas_width = image_width.max(container_width);
        let canvas_height = image_height.max(container_height);
        let scale = (canvas_width / image_width).min(canvas_height / image_height);

        Self {
            image_width,
            image_height,
            scale_x: scale,
            scale_y: scale,
            canvas_width,
            canvas_height,
        }
    }

    /// Size of the image on the canvas.
    pub fn scaled_size(&self) -> (f64, f64) {
        (self.image_width * self.scale_x, self.image_height * self.scale_y)
    }

    /// On-canvas top-left corner of the image.
    pub fn image_origin(&self) -> Point {
        let (width, height) = self.scaled_size();
        Point::new(
            self.canvas_width / 2.0 - width / 2.0,
            self.canvas_height / 2.0 - height / 2.0,
        )
    }

    /// Canvas extent of a marker with the given diameter.
    pub fn marker_extent(&self, draw_diameter: f64) -> (f64, f64) {
        (draw_diameter * self.scale_x, draw_diameter * self.scale_y)
    }

    /// Marker anchor (top-left) for an image-relative keypoint position.
    pub fn image_to_canvas(&self, x: f64, y: f64, draw_diameter: f64) -> Point {
        let origin = self.image_origin();
        Point::new(
            origin.x + x * self.scale_x - draw_diameter * self.scale_x / 2.0,
            origin.y + y * self.scale_y - draw_diameter * self.scale_y / 2.0,
        )
    }

    /// Image-relative keypoint position for a marker anchor.
    pub fn canvas_to_image(&self, x: f64, y: f64, draw_diameter: f64) -> (f64, f64) {
        let origin = self.image_origin();
        (
            (x - origin.x) / self.scale_x + draw_diameter / 2.0,
            (y - origin.y) / self.scale_y + draw_diameter / 2.0,
        )
    }

    /// Canvas position of an image-relative point (no marker offset).
    pub fn image_point_to_canvas(&self, x: f64, y: f64) -> Point {
        self.image_to_canvas(x, y, 0.0)
    }

    /// Image-relative position of a canvas point (no marker offset).
    pub fn canvas_point_to_image(&self, point: Point) -> (f64, f64) {
        self.canvas_to_image(point.x, point.y, 0.0)
    }

    /// Image pixel under a canvas pointer position, rounded and clamped to
    /// the image bounds.
    pub fn pointer_to_image(&self, pointer: Point) -> (i32, i32) {
        let (x, y) = self.canvas_point_to_image(pointer);
        (
            x.round().clamp(0.0, self.image_width) as i32,
            y.round().clamp(0.0, self.image_height) as i32,
        )
    }
}

/// Marker diameter with the value that was in effect before the last change.
///
/// Right after the operator changes the keypoint size, the markers on the
/// canvas still have the old size. Positions read from them must use the old
/// diameter until the redraw that follows has replaced them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerSize {
    current: f64,
    previous: f64,
    dirty: bool,
}

impl MarkerSize {
    pub fn new(diameter: f64) -> Self {
        Self {
            current: diameter,
            previous: diameter,
            dirty: false,
        }
    }

    /// Change the diameter. Markers drawn before this call are stale until
    /// [`MarkerSize::mark_redrawn`].
    pub fn resize(&mut self, diameter: f64) {
        if diameter == self.current {
            return;
        }
        self.previous = self.current;
        self.current = diameter;
        self.dirty = true;
    }

    /// Diameter to draw new markers with.
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Diameter to use when reading positions back from markers, honouring
    /// `use_previous`.
    pub fn diameter(&self, use_previous: bool) -> f64 {
        if use_previous { self.previous } else { self.current }
    }

    /// Whether the markers on the canvas were drawn with the previous size.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_redrawn(&mut self) {
        self.previous = self.current;
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_fit_small_image_in_large_container() {
        // Canvas grows to the container, image scaled up uniformly
        let placement = ImagePlacement::fit(100, 50, 400.0, 400.0);
        assert_eq!(placement.canvas_width, 400.0);
        assert_eq!(placement.canvas_height, 400.0);
        assert!(approx_eq(placement.scale_x, 4.0));
        let origin = placement.image_origin();
        assert!(approx_eq(origin.x, 0.0));
        assert!(approx_eq(origin.y, 100.0));
    }

    #[test]
    fn test_fit_large_image() {
        let placement = ImagePlacement::fit(2000, 1000, 800.0, 600.0);
        assert_eq!(placement.canvas_width, 2000.0);
        assert_eq!(placement.canvas_height, 1000.0);
        assert!(approx_eq(placement.scale_x, 1.0));
        assert_eq!(placement.image_origin(), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_round_trip() {
        let placement = ImagePlacement::fit(640, 480, 1000.0, 700.0);
        for (x, y) in [(0.0, 0.0), (10.0, 10.0), (639.0, 1.0), (320.5, 479.0)] {
            for d in [1.0, 5.0, 20.0] {
                let anchor = placement.image_to_canvas(x, y, d);
                let (bx, by) = placement.canvas_to_image(anchor.x, anchor.y, d);
                assert!(approx_eq(bx, x) && approx_eq(by, y), "({x},{y}) d={d}");
            }
        }
    }

    #[test]
    fn test_marker_centered_on_point() {
        let placement = ImagePlacement::fit(100, 100, 300.0, 200.0);
        let anchor = placement.image_to_canvas(10.0, 20.0, 5.0);
        let (w, h) = placement.marker_extent(5.0);
        let center = Point::new(anchor.x + w / 2.0, anchor.y + h / 2.0);
        let expected = placement.image_point_to_canvas(10.0, 20.0);
        assert!(approx_eq(center.x, expected.x));
        assert!(approx_eq(center.y, expected.y));
    }

    #[test]
    fn test_pointer_to_image_clamps() {
        let placement = ImagePlacement::fit(100, 100, 100.0, 100.0);
        assert_eq!(placement.pointer_to_image(Point::new(10.4, 10.6)), (10, 11));
        assert_eq!(placement.pointer_to_image(Point::new(-5.0, 150.0)), (0, 100));
    }

    #[test]
    fn test_marker_size_previous() {
        let mut size = MarkerSize::new(5.0);
        assert!(!size.is_dirty());
        size.resize(8.0);
        assert!(size.is_dirty());
        assert_eq!(size.diameter(true), 5.0);
        assert_eq!(size.diameter(false), 8.0);
        size.mark_redrawn();
        assert_eq!(size.diameter(true), 8.0);
        assert!(!size.is_dirty());
    }
}
