//! Canvas viewport: zoom and pan between canvas and screen space.
//!
//! `screen = canvas * zoom + pan`. The math is kept free of any event
//! handling so it can be tested on its own.

use serde::Serialize;

use crate::constants::{MAX_ZOOM_IN_PERCENT, MAX_ZOOM_OUT_WHEN_IMAGE_FITS};
use crate::transform::Point;

/// Represents the canvas viewport transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl Viewport {
    /// Create a viewport with the given zoom and pan.
    pub fn new(zoom: f64, pan_x: f64, pan_y: f64) -> Self {
        Self { zoom, pan_x, pan_y }
    }

    /// Create an identity viewport (zoom=1, no pan).
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    pub fn canvas_to_screen(&self, point: Point) -> Point {
        Point::new(
            point.x * self.zoom + self.pan_x,
            point.y * self.zoom + self.pan_y,
        )
    }

    pub fn screen_to_canvas(&self, point: Point) -> Point {
        Point::new(
            (point.x - self.pan_x) / self.zoom,
            (point.y - self.pan_y) / self.zoom,
        )
    }

    /// Zoom so that the canvas point under `screen_point` stays under it.
    pub fn zoom_to_point(&self, new_zoom: f64, screen_point: Point) -> Viewport {
        let anchor = self.screen_to_canvas(screen_point);
        Viewport {
            zoom: new_zoom,
            pan_x: screen_point.x - anchor.x * new_zoom,
            pan_y: screen_point.y - anchor.y * new_zoom,
        }
    }

    /// Translate the viewport by a screen-space delta.
    pub fn pan_by(&self, dx: f64, dy: f64) -> Viewport {
        Viewport {
            zoom: self.zoom,
            pan_x: self.pan_x + dx,
            pan_y: self.pan_y + dy,
        }
    }

    /// Viewport shown after a zoom reset: identity when the canvas fits in
    /// the container, otherwise zoomed out to fit and centered.
    pub fn reset(container: (f64, f64), canvas: (f64, f64)) -> Viewport {
        let (container_w, container_h) = container;
        let (canvas_w, canvas_h) = canvas;
        if container_w >= canvas_w && container_h >= canvas_h {
            return Viewport::identity();
        }
        let zoom = (container_w / canvas_w).min(container_h / canvas_h);
        Viewport {
            zoom,
            pan_x: (container_w - canvas_w * zoom) / 2.0,
            pan_y: (container_h - canvas_h * zoom) / 2.0,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::identity()
    }
}

/// Zoom range allowed for an image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZoomLimits {
    pub max_zoom_in: f64,
    pub max_zoom_out: f64,
}

impl ZoomLimits {
    /// Limits for an image shown in a container of the given size.
    ///
    /// Zooming in stops at 2% of the larger image dimension. Zooming out stops
    /// at 0.5 when the container is larger than the image along some axis, and
    /// at half the container/image ratio otherwise.
    pub fn for_image(image: (u32, u32), container: (f64, f64)) -> Self {
        let image_w = f64::from(image.0.max(1));
        let image_h = f64::from(image.1.max(1));
        let max_zoom_in = image_w.max(image_h) * MAX_ZOOM_IN_PERCENT / 100.0;
        let ratio = (container.0 / image_w).max(container.1 / image_h);
        let max_zoom_out = if ratio > 1.0 {
            MAX_ZOOM_OUT_WHEN_IMAGE_FITS
        } else {
            ratio / 2.0
        };
        Self {
            max_zoom_in,
            max_zoom_out,
        }
    }

    pub fn allows_zoom_in(&self, zoom: f64) -> bool {
        zoom <= self.max_zoom_in
    }

    pub fn allows_zoom_out(&self, zoom: f64) -> bool {
        zoom >= self.max_zoom_out
    }
}

/// Zoom in check with optional limits; no limits means unbounded.
pub fn zoom_in_allowed(limits: Option<&ZoomLimits>, zoom: f64) -> bool {
    limits.is_none_or(|l| l.allows_zoom_in(zoom))
}

/// Zoom out check with optional limits; no limits means unbounded.
pub fn zoom_out_allowed(limits: Option<&ZoomLimits>, zoom: f64) -> bool {
    limits.is_none_or(|l| l.allows_zoom_out(zoom))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 0.0001;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_identity_viewport() {
        let v = Viewport::identity();
        assert_eq!(v.zoom, 1.0);
        let p = Point::new(12.0, 34.0);
        assert_eq!(v.canvas_to_screen(p), p);
    }

    #[test]
    fn test_zoom_to_point_preserves_anchor() {
        let v = Viewport::new(1.5, 40.0, -20.0);
        let screen = Point::new(150.0, 120.0);
        let before = v.screen_to_canvas(screen);
        let zoomed = v.zoom_to_point(3.0, screen);
        let after = zoomed.screen_to_canvas(screen);
        assert!(approx_eq(before.x, after.x));
        assert!(approx_eq(before.y, after.y));
        assert_eq!(zoomed.zoom, 3.0);
    }

    #[test]
    fn test_zoom_to_origin_scales_pan() {
        let v = Viewport::new(1.0, 10.0, 20.0);
        let zoomed = v.zoom_to_point(2.0, Point::new(0.0, 0.0));
        assert!(approx_eq(zoomed.pan_x, 20.0));
        assert!(approx_eq(zoomed.pan_y, 40.0));
    }

    #[test]
    fn test_pan_by() {
        let v = Viewport::new(2.0, 10.0, 20.0).pan_by(5.0, -10.0);
        assert_eq!(v.zoom, 2.0);
        assert_eq!(v.pan_x, 15.0);
        assert_eq!(v.pan_y, 10.0);
    }

    #[test]
    fn test_reset_identity_when_canvas_fits() {
        assert_eq!(
            Viewport::reset((800.0, 600.0), (800.0, 600.0)),
            Viewport::identity()
        );
    }

    #[test]
    fn test_reset_fits_and_centers() {
        let v = Viewport::reset((500.0, 500.0), (1000.0, 500.0));
        assert!(approx_eq(v.zoom, 0.5));
        assert!(approx_eq(v.pan_x, 0.0));
        assert!(approx_eq(v.pan_y, 125.0));
    }

    #[test]
    fn test_zoom_limits_small_image() {
        // Container larger than image
        let limits = ZoomLimits::for_image((200, 100), (800.0, 600.0));
        assert!(approx_eq(limits.max_zoom_in, 4.0));
        assert!(approx_eq(limits.max_zoom_out, 0.5));
    }

    #[test]
    fn test_zoom_limits_large_image() {
        let limits = ZoomLimits::for_image((4000, 2000), (800.0, 600.0));
        assert!(approx_eq(limits.max_zoom_in, 80.0));
        // max(0.2, 0.3) / 2
        assert!(approx_eq(limits.max_zoom_out, 0.15));
    }

    #[test]
    fn test_unbounded_without_limits() {
        assert!(zoom_in_allowed(None, 1e9));
        assert!(zoom_out_allowed(None, 1e-9));
        let limits = ZoomLimits::for_image((100, 100), (50.0, 50.0));
        assert!(!zoom_in_allowed(Some(&limits), 2.5));
        assert!(zoom_in_allowed(Some(&limits), 2.0));
    }
}
