//! Mapping from native coordinates to canvas pixels.

use crate::layer::Bounds;

/// Fraction of the larger extent added around degenerate (zero-area) bounds.
const DEGENERATE_PADDING: f64 = 0.5;

/// A north-up window onto native coordinates, fitted to a canvas.
///
/// The scale is uniform on both axes; the shorter axis is centred.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    bounds: Bounds,
    scale: f64,
    offset_x: f64,
    offset_y: f64,
}

impl Viewport {
    /// Fits `bounds` inside a `width`×`height` canvas, preserving aspect.
    pub fn fit(bounds: Bounds, width: u32, height: u32) -> Self {
        let bounds = pad_degenerate(bounds);
        let (w, h) = (width.max(1) as f64, height.max(1) as f64);

        let scale = (w / bounds.width()).min(h / bounds.height());
        let offset_x = (w - bounds.width() * scale) / 2.0;
        let offset_y = (h - bounds.height() * scale) / 2.0;

        Self {
            bounds,
            scale,
            offset_x,
            offset_y,
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Pixels per native unit.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Converts a native coordinate to canvas pixels (y grows downward).
    pub fn to_pixel(&self, x: f64, y: f64) -> (f32, f32) {
        let px = self.offset_x + (x - self.bounds.min_x) * self.scale;
        let py = self.offset_y + (self.bounds.max_y - y) * self.scale;
        (px as f32, py as f32)
    }

    /// Converts canvas pixels back to native coordinates.
    pub fn to_native(&self, px: f64, py: f64) -> (f64, f64) {
        (
            self.bounds.min_x + (px - self.offset_x) / self.scale,
            self.bounds.max_y - (py - self.offset_y) / self.scale,
        )
    }
}

fn pad_degenerate(bounds: Bounds) -> Bounds {
    let extent = bounds.width().max(bounds.height());
    let pad = if extent > 0.0 {
        extent * DEGENERATE_PADDING
    } else {
        1.0
    };
    let pad_x = if bounds.width() > 0.0 { 0.0 } else { pad };
    let pad_y = if bounds.height() > 0.0 { 0.0 } else { pad };
    Bounds::new(
        bounds.min_x - pad_x,
        bounds.min_y - pad_y,
        bounds.max_x + pad_x,
        bounds.max_y + pad_y,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_bounds_fill_square_canvas() {
        let viewport = Viewport::fit(Bounds::new(0.0, 0.0, 10.0, 10.0), 100, 100);
        assert_eq!(viewport.to_pixel(0.0, 10.0), (0.0, 0.0));
        assert_eq!(viewport.to_pixel(10.0, 0.0), (100.0, 100.0));
        assert_eq!(viewport.to_pixel(5.0, 5.0), (50.0, 50.0));
    }

    #[test]
    fn test_aspect_is_preserved_and_centred() {
        // 2:1 bounds on a square canvas leave bands above and below.
        let viewport = Viewport::fit(Bounds::new(0.0, 0.0, 20.0, 10.0), 100, 100);
        assert_eq!(viewport.scale(), 5.0);
        assert_eq!(viewport.to_pixel(0.0, 10.0), (0.0, 25.0));
        assert_eq!(viewport.to_pixel(20.0, 0.0), (100.0, 75.0));
    }

    #[test]
    fn test_point_bounds_are_padded() {
        let viewport = Viewport::fit(Bounds::new(3.0, 3.0, 3.0, 3.0), 10, 10);
        assert!(viewport.scale().is_finite());
        assert_eq!(viewport.to_pixel(3.0, 3.0), (5.0, 5.0));
    }

    #[test]
    fn test_round_trip() {
        let viewport = Viewport::fit(Bounds::new(-5.0, 40.0, 5.0, 50.0), 200, 100);
        let (px, py) = viewport.to_pixel(1.0, 42.0);
        let (x, y) = viewport.to_native(px as f64, py as f64);
        assert!((x - 1.0).abs() < 1e-4);
        assert!((y - 42.0).abs() < 1e-4);
    }
}
