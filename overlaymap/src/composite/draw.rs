//! Overlay drawing with tiny-skia for marks and comparison chrome.

use image::Rgba;
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

use super::blend::blend_pixel;
use crate::layer::RasterBuffer;

/// Anti-aliased solid paint.
pub(crate) fn solid_paint(color: Rgba<u8>) -> Paint<'static> {
    let [r, g, b, a] = color.0;
    let mut paint = Paint {
        anti_alias: true,
        ..Default::default()
    };
    paint.set_color_rgba8(r, g, b, a);
    paint
}

/// Runs `draw` on a transparent pixmap the size of `target`, then blends
/// the result over `target` at full strength.
pub(crate) fn overlay(target: &mut RasterBuffer, draw: impl FnOnce(&mut Pixmap)) {
    let Some(mut pixmap) = Pixmap::new(target.width(), target.height()) else {
        return;
    };
    draw(&mut pixmap);

    for (out, pixel) in target.pixels_mut().zip(pixmap.pixels()) {
        if pixel.alpha() == 0 {
            continue;
        }
        let c = pixel.demultiply();
        *out = blend_pixel(*out, Rgba([c.red(), c.green(), c.blue(), c.alpha()]), 1.0);
    }
}

/// Fills an axis-aligned rectangle. Degenerate rectangles draw nothing.
pub(crate) fn fill_rect(pixmap: &mut Pixmap, x: f32, y: f32, w: f32, h: f32, paint: &Paint) {
    if let Some(rect) = Rect::from_xywh(x, y, w, h) {
        let path = PathBuilder::from_rect(rect);
        pixmap.fill_path(&path, paint, FillRule::Winding, Transform::identity(), None);
    }
}

/// Strokes a circle outline centred on `(cx, cy)`.
pub(crate) fn stroke_circle(pixmap: &mut Pixmap, cx: f32, cy: f32, radius: f32, width: f32, paint: &Paint) {
    let Some(path) = PathBuilder::from_circle(cx, cy, radius) else {
        return;
    };
    let stroke = Stroke {
        width,
        ..Default::default()
    };
    pixmap.stroke_path(&path, paint, &stroke, Transform::identity(), None);
}
