//! Vector feature rasterization with tiny-skia.

use image::Rgba;
use tiny_skia::{FillRule, Paint, Path, PathBuilder, Pixmap, Stroke, Transform};

use super::viewport::Viewport;
use super::CompositeError;
use crate::layer::{Coord, FeatureCollection, Geometry, RasterBuffer};

/// How vector features are painted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorStyle {
    /// Stroke colour; fills use the same colour at `fill_alpha`.
    pub color: Rgba<u8>,
    pub line_width: f32,
    pub fill_alpha: u8,
    /// Radius of point markers in pixels.
    pub point_radius: f32,
}

impl Default for VectorStyle {
    fn default() -> Self {
        Self {
            color: Rgba([0x33, 0x88, 0xff, 255]),
            line_width: 2.0,
            fill_alpha: 96,
            point_radius: 3.0,
        }
    }
}

/// Rasterizes features onto a fresh transparent buffer.
///
/// Polygons are filled with the even-odd rule and outlined; lines are
/// stroked; points become small discs.
pub fn rasterize_features(
    features: &FeatureCollection,
    viewport: &Viewport,
    width: u32,
    height: u32,
    style: &VectorStyle,
) -> Result<RasterBuffer, CompositeError> {
    let mut pixmap = Pixmap::new(width, height).ok_or(CompositeError::InvalidSize { width, height })?;
    let painter = Painter::new(style);

    for feature in &features.features {
        painter.draw(&mut pixmap, viewport, &feature.geometry);
    }

    Ok(pixmap_to_buffer(&pixmap))
}

struct Painter {
    fill: Paint<'static>,
    stroke_paint: Paint<'static>,
    stroke: Stroke,
    point_radius: f32,
}

impl Painter {
    fn new(style: &VectorStyle) -> Self {
        let [r, g, b, a] = style.color.0;
        let mut fill = Paint {
            anti_alias: true,
            ..Default::default()
        };
        fill.set_color_rgba8(r, g, b, ((a as u16 * style.fill_alpha as u16) / 255) as u8);

        let mut stroke_paint = Paint {
            anti_alias: true,
            ..Default::default()
        };
        stroke_paint.set_color_rgba8(r, g, b, a);

        Self {
            fill,
            stroke_paint,
            stroke: Stroke {
                width: style.line_width.max(0.0),
                ..Default::default()
            },
            point_radius: style.point_radius.max(0.5),
        }
    }

    fn draw(&self, pixmap: &mut Pixmap, viewport: &Viewport, geometry: &Geometry) {
        match geometry {
            Geometry::Point(c) => self.draw_point(pixmap, viewport, *c),
            Geometry::MultiPoint(points) => {
                for c in points {
                    self.draw_point(pixmap, viewport, *c);
                }
            }
            Geometry::LineString(line) => self.draw_lines(pixmap, viewport, std::slice::from_ref(line)),
            Geometry::MultiLineString(lines) => self.draw_lines(pixmap, viewport, lines),
            Geometry::Polygon(rings) => self.draw_polygon(pixmap, viewport, rings),
            Geometry::MultiPolygon(polygons) => {
                for rings in polygons {
                    self.draw_polygon(pixmap, viewport, rings);
                }
            }
            Geometry::GeometryCollection(members) => {
                for member in members {
                    self.draw(pixmap, viewport, member);
                }
            }
        }
    }

    fn draw_point(&self, pixmap: &mut Pixmap, viewport: &Viewport, c: Coord) {
        let (x, y) = viewport.to_pixel(c.x, c.y);
        if let Some(path) = PathBuilder::from_circle(x, y, self.point_radius) {
            pixmap.fill_path(
                &path,
                &self.stroke_paint,
                FillRule::Winding,
                Transform::default(),
                None,
            );
        }
    }

    fn draw_lines(&self, pixmap: &mut Pixmap, viewport: &Viewport, lines: &[Vec<Coord>]) {
        if self.stroke.width <= 0.0 {
            return;
        }
        if let Some(path) = build_path(viewport, lines, false) {
            pixmap.stroke_path(
                &path,
                &self.stroke_paint,
                &self.stroke,
                Transform::default(),
                None,
            );
        }
    }

    fn draw_polygon(&self, pixmap: &mut Pixmap, viewport: &Viewport, rings: &[Vec<Coord>]) {
        let Some(path) = build_path(viewport, rings, true) else {
            return;
        };
        pixmap.fill_path(
            &path,
            &self.fill,
            FillRule::EvenOdd,
            Transform::default(),
            None,
        );
        if self.stroke.width > 0.0 {
            pixmap.stroke_path(
                &path,
                &self.stroke_paint,
                &self.stroke,
                Transform::default(),
                None,
            );
        }
    }
}

fn build_path(viewport: &Viewport, parts: &[Vec<Coord>], close: bool) -> Option<Path> {
    let mut builder = PathBuilder::new();
    for part in parts.iter().filter(|p| p.len() >= 2) {
        let mut points = part.iter().map(|c| viewport.to_pixel(c.x, c.y));
        if let Some((x, y)) = points.next() {
            builder.move_to(x, y);
        }
        for (x, y) in points {
            builder.line_to(x, y);
        }
        if close {
            builder.close();
        }
    }
    builder.finish()
}

/// Converts tiny-skia's premultiplied pixels to straight-alpha RGBA.
fn pixmap_to_buffer(pixmap: &Pixmap) -> RasterBuffer {
    let mut buffer = RasterBuffer::new(pixmap.width(), pixmap.height());
    for (out, pixel) in buffer.pixels_mut().zip(pixmap.pixels()) {
        let c = pixel.demultiply();
        *out = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    buffer
}
