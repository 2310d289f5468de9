//! The layer compositor.

use std::borrow::Cow;
use std::time::Instant;

use image::imageops::{self, FilterType};
use image::Rgba;
use tracing::{debug, trace};

use super::blend::blend_onto;
use super::marks::RegistrationMarks;
use super::vector::{rasterize_features, VectorStyle};
use super::viewport::Viewport;
use super::CompositeError;
use crate::layer::{Bounds, Layer, LayerPayload, LayerStack, RasterBuffer};

/// Output surface description for one render.
#[derive(Debug, Clone, Default)]
pub struct Canvas {
    width: u32,
    height: u32,
    viewport: Option<Viewport>,
    marks: Option<RegistrationMarks>,
    base: Option<RasterBuffer>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Places vector layers through an explicit viewport.
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = Some(viewport);
        self
    }

    /// Fits a viewport around `bounds`.
    pub fn with_bounds(self, bounds: Bounds) -> Self {
        let viewport = Viewport::fit(bounds, self.width, self.height);
        self.with_viewport(viewport)
    }

    /// Enables the default three registration marks.
    pub fn with_default_marks(mut self) -> Self {
        self.marks = Some(RegistrationMarks::default_for(self.width, self.height));
        self
    }

    pub fn with_marks(mut self, marks: RegistrationMarks) -> Self {
        self.marks = Some(marks);
        self
    }

    /// Starts compositing from `base` instead of a transparent buffer.
    pub fn with_base(mut self, base: RasterBuffer) -> Self {
        self.base = Some(base);
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    pub fn marks(&self) -> Option<&RegistrationMarks> {
        self.marks.as_ref()
    }

    /// The explicit viewport, or one fitted to the union of the vector
    /// layers' bounds.
    pub fn viewport_for(&self, layers: &[&Layer]) -> Option<Viewport> {
        if let Some(viewport) = self.viewport {
            return Some(viewport);
        }
        layers
            .iter()
            .filter(|layer| matches!(layer.payload(), LayerPayload::Vector(_)))
            .filter_map(|layer| layer.bounds())
            .reduce(|acc, b| acc.union(&b))
            .map(|bounds| Viewport::fit(bounds, self.width, self.height))
    }

    /// A fresh copy of the starting buffer.
    fn background(&self) -> Result<RasterBuffer, CompositeError> {
        if self.width == 0 || self.height == 0 {
            return Err(CompositeError::InvalidSize {
                width: self.width,
                height: self.height,
            });
        }
        match &self.base {
            Some(base) if base.dimensions() != self.dimensions() => {
                Err(CompositeError::mismatch(self.dimensions(), base.dimensions()))
            }
            Some(base) => Ok(base.clone()),
            None => Ok(RasterBuffer::new(self.width, self.height)),
        }
    }
}

/// Draws ordered, opacity-weighted layers onto one output raster.
#[derive(Debug, Clone)]
pub struct Compositor {
    style: VectorStyle,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new()
    }
}

impl Compositor {
    pub fn new() -> Self {
        Self {
            style: VectorStyle::default(),
        }
    }

    pub fn with_line_width(mut self, line_width: f32) -> Self {
        self.style.line_width = line_width;
        self
    }

    /// Colour used for vector layers that carry no tint of their own.
    pub fn with_vector_color(mut self, color: Rgba<u8>) -> Self {
        self.style.color = color;
        self
    }

    pub fn with_fill_alpha(mut self, fill_alpha: u8) -> Self {
        self.style.fill_alpha = fill_alpha;
        self
    }

    pub fn style(&self) -> &VectorStyle {
        &self.style
    }

    /// Composites the contributing layers in ascending z-order.
    ///
    /// Layers with equal z-order keep their order in `layers`. Hidden or
    /// fully transparent layers are skipped. Registration marks, when the
    /// canvas has them, are drawn last.
    pub fn composite(&self, layers: &[&Layer], canvas: &Canvas) -> Result<RasterBuffer, CompositeError> {
        let started = Instant::now();
        let mut ordered: Vec<&Layer> = layers.iter().copied().filter(|l| l.contributes()).collect();
        ordered.sort_by_key(|layer| layer.z_order());

        let viewport = canvas.viewport_for(&ordered);
        let mut output = canvas.background()?;
        for layer in &ordered {
            self.blend_layer(&mut output, layer, canvas, viewport.as_ref())?;
        }
        self.draw_registration_marks(&mut output, canvas);

        debug!(
            width = canvas.width(),
            height = canvas.height(),
            layers = ordered.len(),
            skipped = layers.len() - ordered.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Composite rendered"
        );
        Ok(output)
    }

    /// Composites the visible layers of a stack.
    pub fn composite_stack(&self, stack: &LayerStack, canvas: &Canvas) -> Result<RasterBuffer, CompositeError> {
        self.composite(&stack.visible_ordered(), canvas)
    }

    /// Renders one layer over the canvas background at its own opacity.
    ///
    /// Visibility is not consulted; callers pick the layer explicitly.
    /// Registration marks are not drawn.
    pub fn layer_frame(
        &self,
        layer: &Layer,
        canvas: &Canvas,
        viewport: Option<&Viewport>,
    ) -> Result<RasterBuffer, CompositeError> {
        let mut output = canvas.background()?;
        self.blend_layer(&mut output, layer, canvas, viewport)?;
        Ok(output)
    }

    /// Blends one layer's rasterized form onto `target`.
    pub fn blend_layer(
        &self,
        target: &mut RasterBuffer,
        layer: &Layer,
        canvas: &Canvas,
        viewport: Option<&Viewport>,
    ) -> Result<(), CompositeError> {
        if target.dimensions() != canvas.dimensions() {
            return Err(CompositeError::mismatch(canvas.dimensions(), target.dimensions()));
        }
        match self.rasterize(layer, canvas, viewport)? {
            Some(pixels) => blend_onto(target, &pixels, layer.opacity()),
            None => {
                trace!(layer = %layer.id(), "Layer has nothing to draw");
                Ok(())
            }
        }
    }

    /// The layer's pixels at canvas size, or `None` when it cannot be placed.
    fn rasterize<'a>(
        &self,
        layer: &'a Layer,
        canvas: &Canvas,
        viewport: Option<&Viewport>,
    ) -> Result<Option<Cow<'a, RasterBuffer>>, CompositeError> {
        let (width, height) = canvas.dimensions();
        match layer.payload() {
            LayerPayload::Vector(features) => {
                let Some(viewport) = viewport else {
                    return Ok(None);
                };
                let style = VectorStyle {
                    color: layer.color().unwrap_or(self.style.color),
                    ..self.style
                };
                let pixels = rasterize_features(features, viewport, width, height, &style)?;
                Ok(Some(Cow::Owned(pixels)))
            }
            LayerPayload::Grid { image, .. } | LayerPayload::Image(image) => {
                if image.width() == 0 || image.height() == 0 {
                    return Ok(None);
                }
                if image.dimensions() == (width, height) {
                    Ok(Some(Cow::Borrowed(image)))
                } else {
                    let resized = imageops::resize(image, width, height, FilterType::Triangle);
                    Ok(Some(Cow::Owned(resized)))
                }
            }
        }
    }

    /// Draws the canvas's registration marks, if any, at full strength.
    pub fn draw_registration_marks(&self, target: &mut RasterBuffer, canvas: &Canvas) {
        if let Some(marks) = canvas.marks() {
            marks.draw(target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::blend_pixel;
    use crate::layer::{Coord, Feature, FeatureCollection, Geometry};

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    fn solid(name: &str, color: Rgba<u8>) -> Layer {
        Layer::new(name, LayerPayload::Image(RasterBuffer::from_pixel(4, 4, color)), None)
    }

    #[test]
    fn test_empty_composite_is_transparent() {
        let output = Compositor::new().composite(&[], &Canvas::new(3, 2)).unwrap();
        assert_eq!(output.dimensions(), (3, 2));
        assert!(output.pixels().all(|p| p.0 == [0, 0, 0, 0]));
    }

    #[test]
    fn test_higher_z_draws_on_top() {
        let top = solid("top", BLUE).with_z_order(2);
        let bottom = solid("bottom", RED).with_z_order(1);
        let output = Compositor::new()
            .composite(&[&top, &bottom], &Canvas::new(4, 4))
            .unwrap();
        assert_eq!(*output.get_pixel(0, 0), BLUE);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let first = solid("first", RED);
        let second = solid("second", GREEN);
        let output = Compositor::new()
            .composite(&[&first, &second], &Canvas::new(4, 4))
            .unwrap();
        assert_eq!(*output.get_pixel(1, 1), GREEN);
    }

    #[test]
    fn test_hidden_layer_contributes_nothing() {
        let base = solid("base", RED);
        let hidden = solid("hidden", BLUE).with_visible(false).with_opacity(1.0);
        let output = Compositor::new()
            .composite(&[&base, &hidden], &Canvas::new(4, 4))
            .unwrap();
        assert_eq!(*output.get_pixel(2, 2), RED);
    }

    #[test]
    fn test_opacity_scales_layer_alpha() {
        let base = solid("base", RED);
        let overlay = solid("overlay", BLUE).with_opacity(0.5);
        let output = Compositor::new()
            .composite(&[&base, &overlay], &Canvas::new(4, 4))
            .unwrap();
        assert_eq!(*output.get_pixel(0, 0), blend_pixel(RED, BLUE, 0.5));
    }

    #[test]
    fn test_composite_is_incremental() {
        let a = solid("a", RED);
        let b = solid("b", GREEN).with_opacity(0.4);
        let c = solid("c", BLUE).with_opacity(0.7);
        let canvas = Canvas::new(4, 4);
        let compositor = Compositor::new();

        let all = compositor.composite(&[&a, &b, &c], &canvas).unwrap();
        let mut partial = compositor.composite(&[&a, &b], &canvas).unwrap();
        compositor.blend_layer(&mut partial, &c, &canvas, None).unwrap();

        assert_eq!(all, partial);
    }

    #[test]
    fn test_rasters_are_resampled_to_canvas() {
        let layer = solid("small", GREEN);
        let output = Compositor::new()
            .composite(&[&layer], &Canvas::new(16, 8))
            .unwrap();
        assert_eq!(output.dimensions(), (16, 8));
        assert_eq!(*output.get_pixel(15, 7), GREEN);
    }

    #[test]
    fn test_base_buffer_is_used() {
        let canvas = Canvas::new(2, 2).with_base(RasterBuffer::from_pixel(2, 2, RED));
        let output = Compositor::new().composite(&[], &canvas).unwrap();
        assert_eq!(*output.get_pixel(1, 1), RED);

        let canvas = Canvas::new(2, 2).with_base(RasterBuffer::new(3, 3));
        assert!(matches!(
            Compositor::new().composite(&[], &canvas),
            Err(CompositeError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_zero_size_canvas_fails() {
        assert_eq!(
            Compositor::new().composite(&[], &Canvas::new(0, 5)).unwrap_err(),
            CompositeError::InvalidSize { width: 0, height: 5 }
        );
    }

    #[test]
    fn test_vector_layer_uses_own_color_and_fitted_viewport() {
        let polygon = Geometry::Polygon(vec![vec![
            Coord::new(0.0, 0.0),
            Coord::new(10.0, 0.0),
            Coord::new(10.0, 10.0),
            Coord::new(0.0, 10.0),
            Coord::new(0.0, 0.0),
        ]]);
        let features = FeatureCollection::new(vec![Feature::new(polygon)]);
        let bounds = features.bounds();
        let layer = Layer::new("parcels", LayerPayload::Vector(features), bounds)
            .with_color(Rgba([0, 200, 0, 255]));

        let output = Compositor::new()
            .with_fill_alpha(255)
            .composite(&[&layer], &Canvas::new(20, 20))
            .unwrap();
        assert_eq!(output.get_pixel(10, 10).0, [0, 200, 0, 255]);
    }

    #[test]
    fn test_vector_layer_without_bounds_is_skipped() {
        let layer = Layer::new(
            "empty",
            LayerPayload::Vector(FeatureCollection::default()),
            None,
        );
        let output = Compositor::new()
            .composite(&[&layer], &Canvas::new(4, 4))
            .unwrap();
        assert!(output.pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn test_marks_ignore_layer_opacity() {
        let faint = solid("faint", BLUE).with_opacity(0.1);
        let canvas = Canvas::new(40, 40).with_marks(
            RegistrationMarks::default_for(40, 40).with_anchors(vec![(20, 20)]),
        );
        let output = Compositor::new().composite(&[&faint], &canvas).unwrap();
        assert_eq!(*output.get_pixel(20, 20), RED);
    }

    #[test]
    fn test_composite_stack_uses_visible_order() {
        let mut stack = LayerStack::new();
        stack.push(solid("a", RED));
        let b = stack.push(solid("b", BLUE));
        stack.set_visible(b, false);

        let output = Compositor::new()
            .composite_stack(&stack, &Canvas::new(4, 4))
            .unwrap();
        assert_eq!(*output.get_pixel(0, 0), RED);
    }
}
