//! Per-mode frame rendering.

use std::time::Instant;

use image::Rgba;
use tracing::debug;

use super::state::{ComparisonState, ModeParams};
use super::CompareError;
use crate::composite::draw::{fill_rect, overlay, solid_paint, stroke_circle};
use crate::composite::{Canvas, Compositor, Viewport};
use crate::layer::{Layer, LayerId, LayerStack, RasterBuffer};

/// Divider and handle colour.
const CHROME_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Outline drawn either side of the chrome.
const CHROME_SHADOW: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Swipe handle half-size in pixels.
const HANDLE_HALF: f32 = 6.0;

const RING_WIDTH: f32 = 1.5;

/// Renders comparison frames.
///
/// Both layers are drawn through one shared viewport so A and B stay in
/// register. Registration marks, when the canvas has them, are drawn last.
#[derive(Debug, Clone, Default)]
pub struct CompareRenderer {
    compositor: Compositor,
    chrome: bool,
}

impl CompareRenderer {
    pub fn new(compositor: Compositor) -> Self {
        Self {
            compositor,
            chrome: true,
        }
    }

    /// Toggles the swipe divider and spyglass ring.
    pub fn with_chrome(mut self, chrome: bool) -> Self {
        self.chrome = chrome;
        self
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    /// Renders the current frame of `state` from the layers in `stack`.
    ///
    /// Layer visibility is ignored: A and B are drawn even when hidden in
    /// the stack. Each layer's opacity still applies.
    ///
    /// Fails with [`CompareError::LayerNotFound`] if either layer has left
    /// the stack.
    pub fn render(
        &self,
        state: &ComparisonState,
        stack: &LayerStack,
        canvas: &Canvas,
    ) -> Result<RasterBuffer, CompareError> {
        let started = Instant::now();
        let a = lookup(stack, state.layer_a())?;
        let b = lookup(stack, state.layer_b())?;
        let viewport = canvas.viewport_for(&[a, b]);

        let mut output = match *state.params() {
            ModeParams::Single => self.frame(a, canvas, viewport.as_ref())?,
            ModeParams::Swipe { position } => {
                let mut output = self.frame(a, canvas, viewport.as_ref())?;
                let split = swipe_column(position, canvas.width());
                if split < canvas.width() {
                    let frame_b = self.frame(b, canvas, viewport.as_ref())?;
                    copy_columns(&mut output, &frame_b, split);
                }
                if self.chrome {
                    draw_divider(&mut output, split);
                }
                output
            }
            ModeParams::Spyglass { center, radius } => {
                let mut output = self.frame(a, canvas, viewport.as_ref())?;
                if let Some((cx, cy)) = center {
                    let frame_b = self.frame(b, canvas, viewport.as_ref())?;
                    copy_disc(&mut output, &frame_b, cx, cy, radius);
                    if self.chrome {
                        draw_ring(&mut output, cx, cy, radius);
                    }
                }
                output
            }
            ModeParams::Blink { showing_a, .. } => {
                let shown = if showing_a { a } else { b };
                self.frame(shown, canvas, viewport.as_ref())?
            }
        };
        self.compositor.draw_registration_marks(&mut output, canvas);

        debug!(
            mode = %state.mode(),
            layer_a = %a.id(),
            layer_b = %b.id(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Comparison frame rendered"
        );
        Ok(output)
    }

    fn frame(
        &self,
        layer: &Layer,
        canvas: &Canvas,
        viewport: Option<&Viewport>,
    ) -> Result<RasterBuffer, CompareError> {
        Ok(self.compositor.layer_frame(layer, canvas, viewport)?)
    }
}

fn lookup(stack: &LayerStack, id: LayerId) -> Result<&Layer, CompareError> {
    stack.get(id).ok_or(CompareError::LayerNotFound { id })
}

/// First column showing B for a swipe at `percent`.
pub fn swipe_column(percent: f32, width: u32) -> u32 {
    let x = (percent.clamp(0.0, 100.0) as f64 / 100.0 * width as f64).round();
    (x as u32).min(width)
}

/// Whether the centre of pixel `(x, y)` lies within the spyglass circle.
pub fn in_spyglass(x: u32, y: u32, cx: f32, cy: f32, radius: f32) -> bool {
    let dx = x as f32 + 0.5 - cx;
    let dy = y as f32 + 0.5 - cy;
    dx * dx + dy * dy <= radius * radius
}

fn copy_columns(target: &mut RasterBuffer, source: &RasterBuffer, from: u32) {
    for (x, y, pixel) in target.enumerate_pixels_mut() {
        if x >= from {
            *pixel = *source.get_pixel(x, y);
        }
    }
}

fn copy_disc(target: &mut RasterBuffer, source: &RasterBuffer, cx: f32, cy: f32, radius: f32) {
    for (x, y, pixel) in target.enumerate_pixels_mut() {
        if in_spyglass(x, y, cx, cy, radius) {
            *pixel = *source.get_pixel(x, y);
        }
    }
}

/// Vertical line at the split with a square handle at mid-height.
fn draw_divider(target: &mut RasterBuffer, split: u32) {
    let (width, height) = target.dimensions();
    if split == 0 || split >= width {
        return;
    }
    let x = split as f32;
    let mid = (height / 2) as f32;
    let side = 2.0 * HANDLE_HALF + 1.0;
    let line = solid_paint(CHROME_COLOR);
    let shadow = solid_paint(CHROME_SHADOW);

    overlay(target, |pixmap| {
        fill_rect(pixmap, x - 1.0, 0.0, 2.0, height as f32, &line);
        fill_rect(pixmap, x - HANDLE_HALF, mid - HANDLE_HALF, side, side, &shadow);
        fill_rect(
            pixmap,
            x - HANDLE_HALF + 1.0,
            mid - HANDLE_HALF + 1.0,
            side - 2.0,
            side - 2.0,
            &line,
        );
    });
}

/// Anti-aliased ring on the spyglass edge.
fn draw_ring(target: &mut RasterBuffer, cx: f32, cy: f32, radius: f32) {
    if radius < 1.0 {
        return;
    }
    let paint = solid_paint(CHROME_COLOR);
    overlay(target, |pixmap| stroke_circle(pixmap, cx, cy, radius, RING_WIDTH, &paint));
}
