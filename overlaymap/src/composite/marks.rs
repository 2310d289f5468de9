//! Registration marks.
//!
//! Each mark is a crosshair (two perpendicular segments and a ring) with a
//! numeric label offset to its lower right:
//!
//! ```text
//!          |
//!        .-+-.
//!   -----|-+-|-----
//!        '-+-'  1
//!          |
//! ```
//!
//! Marks are drawn straight onto the output at full strength, after every
//! layer, so layer opacity never affects them.

use image::Rgba;
use tiny_skia::{Paint, Pixmap};

use super::draw::{fill_rect, overlay, solid_paint, stroke_circle};
use crate::layer::RasterBuffer;

/// At most this many anchors are drawn.
pub const MAX_MARKS: usize = 3;

/// Default anchors as fractions of the canvas size.
const DEFAULT_ANCHORS: [(f32, f32); MAX_MARKS] = [(0.1, 0.1), (0.9, 0.1), (0.5, 0.9)];

const ARM_LENGTH: i32 = 10;
const RING_RADIUS: f32 = 5.0;
const LABEL_OFFSET: i32 = 7;
const GLYPH_ADVANCE: i32 = 6;

/// Appearance and placement of registration marks.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationMarks {
    /// Anchor pixel positions. Extra anchors past [`MAX_MARKS`] are ignored.
    pub anchors: Vec<(u32, u32)>,
    pub color: Rgba<u8>,
}

impl RegistrationMarks {
    /// Three anchors spread across a canvas of the given size.
    pub fn default_for(width: u32, height: u32) -> Self {
        let anchors = DEFAULT_ANCHORS
            .iter()
            .map(|(fx, fy)| {
                (
                    ((width as f32 * fx).round() as u32).min(width.saturating_sub(1)),
                    ((height as f32 * fy).round() as u32).min(height.saturating_sub(1)),
                )
            })
            .collect();
        Self {
            anchors,
            color: Rgba([255, 0, 0, 255]),
        }
    }

    pub fn with_anchors(mut self, anchors: Vec<(u32, u32)>) -> Self {
        self.anchors = anchors;
        self
    }

    pub fn with_color(mut self, color: Rgba<u8>) -> Self {
        self.color = color;
        self
    }

    /// Draws up to [`MAX_MARKS`] marks, labelled 1, 2, 3.
    pub fn draw(&self, image: &mut RasterBuffer) {
        let anchors: Vec<(i32, i32)> = self
            .anchors
            .iter()
            .take(MAX_MARKS)
            .map(|&(x, y)| (x as i32, y as i32))
            .collect();

        let paint = solid_paint(self.color);
        overlay(image, |pixmap| {
            for &(x, y) in &anchors {
                draw_crosshair(pixmap, x as f32, y as f32, &paint);
            }
        });

        for (index, &(x, y)) in anchors.iter().enumerate() {
            draw_label(
                image,
                x + LABEL_OFFSET,
                y + LABEL_OFFSET,
                &(index + 1).to_string(),
                self.color,
            );
        }
    }
}

fn put(image: &mut RasterBuffer, x: i32, y: i32, color: Rgba<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < image.width() && (y as u32) < image.height() {
        image.put_pixel(x as u32, y as u32, color);
    }
}

/// Arms cover whole pixels through the anchor; the ring is centred on the
/// anchor pixel's centre.
fn draw_crosshair(pixmap: &mut Pixmap, cx: f32, cy: f32, paint: &Paint) {
    let arm = ARM_LENGTH as f32;
    let span = 2.0 * arm + 1.0;
    fill_rect(pixmap, cx - arm, cy, span, 1.0, paint);
    fill_rect(pixmap, cx, cy - arm, 1.0, span, paint);
    stroke_circle(pixmap, cx + 0.5, cy + 0.5, RING_RADIUS, 1.0, paint);
}

fn draw_label(image: &mut RasterBuffer, mut x: i32, y: i32, text: &str, color: Rgba<u8>) {
    for ch in text.chars() {
        if let Some(glyph) = glyph_bits(ch) {
            for (row, pattern) in glyph.iter().enumerate() {
                for col in 0..5 {
                    if (pattern >> (4 - col)) & 1 == 1 {
                        put(image, x + col, y + row as i32, color);
                    }
                }
            }
        }
        x += GLYPH_ADVANCE;
    }
}

/// 5×7 bitmap digits, one row per byte, high bit on the left.
fn glyph_bits(ch: char) -> Option<[u8; 7]> {
    match ch {
        '0' => Some([0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110]),
        '1' => Some([0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110]),
        '2' => Some([0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111]),
        '3' => Some([0b11110, 0b00001, 0b00001, 0b01110, 0b00001, 0b00001, 0b11110]),
        '4' => Some([0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010]),
        '5' => Some([0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110]),
        '6' => Some([0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110]),
        '7' => Some([0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000]),
        '8' => Some([0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110]),
        '9' => Some([0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100]),
        _ => None,
    }
}
