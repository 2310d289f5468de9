//! Binary selection masks.

use image::{GrayImage, Luma};

use super::SelectionError;

/// Value stored for selected cells.
pub const SELECTED: u8 = 255;

/// A binary grid shaped like the raster it was computed from.
///
/// Cells hold `0` (unselected) or [`SELECTED`]. An all-zero mask is a valid,
/// empty selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionMask {
    width: u32,
    height: u32,
    cells: Vec<u8>,
}

impl SelectionMask {
    /// An empty mask.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![0; width as usize * height as usize],
        }
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

    #[inline]
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    /// True when `(x, y)` is selected. Out-of-range cells are never selected.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        self.index(x, y).is_some_and(|i| self.cells[i] != 0)
    }

    pub fn set(&mut self, x: u32, y: u32, selected: bool) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = if selected { SELECTED } else { 0 };
        }
    }

    /// Raw row-major cells.
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Number of selected cells.
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&c| c != 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|&c| c == 0)
    }

    /// Inclusive `(min_x, min_y, max_x, max_y)` of the selection.
    pub fn bounding_box(&self) -> Option<(u32, u32, u32, u32)> {
        let mut bbox: Option<(u32, u32, u32, u32)> = None;
        for (i, _) in self.cells.iter().enumerate().filter(|(_, &c)| c != 0) {
            let x = (i % self.width as usize) as u32;
            let y = (i / self.width as usize) as u32;
            bbox = Some(match bbox {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            });
        }
        bbox
    }

    /// Flips every cell.
    pub fn invert(&mut self) {
        for cell in &mut self.cells {
            *cell = if *cell == 0 { SELECTED } else { 0 };
        }
    }

    /// Adds every cell selected in `other`.
    pub fn union_with(&mut self, other: &SelectionMask) -> Result<(), SelectionError> {
        if self.dimensions() != other.dimensions() {
            return Err(SelectionError::DimensionMismatch {
                left_width: self.width,
                left_height: self.height,
                right_width: other.width,
                right_height: other.height,
            });
        }
        for (cell, &o) in self.cells.iter_mut().zip(&other.cells) {
            if o != 0 {
                *cell = SELECTED;
            }
        }
        Ok(())
    }

    /// The mask as a grayscale image, for export or display.
    pub fn to_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            Luma([if self.contains(x, y) { SELECTED } else { 0 }])
        })
    }
}
