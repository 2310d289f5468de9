//! Raster decoding: single-band numeric grids to displayable bitmaps.
//!
//! The stretch is linear between the smallest and largest finite,
//! non-missing cell values:
//!
//! ```text
//! intensity = round(255 × (value − min) / (max − min))
//! ```
//!
//! Missing cells become fully transparent. A grid whose valid cells all hold
//! the same value renders mid-grey (128).
//!
//! ```
//! use overlaymap::layer::NumericGrid;
//! use overlaymap::raster::decode_grid;
//!
//! let grid = NumericGrid::new(2, 1, vec![0.0, 100.0]).unwrap();
//! let image = decode_grid(&grid);
//! assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0, 255]);
//! assert_eq!(image.get_pixel(1, 0).0, [255, 255, 255, 255]);
//! ```

use image::Rgba;

use crate::layer::{NumericGrid, RasterBuffer};

/// Intensity used when every valid cell holds the same value.
pub const CONSTANT_INTENSITY: u8 = 128;

/// Pixel written for missing cells.
pub const NO_DATA_PIXEL: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Value range of the valid cells of a grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridStats {
    pub min: f64,
    pub max: f64,
    /// Number of cells that took part in the range.
    pub valid: usize,
}

/// Scans a grid for its valid value range. `None` when no cell is valid.
pub fn grid_stats(grid: &NumericGrid) -> Option<GridStats> {
    let mut stats: Option<GridStats> = None;
    for &value in grid.values() {
        if grid.is_missing(value) {
            continue;
        }
        let s = stats.get_or_insert(GridStats {
            min: value,
            max: value,
            valid: 0,
        });
        s.min = s.min.min(value);
        s.max = s.max.max(value);
        s.valid += 1;
    }
    stats
}

/// Stretches a grid into an 8-bit grayscale RGBA bitmap of the same size.
pub fn decode_grid(grid: &NumericGrid) -> RasterBuffer {
    let stats = grid_stats(grid);
    let mut image = RasterBuffer::new(grid.width(), grid.height());

    for (pixel, &value) in image.pixels_mut().zip(grid.values()) {
        *pixel = match stats {
            Some(stats) if !grid.is_missing(value) => {
                let v = intensity(value, &stats);
                Rgba([v, v, v, 255])
            }
            _ => NO_DATA_PIXEL,
        };
    }
    image
}

fn intensity(value: f64, stats: &GridStats) -> u8 {
    let range = stats.max - stats.min;
    if range <= 0.0 {
        return CONSTANT_INTENSITY;
    }
    (255.0 * (value - stats.min) / range).round().clamp(0.0, 255.0) as u8
}
