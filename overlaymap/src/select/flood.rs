//! Magic-wand flood selection.

use image::Rgba;
use tracing::debug;

use super::{SelectionError, SelectionMask};
use crate::layer::RasterBuffer;

/// Selects the 4-connected region around `seed` whose colour is within
/// `tolerance` of the seed colour.
///
/// The distance is the mean absolute difference over R, G and B; alpha is
/// not compared. The walk uses an explicit stack and a visited bitmap, so
/// region size is bounded by memory rather than call depth.
pub fn flood_select(
    raster: &RasterBuffer,
    seed: (u32, u32),
    tolerance: u32,
) -> Result<SelectionMask, SelectionError> {
    let (width, height) = raster.dimensions();
    let (sx, sy) = seed;
    if sx >= width || sy >= height {
        return Err(SelectionError::SeedOutOfBounds {
            x: sx,
            y: sy,
            width,
            height,
        });
    }

    let w = width as usize;
    let target = *raster.get_pixel(sx, sy);
    // mean ≤ tolerance  ⇔  sum ≤ 3 × tolerance, kept in integers
    let limit = tolerance.saturating_mul(3);

    let mut mask = SelectionMask::new(width, height);
    let mut visited = vec![false; w * height as usize];
    let mut stack: Vec<(u32, u32)> = Vec::with_capacity(1024);

    visited[sy as usize * w + sx as usize] = true;
    stack.push(seed);

    while let Some((x, y)) = stack.pop() {
        mask.set(x, y, true);

        let neighbours = [
            (x.checked_sub(1), Some(y)),
            (x.checked_add(1).filter(|&nx| nx < width), Some(y)),
            (Some(x), y.checked_sub(1)),
            (Some(x), y.checked_add(1).filter(|&ny| ny < height)),
        ];
        for (nx, ny) in neighbours {
            let (Some(nx), Some(ny)) = (nx, ny) else {
                continue;
            };
            let index = ny as usize * w + nx as usize;
            if visited[index] {
                continue;
            }
            visited[index] = true;
            if channel_distance(raster.get_pixel(nx, ny), &target) <= limit {
                stack.push((nx, ny));
            }
        }
    }

    debug!(
        seed_x = sx,
        seed_y = sy,
        tolerance,
        selected = mask.count(),
        "Flood selection complete"
    );
    Ok(mask)
}

/// Sum of absolute R, G, B differences.
#[inline]
fn channel_distance(a: &Rgba<u8>, b: &Rgba<u8>) -> u32 {
    (0..3)
        .map(|c| (a[c] as i32 - b[c] as i32).unsigned_abs())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    #[test]
    fn test_uniform_raster_selects_everything() {
        let raster = RasterBuffer::from_pixel(10, 10, RED);
        let mask = flood_select(&raster, (0, 0), 0).unwrap();
        assert_eq!(mask.count(), 100);
    }

    #[test]
    fn test_stops_at_colour_boundary() {
        let mut raster = RasterBuffer::from_pixel(6, 3, RED);
        for y in 0..3 {
            raster.put_pixel(3, y, BLUE);
        }
        let mask = flood_select(&raster, (0, 1), 10).unwrap();

        assert_eq!(mask.count(), 9);
        assert!(!mask.contains(3, 0));
        assert!(!mask.contains(4, 0));
    }

    #[test]
    fn test_diagonal_is_not_connected() {
        let mut raster = RasterBuffer::from_pixel(3, 3, BLUE);
        raster.put_pixel(0, 0, RED);
        raster.put_pixel(1, 1, RED);
        let mask = flood_select(&raster, (0, 0), 0).unwrap();
        assert_eq!(mask.count(), 1);
    }

    #[test]
    fn test_tolerance_is_mean_channel_difference() {
        let mut raster = RasterBuffer::from_pixel(3, 1, Rgba([100, 100, 100, 255]));
        // Mean difference exactly 10.
        raster.put_pixel(1, 0, Rgba([110, 110, 110, 255]));
        // Mean difference 10.33.
        raster.put_pixel(2, 0, Rgba([111, 110, 110, 255]));

        let mask = flood_select(&raster, (0, 0), 10).unwrap();
        assert!(mask.contains(1, 0));
        assert!(!mask.contains(2, 0));

        // One channel differing by 30 is a mean of 10, still within tolerance.
        let mut raster = RasterBuffer::from_pixel(2, 1, Rgba([100, 100, 100, 255]));
        raster.put_pixel(1, 0, Rgba([130, 100, 100, 255]));
        assert_eq!(flood_select(&raster, (0, 0), 10).unwrap().count(), 2);
    }

    #[test]
    fn test_compares_against_seed_not_neighbour() {
        // A gradient creeps 5 per step; tolerance 10 only reaches two steps.
        let mut raster = RasterBuffer::new(5, 1);
        for x in 0..5 {
            let v = (x * 5) as u8;
            raster.put_pixel(x, 0, Rgba([v, v, v, 255]));
        }
        let mask = flood_select(&raster, (0, 0), 10).unwrap();
        assert_eq!(mask.count(), 3);
    }

    #[test]
    fn test_alpha_is_ignored() {
        let mut raster = RasterBuffer::from_pixel(2, 1, RED);
        raster.put_pixel(1, 0, Rgba([255, 0, 0, 0]));
        assert_eq!(flood_select(&raster, (0, 0), 0).unwrap().count(), 2);
    }

    #[test]
    fn test_selected_pixels_are_within_tolerance() {
        let raster = RasterBuffer::from_fn(16, 16, |x, y| {
            Rgba([(x * 16) as u8, (y * 16) as u8, ((x + y) * 8) as u8, 255])
        });
        let seed = *raster.get_pixel(8, 8);
        let mask = flood_select(&raster, (8, 8), 20).unwrap();

        for (x, y, pixel) in raster.enumerate_pixels() {
            if mask.contains(x, y) {
                assert!(channel_distance(pixel, &seed) <= 60);
            }
        }
        assert!(mask.contains(8, 8));
    }

    #[test]
    fn test_seed_out_of_bounds() {
        let raster = RasterBuffer::new(4, 4);
        assert_eq!(
            flood_select(&raster, (4, 0), 0).unwrap_err(),
            SelectionError::SeedOutOfBounds {
                x: 4,
                y: 0,
                width: 4,
                height: 4
            }
        );
    }

    #[test]
    fn test_large_region_does_not_overflow_stack() {
        let raster = RasterBuffer::from_pixel(1000, 1000, RED);
        let mask = flood_select(&raster, (500, 500), 0).unwrap();
        assert_eq!(mask.count(), 1_000_000);
    }
}
