//! Alpha-blended recolouring of a masked region.

use image::Rgba;

use super::EditError;
use crate::layer::RasterBuffer;
use crate::select::SelectionMask;

/// Checks that `opacity` lies in `(0, 1]`.
pub fn validate_opacity(opacity: f32) -> Result<(), EditError> {
    if opacity > 0.0 && opacity <= 1.0 {
        Ok(())
    } else {
        Err(EditError::InvalidOpacity { opacity })
    }
}

/// Recolours masked pixels in place and returns how many changed hands.
///
/// Each masked pixel's R, G, B become `p × (1 − α) + color × α`, rounded;
/// its alpha is left alone. Unmasked pixels are untouched. The colour's own
/// alpha channel is ignored.
pub fn fill_in_place(
    raster: &mut RasterBuffer,
    mask: &SelectionMask,
    color: Rgba<u8>,
    opacity: f32,
) -> Result<usize, EditError> {
    validate_opacity(opacity)?;
    check_dimensions(raster, mask)?;

    let mut filled = 0;
    for (pixel, &cell) in raster.pixels_mut().zip(mask.cells()) {
        if cell == 0 {
            continue;
        }
        for c in 0..3 {
            pixel[c] = mix(pixel[c], color[c], opacity);
        }
        filled += 1;
    }
    Ok(filled)
}

/// Returns a recoloured copy, leaving `raster` untouched.
pub fn apply_fill(
    raster: &RasterBuffer,
    mask: &SelectionMask,
    color: Rgba<u8>,
    opacity: f32,
) -> Result<RasterBuffer, EditError> {
    let mut output = raster.clone();
    fill_in_place(&mut output, mask, color, opacity)?;
    Ok(output)
}

pub(crate) fn check_dimensions(raster: &RasterBuffer, mask: &SelectionMask) -> Result<(), EditError> {
    if raster.dimensions() != mask.dimensions() {
        return Err(EditError::DimensionMismatch {
            mask_width: mask.width(),
            mask_height: mask.height(),
            raster_width: raster.width(),
            raster_height: raster.height(),
        });
    }
    Ok(())
}

#[inline]
fn mix(p: u8, c: u8, alpha: f32) -> u8 {
    (p as f32 * (1.0 - alpha) + c as f32 * alpha)
        .round()
        .clamp(0.0, 255.0) as u8
}
