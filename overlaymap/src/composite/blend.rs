//! Straight-alpha "over" blending.

use image::Rgba;

use super::CompositeError;
use crate::layer::RasterBuffer;

/// Blends `src` over `dst`, scaling the source alpha by `opacity`.
///
/// Both pixels carry straight (non-premultiplied) alpha, as does the result.
#[inline]
pub fn blend_pixel(dst: Rgba<u8>, src: Rgba<u8>, opacity: f32) -> Rgba<u8> {
    let opacity = if opacity.is_nan() { 0.0 } else { opacity.clamp(0.0, 1.0) };
    if src[3] == 0 || opacity == 0.0 {
        return dst;
    }
    if src[3] == 255 && opacity >= 1.0 {
        return src;
    }

    let sa = src[3] as f32 / 255.0 * opacity;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |s: u8, d: u8| -> u8 {
        let value = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
        value.round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        channel(src[0], dst[0]),
        channel(src[1], dst[1]),
        channel(src[2], dst[2]),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

/// Blends every pixel of `src` over the matching pixel of `dst`.
pub fn blend_onto(
    dst: &mut RasterBuffer,
    src: &RasterBuffer,
    opacity: f32,
) -> Result<(), CompositeError> {
    if dst.dimensions() != src.dimensions() {
        return Err(CompositeError::mismatch(dst.dimensions(), src.dimensions()));
    }
    for (d, s) in dst.pixels_mut().zip(src.pixels()) {
        *d = blend_pixel(*d, *s, opacity);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
    const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

    #[test]
    fn test_opaque_source_replaces() {
        assert_eq!(blend_pixel(RED, BLUE, 1.0), BLUE);
    }

    #[test]
    fn test_transparent_source_keeps_destination() {
        assert_eq!(blend_pixel(RED, CLEAR, 1.0), RED);
        assert_eq!(blend_pixel(RED, BLUE, 0.0), RED);
    }

    #[test]
    fn test_half_opacity_over_opaque() {
        let out = blend_pixel(RED, BLUE, 0.5);
        assert_eq!(out, Rgba([128, 0, 128, 255]));
    }

    #[test]
    fn test_over_transparent_keeps_source_colour() {
        let out = blend_pixel(CLEAR, BLUE, 0.5);
        assert_eq!(out, Rgba([0, 0, 255, 128]));
    }

    #[test]
    fn test_source_alpha_and_opacity_multiply() {
        let half_blue = Rgba([0, 0, 255, 128]);
        let out = blend_pixel(RED, half_blue, 0.5);
        // sa = 128/255 × 0.5 ≈ 0.251
        assert_eq!(out, Rgba([191, 0, 64, 255]));
    }

    #[test]
    fn test_blend_onto_checks_dimensions() {
        let mut dst = RasterBuffer::new(2, 2);
        let src = RasterBuffer::new(3, 2);
        let err = blend_onto(&mut dst, &src, 1.0).unwrap_err();
        assert_eq!(err, CompositeError::mismatch((2, 2), (3, 2)));
    }

    #[test]
    fn test_blend_onto_whole_buffer() {
        let mut dst = RasterBuffer::from_pixel(2, 1, RED);
        let mut src = RasterBuffer::new(2, 1);
        src.put_pixel(1, 0, BLUE);

        blend_onto(&mut dst, &src, 1.0).unwrap();
        assert_eq!(*dst.get_pixel(0, 0), RED);
        assert_eq!(*dst.get_pixel(1, 0), BLUE);
    }
}
