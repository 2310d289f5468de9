//! Plain image sources and world-file georeferencing.

use tracing::debug;

use super::SourceError;
use crate::layer::{Bounds, BoundsBuilder, Layer, LayerPayload};

/// Six-parameter affine transform from a world file.
///
/// Maps pixel `(col, row)` to `(a·col + b·row + c, d·col + e·row + f)`,
/// where `(c, f)` is the centre of the top-left pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldFile {
    pub a: f64,
    pub d: f64,
    pub b: f64,
    pub e: f64,
    pub c: f64,
    pub f: f64,
}

impl WorldFile {
    /// Parses the six lines of a world file, in file order `A D B E C F`.
    pub fn parse(file: &str, text: &str) -> Result<Self, SourceError> {
        let values = text
            .split_whitespace()
            .map(|token| {
                token.parse::<f64>().map_err(|_| {
                    SourceError::parse(file, format!("invalid world file value '{}'", token))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        match values[..] {
            [a, d, b, e, c, f] => Ok(Self { a, d, b, e, c, f }),
            _ => Err(SourceError::parse(
                file,
                format!("world file needs 6 values, found {}", values.len()),
            )),
        }
    }

    /// Maps a pixel-space position to world coordinates.
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.a * col + self.b * row + self.c,
            self.d * col + self.e * row + self.f,
        )
    }

    /// Axis-aligned bounds of an image's outer pixel edges.
    pub fn bounds_for(&self, width: u32, height: u32) -> Bounds {
        let (w, h) = (width as f64 - 0.5, height as f64 - 0.5);
        let mut builder = BoundsBuilder::new();
        for (col, row) in [(-0.5, -0.5), (w, -0.5), (-0.5, h), (w, h)] {
            let (x, y) = self.apply(col, row);
            builder.include(x, y);
        }
        builder
            .finish()
            .unwrap_or_else(|| Bounds::new(self.c, self.f, self.c, self.f))
    }
}

/// World-file extensions accepted next to an image, in lookup order.
pub(crate) fn world_file_extensions(image_extension: &str) -> Vec<String> {
    let mut extensions = Vec::new();
    let mut chars = image_extension.chars();
    if let (Some(first), Some(last)) = (chars.next(), image_extension.chars().last()) {
        extensions.push(format!("{}{}w", first, last));
    }
    extensions.push(format!("{}w", image_extension));
    extensions.push("wld".to_string());
    extensions
}

/// Decodes a plain image. Bounds are set only when a world file is given.
pub(crate) fn normalize(
    file: &str,
    name: &str,
    bytes: &[u8],
    world: Option<&WorldFile>,
) -> Result<Layer, SourceError> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| SourceError::parse(file, format!("image decode failed: {}", e)))?;
    let rgba = decoded.to_rgba8();
    let bounds = world.map(|w| w.bounds_for(rgba.width(), rgba.height()));

    debug!(
        file = file,
        width = rgba.width(),
        height = rgba.height(),
        georeferenced = bounds.is_some(),
        "Normalized image"
    );

    Ok(Layer::new(name, LayerPayload::Image(rgba), bounds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, Rgba([1, 2, 3, 255]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(image)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_plain_image_has_no_bounds() {
        let layer = normalize("scan.png", "scan", &png(4, 3), None).unwrap();
        assert!(layer.bounds().is_none());
        assert_eq!(layer.payload().raster().unwrap().dimensions(), (4, 3));
    }

    #[test]
    fn test_world_file_bounds() {
        // 10 units per pixel, top-left pixel centre at (105, 995).
        let world = WorldFile::parse("scan.pgw", "10\n0\n0\n-10\n105\n995\n").unwrap();
        let layer = normalize("scan.png", "scan", &png(4, 3), Some(&world)).unwrap();

        assert_eq!(layer.bounds(), Some(Bounds::new(100.0, 970.0, 140.0, 1000.0)));
    }

    #[test]
    fn test_world_file_rejects_short_input() {
        let err = WorldFile::parse("scan.pgw", "1\n0\n0\n-1\n").unwrap_err();
        assert!(err.to_string().contains("found 4"));

        let err = WorldFile::parse("scan.pgw", "1 0 0 -1 x 0").unwrap_err();
        assert!(err.to_string().contains("'x'"));
    }

    #[test]
    fn test_world_file_extensions() {
        assert_eq!(world_file_extensions("png"), vec!["pgw", "pngw", "wld"]);
        assert_eq!(world_file_extensions("tif"), vec!["tfw", "tifw", "wld"]);
        assert_eq!(world_file_extensions("jpg"), vec!["jgw", "jpgw", "wld"]);
    }

    #[test]
    fn test_corrupt_image_is_parse_error() {
        let err = normalize("broken.png", "broken", b"\x89PNG garbage", None).unwrap_err();
        assert!(matches!(err, SourceError::Parse { ref file, .. } if file == "broken.png"));
    }
}
