//! Single-band numeric grid sources.
//!
//! ESRI ASCII grids carry their own georeferencing header. TIFF files are
//! read through `image`; single-band TIFFs become grids, colour TIFFs are
//! treated as plain images.

use image::{DynamicImage, ImageFormat};
use tracing::debug;

use super::SourceError;
use crate::layer::{Bounds, Layer, LayerPayload, NumericGrid};
use crate::raster;

/// Parsed ESRI ASCII grid header.
#[derive(Debug, Clone, PartialEq)]
struct AsciiHeader {
    ncols: u32,
    nrows: u32,
    x_origin: f64,
    y_origin: f64,
    centered: bool,
    cell_size: f64,
    no_data: Option<f64>,
}

impl AsciiHeader {
    fn bounds(&self) -> Bounds {
        let half = if self.centered { self.cell_size / 2.0 } else { 0.0 };
        let min_x = self.x_origin - half;
        let min_y = self.y_origin - half;
        Bounds::new(
            min_x,
            min_y,
            min_x + self.ncols as f64 * self.cell_size,
            min_y + self.nrows as f64 * self.cell_size,
        )
    }
}

/// Normalizes an ESRI ASCII grid (`.asc`).
pub(crate) fn normalize_ascii(file: &str, name: &str, bytes: &[u8]) -> Result<Layer, SourceError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| SourceError::parse(file, "ASCII grid is not valid UTF-8"))?;
    let (header, grid) = parse_ascii(file, text)?;
    let bounds = header.bounds();

    debug!(
        file = file,
        ncols = header.ncols,
        nrows = header.nrows,
        cell_size = header.cell_size,
        "Normalized ASCII grid"
    );

    let image = raster::decode_grid(&grid);
    Ok(Layer::new(name, LayerPayload::Grid { grid, image }, Some(bounds)))
}

const HEADER_KEYS: [&str; 8] = [
    "ncols",
    "nrows",
    "xllcorner",
    "yllcorner",
    "xllcenter",
    "yllcenter",
    "cellsize",
    "nodata_value",
];

fn parse_ascii(file: &str, text: &str) -> Result<(AsciiHeader, NumericGrid), SourceError> {
    let mut ncols = None;
    let mut nrows = None;
    let mut x_origin = None;
    let mut y_origin = None;
    let mut centered = false;
    let mut cell_size = None;
    let mut no_data = None;

    let mut lines = text.lines().peekable();
    while let Some(&line) = lines.peek() {
        let mut tokens = line.split_whitespace();
        let Some(key) = tokens.next() else {
            lines.next();
            continue;
        };
        // Header lines end at the first token that is not a header key.
        let name = key.to_ascii_lowercase();
        if !HEADER_KEYS.contains(&name.as_str()) {
            break;
        }
        let value = tokens
            .next()
            .ok_or_else(|| SourceError::parse(file, format!("header '{}' has no value", key)))?;
        let number = || {
            value.parse::<f64>().map_err(|_| {
                SourceError::parse(file, format!("header '{}' has invalid value '{}'", key, value))
            })
        };
        let count = || {
            value.parse::<u32>().map_err(|_| {
                SourceError::parse(file, format!("header '{}' has invalid value '{}'", key, value))
            })
        };

        match name.as_str() {
            "ncols" => ncols = Some(count()?),
            "nrows" => nrows = Some(count()?),
            "xllcorner" => x_origin = Some(number()?),
            "yllcorner" => y_origin = Some(number()?),
            "xllcenter" => {
                x_origin = Some(number()?);
                centered = true;
            }
            "yllcenter" => {
                y_origin = Some(number()?);
                centered = true;
            }
            "cellsize" => cell_size = Some(number()?),
            "nodata_value" => no_data = Some(number()?),
            _ => break,
        }
        lines.next();
    }

    let missing = |key: &str| SourceError::parse(file, format!("missing header '{}'", key));
    let header = AsciiHeader {
        ncols: ncols.ok_or_else(|| missing("ncols"))?,
        nrows: nrows.ok_or_else(|| missing("nrows"))?,
        x_origin: x_origin.ok_or_else(|| missing("xllcorner"))?,
        y_origin: y_origin.ok_or_else(|| missing("yllcorner"))?,
        centered,
        cell_size: cell_size.ok_or_else(|| missing("cellsize"))?,
        no_data,
    };
    if header.cell_size <= 0.0 || !header.cell_size.is_finite() {
        return Err(SourceError::parse(file, "cellsize must be positive"));
    }

    let values = lines
        .flat_map(str::split_whitespace)
        .map(|token| {
            token
                .parse::<f64>()
                .map_err(|_| SourceError::parse(file, format!("invalid cell value '{}'", token)))
        })
        .collect::<Result<Vec<f64>, _>>()?;

    let expected = header.ncols as usize * header.nrows as usize;
    let found = values.len();
    let mut grid = NumericGrid::new(header.ncols, header.nrows, values).ok_or_else(|| {
        SourceError::parse(
            file,
            format!("expected {} cell values, found {}", expected, found),
        )
    })?;
    if let Some(no_data) = header.no_data {
        grid = grid.with_no_data(no_data);
    }
    Ok((header, grid))
}

/// Normalizes a TIFF. Single-band data becomes a grid layer without bounds.
pub(crate) fn normalize_tiff(file: &str, name: &str, bytes: &[u8]) -> Result<Layer, SourceError> {
    let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Tiff)
        .map_err(|e| SourceError::parse(file, format!("TIFF decode failed: {}", e)))?;

    let (width, height) = (decoded.width(), decoded.height());
    let values: Vec<f64> = match &decoded {
        DynamicImage::ImageLuma8(buffer) => buffer.as_raw().iter().map(|&v| v as f64).collect(),
        DynamicImage::ImageLuma16(buffer) => buffer.as_raw().iter().map(|&v| v as f64).collect(),
        DynamicImage::ImageLumaA8(_) | DynamicImage::ImageLumaA16(_) => decoded
            .to_luma32f()
            .as_raw()
            .iter()
            .map(|&v| v as f64)
            .collect(),
        _ => {
            debug!(file = file, "TIFF is multi-band, loading as plain image");
            return Ok(Layer::new(name, LayerPayload::Image(decoded.to_rgba8()), None));
        }
    };

    let grid = NumericGrid::new(width, height, values)
        .ok_or_else(|| SourceError::parse(file, "TIFF sample count does not match dimensions"))?;
    debug!(file = file, width, height, "Normalized TIFF grid");

    let image = raster::decode_grid(&grid);
    Ok(Layer::new(name, LayerPayload::Grid { grid, image }, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::LayerKind;
    use image::{GrayImage, Luma, Rgba, RgbaImage};
    use std::io::Cursor;

    const SAMPLE: &str = "ncols 3\n\
                          nrows 2\n\
                          xllcorner 100.0\n\
                          yllcorner 200.0\n\
                          cellsize 10\n\
                          NODATA_value -9999\n\
                          0 50 100\n\
                          -9999 25 75\n";

    #[test]
    fn test_ascii_grid_header_and_values() {
        let (header, grid) = parse_ascii("dem.asc", SAMPLE).unwrap();
        assert_eq!(header.ncols, 3);
        assert_eq!(header.nrows, 2);
        assert_eq!(grid.get(2, 0), Some(100.0));
        assert_eq!(grid.no_data(), Some(-9999.0));
        assert_eq!(header.bounds(), Bounds::new(100.0, 200.0, 130.0, 220.0));
    }

    #[test]
    fn test_ascii_grid_layer_is_decoded() {
        let layer = normalize_ascii("dem.asc", "dem", SAMPLE.as_bytes()).unwrap();
        assert_eq!(layer.kind(), LayerKind::RasterGrid);

        let image = layer.payload().raster().unwrap();
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(*image.get_pixel(0, 0), Rgba([0, 0, 0, 255]));
        assert_eq!(*image.get_pixel(2, 0), Rgba([255, 255, 255, 255]));
        assert_eq!(*image.get_pixel(0, 1), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_center_registration_shifts_bounds() {
        let text = "ncols 2\nnrows 2\nxllcenter 5\nyllcenter 5\ncellsize 10\n1 2\n3 4\n";
        let (header, _) = parse_ascii("c.asc", text).unwrap();
        assert_eq!(header.bounds(), Bounds::new(0.0, 0.0, 20.0, 20.0));
    }

    #[test]
    fn test_ascii_grid_wrong_value_count() {
        let text = "ncols 2\nnrows 2\nxllcorner 0\nyllcorner 0\ncellsize 1\n1 2 3\n";
        let err = parse_ascii("short.asc", text).unwrap_err();
        assert!(err.to_string().contains("expected 4 cell values, found 3"));
    }

    #[test]
    fn test_ascii_grid_missing_header() {
        let text = "ncols 2\nxllcorner 0\nyllcorner 0\ncellsize 1\n1 2\n";
        let err = parse_ascii("bad.asc", text).unwrap_err();
        assert!(err.to_string().contains("nrows"));
    }

    #[test]
    fn test_ascii_grid_bad_cell_value() {
        let text = "ncols 1\nnrows 1\nxllcorner 0\nyllcorner 0\ncellsize 1\nabc\n";
        let err = parse_ascii("bad.asc", text).unwrap_err();
        assert!(err.to_string().contains("invalid cell value 'abc'"));

        let text = "ncols 2\nnrows 1\nxllcorner 0\nyllcorner 0\ncellsize 1\n1 x\n";
        let err = parse_ascii("bad.asc", text).unwrap_err();
        assert!(err.to_string().contains("invalid cell value 'x'"));
    }

    #[test]
    fn test_ascii_grid_nan_row_is_data() {
        let text = "ncols 2\nnrows 2\nxllcorner 0\nyllcorner 0\ncellsize 1\nnan 1\n2 NaN\n";
        let (header, grid) = parse_ascii("gaps.asc", text).unwrap();
        assert_eq!(header.nrows, 2);
        assert_eq!(grid.values().len(), 4);
        assert!(grid.get(0, 0).is_some_and(f64::is_nan));
        assert_eq!(grid.get(1, 0), Some(1.0));

        let layer = normalize_ascii("gaps.asc", "gaps", text.as_bytes()).unwrap();
        let image = layer.payload().raster().unwrap();
        assert_eq!(image.get_pixel(0, 0).0[3], 0);
        assert_eq!(image.get_pixel(1, 1).0[3], 0);
        assert_eq!(image.get_pixel(1, 0).0[3], 255);
    }

    fn encode_tiff(image: DynamicImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Tiff)
            .unwrap();
        bytes
    }

    #[test]
    fn test_grayscale_tiff_becomes_grid() {
        let mut gray = GrayImage::new(2, 1);
        gray.put_pixel(0, 0, Luma([10]));
        gray.put_pixel(1, 0, Luma([20]));
        let bytes = encode_tiff(DynamicImage::ImageLuma8(gray));

        let layer = normalize_tiff("scan.tif", "scan", &bytes).unwrap();
        assert_eq!(layer.kind(), LayerKind::RasterGrid);
        assert!(layer.bounds().is_none());
        match layer.payload() {
            LayerPayload::Grid { grid, image } => {
                assert_eq!(grid.values(), &[10.0, 20.0]);
                assert_eq!(image.get_pixel(1, 0).0, [255, 255, 255, 255]);
            }
            _ => panic!("expected grid payload"),
        }
    }

    #[test]
    fn test_colour_tiff_becomes_image() {
        let rgba = RgbaImage::from_pixel(2, 2, Rgba([200, 10, 10, 255]));
        let bytes = encode_tiff(DynamicImage::ImageRgba8(rgba));

        let layer = normalize_tiff("photo.tif", "photo", &bytes).unwrap();
        assert_eq!(layer.kind(), LayerKind::PlainImage);
    }

    #[test]
    fn test_garbage_tiff_is_parse_error() {
        let err = normalize_tiff("junk.tif", "junk", b"not a tiff").unwrap_err();
        assert!(matches!(err, SourceError::Parse { .. }));
    }
}
