//! Integration tests for loading sources and compositing a layer stack.
//!
//! These tests write real files to a temporary directory and verify:
//! - Mixed vector, grid and image sources normalize into one stack
//! - Failing sources are reported without aborting the rest
//! - Z-order, visibility and opacity decide what reaches the output
//! - A shared viewport places vector layers consistently
//! - Registration marks are drawn over everything

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use overlaymap::composite::{Canvas, Compositor, RegistrationMarks};
use overlaymap::layer::{LayerId, LayerKind, LayerPayload, LayerStack};
use overlaymap::source::SourceError;
use tempfile::TempDir;

// =============================================================================
// Test Helpers
// =============================================================================

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const SIZE: u32 = 20;

/// A polygon over the western half of a 10×10 square, plus a point at its
/// north-east corner so the vector bounds span the whole square.
const PARISH_GEOJSON: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {"type": "Feature", "properties": {"name": "west"},
         "geometry": {"type": "Polygon",
                      "coordinates": [[[0, 0], [5, 0], [5, 10], [0, 10], [0, 0]]]}},
        {"type": "Feature", "properties": {"name": "church"},
         "geometry": {"type": "Point", "coordinates": [10, 10]}}
    ]
}"#;

const ELEVATION_ASC: &str = "ncols 2\nnrows 2\nxllcorner 0\nyllcorner 0\ncellsize 5\nNODATA_value -9999\n0 10\n20 -9999\n";

fn write(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

fn png_bytes(width: u32, height: u32, color: Rgba<u8>) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, color);
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

/// Loads a white scan, the parish vectors and an elevation grid, plus one
/// file that cannot be read.
fn load_fixture() -> (TempDir, LayerStack, usize) {
    let dir = TempDir::new().unwrap();
    let paths = vec![
        write(dir.path(), "scan.png", &png_bytes(SIZE, SIZE, WHITE)),
        write(dir.path(), "parish.geojson", PARISH_GEOJSON.as_bytes()),
        write(dir.path(), "elevation.asc", ELEVATION_ASC.as_bytes()),
        write(dir.path(), "notes.txt", b"not a map"),
    ];

    let mut stack = LayerStack::new();
    let failures = stack.load_sources(&paths);
    (dir, stack, failures.len())
}

fn id_of(stack: &LayerStack, name: &str) -> LayerId {
    stack
        .iter()
        .find(|layer| layer.name() == name)
        .map(|layer| layer.id())
        .unwrap_or_else(|| panic!("no layer named {}", name))
}

fn is_tinted(pixel: Rgba<u8>) -> bool {
    pixel[0] < 230 && pixel[2] >= 250 && pixel[3] == 255
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn test_mixed_sources_load_into_one_stack() {
    let (_dir, stack, failed) = load_fixture();

    assert_eq!(failed, 1);
    assert_eq!(stack.len(), 3);

    let kinds: Vec<LayerKind> = stack.iter().map(|layer| layer.kind()).collect();
    assert!(kinds.contains(&LayerKind::PlainImage));
    assert!(kinds.contains(&LayerKind::VectorFeatureCollection));
    assert!(kinds.contains(&LayerKind::RasterGrid));
}

#[test]
fn test_failed_source_names_the_file() {
    let dir = TempDir::new().unwrap();
    let bad = write(dir.path(), "notes.txt", b"not a map");

    let mut stack = LayerStack::new();
    let failures = stack.load_sources(&[bad]);

    assert!(stack.is_empty());
    assert_eq!(failures.len(), 1);
    assert!(failures[0].source.ends_with("notes.txt"));
    assert!(matches!(
        failures[0].error,
        SourceError::UnsupportedFormat { .. }
    ));
}

#[test]
fn test_grid_keeps_values_and_marks_missing_cells() {
    let (_dir, stack, _) = load_fixture();
    let grid_layer = stack.get(id_of(&stack, "elevation")).unwrap();

    match grid_layer.payload() {
        LayerPayload::Grid { grid, image } => {
            assert_eq!(grid.get(0, 0), Some(0.0));
            assert_eq!(grid.get(1, 0), Some(10.0));
            assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0, 255]);
            assert_eq!(image.get_pixel(1, 1).0[3], 0);
        }
        other => panic!("expected grid payload, got {:?}", other.kind()),
    }
    assert!(grid_layer.bounds().is_some());
}

// =============================================================================
// Compositing
// =============================================================================

#[test]
fn test_vector_over_scan_tints_only_the_polygon() {
    let (_dir, mut stack, _) = load_fixture();
    stack.set_visible(id_of(&stack, "elevation"), false);
    stack.set_z_order(id_of(&stack, "scan"), 0);
    stack.set_z_order(id_of(&stack, "parish"), 1);

    let output = Compositor::new()
        .composite_stack(&stack, &Canvas::new(SIZE, SIZE))
        .unwrap();

    assert_eq!(output.dimensions(), (SIZE, SIZE));
    assert!(is_tinted(*output.get_pixel(5, 10)));
    assert_eq!(*output.get_pixel(15, 10), WHITE);
}

#[test]
fn test_raising_the_scan_covers_the_vectors() {
    let (_dir, mut stack, _) = load_fixture();
    stack.set_visible(id_of(&stack, "elevation"), false);
    stack.set_z_order(id_of(&stack, "parish"), 0);
    stack.set_z_order(id_of(&stack, "scan"), 5);

    let output = Compositor::new()
        .composite_stack(&stack, &Canvas::new(SIZE, SIZE))
        .unwrap();

    assert!(output.pixels().all(|p| *p == WHITE));
}

#[test]
fn test_zero_opacity_layer_does_not_contribute() {
    let (_dir, mut stack, _) = load_fixture();
    stack.set_visible(id_of(&stack, "elevation"), false);
    stack.set_z_order(id_of(&stack, "parish"), 1);
    stack.set_opacity(id_of(&stack, "parish"), 0.0);

    let output = Compositor::new()
        .composite_stack(&stack, &Canvas::new(SIZE, SIZE))
        .unwrap();

    assert!(output.pixels().all(|p| *p == WHITE));
}

#[test]
fn test_empty_stack_composites_to_transparent_canvas() {
    let output = Compositor::new()
        .composite_stack(&LayerStack::new(), &Canvas::new(4, 3))
        .unwrap();

    assert_eq!(output.dimensions(), (4, 3));
    assert!(output.pixels().all(|p| p.0 == [0, 0, 0, 0]));
}

#[test]
fn test_vector_colour_follows_compositor_style() {
    let (_dir, mut stack, _) = load_fixture();
    stack.set_visible(id_of(&stack, "elevation"), false);
    stack.set_visible(id_of(&stack, "scan"), false);

    let output = Compositor::new()
        .with_vector_color(Rgba([255, 0, 0, 255]))
        .composite_stack(&stack, &Canvas::new(SIZE, SIZE))
        .unwrap();

    let inside = output.get_pixel(5, 10);
    assert!(inside[0] >= 250);
    assert_eq!(inside[1], 0);
    assert!(inside[3] > 0 && inside[3] < 255);
}

// =============================================================================
// Registration Marks
// =============================================================================

#[test]
fn test_marks_sit_on_top_of_every_layer() {
    let (_dir, mut stack, _) = load_fixture();
    stack.set_z_order(id_of(&stack, "scan"), 10);

    let canvas = Canvas::new(SIZE, SIZE).with_default_marks();
    let output = Compositor::new().composite_stack(&stack, &canvas).unwrap();

    let red = Rgba([255, 0, 0, 255]);
    assert_eq!(*output.get_pixel(2, 2), red);
    assert_eq!(*output.get_pixel(18, 2), red);
    assert_eq!(*output.get_pixel(10, 18), red);
}

#[test]
fn test_custom_mark_anchors_and_colour() {
    let marks = RegistrationMarks::default_for(SIZE, SIZE)
        .with_anchors(vec![(10, 10)])
        .with_color(Rgba([0, 0, 0, 255]));
    let canvas = Canvas::new(SIZE, SIZE).with_marks(marks);

    let output = Compositor::new()
        .composite_stack(&LayerStack::new(), &canvas)
        .unwrap();

    assert_eq!(output.get_pixel(10, 10).0, [0, 0, 0, 255]);
    assert_eq!(output.get_pixel(2, 2).0, [0, 0, 0, 0]);
}
