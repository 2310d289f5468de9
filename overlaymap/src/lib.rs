//! overlaymap - layer compositing and region editing for historical maps
//!
//! This library loads heterogeneous geographic sources into a common layer
//! model, composites them into a single raster, compares two layers
//! interactively, and recolours selected regions with undo.
//!
//! ```text
//! files ──► source ──► Layer ──► LayerStack ──► composite ──► RasterBuffer
//!                       │                        compare  ──► frame
//!                       └─ raster (grid decode)  select   ──► SelectionMask
//!                                                edit     ──► fill / undo
//! ```
//!
//! # Example
//!
//! ```
//! use image::Rgba;
//! use overlaymap::composite::{Canvas, Compositor};
//! use overlaymap::layer::{Layer, LayerPayload, LayerStack, RasterBuffer};
//!
//! let mut stack = LayerStack::new();
//! stack.push(Layer::new(
//!     "base",
//!     LayerPayload::Image(RasterBuffer::from_pixel(8, 8, Rgba([255, 0, 0, 255]))),
//!     None,
//! ));
//!
//! let output = Compositor::new()
//!     .composite_stack(&stack, &Canvas::new(8, 8))
//!     .unwrap();
//! assert_eq!(output.get_pixel(4, 4).0, [255, 0, 0, 255]);
//! ```

pub mod color;
pub mod compare;
pub mod composite;
pub mod config;
pub mod edit;
pub mod layer;
pub mod logging;
pub mod raster;
pub mod select;
pub mod source;

/// Version of the overlaymap library and CLI.
///
/// This is synchronized across all components in the workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
