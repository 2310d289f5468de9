//! Layer model shared by every other component.
//!
//! A [`Layer`] is one independently toggleable visual contribution to a
//! composite: a vector feature collection, a single-band numeric grid, or a
//! plain image. Layers are created by the [`source`](crate::source) module,
//! collected in a [`LayerStack`], and read by the compositor and the
//! comparison engine.
//!
//! # Ordering
//!
//! Layers composite bottom-to-top by ascending `z_order`. Layers sharing a
//! `z_order` keep the order in which they were inserted into the stack.
//!
//! ```
//! use overlaymap::layer::{Layer, LayerPayload, LayerStack};
//! use image::RgbaImage;
//!
//! let mut stack = LayerStack::new();
//! let base = stack.push(Layer::new("base", LayerPayload::Image(RgbaImage::new(4, 4)), None));
//! let overlay = stack.push(
//!     Layer::new("1890 survey", LayerPayload::Image(RgbaImage::new(4, 4)), None).with_opacity(0.5),
//! );
//!
//! let order: Vec<_> = stack.visible_ordered().iter().map(|l| l.id()).collect();
//! assert_eq!(order, vec![base, overlay]);
//! ```

mod geometry;
mod stack;
mod types;

pub use geometry::{Coord, Feature, FeatureCollection, Geometry, NumericGrid};
pub use stack::{LayerStack, LoadFailure};
pub use types::{Bounds, BoundsBuilder, Layer, LayerId, LayerKind, LayerPayload, RasterBuffer};
