//! Layer compositing.
//!
//! The [`Compositor`] turns an ordered set of layers into one RGBA raster:
//!
//! ```text
//!   background (transparent or supplied base)
//!        │
//!        ▼
//!   for each contributing layer, ascending z-order:
//!        rasterize ──► resample to canvas ──► blend "over" at layer opacity
//!        │
//!        ▼
//!   registration marks (full strength)
//! ```
//!
//! Vector layers are rasterized with tiny-skia through a [`Viewport`] that
//! maps native coordinates to canvas pixels, north up. When the [`Canvas`]
//! has no explicit viewport, one is fitted around the union of the vector
//! layers' bounds. Raster and image layers are stretched to the canvas.
//!
//! Blending uses straight alpha throughout:
//!
//! ```text
//! sa  = src.a / 255 × opacity
//! out = sa + da × (1 − sa)
//! c   = (src.c × sa + dst.c × da × (1 − sa)) / out
//! ```

mod blend;
mod compositor;
pub(crate) mod draw;
mod error;
mod marks;
mod vector;
mod viewport;

pub use blend::{blend_onto, blend_pixel};
pub use compositor::{Canvas, Compositor};
pub use error::CompositeError;
pub use marks::{RegistrationMarks, MAX_MARKS};
pub use vector::{rasterize_features, VectorStyle};
pub use viewport::Viewport;
