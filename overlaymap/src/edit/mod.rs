//! Fill and undo.
//!
//! [`apply_fill`] and [`fill_in_place`] recolour the masked pixels of a
//! raster:
//!
//! ```text
//! rgb' = rgb × (1 − α) + color × α      α ∈ (0, 1], alpha channel kept
//! ```
//!
//! [`EditSession`] wraps a raster with a pending selection and an
//! [`UndoStack`]; each committed fill pushes the pre-fill raster so
//! [`EditSession::undo`] can restore it byte for byte.
//!
//! ```
//! use image::Rgba;
//! use overlaymap::edit::{EditSession, FillOutcome, UndoOutcome};
//! use overlaymap::layer::RasterBuffer;
//!
//! let red = Rgba([255, 0, 0, 255]);
//! let blue = Rgba([0, 0, 255, 255]);
//! let mut session = EditSession::new(RasterBuffer::from_pixel(10, 10, red));
//!
//! session.select_flood((0, 0), 0).unwrap();
//! assert_eq!(session.commit_fill(blue, 1.0).unwrap(), FillOutcome::Filled { pixels: 100 });
//! assert_eq!(session.undo(), UndoOutcome::Restored);
//! assert_eq!(*session.raster().get_pixel(5, 5), red);
//! ```

mod error;
mod fill;
mod session;
mod undo;

pub use error::EditError;
pub use fill::{apply_fill, fill_in_place, validate_opacity};
pub use session::{EditSession, FillOutcome, UndoOutcome};
pub use undo::{UndoStack, DEFAULT_UNDO_CAPACITY};
