//! Editing errors.

use thiserror::Error;

use crate::select::SelectionError;

/// Errors produced while filling or selecting in an edit session.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EditError {
    /// The mask and the raster differ in size.
    #[error("Mask is {mask_width}×{mask_height} but raster is {raster_width}×{raster_height}")]
    DimensionMismatch {
        mask_width: u32,
        mask_height: u32,
        raster_width: u32,
        raster_height: u32,
    },

    /// Fill opacity must lie in (0, 1].
    #[error("Fill opacity {opacity} is outside (0, 1]")]
    InvalidOpacity { opacity: f32 },

    #[error(transparent)]
    Selection(#[from] SelectionError),
}
