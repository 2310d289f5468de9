//! Selection errors.

use thiserror::Error;

/// Errors produced by region selection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// A lasso needs at least three vertices to enclose anything.
    #[error("Lasso needs at least 3 points, got {count}")]
    InsufficientPoints { count: usize },

    /// The flood seed lies outside the raster.
    #[error("Seed ({x}, {y}) is outside the {width}×{height} raster")]
    SeedOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    /// Two masks of different sizes cannot be combined.
    #[error("Mask size mismatch: {left_width}×{left_height} vs {right_width}×{right_height}")]
    DimensionMismatch {
        left_width: u32,
        left_height: u32,
        right_width: u32,
        right_height: u32,
    },
}
