//! Compositing errors.

use thiserror::Error;

/// Errors produced while building a composite.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompositeError {
    /// A buffer does not match the canvas it is drawn onto.
    #[error("Dimension mismatch: expected {expected_width}×{expected_height}, got {actual_width}×{actual_height}")]
    DimensionMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    /// The requested canvas cannot be allocated.
    #[error("Invalid canvas size {width}×{height}")]
    InvalidSize { width: u32, height: u32 },
}

impl CompositeError {
    pub(crate) fn mismatch(expected: (u32, u32), actual: (u32, u32)) -> Self {
        Self::DimensionMismatch {
            expected_width: expected.0,
            expected_height: expected.1,
            actual_width: actual.0,
            actual_height: actual.1,
        }
    }
}
