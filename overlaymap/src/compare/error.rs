//! Comparison errors.

use thiserror::Error;

use crate::composite::CompositeError;
use crate::layer::LayerId;

/// Errors produced while rendering or driving a comparison.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompareError {
    /// A compared layer is not in the stack.
    #[error("Layer {id} is not in the layer stack")]
    LayerNotFound { id: LayerId },

    #[error(transparent)]
    Composite(#[from] CompositeError),

    /// The blink timer needs a running tokio runtime.
    #[error("Blink timer requires a tokio runtime")]
    NoRuntime,
}
