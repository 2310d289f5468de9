//! Region selection over a displayed raster.
//!
//! Two selectors produce a [`SelectionMask`] shaped like the raster:
//!
//! - [`flood_select`]: magic wand. Grows a 4-connected region from a seed
//!   pixel while the mean absolute R, G, B difference from the seed colour
//!   stays within the tolerance.
//! - [`lasso_select`]: freehand polygon. Marks pixels whose centre passes
//!   the even-odd ray-casting test.
//!
//! An empty mask is a valid result for both.

mod error;
mod flood;
mod lasso;
mod mask;

pub use error::SelectionError;
pub use flood::flood_select;
pub use lasso::{lasso_select, point_in_polygon, MIN_LASSO_POINTS};
pub use mask::{SelectionMask, SELECTED};
