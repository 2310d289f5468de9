//! Interactive editing session over one raster.

use image::Rgba;
use tracing::{debug, info};

use super::fill::{check_dimensions, fill_in_place, validate_opacity};
use super::undo::{UndoStack, DEFAULT_UNDO_CAPACITY};
use super::EditError;
use crate::layer::{Bounds, Layer, LayerPayload, RasterBuffer};
use crate::select::{flood_select, lasso_select, SelectionMask};

/// Result of committing a fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillOutcome {
    /// The given number of pixels were recoloured.
    Filled { pixels: usize },
    /// There was no selection, or it was empty. Nothing was recorded.
    NothingSelected,
}

/// Result of an undo request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoOutcome {
    Restored,
    NothingToUndo,
}

/// Exclusive owner of an editable raster, its pending selection and its
/// undo history.
///
/// A selection is made with [`select_flood`](Self::select_flood) or
/// [`select_lasso`](Self::select_lasso) and consumed by
/// [`commit_fill`](Self::commit_fill). Every committed fill snapshots the
/// raster first, so [`undo`](Self::undo) restores the exact prior bytes.
#[derive(Debug, Clone)]
pub struct EditSession {
    raster: RasterBuffer,
    selection: Option<SelectionMask>,
    undo: UndoStack,
}

impl EditSession {
    pub fn new(raster: RasterBuffer) -> Self {
        Self::with_undo_capacity(raster, DEFAULT_UNDO_CAPACITY)
    }

    pub fn with_undo_capacity(raster: RasterBuffer, capacity: usize) -> Self {
        debug!(
            width = raster.width(),
            height = raster.height(),
            undo_capacity = capacity,
            "Edit session opened"
        );
        Self {
            raster,
            selection: None,
            undo: UndoStack::new(capacity),
        }
    }

    pub fn raster(&self) -> &RasterBuffer {
        &self.raster
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.raster.dimensions()
    }

    /// Replaces the pending selection with a flood selection from `seed`.
    ///
    /// Returns the number of selected pixels. On error the previous
    /// selection is kept.
    pub fn select_flood(&mut self, seed: (u32, u32), tolerance: u32) -> Result<usize, EditError> {
        let mask = flood_select(&self.raster, seed, tolerance)?;
        Ok(self.replace_selection(mask))
    }

    /// Replaces the pending selection with a lasso selection.
    ///
    /// Returns the number of selected pixels. On error the previous
    /// selection is kept.
    pub fn select_lasso(&mut self, points: &[(f64, f64)]) -> Result<usize, EditError> {
        let (width, height) = self.dimensions();
        let mask = lasso_select(width, height, points)?;
        Ok(self.replace_selection(mask))
    }

    /// Installs an externally built mask as the pending selection.
    pub fn set_selection(&mut self, mask: SelectionMask) -> Result<usize, EditError> {
        check_dimensions(&self.raster, &mask)?;
        Ok(self.replace_selection(mask))
    }

    fn replace_selection(&mut self, mask: SelectionMask) -> usize {
        let count = mask.count();
        debug!(selected = count, "Selection updated");
        self.selection = Some(mask);
        count
    }

    pub fn selection(&self) -> Option<&SelectionMask> {
        self.selection.as_ref()
    }

    /// Drops the pending selection, handing it back if there was one.
    pub fn cancel_selection(&mut self) -> Option<SelectionMask> {
        let cancelled = self.selection.take();
        if cancelled.is_some() {
            debug!("Selection cancelled");
        }
        cancelled
    }

    /// Fills the pending selection, consuming it.
    ///
    /// The opacity is validated before the selection is taken, so an invalid
    /// opacity leaves the selection in place.
    pub fn commit_fill(&mut self, color: Rgba<u8>, opacity: f32) -> Result<FillOutcome, EditError> {
        validate_opacity(opacity)?;
        match self.selection.take() {
            Some(mask) => self.fill_with_mask(mask, color, opacity),
            None => Ok(FillOutcome::NothingSelected),
        }
    }

    /// Fills the region of `mask`, consuming it.
    ///
    /// An empty mask records no undo snapshot.
    pub fn fill_with_mask(
        &mut self,
        mask: SelectionMask,
        color: Rgba<u8>,
        opacity: f32,
    ) -> Result<FillOutcome, EditError> {
        validate_opacity(opacity)?;
        check_dimensions(&self.raster, &mask)?;
        if mask.is_empty() {
            debug!("Fill skipped, selection is empty");
            return Ok(FillOutcome::NothingSelected);
        }

        if self.undo.push(self.raster.clone()).is_some() {
            debug!(capacity = self.undo.capacity(), "Oldest undo snapshot evicted");
        }
        let pixels = fill_in_place(&mut self.raster, &mask, color, opacity)?;

        info!(
            pixels,
            color = ?color.0,
            opacity,
            undo_depth = self.undo.len(),
            "Fill committed"
        );
        Ok(FillOutcome::Filled { pixels })
    }

    /// Restores the raster to its state before the last committed fill.
    pub fn undo(&mut self) -> UndoOutcome {
        match self.undo.pop() {
            Some(snapshot) => {
                self.raster = snapshot;
                info!(undo_depth = self.undo.len(), "Fill undone");
                UndoOutcome::Restored
            }
            None => {
                debug!("Nothing to undo");
                UndoOutcome::NothingToUndo
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Colour of the pixel at `(x, y)`, if inside the raster.
    pub fn pick_color(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        self.raster.get_pixel_checked(x, y).copied()
    }

    /// Ends the session, returning the edited raster.
    pub fn into_raster(self) -> RasterBuffer {
        self.raster
    }

    /// Ends the session, wrapping the edited raster as a new image layer.
    pub fn into_layer(self, name: impl Into<String>, bounds: Option<Bounds>) -> Layer {
        Layer::new(name, LayerPayload::Image(self.raster), bounds)
    }
}
