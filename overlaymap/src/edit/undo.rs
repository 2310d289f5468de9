//! Bounded undo history of raster snapshots.

use std::collections::VecDeque;

use crate::layer::RasterBuffer;

/// Default number of snapshots kept.
pub const DEFAULT_UNDO_CAPACITY: usize = 20;

/// Ring buffer of pre-edit rasters, most recent last.
///
/// When full, pushing evicts the oldest snapshot.
#[derive(Debug, Clone)]
pub struct UndoStack {
    snapshots: VecDeque<RasterBuffer>,
    capacity: usize,
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_CAPACITY)
    }
}

impl UndoStack {
    /// Creates a stack holding at most `capacity` snapshots (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            snapshots: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Records a snapshot, returning the evicted one if the stack was full.
    pub fn push(&mut self, snapshot: RasterBuffer) -> Option<RasterBuffer> {
        let evicted = if self.snapshots.len() == self.capacity {
            self.snapshots.pop_front()
        } else {
            None
        };
        self.snapshots.push_back(snapshot);
        evicted
    }

    pub fn pop(&mut self) -> Option<RasterBuffer> {
        self.snapshots.pop_back()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}
