//! The active layer set of one map/editing context.

use std::path::Path;

use tracing::{debug, info, warn};

use super::types::{Bounds, Layer, LayerId};
use crate::source::{self, SourceError};

/// A source that could not be turned into a layer.
///
/// The failing source is dropped from the active set; the rest of the batch
/// is kept.
#[derive(Debug)]
pub struct LoadFailure {
    /// Path or name of the offending source.
    pub source: String,
    pub error: SourceError,
}

#[derive(Debug, Clone)]
struct Entry {
    sequence: u64,
    layer: Layer,
}

/// Owned collection of layers with stable insertion order.
#[derive(Debug, Clone, Default)]
pub struct LayerStack {
    entries: Vec<Entry>,
    next_sequence: u64,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a layer on top of existing layers with the same z-order.
    pub fn push(&mut self, layer: Layer) -> LayerId {
        let id = layer.id();
        self.entries.push(Entry {
            sequence: self.next_sequence,
            layer,
        });
        self.next_sequence += 1;
        id
    }

    /// Removes a layer and hands it back to the caller.
    pub fn remove(&mut self, id: LayerId) -> Option<Layer> {
        let index = self.entries.iter().position(|e| e.layer.id() == id)?;
        Some(self.entries.remove(index).layer)
    }

    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.entries
            .iter()
            .find(|e| e.layer.id() == id)
            .map(|e| &e.layer)
    }

    pub fn get_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.entries
            .iter_mut()
            .find(|e| e.layer.id() == id)
            .map(|e| &mut e.layer)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Layers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.entries.iter().map(|e| &e.layer)
    }

    /// All layers sorted bottom-to-top: ascending z-order, then insertion.
    pub fn ordered(&self) -> Vec<&Layer> {
        let mut entries: Vec<&Entry> = self.entries.iter().collect();
        entries.sort_by_key(|e| (e.layer.z_order(), e.sequence));
        entries.into_iter().map(|e| &e.layer).collect()
    }

    /// Visible layers sorted bottom-to-top.
    pub fn visible_ordered(&self) -> Vec<&Layer> {
        self.ordered()
            .into_iter()
            .filter(|layer| layer.is_visible())
            .collect()
    }

    /// Returns false when the layer does not exist.
    pub fn set_visible(&mut self, id: LayerId, visible: bool) -> bool {
        match self.get_mut(id) {
            Some(layer) => {
                layer.set_visible(visible);
                true
            }
            None => false,
        }
    }

    /// Returns false when the layer does not exist.
    pub fn set_opacity(&mut self, id: LayerId, opacity: f32) -> bool {
        match self.get_mut(id) {
            Some(layer) => {
                layer.set_opacity(opacity);
                true
            }
            None => false,
        }
    }

    /// Returns false when the layer does not exist.
    pub fn set_z_order(&mut self, id: LayerId, z_order: i32) -> bool {
        match self.get_mut(id) {
            Some(layer) => {
                layer.set_z_order(z_order);
                true
            }
            None => false,
        }
    }

    /// Union of the bounds of every layer that has bounds.
    pub fn bounds(&self) -> Option<Bounds> {
        self.iter()
            .filter_map(|layer| layer.bounds())
            .reduce(|acc, b| acc.union(&b))
    }

    /// Loads every path, keeping the layers that normalize successfully.
    ///
    /// Each failing path is reported in the returned list and contributes no
    /// layer; loading continues with the next path.
    pub fn load_sources<P: AsRef<Path>>(&mut self, paths: &[P]) -> Vec<LoadFailure> {
        let mut failures = Vec::new();

        for path in paths {
            let path = path.as_ref();
            match source::load_path(path) {
                Ok(layers) => {
                    debug!(path = %path.display(), count = layers.len(), "Loaded source");
                    for layer in layers {
                        self.push(layer);
                    }
                }
                Err(error) => {
                    warn!(path = %path.display(), error = %error, "Dropping source that failed to load");
                    failures.push(LoadFailure {
                        source: path.display().to_string(),
                        error,
                    });
                }
            }
        }

        info!(
            layers = self.len(),
            failed = failures.len(),
            "Layer stack loaded"
        );
        failures
    }
}
