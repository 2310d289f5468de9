//! Layer, identifier and bounds types.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use image::{Rgba, RgbaImage};

use super::geometry::{FeatureCollection, NumericGrid};

/// A dense RGBA pixel grid.
///
/// Compositor output, comparison frames and editable overlays all use this
/// type. Channels are straight (non-premultiplied) alpha.
pub type RasterBuffer = RgbaImage;

static NEXT_LAYER_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque, process-unique layer identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(u64);

impl LayerId {
    fn next() -> Self {
        Self(NEXT_LAYER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value, useful for logging and persistence by callers.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer-{}", self.0)
    }
}

/// Axis-aligned bounding box in the source's native coordinate units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Creates bounds from two corners, in any order.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            min_x: x0.min(x1),
            min_y: y0.min(y1),
            max_x: x0.max(x1),
            max_y: y0.max(y1),
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Smallest bounds enclosing both `self` and `other`.
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}] - [{}, {}]",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}

/// Accumulates coordinates into an optional bounding box.
///
/// Non-finite coordinates are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundsBuilder {
    bounds: Option<Bounds>,
}

impl BoundsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include(&mut self, x: f64, y: f64) {
        if !x.is_finite() || !y.is_finite() {
            return;
        }
        let point = Bounds::new(x, y, x, y);
        self.bounds = Some(match self.bounds {
            Some(existing) => existing.union(&point),
            None => point,
        });
    }

    pub fn finish(self) -> Option<Bounds> {
        self.bounds
    }
}

/// The three kinds of layer the normalizer produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    VectorFeatureCollection,
    RasterGrid,
    PlainImage,
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerKind::VectorFeatureCollection => write!(f, "vector"),
            LayerKind::RasterGrid => write!(f, "grid"),
            LayerKind::PlainImage => write!(f, "image"),
        }
    }
}

/// Kind-specific layer contents.
#[derive(Debug, Clone)]
pub enum LayerPayload {
    /// Vector features, rasterized on demand by the compositor.
    Vector(FeatureCollection),
    /// A numeric grid together with its decoded grayscale bitmap.
    Grid {
        grid: NumericGrid,
        image: RasterBuffer,
    },
    /// A decoded RGBA bitmap.
    Image(RasterBuffer),
}

impl LayerPayload {
    pub fn kind(&self) -> LayerKind {
        match self {
            LayerPayload::Vector(_) => LayerKind::VectorFeatureCollection,
            LayerPayload::Grid { .. } => LayerKind::RasterGrid,
            LayerPayload::Image(_) => LayerKind::PlainImage,
        }
    }

    /// Pixel data for raster payloads; `None` for vector payloads.
    pub fn raster(&self) -> Option<&RasterBuffer> {
        match self {
            LayerPayload::Vector(_) => None,
            LayerPayload::Grid { image, .. } => Some(image),
            LayerPayload::Image(image) => Some(image),
        }
    }
}

/// One independently toggleable visual contribution to a composite.
///
/// Identity (`id`, `created_at`) and contents are fixed at construction;
/// presentation fields are changed through setters so that `opacity` always
/// stays within `[0, 1]`.
#[derive(Debug, Clone)]
pub struct Layer {
    id: LayerId,
    name: String,
    payload: LayerPayload,
    bounds: Option<Bounds>,
    visible: bool,
    opacity: f32,
    color: Option<Rgba<u8>>,
    z_order: i32,
    created_at: Instant,
    crs: Option<String>,
    tags: BTreeMap<String, String>,
}

impl Layer {
    /// Creates a visible, fully opaque layer at z-order 0 with a fresh id.
    pub fn new(name: impl Into<String>, payload: LayerPayload, bounds: Option<Bounds>) -> Self {
        Self {
            id: LayerId::next(),
            name: name.into(),
            payload,
            bounds,
            visible: true,
            opacity: 1.0,
            color: None,
            z_order: 0,
            created_at: Instant::now(),
            crs: None,
            tags: BTreeMap::new(),
        }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.set_opacity(opacity);
        self
    }

    pub fn with_z_order(mut self, z_order: i32) -> Self {
        self.z_order = z_order;
        self
    }

    pub fn with_color(mut self, color: Rgba<u8>) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Attaches projection metadata. The text is passed through untouched.
    pub fn with_crs(mut self, crs: impl Into<String>) -> Self {
        self.crs = Some(crs.into());
        self
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn kind(&self) -> LayerKind {
        self.payload.kind()
    }

    pub fn payload(&self) -> &LayerPayload {
        &self.payload
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Sets opacity, clamped to `[0, 1]`. NaN is treated as fully transparent.
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = if opacity.is_nan() {
            0.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
    }

    pub fn color(&self) -> Option<Rgba<u8>> {
        self.color
    }

    pub fn set_color(&mut self, color: Option<Rgba<u8>>) {
        self.color = color;
    }

    pub fn z_order(&self) -> i32 {
        self.z_order
    }

    pub fn set_z_order(&mut self, z_order: i32) {
        self.z_order = z_order;
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn crs(&self) -> Option<&str> {
        self.crs.as_deref()
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    pub fn set_tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(key.into(), value.into());
    }

    /// True when the layer can change a composite at all.
    pub fn contributes(&self) -> bool {
        self.visible && self.opacity > 0.0
    }
}
