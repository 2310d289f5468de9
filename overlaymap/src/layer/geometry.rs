//! Vector geometry and numeric grid payloads.

use serde_json::{Map, Value};

use super::types::{Bounds, BoundsBuilder};

/// A coordinate pair in the source's native units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Simple-feature geometry.
///
/// Polygons are stored as a list of rings; the first ring is the exterior
/// and any further rings are holes. Rendering uses the even-odd rule so ring
/// orientation does not matter.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Coord),
    MultiPoint(Vec<Coord>),
    LineString(Vec<Coord>),
    MultiLineString(Vec<Vec<Coord>>),
    Polygon(Vec<Vec<Coord>>),
    MultiPolygon(Vec<Vec<Vec<Coord>>>),
    GeometryCollection(Vec<Geometry>),
}

impl Geometry {
    /// Calls `f` for every coordinate in the geometry.
    pub fn for_each_coord(&self, f: &mut impl FnMut(Coord)) {
        match self {
            Geometry::Point(c) => f(*c),
            Geometry::MultiPoint(points) | Geometry::LineString(points) => {
                points.iter().copied().for_each(f)
            }
            Geometry::MultiLineString(lines) | Geometry::Polygon(lines) => {
                lines.iter().flatten().copied().for_each(f)
            }
            Geometry::MultiPolygon(polygons) => {
                polygons.iter().flatten().flatten().copied().for_each(f)
            }
            Geometry::GeometryCollection(members) => {
                for member in members {
                    member.for_each_coord(&mut *f);
                }
            }
        }
    }

    /// Bounding box of every coordinate, or `None` for an empty geometry.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut builder = BoundsBuilder::new();
        self.for_each_coord(&mut |c| builder.include(c.x, c.y));
        builder.finish()
    }
}

/// A geometry plus its attribute properties.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub geometry: Geometry,
    pub properties: Map<String, Value>,
}

impl Feature {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            properties: Map::new(),
        }
    }
}

/// An ordered set of features, the payload of a vector layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Bounds of all feature geometries.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut builder = BoundsBuilder::new();
        for feature in &self.features {
            feature
                .geometry
                .for_each_coord(&mut |c| builder.include(c.x, c.y));
        }
        builder.finish()
    }
}

/// A dense single-band numeric grid, stored row-major from the top row down.
///
/// Cells holding a non-finite value or the declared `no_data` sentinel are
/// treated as missing.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericGrid {
    width: u32,
    height: u32,
    values: Vec<f64>,
    no_data: Option<f64>,
}

impl NumericGrid {
    /// Creates a grid, returning `None` when `values` does not hold exactly
    /// `width × height` cells.
    pub fn new(width: u32, height: u32, values: Vec<f64>) -> Option<Self> {
        if values.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            values,
            no_data: None,
        })
    }

    /// Declares the sentinel value used for missing cells.
    pub fn with_no_data(mut self, no_data: f64) -> Self {
        self.no_data = Some(no_data);
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn no_data(&self) -> Option<f64> {
        self.no_data
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value at `(x, y)`, or `None` when out of range.
    pub fn get(&self, x: u32, y: u32) -> Option<f64> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.values
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Returns true when `value` should be rendered as no-data.
    pub fn is_missing(&self, value: f64) -> bool {
        !value.is_finite() || self.no_data == Some(value)
    }
}
