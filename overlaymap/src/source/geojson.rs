//! GeoJSON vector sources.
//!
//! Accepts a `FeatureCollection`, a single `Feature`, or a bare geometry.
//! Bounds are taken from every numeric coordinate pair reachable through the
//! document's coordinate arrays, so a geometry that fails typed conversion
//! still contributes to the layer extent.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::SourceError;
use crate::layer::{
    BoundsBuilder, Coord, Feature, FeatureCollection, Geometry, Layer, LayerPayload,
};

/// Normalizes a GeoJSON document into a vector layer.
pub(crate) fn normalize(file: &str, name: &str, bytes: &[u8]) -> Result<Layer, SourceError> {
    let document: Value = serde_json::from_slice(bytes)
        .map_err(|e| SourceError::parse(file, format!("invalid JSON: {}", e)))?;

    let object = document
        .as_object()
        .ok_or_else(|| SourceError::parse(file, "top-level value is not an object"))?;

    let kind = object
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| SourceError::parse(file, "missing \"type\" member"))?;

    let features = match kind {
        "FeatureCollection" => {
            let members = object
                .get("features")
                .and_then(Value::as_array)
                .ok_or_else(|| SourceError::parse(file, "FeatureCollection has no features array"))?;
            members
                .iter()
                .enumerate()
                .filter_map(|(index, member)| convert_feature(file, index, member))
                .collect()
        }
        "Feature" => convert_feature(file, 0, &document).into_iter().collect(),
        other if is_geometry_type(other) => match convert_geometry(&document) {
            Some(geometry) => vec![Feature::new(geometry)],
            None => {
                return Err(SourceError::parse(
                    file,
                    format!("malformed {} geometry", other),
                ))
            }
        },
        other => {
            return Err(SourceError::parse(
                file,
                format!("unknown GeoJSON type '{}'", other),
            ))
        }
    };

    let mut builder = BoundsBuilder::new();
    collect_bounds(&document, &mut builder);
    let bounds = builder.finish();

    debug!(
        file = file,
        features = features.len(),
        has_bounds = bounds.is_some(),
        "Normalized GeoJSON"
    );

    let mut layer = Layer::new(
        name,
        LayerPayload::Vector(FeatureCollection::new(features)),
        bounds,
    );
    if let Some(crs) = object.get("crs").and_then(crs_text) {
        layer = layer.with_crs(crs);
    }
    Ok(layer)
}

fn is_geometry_type(kind: &str) -> bool {
    matches!(
        kind,
        "Point"
            | "MultiPoint"
            | "LineString"
            | "MultiLineString"
            | "Polygon"
            | "MultiPolygon"
            | "GeometryCollection"
    )
}

/// Walks coordinate-bearing members and includes every numeric pair.
fn collect_bounds(value: &Value, builder: &mut BoundsBuilder) {
    match value {
        Value::Object(object) => {
            for key in ["coordinates", "geometry", "geometries", "features"] {
                if let Some(member) = object.get(key) {
                    collect_bounds(member, builder);
                }
            }
        }
        Value::Array(items) => {
            if let Some((x, y)) = numeric_pair(items) {
                builder.include(x, y);
            } else {
                for item in items {
                    collect_bounds(item, builder);
                }
            }
        }
        _ => {}
    }
}

fn numeric_pair(items: &[Value]) -> Option<(f64, f64)> {
    match items {
        [x, y, ..] => Some((x.as_f64()?, y.as_f64()?)),
        _ => None,
    }
}

/// Passes CRS metadata through: a named CRS yields its name, anything else
/// its JSON text.
fn crs_text(crs: &Value) -> Option<String> {
    if crs.is_null() {
        return None;
    }
    let named = crs
        .get("properties")
        .and_then(|p| p.get("name"))
        .and_then(Value::as_str);
    Some(match named {
        Some(name) => name.to_string(),
        None => crs.to_string(),
    })
}

fn convert_feature(file: &str, index: usize, value: &Value) -> Option<Feature> {
    let geometry = match value.get("geometry") {
        None | Some(Value::Null) => {
            debug!(file = file, index, "Skipping feature without geometry");
            return None;
        }
        Some(geometry) => geometry,
    };

    let Some(geometry) = convert_geometry(geometry) else {
        warn!(file = file, index, "Skipping feature with malformed geometry");
        return None;
    };

    let properties = match value.get("properties") {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    };

    Some(Feature {
        geometry,
        properties,
    })
}

fn convert_geometry(value: &Value) -> Option<Geometry> {
    let kind = value.get("type")?.as_str()?;

    if kind == "GeometryCollection" {
        let members = value.get("geometries")?.as_array()?;
        return Some(Geometry::GeometryCollection(
            members.iter().filter_map(convert_geometry).collect(),
        ));
    }

    let coordinates = value.get("coordinates")?;
    match kind {
        "Point" => coord(coordinates).map(Geometry::Point),
        "MultiPoint" => coord_list(coordinates).map(Geometry::MultiPoint),
        "LineString" => coord_list(coordinates).map(Geometry::LineString),
        "MultiLineString" => ring_list(coordinates).map(Geometry::MultiLineString),
        "Polygon" => ring_list(coordinates).map(Geometry::Polygon),
        "MultiPolygon" => coordinates
            .as_array()?
            .iter()
            .map(ring_list)
            .collect::<Option<Vec<_>>>()
            .map(Geometry::MultiPolygon),
        _ => None,
    }
}

fn coord(value: &Value) -> Option<Coord> {
    let (x, y) = numeric_pair(value.as_array()?)?;
    Some(Coord::new(x, y))
}

fn coord_list(value: &Value) -> Option<Vec<Coord>> {
    value.as_array()?.iter().map(coord).collect()
}

fn ring_list(value: &Value) -> Option<Vec<Vec<Coord>>> {
    value.as_array()?.iter().map(coord_list).collect()
}
