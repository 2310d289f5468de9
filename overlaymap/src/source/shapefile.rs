//! ESRI shapefile bundles.
//!
//! A bundle is the set of files sharing one base name. Only the `.shp`
//! geometry file is mandatory:
//!
//! | part   | use                                   |
//! |--------|---------------------------------------|
//! | `.shp` | geometry records (required)           |
//! | `.dbf` | attribute table, matched by record    |
//! | `.prj` | projection text, passed through as CRS|
//! | `.cpg` | attribute encoding, kept as a tag     |
//! | `.shx` | record index, not needed for reading  |
//!
//! Z and M variants are read with their XY coordinates only.

use serde_json::{Map, Number, Value};
use tracing::{debug, warn};

use super::{SourceError, SourceFile};
use crate::layer::{Coord, Feature, FeatureCollection, Geometry, Layer, LayerPayload};

const FILE_CODE: i32 = 9994;
const HEADER_LEN: usize = 100;
const RECORD_HEADER_LEN: usize = 8;

/// Member files of one shapefile bundle, grouped by base name.
#[derive(Debug, Default)]
pub(crate) struct BundleParts<'a> {
    pub shp: Option<&'a SourceFile>,
    pub shx: Option<&'a SourceFile>,
    pub dbf: Option<&'a SourceFile>,
    pub prj: Option<&'a SourceFile>,
    pub cpg: Option<&'a SourceFile>,
}

impl<'a> BundleParts<'a> {
    /// Slots `file` into the part matching its extension.
    ///
    /// Returns false for extensions that do not belong to a bundle.
    pub fn insert(&mut self, extension: &str, file: &'a SourceFile) -> bool {
        let slot = match extension {
            "shp" => &mut self.shp,
            "shx" => &mut self.shx,
            "dbf" => &mut self.dbf,
            "prj" => &mut self.prj,
            "cpg" => &mut self.cpg,
            _ => return false,
        };
        *slot = Some(file);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.shp.is_none()
            && self.shx.is_none()
            && self.dbf.is_none()
            && self.prj.is_none()
            && self.cpg.is_none()
    }
}

/// Returns true for extensions that belong to a shapefile bundle.
pub(crate) fn is_bundle_extension(extension: &str) -> bool {
    matches!(extension, "shp" | "shx" | "dbf" | "prj" | "cpg")
}

/// Normalizes one bundle group into a vector layer.
pub(crate) fn normalize(group: &str, parts: &BundleParts<'_>) -> Result<Layer, SourceError> {
    let shp = parts.shp.ok_or_else(|| SourceError::MissingComponent {
        group: group.to_string(),
        component: ".shp".to_string(),
    })?;

    let geometries = read_shapes(&shp.name, &shp.bytes)?;

    let records = match parts.dbf {
        Some(dbf) => read_dbf(&dbf.name, &dbf.bytes)?,
        None => Vec::new(),
    };
    if !records.is_empty() && records.len() != geometries.len() {
        warn!(
            group = group,
            shapes = geometries.len(),
            records = records.len(),
            "Attribute table length differs from shape count"
        );
    }

    let mut records = records.into_iter();
    let features: Vec<Feature> = geometries
        .into_iter()
        .filter_map(|geometry| {
            let properties = records.next().unwrap_or_default();
            geometry.map(|geometry| Feature {
                geometry,
                properties,
            })
        })
        .collect();

    let collection = FeatureCollection::new(features);
    let bounds = collection.bounds();

    debug!(
        group = group,
        features = collection.len(),
        has_dbf = parts.dbf.is_some(),
        has_prj = parts.prj.is_some(),
        "Normalized shapefile bundle"
    );

    let mut layer = Layer::new(group, LayerPayload::Vector(collection), bounds);
    if let Some(prj) = parts.prj {
        let text = String::from_utf8_lossy(&prj.bytes).trim().to_string();
        if !text.is_empty() {
            layer = layer.with_crs(text);
        }
    }
    if let Some(cpg) = parts.cpg {
        let encoding = String::from_utf8_lossy(&cpg.bytes).trim().to_string();
        if !encoding.is_empty() {
            layer = layer.with_tag("encoding", encoding);
        }
    }
    Ok(layer)
}

// ─── .shp ───────────────────────────────────────────────────────────────────

/// Reads every record; null shapes are `None` so attribute rows stay aligned.
fn read_shapes(file: &str, bytes: &[u8]) -> Result<Vec<Option<Geometry>>, SourceError> {
    if bytes.len() < HEADER_LEN {
        return Err(SourceError::parse(file, "file shorter than shapefile header"));
    }
    if i32_be(bytes, 0) != Some(FILE_CODE) {
        return Err(SourceError::parse(file, "not a shapefile (bad file code)"));
    }

    let declared_len = i32_be(bytes, 24).unwrap_or(0).max(0) as usize * 2;
    let end = if declared_len >= HEADER_LEN {
        declared_len.min(bytes.len())
    } else {
        bytes.len()
    };

    let mut shapes = Vec::new();
    let mut offset = HEADER_LEN;
    while offset + RECORD_HEADER_LEN <= end {
        let content_len = i32_be(bytes, offset + 4).unwrap_or(0).max(0) as usize * 2;
        let start = offset + RECORD_HEADER_LEN;
        let content = bytes.get(start..start + content_len).ok_or_else(|| {
            SourceError::parse(file, format!("truncated record at byte {}", offset))
        })?;
        shapes.push(read_record(file, offset, content)?);
        offset = start + content_len;
    }
    Ok(shapes)
}

fn read_record(file: &str, offset: usize, content: &[u8]) -> Result<Option<Geometry>, SourceError> {
    let truncated = || SourceError::parse(file, format!("truncated record at byte {}", offset));
    let shape_type = i32_le(content, 0).ok_or_else(truncated)?;

    let geometry = match shape_type {
        0 => None,
        1 | 11 | 21 => Some(Geometry::Point(point_at(content, 4).ok_or_else(truncated)?)),
        8 | 18 | 28 => {
            let count = u32_at(content, 36).ok_or_else(truncated)?;
            let points = points_at(content, 40, count).ok_or_else(truncated)?;
            Some(Geometry::MultiPoint(points))
        }
        3 | 13 | 23 | 5 | 15 | 25 => {
            let parts = read_parts(content).ok_or_else(truncated)?;
            Some(if shape_type % 10 == 3 {
                Geometry::MultiLineString(parts)
            } else {
                Geometry::Polygon(parts)
            })
        }
        other => {
            warn!(file = file, offset, shape_type = other, "Skipping unsupported shape type");
            None
        }
    };
    Ok(geometry)
}

/// Splits the point array of a polyline/polygon record into its parts.
fn read_parts(content: &[u8]) -> Option<Vec<Vec<Coord>>> {
    let num_parts = u32_at(content, 36)? as usize;
    let num_points = u32_at(content, 40)?;
    let parts_offset = 44;
    let points_offset = parts_offset + num_parts * 4;

    let points = points_at(content, points_offset, num_points)?;
    let mut starts = (0..num_parts)
        .map(|i| u32_at(content, parts_offset + i * 4).map(|s| s as usize))
        .collect::<Option<Vec<_>>>()?;
    starts.push(points.len());

    let parts = starts
        .windows(2)
        .filter_map(|w| points.get(w[0]..w[1].max(w[0])))
        .filter(|part| !part.is_empty())
        .map(<[Coord]>::to_vec)
        .collect();
    Some(parts)
}

fn points_at(content: &[u8], offset: usize, count: u32) -> Option<Vec<Coord>> {
    (0..count as usize)
        .map(|i| point_at(content, offset + i * 16))
        .collect()
}

fn point_at(content: &[u8], offset: usize) -> Option<Coord> {
    Some(Coord::new(f64_le(content, offset)?, f64_le(content, offset + 8)?))
}

fn i32_be(bytes: &[u8], offset: usize) -> Option<i32> {
    Some(i32::from_be_bytes(bytes.get(offset..offset + 4)?.try_into().ok()?))
}

fn i32_le(bytes: &[u8], offset: usize) -> Option<i32> {
    Some(i32::from_le_bytes(bytes.get(offset..offset + 4)?.try_into().ok()?))
}

fn u32_at(bytes: &[u8], offset: usize) -> Option<u32> {
    i32_le(bytes, offset).and_then(|v| u32::try_from(v).ok())
}

fn f64_le(bytes: &[u8], offset: usize) -> Option<f64> {
    Some(f64::from_le_bytes(bytes.get(offset..offset + 8)?.try_into().ok()?))
}

// ─── .dbf ───────────────────────────────────────────────────────────────────

struct DbfField {
    name: String,
    kind: u8,
    length: usize,
}

/// Reads a dBase III attribute table into one property map per record.
fn read_dbf(file: &str, bytes: &[u8]) -> Result<Vec<Map<String, Value>>, SourceError> {
    let bad = |msg: &str| SourceError::parse(file, msg.to_string());

    let header = bytes.get(..32).ok_or_else(|| bad("file shorter than dBase header"))?;
    let record_count = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as usize;
    let header_len = u16::from_le_bytes([header[8], header[9]]) as usize;
    let record_len = u16::from_le_bytes([header[10], header[11]]) as usize;

    let mut fields = Vec::new();
    let mut offset = 32;
    while offset + 32 <= header_len.min(bytes.len()) && bytes[offset] != 0x0D {
        let descriptor = &bytes[offset..offset + 32];
        let name_end = descriptor[..11].iter().position(|&b| b == 0).unwrap_or(11);
        fields.push(DbfField {
            name: String::from_utf8_lossy(&descriptor[..name_end]).trim().to_string(),
            kind: descriptor[11],
            length: descriptor[16] as usize,
        });
        offset += 32;
    }

    if record_count > 0 && record_len == 0 {
        return Err(bad("records have zero length"));
    }
    let available = bytes.len().saturating_sub(header_len) / record_len.max(1);
    if record_count > available {
        warn!(
            file = file,
            declared = record_count,
            available,
            "Attribute table shorter than its header claims"
        );
    }
    let record_count = record_count.min(available);

    let mut records = Vec::with_capacity(record_count);
    for index in 0..record_count {
        let start = header_len + index * record_len;
        let Some(record) = bytes.get(start..start + record_len) else {
            warn!(file = file, index, "Attribute table truncated");
            break;
        };

        let mut properties = Map::new();
        let mut cursor = 1;
        for field in &fields {
            let raw = record.get(cursor..cursor + field.length).unwrap_or_default();
            properties.insert(field.name.clone(), dbf_value(field.kind, raw));
            cursor += field.length;
        }
        // Deleted rows keep their slot so shapes stay aligned.
        if record.first() == Some(&b'*') {
            properties.clear();
        }
        records.push(properties);
    }
    Ok(records)
}

fn dbf_value(kind: u8, raw: &[u8]) -> Value {
    let text = String::from_utf8_lossy(raw);
    let text = text.trim();
    match kind {
        b'N' | b'F' => {
            if let Ok(int) = text.parse::<i64>() {
                Value::Number(int.into())
            } else {
                text.parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map_or(Value::Null, Value::Number)
            }
        }
        b'L' => match text {
            "T" | "t" | "Y" | "y" => Value::Bool(true),
            "F" | "f" | "N" | "n" => Value::Bool(false),
            _ => Value::Null,
        },
        _ if text.is_empty() => Value::Null,
        _ => Value::String(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::Bounds;

    fn header(total_bytes: usize, shape_type: i32) -> Vec<u8> {
        let mut bytes = vec![0u8; HEADER_LEN];
        bytes[0..4].copy_from_slice(&FILE_CODE.to_be_bytes());
        bytes[24..28].copy_from_slice(&((total_bytes / 2) as i32).to_be_bytes());
        bytes[28..32].copy_from_slice(&1000i32.to_le_bytes());
        bytes[32..36].copy_from_slice(&shape_type.to_le_bytes());
        bytes
    }

    fn record(number: i32, content: Vec<u8>) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&number.to_be_bytes());
        bytes.extend_from_slice(&((content.len() / 2) as i32).to_be_bytes());
        bytes.extend(content);
        bytes
    }

    fn point_content(x: f64, y: f64) -> Vec<u8> {
        let mut c = 1i32.to_le_bytes().to_vec();
        c.extend_from_slice(&x.to_le_bytes());
        c.extend_from_slice(&y.to_le_bytes());
        c
    }

    fn polygon_content(ring: &[(f64, f64)]) -> Vec<u8> {
        let mut c = 5i32.to_le_bytes().to_vec();
        c.extend_from_slice(&[0u8; 32]);
        c.extend_from_slice(&1i32.to_le_bytes());
        c.extend_from_slice(&(ring.len() as i32).to_le_bytes());
        c.extend_from_slice(&0i32.to_le_bytes());
        for (x, y) in ring {
            c.extend_from_slice(&x.to_le_bytes());
            c.extend_from_slice(&y.to_le_bytes());
        }
        c
    }

    fn shp(records: Vec<Vec<u8>>) -> SourceFile {
        let body: Vec<u8> = records.into_iter().flatten().collect();
        let mut bytes = header(HEADER_LEN + body.len(), 5);
        bytes.extend(body);
        SourceFile::new("parcels.shp", bytes)
    }

    fn dbf(names: &[&str]) -> SourceFile {
        let width = 8usize;
        let header_len = 32 + 32 + 1;
        let record_len = 1 + width;
        let mut bytes = vec![0u8; 32];
        bytes[0] = 3;
        bytes[4..8].copy_from_slice(&(names.len() as u32).to_le_bytes());
        bytes[8..10].copy_from_slice(&(header_len as u16).to_le_bytes());
        bytes[10..12].copy_from_slice(&(record_len as u16).to_le_bytes());

        let mut field = vec![0u8; 32];
        field[..4].copy_from_slice(b"NAME");
        field[11] = b'C';
        field[16] = width as u8;
        bytes.extend(field);
        bytes.push(0x0D);

        for name in names {
            bytes.push(b' ');
            bytes.extend(format!("{:<width$}", name, width = width).into_bytes());
        }
        SourceFile::new("parcels.dbf", bytes)
    }

    #[test]
    fn test_polygon_and_point_records() {
        let shp = shp(vec![
            record(1, polygon_content(&[(0.0, 0.0), (10.0, 0.0), (10.0, 5.0), (0.0, 0.0)])),
            record(2, point_content(-3.0, 7.0)),
        ]);
        let parts = BundleParts {
            shp: Some(&shp),
            ..Default::default()
        };

        let layer = normalize("parcels", &parts).unwrap();
        assert_eq!(layer.name(), "parcels");
        assert_eq!(layer.bounds(), Some(Bounds::new(-3.0, 0.0, 10.0, 7.0)));

        match layer.payload() {
            LayerPayload::Vector(collection) => {
                assert_eq!(collection.len(), 2);
                assert!(matches!(collection.features[0].geometry, Geometry::Polygon(_)));
                assert!(matches!(collection.features[1].geometry, Geometry::Point(_)));
            }
            _ => panic!("expected vector payload"),
        }
    }

    #[test]
    fn test_attributes_and_projection() {
        let shp = shp(vec![
            record(1, point_content(1.0, 1.0)),
            record(2, point_content(2.0, 2.0)),
        ]);
        let dbf = dbf(&["Alpha", "Beta"]);
        let prj = SourceFile::new("parcels.prj", b"PROJCS[\"OSGB 1936\"]\n".to_vec());
        let parts = BundleParts {
            shp: Some(&shp),
            dbf: Some(&dbf),
            prj: Some(&prj),
            ..Default::default()
        };

        let layer = normalize("parcels", &parts).unwrap();
        assert_eq!(layer.crs(), Some("PROJCS[\"OSGB 1936\"]"));
        match layer.payload() {
            LayerPayload::Vector(collection) => {
                assert_eq!(
                    collection.features[1].properties.get("NAME"),
                    Some(&Value::String("Beta".to_string()))
                );
            }
            _ => panic!("expected vector payload"),
        }
    }

    #[test]
    fn test_null_shape_keeps_attribute_alignment() {
        let null_record = record(1, 0i32.to_le_bytes().to_vec());
        let shp = shp(vec![null_record, record(2, point_content(4.0, 4.0))]);
        let dbf = dbf(&["Empty", "Kept"]);
        let parts = BundleParts {
            shp: Some(&shp),
            dbf: Some(&dbf),
            ..Default::default()
        };

        let layer = normalize("parcels", &parts).unwrap();
        match layer.payload() {
            LayerPayload::Vector(collection) => {
                assert_eq!(collection.len(), 1);
                assert_eq!(
                    collection.features[0].properties.get("NAME"),
                    Some(&Value::String("Kept".to_string()))
                );
            }
            _ => panic!("expected vector payload"),
        }
    }

    #[test]
    fn test_missing_shp_is_missing_component() {
        let dbf = dbf(&["x"]);
        let parts = BundleParts {
            dbf: Some(&dbf),
            ..Default::default()
        };
        let err = normalize("parcels", &parts).unwrap_err();
        assert!(matches!(err, SourceError::MissingComponent { ref group, .. } if group == "parcels"));
    }

    #[test]
    fn test_bad_file_code_is_parse_error() {
        let file = SourceFile::new("junk.shp", vec![0u8; 120]);
        let parts = BundleParts {
            shp: Some(&file),
            ..Default::default()
        };
        assert!(matches!(
            normalize("junk", &parts),
            Err(SourceError::Parse { .. })
        ));
    }

    fn dbf_header(record_count: u32, header_len: u16, record_len: u16) -> Vec<u8> {
        let mut bytes = vec![0u8; header_len as usize];
        bytes[0] = 0x03;
        bytes[4..8].copy_from_slice(&record_count.to_le_bytes());
        bytes[8..10].copy_from_slice(&header_len.to_le_bytes());
        bytes[10..12].copy_from_slice(&record_len.to_le_bytes());
        bytes[32] = 0x0D;
        bytes
    }

    #[test]
    fn test_dbf_record_count_clamped_to_file_size() {
        let mut bytes = dbf_header(u32::MAX, 33, 1);
        bytes.extend_from_slice(b"  ");

        let records = read_dbf("huge.dbf", &bytes).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_dbf_zero_record_length_is_parse_error() {
        let bytes = dbf_header(u32::MAX, 33, 0);
        match read_dbf("empty.dbf", &bytes) {
            Err(SourceError::Parse { file, .. }) => assert_eq!(file, "empty.dbf"),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_dbf_header_only_yields_no_records() {
        let bytes = dbf_header(u32::MAX, 33, 1);
        assert!(read_dbf("header.dbf", &bytes).unwrap().is_empty());
    }

    #[test]
    fn test_truncated_record_is_parse_error() {
        let mut file = shp(vec![record(1, point_content(1.0, 1.0))]);
        file.bytes.truncate(HEADER_LEN + 12);
        let parts = BundleParts {
            shp: Some(&file),
            ..Default::default()
        };
        assert!(matches!(
            normalize("parcels", &parts),
            Err(SourceError::Parse { .. })
        ));
    }

    #[test]
    fn test_empty_shapefile_has_no_bounds() {
        let file = shp(Vec::new());
        let parts = BundleParts {
            shp: Some(&file),
            ..Default::default()
        };
        let layer = normalize("empty", &parts).unwrap();
        assert!(layer.bounds().is_none());
    }
}
