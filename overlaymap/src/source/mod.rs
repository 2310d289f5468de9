//! Source normalization.
//!
//! Converts heterogeneous inputs into [`Layer`]s with computed bounds:
//!
//! | format            | extensions                          | layer kind |
//! |-------------------|-------------------------------------|------------|
//! | GeoJSON           | `.geojson`, `.json`                 | vector     |
//! | Shapefile bundle  | `.shp` + `.shx`/`.dbf`/`.prj`/`.cpg` | vector     |
//! | ESRI ASCII grid   | `.asc`                              | grid       |
//! | TIFF              | `.tif`, `.tiff`                     | grid/image |
//! | Plain image       | `.png`, `.jpg`, `.bmp`, `.gif`, ... | image      |
//!
//! In-memory inputs go through [`normalize`] with an explicit
//! [`SourceFormat`]; files on disk go through [`load_path`], which also picks
//! up companion files (bundle members, world files, `.prj`). Failures are
//! typed [`SourceError`]s and are never retried.
//!
//! Projection metadata is carried as opaque text; no reprojection happens.

mod error;
mod geojson;
mod grid;
mod plain;
mod shapefile;

pub use error::SourceError;
pub use plain::WorldFile;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::layer::Layer;
use shapefile::BundleParts;

/// Declared format of a raw source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    GeoJson,
    ShapefileBundle,
    AsciiGrid,
    TiffGrid,
    Image,
}

impl SourceFormat {
    /// Infers the format from a file name's extension.
    pub fn detect(file_name: &str) -> Result<Self, SourceError> {
        let extension = extension_of(file_name);
        let format = match extension.as_str() {
            "geojson" | "json" => SourceFormat::GeoJson,
            ext if shapefile::is_bundle_extension(ext) => SourceFormat::ShapefileBundle,
            "asc" => SourceFormat::AsciiGrid,
            "tif" | "tiff" => SourceFormat::TiffGrid,
            "png" | "jpg" | "jpeg" | "bmp" | "gif" | "webp" => SourceFormat::Image,
            _ => {
                return Err(SourceError::UnsupportedFormat {
                    file: file_name.to_string(),
                    extension,
                })
            }
        };
        Ok(format)
    }

    pub fn name(&self) -> &'static str {
        match self {
            SourceFormat::GeoJson => "geojson",
            SourceFormat::ShapefileBundle => "shapefile",
            SourceFormat::AsciiGrid => "ascii-grid",
            SourceFormat::TiffGrid => "tiff",
            SourceFormat::Image => "image",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for SourceFormat {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "geojson" => Ok(SourceFormat::GeoJson),
            "shapefile" | "shp" => Ok(SourceFormat::ShapefileBundle),
            "ascii-grid" | "asc" => Ok(SourceFormat::AsciiGrid),
            "tiff" | "tif" => Ok(SourceFormat::TiffGrid),
            "image" => Ok(SourceFormat::Image),
            other => Err(SourceError::UnsupportedFormat {
                file: String::new(),
                extension: other.to_string(),
            }),
        }
    }
}

/// Raw bytes of one input file together with its name.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Reads a file from disk, naming it by its file name.
    pub fn read(path: &Path) -> Result<Self, SourceError> {
        let bytes = std::fs::read(path).map_err(|e| SourceError::io(path.display().to_string(), e))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, bytes))
    }

    /// Lower-cased extension, empty when there is none.
    pub fn extension(&self) -> String {
        extension_of(&self.name)
    }

    /// File name without its final extension.
    pub fn stem(&self) -> &str {
        stem_of(&self.name)
    }
}

fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

fn stem_of(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(dot) if dot > 0 => &file_name[..dot],
        _ => file_name,
    }
}

/// Normalizes one in-memory file into exactly one layer.
///
/// A shapefile given this way is treated as a bundle of one file, so it must
/// be the `.shp` itself.
pub fn normalize(file: &SourceFile, format: SourceFormat) -> Result<Layer, SourceError> {
    let name = file.stem();
    let layer = match format {
        SourceFormat::GeoJson => geojson::normalize(&file.name, name, &file.bytes)?,
        SourceFormat::ShapefileBundle => {
            let mut parts = BundleParts::default();
            parts.insert(&file.extension(), file);
            shapefile::normalize(name, &parts)?
        }
        SourceFormat::AsciiGrid => grid::normalize_ascii(&file.name, name, &file.bytes)?,
        SourceFormat::TiffGrid => grid::normalize_tiff(&file.name, name, &file.bytes)?,
        SourceFormat::Image => plain::normalize(&file.name, name, &file.bytes, None)?,
    };
    info!(
        file = %file.name,
        format = %format,
        layer = %layer.id(),
        kind = %layer.kind(),
        "Source normalized"
    );
    Ok(layer)
}

/// Normalizes a raster file whose placement comes from a world file.
pub fn normalize_georeferenced(
    file: &SourceFile,
    format: SourceFormat,
    world: &WorldFile,
) -> Result<Layer, SourceError> {
    let layer = match format {
        SourceFormat::Image => plain::normalize(&file.name, file.stem(), &file.bytes, Some(world))?,
        SourceFormat::TiffGrid => {
            let layer = grid::normalize_tiff(&file.name, file.stem(), &file.bytes)?;
            match layer.payload().raster() {
                Some(image) => {
                    let bounds = world.bounds_for(image.width(), image.height());
                    layer.with_bounds(bounds)
                }
                None => layer,
            }
        }
        other => return normalize(file, other),
    };
    debug!(file = %file.name, bounds = ?layer.bounds(), "Applied world file");
    Ok(layer)
}

/// Groups bundle files by base name and normalizes each group.
///
/// Groups come back ordered by base name. Any group without a `.shp` fails
/// the whole call with [`SourceError::MissingComponent`].
pub fn normalize_bundle(files: &[SourceFile]) -> Result<Vec<Layer>, SourceError> {
    if files.is_empty() {
        return Err(SourceError::MissingComponent {
            group: "(empty bundle)".to_string(),
            component: ".shp".to_string(),
        });
    }

    let mut groups: BTreeMap<&str, BundleParts<'_>> = BTreeMap::new();
    for file in files {
        let extension = file.extension();
        if !shapefile::is_bundle_extension(&extension) {
            return Err(SourceError::UnsupportedFormat {
                file: file.name.clone(),
                extension,
            });
        }
        groups
            .entry(file.stem())
            .or_default()
            .insert(&extension, file);
    }

    debug!(groups = groups.len(), files = files.len(), "Grouped bundle files");
    groups
        .iter()
        .map(|(group, parts)| shapefile::normalize(group, parts))
        .collect()
}

/// Loads every layer a path on disk describes.
///
/// A directory is read as a shapefile bundle. A bundle member pulls in its
/// siblings of the same base name. Images and TIFFs pick up a world file,
/// and non-bundle sources pick up a sibling `.prj` as their CRS.
pub fn load_path(path: &Path) -> Result<Vec<Layer>, SourceError> {
    if path.is_dir() {
        return load_bundle_dir(path);
    }

    let file = SourceFile::read(path)?;
    let format = SourceFormat::detect(&file.name)?;

    if format == SourceFormat::ShapefileBundle {
        let siblings = sibling_bundle_files(path, file.stem())?;
        return normalize_bundle(&siblings);
    }

    let layer = match format {
        SourceFormat::Image | SourceFormat::TiffGrid => match find_world_file(path, &file)? {
            Some(world) => normalize_georeferenced(&file, format, &world)?,
            None => normalize(&file, format)?,
        },
        _ => normalize(&file, format)?,
    };

    let prj = path.with_extension("prj");
    let layer = if layer.crs().is_none() && prj.is_file() {
        let text = std::fs::read_to_string(&prj)
            .map_err(|e| SourceError::io(prj.display().to_string(), e))?;
        layer.with_crs(text.trim())
    } else {
        layer
    };
    Ok(vec![layer])
}

/// Loads a path on a blocking worker, abandoning the wait on cancellation.
///
/// Returns `Ok(None)` when `cancel` fires first. The worker finishes in the
/// background and its result is discarded.
pub async fn load_path_async(
    path: PathBuf,
    cancel: CancellationToken,
) -> Result<Option<Vec<Layer>>, SourceError> {
    let file = path.display().to_string();
    let task = tokio::task::spawn_blocking(move || load_path(&path));

    tokio::select! {
        biased;

        _ = cancel.cancelled() => {
            debug!(file = %file, "Source load cancelled");
            Ok(None)
        }

        joined = task => {
            let layers = joined.map_err(|e| SourceError::Spawn {
                file,
                message: e.to_string(),
            })??;
            Ok(Some(layers))
        }
    }
}

fn load_bundle_dir(dir: &Path) -> Result<Vec<Layer>, SourceError> {
    let mut files = Vec::new();
    for path in read_dir_sorted(dir)? {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if path.is_file() && shapefile::is_bundle_extension(&extension_of(&name)) {
            files.push(SourceFile::read(&path)?);
        }
    }
    if files.is_empty() {
        return Err(SourceError::MissingComponent {
            group: dir.display().to_string(),
            component: ".shp".to_string(),
        });
    }
    normalize_bundle(&files)
}

fn sibling_bundle_files(path: &Path, stem: &str) -> Result<Vec<SourceFile>, SourceError> {
    let dir = parent_dir(path);
    let mut files = Vec::new();
    for candidate in read_dir_sorted(&dir)? {
        let Some(name) = candidate.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        if stem_of(&name) == stem
            && shapefile::is_bundle_extension(&extension_of(&name))
            && candidate.is_file()
        {
            files.push(SourceFile::read(&candidate)?);
        }
    }
    Ok(files)
}

fn find_world_file(path: &Path, file: &SourceFile) -> Result<Option<WorldFile>, SourceError> {
    for extension in plain::world_file_extensions(&file.extension()) {
        let candidate = path.with_extension(&extension);
        if candidate.is_file() {
            let text = std::fs::read_to_string(&candidate)
                .map_err(|e| SourceError::io(candidate.display().to_string(), e))?;
            let world = WorldFile::parse(&candidate.display().to_string(), &text)?;
            debug!(world_file = %candidate.display(), "Found world file");
            return Ok(Some(world));
        }
    }
    Ok(None)
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>, SourceError> {
    let entries =
        std::fs::read_dir(dir).map_err(|e| SourceError::io(dir.display().to_string(), e))?;
    let mut paths = entries
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| SourceError::io(dir.display().to_string(), e))?;
    paths.sort();
    Ok(paths)
}
