//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use overlaymap::compare::CompareError;
use overlaymap::composite::CompositeError;
use overlaymap::config::ConfigFileError;
use overlaymap::edit::EditError;
use overlaymap::source::SourceError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// A bad command-line value
    InvalidArgument(String),
    /// An input could not be loaded
    Source(SourceError),
    /// No usable layers after loading
    NoLayers,
    /// Compositing failed
    Composite(CompositeError),
    /// Comparison rendering failed
    Compare(CompareError),
    /// Selection or fill failed
    Edit(EditError),
    /// Failed to write output file
    FileWrite {
        path: String,
        error: image::ImageError,
    },
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Source(SourceError::MissingComponent { .. }) => {
                eprintln!();
                eprintln!("Shapefile bundles need the .shp file alongside its companions");
                eprintln!("(.dbf, .shx, .prj, .cpg) with the same base name.");
            }
            CliError::NoLayers => {
                eprintln!();
                eprintln!("Supported inputs: .geojson/.json, .shp bundles, .asc grids,");
                eprintln!("GeoTIFF grids and PNG/JPEG/BMP/GIF/WebP images.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::Source(e) => write!(f, "Failed to load input: {}", e),
            CliError::NoLayers => write!(f, "No layers could be loaded from the given inputs"),
            CliError::Composite(e) => write!(f, "Failed to composite layers: {}", e),
            CliError::Compare(e) => write!(f, "Failed to render comparison: {}", e),
            CliError::Edit(e) => write!(f, "Edit failed: {}", e),
            CliError::FileWrite { path, error } => {
                write!(f, "Failed to write file '{}': {}", path, error)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Source(e) => Some(e),
            CliError::Composite(e) => Some(e),
            CliError::Compare(e) => Some(e),
            CliError::Edit(e) => Some(e),
            CliError::FileWrite { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<SourceError> for CliError {
    fn from(e: SourceError) -> Self {
        CliError::Source(e)
    }
}

impl From<CompositeError> for CliError {
    fn from(e: CompositeError) -> Self {
        CliError::Composite(e)
    }
}

impl From<CompareError> for CliError {
    fn from(e: CompareError) -> Self {
        CliError::Compare(e)
    }
}

impl From<EditError> for CliError {
    fn from(e: EditError) -> Self {
        CliError::Edit(e)
    }
}
