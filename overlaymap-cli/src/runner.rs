//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization, input loading and
//! output writing so command handlers stay small.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use overlaymap::config::ConfigFile;
use overlaymap::layer::{LayerStack, RasterBuffer};
use overlaymap::logging::{init_logging, split_log_path, LoggingGuard};

use crate::error::CliError;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Create a new CLI runner, loading config and initializing logging.
    ///
    /// # Arguments
    ///
    /// * `debug_mode` - Enables debug-level logging when RUST_LOG is unset
    /// * `verbose` - Mirrors log output to stdout
    pub fn new(debug_mode: bool, verbose: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let (log_dir, log_file) = split_log_path(&config.logging.file);
        let logging_guard = init_logging(&log_dir, &log_file, verbose, debug_mode)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("overlaymap v{}", overlaymap::VERSION);
        info!("overlaymap CLI: {} command", command);
    }

    /// Loads every input into a fresh stack, reporting and skipping failures.
    ///
    /// Fails only if nothing could be loaded.
    pub fn load_stack(&self, inputs: &[PathBuf]) -> Result<LayerStack, CliError> {
        let mut stack = LayerStack::new();
        for failure in stack.load_sources(inputs) {
            eprintln!("Skipping {}: {}", failure.source, failure.error);
        }
        if stack.is_empty() {
            return Err(CliError::NoLayers);
        }
        Ok(stack)
    }

    /// Encodes a raster by the output file's extension.
    ///
    /// JPEG output drops the alpha channel.
    pub fn save_raster(&self, path: &Path, raster: &RasterBuffer) -> Result<(), CliError> {
        let is_jpeg = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"))
            .unwrap_or(false);
        let result = if is_jpeg {
            image::DynamicImage::ImageRgba8(raster.clone())
                .to_rgb8()
                .save(path)
        } else {
            raster.save(path)
        };
        result.map_err(|error| CliError::FileWrite {
            path: path.display().to_string(),
            error,
        })?;
        info!(path = %path.display(), width = raster.width(), height = raster.height(), "Raster saved");
        println!(
            "✓ Saved {} ({}×{})",
            path.display(),
            raster.width(),
            raster.height()
        );
        Ok(())
    }

    /// Warns about a requested layer name that matched nothing.
    pub fn warn_unmatched(&self, what: &str, name: &str) {
        warn!(name, "No layer matched {}", what);
        eprintln!("Warning: no layer named '{}' for {}", name, what);
    }
}
