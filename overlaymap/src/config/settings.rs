//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.

use std::path::PathBuf;
use std::time::Duration;

use image::Rgba;

use crate::compare::CompareDefaults;
use crate::composite::{Canvas, Compositor};

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Canvas and vector styling
    pub render: RenderSettings,
    /// Selection defaults
    pub selection: SelectionSettings,
    /// Fill and undo
    pub edit: EditSettings,
    /// Comparison mode defaults
    pub compare: CompareSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Render configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    /// Default canvas width in pixels
    pub width: u32,
    /// Default canvas height in pixels
    pub height: u32,
    /// Vector stroke width in pixels
    pub line_width: f32,
    /// Tint for vector layers without their own colour
    pub vector_color: Rgba<u8>,
    /// Draw registration marks by default
    pub registration_marks: bool,
}

impl RenderSettings {
    /// A compositor styled from these settings.
    pub fn compositor(&self) -> Compositor {
        Compositor::new()
            .with_line_width(self.line_width)
            .with_vector_color(self.vector_color)
    }

    /// A canvas of the configured size, with marks if enabled.
    pub fn canvas(&self) -> Canvas {
        let canvas = Canvas::new(self.width, self.height);
        if self.registration_marks {
            canvas.with_default_marks()
        } else {
            canvas
        }
    }
}

/// Selection configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionSettings {
    /// Default flood tolerance, `0..=255`
    pub tolerance: u32,
}

/// Edit configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSettings {
    /// Default fill opacity in `(0, 1]`
    pub fill_opacity: f32,
    /// Undo snapshots kept per session
    pub undo_capacity: usize,
}

/// Comparison configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CompareSettings {
    /// Swipe divider start, percent
    pub swipe_position: f32,
    /// Spyglass radius in pixels
    pub spyglass_radius: f32,
    /// Blink period in milliseconds
    pub blink_interval_ms: u64,
}

impl CompareSettings {
    pub fn to_defaults(&self) -> CompareDefaults {
        CompareDefaults {
            swipe_position: self.swipe_position,
            spyglass_radius: self.spyglass_radius,
            blink_interval: Duration::from_millis(self.blink_interval_ms),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}
