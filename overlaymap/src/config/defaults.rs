//! Default values and constants for all configuration settings.

use image::Rgba;

use super::file::config_directory;
use super::settings::*;
use crate::compare::{DEFAULT_BLINK_INTERVAL, DEFAULT_SPYGLASS_RADIUS, DEFAULT_SWIPE_POSITION};
use crate::edit::DEFAULT_UNDO_CAPACITY;

// =============================================================================
// Render
// =============================================================================

pub const DEFAULT_CANVAS_WIDTH: u32 = 1024;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 768;
pub const DEFAULT_LINE_WIDTH: f32 = 2.0;
pub const DEFAULT_VECTOR_COLOR: Rgba<u8> = Rgba([0x33, 0x88, 0xff, 255]);
pub const DEFAULT_REGISTRATION_MARKS: bool = false;

// =============================================================================
// Selection and editing
// =============================================================================

pub const DEFAULT_TOLERANCE: u32 = 32;
pub const MAX_TOLERANCE: u32 = 255;
pub const DEFAULT_FILL_OPACITY: f32 = 0.6;

// =============================================================================
// Logging
// =============================================================================

pub const DEFAULT_LOG_FILE_NAME: &str = "overlaymap.log";

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            render: RenderSettings {
                width: DEFAULT_CANVAS_WIDTH,
                height: DEFAULT_CANVAS_HEIGHT,
                line_width: DEFAULT_LINE_WIDTH,
                vector_color: DEFAULT_VECTOR_COLOR,
                registration_marks: DEFAULT_REGISTRATION_MARKS,
            },
            selection: SelectionSettings {
                tolerance: DEFAULT_TOLERANCE,
            },
            edit: EditSettings {
                fill_opacity: DEFAULT_FILL_OPACITY,
                undo_capacity: DEFAULT_UNDO_CAPACITY,
            },
            compare: CompareSettings {
                swipe_position: DEFAULT_SWIPE_POSITION,
                spyglass_radius: DEFAULT_SPYGLASS_RADIUS,
                blink_interval_ms: DEFAULT_BLINK_INTERVAL.as_millis() as u64,
            },
            logging: LoggingSettings {
                file: config_directory().join(DEFAULT_LOG_FILE_NAME),
            },
        }
    }
}
