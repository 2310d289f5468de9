//! Configuration key access and validation.
//!
//! Type-safe interface for getting and setting configuration values by
//! `section.key` name. The INI parser goes through the same setters, so a
//! value accepted by `config set` is exactly a value accepted on load.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use super::defaults::MAX_TOLERANCE;
use super::settings::ConfigFile;
use crate::color::{format_hex_color, parse_hex_color};
use crate::compare::MIN_BLINK_INTERVAL;

/// Errors that can occur when getting or setting configuration values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigKeyError {
    /// Unknown configuration key.
    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),

    /// Validation failed for the value.
    #[error("Invalid value for {key}: {reason}")]
    ValidationFailed { key: String, reason: String },
}

/// Supported configuration keys.
///
/// Each key maps to a specific field in [`ConfigFile`] and knows how to
/// get and set its value with proper validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    // Render settings
    RenderWidth,
    RenderHeight,
    RenderLineWidth,
    RenderVectorColor,
    RenderRegistrationMarks,

    // Selection settings
    SelectionTolerance,

    // Edit settings
    EditFillOpacity,
    EditUndoCapacity,

    // Compare settings
    CompareSwipePosition,
    CompareSpyglassRadius,
    CompareBlinkIntervalMs,

    // Logging settings
    LoggingFile,
}

impl FromStr for ConfigKey {
    type Err = ConfigKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|key| key.name() == lower)
            .ok_or_else(|| ConfigKeyError::UnknownKey(s.to_string()))
    }
}

impl ConfigKey {
    /// Get the canonical key name (e.g., "render.line_width").
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::RenderWidth => "render.width",
            ConfigKey::RenderHeight => "render.height",
            ConfigKey::RenderLineWidth => "render.line_width",
            ConfigKey::RenderVectorColor => "render.vector_color",
            ConfigKey::RenderRegistrationMarks => "render.registration_marks",
            ConfigKey::SelectionTolerance => "selection.tolerance",
            ConfigKey::EditFillOpacity => "edit.fill_opacity",
            ConfigKey::EditUndoCapacity => "edit.undo_capacity",
            ConfigKey::CompareSwipePosition => "compare.swipe_position",
            ConfigKey::CompareSpyglassRadius => "compare.spyglass_radius",
            ConfigKey::CompareBlinkIntervalMs => "compare.blink_interval_ms",
            ConfigKey::LoggingFile => "logging.file",
        }
    }

    /// Get the section name (e.g., "render").
    pub fn section(&self) -> &'static str {
        self.name().split('.').next().unwrap_or("")
    }

    /// Get the key name within the section (e.g., "line_width").
    pub fn key_name(&self) -> &'static str {
        self.name().split('.').nth(1).unwrap_or(self.name())
    }

    /// Get the value from a config file as a string.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::RenderWidth => config.render.width.to_string(),
            ConfigKey::RenderHeight => config.render.height.to_string(),
            ConfigKey::RenderLineWidth => config.render.line_width.to_string(),
            ConfigKey::RenderVectorColor => format_hex_color(config.render.vector_color),
            ConfigKey::RenderRegistrationMarks => config.render.registration_marks.to_string(),
            ConfigKey::SelectionTolerance => config.selection.tolerance.to_string(),
            ConfigKey::EditFillOpacity => config.edit.fill_opacity.to_string(),
            ConfigKey::EditUndoCapacity => config.edit.undo_capacity.to_string(),
            ConfigKey::CompareSwipePosition => config.compare.swipe_position.to_string(),
            ConfigKey::CompareSpyglassRadius => config.compare.spyglass_radius.to_string(),
            ConfigKey::CompareBlinkIntervalMs => config.compare.blink_interval_ms.to_string(),
            ConfigKey::LoggingFile => path_to_display(&config.logging.file),
        }
    }

    /// Set the value in a config file.
    ///
    /// The value is parsed and validated first; on error the config is
    /// left unchanged.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigKeyError> {
        self.apply(config, value.trim())
            .map_err(|reason| ConfigKeyError::ValidationFailed {
                key: self.name().to_string(),
                reason,
            })
    }

    /// Validate a value without applying it.
    pub fn validate(&self, value: &str) -> Result<(), ConfigKeyError> {
        self.set(&mut ConfigFile::default(), value)
    }

    fn apply(&self, config: &mut ConfigFile, value: &str) -> Result<(), String> {
        match self {
            ConfigKey::RenderWidth => config.render.width = parse_dimension(value)?,
            ConfigKey::RenderHeight => config.render.height = parse_dimension(value)?,
            ConfigKey::RenderLineWidth => {
                config.render.line_width = parse_number(value, 0.0, f32::MAX, false)?
            }
            ConfigKey::RenderVectorColor => {
                config.render.vector_color = parse_hex_color(value)
                    .ok_or_else(|| "must be a colour like '#3388ff'".to_string())?
            }
            ConfigKey::RenderRegistrationMarks => {
                config.render.registration_marks = parse_bool(value)?
            }
            ConfigKey::SelectionTolerance => {
                let tolerance: u32 = value
                    .parse()
                    .map_err(|_| "must be an integer from 0 to 255".to_string())?;
                if tolerance > MAX_TOLERANCE {
                    return Err("must be an integer from 0 to 255".to_string());
                }
                config.selection.tolerance = tolerance;
            }
            ConfigKey::EditFillOpacity => {
                config.edit.fill_opacity = parse_number(value, 0.0, 1.0, false)?
            }
            ConfigKey::EditUndoCapacity => {
                config.edit.undo_capacity = match value.parse::<usize>() {
                    Ok(n) if n > 0 => n,
                    _ => return Err("must be a positive integer".to_string()),
                }
            }
            ConfigKey::CompareSwipePosition => {
                config.compare.swipe_position = parse_number(value, 0.0, 100.0, true)?
            }
            ConfigKey::CompareSpyglassRadius => {
                config.compare.spyglass_radius = parse_number(value, 0.0, f32::MAX, true)?
            }
            ConfigKey::CompareBlinkIntervalMs => {
                let min = MIN_BLINK_INTERVAL.as_millis() as u64;
                config.compare.blink_interval_ms = match value.parse::<u64>() {
                    Ok(ms) if ms >= min => ms,
                    _ => return Err(format!("must be an integer of at least {} (milliseconds)", min)),
                }
            }
            ConfigKey::LoggingFile => {
                if value.is_empty() {
                    return Err("must be a valid path".to_string());
                }
                config.logging.file = expand_tilde(value);
            }
        }
        Ok(())
    }

    /// Get all supported configuration keys.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::RenderWidth,
            ConfigKey::RenderHeight,
            ConfigKey::RenderLineWidth,
            ConfigKey::RenderVectorColor,
            ConfigKey::RenderRegistrationMarks,
            ConfigKey::SelectionTolerance,
            ConfigKey::EditFillOpacity,
            ConfigKey::EditUndoCapacity,
            ConfigKey::CompareSwipePosition,
            ConfigKey::CompareSpyglassRadius,
            ConfigKey::CompareBlinkIntervalMs,
            ConfigKey::LoggingFile,
        ]
    }
}

// ============================================================================
// Value parsers
// ============================================================================

fn parse_dimension(value: &str) -> Result<u32, String> {
    match value.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err("must be a positive integer (pixels)".to_string()),
    }
}

/// Parses a finite number in `(min, max]`, or `[min, max]` when
/// `min_inclusive`.
fn parse_number(value: &str, min: f32, max: f32, min_inclusive: bool) -> Result<f32, String> {
    let reason = || {
        let open = if min_inclusive { '[' } else { '(' };
        if max == f32::MAX {
            format!("must be a number in {}{}, ∞)", open, min)
        } else {
            format!("must be a number in {}{}, {}]", open, min, max)
        }
    };
    let n: f32 = value.parse().map_err(|_| reason())?;
    let above_min = if min_inclusive { n >= min } else { n > min };
    if n.is_finite() && above_min && n <= max {
        Ok(n)
    } else {
        Err(reason())
    }
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err("must be true/false, yes/no, 1/0, or on/off".to_string()),
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// Convert path to display string, collapsing home dir to ~.
fn path_to_display(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_config_key_parsing() {
        assert_eq!(
            "render.line_width".parse::<ConfigKey>().unwrap(),
            ConfigKey::RenderLineWidth
        );
        // Case insensitive
        assert_eq!(
            "COMPARE.SWIPE_POSITION".parse::<ConfigKey>().unwrap(),
            ConfigKey::CompareSwipePosition
        );
        assert_eq!(
            "invalid.key".parse::<ConfigKey>(),
            Err(ConfigKeyError::UnknownKey("invalid.key".to_string()))
        );
    }

    #[test]
    fn test_key_name_parts() {
        assert_eq!(ConfigKey::EditFillOpacity.section(), "edit");
        assert_eq!(ConfigKey::EditFillOpacity.key_name(), "fill_opacity");
    }

    #[test]
    fn test_get_value() {
        let config = ConfigFile::default();

        assert_eq!(ConfigKey::RenderVectorColor.get(&config), "#3388ff");
        assert_eq!(ConfigKey::SelectionTolerance.get(&config), "32");
        assert_eq!(ConfigKey::EditFillOpacity.get(&config), "0.6");
        assert_eq!(ConfigKey::RenderRegistrationMarks.get(&config), "false");
    }

    #[test]
    fn test_set_value() {
        let mut config = ConfigFile::default();

        ConfigKey::RenderVectorColor.set(&mut config, "#ff0000").unwrap();
        assert_eq!(config.render.vector_color, Rgba([255, 0, 0, 255]));

        ConfigKey::RenderRegistrationMarks.set(&mut config, "yes").unwrap();
        assert!(config.render.registration_marks);

        ConfigKey::CompareBlinkIntervalMs.set(&mut config, "250").unwrap();
        assert_eq!(config.compare.blink_interval_ms, 250);
    }

    #[test]
    fn test_set_invalid_value_leaves_config() {
        let mut config = ConfigFile::default();

        for (key, bad) in [
            (ConfigKey::RenderWidth, "0"),
            (ConfigKey::RenderLineWidth, "-1"),
            (ConfigKey::RenderVectorColor, "blue"),
            (ConfigKey::SelectionTolerance, "256"),
            (ConfigKey::EditFillOpacity, "0"),
            (ConfigKey::EditUndoCapacity, "0"),
            (ConfigKey::CompareSwipePosition, "101"),
            (ConfigKey::CompareBlinkIntervalMs, "10"),
            (ConfigKey::LoggingFile, ""),
        ] {
            assert!(
                matches!(
                    key.set(&mut config, bad),
                    Err(ConfigKeyError::ValidationFailed { .. })
                ),
                "{} accepted '{}'",
                key.name(),
                bad
            );
        }
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_validate_bounds_are_inclusive_where_documented() {
        assert!(ConfigKey::EditFillOpacity.validate("1").is_ok());
        assert!(ConfigKey::CompareSwipePosition.validate("0").is_ok());
        assert!(ConfigKey::CompareSwipePosition.validate("100").is_ok());
        assert!(ConfigKey::SelectionTolerance.validate("255").is_ok());
        assert!(ConfigKey::CompareSpyglassRadius.validate("NaN").is_err());
    }

    #[test]
    fn test_all_keys_round_trip_names() {
        for key in ConfigKey::all() {
            assert_eq!(key.name().parse::<ConfigKey>().unwrap(), *key);
        }
    }
}
