//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! Produces the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;
use crate::color::format_hex_color;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    // '#' would start a comment in the INI reader
    let vector_color = format_hex_color(config.render.vector_color);
    let vector_color = vector_color.trim_start_matches('#');

    format!(
        r#"[render]
; Default canvas size in pixels
width = {}
height = {}
; Vector stroke width in pixels (default: 2.0)
line_width = {}
; Hex colour (rrggbb or rrggbbaa) for vector layers without their own colour
vector_color = {}
; Draw the three registration marks on every render (default: false)
registration_marks = {}

[selection]
; Flood selection tolerance, 0-255 (default: 32)
; Pixels are selected while the mean RGB difference from the seed is within it
tolerance = {}

[edit]
; Fill opacity, greater than 0 and at most 1 (default: 0.6)
fill_opacity = {}
; Number of fills that can be undone (default: 20)
undo_capacity = {}

[compare]
; Swipe divider start position, 0-100 percent (default: 50)
swipe_position = {}
; Spyglass radius in pixels (default: 100)
spyglass_radius = {}
; Blink period in milliseconds, at least 50 (default: 800)
blink_interval_ms = {}

[logging]
; Log file, cleared at the start of each session
file = {}
"#,
        config.render.width,
        config.render.height,
        config.render.line_width,
        vector_color,
        config.render.registration_marks,
        config.selection.tolerance,
        config.edit.fill_opacity,
        config.edit.undo_capacity,
        config.compare.swipe_position,
        config.compare.spyglass_radius,
        config.compare.blink_interval_ms,
        path_to_string(&config.logging.file),
    )
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_every_section() {
        let text = to_config_string(&ConfigFile::default());
        for section in ["[render]", "[selection]", "[edit]", "[compare]", "[logging]"] {
            assert!(text.contains(section), "missing {}", section);
        }
        assert!(text.contains("vector_color = 3388ff"));
        assert!(text.contains("tolerance = 32"));
    }
}
