//! Hex colour strings used by configuration and the CLI.

use image::Rgba;

/// Parses `#rrggbb` or `#rrggbbaa` (leading `#` optional).
///
/// Six-digit colours are opaque.
pub fn parse_hex_color(s: &str) -> Option<Rgba<u8>> {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);
    if !s.is_ascii() || (s.len() != 6 && s.len() != 8) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).ok();
    let alpha = if s.len() == 8 { channel(6)? } else { 255 };
    Some(Rgba([channel(0)?, channel(2)?, channel(4)?, alpha]))
}

/// Formats as `#rrggbb`, or `#rrggbbaa` when not opaque.
pub fn format_hex_color(color: Rgba<u8>) -> String {
    let [r, g, b, a] = color.0;
    if a == 255 {
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    } else {
        format!("#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rgb() {
        assert_eq!(parse_hex_color("#3388ff"), Some(Rgba([0x33, 0x88, 0xff, 255])));
        assert_eq!(parse_hex_color("FF0000"), Some(Rgba([255, 0, 0, 255])));
    }

    #[test]
    fn test_parse_rgba() {
        assert_eq!(parse_hex_color("#00ff0080"), Some(Rgba([0, 255, 0, 0x80])));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "#fff", "#12345", "#gg0000", "#ü12345"] {
            assert_eq!(parse_hex_color(bad), None, "{}", bad);
        }
    }

    #[test]
    fn test_format() {
        assert_eq!(format_hex_color(Rgba([0x33, 0x88, 0xff, 255])), "#3388ff");
        assert_eq!(format_hex_color(Rgba([1, 2, 3, 4])), "#01020304");
    }
}
