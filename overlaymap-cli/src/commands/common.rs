//! Common argument parsers and helpers shared across CLI commands.

use clap::Args;
use image::Rgba;
use overlaymap::color::parse_hex_color;
use overlaymap::composite::Canvas;
use overlaymap::config::ConfigFile;
use overlaymap::layer::{Bounds, LayerStack};

use crate::runner::CliRunner;

/// Canvas options shared by rendering commands.
#[derive(Debug, Clone, Args)]
pub struct CanvasArgs {
    /// Output width in pixels (default: render.width)
    #[arg(long)]
    pub width: Option<u32>,

    /// Output height in pixels (default: render.height)
    #[arg(long)]
    pub height: Option<u32>,

    /// Native-coordinate window for vector layers: x0,y0,x1,y1
    #[arg(long, value_parser = parse_bounds)]
    pub bounds: Option<Bounds>,

    /// Draw registration marks
    #[arg(long)]
    pub marks: bool,

    /// Never draw registration marks, even if enabled in config
    #[arg(long, conflicts_with = "marks")]
    pub no_marks: bool,
}

impl CanvasArgs {
    /// Canvas from config defaults overridden by flags.
    pub fn canvas(&self, config: &ConfigFile) -> Canvas {
        let width = self.width.unwrap_or(config.render.width);
        let height = self.height.unwrap_or(config.render.height);
        let mut canvas = Canvas::new(width, height);
        if let Some(bounds) = self.bounds {
            canvas = canvas.with_bounds(bounds);
        }
        let marks = (config.render.registration_marks || self.marks) && !self.no_marks;
        if marks {
            canvas = canvas.with_default_marks();
        }
        canvas
    }
}

/// Per-layer presentation overrides matched by layer name.
#[derive(Debug, Clone, Default, Args)]
pub struct LayerArgs {
    /// Hide a layer by name (repeatable)
    #[arg(long = "hide", value_name = "NAME")]
    pub hide: Vec<String>,

    /// Set a layer's opacity: NAME=0.5 (repeatable)
    #[arg(long = "opacity", value_name = "NAME=VALUE", value_parser = parse_named_f32)]
    pub opacity: Vec<(String, f32)>,

    /// Set a layer's z-order: NAME=3 (repeatable)
    #[arg(long = "z", value_name = "NAME=VALUE", value_parser = parse_named_i32)]
    pub z_order: Vec<(String, i32)>,
}

impl LayerArgs {
    /// Applies overrides to every layer whose name matches.
    pub fn apply(&self, stack: &mut LayerStack, runner: &CliRunner) {
        for name in &self.hide {
            if !for_named(stack, name, |stack, id| stack.set_visible(id, false)) {
                runner.warn_unmatched("--hide", name);
            }
        }
        for (name, opacity) in &self.opacity {
            if !for_named(stack, name, |stack, id| stack.set_opacity(id, *opacity)) {
                runner.warn_unmatched("--opacity", name);
            }
        }
        for (name, z) in &self.z_order {
            if !for_named(stack, name, |stack, id| stack.set_z_order(id, *z)) {
                runner.warn_unmatched("--z", name);
            }
        }
    }
}

fn for_named(
    stack: &mut LayerStack,
    name: &str,
    mut f: impl FnMut(&mut LayerStack, overlaymap::layer::LayerId) -> bool,
) -> bool {
    let ids: Vec<_> = stack
        .iter()
        .filter(|layer| layer.name() == name)
        .map(|layer| layer.id())
        .collect();
    let mut matched = false;
    for id in ids {
        matched |= f(stack, id);
    }
    matched
}

/// Parses `x,y` into pixel coordinates.
pub fn parse_pixel(s: &str) -> Result<(u32, u32), String> {
    let (x, y) = split_pair(s)?;
    let x = x.parse().map_err(|_| format!("invalid x in '{}'", s))?;
    let y = y.parse().map_err(|_| format!("invalid y in '{}'", s))?;
    Ok((x, y))
}

/// Parses `x,y` into a floating-point position.
pub fn parse_point(s: &str) -> Result<(f64, f64), String> {
    let (x, y) = split_pair(s)?;
    let x = x.trim().parse().map_err(|_| format!("invalid x in '{}'", s))?;
    let y = y.trim().parse().map_err(|_| format!("invalid y in '{}'", s))?;
    Ok((x, y))
}

/// Polygon vertices given as one argument.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon(pub Vec<(f64, f64)>);

/// Parses `x,y;x,y;...` into a polygon.
pub fn parse_points(s: &str) -> Result<Polygon, String> {
    s.split(';')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(parse_point)
        .collect::<Result<_, _>>()
        .map(Polygon)
}

/// Parses `x0,y0,x1,y1`.
pub fn parse_bounds(s: &str) -> Result<Bounds, String> {
    let values: Vec<f64> = s
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|_| format!("bounds must be four numbers, got '{}'", s))?;
    match values.as_slice() {
        [x0, y0, x1, y1] => Ok(Bounds::new(*x0, *y0, *x1, *y1)),
        _ => Err(format!("bounds must be four numbers, got '{}'", s)),
    }
}

/// Parses `#rrggbb` or `#rrggbbaa`.
pub fn parse_color(s: &str) -> Result<Rgba<u8>, String> {
    parse_hex_color(s).ok_or_else(|| format!("'{}' is not a colour like '#3388ff'", s))
}

fn parse_named_f32(s: &str) -> Result<(String, f32), String> {
    let (name, value) = split_named(s)?;
    let value = value
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    Ok((name, value))
}

fn parse_named_i32(s: &str) -> Result<(String, i32), String> {
    let (name, value) = split_named(s)?;
    let value = value
        .parse()
        .map_err(|_| format!("'{}' is not an integer", value))?;
    Ok((name, value))
}

fn split_named(s: &str) -> Result<(String, &str), String> {
    s.rsplit_once('=')
        .map(|(name, value)| (name.to_string(), value.trim()))
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))
}

fn split_pair(s: &str) -> Result<(&str, &str), String> {
    s.split_once(',')
        .ok_or_else(|| format!("expected x,y, got '{}'", s))
}
