//! `overlaymap compare` - render a two-layer comparison frame.

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use overlaymap::compare::{CompareRenderer, ComparisonMode, ComparisonState};
use overlaymap::layer::{LayerId, LayerStack};
use overlaymap::source::load_path;

use crate::commands::common::{parse_point, CanvasArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Comparison mode selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum ModeArg {
    /// Layer A only
    Single,
    /// A left of the divider, B right of it
    Swipe,
    /// B inside a circle around the pointer
    Spyglass,
    /// A and B alternating
    Blink,
}

impl From<ModeArg> for ComparisonMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Single => ComparisonMode::Single,
            ModeArg::Swipe => ComparisonMode::Swipe,
            ModeArg::Spyglass => ComparisonMode::Spyglass,
            ModeArg::Blink => ComparisonMode::Blink,
        }
    }
}

#[derive(Debug, Args)]
pub struct CompareArgs {
    /// Layer A (base)
    pub a: PathBuf,

    /// Layer B (overlay)
    pub b: PathBuf,

    /// Output image path; blink with --frames N writes NAME-000.EXT ...
    #[arg(short, long)]
    pub output: PathBuf,

    #[arg(long, value_enum, default_value = "swipe")]
    pub mode: ModeArg,

    /// Swipe divider position in percent (default: compare.swipe_position)
    #[arg(long)]
    pub position: Option<f32>,

    /// Spyglass pointer position in pixels: x,y
    #[arg(long, value_parser = parse_point)]
    pub pointer: Option<(f64, f64)>,

    /// Spyglass radius in pixels (default: compare.spyglass_radius)
    #[arg(long)]
    pub radius: Option<f32>,

    /// Blink: start on layer B
    #[arg(long)]
    pub show_b: bool,

    /// Blink: number of alternating frames to write
    #[arg(long, default_value = "1")]
    pub frames: usize,

    /// Exchange A and B
    #[arg(long)]
    pub swap: bool,

    /// Omit the swipe divider and spyglass ring
    #[arg(long)]
    pub no_chrome: bool,

    #[command(flatten)]
    pub canvas: CanvasArgs,
}

pub fn run(runner: &CliRunner, args: CompareArgs) -> Result<(), CliError> {
    runner.log_startup("compare");
    let config = runner.config();

    let mut stack = LayerStack::new();
    let a = push_first(&mut stack, &args.a)?;
    let b = push_first(&mut stack, &args.b)?;

    let mut state = ComparisonState::with_defaults(a, b, config.compare.to_defaults());
    if args.swap {
        state.swap();
    }
    state.set_mode(args.mode.into());
    if let Some(position) = args.position {
        state.set_swipe_position(position);
    }
    if let Some(radius) = args.radius {
        state.set_spyglass_radius(radius);
    }
    if let Some((x, y)) = args.pointer {
        state.pointer_moved(x as f32, y as f32);
    }
    if args.show_b {
        state.show(false);
    }

    let canvas = args.canvas.canvas(config);
    let renderer =
        CompareRenderer::new(config.render.compositor()).with_chrome(!args.no_chrome);

    if args.mode != ModeArg::Blink || args.frames <= 1 {
        let frame = renderer.render(&state, &stack, &canvas)?;
        println!("Rendered {} comparison", state.mode());
        return runner.save_raster(&args.output, &frame);
    }

    state.play();
    for index in 0..args.frames {
        let frame = renderer.render(&state, &stack, &canvas)?;
        runner.save_raster(&frame_path(&args.output, index), &frame)?;
        state.tick();
    }
    println!("Rendered {} blink frames", args.frames);
    Ok(())
}

/// Loads `path` and pushes its first layer.
fn push_first(stack: &mut LayerStack, path: &Path) -> Result<LayerId, CliError> {
    let layer = load_path(path)?.into_iter().next().ok_or(CliError::NoLayers)?;
    Ok(stack.push(layer))
}

/// `out.png` → `out-003.png`.
fn frame_path(output: &Path, index: usize) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frame".to_string());
    let name = match output.extension() {
        Some(ext) => format!("{}-{:03}.{}", stem, index, ext.to_string_lossy()),
        None => format!("{}-{:03}", stem, index),
    };
    output.with_file_name(name)
}
