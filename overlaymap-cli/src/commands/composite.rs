//! `overlaymap composite` - flatten layers into one image.

use std::path::PathBuf;

use clap::Args;
use image::Rgba;

use crate::commands::common::{parse_color, CanvasArgs, LayerArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

#[derive(Debug, Args)]
pub struct CompositeArgs {
    /// Inputs, bottom layer first
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output image path (format from extension)
    #[arg(short, long)]
    pub output: PathBuf,

    #[command(flatten)]
    pub canvas: CanvasArgs,

    #[command(flatten)]
    pub layers: LayerArgs,

    /// Vector stroke width in pixels (default: render.line_width)
    #[arg(long)]
    pub line_width: Option<f32>,

    /// Colour for vector layers (default: render.vector_color)
    #[arg(long, value_parser = parse_color)]
    pub vector_color: Option<Rgba<u8>>,
}

pub fn run(runner: &CliRunner, args: CompositeArgs) -> Result<(), CliError> {
    runner.log_startup("composite");
    let config = runner.config();

    let mut stack = runner.load_stack(&args.inputs)?;
    args.layers.apply(&mut stack, runner);

    let mut compositor = config.render.compositor();
    if let Some(width) = args.line_width {
        compositor = compositor.with_line_width(width);
    }
    if let Some(color) = args.vector_color {
        compositor = compositor.with_vector_color(color);
    }

    let canvas = args.canvas.canvas(config);
    let output = compositor.composite_stack(&stack, &canvas)?;

    println!(
        "Composited {} of {} layers",
        stack.visible_ordered().len(),
        stack.len()
    );
    runner.save_raster(&args.output, &output)
}
