//! `overlaymap decode` - render a numeric grid as a grayscale image.

use std::path::PathBuf;

use clap::Args;
use overlaymap::layer::LayerPayload;
use overlaymap::raster::{decode_grid, grid_stats};
use overlaymap::source::load_path;

use crate::error::CliError;
use crate::runner::CliRunner;

#[derive(Debug, Args)]
pub struct DecodeArgs {
    /// ESRI ASCII grid (.asc) or single-band TIFF
    pub input: PathBuf,

    /// Output image path (format from extension)
    #[arg(short, long)]
    pub output: PathBuf,
}

pub fn run(runner: &CliRunner, args: DecodeArgs) -> Result<(), CliError> {
    runner.log_startup("decode");
    let layers = load_path(&args.input)?;

    let grid = layers
        .iter()
        .find_map(|layer| match layer.payload() {
            LayerPayload::Grid { grid, .. } => Some(grid),
            _ => None,
        })
        .ok_or_else(|| {
            CliError::InvalidArgument(format!(
                "'{}' is not a single-band grid",
                args.input.display()
            ))
        })?;

    match grid_stats(grid) {
        Some(stats) => println!(
            "Grid {}×{}: {} .. {} ({} valid cells)",
            grid.width(),
            grid.height(),
            stats.min,
            stats.max,
            stats.valid
        ),
        None => println!(
            "Grid {}×{}: no valid cells, output is transparent",
            grid.width(),
            grid.height()
        ),
    }

    runner.save_raster(&args.output, &decode_grid(grid))
}
