//! `overlaymap inspect` - list the layers an input produces.

use std::path::PathBuf;

use clap::Args;
use overlaymap::layer::{Layer, LayerPayload};
use overlaymap::raster::grid_stats;

use crate::error::CliError;
use crate::runner::CliRunner;

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Input files or shapefile directories
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
}

pub fn run(runner: &CliRunner, args: InspectArgs) -> Result<(), CliError> {
    runner.log_startup("inspect");
    let stack = runner.load_stack(&args.inputs)?;

    for layer in stack.ordered() {
        print_layer(layer);
        println!();
    }
    Ok(())
}

fn print_layer(layer: &Layer) {
    println!("{} ({})", layer.name(), layer.kind());
    println!("  id:      {}", layer.id());

    match layer.bounds() {
        Some(b) => println!(
            "  bounds:  [{}, {}] - [{}, {}]",
            b.min_x, b.min_y, b.max_x, b.max_y
        ),
        None => println!("  bounds:  (none)"),
    }

    match layer.payload() {
        LayerPayload::Vector(features) => {
            println!("  features: {}", features.len());
        }
        LayerPayload::Grid { grid, .. } => {
            println!("  size:    {}×{}", grid.width(), grid.height());
            match grid_stats(grid) {
                Some(stats) => println!(
                    "  values:  {} .. {} ({} valid cells)",
                    stats.min, stats.max, stats.valid
                ),
                None => println!("  values:  (no data)"),
            }
            if let Some(no_data) = grid.no_data() {
                println!("  nodata:  {}", no_data);
            }
        }
        LayerPayload::Image(image) => {
            println!("  size:    {}×{}", image.width(), image.height());
        }
    }

    if let Some(crs) = layer.crs() {
        let first_line = crs.lines().next().unwrap_or_default();
        let shown: String = first_line.chars().take(72).collect();
        println!("  crs:     {}", shown);
    }
    for (key, value) in layer.tags() {
        println!("  {}: {}", key, value);
    }
}
