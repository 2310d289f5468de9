//! `overlaymap edit` - select a region and recolour it.

use std::path::PathBuf;

use clap::Args;
use image::Rgba;
use overlaymap::edit::{EditSession, FillOutcome, UndoOutcome};
use overlaymap::source::load_path;

use crate::commands::common::{parse_color, parse_pixel, parse_points, Polygon};
use crate::error::CliError;
use crate::runner::CliRunner;

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Raster input (image or grid)
    pub input: PathBuf,

    /// Output image path (format from extension)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Flood-select from this pixel: x,y
    #[arg(long, value_parser = parse_pixel, conflicts_with = "lasso", required_unless_present = "lasso")]
    pub seed: Option<(u32, u32)>,

    /// Flood tolerance 0-255 (default: selection.tolerance)
    #[arg(long, requires = "seed")]
    pub tolerance: Option<u32>,

    /// Lasso polygon in pixels: "x,y;x,y;x,y"
    #[arg(long, value_parser = parse_points)]
    pub lasso: Option<Polygon>,

    /// Fill everything except the selection
    #[arg(long)]
    pub invert: bool,

    /// Fill colour
    #[arg(long, value_parser = parse_color)]
    pub color: Rgba<u8>,

    /// Fill opacity in (0, 1] (default: edit.fill_opacity)
    #[arg(long)]
    pub opacity: Option<f32>,

    /// Undo this many fills before saving
    #[arg(long, default_value = "0")]
    pub undo: usize,
}

pub fn run(runner: &CliRunner, args: EditArgs) -> Result<(), CliError> {
    runner.log_startup("edit");
    let config = runner.config();

    let raster = load_path(&args.input)?
        .into_iter()
        .find_map(|layer| layer.payload().raster().cloned())
        .ok_or_else(|| {
            CliError::InvalidArgument(format!(
                "'{}' has no raster to edit",
                args.input.display()
            ))
        })?;
    let mut session = EditSession::with_undo_capacity(raster, config.edit.undo_capacity);

    let selected = match (&args.seed, &args.lasso) {
        (Some(seed), _) => {
            let tolerance = args.tolerance.unwrap_or(config.selection.tolerance);
            session.select_flood(*seed, tolerance)?
        }
        (None, Some(Polygon(points))) => session.select_lasso(points)?,
        (None, None) => {
            return Err(CliError::InvalidArgument(
                "one of --seed or --lasso is required".to_string(),
            ))
        }
    };

    if args.invert {
        if let Some(mut mask) = session.cancel_selection() {
            mask.invert();
            session.set_selection(mask)?;
        }
    }
    let shown = session.selection().map(|m| m.count()).unwrap_or(selected);
    println!("Selected {} pixels", shown);

    let opacity = args.opacity.unwrap_or(config.edit.fill_opacity);
    match session.commit_fill(args.color, opacity)? {
        FillOutcome::Filled { pixels } => println!("Filled {} pixels", pixels),
        FillOutcome::NothingSelected => println!("Nothing selected, image unchanged"),
    }

    for _ in 0..args.undo {
        if session.undo() == UndoOutcome::NothingToUndo {
            println!("Nothing left to undo");
            break;
        }
    }

    runner.save_raster(&args.output, &session.into_raster())
}
