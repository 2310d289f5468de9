//! overlaymap CLI - Command-line interface
//!
//! This binary exposes the overlaymap library: inspecting and decoding
//! sources, compositing layers, rendering comparisons and recolouring
//! selected regions.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};

use commands::compare::CompareArgs;
use commands::composite::CompositeArgs;
use commands::config::ConfigCommands;
use commands::decode::DecodeArgs;
use commands::edit::EditArgs;
use commands::inspect::InspectArgs;
use error::CliError;
use runner::CliRunner;

#[derive(Parser)]
#[command(name = "overlaymap")]
#[command(version = overlaymap::VERSION)]
#[command(about = "Composite, compare and edit historical map layers", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Mirror log output to stdout
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the layers produced by each input
    Inspect(InspectArgs),

    /// Render an ASCII or TIFF grid as a grayscale image
    Decode(DecodeArgs),

    /// Composite inputs into one image
    Composite(CompositeArgs),

    /// Render a comparison of two inputs
    Compare(CompareArgs),

    /// Select a region of a raster and fill it
    Edit(EditArgs),

    /// View or change configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let command = match cli.command {
        Commands::Config(command) => return commands::config::run(command),
        other => other,
    };

    let runner = CliRunner::new(cli.debug, cli.verbose)?;
    match command {
        Commands::Inspect(args) => commands::inspect::run(&runner, args),
        Commands::Decode(args) => commands::decode::run(&runner, args),
        Commands::Composite(args) => commands::composite::run(&runner, args),
        Commands::Compare(args) => commands::compare::run(&runner, args),
        Commands::Edit(args) => commands::edit::run(&runner, args),
        Commands::Config(_) => Ok(()),
    }
}
