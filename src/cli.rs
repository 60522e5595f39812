use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Diagon climate diagnostics.
#[derive(Parser)]
#[command(
    name = "diagon",
    version,
    about = "Climate diagnostics: regional indices and projected seasonal cycles"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Regional SST index (AMO), its smoothed version and regression maps.
    Amo(DiagnosticArgs),
    /// Project a climatological seasonal cycle over the configured dates.
    Cycle(DiagnosticArgs),
}

/// Arguments shared by every diagnostic subcommand.
#[derive(clap::Args)]
pub struct DiagnosticArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "diagon.toml")]
    pub config: PathBuf,

    /// Override output directory from config.
    #[arg(short, long)]
    pub outdir: Option<PathBuf>,

    /// Compute everything but write no NetCDF output.
    #[arg(long)]
    pub no_netcdf: bool,

    /// Overwrite existing output files.
    #[arg(long)]
    pub rebuild: bool,
}
