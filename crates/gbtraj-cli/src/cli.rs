use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "gbtraj - A command-line tool for scanning, rewriting, and extracting grain-boundary atoms from LAMMPS trajectory dump files."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarize the timesteps of a trajectory dump file.
    Info(InfoArgs),
    /// Read a dump file and write it back, optionally filtered or re-boxed.
    Rewrite(RewriteArgs),
    /// Extract the grain-boundary atoms of one timestep.
    Boundary(BoundaryArgs),
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Path to the trajectory dump file.
    #[arg(value_name = "PATH")]
    pub input: PathBuf,
}

#[derive(Args, Debug)]
pub struct RewriteArgs {
    /// Path to the trajectory dump file.
    #[arg(value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the output dump file.
    #[arg(short, long, value_name = "PATH")]
    pub output: PathBuf,

    /// Keep only these timestep indices.
    #[arg(long, value_name = "N,N,...", value_delimiter = ',')]
    pub steps: Option<Vec<i64>>,

    /// Recompute each timestep's box bounds from its positions.
    #[arg(long)]
    pub rebox: bool,

    /// Append to the output file instead of replacing it.
    #[arg(long)]
    pub append: bool,
}

#[derive(Args, Debug)]
pub struct BoundaryArgs {
    /// Path to the trajectory dump file.
    #[arg(value_name = "PATH")]
    pub input: PathBuf,

    /// Element codes of the atomic species. Required here or in the
    /// configuration file.
    #[arg(short = 'z', long, value_name = "Z,Z,...", value_delimiter = ',')]
    pub species: Option<Vec<i32>>,

    /// Timestep index to analyze; defaults to the first record in the file.
    #[arg(short, long, value_name = "N")]
    pub step: Option<i64>,

    /// Selection method (median, cna, cna-max).
    #[arg(short, long, value_name = "NAME")]
    pub method: Option<String>,

    /// Extra column used as the scalar selection field.
    #[arg(short, long, value_name = "NAME")]
    pub attribute: Option<String>,

    /// Median-deviation cutoff for the median method.
    #[arg(long, value_name = "FLOAT")]
    pub cutoff: Option<f64>,

    /// Path to a TOML configuration file with defaults for this command.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write the selected atoms to this CSV file.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}
