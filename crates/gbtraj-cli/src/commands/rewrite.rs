use crate::cli::RewriteArgs;
use crate::error::{CliError, Result};
use crate::progress::ScanSpinner;
use gbtraj::core::io::lammps::{LammpsDump, WriteOptions};
use std::collections::HashSet;
use tracing::{info, warn};

pub fn run(args: RewriteArgs) -> Result<()> {
    let steps: Option<HashSet<i64>> = args.steps.as_ref().map(|s| s.iter().copied().collect());
    if let Some(steps) = &steps {
        info!("Restricting the rewrite to {} timestep(s).", steps.len());
    }

    let spinner = ScanSpinner::start("Scanning trajectory...");
    let trajectory = LammpsDump::read_filtered_from_path(&args.input, steps).map_err(|e| {
        CliError::FileParsing {
            path: args.input.clone(),
            source: e.into(),
        }
    })?;
    spinner.finish(format!("Scanned {} timestep(s)", trajectory.len()));

    if trajectory.is_empty() {
        warn!("No timesteps matched; the output will be empty.");
    }

    LammpsDump::write_to_path_with(
        &trajectory,
        &args.output,
        WriteOptions {
            rebox: args.rebox,
            append: args.append,
        },
    )
    .map_err(|e| CliError::FileWriting {
        path: args.output.clone(),
        source: e.into(),
    })?;

    println!(
        "Wrote {} timestep(s) to {}{}",
        trajectory.len(),
        args.output.display(),
        if args.rebox { " (re-boxed)" } else { "" }
    );
    Ok(())
}
