use crate::cli::InfoArgs;
use crate::error::{CliError, Result};
use crate::progress::ScanSpinner;
use gbtraj::core::io::lammps::LammpsDump;
use gbtraj::core::io::traits::TrajectoryFile;
use tracing::info;

pub fn run(args: InfoArgs) -> Result<()> {
    let spinner = ScanSpinner::start("Scanning trajectory...");
    let trajectory =
        LammpsDump::read_from_path(&args.input).map_err(|e| CliError::FileParsing {
            path: args.input.clone(),
            source: e.into(),
        })?;
    spinner.finish(format!("Scanned {} timestep(s)", trajectory.len()));
    info!("Loaded {} timestep(s) from {:?}", trajectory.len(), args.input);

    println!("{}: {} timestep(s)", args.input.display(), trajectory.len());
    for snapshot in &trajectory {
        let periodic: String = snapshot
            .periodic
            .iter()
            .map(|&p| if p { "pp" } else { "ss" })
            .collect::<Vec<_>>()
            .join(" ");
        let extras: Vec<&str> = snapshot.extra_names().collect();
        println!(
            "  step {:>10}  atoms {:>8}  box x [{:.4}, {:.4}] y [{:.4}, {:.4}] z [{:.4}, {:.4}]  periodic [{}]  extras [{}]",
            snapshot.index,
            snapshot.len(),
            snapshot.bounds.lo(0),
            snapshot.bounds.hi(0),
            snapshot.bounds.lo(1),
            snapshot.bounds.hi(1),
            snapshot.bounds.lo(2),
            snapshot.bounds.hi(2),
            periodic,
            extras.join(", ")
        );
    }
    Ok(())
}
