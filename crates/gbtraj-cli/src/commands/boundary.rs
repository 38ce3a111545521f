use crate::cli::BoundaryArgs;
use crate::config::FileBoundaryConfig;
use crate::error::{CliError, Result};
use crate::progress::ScanSpinner;
use gbtraj::core::io::cursor::{LineCursor, StreamMode};
use gbtraj::core::io::lammps::{ReadOptions, read_snapshot};
use gbtraj::core::models::snapshot::Snapshot;
use gbtraj::workflows::boundary::{self, Boundary};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

pub fn run(args: BoundaryArgs) -> Result<()> {
    let file_config = match &args.config {
        Some(path) => FileBoundaryConfig::load(path)?,
        None => FileBoundaryConfig::default(),
    };
    let config = file_config.merge_with_cli(&args)?;

    let spinner = ScanSpinner::start("Scanning trajectory...");
    let snapshot = load_snapshot(&args)?;
    spinner.finish(format!(
        "Loaded timestep {} ({} atoms)",
        snapshot.index,
        snapshot.len()
    ));

    let boundary = boundary::extract(&snapshot, &config)?;
    info!(
        "Boundary extraction selected {} of {} atoms.",
        boundary.len(),
        snapshot.len()
    );
    println!(
        "Timestep {}: selected {} of {} atoms via '{}' on '{}'.",
        snapshot.index,
        boundary.len(),
        snapshot.len(),
        config.method,
        config.attribute
    );

    if let Some(path) = &args.output {
        write_csv(path, &boundary, &config.attribute)?;
        println!("Selected atoms written to {}", path.display());
    }
    Ok(())
}

fn load_snapshot(args: &BoundaryArgs) -> Result<Snapshot> {
    let file = File::open(&args.input)?;
    // The stream lives only for this one lookup, so a targeted seek may
    // abandon it instead of rewinding.
    let mut cursor = LineCursor::new(BufReader::new(file));
    let options = match args.step {
        Some(step) => ReadOptions::seeking(step, StreamMode::Exclusive),
        None => ReadOptions::sequential(),
    };
    read_snapshot(&mut cursor, &options)
        .map_err(|e| CliError::FileParsing {
            path: args.input.clone(),
            source: e.into(),
        })?
        .ok_or_else(|| match args.step {
            Some(step) => CliError::Argument(format!(
                "timestep {} not found in '{}'",
                step,
                args.input.display()
            )),
            None => CliError::Argument(format!(
                "'{}' contains no complete timestep records",
                args.input.display()
            )),
        })
}

fn write_csv(path: &Path, boundary: &Boundary, attribute: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["id", "type", "x", "y", "z", attribute])?;

    let field = boundary
        .extras
        .iter()
        .find(|(name, _)| name == attribute)
        .map(|(_, column)| column);
    for i in 0..boundary.len() {
        let p = &boundary.positions[i];
        let value = field
            .and_then(|column| column.value_as_f64(i))
            .map(|v| v.to_string())
            .unwrap_or_default();
        writer.write_record([
            boundary.ids[i].to_string(),
            boundary.types[i].to_string(),
            format!("{:.5}", p.x),
            format!("{:.5}", p.y),
            format!("{:.5}", p.z),
            value,
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gbtraj::core::models::column::Column;
    use gbtraj::core::models::snapshot::BoxBounds;
    use nalgebra::Point3;

    fn sample_boundary() -> Boundary {
        Boundary {
            species: vec![28],
            indices: vec![0, 2],
            ids: vec![1, 3],
            types: vec![1, 2],
            positions: vec![Point3::new(0.0, 1.0, 2.0), Point3::new(3.0, 4.0, 5.0)],
            bounds: BoxBounds::new([[0.0, 10.0]; 3]),
            extras: vec![("c_csd".to_string(), Column::Float(vec![6.5, 8.25]))],
        }
    }

    #[test]
    fn csv_export_writes_one_row_per_selected_atom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("boundary.csv");

        write_csv(&path, &sample_boundary(), "c_csd").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "id,type,x,y,z,c_csd");
        assert_eq!(lines[1], "1,1,0.00000,1.00000,2.00000,6.5");
        assert_eq!(lines[2], "3,2,3.00000,4.00000,5.00000,8.25");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn csv_export_leaves_the_attribute_blank_without_extras() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("boundary.csv");

        let mut boundary = sample_boundary();
        boundary.extras.clear();
        write_csv(&path, &boundary, "c_csd").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.lines().nth(1).unwrap().ends_with(","));
    }
}
