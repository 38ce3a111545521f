use crate::core::io::cursor::{LineCursor, StreamMode};
use crate::core::io::traits::TrajectoryFile;
use crate::core::models::column::Column;
use crate::core::models::snapshot::{BoxBounds, Snapshot};
use crate::core::models::trajectory::Trajectory;
use nalgebra::Point3;
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum DumpError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: DumpParseErrorKind,
    },
}

#[derive(Debug, Error)]
pub enum DumpParseErrorKind {
    #[error("Invalid integer token '{value}' in {context}")]
    InvalidInt {
        context: &'static str,
        value: String,
    },
    #[error("Invalid float token '{value}' in {context}")]
    InvalidFloat {
        context: &'static str,
        value: String,
    },
    #[error("Line has {found} fields, expected at least {expected}")]
    TooFewFields { expected: usize, found: usize },
    #[error("Atom line has {found} fields but the ATOMS header declares {expected}")]
    FieldCountMismatch { expected: usize, found: usize },
    #[error("Mixed integer and float values in column '{column}'")]
    MixedColumnKinds { column: String },
}

/// Skip and seek policy for one [`read_snapshot`] invocation.
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// When set, only a record with exactly this timestep index is returned;
    /// earlier records are consumed and discarded, and overshooting ends the
    /// parse according to [`mode`](Self::mode).
    pub target: Option<i64>,
    /// When set, records whose timestep index is not a member are consumed
    /// and discarded.
    pub steps: Option<HashSet<i64>>,
    /// Declares whether the stream is revisited by later calls.
    pub mode: StreamMode,
}

impl ReadOptions {
    /// Plain sequential reading: accept every record in stream order.
    pub fn sequential() -> Self {
        Self::default()
    }

    /// Seek a single timestep index on a stream with the given ownership.
    pub fn seeking(target: i64, mode: StreamMode) -> Self {
        Self {
            target: Some(target),
            mode,
            ..Self::default()
        }
    }

    /// Sequential reading restricted to an allow-list of timestep indices.
    pub fn filtered(steps: HashSet<i64>) -> Self {
        Self {
            steps: Some(steps),
            ..Self::default()
        }
    }
}

/// Output policy for trajectory write-back.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    /// Recompute each axis's box bounds from the current positions instead
    /// of writing the stored bounds.
    pub rebox: bool,
    /// Append to an existing file instead of truncating it first. Only
    /// consulted by the path-based helpers.
    pub append: bool,
}

fn item_body(line: &str) -> Option<&str> {
    line.trim_start()
        .strip_prefix("ITEM:")
        .map(str::trim_start)
}

fn is_item(line: &str, keyword: &str) -> bool {
    item_body(line).is_some_and(|body| body.starts_with(keyword))
}

fn first_token(line: &str) -> &str {
    line.split_whitespace().next().unwrap_or("")
}

fn parse_int<T: std::str::FromStr>(
    token: &str,
    line: usize,
    context: &'static str,
) -> Result<T, DumpError> {
    token.parse().map_err(|_| DumpError::Parse {
        line,
        kind: DumpParseErrorKind::InvalidInt {
            context,
            value: token.to_string(),
        },
    })
}

fn parse_float(token: &str, line: usize, context: &'static str) -> Result<f64, DumpError> {
    token.parse().map_err(|_| DumpError::Parse {
        line,
        kind: DumpParseErrorKind::InvalidFloat {
            context,
            value: token.to_string(),
        },
    })
}

/// Reads the next wanted record from the cursor's current position.
///
/// On return the cursor sits either just past the consumed record or, after
/// a shared-mode overshoot, at the start of the overshot record's TIMESTEP
/// header. `Ok(None)` signals end of data: the stream is exhausted, the
/// record under the cursor is structurally incomplete, or the seek policy
/// ended the scan.
pub fn read_snapshot<R: BufRead>(
    cursor: &mut LineCursor<R>,
    options: &ReadOptions,
) -> Result<Option<Snapshot>, DumpError> {
    loop {
        let header = loop {
            match cursor.next_line()? {
                None => return Ok(None),
                Some(line) if is_item(&line, "TIMESTEP") => break line,
                Some(_) => {}
            }
        };
        let Some(index_line) = cursor.next_line()? else {
            return Ok(None);
        };
        let index: i64 = parse_int(
            first_token(&index_line),
            cursor.line_number(),
            "TIMESTEP value",
        )?;

        if let Some(steps) = &options.steps {
            if !steps.contains(&index) {
                skip_record_body(cursor)?;
                continue;
            }
        }
        if let Some(target) = options.target {
            if index > target {
                // The target cannot appear later in the stream. A shared
                // cursor is rewound so the next call starts on this record's
                // header without having lost any bytes.
                if options.mode == StreamMode::Shared {
                    cursor.unread(index_line);
                    cursor.unread(header);
                }
                return Ok(None);
            }
            if index < target {
                skip_record_body(cursor)?;
                continue;
            }
        }
        return read_record_body(cursor, index);
    }
}

fn skip_record_body<R: BufRead>(cursor: &mut LineCursor<R>) -> Result<(), io::Error> {
    // Values of a skipped record are discarded; consuming up to the next
    // TIMESTEP header keeps the cursor byte-aligned.
    while let Some(line) = cursor.next_line()? {
        if is_item(&line, "TIMESTEP") {
            cursor.unread(line);
            break;
        }
    }
    Ok(())
}

fn read_record_body<R: BufRead>(
    cursor: &mut LineCursor<R>,
    index: i64,
) -> Result<Option<Snapshot>, DumpError> {
    let Some(line) = cursor.next_line()? else {
        return Ok(None);
    };
    if !is_item(&line, "NUMBER OF ATOMS") {
        return Ok(None);
    }
    let Some(count_line) = cursor.next_line()? else {
        return Ok(None);
    };
    let declared: usize = parse_int(
        first_token(&count_line),
        cursor.line_number(),
        "NUMBER OF ATOMS value",
    )?;

    let Some(box_header) = cursor.next_line()? else {
        return Ok(None);
    };
    let Some(box_body) = item_body(&box_header).filter(|b| b.starts_with("BOX BOUNDS")) else {
        return Ok(None);
    };
    // Absent periodicity tokens mean shrink-wrapped on every axis.
    let mut periodic = [false; 3];
    for (axis, token) in box_body["BOX BOUNDS".len()..]
        .split_whitespace()
        .take(3)
        .enumerate()
    {
        periodic[axis] = token == "pp";
    }
    let mut bounds = [[0.0; 2]; 3];
    for axis_bounds in &mut bounds {
        let Some(line) = cursor.next_line()? else {
            return Ok(None);
        };
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 2 {
            return Err(DumpError::Parse {
                line: cursor.line_number(),
                kind: DumpParseErrorKind::TooFewFields {
                    expected: 2,
                    found: tokens.len(),
                },
            });
        }
        let line_no = cursor.line_number();
        *axis_bounds = [
            parse_float(tokens[0], line_no, "box bounds")?,
            parse_float(tokens[1], line_no, "box bounds")?,
        ];
    }

    let Some(atoms_header) = cursor.next_line()? else {
        return Ok(None);
    };
    let Some(atoms_body) = item_body(&atoms_header).filter(|b| b.starts_with("ATOMS")) else {
        return Ok(None);
    };
    // The first five field names are the fixed id, type, x, y, z; the rest
    // declare the extra columns in order.
    let extra_names: Vec<String> = atoms_body["ATOMS".len()..]
        .split_whitespace()
        .skip(5)
        .map(str::to_string)
        .collect();

    let mut ids: Vec<i64> = Vec::new();
    let mut types: Vec<i32> = Vec::new();
    let mut positions: Vec<Point3<f64>> = Vec::new();
    let mut columns: Vec<Option<Column>> = vec![None; extra_names.len()];

    loop {
        let Some(line) = cursor.next_line()? else {
            break;
        };
        if item_body(&line).is_some() {
            cursor.unread(line);
            break;
        }
        if line.trim().is_empty() {
            break;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let line_no = cursor.line_number();
        if tokens.len() < 5 {
            return Err(DumpError::Parse {
                line: line_no,
                kind: DumpParseErrorKind::TooFewFields {
                    expected: 5,
                    found: tokens.len(),
                },
            });
        }
        let expected = 5 + extra_names.len();
        if tokens.len() != expected {
            return Err(DumpError::Parse {
                line: line_no,
                kind: DumpParseErrorKind::FieldCountMismatch {
                    expected,
                    found: tokens.len(),
                },
            });
        }
        ids.push(parse_int(tokens[0], line_no, "atom id")?);
        types.push(parse_int(tokens[1], line_no, "atom type")?);
        positions.push(Point3::new(
            parse_float(tokens[2], line_no, "atom position")?,
            parse_float(tokens[3], line_no, "atom position")?,
            parse_float(tokens[4], line_no, "atom position")?,
        ));
        for (slot, (token, name)) in columns
            .iter_mut()
            .zip(tokens[5..].iter().zip(&extra_names))
        {
            push_column_value(slot, name, token, line_no)?;
        }
    }

    if positions.len() != declared {
        warn!(
            declared,
            actual = positions.len(),
            timestep = index,
            "record did not have as many atoms as declared"
        );
    }

    let extras = extra_names
        .into_iter()
        .zip(columns)
        .map(|(name, column)| (name, column.unwrap_or(Column::Float(Vec::new()))))
        .collect();

    Ok(Some(Snapshot {
        index,
        ids,
        types,
        positions,
        bounds: BoxBounds::new(bounds),
        periodic,
        extras,
    }))
}

fn push_column_value(
    slot: &mut Option<Column>,
    name: &str,
    token: &str,
    line: usize,
) -> Result<(), DumpError> {
    match slot {
        // The first value fixes the column kind for the rest of the file.
        None => {
            if let Ok(v) = token.parse::<i64>() {
                *slot = Some(Column::Int(vec![v]));
            } else {
                let v = parse_float(token, line, "extra column value")?;
                *slot = Some(Column::Float(vec![v]));
            }
        }
        Some(Column::Int(values)) => match token.parse::<i64>() {
            Ok(v) => values.push(v),
            Err(_) => {
                if token.parse::<f64>().is_ok() {
                    return Err(DumpError::Parse {
                        line,
                        kind: DumpParseErrorKind::MixedColumnKinds {
                            column: name.to_string(),
                        },
                    });
                }
                return Err(DumpError::Parse {
                    line,
                    kind: DumpParseErrorKind::InvalidInt {
                        context: "extra column value",
                        value: token.to_string(),
                    },
                });
            }
        },
        Some(Column::Float(values)) => {
            values.push(parse_float(token, line, "extra column value")?)
        }
    }
    Ok(())
}

// printf-style %.*e: signed two-digit exponent, unlike Rust's LowerExp.
fn format_scientific(value: f64, precision: usize) -> String {
    let formatted = format!("{value:.precision$e}");
    let (mantissa, exponent) = formatted
        .split_once('e')
        .expect("exponential format always contains 'e'");
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(rest) => ('-', rest),
        None => ('+', exponent),
    };
    format!("{mantissa}e{sign}{digits:0>2}")
}

/// Serializes one snapshot in dump grammar order.
///
/// Box bounds are written as fixed 4-decimal floats, positions as fixed
/// 5-decimal floats, and extra columns according to their kind tag: plain
/// decimals for integer columns, scientific notation for float columns.
pub fn write_snapshot(
    snapshot: &Snapshot,
    writer: &mut impl Write,
    rebox: bool,
) -> Result<(), DumpError> {
    writeln!(writer, "ITEM: TIMESTEP")?;
    writeln!(writer, "{}", snapshot.index)?;
    writeln!(writer, "ITEM: NUMBER OF ATOMS")?;
    writeln!(writer, "{}", snapshot.len())?;

    let flags: Vec<&str> = snapshot
        .periodic
        .iter()
        .map(|&p| if p { "pp" } else { "ss" })
        .collect();
    writeln!(writer, "ITEM: BOX BOUNDS {}", flags.join(" "))?;
    let bounds = if rebox {
        BoxBounds::from_positions(&snapshot.positions)
    } else {
        snapshot.bounds
    };
    for axis in 0..3 {
        writeln!(writer, "{:.4} {:.4}", bounds.lo(axis), bounds.hi(axis))?;
    }

    if snapshot.extras.is_empty() {
        writeln!(writer, "ITEM: ATOMS id type x y z")?;
    } else {
        let names: Vec<&str> = snapshot.extra_names().collect();
        writeln!(writer, "ITEM: ATOMS id type x y z {}", names.join(" "))?;
    }

    for i in 0..snapshot.len() {
        let p = &snapshot.positions[i];
        write!(
            writer,
            "{} {} {:.5} {:.5} {:.5}",
            snapshot.ids[i], snapshot.types[i], p.x, p.y, p.z
        )?;
        for (_, column) in &snapshot.extras {
            match column {
                Column::Int(values) => write!(writer, " {}", values[i])?,
                Column::Float(values) => {
                    write!(writer, " {}", format_scientific(values[i], 5))?
                }
            }
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// The LAMMPS text dump format.
pub struct LammpsDump;

impl TrajectoryFile for LammpsDump {
    type Error = DumpError;

    fn read_from(reader: &mut impl BufRead) -> Result<Trajectory, Self::Error> {
        Self::read_filtered(reader, None)
    }

    fn write_to(trajectory: &Trajectory, writer: &mut impl Write) -> Result<(), Self::Error> {
        Self::write_with(trajectory, writer, WriteOptions::default())
    }
}

impl LammpsDump {
    /// Reads every record, or only those on the allow-list when `steps` is
    /// given, from the reader's current position to exhaustion.
    pub fn read_filtered(
        reader: &mut impl BufRead,
        steps: Option<HashSet<i64>>,
    ) -> Result<Trajectory, DumpError> {
        let mut cursor = LineCursor::new(reader);
        let options = match steps {
            Some(steps) => ReadOptions::filtered(steps),
            None => ReadOptions::sequential(),
        };
        let mut trajectory = Trajectory::new();
        while let Some(snapshot) = read_snapshot(&mut cursor, &options)? {
            trajectory.insert(snapshot);
        }
        Ok(trajectory)
    }

    /// Path variant of [`read_filtered`](Self::read_filtered).
    pub fn read_filtered_from_path<P: AsRef<Path>>(
        path: P,
        steps: Option<HashSet<i64>>,
    ) -> Result<Trajectory, DumpError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_filtered(&mut reader, steps)
    }

    /// Writes every snapshot in iteration order with the given options.
    pub fn write_with(
        trajectory: &Trajectory,
        writer: &mut impl Write,
        options: WriteOptions,
    ) -> Result<(), DumpError> {
        for snapshot in trajectory {
            write_snapshot(snapshot, writer, options.rebox)?;
        }
        Ok(())
    }

    /// Path variant of [`write_with`](Self::write_with): truncates the target
    /// first unless `options.append` is set.
    pub fn write_to_path_with<P: AsRef<Path>>(
        trajectory: &Trajectory,
        path: P,
        options: WriteOptions,
    ) -> Result<(), DumpError> {
        let file = if options.append {
            OpenOptions::new().append(true).create(true).open(path)?
        } else {
            File::create(path)?
        };
        let mut writer = BufWriter::new(file);
        Self::write_with(trajectory, &mut writer, options)
    }
}
