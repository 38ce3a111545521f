//! Named strategies for picking grain-boundary atoms out of a snapshot.
//!
//! A strategy sees the parsed columnar data only: atom positions, one scalar
//! per-atom field chosen by the caller (typically a centro-symmetry or
//! common-neighbor-analysis output), and the atom types. The set of
//! strategies is closed; looking up a name outside the registry is an error,
//! never an empty result.

use nalgebra::Point3;
use phf::phf_map;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Unknown selection method '{name}'. Expected one of: median, cna, cna-max.")]
    UnknownMethod { name: String },
}

/// The closed set of boundary-selection strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum SelectionMethod {
    /// Atoms whose field value sits far above the field median.
    Median,
    /// Atoms whose field value differs from the modal value.
    CnaMax,
}

static SELECTION_METHODS: phf::Map<&'static str, SelectionMethod> = phf_map! {
    "median" => SelectionMethod::Median,
    "cna" => SelectionMethod::CnaMax,
    "cna-max" => SelectionMethod::CnaMax,
};

impl SelectionMethod {
    /// Runs the strategy over one snapshot's columnar data and returns the
    /// indices of the selected atoms in ascending order.
    ///
    /// Positions and types are part of the strategy contract even though the
    /// current strategies decide on the scalar field alone.
    pub fn select(
        &self,
        _positions: &[Point3<f64>],
        field: &[f64],
        _types: &[i32],
        params: &SelectionParams,
    ) -> Vec<usize> {
        match self {
            SelectionMethod::Median => select_above_median(field, params.cutoff),
            SelectionMethod::CnaMax => select_off_modal(field),
        }
    }
}

impl FromStr for SelectionMethod {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SELECTION_METHODS
            .get(s)
            .copied()
            .ok_or_else(|| SelectionError::UnknownMethod {
                name: s.to_string(),
            })
    }
}

impl TryFrom<String> for SelectionMethod {
    type Error = SelectionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl std::fmt::Display for SelectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SelectionMethod::Median => "median",
            SelectionMethod::CnaMax => "cna-max",
        };
        write!(f, "{name}")
    }
}

/// Tuning knobs shared by the selection strategies.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SelectionParams {
    /// How many median absolute deviations above the median a value must sit
    /// to count as boundary-like.
    pub cutoff: f64,
}

impl Default for SelectionParams {
    fn default() -> Self {
        Self { cutoff: 2.5 }
    }
}

/// Selects values sitting more than `cutoff` median absolute deviations
/// above the median.
///
/// Bulk atoms of an ordered crystal cluster tightly around the field median
/// (for a centro-symmetry field, near zero), so the deviation scale comes
/// from the data itself. In a perfect bulk the deviation collapses to zero;
/// the test then degenerates to a plain above-median cut.
fn select_above_median(field: &[f64], cutoff: f64) -> Vec<usize> {
    if field.is_empty() {
        return Vec::new();
    }
    let med = median(field);
    let deviations: Vec<f64> = field.iter().map(|v| (v - med).abs()).collect();
    let mad = median(&deviations);

    field
        .iter()
        .enumerate()
        .filter(|&(_, &v)| {
            if mad > 0.0 {
                v - med > cutoff * mad
            } else {
                v > med
            }
        })
        .map(|(i, _)| i)
        .collect()
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Selects values that differ from the modal (most frequent) value.
///
/// Structure-classification fields label every bulk atom with the same
/// code, so the dominant label marks the crystalline grains and everything
/// else is boundary material. Values are rounded to the nearest integer
/// before counting.
fn select_off_modal(field: &[f64]) -> Vec<usize> {
    if field.is_empty() {
        return Vec::new();
    }
    let mut counts: HashMap<i64, usize> = HashMap::new();
    for &v in field {
        *counts.entry(v.round() as i64).or_insert(0) += 1;
    }
    let modal = counts
        .into_iter()
        .max_by_key(|&(_, count)| count)
        .map(|(value, _)| value)
        .unwrap_or(0);

    field
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v.round() as i64 != modal)
        .map(|(i, _)| i)
        .collect()
}
