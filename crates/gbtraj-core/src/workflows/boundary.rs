use crate::core::models::column::Column;
use crate::core::models::snapshot::{BoxBounds, Snapshot};
use crate::selection::{SelectionError, SelectionMethod, SelectionParams};
use nalgebra::Point3;
use thiserror::Error;
use tracing::{info, instrument};

/// The extra column consulted when the caller does not name one.
pub const DEFAULT_ATTRIBUTE: &str = "c_csd";

#[derive(Debug, Error)]
pub enum BoundaryError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Snapshot has no extra column named '{name}'")]
    UnknownAttribute { name: String },

    #[error(transparent)]
    Selection(#[from] SelectionError),
}

/// Settings for one boundary extraction.
///
/// Built through [`BoundaryConfig::builder`], which enforces the required
/// fields. The element species codes cannot be inferred from a dump file and
/// must always be supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryConfig {
    /// Element codes of the atomic species, for downstream descriptor code.
    pub species: Vec<i32>,
    /// The selection strategy to dispatch to.
    pub method: SelectionMethod,
    /// Name of the extra column used as the scalar selection field.
    pub attribute: String,
    /// Carry the extra columns of the selected atoms into the result.
    pub include_extras: bool,
    /// Strategy tuning knobs.
    pub params: SelectionParams,
}

impl BoundaryConfig {
    /// Starts a builder with the documented defaults.
    pub fn builder() -> BoundaryConfigBuilder {
        BoundaryConfigBuilder::default()
    }
}

/// Builder for [`BoundaryConfig`].
#[derive(Debug, Clone, Default)]
pub struct BoundaryConfigBuilder {
    species: Option<Vec<i32>>,
    method: Option<SelectionMethod>,
    attribute: Option<String>,
    include_extras: Option<bool>,
    params: Option<SelectionParams>,
}

impl BoundaryConfigBuilder {
    pub fn species(mut self, species: Vec<i32>) -> Self {
        self.species = Some(species);
        self
    }
    pub fn method(mut self, method: SelectionMethod) -> Self {
        self.method = Some(method);
        self
    }
    pub fn attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }
    pub fn include_extras(mut self, include: bool) -> Self {
        self.include_extras = Some(include);
        self
    }
    pub fn params(mut self, params: SelectionParams) -> Self {
        self.params = Some(params);
        self
    }

    /// Finalizes the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError::MissingParameter`] when the species codes
    /// were not supplied.
    pub fn build(self) -> Result<BoundaryConfig, BoundaryError> {
        Ok(BoundaryConfig {
            species: self
                .species
                .ok_or(BoundaryError::MissingParameter("species"))?,
            method: self.method.unwrap_or(SelectionMethod::Median),
            attribute: self
                .attribute
                .unwrap_or_else(|| DEFAULT_ATTRIBUTE.to_string()),
            include_extras: self.include_extras.unwrap_or(true),
            params: self.params.unwrap_or_default(),
        })
    }
}

/// The grain-boundary subset of one snapshot, ready for descriptor code.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    /// Element codes supplied by the caller.
    pub species: Vec<i32>,
    /// Indices of the selected atoms within the source snapshot.
    pub indices: Vec<usize>,
    /// Atom ids of the selected atoms.
    pub ids: Vec<i64>,
    /// Atom-type codes of the selected atoms.
    pub types: Vec<i32>,
    /// Positions of the selected atoms.
    pub positions: Vec<Point3<f64>>,
    /// The source snapshot's simulation cell bounds.
    pub bounds: BoxBounds,
    /// Extra columns filtered to the selected atoms, when requested.
    pub extras: Vec<(String, Column)>,
}

impl Boundary {
    /// Returns the number of selected atoms.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns `true` if no atoms were selected.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Returns the indices of the atoms the named strategy considers to lie on
/// the grain boundary.
///
/// # Errors
///
/// Returns [`BoundaryError::UnknownAttribute`] when the snapshot has no
/// extra column named `attribute`.
pub fn boundary_indices(
    snapshot: &Snapshot,
    method: SelectionMethod,
    attribute: &str,
    params: &SelectionParams,
) -> Result<Vec<usize>, BoundaryError> {
    let column = snapshot
        .extra(attribute)
        .ok_or_else(|| BoundaryError::UnknownAttribute {
            name: attribute.to_string(),
        })?;
    let field = column.as_f64_vec();
    Ok(method.select(&snapshot.positions, &field, &snapshot.types, params))
}

/// Extracts the grain-boundary subset of a snapshot.
///
/// Dispatches the configured selection strategy over the configured
/// attribute, then assembles the selected atoms' data. Extra columns are
/// carried along unless the configuration turns them off.
#[instrument(skip_all, name = "boundary_extraction")]
pub fn extract(snapshot: &Snapshot, config: &BoundaryConfig) -> Result<Boundary, BoundaryError> {
    let indices = boundary_indices(snapshot, config.method, &config.attribute, &config.params)?;
    info!(
        selected = indices.len(),
        total = snapshot.len(),
        method = %config.method,
        attribute = %config.attribute,
        "selected boundary atoms"
    );

    let extras = if config.include_extras {
        snapshot
            .extras
            .iter()
            .map(|(name, column)| (name.clone(), column.filtered(&indices)))
            .collect()
    } else {
        Vec::new()
    };

    Ok(Boundary {
        species: config.species.clone(),
        ids: indices.iter().map(|&i| snapshot.ids[i]).collect(),
        types: indices.iter().map(|&i| snapshot.types[i]).collect(),
        positions: indices.iter().map(|&i| snapshot.positions[i]).collect(),
        bounds: snapshot.bounds,
        extras,
        indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_with_field(values: Vec<f64>) -> Snapshot {
        let n = values.len();
        Snapshot {
            index: 0,
            ids: (1..=n as i64).collect(),
            types: vec![1; n],
            positions: (0..n).map(|i| Point3::new(i as f64, 0.0, 0.0)).collect(),
            bounds: BoxBounds::new([[0.0, 10.0]; 3]),
            periodic: [true, true, true],
            extras: vec![
                ("c_csd".to_string(), Column::Float(values)),
                ("grain".to_string(), Column::Int((0..n as i64).collect())),
            ],
        }
    }

    #[test]
    fn builder_requires_the_species_parameter() {
        let err = BoundaryConfig::builder().build().unwrap_err();
        assert!(matches!(err, BoundaryError::MissingParameter("species")));
    }

    #[test]
    fn builder_applies_documented_defaults() {
        let config = BoundaryConfig::builder().species(vec![28]).build().unwrap();
        assert_eq!(config.species, vec![28]);
        assert_eq!(config.method, SelectionMethod::Median);
        assert_eq!(config.attribute, DEFAULT_ATTRIBUTE);
        assert!(config.include_extras);
        assert_eq!(config.params, SelectionParams::default());
    }

    #[test]
    fn unknown_attribute_is_an_error() {
        let snapshot = snapshot_with_field(vec![0.0, 0.0, 5.0]);
        let err = boundary_indices(
            &snapshot,
            SelectionMethod::Median,
            "c_cna",
            &SelectionParams::default(),
        )
        .unwrap_err();
        match err {
            BoundaryError::UnknownAttribute { name } => assert_eq!(name, "c_cna"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn extract_collects_the_selected_subset() {
        let snapshot = snapshot_with_field(vec![0.0, 0.0, 0.0, 6.0, 7.0]);
        let config = BoundaryConfig::builder().species(vec![28]).build().unwrap();

        let boundary = extract(&snapshot, &config).unwrap();
        assert_eq!(boundary.indices, vec![3, 4]);
        assert_eq!(boundary.len(), 2);
        assert_eq!(boundary.ids, vec![4, 5]);
        assert_eq!(boundary.types, vec![1, 1]);
        assert_eq!(boundary.positions[0], Point3::new(3.0, 0.0, 0.0));
        assert_eq!(boundary.bounds, snapshot.bounds);

        assert_eq!(boundary.extras.len(), 2);
        assert_eq!(
            boundary.extras[0],
            ("c_csd".to_string(), Column::Float(vec![6.0, 7.0]))
        );
        assert_eq!(
            boundary.extras[1],
            ("grain".to_string(), Column::Int(vec![3, 4]))
        );
    }

    #[test]
    fn extract_can_leave_extras_behind() {
        let snapshot = snapshot_with_field(vec![0.0, 0.0, 5.0]);
        let config = BoundaryConfig::builder()
            .species(vec![28])
            .include_extras(false)
            .build()
            .unwrap();

        let boundary = extract(&snapshot, &config).unwrap();
        assert!(!boundary.is_empty());
        assert!(boundary.extras.is_empty());
    }
}
