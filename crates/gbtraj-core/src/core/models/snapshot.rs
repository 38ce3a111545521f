use super::column::{Column, close};
use nalgebra::Point3;

/// Per-axis lower and upper bounds of the simulation cell.
///
/// Row order is the spatial axis order x, y, z; each row holds `(lo, hi)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoxBounds {
    /// The raw `(lo, hi)` pairs, one per axis.
    pub bounds: [[f64; 2]; 3],
}

impl BoxBounds {
    /// Creates bounds from three `(lo, hi)` pairs in x, y, z order.
    pub fn new(bounds: [[f64; 2]; 3]) -> Self {
        Self { bounds }
    }

    /// Returns the lower bound of the given axis (0 = x, 1 = y, 2 = z).
    pub fn lo(&self, axis: usize) -> f64 {
        self.bounds[axis][0]
    }

    /// Returns the upper bound of the given axis (0 = x, 1 = y, 2 = z).
    pub fn hi(&self, axis: usize) -> f64 {
        self.bounds[axis][1]
    }

    /// Computes the tight axis-aligned extent of a set of positions.
    ///
    /// This is the re-boxing rule used when writing a position-filtered
    /// subset: each axis's bounds become the min/max of that coordinate over
    /// the current atoms. An empty position set yields all-zero bounds.
    pub fn from_positions(positions: &[Point3<f64>]) -> Self {
        let mut bounds = [[0.0; 2]; 3];
        if positions.is_empty() {
            return Self { bounds };
        }
        for axis in 0..3 {
            let mut lo = f64::INFINITY;
            let mut hi = f64::NEG_INFINITY;
            for p in positions {
                lo = lo.min(p[axis]);
                hi = hi.max(p[axis]);
            }
            bounds[axis] = [lo, hi];
        }
        Self { bounds }
    }

    /// Compares bounds with combined absolute/relative tolerance.
    pub fn approx_eq(&self, other: &BoxBounds) -> bool {
        self.bounds
            .iter()
            .zip(&other.bounds)
            .all(|(a, b)| close(a[0], b[0]) && close(a[1], b[1]))
    }
}

/// One timestep of a trajectory: the simulation box plus index-aligned
/// per-atom columns.
///
/// The five fixed per-atom fields (id, type, x, y, z) are stored in dedicated
/// vectors; every further field discovered in the ATOMS header at parse time
/// lands in [`extras`](Self::extras), in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// The timestep index from the TIMESTEP header.
    pub index: i64,
    /// Integer atom ids, one per atom.
    pub ids: Vec<i64>,
    /// Integer atom-type codes, one per atom.
    pub types: Vec<i32>,
    /// Atom positions in Angstroms, one per atom.
    pub positions: Vec<Point3<f64>>,
    /// The simulation cell bounds.
    pub bounds: BoxBounds,
    /// Per-axis periodicity flags in x, y, z order.
    pub periodic: [bool; 3],
    /// Named extra columns in ATOMS-header declaration order.
    pub extras: Vec<(String, Column)>,
}

impl Snapshot {
    /// Returns the number of atoms in this snapshot.
    ///
    /// The stored column length is authoritative; the atom count declared in
    /// the dump header is only a parse-time sanity check.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns `true` if the snapshot holds no atoms.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Looks up an extra column by name.
    pub fn extra(&self, name: &str) -> Option<&Column> {
        self.extras
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    /// Returns the extra-column names in declaration order.
    pub fn extra_names(&self) -> impl Iterator<Item = &str> {
        self.extras.iter().map(|(n, _)| n.as_str())
    }

    /// Compares two snapshots for content equality.
    ///
    /// Positions and box bounds are compared with combined absolute/relative
    /// tolerance; ids, types, periodicity, extra-column names, order, and
    /// values are compared exactly (float columns again with tolerance). The
    /// timestep index is deliberately not compared, so trajectories with
    /// renumbered steps can still match content-wise.
    pub fn approx_eq(&self, other: &Snapshot) -> bool {
        if self.ids != other.ids
            || self.types != other.types
            || self.periodic != other.periodic
            || self.positions.len() != other.positions.len()
            || self.extras.len() != other.extras.len()
        {
            return false;
        }
        if !self.bounds.approx_eq(&other.bounds) {
            return false;
        }
        if !self
            .positions
            .iter()
            .zip(&other.positions)
            .all(|(a, b)| (0..3).all(|axis| close(a[axis], b[axis])))
        {
            return false;
        }
        self.extras
            .iter()
            .zip(&other.extras)
            .all(|((na, ca), (nb, cb))| na == nb && ca.approx_eq(cb))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_snapshot() -> Snapshot {
        Snapshot {
            index: 100,
            ids: vec![1, 2],
            types: vec![1, 1],
            positions: vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 2.0, 3.0)],
            bounds: BoxBounds::new([[0.0, 10.0], [0.0, 10.0], [0.0, 10.0]]),
            periodic: [true, true, false],
            extras: vec![("c_csd".to_string(), Column::Float(vec![0.1, 4.2]))],
        }
    }

    #[test]
    fn len_reports_atom_count() {
        let snap = sample_snapshot();
        assert_eq!(snap.len(), 2);
        assert!(!snap.is_empty());
    }

    #[test]
    fn extra_lookup_finds_declared_columns() {
        let snap = sample_snapshot();
        assert!(snap.extra("c_csd").is_some());
        assert!(snap.extra("missing").is_none());
        assert_eq!(snap.extra_names().collect::<Vec<_>>(), vec!["c_csd"]);
    }

    #[test]
    fn approx_eq_ignores_the_timestep_index() {
        let a = sample_snapshot();
        let mut b = sample_snapshot();
        b.index = 999;
        assert!(a.approx_eq(&b));
    }

    #[test]
    fn approx_eq_tolerates_small_position_error() {
        let a = sample_snapshot();
        let mut b = sample_snapshot();
        b.positions[1].x += 1e-9;
        assert!(a.approx_eq(&b));
    }

    #[test]
    fn approx_eq_rejects_changed_fields() {
        let a = sample_snapshot();

        let mut b = sample_snapshot();
        b.types[0] = 2;
        assert!(!a.approx_eq(&b));

        let mut b = sample_snapshot();
        b.periodic = [true, true, true];
        assert!(!a.approx_eq(&b));

        let mut b = sample_snapshot();
        b.extras[0].0 = "c_cna".to_string();
        assert!(!a.approx_eq(&b));

        let mut b = sample_snapshot();
        b.positions[0].x += 0.5;
        assert!(!a.approx_eq(&b));
    }

    #[test]
    fn bounds_from_positions_take_per_axis_extent() {
        let positions = vec![
            Point3::new(-1.0, 0.0, 5.0),
            Point3::new(3.0, -2.0, 7.0),
            Point3::new(0.5, 4.0, 6.0),
        ];
        let bounds = BoxBounds::from_positions(&positions);
        assert_eq!(bounds.bounds, [[-1.0, 3.0], [-2.0, 4.0], [5.0, 7.0]]);
    }

    #[test]
    fn bounds_from_no_positions_are_zero() {
        assert_eq!(
            BoxBounds::from_positions(&[]),
            BoxBounds::new([[0.0; 2]; 3])
        );
    }
}
