use super::snapshot::Snapshot;
use std::collections::HashMap;
use tracing::warn;

/// An ordered collection of snapshots read from one trajectory file.
///
/// Snapshots are keyed by their timestep index for lookup, but iteration
/// always follows insertion order, which for a parsed file is the order the
/// records appear in the stream.
#[derive(Debug, Clone, Default)]
pub struct Trajectory {
    snapshots: Vec<Snapshot>,
    index_map: HashMap<i64, usize>,
}

impl Trajectory {
    /// Creates an empty trajectory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a snapshot, keyed by its own timestep index.
    ///
    /// A duplicate index replaces the earlier snapshot in place, keeping its
    /// original position in iteration order.
    pub fn insert(&mut self, snapshot: Snapshot) {
        match self.index_map.get(&snapshot.index) {
            Some(&slot) => {
                warn!(
                    index = snapshot.index,
                    "duplicate timestep index, replacing earlier snapshot"
                );
                self.snapshots[slot] = snapshot;
            }
            None => {
                self.index_map.insert(snapshot.index, self.snapshots.len());
                self.snapshots.push(snapshot);
            }
        }
    }

    /// Looks up a snapshot by timestep index.
    pub fn get(&self, index: i64) -> Option<&Snapshot> {
        self.index_map.get(&index).map(|&slot| &self.snapshots[slot])
    }

    /// Returns `true` if a snapshot with the given timestep index exists.
    pub fn contains(&self, index: i64) -> bool {
        self.index_map.contains_key(&index)
    }

    /// Returns the number of snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Returns `true` if no snapshots have been inserted.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Iterates over snapshots in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.snapshots.iter()
    }

    /// Compares two trajectories by zipping their iteration sequences and
    /// comparing snapshots pairwise.
    ///
    /// Timestep indices are not compared, only the snapshot contents, so two
    /// trajectories whose steps were renumbered still compare equal when the
    /// per-step data matches.
    pub fn approx_eq(&self, other: &Trajectory) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|(a, b)| a.approx_eq(b))
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a Snapshot;
    type IntoIter = std::slice::Iter<'a, Snapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.snapshots.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::column::Column;
    use crate::core::models::snapshot::BoxBounds;
    use nalgebra::Point3;

    fn snapshot(index: i64, atoms: usize) -> Snapshot {
        Snapshot {
            index,
            ids: (1..=atoms as i64).collect(),
            types: vec![1; atoms],
            positions: (0..atoms)
                .map(|i| Point3::new(i as f64, 0.0, 0.0))
                .collect(),
            bounds: BoxBounds::new([[0.0, 10.0]; 3]),
            periodic: [true, true, true],
            extras: vec![("c_csd".to_string(), Column::Float(vec![0.0; atoms]))],
        }
    }

    #[test]
    fn insert_and_get_by_index() {
        let mut traj = Trajectory::new();
        traj.insert(snapshot(0, 3));
        traj.insert(snapshot(100, 4));

        assert_eq!(traj.len(), 2);
        assert!(traj.contains(100));
        assert!(!traj.contains(50));
        assert_eq!(traj.get(100).unwrap().len(), 4);
        assert!(traj.get(7).is_none());
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let mut traj = Trajectory::new();
        traj.insert(snapshot(200, 1));
        traj.insert(snapshot(0, 2));
        traj.insert(snapshot(100, 3));

        let order: Vec<i64> = traj.iter().map(|s| s.index).collect();
        assert_eq!(order, vec![200, 0, 100]);
    }

    #[test]
    fn duplicate_index_replaces_in_place() {
        let mut traj = Trajectory::new();
        traj.insert(snapshot(0, 3));
        traj.insert(snapshot(100, 4));
        traj.insert(snapshot(0, 5));

        assert_eq!(traj.len(), 2);
        assert_eq!(traj.get(0).unwrap().len(), 5);
        let order: Vec<i64> = traj.iter().map(|s| s.index).collect();
        assert_eq!(order, vec![0, 100]);
    }

    #[test]
    fn approx_eq_ignores_renumbered_steps() {
        let mut a = Trajectory::new();
        a.insert(snapshot(0, 3));
        a.insert(snapshot(100, 4));

        let mut b = Trajectory::new();
        b.insert(snapshot(10, 3));
        b.insert(snapshot(20, 4));

        assert!(a.approx_eq(&b));
    }

    #[test]
    fn approx_eq_rejects_length_and_content_mismatch() {
        let mut a = Trajectory::new();
        a.insert(snapshot(0, 3));

        let mut b = Trajectory::new();
        b.insert(snapshot(0, 3));
        b.insert(snapshot(1, 3));
        assert!(!a.approx_eq(&b));

        let mut c = Trajectory::new();
        c.insert(snapshot(0, 4));
        assert!(!a.approx_eq(&c));
    }
}
