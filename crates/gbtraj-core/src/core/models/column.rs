/// Relative tolerance for approximate floating-point comparisons.
pub(crate) const RTOL: f64 = 1e-5;
/// Absolute tolerance for approximate floating-point comparisons.
pub(crate) const ATOL: f64 = 1e-8;

/// Compares two floats with combined absolute and relative tolerance.
pub(crate) fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= ATOL + RTOL * b.abs()
}

/// Identifies the element type of an extra per-atom column.
///
/// The kind is decided when the first value of a column is parsed and stays
/// fixed for the column's lifetime. The dump writer consults it to pick the
/// numeric output format, so formatting never inspects runtime values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    /// Whole-number values, written as plain decimal integers.
    Integer,
    /// Real values, written in scientific notation.
    Float,
}

/// Columnar storage for one named extra per-atom attribute.
///
/// Every column in a snapshot is index-aligned with the fixed per-atom
/// fields: element `i` belongs to the atom on the `i`-th data line of the
/// ATOMS section.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// An integer-valued column.
    Int(Vec<i64>),
    /// A float-valued column.
    Float(Vec<f64>),
}

impl Column {
    /// Returns the element kind tag of this column.
    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::Int(_) => ColumnKind::Integer,
            Column::Float(_) => ColumnKind::Float,
        }
    }

    /// Returns the number of values stored in this column.
    pub fn len(&self) -> usize {
        match self {
            Column::Int(v) => v.len(),
            Column::Float(v) => v.len(),
        }
    }

    /// Returns `true` if the column holds no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the value at `index` widened to `f64`, or `None` when out of
    /// bounds.
    ///
    /// This is the access path used by selection strategies, which treat
    /// every column as a scalar field regardless of its stored kind.
    pub fn value_as_f64(&self, index: usize) -> Option<f64> {
        match self {
            Column::Int(v) => v.get(index).map(|&x| x as f64),
            Column::Float(v) => v.get(index).copied(),
        }
    }

    /// Collects the whole column as an `f64` scalar field.
    pub fn as_f64_vec(&self) -> Vec<f64> {
        match self {
            Column::Int(v) => v.iter().map(|&x| x as f64).collect(),
            Column::Float(v) => v.clone(),
        }
    }

    /// Builds a new column of the same kind holding only the rows at
    /// `indices`, in the given order.
    ///
    /// Out-of-bounds indices are ignored.
    pub fn filtered(&self, indices: &[usize]) -> Column {
        match self {
            Column::Int(v) => {
                Column::Int(indices.iter().filter_map(|&i| v.get(i).copied()).collect())
            }
            Column::Float(v) => {
                Column::Float(indices.iter().filter_map(|&i| v.get(i).copied()).collect())
            }
        }
    }

    /// Compares two columns: exact equality for integer columns, combined
    /// absolute/relative tolerance for float columns. Columns of different
    /// kinds are never equal.
    pub fn approx_eq(&self, other: &Column) -> bool {
        match (self, other) {
            (Column::Int(a), Column::Int(b)) => a == b,
            (Column::Float(a), Column::Float(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(&x, &y)| close(x, y))
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(Column::Int(vec![1, 2]).kind(), ColumnKind::Integer);
        assert_eq!(Column::Float(vec![1.0]).kind(), ColumnKind::Float);
    }

    #[test]
    fn len_and_is_empty_work_for_both_kinds() {
        assert_eq!(Column::Int(vec![1, 2, 3]).len(), 3);
        assert_eq!(Column::Float(vec![]).len(), 0);
        assert!(Column::Float(vec![]).is_empty());
        assert!(!Column::Int(vec![7]).is_empty());
    }

    #[test]
    fn value_as_f64_widens_integers() {
        let col = Column::Int(vec![5, -3]);
        assert_eq!(col.value_as_f64(0), Some(5.0));
        assert_eq!(col.value_as_f64(1), Some(-3.0));
        assert_eq!(col.value_as_f64(2), None);
    }

    #[test]
    fn filtered_keeps_requested_rows_in_order() {
        let col = Column::Float(vec![0.5, 1.5, 2.5, 3.5]);
        assert_eq!(col.filtered(&[3, 1]), Column::Float(vec![3.5, 1.5]));

        let col = Column::Int(vec![10, 20, 30]);
        assert_eq!(col.filtered(&[0, 2]), Column::Int(vec![10, 30]));
    }

    #[test]
    fn filtered_ignores_out_of_bounds_indices() {
        let col = Column::Int(vec![1, 2]);
        assert_eq!(col.filtered(&[0, 9]), Column::Int(vec![1]));
    }

    #[test]
    fn approx_eq_tolerates_rounding_in_float_columns() {
        let a = Column::Float(vec![30.976, 1.54915]);
        let b = Column::Float(vec![30.97600001, 1.5491500001]);
        assert!(a.approx_eq(&b));
    }

    #[test]
    fn approx_eq_rejects_different_kinds_and_values() {
        assert!(!Column::Int(vec![1]).approx_eq(&Column::Float(vec![1.0])));
        assert!(!Column::Int(vec![1]).approx_eq(&Column::Int(vec![2])));
        assert!(!Column::Float(vec![1.0]).approx_eq(&Column::Float(vec![1.1])));
    }
}
