//! Dense weight matrices for both problem variants.
//!
//! An entry of `None` marks a forbidden edge: the model builder pins its
//! variable to zero, so it can never be selected. The matrix is built and
//! validated once, before any model exists, and is read-only afterwards.

use crate::Error;

/// A square matrix of directed edge weights with a forbidden-edge sentinel.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightMatrix {
    n: usize,
    entries: Vec<Option<f64>>,
}

impl WeightMatrix {
    /// Creates an `n` by `n` matrix with every edge forbidden.
    pub fn new(n: usize) -> Self {
        WeightMatrix {
            n,
            entries: vec![None; n * n],
        }
    }

    /// Builds a matrix from a list of weighted edges; every pair not
    /// listed stays forbidden. Node indices are validated against `n`.
    pub fn from_edges(n: usize, edges: &[(usize, usize, f64)]) -> Result<Self, Error> {
        let mut matrix = WeightMatrix::new(n);
        for &(i, j, w) in edges {
            if i >= n {
                return Err(Error::NodeOutOfRange { node: i, n });
            }
            if j >= n {
                return Err(Error::NodeOutOfRange { node: j, n });
            }
            matrix.entries[i * n + j] = Some(w);
        }
        Ok(matrix)
    }

    /// Builds a fully dense matrix (no forbidden edges) from rows, as used
    /// for TSP cost matrices. Fails if the rows do not form a square.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, Error> {
        let n = rows.len();
        if n == 0 {
            return Err(Error::EmptyInstance);
        }
        let mut entries = Vec::with_capacity(n * n);
        for row in rows {
            if row.len() != n {
                return Err(Error::DimensionMismatch {
                    expected: n,
                    got: row.len(),
                });
            }
            entries.extend(row.iter().map(|&w| Some(w)));
        }
        Ok(WeightMatrix { n, entries })
    }

    /// Number of nodes.
    pub fn dim(&self) -> usize {
        self.n
    }

    /// Weight of edge `i -> j`, or `None` if the edge is forbidden.
    pub fn weight(&self, i: usize, j: usize) -> Option<f64> {
        self.entries[i * self.n + j]
    }

    /// Returns a copy with one extra node appended at index `n`, connected
    /// to every other node by zero-weight edges in both directions. This
    /// turns a shortest-Hamiltonian-path instance into a TSP instance: the
    /// dummy node's two tour edges cost nothing, and cutting the tour at
    /// the dummy leaves the optimal path over the original nodes.
    pub fn with_dummy_node(&self) -> WeightMatrix {
        let n = self.n;
        let mut augmented = WeightMatrix::new(n + 1);
        for i in 0..n {
            for j in 0..n {
                augmented.entries[i * (n + 1) + j] = self.entries[i * n + j];
            }
            augmented.entries[i * (n + 1) + n] = Some(0.0);
            augmented.entries[n * (n + 1) + i] = Some(0.0);
        }
        augmented
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn from_edges_stores_weights_and_keeps_rest_forbidden() {
        let m = WeightMatrix::from_edges(3, &[(0, 1, 2.5), (2, 0, -1.0)]).unwrap();
        assert_eq!(m.dim(), 3);
        assert_eq!(m.weight(0, 1), Some(2.5));
        assert_eq!(m.weight(2, 0), Some(-1.0));
        assert_eq!(m.weight(1, 0), None);
        assert_eq!(m.weight(1, 2), None);
    }

    #[test]
    fn from_edges_rejects_out_of_range_nodes() {
        let err = WeightMatrix::from_edges(3, &[(0, 3, 1.0)]).unwrap_err();
        assert!(matches!(err, Error::NodeOutOfRange { node: 3, n: 3 }));
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        let err = WeightMatrix::from_rows(&[vec![0.0, 1.0], vec![1.0]]).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { expected: 2, got: 1 }));
    }

    #[test]
    fn from_rows_rejects_empty_input() {
        assert!(matches!(
            WeightMatrix::from_rows(&[]),
            Err(Error::EmptyInstance)
        ));
    }

    #[test]
    fn dummy_node_is_free_in_both_directions() {
        let m = WeightMatrix::from_rows(&[vec![0.0, 4.0], vec![4.0, 0.0]]).unwrap();
        let aug = m.with_dummy_node();
        assert_eq!(aug.dim(), 3);
        assert_eq!(aug.weight(0, 1), Some(4.0));
        for i in 0..2 {
            assert_eq!(aug.weight(i, 2), Some(0.0));
            assert_eq!(aug.weight(2, i), Some(0.0));
        }
    }
}
