//! Sparse matrix assembly helpers.
//!
//! The homogenization engine is matrix-free; this module exists for the
//! cases that want the reduced operator materialized — small-problem
//! debugging and the reference checks in the operator tests.

use nalgebra_sparse::coo::CooMatrix;
use nalgebra_sparse::csr::CsrMatrix;

/// Builder for assembling a sparse matrix from (row, col, value) triplets.
///
/// Duplicate entries are summed during conversion to CSR.
pub struct TripletMatrix {
    n_rows: usize,
    n_cols: usize,
    rows: Vec<usize>,
    cols: Vec<usize>,
    values: Vec<f64>,
}

impl TripletMatrix {
    /// Create a new triplet accumulator.
    pub fn new(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            rows: Vec::new(),
            cols: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Create with an estimated capacity.
    pub fn with_capacity(n_rows: usize, n_cols: usize, nnz_estimate: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            rows: Vec::with_capacity(nnz_estimate),
            cols: Vec::with_capacity(nnz_estimate),
            values: Vec::with_capacity(nnz_estimate),
        }
    }

    /// Add a value at (row, col).
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        debug_assert!(row < self.n_rows, "row index out of bounds");
        debug_assert!(col < self.n_cols, "column index out of bounds");

        if value != 0.0 {
            self.rows.push(row);
            self.cols.push(col);
            self.values.push(value);
        }
    }

    /// Number of stored triplets.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Convert to CSR format, summing duplicate entries.
    pub fn to_csr(self) -> CsrMatrix<f64> {
        let coo = CooMatrix::try_from_triplets(
            self.n_rows,
            self.n_cols,
            self.rows,
            self.cols,
            self.values,
        )
        .expect("triplet indices validated on insertion");

        CsrMatrix::from(&coo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_duplicates_are_summed() {
        let mut triplet = TripletMatrix::new(2, 2);
        triplet.add(0, 0, 1.0);
        triplet.add(0, 0, 2.0);
        triplet.add(1, 0, -1.0);
        triplet.add(0, 1, 0.0); // dropped

        assert_eq!(triplet.nnz(), 3);

        let csr = triplet.to_csr();
        assert_relative_eq!(csr.get_entry(0, 0).unwrap().into_value(), 3.0);
        assert_relative_eq!(csr.get_entry(1, 0).unwrap().into_value(), -1.0);
        assert_eq!(csr.nnz(), 2);
    }

    #[test]
    fn test_matrix_vector_product() {
        let mut triplet = TripletMatrix::new(2, 2);
        triplet.add(0, 0, 2.0);
        triplet.add(0, 1, 1.0);
        triplet.add(1, 1, 3.0);

        let csr = triplet.to_csr();
        let x = nalgebra::DVector::from_vec(vec![1.0, 2.0]);
        let y = &csr * &x;

        assert_relative_eq!(y[0], 4.0);
        assert_relative_eq!(y[1], 6.0);
    }
}
