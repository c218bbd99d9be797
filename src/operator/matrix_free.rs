//! Matrix-free action of the reduced global stiffness.

use crate::grid::{Grid, GridTopology};
use crate::numeric::{is_psd, is_symmetric};
use crate::operator::OperatorTraits;
use crate::sparse::TripletMatrix;
use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::csr::CsrMatrix;
use rayon::prelude::*;

/// Matrix-free operator for the reduced global stiffness K.
///
/// Represents y = Kx on the reduced unconstrained periodic dofs without
/// assembling sparse entries. Construction precomputes, for every element,
/// the reduced index of each element dof (`None` marks a fixed dof pinned
/// to zero) and the operator's algebraic flags; [`apply`](Self::apply)
/// allocates nothing beyond its per-thread accumulators.
pub struct MatrixFreeOperator {
    element_k: DMatrix<f64>,
    densities: Vec<f64>,
    element_dofs: Vec<Vec<Option<usize>>>,
    num_reduced_dofs: usize,
    symmetric: bool,
    psd: bool,
}

impl MatrixFreeOperator {
    /// Build the operator from a grid and the unit-density reference
    /// element stiffness.
    pub fn new<E, T>(grid: &Grid<E>, element_k: DMatrix<f64>) -> Self
    where
        E: GridTopology,
        T: OperatorTraits,
    {
        let num_periodic_nodes = grid.num_periodic_nodes();
        let num_reduced_dofs = T::NUM_NODE_DOFS * num_periodic_nodes - T::NUM_FIXED_DOFS;

        let element_dofs = grid
            .periodic_elements()
            .into_iter()
            .map(|element| {
                T::dofs(&element, num_periodic_nodes)
                    .into_iter()
                    .map(|dof| {
                        if T::is_fixed_dof(dof, num_periodic_nodes) {
                            None
                        } else {
                            Some(T::reduced_dof(dof, num_periodic_nodes))
                        }
                    })
                    .collect()
            })
            .collect();

        let symmetric = is_symmetric(&element_k);
        let psd = symmetric && is_psd(&element_k);

        Self {
            element_k,
            densities: grid.densities().to_vec(),
            element_dofs,
            num_reduced_dofs,
            symmetric,
            psd,
        }
    }

    /// Reduced dimension of the operator.
    pub fn dim(&self) -> usize {
        self.num_reduced_dofs
    }

    /// Reference element stiffness at unit density.
    pub fn element_k_reference(&self) -> &DMatrix<f64> {
        &self.element_k
    }

    /// Per-element reduced dof indices; `None` marks a fixed dof.
    pub fn element_dofs(&self) -> &[Vec<Option<usize>>] {
        &self.element_dofs
    }

    /// Per-element material densities.
    pub fn densities(&self) -> &[f64] {
        &self.densities
    }

    /// `true` if the operator is symmetric (inherited from the reference
    /// element stiffness).
    pub fn is_symmetric(&self) -> bool {
        self.symmetric
    }

    /// `true` if the operator is positive semi-definite.
    pub fn is_psd(&self) -> bool {
        self.psd
    }

    /// Matrix-vector product y = Kx.
    ///
    /// Elements are processed in parallel; each thread accumulates into its
    /// own partial vector and the partials are summed, so the result is
    /// independent of element order up to floating-point associativity.
    pub fn apply(&self, x: &DVector<f64>) -> DVector<f64> {
        let n = self.num_reduced_dofs;

        self.element_dofs
            .par_iter()
            .zip(self.densities.par_iter())
            .fold(
                || DVector::zeros(n),
                |mut partial, (dofs, &density)| {
                    // Gather: fixed dofs contribute zero
                    let mut local = DVector::zeros(dofs.len());
                    for (j, dof) in dofs.iter().enumerate() {
                        if let Some(g) = dof {
                            local[j] = x[*g];
                        }
                    }

                    // Apply the density-scaled element stiffness
                    let applied = &self.element_k * local * density;

                    // Scatter
                    for (j, dof) in dofs.iter().enumerate() {
                        if let Some(g) = dof {
                            partial[*g] += applied[j];
                        }
                    }

                    partial
                },
            )
            .reduce(|| DVector::zeros(n), |a, b| a + b)
    }

    /// Materialize the reduced operator as a CSR matrix.
    ///
    /// Intended for small problems and reference checks; the solve path
    /// never calls this.
    pub fn assemble_csr(&self) -> CsrMatrix<f64> {
        let n = self.num_reduced_dofs;
        let num_element_dofs = self.element_k.nrows();

        let mut triplets =
            TripletMatrix::with_capacity(n, n, self.element_dofs.len() * num_element_dofs);

        for (dofs, &density) in self.element_dofs.iter().zip(&self.densities) {
            for (j, row) in dofs.iter().enumerate() {
                let Some(row) = row else { continue };

                for (k, col) in dofs.iter().enumerate() {
                    if let Some(col) = col {
                        triplets.add(*row, *col, density * self.element_k[(j, k)]);
                    }
                }
            }
        }

        triplets.to_csr()
    }
}
