//! Physics policy for linear elastic homogenization.

use crate::error::Result;
use crate::grid::{Grid, GridTopology};
use crate::kernel::ElasticKernel;
use crate::material::LinearElasticMaterial;
use crate::operator::ElasticOperatorTraits;
use crate::solver::cell::{PeriodicCellSolver, Physics};
use crate::solver::options::FieldSave;
use crate::solver::reshape_nodal_field;
use nalgebra::DMatrix;
use std::marker::PhantomData;

/// Periodic unit-cell solver for linear elastic problems.
pub type LinearElasticSolver<'a, E> = PeriodicCellSolver<'a, ElasticPhysics<E>>;

/// Linear elastic physics policy.
#[derive(Debug, Default)]
pub struct ElasticPhysics<E>(PhantomData<E>);

/// Results from linear elastic homogenization.
///
/// Displacement fields are ordered by the prescribed macroscopic strain
/// loading directions (ε̄₁₁, ε̄₂₂, ε̄₁₂ in 2D; ε̄₁₁, ε̄₂₂, ε̄₃₃, ε̄₁₂, ε̄₁₃,
/// ε̄₂₃ in 3D), one `num_nodes × D` matrix per loading. Field vectors are
/// empty unless the corresponding [`FieldSave`] bit was requested.
#[derive(Debug, Clone)]
pub struct ElasticResults {
    /// Homogenized stiffness tensor C̄.
    pub c_bar: DMatrix<f64>,

    /// Total nodal displacement fields u = ū + ũ.
    pub u: Vec<DMatrix<f64>>,

    /// Macroscopic nodal displacement fields ū.
    pub u_macro: Vec<DMatrix<f64>>,

    /// Microscopic nodal displacement fields ũ.
    pub u_micro: Vec<DMatrix<f64>>,
}

/// Macroscopic nodal displacements Ū = ε̄·x for unit macroscopic strains.
pub(crate) fn macroscopic_displacements<E: GridTopology>(grid: &Grid<E>) -> DMatrix<f64> {
    let num_nodes = grid.num_nodes();
    let voigt = if E::DIM == 2 { 3 } else { 6 };

    let mut field = DMatrix::zeros(E::DIM * num_nodes, voigt);

    for (i, node) in grid.nodes().into_iter().enumerate() {
        if E::DIM == 2 {
            let (x, y) = (node[0], node[1]);
            let (u, v) = (2 * i, 2 * i + 1);

            field[(u, 0)] = x;
            field[(v, 1)] = y;
            field[(u, 2)] = 0.5 * y;
            field[(v, 2)] = 0.5 * x;
        } else {
            let (x, y, z) = (node[0], node[1], node[2]);
            let (u, v, w) = (3 * i, 3 * i + 1, 3 * i + 2);

            field[(u, 0)] = x;
            field[(v, 1)] = y;
            field[(w, 2)] = z;
            field[(u, 3)] = 0.5 * y;
            field[(v, 3)] = 0.5 * x;
            field[(u, 4)] = 0.5 * z;
            field[(w, 4)] = 0.5 * x;
            field[(v, 5)] = 0.5 * z;
            field[(w, 5)] = 0.5 * y;
        }
    }

    field
}

/// Reshape the selected loading columns into nodal displacement fields.
pub(crate) fn displacement_fields(
    field: &DMatrix<f64>,
    num_nodes: usize,
    dim: usize,
) -> Vec<DMatrix<f64>> {
    (0..field.ncols())
        .map(|q| reshape_nodal_field(&field.column(q).clone_owned(), num_nodes, dim))
        .collect()
}

impl<E: GridTopology> Physics for ElasticPhysics<E> {
    type Element = E;
    type Material = LinearElasticMaterial;
    type OperatorTraits = ElasticOperatorTraits<E>;
    type Results = ElasticResults;

    fn num_macro_fields() -> usize {
        if E::DIM == 2 {
            3
        } else {
            6
        }
    }

    fn element_lhs(&self, material: &Self::Material, nodes: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        ElasticKernel::<E>::lhs(material, nodes)
    }

    fn element_rhs(&self, material: &Self::Material, nodes: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        ElasticKernel::<E>::rhs(material, nodes)
    }

    fn macroscopic_field(&self, grid: &Grid<E>) -> DMatrix<f64> {
        macroscopic_displacements(grid)
    }

    fn make_results(
        &self,
        homogenized: DMatrix<f64>,
        total: &DMatrix<f64>,
        macroscopic: &DMatrix<f64>,
        microscopic: &DMatrix<f64>,
        fields: FieldSave,
        num_nodes: usize,
    ) -> ElasticResults {
        let mut results = ElasticResults {
            c_bar: homogenized,
            u: Vec::new(),
            u_macro: Vec::new(),
            u_micro: Vec::new(),
        };

        if fields.contains(FieldSave::TOTAL) {
            results.u = displacement_fields(total, num_nodes, E::DIM);
        }
        if fields.contains(FieldSave::MACRO) {
            results.u_macro = displacement_fields(macroscopic, num_nodes, E::DIM);
        }
        if fields.contains(FieldSave::MICRO) {
            results.u_micro = displacement_fields(microscopic, num_nodes, E::DIM);
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Quad4;
    use crate::grid::Quad4Grid;
    use approx::assert_relative_eq;

    #[test]
    fn test_macroscopic_displacements_2d() {
        let grid = Quad4Grid::new(&[2, 2], &[1.0, 1.0]).unwrap();
        let field = macroscopic_displacements::<Quad4>(&grid);

        assert_eq!(field.nrows(), 2 * grid.num_nodes());
        assert_eq!(field.ncols(), 3);

        // Node 4 sits at (0.5, 0.5)
        let node = grid.node(4).unwrap();
        assert_relative_eq!(node[0], 0.5, epsilon = 1e-15);
        assert_relative_eq!(node[1], 0.5, epsilon = 1e-15);

        assert_relative_eq!(field[(8, 0)], 0.5, epsilon = 1e-15);
        assert_relative_eq!(field[(9, 0)], 0.0, epsilon = 1e-15);
        assert_relative_eq!(field[(9, 1)], 0.5, epsilon = 1e-15);
        assert_relative_eq!(field[(8, 2)], 0.25, epsilon = 1e-15);
        assert_relative_eq!(field[(9, 2)], 0.25, epsilon = 1e-15);
    }
}
