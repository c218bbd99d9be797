//! Physics policy for linear scalar transport homogenization.
//!
//! One policy covers every scalar transport problem; the
//! [`GradientConvention`] names the physical field family. Electric-like
//! solves (dielectric permittivity, electrical conduction, magnetic
//! permeability) use the negative convention; flow-like solves (thermal
//! conduction, mass diffusion, porous flow) use the positive convention.
//! The homogenized tensor is convention-independent, the recovered nodal
//! potentials are not.

use crate::error::Result;
use crate::grid::{Grid, GridTopology};
use crate::kernel::{GradientConvention, TransportKernel};
use crate::material::LinearTransportMaterial;
use crate::operator::TransportOperatorTraits;
use crate::solver::cell::{PeriodicCellSolver, Physics};
use crate::solver::options::FieldSave;
use nalgebra::{DMatrix, DVector};
use std::marker::PhantomData;

/// Periodic unit-cell solver for linear scalar transport problems.
pub type LinearTransportSolver<'a, E> = PeriodicCellSolver<'a, TransportPhysics<E>>;

/// Linear scalar transport physics policy.
#[derive(Debug)]
pub struct TransportPhysics<E> {
    convention: GradientConvention,
    _element: PhantomData<E>,
}

impl<E> TransportPhysics<E> {
    /// Policy with an explicit gradient sign convention.
    pub fn new(convention: GradientConvention) -> Self {
        Self {
            convention,
            _element: PhantomData,
        }
    }

    /// Electric-like policy (G = −∇φ).
    pub fn negative() -> Self {
        Self::new(GradientConvention::Negative)
    }

    /// Flow-like policy (G = +∇φ).
    pub fn positive() -> Self {
        Self::new(GradientConvention::Positive)
    }

    /// The policy's gradient sign convention.
    pub fn convention(&self) -> GradientConvention {
        self.convention
    }
}

/// Results from linear scalar transport homogenization.
///
/// Potential fields are ordered by the prescribed macroscopic gradient
/// directions (one per spatial axis), one length-`num_nodes` vector per
/// loading. Field vectors are empty unless the corresponding [`FieldSave`]
/// bit was requested.
#[derive(Debug, Clone)]
pub struct TransportResults {
    /// Homogenized transport tensor K̄.
    pub k_bar: DMatrix<f64>,

    /// Total nodal potential fields φ = φ̄ + φ̃.
    pub phi: Vec<DVector<f64>>,

    /// Macroscopic nodal potential fields φ̄.
    pub phi_macro: Vec<DVector<f64>>,

    /// Microscopic nodal potential fields φ̃.
    pub phi_micro: Vec<DVector<f64>>,
}

/// Macroscopic nodal potentials φ̄ = s·(∇φ̄)·x for unit gradient loadings.
pub(crate) fn macroscopic_potentials<E: GridTopology>(
    grid: &Grid<E>,
    convention: GradientConvention,
) -> DMatrix<f64> {
    let num_nodes = grid.num_nodes();
    let sign = convention.sign();

    let mut field = DMatrix::zeros(num_nodes, E::DIM);

    for (i, node) in grid.nodes().into_iter().enumerate() {
        for d in 0..E::DIM {
            field[(i, d)] = sign * node[d];
        }
    }

    field
}

/// Extract the selected loading columns as nodal potential vectors.
pub(crate) fn potential_fields(field: &DMatrix<f64>) -> Vec<DVector<f64>> {
    (0..field.ncols())
        .map(|q| field.column(q).clone_owned())
        .collect()
}

impl<E: GridTopology> Physics for TransportPhysics<E> {
    type Element = E;
    type Material = LinearTransportMaterial;
    type OperatorTraits = TransportOperatorTraits;
    type Results = TransportResults;

    fn num_macro_fields() -> usize {
        E::DIM
    }

    fn element_lhs(&self, material: &Self::Material, nodes: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        TransportKernel::<E>::lhs(material, nodes, self.convention)
    }

    fn element_rhs(&self, material: &Self::Material, nodes: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        TransportKernel::<E>::rhs(material, nodes, self.convention)
    }

    fn macroscopic_field(&self, grid: &Grid<E>) -> DMatrix<f64> {
        macroscopic_potentials(grid, self.convention)
    }

    fn make_results(
        &self,
        homogenized: DMatrix<f64>,
        total: &DMatrix<f64>,
        macroscopic: &DMatrix<f64>,
        microscopic: &DMatrix<f64>,
        fields: FieldSave,
        _num_nodes: usize,
    ) -> TransportResults {
        let mut results = TransportResults {
            k_bar: homogenized,
            phi: Vec::new(),
            phi_macro: Vec::new(),
            phi_micro: Vec::new(),
        };

        if fields.contains(FieldSave::TOTAL) {
            results.phi = potential_fields(total);
        }
        if fields.contains(FieldSave::MACRO) {
            results.phi_macro = potential_fields(macroscopic);
        }
        if fields.contains(FieldSave::MICRO) {
            results.phi_micro = potential_fields(microscopic);
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
    fn test_macroscopic_potentials_carry_sign() {
        let grid = Quad4Grid::new(&[2, 2], &[1.0, 1.0]).unwrap();

        let negative = macroscopic_potentials::<Quad4>(&grid, GradientConvention::Negative);
        let positive = macroscopic_potentials::<Quad4>(&grid, GradientConvention::Positive);

        assert_eq!(negative.nrows(), grid.num_nodes());
        assert_eq!(negative.ncols(), 2);

        for i in 0..grid.num_nodes() {
            let node = grid.node(i).unwrap();
            for d in 0..2 {
                assert_relative_eq!(negative[(i, d)], -node[d], epsilon = 1e-15);
                assert_relative_eq!(positive[(i, d)], node[d], epsilon = 1e-15);
            }
        }
    }
}
