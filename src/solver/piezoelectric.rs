//! Physics policy for linear piezoelectric homogenization.
//!
//! The coupled solve carries VoigtSize + D macroscopic loadings: unit
//! macroscopic strains followed by unit macroscopic electric fields. The
//! homogenized block operator is split back into the user-facing tensors
//! c̄, ε̄, and d̄.

use crate::error::Result;
use crate::grid::{Grid, GridTopology};
use crate::kernel::PiezoelectricKernel;
use crate::material::LinearPiezoelectricMaterial;
use crate::operator::PiezoelectricOperatorTraits;
use crate::solver::cell::{PeriodicCellSolver, Physics};
use crate::solver::elastic::{displacement_fields, macroscopic_displacements};
use crate::solver::options::FieldSave;
use crate::solver::transport::{macroscopic_potentials, potential_fields};
use nalgebra::{DMatrix, DVector};
use std::marker::PhantomData;

/// Periodic unit-cell solver for linear piezoelectric problems.
pub type LinearPiezoelectricSolver<'a, E> = PeriodicCellSolver<'a, PiezoelectricPhysics<E>>;

/// Linear piezoelectric physics policy.
#[derive(Debug, Default)]
pub struct PiezoelectricPhysics<E>(PhantomData<E>);

/// Results from linear piezoelectric homogenization.
///
/// Displacement and potential fields are ordered by the macroscopic loading
/// directions: Voigt strains first, then electric field directions. Field
/// vectors are empty unless the corresponding [`FieldSave`] bit was
/// requested.
#[derive(Debug, Clone)]
pub struct PiezoelectricResults {
    /// Homogenized stiffness tensor c̄.
    pub c_bar: DMatrix<f64>,

    /// Homogenized permittivity tensor ε̄.
    pub epsilon_bar: DMatrix<f64>,

    /// Homogenized piezoelectric coupling tensor d̄.
    pub d_bar: DMatrix<f64>,

    /// Total nodal displacement fields u = ū + ũ.
    pub u: Vec<DMatrix<f64>>,

    /// Macroscopic nodal displacement fields ū.
    pub u_macro: Vec<DMatrix<f64>>,

    /// Microscopic nodal displacement fields ũ.
    pub u_micro: Vec<DMatrix<f64>>,

    /// Total nodal electric potential fields φ = φ̄ + φ̃.
    pub phi: Vec<DVector<f64>>,

    /// Macroscopic nodal electric potential fields φ̄.
    pub phi_macro: Vec<DVector<f64>>,

    /// Microscopic nodal electric potential fields φ̃.
    pub phi_micro: Vec<DVector<f64>>,
}

impl<E: GridTopology> PiezoelectricPhysics<E> {
    const VOIGT_SIZE: usize = if E::DIM == 2 { 3 } else { 6 };

    /// Split an electromechanical field matrix into its displacement and
    /// potential sub-fields per loading column.
    fn split_fields(
        field: &DMatrix<f64>,
        num_nodes: usize,
    ) -> (Vec<DMatrix<f64>>, Vec<DVector<f64>>) {
        let num_mechanical_dofs = E::DIM * num_nodes;

        let mechanical = field.rows(0, num_mechanical_dofs).clone_owned();
        let electrical = field.rows(num_mechanical_dofs, num_nodes).clone_owned();

        (
            displacement_fields(&mechanical, num_nodes, E::DIM),
            potential_fields(&electrical),
        )
    }
}

impl<E: GridTopology> Physics for PiezoelectricPhysics<E> {
    type Element = E;
    type Material = LinearPiezoelectricMaterial;
    type OperatorTraits = PiezoelectricOperatorTraits<E>;
    type Results = PiezoelectricResults;

    fn num_macro_fields() -> usize {
        Self::VOIGT_SIZE + E::DIM
    }

    fn element_lhs(&self, material: &Self::Material, nodes: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        PiezoelectricKernel::<E>::lhs(material, nodes)
    }

    fn element_rhs(&self, material: &Self::Material, nodes: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        PiezoelectricKernel::<E>::rhs(material, nodes)
    }

    fn macroscopic_field(&self, grid: &Grid<E>) -> DMatrix<f64> {
        let num_nodes = grid.num_nodes();
        let num_mechanical_dofs = E::DIM * num_nodes;
        let voigt = Self::VOIGT_SIZE;

        let mut field =
            DMatrix::zeros(num_mechanical_dofs + num_nodes, Self::num_macro_fields());

        // Block diagonal: mechanical loadings act on the displacement dofs,
        // electrical loadings on the potential dofs
        let mechanical = macroscopic_displacements(grid);
        field
            .view_mut((0, 0), (num_mechanical_dofs, voigt))
            .copy_from(&mechanical);

        let electrical = macroscopic_potentials(
            grid,
            PiezoelectricKernel::<E>::ELECTRICAL_CONVENTION,
        );
        field
            .view_mut((num_mechanical_dofs, voigt), (num_nodes, E::DIM))
            .copy_from(&electrical);

        field
    }

    fn make_results(
        &self,
        homogenized: DMatrix<f64>,
        total: &DMatrix<f64>,
        macroscopic: &DMatrix<f64>,
        microscopic: &DMatrix<f64>,
        fields: FieldSave,
        num_nodes: usize,
    ) -> PiezoelectricResults {
        let voigt = Self::VOIGT_SIZE;
        let dim = E::DIM;

        // Split the homogenized block operator [[c̄, −d̄ᵀ], [−d̄, −ε̄]]
        let c_bar = homogenized.view((0, 0), (voigt, voigt)).clone_owned();
        let epsilon_bar = -homogenized.view((voigt, voigt), (dim, dim)).clone_owned();
        let d_bar = -homogenized.view((voigt, 0), (dim, voigt)).clone_owned();

        let mut results = PiezoelectricResults {
            c_bar,
            epsilon_bar,
            d_bar,
            u: Vec::new(),
            u_macro: Vec::new(),
            u_micro: Vec::new(),
            phi: Vec::new(),
            phi_macro: Vec::new(),
            phi_micro: Vec::new(),
        };

        if fields.contains(FieldSave::TOTAL) {
            let (u, phi) = Self::split_fields(total, num_nodes);
            results.u = u;
            results.phi = phi;
        }
        if fields.contains(FieldSave::MACRO) {
            let (u, phi) = Self::split_fields(macroscopic, num_nodes);
            results.u_macro = u;
            results.phi_macro = phi;
        }
        if fields.contains(FieldSave::MICRO) {
            let (u, phi) = Self::split_fields(microscopic, num_nodes);
            results.u_micro = u;
            results.phi_micro = phi;
        }

        results
    }
}
