//! Dimension- and physics-agnostic periodic unit-cell solver.

use crate::error::Result;
use crate::grid::{Grid, GridTopology};
use crate::operator::{JacobiPreconditioner, MatrixFreeOperator, OperatorTraits};
use crate::numeric::symmetrize;
use crate::solver::krylov::{bicgstab, conjugate_gradient};
use crate::solver::options::{FieldSave, SolverOptions};
use nalgebra::DMatrix;

/// Physics policy for the periodic-cell solver.
///
/// A policy selects the kernel, the operator dof map, and the result type
/// for one physics, builds the macroscopic loading fields, and splits the
/// homogenized operator back into user-facing tensors.
pub trait Physics {
    /// Element kind the policy is instantiated for.
    type Element: GridTopology;

    /// Constitutive model consumed by the kernels.
    type Material;

    /// Dof bookkeeping for the matrix-free operator.
    type OperatorTraits: OperatorTraits;

    /// User-facing homogenization results.
    type Results;

    /// Number of independent macroscopic loading directions.
    fn num_macro_fields() -> usize;

    /// Unit-density element stiffness matrix.
    fn element_lhs(&self, material: &Self::Material, nodes: &DMatrix<f64>) -> Result<DMatrix<f64>>;

    /// Unit-density element macroscopic-source matrix.
    fn element_rhs(&self, material: &Self::Material, nodes: &DMatrix<f64>) -> Result<DMatrix<f64>>;

    /// Macroscopic nodal field X̄ (num_dofs × NumMacroFields) induced by the
    /// unit macroscopic loadings.
    fn macroscopic_field(&self, grid: &Grid<Self::Element>) -> DMatrix<f64>;

    /// Assemble user-facing results from the homogenized tensor and the
    /// nodal fields, retaining the snapshots selected by `fields`.
    fn make_results(
        &self,
        homogenized: DMatrix<f64>,
        total: &DMatrix<f64>,
        macroscopic: &DMatrix<f64>,
        microscopic: &DMatrix<f64>,
        fields: FieldSave,
        num_nodes: usize,
    ) -> Self::Results;
}

/// Periodic unit-cell homogenization solver.
///
/// Borrows the grid and material for its lifetime; the unit-density
/// reference element matrices are computed once at construction, which also
/// front-loads all geometry and material validation so that
/// [`solve`](Self::solve) can only fail inside the iterative linear solver.
pub struct PeriodicCellSolver<'a, P: Physics> {
    grid: &'a Grid<P::Element>,
    material: &'a P::Material,
    physics: P,
    element_k_reference: DMatrix<f64>,
    element_f_reference: DMatrix<f64>,
}

impl<'a, P: Physics> PeriodicCellSolver<'a, P> {
    /// Construct a solver for a grid and material.
    ///
    /// # Errors
    ///
    /// Propagates kernel failures: [`Error::Geometry`](crate::Error::Geometry)
    /// for degenerate/inverted elements and
    /// [`Error::InvalidArgument`](crate::Error::InvalidArgument) for
    /// material/element dimension mismatches.
    pub fn new(grid: &'a Grid<P::Element>, material: &'a P::Material, physics: P) -> Result<Self> {
        // All elements of a structured grid are congruent; element 0 stands
        // in for every element.
        let nodes = grid.element_nodes(0)?;

        let element_k_reference = physics.element_lhs(material, &nodes)?;
        let element_f_reference = physics.element_rhs(material, &nodes)?;

        Ok(Self {
            grid,
            material,
            physics,
            element_k_reference,
            element_f_reference,
        })
    }

    /// The borrowed unit-cell grid.
    pub fn grid(&self) -> &Grid<P::Element> {
        self.grid
    }

    /// The borrowed base material.
    pub fn material(&self) -> &P::Material {
        self.material
    }

    /// Unit-density reference element stiffness.
    pub fn element_k_reference(&self) -> &DMatrix<f64> {
        &self.element_k_reference
    }

    /// Solve the periodic unit-cell problem.
    ///
    /// Computes the total nodal field X = X̄ + X̃ per macroscopic loading
    /// direction and the homogenized tensor via the Hill–Mandel sum
    /// M̄ = (1/V) Σᵢ ρᵢ Xᵢᵀ K_ref Xᵢ.
    ///
    /// # Errors
    ///
    /// [`Error::Solver`](crate::Error::Solver) if the iterative solver does
    /// not converge or hits a numerical issue.
    pub fn solve(&self, options: &SolverOptions) -> Result<P::Results> {
        let x_macro = self.physics.macroscopic_field(self.grid);
        let x_micro = self.microscopic_field(options)?;
        let x = &x_macro + &x_micro;

        let homogenized = self.homogenize(&x);

        Ok(self.physics.make_results(
            homogenized,
            &x,
            &x_macro,
            &x_micro,
            options.fields,
            self.grid.num_nodes(),
        ))
    }

    /// Microscopic correction field X̃ on standard dofs.
    ///
    /// Solves the reduced system K X̃ = F column-by-column with the
    /// matrix-free operator, then lifts the solution from reduced to
    /// periodic to standard dofs.
    fn microscopic_field(&self, options: &SolverOptions) -> Result<DMatrix<f64>> {
        let operator = MatrixFreeOperator::new::<P::Element, P::OperatorTraits>(
            self.grid,
            self.element_k_reference.clone(),
        );
        let preconditioner = JacobiPreconditioner::new(&operator);

        let reduced_rhs = self.build_reduced_rhs(&operator);

        let mut reduced = DMatrix::zeros(operator.dim(), P::num_macro_fields());

        for q in 0..P::num_macro_fields() {
            let b = reduced_rhs.column(q).clone_owned();

            // CG for the symmetric PSD single-physics operators; BiCGStab
            // for the symmetric-indefinite piezoelectric block.
            let solution = if operator.is_psd() {
                conjugate_gradient(
                    |v| operator.apply(v),
                    |v| preconditioner.solve(v),
                    &b,
                    options.max_iterations,
                    options.tolerance,
                )?
            } else {
                bicgstab(
                    |v| operator.apply(v),
                    |v| preconditioner.solve(v),
                    &b,
                    options.max_iterations,
                    options.tolerance,
                )?
            };

            reduced.set_column(q, &solution);
        }

        Ok(self.expand(&reduced))
    }

    /// Reduced right-hand side: the same gather as the operator, applied to
    /// the density-scaled element source matrices.
    fn build_reduced_rhs(&self, operator: &MatrixFreeOperator) -> DMatrix<f64> {
        let num_macro_fields = P::num_macro_fields();
        let mut rhs = DMatrix::zeros(operator.dim(), num_macro_fields);

        for (dofs, &density) in operator.element_dofs().iter().zip(operator.densities()) {
            for (j, dof) in dofs.iter().enumerate() {
                if let Some(g) = dof {
                    for q in 0..num_macro_fields {
                        rhs[(*g, q)] += density * self.element_f_reference[(j, q)];
                    }
                }
            }
        }

        rhs
    }

    /// Lift a reduced solution to standard dofs.
    ///
    /// Reduced → periodic places reduced entries at unfixed dofs and zeros
    /// at fixed dofs; periodic → standard copies each periodic dof's row to
    /// every standard dof it represents, encoding the periodic boundary
    /// condition.
    fn expand(&self, reduced: &DMatrix<f64>) -> DMatrix<f64> {
        let num_macro_fields = P::num_macro_fields();
        let num_periodic_nodes = self.grid.num_periodic_nodes();
        let num_periodic_dofs =
            <P::OperatorTraits as OperatorTraits>::NUM_NODE_DOFS * num_periodic_nodes;

        let mut periodic = DMatrix::zeros(num_periodic_dofs, num_macro_fields);
        for i in 0..reduced.nrows() {
            let expanded =
                <P::OperatorTraits as OperatorTraits>::expanded_dof(i, num_periodic_nodes);
            periodic.row_mut(expanded).copy_from(&reduced.row(i));
        }

        let num_nodes = self.grid.num_nodes();
        let num_dofs = <P::OperatorTraits as OperatorTraits>::NUM_NODE_DOFS * num_nodes;

        let mut full = DMatrix::zeros(num_dofs, num_macro_fields);

        let elements = self.grid.elements();
        let periodic_elements = self.grid.periodic_elements();

        for (element, periodic_element) in elements.iter().zip(&periodic_elements) {
            let dofs = <P::OperatorTraits as OperatorTraits>::dofs(element, num_nodes);
            let periodic_dofs =
                <P::OperatorTraits as OperatorTraits>::dofs(periodic_element, num_periodic_nodes);

            for (&dof, &periodic_dof) in dofs.iter().zip(&periodic_dofs) {
                full.row_mut(dof).copy_from(&periodic.row(periodic_dof));
            }
        }

        full
    }

    /// Hill–Mandel homogenization: M̄ = (1/V) Σᵢ ρᵢ Xᵢᵀ K_ref Xᵢ.
    fn homogenize(&self, x: &DMatrix<f64>) -> DMatrix<f64> {
        let num_macro_fields = P::num_macro_fields();
        let num_nodes = self.grid.num_nodes();

        let mut homogenized = DMatrix::zeros(num_macro_fields, num_macro_fields);

        for (index, element) in self.grid.elements().iter().enumerate() {
            let density = self.grid.densities()[index];
            let dofs = <P::OperatorTraits as OperatorTraits>::dofs(element, num_nodes);

            let element_x =
                DMatrix::from_fn(dofs.len(), num_macro_fields, |j, q| x[(dofs[j], q)]);

            homogenized +=
                (element_x.transpose() * &self.element_k_reference * element_x) * density;
        }

        homogenized /= self.grid.measure();

        // Remove roundoff asymmetry
        symmetrize(&mut homogenized);

        homogenized
    }
}
