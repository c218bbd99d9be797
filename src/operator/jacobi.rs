//! Jacobi (diagonal) preconditioner for the matrix-free operator.

use crate::operator::MatrixFreeOperator;
use nalgebra::DVector;

/// Diagonal preconditioner: M⁻¹ ≈ diag(K)⁻¹.
///
/// The diagonal is accumulated once from the same per-element data the
/// operator applies: diag[g] = Σ ρᵢ · K_ref[j, j] over all element dofs
/// mapped to reduced index g.
pub struct JacobiPreconditioner {
    diagonal: DVector<f64>,
}

impl JacobiPreconditioner {
    /// Accumulate the reduced-operator diagonal.
    pub fn new(operator: &MatrixFreeOperator) -> Self {
        let element_k = operator.element_k_reference();
        let mut diagonal = DVector::zeros(operator.dim());

        for (dofs, &density) in operator.element_dofs().iter().zip(operator.densities()) {
            for (j, dof) in dofs.iter().enumerate() {
                if let Some(g) = dof {
                    diagonal[*g] += density * element_k[(j, j)];
                }
            }
        }

        Self { diagonal }
    }

    /// Apply the preconditioner: x = diag(K)⁻¹ b.
    pub fn solve(&self, b: &DVector<f64>) -> DVector<f64> {
        b.component_div(&self.diagonal)
    }

    /// The accumulated diagonal.
    pub fn diagonal(&self) -> &DVector<f64> {
        &self.diagonal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Quad4;
    use crate::grid::Quad4Grid;
    use crate::kernel::ElasticKernel;
    use crate::material::{LinearElasticMaterial, PlaneCondition};
    use crate::operator::ElasticOperatorTraits;
    use approx::assert_relative_eq;

    fn operator() -> MatrixFreeOperator {
        let mut grid = Quad4Grid::new(&[2, 3], &[1.0, 1.5]).unwrap();
        grid.set_densities_random(Some(7));

        let material =
            LinearElasticMaterial::isotropic_2d(1.0, 0.3, PlaneCondition::PlaneStress).unwrap();
        let element_k =
            ElasticKernel::<Quad4>::lhs(&material, &grid.element_nodes(0).unwrap()).unwrap();

        MatrixFreeOperator::new::<Quad4, ElasticOperatorTraits<Quad4>>(&grid, element_k)
    }

    #[test]
    fn test_diagonal_matches_assembled_operator() {
        let op = operator();
        let precond = JacobiPreconditioner::new(&op);
        let csr = op.assemble_csr();

        for i in 0..op.dim() {
            let assembled = csr.get_entry(i, i).map(|e| e.into_value()).unwrap_or(0.0);
            assert_relative_eq!(precond.diagonal()[i], assembled, epsilon = 1e-13);
        }
    }

    #[test]
    fn test_solve_divides_componentwise() {
        let op = operator();
        let precond = JacobiPreconditioner::new(&op);

        let b = DVector::from_element(op.dim(), 1.0);
        let x = precond.solve(&b);

        for i in 0..op.dim() {
            assert_relative_eq!(x[i] * precond.diagonal()[i], 1.0, epsilon = 1e-13);
        }
    }
}
