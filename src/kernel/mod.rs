//! Per-element FEM kernels.
//!
//! For each physics, a kernel produces the two unit-density element
//! matrices the periodic-cell solver consumes:
//!
//! - the stiffness matrix `Kₑ` (NumDofs × NumDofs), and
//! - the macroscopic-source matrix `Fₑ` (NumDofs × NumMacroFields).
//!
//! Both are quadrature integrals over the reference element; each kernel
//! owns the strain-displacement (or gradient) B-matrix for its physics.
//! Degenerate or inverted element geometry is rejected here, which protects
//! every downstream linear solve.

mod elastic;
mod piezoelectric;
mod transport;

pub use elastic::ElasticKernel;
pub use piezoelectric::PiezoelectricKernel;
pub use transport::{GradientConvention, TransportKernel};

use crate::element::Element;
use crate::error::{Error, Result};
use nalgebra::DMatrix;

/// Jacobian with degenerate/inverted-geometry detection.
///
/// Returns the Jacobian and its determinant; fails with [`Error::Geometry`]
/// if det J = 0 (degenerate) or det J < 0 (inverted).
pub(crate) fn checked_jacobian<E: Element>(
    point: &[f64; 3],
    nodes: &DMatrix<f64>,
) -> Result<(DMatrix<f64>, f64)> {
    let jacobian = E::jacobian(point, nodes);
    let det = jacobian.determinant();

    if det == 0.0 {
        return Err(Error::Geometry(
            "element Jacobian determinant is zero; the element is degenerate".into(),
        ));
    }
    if det < 0.0 {
        return Err(Error::Geometry(format!(
            "element Jacobian determinant ({}) is negative; the element is inverted",
            det
        )));
    }

    Ok((jacobian, det))
}

/// Global shape-function gradients J⁻¹ · ∂N/∂ξ with geometry checks.
pub(crate) fn global_gradients<E: Element>(
    point: &[f64; 3],
    nodes: &DMatrix<f64>,
) -> Result<(DMatrix<f64>, f64)> {
    let (jacobian, det) = checked_jacobian::<E>(point, nodes)?;

    let inverse = jacobian.try_inverse().ok_or_else(|| {
        Error::Geometry("element Jacobian is not invertible".into())
    })?;

    Ok((inverse * E::grad_shape_functions(point), det))
}
