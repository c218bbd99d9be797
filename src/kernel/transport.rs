//! Linear scalar transport element kernel.
//!
//! Implements the weak form of the scalar diffusion PDE ∇·J = ∇·(K∇φ) = 0
//! with potentials decomposed into macroscopic and microscopic components
//! φ = φ̄ + φ̃:
//!
//! - stiffness `Kₑ = ∫ Bᵀ K B |det J| dΩ̂`
//! - macroscopic source `Fₑ = −∫ Bᵀ K |det J| dΩ̂` (one column per gradient
//!   direction)
//!
//! The [`GradientConvention`] encodes the physical sign relating the driving
//! field to the potential gradient. It cancels in the stiffness but flows
//! into the source matrix and the macroscopic field, keeping the recovered
//! nodal potentials physically signed.

use crate::element::Element;
use crate::error::{Error, Result};
use crate::kernel::global_gradients;
use crate::material::LinearTransportMaterial;
use crate::numeric::symmetrize;
use nalgebra::DMatrix;
use std::marker::PhantomData;

/// Sign convention relating the physical field G to the potential gradient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientConvention {
    /// G = −∇φ. Electric-like fields: dielectric permittivity, electrical
    /// conduction, magnetic permeability.
    Negative,
    /// G = +∇φ. Flow-like fields: thermal conduction, mass diffusion,
    /// porous flow.
    Positive,
}

impl GradientConvention {
    /// The sign s ∈ {−1, +1} applied to the gradient operator.
    pub fn sign(self) -> f64 {
        match self {
            GradientConvention::Negative => -1.0,
            GradientConvention::Positive => 1.0,
        }
    }
}

/// Linear scalar transport kernel for one element kind.
pub struct TransportKernel<E>(PhantomData<E>);

impl<E: Element> TransportKernel<E> {
    /// Number of potential dofs in the element (one per node).
    pub const NUM_DOFS: usize = E::NUM_NODES;

    /// Gradient matrix B (D × NumNodes) at a local point: G = B φ.
    ///
    /// # Errors
    ///
    /// [`Error::Geometry`] on degenerate or inverted element geometry.
    pub fn b_matrix(
        point: &[f64; 3],
        nodes: &DMatrix<f64>,
        convention: GradientConvention,
    ) -> Result<DMatrix<f64>> {
        let (g, _) = global_gradients::<E>(point, nodes)?;

        Ok(convention.sign() * g)
    }

    /// Element stiffness matrix at unit density.
    ///
    /// The gradient sign cancels here; it is accepted so that callers drive
    /// all three kernel entry points with one convention value.
    pub fn lhs(
        material: &LinearTransportMaterial,
        nodes: &DMatrix<f64>,
        convention: GradientConvention,
    ) -> Result<DMatrix<f64>> {
        Self::check_material(material)?;

        let tensor = material.tensor();
        let mut k = DMatrix::zeros(Self::NUM_DOFS, Self::NUM_DOFS);

        for gp in E::quadrature_rule() {
            let (_, det) = global_gradients::<E>(&gp.coords, nodes)?;
            let b = Self::b_matrix(&gp.coords, nodes, convention)?;

            k += (b.transpose() * tensor * b) * (det * gp.weight);
        }

        symmetrize(&mut k);

        Ok(k)
    }

    /// Element macroscopic-source matrix at unit density (D columns).
    pub fn rhs(
        material: &LinearTransportMaterial,
        nodes: &DMatrix<f64>,
        convention: GradientConvention,
    ) -> Result<DMatrix<f64>> {
        Self::check_material(material)?;

        let tensor = material.tensor();
        let mut f = DMatrix::zeros(Self::NUM_DOFS, E::DIM);

        for gp in E::quadrature_rule() {
            let (_, det) = global_gradients::<E>(&gp.coords, nodes)?;
            let b = Self::b_matrix(&gp.coords, nodes, convention)?;

            f += (b.transpose() * tensor) * (det * gp.weight);
        }

        Ok(-f)
    }

    fn check_material(material: &LinearTransportMaterial) -> Result<()> {
        if material.dim() != E::DIM {
            return Err(Error::InvalidArgument(format!(
                "material dimension ({}) must equal element dimension ({})",
                material.dim(),
                E::DIM
            )));
        }

        Ok(())
    }
}
