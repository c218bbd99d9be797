//! Linear elastic element kernel.
//!
//! Implements the weak form of the linear elastic PDE ∇·σ = ∇·(Cε) = 0 with
//! displacements decomposed into macroscopic and microscopic components
//! u = ū + ũ:
//!
//! - stiffness `Kₑ = ∫ Bᵀ C B |det J| dΩ̂`
//! - macroscopic source `Fₑ = −∫ Bᵀ C |det J| dΩ̂` (one column per
//!   macroscopic strain direction)

use crate::element::Element;
use crate::error::{Error, Result};
use crate::kernel::global_gradients;
use crate::material::LinearElasticMaterial;
use crate::numeric::symmetrize;
use nalgebra::DMatrix;
use std::marker::PhantomData;

/// Linear elastic kernel for one element kind.
pub struct ElasticKernel<E>(PhantomData<E>);

impl<E: Element> ElasticKernel<E> {
    /// Number of displacement dofs in the element.
    pub const NUM_DOFS: usize = E::DIM * E::NUM_NODES;

    /// Number of Voigt strain components.
    pub const VOIGT_SIZE: usize = if E::DIM == 2 { 3 } else { 6 };

    /// Strain-displacement matrix B (VoigtSize × NumDofs) at a local point:
    /// ε = B u.
    ///
    /// # Errors
    ///
    /// [`Error::Geometry`] on degenerate or inverted element geometry.
    pub fn b_matrix(point: &[f64; 3], nodes: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        let (g, _) = global_gradients::<E>(point, nodes)?;

        let mut b = DMatrix::zeros(Self::VOIGT_SIZE, Self::NUM_DOFS);

        if E::DIM == 2 {
            for i in 0..E::NUM_NODES {
                let (gx, gy) = (g[(0, i)], g[(1, i)]);

                // Normal strains ε₁₁, ε₂₂
                b[(0, 2 * i)] = gx;
                b[(1, 2 * i + 1)] = gy;

                // Shear strain ε₁₂
                b[(2, 2 * i)] = gy;
                b[(2, 2 * i + 1)] = gx;
            }
        } else {
            for i in 0..E::NUM_NODES {
                let (gx, gy, gz) = (g[(0, i)], g[(1, i)], g[(2, i)]);

                // Normal strains ε₁₁, ε₂₂, ε₃₃
                b[(0, 3 * i)] = gx;
                b[(1, 3 * i + 1)] = gy;
                b[(2, 3 * i + 2)] = gz;

                // Shear strain ε₁₂
                b[(3, 3 * i)] = gy;
                b[(3, 3 * i + 1)] = gx;

                // Shear strain ε₁₃
                b[(4, 3 * i)] = gz;
                b[(4, 3 * i + 2)] = gx;

                // Shear strain ε₂₃
                b[(5, 3 * i + 1)] = gz;
                b[(5, 3 * i + 2)] = gy;
            }
        }

        Ok(b)
    }

    /// Element stiffness matrix at unit density.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if the material dimension does not match
    /// the element; [`Error::Geometry`] on bad element geometry.
    pub fn lhs(material: &LinearElasticMaterial, nodes: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        Self::check_material(material)?;

        let c = material.tensor();
        let mut k = DMatrix::zeros(Self::NUM_DOFS, Self::NUM_DOFS);

        for gp in E::quadrature_rule() {
            let (_, det) = global_gradients::<E>(&gp.coords, nodes)?;
            let b = Self::b_matrix(&gp.coords, nodes)?;

            k += (b.transpose() * c * b) * (det * gp.weight);
        }

        symmetrize(&mut k);

        Ok(k)
    }

    /// Element macroscopic-source matrix at unit density (VoigtSize
    /// columns).
    pub fn rhs(material: &LinearElasticMaterial, nodes: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        Self::check_material(material)?;

        let c = material.tensor();
        let mut f = DMatrix::zeros(Self::NUM_DOFS, Self::VOIGT_SIZE);

        for gp in E::quadrature_rule() {
            let (_, det) = global_gradients::<E>(&gp.coords, nodes)?;
            let b = Self::b_matrix(&gp.coords, nodes)?;

            f += (b.transpose() * c) * (det * gp.weight);
        }

        Ok(-f)
    }

    fn check_material(material: &LinearElasticMaterial) -> Result<()> {
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
